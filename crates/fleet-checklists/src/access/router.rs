use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::evaluator::{AccessContext, Action, Relationship};
use super::profile::{AccessProfile, ProfileId};
use super::repository::{ProfileRepository, UserDirectory};
use super::service::{AccessProfileService, ProfileServiceError};
use crate::store::RepositoryError;

/// Header naming the profile on whose behalf a mutating request is made.
pub const ACTOR_HEADER: &str = "x-actor-profile";

/// Router builder exposing profile management and authorization checks.
pub fn access_router<P, U>(service: Arc<AccessProfileService<P, U>>) -> Router
where
    P: ProfileRepository + 'static,
    U: UserDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/access/profiles",
            post(create_handler::<P, U>).get(list_handler::<P, U>),
        )
        .route(
            "/api/v1/access/profiles/:profile_id",
            get(fetch_handler::<P, U>)
                .put(update_handler::<P, U>)
                .delete(delete_handler::<P, U>),
        )
        .route("/api/v1/access/authorize", post(authorize_handler::<P, U>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthorizeRequest {
    pub(crate) profile_id: ProfileId,
    pub(crate) action: String,
    #[serde(default)]
    pub(crate) relationship: Option<Relationship>,
}

pub(crate) async fn create_handler<P, U>(
    State(service): State<Arc<AccessProfileService<P, U>>>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    P: ProfileRepository + 'static,
    U: UserDirectory + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let profile: AccessProfile = match json_body(&body) {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    match service.create(&actor, profile) {
        Ok(profile) => (StatusCode::CREATED, axum::Json(profile)).into_response(),
        Err(error) => profile_error_response(error),
    }
}

pub(crate) async fn list_handler<P, U>(
    State(service): State<Arc<AccessProfileService<P, U>>>,
) -> Response
where
    P: ProfileRepository + 'static,
    U: UserDirectory + 'static,
{
    match service.list() {
        Ok(profiles) => (StatusCode::OK, axum::Json(profiles)).into_response(),
        Err(error) => profile_error_response(error),
    }
}

pub(crate) async fn fetch_handler<P, U>(
    State(service): State<Arc<AccessProfileService<P, U>>>,
    Path(profile_id): Path<String>,
) -> Response
where
    P: ProfileRepository + 'static,
    U: UserDirectory + 'static,
{
    match service.get(&ProfileId(profile_id)) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => profile_error_response(error),
    }
}

pub(crate) async fn update_handler<P, U>(
    State(service): State<Arc<AccessProfileService<P, U>>>,
    Path(profile_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    P: ProfileRepository + 'static,
    U: UserDirectory + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let mut profile: AccessProfile = match json_body(&body) {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    // The path is authoritative for the record being replaced.
    profile.id = ProfileId(profile_id);
    match service.update(&actor, profile) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(error) => profile_error_response(error),
    }
}

pub(crate) async fn delete_handler<P, U>(
    State(service): State<Arc<AccessProfileService<P, U>>>,
    Path(profile_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    P: ProfileRepository + 'static,
    U: UserDirectory + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.delete(&actor, &ProfileId(profile_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => profile_error_response(error),
    }
}

pub(crate) async fn authorize_handler<P, U>(
    State(service): State<Arc<AccessProfileService<P, U>>>,
    body: String,
) -> Response
where
    P: ProfileRepository + 'static,
    U: UserDirectory + 'static,
{
    let request: AuthorizeRequest = match json_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let action: Action = match request.action.parse() {
        Ok(action) => action,
        Err(error) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    };
    let context = AccessContext {
        relationship: request.relationship.unwrap_or_default(),
    };

    match service.authorize(&request.profile_id, action, &context) {
        Ok(decision) => (StatusCode::OK, axum::Json(decision)).into_response(),
        Err(error) => profile_error_response(error),
    }
}

/// Extract the acting profile id, answering 401 when the header is absent or blank.
pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Result<ProfileId, Response> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ProfileId::new)
        .ok_or_else(|| {
            error_response(
                StatusCode::UNAUTHORIZED,
                format!("missing {ACTOR_HEADER} header"),
            )
        })
}

/// Parse a JSON request body, answering 400 with the usual error payload when it is unreadable.
pub(crate) fn json_body<T: DeserializeOwned>(body: &str) -> Result<T, Response> {
    serde_json::from_str(body).map_err(|error| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("invalid request body: {error}"),
        )
    })
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) fn repository_error_response(error: RepositoryError) -> Response {
    let status = match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, error.to_string())
}

fn profile_error_response(error: ProfileServiceError) -> Response {
    match error {
        ProfileServiceError::PermissionDenied(denied) => {
            error_response(StatusCode::FORBIDDEN, denied.to_string())
        }
        ProfileServiceError::UnknownActor(_) => {
            error_response(StatusCode::FORBIDDEN, error.to_string())
        }
        ProfileServiceError::ProfileInUse { ref users, .. } => {
            let payload = json!({
                "error": error.to_string(),
                "users": users,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ProfileServiceError::LastAdministrator(_) => {
            error_response(StatusCode::CONFLICT, error.to_string())
        }
        ProfileServiceError::InvalidProfile(_) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        ProfileServiceError::Repository(error) => repository_error_response(error),
    }
}
