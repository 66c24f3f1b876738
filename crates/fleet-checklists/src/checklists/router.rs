use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::document::TemplateDocument;
use super::domain::{TemplateId, TemplateRecord};
use super::repository::{AssignmentStore, FleetDirectory, TemplateRepository};
use super::schema::{SchemaError, SchemaErrorView};
use super::service::{ChecklistService, ChecklistServiceError};
use super::targeting::{AssignmentTarget, SideEffectToggles};
use crate::access::router::{
    actor_from_headers, error_response, json_body, repository_error_response,
};
use crate::access::ProfileRepository;

/// Router builder exposing template authoring and assignment resolution.
pub fn checklist_router<R, F, A, P>(service: Arc<ChecklistService<R, F, A, P>>) -> Router
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/checklists/templates/validate",
            post(validate_handler::<R, F, A, P>),
        )
        .route(
            "/api/v1/checklists/templates",
            post(create_handler::<R, F, A, P>).get(list_handler::<R, F, A, P>),
        )
        .route(
            "/api/v1/checklists/templates/:template_id",
            get(fetch_handler::<R, F, A, P>)
                .put(replace_handler::<R, F, A, P>)
                .delete(delete_handler::<R, F, A, P>),
        )
        .route(
            "/api/v1/checklists/templates/:template_id/assignments",
            get(assignments_handler::<R, F, A, P>),
        )
        .route(
            "/api/v1/checklists/templates/:template_id/assignments/resolve",
            post(resolve_handler::<R, F, A, P>),
        )
        .route(
            "/api/v1/checklists/templates/:template_id/assignments/overrides",
            put(override_handler::<R, F, A, P>),
        )
        .with_state(service)
}

/// Stored template as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateView {
    pub id: TemplateId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub template: TemplateDocument,
}

impl From<&TemplateRecord> for TemplateView {
    fn from(record: &TemplateRecord) -> Self {
        Self {
            id: record.id.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            template: TemplateDocument::from(&record.template),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverrideRequest {
    pub(crate) target: AssignmentTarget,
    #[serde(flatten)]
    pub(crate) toggles: SideEffectToggles,
}

pub(crate) async fn validate_handler<R, F, A, P>(
    State(service): State<Arc<ChecklistService<R, F, A, P>>>,
    body: String,
) -> Response
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    let document = match TemplateDocument::from_json(&body) {
        Ok(document) => document,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error.to_string()),
    };

    match service.validate(&document) {
        Ok(template) => {
            let normalized = TemplateDocument::from(&template);
            (StatusCode::OK, axum::Json(normalized)).into_response()
        }
        Err(error) => checklist_error_response(error),
    }
}

pub(crate) async fn create_handler<R, F, A, P>(
    State(service): State<Arc<ChecklistService<R, F, A, P>>>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let document = match TemplateDocument::from_json(&body) {
        Ok(document) => document,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error.to_string()),
    };

    match service.create(&actor, &document) {
        Ok(record) => {
            let view = TemplateView::from(&record);
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(error) => checklist_error_response(error),
    }
}

pub(crate) async fn list_handler<R, F, A, P>(
    State(service): State<Arc<ChecklistService<R, F, A, P>>>,
) -> Response
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    match service.list() {
        Ok(records) => {
            let summaries: Vec<_> = records.iter().map(TemplateRecord::summary_view).collect();
            (StatusCode::OK, axum::Json(summaries)).into_response()
        }
        Err(error) => checklist_error_response(error),
    }
}

pub(crate) async fn fetch_handler<R, F, A, P>(
    State(service): State<Arc<ChecklistService<R, F, A, P>>>,
    Path(template_id): Path<String>,
) -> Response
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    match service.get(&TemplateId(template_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(TemplateView::from(&record))).into_response(),
        Err(error) => checklist_error_response(error),
    }
}

pub(crate) async fn replace_handler<R, F, A, P>(
    State(service): State<Arc<ChecklistService<R, F, A, P>>>,
    Path(template_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let document = match TemplateDocument::from_json(&body) {
        Ok(document) => document,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error.to_string()),
    };

    match service.replace(&actor, &TemplateId(template_id), &document) {
        Ok(record) => (StatusCode::OK, axum::Json(TemplateView::from(&record))).into_response(),
        Err(error) => checklist_error_response(error),
    }
}

pub(crate) async fn delete_handler<R, F, A, P>(
    State(service): State<Arc<ChecklistService<R, F, A, P>>>,
    Path(template_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.delete(&actor, &TemplateId(template_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => checklist_error_response(error),
    }
}

pub(crate) async fn assignments_handler<R, F, A, P>(
    State(service): State<Arc<ChecklistService<R, F, A, P>>>,
    Path(template_id): Path<String>,
) -> Response
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    match service.assignments(&TemplateId(template_id)) {
        Ok(assignments) => (StatusCode::OK, axum::Json(assignments)).into_response(),
        Err(error) => checklist_error_response(error),
    }
}

pub(crate) async fn resolve_handler<R, F, A, P>(
    State(service): State<Arc<ChecklistService<R, F, A, P>>>,
    Path(template_id): Path<String>,
) -> Response
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    match service.resolve_assignments(&TemplateId(template_id)) {
        Ok(resolution) => (StatusCode::OK, axum::Json(resolution)).into_response(),
        Err(error) => checklist_error_response(error),
    }
}

pub(crate) async fn override_handler<R, F, A, P>(
    State(service): State<Arc<ChecklistService<R, F, A, P>>>,
    Path(template_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    R: TemplateRepository + 'static,
    F: FleetDirectory + 'static,
    A: AssignmentStore + 'static,
    P: ProfileRepository + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let request: OverrideRequest = match json_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let id = TemplateId(template_id);
    match service.set_override(&actor, &id, request.target.clone(), request.toggles) {
        Ok(()) => {
            let payload = json!({
                "template_id": id,
                "target": request.target,
                "report": request.toggles.report,
                "email": request.toggles.email,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => checklist_error_response(error),
    }
}

/// Body of a 422 answer: every violation found, not just the first.
pub fn invalid_template_payload(errors: &[SchemaError]) -> serde_json::Value {
    let views: Vec<SchemaErrorView> = errors.iter().map(SchemaError::view).collect();
    json!({
        "error": format!("template failed validation with {} error(s)", errors.len()),
        "errors": views,
    })
}

fn checklist_error_response(error: ChecklistServiceError) -> Response {
    match error {
        ChecklistServiceError::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(invalid_template_payload(&errors)),
        )
            .into_response(),
        ChecklistServiceError::PermissionDenied(denied) => {
            error_response(StatusCode::FORBIDDEN, denied.to_string())
        }
        ChecklistServiceError::UnknownActor(_) => {
            error_response(StatusCode::FORBIDDEN, error.to_string())
        }
        ChecklistServiceError::Repository(error) => repository_error_response(error),
    }
}
