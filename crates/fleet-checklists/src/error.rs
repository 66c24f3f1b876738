use crate::access::UnknownAction;
use crate::checklists::router::invalid_template_payload;
use crate::checklists::schema::{SchemaError, ValidationFailure};
use crate::checklists::targeting::roster::RosterError;
use crate::checklists::MalformedInput;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Json(serde_json::Error),
    Malformed(MalformedInput),
    Invalid(Vec<SchemaError>),
    Roster(RosterError),
    UnknownAction(UnknownAction),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Json(err) => write!(f, "invalid JSON document: {}", err),
            AppError::Malformed(err) => write!(f, "{}", err),
            AppError::Invalid(errors) => {
                write!(f, "template failed validation with {} error(s)", errors.len())
            }
            AppError::Roster(err) => write!(f, "fleet roster error: {}", err),
            AppError::UnknownAction(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Malformed(err) => Some(err),
            AppError::Invalid(_) => None,
            AppError::Roster(err) => Some(err),
            AppError::UnknownAction(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Invalid(errors) => {
                let body = Json(invalid_template_payload(&errors));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::Json(_) | AppError::Malformed(_) | AppError::Roster(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::UnknownAction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<MalformedInput> for AppError {
    fn from(value: MalformedInput) -> Self {
        Self::Malformed(value)
    }
}

impl From<ValidationFailure> for AppError {
    fn from(value: ValidationFailure) -> Self {
        match value {
            ValidationFailure::Malformed(err) => Self::Malformed(err),
            ValidationFailure::Invalid(errors) => Self::Invalid(errors),
        }
    }
}

impl From<RosterError> for AppError {
    fn from(value: RosterError) -> Self {
        Self::Roster(value)
    }
}

impl From<UnknownAction> for AppError {
    fn from(value: UnknownAction) -> Self {
        Self::UnknownAction(value)
    }
}
