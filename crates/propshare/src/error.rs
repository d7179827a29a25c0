use crate::config::ConfigError;
use crate::sharing::SharingError;
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
    Sharing(SharingError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Sharing(err) => write!(f, "{}", err),
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
            AppError::Sharing(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Sharing(error) => sharing_status(error),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Stable HTTP mapping for the sharing taxonomy. `InvalidState` covers lost
/// transition races as well, so callers treat a 409 as "refresh and re-check".
fn sharing_status(error: &SharingError) -> StatusCode {
    match error {
        SharingError::NotFound => StatusCode::NOT_FOUND,
        SharingError::Forbidden => StatusCode::FORBIDDEN,
        SharingError::SelfReference => StatusCode::UNPROCESSABLE_ENTITY,
        SharingError::Conflict | SharingError::InvalidState => StatusCode::CONFLICT,
        SharingError::PartnershipRequired => StatusCode::PRECONDITION_FAILED,
        SharingError::Repository(_) | SharingError::Directory(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
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

impl From<SharingError> for AppError {
    fn from(value: SharingError) -> Self {
        Self::Sharing(value)
    }
}
