// Application error type and its conversion into HTTP responses.
//
// The taxonomy mirrors how failures surface to the user: upstream/transport
// problems become a generic "try again", 401s become a login prompt, 422s
// carry field-level messages, and anything unexpected is an opaque 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Network/transport failure or upstream 5xx. User-facing message is generic.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Client-side or upstream validation failure (HTTP 422).
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        AppError::Validation {
            message: message.into(),
            fields,
        }
    }

    /// Maps an upstream HTTP status (plus the response body's "message" field,
    /// when one was present) onto the taxonomy.
    pub fn from_upstream_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        match status.as_u16() {
            401 => AppError::Unauthorized(
                message.unwrap_or_else(|| "Please login to continue.".to_string()),
            ),
            422 => AppError::Validation {
                message: message.unwrap_or_else(|| "Please check the submitted fields.".to_string()),
                fields: Vec::new(),
            },
            404 => AppError::NotFound(message.unwrap_or_else(|| "Not found.".to_string())),
            _ => AppError::Upstream(
                message.unwrap_or_else(|| "Something went wrong. Please try again.".to_string()),
            ),
        }
    }
}

// Transport-level reqwest failures (connect, timeout, body decode) have no
// status to inspect; they all read as "try again".
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            return AppError::from_upstream_status(status, None);
        }
        tracing::warn!("upstream transport error: {}", error);
        AppError::Upstream("Something went wrong. Please try again.".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, fields) = match self {
            AppError::Upstream(message) => {
                tracing::warn!("upstream failure: {}", message);
                (StatusCode::BAD_GATEWAY, message, Vec::new())
            }
            AppError::Unauthorized(message) => {
                tracing::warn!("unauthorized: {}", message);
                (StatusCode::UNAUTHORIZED, message, Vec::new())
            }
            AppError::Validation { message, fields } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message, fields)
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message, Vec::new()),
            AppError::Internal(e) => {
                // Log the detailed error, don't expose internals to the client.
                tracing::error!("internal server error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "errors": fields,
        }));
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_maps_to_login_prompt() {
        let err = AppError::from_upstream_status(reqwest::StatusCode::UNAUTHORIZED, None);
        match err {
            AppError::Unauthorized(msg) => assert!(msg.to_lowercase().contains("login")),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[test]
    fn status_422_keeps_upstream_message() {
        let err = AppError::from_upstream_status(
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            Some("The phone field is invalid.".to_string()),
        );
        match err {
            AppError::Validation { message, .. } => {
                assert_eq!(message, "The phone field is invalid.")
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn status_500_maps_to_generic_retry_message() {
        let err =
            AppError::from_upstream_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, None);
        match err {
            AppError::Upstream(msg) => assert!(msg.contains("try again")),
            other => panic!("expected Upstream, got {:?}", other),
        }
    }
}
