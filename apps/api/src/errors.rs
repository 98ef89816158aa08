use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is invalid for the entity's current state
    /// (double-cancel, double-close, missing prerequisite record).
    #[error("{0}")]
    Domain(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        AppError::Domain(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnknownAction(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Domain(_)
            | AppError::Database(_)
            | AppError::Llm(_)
            | AppError::Speech(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the client. Upstream failures keep the provider text.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) | AppError::Domain(msg) => {
                msg.clone()
            }
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {e}"),
            AppError::Llm(msg) => tracing::error!("LLM error: {msg}"),
            AppError::Speech(msg) => tracing::error!("Speech error: {msg}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::Domain(msg) => tracing::warn!("Domain error: {msg}"),
            _ => {}
        }

        let body = Json(json!({
            "success": false,
            "error": self.client_message(),
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = AppError::validation("user_id is required");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "user_id is required");
    }

    #[test]
    fn test_domain_error_maps_to_internal() {
        let err = AppError::domain("Appointment is already cancelled");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Appointment is already cancelled");
    }

    #[test]
    fn test_unknown_action_is_bad_request() {
        let err = AppError::UnknownAction("fly_to_moon".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "Unknown action: fly_to_moon");
    }

    #[test]
    fn test_llm_error_keeps_provider_text() {
        let err = AppError::Llm("API error (status 401): invalid x-api-key".to_string());
        assert!(err.client_message().contains("invalid x-api-key"));
    }
}
