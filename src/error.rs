// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{generation::GenerationError, models::answer_sheet::AnswerSheetError};

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., duplicate username)
    Conflict(String),

    // 502 Bad Gateway (the AI collaborator failed or misbehaved)
    BadGateway(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::BadGateway(msg) => {
                tracing::warn!("AI collaborator failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<AnswerSheetError> for AppError {
    fn from(err: AnswerSheetError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Upstream detail is logged here and never forwarded to clients.
impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        tracing::error!("AI collaborator error: {}", err);
        let message = match err {
            GenerationError::NotConfigured(_) => "AI generation is not configured",
            GenerationError::Timeout(_) => "AI service timed out",
            GenerationError::Malformed(_) => "AI service returned malformed questions",
            GenerationError::Network(_)
            | GenerationError::Api { .. }
            | GenerationError::UnexpectedResponse(_) => "AI service is unavailable",
        };
        AppError::BadGateway(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::AuthError("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::BadGateway("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::InternalServerError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn generation_errors_map_to_bad_gateway() {
        let err = AppError::from(GenerationError::Malformed("not json".into()));
        assert!(matches!(err, AppError::BadGateway(ref m) if m.contains("malformed")));

        let err = AppError::from(GenerationError::Api {
            status: 403,
            message: "API key not valid: abc123".into(),
        });
        assert!(matches!(err, AppError::BadGateway(ref m) if !m.contains("abc123")));
    }

    #[test]
    fn answer_sheet_errors_map_to_bad_request() {
        let err = AppError::from(AnswerSheetError::TooManySelections(900));
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
