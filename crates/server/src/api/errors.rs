//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON response body `{"error": "message"}`.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docqa_core::AppError;
use serde_json::json;

/// Error returned by every handler.
///
/// - `BadRequest` → 400
/// - `NotFound` → 404
/// - `Conflict` → 409
/// - `PayloadTooLarge` → 413
/// - `BadGateway` → 502 (embedding or answer model failed)
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            tracing::debug!("Rejected request: {}", err);
        }

        match err {
            AppError::Validation(msg) => ApiError::BadRequest(msg),
            AppError::NotFound(msg) => ApiError::NotFound(msg),
            AppError::Conflict(msg) => ApiError::Conflict(msg),
            AppError::TooLarge(msg) => ApiError::PayloadTooLarge(msg),
            AppError::Llm(msg) => {
                tracing::warn!("Answer model failed: {}", msg);
                ApiError::BadGateway(format!("Answer generation failed: {}", msg))
            }
            AppError::Embedding(msg) => {
                tracing::warn!("Embedding failed: {}", msg);
                ApiError::BadGateway(format!("Embedding failed: {}", msg))
            }
            other => {
                tracing::error!("Request failed: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => msg,
        };
        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::TooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::Llm("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::Embedding("x".into()), StatusCode::BAD_GATEWAY),
            (AppError::Extraction("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Store("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_client_errors_map_to_4xx() {
        let errors = [
            AppError::Validation("x".into()),
            AppError::Conflict("x".into()),
            AppError::NotFound("x".into()),
            AppError::TooLarge("x".into()),
            AppError::Llm("x".into()),
            AppError::Embedding("x".into()),
            AppError::Store("x".into()),
            AppError::Serialization("x".into()),
            AppError::Other("x".into()),
        ];

        for err in errors {
            let client = err.is_client_error();
            let status = ApiError::from(err).status();
            assert_eq!(status.is_client_error(), client, "status {}", status);
        }
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::Conflict("exists".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
