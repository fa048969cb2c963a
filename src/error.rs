use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`StoreError`] for storage-layer failures and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent
/// `{"error": ..., "code": ...}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Malformed input: bad email, short password, oversized prompt.
    #[error("{0}")]
    Validation(String),

    /// Login failure. Deliberately generic: never reveals whether the email
    /// exists.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed or expired bearer token.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Unexpected failure outside the storage layer. Carries the detail for
    /// the log line only; the response body stays generic.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Store(store) => match store {
                StoreError::EmailTaken => (
                    StatusCode::CONFLICT,
                    "EMAIL_TAKEN",
                    "Email already registered".to_string(),
                ),
                StoreError::InsufficientCredits { balance, requested } => (
                    StatusCode::PAYMENT_REQUIRED,
                    "INSUFFICIENT_CREDITS",
                    format!("Insufficient credits: balance {balance}, requested {requested}"),
                ),
                StoreError::NotFound(entity) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{} not found", capitalize(entity)),
                ),
                StoreError::Database(err) => {
                    tracing::error!(error = %err, "database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.to_string())
            }
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}

/// "video" -> "Video", for user-facing not-found messages.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn error_to_response(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn email_taken_maps_to_409() {
        let (status, json) = error_to_response(StoreError::EmailTaken.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], "EMAIL_TAKEN");
    }

    #[tokio::test]
    async fn insufficient_credits_maps_to_402() {
        let err = StoreError::InsufficientCredits {
            balance: 0,
            requested: 1,
        };
        let (status, json) = error_to_response(err.into()).await;
        assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(json["code"], "INSUFFICIENT_CREDITS");
    }

    #[tokio::test]
    async fn not_found_maps_to_404_with_entity_name() {
        let (status, json) = error_to_response(StoreError::NotFound("video").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["error"], "Video not found");
    }

    #[tokio::test]
    async fn database_error_maps_to_sanitized_500() {
        let err = StoreError::Database(sqlx::Error::PoolTimedOut);
        let (status, json) = error_to_response(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        // Never leaks backend details.
        assert_eq!(json["error"], "An internal error occurred");
    }

    #[tokio::test]
    async fn invalid_credentials_is_generic_401() {
        let (status, json) = error_to_response(ApiError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Invalid credentials");
    }
}
