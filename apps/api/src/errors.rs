use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::podcast::store::StoreError;
use crate::podcast::PodcastError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("No English content available yet for '{0}'. Generate English content first.")]
    NoBaseContent(String),

    #[error("Failed to generate podcast content")]
    GenerationFailed(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PodcastError> for AppError {
    fn from(err: PodcastError) -> Self {
        match err {
            PodcastError::UnsupportedLanguage(code) => AppError::UnsupportedLanguage(code),
            PodcastError::NoBaseContentAvailable { language } => AppError::NoBaseContent(language),
            PodcastError::GenerationFailed(e) => AppError::GenerationFailed(e.to_string()),
            PodcastError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::UnsupportedLanguage(_) => (StatusCode::BAD_REQUEST, "UNSUPPORTED_LANGUAGE"),
            AppError::NoBaseContent(_) => (StatusCode::BAD_REQUEST, "NO_ENGLISH_CONTENT"),
            AppError::GenerationFailed(details) => {
                tracing::error!("Podcast generation failed: {details}");
                (StatusCode::INTERNAL_SERVER_ERROR, "GENERATION_FAILED")
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = match &self {
            AppError::GenerationFailed(details) => json!({
                "error": message,
                "code": code,
                "details": details,
            }),
            AppError::NoBaseContent(_) => json!({
                "error": message,
                "code": code,
                "needsEnglishContent": true,
            }),
            AppError::Database(_) => json!({
                "error": "A database error occurred",
                "code": code,
            }),
            AppError::Internal(_) => json!({
                "error": "An internal server error occurred",
                "code": code,
            }),
            _ => json!({
                "error": message,
                "code": code,
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unsupported_language_is_400() {
        let response = AppError::UnsupportedLanguage("xx".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "UNSUPPORTED_LANGUAGE");
        assert!(body["error"].as_str().unwrap().contains("xx"));
    }

    #[tokio::test]
    async fn test_no_base_content_flags_needs_english() {
        let response = AppError::NoBaseContent("es".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["needsEnglishContent"], true);
    }

    #[tokio::test]
    async fn test_generation_failure_carries_details() {
        let response = AppError::GenerationFailed("quota exceeded".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["details"], "quota exceeded");
        assert_eq!(body["code"], "GENERATION_FAILED");
    }

    #[tokio::test]
    async fn test_store_database_error_hides_details() {
        let err: AppError = StoreError::Database(sqlx::Error::PoolClosed).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["code"], "DATABASE_ERROR");
        assert_eq!(body["error"], "A database error occurred");
    }

    #[tokio::test]
    async fn test_store_not_found_maps_to_404() {
        let err: AppError = StoreError::NotFound("episode 1".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
