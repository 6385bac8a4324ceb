use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::matching::extractor::{ExtractionError, ExtractionErrorKind};
use crate::matching::pipeline::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Superseded by a newer upload")]
    Superseded,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Extraction(e) => AppError::Extraction(e),
            PipelineError::UnknownField(_) => AppError::Validation(err.to_string()),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Extraction(e) => match e.kind() {
                ExtractionErrorKind::Validation => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                ExtractionErrorKind::Parse => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "PARSE_ERROR", e.to_string())
                }
                ExtractionErrorKind::Empty => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_EMPTY", e.to_string())
                }
                ExtractionErrorKind::Runtime => {
                    tracing::error!("Extraction runtime error: {e}");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "RUNTIME_UNAVAILABLE",
                        "The PDF reader is unavailable; please try again".to_string(),
                    )
                }
            },
            AppError::Superseded => {
                tracing::warn!("Discarding results of a superseded upload");
                (
                    StatusCode::CONFLICT,
                    "SUPERSEDED",
                    "A newer upload replaced this one".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let retryable = matches!(&self, AppError::Extraction(e) if e.is_retryable());

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "retryable": retryable
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_code(err: AppError) -> (StatusCode, &'static str) {
        let (status, code, _) = err.parts();
        (status, code)
    }

    #[test]
    fn test_extraction_errors_map_by_kind() {
        assert_eq!(
            status_and_code(ExtractionError::EmptyFile.into()),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );
        assert_eq!(
            status_and_code(ExtractionError::BodyTooLarge { limit: 1024 }.into()),
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        );
        assert_eq!(
            status_and_code(ExtractionError::Corrupt("bad xref".into()).into()),
            (StatusCode::UNPROCESSABLE_ENTITY, "PARSE_ERROR")
        );
        assert_eq!(
            status_and_code(ExtractionError::NoExtractableText.into()),
            (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_EMPTY")
        );
        assert_eq!(
            status_and_code(ExtractionError::RuntimeUnavailable("join".into()).into()),
            (StatusCode::SERVICE_UNAVAILABLE, "RUNTIME_UNAVAILABLE")
        );
    }

    #[test]
    fn test_pipeline_errors_convert() {
        let err: AppError = PipelineError::UnknownField("Astrology".into()).into();
        let (status, code, message) = err.parts();
        assert_eq!((status, code), (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"));
        assert!(message.contains("Astrology"));

        let err: AppError = PipelineError::Extraction(ExtractionError::MissingSignature).into();
        assert!(matches!(err, AppError::Extraction(ExtractionError::MissingSignature)));
    }

    #[tokio::test]
    async fn test_envelope_flags_retryable_errors() {
        let response = AppError::from(ExtractionError::RuntimeUnavailable("join".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "RUNTIME_UNAVAILABLE");
        assert_eq!(body["error"]["retryable"], true);

        let response = AppError::Superseded.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["retryable"], false);
    }

    #[test]
    fn test_superseded_is_conflict() {
        assert_eq!(
            status_and_code(AppError::Superseded),
            (StatusCode::CONFLICT, "SUPERSEDED")
        );
    }
}
