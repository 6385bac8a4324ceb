//! Axum route handlers for the résumé matching API.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::extractor::{extract_text, validate_upload, ExtractedText, ExtractionError, RawDocument};
use crate::matching::pipeline::{process_resume, resolve_field, ResumeReport};
use crate::matching::uploads::UploadTicket;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Parsed multipart body shared by the upload endpoints.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub document: Option<RawDocument>,
    pub user_id: Option<Uuid>,
    pub field: Option<String>,
}

impl UploadForm {
    fn into_document(self) -> Result<(RawDocument, Option<Uuid>, Option<String>), AppError> {
        let document = self
            .document
            .ok_or_else(|| AppError::Validation("multipart part 'resume' is required".to_string()))?;
        Ok((document, self.user_id, self.field))
    }
}

#[derive(Debug, Serialize)]
pub struct FieldSummary {
    pub name: String,
    pub categories: Vec<String>,
}

async fn read_upload_form(mut multipart: Multipart, max_bytes: usize) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = part.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let filename = part.file_name().unwrap_or_default().to_string();
                let content_type = part.content_type().map(str::to_string);
                let bytes = part.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;
                form.document = Some(RawDocument::new(filename, content_type, bytes));
            }
            "user_id" => {
                let raw = part
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable user_id: {e}")))?;
                let user_id = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation(format!("user_id '{raw}' is not a UUID")))?;
                form.user_id = Some(user_id);
            }
            "field" => {
                let raw = part
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable field: {e}")))?;
                form.field = Some(raw);
            }
            other => warn!(part = other, "Ignoring unexpected multipart part"),
        }
    }

    Ok(form)
}

/// `DefaultBodyLimit` trips while the file part is streamed in; that is an
/// oversized upload, not a malformed one.
fn multipart_error(err: MultipartError, max_bytes: usize) -> ExtractionError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ExtractionError::BodyTooLarge { limit: max_bytes }
    } else {
        ExtractionError::Unreadable(err.to_string())
    }
}

/// Runs a parsing task on Tokio's blocking pool. A failed join means the
/// worker never produced an answer, which is reported as retryable.
async fn run_blocking<T, E>(task: impl FnOnce() -> Result<T, E> + Send + 'static) -> Result<T, AppError>
where
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ExtractionError::RuntimeUnavailable(e.to_string()))?
        .map_err(Into::into)
}

fn ensure_current(ticket: &UploadTicket) -> Result<(), AppError> {
    if ticket.is_current() {
        Ok(())
    } else {
        Err(AppError::Superseded)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/analyze
///
/// Upload → extract → analyze every field → rank all postings.
/// A newer upload from the same `user_id` makes this one return 409.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ResumeReport>, AppError> {
    let max_bytes = state.config.max_upload_bytes;
    let (document, user_id, field) = read_upload_form(multipart, max_bytes).await?.into_document()?;
    let ticket = state.uploads.begin(user_id);

    info!(
        filename = %document.filename,
        bytes = document.len(),
        upload = ticket.sequence(),
        "Resume upload received"
    );

    // fail fast before touching the database
    validate_upload(&document, max_bytes)?;
    resolve_field(&state.taxonomy, field.as_deref())?;

    let sources = state.jobs.list_sources().await?;
    let taxonomy = Arc::clone(&state.taxonomy);
    let report = run_blocking(move || {
        process_resume(&document, &taxonomy, sources, field.as_deref(), max_bytes)
    })
    .await?;
    ensure_current(&ticket)?;

    Ok(Json(report))
}

/// POST /api/v1/resumes/extract
///
/// Extraction only; useful for previewing how pages were bucketed.
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractedText>, AppError> {
    let max_bytes = state.config.max_upload_bytes;
    let (document, _, _) = read_upload_form(multipart, max_bytes).await?.into_document()?;
    info!(filename = %document.filename, bytes = document.len(), "Extraction requested");

    let extracted = run_blocking(move || extract_text(&document, max_bytes)).await?;
    Ok(Json(extracted))
}

/// GET /api/v1/fields
pub async fn handle_list_fields(State(state): State<AppState>) -> Json<Vec<FieldSummary>> {
    let fields = state
        .taxonomy
        .fields
        .iter()
        .map(|f| FieldSummary {
            name: f.name.clone(),
            categories: f.categories.iter().map(|c| c.name.clone()).collect(),
        })
        .collect();
    Json(fields)
}
