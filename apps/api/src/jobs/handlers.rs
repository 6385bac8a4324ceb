//! Axum route handlers for job listings and applications.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::store::NewApplication;
use crate::models::job::{ApplicationRow, JobPosting, JobSource, PostingSource};
use crate::state::AppState;

const MAX_COVER_NOTE_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub source: PostingSource,
    pub cover_note: Option<String>,
}

/// GET /api/v1/jobs
///
/// Every posting from both collections in the canonical shape.
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<JobPosting>>, AppError> {
    let postings = state
        .jobs
        .list_sources()
        .await?
        .into_iter()
        .map(JobSource::into_posting)
        .collect();
    Ok(Json(postings))
}

/// POST /api/v1/applications
pub async fn handle_apply(
    State(state): State<AppState>,
    Json(request): Json<ApplyRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let cover_note = request
        .cover_note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if cover_note
        .as_ref()
        .is_some_and(|n| n.chars().count() > MAX_COVER_NOTE_CHARS)
    {
        return Err(AppError::Validation(format!(
            "cover_note must be at most {MAX_COVER_NOTE_CHARS} characters"
        )));
    }

    if !state.jobs.posting_exists(request.source, request.job_id).await? {
        return Err(AppError::NotFound(format!("Job {} not found", request.job_id)));
    }

    let application = state
        .jobs
        .record_application(NewApplication {
            student_id: request.student_id,
            job_id: request.job_id,
            source: request.source,
            cover_note,
        })
        .await?
        .ok_or_else(|| AppError::Validation("already applied to this job".to_string()))?;

    info!(
        student_id = %application.student_id,
        job_id = %application.job_id,
        "Application recorded"
    );

    Ok((StatusCode::CREATED, Json(application)))
}
