pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::state::AppState;

/// Headroom above the upload ceiling for multipart framing and text parts.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/resumes/analyze", post(matching::handle_analyze))
        .route("/api/v1/resumes/extract", post(matching::handle_extract))
        .route("/api/v1/fields", get(matching::handle_list_fields))
        // Jobs API
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/applications", post(jobs::handle_apply))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
