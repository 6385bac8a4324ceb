use std::sync::Arc;

use crate::config::Config;
use crate::jobs::store::JobStore;
use crate::matching::taxonomy::SkillTaxonomy;
use crate::matching::uploads::UploadRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded once at startup; read-only afterwards.
    pub taxonomy: Arc<SkillTaxonomy>,
    /// Posting and application persistence. Default: `PgJobStore`.
    pub jobs: Arc<dyn JobStore>,
    pub uploads: UploadRegistry,
}
