mod config;
mod db;
mod errors;
mod jobs;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::jobs::store::PgJobStore;
use crate::matching::taxonomy::SkillTaxonomy;
use crate::matching::uploads::UploadRegistry;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Placement API v{}", env!("CARGO_PKG_VERSION"));

    // Skill taxonomy is data, loaded once; a bad file aborts startup
    let taxonomy = SkillTaxonomy::from_path(&config.skill_taxonomy_path)
        .with_context(|| format!("loading skill taxonomy from {}", config.skill_taxonomy_path))?;
    info!(
        fields = taxonomy.fields.len(),
        synonyms = taxonomy.synonyms.len(),
        "Skill taxonomy loaded"
    );

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    let state = AppState {
        config: config.clone(),
        taxonomy: Arc::new(taxonomy),
        jobs: Arc::new(PgJobStore::new(db)),
        uploads: UploadRegistry::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the portal frontend host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
