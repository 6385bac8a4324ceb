use std::time::Duration;

use anyhow::{bail, Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Tables the job store reads and writes. Owned and migrated by the portal backend.
const REQUIRED_TABLES: &[&str] = &[
    "companies",
    "company_postings",
    "campus_listings",
    "applications",
];

/// Creates the PostgreSQL pool and checks the portal tables are reachable.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("failed to connect to the placement database")?;

    ensure_tables(&pool).await?;
    ensure_application_index(&pool).await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

async fn ensure_tables(pool: &PgPool) -> Result<()> {
    let mut missing = Vec::new();
    for &table in REQUIRED_TABLES {
        let present: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1)",
        )
        .bind(table)
        .fetch_one(pool)
        .await
        .with_context(|| format!("failed to look up table '{table}'"))?;
        if !present {
            missing.push(table);
        }
    }
    if !missing.is_empty() {
        bail!("placement database is missing tables: {}", missing.join(", "));
    }
    Ok(())
}

/// One application per student and job. `record_application` inserts with
/// `ON CONFLICT (student_id, job_id) DO NOTHING`, which needs this index.
async fn ensure_application_index(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS applications_student_job_key \
         ON applications (student_id, job_id)",
    )
    .execute(pool)
    .await
    .context("failed to ensure the unique (student_id, job_id) index on applications")?;
    Ok(())
}
