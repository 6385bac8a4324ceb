//! Job store — persistence for postings and applications behind a trait so the
//! handlers and the pipeline can run against an in-memory store in tests.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{ApplicationRow, CampusListingRow, CompanyPostingRow, JobSource, PostingSource};

/// A new application, validated by the handler before it reaches the store.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub source: PostingSource,
    pub cover_note: Option<String>,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Every posting from both collections, company postings first, newest first.
    async fn list_sources(&self) -> Result<Vec<JobSource>, AppError>;

    async fn posting_exists(&self, source: PostingSource, job_id: Uuid) -> Result<bool, AppError>;

    /// Stores the application unless this student already applied to the job,
    /// in which case nothing is written and `None` is returned. Check and insert
    /// are one atomic step, so concurrent duplicates store at most one row.
    async fn record_application(&self, application: NewApplication) -> Result<Option<ApplicationRow>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PgJobStore — default implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn list_sources(&self) -> Result<Vec<JobSource>, AppError> {
        let company = sqlx::query_as::<_, CompanyPostingRow>(
            r#"
            SELECT p.id, p.company_id, c.company_name, c.industry,
                   p.job_description, p.job_requirements, p.location, p.salary_range,
                   p.created_at
            FROM company_postings p
            JOIN companies c ON c.id = p.company_id
            ORDER BY p.created_at DESC
            "#,
        )
        .fetch_all(&self.pool);

        let campus = sqlx::query_as::<_, CampusListingRow>(
            r#"
            SELECT id, organization, sector, role_summary, skills_required, city, ctc, posted_at
            FROM campus_listings
            ORDER BY posted_at DESC
            "#,
        )
        .fetch_all(&self.pool);

        let (company, campus) = tokio::try_join!(company, campus)?;
        debug!(
            company_postings = company.len(),
            campus_listings = campus.len(),
            "Loaded job postings"
        );

        Ok(company
            .into_iter()
            .map(JobSource::Company)
            .chain(campus.into_iter().map(JobSource::Campus))
            .collect())
    }

    async fn posting_exists(&self, source: PostingSource, job_id: Uuid) -> Result<bool, AppError> {
        let query = match source {
            PostingSource::CompanyPosting => "SELECT EXISTS(SELECT 1 FROM company_postings WHERE id = $1)",
            PostingSource::CampusListing => "SELECT EXISTS(SELECT 1 FROM campus_listings WHERE id = $1)",
        };
        let exists: bool = sqlx::query_scalar(query)
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn record_application(&self, application: NewApplication) -> Result<Option<ApplicationRow>, AppError> {
        // relies on the unique index created by db::ensure_application_index
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications (student_id, job_id, source, cover_note, status)
            VALUES ($1, $2, $3, $4, 'submitted')
            ON CONFLICT (student_id, job_id) DO NOTHING
            RETURNING id, student_id, job_id, source, cover_note, status, applied_at
            "#,
        )
        .bind(application.student_id)
        .bind(application.job_id)
        .bind(application.source.as_str())
        .bind(application.cover_note)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory store for tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct MemoryJobStore {
        pub sources: Vec<JobSource>,
        pub applications: Mutex<Vec<ApplicationRow>>,
    }

    impl MemoryJobStore {
        pub fn with_sources(sources: Vec<JobSource>) -> Self {
            Self {
                sources,
                applications: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JobStore for MemoryJobStore {
        async fn list_sources(&self) -> Result<Vec<JobSource>, AppError> {
            Ok(self.sources.clone())
        }

        async fn posting_exists(&self, source: PostingSource, job_id: Uuid) -> Result<bool, AppError> {
            Ok(self.sources.iter().any(|s| match (s, source) {
                (JobSource::Company(row), PostingSource::CompanyPosting) => row.id == job_id,
                (JobSource::Campus(row), PostingSource::CampusListing) => row.id == job_id,
                _ => false,
            }))
        }

        async fn record_application(&self, application: NewApplication) -> Result<Option<ApplicationRow>, AppError> {
            // one lock for check and insert, like the unique index in Postgres
            let mut applications = self.applications.lock().unwrap();
            if applications
                .iter()
                .any(|a| a.student_id == application.student_id && a.job_id == application.job_id)
            {
                return Ok(None);
            }
            let row = ApplicationRow {
                id: Uuid::new_v4(),
                student_id: application.student_id,
                job_id: application.job_id,
                source: application.source.as_str().to_string(),
                cover_note: application.cover_note,
                status: "submitted".to_string(),
                applied_at: Utc::now(),
            };
            applications.push(row.clone());
            Ok(Some(row))
        }
    }
}
