//! Job posting rows from both source collections, and the canonical shape they
//! are normalized into before ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingSource {
    /// `company_postings`, created from a company profile.
    CompanyPosting,
    /// `campus_listings`, entered through the placement admin console.
    CampusListing,
}

impl PostingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingSource::CompanyPosting => "company_posting",
            PostingSource::CampusListing => "campus_listing",
        }
    }
}

/// `company_postings` joined with the owning row in `companies`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyPostingRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub company_name: String,
    pub industry: Option<String>,
    pub job_description: Option<String>,
    pub job_requirements: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `campus_listings` — admin-entered openings with their own column names.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampusListingRow {
    pub id: Uuid,
    pub organization: String,
    pub sector: Option<String>,
    pub role_summary: Option<String>,
    pub skills_required: Option<String>,
    pub city: Option<String>,
    pub ctc: Option<String>,
    pub posted_at: DateTime<Utc>,
}

/// A posting as fetched, still in its source collection's shape.
#[derive(Debug, Clone)]
pub enum JobSource {
    Company(CompanyPostingRow),
    Campus(CampusListingRow),
}

/// The single shape the ranker understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub source: PostingSource,
    pub company_name: String,
    pub job_description: String,
    /// Comma-separated; absent means no stated requirements.
    pub job_requirements: Option<String>,
    pub location: String,
    pub salary_range: String,
    pub industry: String,
}

impl JobSource {
    pub fn into_posting(self) -> JobPosting {
        match self {
            JobSource::Company(row) => JobPosting {
                id: row.id,
                source: PostingSource::CompanyPosting,
                company_name: row.company_name,
                job_description: row.job_description.unwrap_or_default(),
                job_requirements: row.job_requirements,
                location: row.location.unwrap_or_default(),
                salary_range: row.salary_range.unwrap_or_default(),
                industry: row.industry.unwrap_or_default(),
            },
            JobSource::Campus(row) => JobPosting {
                id: row.id,
                source: PostingSource::CampusListing,
                company_name: row.organization,
                job_description: row.role_summary.unwrap_or_default(),
                job_requirements: row.skills_required,
                location: row.city.unwrap_or_default(),
                salary_range: row.ctc.unwrap_or_default(),
                industry: row.sector.unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub source: String,
    pub cover_note: Option<String>,
    pub status: String,
    pub applied_at: DateTime<Utc>,
}
