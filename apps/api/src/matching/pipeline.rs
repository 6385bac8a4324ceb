//! Résumé pipeline — validate → extract → analyze every field → pick a field →
//! normalize postings → rank. Returns one immutable report or one error.
//!
//! Everything here is synchronous and CPU-bound; the HTTP layer runs it inside
//! `tokio::task::spawn_blocking`.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::matching::extractor::{extract_text, validate_upload, ExtractedText, ExtractionError, RawDocument};
use crate::matching::field_analysis::{FieldAnalysis, FieldAnalyzer, FieldScores};
use crate::matching::ranking::{rank_jobs, RankedJob};
use crate::matching::taxonomy::SkillTaxonomy;
use crate::models::job::JobSource;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeReport {
    pub extracted: ExtractedText,
    pub analyses: Vec<FieldAnalysis>,
    pub scores: FieldScores,
    pub best_field: Option<String>,
    /// Field used for ranking: the override when given, otherwise `best_field`.
    pub selected_field: Option<String>,
    pub detected_skills: Vec<String>,
    pub ranked_jobs: Vec<RankedJob>,
}

/// Resolves an optional field override to the taxonomy's own spelling.
pub fn resolve_field(taxonomy: &SkillTaxonomy, requested: Option<&str>) -> Result<Option<String>, PipelineError> {
    match requested.map(str::trim).filter(|f| !f.is_empty()) {
        None => Ok(None),
        Some(name) => taxonomy
            .field(name)
            .map(|f| Some(f.name.clone()))
            .ok_or_else(|| PipelineError::UnknownField(name.to_string())),
    }
}

/// Runs every stage after extraction.
pub fn analyze_extracted(
    extracted: ExtractedText,
    taxonomy: &SkillTaxonomy,
    sources: Vec<JobSource>,
    field_override: Option<&str>,
) -> Result<ResumeReport, PipelineError> {
    let override_field = resolve_field(taxonomy, field_override)?;

    let field_report = FieldAnalyzer::new(taxonomy).analyze(&extracted);
    let best_field = field_report.best_field().map(|a| a.field.clone());
    let selected_field = override_field.or_else(|| best_field.clone());

    let detected_skills = selected_field
        .as_deref()
        .and_then(|name| field_report.for_field(name))
        .map(|a| a.detected_skills.clone())
        .unwrap_or_default();

    let postings = sources.into_iter().map(JobSource::into_posting).collect();
    let ranked_jobs = rank_jobs(
        &detected_skills,
        selected_field.as_deref().unwrap_or_default(),
        postings,
    );

    let best_score = best_field
        .as_deref()
        .and_then(|name| field_report.scores.get(name))
        .unwrap_or(0.0);
    info!(
        best_field = best_field.as_deref().unwrap_or("-"),
        best_score,
        selected_field = selected_field.as_deref().unwrap_or("-"),
        skills = detected_skills.len(),
        jobs = ranked_jobs.len(),
        "Resume analysis complete"
    );

    Ok(ResumeReport {
        extracted,
        analyses: field_report.analyses,
        scores: field_report.scores,
        best_field,
        selected_field,
        detected_skills,
        ranked_jobs,
    })
}

/// Full pipeline for one upload.
pub fn process_resume(
    doc: &RawDocument,
    taxonomy: &SkillTaxonomy,
    sources: Vec<JobSource>,
    field_override: Option<&str>,
    max_upload_bytes: usize,
) -> Result<ResumeReport, PipelineError> {
    // cheap checks first so a bad request never reaches the parser
    validate_upload(doc, max_upload_bytes)?;
    resolve_field(taxonomy, field_override)?;

    let extracted = extract_text(doc, max_upload_bytes)?;
    analyze_extracted(extracted, taxonomy, sources, field_override)
}
