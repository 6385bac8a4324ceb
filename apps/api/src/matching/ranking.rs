//! Job Ranker — orders normalized postings by overlap with the detected skills.
//!
//! match_score = |requirements ∩ detected| / max(1, |detected|) × 100 × relevance
//! where relevance is 1.5 when the posting's industry and the selected field name
//! overlap (case-insensitive substring either way), else 1.0. Range 0 – 150.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::job::JobPosting;

const FIELD_RELEVANCE_BOOST: f64 = 1.5;
const FIELD_RELEVANCE_NEUTRAL: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedJob {
    #[serde(flatten)]
    pub posting: JobPosting,
    pub match_score: f64,
    pub matched_skills: Vec<String>,
    pub field_relevant: bool,
}

/// Splits a comma-separated requirement list into trimmed, lowercase,
/// de-duplicated entries. `None` yields an empty set.
pub fn requirement_set(requirements: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    requirements
        .unwrap_or_default()
        .split(',')
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty() && seen.insert(r.clone()))
        .collect()
}

pub fn is_field_relevant(industry: &str, field: &str) -> bool {
    let industry = industry.trim().to_lowercase();
    let field = field.trim().to_lowercase();
    if industry.is_empty() || field.is_empty() {
        return false;
    }
    industry.contains(&field) || field.contains(&industry)
}

pub fn score_posting(detected: &HashSet<String>, field: &str, posting: JobPosting) -> RankedJob {
    let matched_skills: Vec<String> = requirement_set(posting.job_requirements.as_deref())
        .into_iter()
        .filter(|r| detected.contains(r))
        .collect();

    let skill_match = matched_skills.len() as f64 / detected.len().max(1) as f64;
    let field_relevant = is_field_relevant(&posting.industry, field);
    let relevance = if field_relevant {
        FIELD_RELEVANCE_BOOST
    } else {
        FIELD_RELEVANCE_NEUTRAL
    };

    RankedJob {
        posting,
        match_score: skill_match * 100.0 * relevance,
        matched_skills,
        field_relevant,
    }
}

/// Scores every posting and sorts descending by `match_score`. Nothing is
/// dropped; equal scores keep their input order.
pub fn rank_jobs(detected_skills: &[String], field: &str, postings: Vec<JobPosting>) -> Vec<RankedJob> {
    let detected: HashSet<String> = detected_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut ranked: Vec<RankedJob> = postings
        .into_iter()
        .map(|posting| score_posting(&detected, field, posting))
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::PostingSource;
    use uuid::Uuid;

    fn posting(company: &str, requirements: Option<&str>, industry: &str) -> JobPosting {
        JobPosting {
            id: Uuid::new_v4(),
            source: PostingSource::CompanyPosting,
            company_name: company.to_string(),
            job_description: String::new(),
            job_requirements: requirements.map(String::from),
            location: String::new(),
            salary_range: String::new(),
            industry: industry.to_string(),
        }
    }

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partial_requirement_match_scenario() {
        let ranked = rank_jobs(
            &skills(&["python", "sql"]),
            "Software Development",
            vec![posting("Acme", Some("python, django, aws"), "Software")],
        );
        let job = &ranked[0];
        assert_eq!(job.matched_skills, vec!["python"]);
        assert!(job.field_relevant);
        assert!((job.match_score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_detected_skills_scores_zero_not_nan() {
        let ranked = rank_jobs(
            &[],
            "Software Development",
            vec![posting("Acme", Some("python"), "Software")],
        );
        assert_eq!(ranked[0].match_score, 0.0);
        assert!(ranked[0].matched_skills.is_empty());
    }

    #[test]
    fn test_missing_requirements_count_as_empty() {
        let ranked = rank_jobs(
            &skills(&["python"]),
            "Data Science",
            vec![posting("Initech", None, "Finance")],
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].match_score, 0.0);
        assert!(!ranked[0].field_relevant);
    }

    #[test]
    fn test_sorted_descending_and_nothing_dropped() {
        let ranked = rank_jobs(
            &skills(&["python", "sql"]),
            "Data Science",
            vec![
                posting("None", Some("cobol"), "Banking"),
                posting("Half", Some("python"), "Retail"),
                posting("Full", Some("python, sql"), "Retail"),
                posting("Boosted", Some("sql"), "data science"),
            ],
        );
        let order: Vec<&str> = ranked.iter().map(|r| r.posting.company_name.as_str()).collect();
        // Full 100, Boosted 75, Half 50, None 0
        assert_eq!(order, vec!["Full", "Boosted", "Half", "None"]);
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let ranked = rank_jobs(
            &skills(&["rust"]),
            "Systems",
            vec![
                posting("First", Some("go"), "Cloud"),
                posting("Second", None, "Cloud"),
                posting("Third", Some("rust"), "Cloud"),
                posting("Fourth", Some(""), "Cloud"),
            ],
        );
        let order: Vec<&str> = ranked.iter().map(|r| r.posting.company_name.as_str()).collect();
        assert_eq!(order, vec!["Third", "First", "Second", "Fourth"]);
    }

    #[test]
    fn test_score_bounded_by_150() {
        let detected = skills(&["python", "sql"]);
        let ranked = rank_jobs(
            &detected,
            "Software Development",
            vec![
                posting("A", Some("python, sql, python, SQL , sql"), "software development"),
                posting("B", Some("Python,Sql"), "Software"),
                posting("C", Some(",,,"), "Software"),
            ],
        );
        for job in &ranked {
            assert!((0.0..=150.0).contains(&job.match_score), "{}", job.match_score);
        }
        assert!((ranked[0].match_score - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_field_relevance_is_case_insensitive_and_bidirectional() {
        assert!(is_field_relevant("Software", "Software Development"));
        assert!(is_field_relevant("software development services", "Software Development"));
        assert!(is_field_relevant("DATA SCIENCE", "data science"));
        assert!(!is_field_relevant("Finance", "Data Science"));
        assert!(!is_field_relevant("", "Data Science"));
        assert!(!is_field_relevant("   ", "Data Science"));
    }

    #[test]
    fn test_requirement_set_trims_and_dedups() {
        assert_eq!(
            requirement_set(Some(" Python , SQL,python,, ")),
            vec!["python", "sql"]
        );
        assert!(requirement_set(None).is_empty());
    }
}
