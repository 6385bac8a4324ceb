//! Field Analyzer — scores a résumé against every professional field in the taxonomy.
//!
//! Per field:
//! 1. detect skills from the union of all category lists over the section text
//! 2. category score = |detected ∩ category| / |category| × 100
//! 3. field score = essential × 0.4 + mean(other categories) × 0.6

use std::collections::HashSet;

use serde::{Deserialize, Serialize, Serializer};

use crate::matching::extractor::ExtractedText;
use crate::matching::skills::SkillMatcher;
use crate::matching::taxonomy::{FieldTaxonomy, SkillCategory, SkillTaxonomy, ESSENTIAL_CATEGORY};

const ESSENTIAL_WEIGHT: f64 = 0.4;
const SECONDARY_WEIGHT: f64 = 0.6;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub detected: Vec<String>,
    pub missing: Vec<String>,
    pub score: f64, // 0 – 100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldAnalysis {
    pub field: String,
    pub detected_skills: Vec<String>,
    pub missing_essential: Vec<String>,
    pub categories: Vec<CategoryScore>,
    pub score: f64, // 0 – 100
}

/// Field name → score. Serializes as a JSON object whose keys keep taxonomy
/// order, matching `analyses` and `/api/v1/fields`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldScores(Vec<(String, f64)>);

impl FieldScores {
    pub fn get(&self, field: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(field.trim()))
            .map(|(_, score)| *score)
    }
}

impl FromIterator<(String, f64)> for FieldScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for FieldScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, score)| (name, score)))
    }
}

/// Every field's analysis, in taxonomy order, plus the scalar score map.
#[derive(Debug, Clone, Serialize)]
pub struct FieldAnalysisReport {
    pub analyses: Vec<FieldAnalysis>,
    pub scores: FieldScores,
}

impl FieldAnalysisReport {
    /// Highest-scoring field; on a tie the field listed first in the taxonomy wins.
    pub fn best_field(&self) -> Option<&FieldAnalysis> {
        let mut best: Option<&FieldAnalysis> = None;
        for analysis in &self.analyses {
            match best {
                Some(current) if analysis.score <= current.score => {}
                _ => best = Some(analysis),
            }
        }
        best
    }

    pub fn for_field(&self, name: &str) -> Option<&FieldAnalysis> {
        self.analyses
            .iter()
            .find(|a| a.field.eq_ignore_ascii_case(name.trim()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Analyzer
// ────────────────────────────────────────────────────────────────────────────

pub struct FieldAnalyzer<'a> {
    taxonomy: &'a SkillTaxonomy,
    matcher: SkillMatcher<'a>,
}

impl<'a> FieldAnalyzer<'a> {
    pub fn new(taxonomy: &'a SkillTaxonomy) -> Self {
        Self {
            taxonomy,
            matcher: SkillMatcher::new(&taxonomy.synonyms),
        }
    }

    pub fn analyze(&self, extracted: &ExtractedText) -> FieldAnalysisReport {
        let text = extracted.combined_sections();

        let analyses: Vec<FieldAnalysis> = self
            .taxonomy
            .fields
            .iter()
            .map(|field| self.analyze_field(field, &text))
            .collect();

        let scores = analyses
            .iter()
            .map(|a| (a.field.clone(), a.score))
            .collect();

        FieldAnalysisReport { analyses, scores }
    }

    pub fn analyze_field(&self, field: &FieldTaxonomy, text: &str) -> FieldAnalysis {
        let detected_skills = self.matcher.detect(text, &field.all_skills());
        let detected_lower: HashSet<String> =
            detected_skills.iter().map(|s| s.to_lowercase()).collect();

        let categories: Vec<CategoryScore> = field
            .categories
            .iter()
            .map(|category| score_category(category, &detected_lower))
            .collect();

        let essential = categories
            .iter()
            .find(|c| c.category == ESSENTIAL_CATEGORY);
        let essential_score = essential.map(|c| c.score).unwrap_or(0.0);
        let missing_essential = essential.map(|c| c.missing.clone()).unwrap_or_default();

        let secondary: Vec<f64> = categories
            .iter()
            .filter(|c| c.category != ESSENTIAL_CATEGORY)
            .map(|c| c.score)
            .collect();
        // taxonomy validation guarantees at least one secondary category
        let secondary_mean = if secondary.is_empty() {
            0.0
        } else {
            secondary.iter().sum::<f64>() / secondary.len() as f64
        };

        let score = (essential_score * ESSENTIAL_WEIGHT + secondary_mean * SECONDARY_WEIGHT)
            .clamp(0.0, 100.0);

        FieldAnalysis {
            field: field.name.clone(),
            detected_skills,
            missing_essential,
            categories,
            score,
        }
    }
}

fn score_category(category: &SkillCategory, detected_lower: &HashSet<String>) -> CategoryScore {
    let mut seen = HashSet::new();
    let mut detected = Vec::new();
    let mut missing = Vec::new();

    for skill in &category.skills {
        let key = skill.to_lowercase();
        if !seen.insert(key.clone()) {
            continue;
        }
        if detected_lower.contains(&key) {
            detected.push(skill.clone());
        } else {
            missing.push(skill.clone());
        }
    }

    let total = detected.len() + missing.len();
    let score = if total == 0 {
        0.0
    } else {
        detected.len() as f64 / total as f64 * 100.0
    };

    CategoryScore {
        category: category.name.clone(),
        detected,
        missing,
        score,
    }
}
