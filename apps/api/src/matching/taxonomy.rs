//! Skill taxonomy — the externally loaded field → category → skills resource.
//!
//! Loaded once at startup from JSON and shared as `Arc<SkillTaxonomy>`. Arrays
//! (not maps) carry fields and categories so iteration order is the file order.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the category every field must carry; weighted 40% in the field score.
pub const ESSENTIAL_CATEGORY: &str = "essential";

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("taxonomy is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("taxonomy defines no fields")]
    NoFields,

    #[error("field '{0}' is defined more than once")]
    DuplicateField(String),

    #[error("field '{0}' has no 'essential' category")]
    MissingEssential(String),

    #[error("field '{0}' needs at least one category besides 'essential'")]
    NoSecondaryCategory(String),

    #[error("category '{category}' of field '{field}' lists no skills")]
    EmptyCategory { field: String, category: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldTaxonomy {
    pub name: String,
    pub categories: Vec<SkillCategory>,
}

impl FieldTaxonomy {
    pub fn essential(&self) -> Option<&SkillCategory> {
        self.categories.iter().find(|c| c.name == ESSENTIAL_CATEGORY)
    }

    /// Every skill of every category, first occurrence wins, in taxonomy order.
    pub fn all_skills(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.categories
            .iter()
            .flat_map(|c| c.skills.iter())
            .filter(|s| seen.insert(s.to_lowercase()))
            .cloned()
            .collect()
    }
}

/// Immutable skill taxonomy plus the global synonym table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTaxonomy {
    pub fields: Vec<FieldTaxonomy>,
    /// skill (lowercase) → alternate spellings (lowercase)
    #[serde(default)]
    pub synonyms: HashMap<String, Vec<String>>,
}

impl SkillTaxonomy {
    pub fn from_json_str(raw: &str) -> Result<Self, TaxonomyError> {
        let mut taxonomy: SkillTaxonomy = serde_json::from_str(raw)?;
        taxonomy.synonyms = taxonomy
            .synonyms
            .into_iter()
            .map(|(skill, alts)| {
                (
                    skill.to_lowercase(),
                    alts.into_iter().map(|a| a.to_lowercase()).collect(),
                )
            })
            .collect();
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TaxonomyError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<(), TaxonomyError> {
        if self.fields.is_empty() {
            return Err(TaxonomyError::NoFields);
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            if !names.insert(field.name.to_lowercase()) {
                return Err(TaxonomyError::DuplicateField(field.name.clone()));
            }
            if field.essential().is_none() {
                return Err(TaxonomyError::MissingEssential(field.name.clone()));
            }
            if !field.categories.iter().any(|c| c.name != ESSENTIAL_CATEGORY) {
                return Err(TaxonomyError::NoSecondaryCategory(field.name.clone()));
            }
            if let Some(empty) = field.categories.iter().find(|c| c.skills.is_empty()) {
                return Err(TaxonomyError::EmptyCategory {
                    field: field.name.clone(),
                    category: empty.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Case-insensitive field lookup.
    pub fn field(&self, name: &str) -> Option<&FieldTaxonomy> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name.trim()))
    }
}
