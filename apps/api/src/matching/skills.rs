//! Skill Matcher — finds which candidate skills a block of text mentions.
//!
//! Matching is sentence-scoped substring containment on normalized text, with
//! the taxonomy's synonym table consulted for alternate spellings. Substring
//! semantics are permissive: "java" is found inside "javascript".

use std::collections::{HashMap, HashSet};

use crate::matching::normalize::normalize;

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

pub struct SkillMatcher<'a> {
    synonyms: &'a HashMap<String, Vec<String>>,
}

impl<'a> SkillMatcher<'a> {
    /// `synonyms` must be keyed by lowercase skill name (as `SkillTaxonomy` stores it).
    pub fn new(synonyms: &'a HashMap<String, Vec<String>>) -> Self {
        Self { synonyms }
    }

    /// Returns the candidates found in `text`, in candidate order, without duplicates.
    pub fn detect(&self, text: &str, candidates: &[String]) -> Vec<String> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut detected = Vec::new();

        for skill in candidates {
            let needle = skill.trim().to_lowercase();
            if needle.is_empty() || !seen.insert(needle.clone()) {
                continue;
            }
            let alternates = self.synonyms.get(&needle).map(Vec::as_slice).unwrap_or(&[]);

            let found = sentences.iter().any(|sentence| {
                sentence.contains(&needle)
                    || alternates
                        .iter()
                        .any(|alt| !alt.is_empty() && sentence.contains(alt.as_str()))
            });

            if found {
                detected.push(skill.clone());
            }
        }

        detected
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    text.split(SENTENCE_TERMINATORS.as_slice())
        .map(normalize)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn synonyms() -> HashMap<String, Vec<String>> {
        HashMap::from([
            ("javascript".to_string(), skills(&["js", "ecmascript"])),
            ("machine learning".to_string(), skills(&["ml"])),
        ])
    }

    #[test]
    fn test_direct_match_is_case_insensitive() {
        let table = synonyms();
        let matcher = SkillMatcher::new(&table);
        let found = matcher.detect("I know Python and Git", &skills(&["python", "git", "rust"]));
        assert_eq!(found, skills(&["python", "git"]));
    }

    #[test]
    fn test_synonym_match() {
        let table = synonyms();
        let matcher = SkillMatcher::new(&table);
        let found = matcher.detect(
            "Built dashboards in JS. Applied ML to churn data!",
            &skills(&["javascript", "machine learning"]),
        );
        assert_eq!(found, skills(&["javascript", "machine learning"]));
    }

    #[test]
    fn test_substring_matches_are_permissive() {
        let table = HashMap::new();
        let matcher = SkillMatcher::new(&table);
        let found = matcher.detect("Senior JavaScript engineer", &skills(&["java"]));
        assert_eq!(found, skills(&["java"]));
    }

    #[test]
    fn test_multi_word_skill_does_not_span_sentences() {
        let table = HashMap::new();
        let matcher = SkillMatcher::new(&table);
        let candidates = skills(&["data structures"]);
        assert!(matcher.detect("Big data. Structures matter", &candidates).is_empty());
        assert_eq!(
            matcher.detect("Strong in data   structures", &candidates),
            candidates
        );
    }

    #[test]
    fn test_empty_inputs_yield_nothing() {
        let table = synonyms();
        let matcher = SkillMatcher::new(&table);
        assert!(matcher.detect("python everywhere", &[]).is_empty());
        assert!(matcher.detect("", &skills(&["python"])).is_empty());
        assert!(matcher.detect("...!?", &skills(&["python"])).is_empty());
    }

    #[test]
    fn test_blank_and_duplicate_candidates_are_ignored() {
        let table = HashMap::new();
        let matcher = SkillMatcher::new(&table);
        let found = matcher.detect("python", &skills(&["", "  ", "python", "Python"]));
        assert_eq!(found, skills(&["python"]));
    }

    #[test]
    fn test_more_text_never_removes_detections() {
        let table = synonyms();
        let matcher = SkillMatcher::new(&table);
        let candidates = skills(&["python", "git", "javascript", "machine learning", "sql"]);
        let base = "Python developer. Uses Git daily";
        let before = matcher.detect(base, &candidates);

        for extra in ["", " and JS", ". Learning ML!", "? SQL too.", " !!! "] {
            let extended = format!("{base}{extra}");
            let after = matcher.detect(&extended, &candidates);
            for skill in &before {
                assert!(after.contains(skill), "{skill} lost after appending {extra:?}");
            }
        }
    }
}
