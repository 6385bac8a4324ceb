//! PDF Text Extractor — turns an uploaded résumé into normalized full text plus
//! heuristic section buckets.
//!
//! Classification is whole-page: each page lands in exactly one bucket, chosen by
//! the first section (in `SECTION_TRIGGERS` order) whose trigger word appears
//! anywhere on the page. A page mixing education and experience content goes
//! entirely to education.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::matching::normalize::normalize;

/// First five bytes of every PDF file.
pub const PDF_SIGNATURE: &[u8; 5] = b"%PDF-";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// An uploaded file as received, before any validation.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    /// Declared media type, if the client sent one. Advisory only.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Résumé section buckets, declared in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Education,
    Experience,
    Skills,
    Projects,
    Other,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Education,
        Section::Experience,
        Section::Skills,
        Section::Projects,
        Section::Other,
    ];
}

/// Trigger words per section, checked top to bottom; no match means `Other`.
const SECTION_TRIGGERS: &[(Section, &[&str])] = &[
    (Section::Education, &["education", "academic"]),
    (Section::Experience, &["experience", "work"]),
    (Section::Skills, &["skill", "technical"]),
    (Section::Projects, &["project"]),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub full_text: String,
    /// Always holds all five sections; unmatched ones are empty strings.
    pub sections: BTreeMap<Section, String>,
}

impl ExtractedText {
    /// Every section's text, in section order, joined by single spaces.
    pub fn combined_sections(&self) -> String {
        self.sections
            .values()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    /// Bad input caught before parsing.
    Validation,
    /// The bytes are not a readable PDF.
    Parse,
    /// A readable PDF with nothing to extract (typically scanned images).
    Empty,
    /// The extraction worker could not run; retrying may succeed.
    Runtime,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("'{0}' is not a PDF; only .pdf files are accepted")]
    UnsupportedExtension(String),

    #[error("uploaded file is empty")]
    EmptyFile,

    #[error("uploaded file is {size} bytes; the maximum is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// The request body hit the server's size cap before the file was fully read.
    #[error("uploaded file exceeds the maximum of {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("file does not start with a PDF signature")]
    MissingSignature,

    #[error("corrupt file: {0}")]
    Corrupt(String),

    #[error("failed to read file: {0}")]
    Unreadable(String),

    #[error("no extractable text found; upload a text-based PDF rather than a scanned image")]
    NoExtractableText,

    #[error("PDF extraction runtime unavailable: {0}")]
    RuntimeUnavailable(String),
}

impl ExtractionError {
    pub fn kind(&self) -> ExtractionErrorKind {
        match self {
            ExtractionError::UnsupportedExtension(_)
            | ExtractionError::EmptyFile
            | ExtractionError::TooLarge { .. }
            | ExtractionError::BodyTooLarge { .. } => ExtractionErrorKind::Validation,
            ExtractionError::MissingSignature
            | ExtractionError::Corrupt(_)
            | ExtractionError::Unreadable(_) => ExtractionErrorKind::Parse,
            ExtractionError::NoExtractableText => ExtractionErrorKind::Empty,
            ExtractionError::RuntimeUnavailable(_) => ExtractionErrorKind::Runtime,
        }
    }

    /// Only runtime failures are worth retrying with the same file.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ExtractionErrorKind::Runtime
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Checks extension and size. Runs before any byte of the file is parsed.
pub fn validate_upload(doc: &RawDocument, max_bytes: usize) -> Result<(), ExtractionError> {
    if !doc.filename.trim().to_lowercase().ends_with(".pdf") {
        return Err(ExtractionError::UnsupportedExtension(doc.filename.clone()));
    }
    if doc.is_empty() {
        return Err(ExtractionError::EmptyFile);
    }
    if doc.len() > max_bytes {
        return Err(ExtractionError::TooLarge {
            size: doc.len(),
            limit: max_bytes,
        });
    }
    if let Some(declared) = doc.content_type.as_deref() {
        if !is_pdf_like(declared) {
            warn!(
                filename = %doc.filename,
                content_type = declared,
                "Declared media type is not PDF; trusting the .pdf extension"
            );
        }
    }
    Ok(())
}

fn is_pdf_like(content_type: &str) -> bool {
    let lower = content_type.to_lowercase();
    lower.contains("pdf") || lower.starts_with("application/octet-stream")
}

/// Validates, parses and sections a PDF. All-or-nothing: any failure discards
/// whatever pages were already read.
pub fn extract_text(doc: &RawDocument, max_bytes: usize) -> Result<ExtractedText, ExtractionError> {
    validate_upload(doc, max_bytes)?;

    if !doc.bytes.starts_with(PDF_SIGNATURE) {
        return Err(ExtractionError::MissingSignature);
    }

    let pages = read_pages(&doc.bytes)?;
    debug!(filename = %doc.filename, pages = pages.len(), "PDF pages read");

    sections_from_pages(&pages)
}

/// `pdf_extract` can panic on malformed input, so the call is fenced with
/// `catch_unwind` and both failure paths report a corrupt file.
fn read_pages(data: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Corrupt(e.to_string())),
        Err(_) => Err(ExtractionError::Corrupt(
            "PDF parser aborted on malformed document".to_string(),
        )),
    }
}

/// Classifies a page by its lowercase text.
pub fn classify_page(page_lower: &str) -> Section {
    SECTION_TRIGGERS
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| page_lower.contains(t)))
        .map(|(section, _)| *section)
        .unwrap_or(Section::Other)
}

/// Buckets raw page texts into sections and builds the normalized result.
pub fn sections_from_pages(pages: &[String]) -> Result<ExtractedText, ExtractionError> {
    let mut raw_sections: BTreeMap<Section, Vec<String>> = BTreeMap::new();
    let mut all_pages = Vec::with_capacity(pages.len());

    for page in pages {
        let text = page.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            continue;
        }
        let section = classify_page(&text.to_lowercase());
        raw_sections.entry(section).or_default().push(text.clone());
        all_pages.push(text);
    }

    let full_text = normalize(all_pages.join(" ").as_str());
    if full_text.is_empty() {
        return Err(ExtractionError::NoExtractableText);
    }

    let sections = Section::ALL
        .iter()
        .map(|section| {
            let text = raw_sections
                .get(section)
                .map(|texts| normalize(texts.join(" ").as_str()))
                .unwrap_or_default();
            (*section, text)
        })
        .collect();

    Ok(ExtractedText {
        full_text,
        sections,
    })
}
