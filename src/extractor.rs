//! # Structured-Field Extraction Module
//!
//! ## Purpose
//! Heuristic extraction of structured fields from normalized complaint text:
//! offence description, IPC section numbers, property description, monetary
//! value, incident date and location.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized (lowercased, cleaned) document text
//! - **Output**: A sparse `ExtractedFields` map; unmatched fields are `None`,
//!   never an error
//! - **Strategy**: Per field, an ordered pattern chain; the primary pattern
//!   is tried first, then alternates in sequence until one produces a valid
//!   match or all are exhausted
//!
//! ## Key Features
//! - Fields are independent: a miss in one never blocks the others
//! - Matches are trimmed and validated (minimum length, real content) before
//!   acceptance; invalid matches are discarded
//! - Section-number phrasings ("Section 420", "420 IPC", "u/s 420") are
//!   canonicalized into numeric+optional-letter tokens, validated against
//!   `^\d+[A-Za-z]?$` and deduplicated preserving first-seen order

use crate::config::ExtractionConfig;
use crate::errors::{AnalysisError, Result};
use crate::utils::TextUtils;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structured fields recovered from a document. Partial success is expected
/// and normal; every field is independently optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Short description of the alleged offence
    pub offence_summary: Option<String>,
    /// Canonical IPC section tokens, e.g. `["379", "304A"]`; empty when none
    /// were mentioned, never absent
    pub section_numbers: Vec<String>,
    /// Description of affected property
    pub property_description: Option<String>,
    /// Monetary value mentioned in the complaint, in rupees
    pub monetary_value: Option<f64>,
    /// Incident date as written in the document
    pub incident_date: Option<String>,
    /// Incident or complainant location
    pub location: Option<String>,
}

/// Ordered pattern chain for one field: primary first, then alternates
struct FieldPatterns {
    field: &'static str,
    patterns: Vec<Regex>,
}

impl FieldPatterns {
    fn compile(field: &'static str, sources: &[&str]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(sources.len());
        for source in sources {
            patterns.push(Regex::new(source).map_err(|e| AnalysisError::PatternCompilation {
                field: field.to_string(),
                details: e.to_string(),
            })?);
        }
        Ok(Self { field, patterns })
    }

    /// Run the chain, short-circuiting on the first pattern whose capture
    /// survives validation.
    fn first_match(&self, text: &str, config: &ExtractionConfig) -> Option<String> {
        for pattern in &self.patterns {
            if let Some(captures) = pattern.captures(text) {
                if let Some(value) = captures.get(1) {
                    let trimmed = value.as_str().trim().trim_matches(|c: char| c == ',');
                    if trimmed.len() >= config.min_field_length && TextUtils::has_content(trimmed)
                    {
                        return Some(TextUtils::truncate(trimmed, config.max_field_length));
                    }
                    tracing::debug!(
                        "Discarding invalid '{}' match: {:?}",
                        self.field,
                        trimmed
                    );
                }
            }
        }
        None
    }
}

/// Regex-chain field extractor
pub struct FieldExtractor {
    config: ExtractionConfig,
    offence: FieldPatterns,
    property: FieldPatterns,
    monetary: FieldPatterns,
    date: FieldPatterns,
    location: FieldPatterns,
    section_patterns: Vec<Regex>,
    section_token: Regex,
}

impl FieldExtractor {
    /// Create a new extractor, compiling all pattern chains up front
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let offence = FieldPatterns::compile(
            "offence_summary",
            &[
                // Primary: verb phrases introducing the allegation
                r"(?:committed|accused of|charged with|alleged to have committed)\s+((?:[a-z][a-z-]*\s?)+?)(?:\s+(?:under|u/s|against|on|at|in)\b|[.!?,]|$)",
                // Alternate: nominal phrasings
                r"(?:offence of|crime of|complaint (?:of|regarding)|case of)\s+((?:[a-z][a-z-]*\s?)+?)(?:\s+under\b|[.!?,]|$)",
                r"(?:victim of)\s+((?:[a-z][a-z-]*\s?)+?)(?:[.!?,]|$)",
            ],
        )?;

        let property = FieldPatterns::compile(
            "property_description",
            &[
                r"(?:stole|stolen|theft of|robbed (?:me )?of|snatched|misappropriated|took away)\s+(?:my|his|her|their|our|the|a|an)?\s*([a-z0-9][a-z0-9\s,-]*?)(?:\s+(?:worth|valued|from|at|on|belonging)\b|[.!?]|$)",
                r"property\s+(?:being|namely|consisting of|described as)\s+([a-z0-9][a-z0-9\s,-]*?)(?:[.!?]|$)",
            ],
        )?;

        let monetary = FieldPatterns::compile(
            "monetary_value",
            &[
                r"(?:rs\.?|rupees|inr)\s*([0-9][0-9,]*(?:\.[0-9]+)?)",
                r"(?:worth|valued at|amounting to|amount of)\s+(?:rs\.?|rupees|inr)?\s*([0-9][0-9,]*(?:\.[0-9]+)?)",
            ],
        )?;

        let date = FieldPatterns::compile(
            "incident_date",
            &[
                r"\b([0-9]{1,2}[/-][0-9]{1,2}[/-][0-9]{2,4})\b",
                r"\b([0-9]{4}-[0-9]{2}-[0-9]{2})\b",
                r"\b([0-9]{1,2}(?:st|nd|rd|th)?\s+(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+[0-9]{4})\b",
            ],
        )?;

        let location = FieldPatterns::compile(
            "location",
            &[
                r"\b(?:at|near|in)\s+([a-z][a-z\s]*?)\s+(?:police station|district|village|town|city|colony|market)",
                r"police station\s+([a-z][a-z\s]*?)(?:[.!?,]|$)",
                r"(?:residing at|resident of|r/o)\s+([a-z][a-z0-9\s,-]*?)(?:[.!?]|$)",
            ],
        )?;

        // Section phrasing variants. Each is tried over the whole text and
        // all hits are collected, so multiple phrasings of the same section
        // collapse through deduplication.
        let section_sources = [
            r"section\s+([0-9]+[a-z]?)\b",
            r"sec\.?\s*([0-9]+[a-z]?)\b",
            r"u/s\.?\s*([0-9]+[a-z]?)\b",
            r"\b([0-9]+[a-z]?)\s+(?:of\s+(?:the\s+)?)?ipc\b",
        ];
        let mut section_patterns = Vec::with_capacity(section_sources.len());
        for source in &section_sources {
            section_patterns.push(Regex::new(source).map_err(|e| {
                AnalysisError::PatternCompilation {
                    field: "section_numbers".to_string(),
                    details: e.to_string(),
                }
            })?);
        }

        let section_token =
            Regex::new(r"^\d+[A-Za-z]?$").map_err(|e| AnalysisError::PatternCompilation {
                field: "section_numbers".to_string(),
                details: e.to_string(),
            })?;

        Ok(Self {
            config: config.clone(),
            offence,
            property,
            monetary,
            date,
            location,
            section_patterns,
            section_token,
        })
    }

    /// Extract all structured fields from normalized text.
    ///
    /// Field chains are independent; a miss in one never affects the others,
    /// and the result is a sparse map rather than an error.
    pub fn extract(&self, normalized: &str) -> ExtractedFields {
        let monetary_value = self
            .monetary
            .first_match(normalized, &self.config)
            .and_then(|raw| raw.replace(',', "").parse::<f64>().ok());

        ExtractedFields {
            offence_summary: self.offence.first_match(normalized, &self.config),
            section_numbers: self.extract_sections(normalized),
            property_description: self.property.first_match(normalized, &self.config),
            monetary_value,
            incident_date: self.date.first_match(normalized, &self.config),
            location: self.location.first_match(normalized, &self.config),
        }
    }

    /// Collect section tokens across all phrasing variants, canonicalize and
    /// deduplicate them preserving text order of first mention.
    fn extract_sections(&self, normalized: &str) -> Vec<String> {
        let mut hits: Vec<(usize, String)> = Vec::new();

        for pattern in &self.section_patterns {
            for captures in pattern.captures_iter(normalized) {
                if let Some(raw) = captures.get(1) {
                    match self.canonical_section_token(raw.as_str()) {
                        Some(token) => hits.push((raw.start(), token)),
                        None => {
                            // Tokens failing validation are dropped silently.
                            tracing::debug!("Dropping invalid section token {:?}", raw.as_str());
                        }
                    }
                }
            }
        }

        hits.sort_by_key(|(position, _)| *position);

        let mut seen = HashSet::new();
        let mut sections = Vec::new();
        for (_, token) in hits {
            if seen.insert(token.clone()) {
                sections.push(token);
            }
        }
        sections
    }

    /// Canonicalize a raw section mention into a numeric+optional-letter
    /// token, e.g. `"304a"` -> `"304A"`. Returns `None` when the candidate
    /// fails the `^\d+[A-Za-z]?$` validation.
    pub fn canonical_section_token(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if !self.section_token.is_match(trimmed) {
            return None;
        }
        Some(trimmed.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::normalizer::TextNormalizer;

    fn extractor() -> FieldExtractor {
        FieldExtractor::new(&Config::default().extraction).unwrap()
    }

    fn extract(text: &str) -> ExtractedFields {
        let config = Config::default();
        let normalizer = TextNormalizer::new(&config.normalizer);
        extractor().extract(&normalizer.normalize(text))
    }

    #[test]
    fn test_theft_complaint_fixture() {
        let fields = extract("The accused committed theft under Section 379 of IPC");
        assert_eq!(fields.section_numbers, vec!["379"]);
        let offence = fields.offence_summary.expect("offence summary");
        assert!(offence.contains("theft"), "got {:?}", offence);
    }

    #[test]
    fn test_section_token_validation() {
        let e = extractor();
        assert_eq!(e.canonical_section_token("420"), Some("420".to_string()));
        assert_eq!(e.canonical_section_token("304A"), Some("304A".to_string()));
        assert_eq!(e.canonical_section_token("304a"), Some("304A".to_string()));
        assert_eq!(e.canonical_section_token("42X1"), None);
        assert_eq!(e.canonical_section_token("Section"), None);
        assert_eq!(e.canonical_section_token(""), None);
    }

    #[test]
    fn test_section_variants_deduplicate() {
        let fields =
            extract("Booked under Section 420, also written as 420 IPC and u/s 420. See u/s 406.");
        assert_eq!(fields.section_numbers, vec!["420", "406"]);
    }

    #[test]
    fn test_letter_suffix_sections() {
        let fields = extract("Charged u/s 304A and under Section 498A of IPC");
        assert_eq!(fields.section_numbers, vec!["304A", "498A"]);
    }

    #[test]
    fn test_monetary_value_parses_commas() {
        let fields = extract("The accused stole my gold chain worth Rs. 45,000 from the market.");
        assert_eq!(fields.monetary_value, Some(45000.0));
        let property = fields.property_description.expect("property");
        assert!(property.contains("gold chain"), "got {:?}", property);
    }

    #[test]
    fn test_date_and_location() {
        let fields = extract(
            "On 12/03/2023 the accused committed robbery near Lajpat Nagar police station.",
        );
        assert_eq!(fields.incident_date.as_deref(), Some("12/03/2023"));
        let location = fields.location.expect("location");
        assert!(location.contains("lajpat nagar"), "got {:?}", location);
    }

    #[test]
    fn test_fields_are_independent() {
        // No offence verb phrase and no property, but the section still lands.
        let fields = extract("FIR registered u/s 376.");
        assert_eq!(fields.section_numbers, vec!["376"]);
        assert!(fields.offence_summary.is_none());
        assert!(fields.property_description.is_none());
        assert!(fields.monetary_value.is_none());
    }

    #[test]
    fn test_no_legal_content_yields_sparse_map() {
        let fields = extract("The weather was sunny");
        assert!(fields.section_numbers.is_empty());
        assert!(fields.offence_summary.is_none());
        assert!(fields.incident_date.is_none());
        assert!(fields.location.is_none());
    }

    #[test]
    fn test_short_matches_are_discarded() {
        // "of" alone would match the offence chain shape but fails the
        // minimum-length validation.
        let fields = extract("accused of by");
        assert!(fields.offence_summary.is_none());
    }
}
