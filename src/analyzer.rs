//! # Document Analyzer Module
//!
//! ## Purpose
//! Orchestrates the full analysis pipeline and assembles the final result:
//! normalization, structured-field extraction and category scoring run over
//! the text, section resolution consumes whatever sections were found, and
//! the outputs are merged into one immutable `AnalysisResult`.
//!
//! ## Input/Output Specification
//! - **Input**: Raw document text plus file metadata
//! - **Output**: An `AnalysisResult` created once per request and never
//!   mutated; persistence is the caller's responsibility
//! - **Failure policy**: only totally invalid input (blank text) is rejected
//!   at the entry point. Every component failure past that boundary is
//!   logged and replaced by the component's defined "no result" value, so
//!   one component can never abort the whole assembly
//!
//! ## Control Flow
//! normalize → (extract fields | score categories) → resolve sections →
//! assemble. The extractor and scorer are pure and infallible; the resolver
//! is the only asynchronous boundary and degrades to an empty section list
//! when its provider is unavailable.

use crate::config::Config;
use crate::errors::{AnalysisError, Result};
use crate::extractor::FieldExtractor;
use crate::normalizer::TextNormalizer;
use crate::resolver::{SectionLookup, SectionResolver, StaticSectionTable, WebSearchLookup};
use crate::scorer::{CategoryScorer, UNKNOWN_CATEGORY};
use crate::utils::{TextUtils, Timer};
use crate::{AnalysisRequest, AnalysisResult, FileMetadata};
use std::sync::Arc;
use tracing::{debug, info};

/// End-to-end document analyzer
pub struct DocumentAnalyzer {
    normalizer: TextNormalizer,
    extractor: FieldExtractor,
    scorer: CategoryScorer,
    resolver: SectionResolver,
}

impl DocumentAnalyzer {
    /// Create an analyzer using the lookup provider named in configuration
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let lookup: Arc<dyn SectionLookup> = match config.resolver.provider.as_str() {
            "web" => Arc::new(WebSearchLookup::new(&config.resolver)?),
            _ => Arc::new(StaticSectionTable::new(&config.resolver.sections)),
        };
        Self::with_lookup(config, lookup)
    }

    /// Create an analyzer with an injected lookup provider (used by tests to
    /// substitute mocks)
    pub fn with_lookup(config: Arc<Config>, lookup: Arc<dyn SectionLookup>) -> Result<Self> {
        Ok(Self {
            normalizer: TextNormalizer::new(&config.normalizer),
            extractor: FieldExtractor::new(&config.extraction)?,
            scorer: CategoryScorer::new(&config.scoring),
            resolver: SectionResolver::new(&config.resolver, lookup),
        })
    }

    /// Analyze one document and assemble the immutable result.
    ///
    /// Synchronous except for the resolver's external lookup. Each request
    /// is independent and may run fully in parallel with others.
    pub async fn analyze(&self, text: &str, metadata: FileMetadata) -> Result<AnalysisResult> {
        if text.trim().is_empty() {
            return Err(AnalysisError::InvalidInput {
                reason: "document text is empty".to_string(),
            });
        }

        let request = AnalysisRequest::new(text, metadata);
        let timer = Timer::new("analyze");
        info!(
            "Analyzing request {} ({}, {} words)",
            request.id,
            request.metadata.name,
            TextUtils::word_count(&request.text)
        );

        let normalized = self.normalizer.normalize(&request.text);

        // Extractor and scorer run independently over the normalized text.
        let fields = self.extractor.extract(&normalized);
        let report = self.scorer.score(&normalized);

        let fallback_terms = self.fallback_terms(&report);
        let sections = self
            .resolver
            .resolve(&fields.section_numbers, &fallback_terms)
            .await;

        debug!(
            "Request {}: {} sections, primary offense {}",
            request.id,
            sections.len(),
            report.primary_offense.category
        );
        timer.stop();

        Ok(AnalysisResult {
            request_id: request.id,
            file_name: request.metadata.name,
            extracted_fields: fields,
            primary_offense: report.primary_offense,
            category_scores: report.category_scores,
            sections,
            key_phrases: report.key_phrases,
            important_terms: report.important_terms,
            analyzed_at: chrono::Utc::now(),
        })
    }

    /// Search terms for the derived resolution path when no explicit section
    /// was mentioned: the primary category's evidence keywords
    fn fallback_terms(&self, report: &crate::scorer::ScoreReport) -> Vec<String> {
        if report.primary_offense.category == UNKNOWN_CATEGORY {
            return Vec::new();
        }
        report.primary_offense.evidence_terms.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn analyzer() -> DocumentAnalyzer {
        DocumentAnalyzer::new(Arc::new(Config::default())).unwrap()
    }

    fn metadata() -> FileMetadata {
        FileMetadata {
            name: "complaint.txt".to_string(),
            mime_type: "text/plain".to_string(),
        }
    }

    #[tokio::test]
    async fn test_theft_complaint_end_to_end() {
        let result = analyzer()
            .analyze("The accused committed theft under Section 379 of IPC", metadata())
            .await
            .unwrap();

        assert_eq!(result.extracted_fields.section_numbers, vec!["379"]);
        assert_eq!(result.primary_offense.category, "PROPERTY_CRIME");
        assert!(result.primary_offense.confidence > 0.0);

        assert_eq!(result.sections.len(), 1);
        assert_eq!(result.sections[0].section_number, "379");
        assert_eq!(result.sections[0].confidence, 1.0);
    }

    #[tokio::test]
    async fn test_no_legal_content_yields_unknown_and_empty_sections() {
        let result = analyzer().analyze("The weather was sunny", metadata()).await.unwrap();

        assert_eq!(result.primary_offense.category, UNKNOWN_CATEGORY);
        assert_eq!(result.primary_offense.confidence, 0.0);
        assert!(result.sections.is_empty());
    }

    #[tokio::test]
    async fn test_derived_path_used_without_explicit_sections() {
        let result = analyzer()
            .analyze("My bicycle was stolen from the market, a clear case of theft.", metadata())
            .await
            .unwrap();

        assert!(result.extracted_fields.section_numbers.is_empty());
        assert!(!result.sections.is_empty(), "derived path should find theft sections");
        assert!(result.sections.len() <= 3);
        for section in &result.sections {
            assert!(section.confidence < 1.0, "derived confidence is source-ranked, not 1.0");
        }
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let err = analyzer().analyze("   \n  ", metadata()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_all_result_scores_bounded() {
        let result = analyzer()
            .analyze(
                "FIR: the accused committed robbery and assault, stole cash worth Rs 12,000 \
                 on 01/02/2023 near Karol Bagh police station, booked u/s 392.",
                metadata(),
            )
            .await
            .unwrap();

        assert!((0.0..=1.0).contains(&result.primary_offense.confidence));
        for score in &result.category_scores {
            assert!((0.0..=1.0).contains(&score.confidence));
        }
        for section in &result.sections {
            assert!((0.0..=1.0).contains(&section.confidence));
        }
        for phrase in &result.key_phrases {
            assert!((0.0..=1.0).contains(&phrase.relevance));
        }
    }
}
