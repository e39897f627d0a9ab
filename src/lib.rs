//! # Legal Document Analysis Engine
//!
//! ## Overview
//! This library implements a heuristic analysis engine for free-text legal
//! documents (complaints, FIRs, case descriptions): structured-field
//! extraction, crime-category classification, IPC section resolution and
//! document similarity comparison for forgery detection.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `normalizer`: Text cleaning and normalization
//! - `extractor`: Regex-chain extraction of structured fields
//! - `scorer`: Keyword/category scoring, key phrases and salient terms
//! - `resolver`: IPC section resolution against a pluggable lookup provider
//! - `comparator`: Document similarity scoring and forgery verdicts
//! - `analyzer`: Pipeline orchestration and result assembly
//! - `config`: Configuration management and injected data tables
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Plain document text (supplied by an upstream OCR/extraction
//!   service) plus file metadata
//! - **Output**: Immutable `AnalysisResult` and `SimilarityVerdict` records;
//!   persistence, HTTP routing and session state belong to the caller
//! - **Guarantees**: every confidence/score lies in [0, 1]; section lists
//!   are empty when undetermined, never missing
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use legal_doc_analysis::{Config, DocumentAnalyzer, FileMetadata};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::from_file("config.toml")?);
//!     let analyzer = DocumentAnalyzer::new(config)?;
//!     let metadata = FileMetadata {
//!         name: "complaint.txt".to_string(),
//!         mime_type: "text/plain".to_string(),
//!     };
//!     let result = analyzer
//!         .analyze("The accused committed theft under Section 379 of IPC", metadata)
//!         .await?;
//!     println!("Primary offense: {}", result.primary_offense.category);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod analyzer;
pub mod comparator;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod normalizer;
pub mod resolver;
pub mod scorer;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use analyzer::DocumentAnalyzer;
pub use comparator::{
    ComparisonDetail, DocumentComparator, PlaceholderModel, SeededModel, SimilarityModel,
    SimilarityVerdict,
};
pub use config::Config;
pub use errors::{AnalysisError, Result};
pub use extractor::ExtractedFields;
pub use resolver::{SectionDetail, SectionLookup, StaticSectionTable, WebSearchLookup};
pub use scorer::{CategoryScore, KeyPhrase, UNKNOWN_CATEGORY};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for analysis requests
pub type RequestId = Uuid;

/// Metadata of the uploaded file a document came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Original file name
    pub name: String,
    /// MIME type reported by the uploader
    pub mime_type: String,
}

/// One analysis request; immutable, created per upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Unique request identifier
    pub id: RequestId,
    /// Raw document text
    pub text: String,
    /// File metadata
    pub metadata: FileMetadata,
    /// When the request was received
    pub received_at: DateTime<Utc>,
}

impl AnalysisRequest {
    /// Create a new request with a fresh identifier
    pub fn new(text: impl Into<String>, metadata: FileMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            metadata,
            received_at: Utc::now(),
        }
    }
}

/// The assembled, immutable output of one analysis.
///
/// Created once per request and never mutated; downstream persistence is the
/// caller's responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The request this result was assembled for
    pub request_id: RequestId,
    /// Original file name, carried for display
    pub file_name: String,
    /// Sparse structured fields recovered from the text
    pub extracted_fields: ExtractedFields,
    /// The selected primary offense classification
    pub primary_offense: CategoryScore,
    /// All category scores, ranked descending
    pub category_scores: Vec<CategoryScore>,
    /// Resolved IPC sections; empty when undetermined, never missing
    pub sections: Vec<SectionDetail>,
    /// Key phrases with relevance scores
    pub key_phrases: Vec<KeyPhrase>,
    /// High-frequency salient terms
    pub important_terms: Vec<String>,
    /// When the analysis completed
    pub analyzed_at: DateTime<Utc>,
}
