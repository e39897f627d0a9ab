//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the legal document analysis engine, providing
//! structured error types and conversion utilities for all pipeline components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from normalization, extraction, scoring,
//!   section resolution and document comparison
//! - **Output**: Structured error types with context
//! - **Error Categories**: Configuration, Input, Extraction, Resolution, Network
//!
//! ## Key Features
//! - Hierarchical error types with detailed context
//! - Automatic error conversion and chaining
//! - Recoverability classification for retry decisions
//! - Structured logging integration
//!
//! Note that most analysis-pipeline failures are deliberately NOT errors:
//! a field that cannot be extracted is a `None`, an unavailable lookup
//! provider yields an empty section list, and an empty comparison input
//! yields a degraded-mode verdict. Only conditions that prevent the engine
//! from being constructed or invoked at all surface as `AnalysisError`.

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for the legal document analysis engine
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors for configuration fields
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Totally invalid input at an entry point (e.g. blank analysis text)
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A field-extraction or section pattern failed to compile
    #[error("Pattern compilation failed for field '{field}': {details}")]
    PatternCompilation { field: String, details: String },

    /// Network-related errors from the section lookup provider
    #[error("Network error: {details}")]
    NetworkError { details: String },

    /// Rate limiting from the lookup provider
    #[error("Rate limit exceeded for {source_name}")]
    RateLimitExceeded {
        source_name: String,
        retry_after_seconds: Option<u64>,
    },

    /// Lookup provider unavailable after retries
    #[error("Section lookup provider '{provider}' is unavailable: {details}")]
    LookupUnavailable { provider: String, details: String },

    /// Data parsing errors from lookup responses
    #[error("Failed to parse data from {source_name}: {details}")]
    DataParsing {
        source_name: String,
        details: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization failed: {message}")]
    SerializationFailed { message: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AnalysisError {
    /// Check if the error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalysisError::NetworkError { .. }
                | AnalysisError::RateLimitExceeded { .. }
                | AnalysisError::LookupUnavailable { .. }
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            AnalysisError::Config { .. } | AnalysisError::ValidationFailed { .. } => {
                "configuration"
            }
            AnalysisError::InvalidInput { .. } => "input",
            AnalysisError::PatternCompilation { .. } => "extraction",
            AnalysisError::NetworkError { .. }
            | AnalysisError::RateLimitExceeded { .. }
            | AnalysisError::LookupUnavailable { .. }
            | AnalysisError::DataParsing { .. } => "resolution",
            AnalysisError::SerializationFailed { .. } | AnalysisError::Internal { .. } => {
                "generic"
            }
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::SerializationFailed {
            message: format!("JSON serialization error: {}", err),
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        AnalysisError::NetworkError {
            details: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AnalysisError {
    fn from(err: toml::de::Error) -> Self {
        AnalysisError::Config {
            message: format!("TOML parse error: {}", err),
        }
    }
}

impl From<regex::Error> for AnalysisError {
    fn from(err: regex::Error) -> Self {
        AnalysisError::Internal {
            message: format!("Regex error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = AnalysisError::InvalidInput {
            reason: "empty text".to_string(),
        };
        assert_eq!(err.category(), "input");
        assert!(!err.is_recoverable());

        let err = AnalysisError::LookupUnavailable {
            provider: "web-search".to_string(),
            details: "timeout".to_string(),
        };
        assert_eq!(err.category(), "resolution");
        assert!(err.is_recoverable());
    }
}
