//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the legal document analysis engine,
//! supporting TOML files and environment variable overrides with validation and
//! type-safe access to all pipeline settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation, table consistency checks
//!
//! ## Key Features
//! - Hierarchical configuration with per-component sections
//! - Crime-category keyword table and IPC section table carried as loaded
//!   configuration data, injected into the scorer and resolver at construction
//!   so fixtures can substitute their own taxonomies
//! - Automatic validation with detailed error messages
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use legal_doc_analysis::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Forged threshold: {}", config.comparator.forged_threshold);
//! ```

use crate::errors::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure containing all pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Text normalization settings
    pub normalizer: NormalizerConfig,
    /// Structured-field extraction settings
    pub extraction: ExtractionConfig,
    /// Keyword and category scoring settings
    pub scoring: ScoringConfig,
    /// IPC section resolution settings
    pub resolver: ResolverConfig,
    /// Document similarity comparison settings
    pub comparator: ComparatorConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Text normalization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Punctuation characters preserved in normalized text, in addition to
    /// word characters, whitespace and hyphens
    pub allowed_punctuation: String,
    /// Enable Unicode NFC normalization before cleaning
    pub enable_unicode_normalization: bool,
}

/// Structured-field extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Minimum accepted length for a trimmed field match
    pub min_field_length: usize,
    /// Maximum captured length for free-text fields (longer matches are cut)
    pub max_field_length: usize,
}

/// Keyword and category scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Crime-category keyword table. Declaration order matters: on equal
    /// combined scores the first-listed category wins.
    pub categories: Vec<CategoryKeywords>,
    /// Divisor applied to keyword match counts when deriving confidence;
    /// confidence = min(match_count / normalizing_factor, 1.0)
    pub normalizing_factor: f64,
    /// Minimum term frequency for a token to count as an important term
    pub term_frequency_threshold: usize,
    /// Relevance assigned to the contextual 3-token window around a keyword
    /// hit (the keyword itself always scores 1.0)
    pub window_relevance: f64,
    /// Maximum number of key phrases retained per document
    pub max_key_phrases: usize,
}

/// One crime category and its weighted keywords
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryKeywords {
    /// Category label, e.g. "PROPERTY_CRIME"
    pub category: String,
    /// Keywords matched against normalized text
    pub keywords: Vec<String>,
}

/// IPC section resolution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Lookup provider: "static" (deterministic table) or "web" (search API)
    pub provider: String,
    /// Static section table rows, used by the static provider and as the
    /// specialization map for explicit matches
    pub sections: Vec<SectionRow>,
    /// Search API base URL for the web provider
    pub search_url: String,
    /// Request timeout in seconds for the web provider
    pub timeout_seconds: u64,
    /// Bounded retry attempts before degrading to an empty result
    pub retry_attempts: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: u64,
    /// Maximum derived-path results returned
    pub max_derived_results: usize,
    /// Base relevance for a derived-path section hit
    pub derived_base_confidence: f64,
    /// Relevance bonus per matching search term, capped so the total never
    /// exceeds 1.0
    pub derived_term_bonus: f64,
}

/// One row of the static IPC section table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRow {
    /// Canonical section token, e.g. "420" or "304A"
    pub section: String,
    /// Human-readable description of the offence
    pub description: String,
    /// Lawyer specialization the section routes to
    pub specialization: String,
}

/// Document similarity comparison configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparatorConfig {
    /// Similarity score above which a candidate document is flagged as
    /// forged. The shipped default of 0.1 is very sensitive; review it
    /// before relying on the verdict.
    pub forged_threshold: f64,
    /// Minimum phrase length in characters for fuzzy phrase comparison
    pub min_phrase_length: usize,
    /// Jaro-Winkler score above which a phrase pair is recorded as evidence
    pub phrase_similarity_threshold: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| AnalysisError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| AnalysisError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("LEGAL_ANALYSIS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(url) = std::env::var("LEGAL_ANALYSIS_SEARCH_URL") {
            self.resolver.search_url = url;
        }
        if let Ok(provider) = std::env::var("LEGAL_ANALYSIS_LOOKUP_PROVIDER") {
            self.resolver.provider = provider;
        }
        if let Ok(threshold) = std::env::var("LEGAL_ANALYSIS_FORGED_THRESHOLD") {
            self.comparator.forged_threshold =
                threshold.parse().map_err(|_| AnalysisError::Config {
                    message: "Invalid value in LEGAL_ANALYSIS_FORGED_THRESHOLD".to_string(),
                })?;
        }
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.scoring.categories.is_empty() {
            return Err(AnalysisError::ValidationFailed {
                field: "scoring.categories".to_string(),
                reason: "Category table cannot be empty".to_string(),
            });
        }

        if self.scoring.normalizing_factor <= 0.0 {
            return Err(AnalysisError::ValidationFailed {
                field: "scoring.normalizing_factor".to_string(),
                reason: "Normalizing factor must be greater than zero".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.comparator.forged_threshold) {
            return Err(AnalysisError::ValidationFailed {
                field: "comparator.forged_threshold".to_string(),
                reason: "Forged threshold must lie in [0, 1]".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.comparator.phrase_similarity_threshold) {
            return Err(AnalysisError::ValidationFailed {
                field: "comparator.phrase_similarity_threshold".to_string(),
                reason: "Phrase similarity threshold must lie in [0, 1]".to_string(),
            });
        }

        match self.resolver.provider.as_str() {
            "static" | "web" => {}
            other => {
                return Err(AnalysisError::ValidationFailed {
                    field: "resolver.provider".to_string(),
                    reason: format!("Unknown provider '{}', expected 'static' or 'web'", other),
                });
            }
        }

        if self.resolver.max_derived_results == 0 {
            return Err(AnalysisError::ValidationFailed {
                field: "resolver.max_derived_results".to_string(),
                reason: "Derived result limit must be greater than zero".to_string(),
            });
        }

        if self.resolver.timeout_seconds == 0 {
            return Err(AnalysisError::ValidationFailed {
                field: "resolver.timeout_seconds".to_string(),
                reason: "Lookup timeout must be greater than zero".to_string(),
            });
        }

        if self.extraction.min_field_length == 0
            || self.extraction.min_field_length > self.extraction.max_field_length
        {
            return Err(AnalysisError::ValidationFailed {
                field: "extraction.min_field_length".to_string(),
                reason: "Minimum field length must be nonzero and not exceed the maximum"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AnalysisError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normalizer: NormalizerConfig {
                allowed_punctuation: ".,!?'-/".to_string(),
                enable_unicode_normalization: true,
            },
            extraction: ExtractionConfig {
                min_field_length: 3,
                max_field_length: 200,
            },
            scoring: ScoringConfig {
                categories: default_category_table(),
                normalizing_factor: 5.0,
                term_frequency_threshold: 2,
                window_relevance: 0.6,
                max_key_phrases: 20,
            },
            resolver: ResolverConfig {
                provider: "static".to_string(),
                sections: default_section_table(),
                search_url: "https://serpapi.example.com/search".to_string(),
                timeout_seconds: 10,
                retry_attempts: 3,
                retry_delay_ms: 500,
                max_derived_results: 3,
                derived_base_confidence: 0.5,
                derived_term_bonus: 0.1,
            },
            comparator: ComparatorConfig {
                forged_threshold: 0.1,
                min_phrase_length: 10,
                phrase_similarity_threshold: 0.8,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

/// Built-in crime-category keyword table. Declaration order is the tie-break
/// order for primary-offense selection.
fn default_category_table() -> Vec<CategoryKeywords> {
    let table: &[(&str, &[&str])] = &[
        (
            "VIOLENT_CRIME",
            &["murder", "assault", "hurt", "injury", "death", "attack", "kill", "wound"],
        ),
        (
            "PROPERTY_CRIME",
            &["theft", "robbery", "burglary", "stolen", "stole", "larceny", "dacoity", "snatching", "trespass"],
        ),
        (
            "FRAUD",
            &["cheating", "fraud", "forgery", "forged", "deception", "misappropriation", "embezzlement", "counterfeit"],
        ),
        (
            "HARASSMENT",
            &["harassment", "stalking", "threat", "intimidation", "abuse", "blackmail", "extortion"],
        ),
        (
            "CYBER_CRIME",
            &["hacking", "phishing", "otp", "cyber", "online", "malware", "password"],
        ),
        (
            "FAMILY_DISPUTE",
            &["dowry", "cruelty", "divorce", "maintenance", "custody", "domestic"],
        ),
    ];

    table
        .iter()
        .map(|(category, keywords)| CategoryKeywords {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}

/// Built-in IPC section table with specialization routing labels
fn default_section_table() -> Vec<SectionRow> {
    let rows: &[(&str, &str, &str)] = &[
        ("302", "Punishment for murder", "Criminal Law"),
        ("304A", "Causing death by negligence", "Criminal Law"),
        ("307", "Attempt to murder", "Criminal Law"),
        ("323", "Punishment for voluntarily causing hurt", "Criminal Law"),
        ("324", "Voluntarily causing hurt by dangerous weapons", "Criminal Law"),
        ("354", "Assault or criminal force to woman with intent to outrage her modesty", "Criminal Law"),
        ("376", "Punishment for rape", "Criminal Law"),
        ("379", "Punishment for theft", "Property Crime"),
        ("380", "Theft in dwelling house", "Property Crime"),
        ("392", "Punishment for robbery", "Property Crime"),
        ("395", "Punishment for dacoity", "Property Crime"),
        ("406", "Punishment for criminal breach of trust", "Fraud and Financial Crime"),
        ("415", "Cheating", "Fraud and Financial Crime"),
        ("420", "Cheating and dishonestly inducing delivery of property", "Fraud and Financial Crime"),
        ("465", "Punishment for forgery", "Fraud and Financial Crime"),
        ("468", "Forgery for purpose of cheating", "Fraud and Financial Crime"),
        ("498A", "Husband or relative of husband subjecting woman to cruelty", "Family Law"),
        ("506", "Punishment for criminal intimidation", "Criminal Law"),
        ("509", "Word, gesture or act intended to insult the modesty of a woman", "Criminal Law"),
    ];

    rows.iter()
        .map(|(section, description, specialization)| SectionRow {
            section: section.to_string(),
            description: description.to_string(),
            specialization: specialization.to_string(),
        })
        .collect()
}
