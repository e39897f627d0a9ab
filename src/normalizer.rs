//! # Text Normalization Module
//!
//! ## Purpose
//! First stage of the analysis pipeline: converts raw uploaded document text
//! into a clean, lowercase, single-spaced form that the extractor and scorer
//! operate on.
//!
//! ## Input/Output Specification
//! - **Input**: Raw text of any length, possibly containing control
//!   characters, multi-language content and arbitrary punctuation
//! - **Output**: Normalized text: lowercased, allow-listed characters only,
//!   runs of whitespace collapsed to single spaces, trimmed
//! - **Failure modes**: None; normalization always succeeds, including on
//!   empty input (returns an empty string)
//!
//! Normalization is idempotent: applying it twice yields the same result as
//! applying it once.

use crate::config::NormalizerConfig;
use unicode_normalization::UnicodeNormalization;

/// Text normalizer with a configurable character allow-list
pub struct TextNormalizer {
    allowed_punctuation: Vec<char>,
    enable_unicode_normalization: bool,
}

impl TextNormalizer {
    /// Create a new normalizer from configuration
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            allowed_punctuation: config.allowed_punctuation.chars().collect(),
            enable_unicode_normalization: config.enable_unicode_normalization,
        }
    }

    /// Normalize raw document text
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text: String = if self.enable_unicode_normalization {
            text.nfc().collect()
        } else {
            text.to_string()
        };

        let lowered = text.to_lowercase();

        // Strip everything outside the allow-list, replacing stripped runs
        // with spaces so words never merge.
        let mut cleaned = String::with_capacity(lowered.len());
        for c in lowered.chars() {
            if self.is_allowed(c) {
                cleaned.push(c);
            } else {
                cleaned.push(' ');
            }
        }

        // Collapse whitespace runs to a single space.
        let mut normalized = String::with_capacity(cleaned.len());
        let mut prev_space = false;
        for c in cleaned.chars() {
            if c.is_whitespace() {
                if !prev_space {
                    normalized.push(' ');
                }
                prev_space = true;
            } else {
                normalized.push(c);
                prev_space = false;
            }
        }

        normalized.trim().to_string()
    }

    fn is_allowed(&self, c: char) -> bool {
        c.is_alphanumeric() || c.is_whitespace() || c == '-' || self.allowed_punctuation.contains(&c)
    }
}
