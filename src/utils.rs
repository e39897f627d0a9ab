//! # Utilities Module
//!
//! ## Purpose
//! Common utility functions used throughout the analysis engine for text
//! handling and lightweight performance monitoring.
//!
//! ## Input/Output Specification
//! - **Input**: Various data types requiring common operations
//! - **Output**: Processed data, timing measurements
//! - **Functions**: Text utilities, performance helpers

use std::time::Instant;

/// Performance timer for measuring operation duration
pub struct Timer {
    start: Instant,
    name: String,
}

/// Text processing utilities
pub struct TextUtils;

impl Timer {
    /// Start a new timer with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Stop timer and log duration
    pub fn stop(self) -> u64 {
        let elapsed = self.elapsed_ms();
        tracing::debug!("Timer '{}' completed in {}ms", self.name, elapsed);
        elapsed
    }
}

impl TextUtils {
    /// Truncate text to specified length with ellipsis
    pub fn truncate(text: &str, max_length: usize) -> String {
        if text.chars().count() <= max_length {
            text.to_string()
        } else {
            let cut: String = text.chars().take(max_length.saturating_sub(3)).collect();
            format!("{}...", cut)
        }
    }

    /// Extract preview text from longer content
    pub fn preview(text: &str, max_words: usize) -> String {
        let words: Vec<&str> = text.split_whitespace().take(max_words).collect();
        let preview = words.join(" ");

        if words.len() >= max_words {
            format!("{}...", preview)
        } else {
            preview
        }
    }

    /// Count words in text
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Check whether a candidate field value carries any usable content
    /// (at least one alphanumeric character)
    pub fn has_content(text: &str) -> bool {
        text.chars().any(|c| c.is_alphanumeric())
    }
}
