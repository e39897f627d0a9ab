//! # Keyword & Category Scoring Module
//!
//! ## Purpose
//! Scores normalized document text against a weighted crime-category keyword
//! table, extracts key phrases around keyword hits, surfaces high-frequency
//! salient terms and selects the primary offense classification.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized document text; injected category keyword table
//! - **Output**: Ranked per-category scores, the primary offense, key phrases
//!   with relevance and a list of important terms
//! - **Guarantee**: every confidence lies in `[0, 1]`, including the
//!   zero-match case (confidence 0)
//!
//! ## Key Features
//! - Category table is configuration data, not code: fixtures can substitute
//!   their own taxonomy at construction time
//! - Per-category confidence is `min(match_count / normalizing_factor, 1.0)`
//! - Key-phrase extraction captures a 3-token window (previous, hit, next)
//!   around each keyword hit; the keyword itself scores relevance 1.0, the
//!   contextual window a configured lower value
//! - Term-frequency salience over the single document: tokens at or above
//!   the frequency threshold become "important terms" (inverse document
//!   frequency is meaningless for a single document)
//! - Primary-offense selection weights keyword hits 2x when they appear in
//!   key phrases and 1x when they appear in important terms; ties break to
//!   the first-declared category

use crate::config::{CategoryKeywords, ScoringConfig};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Category label used when no category scores above zero
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// Score for one crime category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Category label from the injected table
    pub category: String,
    /// Raw keyword match count
    pub raw_score: f64,
    /// Bounded confidence in [0, 1]
    pub confidence: f64,
    /// Keywords that matched, in text order of first occurrence
    pub evidence_terms: Vec<String>,
}

/// A key phrase candidate with its relevance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPhrase {
    /// The phrase text
    pub term: String,
    /// Relevance in [0, 1]: 1.0 for an exact keyword hit, lower for the
    /// contextual window around it
    pub relevance: f64,
}

/// Full scoring output for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// All category scores, ranked by combined score descending; ties keep
    /// table declaration order
    pub category_scores: Vec<CategoryScore>,
    /// The selected primary offense
    pub primary_offense: CategoryScore,
    /// Key phrases around keyword hits
    pub key_phrases: Vec<KeyPhrase>,
    /// High-frequency salient terms
    pub important_terms: Vec<String>,
}

/// Keyword-table driven category scorer
pub struct CategoryScorer {
    table: Vec<CategoryKeywords>,
    normalizing_factor: f64,
    term_frequency_threshold: usize,
    window_relevance: f64,
    max_key_phrases: usize,
    word_regex: Regex,
    stopwords: HashSet<&'static str>,
}

impl CategoryScorer {
    /// Create a new scorer with an injected category table
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            table: config.categories.clone(),
            normalizing_factor: config.normalizing_factor,
            term_frequency_threshold: config.term_frequency_threshold,
            window_relevance: config.window_relevance,
            max_key_phrases: config.max_key_phrases,
            word_regex: Regex::new(r"\b\w+\b").expect("static word pattern"),
            stopwords: default_stopwords(),
        }
    }

    /// Score normalized text against the category table
    pub fn score(&self, normalized: &str) -> ScoreReport {
        let tokens: Vec<&str> = self
            .word_regex
            .find_iter(normalized)
            .map(|m| m.as_str())
            .collect();

        let keyword_set = self.keyword_set();
        let key_phrases = self.extract_key_phrases(&tokens, &keyword_set);
        let important_terms = self.important_terms(&tokens);

        let phrase_terms: HashSet<&str> = key_phrases
            .iter()
            .filter(|p| p.relevance >= 1.0)
            .map(|p| p.term.as_str())
            .collect();
        let important_set: HashSet<&str> =
            important_terms.iter().map(|t| t.as_str()).collect();

        // Score each category in declaration order; stable sort keeps that
        // order on ties, which makes first-declared the winner.
        let mut scored: Vec<(f64, CategoryScore)> = Vec::with_capacity(self.table.len());
        for entry in &self.table {
            let (match_count, evidence_terms) = self.match_category(normalized, &tokens, entry);

            let mut combined = match_count as f64;
            for keyword in &evidence_terms {
                if phrase_terms.contains(keyword.as_str()) {
                    combined += 2.0;
                }
                if important_set.contains(keyword.as_str()) {
                    combined += 1.0;
                }
            }

            let confidence = ((match_count as f64) / self.normalizing_factor).min(1.0);
            scored.push((
                combined,
                CategoryScore {
                    category: entry.category.clone(),
                    raw_score: match_count as f64,
                    confidence,
                    evidence_terms,
                },
            ));
        }

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let primary_offense = match scored.first() {
            Some((combined, score)) if *combined > 0.0 => score.clone(),
            _ => CategoryScore {
                category: UNKNOWN_CATEGORY.to_string(),
                raw_score: 0.0,
                confidence: 0.0,
                evidence_terms: Vec::new(),
            },
        };

        let category_scores = scored.into_iter().map(|(_, score)| score).collect();

        tracing::debug!(
            "Scored document: primary={} confidence={:.2}",
            primary_offense.category,
            primary_offense.confidence
        );

        ScoreReport {
            category_scores,
            primary_offense,
            key_phrases,
            important_terms,
        }
    }

    /// Count keyword matches for one category and collect evidence terms in
    /// text order of first occurrence.
    fn match_category(
        &self,
        normalized: &str,
        tokens: &[&str],
        entry: &CategoryKeywords,
    ) -> (usize, Vec<String>) {
        let mut match_count = 0;
        let mut evidence: Vec<(usize, String)> = Vec::new();

        for keyword in &entry.keywords {
            let (count, first_position) = if keyword.contains(' ') {
                // Multi-word keywords match as substrings of the normalized text.
                let count = normalized.matches(keyword.as_str()).count();
                (count, normalized.find(keyword.as_str()))
            } else {
                let count = tokens.iter().filter(|t| *t == keyword).count();
                (count, normalized.find(keyword.as_str()))
            };

            if count > 0 {
                match_count += count;
                evidence.push((first_position.unwrap_or(usize::MAX), keyword.clone()));
            }
        }

        evidence.sort_by_key(|(position, _)| *position);
        (match_count, evidence.into_iter().map(|(_, k)| k).collect())
    }

    /// All keywords across the table, for key-phrase scanning
    fn keyword_set(&self) -> HashSet<&str> {
        self.table
            .iter()
            .flat_map(|entry| entry.keywords.iter().map(|k| k.as_str()))
            .collect()
    }

    /// Scan tokens for keyword hits and capture a 3-token window around each
    fn extract_key_phrases(&self, tokens: &[&str], keywords: &HashSet<&str>) -> Vec<KeyPhrase> {
        let mut phrases = Vec::new();
        let mut seen = HashSet::new();

        for (index, token) in tokens.iter().enumerate() {
            if !keywords.contains(token) {
                continue;
            }

            if seen.insert(token.to_string()) {
                phrases.push(KeyPhrase {
                    term: token.to_string(),
                    relevance: 1.0,
                });
            }

            let start = index.saturating_sub(1);
            let end = (index + 2).min(tokens.len());
            let window = tokens[start..end].join(" ");
            if window != *token && seen.insert(window.clone()) {
                phrases.push(KeyPhrase {
                    term: window,
                    relevance: self.window_relevance,
                });
            }

            if phrases.len() >= self.max_key_phrases {
                break;
            }
        }

        phrases
    }

    /// Tokens whose frequency reaches the configured threshold, stopwords
    /// and short tokens excluded
    fn important_terms(&self, tokens: &[&str]) -> Vec<String> {
        let mut frequency: HashMap<&str, usize> = HashMap::new();
        for token in tokens {
            if token.len() < 3
                || self.stopwords.contains(token)
                || token.chars().all(|c| c.is_numeric())
            {
                continue;
            }
            *frequency.entry(token).or_insert(0) += 1;
        }

        let mut terms: Vec<(&str, usize)> = frequency
            .into_iter()
            .filter(|(_, count)| *count >= self.term_frequency_threshold)
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        terms.into_iter().map(|(term, _)| term.to_string()).collect()
    }
}

/// Common English stopwords excluded from term-frequency salience
fn default_stopwords() -> HashSet<&'static str> {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "had", "has", "have",
        "he", "her", "his", "in", "is", "it", "its", "my", "not", "of", "on", "our", "she",
        "that", "the", "their", "them", "then", "there", "these", "they", "this", "to", "under",
        "was", "were", "which", "who", "will", "with", "would",
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryKeywords, Config};
    use crate::normalizer::TextNormalizer;

    fn scorer() -> CategoryScorer {
        CategoryScorer::new(&Config::default().scoring)
    }

    fn score(text: &str) -> ScoreReport {
        let config = Config::default();
        let normalizer = TextNormalizer::new(&config.normalizer);
        scorer().score(&normalizer.normalize(text))
    }

    #[test]
    fn test_theft_ranks_property_crime_primary() {
        let report = score("The accused committed theft under Section 379 of IPC");
        assert_eq!(report.primary_offense.category, "PROPERTY_CRIME");
        assert!(report.primary_offense.confidence > 0.0);
        assert!(report
            .primary_offense
            .evidence_terms
            .contains(&"theft".to_string()));
    }

    #[test]
    fn test_no_keywords_yields_unknown_with_zero_confidence() {
        let report = score("The weather was sunny");
        assert_eq!(report.primary_offense.category, UNKNOWN_CATEGORY);
        assert_eq!(report.primary_offense.confidence, 0.0);
        assert!(report.primary_offense.evidence_terms.is_empty());
        assert!(report.key_phrases.is_empty());
    }

    #[test]
    fn test_confidence_always_bounded() {
        // Far more matches than the normalizing factor allows.
        let text = "murder ".repeat(50);
        let report = score(&text);
        for category in &report.category_scores {
            assert!(
                (0.0..=1.0).contains(&category.confidence),
                "confidence out of range for {}",
                category.category
            );
        }
        assert_eq!(report.primary_offense.confidence, 1.0);
    }

    #[test]
    fn test_key_phrases_capture_window() {
        let report = score("He tried to murder the shopkeeper yesterday");
        let exact: Vec<&KeyPhrase> = report
            .key_phrases
            .iter()
            .filter(|p| p.relevance >= 1.0)
            .collect();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].term, "murder");

        let windows: Vec<&KeyPhrase> = report
            .key_phrases
            .iter()
            .filter(|p| p.relevance < 1.0)
            .collect();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].term, "to murder the");
    }

    #[test]
    fn tie_break_prefers_first_declared_category() {
        let config = ScoringConfig {
            categories: vec![
                CategoryKeywords {
                    category: "ALPHA".to_string(),
                    keywords: vec!["apple".to_string()],
                },
                CategoryKeywords {
                    category: "BETA".to_string(),
                    keywords: vec!["banana".to_string()],
                },
            ],
            normalizing_factor: 5.0,
            term_frequency_threshold: 2,
            window_relevance: 0.6,
            max_key_phrases: 20,
        };
        // One hit each and identical phrase/important-term weighting.
        let report = CategoryScorer::new(&config).score("banana and apple were mentioned");
        assert_eq!(report.primary_offense.category, "ALPHA");
    }

    #[test]
    fn test_important_terms_use_frequency_threshold() {
        let report = score("cheque cheque cheque bounced once");
        assert!(report.important_terms.contains(&"cheque".to_string()));
        assert!(!report.important_terms.contains(&"bounced".to_string()));
    }

    #[test]
    fn test_repeated_phrase_hits_weight_primary_selection() {
        // "theft" appears in key phrases (2x bonus); a single "attack" hit
        // without repetition should lose even though both have one keyword.
        let report = score("theft of the scooter, theft again reported, attack mentioned once");
        assert_eq!(report.primary_offense.category, "PROPERTY_CRIME");
    }
}
