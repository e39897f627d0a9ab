//! # IPC Section Resolution Module
//!
//! ## Purpose
//! Resolves IPC section numbers into human-readable descriptions and lawyer
//! specialization labels. Works from explicit section mentions when the
//! extractor found any, and falls back to a keyword-driven derived search
//! otherwise.
//!
//! ## Input/Output Specification
//! - **Input**: Canonical section tokens, or fallback search terms derived
//!   from category scoring
//! - **Output**: `SectionDetail` records; explicit matches carry confidence
//!   exactly 1.0, derived matches are relevance-ranked, capped at a
//!   configured limit and sorted descending
//! - **Degradation**: an unavailable lookup provider yields an empty section
//!   list, never a failed analysis; callers treat empty as "not determined"
//!
//! ## Architecture
//! - `SectionLookup` trait: pluggable data source, mockable in tests
//! - `StaticSectionTable`: deterministic in-memory table built from injected
//!   configuration rows (the preferred provider)
//! - `WebSearchLookup`: search-API fallback over `reqwest` with a request
//!   timeout and a bounded retry loop

use crate::config::{ResolverConfig, SectionRow};
use crate::errors::{AnalysisError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Specialization label used when a section is not in the routing map
const GENERAL_SPECIALIZATION: &str = "General Practice";

/// Resolved detail for one IPC section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDetail {
    /// Canonical section token, e.g. "379"
    pub section_number: String,
    /// Human-readable description of the offence
    pub description: String,
    /// Lawyer specialization the section routes to
    pub specialization: String,
    /// 1.0 for explicit mentions, source-ranked relevance for derived hits
    pub confidence: f64,
    /// Where the description came from, when a remote source supplied it
    pub source_url: Option<String>,
}

/// A description record returned by a lookup provider
#[derive(Debug, Clone)]
pub struct SectionRecord {
    pub description: String,
    pub source_url: Option<String>,
}

/// One result from a derived-path search
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub snippet: String,
    pub source_url: Option<String>,
}

/// Pluggable section-description data source
#[async_trait]
pub trait SectionLookup: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Resolve a description for one canonical section token
    async fn lookup_section(&self, section: &str) -> Result<Option<SectionRecord>>;

    /// Search for sections relevant to the given terms
    async fn search_sections(&self, terms: &[String]) -> Result<Vec<SearchHit>>;
}

/// Deterministic in-memory lookup built from configuration rows
pub struct StaticSectionTable {
    rows: Vec<SectionRow>,
    by_section: HashMap<String, SectionRow>,
}

impl StaticSectionTable {
    pub fn new(rows: &[SectionRow]) -> Self {
        let by_section = rows
            .iter()
            .map(|row| (row.section.to_uppercase(), row.clone()))
            .collect();
        Self {
            rows: rows.to_vec(),
            by_section,
        }
    }
}

#[async_trait]
impl SectionLookup for StaticSectionTable {
    fn name(&self) -> &str {
        "static-table"
    }

    async fn lookup_section(&self, section: &str) -> Result<Option<SectionRecord>> {
        Ok(self
            .by_section
            .get(&section.to_uppercase())
            .map(|row| SectionRecord {
                description: row.description.clone(),
                source_url: None,
            }))
    }

    async fn search_sections(&self, terms: &[String]) -> Result<Vec<SearchHit>> {
        let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        let hits = self
            .rows
            .iter()
            .filter(|row| {
                let description = row.description.to_lowercase();
                terms.iter().any(|term| description.contains(term))
            })
            .map(|row| SearchHit {
                snippet: format!("Section {} IPC: {}", row.section, row.description),
                source_url: None,
            })
            .collect();
        Ok(hits)
    }
}

/// Search-API backed lookup with timeout and bounded retries
pub struct WebSearchLookup {
    client: Client,
    search_url: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

/// Search API response shape
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[allow(dead_code)]
    title: Option<String>,
    snippet: String,
    link: Option<String>,
}

impl WebSearchLookup {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("legal-doc-analysis/0.1")
            .build()
            .map_err(|e| AnalysisError::NetworkError {
                details: e.to_string(),
            })?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Execute one search query with the bounded retry loop
    async fn query(&self, q: &str) -> Result<SearchResponse> {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            let response = self
                .client
                .get(&self.search_url)
                .query(&[("q", q)])
                .send()
                .await;

            match response {
                Ok(response) if response.status().is_success() => {
                    return response.json::<SearchResponse>().await.map_err(|e| {
                        AnalysisError::DataParsing {
                            source_name: "section search API".to_string(),
                            details: e.to_string(),
                        }
                    });
                }
                Ok(response) => {
                    last_error = Some(AnalysisError::NetworkError {
                        details: format!("HTTP {} from search API", response.status()),
                    });
                }
                Err(e) => {
                    last_error = Some(AnalysisError::NetworkError {
                        details: e.to_string(),
                    });
                }
            }

            if attempt < self.retry_attempts {
                debug!("Search attempt {}/{} failed, retrying", attempt, self.retry_attempts);
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Err(last_error.unwrap_or(AnalysisError::LookupUnavailable {
            provider: "web-search".to_string(),
            details: "retries exhausted".to_string(),
        }))
    }
}

#[async_trait]
impl SectionLookup for WebSearchLookup {
    fn name(&self) -> &str {
        "web-search"
    }

    async fn lookup_section(&self, section: &str) -> Result<Option<SectionRecord>> {
        let response = self.query(&format!("IPC Section {}", section)).await?;
        Ok(response.results.into_iter().next().map(|result| SectionRecord {
            description: result.snippet,
            source_url: result.link,
        }))
    }

    async fn search_sections(&self, terms: &[String]) -> Result<Vec<SearchHit>> {
        let response = self.query(&format!("{} IPC section", terms.join(" "))).await?;
        Ok(response
            .results
            .into_iter()
            .map(|result| SearchHit {
                snippet: result.snippet,
                source_url: result.link,
            })
            .collect())
    }
}

/// Section resolver combining the explicit and derived paths
pub struct SectionResolver {
    lookup: Arc<dyn SectionLookup>,
    specializations: HashMap<String, String>,
    max_derived_results: usize,
    derived_base_confidence: f64,
    derived_term_bonus: f64,
    snippet_section: Regex,
}

impl SectionResolver {
    /// Create a resolver over the given lookup provider. The configured
    /// section rows double as the specialization routing map.
    pub fn new(config: &ResolverConfig, lookup: Arc<dyn SectionLookup>) -> Self {
        let specializations = config
            .sections
            .iter()
            .map(|row| (row.section.to_uppercase(), row.specialization.clone()))
            .collect();

        Self {
            lookup,
            specializations,
            max_derived_results: config.max_derived_results,
            derived_base_confidence: config.derived_base_confidence,
            derived_term_bonus: config.derived_term_bonus,
            snippet_section: Regex::new(r"(?i)section\s+(\d+[a-z]?)\b")
                .expect("static snippet pattern"),
        }
    }

    /// Resolve section details. Prefers the explicit path when the extractor
    /// found section tokens; otherwise derives candidates from search terms.
    /// Lookup failures degrade to an empty list.
    pub async fn resolve(&self, sections: &[String], fallback_terms: &[String]) -> Vec<SectionDetail> {
        if !sections.is_empty() {
            self.resolve_explicit(sections).await
        } else if !fallback_terms.is_empty() {
            self.resolve_derived(fallback_terms).await
        } else {
            Vec::new()
        }
    }

    /// Explicit path: confidence is fixed at 1.0 for every resolved mention
    async fn resolve_explicit(&self, sections: &[String]) -> Vec<SectionDetail> {
        let mut details = Vec::with_capacity(sections.len());

        for section in sections {
            match self.lookup.lookup_section(section).await {
                Ok(Some(record)) => {
                    details.push(SectionDetail {
                        section_number: section.clone(),
                        description: record.description,
                        specialization: self.specialization_for(section),
                        confidence: 1.0,
                        source_url: record.source_url,
                    });
                }
                Ok(None) => {
                    debug!("No description found for section {}", section);
                }
                Err(e) => {
                    warn!(
                        "Section lookup via '{}' failed for {}: {} (continuing without it)",
                        self.lookup.name(),
                        section,
                        e
                    );
                }
            }
        }

        details
    }

    /// Derived path: extract section tokens from search snippets, score each
    /// by term-overlap relevance and keep the top results
    async fn resolve_derived(&self, terms: &[String]) -> Vec<SectionDetail> {
        let hits = match self.lookup.search_sections(terms).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(
                    "Derived section search via '{}' failed: {} (returning empty)",
                    self.lookup.name(),
                    e
                );
                return Vec::new();
            }
        };

        let terms_lower: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        let mut best: HashMap<String, SectionDetail> = HashMap::new();

        for hit in &hits {
            let snippet_lower = hit.snippet.to_lowercase();
            let matching_terms = terms_lower
                .iter()
                .filter(|term| snippet_lower.contains(term.as_str()))
                .count();
            let confidence = (self.derived_base_confidence
                + self.derived_term_bonus * matching_terms as f64)
                .min(1.0);

            for captures in self.snippet_section.captures_iter(&hit.snippet) {
                let token = captures[1].to_uppercase();
                let detail = SectionDetail {
                    section_number: token.clone(),
                    description: hit.snippet.clone(),
                    specialization: self.specialization_for(&token),
                    confidence,
                    source_url: hit.source_url.clone(),
                };

                match best.get(&token) {
                    Some(existing) if existing.confidence >= confidence => {}
                    _ => {
                        best.insert(token, detail);
                    }
                }
            }
        }

        let mut details: Vec<SectionDetail> = best.into_values().collect();
        details.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.section_number.cmp(&b.section_number))
        });
        details.truncate(self.max_derived_results);
        details
    }

    fn specialization_for(&self, section: &str) -> String {
        self.specializations
            .get(&section.to_uppercase())
            .cloned()
            .unwrap_or_else(|| GENERAL_SPECIALIZATION.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    struct FailingLookup;

    #[async_trait]
    impl SectionLookup for FailingLookup {
        fn name(&self) -> &str {
            "failing"
        }

        async fn lookup_section(&self, _section: &str) -> Result<Option<SectionRecord>> {
            Err(AnalysisError::LookupUnavailable {
                provider: "failing".to_string(),
                details: "always down".to_string(),
            })
        }

        async fn search_sections(&self, _terms: &[String]) -> Result<Vec<SearchHit>> {
            Err(AnalysisError::LookupUnavailable {
                provider: "failing".to_string(),
                details: "always down".to_string(),
            })
        }
    }

    fn static_resolver() -> SectionResolver {
        let config = Config::default().resolver;
        let lookup = Arc::new(StaticSectionTable::new(&config.sections));
        SectionResolver::new(&config, lookup)
    }

    #[tokio::test]
    async fn test_explicit_path_confidence_is_exactly_one() {
        let resolver = static_resolver();
        let details = resolver.resolve(&["379".to_string()], &[]).await;
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].section_number, "379");
        assert_eq!(details[0].confidence, 1.0);
        assert_eq!(details[0].specialization, "Property Crime");
        assert!(details[0].description.to_lowercase().contains("theft"));
    }

    #[tokio::test]
    async fn test_unknown_explicit_section_is_skipped() {
        let resolver = static_resolver();
        let details = resolver.resolve(&["999".to_string(), "420".to_string()], &[]).await;
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].section_number, "420");
    }

    #[tokio::test]
    async fn test_derived_path_is_ranked_capped_and_bounded() {
        let resolver = static_resolver();
        let terms = vec!["theft".to_string(), "robbery".to_string(), "dacoity".to_string()];
        let details = resolver.resolve(&[], &terms).await;

        assert!(!details.is_empty());
        assert!(details.len() <= 3);
        for detail in &details {
            assert!(detail.confidence <= 1.0);
        }
        for pair in details.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[tokio::test]
    async fn test_failing_lookup_degrades_to_empty() {
        let config = Config::default().resolver;
        let resolver = SectionResolver::new(&config, Arc::new(FailingLookup));

        let explicit = resolver.resolve(&["379".to_string()], &[]).await;
        assert!(explicit.is_empty());

        let derived = resolver.resolve(&[], &["theft".to_string()]).await;
        assert!(derived.is_empty());
    }

    #[tokio::test]
    async fn test_no_input_yields_empty_sections() {
        let resolver = static_resolver();
        let details = resolver.resolve(&[], &[]).await;
        assert!(details.is_empty());
    }
}
