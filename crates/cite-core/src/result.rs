//! Per-citation validation result.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Severity, SourceKind, SourceType, ValidationLevel};
use crate::{clamp_confidence, clamp_score, ids};

/// Well-known keys of [`ValidationResult::details`].
pub mod detail_keys {
    pub const MATCHED_TITLE: &str = "matched_title";
    pub const MATCH_CONFIDENCE: &str = "match_confidence";
    pub const MISMATCH_REASONS: &str = "mismatch_reasons";
    pub const CORRECTED_URL: &str = "corrected_url";
    pub const SUGGESTED_URL: &str = "suggested_url";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// A problem found while validating a citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    /// Suggested remedy, if one is known.
    pub fix: Option<String>,
}

impl Issue {
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            fix: None,
        }
    }

    #[must_use]
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

/// Outcome of each individual check. `None` means the check did not run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationChecks {
    pub format_valid: bool,
    pub url_accessible: Option<bool>,
    pub doi_valid: Option<bool>,
    pub pubmed_verified: Option<bool>,
    pub arxiv_verified: Option<bool>,
    pub url_corresponds: Option<bool>,
}

impl ValidationChecks {
    /// Whether an authoritative registry (PubMed, doi.org, arXiv) confirmed the work.
    #[must_use]
    pub fn registry_verified(&self) -> bool {
        [self.doi_valid, self.pubmed_verified, self.arxiv_verified]
            .into_iter()
            .any(|c| c == Some(true))
    }

    /// Combine two check sets: a passed check wins over a failed one, and a
    /// failed check wins over one that never ran.
    #[must_use]
    pub const fn merge(&self, other: &Self) -> Self {
        Self {
            format_valid: self.format_valid || other.format_valid,
            url_accessible: merge_check(self.url_accessible, other.url_accessible),
            doi_valid: merge_check(self.doi_valid, other.doi_valid),
            pubmed_verified: merge_check(self.pubmed_verified, other.pubmed_verified),
            arxiv_verified: merge_check(self.arxiv_verified, other.arxiv_verified),
            url_corresponds: merge_check(self.url_corresponds, other.url_corresponds),
        }
    }
}

const fn merge_check(a: Option<bool>, b: Option<bool>) -> Option<bool> {
    match (a, b) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), _) | (_, Some(false)) => Some(false),
        (None, None) => None,
    }
}

/// Bibliographic metadata gathered from the citation text and verifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CitationMetadata {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub journal: Option<String>,
    pub authors: Vec<String>,
    pub peer_reviewed: Option<bool>,
    pub doi: Option<String>,
    pub pmid: Option<String>,
    pub arxiv_id: Option<String>,
    pub url: Option<String>,
}

impl CitationMetadata {
    /// Fill fields that are empty here from `other`.
    pub fn fill_from(&mut self, other: &Self) {
        fill(&mut self.title, &other.title);
        fill(&mut self.year, &other.year);
        fill(&mut self.journal, &other.journal);
        fill(&mut self.peer_reviewed, &other.peer_reviewed);
        fill(&mut self.doi, &other.doi);
        fill(&mut self.pmid, &other.pmid);
        fill(&mut self.arxiv_id, &other.arxiv_id);
        fill(&mut self.url, &other.url);
        if self.authors.is_empty() {
            self.authors.clone_from(&other.authors);
        }
    }

    /// Whether no identifier of any kind is known.
    #[must_use]
    pub const fn lacks_identifiers(&self) -> bool {
        self.doi.is_none() && self.pmid.is_none() && self.arxiv_id.is_none() && self.url.is_none()
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, other: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(other);
    }
}

/// Where a result came from and how long it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Provenance {
    pub verifiers_used: Vec<SourceKind>,
    pub cache_hit: bool,
    pub elapsed_ms: u64,
    pub validated_at: DateTime<Utc>,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            verifiers_used: Vec::new(),
            cache_hit: false,
            elapsed_ms: 0,
            validated_at: Utc::now(),
        }
    }
}

/// The verdict for one citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    /// Stable id derived from the citation text (`cit-…`).
    pub id: String,
    pub citation: String,
    pub level: ValidationLevel,
    pub is_valid: bool,
    /// Credibility in `[0, 100]`.
    pub credibility_score: f64,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    pub checks: ValidationChecks,
    pub source_type: SourceType,
    pub metadata: CitationMetadata,
    pub issues: Vec<Issue>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub provenance: Provenance,
    /// Free-form detail, e.g. correspondence findings. See [`detail_keys`].
    pub details: BTreeMap<String, serde_json::Value>,
}

impl ValidationResult {
    /// An empty, invalid result for `citation` at `level`.
    #[must_use]
    pub fn new(citation: &str, level: ValidationLevel) -> Self {
        Self {
            id: ids::citation_id(citation),
            citation: citation.to_string(),
            level,
            is_valid: false,
            credibility_score: 0.0,
            confidence: 0.0,
            checks: ValidationChecks::default(),
            source_type: SourceType::Unknown,
            metadata: CitationMetadata::default(),
            issues: Vec::new(),
            warnings: Vec::new(),
            recommendations: Vec::new(),
            provenance: Provenance::default(),
            details: BTreeMap::new(),
        }
    }

    /// An invalid result carrying a critical issue describing `error`.
    ///
    /// Used when validation itself failed unexpectedly, so that one bad
    /// citation never aborts a batch.
    #[must_use]
    pub fn failed(citation: &str, level: ValidationLevel, error: &str) -> Self {
        let mut result = Self::new(citation, level);
        result.issues.push(
            Issue::new(Severity::Critical, format!("Validation failed: {error}"))
                .with_fix("Retry validation or review this citation manually"),
        );
        result.details.insert(
            detail_keys::INTERNAL_ERROR.to_string(),
            serde_json::Value::String(error.to_string()),
        );
        result
    }

    /// Re-apply the score and confidence bounds.
    pub fn clamp(&mut self) {
        self.credibility_score = clamp_score(self.credibility_score);
        self.confidence = clamp_confidence(self.confidence);
    }

    /// Add an issue unless an identical message is already present.
    pub fn push_issue(&mut self, issue: Issue) {
        if !self.issues.iter().any(|i| i.message == issue.message) {
            self.issues.push(issue);
        }
    }

    /// Add a warning unless it is already present.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// Add a recommendation unless it is already present.
    pub fn push_recommendation(&mut self, recommendation: impl Into<String>) {
        let recommendation = recommendation.into();
        if !self.recommendations.contains(&recommendation) {
            self.recommendations.push(recommendation);
        }
    }

    /// Issues at or above `severity`.
    pub fn issues_at_least(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity <= severity)
    }

    /// Copy of this result with the cache-hit flag set to `hit`.
    #[must_use]
    pub fn with_cache_hit(&self, hit: bool) -> Self {
        let mut copy = self.clone();
        copy.provenance.cache_hit = hit;
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_result_is_invalid_and_bounded() {
        let result = ValidationResult::new("", ValidationLevel::Quick);
        assert!(!result.is_valid);
        assert!(result.credibility_score.abs() < f64::EPSILON);
        assert!(result.id.starts_with("cit-"));
        assert!(!result.provenance.cache_hit);
    }

    #[test]
    fn failed_result_carries_critical_issue() {
        let result = ValidationResult::failed("x", ValidationLevel::Standard, "boom");
        assert!(!result.is_valid);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::Critical);
        assert!(result.issues[0].message.contains("boom"));
        assert_eq!(
            result.details.get(detail_keys::INTERNAL_ERROR),
            Some(&serde_json::Value::String("boom".into()))
        );
    }

    #[test]
    fn clamp_restores_bounds() {
        let mut result = ValidationResult::new("x", ValidationLevel::Quick);
        result.credibility_score = 140.0;
        result.confidence = -2.0;
        result.clamp();
        assert!((result.credibility_score - 100.0).abs() < f64::EPSILON);
        assert!(result.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn push_issue_dedups_by_message() {
        let mut result = ValidationResult::new("x", ValidationLevel::Quick);
        result.push_issue(Issue::new(Severity::High, "dup"));
        result.push_issue(Issue::new(Severity::Low, "dup"));
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn merge_checks_prefers_positive_evidence() {
        let a = ValidationChecks {
            format_valid: true,
            doi_valid: Some(false),
            ..ValidationChecks::default()
        };
        let b = ValidationChecks {
            doi_valid: Some(true),
            url_accessible: Some(false),
            ..ValidationChecks::default()
        };
        let merged = a.merge(&b);
        assert!(merged.format_valid);
        assert_eq!(merged.doi_valid, Some(true));
        assert_eq!(merged.url_accessible, Some(false));
        assert_eq!(merged.pubmed_verified, None);
        assert!(merged.registry_verified());
    }

    #[test]
    fn metadata_fill_from_keeps_existing() {
        let mut mine = CitationMetadata {
            title: Some("Mine".into()),
            ..CitationMetadata::default()
        };
        let theirs = CitationMetadata {
            title: Some("Theirs".into()),
            year: Some(2020),
            authors: vec!["Smith, J.".into()],
            ..CitationMetadata::default()
        };
        mine.fill_from(&theirs);
        assert_eq!(mine.title.as_deref(), Some("Mine"));
        assert_eq!(mine.year, Some(2020));
        assert_eq!(mine.authors, vec!["Smith, J.".to_string()]);
    }

    #[test]
    fn with_cache_hit_leaves_original_untouched() {
        let result = ValidationResult::new("x", ValidationLevel::Quick);
        let hit = result.with_cache_hit(true);
        assert!(hit.provenance.cache_hit);
        assert!(!result.provenance.cache_hit);
    }
}
