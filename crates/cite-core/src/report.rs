//! Aggregated report over a batch of validation results.
//!
//! A report is derived purely from its results; `cite-engine`'s scoring
//! engine builds it. Renderers consume it as-is.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Severity, SourceType, ValidationLevel};
use crate::result::ValidationResult;

/// An issue lifted from a result into a report-level bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportIssue {
    pub citation_id: String,
    /// First characters of the citation, for display.
    pub citation_prefix: String,
    pub severity: Severity,
    pub message: String,
    pub fix: Option<String>,
}

/// Summary of a validation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub level: ValidationLevel,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// `100 · valid / total`, or 0 for an empty batch.
    pub pass_rate: f64,
    /// Mean credibility, or the weighted blend when configured.
    pub overall_score: f64,
    /// Weighted blend of credibility, validity, verifiability and recency.
    pub weighted_score: f64,
    pub peer_reviewed_count: usize,
    pub recent_count: usize,
    pub source_types: BTreeMap<SourceType, usize>,
    /// Fraction of results served from cache, in `[0, 1]`.
    pub cache_hit_rate: f64,
    pub critical_issues: Vec<ReportIssue>,
    pub high_issues: Vec<ReportIssue>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub elapsed_ms: u64,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    /// A zeroed report for an empty batch.
    #[must_use]
    pub fn empty(level: ValidationLevel) -> Self {
        Self {
            level,
            total: 0,
            valid: 0,
            invalid: 0,
            pass_rate: 0.0,
            overall_score: 0.0,
            weighted_score: 0.0,
            peer_reviewed_count: 0,
            recent_count: 0,
            source_types: BTreeMap::new(),
            cache_hit_rate: 0.0,
            critical_issues: Vec::new(),
            high_issues: Vec::new(),
            warnings: Vec::new(),
            recommendations: Vec::new(),
            elapsed_ms: 0,
            generated_at: Utc::now(),
            results: Vec::new(),
        }
    }

    /// Results that did not pass validation.
    pub fn invalid_results(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(|r| !r.is_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_zeroed() {
        let report = ValidationReport::empty(ValidationLevel::Quick);
        assert_eq!(report.total, 0);
        assert_eq!(report.valid + report.invalid, report.total);
        assert!(report.overall_score.abs() < f64::EPSILON);
        assert!(report.results.is_empty());
        assert_eq!(report.invalid_results().count(), 0);
    }
}
