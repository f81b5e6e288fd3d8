//! # cite-core
//!
//! Core types shared across all Citadel crates:
//! - Parsed citation fields and extracted references
//! - Per-citation validation results with issues and provenance
//! - Aggregated validation reports
//! - Severity, source type, level and source enums
//! - Stable citation identifiers and cache keys
//! - Cross-cutting error types

pub mod citation;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod report;
pub mod result;

pub use citation::{AuthorName, ExtractedReference, ParsedCitation, ReferenceContext};
pub use enums::{ReferenceKind, Severity, SourceKind, SourceType, ValidationLevel};
pub use errors::CoreError;
pub use report::{ReportIssue, ValidationReport};
pub use result::{CitationMetadata, Issue, Provenance, ValidationChecks, ValidationResult};

/// Clamp a credibility score into `[0, 100]`, mapping NaN to 0.
#[must_use]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Clamp a confidence value into `[0, 1]`, mapping NaN to 0.
#[must_use]
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}
