//! Building and combining per-level results.
//!
//! Each level produces its own evidence; these functions fold that evidence
//! into one [`ValidationResult`] without touching the network.

use cite_core::result::detail_keys;
use cite_core::{
    CitationMetadata, Issue, ParsedCitation, Severity, SourceType, ValidationLevel,
    ValidationResult,
};
use cite_correspondence::{Assessment, AssessmentStatus};
use cite_registry::ChainResult;
use serde_json::Value;

use crate::error::EngineError;

/// Credibility gained when the cited URL is reachable (and lost when not).
pub const ACCESSIBILITY_ADJUSTMENT: f64 = 5.0;
/// Credibility lost when the cited URL points at a different work.
pub const MISMATCH_PENALTY: f64 = 15.0;

/// Parser-only result: format score, format issues, parsed metadata.
#[must_use]
pub fn quick_result(
    citation: &str,
    level: ValidationLevel,
    parsed: &ParsedCitation,
    valid_format_threshold: f64,
) -> ValidationResult {
    let mut result = ValidationResult::new(citation, level);
    for issue in cite_parser::format_issues(citation, parsed) {
        result.push_issue(issue);
    }
    let format_valid = !result.issues.iter().any(|i| i.severity <= Severity::High);

    result.checks.format_valid = format_valid;
    result.credibility_score = parsed.format_score;
    // Format evidence alone never claims more than half confidence.
    result.confidence = parsed.format_score / 200.0;
    result.is_valid = format_valid && parsed.format_score >= valid_format_threshold;
    result.source_type = parsed.source_type;
    result.metadata = metadata_of(parsed);
    result.clamp();
    result
}

fn metadata_of(parsed: &ParsedCitation) -> CitationMetadata {
    CitationMetadata {
        title: parsed.title.clone(),
        year: parsed.year,
        journal: parsed.journal.clone(),
        authors: parsed.authors.iter().map(ToString::to_string).collect(),
        peer_reviewed: None,
        doi: parsed.doi.clone(),
        pmid: parsed.pmid.clone(),
        arxiv_id: parsed.arxiv_id.clone(),
        url: parsed.url.clone(),
    }
}

/// What the verifier chain alone says about `citation`.
#[must_use]
pub fn verifier_result(
    citation: &str,
    level: ValidationLevel,
    chain: &ChainResult,
) -> ValidationResult {
    let mut result = ValidationResult::new(citation, level);
    result.provenance.verifiers_used.clone_from(&chain.attempted);
    result.checks = chain.checks();
    for failure in &chain.failures {
        if let Some(error) = &failure.error {
            result.push_warning(format!("{} verification failed: {error}", failure.kind));
        }
    }

    match &chain.outcome {
        Some(outcome) => {
            result.is_valid = true;
            result.credibility_score = outcome.contribution;
            result.confidence = outcome.confidence;
            result.metadata = outcome.metadata.clone();
            if let Some(source_type) = outcome.source_type {
                result.source_type = source_type;
            }
        }
        None => result.push_issue(
            Issue::new(
                Severity::High,
                "Could not verify existence in any bibliographic registry",
            )
            .with_fix("Check the identifier, or add a DOI or PubMed ID"),
        ),
    }
    result.clamp();
    result
}

/// Fold `other` into `base`: higher credibility, either validity, union of
/// verifiers, issues and warnings, higher confidence. Registry metadata wins
/// over parsed metadata field by field.
pub fn merge_results(base: &mut ValidationResult, other: ValidationResult) {
    base.credibility_score = base.credibility_score.max(other.credibility_score);
    base.confidence = base.confidence.max(other.confidence);
    base.is_valid |= other.is_valid;
    base.checks = base.checks.merge(&other.checks);

    for kind in other.provenance.verifiers_used {
        if !base.provenance.verifiers_used.contains(&kind) {
            base.provenance.verifiers_used.push(kind);
        }
    }
    for issue in other.issues {
        base.push_issue(issue);
    }
    for warning in other.warnings {
        base.push_warning(warning);
    }

    if other.source_type != SourceType::Unknown {
        base.source_type = other.source_type;
    }
    let mut metadata = other.metadata;
    metadata.fill_from(&base.metadata);
    base.metadata = metadata;
    base.clamp();
}

/// Plain reachability of the cited URL: ±5 credibility.
pub fn apply_accessibility(result: &mut ValidationResult, url: &str, accessible: bool) {
    result.checks.url_accessible = Some(accessible);
    if accessible {
        result.credibility_score += ACCESSIBILITY_ADJUSTMENT;
    } else {
        result.credibility_score -= ACCESSIBILITY_ADJUSTMENT;
        result.push_warning(format!("URL is not accessible: {url}"));
    }
    result.clamp();
}

/// Record a correspondence assessment in `result`.
///
/// # Errors
///
/// Returns [`EngineError::Internal`] if assessment detail cannot be
/// serialized into the result's details map.
pub fn apply_assessment(
    result: &mut ValidationResult,
    assessment: &Assessment,
) -> Result<(), EngineError> {
    let found = assessment.result.as_ref();
    match assessment.status {
        AssessmentStatus::Match => {
            result.checks.url_corresponds = Some(true);
            if let Some(title) = found.and_then(|r| r.found_title.clone()) {
                set_detail(result, detail_keys::MATCHED_TITLE, Value::String(title));
            }
        }
        AssessmentStatus::Mismatch => {
            result.checks.url_corresponds = Some(false);
            result.credibility_score -= MISMATCH_PENALTY;
            let issue = Issue::new(Severity::High, "URL does not correspond to the cited work");
            result.push_issue(match &assessment.corrected_url {
                Some(url) => issue.with_fix(format!("Replace the URL with {url}")),
                None => issue.with_fix("Replace the URL with one for the cited work"),
            });
        }
        AssessmentStatus::Inaccessible => {
            result.checks.url_corresponds = Some(false);
        }
        AssessmentStatus::NoUrl => {
            if let Some(url) = &assessment.suggested_url {
                set_detail(result, detail_keys::SUGGESTED_URL, Value::String(url.clone()));
                result.push_recommendation(format!("Consider adding a URL: {url}"));
            }
        }
        AssessmentStatus::NoTitle => {}
    }

    if let Some(url) = &assessment.corrected_url {
        set_detail(result, detail_keys::CORRECTED_URL, Value::String(url.clone()));
    }
    if let Some(confidence) = assessment.confidence {
        set_detail(result, detail_keys::MATCH_CONFIDENCE, Value::from(confidence));
    }
    if let Some(found) = found.filter(|r| !r.mismatch_reasons.is_empty()) {
        let reasons = serde_json::to_value(&found.mismatch_reasons)
            .map_err(|e| EngineError::Internal(format!("mismatch reasons: {e}")))?;
        set_detail(result, detail_keys::MISMATCH_REASONS, reasons);
    }

    // Inaccessibility is already reported by the accessibility check.
    if assessment.status != AssessmentStatus::Inaccessible {
        for warning in &assessment.warnings {
            result.push_warning(warning.clone());
        }
    }
    result.clamp();
    Ok(())
}

fn set_detail(result: &mut ValidationResult, key: &str, value: Value) {
    result.details.insert(key.to_string(), value);
}
