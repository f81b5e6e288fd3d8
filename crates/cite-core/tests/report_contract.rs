//! Serde roundtrip and JSON Schema validation for the types handed to
//! downstream renderers.

use std::collections::BTreeMap;

use chrono::Utc;
use pretty_assertions::assert_eq;
use schemars::schema_for;

use cite_core::result::detail_keys;
use cite_core::{
    CitationMetadata, Issue, Provenance, ReportIssue, Severity, SourceKind, SourceType,
    ValidationChecks, ValidationLevel, ValidationReport, ValidationResult,
};

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

fn sample_result() -> ValidationResult {
    let text = "Jones B. (2021). Vaccine efficacy. Lancet. PMID: 33378609";
    let mut details = BTreeMap::new();
    details.insert(
        detail_keys::MATCH_CONFIDENCE.to_string(),
        serde_json::json!(0.91),
    );
    ValidationResult {
        id: cite_core::ids::citation_id(text),
        citation: text.to_string(),
        level: ValidationLevel::Standard,
        is_valid: true,
        credibility_score: 80.0,
        confidence: 0.95,
        checks: ValidationChecks {
            format_valid: true,
            pubmed_verified: Some(true),
            ..ValidationChecks::default()
        },
        source_type: SourceType::JournalArticle,
        metadata: CitationMetadata {
            title: Some("Vaccine efficacy".into()),
            year: Some(2021),
            journal: Some("Lancet".into()),
            authors: vec!["Jones, B.".into()],
            peer_reviewed: Some(true),
            pmid: Some("33378609".into()),
            ..CitationMetadata::default()
        },
        issues: vec![Issue::new(Severity::Low, "No URL provided").with_fix("Add a link")],
        warnings: vec![],
        recommendations: vec![],
        provenance: Provenance {
            verifiers_used: vec![SourceKind::Pubmed],
            cache_hit: false,
            elapsed_ms: 312,
            validated_at: Utc::now(),
        },
        details,
    }
}

#[test]
fn result_roundtrip_and_schema() {
    let result = sample_result();
    let json = serde_json::to_string_pretty(&result).unwrap();
    let recovered: ValidationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, result);

    let schema = serde_json::to_value(schema_for!(ValidationResult)).unwrap();
    let instance = serde_json::to_value(&result).unwrap();
    let errors = validate_against_schema(&schema, &instance);
    assert!(errors.is_empty(), "schema validation failed: {errors:?}");
}

#[test]
fn report_roundtrip_and_schema() {
    let result = sample_result();
    let mut source_types = BTreeMap::new();
    source_types.insert(SourceType::JournalArticle, 1);

    let report = ValidationReport {
        total: 1,
        valid: 1,
        pass_rate: 100.0,
        overall_score: 80.0,
        weighted_score: 82.0,
        peer_reviewed_count: 1,
        recent_count: 1,
        source_types,
        high_issues: vec![ReportIssue {
            citation_id: result.id.clone(),
            citation_prefix: "Jones B. (2021). Vaccine efficacy.".into(),
            severity: Severity::High,
            message: "example".into(),
            fix: None,
        }],
        results: vec![result],
        ..ValidationReport::empty(ValidationLevel::Standard)
    };

    let json = serde_json::to_string(&report).unwrap();
    let recovered: ValidationReport = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, report);

    let schema = serde_json::to_value(schema_for!(ValidationReport)).unwrap();
    let instance = serde_json::to_value(&report).unwrap();
    let errors = validate_against_schema(&schema, &instance);
    assert!(errors.is_empty(), "schema validation failed: {errors:?}");
}

#[test]
fn source_type_histogram_serializes_with_snake_case_keys() {
    let mut report = ValidationReport::empty(ValidationLevel::Quick);
    report.source_types.insert(SourceType::Preprint, 2);
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["source_types"]["preprint"], serde_json::json!(2));
}
