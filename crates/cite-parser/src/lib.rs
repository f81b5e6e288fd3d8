//! # cite-parser
//!
//! Pure text processing for Citadel: no I/O, no network.
//!
//! - [`parse`] turns one citation string into a [`ParsedCitation`] with a
//!   format-only credibility score.
//! - [`validate_format`] reports what is missing as [`Issue`]s.
//! - [`extract`] / [`extract_with_context`] find citations in free text.
//!
//! Identifier extraction is an ordered rule table (see [`identifiers::RULES`]),
//! each rule independently testable.

pub mod authors;
pub mod classify;
pub mod extractor;
pub mod fields;
pub mod identifiers;
mod patterns;

use chrono::{Datelike, Utc};
use cite_core::{Issue, ParsedCitation, Severity};

pub use classify::{classify, format_score};
pub use extractor::{extract, extract_with_context};

/// Citations shorter than this (in characters) fail format validation.
pub const MIN_CITATION_CHARS: usize = 20;

/// The current calendar year, used to bound plausible publication years.
#[must_use]
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Parse a citation string. Never fails; missing fields stay empty.
#[must_use]
pub fn parse(text: &str) -> ParsedCitation {
    parse_at(text, current_year())
}

/// [`parse`] with an explicit current year.
#[must_use]
pub fn parse_at(text: &str, current_year: i32) -> ParsedCitation {
    let mut parsed = ParsedCitation::default();
    identifiers::extract_identifiers(text, &mut parsed, current_year);

    let (authors, et_al) = authors::extract_authors(text);
    parsed.authors = authors;
    parsed.et_al = et_al;

    let scrubbed = identifiers::scrub_identifiers(text);
    if let Some(hit) = fields::extract_title(&scrubbed) {
        parsed.journal = fields::extract_journal(&scrubbed, hit.end);
        parsed.title = Some(hit.title);
    }

    parsed.source_type = classify(text, &parsed);
    parsed.format_score = format_score(&parsed);
    parsed
}

/// Check a citation's format. Valid means no high-severity issue was found.
#[must_use]
pub fn validate_format(text: &str) -> (bool, Vec<Issue>) {
    let issues = format_issues(text, &parse(text));
    let valid = !issues.iter().any(|i| i.severity <= Severity::High);
    (valid, issues)
}

/// Format issues for an already-parsed citation.
#[must_use]
pub fn format_issues(text: &str, parsed: &ParsedCitation) -> Vec<Issue> {
    let mut issues = Vec::new();

    if text.trim().chars().count() < MIN_CITATION_CHARS {
        issues.push(
            Issue::new(Severity::High, "Citation is too short to identify a work")
                .with_fix("Provide the full reference: authors, year, title, and an identifier"),
        );
    }
    if parsed.doi.is_none() && parsed.pmid.is_none() && parsed.url.is_none() {
        issues.push(
            Issue::new(
                Severity::High,
                "No DOI, PMID, or URL found; existence cannot be verified",
            )
            .with_fix("Add a DOI, PubMed ID, or URL"),
        );
    }
    if parsed.year.is_none() {
        issues.push(
            Issue::new(Severity::Medium, "No publication year found")
                .with_fix("Add the publication year in parentheses, e.g. (2020)"),
        );
    }
    if parsed.authors.is_empty() {
        issues.push(Issue::new(Severity::Low, "No authors found"));
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use cite_core::SourceType;
    use pretty_assertions::assert_eq;

    const SCENARIO_DOI: &str =
        "Smith J, Doe A. (2020). COVID-19 treatment outcomes. NEJM. DOI: 10.1056/NEJMoa2001282";

    #[test]
    fn parses_doi_citation() {
        let parsed = parse_at(SCENARIO_DOI, 2026);
        assert_eq!(parsed.doi.as_deref(), Some("10.1056/NEJMoa2001282"));
        assert_eq!(parsed.year, Some(2020));
        assert_eq!(parsed.last_names(), vec!["Smith", "Doe"]);
        assert_eq!(parsed.title.as_deref(), Some("COVID-19 treatment outcomes"));
        assert_eq!(parsed.journal.as_deref(), Some("NEJM"));
        assert_eq!(parsed.source_type, SourceType::JournalArticle);
        // 20 base + 25 DOI + 15 year + 15 authors + 5 journal article
        assert!((parsed.format_score - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_pmid_citation() {
        let parsed = parse_at("Jones B. (2021). Vaccine efficacy. Lancet. PMID: 33378609", 2026);
        assert_eq!(parsed.pmid.as_deref(), Some("33378609"));
        assert_eq!(parsed.title.as_deref(), Some("Vaccine efficacy"));
        assert_eq!(parsed.journal.as_deref(), Some("Lancet"));
        assert!(parsed.format_score >= 60.0);
    }

    #[test]
    fn parses_arxiv_preprint() {
        let parsed = parse_at(
            "Vaswani A, Shazeer N. (2017). Attention is all you need. arXiv:1706.03762",
            2026,
        );
        assert_eq!(parsed.arxiv_id.as_deref(), Some("1706.03762"));
        assert_eq!(parsed.source_type, SourceType::Preprint);
        assert_eq!(parsed.title.as_deref(), Some("Attention is all you need"));
    }

    #[test]
    fn empty_string_is_invalid_with_high_issue() {
        let (valid, issues) = validate_format("");
        assert!(!valid);
        assert!(issues.iter().any(|i| i.severity == Severity::High));
        assert!((parse("").format_score - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_year_is_medium_only() {
        let (valid, issues) =
            validate_format("Smith J. Long enough citation title here. https://example.org/paper");
        assert!(valid);
        let year = issues
            .iter()
            .find(|i| i.message.contains("year"))
            .expect("year issue");
        assert_eq!(year.severity, Severity::Medium);
    }

    #[test]
    fn missing_identifier_is_high() {
        let (valid, issues) = validate_format("Smith J. (2020). A study without any identifier.");
        assert!(!valid);
        assert!(
            issues
                .iter()
                .any(|i| i.severity == Severity::High && i.fix.is_some())
        );
    }

    #[test]
    fn doi_year_authors_beat_bare_url() {
        let rich = parse(SCENARIO_DOI);
        let bare = parse("https://example.com/some/article/page");
        assert!(rich.format_score > bare.format_score);
        assert!((bare.format_score - 35.0).abs() < f64::EPSILON);
    }

    #[test]
    fn huge_input_stays_bounded() {
        let text = "x".repeat(10_000);
        let parsed = parse(&text);
        assert!((0.0..=100.0).contains(&parsed.format_score));
    }
}
