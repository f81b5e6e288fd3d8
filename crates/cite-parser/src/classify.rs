//! Source-type classification and the format-only credibility score.

use cite_core::{ParsedCitation, SourceType};

use crate::patterns::{
    RE_BOOK_KEYWORD, RE_GUIDELINE_KEYWORD, RE_JOURNAL_KEYWORD, RE_PREPRINT_KEYWORD,
};

/// Domains of medicines and health-product regulators.
pub const REGULATORY_DOMAINS: &[&str] = &[
    "fda.gov",
    "ema.europa.eu",
    "mhra.gov.uk",
    "tga.gov.au",
    "pmda.go.jp",
    "hc-sc.gc.ca",
    "canada.ca/en/health-canada",
    "swissmedic.ch",
    "federalregister.gov",
    "ecfr.gov",
    "eur-lex.europa.eu",
];

const BASE_SCORE: f64 = 20.0;
const DOI_POINTS: f64 = 25.0;
const PMID_POINTS: f64 = 25.0;
const URL_ONLY_POINTS: f64 = 15.0;
const YEAR_POINTS: f64 = 15.0;
const AUTHORS_POINTS: f64 = 15.0;
const REGULATORY_POINTS: f64 = 10.0;
const JOURNAL_ARTICLE_POINTS: f64 = 5.0;
const GUIDELINE_POINTS: f64 = 5.0;

/// Classify the cited work. Earlier rules take precedence:
///
/// ```text
/// regulatory domain > guideline keyword > arXiv id / preprint keyword
///   > DOI, PMID or journal keyword > book keyword > bare URL > unknown
/// ```
#[must_use]
pub fn classify(text: &str, parsed: &ParsedCitation) -> SourceType {
    let lower = text.to_lowercase();
    let has = |re: &std::sync::LazyLock<Option<regex::Regex>>| {
        re.as_ref().is_some_and(|re| re.is_match(text))
    };

    if REGULATORY_DOMAINS.iter().any(|d| lower.contains(d)) {
        SourceType::Regulatory
    } else if has(&RE_GUIDELINE_KEYWORD) {
        SourceType::Guideline
    } else if parsed.arxiv_id.is_some() || has(&RE_PREPRINT_KEYWORD) {
        SourceType::Preprint
    } else if parsed.doi.is_some() || parsed.pmid.is_some() || has(&RE_JOURNAL_KEYWORD) {
        SourceType::JournalArticle
    } else if has(&RE_BOOK_KEYWORD) {
        SourceType::Book
    } else if parsed.url.is_some() {
        SourceType::Website
    } else {
        SourceType::Unknown
    }
}

/// Format-only credibility in `[0, 100]`.
#[must_use]
pub fn format_score(parsed: &ParsedCitation) -> f64 {
    let mut score = BASE_SCORE;
    if parsed.doi.is_some() {
        score += DOI_POINTS;
    }
    if parsed.pmid.is_some() {
        score += PMID_POINTS;
    }
    if parsed.url.is_some() && parsed.doi.is_none() && parsed.pmid.is_none() {
        score += URL_ONLY_POINTS;
    }
    if parsed.year.is_some() {
        score += YEAR_POINTS;
    }
    if !parsed.authors.is_empty() {
        score += AUTHORS_POINTS;
    }
    score += match parsed.source_type {
        SourceType::Regulatory => REGULATORY_POINTS,
        SourceType::JournalArticle => JOURNAL_ARTICLE_POINTS,
        SourceType::Guideline => GUIDELINE_POINTS,
        _ => 0.0,
    };
    score.min(100.0)
}
