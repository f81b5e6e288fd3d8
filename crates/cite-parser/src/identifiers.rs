//! Identifier extraction as an ordered table of `(pattern, handler)` rules.
//!
//! Each rule fills at most one field of [`ParsedCitation`] and never
//! overwrites a field an earlier rule already set.

use std::ops::Range;
use std::sync::LazyLock;

use cite_core::ParsedCitation;
use regex::Regex;

use crate::patterns::{RE_ARXIV, RE_ARXIV_URL, RE_DOI, RE_PMID, RE_URL, RE_YEAR_PAREN};

/// Earliest publication year accepted as plausible.
pub const MIN_YEAR: i32 = 1900;

type Handler = fn(&Regex, &str, &mut ParsedCitation, i32);

/// One extraction rule.
pub struct IdentifierRule {
    pub name: &'static str,
    pub regex: &'static LazyLock<Option<Regex>>,
    handler: Handler,
}

impl IdentifierRule {
    /// Run this rule against `text`, filling `parsed` in place.
    pub fn apply(&self, text: &str, parsed: &mut ParsedCitation, current_year: i32) {
        if let Some(re) = self.regex.as_ref() {
            (self.handler)(re, text, parsed, current_year);
        }
    }
}

/// Rules in application order.
pub static RULES: &[IdentifierRule] = &[
    IdentifierRule {
        name: "doi",
        regex: &RE_DOI,
        handler: doi,
    },
    IdentifierRule {
        name: "pmid",
        regex: &RE_PMID,
        handler: pmid,
    },
    IdentifierRule {
        name: "arxiv",
        regex: &RE_ARXIV,
        handler: arxiv,
    },
    IdentifierRule {
        name: "arxiv_url",
        regex: &RE_ARXIV_URL,
        handler: arxiv,
    },
    IdentifierRule {
        name: "url",
        regex: &RE_URL,
        handler: url,
    },
    IdentifierRule {
        name: "year",
        regex: &RE_YEAR_PAREN,
        handler: year,
    },
];

/// Apply every rule in order.
pub fn extract_identifiers(text: &str, parsed: &mut ParsedCitation, current_year: i32) {
    for rule in RULES {
        rule.apply(text, parsed, current_year);
    }
}

/// Byte ranges of identifier tokens (DOI, PMID, arXiv id, URL) in `text`.
///
/// Used to blank identifiers out before title and journal heuristics run.
pub fn identifier_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    for re in [&RE_DOI, &RE_PMID, &RE_ARXIV, &RE_URL] {
        if let Some(re) = re.as_ref() {
            spans.extend(re.find_iter(text).map(|m| m.range()));
        }
    }
    spans
}

/// `text` with every identifier span replaced by spaces of the same length.
pub fn scrub_identifiers(text: &str) -> String {
    let mut scrubbed = text.to_string();
    for span in identifier_spans(text) {
        if scrubbed.is_char_boundary(span.start) && scrubbed.is_char_boundary(span.end) {
            scrubbed.replace_range(span.clone(), &" ".repeat(span.len()));
        }
    }
    // Labels left dangling once their value is gone.
    for label in ["DOI:", "doi:", "PMID:", "pmid:", "arXiv:", "arxiv:"] {
        scrubbed = scrubbed.replace(label, &" ".repeat(label.len()));
    }
    scrubbed
}

fn doi(re: &Regex, text: &str, parsed: &mut ParsedCitation, _: i32) {
    if parsed.doi.is_some() {
        return;
    }
    parsed.doi = re
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| clean_doi(m.as_str()))
        .filter(|d| d.contains('/'));
}

fn pmid(re: &Regex, text: &str, parsed: &mut ParsedCitation, _: i32) {
    if parsed.pmid.is_none() {
        parsed.pmid = first_capture(re, text);
    }
}

fn arxiv(re: &Regex, text: &str, parsed: &mut ParsedCitation, _: i32) {
    if parsed.arxiv_id.is_none() {
        parsed.arxiv_id = first_capture(re, text);
    }
}

fn url(re: &Regex, text: &str, parsed: &mut ParsedCitation, _: i32) {
    if parsed.url.is_some() {
        return;
    }
    let urls: Vec<String> = re
        .find_iter(text)
        .map(|m| clean_url(m.as_str()))
        .filter(|u| u.len() > "https://".len())
        .collect();

    parsed.url = if parsed.doi.is_some() {
        urls.iter()
            .find(|u| !is_doi_url(u))
            .or_else(|| urls.first())
            .cloned()
    } else {
        urls.into_iter().next()
    };
}

fn year(re: &Regex, text: &str, parsed: &mut ParsedCitation, current_year: i32) {
    if parsed.year.is_some() {
        return;
    }
    parsed.year = re
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<i32>().ok())
        .find(|y| (MIN_YEAR..=current_year + 1).contains(y));
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Strip trailing punctuation that is never part of a DOI.
#[must_use]
pub fn clean_doi(raw: &str) -> String {
    raw.trim_end_matches(['.', ',', ';', ')']).to_string()
}

/// Strip trailing sentence punctuation and an unbalanced closing paren.
#[must_use]
pub fn clean_url(raw: &str) -> String {
    let mut url = raw.trim_end_matches(['.', ',', ';', ':', '!', '?', '\'']);
    while url.ends_with(')') && url.matches(')').count() > url.matches('(').count() {
        url = url[..url.len() - 1].trim_end_matches(['.', ',', ';', ':']);
    }
    url.to_string()
}

/// Whether `url` points at the DOI resolver rather than a landing page.
#[must_use]
pub fn is_doi_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.contains("://doi.org/") || lower.contains("://dx.doi.org/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const THIS_YEAR: i32 = 2026;

    fn run(name: &str, text: &str) -> ParsedCitation {
        let mut parsed = ParsedCitation::default();
        let rule = RULES.iter().find(|r| r.name == name).unwrap();
        rule.apply(text, &mut parsed, THIS_YEAR);
        parsed
    }

    #[rstest]
    #[case("DOI: 10.1056/NEJMoa2001282", "10.1056/NEJMoa2001282")]
    #[case("doi:10.1038/nature14539.", "10.1038/nature14539")]
    #[case("https://doi.org/10.1001/jama.2020.1585;", "10.1001/jama.2020.1585")]
    #[case("(see 10.1371/journal.pone.0123456)", "10.1371/journal.pone.0123456")]
    fn doi_rule(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(run("doi", text).doi.as_deref(), Some(expected));
    }

    #[rstest]
    #[case("PMID: 33378609", Some("33378609"))]
    #[case("pmid:1234567", Some("1234567"))]
    #[case("PMID: 123", None)]
    #[case("PMID 33378609", None)]
    fn pmid_rule(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(run("pmid", text).pmid.as_deref(), expected);
    }

    #[rstest]
    #[case("arXiv:2301.12345", "arxiv", "2301.12345")]
    #[case("arxiv: 1706.03762v5", "arxiv", "1706.03762v5")]
    #[case("https://arxiv.org/abs/2005.14165", "arxiv_url", "2005.14165")]
    fn arxiv_rules(#[case] text: &str, #[case] rule: &str, #[case] expected: &str) {
        assert_eq!(run(rule, text).arxiv_id.as_deref(), Some(expected));
    }

    #[test]
    fn url_rule_strips_sentence_punctuation() {
        let parsed = run("url", "Available at https://www.who.int/news/item/1.");
        assert_eq!(parsed.url.as_deref(), Some("https://www.who.int/news/item/1"));
    }

    #[test]
    fn url_rule_keeps_balanced_parens() {
        let parsed = run("url", "See https://en.wikipedia.org/wiki/Mercury_(planet).");
        assert_eq!(
            parsed.url.as_deref(),
            Some("https://en.wikipedia.org/wiki/Mercury_(planet)")
        );
        let parsed = run("url", "(see https://example.org/page)");
        assert_eq!(parsed.url.as_deref(), Some("https://example.org/page"));
    }

    #[test]
    fn url_rule_prefers_landing_page_when_doi_present() {
        let text = "https://doi.org/10.1038/nature14539 https://www.nature.com/articles/nature14539";
        let mut parsed = ParsedCitation::default();
        extract_identifiers(text, &mut parsed, THIS_YEAR);
        assert_eq!(parsed.doi.as_deref(), Some("10.1038/nature14539"));
        assert_eq!(
            parsed.url.as_deref(),
            Some("https://www.nature.com/articles/nature14539")
        );
    }

    #[test]
    fn url_rule_falls_back_to_resolver_url() {
        let mut parsed = ParsedCitation::default();
        extract_identifiers("https://doi.org/10.1038/nature14539", &mut parsed, THIS_YEAR);
        assert_eq!(
            parsed.url.as_deref(),
            Some("https://doi.org/10.1038/nature14539")
        );
    }

    #[rstest]
    #[case("Smith J. (2020). Title.", Some(2020))]
    #[case("Smith J. (2019a). Title.", Some(2019))]
    #[case("Report (2021, March 3).", Some(2021))]
    #[case("Old (1850) then (1999).", Some(1999))]
    #[case("Future (2090).", None)]
    #[case("Next year (2027).", Some(2027))]
    #[case("No parens 2020.", None)]
    fn year_rule(#[case] text: &str, #[case] expected: Option<i32>) {
        assert_eq!(run("year", text).year, expected);
    }

    #[test]
    fn scrub_blanks_identifiers_and_keeps_length() {
        let text = "Lancet. DOI: 10.1016/S0140-6736(20)30183-5";
        let scrubbed = scrub_identifiers(text);
        assert_eq!(scrubbed.len(), text.len());
        assert!(scrubbed.starts_with("Lancet."));
        assert!(!scrubbed.contains("10.1016"));
        assert!(!scrubbed.contains("DOI"));
    }
}
