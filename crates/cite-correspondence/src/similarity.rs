//! Citation-to-page similarity measures.
//!
//! All scores are in `[0, 1]`. Signals that cannot be computed because one
//! side is missing score [`NEUTRAL`] instead of counting against the page.

use std::collections::BTreeSet;

/// Score for a dimension with no evidence either way.
pub const NEUTRAL: f64 = 0.5;

pub const TITLE_WEIGHT: f64 = 0.6;
pub const AUTHOR_WEIGHT: f64 = 0.3;
pub const YEAR_WEIGHT: f64 = 0.1;

/// Below this the title is reported as a mismatch reason.
pub const WEAK_TITLE: f64 = 0.7;
/// Below this the authors are reported as a mismatch reason.
pub const WEAK_AUTHORS: f64 = 0.5;

pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "by", "for", "from", "in", "into", "is", "its", "of",
    "on", "or", "the", "to", "via", "with",
];

/// Lowercased alphanumeric tokens minus stop words.
#[must_use]
pub fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

/// `|a ∩ b| / |a ∪ b|`; two empty sets share nothing.
#[must_use]
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let score = a.intersection(b).count() as f64 / union as f64;
    score
}

#[must_use]
pub fn title_similarity(cited: &str, found: &str) -> f64 {
    jaccard(&tokens(cited), &tokens(found))
}

/// Surname of an author as registries and meta tags spell it.
///
/// `"LeCun, Yann"` → `lecun`, `"Polack FP"` → `polack`,
/// `"Geoffrey Hinton"` → `hinton`.
#[must_use]
pub fn last_name(author: &str) -> Option<String> {
    let author = author.trim();
    if let Some((surname, _)) = author.split_once(',') {
        let surname = surname.trim();
        return (!surname.is_empty()).then(|| surname.to_lowercase());
    }
    let words: Vec<&str> = author.split_whitespace().collect();
    match words.as_slice() {
        [] => None,
        [only] => Some(only.to_lowercase()),
        [rest @ .., last] if is_initials(last) => Some(rest.join(" ").to_lowercase()),
        [.., last] => Some(last.trim_end_matches('.').to_lowercase()),
    }
}

fn is_initials(word: &str) -> bool {
    let letters: Vec<char> = word.chars().filter(|c| *c != '.').collect();
    !letters.is_empty() && letters.len() <= 3 && letters.iter().all(char::is_ascii_uppercase)
}

/// Jaccard over last names; [`NEUTRAL`] when either side lists nobody.
#[must_use]
pub fn author_similarity<S: AsRef<str>>(cited_last_names: &[&str], found_authors: &[S]) -> f64 {
    let cited: BTreeSet<String> = cited_last_names.iter().map(|n| n.trim().to_lowercase()).collect();
    let found: BTreeSet<String> = found_authors
        .iter()
        .filter_map(|a| last_name(a.as_ref()))
        .collect();
    if cited.is_empty() || found.is_empty() {
        return NEUTRAL;
    }
    jaccard(&cited, &found)
}

/// Whether the years agree within one year; `None` when either is unknown.
#[must_use]
pub fn year_match(cited: Option<i32>, found: Option<i32>) -> Option<bool> {
    Some((cited? - found?).abs() <= 1)
}

/// Year signal: 1 for a match, 0 for a mismatch, [`NEUTRAL`] when unknown.
#[must_use]
pub fn year_score(year_match: Option<bool>) -> f64 {
    match year_match {
        Some(true) => 1.0,
        Some(false) => 0.0,
        None => NEUTRAL,
    }
}

/// `0.6·title + 0.3·author + 0.1·year`, bounded to `[0, 1]`.
#[must_use]
pub fn confidence(title: f64, author: f64, year: f64) -> f64 {
    cite_core::clamp_confidence(TITLE_WEIGHT * title + AUTHOR_WEIGHT * author + YEAR_WEIGHT * year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[rstest]
    #[case("Deep learning", "Deep Learning", 1.0)]
    #[case("The Effects of Aspirin", "effects aspirin", 1.0)]
    #[case("Deep learning", "Quantum chromodynamics", 0.0)]
    #[case("Deep learning for vision", "Deep learning for speech", 1.0 / 3.0)]
    #[case("", "", 0.0)]
    fn title_similarity_cases(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        assert!(close(title_similarity(a, b), expected), "{a} vs {b}");
    }

    #[rstest]
    #[case("LeCun, Yann", Some("lecun"))]
    #[case("Polack FP", Some("polack"))]
    #[case("El Sahly HM", Some("el sahly"))]
    #[case("Geoffrey Hinton", Some("hinton"))]
    #[case("Noam M. Shazeer", Some("shazeer"))]
    #[case("Plato", Some("plato"))]
    #[case("   ", None)]
    fn last_name_cases(#[case] author: &str, #[case] expected: Option<&str>) {
        assert_eq!(last_name(author).as_deref(), expected);
    }

    #[test]
    fn author_similarity_uses_last_names() {
        let found = ["LeCun, Yann", "Bengio, Yoshua", "Hinton, Geoffrey"];
        assert!(close(author_similarity(&["LeCun", "Bengio", "Hinton"], &found), 1.0));
        assert!(close(author_similarity(&["LeCun"], &found), 1.0 / 3.0));
        assert!(close(author_similarity(&["Smith"], &found), 0.0));
    }

    #[test]
    fn author_similarity_is_neutral_without_evidence() {
        let none: [&str; 0] = [];
        assert!(close(author_similarity(&[], &["Smith, J"]), NEUTRAL));
        assert!(close(author_similarity(&["Smith"], &none), NEUTRAL));
    }

    #[test]
    fn year_tolerance_is_one() {
        assert_eq!(year_match(Some(2020), Some(2021)), Some(true));
        assert_eq!(year_match(Some(2020), Some(2022)), Some(false));
        assert_eq!(year_match(None, Some(2022)), None);
        assert!(close(year_score(None), NEUTRAL));
    }

    #[test]
    fn confidence_weights() {
        assert!(close(confidence(1.0, 1.0, 1.0), 1.0));
        assert!(close(confidence(0.0, 0.0, 0.0), 0.0));
        // perfect title with neutral authors and year
        assert!(close(confidence(1.0, NEUTRAL, NEUTRAL), 0.80));
        // wrong page, neutral signals
        assert!(close(confidence(0.0, NEUTRAL, NEUTRAL), 0.20));
    }
}
