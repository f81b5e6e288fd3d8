//! Author list extraction.
//!
//! APA style (`Smith, J. A.`) is tried first anywhere in the citation. When
//! it finds nothing, the Vancouver style (`Smith JA`) is read from the
//! leading author segment only.

use cite_core::AuthorName;
use cite_core::citation::MAX_AUTHORS;

use crate::patterns::{RE_AUTHOR_APA, RE_AUTHOR_VANCOUVER, RE_ET_AL, RE_YEAR_PAREN};

/// Authors found in `text`, capped at [`MAX_AUTHORS`], and whether the list
/// ends in "et al.".
pub fn extract_authors(text: &str) -> (Vec<AuthorName>, bool) {
    let et_al = RE_ET_AL.as_ref().is_some_and(|re| re.is_match(text));

    let apa = apa_authors(text);
    if !apa.is_empty() {
        return (apa, et_al);
    }
    (vancouver_authors(author_segment(text)), et_al)
}

fn apa_authors(text: &str) -> Vec<AuthorName> {
    let Some(re) = RE_AUTHOR_APA.as_ref() else {
        return Vec::new();
    };
    let mut authors: Vec<AuthorName> = Vec::new();
    for caps in re.captures_iter(text) {
        let (Some(last), Some(initials)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let author = AuthorName::new(last.as_str().trim(), squash_initials(initials.as_str()));
        if !authors.contains(&author) {
            authors.push(author);
        }
        if authors.len() == MAX_AUTHORS {
            break;
        }
    }
    authors
}

fn vancouver_authors(segment: &str) -> Vec<AuthorName> {
    let Some(re) = RE_AUTHOR_VANCOUVER.as_ref() else {
        return Vec::new();
    };
    let et_al = RE_ET_AL.as_ref();
    segment
        .split([',', ';'])
        .flat_map(|piece| piece.split(" and ").flat_map(|p| p.split(" & ")))
        .map(|piece| {
            let piece = et_al.map_or(piece.to_string(), |re| re.replace_all(piece, "").into_owned());
            piece.trim().trim_end_matches('.').trim().to_string()
        })
        .filter_map(|piece| {
            let caps = re.captures(&piece)?;
            Some(AuthorName::new(caps.get(1)?.as_str(), caps.get(2)?.as_str()))
        })
        .take(MAX_AUTHORS)
        .collect()
}

/// The part of a citation that holds the author list: everything before the
/// parenthesized year, or else before the first sentence break.
fn author_segment(text: &str) -> &str {
    if let Some(m) = RE_YEAR_PAREN.as_ref().and_then(|re| re.find(text)) {
        return &text[..m.start()];
    }
    text.find(". ").map_or(text, |end| &text[..end])
}

/// `"J. A. "` → `"JA"`.
fn squash_initials(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_uppercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn names(text: &str) -> Vec<String> {
        extract_authors(text)
            .0
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn apa_authors_with_ampersand() {
        assert_eq!(
            names("Smith, J. A., & Doe, B. (2020). A study. Journal, 3(1), 1-9."),
            vec!["Smith, J. A.", "Doe, B."]
        );
    }

    #[test]
    fn vancouver_authors_before_year() {
        assert_eq!(
            names("Smith J, Doe A. (2020). COVID-19 treatment outcomes. NEJM."),
            vec!["Smith, J.", "Doe, A."]
        );
    }

    #[test]
    fn vancouver_authors_without_year_paren() {
        assert_eq!(
            names("Baden LR, El Sahly HM, Essink B, et al. Efficacy of the vaccine. N Engl J Med. 2021;384:403-416."),
            vec!["Baden, L. R.", "El Sahly, H. M.", "Essink, B."]
        );
    }

    #[rstest]
    #[case("Smith J, et al. (2020). Title.", true)]
    #[case("Smith, J. et al (2020). Title.", true)]
    #[case("Smith J. (2020). Title.", false)]
    fn et_al_flag(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(extract_authors(text).1, expected);
    }

    #[test]
    fn organisation_is_not_an_author() {
        assert!(names("World Health Organization. Guidelines on hand hygiene. 2009.").is_empty());
    }

    #[test]
    fn author_list_is_capped() {
        let many: Vec<String> = ('A'..='L').map(|c| format!("Author{c}, {c}.")).collect();
        let text = format!("{} (2020). Title.", many.join(", "));
        assert_eq!(extract_authors(&text).0.len(), MAX_AUTHORS);
    }
}
