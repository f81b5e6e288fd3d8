//! Best-effort title and journal extraction.
//!
//! Both work on the identifier-scrubbed citation (see
//! [`crate::identifiers::scrub_identifiers`]) so DOIs and URLs never
//! masquerade as titles. Scrubbing preserves byte offsets.

use crate::patterns::{
    RE_AUTHOR_PREFIX, RE_JOURNAL_BEFORE_NUMBER, RE_LEADING_YEAR, RE_TITLE_AFTER_YEAR,
    RE_VOLUME_ISSUE,
};

const MIN_TITLE_CHARS: usize = 10;
const MIN_SEGMENT_TITLE_CHARS: usize = 15;
const MAX_SEGMENT_TITLE_CHARS: usize = 300;
const MAX_JOURNAL_CHARS: usize = 100;

/// A title and the byte offset in the scrubbed text where it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    pub title: String,
    pub end: usize,
}

/// Find the title using three strategies in order:
///
/// 1. text between `(year).` and the next period;
/// 2. text after a leading author list up to the next period;
/// 3. the first period-delimited segment of plausible length that is not an
///    author list, a `volume(issue)` run, or an identifier.
///
/// A short strategy-1 hit is kept as a last resort.
pub fn extract_title(scrubbed: &str) -> Option<TitleMatch> {
    let after_year = title_after_year(scrubbed);
    if let Some(hit) = after_year.as_ref().filter(|t| char_len(&t.title) >= MIN_TITLE_CHARS) {
        return Some(hit.clone());
    }
    title_after_authors(scrubbed)
        .or_else(|| title_from_segments(scrubbed))
        .or(after_year)
}

/// Journal name following the title: the text before a `, <number>` run, or
/// else the next short period-delimited segment.
pub fn extract_journal(scrubbed: &str, title_end: usize) -> Option<String> {
    let rest = scrubbed.get(title_end..)?;
    let rest = rest.trim_start_matches(['.', '?', '!', '"', '\u{201d}', ' ']);

    if let Some(caps) = RE_JOURNAL_BEFORE_NUMBER.as_ref().and_then(|re| re.captures(rest)) {
        if let Some(name) = caps.get(1).map(|m| clean(m.as_str())) {
            if !name.is_empty() && !looks_like_identifier(&name) {
                return Some(name);
            }
        }
    }

    let segment = rest.split('.').map(clean).find(|s| !s.is_empty())?;
    let plausible = char_len(&segment) <= MAX_JOURNAL_CHARS
        && segment.chars().next().is_some_and(char::is_alphabetic)
        && !looks_like_identifier(&segment)
        && !is_access_note(&segment);
    plausible.then_some(segment)
}

fn title_after_year(scrubbed: &str) -> Option<TitleMatch> {
    let caps = RE_TITLE_AFTER_YEAR.as_ref()?.captures(scrubbed)?;
    let m = caps.get(1)?;
    let title = clean(m.as_str());
    (!title.is_empty()).then(|| TitleMatch {
        title,
        end: m.end(),
    })
}

fn title_after_authors(scrubbed: &str) -> Option<TitleMatch> {
    let prefix = RE_AUTHOR_PREFIX.as_ref()?.find(scrubbed)?;
    if prefix.as_str().trim().is_empty() {
        return None;
    }
    let mut start = prefix.end();
    if let Some(year) = RE_LEADING_YEAR.as_ref().and_then(|re| re.find(&scrubbed[start..])) {
        start += year.end();
    }
    let rest = &scrubbed[start..];
    let end = start + rest.find('.').unwrap_or(rest.len());
    let title = clean(&scrubbed[start..end]);
    (char_len(&title) >= MIN_TITLE_CHARS).then_some(TitleMatch { title, end })
}

fn title_from_segments(scrubbed: &str) -> Option<TitleMatch> {
    let mut offset = 0;
    for raw in scrubbed.split('.') {
        let end = offset + raw.len();
        offset = end + 1;

        let segment = clean(raw);
        let len = char_len(&segment);
        if !(MIN_SEGMENT_TITLE_CHARS..=MAX_SEGMENT_TITLE_CHARS).contains(&len) {
            continue;
        }
        if is_author_list(&segment)
            || RE_VOLUME_ISSUE.as_ref().is_some_and(|re| re.is_match(&segment))
            || looks_like_identifier(&segment)
        {
            continue;
        }
        return Some(TitleMatch {
            title: segment,
            end,
        });
    }
    None
}

/// Whether the whole segment is a list of author names.
fn is_author_list(segment: &str) -> bool {
    RE_AUTHOR_PREFIX
        .as_ref()
        .and_then(|re| re.find(segment))
        .is_some_and(|m| m.end() >= segment.trim_end().len())
}

fn looks_like_identifier(segment: &str) -> bool {
    let lower = segment.to_ascii_lowercase();
    ["http", "www", "doi", "pmid", "arxiv", "isbn"]
        .iter()
        .any(|marker| lower.contains(marker))
}

fn is_access_note(segment: &str) -> bool {
    let lower = segment.to_ascii_lowercase();
    ["available", "retrieved", "accessed", "published"]
        .iter()
        .any(|p| lower.starts_with(p))
}

fn clean(raw: &str) -> String {
    raw.trim()
        .trim_matches(['"', '\'', '\u{201c}', '\u{201d}', '*', '_'])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
