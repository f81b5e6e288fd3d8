//! Pull citation-like substrings out of free text.
//!
//! A dedicated References / Sources / Citations / Bibliography / Works Cited
//! section wins when present. Otherwise inline markers are collected:
//! bracketed numbers (`[3]`) and parenthetical author-year citations
//! (`(Smith et al., 2020)`).

use std::collections::HashSet;

use cite_core::{ExtractedReference, ReferenceContext, ReferenceKind};

use crate::patterns::{
    RE_BULLET_PREFIX, RE_ENTRY_MARKER, RE_INLINE_AUTHOR_YEAR, RE_INLINE_NUMERIC,
    RE_MARKDOWN_HEADING, RE_SECTION_HEADING,
};

/// Entries of a line-per-reference section shorter than this are dropped.
const MIN_LINE_ENTRY_CHARS: usize = 20;

/// A reference plus the byte offset just past its last source character.
///
/// Joined section entries are shorter than the text they span, so the end
/// cannot be recovered from `offset + text.len()`.
type Span = (ExtractedReference, usize);

/// Extract references from `text`. Empty input yields an empty vector.
#[must_use]
pub fn extract(text: &str) -> Vec<ExtractedReference> {
    spans(text).into_iter().map(|(reference, _)| reference).collect()
}

/// Like [`extract`], with up to `window` characters of context on each side
/// and the sentence containing each reference.
#[must_use]
pub fn extract_with_context(text: &str, window: usize) -> Vec<ExtractedReference> {
    spans(text)
        .into_iter()
        .map(|(mut reference, end)| {
            let mut context = context_around(text, reference.offset, end, window);
            if reference.kind == ReferenceKind::SectionEntry {
                context.sentence.clone_from(&reference.text);
            }
            reference.context = Some(context);
            reference
        })
        .collect()
}

fn spans(text: &str) -> Vec<Span> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let section = section_entries(text);
    if !section.is_empty() {
        tracing::debug!(entries = section.len(), "extracted references section");
        return section;
    }
    let inline = inline_references(text);
    tracing::debug!(entries = inline.len(), "extracted inline references");
    inline
}

// ---------------------------------------------------------------------------
// Section mode
// ---------------------------------------------------------------------------

/// Byte range of the references section body, if a heading is found.
fn section_body(text: &str) -> Option<(usize, &str)> {
    let heading = RE_SECTION_HEADING.as_ref()?.find(text)?;
    let start = heading.end();
    let rest = &text[start..];
    let end = RE_MARKDOWN_HEADING
        .as_ref()
        .and_then(|re| re.find(rest))
        .map_or(rest.len(), |m| m.start());
    Some((start, &rest[..end]))
}

fn section_entries(text: &str) -> Vec<Span> {
    let Some((base, body)) = section_body(text) else {
        return Vec::new();
    };
    let lines = lines_with_offsets(body, base);
    let numbered = RE_ENTRY_MARKER
        .as_ref()
        .is_some_and(|re| lines.iter().any(|(_, line)| re.is_match(line)));

    if numbered {
        numbered_entries(&lines)
    } else {
        line_entries(&lines)
    }
}

fn lines_with_offsets(body: &str, base: usize) -> Vec<(usize, &str)> {
    let mut offset = base;
    body.split_inclusive('\n')
        .map(|raw| {
            let line = (offset, raw.trim_end_matches(['\n', '\r']));
            offset += raw.len();
            line
        })
        .collect()
}

/// Split on leading `[n]` markers; lines without a marker continue the
/// previous entry until a blank line.
fn numbered_entries(lines: &[(usize, &str)]) -> Vec<Span> {
    let Some(marker) = RE_ENTRY_MARKER.as_ref() else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    let mut current: Option<Span> = None;

    for &(offset, line) in lines {
        let line_end = offset + line.trim_end().len();
        if let Some(caps) = marker.captures(line) {
            entries.extend(current.take());
            let Some(whole) = caps.get(0) else { continue };
            let reference = ExtractedReference {
                text: line[whole.end()..].trim().to_string(),
                kind: ReferenceKind::SectionEntry,
                number: caps.get(1).and_then(|n| n.as_str().parse().ok()),
                offset: offset + whole.end(),
                context: None,
            };
            current = Some((reference, line_end.max(offset + whole.end())));
        } else if line.trim().is_empty() {
            entries.extend(current.take());
        } else if let Some((entry, end)) = current.as_mut() {
            entry.text.push(' ');
            entry.text.push_str(line.trim());
            *end = line_end;
        }
    }
    entries.extend(current);
    entries.retain(|(e, _)| !e.text.is_empty());
    entries
}

fn line_entries(lines: &[(usize, &str)]) -> Vec<Span> {
    lines
        .iter()
        .filter_map(|&(offset, line)| {
            let prefix_len = RE_BULLET_PREFIX
                .as_ref()
                .and_then(|re| re.find(line))
                .map_or(0, |m| m.end());
            let content = &line[prefix_len..];
            let trimmed = content.trim();
            if trimmed.chars().count() <= MIN_LINE_ENTRY_CHARS {
                return None;
            }
            let start = offset + prefix_len + (content.len() - content.trim_start().len());
            let reference = ExtractedReference {
                text: trimmed.to_string(),
                kind: ReferenceKind::SectionEntry,
                number: None,
                offset: start,
                context: None,
            };
            Some((reference, start + trimmed.len()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Inline mode
// ---------------------------------------------------------------------------

fn inline_references(text: &str) -> Vec<Span> {
    let mut found = Vec::new();

    if let Some(re) = RE_INLINE_NUMERIC.as_ref() {
        let mut seen = HashSet::new();
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(number)) =
                (caps.get(0), caps.get(1).and_then(|n| n.as_str().parse::<u32>().ok()))
            else {
                continue;
            };
            if seen.insert(number) {
                let reference = ExtractedReference {
                    text: whole.as_str().to_string(),
                    kind: ReferenceKind::NumericInline,
                    number: Some(number),
                    offset: whole.start(),
                    context: None,
                };
                found.push((reference, whole.end()));
            }
        }
    }

    if let Some(re) = RE_INLINE_AUTHOR_YEAR.as_ref() {
        let mut seen = HashSet::new();
        for m in re.find_iter(text) {
            if seen.insert(m.as_str()) {
                let reference = ExtractedReference {
                    text: m.as_str().to_string(),
                    kind: ReferenceKind::AuthorYearInline,
                    number: None,
                    offset: m.start(),
                    context: None,
                };
                found.push((reference, m.end()));
            }
        }
    }

    found.sort_by_key(|(r, _)| r.offset);
    found
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

const SENTENCE_BREAKS: [char; 4] = ['.', '!', '?', '\n'];

/// Largest char boundary in `text` at or before `index`.
fn floor_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Context around `text[start..end]`. Offsets are snapped down to char
/// boundaries.
fn context_around(text: &str, start: usize, end: usize, window: usize) -> ReferenceContext {
    let start = floor_boundary(text, start);
    let end = floor_boundary(text, end.max(start));

    let head = &text[..start];
    let tail = &text[end..];

    let before_chars: Vec<char> = head.chars().rev().take(window).collect();
    let before: String = before_chars.into_iter().rev().collect();
    let after: String = tail.chars().take(window).collect();

    let sentence_start = head.rfind(SENTENCE_BREAKS).map_or(0, |i| i + 1);
    let sentence_end = tail
        .find(SENTENCE_BREAKS)
        .map_or(text.len(), |i| end + i + 1)
        .min(text.len());
    let sentence = text
        .get(sentence_start..sentence_end)
        .unwrap_or_default()
        .trim()
        .to_string();

    ReferenceContext {
        before,
        after,
        sentence,
    }
}
