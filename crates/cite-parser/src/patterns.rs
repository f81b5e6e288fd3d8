//! Compiled regular expressions shared by the parser and extractor.
//!
//! Patterns compile lazily on first use. A pattern that fails to compile is
//! `None` and its rule simply never matches.

use regex::Regex;
use std::sync::LazyLock;

macro_rules! pattern {
    ($name:ident, $regex_str:expr) => {
        pub static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

// ── Identifiers ───────────────────────────────────────────────────────────
pattern!(
    RE_DOI,
    r"(?i)(?:doi:\s*|https?://(?:dx\.)?doi\.org/)?(10\.\d{4,}/\S+)"
);
pattern!(RE_PMID, r"(?i)\bpmid:\s*(\d{7,8})\b");
pattern!(RE_ARXIV, r"(?i)\barxiv:\s*(\d{4}\.\d{4,5}(?:v\d+)?)");
pattern!(
    RE_ARXIV_URL,
    r"(?i)arxiv\.org/(?:abs|pdf)/(\d{4}\.\d{4,5}(?:v\d+)?)"
);
pattern!(RE_URL, r#"https?://[^\s<>"{}|\\^`\[\]]+"#);
pattern!(RE_YEAR_PAREN, r"\((\d{4})[a-z]?(?:,[^)]*)?\)");

// ── Authors ───────────────────────────────────────────────────────────────
// APA: `Smith, J.` / `Smith, J. A.` / `van der Berg, K.`
pattern!(
    RE_AUTHOR_APA,
    r"\b((?:(?:van|von|de|der|den|del|da|di|du|le|la|dos)\s){0,2}[A-Z][\p{L}'\-]+(?:\s[A-Z][\p{L}'\-]+)?),\s((?:[A-Z]\.\s?){1,3})"
);
// Vancouver: `Smith J` / `Smith JA` within one comma-separated piece.
pattern!(
    RE_AUTHOR_VANCOUVER,
    r"^((?:(?:van|von|de|der|den|del|da|di|du|le|la|dos)\s){0,2}[A-Z][\p{L}'\-]+(?:\s[A-Z][\p{L}'\-]+)*)\s+([A-Z]{1,3})$"
);
pattern!(RE_ET_AL, r"(?i)\bet\s+al\b\.?");
// A run of author names at the start of a citation.
pattern!(
    RE_AUTHOR_PREFIX,
    r"^\s*(?:(?:(?:van|von|de|der|den|del|da|di|du|le|la|dos)\s){0,2}[A-Z][\p{L}'\-]+(?:\s[A-Z][\p{L}'\-]+)?,?\s+(?:(?:[A-Z]\.\s?){1,3}|[A-Z]{1,3}\b\.?)\s*[,;]?\s*(?:(?:and|&)\s+)?)+(?:et\s+al\.?\s*)?"
);

// ── Title / journal ───────────────────────────────────────────────────────
pattern!(
    RE_TITLE_AFTER_YEAR,
    r"\(\d{4}[a-z]?(?:,[^)]*)?\)\.?\s*([^.]+)\."
);
pattern!(RE_LEADING_YEAR, r"^\s*\(\d{4}[a-z]?(?:,[^)]*)?\)\s*[.:,]?\s*");
pattern!(RE_VOLUME_ISSUE, r"\d+\s*\(\d+\)");
pattern!(RE_JOURNAL_BEFORE_NUMBER, r"^\s*([^,.;]{2,120}?),\s*\d");

// ── Classification keywords ───────────────────────────────────────────────
pattern!(
    RE_GUIDELINE_KEYWORD,
    r"(?i)\b(?:guidelines?|guidance|recommendations?|consensus statement|position statement|practice parameter)\b"
);
pattern!(
    RE_PREPRINT_KEYWORD,
    r"(?i)\b(?:arxiv|biorxiv|medrxiv|preprint|ssrn|research square)\b"
);
pattern!(
    RE_JOURNAL_KEYWORD,
    r"(?i)\b(?:journal|lancet|nejm|n engl j med|bmj|jama|nature|science|cell|plos|annals|proceedings|transactions)\b"
);
pattern!(
    RE_BOOK_KEYWORD,
    r"(?i)\b(?:isbn|edition|publisher|press|handbook|textbook)\b"
);

// ── Reference extraction ──────────────────────────────────────────────────
pattern!(
    RE_SECTION_HEADING,
    r"(?im)^[ \t]*(?:#{1,6}[ \t]*)?(?:\*\*|__)?[ \t]*(?:references|sources|citations|bibliography|works cited)[ \t]*:?[ \t]*(?:\*\*|__)?[ \t]*:?[ \t\r]*$"
);
pattern!(RE_MARKDOWN_HEADING, r"(?m)^[ \t]*#{1,6}[ \t]+\S");
pattern!(RE_ENTRY_MARKER, r"^\s*\[(\d+)\]\s*");
pattern!(RE_BULLET_PREFIX, r"^\s*(?:[-*•+]|\d+[.)])\s+");
pattern!(RE_INLINE_NUMERIC, r"\[(\d{1,4})\]");
pattern!(
    RE_INLINE_AUTHOR_YEAR,
    r"\([A-Z][\p{L}'\-]+(?:\s+et\s+al\.?|\s+(?:and|&)\s+[A-Z][\p{L}'\-]+)?,?\s+\d{4}[a-z]?\)"
);

/// Iterate the compiled patterns, for a compile smoke test.
#[cfg(test)]
pub(crate) fn all_patterns() -> Vec<(&'static str, &'static LazyLock<Option<Regex>>)> {
    vec![
        ("doi", &RE_DOI),
        ("pmid", &RE_PMID),
        ("arxiv", &RE_ARXIV),
        ("arxiv_url", &RE_ARXIV_URL),
        ("url", &RE_URL),
        ("year_paren", &RE_YEAR_PAREN),
        ("author_apa", &RE_AUTHOR_APA),
        ("author_vancouver", &RE_AUTHOR_VANCOUVER),
        ("et_al", &RE_ET_AL),
        ("author_prefix", &RE_AUTHOR_PREFIX),
        ("title_after_year", &RE_TITLE_AFTER_YEAR),
        ("leading_year", &RE_LEADING_YEAR),
        ("volume_issue", &RE_VOLUME_ISSUE),
        ("journal_before_number", &RE_JOURNAL_BEFORE_NUMBER),
        ("guideline_keyword", &RE_GUIDELINE_KEYWORD),
        ("preprint_keyword", &RE_PREPRINT_KEYWORD),
        ("journal_keyword", &RE_JOURNAL_KEYWORD),
        ("book_keyword", &RE_BOOK_KEYWORD),
        ("section_heading", &RE_SECTION_HEADING),
        ("markdown_heading", &RE_MARKDOWN_HEADING),
        ("entry_marker", &RE_ENTRY_MARKER),
        ("bullet_prefix", &RE_BULLET_PREFIX),
        ("inline_numeric", &RE_INLINE_NUMERIC),
        ("inline_author_year", &RE_INLINE_AUTHOR_YEAR),
    ]
}
