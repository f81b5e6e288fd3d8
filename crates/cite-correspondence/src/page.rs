//! Bibliographic metadata scraped from an HTML landing page.
//!
//! Publishers expose Highwire (`citation_*`), Dublin Core (`dc.*`,
//! `dcterms.*`), Open Graph and PRISM meta tags. Tag names are compared
//! case-insensitively and the first non-empty tag in priority order wins.

use std::sync::LazyLock;

use cite_core::citation::MAX_AUTHORS;
use regex::Regex;

macro_rules! pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

pattern!(RE_META_TAG, r"(?is)<meta\b[^>]*>");
pattern!(
    RE_ATTRIBUTE,
    r#"(?is)([a-z_:.\-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#
);
pattern!(RE_TITLE_TAG, r"(?is)<title[^>]*>(.*?)</title>");
pattern!(RE_YEAR, r"\b(\d{4})\b");
// ` | Nature`, ` - PubMed`, ` – The BMJ`, ` :: Site`
pattern!(RE_SITE_SUFFIX, r"\s+(?:\||-|–|—|::|·)\s+[^|–—·\-]{1,80}$");

pub const TITLE_TAGS: &[&str] = &["citation_title", "dc.title", "dcterms.title", "og:title"];
pub const AUTHOR_TAGS: &[&str] = &["citation_author", "dc.creator", "author"];
pub const DATE_TAGS: &[&str] = &[
    "citation_publication_date",
    "citation_date",
    "dc.date",
    "article:published_time",
    "prism.publicationdate",
];

const MIN_YEAR: i32 = 1900;

/// What the page says about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub year: Option<i32>,
}

impl PageMetadata {
    /// Extract title, authors and year from `html`.
    ///
    /// Years outside `[1900, current_year + 1]` are ignored.
    #[must_use]
    pub fn extract(html: &str, current_year: i32) -> Self {
        let tags = meta_tags(html);

        let title = TITLE_TAGS
            .iter()
            .find_map(|key| values(&tags, key).next().map(str::to_string))
            .or_else(|| title_element(html));

        let authors = AUTHOR_TAGS
            .iter()
            .map(|key| {
                values(&tags, key)
                    .map(str::to_string)
                    .take(MAX_AUTHORS)
                    .collect::<Vec<_>>()
            })
            .find(|found| !found.is_empty())
            .unwrap_or_default();

        let year = DATE_TAGS
            .iter()
            .flat_map(|key| values(&tags, key))
            .find_map(|date| year_in(date, current_year));

        Self {
            title,
            authors,
            year,
        }
    }
}

/// Non-empty contents of every tag named `key`, in document order.
fn values<'a>(tags: &'a [(String, String)], key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    tags.iter()
        .filter(move |(name, _)| name == key)
        .map(|(_, content)| content.as_str())
        .filter(|c| !c.is_empty())
}

/// `(lowercased name or property, decoded content)` for every meta tag.
fn meta_tags(html: &str) -> Vec<(String, String)> {
    let (Some(re_meta), Some(re_attr)) = (RE_META_TAG.as_ref(), RE_ATTRIBUTE.as_ref()) else {
        return Vec::new();
    };
    re_meta
        .find_iter(html)
        .filter_map(|tag| {
            let mut name = None;
            let mut content = None;
            for caps in re_attr.captures_iter(tag.as_str()) {
                let key = caps[1].to_ascii_lowercase();
                let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                match key.as_str() {
                    "name" | "property" | "itemprop" if name.is_none() => {
                        name = Some(value.trim().to_ascii_lowercase());
                    }
                    "content" => content = Some(normalize(value)),
                    _ => {}
                }
            }
            Some((name?, content?))
        })
        .collect()
}

fn title_element(html: &str) -> Option<String> {
    let raw = RE_TITLE_TAG.as_ref()?.captures(html)?.get(1)?.as_str();
    let title = normalize(raw);
    let stripped = RE_SITE_SUFFIX
        .as_ref()
        .map_or(title.as_str(), |re| re.find(&title).map_or(title.as_str(), |m| &title[..m.start()]));
    let stripped = stripped.trim();
    if stripped.is_empty() {
        (!title.is_empty()).then_some(title.clone())
    } else {
        Some(stripped.to_string())
    }
}

fn year_in(date: &str, current_year: i32) -> Option<i32> {
    RE_YEAR
        .as_ref()?
        .captures_iter(date)
        .filter_map(|c| c[1].parse::<i32>().ok())
        .find(|y| (MIN_YEAR..=current_year + 1).contains(y))
}

/// Decode the handful of entities publishers use and collapse whitespace.
fn normalize(raw: &str) -> String {
    let decoded = raw
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"<!DOCTYPE html>
<html><head>
  <title>Deep learning | Nature</title>
  <meta property="og:title" content="Deep learning - Nature article" />
  <meta name="citation_title" content="Deep learning">
  <meta name="citation_author" content="LeCun, Yann">
  <meta name="citation_author" content="Bengio, Yoshua">
  <meta name="citation_author" content="Hinton, Geoffrey">
  <meta name="citation_publication_date" content="2015/05/27">
  <meta name="dc.date" content="1999-01-01">
</head><body></body></html>"#;

    #[test]
    fn highwire_tags_win() {
        let meta = PageMetadata::extract(FIXTURE, 2026);
        assert_eq!(meta.title.as_deref(), Some("Deep learning"));
        assert_eq!(
            meta.authors,
            vec!["LeCun, Yann", "Bengio, Yoshua", "Hinton, Geoffrey"]
        );
        assert_eq!(meta.year, Some(2015));
    }

    #[test]
    fn title_element_loses_site_suffix() {
        let html = "<html><head><title>Safety of mRNA vaccines &amp; boosters - PubMed</title></head></html>";
        let meta = PageMetadata::extract(html, 2026);
        assert_eq!(meta.title.as_deref(), Some("Safety of mRNA vaccines & boosters"));
        assert!(meta.authors.is_empty());
        assert_eq!(meta.year, None);
    }

    #[test]
    fn dublin_core_and_single_quotes() {
        let html = r"<meta name='DC.Title' content='Guidelines for hypertension'>
            <meta name='DC.Creator' content='Whelton PK'>
            <meta property='article:published_time' content='2018-11-13T00:00:00Z'>";
        let meta = PageMetadata::extract(html, 2026);
        assert_eq!(meta.title.as_deref(), Some("Guidelines for hypertension"));
        assert_eq!(meta.authors, vec!["Whelton PK"]);
        assert_eq!(meta.year, Some(2018));
    }

    #[test]
    fn out_of_range_years_are_ignored() {
        let html = r#"<meta name="citation_date" content="3020-01-01">
            <meta name="dc.date" content="1850">"#;
        assert_eq!(PageMetadata::extract(html, 2026).year, None);
    }

    #[test]
    fn authors_are_capped() {
        let tags: String = (0..15)
            .map(|i| format!(r#"<meta name="citation_author" content="Author{i}, A">"#))
            .collect();
        assert_eq!(PageMetadata::extract(&tags, 2026).authors.len(), MAX_AUTHORS);
    }

    #[test]
    fn empty_page_has_nothing() {
        assert_eq!(PageMetadata::extract("", 2026), PageMetadata::default());
    }
}
