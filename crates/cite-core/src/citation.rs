//! Parsed citation fields and references extracted from free text.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::{ReferenceKind, SourceType};

/// Maximum number of authors retained per citation.
pub const MAX_AUTHORS: usize = 10;

/// An author as written in a citation: surname plus initials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AuthorName {
    pub last_name: String,
    /// Initials without punctuation, e.g. `"JA"`.
    pub initials: String,
}

impl AuthorName {
    #[must_use]
    pub fn new(last_name: impl Into<String>, initials: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            initials: initials.into(),
        }
    }
}

impl fmt::Display for AuthorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.last_name)?;
        if self.initials.is_empty() {
            return Ok(());
        }
        f.write_str(",")?;
        for c in self.initials.chars() {
            write!(f, " {c}.")?;
        }
        Ok(())
    }
}

/// Structured fields pulled out of one citation string. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedCitation {
    pub doi: Option<String>,
    pub pmid: Option<String>,
    pub arxiv_id: Option<String>,
    pub url: Option<String>,
    pub year: Option<i32>,
    /// Ordered author list, capped at [`MAX_AUTHORS`].
    pub authors: Vec<AuthorName>,
    /// Whether the author list ended with "et al.".
    pub et_al: bool,
    pub title: Option<String>,
    pub journal: Option<String>,
    pub source_type: SourceType,
    /// Format-only credibility in `[0, 100]`.
    pub format_score: f64,
}

impl ParsedCitation {
    /// Whether any identifier usable for verification was found.
    #[must_use]
    pub const fn has_identifier(&self) -> bool {
        self.doi.is_some() || self.pmid.is_some() || self.arxiv_id.is_some() || self.url.is_some()
    }

    /// Surname of the first author, if any.
    #[must_use]
    pub fn first_author_last_name(&self) -> Option<&str> {
        self.authors.first().map(|a| a.last_name.as_str())
    }

    /// Author surnames in citation order.
    #[must_use]
    pub fn last_names(&self) -> Vec<&str> {
        self.authors.iter().map(|a| a.last_name.as_str()).collect()
    }
}

/// Surrounding text for an inline citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceContext {
    /// Up to `window` characters before the citation.
    pub before: String,
    /// Up to `window` characters after the citation.
    pub after: String,
    /// The sentence containing the citation.
    pub sentence: String,
}

/// A citation-like substring found in free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedReference {
    /// The citation text (a full entry, or the inline marker itself).
    pub text: String,
    pub kind: ReferenceKind,
    /// Marker number for `[n]` style references.
    pub number: Option<u32>,
    /// Byte offset of the match in the source text.
    pub offset: usize,
    /// Present only for the context-extracting variant.
    pub context: Option<ReferenceContext>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_display() {
        assert_eq!(AuthorName::new("Smith", "J").to_string(), "Smith, J.");
        assert_eq!(AuthorName::new("Baden", "LR").to_string(), "Baden, L. R.");
        assert_eq!(AuthorName::new("WHO", "").to_string(), "WHO");
    }

    #[test]
    fn has_identifier_checks_every_field() {
        let mut parsed = ParsedCitation::default();
        assert!(!parsed.has_identifier());
        parsed.arxiv_id = Some("2301.12345".into());
        assert!(parsed.has_identifier());
    }

    #[test]
    fn first_author() {
        let parsed = ParsedCitation {
            authors: vec![AuthorName::new("Smith", "J"), AuthorName::new("Doe", "A")],
            ..ParsedCitation::default()
        };
        assert_eq!(parsed.first_author_last_name(), Some("Smith"));
        assert_eq!(parsed.last_names(), vec!["Smith", "Doe"]);
    }
}
