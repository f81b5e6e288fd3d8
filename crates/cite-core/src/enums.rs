//! Severity, source type, validation level, and source kind enums.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for logging and storage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a validation issue, ordered from most to least severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SourceType
// ---------------------------------------------------------------------------

/// Classification of the cited work.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    JournalArticle,
    Preprint,
    Guideline,
    Regulatory,
    Book,
    Website,
    #[default]
    Unknown,
}

impl SourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JournalArticle => "journal_article",
            Self::Preprint => "preprint",
            Self::Guideline => "guideline",
            Self::Regulatory => "regulatory",
            Self::Book => "book",
            Self::Website => "website",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValidationLevel
// ---------------------------------------------------------------------------

/// How much verification runs per citation. Levels are strictly additive.
///
/// ```text
/// quick    → parser only, no network
/// standard → quick + registry verifiers
/// thorough → standard + URL correspondence and accessibility
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Quick,
    #[default]
    Standard,
    Thorough,
}

impl ValidationLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Thorough => "thorough",
        }
    }

    /// Whether registry verifiers run at this level.
    #[must_use]
    pub const fn uses_network(self) -> bool {
        !matches!(self, Self::Quick)
    }

    /// Whether URL correspondence runs at this level.
    #[must_use]
    pub const fn checks_correspondence(self) -> bool {
        matches!(self, Self::Thorough)
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "standard" => Ok(Self::Standard),
            "thorough" => Ok(Self::Thorough),
            _ => Err(CoreError::UnknownVariant {
                kind: "validation level",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// An external source that can confirm a citation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Pubmed,
    Doi,
    Arxiv,
    Url,
}

impl SourceKind {
    /// Default verification priority: PMID > DOI > arXiv > URL.
    pub const DEFAULT_PRIORITY: [Self; 4] = [Self::Pubmed, Self::Doi, Self::Arxiv, Self::Url];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pubmed => "pubmed",
            Self::Doi => "doi",
            Self::Arxiv => "arxiv",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pubmed" | "pmid" => Ok(Self::Pubmed),
            "doi" | "crossref" => Ok(Self::Doi),
            "arxiv" => Ok(Self::Arxiv),
            "url" | "web" => Ok(Self::Url),
            _ => Err(CoreError::UnknownVariant {
                kind: "source",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ReferenceKind
// ---------------------------------------------------------------------------

/// Where an extracted reference came from in the surrounding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// An entry of a dedicated References/Sources/Citations section.
    SectionEntry,
    /// An inline bracketed marker such as `[3]`.
    NumericInline,
    /// An inline parenthetical such as `(Smith et al., 2020)`.
    AuthorYearInline,
}

impl ReferenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SectionEntry => "section_entry",
            Self::NumericInline => "numeric_inline",
            Self::AuthorYearInline => "author_year_inline",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
