//! Minimum intervals between calls to each external API, in milliseconds.

use serde::{Deserialize, Serialize};

/// NCBI allows 3 requests/second without a key.
const fn default_pubmed_ms() -> u64 {
    340
}

/// 10 requests/second with an NCBI key.
const fn default_pubmed_with_key_ms() -> u64 {
    100
}

const fn default_crossref_ms() -> u64 {
    100
}

const fn default_arxiv_ms() -> u64 {
    334
}

const fn default_web_ms() -> u64 {
    100
}

const fn default_search_ms() -> u64 {
    340
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_pubmed_ms")]
    pub pubmed_ms: u64,

    #[serde(default = "default_pubmed_with_key_ms")]
    pub pubmed_with_key_ms: u64,

    /// doi.org and CrossRef share one limiter.
    #[serde(default = "default_crossref_ms")]
    pub crossref_ms: u64,

    #[serde(default = "default_arxiv_ms")]
    pub arxiv_ms: u64,

    /// Generic URL probes and page fetches.
    #[serde(default = "default_web_ms")]
    pub web_ms: u64,

    /// OpenAlex and Semantic Scholar title searches.
    #[serde(default = "default_search_ms")]
    pub search_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            pubmed_ms: default_pubmed_ms(),
            pubmed_with_key_ms: default_pubmed_with_key_ms(),
            crossref_ms: default_crossref_ms(),
            arxiv_ms: default_arxiv_ms(),
            web_ms: default_web_ms(),
            search_ms: default_search_ms(),
        }
    }
}

impl RateLimitConfig {
    /// The PubMed interval that applies given whether an API key is set.
    #[must_use]
    pub const fn pubmed_interval_ms(&self, has_key: bool) -> u64 {
        if has_key {
            self.pubmed_with_key_ms
        } else {
            self.pubmed_ms
        }
    }

    /// All intervals set to zero. Useful for fixture servers.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            pubmed_ms: 0,
            pubmed_with_key_ms: 0,
            crossref_ms: 0,
            arxiv_ms: 0,
            web_ms: 0,
            search_ms: 0,
        }
    }
}
