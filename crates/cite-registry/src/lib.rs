//! # cite-registry
//!
//! Bibliographic registry HTTP clients for Citadel.
//!
//! Confirms that a cited work exists and fetches normalized metadata:
//! - PubMed E-utilities (`esummary`, by PMID)
//! - doi.org resolver plus CrossRef works lookup and bibliographic search
//! - arXiv Atom API
//! - OpenAlex and Semantic Scholar title search (URL recovery)
//! - generic web probes and page fetches
//!
//! Every external API gets its own [`rate_limit::RateLimiter`]. Failures are
//! converted into negative [`VerificationOutcome`]s at the verifier boundary.

pub mod arxiv;
pub mod crossref;
pub mod openalex;
pub mod pubmed;
pub mod rate_limit;
pub mod retry;
pub mod semantic_scholar;
pub mod verifier;
pub mod web;

mod error;
mod http;

pub use error::RegistryError;
pub use http::{FetchedPage, is_reachable};
pub use retry::{RetryConfig, with_retry, with_timing};
pub use verifier::{
    ArxivVerifier, ChainResult, DoiVerifier, PubmedVerifier, SourceVerifier, UrlVerifier,
    VerificationOutcome, Verifier, VerifierChain,
};

use std::sync::Arc;
use std::time::Duration;

use cite_config::{EndpointsConfig, ValidationConfig};
use serde::Serialize;

use crate::rate_limit::Limiters;

/// Redirect hops followed by every request.
pub const MAX_REDIRECTS: usize = 10;

// ── Types ──────────────────────────────────────────────────────────

/// One candidate returned by a bibliographic title search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub doi: Option<String>,
    /// Landing page or canonical URL, if the service reports one.
    pub url: Option<String>,
    pub year: Option<i32>,
    /// Author last names.
    pub authors: Vec<String>,
    /// Service that produced the hit (`crossref`, `openalex`, `semantic_scholar`).
    pub source: &'static str,
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client shared by every verifier and search call.
///
/// Cheap to clone: the connection pool and rate limiters are shared.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    endpoints: EndpointsConfig,
    limiters: Arc<Limiters>,
    retry: RetryConfig,
    contact_email: String,
    ncbi_api_key: String,
    semantic_scholar_api_key: String,
}

impl RegistryClient {
    /// Build a client from the network, endpoint and rate-limit sections.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Client`] if the underlying `reqwest::Client`
    /// fails to build (e.g. TLS backend initialization).
    pub fn new(config: &ValidationConfig) -> Result<Self, RegistryError> {
        let network = &config.network;
        let http = reqwest::Client::builder()
            .user_agent(network.user_agent.clone())
            .timeout(Duration::from_secs(network.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| RegistryError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoints: config.endpoints.clone(),
            limiters: Arc::new(Limiters::from_config(&config.rate_limits, network)),
            retry: RetryConfig::from_network(network),
            contact_email: network.contact_email.clone(),
            ncbi_api_key: network.ncbi_api_key.clone(),
            semantic_scholar_api_key: network.semantic_scholar_api_key.clone(),
        })
    }

    #[must_use]
    pub const fn endpoints(&self) -> &EndpointsConfig {
        &self.endpoints
    }

    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Canonical doi.org URL for `doi`.
    #[must_use]
    pub fn doi_url(&self, doi: &str) -> String {
        format!("{}/{doi}", self.endpoints.doi_resolver.trim_end_matches('/'))
    }

    /// Canonical PubMed article URL for `pmid`.
    #[must_use]
    pub fn pubmed_url(&self, pmid: &str) -> String {
        format!("{}/{pmid}/", self.endpoints.pubmed_web.trim_end_matches('/'))
    }
}

/// Trim the trailing period registries add to titles and collapse whitespace.
pub(crate) fn clean_title(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.trim_end_matches('.').to_string()
}

/// First four-digit year in `raw` (e.g. `"2020 Dec 10"` → 2020).
pub(crate) fn leading_year(raw: &str) -> Option<i32> {
    raw.get(..4).and_then(|y| y.parse().ok())
}
