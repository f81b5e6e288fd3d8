//! Source verifiers and the priority-ordered verifier chain.
//!
//! Each verifier confirms existence through one registry and never fails:
//! transport, status and parse errors all become an unverified
//! [`VerificationOutcome`] carrying the error message.

use std::future::Future;

use cite_config::SourcesConfig;
use cite_core::{CitationMetadata, ParsedCitation, SourceKind, SourceType, ValidationChecks};

use crate::http::is_reachable;
use crate::retry::with_timing;
use crate::web::is_reliable_domain;
use crate::RegistryClient;

pub const PUBMED_CONTRIBUTION: f64 = 70.0;
pub const DOI_CONTRIBUTION: f64 = 65.0;
pub const ARXIV_CONTRIBUTION: f64 = 60.0;
pub const URL_CONTRIBUTION: f64 = 50.0;
pub const RELIABLE_DOMAIN_BONUS: f64 = 15.0;

/// Result of asking one registry about one citation.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub kind: SourceKind,
    pub verified: bool,
    /// Normalized metadata reported by the registry (empty on failure).
    pub metadata: CitationMetadata,
    /// Classification implied by the registry, if it implies one.
    pub source_type: Option<SourceType>,
    /// Credibility the registry lends the citation (0 on failure).
    pub contribution: f64,
    pub confidence: f64,
    pub error: Option<String>,
}

impl VerificationOutcome {
    #[must_use]
    pub const fn success(
        kind: SourceKind,
        metadata: CitationMetadata,
        source_type: Option<SourceType>,
        contribution: f64,
        confidence: f64,
    ) -> Self {
        Self {
            kind,
            verified: true,
            metadata,
            source_type,
            contribution,
            confidence,
            error: None,
        }
    }

    #[must_use]
    pub fn failure(kind: SourceKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            verified: false,
            metadata: CitationMetadata::default(),
            source_type: None,
            contribution: 0.0,
            confidence: 0.0,
            error: Some(error.into()),
        }
    }

    /// Record this outcome in the matching check flag.
    pub const fn record(&self, checks: &mut ValidationChecks) {
        let flag = Some(self.verified);
        match self.kind {
            SourceKind::Pubmed => checks.pubmed_verified = flag,
            SourceKind::Doi => checks.doi_valid = flag,
            SourceKind::Arxiv => checks.arxiv_verified = flag,
            SourceKind::Url => checks.url_accessible = flag,
        }
    }
}

/// A registry that can confirm a citation exists.
pub trait SourceVerifier {
    fn kind(&self) -> SourceKind;

    /// Whether the citation carries the identifier this verifier needs.
    fn can_handle(&self, parsed: &ParsedCitation) -> bool;

    fn verify(&self, parsed: &ParsedCitation) -> impl Future<Output = VerificationOutcome> + Send;
}

// ── PubMed ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PubmedVerifier {
    client: RegistryClient,
}

impl PubmedVerifier {
    #[must_use]
    pub const fn new(client: RegistryClient) -> Self {
        Self { client }
    }
}

impl SourceVerifier for PubmedVerifier {
    fn kind(&self) -> SourceKind {
        SourceKind::Pubmed
    }

    fn can_handle(&self, parsed: &ParsedCitation) -> bool {
        parsed.pmid.is_some()
    }

    async fn verify(&self, parsed: &ParsedCitation) -> VerificationOutcome {
        let Some(pmid) = parsed.pmid.as_deref() else {
            return VerificationOutcome::failure(self.kind(), "no PMID");
        };
        match self.client.pubmed_summary(pmid).await {
            Ok(Some(metadata)) => VerificationOutcome::success(
                self.kind(),
                metadata,
                Some(SourceType::JournalArticle),
                PUBMED_CONTRIBUTION,
                0.95,
            ),
            Ok(None) => VerificationOutcome::failure(self.kind(), format!("PMID {pmid} not found")),
            Err(e) => {
                tracing::warn!(source = "pubmed", pmid, %e, "verification failed");
                VerificationOutcome::failure(self.kind(), e.to_string())
            }
        }
    }
}

// ── DOI ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DoiVerifier {
    client: RegistryClient,
}

impl DoiVerifier {
    #[must_use]
    pub const fn new(client: RegistryClient) -> Self {
        Self { client }
    }
}

impl SourceVerifier for DoiVerifier {
    fn kind(&self) -> SourceKind {
        SourceKind::Doi
    }

    fn can_handle(&self, parsed: &ParsedCitation) -> bool {
        parsed.doi.is_some()
    }

    async fn verify(&self, parsed: &ParsedCitation) -> VerificationOutcome {
        let Some(doi) = parsed.doi.as_deref() else {
            return VerificationOutcome::failure(self.kind(), "no DOI");
        };
        let status = match self.client.resolve_doi(doi).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(source = "doi", doi, %e, "verification failed");
                return VerificationOutcome::failure(self.kind(), e.to_string());
            }
        };
        if !is_reachable(status) {
            return VerificationOutcome::failure(
                self.kind(),
                format!("DOI {doi} did not resolve (HTTP {status})"),
            );
        }

        // Metadata is a bonus; the resolver already proved existence.
        let mut metadata = match self.client.crossref_work(doi).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => CitationMetadata::default(),
            Err(e) => {
                tracing::debug!(source = "crossref", doi, %e, "metadata lookup failed");
                CitationMetadata::default()
            }
        };
        metadata.doi = Some(doi.to_string());
        metadata.url = Some(self.client.doi_url(doi));
        let source_type = (metadata.peer_reviewed == Some(true)).then_some(SourceType::JournalArticle);

        VerificationOutcome::success(self.kind(), metadata, source_type, DOI_CONTRIBUTION, 0.90)
    }
}

// ── arXiv ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ArxivVerifier {
    client: RegistryClient,
}

impl ArxivVerifier {
    #[must_use]
    pub const fn new(client: RegistryClient) -> Self {
        Self { client }
    }
}

impl SourceVerifier for ArxivVerifier {
    fn kind(&self) -> SourceKind {
        SourceKind::Arxiv
    }

    fn can_handle(&self, parsed: &ParsedCitation) -> bool {
        parsed.arxiv_id.is_some()
    }

    async fn verify(&self, parsed: &ParsedCitation) -> VerificationOutcome {
        let Some(id) = parsed.arxiv_id.as_deref() else {
            return VerificationOutcome::failure(self.kind(), "no arXiv id");
        };
        match self.client.arxiv_entry(id).await {
            Ok(Some(metadata)) => VerificationOutcome::success(
                self.kind(),
                metadata,
                Some(SourceType::Preprint),
                ARXIV_CONTRIBUTION,
                0.85,
            ),
            Ok(None) => VerificationOutcome::failure(self.kind(), format!("arXiv {id} not found")),
            Err(e) => {
                tracing::warn!(source = "arxiv", arxiv_id = id, %e, "verification failed");
                VerificationOutcome::failure(self.kind(), e.to_string())
            }
        }
    }
}

// ── Generic URL ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UrlVerifier {
    client: RegistryClient,
}

impl UrlVerifier {
    #[must_use]
    pub const fn new(client: RegistryClient) -> Self {
        Self { client }
    }
}

impl SourceVerifier for UrlVerifier {
    fn kind(&self) -> SourceKind {
        SourceKind::Url
    }

    fn can_handle(&self, parsed: &ParsedCitation) -> bool {
        parsed.url.is_some()
    }

    async fn verify(&self, parsed: &ParsedCitation) -> VerificationOutcome {
        let Some(url) = parsed.url.as_deref() else {
            return VerificationOutcome::failure(self.kind(), "no URL");
        };
        let status = match self.client.probe(url).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(source = "url", url, %e, "verification failed");
                return VerificationOutcome::failure(self.kind(), e.to_string());
            }
        };
        if !is_reachable(status) {
            return VerificationOutcome::failure(
                self.kind(),
                format!("URL not accessible (HTTP {status})"),
            );
        }
        let contribution = if is_reliable_domain(url) {
            URL_CONTRIBUTION + RELIABLE_DOMAIN_BONUS
        } else {
            URL_CONTRIBUTION
        };
        let metadata = CitationMetadata {
            url: Some(url.to_string()),
            ..CitationMetadata::default()
        };
        VerificationOutcome::success(self.kind(), metadata, None, contribution, 0.75)
    }
}

// ── Dispatch ───────────────────────────────────────────────────────

/// Every verifier, dispatched statically.
#[derive(Debug, Clone)]
pub enum Verifier {
    Pubmed(PubmedVerifier),
    Doi(DoiVerifier),
    Arxiv(ArxivVerifier),
    Url(UrlVerifier),
}

impl Verifier {
    #[must_use]
    pub const fn for_kind(kind: SourceKind, client: RegistryClient) -> Self {
        match kind {
            SourceKind::Pubmed => Self::Pubmed(PubmedVerifier::new(client)),
            SourceKind::Doi => Self::Doi(DoiVerifier::new(client)),
            SourceKind::Arxiv => Self::Arxiv(ArxivVerifier::new(client)),
            SourceKind::Url => Self::Url(UrlVerifier::new(client)),
        }
    }
}

impl SourceVerifier for Verifier {
    fn kind(&self) -> SourceKind {
        match self {
            Self::Pubmed(v) => v.kind(),
            Self::Doi(v) => v.kind(),
            Self::Arxiv(v) => v.kind(),
            Self::Url(v) => v.kind(),
        }
    }

    fn can_handle(&self, parsed: &ParsedCitation) -> bool {
        match self {
            Self::Pubmed(v) => v.can_handle(parsed),
            Self::Doi(v) => v.can_handle(parsed),
            Self::Arxiv(v) => v.can_handle(parsed),
            Self::Url(v) => v.can_handle(parsed),
        }
    }

    async fn verify(&self, parsed: &ParsedCitation) -> VerificationOutcome {
        match self {
            Self::Pubmed(v) => v.verify(parsed).await,
            Self::Doi(v) => v.verify(parsed).await,
            Self::Arxiv(v) => v.verify(parsed).await,
            Self::Url(v) => v.verify(parsed).await,
        }
    }
}

// ── Chain ──────────────────────────────────────────────────────────

/// What the chain did for one citation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainResult {
    /// The first successful outcome, if any.
    pub outcome: Option<VerificationOutcome>,
    /// Sources actually queried, in order.
    pub attempted: Vec<SourceKind>,
    /// Unsuccessful outcomes preceding the success (or all of them).
    pub failures: Vec<VerificationOutcome>,
}

impl ChainResult {
    #[must_use]
    pub const fn verified(&self) -> bool {
        self.outcome.is_some()
    }

    /// Check flags for every attempted source.
    #[must_use]
    pub fn checks(&self) -> ValidationChecks {
        let mut checks = ValidationChecks::default();
        for outcome in self.failures.iter().chain(self.outcome.as_ref()) {
            outcome.record(&mut checks);
        }
        checks
    }
}

/// Enabled verifiers in configured priority order. The first success wins.
#[derive(Debug, Clone)]
pub struct VerifierChain {
    verifiers: Vec<Verifier>,
}

impl VerifierChain {
    #[must_use]
    pub fn new(client: &RegistryClient, sources: &SourcesConfig) -> Self {
        Self {
            verifiers: sources
                .enabled_in_order()
                .map(|kind| Verifier::for_kind(kind, client.clone()))
                .collect(),
        }
    }

    /// Source kinds in the order they will be tried.
    #[must_use]
    pub fn order(&self) -> Vec<SourceKind> {
        self.verifiers.iter().map(SourceVerifier::kind).collect()
    }

    pub async fn verify(&self, parsed: &ParsedCitation) -> ChainResult {
        let mut result = ChainResult::default();
        for verifier in self.verifiers.iter().filter(|v| v.can_handle(parsed)) {
            let kind = verifier.kind();
            let (outcome, elapsed) = with_timing(verifier.verify(parsed)).await;
            tracing::debug!(
                source = %kind,
                verified = outcome.verified,
                elapsed_ms = elapsed.as_millis(),
                "source attempted"
            );
            result.attempted.push(kind);
            if outcome.verified {
                result.outcome = Some(outcome);
                break;
            }
            result.failures.push(outcome);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cite_config::ValidationConfig;

    fn client() -> RegistryClient {
        RegistryClient::new(&ValidationConfig::offline("http://127.0.0.1:9")).unwrap()
    }

    #[test]
    fn chain_follows_configured_priority() {
        let sources = SourcesConfig {
            priority: vec![SourceKind::Url, SourceKind::Doi, SourceKind::Pubmed, SourceKind::Arxiv],
            arxiv: false,
            ..SourcesConfig::default()
        };
        let chain = VerifierChain::new(&client(), &sources);
        assert_eq!(
            chain.order(),
            vec![SourceKind::Url, SourceKind::Doi, SourceKind::Pubmed]
        );
    }

    #[test]
    fn default_chain_order() {
        let chain = VerifierChain::new(&client(), &SourcesConfig::default());
        assert_eq!(chain.order(), SourceKind::DEFAULT_PRIORITY.to_vec());
    }

    #[test]
    fn can_handle_needs_identifier() {
        let parsed = ParsedCitation {
            doi: Some("10.1000/xyz".into()),
            ..ParsedCitation::default()
        };
        assert!(Verifier::for_kind(SourceKind::Doi, client()).can_handle(&parsed));
        assert!(!Verifier::for_kind(SourceKind::Pubmed, client()).can_handle(&parsed));
        assert!(!Verifier::for_kind(SourceKind::Url, client()).can_handle(&parsed));
    }

    #[tokio::test]
    async fn chain_without_identifiers_attempts_nothing() {
        let chain = VerifierChain::new(&client(), &SourcesConfig::default());
        let result = chain.verify(&ParsedCitation::default()).await;
        assert!(!result.verified());
        assert!(result.attempted.is_empty());
        assert_eq!(result.checks(), ValidationChecks::default());
    }

    #[tokio::test]
    async fn unreachable_registry_is_a_negative_outcome() {
        let parsed = ParsedCitation {
            url: Some("http://127.0.0.1:9/page".into()),
            ..ParsedCitation::default()
        };
        let outcome = Verifier::for_kind(SourceKind::Url, client()).verify(&parsed).await;
        assert!(!outcome.verified);
        assert!(outcome.error.is_some());
        assert!(outcome.contribution.abs() < f64::EPSILON);
    }

    #[test]
    fn outcome_records_matching_flag() {
        let mut checks = ValidationChecks::default();
        VerificationOutcome::failure(SourceKind::Doi, "gone").record(&mut checks);
        VerificationOutcome::success(
            SourceKind::Pubmed,
            CitationMetadata::default(),
            None,
            PUBMED_CONTRIBUTION,
            0.95,
        )
        .record(&mut checks);
        assert_eq!(checks.doi_valid, Some(false));
        assert_eq!(checks.pubmed_verified, Some(true));
        assert_eq!(checks.url_accessible, None);
    }
}
