//! The [`CitationValidator`] entry point.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use cite_cache::CacheStore;
use cite_config::ValidationConfig;
use cite_core::result::detail_keys;
use cite_core::{ExtractedReference, ParsedCitation, ValidationLevel, ValidationReport, ValidationResult};
use cite_correspondence::CorrespondenceChecker;
use cite_registry::{RegistryClient, VerifierChain, is_reachable};
use futures::{FutureExt, StreamExt, stream};

use crate::CitableText;
use crate::error::EngineError;
use crate::merge::{apply_accessibility, apply_assessment, merge_results, quick_result, verifier_result};
use crate::scoring::ScoringEngine;

/// Validates citations at three additive levels and aggregates batches.
///
/// Owns its cache, HTTP client, verifier chain and correspondence checker.
/// All methods take `&self`; one validator can serve concurrent callers.
#[derive(Debug)]
pub struct CitationValidator {
    config: ValidationConfig,
    cache: CacheStore,
    client: RegistryClient,
    chain: VerifierChain,
    checker: CorrespondenceChecker,
    scoring: ScoringEngine,
}

impl CitationValidator {
    /// Validate `config`, open the cache backend and build the clients.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] for out-of-range configuration,
    /// [`EngineError::Cache`] if the cache backend cannot be opened, and
    /// [`EngineError::Registry`] if the HTTP client cannot be built.
    pub async fn new(config: ValidationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let cache = CacheStore::open(&config.cache).await?;
        let client = RegistryClient::new(&config)?;
        let chain = VerifierChain::new(&client, &config.sources);
        let checker = CorrespondenceChecker::new(client.clone(), &config);
        let scoring = ScoringEngine::new(&config.scoring);

        tracing::debug!(
            cache = %config.cache.backend,
            sources = ?chain.order(),
            "citation validator ready"
        );

        Ok(Self {
            config,
            cache,
            client,
            chain,
            checker,
            scoring,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// The result cache, for maintenance (`size`, `clear`, `cleanup_expired`).
    #[must_use]
    pub const fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Validate one citation. Never fails: internal errors become an invalid
    /// result with a critical issue.
    ///
    /// A cached result for the same text and level is returned with
    /// `cache_hit` set. Fresh results are cached whether valid or not.
    pub async fn validate_reference(&self, citation: &str, level: ValidationLevel) -> ValidationResult {
        let key = cite_core::ids::cache_key(citation);
        match self.cache.get(&key).await {
            Ok(Some(hit)) if hit.level == level => {
                tracing::debug!(%level, "cache hit");
                return hit;
            }
            Ok(Some(_)) => tracing::debug!(%level, "cached at another level"),
            Ok(None) => tracing::debug!(%level, "cache miss"),
            Err(e) => tracing::warn!(%e, "cache read failed"),
        }

        let started = Instant::now();
        let mut result = guarded(citation, level, self.validate_fresh(citation, level)).await;
        result.provenance.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        result.clamp();

        if result.details.contains_key(detail_keys::INTERNAL_ERROR) {
            return result;
        }
        if let Err(e) = self.cache.set(&key, &result).await {
            tracing::warn!(%e, "cache write failed");
        }
        result
    }

    async fn validate_fresh(
        &self,
        citation: &str,
        level: ValidationLevel,
    ) -> Result<ValidationResult, EngineError> {
        let parsed = cite_parser::parse(citation);
        let mut result = quick_result(
            citation,
            level,
            &parsed,
            self.config.scoring.valid_format_threshold,
        );

        if level.uses_network() {
            let chain = self.chain.verify(&parsed).await;
            merge_results(&mut result, verifier_result(citation, level, &chain));
        }
        if level.checks_correspondence() {
            self.check_url(&mut result, citation, &parsed).await?;
        }
        Ok(result)
    }

    /// Correspondence assessment plus plain accessibility of the cited URL.
    async fn check_url(
        &self,
        result: &mut ValidationResult,
        citation: &str,
        parsed: &ParsedCitation,
    ) -> Result<(), EngineError> {
        let assessment = if self.config.sources.correspondence {
            Some(self.checker.assess(&result.id, citation, parsed).await)
        } else {
            None
        };

        if let Some(url) = parsed.url.as_deref() {
            // Same [200, 400) rule as the probe, whichever path fetched the page.
            let fetched = assessment
                .as_ref()
                .and_then(|a| a.result.as_ref())
                .map(|r| r.status.is_some_and(is_reachable));
            let accessible = match fetched {
                Some(accessible) => accessible,
                None => match self.client.probe(url).await {
                    Ok(status) => is_reachable(status),
                    Err(e) => {
                        tracing::warn!(url, %e, "accessibility probe failed");
                        false
                    }
                },
            };
            apply_accessibility(result, url, accessible);
        }

        if let Some(assessment) = &assessment {
            apply_assessment(result, assessment)?;
        }
        Ok(())
    }

    /// Validate `citations` one after another and aggregate the results.
    pub async fn validate_batch<S: AsRef<str>>(
        &self,
        citations: &[S],
        level: ValidationLevel,
    ) -> ValidationReport {
        let started = Instant::now();
        let mut results = Vec::with_capacity(citations.len());
        for citation in citations {
            results.push(self.validate_reference(citation.as_ref(), level).await);
        }
        self.report(results, level, started)
    }

    /// Like [`Self::validate_batch`] with up to `max_in_flight` validations
    /// running at once. Results keep input order.
    pub async fn validate_batch_concurrent<S: AsRef<str>>(
        &self,
        citations: &[S],
        level: ValidationLevel,
        max_in_flight: usize,
    ) -> ValidationReport {
        let started = Instant::now();
        let results: Vec<ValidationResult> = stream::iter(citations)
            .map(|citation| self.validate_reference(citation.as_ref(), level))
            .buffered(max_in_flight.max(1))
            .collect()
            .await;
        self.report(results, level, started)
    }

    fn report(
        &self,
        results: Vec<ValidationResult>,
        level: ValidationLevel,
        started: Instant,
    ) -> ValidationReport {
        let report = self.scoring.aggregate(results, level, started.elapsed());
        tracing::info!(
            %level,
            total = report.total,
            valid = report.valid,
            overall_score = report.overall_score,
            elapsed_ms = report.elapsed_ms,
            "batch validated"
        );
        report
    }

    #[must_use]
    pub fn extract_references(&self, text: &str) -> Vec<ExtractedReference> {
        cite_parser::extract(text)
    }

    #[must_use]
    pub fn extract_references_with_context(
        &self,
        text: &str,
        window: usize,
    ) -> Vec<ExtractedReference> {
        cite_parser::extract_with_context(text, window)
    }

    /// Extract the references from `analysis` and validate them as a batch.
    pub async fn validate_analysis<T: CitableText + ?Sized>(
        &self,
        analysis: &T,
        level: ValidationLevel,
    ) -> ValidationReport {
        let text = analysis.citable_text();
        let citations: Vec<String> = self
            .extract_references(&text)
            .into_iter()
            .map(|r| r.text)
            .collect();
        self.validate_batch(&citations, level).await
    }
}

/// Run one validation, converting an `Err` or a panic into a failed result.
pub(crate) async fn guarded<F>(citation: &str, level: ValidationLevel, validation: F) -> ValidationResult
where
    F: Future<Output = Result<ValidationResult, EngineError>>,
{
    match AssertUnwindSafe(validation).catch_unwind().await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            tracing::warn!(%e, "validation failed");
            ValidationResult::failed(citation, level, &e.to_string())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(panic = %message, "validation panicked");
            ValidationResult::failed(citation, level, &format!("panic: {message}"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
