//! Citation-to-URL correspondence checks and URL recovery.

use chrono::{Datelike, Utc};
use cite_config::ValidationConfig;
use cite_core::ParsedCitation;
use cite_registry::{RegistryClient, RegistryError, SearchHit, is_reachable};
use serde::{Deserialize, Serialize};

use crate::audit::{MismatchLog, MismatchRecord};
use crate::page::PageMetadata;
use crate::similarity::{
    self, NEUTRAL, WEAK_AUTHORS, WEAK_TITLE, author_similarity, title_similarity, year_match,
    year_score,
};

/// What fetching and comparing one URL found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceResult {
    pub url: String,
    pub accessible: bool,
    /// Final HTTP status, when a response arrived at all.
    pub status: Option<u16>,
    pub final_url: Option<String>,
    pub matches: bool,
    pub confidence: f64,
    pub title_similarity: f64,
    pub author_similarity: f64,
    pub year_match: Option<bool>,
    pub found_title: Option<String>,
    pub found_authors: Vec<String>,
    pub found_year: Option<i32>,
    pub mismatch_reasons: Vec<String>,
}

impl CorrespondenceResult {
    fn inaccessible(url: &str, status: Option<u16>, reason: String) -> Self {
        Self {
            url: url.to_string(),
            accessible: false,
            status,
            final_url: None,
            matches: false,
            confidence: 0.0,
            title_similarity: 0.0,
            author_similarity: 0.0,
            year_match: None,
            found_title: None,
            found_authors: Vec::new(),
            found_year: None,
            mismatch_reasons: vec![reason],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    /// The citation carries no URL; a suggestion may have been found.
    NoUrl,
    /// The citation has a URL but no title to compare against.
    NoTitle,
    Inaccessible,
    Match,
    Mismatch,
}

impl AssessmentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoUrl => "no_url",
            Self::NoTitle => "no_title",
            Self::Inaccessible => "inaccessible",
            Self::Match => "match",
            Self::Mismatch => "mismatch",
        }
    }
}

/// Outcome of [`CorrespondenceChecker::assess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub status: AssessmentStatus,
    /// Present whenever the provided URL was fetched.
    pub result: Option<CorrespondenceResult>,
    /// URL found for a citation that had none.
    pub suggested_url: Option<String>,
    /// Replacement for a provided URL that failed the check.
    pub corrected_url: Option<String>,
    pub confidence: Option<f64>,
    pub warnings: Vec<String>,
}

impl Assessment {
    const fn new(status: AssessmentStatus) -> Self {
        Self {
            status,
            result: None,
            suggested_url: None,
            corrected_url: None,
            confidence: None,
            warnings: Vec::new(),
        }
    }
}

/// Compares landing pages with the citations that link to them.
#[derive(Debug, Clone)]
pub struct CorrespondenceChecker {
    client: RegistryClient,
    correspondence_threshold: f64,
    search_acceptance_threshold: f64,
    title_search: bool,
    audit: MismatchLog,
}

impl CorrespondenceChecker {
    #[must_use]
    pub fn new(client: RegistryClient, config: &ValidationConfig) -> Self {
        Self {
            client,
            correspondence_threshold: config.scoring.correspondence_threshold,
            search_acceptance_threshold: config.scoring.search_acceptance_threshold,
            title_search: config.sources.title_search,
            audit: MismatchLog::new(&config.audit),
        }
    }

    /// Replace the audit log, e.g. to point it at a temporary file.
    #[must_use]
    pub fn with_audit_log(mut self, audit: MismatchLog) -> Self {
        self.audit = audit;
        self
    }

    #[must_use]
    pub const fn audit_log(&self) -> &MismatchLog {
        &self.audit
    }

    /// Fetch `url` and score how well the page matches `parsed`.
    ///
    /// Transport failures and non-200 responses yield an inaccessible,
    /// non-matching result rather than an error. `accessible` here means
    /// "has a page to compare": a final 3xx counts as reachable for
    /// [`cite_registry::is_reachable`] but carries no comparable content.
    pub async fn check(&self, url: &str, parsed: &ParsedCitation) -> CorrespondenceResult {
        let page = match self.client.fetch_page(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url, %e, "page fetch failed");
                return CorrespondenceResult::inaccessible(
                    url,
                    None,
                    format!("Page could not be fetched: {e}"),
                );
            }
        };
        if page.status != 200 {
            tracing::debug!(url, status = page.status, "page not accessible");
            return CorrespondenceResult::inaccessible(
                url,
                Some(page.status),
                format!("Page returned HTTP {}", page.status),
            );
        }

        let found = PageMetadata::extract(&page.body, Utc::now().year());
        let title_sim = match (&parsed.title, &found.title) {
            (Some(cited), Some(found)) => title_similarity(cited, found),
            _ => 0.0,
        };
        let author_sim = author_similarity(&parsed.last_names(), &found.authors);
        let years = year_match(parsed.year, found.year);
        let confidence = similarity::confidence(title_sim, author_sim, year_score(years));

        let mut reasons = Vec::new();
        if found.title.is_none() {
            reasons.push("No title found on page".to_string());
        } else if title_sim < WEAK_TITLE {
            reasons.push(format!("Title similarity {:.0}%", title_sim * 100.0));
        }
        if author_sim < WEAK_AUTHORS {
            reasons.push(format!("Author overlap {:.0}%", author_sim * 100.0));
        }
        if let (Some(false), Some(cited), Some(on_page)) = (years, parsed.year, found.year) {
            reasons.push(format!("Year {on_page} on page, {cited} cited"));
        }

        let matches = confidence >= self.correspondence_threshold;
        tracing::debug!(url, confidence, matches, "correspondence checked");

        CorrespondenceResult {
            url: url.to_string(),
            accessible: true,
            status: Some(page.status),
            final_url: Some(page.final_url),
            matches,
            confidence,
            title_similarity: title_sim,
            author_similarity: author_sim,
            year_match: years,
            found_title: found.title,
            found_authors: found.authors,
            found_year: found.year,
            mismatch_reasons: reasons,
        }
    }

    /// First reachable URL for the cited work, or `None`.
    ///
    /// Tries doi.org, then PubMed, then (when title search is enabled)
    /// the top CrossRef, OpenAlex and Semantic Scholar hit in turn. A search
    /// hit is only accepted when its title is close enough to the cited one.
    pub async fn find_correct_url(&self, parsed: &ParsedCitation) -> Option<String> {
        self.recover(parsed, None).await
    }

    async fn recover(&self, parsed: &ParsedCitation, exclude: Option<&str>) -> Option<String> {
        let mut direct = Vec::new();
        if let Some(doi) = &parsed.doi {
            direct.push(self.client.doi_url(doi));
        }
        if let Some(pmid) = &parsed.pmid {
            direct.push(self.client.pubmed_url(pmid));
        }
        for url in direct {
            if Some(url.as_str()) != exclude && self.reachable(&url).await {
                return Some(url);
            }
        }

        if !self.title_search {
            return None;
        }
        let title = parsed.title.as_deref()?;
        let query = parsed
            .first_author_last_name()
            .map_or_else(|| title.to_string(), |author| format!("{author} {title}"));

        let hits = self.client.search_crossref(&query, 1).await;
        if let Some(url) = self.accept(hits, title, exclude).await {
            return Some(url);
        }
        let hits = self.client.search_openalex(title, 1).await;
        if let Some(url) = self.accept(hits, title, exclude).await {
            return Some(url);
        }
        let hits = self.client.search_semantic_scholar(title, 1).await;
        self.accept(hits, title, exclude).await
    }

    /// Reachable URL for the top hit, if its title is close enough.
    async fn accept(
        &self,
        hits: Result<Vec<SearchHit>, RegistryError>,
        title: &str,
        exclude: Option<&str>,
    ) -> Option<String> {
        let hits = match hits {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(%e, "title search failed");
                return None;
            }
        };
        let top = hits.first()?;
        let score = title_similarity(title, &top.title);
        if score < self.search_acceptance_threshold {
            tracing::debug!(source = top.source, score, "top search hit rejected");
            return None;
        }
        let candidates = top
            .doi
            .as_deref()
            .map(|doi| self.client.doi_url(doi))
            .into_iter()
            .chain(top.url.clone());
        for url in candidates {
            if Some(url.as_str()) != exclude && self.reachable(&url).await {
                tracing::debug!(source = top.source, url, "recovered url");
                return Some(url);
            }
        }
        None
    }

    async fn reachable(&self, url: &str) -> bool {
        match self.client.probe(url).await {
            Ok(status) => is_reachable(status),
            Err(e) => {
                tracing::debug!(url, %e, "probe failed");
                false
            }
        }
    }

    /// Full correspondence assessment for one citation.
    ///
    /// Failed checks trigger URL recovery and append one record to the
    /// mismatch audit log. Audit failures are logged and ignored.
    ///
    /// [`AssessmentStatus::Inaccessible`] reflects the stricter 200-only rule
    /// of [`Self::check`]. Callers scoring plain reachability should apply
    /// [`cite_registry::is_reachable`] to the result's `status` instead, so a
    /// final 3xx scores the same as it does for a HEAD probe.
    pub async fn assess(
        &self,
        citation_id: &str,
        citation_text: &str,
        parsed: &ParsedCitation,
    ) -> Assessment {
        let Some(url) = parsed.url.as_deref() else {
            let mut assessment = Assessment::new(AssessmentStatus::NoUrl);
            assessment.suggested_url = self.find_correct_url(parsed).await;
            return assessment;
        };

        if parsed.title.is_none() {
            let mut assessment = Assessment::new(AssessmentStatus::NoTitle);
            assessment.confidence = Some(NEUTRAL);
            assessment
                .warnings
                .push("Citation has no title; URL correspondence not checked".to_string());
            return assessment;
        }

        let result = self.check(url, parsed).await;
        if result.accessible && result.matches {
            let mut assessment = Assessment::new(AssessmentStatus::Match);
            assessment.confidence = Some(result.confidence);
            assessment.result = Some(result);
            return assessment;
        }

        let mut assessment = if result.accessible {
            let mut a = Assessment::new(AssessmentStatus::Mismatch);
            a.warnings.push(format!(
                "URL does not appear to match the cited work ({:.0}% confidence)",
                result.confidence * 100.0
            ));
            a
        } else {
            let mut a = Assessment::new(AssessmentStatus::Inaccessible);
            a.warnings.push(match result.status {
                Some(status) => format!("URL is not accessible (HTTP {status})"),
                None => "URL is not accessible".to_string(),
            });
            a
        };
        assessment.confidence = Some(result.confidence);
        assessment.corrected_url = self.recover(parsed, Some(url)).await;

        let record = mismatch_record(citation_id, citation_text, parsed, &result, &assessment);
        if let Err(e) = self.audit.append(&record).await {
            tracing::warn!(%e, citation_id, "failed to append mismatch record");
        }

        assessment.result = Some(result);
        assessment
    }
}

fn mismatch_record(
    citation_id: &str,
    citation_text: &str,
    parsed: &ParsedCitation,
    result: &CorrespondenceResult,
    assessment: &Assessment,
) -> MismatchRecord {
    MismatchRecord {
        logged_at: Utc::now(),
        citation_id: citation_id.to_string(),
        citation: citation_text.to_string(),
        cited_title: parsed.title.clone(),
        cited_authors: parsed.authors.iter().map(ToString::to_string).collect(),
        cited_year: parsed.year,
        doi: parsed.doi.clone(),
        pmid: parsed.pmid.clone(),
        provided_url: result.url.clone(),
        accessible: result.accessible,
        confidence: result.confidence,
        found_title: result.found_title.clone(),
        found_authors: result.found_authors.clone(),
        found_year: result.found_year,
        reasons: result.mismatch_reasons.clone(),
        suggested_url: assessment.corrected_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        assert_eq!(AssessmentStatus::NoUrl.as_str(), "no_url");
        assert_eq!(
            serde_json::to_string(&AssessmentStatus::Mismatch).unwrap(),
            "\"mismatch\""
        );
    }

    #[test]
    fn inaccessible_result_never_matches() {
        let result = CorrespondenceResult::inaccessible("http://x", Some(404), "HTTP 404".into());
        assert!(!result.accessible);
        assert!(!result.matches);
        assert_eq!(result.mismatch_reasons, vec!["HTTP 404".to_string()]);
    }

    #[tokio::test]
    async fn unreachable_host_is_inaccessible() {
        let config = ValidationConfig::offline("http://127.0.0.1:9");
        let client = RegistryClient::new(&config).unwrap();
        let checker = CorrespondenceChecker::new(client, &config);
        let parsed = ParsedCitation {
            title: Some("Anything".into()),
            ..ParsedCitation::default()
        };
        let result = checker.check("http://127.0.0.1:9/page", &parsed).await;
        assert!(!result.accessible);
        assert_eq!(result.status, None);
    }
}
