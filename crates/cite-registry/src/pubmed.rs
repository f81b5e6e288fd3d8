//! PubMed E-utilities client.
//!
//! Looks up a PMID via `esummary.fcgi?db=pubmed&retmode=json`. NCBI answers
//! unknown ids with HTTP 200 and an `error` field inside the record, so a
//! record is only accepted when it carries no error and a title.

use std::collections::HashMap;

use cite_core::CitationMetadata;
use cite_core::citation::MAX_AUTHORS;

use crate::http::check_response;
use crate::retry::with_retry;
use crate::{RegistryClient, clean_title, error::RegistryError, leading_year};

#[derive(serde::Deserialize)]
struct EsummaryResponse {
    #[serde(default)]
    result: HashMap<String, serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(serde::Deserialize)]
struct EsummaryRecord {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    pubdate: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    fulljournalname: String,
    #[serde(default)]
    authors: Vec<EsummaryAuthor>,
    #[serde(default)]
    articleids: Vec<EsummaryArticleId>,
}

#[derive(serde::Deserialize)]
struct EsummaryAuthor {
    name: String,
}

#[derive(serde::Deserialize)]
struct EsummaryArticleId {
    idtype: String,
    value: String,
}

impl RegistryClient {
    /// Fetch the PubMed summary for `pmid`.
    ///
    /// Returns `None` when PubMed has no usable record for the id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the HTTP request fails after retries, the
    /// service returns a non-success status, or the body is not JSON.
    pub async fn pubmed_summary(&self, pmid: &str) -> Result<Option<CitationMetadata>, RegistryError> {
        let mut url = format!(
            "{}/esummary.fcgi?db=pubmed&id={}&retmode=json",
            self.endpoints.pubmed_eutils.trim_end_matches('/'),
            urlencoding::encode(pmid)
        );
        if !self.ncbi_api_key.is_empty() {
            url.push_str(&format!("&api_key={}", urlencoding::encode(&self.ncbi_api_key)));
        }
        if !self.contact_email.is_empty() {
            url.push_str(&format!(
                "&tool=citadel&email={}",
                urlencoding::encode(&self.contact_email)
            ));
        }

        let body = with_retry(&self.retry, || async {
            self.limiters.pubmed.acquire().await;
            let resp = check_response(self.http.get(&url).send().await?).await?;
            Ok(resp.text().await?)
        })
        .await?;

        let mut metadata = parse_esummary(&body, pmid)?;
        if let Some(m) = metadata.as_mut() {
            m.url = Some(self.pubmed_url(pmid));
        }
        Ok(metadata)
    }
}

/// Parse an esummary JSON body into metadata for `pmid`.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] if the body is not esummary JSON.
pub fn parse_esummary(body: &str, pmid: &str) -> Result<Option<CitationMetadata>, RegistryError> {
    let data: EsummaryResponse =
        serde_json::from_str(body).map_err(|e| RegistryError::Parse(e.to_string()))?;
    if let Some(error) = data.error {
        tracing::debug!(pmid, %error, "esummary returned an error");
        return Ok(None);
    }
    let Some(raw) = data.result.get(pmid) else {
        return Ok(None);
    };
    let record: EsummaryRecord =
        serde_json::from_value(raw.clone()).map_err(|e| RegistryError::Parse(e.to_string()))?;
    if record.error.is_some() || record.title.trim().is_empty() {
        return Ok(None);
    }

    let journal = if record.fulljournalname.is_empty() {
        record.source
    } else {
        record.fulljournalname
    };
    let doi = record
        .articleids
        .into_iter()
        .find(|id| id.idtype == "doi" && !id.value.is_empty())
        .map(|id| id.value);

    Ok(Some(CitationMetadata {
        title: Some(clean_title(&record.title)),
        year: leading_year(&record.pubdate),
        journal: (!journal.is_empty()).then_some(journal),
        authors: record
            .authors
            .into_iter()
            .map(|a| a.name)
            .take(MAX_AUTHORS)
            .collect(),
        peer_reviewed: Some(true),
        doi,
        pmid: Some(pmid.to_string()),
        arxiv_id: None,
        url: None,
    }))
}
