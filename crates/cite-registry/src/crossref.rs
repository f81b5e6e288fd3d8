//! doi.org resolution and CrossRef metadata.
//!
//! Existence of a DOI is decided by the resolver alone (HEAD with redirects).
//! CrossRef is only consulted afterwards for metadata, and for bibliographic
//! search during URL recovery.

use cite_core::CitationMetadata;
use cite_core::citation::MAX_AUTHORS;

use crate::http::check_response;
use crate::retry::with_retry;
use crate::{RegistryClient, SearchHit, clean_title, error::RegistryError};

#[derive(serde::Deserialize)]
struct WorkResponse {
    message: Work,
}

#[derive(serde::Deserialize)]
struct SearchResponse {
    message: SearchMessage,
}

#[derive(serde::Deserialize)]
struct SearchMessage {
    #[serde(default)]
    items: Vec<Work>,
}

#[derive(serde::Deserialize)]
struct Work {
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "container-title", default)]
    container_title: Vec<String>,
    #[serde(default)]
    issued: Option<DateParts>,
    #[serde(rename = "published-print", default)]
    published_print: Option<DateParts>,
    #[serde(default)]
    author: Vec<WorkAuthor>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(serde::Deserialize)]
struct DateParts {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl DateParts {
    fn year(&self) -> Option<i32> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

#[derive(serde::Deserialize)]
struct WorkAuthor {
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    given: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl Work {
    fn year(&self) -> Option<i32> {
        self.issued
            .as_ref()
            .and_then(DateParts::year)
            .or_else(|| self.published_print.as_ref().and_then(DateParts::year))
    }

    fn first_title(&self) -> Option<String> {
        self.title
            .first()
            .map(|t| clean_title(t))
            .filter(|t| !t.is_empty())
    }

    fn into_metadata(self) -> CitationMetadata {
        let year = self.year();
        let title = self.first_title();
        let peer_reviewed = self.kind.as_deref().map(|k| k == "journal-article");
        CitationMetadata {
            title,
            year,
            journal: self.container_title.into_iter().next(),
            authors: self
                .author
                .iter()
                .filter_map(WorkAuthor::display)
                .take(MAX_AUTHORS)
                .collect(),
            peer_reviewed,
            doi: self.doi,
            pmid: None,
            arxiv_id: None,
            url: self.url,
        }
    }

    fn into_hit(self) -> Option<SearchHit> {
        let title = self.first_title()?;
        Some(SearchHit {
            year: self.year(),
            authors: self
                .author
                .iter()
                .filter_map(|a| a.family.clone().or_else(|| a.name.clone()))
                .take(MAX_AUTHORS)
                .collect(),
            title,
            doi: self.doi,
            url: self.url,
            source: "crossref",
        })
    }
}

impl WorkAuthor {
    fn display(&self) -> Option<String> {
        match (&self.family, &self.given) {
            (Some(family), Some(given)) => Some(format!("{family}, {given}")),
            (Some(family), None) => Some(family.clone()),
            _ => self.name.clone(),
        }
    }
}

impl RegistryClient {
    /// Resolve `doi` through the DOI resolver and return the final status.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Http`] if the resolver cannot be reached
    /// after retries.
    pub async fn resolve_doi(&self, doi: &str) -> Result<u16, RegistryError> {
        let url = self.doi_url(doi);
        with_retry(&self.retry, || async {
            self.limiters.crossref.acquire().await;
            let status = self.final_status(&url).await?;
            if status >= 500 {
                return Err(RegistryError::Api {
                    status,
                    message: format!("resolver returned {status}"),
                });
            }
            Ok(status)
        })
        .await
    }

    /// Fetch CrossRef metadata for `doi`. Returns `None` on 404.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the request fails, the service returns a
    /// non-success status other than 404, or the body cannot be parsed.
    pub async fn crossref_work(&self, doi: &str) -> Result<Option<CitationMetadata>, RegistryError> {
        let url = format!(
            "{}/works/{}{}",
            self.endpoints.crossref.trim_end_matches('/'),
            urlencoding::encode(doi),
            self.mailto_query('?')
        );
        let body = with_retry(&self.retry, || async {
            self.limiters.crossref.acquire().await;
            let resp = self.http.get(&url).send().await?;
            if resp.status() == 404 {
                return Ok(None);
            }
            let resp = check_response(resp).await?;
            Ok(Some(resp.text().await?))
        })
        .await?;

        body.map(|b| parse_work(&b)).transpose()
    }

    /// Bibliographic search on CrossRef, best matches first.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the request fails, the service returns a
    /// non-success status, or the body cannot be parsed.
    pub async fn search_crossref(
        &self,
        query: &str,
        rows: usize,
    ) -> Result<Vec<SearchHit>, RegistryError> {
        let url = format!(
            "{}/works?query.bibliographic={}&rows={rows}{}",
            self.endpoints.crossref.trim_end_matches('/'),
            urlencoding::encode(query),
            self.mailto_query('&')
        );
        let body = with_retry(&self.retry, || async {
            self.limiters.crossref.acquire().await;
            let resp = check_response(self.http.get(&url).send().await?).await?;
            Ok(resp.text().await?)
        })
        .await?;
        parse_search(&body)
    }

    fn mailto_query(&self, sep: char) -> String {
        if self.contact_email.is_empty() {
            String::new()
        } else {
            format!("{sep}mailto={}", urlencoding::encode(&self.contact_email))
        }
    }
}

/// Parse a CrossRef `works/<doi>` body.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] on malformed JSON.
pub fn parse_work(body: &str) -> Result<CitationMetadata, RegistryError> {
    let data: WorkResponse =
        serde_json::from_str(body).map_err(|e| RegistryError::Parse(e.to_string()))?;
    Ok(data.message.into_metadata())
}

/// Parse a CrossRef `works?query...` body.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] on malformed JSON.
pub fn parse_search(body: &str) -> Result<Vec<SearchHit>, RegistryError> {
    let data: SearchResponse =
        serde_json::from_str(body).map_err(|e| RegistryError::Parse(e.to_string()))?;
    Ok(data
        .message
        .items
        .into_iter()
        .filter_map(Work::into_hit)
        .collect())
}
