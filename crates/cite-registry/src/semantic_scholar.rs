//! Semantic Scholar paper search, the last step of URL recovery.

use cite_core::citation::MAX_AUTHORS;

use crate::http::check_response;
use crate::retry::with_retry;
use crate::{RegistryClient, SearchHit, clean_title, error::RegistryError};

const FIELDS: &str = "title,year,url,externalIds,authors";

#[derive(serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Paper>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paper {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    external_ids: Option<ExternalIds>,
    #[serde(default)]
    authors: Vec<PaperAuthor>,
}

#[derive(serde::Deserialize)]
struct ExternalIds {
    #[serde(rename = "DOI", default)]
    doi: Option<String>,
}

#[derive(serde::Deserialize)]
struct PaperAuthor {
    #[serde(default)]
    name: Option<String>,
}

impl RegistryClient {
    /// Title search on Semantic Scholar.
    ///
    /// Sends `x-api-key` when `network.semantic_scholar_api_key` is set.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the request fails, the service returns a
    /// non-success status, or the body cannot be parsed.
    pub async fn search_semantic_scholar(
        &self,
        title: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, RegistryError> {
        let url = format!(
            "{}/paper/search?query={}&limit={limit}&fields={FIELDS}",
            self.endpoints.semantic_scholar.trim_end_matches('/'),
            urlencoding::encode(title)
        );
        let body = with_retry(&self.retry, || async {
            self.limiters.search.acquire().await;
            let mut req = self.http.get(&url);
            if !self.semantic_scholar_api_key.is_empty() {
                req = req.header("x-api-key", &self.semantic_scholar_api_key);
            }
            let resp = check_response(req.send().await?).await?;
            Ok(resp.text().await?)
        })
        .await?;
        parse_search(&body)
    }
}

/// Parse a Semantic Scholar `paper/search` body.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] on malformed JSON.
pub fn parse_search(body: &str) -> Result<Vec<SearchHit>, RegistryError> {
    let data: SearchResponse =
        serde_json::from_str(body).map_err(|e| RegistryError::Parse(e.to_string()))?;
    Ok(data
        .data
        .into_iter()
        .filter_map(|paper| {
            let title = paper
                .title
                .map(|t| clean_title(&t))
                .filter(|t| !t.is_empty())?;
            Some(SearchHit {
                title,
                doi: paper.external_ids.and_then(|ids| ids.doi),
                url: paper.url,
                year: paper.year,
                authors: paper
                    .authors
                    .into_iter()
                    .filter_map(|a| a.name)
                    .filter_map(|name| name.split_whitespace().last().map(str::to_string))
                    .take(MAX_AUTHORS)
                    .collect(),
                source: "semantic_scholar",
            })
        })
        .collect())
}
