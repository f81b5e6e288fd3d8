//! OpenAlex works search, used for URL recovery.

use cite_core::citation::MAX_AUTHORS;

use crate::http::check_response;
use crate::retry::with_retry;
use crate::{RegistryClient, SearchHit, clean_title, error::RegistryError};

#[derive(serde::Deserialize)]
struct WorksResponse {
    #[serde(default)]
    results: Vec<OpenAlexWork>,
}

#[derive(serde::Deserialize)]
struct OpenAlexWork {
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    publication_year: Option<i32>,
    #[serde(default)]
    primary_location: Option<Location>,
    #[serde(default)]
    authorships: Vec<Authorship>,
}

#[derive(serde::Deserialize)]
struct Location {
    #[serde(default)]
    landing_page_url: Option<String>,
}

#[derive(serde::Deserialize)]
struct Authorship {
    author: AuthorRef,
}

#[derive(serde::Deserialize)]
struct AuthorRef {
    #[serde(default)]
    display_name: Option<String>,
}

impl OpenAlexWork {
    fn into_hit(self) -> Option<SearchHit> {
        let title = self
            .title
            .or(self.display_name)
            .map(|t| clean_title(&t))
            .filter(|t| !t.is_empty())?;
        Some(SearchHit {
            title,
            // OpenAlex reports DOIs as full https://doi.org/ URLs.
            doi: self.doi.map(|d| strip_doi_prefix(&d).to_string()),
            url: self.primary_location.and_then(|l| l.landing_page_url),
            year: self.publication_year,
            authors: self
                .authorships
                .into_iter()
                .filter_map(|a| a.author.display_name)
                .filter_map(|name| name.split_whitespace().last().map(str::to_string))
                .take(MAX_AUTHORS)
                .collect(),
            source: "openalex",
        })
    }
}

fn strip_doi_prefix(doi: &str) -> &str {
    doi.trim_start_matches("https://doi.org/")
        .trim_start_matches("http://doi.org/")
}

impl RegistryClient {
    /// Full-text title search on OpenAlex.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the request fails, the service returns a
    /// non-success status, or the body cannot be parsed.
    pub async fn search_openalex(
        &self,
        title: &str,
        per_page: usize,
    ) -> Result<Vec<SearchHit>, RegistryError> {
        let mut url = format!(
            "{}/works?search={}&per-page={per_page}",
            self.endpoints.openalex.trim_end_matches('/'),
            urlencoding::encode(title)
        );
        if !self.contact_email.is_empty() {
            url.push_str("&mailto=");
            url.push_str(&urlencoding::encode(&self.contact_email));
        }
        let body = with_retry(&self.retry, || async {
            self.limiters.search.acquire().await;
            let resp = check_response(self.http.get(&url).send().await?).await?;
            Ok(resp.text().await?)
        })
        .await?;
        parse_works(&body)
    }
}

/// Parse an OpenAlex `works?search=` body.
///
/// # Errors
///
/// Returns [`RegistryError::Parse`] on malformed JSON.
pub fn parse_works(body: &str) -> Result<Vec<SearchHit>, RegistryError> {
    let data: WorksResponse =
        serde_json::from_str(body).map_err(|e| RegistryError::Parse(e.to_string()))?;
    Ok(data
        .results
        .into_iter()
        .filter_map(OpenAlexWork::into_hit)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "meta": {"count": 1},
        "results": [
            {
                "id": "https://openalex.org/W1919106074",
                "doi": "https://doi.org/10.1038/nature14539",
                "title": "Deep learning",
                "display_name": "Deep learning",
                "publication_year": 2015,
                "primary_location": {
                    "landing_page_url": "https://www.nature.com/articles/nature14539"
                },
                "authorships": [
                    {"author": {"display_name": "Yann LeCun"}},
                    {"author": {"display_name": "Yoshua Bengio"}}
                ]
            },
            {"id": "https://openalex.org/W0", "title": null, "display_name": null}
        ]
    }"#;

    #[test]
    fn parse_works_hits() {
        let hits = parse_works(FIXTURE).unwrap();
        assert_eq!(hits.len(), 1);
        let hit = &hits[0];
        assert_eq!(hit.title, "Deep learning");
        assert_eq!(hit.doi.as_deref(), Some("10.1038/nature14539"));
        assert_eq!(
            hit.url.as_deref(),
            Some("https://www.nature.com/articles/nature14539")
        );
        assert_eq!(hit.year, Some(2015));
        assert_eq!(hit.authors, vec!["LeCun", "Bengio"]);
    }

    #[test]
    fn display_name_backs_up_title() {
        let body = r#"{"results": [{"display_name": "Fallback Title"}]}"#;
        assert_eq!(parse_works(body).unwrap()[0].title, "Fallback Title");
    }

    #[tokio::test]
    #[ignore] // requires network
    async fn openalex_live_search() {
        let client = RegistryClient::new(&cite_config::ValidationConfig::default()).unwrap();
        let hits = client.search_openalex("Deep learning LeCun", 5).await.unwrap();
        assert!(!hits.is_empty());
    }
}
