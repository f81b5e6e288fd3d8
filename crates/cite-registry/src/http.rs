//! Shared HTTP helpers for registry clients.
//!
//! Centralizes status-code checks (429 rate limiting with `Retry-After`
//! parsing, non-success → [`RegistryError::Api`]) and reachability probes so
//! individual source modules stay focused on request construction and
//! response mapping.

use reqwest::StatusCode;

use crate::RegistryClient;
use crate::error::RegistryError;

/// A fetched page: final status, final URL after redirects, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    pub body: String,
}

/// Whether a final status counts as reachable: `[200, 400)`.
#[must_use]
pub fn is_reachable(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`RegistryError::RateLimited`] with
///   `Retry-After` header parsing (falls back to 60 s if absent or
///   unparseable).
/// - **Non-success status** → [`RegistryError::Api`] with status code and
///   response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, RegistryError> {
    if resp.status() == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = parse_retry_after(&resp);
        return Err(RegistryError::RateLimited {
            retry_after_secs: retry_after,
        });
    }
    if !resp.status().is_success() {
        return Err(RegistryError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

impl RegistryClient {
    /// HEAD `url` following redirects and return the final status code.
    ///
    /// Servers that reject HEAD (405 / 501) are retried once with GET.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Http`] on transport failure.
    pub async fn probe(&self, url: &str) -> Result<u16, RegistryError> {
        self.limiters.web.acquire().await;
        self.final_status(url).await
    }

    pub(crate) async fn final_status(&self, url: &str) -> Result<u16, RegistryError> {
        let resp = self.http.head(url).send().await?;
        let status = resp.status();
        if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
            tracing::debug!(url, %status, "HEAD rejected, falling back to GET");
            let resp = self.http.get(url).send().await?;
            return Ok(resp.status().as_u16());
        }
        Ok(status.as_u16())
    }

    /// GET `url` following redirects and return status, final URL and body.
    ///
    /// Non-success statuses are returned, not raised, so callers can report
    /// "not accessible" precisely.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Http`] on transport failure or an unreadable
    /// body.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, RegistryError> {
        self.limiters.web.acquire().await;
        let resp = self.http.get(url).send().await?;
        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let body = resp.text().await?;
        Ok(FetchedPage {
            status,
            final_url,
            body,
        })
    }
}
