//! Registry error types.

use thiserror::Error;

/// Errors that can occur when talking to a bibliographic registry.
///
/// These never leave a verifier: [`crate::SourceVerifier::verify`] turns
/// them into negative outcomes.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP transport error (timeout, connection refused, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Registry API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the registry.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// Failed to parse a registry response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The registry returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The HTTP client could not be built.
    #[error("client error: {0}")]
    Client(String),
}

impl RegistryError {
    /// Whether retrying the same request may succeed.
    ///
    /// Timeouts, connection failures, 429 and 5xx responses are transient;
    /// parse errors and other 4xx responses are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            Self::RateLimited { .. } => true,
            Self::Parse(_) | Self::Client(_) => false,
        }
    }
}

impl From<quick_xml::Error> for RegistryError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(RegistryError::RateLimited { retry_after_secs: 1 }.is_transient());
        assert!(
            RegistryError::Api {
                status: 503,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !RegistryError::Api {
                status: 404,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!RegistryError::Parse("bad json".into()).is_transient());
    }
}
