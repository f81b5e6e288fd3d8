//! HTTP client configuration shared by every outbound call.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("citadel/{} (citation validator)", env!("CARGO_PKG_VERSION"))
}

const fn default_max_retries() -> u32 {
    2
}

const fn default_retry_backoff_ms() -> u64 {
    250
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Descriptive client identifier sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Retries after the first attempt for transient failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry delay; doubles per attempt.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Contact address for CrossRef's polite pool (`mailto=`).
    #[serde(default)]
    pub contact_email: String,

    /// NCBI E-utilities key; lifts the PubMed rate limit.
    #[serde(default)]
    pub ncbi_api_key: String,

    #[serde(default)]
    pub semantic_scholar_api_key: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            contact_email: String::new(),
            ncbi_api_key: String::new(),
            semantic_scholar_api_key: String::new(),
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn has_ncbi_api_key(&self) -> bool {
        !self.ncbi_api_key.trim().is_empty()
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "network.timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::invalid(
                "network.user_agent",
                "must not be empty",
            ));
        }
        Ok(())
    }
}
