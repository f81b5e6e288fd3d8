//! Explicit retry and timing wrappers for network calls.
//!
//! Nothing is retried implicitly: a call site opts in by wrapping its future
//! factory in [`with_retry`]. Only [`RegistryError::is_transient`] failures
//! are retried, with exponential backoff capped at `max_delay`.

use std::future::Future;
use std::time::{Duration, Instant};

use cite_config::NetworkConfig;

use crate::error::RegistryError;

/// Configuration for retry behavior on transient registry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Retry policy derived from `[network]` settings.
    #[must_use]
    pub fn from_network(network: &NetworkConfig) -> Self {
        Self {
            max_attempts: network.max_retries.saturating_add(1),
            base_delay: Duration::from_millis(network.retry_backoff_ms),
            ..Self::default()
        }
    }

    /// A single attempt, no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

/// Run `call` until it succeeds, fails permanently, or attempts run out.
///
/// A 429 waits for its `Retry-After` (capped at `max_delay`) instead of the
/// backoff delay.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-transient error.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, mut call: F) -> Result<T, RegistryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RegistryError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.base_delay;
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let wait = match &e {
                    RegistryError::RateLimited { retry_after_secs } => {
                        Duration::from_secs(*retry_after_secs).min(config.max_delay)
                    }
                    _ => delay,
                };
                tracing::debug!(attempt, max_attempts, ?wait, %e, "transient registry failure, retrying");
                tokio::time::sleep(wait).await;
                delay = std::cmp::min(delay * 2, config.max_delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Await `fut` and report how long it took.
pub async fn with_timing<Fut: Future>(fut: Fut) -> (Fut::Output, Duration) {
    let start = Instant::now();
    let output = fut.await;
    (output, start.elapsed())
}
