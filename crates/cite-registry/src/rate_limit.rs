//! Per-source minimum-interval rate limiting.
//!
//! One [`RateLimiter`] exists per external API; callers of different APIs
//! never wait on each other.

use std::time::Duration;

use cite_config::{NetworkConfig, RateLimitConfig};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive calls.
#[derive(Debug)]
pub struct RateLimiter {
    name: &'static str,
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub const fn new(name: &'static str, min_interval: Duration) -> Self {
        Self {
            name,
            min_interval,
            last: Mutex::const_new(None),
        }
    }

    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until at least `min_interval` has passed since the previous call.
    ///
    /// The lock is held while sleeping so concurrent callers queue up.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self.last.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!(source = self.name, ?wait, "rate limiting");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// One limiter per external API.
#[derive(Debug)]
pub struct Limiters {
    pub pubmed: RateLimiter,
    /// doi.org and CrossRef.
    pub crossref: RateLimiter,
    pub arxiv: RateLimiter,
    /// Generic URL probes and page fetches.
    pub web: RateLimiter,
    /// OpenAlex and Semantic Scholar.
    pub search: RateLimiter,
}

impl Limiters {
    #[must_use]
    pub fn from_config(limits: &RateLimitConfig, network: &NetworkConfig) -> Self {
        let ms = Duration::from_millis;
        Self {
            pubmed: RateLimiter::new(
                "pubmed",
                ms(limits.pubmed_interval_ms(network.has_ncbi_api_key())),
            ),
            crossref: RateLimiter::new("crossref", ms(limits.crossref_ms)),
            arxiv: RateLimiter::new("arxiv", ms(limits.arxiv_ms)),
            web: RateLimiter::new("web", ms(limits.web_ms)),
            search: RateLimiter::new("search", ms(limits.search_ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_call_waits_for_interval() {
        let limiter = RateLimiter::new("test", Duration::from_millis(40));
        let start = std::time::Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn zero_interval_never_waits() {
        let limiter = RateLimiter::new("test", Duration::ZERO);
        let start = std::time::Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(20));
    }

    #[test]
    fn pubmed_interval_follows_api_key() {
        let limits = RateLimitConfig::default();
        let without = Limiters::from_config(&limits, &NetworkConfig::default());
        assert_eq!(without.pubmed.min_interval(), Duration::from_millis(340));

        let with_key = NetworkConfig {
            ncbi_api_key: "abc".into(),
            ..NetworkConfig::default()
        };
        let with = Limiters::from_config(&limits, &with_key);
        assert_eq!(with.pubmed.min_interval(), Duration::from_millis(100));
    }
}
