//! # cite-config
//!
//! Layered configuration loading for Citadel using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CITADEL_*` prefix, `__` as separator)
//! 2. Project-level `.citadel/config.toml`
//! 3. User-level `~/.config/citadel/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CITADEL_CACHE__BACKEND` -> `cache.backend`,
//! `CITADEL_NETWORK__NCBI_API_KEY` -> `network.ncbi_api_key`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use cite_config::ValidationConfig;
//!
//! let config = ValidationConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("cache backend: {}", config.cache.backend);
//! ```

mod audit;
mod cache;
mod endpoints;
mod error;
mod network;
mod rate_limits;
mod scoring;
mod sources;

pub use audit::AuditConfig;
pub use cache::{CacheBackendKind, CacheConfig};
pub use endpoints::EndpointsConfig;
pub use error::ConfigError;
pub use network::NetworkConfig;
pub use rate_limits::RateLimitConfig;
pub use scoring::{ScoreWeights, ScoringConfig};
pub use sources::SourcesConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a validator needs, built once and never mutated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

impl ValidationConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does not read `.env`; see [`Self::load_with_dotenv`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a
    /// value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load `.env` from the workspace root, then [`Self::load`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers can add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".citadel/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("CITADEL_").split("__"))
    }

    /// Reject out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        self.network.validate()?;
        self.sources.validate()?;
        self.scoring.validate()?;
        self.endpoints.validate()?;
        if self.audit.enabled && self.audit.mismatch_log_path.trim().is_empty() {
            return Err(ConfigError::invalid(
                "audit.mismatch_log_path",
                "required while the audit log is enabled",
            ));
        }
        Ok(())
    }

    /// Config for local runs and tests: memory cache, no rate limiting,
    /// every endpoint under `base`, audit log disabled.
    #[must_use]
    pub fn offline(base: &str) -> Self {
        Self {
            rate_limits: RateLimitConfig::unlimited(),
            endpoints: EndpointsConfig::with_base(base),
            network: NetworkConfig {
                timeout_secs: 5,
                max_retries: 0,
                ..NetworkConfig::default()
            },
            audit: AuditConfig {
                enabled: false,
                ..AuditConfig::default()
            },
            ..Self::default()
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("citadel").join("config.toml"))
    }

    /// Walks up from `CARGO_MANIFEST_DIR` looking for `.env`, falling back
    /// to the current directory. Missing files are ignored.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
