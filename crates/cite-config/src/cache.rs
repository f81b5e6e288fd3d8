//! Result cache configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Default time-to-live: 7 days.
const fn default_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_path() -> String {
    ".citadel/cache.db".to_string()
}

/// Which storage backs the validation cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackendKind {
    /// Process-local map; lost on exit.
    #[default]
    Memory,
    /// A single JSON document on disk.
    Document,
    /// An embedded libSQL database.
    Relational,
    /// No caching at all.
    Disabled,
}

impl CacheBackendKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Document => "document",
            Self::Relational => "relational",
            Self::Disabled => "disabled",
        }
    }

    /// Whether this backend persists to `CacheConfig::path`.
    #[must_use]
    pub const fn is_persistent(self) -> bool {
        matches!(self, Self::Document | Self::Relational)
    }
}

impl fmt::Display for CacheBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" => Ok(Self::Memory),
            "document" | "json" => Ok(Self::Document),
            "relational" | "sqlite" | "libsql" => Ok(Self::Relational),
            "disabled" | "none" | "off" => Ok(Self::Disabled),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackendKind,

    /// Seconds before a cached result must be recomputed.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// File path for persistent backends.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::default(),
            ttl_secs: default_ttl_secs(),
            path: default_path(),
        }
    }
}

impl CacheConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.is_persistent() && self.path.trim().is_empty() {
            return Err(ConfigError::invalid(
                "cache.path",
                format!("required for the {} backend", self.backend),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackendKind::Memory);
        assert_eq!(config.ttl_secs, 604_800);
        assert_eq!(config.path, ".citadel/cache.db");
    }

    #[test]
    fn backend_from_str_accepts_aliases() {
        assert_eq!(
            "SQLite".parse::<CacheBackendKind>().unwrap(),
            CacheBackendKind::Relational
        );
        assert_eq!(
            "json".parse::<CacheBackendKind>().unwrap(),
            CacheBackendKind::Document
        );
        assert!(matches!(
            "redis".parse::<CacheBackendKind>(),
            Err(ConfigError::UnknownBackend(_))
        ));
    }

    #[test]
    fn persistent_backend_requires_path() {
        let config = CacheConfig {
            backend: CacheBackendKind::Document,
            path: "  ".into(),
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
