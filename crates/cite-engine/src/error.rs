//! Engine error types.

use cite_cache::CacheError;
use cite_config::ConfigError;
use cite_registry::RegistryError;

/// Errors from building a [`crate::CitationValidator`].
///
/// Per-citation failures never reach callers as `Err`: the validation guard
/// turns them into invalid results carrying a critical issue.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The configuration failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cache backend could not be opened.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// The HTTP client could not be built.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Unexpected failure while validating one citation.
    #[error("internal error: {0}")]
    Internal(String),
}
