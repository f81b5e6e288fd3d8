//! # cite-cache
//!
//! TTL cache for validation results, keyed by the blake3 hash of the raw
//! citation text ([`cite_core::ids::cache_key`]).
//!
//! Backends share identical semantics:
//! - `expires_at = now + ttl`; `get` treats expired entries as absent and
//!   evicts them lazily
//! - `set` stores a copy with `cache_hit = false`
//! - `get` returns a copy with `cache_hit = true` and leaves the stored entry
//!   untouched
//!
//! | Backend | Storage |
//! |---|---|
//! | `memory` | mutex-guarded `HashMap` |
//! | `document` | one JSON object in a file, atomic replace on write |
//! | `relational` | embedded libSQL table `citation_cache` |
//! | `disabled` | nothing; every `get` misses |

pub mod document;
pub mod entry;
pub mod error;
pub mod memory;
pub mod relational;

pub use entry::CacheEntry;
pub use error::CacheError;

use chrono::TimeDelta;
use cite_config::{CacheBackendKind, CacheConfig};
use cite_core::ValidationResult;

use crate::document::DocumentCache;
use crate::entry::ttl_from_secs;
use crate::memory::MemoryCache;
use crate::relational::RelationalCache;

/// The one cache a validator owns.
#[derive(Debug)]
pub enum CacheStore {
    Memory(MemoryCache),
    Document(DocumentCache),
    Relational(RelationalCache),
    Disabled,
}

impl CacheStore {
    /// Open the backend selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if a persistent backend cannot be opened.
    pub async fn open(config: &CacheConfig) -> Result<Self, CacheError> {
        let ttl = ttl_from_secs(config.ttl_secs);
        let store = match config.backend {
            CacheBackendKind::Memory => Self::memory(ttl),
            CacheBackendKind::Document => Self::Document(DocumentCache::open(&config.path, ttl)?),
            CacheBackendKind::Relational => {
                Self::Relational(RelationalCache::open(&config.path, ttl).await?)
            }
            CacheBackendKind::Disabled => Self::Disabled,
        };
        tracing::debug!(backend = %config.backend, ttl_secs = config.ttl_secs, "cache opened");
        Ok(store)
    }

    #[must_use]
    pub fn memory(ttl: TimeDelta) -> Self {
        Self::Memory(MemoryCache::new(ttl))
    }

    #[must_use]
    pub const fn backend(&self) -> CacheBackendKind {
        match self {
            Self::Memory(_) => CacheBackendKind::Memory,
            Self::Document(_) => CacheBackendKind::Document,
            Self::Relational(_) => CacheBackendKind::Relational,
            Self::Disabled => CacheBackendKind::Disabled,
        }
    }

    /// Look up `key`. Expired entries are evicted and reported as a miss.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be read or the stored
    /// entry cannot be decoded.
    pub async fn get(&self, key: &str) -> Result<Option<ValidationResult>, CacheError> {
        match self {
            Self::Memory(c) => c.get(key),
            Self::Document(c) => c.get(key),
            Self::Relational(c) => c.get(key).await,
            Self::Disabled => Ok(None),
        }
    }

    /// Store `result` under `key`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be written.
    pub async fn set(&self, key: &str, result: &ValidationResult) -> Result<(), CacheError> {
        match self {
            Self::Memory(c) => c.set(key, result),
            Self::Document(c) => c.set(key, result),
            Self::Relational(c) => c.set(key, result).await,
            Self::Disabled => Ok(()),
        }
    }

    /// Remove every entry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), CacheError> {
        match self {
            Self::Memory(c) => c.clear(),
            Self::Document(c) => c.clear(),
            Self::Relational(c) => c.clear().await,
            Self::Disabled => Ok(()),
        }
    }

    /// Number of stored entries, including expired ones not yet evicted.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be read.
    pub async fn size(&self) -> Result<usize, CacheError> {
        match self {
            Self::Memory(c) => c.size(),
            Self::Document(c) => c.size(),
            Self::Relational(c) => c.size().await,
            Self::Disabled => Ok(0),
        }
    }

    /// Evict every expired entry and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend cannot be written.
    pub async fn cleanup_expired(&self) -> Result<usize, CacheError> {
        let removed = match self {
            Self::Memory(c) => c.cleanup_expired(),
            Self::Document(c) => c.cleanup_expired(),
            Self::Relational(c) => c.cleanup_expired().await,
            Self::Disabled => Ok(0),
        }?;
        tracing::debug!(backend = %self.backend(), removed, "expired cache entries removed");
        Ok(removed)
    }
}
