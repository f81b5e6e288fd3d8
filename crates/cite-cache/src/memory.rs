//! In-process cache backed by a mutex-guarded map.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{TimeDelta, Utc};
use cite_core::ValidationResult;

use crate::entry::CacheEntry;
use crate::error::CacheError;

#[derive(Debug)]
pub struct MemoryCache {
    ttl: TimeDelta,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, CacheEntry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::InvalidState("memory cache lock poisoned".into()))
    }

    pub(crate) fn get(&self, key: &str) -> Result<Option<ValidationResult>, CacheError> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.is_expired_at(Utc::now()) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.hit())),
            None => Ok(None),
        }
    }

    pub(crate) fn set(&self, key: &str, result: &ValidationResult) -> Result<(), CacheError> {
        let entry = CacheEntry::new(result, self.ttl, Utc::now());
        self.lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    pub(crate) fn clear(&self) -> Result<(), CacheError> {
        self.lock()?.clear();
        Ok(())
    }

    pub(crate) fn size(&self) -> Result<usize, CacheError> {
        Ok(self.lock()?.len())
    }

    pub(crate) fn cleanup_expired(&self) -> Result<usize, CacheError> {
        let now = Utc::now();
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        Ok(before - entries.len())
    }
}
