//! Single JSON document cache: `{ "<key>": { result, created_at, expires_at } }`.
//!
//! Every operation reads the file, and every mutation rewrites it through a
//! temporary sibling followed by a rename, so readers never observe a
//! half-written document. A mutex serializes writers within the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{TimeDelta, Utc};
use cite_core::ValidationResult;

use crate::entry::CacheEntry;
use crate::error::CacheError;

type Document = BTreeMap<String, CacheEntry>;

#[derive(Debug)]
pub struct DocumentCache {
    path: PathBuf,
    ttl: TimeDelta,
    writer: Mutex<()>,
}

impl DocumentCache {
    /// Use `path` as the document, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>, ttl: TimeDelta) -> Result<Self, CacheError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            ttl,
            writer: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CacheError> {
        self.writer
            .lock()
            .map_err(|_| CacheError::InvalidState("document cache lock poisoned".into()))
    }

    fn load(&self) -> Result<Document, CacheError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Document::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, document: &Document) -> Result<(), CacheError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub(crate) fn get(&self, key: &str) -> Result<Option<ValidationResult>, CacheError> {
        let _guard = self.lock()?;
        let mut document = self.load()?;
        match document.get(key) {
            Some(entry) if entry.is_expired_at(Utc::now()) => {
                document.remove(key);
                self.store(&document)?;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.hit())),
            None => Ok(None),
        }
    }

    pub(crate) fn set(&self, key: &str, result: &ValidationResult) -> Result<(), CacheError> {
        let _guard = self.lock()?;
        let mut document = self.load()?;
        document.insert(key.to_string(), CacheEntry::new(result, self.ttl, Utc::now()));
        self.store(&document)
    }

    pub(crate) fn clear(&self) -> Result<(), CacheError> {
        let _guard = self.lock()?;
        self.store(&Document::new())
    }

    pub(crate) fn size(&self) -> Result<usize, CacheError> {
        let _guard = self.lock()?;
        Ok(self.load()?.len())
    }

    pub(crate) fn cleanup_expired(&self) -> Result<usize, CacheError> {
        let _guard = self.lock()?;
        let now = Utc::now();
        let mut document = self.load()?;
        let before = document.len();
        document.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - document.len();
        if removed > 0 {
            self.store(&document)?;
        }
        Ok(removed)
    }
}
