//! Append-only JSON Lines log of detected citation/URL mismatches.
//!
//! One record per mismatch, written with `serde_jsonlines` for offline
//! review. The log is never read back by the validator.
//!
//! Appends from concurrent validations are serialized through one async
//! lock per log and run on the blocking pool, so records never interleave.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cite_config::AuditConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::CorrespondenceError;

/// Everything a reviewer needs to judge one mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MismatchRecord {
    pub logged_at: DateTime<Utc>,
    pub citation_id: String,
    pub citation: String,
    pub cited_title: Option<String>,
    pub cited_authors: Vec<String>,
    pub cited_year: Option<i32>,
    pub doi: Option<String>,
    pub pmid: Option<String>,
    pub provided_url: String,
    pub accessible: bool,
    pub confidence: f64,
    pub found_title: Option<String>,
    pub found_authors: Vec<String>,
    pub found_year: Option<i32>,
    pub reasons: Vec<String>,
    pub suggested_url: Option<String>,
}

/// Where mismatch records go. A disabled log drops them.
///
/// Clones share the writer lock.
#[derive(Debug, Clone)]
pub struct MismatchLog {
    path: Option<PathBuf>,
    writer: Arc<Mutex<()>>,
}

impl MismatchLog {
    #[must_use]
    pub fn new(config: &AuditConfig) -> Self {
        if config.enabled && !config.mismatch_log_path.is_empty() {
            Self::at(&config.mismatch_log_path)
        } else {
            Self::disabled()
        }
    }

    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            writer: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            path: None,
            writer: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append `record`, creating the file and its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CorrespondenceError::AuditLog`] if the file cannot be
    /// written, or [`CorrespondenceError::AuditTask`] if the blocking write
    /// task is cancelled or panics.
    pub async fn append(&self, record: &MismatchRecord) -> Result<(), CorrespondenceError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        let record = record.clone();
        let _guard = self.writer.lock().await;
        tokio::task::spawn_blocking(move || write_record(&path, &record)).await?
    }
}

fn write_record(path: &Path, record: &MismatchRecord) -> Result<(), CorrespondenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    serde_jsonlines::append_json_lines(path, [record])?;
    Ok(())
}
