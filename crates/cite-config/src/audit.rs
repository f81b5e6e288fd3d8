//! Mismatch audit log configuration.

use serde::{Deserialize, Serialize};

const fn default_enabled() -> bool {
    true
}

fn default_mismatch_log_path() -> String {
    ".citadel/mismatches.jsonl".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Append a record for every detected citation/URL mismatch.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// JSON Lines file receiving mismatch records.
    #[serde(default = "default_mismatch_log_path")]
    pub mismatch_log_path: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            mismatch_log_path: default_mismatch_log_path(),
        }
    }
}
