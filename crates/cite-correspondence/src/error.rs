//! Correspondence error types.

use thiserror::Error;

/// Errors from the correspondence checker's side effects.
///
/// Network failures never surface here; they become "not accessible"
/// results. Only writing the mismatch audit log can fail.
#[derive(Debug, Error)]
pub enum CorrespondenceError {
    /// Appending to the mismatch audit log failed.
    #[error("audit log error: {0}")]
    AuditLog(#[from] std::io::Error),

    /// The blocking write task did not complete.
    #[error("audit log task failed: {0}")]
    AuditTask(#[from] tokio::task::JoinError),
}
