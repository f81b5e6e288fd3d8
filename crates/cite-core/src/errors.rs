//! Cross-cutting error types for Citadel.
//!
//! Domain-specific errors (`RegistryError`, `CacheError`, `ConfigError`) live
//! in their respective crates and converge in `cite-engine`.

use thiserror::Error;

/// Errors that can be raised by any Citadel crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A string did not name a known variant of an enum.
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    /// Data failed validation (format, range, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}
