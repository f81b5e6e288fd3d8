//! # cite-engine
//!
//! Public entry point of Citadel.
//!
//! [`CitationValidator`] wires the parser, registry verifiers, correspondence
//! checker and cache behind three validation levels:
//!
//! ```text
//! quick    → parser only, no network
//! standard → quick + registry verifier chain
//! thorough → standard + URL correspondence and accessibility
//! ```
//!
//! [`scoring::ScoringEngine`] turns a batch of results into a
//! [`cite_core::ValidationReport`].

pub mod merge;
pub mod scoring;

mod error;
mod validator;

pub use error::EngineError;
pub use scoring::{ScoringEngine, weighted_score};
pub use validator::CitationValidator;

/// Anything that can hand over text containing citations.
pub trait CitableText {
    fn citable_text(&self) -> String;
}

impl CitableText for str {
    fn citable_text(&self) -> String {
        self.to_string()
    }
}

impl CitableText for String {
    fn citable_text(&self) -> String {
        self.clone()
    }
}
