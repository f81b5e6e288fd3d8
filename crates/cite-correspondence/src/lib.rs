//! # cite-correspondence
//!
//! Decides whether the URL attached to a citation actually points at the
//! cited work, and finds a better URL when it does not.
//!
//! - [`page`]: title, author and year extraction from landing-page meta tags
//! - [`similarity`]: token-set Jaccard scoring and the weighted confidence
//! - [`CorrespondenceChecker`]: fetch, compare, recover, audit
//! - [`audit`]: JSON Lines log of every detected mismatch

pub mod audit;
pub mod page;
pub mod similarity;

mod checker;
mod error;

pub use audit::{MismatchLog, MismatchRecord};
pub use checker::{Assessment, AssessmentStatus, CorrespondenceChecker, CorrespondenceResult};
pub use error::CorrespondenceError;
pub use page::PageMetadata;
