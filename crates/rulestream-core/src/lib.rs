//! RuleStream Core
//!
//! Core types shared across RuleStream components.
//!
//! This crate provides:
//! - The error taxonomy for rule parsing, evaluation and session setup
//! - Wire types for per-rule verdicts and classification results

pub mod error;
pub mod types;

pub use error::{Error, Result, RuleError};
pub use types::{ClassificationResult, RuleOutcome};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, RuleError};
    pub use crate::types::{ClassificationResult, RuleOutcome};
}
