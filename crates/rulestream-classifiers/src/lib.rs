//! RuleStream Classifiers
//!
//! Applies rule sets to text messages and drives per-connection
//! classification sessions.
//!
//! - [`pipeline`]: ordered, failure-isolating application of a rule list to one message
//! - [`provider`]: the contract for fetching the active rule set
//! - [`session`]: the `Connecting → Active → Closed` lifecycle of one connection
//!
//! Rule evaluation is CPU-only and stateless, so any number of sessions can
//! classify concurrently without locking.

pub mod pipeline;
pub mod provider;
pub mod session;

pub use pipeline::{apply_rules, PipelineExecutionResult, RulePipeline};
pub use provider::{RuleSetProvider, StaticRuleSet};
pub use session::{ClassificationSession, SessionInput, SessionState, SessionSummary};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::pipeline::{apply_rules, RulePipeline};
    pub use crate::provider::{RuleSetProvider, StaticRuleSet};
    pub use crate::session::{ClassificationSession, SessionInput, SessionState};
}
