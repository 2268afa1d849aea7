//! Error types for RuleStream

/// Result type alias using RuleStream's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to parse or evaluate a single rule expression.
///
/// These errors are deterministic: evaluating the same rule again yields the
/// same error, so nothing retries them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// No `name(args)` call found in the rule
    #[error("invalid function syntax in rule `{0}`")]
    InvalidFunctionSyntax(String),

    /// No trailing `OP literal` comparison found in the rule
    #[error("invalid operator or comparison value in rule `{0}`")]
    InvalidComparisonSyntax(String),

    /// Function name is not in the registry
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// Operator symbol is not in the registry
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
}

/// Core error type for RuleStream operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rule parse or evaluation errors
    #[error("rule error: {0}")]
    Rule(#[from] RuleError),

    /// The active rule set could not be fetched at session start
    #[error("rule set unavailable: {0}")]
    RuleSetUnavailable(String),

    /// A message was offered to a session that is no longer active
    #[error("session is closed")]
    SessionClosed,

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new rule-set-unavailable error
    pub fn rule_set_unavailable(msg: impl Into<String>) -> Self {
        Self::RuleSetUnavailable(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
