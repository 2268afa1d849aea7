//! Wire types for classification results

use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// Verdict for one rule applied to one message.
///
/// Serialized as `{"rule": ..., "result": true}` on success and
/// `{"rule": ..., "error": "..."}` when the rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// The rule expression exactly as it appears in the active rule set
    pub rule: String,

    /// Boolean verdict, absent when evaluation failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,

    /// Evaluation error, absent when a verdict was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RuleOutcome {
    /// Create an outcome carrying a verdict
    pub fn verdict(rule: impl Into<String>, result: bool) -> Self {
        Self {
            rule: rule.into(),
            result: Some(result),
            error: None,
        }
    }

    /// Create an outcome for a rule that failed to evaluate
    pub fn failed(rule: impl Into<String>, error: &RuleError) -> Self {
        Self {
            rule: rule.into(),
            result: None,
            error: Some(error.to_string()),
        }
    }

    /// Whether this rule produced a verdict
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Ordered per-rule verdicts for one inbound message.
///
/// Order matches the active rule set; repeated rules appear once per occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationResult {
    outcomes: Vec<RuleOutcome>,
}

impl ClassificationResult {
    /// Create an empty result with room for `capacity` outcomes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(capacity),
        }
    }

    /// Append the next outcome
    pub fn push(&mut self, outcome: RuleOutcome) {
        self.outcomes.push(outcome);
    }

    /// Outcomes in rule order
    pub fn outcomes(&self) -> &[RuleOutcome] {
        &self.outcomes
    }

    /// Number of rules that failed to evaluate
    pub fn error_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Encode as the JSON array sent back to clients
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<Vec<RuleOutcome>> for ClassificationResult {
    fn from(outcomes: Vec<RuleOutcome>) -> Self {
        Self { outcomes }
    }
}

impl IntoIterator for ClassificationResult {
    type Item = RuleOutcome;
    type IntoIter = std::vec::IntoIter<RuleOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}
