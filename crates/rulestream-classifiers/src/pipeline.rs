//! Rule application pipeline
//!
//! Applies an ordered list of rule expressions to one message. Every rule is
//! evaluated independently against the same subject:
//! - output order matches rule order
//! - repeated rules are evaluated and reported once per occurrence
//! - a rule that fails to parse or resolve is reported in its own slot and
//!   does not stop the remaining rules

use rulestream_core::{ClassificationResult, RuleOutcome};
use rulestream_dsl::evaluate;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Apply `rules` to `subject`, isolating per-rule failures
pub fn apply_rules<S: AsRef<str>>(subject: &str, rules: &[S]) -> ClassificationResult {
    let mut result = ClassificationResult::with_capacity(rules.len());

    for rule in rules {
        let rule = rule.as_ref();
        let outcome = match evaluate(rule, subject) {
            Ok(verdict) => RuleOutcome::verdict(rule, verdict),
            Err(e) => {
                debug!("Rule '{}' could not be evaluated: {}", rule, e);
                metrics::counter!("rulestream_rule_errors_total").increment(1);
                RuleOutcome::failed(rule, &e)
            }
        };
        result.push(outcome);
    }

    result
}

/// A fixed, ordered rule set that can be applied to any number of messages
#[derive(Debug, Clone)]
pub struct RulePipeline {
    rules: Arc<[String]>,
}

/// Pipeline output together with its execution time
#[derive(Debug, Clone)]
pub struct PipelineExecutionResult {
    /// Per-rule verdicts in rule order
    pub result: ClassificationResult,

    /// Total pipeline execution time
    pub total_latency_us: u64,
}

impl RulePipeline {
    /// Create a pipeline over `rules`
    pub fn new(rules: impl Into<Arc<[String]>>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule to `subject`
    pub fn apply(&self, subject: &str) -> ClassificationResult {
        apply_rules(subject, &self.rules)
    }

    /// Apply every rule to `subject` and measure how long it took
    pub fn execute(&self, subject: &str) -> PipelineExecutionResult {
        let start = Instant::now();
        let result = self.apply(subject);
        let total_latency_us = start.elapsed().as_micros() as u64;

        debug!(
            rules = self.rules.len(),
            errors = result.error_count(),
            latency_us = total_latency_us,
            "pipeline executed"
        );

        PipelineExecutionResult {
            result,
            total_latency_us,
        }
    }
}

impl From<Vec<String>> for RulePipeline {
    fn from(rules: Vec<String>) -> Self {
        Self::new(rules)
    }
}
