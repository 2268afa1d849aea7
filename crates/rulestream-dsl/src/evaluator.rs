//! Rule evaluation
//!
//! Evaluation is pure: no state is shared between calls, so the same
//! `(rule, subject)` pair always yields the same verdict and any number of
//! sessions may evaluate concurrently without locking.

use rulestream_core::RuleError;
use tracing::trace;

use crate::function::Function;
use crate::operator::Operator;
use crate::parser::{parse_rule, ParsedRule};
use crate::value::Value;

/// A rule whose function and operator have been resolved against the registries
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub function: Function,
    pub argument: String,
    pub operator: Operator,
    pub literal: Value,
}

impl CompiledRule {
    /// Resolve the names in a parsed rule
    pub fn from_parsed(parsed: ParsedRule) -> Result<Self, RuleError> {
        let function = Function::from_name(&parsed.function)?;
        let operator = Operator::from_symbol(&parsed.operator)?;
        let argument = parsed.argument().to_string();

        Ok(Self {
            function,
            argument,
            operator,
            literal: parsed.literal,
        })
    }

    /// Compute the function result for `subject`
    pub fn compute(&self, subject: &str) -> Value {
        self.function.call(&self.argument, subject)
    }

    /// Verdict for `subject`
    pub fn matches(&self, subject: &str) -> bool {
        let computed = self.compute(subject);
        let verdict = self.operator.apply(&computed, &self.literal);
        trace!(
            function = %self.function,
            operator = %self.operator,
            computed = %computed,
            literal = %self.literal,
            verdict,
            "rule evaluated"
        );
        verdict
    }
}

/// Parse a rule and resolve its function and operator.
///
/// Succeeds exactly when [`evaluate`] would produce a verdict for every subject.
pub fn compile(rule: &str) -> Result<CompiledRule, RuleError> {
    CompiledRule::from_parsed(parse_rule(rule)?)
}

/// Evaluate one rule expression against one subject string
pub fn evaluate(rule: &str, subject: &str) -> Result<bool, RuleError> {
    Ok(compile(rule)?.matches(subject))
}
