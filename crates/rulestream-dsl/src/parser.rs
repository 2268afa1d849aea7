//! Rule expression parser
//!
//! A rule has the shape `name(arg) OP literal`, for example `count('a') < 2`.
//! Two independent patterns are matched against the same (trimmed) string:
//!
//! 1. the first `identifier(args)` call anywhere in the rule
//! 2. an operator followed by a number or quoted literal, anchored at the end
//!
//! A rule must satisfy both. The function call is checked first, so input
//! matching neither pattern reports [`RuleError::InvalidFunctionSyntax`].

use once_cell::sync::Lazy;
use regex::Regex;
use rulestream_core::{Error, Result, RuleError};
use serde::Serialize;

use crate::value::{strip_quotes, Value};

const FUNCTION_CALL_PATTERN: &str = r"(\w+)\(([^)]*)\)";
const COMPARISON_PATTERN: &str = r#"([<>!=]=?)\s*(-?[0-9]*\.?[0-9]+|'[^']*'|"[^"]*")$"#;

static DEFAULT_PARSER: Lazy<RuleParser> = Lazy::new(RuleParser::default);

/// Structured view of one rule expression.
///
/// Names are kept as written; resolving them against the registries happens
/// at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedRule {
    /// Function identifier, e.g. `count`
    pub function: String,

    /// Call arguments with whitespace and surrounding quotes removed
    pub arguments: Vec<String>,

    /// Operator symbol as written, e.g. `>=`
    pub operator: String,

    /// Comparison literal
    pub literal: Value,
}

impl ParsedRule {
    /// The argument passed to the function; extra arguments are ignored
    pub fn argument(&self) -> &str {
        self.arguments.first().map(String::as_str).unwrap_or("")
    }
}

/// Regex-backed parser for rule expressions
#[derive(Debug, Clone)]
pub struct RuleParser {
    function_call: Regex,
    comparison: Regex,
}

impl RuleParser {
    /// Create a new rule parser
    pub fn new() -> Result<Self> {
        Ok(Self {
            function_call: Regex::new(FUNCTION_CALL_PATTERN).map_err(|e| {
                Error::internal(format!("Failed to compile function call regex: {}", e))
            })?,
            comparison: Regex::new(COMPARISON_PATTERN).map_err(|e| {
                Error::internal(format!("Failed to compile comparison regex: {}", e))
            })?,
        })
    }

    /// Parse a rule expression
    pub fn parse(&self, rule: &str) -> std::result::Result<ParsedRule, RuleError> {
        let expr = rule.trim();

        let call = self
            .function_call
            .captures(expr)
            .ok_or_else(|| RuleError::InvalidFunctionSyntax(rule.to_string()))?;
        let function = call[1].to_string();
        let arguments = call[2]
            .split(',')
            .map(|arg| strip_quotes(arg).to_string())
            .collect();

        let comparison = self
            .comparison
            .captures(expr)
            .ok_or_else(|| RuleError::InvalidComparisonSyntax(rule.to_string()))?;
        let operator = comparison[1].to_string();
        let literal = Value::from_literal(&comparison[2]);

        Ok(ParsedRule {
            function,
            arguments,
            operator,
            literal,
        })
    }
}

impl Default for RuleParser {
    fn default() -> Self {
        Self::new().expect("Failed to create rule parser")
    }
}

/// Parse a rule with the shared parser
pub fn parse_rule(rule: &str) -> std::result::Result<ParsedRule, RuleError> {
    DEFAULT_PARSER.parse(rule)
}
