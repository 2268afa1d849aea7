//! Values produced by rule functions and written as comparison literals

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A function result or comparison literal.
///
/// Numbers compare numerically against numbers. Every other pairing is
/// compared as text, with numbers rendered in their shortest decimal form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Classify a raw literal: numeric if it parses as a number, otherwise
    /// text with surrounding quotes stripped.
    pub fn from_literal(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Text(strip_quotes(raw).to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Render as text for mixed comparisons
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Order two values.
    ///
    /// Returns `None` only for numeric comparisons involving NaN.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
            (Value::Text(l), Value::Text(r)) => Some(l.cmp(r)),
            _ => Some(self.to_text().cmp(&other.to_text())),
        }
    }

    /// Equality under the same typing rules as [`Value::compare`]
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::Text(l), Value::Text(r)) => l == r,
            _ => self.to_text() == other.to_text(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Text(c.to_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Trim whitespace and any surrounding single or double quotes
pub(crate) fn strip_quotes(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '\'' || c == '"')
}
