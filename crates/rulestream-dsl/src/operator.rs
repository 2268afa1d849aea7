//! Operator registry: the fixed set of comparison predicates

use rulestream_core::RuleError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::value::Value;

/// Binary comparison between a function result and a literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Greater than (>)
    Gt,
    /// Less than (<)
    Lt,
    /// Greater than or equal (>=)
    Ge,
    /// Less than or equal (<=)
    Le,
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Ne,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Gt,
        Operator::Lt,
        Operator::Ge,
        Operator::Le,
        Operator::Eq,
        Operator::Ne,
    ];

    /// Look up an operator by its symbol
    pub fn from_symbol(symbol: &str) -> Result<Self, RuleError> {
        match symbol {
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            ">=" => Ok(Operator::Ge),
            "<=" => Ok(Operator::Le),
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            other => Err(RuleError::UnknownOperator(other.to_string())),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Eq => "=",
            Operator::Ne => "!=",
        }
    }

    /// Apply the predicate to `(left, right)`.
    ///
    /// An unordered pair (NaN) fails every ordering test.
    pub fn apply(&self, left: &Value, right: &Value) -> bool {
        match self {
            Operator::Eq => left.equals(right),
            Operator::Ne => !left.equals(right),
            Operator::Gt => matches!(left.compare(right), Some(Ordering::Greater)),
            Operator::Lt => matches!(left.compare(right), Some(Ordering::Less)),
            Operator::Ge => matches!(
                left.compare(right),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::Le => matches!(
                left.compare(right),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

impl FromStr for Operator {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbol(s)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
