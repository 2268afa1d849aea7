//! Function registry: the fixed set of string-analysis functions

use rulestream_core::RuleError;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::value::Value;

/// A string-analysis function callable from a rule expression.
///
/// Each function receives the (possibly empty) call argument and the subject
/// string. Lengths and frequencies are measured in Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Function {
    /// Occurrences of the argument in the subject
    Count,
    /// Occurrences of the argument divided by subject length
    Avg,
    /// Least frequent character, first occurrence wins ties
    Min,
    /// Most frequent character, first occurrence wins ties
    Max,
    /// Subject length; the argument is ignored
    Sum,
}

impl Function {
    pub const ALL: [Function; 5] = [
        Function::Count,
        Function::Avg,
        Function::Min,
        Function::Max,
        Function::Sum,
    ];

    /// Look up a function by the name used in rule expressions
    pub fn from_name(name: &str) -> Result<Self, RuleError> {
        match name {
            "count" => Ok(Function::Count),
            "avg" => Ok(Function::Avg),
            "min" => Ok(Function::Min),
            "max" => Ok(Function::Max),
            "sum" => Ok(Function::Sum),
            other => Err(RuleError::UnknownFunction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Count => "count",
            Function::Avg => "avg",
            Function::Min => "min",
            Function::Max => "max",
            Function::Sum => "sum",
        }
    }

    /// Apply the function to `subject`
    pub fn call(&self, arg: &str, subject: &str) -> Value {
        match self {
            Function::Count => Value::from(count(arg, subject)),
            Function::Avg => {
                // 0 / 0 is NaN on an empty subject; comparisons against it are false
                let len = subject.chars().count();
                Value::Number(count(arg, subject) as f64 / len as f64)
            }
            Function::Min => extreme(subject, |candidate, best| candidate < best),
            Function::Max => extreme(subject, |candidate, best| candidate > best),
            Function::Sum => Value::from(subject.chars().count()),
        }
    }
}

impl FromStr for Function {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-overlapping occurrences of `needle`; an empty needle matches nothing
fn count(needle: &str, subject: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    subject.matches(needle).count()
}

/// Character frequencies in first-occurrence order
fn frequencies(subject: &str) -> Vec<(char, usize)> {
    let mut freq: Vec<(char, usize)> = Vec::new();
    let mut slots: HashMap<char, usize> = HashMap::new();
    for c in subject.chars() {
        match slots.entry(c) {
            Entry::Occupied(slot) => freq[*slot.get()].1 += 1,
            Entry::Vacant(slot) => {
                slot.insert(freq.len());
                freq.push((c, 1));
            }
        }
    }
    freq
}

/// Pick the character whose count strictly beats every earlier candidate.
///
/// Only a strict improvement replaces the current pick, so ties resolve to
/// the character seen first. An empty subject yields empty text.
fn extreme(subject: &str, beats: impl Fn(usize, usize) -> bool) -> Value {
    let mut best: Option<(char, usize)> = None;
    for (c, n) in frequencies(subject) {
        match best {
            Some((_, best_n)) if !beats(n, best_n) => {}
            _ => best = Some((c, n)),
        }
    }
    match best {
        Some((c, _)) => Value::from(c),
        None => Value::Text(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        for function in Function::ALL {
            assert_eq!(Function::from_name(function.name()), Ok(function));
        }
        assert_eq!(
            Function::from_name("foo"),
            Err(RuleError::UnknownFunction("foo".into()))
        );
        // Names are case sensitive
        assert!(Function::from_name("COUNT").is_err());
    }

    #[test]
    fn test_count() {
        assert_eq!(Function::Count.call("a", "banana"), Value::Number(3.0));
        assert_eq!(Function::Count.call("a", "xyz"), Value::Number(0.0));
        assert_eq!(Function::Count.call("", "banana"), Value::Number(0.0));
        assert_eq!(Function::Count.call("an", "banana"), Value::Number(2.0));
    }

    #[test]
    fn test_avg() {
        assert_eq!(Function::Avg.call("a", "banana"), Value::Number(0.5));
        match Function::Avg.call("a", "") {
            Value::Number(n) => assert!(n.is_nan()),
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_min() {
        assert_eq!(Function::Min.call("", "banana"), Value::Text("b".into()));
        assert_eq!(Function::Min.call("", "aabba"), Value::Text("b".into()));
        // c and d tie at one occurrence each, c appears first
        assert_eq!(Function::Min.call("", "aacd"), Value::Text("c".into()));
        assert_eq!(Function::Min.call("", ""), Value::Text(String::new()));
    }

    #[test]
    fn test_max() {
        assert_eq!(Function::Max.call("", "banana"), Value::Text("a".into()));
        // a and b tie at two occurrences each, b appears first
        assert_eq!(Function::Max.call("", "bbaa"), Value::Text("b".into()));
        assert_eq!(Function::Max.call("", "xyz"), Value::Text("x".into()));
    }

    #[test]
    fn test_tie_break_with_many_distinct_characters() {
        let distinct: String = (0x4e00u32..0x4e00 + 20_000)
            .filter_map(char::from_u32)
            .collect();

        // Every character appears once: the first one wins both ties
        assert_eq!(Function::Min.call("", &distinct), Value::from('\u{4e00}'));
        assert_eq!(Function::Max.call("", &distinct), Value::from('\u{4e00}'));

        // A late repeat becomes the unique maximum; the minimum is unchanged
        let subject = format!("{}zz", distinct);
        assert_eq!(Function::Min.call("", &subject), Value::from('\u{4e00}'));
        assert_eq!(Function::Max.call("", &subject), Value::from('z'));

        // Repeating a character that occurs late does not move the minimum
        let subject = format!("{}\u{4e01}", distinct);
        assert_eq!(Function::Min.call("", &subject), Value::from('\u{4e00}'));
        assert_eq!(Function::Max.call("", &subject), Value::from('\u{4e01}'));
    }

    #[test]
    fn test_sum_ignores_argument() {
        assert_eq!(Function::Sum.call("", "banana"), Value::Number(6.0));
        assert_eq!(Function::Sum.call("zzz", "banana"), Value::Number(6.0));
        assert_eq!(Function::Sum.call("", ""), Value::Number(0.0));
        assert_eq!(Function::Sum.call("", "héllo"), Value::Number(5.0));
    }
}
