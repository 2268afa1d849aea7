//! RuleStream DSL
//!
//! Parser and evaluator for the rule expression language used to classify
//! text messages.
//!
//! A rule combines one string-analysis function with a trailing comparison:
//!
//! ```text
//! count('a') < 2
//! avg('o') >= 0.25
//! min() = 'b'
//! sum() != 10
//! ```
//!
//! Functions and operators form closed sets ([`Function`], [`Operator`]);
//! unknown names surface as typed [`RuleError`]s.

pub mod evaluator;
pub mod function;
pub mod operator;
pub mod parser;
pub mod value;

pub use evaluator::{compile, evaluate, CompiledRule};
pub use function::Function;
pub use operator::Operator;
pub use parser::{parse_rule, ParsedRule, RuleParser};
pub use rulestream_core::RuleError;
pub use value::Value;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::evaluator::{compile, evaluate, CompiledRule};
    pub use crate::function::Function;
    pub use crate::operator::Operator;
    pub use crate::parser::{parse_rule, ParsedRule};
    pub use crate::value::Value;
    pub use rulestream_core::RuleError;
}
