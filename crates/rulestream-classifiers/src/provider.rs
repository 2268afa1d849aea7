//! Source of the active rule set

use async_trait::async_trait;
use rulestream_core::Result;
use std::sync::Arc;

/// Supplies the ordered list of active rule expressions.
///
/// Sessions call this exactly once, when they start; later changes are only
/// seen by sessions started afterwards.
#[async_trait]
pub trait RuleSetProvider: Send + Sync {
    /// Fetch the currently active rules in order
    async fn list_active_rules(&self) -> Result<Vec<String>>;
}

#[async_trait]
impl<P: RuleSetProvider + ?Sized> RuleSetProvider for Arc<P> {
    async fn list_active_rules(&self) -> Result<Vec<String>> {
        (**self).list_active_rules().await
    }
}

/// A provider that always returns the same rules
#[derive(Debug, Clone, Default)]
pub struct StaticRuleSet {
    rules: Vec<String>,
}

impl StaticRuleSet {
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rules: rules.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl RuleSetProvider for StaticRuleSet {
    async fn list_active_rules(&self) -> Result<Vec<String>> {
        Ok(self.rules.clone())
    }
}
