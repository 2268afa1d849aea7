//! In-memory rule store
//!
//! Holds the shared, ordered list of rule expressions that new sessions
//! snapshot. Nothing is persisted: the store lives as long as the process.

use async_trait::async_trait;
use parking_lot::RwLock;
use rulestream_classifiers::RuleSetProvider;
use rulestream_core::RuleError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Rule store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Rule already exists: {0}")]
    RuleExists(String),

    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Failed to read rule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse rule file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// On-disk seed format
///
/// ```yaml
/// rules:
///   - "count('a') < 1"
///   - "sum() >= 10"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<String>,
}

impl RuleFile {
    /// Load a rule file from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load a rule file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }
}

/// Ordered, deduplicated rule expressions
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: RwLock<Vec<String>>,
}

impl RuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store without validation.
    ///
    /// Malformed rules are kept; sessions report them per rule.
    pub fn with_rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seeded: Vec<String> = Vec::new();
        for rule in rules {
            let rule = rule.into().trim().to_string();
            if let Err(e) = rulestream_dsl::compile(&rule) {
                warn!("Seeded rule '{}' is not valid: {}", rule, e);
            }
            if seeded.contains(&rule) {
                warn!("Skipping duplicate seeded rule '{}'", rule);
                continue;
            }
            seeded.push(rule);
        }

        Self {
            rules: RwLock::new(seeded),
        }
    }

    /// Seed a store from a YAML rule file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = RuleFile::from_file(path)?;
        let store = Self::with_rules(file.rules);
        info!("Loaded {} rules from {}", store.len(), path.display());
        Ok(store)
    }

    /// Add a rule at the end of the list
    pub fn create(&self, rule: &str) -> Result<(), StoreError> {
        let rule = rule.trim();
        rulestream_dsl::compile(rule)?;

        let mut rules = self.rules.write();
        if rules.iter().any(|r| r == rule) {
            return Err(StoreError::RuleExists(rule.to_string()));
        }
        rules.push(rule.to_string());
        Ok(())
    }

    /// All rules in order
    pub fn list(&self) -> Vec<String> {
        self.rules.read().clone()
    }

    /// Replace `rule` in place with `replacement`
    pub fn update(&self, rule: &str, replacement: &str) -> Result<(), StoreError> {
        let rule = rule.trim();
        let replacement = replacement.trim();
        rulestream_dsl::compile(replacement)?;

        let mut rules = self.rules.write();
        let index = rules
            .iter()
            .position(|r| r == rule)
            .ok_or_else(|| StoreError::RuleNotFound(rule.to_string()))?;

        if rule != replacement && rules.iter().any(|r| r == replacement) {
            return Err(StoreError::RuleExists(replacement.to_string()));
        }
        rules[index] = replacement.to_string();
        Ok(())
    }

    /// Remove a rule, returning it
    pub fn delete(&self, rule: &str) -> Result<String, StoreError> {
        let rule = rule.trim();
        let mut rules = self.rules.write();
        let index = rules
            .iter()
            .position(|r| r == rule)
            .ok_or_else(|| StoreError::RuleNotFound(rule.to_string()))?;
        Ok(rules.remove(index))
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

#[async_trait]
impl RuleSetProvider for RuleStore {
    async fn list_active_rules(&self) -> rulestream_core::Result<Vec<String>> {
        Ok(self.list())
    }
}
