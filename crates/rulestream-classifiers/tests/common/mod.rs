//! Mock rule-set providers for testing
//!
//! Provides configurable implementations of the RuleSetProvider trait for
//! testing session setup, snapshot isolation and failure handling.

#![allow(dead_code)]

use async_trait::async_trait;
use rulestream_classifiers::RuleSetProvider;
use rulestream_core::{Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A provider whose rules can be replaced while sessions are running
pub struct MockProvider {
    rules: Mutex<Vec<String>>,
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
}

impl MockProvider {
    /// Create a new mock provider with the given rules
    pub fn new(rules: &[&str]) -> Self {
        Self {
            rules: Mutex::new(rules.iter().map(|r| r.to_string()).collect()),
            simulated_latency: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Set simulated fetch latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Replace the stored rules
    pub fn replace_rules(&self, rules: &[&str]) {
        *self.rules.lock().unwrap() = rules.iter().map(|r| r.to_string()).collect();
    }

    /// Get the number of times the rules were fetched
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RuleSetProvider for MockProvider {
    async fn list_active_rules(&self) -> Result<Vec<String>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        Ok(self.rules.lock().unwrap().clone())
    }
}

/// A provider that always fails - for testing session setup errors
pub struct FailingProvider {
    error_message: String,
}

impl FailingProvider {
    /// Create a new failing provider
    pub fn new() -> Self {
        Self {
            error_message: "Simulated rule store failure".to_string(),
        }
    }

    /// Set a custom error message
    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }
}

#[async_trait]
impl RuleSetProvider for FailingProvider {
    async fn list_active_rules(&self) -> Result<Vec<String>> {
        Err(Error::internal(&self.error_message))
    }
}
