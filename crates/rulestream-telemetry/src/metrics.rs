//! Metrics collection and reporting

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics collector for classification traffic
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    sessions_opened: AtomicU64,
    sessions_rejected: AtomicU64,
    sessions_closed: AtomicU64,
    messages_processed: AtomicU64,
    rule_evaluations: AtomicU64,
    rule_errors: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                sessions_opened: AtomicU64::new(0),
                sessions_rejected: AtomicU64::new(0),
                sessions_closed: AtomicU64::new(0),
                messages_processed: AtomicU64::new(0),
                rule_evaluations: AtomicU64::new(0),
                rule_errors: AtomicU64::new(0),
            }),
        }
    }

    /// Record a session that reached the active state
    pub fn record_session_opened(&self) {
        self.inner.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session whose rule snapshot could not be fetched
    pub fn record_session_rejected(&self) {
        self.inner.sessions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished session
    pub fn record_session_closed(&self) {
        self.inner.sessions_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one classified message and the rule evaluations it took
    pub fn record_message(&self, rule_evaluations: u64, rule_errors: u64) {
        self.inner.messages_processed.fetch_add(1, Ordering::Relaxed);
        self.record_evaluations(rule_evaluations, rule_errors);
    }

    /// Record rule evaluations outside a session (single-rule requests)
    pub fn record_evaluations(&self, evaluations: u64, errors: u64) {
        self.inner
            .rule_evaluations
            .fetch_add(evaluations, Ordering::Relaxed);
        self.inner.rule_errors.fetch_add(errors, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_opened: self.inner.sessions_opened.load(Ordering::Relaxed),
            sessions_rejected: self.inner.sessions_rejected.load(Ordering::Relaxed),
            sessions_closed: self.inner.sessions_closed.load(Ordering::Relaxed),
            messages_processed: self.inner.messages_processed.load(Ordering::Relaxed),
            rule_evaluations: self.inner.rule_evaluations.load(Ordering::Relaxed),
            rule_errors: self.inner.rule_errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub sessions_opened: u64,
    pub sessions_rejected: u64,
    pub sessions_closed: u64,
    pub messages_processed: u64,
    pub rule_evaluations: u64,
    pub rule_errors: u64,
}

impl MetricsSnapshot {
    /// Sessions currently running
    pub fn active_sessions(&self) -> u64 {
        self.sessions_opened.saturating_sub(self.sessions_closed)
    }

    /// Fraction of rule evaluations that failed
    pub fn rule_error_rate(&self) -> f64 {
        if self.rule_evaluations == 0 {
            0.0
        } else {
            self.rule_errors as f64 / self.rule_evaluations as f64
        }
    }
}
