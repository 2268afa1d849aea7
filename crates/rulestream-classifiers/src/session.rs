//! Streaming classification sessions
//!
//! One session per connection. Lifecycle:
//!
//! ```text
//! Connecting --activate--> Active --close/disconnect--> Closed
//!      \------- snapshot fetch failed ----------------------^
//! ```
//!
//! The rule set is snapshotted once on activation and never refreshed.
//! Messages are classified strictly in arrival order: each result is sent
//! before the next message is read.

use futures::{Sink, SinkExt, Stream, StreamExt};
use rulestream_core::{ClassificationResult, Error, Result};
use std::fmt;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::pipeline::RulePipeline;
use crate::provider::RuleSetProvider;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closed,
}

/// Input delivered to a running session by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    /// An inbound message payload
    Message(String),
    /// The client disconnected
    Disconnect,
}

/// Totals reported when a session ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub rule_count: usize,
    pub messages_processed: u64,
    pub rule_errors: u64,
}

/// Classification lifecycle of one connection
pub struct ClassificationSession {
    id: String,
    state: SessionState,
    pipeline: RulePipeline,
    messages_processed: u64,
    rule_errors: u64,
}

impl ClassificationSession {
    /// Create a session in the `Connecting` state
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            state: SessionState::Connecting,
            pipeline: RulePipeline::new(Vec::<String>::new()),
            messages_processed: 0,
            rule_errors: 0,
        }
    }

    /// Create a session and activate it against `provider`
    pub async fn open<P: RuleSetProvider + ?Sized>(provider: &P) -> Result<Self> {
        let mut session = Self::new();
        session.activate(provider).await?;
        Ok(session)
    }

    /// Snapshot the active rule set and enter `Active`.
    ///
    /// The provider is consulted only from `Connecting`. A failed fetch is not
    /// retried: the session moves straight to `Closed`.
    pub async fn activate<P: RuleSetProvider + ?Sized>(&mut self, provider: &P) -> Result<()> {
        match self.state {
            SessionState::Active => return Ok(()),
            SessionState::Closed => return Err(Error::SessionClosed),
            SessionState::Connecting => {}
        }

        let rules = match provider.list_active_rules().await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(session = %self.id, "Failed to fetch active rules: {}", e);
                self.state = SessionState::Closed;
                return Err(match e {
                    e @ Error::RuleSetUnavailable(_) => e,
                    other => Error::rule_set_unavailable(other.to_string()),
                });
            }
        };

        info!(session = %self.id, rules = rules.len(), "Session active");
        metrics::counter!("rulestream_sessions_total").increment(1);

        self.pipeline = RulePipeline::new(rules);
        self.state = SessionState::Active;
        Ok(())
    }

    /// Classify one message against the session's rule snapshot
    pub fn classify(&mut self, message: &str) -> Result<ClassificationResult> {
        if self.state != SessionState::Active {
            return Err(Error::SessionClosed);
        }

        let execution = self.pipeline.execute(message);
        self.messages_processed += 1;
        self.rule_errors += execution.result.error_count() as u64;

        metrics::counter!("rulestream_messages_total").increment(1);
        metrics::histogram!("rulestream_classification_latency_us")
            .record(execution.total_latency_us as f64);

        Ok(execution.result)
    }

    /// Stop accepting messages
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            debug!(session = %self.id, "Session closed");
            self.state = SessionState::Closed;
        }
    }

    /// Drive the session until the client disconnects.
    ///
    /// Every `SessionInput::Message` is classified and its JSON result sent on
    /// `outbound` before the next input is read. The loop ends on
    /// `SessionInput::Disconnect`, the end of `inbound`, or a failed send.
    pub async fn run<S, K>(self, inbound: S, outbound: K) -> Result<SessionSummary>
    where
        S: Stream<Item = SessionInput> + Unpin,
        K: Sink<String> + Unpin,
        K::Error: fmt::Display,
    {
        self.run_with(inbound, outbound, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_result` for every classified
    /// message before its result is sent.
    pub async fn run_with<S, K, F>(
        mut self,
        inbound: S,
        outbound: K,
        on_result: F,
    ) -> Result<SessionSummary>
    where
        S: Stream<Item = SessionInput> + Unpin,
        K: Sink<String> + Unpin,
        K::Error: fmt::Display,
        F: FnMut(&ClassificationResult),
    {
        if self.state != SessionState::Active {
            return Err(Error::SessionClosed);
        }

        let span = info_span!("session", id = %self.id);
        async move {
            let outcome = self.drive(inbound, outbound, on_result).await;
            self.finish(outcome)
        }
        .instrument(span)
        .await
    }

    async fn drive<S, K, F>(
        &mut self,
        mut inbound: S,
        mut outbound: K,
        mut on_result: F,
    ) -> Result<()>
    where
        S: Stream<Item = SessionInput> + Unpin,
        K: Sink<String> + Unpin,
        K::Error: fmt::Display,
        F: FnMut(&ClassificationResult),
    {
        while let Some(input) = inbound.next().await {
            let message = match input {
                SessionInput::Message(message) => message,
                SessionInput::Disconnect => break,
            };

            debug!("Received: {}", message);
            let result = self.classify(&message)?;
            on_result(&result);
            let payload = result.to_json()?;

            if let Err(e) = outbound.send(payload).await {
                warn!("Failed to send classification result: {}", e);
                break;
            }
        }
        Ok(())
    }

    /// Close the session however the message loop ended
    fn finish(&mut self, outcome: Result<()>) -> Result<SessionSummary> {
        self.close();
        info!(
            messages = self.messages_processed,
            rule_errors = self.rule_errors,
            "Client disconnected"
        );

        match outcome {
            Ok(()) => Ok(self.summary()),
            Err(e) => {
                warn!("Session ended with error: {}", e);
                Err(e)
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The rule snapshot taken on activation
    pub fn rules(&self) -> &[String] {
        self.pipeline.rules()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            rule_count: self.pipeline.len(),
            messages_processed: self.messages_processed,
            rule_errors: self.rule_errors,
        }
    }
}

impl Default for ClassificationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassificationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("rules", &self.pipeline.len())
            .field("messages_processed", &self.messages_processed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticRuleSet;

    #[tokio::test]
    async fn test_lifecycle() {
        let mut session = ClassificationSession::new();
        assert_eq!(session.state(), SessionState::Connecting);
        assert!(matches!(session.classify("banana"), Err(Error::SessionClosed)));

        session
            .activate(&StaticRuleSet::new(["sum() > 4"]))
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Active);

        let result = session.classify("banana").unwrap();
        assert_eq!(result.outcomes()[0].result, Some(true));

        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(matches!(session.classify("banana"), Err(Error::SessionClosed)));
    }

    #[tokio::test]
    async fn test_activate_twice_keeps_first_snapshot() {
        let mut session = ClassificationSession::open(&StaticRuleSet::new(["sum() > 4"]))
            .await
            .unwrap();
        session
            .activate(&StaticRuleSet::new(["sum() > 1", "sum() > 2"]))
            .await
            .unwrap();

        assert_eq!(session.rules(), &["sum() > 4".to_string()]);
    }

    #[tokio::test]
    async fn test_message_loop_error_still_closes_session() {
        use futures::channel::mpsc;
        use futures::stream;

        // Never activated, so the first message fails to classify
        let mut session = ClassificationSession::new();
        let (tx, mut rx) = mpsc::unbounded::<String>();
        let inbound = stream::iter(vec![SessionInput::Message("banana".into())]);

        let outcome = session.drive(inbound, tx, |_| {}).await;
        assert!(matches!(outcome, Err(Error::SessionClosed)));

        let finished = session.finish(outcome);
        assert!(matches!(finished, Err(Error::SessionClosed)));
        assert_eq!(session.state(), SessionState::Closed);
        assert!(rx.try_next().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clean_loop_finishes_with_summary() {
        use futures::channel::mpsc;
        use futures::stream;

        let mut session = ClassificationSession::open(&StaticRuleSet::new(["sum() > 4"]))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded::<String>();
        let inbound = stream::iter(vec![
            SessionInput::Message("banana".into()),
            SessionInput::Message("kiwi".into()),
        ]);

        let outcome = session.drive(inbound, tx, |_| {}).await;
        let summary = session.finish(outcome).unwrap();

        assert_eq!(summary.messages_processed, 2);
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_closed_session_cannot_reactivate() {
        let mut session = ClassificationSession::new();
        session.close();

        let err = session.activate(&StaticRuleSet::default()).await.unwrap_err();
        assert!(matches!(err, Error::SessionClosed));
    }
}
