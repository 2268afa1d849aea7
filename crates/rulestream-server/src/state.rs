use metrics_exporter_prometheus::PrometheusHandle;
use rulestream_telemetry::MetricsCollector;
use std::sync::Arc;
use tracing::info;

use crate::auth::AdminGate;
use crate::config::ServerConfig;
use crate::store::RuleStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Active rule set, snapshotted by every new session
    pub store: Arc<RuleStore>,

    /// Guards the rule administration endpoints
    pub gate: Arc<AdminGate>,

    /// Counters behind `/api/stats`
    pub metrics: MetricsCollector,

    /// Prometheus renderer, present when the recorder is installed
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: RuleStore) -> Self {
        let gate = AdminGate::new(config.admin_token.clone());
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            gate: Arc::new(gate),
            metrics: MetricsCollector::new(),
            prometheus: None,
        }
    }

    /// Build state from configuration, seeding the store from `rules_path`
    pub fn from_config(config: ServerConfig) -> anyhow::Result<Self> {
        let store = match &config.rules_path {
            Some(path) => RuleStore::from_file(path)?,
            None => {
                info!("No rule file configured, starting with an empty rule set");
                RuleStore::new()
            }
        };
        Ok(Self::new(config, store))
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
