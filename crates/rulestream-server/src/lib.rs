//! RuleStream Server
//!
//! Serves streaming classification sessions over websockets (`/ws`) and a
//! small HTTP API for evaluating single rules and administering the shared
//! rule set.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod routes;
pub mod state;
pub mod store;
pub mod websocket;

pub use app::{build_app, run_server};
pub use auth::{AdminGate, AuthError};
pub use config::{MetricsConfig, ServerConfig};
pub use state::AppState;
pub use store::{RuleFile, RuleStore, StoreError};
