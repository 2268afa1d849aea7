//! RuleStream
//!
//! Websocket server that classifies every inbound message against the
//! active rule set, plus offline `eval` and `check` helpers.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use rulestream_server::cli::{Cli, Commands, ServeArgs};
use rulestream_server::{run_server, AppState, RuleFile, ServerConfig};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Eval { rule, subject } => {
            init_tracing(false);
            let result = rulestream_dsl::evaluate(&rule, &subject)?;
            println!("{}", serde_json::json!({ "rule": rule, "result": result }));
            Ok(())
        }
        Commands::Check { path, verbose } => {
            init_tracing(verbose);
            check_rules(&path)
        }
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    init_tracing(args.verbose);

    info!("Starting RuleStream");

    let config = ServerConfig::load(&args.config, &args)?;
    info!("Configuration loaded from {}", args.config);
    if config.admin_token.is_none() {
        warn!("No admin token configured, rule administration endpoints are disabled");
    }

    let addr = config.socket_addr()?;
    let metrics_enabled = config.metrics.enabled;

    let mut state = AppState::from_config(config)?;
    if metrics_enabled {
        state = state.with_prometheus(init_metrics()?);
    }
    info!("Serving {} rules", state.store.len());

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    run_server(state, addr, shutdown).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn check_rules(path: &str) -> Result<()> {
    let file = RuleFile::from_file(path)?;
    let mut invalid = 0;

    for rule in &file.rules {
        match rulestream_dsl::compile(rule) {
            Ok(_) => println!("ok      {}", rule),
            Err(e) => {
                invalid += 1;
                println!("invalid {} ({})", rule, e);
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} rules in {} are invalid", invalid, file.rules.len(), path);
    }
    println!("{} rules OK", file.rules.len());
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("rulestream=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rulestream=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "rulestream_sessions_total",
        "Total number of classification sessions that became active"
    );
    metrics::describe_counter!(
        "rulestream_messages_total",
        "Total number of messages classified"
    );
    metrics::describe_counter!(
        "rulestream_rule_errors_total",
        "Total number of rule evaluations that failed"
    );
    metrics::describe_histogram!(
        "rulestream_classification_latency_us",
        metrics::Unit::Microseconds,
        "Time to classify one message against a session's rule set"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
