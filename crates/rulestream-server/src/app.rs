use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::AppState;
use crate::websocket;

/// Build the Axum application
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Rule administration, behind the admin gate
    let admin_routes = Router::new()
        .route(
            "/rules",
            get(routes::list_rules)
                .post(routes::create_rule)
                .put(routes::update_rule)
                .delete(routes::delete_rule),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            routes::require_admin,
        ));

    let api_routes = Router::new()
        .route("/stats", get(routes::stats))
        .route("/eval", post(routes::eval))
        .merge(admin_routes);

    Router::new()
        .route("/health", get(routes::health))
        .route("/metrics", get(routes::metrics))
        .nest("/api", api_routes)
        .route("/ws", get(websocket::websocket_handler))
        .layer(RequestBodyLimitLayer::new(state.config.max_message_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the server until `shutdown` resolves
pub async fn run_server<F>(state: AppState, addr: SocketAddr, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("RuleStream listening on http://{}", addr);
    tracing::info!("Classification sessions at ws://{}/ws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
