//! Websocket transport tests
//!
//! Bind the full router on an ephemeral port and drive `/ws` with a real
//! websocket client.

use axum::{body::Body, http::Request};
use futures::{SinkExt, Stream, StreamExt};
use http_body_util::BodyExt;
use rulestream_server::{build_app, AppState, RuleStore, ServerConfig};
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_tungstenite::tungstenite::{self, Message};
use tower::ServiceExt;

const TIMEOUT: Duration = Duration::from_secs(5);

fn test_state(max_message_bytes: usize) -> AppState {
    let config = ServerConfig {
        max_message_bytes,
        ..Default::default()
    };
    let store = RuleStore::with_rules(["sum() > 4", "count('a') < 1"]);
    AppState::new(config, store)
}

async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn next_text<S>(ws: &mut S) -> String
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    match tokio::time::timeout(TIMEOUT, ws.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        other => panic!("expected a text frame, got {:?}", other),
    }
}

async fn stats(state: &AppState) -> Value {
    let response = build_app(state.clone())
        .oneshot(Request::builder().uri("/api/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll until the server has recorded `expected` closed sessions
async fn wait_for_closed_sessions(state: &AppState, expected: u64) {
    let deadline = tokio::time::Instant::now() + TIMEOUT;
    while state.metrics.snapshot().sessions_closed < expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "session was not closed in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_one_ordered_result_per_text_frame() {
    let state = test_state(64 * 1024);
    let addr = spawn_server(state.clone()).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();

    ws.send(Message::Text("banana".into())).await.unwrap();
    ws.send(Message::Text("xyz".into())).await.unwrap();

    assert_eq!(
        next_text(&mut ws).await,
        r#"[{"rule":"sum() > 4","result":true},{"rule":"count('a') < 1","result":false}]"#
    );
    assert_eq!(
        next_text(&mut ws).await,
        r#"[{"rule":"sum() > 4","result":false},{"rule":"count('a') < 1","result":true}]"#
    );

    // Counted while the session is still open
    let snapshot = state.metrics.snapshot();
    assert_eq!(snapshot.messages_processed, 2);
    assert_eq!(snapshot.rule_evaluations, 4);
    assert_eq!(snapshot.active_sessions(), 1);
}

#[tokio::test]
async fn test_binary_frame_is_classified() {
    let state = test_state(64 * 1024);
    let addr = spawn_server(state).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();

    ws.send(Message::Binary(b"banana".to_vec())).await.unwrap();

    let result: Value = serde_json::from_str(&next_text(&mut ws).await).unwrap();
    assert_eq!(result[0]["result"], true);
    assert_eq!(result[1]["result"], false);
}

#[tokio::test]
async fn test_close_frame_ends_session() {
    let state = test_state(64 * 1024);
    let addr = spawn_server(state.clone()).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();

    ws.send(Message::Text("banana".into())).await.unwrap();
    next_text(&mut ws).await;
    ws.close(None).await.unwrap();

    wait_for_closed_sessions(&state, 1).await;

    let body = stats(&state).await;
    assert_eq!(body["sessions_opened"], 1);
    assert_eq!(body["sessions_closed"], 1);
    assert_eq!(body["active_sessions"], 0);
    assert_eq!(body["messages_processed"], 1);
}

#[tokio::test]
async fn test_rule_changes_apply_to_new_connections_only() {
    let state = test_state(64 * 1024);
    let addr = spawn_server(state.clone()).await;
    let url = format!("ws://{}/ws", addr);

    let (mut first, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
    // Round trip so the first session has taken its snapshot
    first.send(Message::Text("kiwi".into())).await.unwrap();
    next_text(&mut first).await;

    state.store.create("max() = 'a'").unwrap();

    first.send(Message::Text("banana".into())).await.unwrap();
    let old: Value = serde_json::from_str(&next_text(&mut first).await).unwrap();
    assert_eq!(old.as_array().unwrap().len(), 2);

    let (mut second, _) = tokio_tungstenite::connect_async(url.as_str()).await.unwrap();
    second.send(Message::Text("banana".into())).await.unwrap();
    let new: Value = serde_json::from_str(&next_text(&mut second).await).unwrap();
    assert_eq!(new.as_array().unwrap().len(), 3);
    assert_eq!(new[2]["rule"], "max() = 'a'");
    assert_eq!(new[2]["result"], true);
}

#[tokio::test]
async fn test_oversized_frame_is_rejected() {
    let state = test_state(64);
    let addr = spawn_server(state.clone()).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();

    // The client may already see the connection drop while sending
    let _ = ws.send(Message::Text("a".repeat(1024))).await;

    match tokio::time::timeout(TIMEOUT, ws.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => panic!("oversized frame was classified: {}", text),
        Ok(_) => {}
        Err(_) => panic!("connection stayed open after an oversized frame"),
    }

    wait_for_closed_sessions(&state, 1).await;
    assert_eq!(state.metrics.snapshot().messages_processed, 0);
}
