//! Websocket transport for classification sessions

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::future::ready;
use futures::{pin_mut, SinkExt, StreamExt};
use rulestream_classifiers::{ClassificationSession, SessionInput};
use rulestream_core::ClassificationResult;
use tracing::debug;

use crate::state::AppState;

/// Upgrade to a websocket and run one classification session over it
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let limit = state.config.max_message_bytes;
    ws.max_message_size(limit)
        .max_frame_size(limit)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let session = match ClassificationSession::open(state.store.as_ref()).await {
        Ok(session) => session,
        Err(e) => {
            state.metrics.record_session_rejected();
            let frame = CloseFrame {
                code: close_code::ERROR,
                reason: e.to_string().into(),
            };
            if let Err(e) = socket.send(Message::Close(Some(frame))).await {
                debug!("Failed to send close frame: {}", e);
            }
            return;
        }
    };
    state.metrics.record_session_opened();

    let (sender, receiver) = socket.split();

    let inbound = receiver.filter_map(|frame| ready(session_input(frame)));
    let outbound =
        sender.with(|payload: String| ready(Ok::<_, axum::Error>(Message::Text(payload))));
    pin_mut!(inbound, outbound);

    let metrics = state.metrics.clone();
    let record = |result: &ClassificationResult| {
        metrics.record_message(result.len() as u64, result.error_count() as u64);
    };

    if let Err(e) = session.run_with(inbound, outbound, record).await {
        debug!("Session closed after error: {}", e);
    }
    state.metrics.record_session_closed();
}

/// Map a websocket frame onto session input; control frames are skipped
fn session_input(frame: Result<Message, axum::Error>) -> Option<SessionInput> {
    match frame {
        Ok(Message::Text(text)) => Some(SessionInput::Message(text)),
        Ok(Message::Binary(bytes)) => Some(SessionInput::Message(
            String::from_utf8_lossy(&bytes).into_owned(),
        )),
        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => None,
        Ok(Message::Close(_)) => Some(SessionInput::Disconnect),
        Err(e) => {
            debug!("Websocket receive error: {}", e);
            Some(SessionInput::Disconnect)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_binary_frames_are_messages() {
        assert_eq!(
            session_input(Ok(Message::Text("banana".to_string()))),
            Some(SessionInput::Message("banana".to_string()))
        );
        assert_eq!(
            session_input(Ok(Message::Binary(vec![b'k', b'i', 0xff]))),
            Some(SessionInput::Message("ki\u{fffd}".to_string()))
        );
    }

    #[test]
    fn test_control_frames() {
        assert_eq!(session_input(Ok(Message::Ping(vec![1]))), None);
        assert_eq!(session_input(Ok(Message::Pong(vec![]))), None);
        assert_eq!(
            session_input(Ok(Message::Close(None))),
            Some(SessionInput::Disconnect)
        );
    }
}
