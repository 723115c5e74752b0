use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use super::AppState;

/// Dashboard WebSocket: relays every broadcaster envelope to the client and
/// answers pings. Clients are read-mostly; the only inbound message handled
/// is `{"type": "ping"}`.
pub async fn dashboard_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_dashboard_socket(socket, state))
}

async fn handle_dashboard_socket(mut socket: WebSocket, state: AppState) {
    let mut events = state.broadcaster.subscribe();

    let hello = serde_json::json!({
        "type": "connection",
        "message": "Connected to dashboard stream",
    });
    if socket.send(Message::Text(hello.to_string().into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(envelope) => {
                    if socket.send(Message::Text(envelope.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Dashboard client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply = match serde_json::from_str::<serde_json::Value>(&text) {
                        Ok(value) if value["type"] == "ping" => serde_json::json!({
                            "type": "pong",
                            "timestamp": value.get("timestamp"),
                        }),
                        Ok(_) => continue,
                        Err(_) => serde_json::json!({
                            "type": "error",
                            "message": "Invalid JSON received",
                        }),
                    };
                    if socket.send(Message::Text(reply.to_string().into())).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
