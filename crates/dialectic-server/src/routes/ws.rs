use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use dialectic_core::message::{InboundMessage, OutboundMessage};
use dialectic_core::scenario::Scenario;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::state::{AppState, ChannelListener};

/// GET /ws: dashboard socket. Receives every broadcast; accepts
/// `trigger_demo` and `ping` actions.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

async fn handle_socket(socket: WebSocket, app: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let client_id = format!("client_{}", uuid::Uuid::new_v4().simple());
    let listener_id = app
        .broadcaster
        .register(Arc::new(ChannelListener::new(tx.clone())));
    tracing::info!(%client_id, "client connected");

    reply(&tx, &welcome(&client_id));

    // Broadcasts and direct replies share one outbound queue.
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_app = app.clone();
    let recv_tx = tx;
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_inbound(&recv_app, &recv_tx, text.as_str()).await,
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    app.broadcaster.unregister(listener_id);
    tracing::info!(%client_id, "client disconnected");
}

fn welcome(client_id: &str) -> OutboundMessage {
    OutboundMessage::ConnectionEstablished {
        client_id: client_id.to_string(),
        message: "Connected to dialectic".into(),
    }
}

async fn handle_inbound(app: &AppState, tx: &mpsc::UnboundedSender<String>, text: &str) {
    match InboundMessage::parse(text) {
        Some(InboundMessage::TriggerDemo { scenario }) => {
            let scenario: Scenario = match scenario.parse() {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("ignoring trigger: {e}");
                    return;
                }
            };
            tracing::info!(%scenario, "triggered scenario");
            // Results reach this client through the broadcast like everyone else.
            if let Err(e) = app.run_event(scenario.event()).await {
                tracing::warn!(%scenario, "scenario run failed: {}", e.0);
            }
        }
        Some(InboundMessage::Ping { timestamp }) => {
            reply(tx, &OutboundMessage::Pong { timestamp });
        }
        None => tracing::warn!("ignoring unrecognized client message: {text}"),
    }
}

fn reply(tx: &mpsc::UnboundedSender<String>, message: &OutboundMessage) {
    match message.to_json() {
        Ok(json) => {
            // A closed queue means the socket is already going away.
            let _ = tx.send(json);
        }
        Err(e) => tracing::warn!("failed to encode {}: {e}", message.kind()),
    }
}
