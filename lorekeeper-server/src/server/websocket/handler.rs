use std::path::PathBuf;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::types::{ClientMessage, ServerMessage};
use crate::server::app::AppState;
use lorekeeper::transfer::{ProgressReporter, TransferEvent, TransferOperation};

pub async fn transfer_websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> Response {
    info!("Transfer progress channel requested");
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Every outbound message for this connection goes through this channel
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if let Err(e) = sender.send(Message::Text(json)).await {
                        error!("Failed to send WebSocket message: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }

            if msg.close_after {
                info!("Closing transfer channel after {} finished", msg.event);
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => start_transfer(client_msg, &app_state, &tx),
                Err(e) => warn!("Failed to parse client message: {}", e),
            },
            Ok(Message::Close(_)) => {
                info!("Transfer channel closed by client");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
        }
    }

    // Runs already started keep going; their events are dropped
    sender_task.abort();
}

fn start_transfer(
    message: ClientMessage,
    app_state: &AppState,
    tx: &mpsc::UnboundedSender<ServerMessage>,
) {
    let operation = match message.operation() {
        Ok(operation) => operation,
        Err(e) => {
            warn!("{}", e);
            return;
        }
    };

    let guard = match app_state.coordinator.try_acquire(operation) {
        Ok(guard) => guard,
        Err(e) => {
            warn!("Rejected {} request: {}", operation, e);
            let _ = tx.send(ServerMessage::error(operation, e.to_string()));
            return;
        }
    };

    let dir = message
        .directory()
        .map(PathBuf::from)
        .unwrap_or_else(|| app_state.default_dir.clone());
    let service = app_state.transfer.clone();
    let tx = tx.clone();

    // Detached so that a disconnect never interrupts the run
    tokio::spawn(async move {
        let _guard = guard;
        let (reporter, events) = ProgressReporter::channel(operation);
        let forwarder = tokio::spawn(forward_events(events, tx.clone()));

        let result = match operation {
            TransferOperation::Export => service.export(&dir, reporter).await,
            TransferOperation::Import => service.import(&dir, reporter).await,
        };

        // Reporter is gone, so the forwarder drains and exits
        if let Err(e) = forwarder.await {
            error!("Progress forwarder failed: {}", e);
        }
        if let Err(e) = result {
            let _ = tx.send(ServerMessage::error(operation, e.to_string()));
        }
    });
}

async fn forward_events(
    mut events: mpsc::UnboundedReceiver<TransferEvent>,
    tx: mpsc::UnboundedSender<ServerMessage>,
) {
    while let Some(event) = events.recv().await {
        // Listener gone: keep draining so the run never blocks
        let _ = tx.send(ServerMessage::from_event(&event));
    }
}
