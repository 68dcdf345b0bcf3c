// WebSocket transport for price updates
// Each socket is registered with the ConnectionRegistry for its whole lifetime

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{error::TrySendError, Sender};
use tokio::sync::Notify;

use super::server::AppState;
use crate::error::SendError;
use crate::prices::{Connection, ConnectionId};

/// One client socket as seen by the registry.
///
/// Sends only enqueue; the socket's writer task drains the queue in order.
/// A client that lets its bounded queue fill up is closed.
#[derive(Debug)]
pub struct WsConnection {
    id: ConnectionId,
    tx: Sender<Message>,
    open: AtomicBool,
    closed: Notify,
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

impl WsConnection {
    pub fn new(id: ConnectionId, tx: Sender<Message>) -> Self {
        Self {
            id,
            tx,
            open: AtomicBool::new(true),
            closed: Notify::new(),
            connected_at: chrono::Utc::now(),
        }
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
        // Stores a permit if the writer is busy mid-send
        self.closed.notify_one();
    }

    /// Resolves once `close` has been called.
    pub async fn closed(&self) {
        self.closed.notified().await;
    }
}

impl Connection for WsConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    fn send(&self, payload: &str) -> Result<(), SendError> {
        if !self.open.load(Ordering::Acquire) {
            return Err(SendError::Closed(self.id));
        }
        match self.tx.try_send(Message::Text(payload.to_string())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    connection_id = self.id,
                    capacity = self.tx.max_capacity(),
                    "Send queue full, closing slow client"
                );
                self.close();
                Err(SendError::Backlogged(self.id))
            },
            Err(TrySendError::Closed(_)) => Err(SendError::Closed(self.id)),
        }
    }
}

/// Handle price WebSocket connections
pub async fn handle_price_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_price_socket(socket, state))
}

async fn handle_price_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::channel(state.send_queue_capacity);

    let registry = state.registry.clone();
    let conn = Arc::new(WsConnection::new(registry.next_connection_id(), tx.clone()));
    let conn_id = conn.id();
    let write_timeout = state.write_timeout;

    // Spawn task to forward queued messages to the socket
    let writer_conn = conn.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                biased;
                _ = writer_conn.closed() => break,
                msg = rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };
            match tokio::time::timeout(write_timeout, sender.send(msg)).await {
                Ok(Ok(())) => {},
                Ok(Err(e)) => {
                    tracing::debug!(connection_id = conn_id, "Socket write failed: {}", e);
                    break;
                },
                Err(_) => {
                    tracing::warn!(
                        connection_id = conn_id,
                        "Socket write timed out after {:?}, dropping client",
                        write_timeout
                    );
                    break;
                },
            }
        }
    });

    registry.register(&conn).await;
    tracing::info!(connection_id = conn_id, "Price client connected");

    // Spawn heartbeat task
    let heartbeat_tx = tx;
    let heartbeat_interval = state.heartbeat_interval;
    let mut heartbeat_task = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + heartbeat_interval;
        let mut interval = tokio::time::interval_at(start, heartbeat_interval);
        loop {
            interval.tick().await;
            match heartbeat_tx.try_send(Message::Ping(Vec::new())) {
                Ok(()) => tracing::trace!(connection_id = conn_id, "Sent heartbeat ping"),
                // Queue still draining; the next tick tries again
                Err(TrySendError::Full(_)) => {},
                Err(TrySendError::Closed(_)) => break,
            }
        }
    });

    // Every text frame is relayed to all clients as a price message
    let coordinator = state.coordinator.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    tracing::debug!(connection_id = conn_id, "Received bid: {}", text);
                    coordinator.on_peer_message(&text).await;
                },
                Message::Pong(_) => {
                    tracing::trace!(connection_id = conn_id, "Received pong");
                },
                Message::Close(_) => {
                    break;
                },
                _ => {},
            }
        }
    });

    // Wait for any task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            heartbeat_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
            heartbeat_task.abort();
        }
        _ = (&mut heartbeat_task) => {
            send_task.abort();
            recv_task.abort();
        }
    }

    conn.close();
    registry.unregister(conn_id).await;
    tracing::info!(
        connection_id = conn_id,
        connected_secs = (chrono::Utc::now() - conn.connected_at).num_seconds(),
        "Price client disconnected"
    );
}
