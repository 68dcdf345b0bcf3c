//! Common utilities for integration tests
//!
//! Shared server setup, a recording connection and binary helpers.

#![allow(dead_code)] // Not every test file uses every helper

use assert_cmd::Command;
use price_feed::config::ServerConfig;
use price_feed::error::SendError;
use price_feed::items::{seed, InMemoryItemStore};
use price_feed::prices::{Connection, ConnectionId};
use price_feed::web::{create_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Get the path to the `price-feed` binary
pub fn price_feed_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_price-feed"))
}

/// Create a Command for `price-feed` isolated from PRICE_FEED_* variables
pub fn price_feed_command() -> Command {
    let mut cmd = Command::new(price_feed_binary());
    for (key, _) in std::env::vars() {
        if key.starts_with("PRICE_FEED_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

/// App state over the sample catalog
pub fn test_state(config: &ServerConfig) -> AppState {
    let store = Arc::new(InMemoryItemStore::with_items(seed::sample_catalog()));
    AppState::new(store, config)
}

/// Serve the router on an ephemeral port and return its address and state
pub async fn spawn_server(config: ServerConfig) -> (SocketAddr, AppState) {
    let state = test_state(&config);
    let app = create_router(state.clone(), &config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Poll until the registry holds `expected` connections
pub async fn wait_for_connections(state: &AppState, expected: usize) {
    for _ in 0..100 {
        if state.registry.len().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "expected {} connections, registry has {}",
        expected,
        state.registry.len().await
    );
}

/// Connection that records payloads in memory
pub struct CollectingConnection {
    id: ConnectionId,
    fail: bool,
    received: Mutex<Vec<String>>,
}

impl CollectingConnection {
    pub fn new(id: ConnectionId) -> Arc<Self> {
        Arc::new(Self {
            id,
            fail: false,
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn broken(id: ConnectionId) -> Arc<Self> {
        Arc::new(Self {
            id,
            fail: true,
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

impl Connection for CollectingConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_open(&self) -> bool {
        true
    }

    fn send(&self, payload: &str) -> Result<(), SendError> {
        if self.fail {
            return Err(SendError::Closed(self.id));
        }
        self.received.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}
