use anyhow::{Context, Result};
use axum::{http::Method, routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::{handlers, routes, websocket};
use crate::config::ServerConfig;
use crate::items::{seed, InMemoryItemStore, ItemStore};
use crate::prices::{ConnectionRegistry, PriceUpdateCoordinator};

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub registry: Arc<ConnectionRegistry>,
    pub coordinator: PriceUpdateCoordinator,
    pub heartbeat_interval: Duration,
    pub write_timeout: Duration,
    pub send_queue_capacity: usize,
}

impl AppState {
    /// Wire the store, the connection registry and the coordinator together.
    pub fn new(store: Arc<dyn ItemStore>, config: &ServerConfig) -> Self {
        let registry = Arc::new(
            ConnectionRegistry::new().with_eviction_on_failure(config.evict_on_failure),
        );
        let coordinator = PriceUpdateCoordinator::new(store.clone(), registry.clone());

        Self {
            store,
            registry,
            coordinator,
            heartbeat_interval: config.heartbeat_interval,
            write_timeout: config.write_timeout,
            send_queue_capacity: config.send_queue_capacity,
        }
    }
}

/// HTTP + WebSocket server instance
pub struct PriceServer {
    config: ServerConfig,
}

impl PriceServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Build the initial state, loading the seed catalog.
    pub fn build_state(&self) -> AppState {
        let items = seed::load_catalog(self.config.items_file.as_deref());
        let store: Arc<dyn ItemStore> = Arc::new(InMemoryItemStore::with_items(items));
        AppState::new(store, &self.config)
    }

    /// Run until Ctrl-C
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await
    }

    /// Run until `shutdown` resolves, then release every connection.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = self.build_state();
        let registry = state.registry.clone();
        let app = create_router(state, &self.config);

        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!("Price feed listening on {}", addr);
        tracing::info!("WebSocket endpoint: ws://{}/ws/prices", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Server error")?;

        registry.shutdown().await;
        tracing::info!("Price feed stopped");
        Ok(())
    }
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .nest("/api", routes::api_routes())
        .nest("/ws", routes::ws_routes())
        // Path the bundled browser client connects to
        .route("/precios", get(websocket::handle_price_websocket));

    if let Some(static_dir) = &config.static_dir {
        router = router.nest_service("/static", ServeDir::new(static_dir));
    }

    router
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
