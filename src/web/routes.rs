use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;
use super::server::AppState;
use super::websocket;

/// Create API router with all endpoints
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        // Catalog routes
        .route(
            "/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route("/items/:id", get(handlers::get_item))
        // Price updates fan out to every WebSocket client
        .route("/items/:id/price", put(handlers::update_price))
}

/// WebSocket routes
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/prices", get(websocket::handle_price_websocket))
}
