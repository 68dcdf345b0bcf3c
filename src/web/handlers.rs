use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use super::models::*;
use super::server::AppState;
use crate::error::PriceFeedError;
use crate::items::Item;
use crate::log_error;

fn status_for(error: &PriceFeedError) -> StatusCode {
    match error {
        PriceFeedError::ItemNotFound(_) => StatusCode::NOT_FOUND,
        PriceFeedError::InvalidPrice(_) | PriceFeedError::InvalidInput(_) => {
            StatusCode::BAD_REQUEST
        },
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: PriceFeedError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        log_error!(error, "http request");
    }

    (
        status,
        Json(ApiError {
            code: error.to_error_code().to_string(),
            message: error.to_string(),
        }),
    )
        .into_response()
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "price-feed".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connections: state.registry.len().await,
    })
}

/// List items, optionally filtered
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> impl IntoResponse {
    let items = state.store.list(&query.to_filter()).await;
    (StatusCode::OK, Json(ApiResponse { data: items }))
}

/// Get a single item by id
pub async fn get_item(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id).await {
        Ok(item) => (StatusCode::OK, Json(ApiResponse { data: item })).into_response(),
        Err(e) => error_response(e),
    }
}

/// Create a new item
pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Response {
    if req.name.trim().is_empty() {
        return error_response(PriceFeedError::InvalidInput("name is required".into()));
    }
    if req.category.trim().is_empty() {
        return error_response(PriceFeedError::InvalidInput("category is required".into()));
    }
    if !req.price.is_finite() || req.price < 0.0 {
        return error_response(PriceFeedError::InvalidPrice(format!(
            "price must not be negative, got {}",
            req.price
        )));
    }

    let item = Item {
        id: req.id.unwrap_or_default(),
        name: req.name.trim().to_string(),
        category: req.category.trim().to_string(),
        price: req.price,
        available: req.available,
        image_url: req.image_url,
    };

    match state.store.create(item).await {
        Ok(item) => (StatusCode::CREATED, Json(ApiResponse { data: item })).into_response(),
        Err(e) => error_response(e),
    }
}

/// Change an item's price and push it to every connected client
pub async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePriceRequest>,
) -> Response {
    match state.coordinator.update_price(&id, req.price).await {
        Ok(item) => (StatusCode::OK, Json(ApiResponse { data: item })).into_response(),
        Err(e) => {
            tracing::debug!(item_id = %id, "Price update rejected: {}", e);
            error_response(e)
        },
    }
}

/// 404 Not Found handler
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "code": "NOT_FOUND"
        })),
    )
}
