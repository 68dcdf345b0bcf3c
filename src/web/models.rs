use serde::{Deserialize, Serialize};

use crate::items::ItemFilter;

/// API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub connections: usize,
}

/// Query parameters for the item list.
///
/// Kept as raw strings so a malformed value drops that filter instead of
/// rejecting the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct ItemListQuery {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub available: Option<String>,
}

impl ItemListQuery {
    pub fn to_filter(&self) -> ItemFilter {
        ItemFilter::from_raw(
            self.category.as_deref(),
            self.min_price.as_deref(),
            self.max_price.as_deref(),
            self.available.as_deref(),
        )
    }
}

/// Create item request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_available() -> bool {
    true
}

/// Price update request
#[derive(Debug, Deserialize)]
pub struct UpdatePriceRequest {
    pub price: f64,
}
