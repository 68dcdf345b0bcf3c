use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PriceFeedError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl PriceFeedError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            PriceFeedError::ItemNotFound(_) => "ITEM_NOT_FOUND",
            PriceFeedError::InvalidPrice(_) => "INVALID_PRICE",
            PriceFeedError::InvalidInput(_) => "INVALID_INPUT",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PriceFeedError>;

/// Failure of a single per-connection send.
///
/// Never escapes a broadcast; the registry logs it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("connection {0} is closed")]
    Closed(u64),

    #[error("connection {0} fell behind and was closed")]
    Backlogged(u64),
}
