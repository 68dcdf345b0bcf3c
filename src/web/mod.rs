pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;
pub mod websocket;

pub use server::{create_router, AppState, PriceServer};
