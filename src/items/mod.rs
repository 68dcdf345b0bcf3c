pub mod models;
pub mod seed;
pub mod store;

pub use models::{Item, ItemFilter};
pub use store::{InMemoryItemStore, ItemStore};
