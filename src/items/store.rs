use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Item, ItemFilter};
use crate::error::{PriceFeedError, Result};

/// Storage contract for catalog items.
///
/// The price coordinator only depends on [`ItemStore::update_price`]; the rest
/// backs the HTTP catalog endpoints.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list(&self, filter: &ItemFilter) -> Vec<Item>;

    async fn get(&self, id: &str) -> Result<Item>;

    async fn create(&self, item: Item) -> Result<Item>;

    /// Set the price of an existing item and return the updated record.
    ///
    /// Fails with [`PriceFeedError::ItemNotFound`] for unknown ids.
    async fn update_price(&self, id: &str, new_price: f64) -> Result<Item>;
}

/// Item store backed by a vector behind a read-write lock.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: RwLock<Vec<Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list(&self, filter: &ItemFilter) -> Vec<Item> {
        self.items
            .read()
            .await
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect()
    }

    async fn get(&self, id: &str) -> Result<Item> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| PriceFeedError::ItemNotFound(id.to_string()))
    }

    async fn create(&self, mut item: Item) -> Result<Item> {
        if item.id.trim().is_empty() {
            item.id = uuid::Uuid::new_v4().to_string();
        }

        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(PriceFeedError::InvalidInput(format!(
                "Item id already exists: {}",
                item.id
            )));
        }

        items.push(item.clone());
        tracing::info!(item_id = %item.id, name = %item.name, "Item created");
        Ok(item)
    }

    async fn update_price(&self, id: &str, new_price: f64) -> Result<Item> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| PriceFeedError::ItemNotFound(id.to_string()))?;

        item.price = new_price;
        Ok(item.clone())
    }
}
