use std::sync::Arc;

use super::event::PriceEvent;
use super::registry::{BroadcastReport, ConnectionRegistry};
use crate::error::{PriceFeedError, Result};
use crate::items::{Item, ItemStore};
use crate::log_price_operation;

/// Reject prices that are not strictly positive finite numbers.
pub fn validate_price(new_price: f64) -> Result<()> {
    if !new_price.is_finite() || new_price <= 0.0 {
        return Err(PriceFeedError::InvalidPrice(format!(
            "price must be greater than 0, got {}",
            new_price
        )));
    }
    Ok(())
}

/// Applies price changes to the item store and announces them to every
/// connected client.
#[derive(Clone)]
pub struct PriceUpdateCoordinator {
    store: Arc<dyn ItemStore>,
    registry: Arc<ConnectionRegistry>,
}

impl PriceUpdateCoordinator {
    pub fn new(store: Arc<dyn ItemStore>, registry: Arc<ConnectionRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Validate, store and broadcast a new price.
    ///
    /// The store update commits before the broadcast starts. Delivery failures
    /// never turn a successful update into an error.
    pub async fn update_price(&self, item_id: &str, new_price: f64) -> Result<Item> {
        validate_price(new_price)?;

        let item = self.store.update_price(item_id, new_price).await?;
        log_price_operation!("update_price", item.id, new_price);

        let event = PriceEvent::new(item.id.clone(), new_price);
        self.registry.broadcast(&event.to_wire()).await;

        Ok(item)
    }

    /// Relay a message received from a client to every connection, sender
    /// included.
    ///
    /// The payload is forwarded verbatim. It is neither checked against the
    /// store nor applied to it.
    pub async fn on_peer_message(&self, raw: &str) -> BroadcastReport {
        if raw.parse::<PriceEvent>().is_err() {
            tracing::warn!(payload = raw, "Relaying peer message that is not a price event");
        } else {
            tracing::debug!(payload = raw, "Relaying peer message");
        }
        self.registry.broadcast(raw).await
    }
}
