//! Real-time price broadcast.

pub mod coordinator;
pub mod event;
pub mod registry;

pub use coordinator::{validate_price, PriceUpdateCoordinator};
pub use event::PriceEvent;
pub use registry::{BroadcastReport, Connection, ConnectionId, ConnectionRegistry};
