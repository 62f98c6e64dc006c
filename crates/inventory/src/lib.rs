//! Inventory module.
//!
//! Quantity records per catalog item, the store abstraction the importer
//! writes through, and read-only aggregation for detail views.

pub mod record;
pub mod store;
pub mod summary;

pub use record::{Dimensions, InventoryRecord, NewInventoryRecord, normalize_type};
pub use store::{InMemoryInventoryStore, InventoryStore, StoreError};
pub use summary::InventorySummary;
