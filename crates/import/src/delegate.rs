use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use molten_inventory::InventoryRecord;

use crate::format::ImportItem;

/// What to do with an imported line that already has inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    /// Leave the existing record alone.
    Skip,
    /// Set the existing quantity to the imported quantity.
    Replace,
    /// Add the imported quantity to the existing quantity.
    Increase,
}

/// Decides conflicts one at a time in ask-per-item mode.
///
/// The importer awaits each call before looking at the next line, so an
/// implementation can show a single confirmation prompt at a time. `existing`
/// carries the combined quantity of any duplicate records it stands for.
#[async_trait]
pub trait ConflictDelegate: Send + Sync {
    async fn resolve(&self, item: &ImportItem, existing: &InventoryRecord) -> ConflictResolution;
}

/// Delegate that gives the same answer for every conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlwaysResolve(pub ConflictResolution);

#[async_trait]
impl ConflictDelegate for AlwaysResolve {
    async fn resolve(&self, _item: &ImportItem, _existing: &InventoryRecord) -> ConflictResolution {
        self.0
    }
}
