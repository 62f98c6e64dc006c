use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use molten_core::{DomainError, NaturalKey, RecordId};

use crate::record::InventoryRecord;

/// Inventory store operation error.
///
/// Storage failures as opposed to domain failures; domain errors raised while
/// loading records are carried through unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("inventory record not found: {0}")]
    NotFound(RecordId),

    #[error("inventory record already exists: {0}")]
    AlreadyExists(RecordId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Inventory store abstraction.
///
/// The importer is a pure consumer of this trait. Uniqueness of
/// (item, type, subtype, location) is not enforced here.
pub trait InventoryStore: Send + Sync {
    fn create(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError>;

    /// Replace a stored record with the same id.
    fn update(&self, record: &InventoryRecord) -> Result<(), StoreError>;

    fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError>;

    fn delete(&self, id: RecordId) -> Result<(), StoreError>;

    /// Delete every record of one catalog item; returns how many were removed.
    fn delete_by_item(&self, item_key: &NaturalKey) -> Result<usize, StoreError>;

    /// Delete every record; returns how many were removed.
    fn delete_all(&self) -> Result<usize, StoreError>;

    /// Records of one catalog item, oldest first.
    fn fetch_by_item(&self, item_key: &NaturalKey) -> Result<Vec<InventoryRecord>, StoreError>;

    /// Records of one catalog item and type, oldest first.
    fn fetch_by_item_and_type(
        &self,
        item_key: &NaturalKey,
        glass_type: &str,
    ) -> Result<Vec<InventoryRecord>, StoreError>;

    /// All records, oldest first.
    fn list(&self) -> Result<Vec<InventoryRecord>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn create(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError> {
        (**self).create(record)
    }

    fn update(&self, record: &InventoryRecord) -> Result<(), StoreError> {
        (**self).update(record)
    }

    fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        (**self).get(id)
    }

    fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn delete_by_item(&self, item_key: &NaturalKey) -> Result<usize, StoreError> {
        (**self).delete_by_item(item_key)
    }

    fn delete_all(&self) -> Result<usize, StoreError> {
        (**self).delete_all()
    }

    fn fetch_by_item(&self, item_key: &NaturalKey) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).fetch_by_item(item_key)
    }

    fn fetch_by_item_and_type(
        &self,
        item_key: &NaturalKey,
        glass_type: &str,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).fetch_by_item_and_type(item_key, glass_type)
    }

    fn list(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        (**self).list()
    }

    fn count(&self) -> Result<usize, StoreError> {
        (**self).count()
    }
}

/// In-memory inventory store for tests, the CLI and dev.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    records: RwLock<HashMap<RecordId, InventoryRecord>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Build a store from previously saved records, validating each one.
    pub fn from_records(
        records: impl IntoIterator<Item = InventoryRecord>,
    ) -> Result<Self, StoreError> {
        let store = Self::new();
        for record in records {
            record.validate()?;
            store.create(record)?;
        }
        Ok(store)
    }

    fn poisoned() -> StoreError {
        StoreError::Storage("lock poisoned".to_string())
    }

    fn collect_sorted<'a>(
        records: impl Iterator<Item = &'a InventoryRecord>,
    ) -> Vec<InventoryRecord> {
        let mut out: Vec<InventoryRecord> = records.cloned().collect();
        // Deterministic order: creation time, then id.
        out.sort_by_key(|r| (r.created_at(), r.id_typed()));
        out
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn create(&self, record: InventoryRecord) -> Result<InventoryRecord, StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        let id = record.id_typed();
        if records.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        records.insert(id, record.clone());
        Ok(record)
    }

    fn update(&self, record: &InventoryRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        match records.get_mut(&record.id_typed()) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(record.id_typed())),
        }
    }

    fn get(&self, id: RecordId) -> Result<Option<InventoryRecord>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.get(&id).cloned())
    }

    fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        records.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }

    fn delete_by_item(&self, item_key: &NaturalKey) -> Result<usize, StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        let before = records.len();
        records.retain(|_, r| r.item_key() != item_key);
        Ok(before - records.len())
    }

    fn delete_all(&self) -> Result<usize, StoreError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        let removed = records.len();
        records.clear();
        Ok(removed)
    }

    fn fetch_by_item(&self, item_key: &NaturalKey) -> Result<Vec<InventoryRecord>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(Self::collect_sorted(
            records.values().filter(|r| r.item_key() == item_key),
        ))
    }

    fn fetch_by_item_and_type(
        &self,
        item_key: &NaturalKey,
        glass_type: &str,
    ) -> Result<Vec<InventoryRecord>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(Self::collect_sorted(records.values().filter(|r| {
            r.item_key() == item_key && r.is_type(glass_type)
        })))
    }

    fn list(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(Self::collect_sorted(records.values()))
    }

    fn count(&self) -> Result<usize, StoreError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.len())
    }
}
