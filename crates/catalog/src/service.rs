use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use molten_core::{DomainError, NaturalKey};

use crate::document::parse_catalog;
use crate::glass_item::{GlassItem, NewGlassItem};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog already contains {0}")]
    DuplicateKey(NaturalKey),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("failed to parse catalog: {0}")]
    Parse(String),

    #[error("catalog storage error: {0}")]
    Storage(String),
}

/// Read/write access to the glass catalog.
///
/// The importer only reads; `create_item` exists for seeding and tests.
pub trait CatalogService: Send + Sync {
    fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<GlassItem>, CatalogError>;

    /// Case-insensitive manufacturer + code lookup, any sequence.
    ///
    /// When several variants share a code the lowest sequence wins.
    fn find_by_manufacturer_code(
        &self,
        manufacturer: &str,
        code: &str,
    ) -> Result<Option<GlassItem>, CatalogError>;

    fn create_item(&self, draft: NewGlassItem) -> Result<GlassItem, CatalogError>;

    /// All items, ordered by natural key.
    fn list(&self) -> Result<Vec<GlassItem>, CatalogError>;
}

impl<S> CatalogService for Arc<S>
where
    S: CatalogService + ?Sized,
{
    fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<GlassItem>, CatalogError> {
        (**self).find_by_natural_key(key)
    }

    fn find_by_manufacturer_code(
        &self,
        manufacturer: &str,
        code: &str,
    ) -> Result<Option<GlassItem>, CatalogError> {
        (**self).find_by_manufacturer_code(manufacturer, code)
    }

    fn create_item(&self, draft: NewGlassItem) -> Result<GlassItem, CatalogError> {
        (**self).create_item(draft)
    }

    fn list(&self) -> Result<Vec<GlassItem>, CatalogError> {
        (**self).list()
    }
}

/// In-memory catalog for tests, the CLI and dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: RwLock<BTreeMap<NaturalKey, GlassItem>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog file (see [`parse_catalog`]).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document = parse_catalog(json)?;
        let catalog = Self::from_items(document.glassitems)?;
        tracing::debug!(version = %document.version, items = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Build a catalog from drafts.
    ///
    /// Persisted stable ids are claimed first; missing ones are then generated
    /// in `manufacturer:code` order so the result does not depend on file
    /// order.
    pub fn from_items(drafts: Vec<NewGlassItem>) -> Result<Self, CatalogError> {
        let (persisted, mut fresh): (Vec<_>, Vec<_>) = drafts
            .into_iter()
            .partition(|d| d.persisted_stable_id().is_some());
        fresh.sort_by(|a, b| {
            (a.manufacturer.as_str(), a.code.as_str()).cmp(&(b.manufacturer.as_str(), b.code.as_str()))
        });
        if !fresh.is_empty() {
            tracing::info!(count = fresh.len(), "assigning stable ids");
        }

        let catalog = Self::new();
        for draft in persisted.into_iter().chain(fresh) {
            catalog.create_item(draft)?;
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> CatalogError {
        CatalogError::Storage("lock poisoned".to_string())
    }
}

impl CatalogService for InMemoryCatalog {
    fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Option<GlassItem>, CatalogError> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(items.get(key).cloned())
    }

    fn find_by_manufacturer_code(
        &self,
        manufacturer: &str,
        code: &str,
    ) -> Result<Option<GlassItem>, CatalogError> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(items
            .values()
            .filter(|item| item.matches(manufacturer, code))
            .min_by_key(|item| item.natural_key().sequence())
            .cloned())
    }

    fn create_item(&self, draft: NewGlassItem) -> Result<GlassItem, CatalogError> {
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;

        let key = NaturalKey::new(&draft.manufacturer, &draft.code, draft.sequence)?;
        if items.contains_key(&key) {
            return Err(CatalogError::DuplicateKey(key));
        }

        let taken: HashSet<String> = items.values().map(|i| i.stable_id().to_string()).collect();
        let item = GlassItem::create(draft, &taken)?;
        items.insert(item.natural_key().clone(), item.clone());
        Ok(item)
    }

    fn list(&self) -> Result<Vec<GlassItem>, CatalogError> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(items.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glass_item::Coe;

    fn draft(manufacturer: &str, code: &str, sequence: u32) -> NewGlassItem {
        NewGlassItem {
            manufacturer: manufacturer.to_string(),
            code: code.to_string(),
            sequence,
            name: format!("{manufacturer} {code}"),
            coe: Coe::Coe104,
            manufacturer_url: None,
            tags: vec![],
            stable_id: None,
        }
    }

    #[test]
    fn created_item_is_found_by_key() {
        let catalog = InMemoryCatalog::new();
        let item = catalog.create_item(draft("CIM", "511101", 0)).unwrap();

        let key = NaturalKey::new("cim", "511101", 0).unwrap();
        assert_eq!(catalog.find_by_natural_key(&key).unwrap(), Some(item));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let catalog = InMemoryCatalog::new();
        catalog.create_item(draft("CIM", "511101", 0)).unwrap();
        let err = catalog.create_item(draft("cim", "511101", 0)).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateKey(_)));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn manufacturer_code_lookup_prefers_lowest_sequence() {
        let catalog = InMemoryCatalog::new();
        catalog.create_item(draft("BB", "001", 2)).unwrap();
        catalog.create_item(draft("BB", "001", 1)).unwrap();

        let found = catalog.find_by_manufacturer_code("bb", "001").unwrap().unwrap();
        assert_eq!(found.natural_key().sequence(), 1);
        assert!(catalog.find_by_manufacturer_code("bb", "002").unwrap().is_none());
    }

    #[test]
    fn stable_ids_are_unique_within_catalog() {
        let catalog = InMemoryCatalog::new();
        for seq in 0..5 {
            catalog.create_item(draft("BB", "001", seq)).unwrap();
        }
        let ids: HashSet<String> = catalog
            .list()
            .unwrap()
            .iter()
            .map(|i| i.stable_id().to_string())
            .collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn from_json_loads_drafts() {
        let json = r#"[
            {"manufacturer": "EF", "code": "204", "name": "Pale Emerald", "coe": "104"},
            {"manufacturer": "BB", "code": "001", "name": "Clear", "coe": "33", "tags": ["clear"]}
        ]"#;
        let catalog = InMemoryCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);

        let bb = catalog.find_by_manufacturer_code("BB", "001").unwrap().unwrap();
        assert_eq!(bb.coe(), Coe::Coe33);
    }

    #[test]
    fn from_json_rejects_garbage() {
        assert!(matches!(
            InMemoryCatalog::from_json("{nope"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn from_json_keeps_persisted_ids_and_fills_the_rest() {
        // "4UBG43" is what BB:001 would hash to; the persisted owner keeps it.
        let json = r#"{
            "version": "1.0",
            "generated": "2025-11-02T09:14:55",
            "item_count": 3,
            "glassitems": [
                {"manufacturer": "BB", "code": "001", "name": "Clear", "coe": "33"},
                {"manufacturer": "CIM", "code": "511101", "name": "Peacock", "coe": "104"},
                {"manufacturer": "EF", "code": "204", "name": "Pale Emerald", "coe": "104", "stable_id": "4UBG43"}
            ]
        }"#;
        let catalog = InMemoryCatalog::from_json(json).unwrap();

        let id_of = |m: &str, c: &str| {
            catalog
                .find_by_manufacturer_code(m, c)
                .unwrap()
                .unwrap()
                .stable_id()
                .to_string()
        };
        assert_eq!(id_of("EF", "204"), "4UBG43");
        assert_eq!(id_of("BB", "001"), "4UBG44");
        assert_eq!(id_of("CIM", "511101"), "2eAu2M");
    }

    #[test]
    fn from_json_rejects_duplicate_persisted_ids() {
        let json = r#"{"version": "1.0", "glassitems": [
            {"manufacturer": "BB", "code": "001", "name": "Clear", "coe": "33", "stable_id": "A3F9K2"},
            {"manufacturer": "BB", "code": "002", "name": "Black", "coe": "33", "stable_id": "A3F9K2"}
        ]}"#;
        assert!(matches!(
            InMemoryCatalog::from_json(json),
            Err(CatalogError::Domain(DomainError::Conflict(_)))
        ));
    }
}
