//! JSON files backing the CLI: the catalog and the inventory snapshot.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;

use molten_catalog::InMemoryCatalog;
use molten_inventory::{InMemoryInventoryStore, InventoryRecord, InventoryStore};

pub fn load_catalog(path: &Path) -> anyhow::Result<InMemoryCatalog> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    InMemoryCatalog::from_json(&json)
        .with_context(|| format!("failed to load catalog {}", path.display()))
}

/// Load the inventory snapshot; a missing file is an empty inventory.
pub fn load_inventory(path: &Path) -> anyhow::Result<InMemoryInventoryStore> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no inventory snapshot yet; starting empty");
            return Ok(InMemoryInventoryStore::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read inventory {}", path.display()));
        }
    };

    let records: Vec<InventoryRecord> = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse inventory {}", path.display()))?;
    InMemoryInventoryStore::from_records(records)
        .with_context(|| format!("invalid inventory snapshot {}", path.display()))
}

pub fn save_inventory<S: InventoryStore>(store: &S, path: &Path) -> anyhow::Result<()> {
    let records = store.list()?;
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(path, json).with_context(|| format!("failed to write inventory {}", path.display()))?;
    tracing::info!(path = %path.display(), records = records.len(), "inventory saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use molten_catalog::CatalogService;
    use molten_core::NaturalKey;
    use molten_inventory::NewInventoryRecord;

    use super::*;

    #[test]
    fn missing_inventory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_inventory(&dir.path().join("inventory.json")).unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn inventory_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");

        let store = InMemoryInventoryStore::new();
        let key = NaturalKey::new("ef", "204", 0).unwrap();
        let record = InventoryRecord::create(
            NewInventoryRecord::new(key, "rod", 2.5).with_location("Drawer 1"),
            Utc::now(),
        )
        .unwrap();
        store.create(record.clone()).unwrap();
        save_inventory(&store, &path).unwrap();

        let loaded = load_inventory(&path).unwrap();
        assert_eq!(loaded.list().unwrap(), vec![record]);
    }

    #[test]
    fn corrupt_inventory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(&path, "[{").unwrap();
        assert!(load_inventory(&path).is_err());
    }

    #[test]
    fn catalog_loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[{"manufacturer": "EF", "code": "204", "name": "Pale Emerald", "coe": "104"}]"#,
        )
        .unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.list().unwrap().len(), 1);
    }
}
