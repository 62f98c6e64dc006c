use chrono::{DateTime, Utc};

use molten_catalog::CatalogService;
use molten_inventory::InventoryStore;

use crate::error::ExportError;
use crate::format::{ImportFile, ImportItem};

/// Write the whole inventory as an import file, one line per record.
///
/// Records whose catalog item no longer exists are left out.
pub fn export_inventory<C, S>(
    catalog: &C,
    store: &S,
    generated: DateTime<Utc>,
) -> Result<ImportFile, ExportError>
where
    C: CatalogService,
    S: InventoryStore,
{
    let mut items = Vec::new();

    for record in store.list()? {
        let Some(glass) = catalog.find_by_natural_key(record.item_key())? else {
            tracing::warn!(
                record = %record.id_typed(),
                item = %record.item_key(),
                "skipping record without catalog item"
            );
            continue;
        };

        items.push(ImportItem {
            code: glass.code().to_string(),
            name: glass.name().to_string(),
            manufacturer: glass.manufacturer().to_string(),
            coe: glass.coe().to_string(),
            glass_type: record.glass_type().to_string(),
            quantity: record.quantity(),
            location: record.location().map(str::to_string),
            sequence: Some(glass.natural_key().sequence()),
            subtype: record.subtype().map(str::to_string),
            dimensions: record.dimensions().cloned(),
        });
    }

    tracing::info!(items = items.len(), "inventory exported");
    Ok(ImportFile::new(generated, items))
}

/// [`export_inventory`] rendered as pretty JSON.
pub fn export_inventory_json<C, S>(
    catalog: &C,
    store: &S,
    generated: DateTime<Utc>,
) -> Result<String, ExportError>
where
    C: CatalogService,
    S: InventoryStore,
{
    export_inventory(catalog, store, generated)?
        .to_json_pretty()
        .map_err(|e| ExportError::Serialize(e.to_string()))
}
