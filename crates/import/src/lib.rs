//! Inventory import/export.
//!
//! Parses inventory files, previews them, and reconciles their line items
//! against the catalog and the inventory store under one of four modes.

pub mod delegate;
pub mod error;
pub mod export;
pub mod format;
pub mod reconciler;
pub mod result;

pub use delegate::{AlwaysResolve, ConflictDelegate, ConflictResolution};
pub use error::{ExportError, ImportError, ItemFailure};
pub use export::{export_inventory, export_inventory_json};
pub use format::{FORMAT_VERSION, ImportFile, ImportItem, parse_import_file};
pub use reconciler::{ImportMode, InventoryImporter};
pub use result::{FailedItem, ImportPreview, ImportResult};
