//! Glass catalog module.
//!
//! Canonical glass products (rods, sheets, frit, ...) keyed by natural key,
//! plus the lookup service the importer resolves line items against.

pub mod document;
pub mod glass_item;
pub mod service;

pub use document::{CatalogDocument, parse_catalog};
pub use glass_item::{Coe, GlassItem, NewGlassItem};
pub use service::{CatalogError, CatalogService, InMemoryCatalog};
