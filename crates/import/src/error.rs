use thiserror::Error;

use molten_catalog::CatalogError;
use molten_inventory::StoreError;

/// File-level import failure.
///
/// Any of these aborts the run before (or, for `Store`, while erasing)
/// inventory is mutated; no partial result is returned.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to parse import file: {0}")]
    Parse(String),

    #[error("unsupported import file version '{0}'")]
    UnsupportedVersion(String),

    #[error("ask-per-item mode requires a conflict delegate")]
    MissingDelegate,

    #[error("inventory store failed: {0}")]
    Store(#[from] StoreError),
}

/// Why a single line item was not applied. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemFailure {
    #[error("no catalog item for {manufacturer} {code}")]
    ItemNotFound { manufacturer: String, code: String },

    #[error("invalid quantity {0}")]
    InvalidQuantity(f64),

    #[error("invalid type '{0}'")]
    InvalidType(String),

    #[error("catalog lookup failed: {0}")]
    Catalog(String),

    #[error("inventory store failed: {0}")]
    Store(String),
}

impl From<CatalogError> for ItemFailure {
    fn from(err: CatalogError) -> Self {
        ItemFailure::Catalog(err.to_string())
    }
}

impl From<StoreError> for ItemFailure {
    fn from(err: StoreError) -> Self {
        ItemFailure::Store(err.to_string())
    }
}

/// Export failure.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("inventory store failed: {0}")]
    Store(#[from] StoreError),

    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("failed to serialize export: {0}")]
    Serialize(String),
}
