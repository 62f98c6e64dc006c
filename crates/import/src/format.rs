//! Inventory file format.
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "generated": "2025-01-15T10:30:00Z",
//!   "items": [
//!     { "code": "511101", "name": "Peacock", "manufacturer": "CIM",
//!       "coe": "104", "type": "rod", "quantity": 10, "location": "Shelf A" }
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use molten_inventory::Dimensions;

use crate::error::ImportError;

/// Version written by [`export_inventory`](crate::export_inventory).
pub const FORMAT_VERSION: &str = "1.0";

/// Major version this parser understands.
const SUPPORTED_MAJOR: &str = "1";

/// One line of an import file. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportItem {
    pub code: String,
    pub name: String,
    pub manufacturer: String,
    #[serde(deserialize_with = "string_or_number")]
    pub coe: String,
    #[serde(rename = "type")]
    pub glass_type: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Catalog variant; when absent the line resolves by manufacturer and
    /// code alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

/// A whole import file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFile {
    pub version: String,
    pub generated: DateTime<Utc>,
    pub items: Vec<ImportItem>,
}

impl ImportFile {
    pub fn new(generated: DateTime<Utc>, items: Vec<ImportItem>) -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            generated,
            items,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Parse and version-check an import file.
///
/// Preview and import both go through here, so they always agree on what a
/// file contains.
pub fn parse_import_file(json: &str) -> Result<ImportFile, ImportError> {
    let file: ImportFile =
        serde_json::from_str(json).map_err(|e| ImportError::Parse(e.to_string()))?;

    let major = file.version.trim().split('.').next().unwrap_or_default();
    if major != SUPPORTED_MAJOR {
        return Err(ImportError::UnsupportedVersion(file.version));
    }

    Ok(file)
}

/// Older exports wrote COE as a bare number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
