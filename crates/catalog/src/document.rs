//! The published catalog file: `{version, generated, item_count, glassitems}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::glass_item::NewGlassItem;
use crate::service::CatalogError;

/// A catalog file as exported by the catalog tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub version: String,
    /// Export time as written by the tool (not always zoned).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
    pub glassitems: Vec<NewGlassItem>,
}

/// Parse a catalog file. A bare array of items is accepted as an
/// unversioned document.
pub fn parse_catalog(json: &str) -> Result<CatalogDocument, CatalogError> {
    let parse_err = |e: serde_json::Error| CatalogError::Parse(e.to_string());
    let value: Value = serde_json::from_str(json).map_err(parse_err)?;

    let document = match value {
        Value::Array(_) => CatalogDocument {
            version: String::new(),
            generated: None,
            item_count: None,
            glassitems: serde_json::from_value(value).map_err(parse_err)?,
        },
        Value::Object(_) => serde_json::from_value(value).map_err(parse_err)?,
        _ => {
            return Err(CatalogError::Parse(
                "expected a catalog object or an array of items".to_string(),
            ));
        }
    };

    if let Some(count) = document.item_count {
        if count != document.glassitems.len() {
            tracing::warn!(
                declared = count,
                actual = document.glassitems.len(),
                "catalog item_count does not match its items"
            );
        }
    }

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exported_document() {
        let json = r#"{
            "version": "1.0",
            "generated": "2025-11-02T09:14:55.120331",
            "item_count": 1,
            "glassitems": [
                {
                    "manufacturer": "CIM",
                    "code": "511101",
                    "name": "Peacock",
                    "coe": "104",
                    "stable_id": "2eAu2M",
                    "status": "available",
                    "tags": ["blue"]
                }
            ]
        }"#;

        let doc = parse_catalog(json).unwrap();
        assert_eq!(doc.version, "1.0");
        assert_eq!(doc.item_count, Some(1));
        assert_eq!(doc.glassitems[0].stable_id.as_deref(), Some("2eAu2M"));
    }

    #[test]
    fn bare_array_is_unversioned() {
        let doc = parse_catalog(r#"[{"manufacturer": "EF", "code": "204", "name": "Pale Emerald", "coe": "104"}]"#)
            .unwrap();
        assert!(doc.version.is_empty());
        assert_eq!(doc.glassitems.len(), 1);
    }

    #[test]
    fn rejects_scalars_and_missing_items() {
        assert!(matches!(parse_catalog("42"), Err(CatalogError::Parse(_))));
        assert!(matches!(
            parse_catalog(r#"{"version": "1.0"}"#),
            Err(CatalogError::Parse(_))
        ));
    }
}
