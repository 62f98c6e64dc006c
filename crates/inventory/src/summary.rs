use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::InventoryRecord;

/// Quantity totals for one catalog item, as shown on its detail screen.
///
/// Purely additive: subtype and dimensions are ignored, and records without a
/// location only count towards `by_type` and `total`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventorySummary {
    pub by_type: BTreeMap<String, f64>,
    pub by_location: BTreeMap<String, f64>,
    pub total: f64,
}

impl InventorySummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a InventoryRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            *summary
                .by_type
                .entry(record.glass_type().to_string())
                .or_insert(0.0) += record.quantity();

            if let Some(location) = record.location() {
                *summary.by_location.entry(location.to_string()).or_insert(0.0) +=
                    record.quantity();
            }

            summary.total += record.quantity();
        }
        summary
    }

    pub fn quantity_of_type(&self, glass_type: &str) -> f64 {
        self.by_type
            .get(&crate::record::normalize_type(glass_type))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
