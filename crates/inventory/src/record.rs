use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use molten_core::{DomainError, DomainResult, Entity, NaturalKey, RecordId};

/// Named measurements of a record (e.g. `diameter_mm`, `length_cm`).
pub type Dimensions = BTreeMap<String, f64>;

/// Trim and lowercase a glass type (`" Rod "` → `"rod"`).
pub fn normalize_type(glass_type: &str) -> String {
    glass_type.trim().to_lowercase()
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn ensure_quantity(quantity: f64) -> DomainResult<()> {
    if !quantity.is_finite() {
        return Err(DomainError::validation(format!(
            "quantity must be finite (got {quantity})"
        )));
    }
    if quantity < 0.0 {
        return Err(DomainError::invariant(format!(
            "quantity cannot be negative (got {quantity})"
        )));
    }
    Ok(())
}

/// Input for a new inventory record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryRecord {
    pub item_key: NaturalKey,
    pub glass_type: String,
    pub subtype: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub quantity: f64,
    pub location: Option<String>,
}

impl NewInventoryRecord {
    pub fn new(item_key: NaturalKey, glass_type: impl Into<String>, quantity: f64) -> Self {
        Self {
            item_key,
            glass_type: glass_type.into(),
            subtype: None,
            dimensions: None,
            quantity,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

/// How much of one catalog item a user holds, of one type, optionally at one
/// location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    id: RecordId,
    item_key: NaturalKey,
    #[serde(rename = "type")]
    glass_type: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    dimensions: Option<Dimensions>,
    quantity: f64,
    #[serde(default)]
    location: Option<String>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn create(new: NewInventoryRecord, now: DateTime<Utc>) -> DomainResult<Self> {
        ensure_quantity(new.quantity)?;

        let glass_type = normalize_type(&new.glass_type);
        if glass_type.is_empty() {
            return Err(DomainError::validation("type cannot be empty"));
        }

        if let Some(dims) = &new.dimensions {
            if let Some((name, value)) = dims.iter().find(|(_, v)| !v.is_finite() || **v < 0.0) {
                return Err(DomainError::validation(format!(
                    "dimension '{name}' must be a non-negative number (got {value})"
                )));
            }
        }

        Ok(Self {
            id: RecordId::new(),
            item_key: new.item_key,
            glass_type,
            subtype: normalize_optional(new.subtype).map(|s| s.to_lowercase()),
            dimensions: new.dimensions.filter(|d| !d.is_empty()),
            quantity: new.quantity,
            location: normalize_optional(new.location),
            created_at: now,
            modified_at: now,
        })
    }

    /// Check invariants of a record that came from outside (e.g. a snapshot).
    pub fn validate(&self) -> DomainResult<()> {
        ensure_quantity(self.quantity)?;
        if self.glass_type.trim().is_empty() {
            return Err(DomainError::validation("type cannot be empty"));
        }
        Ok(())
    }

    pub fn id_typed(&self) -> RecordId {
        self.id
    }

    pub fn item_key(&self) -> &NaturalKey {
        &self.item_key
    }

    pub fn glass_type(&self) -> &str {
        &self.glass_type
    }

    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    pub fn dimensions(&self) -> Option<&Dimensions> {
        self.dimensions.as_ref()
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn is_type(&self, glass_type: &str) -> bool {
        self.glass_type == normalize_type(glass_type)
    }

    pub fn set_quantity(&mut self, quantity: f64, now: DateTime<Utc>) -> DomainResult<()> {
        ensure_quantity(quantity)?;
        self.quantity = quantity;
        self.modified_at = now;
        Ok(())
    }

    /// Add `delta` (which may be negative) to the quantity.
    pub fn add_quantity(&mut self, delta: f64, now: DateTime<Utc>) -> DomainResult<()> {
        self.set_quantity(self.quantity + delta, now)
    }
}

impl Entity for InventoryRecord {
    type Id = RecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> NaturalKey {
        NaturalKey::new("cim", "511101", 0).unwrap()
    }

    #[test]
    fn create_normalizes_type_and_location() {
        let new = NewInventoryRecord::new(key(), "  Rod ", 12.5).with_location("  Shelf A ");
        let record = InventoryRecord::create(new, Utc::now()).unwrap();
        assert_eq!(record.glass_type(), "rod");
        assert_eq!(record.location(), Some("Shelf A"));
        assert_eq!(record.created_at(), record.modified_at());
    }

    #[test]
    fn blank_location_becomes_none() {
        let new = NewInventoryRecord::new(key(), "rod", 1.0).with_location("   ");
        let record = InventoryRecord::create(new, Utc::now()).unwrap();
        assert_eq!(record.location(), None);
    }

    #[test]
    fn create_rejects_negative_quantity() {
        let err = InventoryRecord::create(NewInventoryRecord::new(key(), "rod", -1.0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn create_rejects_nan_quantity() {
        let err = InventoryRecord::create(NewInventoryRecord::new(key(), "rod", f64::NAN), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_blank_type() {
        let err = InventoryRecord::create(NewInventoryRecord::new(key(), " ", 1.0), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn create_rejects_negative_dimension() {
        let dims = Dimensions::from([("diameter_mm".to_string(), -5.0)]);
        let new = NewInventoryRecord::new(key(), "rod", 1.0).with_dimensions(dims);
        assert!(InventoryRecord::create(new, Utc::now()).is_err());
    }

    #[test]
    fn add_quantity_cannot_go_negative() {
        let mut record =
            InventoryRecord::create(NewInventoryRecord::new(key(), "rod", 2.0), Utc::now()).unwrap();
        let err = record.add_quantity(-3.0, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(record.quantity(), 2.0);
    }

    #[test]
    fn set_quantity_bumps_modified_at() {
        let created = Utc::now();
        let mut record =
            InventoryRecord::create(NewInventoryRecord::new(key(), "rod", 2.0), created).unwrap();
        let before = record.clone();
        let later = created + chrono::Duration::seconds(5);
        record.set_quantity(7.0, later).unwrap();
        assert!(record.same_entity(&before));
        assert_ne!(record, before);
        assert_eq!(record.quantity(), 7.0);
        assert_eq!(record.modified_at(), later);
        assert_eq!(record.created_at(), created);
    }

    #[test]
    fn record_round_trips_through_json() {
        let new = NewInventoryRecord::new(key(), "sheet", 3.0)
            .with_subtype("Fine")
            .with_dimensions(Dimensions::from([("width_cm".to_string(), 30.0)]));
        let record = InventoryRecord::create(new, Utc::now()).unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "sheet");
        assert_eq!(json["item_key"], "cim-511101-0");
        assert_eq!(json["subtype"], "fine");

        let back: InventoryRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
