//! Import reconciliation.
//!
//! Each line item is resolved against the catalog, matched against existing
//! inventory of the same item and type, and applied according to the chosen
//! [`ImportMode`]. Lines are processed strictly in file order; a failing line
//! is recorded and the run moves on.

use core::fmt;
use core::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use molten_catalog::{CatalogService, GlassItem};
use molten_core::{DomainError, ImportRunId, NaturalKey};
use molten_inventory::{InventoryRecord, InventoryStore, NewInventoryRecord, normalize_type};

use crate::delegate::{ConflictDelegate, ConflictResolution};
use crate::error::{ImportError, ItemFailure};
use crate::format::{ImportFile, ImportItem, parse_import_file};
use crate::result::{FailedItem, ImportPreview, ImportResult};

/// How imported lines interact with existing inventory. There is no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    /// Delete all inventory first, then insert every line.
    EraseAndReplace,
    /// Insert lines without inventory; skip conflicts.
    AddNewOnly,
    /// Insert lines without inventory; add to existing quantity on conflict.
    AddAndIncrease,
    /// Insert lines without inventory; ask the delegate on conflict.
    AskPerItem,
}

impl ImportMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportMode::EraseAndReplace => "erase-and-replace",
            ImportMode::AddNewOnly => "add-new-only",
            ImportMode::AddAndIncrease => "add-and-increase",
            ImportMode::AskPerItem => "ask-per-item",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "erase-and-replace" => Ok(ImportMode::EraseAndReplace),
            "add-new-only" => Ok(ImportMode::AddNewOnly),
            "add-and-increase" => Ok(ImportMode::AddAndIncrease),
            "ask-per-item" => Ok(ImportMode::AskPerItem),
            _ => Err(DomainError::validation(
                "mode must be one of: erase-and-replace, add-new-only, add-and-increase, ask-per-item",
            )),
        }
    }
}

/// What happened to one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineOutcome {
    Inserted,
    Increased,
    Replaced,
    Skipped,
}

/// Conflict handling derived from the mode for one run.
#[derive(Clone, Copy)]
enum ConflictPolicy<'a> {
    /// Existing inventory was erased; every line is inserted.
    InsertAll,
    Fixed(ConflictResolution),
    Ask(&'a dyn ConflictDelegate),
}

impl<'a> ConflictPolicy<'a> {
    fn for_mode(
        mode: ImportMode,
        delegate: Option<&'a dyn ConflictDelegate>,
    ) -> Result<Self, ImportError> {
        Ok(match mode {
            ImportMode::EraseAndReplace => ConflictPolicy::InsertAll,
            ImportMode::AddNewOnly => ConflictPolicy::Fixed(ConflictResolution::Skip),
            ImportMode::AddAndIncrease => ConflictPolicy::Fixed(ConflictResolution::Increase),
            ImportMode::AskPerItem => {
                ConflictPolicy::Ask(delegate.ok_or(ImportError::MissingDelegate)?)
            }
        })
    }
}

/// Existing inventory that an imported line collides with.
struct Conflict {
    /// Record the line is applied to.
    primary: InventoryRecord,
    /// Other records with the same subtype and location as `primary`.
    duplicates: Vec<InventoryRecord>,
}

impl Conflict {
    fn combined_quantity(&self) -> f64 {
        self.primary.quantity() + self.duplicates.iter().map(|r| r.quantity()).sum::<f64>()
    }

    /// The primary record carrying the combined quantity of its duplicates.
    fn merged_view(&self) -> Result<InventoryRecord, DomainError> {
        let mut view = self.primary.clone();
        let modified = view.modified_at();
        view.set_quantity(self.combined_quantity(), modified)?;
        Ok(view)
    }
}

/// Applies import files to an inventory store.
///
/// Holds exclusive logical ownership of the store for the duration of a run;
/// concurrent runs against the same store are not coordinated.
#[derive(Debug)]
pub struct InventoryImporter<C, S> {
    catalog: C,
    store: S,
}

impl<C, S> InventoryImporter<C, S>
where
    C: CatalogService,
    S: InventoryStore,
{
    pub fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Summarize a file without touching the store.
    pub fn preview(&self, json: &str) -> Result<ImportPreview, ImportError> {
        let file = parse_import_file(json)?;
        Ok(ImportPreview::from_file(&file))
    }

    /// Parse `json` and import it. Nothing is mutated if parsing fails.
    pub async fn import(
        &self,
        json: &str,
        mode: ImportMode,
        delegate: Option<&dyn ConflictDelegate>,
    ) -> Result<ImportResult, ImportError> {
        let file = parse_import_file(json)?;
        self.import_file(&file, mode, delegate).await
    }

    /// Import an already parsed file.
    ///
    /// `delegate` is only consulted in [`ImportMode::AskPerItem`], where it is
    /// required.
    pub async fn import_file(
        &self,
        file: &ImportFile,
        mode: ImportMode,
        delegate: Option<&dyn ConflictDelegate>,
    ) -> Result<ImportResult, ImportError> {
        let policy = ConflictPolicy::for_mode(mode, delegate)?;
        let run_id = ImportRunId::new();
        let span = tracing::info_span!(
            "inventory_import",
            %run_id,
            %mode,
            items = file.items.len()
        );

        self.run(run_id, file, policy).instrument(span).await
    }

    async fn run(
        &self,
        run_id: ImportRunId,
        file: &ImportFile,
        policy: ConflictPolicy<'_>,
    ) -> Result<ImportResult, ImportError> {
        if let ConflictPolicy::InsertAll = policy {
            let removed = self.store.delete_all()?;
            tracing::info!(removed, "erased existing inventory");
        }

        let mut success_count = 0;
        let mut skipped_count = 0;
        let mut failed_items = Vec::new();

        for (line, item) in file.items.iter().enumerate() {
            match self.apply_line(item, policy).await {
                Ok(LineOutcome::Skipped) => {
                    tracing::debug!(line, code = %item.code, "skipped");
                    skipped_count += 1;
                }
                Ok(outcome) => {
                    tracing::debug!(line, code = %item.code, ?outcome, "applied");
                    success_count += 1;
                }
                Err(reason) => {
                    tracing::warn!(line, code = %item.code, %reason, "line not imported");
                    failed_items.push(FailedItem {
                        item: item.clone(),
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            success_count,
            skipped_count,
            failed = failed_items.len(),
            "import finished"
        );

        Ok(ImportResult::new(
            run_id,
            success_count,
            skipped_count,
            failed_items,
        ))
    }

    async fn apply_line(
        &self,
        item: &ImportItem,
        policy: ConflictPolicy<'_>,
    ) -> Result<LineOutcome, ItemFailure> {
        if !item.quantity.is_finite() || item.quantity < 0.0 {
            return Err(ItemFailure::InvalidQuantity(item.quantity));
        }
        let glass_type = normalize_type(&item.glass_type);
        if glass_type.is_empty() {
            return Err(ItemFailure::InvalidType(item.glass_type.clone()));
        }

        let glass = self.resolve(item)?;
        let key = glass.natural_key();

        if let ConflictPolicy::InsertAll = policy {
            return self.insert(item, key, &glass_type);
        }

        let Some(conflict) = self.find_conflict(item, key, &glass_type)? else {
            return self.insert(item, key, &glass_type);
        };

        let resolution = match policy {
            ConflictPolicy::Fixed(resolution) => resolution,
            ConflictPolicy::Ask(delegate) => {
                let view = conflict
                    .merged_view()
                    .map_err(|e| ItemFailure::Store(e.to_string()))?;
                delegate.resolve(item, &view).await
            }
            ConflictPolicy::InsertAll => return self.insert(item, key, &glass_type),
        };

        self.resolve_conflict(conflict, item.quantity, resolution)
    }

    /// A line naming its variant resolves to exactly that key. Otherwise the
    /// exact key with sequence 0 is tried first, then any variant with the
    /// same manufacturer and code.
    fn resolve(&self, item: &ImportItem) -> Result<GlassItem, ItemFailure> {
        let not_found = || ItemFailure::ItemNotFound {
            manufacturer: item.manufacturer.clone(),
            code: item.code.clone(),
        };

        let sequence = item.sequence.unwrap_or(0);
        let key =
            NaturalKey::new(&item.manufacturer, &item.code, sequence).map_err(|_| not_found())?;
        if let Some(glass) = self.catalog.find_by_natural_key(&key)? {
            return Ok(glass);
        }
        if item.sequence.is_some() {
            return Err(not_found());
        }

        self.catalog
            .find_by_manufacturer_code(&item.manufacturer, &item.code)?
            .ok_or_else(not_found)
    }

    /// Existing records of (item, type) this line collides with.
    ///
    /// A line with a location only collides with records at that location,
    /// and a line with a subtype only with records of that subtype. The
    /// primary record is the one with the line's subtype (none if it has
    /// none) at the line's location, else the oldest candidate.
    fn find_conflict(
        &self,
        item: &ImportItem,
        key: &NaturalKey,
        glass_type: &str,
    ) -> Result<Option<Conflict>, ItemFailure> {
        let location = item
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty());
        let subtype = line_subtype(item);

        let mut candidates: Vec<InventoryRecord> = self
            .store
            .fetch_by_item_and_type(key, glass_type)?
            .into_iter()
            .filter(|r| match location {
                Some(loc) => r.location().is_some_and(|l| l.eq_ignore_ascii_case(loc)),
                None => true,
            })
            .filter(|r| subtype.is_none() || r.subtype() == subtype.as_deref())
            .collect();

        if candidates.is_empty() {
            return Ok(None);
        }

        let primary_idx = candidates
            .iter()
            .position(|r| r.subtype() == subtype.as_deref() && same_location(r.location(), location))
            .unwrap_or(0);
        let primary = candidates.remove(primary_idx);

        let duplicates = candidates
            .into_iter()
            .filter(|r| r.subtype() == primary.subtype() && same_location(r.location(), primary.location()))
            .collect();

        Ok(Some(Conflict { primary, duplicates }))
    }

    fn insert(
        &self,
        item: &ImportItem,
        key: &NaturalKey,
        glass_type: &str,
    ) -> Result<LineOutcome, ItemFailure> {
        let mut new = NewInventoryRecord::new(key.clone(), glass_type, item.quantity);
        if let Some(location) = &item.location {
            new = new.with_location(location.clone());
        }
        if let Some(subtype) = &item.subtype {
            new = new.with_subtype(subtype.clone());
        }
        if let Some(dimensions) = &item.dimensions {
            new = new.with_dimensions(dimensions.clone());
        }
        let record = InventoryRecord::create(new, Utc::now())
            .map_err(|e| ItemFailure::Store(e.to_string()))?;
        self.store.create(record)?;
        Ok(LineOutcome::Inserted)
    }

    /// Apply a resolution to the primary record and fold its duplicates in.
    fn resolve_conflict(
        &self,
        conflict: Conflict,
        imported: f64,
        resolution: ConflictResolution,
    ) -> Result<LineOutcome, ItemFailure> {
        let (quantity, outcome) = match resolution {
            ConflictResolution::Skip => return Ok(LineOutcome::Skipped),
            ConflictResolution::Replace => (imported, LineOutcome::Replaced),
            ConflictResolution::Increase => {
                (conflict.combined_quantity() + imported, LineOutcome::Increased)
            }
        };

        let Conflict {
            mut primary,
            duplicates,
        } = conflict;

        primary
            .set_quantity(quantity, Utc::now())
            .map_err(|e| ItemFailure::Store(e.to_string()))?;
        self.store.update(&primary)?;

        for duplicate in duplicates {
            tracing::debug!(record = %duplicate.id_typed(), into = %primary.id_typed(), "merging duplicate record");
            self.store.delete(duplicate.id_typed())?;
        }

        Ok(outcome)
    }
}

/// The line's subtype as records store it (trimmed, lowercased).
fn line_subtype(item: &ImportItem) -> Option<String> {
    item.subtype
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

fn same_location(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}
