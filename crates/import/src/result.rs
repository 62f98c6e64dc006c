use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use molten_core::ImportRunId;

use crate::error::ItemFailure;
use crate::format::{ImportFile, ImportItem};

/// A line item that could not be applied, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedItem {
    pub item: ImportItem,
    pub reason: ItemFailure,
}

/// Outcome of one import run. Built once at the end of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    run_id: ImportRunId,
    success_count: usize,
    skipped_count: usize,
    failed_items: Vec<FailedItem>,
}

impl ImportResult {
    pub(crate) fn new(
        run_id: ImportRunId,
        success_count: usize,
        skipped_count: usize,
        failed_items: Vec<FailedItem>,
    ) -> Self {
        Self {
            run_id,
            success_count,
            skipped_count,
            failed_items,
        }
    }

    pub fn run_id(&self) -> ImportRunId {
        self.run_id
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }

    pub fn failed_items(&self) -> &[FailedItem] {
        &self.failed_items
    }

    pub fn failed_count(&self) -> usize {
        self.failed_items.len()
    }

    /// Lines seen by the run (applied + skipped + failed).
    pub fn total(&self) -> usize {
        self.success_count + self.skipped_count + self.failed_items.len()
    }
}

/// Read-only summary of an import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportPreview {
    pub version: String,
    pub generated: DateTime<Utc>,
    pub item_count: usize,
    /// Line count per manufacturer, as written in the file.
    pub manufacturers: BTreeMap<String, usize>,
}

impl ImportPreview {
    pub fn from_file(file: &ImportFile) -> Self {
        let mut manufacturers = BTreeMap::new();
        for item in &file.items {
            *manufacturers
                .entry(item.manufacturer.trim().to_string())
                .or_insert(0) += 1;
        }
        Self {
            version: file.version.clone(),
            generated: file.generated,
            item_count: file.items.len(),
            manufacturers,
        }
    }
}
