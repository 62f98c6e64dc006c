use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;

use molten_catalog::CatalogService;
use molten_import::{
    ConflictDelegate, ImportMode, ImportPreview, ImportResult, InventoryImporter,
    export_inventory_json, parse_import_file,
};
use molten_inventory::{InventoryStore, InventorySummary};

use crate::cli::{Cli, Commands, DataPaths};
use crate::prompt::StdinPrompt;
use crate::snapshot::{load_catalog, load_inventory, save_inventory};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Preview { file } => {
            let preview = preview(&file)?;
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        Commands::Import {
            file,
            mode,
            data,
            dry_run,
        } => {
            let result = import(&file, mode, &data, dry_run).await?;
            print_result(&result);
        }
        Commands::Export { data, out } => {
            let json = export(&data)?;
            match out {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Commands::Summary {
            manufacturer,
            code,
            data,
        } => {
            let summary = summary(&manufacturer, &code, &data)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

pub fn preview(file: &Path) -> anyhow::Result<ImportPreview> {
    let json = read_file(file)?;
    let parsed = parse_import_file(&json)?;
    Ok(ImportPreview::from_file(&parsed))
}

/// Import `file` into the inventory snapshot; the snapshot is only written
/// when the run succeeds and `dry_run` is off.
pub async fn import(
    file: &Path,
    mode: ImportMode,
    data: &DataPaths,
    dry_run: bool,
) -> anyhow::Result<ImportResult> {
    let json = read_file(file)?;
    let catalog = load_catalog(&data.catalog)?;
    let store = load_inventory(&data.inventory)?;
    let importer = InventoryImporter::new(catalog, store);

    let prompt = StdinPrompt;
    let delegate: Option<&dyn ConflictDelegate> = match mode {
        ImportMode::AskPerItem => Some(&prompt),
        _ => None,
    };

    let result = importer
        .import(&json, mode, delegate)
        .await
        .with_context(|| format!("import of {} failed", file.display()))?;

    if dry_run {
        tracing::info!("dry run; inventory snapshot not written");
    } else {
        save_inventory(importer.store(), &data.inventory)?;
    }
    Ok(result)
}

pub fn export(data: &DataPaths) -> anyhow::Result<String> {
    let catalog = load_catalog(&data.catalog)?;
    let store = load_inventory(&data.inventory)?;
    Ok(export_inventory_json(&catalog, &store, Utc::now())?)
}

pub fn summary(manufacturer: &str, code: &str, data: &DataPaths) -> anyhow::Result<InventorySummary> {
    let catalog = load_catalog(&data.catalog)?;
    let glass = catalog
        .find_by_manufacturer_code(manufacturer, code)?
        .with_context(|| format!("no catalog item for {manufacturer} {code}"))?;
    let store = load_inventory(&data.inventory)?;
    let records = store.fetch_by_item(glass.natural_key())?;
    Ok(InventorySummary::from_records(&records))
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_result(result: &ImportResult) {
    println!(
        "imported {} of {} (skipped {}, failed {})",
        result.success_count(),
        result.total(),
        result.skipped_count(),
        result.failed_count()
    );
    for failed in result.failed_items() {
        println!(
            "  {} {} {}: {}",
            failed.item.manufacturer, failed.item.code, failed.item.glass_type, failed.reason
        );
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    const CATALOG: &str = r#"[
        {"manufacturer": "EF", "code": "204", "name": "Pale Emerald", "coe": "104"},
        {"manufacturer": "CiM", "code": "511", "name": "Peacock", "coe": "104"}
    ]"#;

    const IMPORT: &str = r#"{
        "version": "1.0",
        "generated": "2026-01-05T10:00:00Z",
        "items": [
            {"code": "204", "name": "Pale Emerald", "manufacturer": "EF", "coe": "104", "type": "rod", "quantity": 10},
            {"code": "511", "name": "Peacock", "manufacturer": "CiM", "coe": "104", "type": "rod", "quantity": 2.5, "location": "Shelf A"},
            {"code": "999", "name": "Unknown", "manufacturer": "EF", "coe": "104", "type": "rod", "quantity": 1}
        ]
    }"#;

    fn workspace() -> (TempDir, DataPaths, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.json");
        fs::write(&catalog, CATALOG).unwrap();
        let file = dir.path().join("import.json");
        fs::write(&file, IMPORT).unwrap();
        let data = DataPaths {
            catalog,
            inventory: dir.path().join("inventory.json"),
        };
        (dir, data, file)
    }

    #[test]
    fn preview_counts_manufacturers() {
        let (_dir, _data, file) = workspace();
        let preview = preview(&file).unwrap();
        assert_eq!(preview.item_count, 3);
        assert_eq!(preview.manufacturers.get("EF"), Some(&2));
    }

    #[tokio::test]
    async fn import_writes_snapshot_and_increases_on_rerun() {
        let (_dir, data, file) = workspace();

        let first = import(&file, ImportMode::AddAndIncrease, &data, false)
            .await
            .unwrap();
        assert_eq!(first.success_count(), 2);
        assert_eq!(first.failed_count(), 1);

        let second = import(&file, ImportMode::AddAndIncrease, &data, false)
            .await
            .unwrap();
        assert_eq!(second.success_count(), 2);

        let summary = summary("ef", "204", &data).unwrap();
        assert_eq!(summary.total, 20.0);
    }

    #[tokio::test]
    async fn dry_run_leaves_snapshot_untouched() {
        let (_dir, data, file) = workspace();
        import(&file, ImportMode::AddNewOnly, &data, true)
            .await
            .unwrap();
        assert!(!data.inventory.exists());
    }

    #[tokio::test]
    async fn export_reimports_cleanly() {
        let (dir, data, file) = workspace();
        import(&file, ImportMode::AddNewOnly, &data, false)
            .await
            .unwrap();

        let exported = dir.path().join("export.json");
        fs::write(&exported, export(&data).unwrap()).unwrap();

        let result = import(&exported, ImportMode::EraseAndReplace, &data, false)
            .await
            .unwrap();
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failed_count(), 0);

        let summary = summary("CiM", "511", &data).unwrap();
        assert_eq!(summary.by_location.get("Shelf A"), Some(&2.5));
    }

    #[test]
    fn summary_of_unknown_item_is_an_error() {
        let (_dir, data, _file) = workspace();
        assert!(summary("EF", "000", &data).is_err());
    }
}
