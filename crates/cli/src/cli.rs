use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use molten_import::ImportMode;
use molten_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Glass inventory import/export", long_about = None)]
pub struct Cli {
    /// Log output format on stderr: json or pretty
    #[arg(long, default_value = "json", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show what an import file contains without importing it
    Preview {
        file: PathBuf,
    },
    /// Import a file into the inventory snapshot
    Import {
        file: PathBuf,
        /// erase-and-replace, add-new-only, add-and-increase or ask-per-item
        #[arg(long)]
        mode: ImportMode,
        #[command(flatten)]
        data: DataPaths,
        /// Run the import but do not write the inventory snapshot
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the inventory snapshot as an import file
    Export {
        #[command(flatten)]
        data: DataPaths,
        /// Output path (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Quantity totals by type and location for one catalog item
    Summary {
        manufacturer: String,
        code: String,
        #[command(flatten)]
        data: DataPaths,
    },
}

/// Where the catalog and the inventory snapshot live.
#[derive(Args, Debug, Clone)]
pub struct DataPaths {
    /// Catalog file (`glassitems` document or a bare array of items)
    #[arg(long, env = "MOLTEN_CATALOG")]
    pub catalog: PathBuf,
    /// Inventory snapshot JSON; a missing file is an empty inventory
    #[arg(long, env = "MOLTEN_INVENTORY")]
    pub inventory: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_requires_a_mode() {
        let err = Cli::try_parse_from([
            "molten", "import", "in.json", "--catalog", "c.json", "--inventory", "i.json",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn import_parses_mode_and_paths() {
        let cli = Cli::try_parse_from([
            "molten",
            "import",
            "in.json",
            "--mode",
            "add-and-increase",
            "--catalog",
            "c.json",
            "--inventory",
            "i.json",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Import {
                file,
                mode,
                data,
                dry_run,
            } => {
                assert_eq!(file, PathBuf::from("in.json"));
                assert_eq!(mode, ImportMode::AddAndIncrease);
                assert_eq!(data.catalog, PathBuf::from("c.json"));
                assert!(dry_run);
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = Cli::try_parse_from([
            "molten", "import", "in.json", "--mode", "merge", "--catalog", "c.json",
            "--inventory", "i.json",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn log_format_defaults_to_json() {
        let cli = Cli::try_parse_from(["molten", "preview", "in.json"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
