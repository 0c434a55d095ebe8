use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::cli::subcommands::{InstanceCommands, ItemCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Import a spreadsheet (CSV, JSON array, or JSON lines).
    Import(ImportArgs),
    /// Export every record under its display headers.
    Export(ExportArgs),
    /// Inventory items.
    Item {
        #[command(subcommand)]
        action: ItemCommands,
    },
    /// Serialized instances of an item.
    Instance {
        #[command(subcommand)]
        action: InstanceCommands,
    },
    /// Show the activity log, newest first.
    Log(LogArgs),
}

/// Sheet encodings `tally import` reads.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum InputFormat {
    Csv,
    Json,
    Jsonl,
}

/// File encodings `tally export` writes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// Sheet to import
    pub file: PathBuf,
    /// Input encoding (defaults to the file extension)
    #[arg(long, value_enum)]
    pub input: Option<InputFormat>,
    /// Treat rows as stored records of this schema version instead of sheet rows
    #[arg(long)]
    pub legacy_version: Option<u32>,
    /// Abort at the first malformed row
    #[arg(long)]
    pub stop_on_error: bool,
    /// Source label recorded in the activity log (defaults to the file name)
    #[arg(long)]
    pub source: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// File encoding (defaults to the --out extension, then csv)
    #[arg(long = "as", value_enum)]
    pub export_format: Option<ExportFormat>,
    /// Output file (defaults to stdout)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct LogArgs {
    /// Only entries about this item
    #[arg(long)]
    pub item: Option<i64>,
    /// Only entries with this action (e.g. photo_added)
    #[arg(long)]
    pub action: Option<String>,
}
