use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use campus_tally::aggregate::Bucket;
use campus_tally::reading::MissingValuePolicy;

use crate::logging::LogLevel;

#[derive(Debug, Parser)]
#[command(
    name = "campus-tally",
    version,
    about = "Aggregate time-stamped readings per entity and time bucket"
)]
pub struct Cli {
    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load CSV readings and print a summary report
    Report(ReportArgs),

    /// Manage the library catalog
    Catalog(CatalogArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// CSV file or directory of CSV files (repeatable)
    #[arg(short, long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in configuration (campus_energy, rainfall, temperature)
    #[arg(long)]
    pub preset: Option<String>,

    /// Override the bucket granularity (day, week, month, year, season)
    #[arg(long)]
    pub bucket: Option<Bucket>,

    /// Override the missing-value policy (skip, zero, entity_mean)
    #[arg(long)]
    pub missing: Option<MissingValuePolicy>,

    /// Write cleaned readings and aggregate CSV/JSON files here
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Also write the text report to this file
    #[arg(long)]
    pub summary_out: Option<PathBuf>,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalog JSON file
    #[arg(short, long, default_value = "books.json")]
    pub file: PathBuf,

    #[command(subcommand)]
    pub action: CatalogAction,
}

#[derive(Debug, Subcommand)]
pub enum CatalogAction {
    /// Add a book
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        isbn: String,
    },

    /// Issue a book by ISBN
    Issue { isbn: String },

    /// Return a book by ISBN
    Return { isbn: String },

    /// List every book
    #[command(alias = "ls")]
    List,

    /// Search titles (case-insensitive)
    Search { query: String },
}
