//! campus-tally entry point: CLI wiring around the aggregation core and catalog.

mod cli;
mod logging;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use campus_tally::aggregate::Summary;
use campus_tally::catalog::{Book, Catalog};
use campus_tally::config::{ConfigError, TallyConfig};
use campus_tally::io::export::{export_all, write_report, write_summary_json};
use campus_tally::io::source::load_inputs;
use campus_tally::reading::ReadingStore;
use campus_tally::Result;

use cli::{CatalogAction, CatalogArgs, Cli, Command, ReportArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    let outcome = match cli.command {
        Command::Report(args) => run_report(args),
        Command::Catalog(args) => run_catalog(args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Resolves the configuration: `--config` takes priority, then `--preset`,
/// then the campus energy default. CLI overrides are applied before
/// validation.
fn resolve_config(args: &ReportArgs) -> Result<TallyConfig> {
    let mut config = if let Some(ref path) = args.config {
        TallyConfig::from_toml_file(path)?
    } else if let Some(ref name) = args.preset {
        TallyConfig::from_preset(name)?
    } else {
        TallyConfig::campus_energy()
    };

    if let Some(bucket) = args.bucket {
        config.aggregation.bucket = bucket.to_string();
    }
    if let Some(policy) = args.missing {
        config.aggregation.missing_values = policy.to_string();
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        return Err(ConfigError {
            field: "config".to_string(),
            message: format!("{} validation error(s)", errors.len()),
        }
        .into());
    }
    Ok(config)
}

fn run_report(args: ReportArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let bucket = config.aggregation.bucket()?;
    let policy = config.aggregation.missing_values()?;

    let loaded = load_inputs(&args.inputs, &config.input)?;
    let mut store = ReadingStore::with_timestamp_formats(config.input.timestamp_formats.clone());
    let ingest = store.ingest(loaded.rows, policy);
    for issue in &ingest.issues {
        warn!(%issue, "skipped row");
    }
    info!(
        files = loaded.files,
        failed_files = loaded.failed.len(),
        accepted = ingest.accepted,
        filled = ingest.filled,
        skipped = ingest.issues.len(),
        "ingest complete"
    );

    let summary = Summary::from_readings(store.all(), bucket);
    if let Err(e) = summary.ensure_data() {
        warn!(error = %e, "report contains no data");
    }

    let text = config.report.reporter().render(&summary);
    if args.json {
        write_summary_json(&summary, io::stdout().lock())?;
    } else {
        print!("{text}");
    }

    if let Some(ref path) = args.summary_out {
        write_report(&text, path)?;
        info!(path = %path.display(), "report written");
    }
    if let Some(ref dir) = args.export_dir {
        export_all(store.all(), &summary, dir)?;
    }
    Ok(())
}

fn run_catalog(args: CatalogArgs) -> Result<()> {
    let mut catalog = Catalog::open(&args.file)?;

    match args.action {
        CatalogAction::Add {
            title,
            author,
            isbn,
        } => {
            let mut tx = catalog.transaction();
            tx.add(Book::new(title, author, isbn.clone()))?;
            tx.commit()?;
            println!("Added {isbn}.");
        }
        CatalogAction::Issue { isbn } => {
            let mut tx = catalog.transaction();
            tx.issue(&isbn)?;
            tx.commit()?;
            println!("Issued {isbn}.");
        }
        CatalogAction::Return { isbn } => {
            let mut tx = catalog.transaction();
            tx.return_book(&isbn)?;
            tx.commit()?;
            println!("Returned {isbn}.");
        }
        CatalogAction::List => {
            if catalog.books().is_empty() {
                println!("No books available.");
            }
            for book in catalog.books() {
                println!("{book}");
            }
        }
        CatalogAction::Search { query } => {
            let hits = catalog.search_by_title(&query);
            if hits.is_empty() {
                println!("No books found.");
            }
            for book in hits {
                println!("{book}");
            }
        }
    }
    Ok(())
}
