//! CSV loader turning input files into [`RawRow`]s.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::InputConfig;
use crate::error::{Error, Result};
use crate::reading::RawRow;

/// Rows gathered from a set of inputs, plus the files that could not be read.
#[derive(Debug, Default)]
pub struct LoadedRows {
    pub rows: Vec<RawRow>,
    /// Files skipped entirely, with the reason.
    pub failed: Vec<(PathBuf, Error)>,
    /// Number of files read successfully.
    pub files: usize,
}

/// Reads CSV rows from `reader`.
///
/// `source` labels the rows for diagnostics. `fallback_entity` is used for
/// every row when `config.entity_column` is `None`. Short rows are accepted
/// and their missing cells read as empty strings.
///
/// # Errors
///
/// Returns [`Error::MissingColumn`] if a configured column is absent from the
/// header, or [`Error::Csv`] if the header cannot be read.
pub fn read_rows<R: Read>(
    reader: R,
    source: &str,
    fallback_entity: &str,
    config: &InputConfig,
) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
                path: PathBuf::from(source),
            })
    };
    let ts_idx = column(&config.timestamp_column)?;
    let value_idx = column(&config.value_column)?;
    let entity_idx = config.entity_column.as_deref().map(column).transpose()?;

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        // Header is line 1.
        let fallback_line = i + 2;
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(source, line = fallback_line, error = %e, "unreadable csv record");
                continue;
            }
        };
        let line = record
            .position()
            .map_or(fallback_line, |p| p.line() as usize);
        let cell = |idx: usize| record.get(idx).unwrap_or("").to_string();

        rows.push(RawRow {
            source: source.to_string(),
            line,
            entity: entity_idx.map_or_else(|| fallback_entity.to_string(), cell),
            timestamp: cell(ts_idx),
            value: cell(value_idx),
        });
    }

    debug!(source, rows = rows.len(), "read csv");
    Ok(rows)
}

/// Reads one CSV file.
///
/// The fallback entity is `config.default_entity`, or the file stem when
/// that is empty.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or its header is unusable.
pub fn load_file(path: &Path, config: &InputConfig) -> Result<Vec<RawRow>> {
    let file = File::open(path)?;
    let source = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let fallback = if config.default_entity.is_empty() {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        config.default_entity.clone()
    };
    read_rows(file, &source, &fallback, config)
}

/// Expands directories to their `*.csv` files, sorted by name.
///
/// # Errors
///
/// Returns an error if a directory cannot be listed.
pub fn collect_csv_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| {
                    p.is_file() && p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
                })
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Loads every input file, skipping (and logging) files that fail.
///
/// # Errors
///
/// Only fails if an input directory cannot be listed; per-file failures are
/// collected in [`LoadedRows::failed`].
pub fn load_inputs(inputs: &[PathBuf], config: &InputConfig) -> Result<LoadedRows> {
    let mut loaded = LoadedRows::default();
    for path in collect_csv_files(inputs)? {
        match load_file(&path, config) {
            Ok(rows) => {
                loaded.rows.extend(rows);
                loaded.files += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read input file");
                loaded.failed.push((path, e));
            }
        }
    }
    Ok(loaded)
}
