//! CSV and JSON export of readings and aggregates.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::aggregate::{BucketAggregate, EntityAggregate, Summary};
use crate::error::{Error, Result};
use crate::reading::{Reading, TIMESTAMP_FORMAT};

/// Column header for the cleaned readings export.
const READINGS_HEADER: &str = "timestamp,value,entity";

/// Column header for the per-entity export.
const ENTITY_HEADER: &str = "entity,total,count,average,min,max";

/// Timestamp layout used in exported files.

/// Writes readings as CSV in insertion order.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_readings_csv<'a, I, W>(readings: I, writer: W) -> Result<()>
where
    I: IntoIterator<Item = &'a Reading>,
    W: Write,
{
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(READINGS_HEADER.split(','))?;
    for r in readings {
        wtr.write_record(&[
            r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.4}", r.value),
            r.entity.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes one row per entity aggregate.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_entity_csv(aggregates: &[EntityAggregate], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(ENTITY_HEADER.split(','))?;
    for a in aggregates {
        wtr.write_record(&[
            a.entity.clone(),
            format!("{:.4}", a.total),
            a.count.to_string(),
            format!("{:.4}", a.average()),
            format!("{:.4}", a.min),
            format!("{:.4}", a.max),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes bucket totals; `bucket_column` names the key column (e.g. `"week"`).
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_bucket_csv<K: Display>(
    buckets: &[BucketAggregate<K>],
    bucket_column: &str,
    writer: impl Write,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(["entity", bucket_column, "sum", "count"])?;
    for b in buckets {
        wtr.write_record(&[
            b.entity.clone(),
            b.bucket.to_string(),
            format!("{:.4}", b.sum),
            b.count.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Converts any aggregate into a plain field-name to value map.
///
/// # Errors
///
/// Returns [`Error::Json`] if `value` does not serialize to a JSON object.
pub fn to_record<T: Serialize>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Json(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        )))),
    }
}

/// Writes a summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_summary_json(summary: &Summary, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Persists a rendered report.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_report(text: &str, path: &Path) -> Result<()> {
    let mut file = io::BufWriter::new(File::create(path)?);
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Writes the cleaned readings, entity totals, bucket totals and JSON summary
/// into `dir`, creating it if needed. Returns the written paths.
///
/// # Errors
///
/// Returns an error if the directory or any file cannot be written.
pub fn export_all<'a, I>(readings: I, summary: &Summary, dir: &Path) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = &'a Reading>,
{
    fs::create_dir_all(dir)?;
    let bucket = summary.bucket.to_string();

    let readings_path = dir.join("cleaned_data.csv");
    write_readings_csv(readings, io::BufWriter::new(File::create(&readings_path)?))?;

    let entity_path = dir.join("entity_totals.csv");
    write_entity_csv(
        &summary.entities,
        io::BufWriter::new(File::create(&entity_path)?),
    )?;

    let bucket_path = dir.join(format!("{}_totals.csv", summary.bucket.label().to_lowercase()));
    write_bucket_csv(
        &summary.buckets,
        &bucket,
        io::BufWriter::new(File::create(&bucket_path)?),
    )?;

    let json_path = dir.join("summary.json");
    write_summary_json(summary, io::BufWriter::new(File::create(&json_path)?))?;

    let written = vec![readings_path, entity_path, bucket_path, json_path];
    info!(dir = %dir.display(), files = written.len(), "exported aggregates");
    Ok(written)
}
