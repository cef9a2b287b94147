//! Append-only store of readings and batch ingestion of raw rows.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use tracing::debug;

use super::types::{Reading, parse_timestamp, parse_value};
use crate::error::{Error, Result};

/// How a row with an empty or NaN value cell is handled during ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingValuePolicy {
    /// Drop the row and report it as an issue.
    #[default]
    Skip,
    /// Record the reading with a value of `0.0`.
    Zero,
    /// Record the mean of the entity's present values in the same batch.
    /// Entities with no present value fall back to `Skip`.
    EntityMean,
}

impl FromStr for MissingValuePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "zero" => Ok(Self::Zero),
            "entity_mean" => Ok(Self::EntityMean),
            other => Err(format!(
                "must be \"skip\", \"zero\" or \"entity_mean\", got \"{other}\""
            )),
        }
    }
}

impl fmt::Display for MissingValuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Skip => "skip",
            Self::Zero => "zero",
            Self::EntityMean => "entity_mean",
        })
    }
}

/// One untyped input row as handed over by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Where the row came from (file name), for diagnostics.
    pub source: String,
    /// 1-based line number within `source`.
    pub line: usize,
    pub entity: String,
    pub timestamp: String,
    pub value: String,
}

/// A row that was skipped during ingestion.
#[derive(Debug)]
pub struct RowIssue {
    pub source: String,
    pub line: usize,
    pub error: Error,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.source, self.line, self.error)
    }
}

/// Outcome of [`ReadingStore::ingest`].
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Rows recorded as readings, including filled ones.
    pub accepted: usize,
    /// Rows whose missing value was filled by the policy.
    pub filled: usize,
    /// Rows skipped, in detection order.
    pub issues: Vec<RowIssue>,
}

impl IngestReport {
    /// Appends the issues and counters of another batch.
    pub fn absorb(&mut self, other: IngestReport) {
        self.accepted += other.accepted;
        self.filled += other.filled;
        self.issues.extend(other.issues);
    }
}

/// Row that passed validation but may still wait for a filled value.
struct Staged {
    source: String,
    line: usize,
    entity: String,
    timestamp: NaiveDateTime,
    value: Option<f64>,
    filled: bool,
}

/// Append-only, insertion-ordered collection of readings.
///
/// Duplicate `(entity, timestamp)` pairs are kept.
#[derive(Debug, Clone, Default)]
pub struct ReadingStore {
    readings: Vec<Reading>,
    timestamp_formats: Vec<String>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that also accepts the given `chrono` timestamp layouts.
    pub fn with_timestamp_formats(formats: Vec<String>) -> Self {
        Self {
            readings: Vec::new(),
            timestamp_formats: formats,
        }
    }

    /// Parses and appends one reading.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidInput`](crate::error::ErrorKind) error if
    /// the entity is blank, the timestamp cannot be parsed, or the value is not
    /// a finite number. The store is unchanged on error.
    pub fn add(&mut self, entity: &str, timestamp: &str, value: &str) -> Result<()> {
        let entity = parse_entity(entity)?;
        let timestamp = parse_timestamp(timestamp, &self.timestamp_formats)?;
        let value = parse_value(value)?;
        self.readings.push(Reading::new(entity, timestamp, value));
        Ok(())
    }

    /// Appends an already-typed reading.
    pub fn push(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    /// Iterates over all readings in insertion order.
    ///
    /// Each call starts a fresh pass from the first reading.
    pub fn all(&self) -> std::slice::Iter<'_, Reading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Ingests a batch of raw rows, skipping malformed ones.
    ///
    /// Never fails as a whole: every rejected row becomes a [`RowIssue`] in
    /// the returned report and the remaining rows are recorded in input
    /// order. Missing values are resolved with `policy`; for
    /// [`MissingValuePolicy::EntityMean`] the mean is taken over the present
    /// values of this batch only.
    pub fn ingest<I>(&mut self, rows: I, policy: MissingValuePolicy) -> IngestReport
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut report = IngestReport::default();
        let mut staged = Vec::new();

        for row in rows {
            match self.stage(&row, policy) {
                Ok(s) => {
                    if s.filled {
                        report.filled += 1;
                    }
                    staged.push(s);
                }
                Err(error) => report.issues.push(RowIssue {
                    source: row.source,
                    line: row.line,
                    error,
                }),
            }
        }

        let means = entity_means(&staged);
        for s in staged {
            let value = match s.value {
                Some(v) => v,
                None => match means.get(&s.entity) {
                    Some(&mean) => {
                        report.filled += 1;
                        mean
                    }
                    None => {
                        report.issues.push(RowIssue {
                            source: s.source,
                            line: s.line,
                            error: Error::MissingValue,
                        });
                        continue;
                    }
                },
            };
            self.readings.push(Reading::new(s.entity, s.timestamp, value));
            report.accepted += 1;
        }

        debug!(
            accepted = report.accepted,
            filled = report.filled,
            skipped = report.issues.len(),
            "ingested batch"
        );
        report
    }

    fn stage(&self, row: &RawRow, policy: MissingValuePolicy) -> Result<Staged> {
        let entity = parse_entity(&row.entity)?;
        let timestamp = parse_timestamp(&row.timestamp, &self.timestamp_formats)?;
        let (value, filled) = match parse_value(&row.value) {
            Ok(v) => (Some(v), false),
            Err(Error::MissingValue) => match policy {
                MissingValuePolicy::Skip => return Err(Error::MissingValue),
                MissingValuePolicy::Zero => (Some(0.0), true),
                MissingValuePolicy::EntityMean => (None, false),
            },
            Err(e) => return Err(e),
        };
        Ok(Staged {
            source: row.source.clone(),
            line: row.line,
            entity,
            timestamp,
            value,
            filled,
        })
    }
}

fn parse_entity(raw: &str) -> Result<String> {
    let entity = raw.trim();
    if entity.is_empty() {
        return Err(Error::EmptyEntity);
    }
    Ok(entity.to_string())
}

/// Mean of the present values per entity. Entities with only missing values
/// are absent from the map.
fn entity_means(staged: &[Staged]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for s in staged {
        if let Some(v) = s.value {
            let entry = sums.entry(s.entity.as_str()).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(entity, (sum, count))| (entity.to_string(), sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn row(line: usize, entity: &str, timestamp: &str, value: &str) -> RawRow {
        RawRow {
            source: "test.csv".to_string(),
            line,
            entity: entity.to_string(),
            timestamp: timestamp.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let mut store = ReadingStore::new();
        assert!(store.add("Library", "2024-01-02", "18").is_ok());
        assert!(store.add("Admin", "2024-01-01", "25").is_ok());
        let entities: Vec<&str> = store.all().map(|r| r.entity.as_str()).collect();
        assert_eq!(entities, vec!["Library", "Admin"]);
    }

    #[test]
    fn add_rejects_bad_fields_without_mutating() {
        let mut store = ReadingStore::new();
        let bad_ts = store.add("Library", "not a date", "1");
        let bad_value = store.add("Library", "2024-01-01", "twelve");
        let blank = store.add("  ", "2024-01-01", "1");
        assert_eq!(bad_ts.err().map(|e| e.kind()), Some(ErrorKind::InvalidInput));
        assert_eq!(
            bad_value.err().map(|e| e.kind()),
            Some(ErrorKind::InvalidInput)
        );
        assert_eq!(blank.err().map(|e| e.kind()), Some(ErrorKind::InvalidInput));
        assert!(store.is_empty());
    }

    #[test]
    fn duplicates_are_retained() {
        let mut store = ReadingStore::new();
        store.add("Admin", "2024-01-01 09:00", "25").expect("reading should be accepted");
        store.add("Admin", "2024-01-01 09:00", "25").expect("reading should be accepted");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn all_is_restartable() {
        let mut store = ReadingStore::new();
        store.add("Admin", "2024-01-01", "1").expect("reading should be accepted");
        store.add("Admin", "2024-01-02", "2").expect("reading should be accepted");
        let first: Vec<f64> = store.all().map(|r| r.value).collect();
        let second: Vec<f64> = store.all().map(|r| r.value).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn ingest_skips_malformed_rows_and_keeps_going() {
        let mut store = ReadingStore::new();
        let report = store.ingest(
            vec![
                row(2, "Library", "2024-01-01 10:00", "12"),
                row(3, "Library", "garbage", "15"),
                row(4, "Library", "2024-01-02 11:00", "x"),
                row(5, "Library", "2024-01-03 13:00", "20"),
            ],
            MissingValuePolicy::Skip,
        );
        assert_eq!(report.accepted, 2);
        assert_eq!(report.issues.len(), 2);
        let lines: Vec<usize> = report.issues.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert!(
            report
                .issues
                .iter()
                .all(|i| i.error.kind() == ErrorKind::InvalidInput)
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn skip_policy_reports_missing_values() {
        let mut store = ReadingStore::new();
        let report = store.ingest(
            vec![row(2, "s", "2024-01-01", ""), row(3, "s", "2024-01-02", "3")],
            MissingValuePolicy::Skip,
        );
        assert_eq!(report.accepted, 1);
        assert!(matches!(report.issues[0].error, Error::MissingValue));
    }

    #[test]
    fn zero_policy_fills_with_zero() {
        let mut store = ReadingStore::new();
        let report = store.ingest(
            vec![row(2, "s", "2024-01-01", "NaN"), row(3, "s", "2024-01-02", "5")],
            MissingValuePolicy::Zero,
        );
        assert_eq!(report.accepted, 2);
        assert_eq!(report.filled, 1);
        let values: Vec<f64> = store.all().map(|r| r.value).collect();
        assert_eq!(values, vec![0.0, 5.0]);
    }

    #[test]
    fn entity_mean_policy_fills_per_entity_and_keeps_order() {
        let mut store = ReadingStore::new();
        let report = store.ingest(
            vec![
                row(2, "a", "2024-01-01", "26"),
                row(3, "a", "2024-01-02", ""),
                row(4, "b", "2024-01-01", "10"),
                row(5, "a", "2024-01-03", "30"),
            ],
            MissingValuePolicy::EntityMean,
        );
        assert_eq!(report.accepted, 4);
        assert_eq!(report.filled, 1);
        let values: Vec<f64> = store.all().map(|r| r.value).collect();
        assert_eq!(values, vec![26.0, 28.0, 10.0, 30.0]);
    }

    #[test]
    fn entity_mean_without_present_values_skips() {
        let mut store = ReadingStore::new();
        let report = store.ingest(
            vec![row(2, "a", "2024-01-01", ""), row(3, "b", "2024-01-01", "1")],
            MissingValuePolicy::EntityMean,
        );
        assert_eq!(report.accepted, 1);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].line, 2);
    }

    #[test]
    fn policy_parses_from_config_names() {
        assert_eq!(
            "zero".parse::<MissingValuePolicy>(),
            Ok(MissingValuePolicy::Zero)
        );
        assert!("mean".parse::<MissingValuePolicy>().is_err());
        assert_eq!(MissingValuePolicy::EntityMean.to_string(), "entity_mean");
    }
}
