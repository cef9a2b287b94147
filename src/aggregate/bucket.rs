//! Time-bucket totals with a pluggable bucketing strategy.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

use crate::reading::Reading;

/// Built-in strategies for truncating a timestamp to a bucket key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Bucket {
    /// Calendar day, `2024-01-01`.
    #[default]
    Day,
    /// ISO 8601 week, `2024-W01`.
    Week,
    /// Calendar month, `2024-01`.
    Month,
    /// Calendar year, `2024`.
    Year,
    /// Season name: Dec-Feb Winter, Mar-May Summer, Jun-Sep Monsoon,
    /// Oct-Nov Post-Monsoon.
    Season,
}

impl Bucket {
    /// Bucket key for a timestamp. Keys of the same strategy sort
    /// chronologically, except `Season` which sorts by name.
    pub fn key(self, ts: &NaiveDateTime) -> String {
        match self {
            Self::Day => ts.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = ts.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
            Self::Month => ts.format("%Y-%m").to_string(),
            Self::Year => format!("{:04}", ts.year()),
            Self::Season => season(ts.month()).to_string(),
        }
    }

    /// Heading used in reports, e.g. `"Daily"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Daily",
            Self::Week => "Weekly",
            Self::Month => "Monthly",
            Self::Year => "Yearly",
            Self::Season => "Seasonal",
        }
    }
}

fn season(month: u32) -> &'static str {
    match month {
        12 | 1 | 2 => "Winter",
        3..=5 => "Summer",
        6..=9 => "Monsoon",
        _ => "Post-Monsoon",
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "season" => Ok(Self::Season),
            other => Err(format!(
                "must be one of day, week, month, year, season, got \"{other}\""
            )),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::Season => "season",
        })
    }
}

/// Sum of one entity's values within one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketAggregate<K> {
    pub entity: String,
    pub bucket: K,
    pub sum: f64,
    /// Number of readings that fell in the bucket.
    pub count: usize,
}

/// Groups readings by `(entity, bucket_fn(timestamp))` and sums values.
///
/// `bucket_fn` must be pure. Output is sorted by entity, then bucket key.
pub fn by_bucket<'a, I, K, F>(readings: I, bucket_fn: F) -> Vec<BucketAggregate<K>>
where
    I: IntoIterator<Item = &'a Reading>,
    K: Ord,
    F: Fn(&NaiveDateTime) -> K,
{
    let mut groups: BTreeMap<(&str, K), (f64, usize)> = BTreeMap::new();
    for r in readings {
        let entry = groups
            .entry((r.entity.as_str(), bucket_fn(&r.timestamp)))
            .or_insert((0.0, 0));
        entry.0 += r.value;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|((entity, bucket), (sum, count))| BucketAggregate {
            entity: entity.to_string(),
            bucket,
            sum,
            count,
        })
        .collect()
}
