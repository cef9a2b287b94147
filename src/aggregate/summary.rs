//! One-shot computation of every aggregate for a reading snapshot.

use serde::Serialize;

use super::bucket::{Bucket, BucketAggregate, by_bucket};
use super::entity::{EntityAggregate, by_entity, grand_total, peak};
use super::stats::Stats;
use crate::error::{Error, Result};
use crate::reading::Reading;

/// All aggregates of one run, recomputed from the readings on every call to
/// [`Summary::from_readings`].
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Number of readings aggregated.
    pub readings: usize,
    /// Sum of every value.
    pub total: f64,
    /// Per-entity aggregates sorted by entity name.
    pub entities: Vec<EntityAggregate>,
    /// Strategy used for `buckets`.
    #[serde(serialize_with = "serialize_bucket")]
    pub bucket: Bucket,
    /// Per-entity bucket totals sorted by entity, then key.
    pub buckets: Vec<BucketAggregate<String>>,
    /// Highest single reading.
    pub peak: Option<Reading>,
    /// Descriptive statistics over all values.
    pub stats: Option<Stats>,
}

fn serialize_bucket<S: serde::Serializer>(
    bucket: &Bucket,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(bucket)
}

impl Summary {
    /// Aggregates a snapshot of readings.
    ///
    /// The iterator is cloned for each pass, so it must be restartable
    /// (e.g. `store.all()` or a slice iterator).
    pub fn from_readings<'a, I>(readings: I, bucket: Bucket) -> Self
    where
        I: IntoIterator<Item = &'a Reading>,
        I::IntoIter: Clone,
    {
        let it = readings.into_iter();
        let values: Vec<f64> = it.clone().map(|r| r.value).collect();

        Self {
            readings: values.len(),
            total: grand_total(it.clone()),
            entities: by_entity(it.clone()),
            bucket,
            buckets: by_bucket(it.clone(), |ts| bucket.key(ts)),
            peak: peak(it).cloned(),
            stats: Stats::from_values(&values),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.readings == 0
    }

    /// Fails with [`Error::EmptyDataset`] when there were no readings.
    ///
    /// The summary itself stays usable; callers use this to emit a warning.
    pub fn ensure_data(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyDataset);
        }
        Ok(())
    }
}
