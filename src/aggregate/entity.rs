//! Per-entity totals, ranking and peak detection.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::reading::Reading;

/// Totals for one entity, derived from its readings.
///
/// Only built from data, so `count` is at least 1 for every aggregate
/// returned by [`by_entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAggregate {
    pub entity: String,
    /// Sum of all values.
    pub total: f64,
    /// Number of readings.
    pub count: usize,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

impl EntityAggregate {
    /// Starts an aggregate from a single reading.
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            entity: reading.entity.clone(),
            total: reading.value,
            count: 1,
            min: reading.value,
            max: reading.value,
        }
    }

    /// Folds one more value into the aggregate.
    pub fn record(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.total += value;
        self.count += 1;
    }

    /// Combines a partial aggregate of the same entity into this one.
    ///
    /// Associative and commutative, so partial results from any split of
    /// the input combine to the same totals.
    pub fn merge(&mut self, other: &EntityAggregate) {
        debug_assert_eq!(self.entity, other.entity);
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            self.min = other.min;
            self.max = other.max;
        } else {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
        self.total += other.total;
        self.count += other.count;
    }

    /// Mean value, `0.0` when there are no readings.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

impl Serialize for EntityAggregate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("EntityAggregate", 6)?;
        s.serialize_field("entity", &self.entity)?;
        s.serialize_field("total", &self.total)?;
        s.serialize_field("count", &self.count)?;
        s.serialize_field("average", &self.average())?;
        s.serialize_field("min", &self.min)?;
        s.serialize_field("max", &self.max)?;
        s.end()
    }
}

/// Groups readings by entity, one aggregate per distinct entity, sorted by
/// entity name ascending.
pub fn by_entity<'a, I>(readings: I) -> Vec<EntityAggregate>
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut groups: BTreeMap<&str, EntityAggregate> = BTreeMap::new();
    for r in readings {
        groups
            .entry(r.entity.as_str())
            .and_modify(|agg| agg.record(r.value))
            .or_insert_with(|| EntityAggregate::from_reading(r));
    }
    groups.into_values().collect()
}

/// Combines per-shard `by_entity` results into one sorted list.
///
/// Equal to running `by_entity` over the concatenation of the shards.
pub fn merge_partials<I>(parts: I) -> Vec<EntityAggregate>
where
    I: IntoIterator<Item = Vec<EntityAggregate>>,
{
    let mut merged: BTreeMap<String, EntityAggregate> = BTreeMap::new();
    for part in parts {
        for agg in part {
            match merged.get_mut(&agg.entity) {
                Some(existing) => existing.merge(&agg),
                None => {
                    merged.insert(agg.entity.clone(), agg);
                }
            }
        }
    }
    merged.into_values().collect()
}

/// Orders aggregates by descending total; ties by entity name ascending.
pub fn ranked(aggregates: &[EntityAggregate]) -> Vec<&EntityAggregate> {
    let mut out: Vec<&EntityAggregate> = aggregates.iter().collect();
    out.sort_by(|a, b| match b.total.total_cmp(&a.total) {
        Ordering::Equal => a.entity.cmp(&b.entity),
        other => other,
    });
    out
}

/// The single highest reading. Ties keep the earliest in input order.
pub fn peak<'a, I>(readings: I) -> Option<&'a Reading>
where
    I: IntoIterator<Item = &'a Reading>,
{
    let mut best: Option<&Reading> = None;
    for r in readings {
        if best.is_none_or(|b| r.value > b.value) {
            best = Some(r);
        }
    }
    best
}

/// Sum of every value.
pub fn grand_total<'a, I>(readings: I) -> f64
where
    I: IntoIterator<Item = &'a Reading>,
{
    readings.into_iter().map(|r| r.value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(entity: &str, day: u32, value: f64) -> Reading {
        let ts = NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Reading::new(entity, ts, value)
    }

    fn campus() -> Vec<Reading> {
        vec![
            reading("Library", 1, 12.0),
            reading("Library", 2, 18.0),
            reading("Admin", 1, 25.0),
        ]
    }

    #[test]
    fn groups_and_sorts_by_entity() {
        let aggs = by_entity(&campus());
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].entity, "Admin");
        assert_eq!(aggs[0].total, 25.0);
        assert_eq!(aggs[0].average(), 25.0);
        assert_eq!(aggs[1].entity, "Library");
        assert_eq!(aggs[1].total, 30.0);
        assert_eq!(aggs[1].average(), 15.0);
        assert_eq!(aggs[1].min, 12.0);
        assert_eq!(aggs[1].max, 18.0);
    }

    #[test]
    fn empty_input_gives_empty_list() {
        let aggs = by_entity(&Vec::<Reading>::new());
        assert!(aggs.is_empty());
    }

    #[test]
    fn average_of_zero_readings_is_zero() {
        let agg = EntityAggregate {
            entity: "x".into(),
            total: 0.0,
            count: 0,
            min: 0.0,
            max: 0.0,
        };
        assert_eq!(agg.average(), 0.0);
    }

    #[test]
    fn ranking_is_descending_with_name_tiebreak() {
        let readings = vec![
            reading("b", 1, 5.0),
            reading("a", 1, 5.0),
            reading("c", 1, 9.0),
        ];
        let aggs = by_entity(&readings);
        let names: Vec<&str> = ranked(&aggs).iter().map(|a| a.entity.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn peak_picks_highest_and_first_on_tie() {
        let readings = campus();
        let p = peak(&readings);
        assert_eq!(p.map(|r| r.entity.as_str()), Some("Admin"));

        let tied = vec![reading("a", 1, 3.0), reading("b", 2, 3.0)];
        assert_eq!(peak(&tied).map(|r| r.entity.as_str()), Some("a"));
        assert!(peak(&Vec::<Reading>::new()).is_none());
    }

    #[test]
    fn merging_shards_matches_single_pass() {
        let readings = campus();
        let (left, right) = readings.split_at(1);
        let merged = merge_partials(vec![by_entity(left), by_entity(right)]);
        assert_eq!(merged, by_entity(&readings));
    }

    #[test]
    fn grand_total_sums_everything() {
        assert_eq!(grand_total(&campus()), 55.0);
    }

    #[test]
    fn serializes_derived_average() {
        let aggs = by_entity(&campus());
        let value = serde_json::to_value(&aggs[1]).ok();
        assert_eq!(
            value.as_ref().and_then(|v| v["average"].as_f64()),
            Some(15.0)
        );
    }
}
