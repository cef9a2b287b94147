//! Plain-text rendering of aggregates.

use std::fmt::{self, Display, Write};

use crate::aggregate::{BucketAggregate, EntityAggregate, Stats, Summary, ranked};
use crate::reading::{Reading, TIMESTAMP_FORMAT};

/// Formats aggregates as a human-readable report. Pure: never touches storage.
#[derive(Debug, Clone)]
pub struct Reporter {
    /// Banner title.
    pub title: String,
    /// Unit suffix for values; empty for none.
    pub unit: String,
    /// Decimal places.
    pub precision: usize,
    /// Entities shown in the ranking, `0` for all.
    pub top: usize,
}

impl Default for Reporter {
    fn default() -> Self {
        Self {
            title: "SUMMARY REPORT".to_string(),
            unit: String::new(),
            precision: 2,
            top: 0,
        }
    }
}

impl Reporter {
    /// Renders entity and bucket aggregates plus the peak reading.
    ///
    /// An empty `entities` slice yields the banner and a "no data" line.
    pub fn format<K: Display>(
        &self,
        entities: &[EntityAggregate],
        buckets: &[BucketAggregate<K>],
        peak: Option<&Reading>,
    ) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_report(&mut out, entities, buckets, "Bucket", peak, None);
        out
    }

    /// Renders a full [`Summary`], including the statistics line.
    pub fn render(&self, summary: &Summary) -> String {
        let mut out = String::new();
        let _ = self.write_report(
            &mut out,
            &summary.entities,
            &summary.buckets,
            summary.bucket.label(),
            summary.peak.as_ref(),
            summary.stats.as_ref(),
        );
        out
    }

    fn write_report<K: Display>(
        &self,
        out: &mut String,
        entities: &[EntityAggregate],
        buckets: &[BucketAggregate<K>],
        bucket_heading: &str,
        peak: Option<&Reading>,
        stats: Option<&Stats>,
    ) -> fmt::Result {
        let rule = "=".repeat(self.title.chars().count() + 4);
        writeln!(out, "{rule}")?;
        writeln!(out, "  {}", self.title)?;
        writeln!(out, "{rule}")?;
        writeln!(out)?;

        if entities.is_empty() {
            return writeln!(out, "No data: 0 readings.");
        }

        let total: f64 = entities.iter().map(|e| e.total).sum();
        let readings: usize = entities.iter().map(|e| e.count).sum();
        let ranking = ranked(entities);

        writeln!(out, "Total:            {}", self.qty(total))?;
        writeln!(out, "Readings:         {readings}")?;
        if let Some(top) = ranking.first() {
            writeln!(out, "Highest entity:   {} ({})", top.entity, self.qty(top.total))?;
        }
        if let Some(p) = peak {
            writeln!(
                out,
                "Peak reading:     {} at {} ({})",
                p.entity,
                p.timestamp.format(TIMESTAMP_FORMAT),
                self.qty(p.value)
            )?;
        }
        if let Some(s) = stats {
            writeln!(out, "Statistics:       {s:.prec$}", prec = self.precision)?;
        }

        writeln!(out)?;
        writeln!(out, "--- Ranking ---")?;
        let shown = if self.top == 0 {
            ranking.len()
        } else {
            self.top.min(ranking.len())
        };
        let width = entity_width(entities);
        for (i, agg) in ranking.iter().take(shown).enumerate() {
            writeln!(
                out,
                "{:>3}. {:<width$}  {}",
                i + 1,
                agg.entity,
                self.qty(agg.total)
            )?;
        }

        writeln!(out)?;
        writeln!(out, "--- Entities ---")?;
        for agg in entities {
            writeln!(out, "{}", agg.entity)?;
            writeln!(out, "  Total:    {}", self.qty(agg.total))?;
            writeln!(out, "  Average:  {}", self.qty(agg.average()))?;
            writeln!(out, "  Readings: {}", agg.count)?;
            writeln!(
                out,
                "  Min/Max:  {:.p$} / {}",
                agg.min,
                self.qty(agg.max),
                p = self.precision
            )?;
        }

        if !buckets.is_empty() {
            writeln!(out)?;
            writeln!(out, "--- {bucket_heading} totals ---")?;
            for b in buckets {
                writeln!(
                    out,
                    "{:<width$}  {:<12}  {}",
                    b.entity,
                    b.bucket.to_string(),
                    self.qty(b.sum)
                )?;
            }
        }

        Ok(())
    }

    fn qty(&self, value: f64) -> String {
        if self.unit.is_empty() {
            format!("{value:.p$}", p = self.precision)
        } else {
            format!("{value:.p$} {}", self.unit, p = self.precision)
        }
    }
}

fn entity_width(entities: &[EntityAggregate]) -> usize {
    entities
        .iter()
        .map(|e| e.entity.chars().count())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Bucket, by_bucket, by_entity, peak};
    use crate::reading::ReadingStore;

    fn campus_store() -> ReadingStore {
        let mut store = ReadingStore::new();
        store.add("Library", "2024-01-01 10:00", "12").expect("reading should be accepted");
        store.add("Library", "2024-01-02 11:00", "18").expect("reading should be accepted");
        store.add("Admin", "2024-01-01 09:00", "25").expect("reading should be accepted");
        store
    }

    fn energy_reporter() -> Reporter {
        Reporter {
            title: "CAMPUS ENERGY SUMMARY REPORT".to_string(),
            unit: "kWh".to_string(),
            ..Reporter::default()
        }
    }

    #[test]
    fn peak_keeps_seconds() {
        let mut store = ReadingStore::new();
        store.add("Gym", "2024-01-02 10:00:45", "9").expect("reading should be accepted");
        let entities = by_entity(store.all());
        let text = energy_reporter().format::<String>(&entities, &[], peak(store.all()));
        assert!(text.contains("Peak reading:     Gym at 2024-01-02 10:00:45 (9.00 kWh)"));
    }

    #[test]
    fn report_lists_totals_peak_and_ranking() {
        let store = campus_store();
        let entities = by_entity(store.all());
        let buckets = by_bucket(store.all(), |ts| Bucket::Day.key(ts));
        let text = energy_reporter().format(&entities, &buckets, peak(store.all()));

        assert!(text.contains("CAMPUS ENERGY SUMMARY REPORT"));
        assert!(text.contains("Total:            55.00 kWh"));
        assert!(text.contains("Highest entity:   Library (30.00 kWh)"));
        assert!(text.contains("Peak reading:     Admin at 2024-01-01 09:00:00 (25.00 kWh)"));
        assert!(text.contains("  1. Library  30.00 kWh"));
        assert!(text.contains("  2. Admin    25.00 kWh"));
        assert!(text.contains("  Average:  15.00 kWh"));
        assert!(text.contains("--- Bucket totals ---"));
    }

    #[test]
    fn empty_report_says_no_data() {
        let text = energy_reporter().format::<String>(&[], &[], None);
        assert!(text.contains("No data: 0 readings."));
        assert!(!text.contains("Ranking"));
    }

    #[test]
    fn render_uses_bucket_label_and_stats() {
        let store = campus_store();
        let summary = Summary::from_readings(store.all(), Bucket::Week);
        let text = energy_reporter().render(&summary);
        assert!(text.contains("--- Weekly totals ---"));
        assert!(text.contains("Statistics:       n=3"));
        assert!(text.contains("2024-W01"));
    }

    #[test]
    fn top_limits_ranking() {
        let store = campus_store();
        let entities = by_entity(store.all());
        let reporter = Reporter {
            top: 1,
            ..energy_reporter()
        };
        let text = reporter.format::<String>(&entities, &[], None);
        assert!(text.contains("  1. Library"));
        assert!(!text.contains("  2. Admin"));
    }

    #[test]
    fn formatting_is_deterministic() {
        let store = campus_store();
        let a = energy_reporter().render(&Summary::from_readings(store.all(), Bucket::Day));
        let b = energy_reporter().render(&Summary::from_readings(store.all(), Bucket::Day));
        assert_eq!(a, b);
    }
}
