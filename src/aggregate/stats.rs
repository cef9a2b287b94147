//! Descriptive statistics over a set of values.

use std::fmt;

use serde::Serialize;

/// Count, mean, extremes and population standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation (divides by `count`).
    pub std_dev: f64,
}

impl Stats {
    /// Computes statistics, or `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let mut sum = 0.0_f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        let mean = sum / n;
        let sq_sum: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();

        Some(Self {
            count: values.len(),
            mean,
            min,
            max,
            std_dev: (sq_sum / n).sqrt(),
        })
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = f.precision().unwrap_or(2);
        write!(
            f,
            "n={} mean={:.p$} min={:.p$} max={:.p$} std={:.p$}",
            self.count, self.mean, self.min, self.max, self.std_dev
        )
    }
}
