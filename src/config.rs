//! TOML-based run configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::aggregate::Bucket;
use crate::reading::MissingValuePolicy;
use crate::report::Reporter;

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults matching the campus energy preset. Load from
/// TOML with [`TallyConfig::from_toml_file`] or pick a preset with
/// [`TallyConfig::from_preset`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    /// Column mapping for the CSV loader.
    #[serde(default)]
    pub input: InputConfig,
    /// Bucketing and missing-value handling.
    #[serde(default)]
    pub aggregation: AggregationConfig,
    /// Text report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Column mapping for the CSV loader.
///
/// Without an `[input]` table the campus energy mapping applies. A written
/// `[input]` table reads an entity column only when `entity_column` is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Header of the timestamp column.
    pub timestamp_column: String,
    /// Header of the numeric value column.
    pub value_column: String,
    /// Header of the entity column. `None` uses `default_entity`.
    #[serde(default)]
    pub entity_column: Option<String>,
    /// Entity name when no entity column is configured. Empty means the
    /// file stem of each input file.
    pub default_entity: String,
    /// Extra `chrono` format strings tried after the built-in ones.
    pub timestamp_formats: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timestamp_column: "timestamp".to_string(),
            value_column: "kwh".to_string(),
            entity_column: Some("building".to_string()),
            default_entity: String::new(),
            timestamp_formats: Vec::new(),
        }
    }
}

/// Bucketing and missing-value handling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregationConfig {
    /// Bucket granularity: `day`, `week`, `month`, `year` or `season`.
    pub bucket: String,
    /// Missing-value policy: `skip`, `zero` or `entity_mean`.
    pub missing_values: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            bucket: "day".to_string(),
            missing_values: "skip".to_string(),
        }
    }
}

impl AggregationConfig {
    /// Parsed bucket strategy.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `bucket` is not a known strategy.
    pub fn bucket(&self) -> Result<Bucket, ConfigError> {
        self.bucket.parse().map_err(|message| ConfigError {
            field: "aggregation.bucket".into(),
            message,
        })
    }

    /// Parsed missing-value policy.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `missing_values` is not a known policy.
    pub fn missing_values(&self) -> Result<MissingValuePolicy, ConfigError> {
        self.missing_values.parse().map_err(|message| ConfigError {
            field: "aggregation.missing_values".into(),
            message,
        })
    }
}

/// Text report settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Banner title.
    pub title: String,
    /// Unit label appended to values.
    pub unit: String,
    /// Decimal places for values.
    pub precision: usize,
    /// Number of entities in the ranking (0 = all).
    pub top: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "CAMPUS ENERGY SUMMARY REPORT".to_string(),
            unit: "kWh".to_string(),
            precision: 2,
            top: 0,
        }
    }
}

impl ReportConfig {
    /// Builds a [`Reporter`] from these settings.
    pub fn reporter(&self) -> Reporter {
        Reporter {
            title: self.title.clone(),
            unit: self.unit.clone(),
            precision: self.precision,
            top: self.top,
        }
    }
}

/// Maximum supported decimal places in the report.
const MAX_PRECISION: usize = 6;

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"aggregation.bucket"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl TallyConfig {
    /// Campus energy dashboard: per-building kWh readings, daily buckets.
    pub fn campus_energy() -> Self {
        Self {
            input: InputConfig::default(),
            aggregation: AggregationConfig::default(),
            report: ReportConfig::default(),
        }
    }

    /// Single-station rainfall: missing cells count as no rain, monthly buckets.
    pub fn rainfall() -> Self {
        Self {
            input: InputConfig {
                timestamp_column: "Date".to_string(),
                value_column: "Rainfall".to_string(),
                entity_column: None,
                default_entity: "station".to_string(),
                ..InputConfig::default()
            },
            aggregation: AggregationConfig {
                bucket: "month".to_string(),
                missing_values: "zero".to_string(),
            },
            report: ReportConfig {
                title: "RAINFALL SUMMARY REPORT".to_string(),
                unit: "mm".to_string(),
                ..ReportConfig::default()
            },
        }
    }

    /// Single-station temperature: gaps filled with the station mean, seasonal buckets.
    pub fn temperature() -> Self {
        Self {
            input: InputConfig {
                timestamp_column: "Date".to_string(),
                value_column: "Temperature".to_string(),
                entity_column: None,
                default_entity: "station".to_string(),
                ..InputConfig::default()
            },
            aggregation: AggregationConfig {
                bucket: "season".to_string(),
                missing_values: "entity_mean".to_string(),
            },
            report: ReportConfig {
                title: "TEMPERATURE SUMMARY REPORT".to_string(),
                unit: "°C".to_string(),
                ..ReportConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["campus_energy", "rainfall", "temperature"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "campus_energy" => Ok(Self::campus_energy()),
            "rainfall" => Ok(Self::rainfall()),
            "temperature" => Ok(Self::temperature()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let input = &self.input;

        if input.timestamp_column.trim().is_empty() {
            errors.push(ConfigError {
                field: "input.timestamp_column".into(),
                message: "must not be empty".into(),
            });
        }
        if input.value_column.trim().is_empty() {
            errors.push(ConfigError {
                field: "input.value_column".into(),
                message: "must not be empty".into(),
            });
        }
        if input
            .entity_column
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            errors.push(ConfigError {
                field: "input.entity_column".into(),
                message: "must not be empty when set".into(),
            });
        }

        if let Err(e) = self.aggregation.bucket() {
            errors.push(e);
        }
        if let Err(e) = self.aggregation.missing_values() {
            errors.push(e);
        }

        if self.report.precision > MAX_PRECISION {
            errors.push(ConfigError {
                field: "report.precision".into(),
                message: format!("must be <= {MAX_PRECISION}"),
            });
        }

        errors
    }
}
