//! Validation thresholds.
//!
//! Every plausibility heuristic lives here rather than in the checks so a
//! different date range or data source only needs a new TOML file. The
//! defaults reproduce the bands tuned for the 2000-2025 Boston heating-oil
//! panel.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{HEATING_DEGREE_DAYS, NOMINAL_PRICE, REAL_PRICE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Exclusive interval `(low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenRange {
    pub low: f64,
    pub high: f64,
}

impl OpenRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        value > self.low && value < self.high
    }
}

/// Expected extent of a column: where its minimum and its maximum should land.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtentBand {
    pub min: OpenRange,
    pub max: OpenRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowCountBand {
    pub min: usize,
    pub max: usize,
}

impl RowCountBand {
    pub fn contains(&self, rows: usize) -> bool {
        rows >= self.min && rows <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    pub columns: Vec<String>,
    pub iqr_multiplier: f64,
    pub top_n: usize,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            columns: vec![
                NOMINAL_PRICE.to_string(),
                REAL_PRICE.to_string(),
                HEATING_DEGREE_DAYS.to_string(),
            ],
            iqr_multiplier: 1.5,
            top_n: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub nominal_price: ExtentBand,
    pub price_index: ExtentBand,
    /// Exclusive upper bound for heating-degree-days.
    pub hdd_upper_bound: f64,
    pub derived_tolerance: f64,
    pub panel_rows: RowCountBand,
    pub correlation_threshold: f64,
    pub outliers: OutlierConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            nominal_price: ExtentBand {
                min: OpenRange::new(0.0, 1.0),
                max: OpenRange::new(3.0, 7.0),
            },
            price_index: ExtentBand {
                min: OpenRange::new(60.0, 80.0),
                max: OpenRange::new(300.0, 340.0),
            },
            hdd_upper_bound: 2000.0,
            derived_tolerance: 1e-10,
            panel_rows: RowCountBand { min: 300, max: 320 },
            correlation_threshold: 0.5,
            outliers: OutlierConfig::default(),
        }
    }
}

impl ValidationConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.panel_rows.min > self.panel_rows.max {
            return Err(ConfigError::Invalid(format!(
                "panel_rows.min ({}) exceeds panel_rows.max ({})",
                self.panel_rows.min, self.panel_rows.max
            )));
        }
        if !(self.derived_tolerance > 0.0) {
            return Err(ConfigError::Invalid(
                "derived_tolerance must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.correlation_threshold) {
            return Err(ConfigError::Invalid(format!(
                "correlation_threshold {} must lie in [0, 1]",
                self.correlation_threshold
            )));
        }
        if !(self.outliers.iqr_multiplier >= 0.0) {
            return Err(ConfigError::Invalid(
                "outliers.iqr_multiplier must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
