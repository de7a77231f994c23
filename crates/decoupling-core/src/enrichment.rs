//! Analysis features derived from the merged panel.
//!
//! The transform is pure: the input frame is cloned and ten columns are
//! appended. Values that need history the panel does not have (first
//! difference of the first row, lags near the top) are nulls, never zero.

use chrono::Datelike;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::frame::{float_values, has_column, string_values};
use crate::period::PeriodKey;
use crate::schema::{
    DATE, ENRICHED_COLUMNS, HDD_CATEGORY, HDD_LAG1, HDD_LAG3, HEATING_DEGREE_DAYS, MONTH, PERIOD,
    PRICE_CHANGE, PRICE_MA3, PRICE_PCT_CHANGE, QUARTER, REAL_PRICE, YEAR,
};

/// Days from 0001-01-01 (CE) to 1970-01-01; polars dates count from the latter.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error("panel is missing required column {0}")]
    MissingColumn(&'static str),
}

/// Winter severity bucket for monthly heating-degree-days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HddCategory {
    VeryLow,
    Low,
    High,
    VeryHigh,
}

impl HddCategory {
    /// Buckets are right-closed: `[0, 50]`, `(50, 300]`, `(300, 800]`,
    /// `(800, 1500]`. Values past either end fall into the nearest bucket.
    pub fn classify(hdd: f64) -> Self {
        if hdd <= 50.0 {
            HddCategory::VeryLow
        } else if hdd <= 300.0 {
            HddCategory::Low
        } else if hdd <= 800.0 {
            HddCategory::High
        } else {
            HddCategory::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HddCategory::VeryLow => "very-low",
            HddCategory::Low => "low",
            HddCategory::High => "high",
            HddCategory::VeryHigh => "very-high",
        }
    }
}

pub fn enrich_panel(panel: &DataFrame) -> Result<DataFrame, EnrichmentError> {
    for name in [PERIOD, REAL_PRICE, HEATING_DEGREE_DAYS] {
        if !has_column(panel, name) {
            return Err(EnrichmentError::MissingColumn(name));
        }
    }

    let periods = string_values(panel, PERIOD)?;
    let real_price = float_values(panel, REAL_PRICE)?;
    let hdd = float_values(panel, HEATING_DEGREE_DAYS)?;

    // Keys that fail to parse were already reported by the format check;
    // their calendar columns stay null.
    let keys: Vec<Option<PeriodKey>> = periods
        .iter()
        .map(|p| p.as_deref().and_then(|s| s.parse().ok()))
        .collect();

    let dates: Vec<Option<i32>> = keys
        .iter()
        .map(|key| {
            key.and_then(|k| k.first_day())
                .map(|d| d.num_days_from_ce() - EPOCH_DAYS_FROM_CE)
        })
        .collect();
    let years: Vec<Option<i32>> = keys.iter().map(|k| k.map(|k| k.year())).collect();
    let months: Vec<Option<i32>> = keys.iter().map(|k| k.map(|k| k.month() as i32)).collect();
    let quarters: Vec<Option<i32>> = keys.iter().map(|k| k.map(|k| k.quarter() as i32)).collect();

    let categories: Vec<Option<&str>> = hdd
        .iter()
        .map(|v| v.map(|x| HddCategory::classify(x).label()))
        .collect();

    let columns: Vec<Column> = vec![
        Series::new(DATE.into(), dates).cast(&DataType::Date)?.into(),
        Series::new(YEAR.into(), years).into(),
        Series::new(MONTH.into(), months).into(),
        Series::new(QUARTER.into(), quarters).into(),
        Series::new(PRICE_CHANGE.into(), first_difference(&real_price)).into(),
        Series::new(PRICE_PCT_CHANGE.into(), pct_change(&real_price)).into(),
        Series::new(PRICE_MA3.into(), trailing_mean(&real_price, 3)).into(),
        Series::new(HDD_CATEGORY.into(), categories).into(),
        Series::new(HDD_LAG1.into(), lag(&hdd, 1)).into(),
        Series::new(HDD_LAG3.into(), lag(&hdd, 3)).into(),
    ];

    let mut output = panel.clone();
    output.hstack_mut(&columns)?;

    debug!(added = ?ENRICHED_COLUMNS, rows = output.height(), "panel enriched");
    Ok(output)
}

/// `x[i] - x[i-1]`; null for the first row or when either side is null.
pub fn first_difference(values: &[Option<f64>]) -> Vec<Option<f64>> {
    pairwise(values, |prev, curr| Some(curr - prev))
}

/// `(x[i] - x[i-1]) / x[i-1]`; null where the previous value is zero.
pub fn pct_change(values: &[Option<f64>]) -> Vec<Option<f64>> {
    pairwise(values, |prev, curr| {
        if prev == 0.0 {
            None
        } else {
            Some((curr - prev) / prev)
        }
    })
}

fn pairwise(values: &[Option<f64>], f: impl Fn(f64, f64) -> Option<f64>) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    for window in values.windows(2) {
        let value = match (window[0], window[1]) {
            (Some(prev), Some(curr)) => f(prev, curr),
            _ => None,
        };
        out.push(value);
    }
    out
}

/// Mean of the current and `window - 1` preceding values; null until a full
/// window of present values is available.
pub fn trailing_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|idx| {
            if window == 0 || idx + 1 < window {
                return None;
            }
            let slice = &values[idx + 1 - window..=idx];
            let sum = slice.iter().try_fold(0.0, |acc, v| v.map(|v| acc + v))?;
            Some(sum / window as f64)
        })
        .collect()
}

/// Value `periods` rows earlier; null where that row does not exist.
pub fn lag(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|idx| idx.checked_sub(periods).and_then(|src| values[src]))
        .collect()
}
