// crates/decoupling-core/src/outliers.rs

// Detection is advisory; rows are never removed.

use polars::prelude::*;
use serde::Serialize;

use crate::config::OutlierConfig;
use crate::frame::{optional_float_values, optional_string_values};
use crate::issue::{Issue, IssueCategory};
use crate::schema::PERIOD;
use crate::stats::quantile_sorted;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierRow {
    pub row: usize,
    pub period: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// `None` when fewer than two values are present.
    pub fn from_values(values: &[Option<f64>], multiplier: f64) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
        if sorted.len() < 2 {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            iqr,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    pub fn is_outside(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnOutliers {
    pub column: String,
    pub bounds: IqrBounds,
    pub flagged: Vec<OutlierRow>,
    /// Largest flagged values by absolute magnitude.
    pub extremes: Vec<OutlierRow>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutlierScan {
    pub columns: Vec<ColumnOutliers>,
    pub issues: Vec<Issue>,
}

impl OutlierScan {
    pub fn column(&self, name: &str) -> Option<&ColumnOutliers> {
        self.columns.iter().find(|c| c.column == name)
    }

    pub fn flagged_total(&self) -> usize {
        self.columns.iter().map(|c| c.flagged.len()).sum()
    }
}

pub fn detect_outliers(panel: &DataFrame, columns: &[String], config: &OutlierConfig) -> OutlierScan {
    let periods = optional_string_values(panel, PERIOD).ok().flatten();

    let mut scan = OutlierScan::default();
    for name in columns {
        let values = match optional_float_values(panel, name) {
            Ok(Some(values)) => values,
            Ok(None) => {
                scan.issues.push(Issue::info(
                    IssueCategory::Outlier,
                    format!("{name}: column not present, outlier scan skipped"),
                ));
                continue;
            }
            Err(err) => {
                scan.issues.push(Issue::warn(
                    IssueCategory::Outlier,
                    format!("{name}: outlier scan could not read column: {err}"),
                ));
                continue;
            }
        };

        let Some(result) = scan_column(name, &values, periods.as_deref(), config) else {
            scan.issues.push(Issue::info(
                IssueCategory::Outlier,
                format!("{name}: fewer than two values, outlier scan skipped"),
            ));
            continue;
        };

        scan.issues.push(describe(&result));
        scan.columns.push(result);
    }
    scan
}

pub fn scan_column(
    name: &str,
    values: &[Option<f64>],
    periods: Option<&[Option<String>]>,
    config: &OutlierConfig,
) -> Option<ColumnOutliers> {
    let bounds = IqrBounds::from_values(values, config.iqr_multiplier)?;

    let flagged: Vec<OutlierRow> = values
        .iter()
        .enumerate()
        .filter_map(|(row, value)| {
            let value = (*value)?;
            bounds.is_outside(value).then(|| OutlierRow {
                row,
                period: periods.and_then(|p| p.get(row).cloned().flatten()),
                value,
            })
        })
        .collect();

    let mut extremes = flagged.clone();
    // Stable sort keeps row order among equal magnitudes.
    extremes.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
    extremes.truncate(config.top_n);

    Some(ColumnOutliers {
        column: name.to_string(),
        bounds,
        flagged,
        extremes,
    })
}

fn describe(result: &ColumnOutliers) -> Issue {
    let b = &result.bounds;
    if result.flagged.is_empty() {
        return Issue::pass(
            IssueCategory::Outlier,
            format!("{}: no statistical outliers detected", result.column),
        );
    }

    let extremes = result
        .extremes
        .iter()
        .map(|o| {
            let label = o.period.clone().unwrap_or_else(|| format!("row {}", o.row));
            format!("{label}: {:.6}", o.value)
        })
        .collect::<Vec<_>>()
        .join(", ");

    Issue::warn(
        IssueCategory::Outlier,
        format!(
            "{}: IQR method: {} outliers detected; Q1={:.4}, Q3={:.4}, IQR={:.4}; bounds [{:.4}, {:.4}]; most extreme: {extremes}",
            result.column,
            result.flagged.len(),
            b.q1,
            b.q3,
            b.iqr,
            b.lower,
            b.upper
        ),
    )
    .with_evidence(result.flagged.len() as f64)
}
