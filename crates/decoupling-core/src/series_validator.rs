// crates/decoupling-core/src/series_validator.rs

use std::collections::HashMap;

use polars::prelude::*;

use crate::config::{ExtentBand, ValidationConfig};
use crate::frame::{
    measure_gaps, missing_count, optional_float_values, optional_string_values, MeasureGaps,
};
use crate::issue::{error_free, Issue, IssueCategory};
use crate::period::PeriodKey;
use crate::schema::{
    SeriesKind, HEATING_DEGREE_DAYS, NOMINAL_PRICE, PERIOD, PRICE_INDEX, REAL_PRICE,
};
use crate::stats::present;

const MAX_LISTED_KEYS: usize = 10;

#[derive(Debug, Clone)]
pub struct SeriesValidation {
    pub kind: SeriesKind,
    pub ok: bool,
    pub issues: Vec<Issue>,
}

pub fn validate_series(df: &DataFrame, kind: SeriesKind, config: &ValidationConfig) -> SeriesValidation {
    let mut issues = check_declared_columns(df, kind);
    issues.extend(guard("date format", check_date_format(df, kind)));
    issues.extend(guard("completeness", check_completeness(df, kind)));
    issues.extend(guard("plausibility", check_plausibility(df, kind, config)));
    if kind == SeriesKind::Price {
        issues.extend(guard(
            "derived value",
            check_derived_consistency(df, config.derived_tolerance),
        ));
    }
    issues.extend(guard("duplicate key", check_duplicates(df)));

    SeriesValidation {
        kind,
        ok: error_free(&issues),
        issues,
    }
}

/// Turns a check that could not run at all into an ERROR issue.
pub(crate) fn guard(check: &str, result: PolarsResult<Vec<Issue>>) -> Vec<Issue> {
    match result {
        Ok(issues) => issues,
        Err(err) => vec![Issue::error(
            IssueCategory::Schema,
            format!("{check} check could not run: {err}"),
        )],
    }
}

pub fn check_declared_columns(df: &DataFrame, kind: SeriesKind) -> Vec<Issue> {
    let missing: Vec<&str> = kind
        .declared_columns()
        .iter()
        .copied()
        .filter(|name| df.get_column_index(name).is_none())
        .collect();

    if missing.is_empty() {
        Vec::new()
    } else {
        vec![Issue::error(
            IssueCategory::Schema,
            format!(
                "{} series is missing declared columns: {}",
                kind.label(),
                missing.join(", ")
            ),
        )
        .with_evidence(missing.len() as f64)]
    }
}

pub fn check_date_format(df: &DataFrame, kind: SeriesKind) -> PolarsResult<Vec<Issue>> {
    let Some(periods) = optional_string_values(df, PERIOD)? else {
        return Ok(Vec::new());
    };

    let invalid: Vec<&str> = periods
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|key| key.parse::<PeriodKey>().is_err())
        .collect();

    if invalid.is_empty() {
        let checked = periods.iter().flatten().count();
        return Ok(vec![Issue::pass(
            IssueCategory::Format,
            format!(
                "All {checked} {} dates are valid format (YYYY-MM)",
                kind.label()
            ),
        )]);
    }

    Ok(vec![Issue::warn(
        IssueCategory::Format,
        format!(
            "{} invalid date formats found: {}",
            invalid.len(),
            list_keys(&invalid)
        ),
    )
    .with_evidence(invalid.len() as f64)])
}

/// Nulls in any declared column, plus measure cells that hold no number
/// (e.g. FRED's `.` marker, which makes the column read as text).
pub fn check_completeness(df: &DataFrame, kind: SeriesKind) -> PolarsResult<Vec<Issue>> {
    let mut counts = Vec::new();
    for name in kind.declared_columns() {
        if df.get_column_index(name).is_none() {
            continue;
        }
        let gaps = if *name == PERIOD {
            MeasureGaps {
                missing: missing_count(df, name)?,
                non_numeric: 0,
            }
        } else {
            measure_gaps(df, name)?
        };
        counts.push((*name, gaps));
    }

    let total: usize = counts.iter().map(|(_, gaps)| gaps.total()).sum();
    if total == 0 {
        return Ok(vec![Issue::pass(
            IssueCategory::Completeness,
            format!("No missing values in {} data", kind.label()),
        )]);
    }

    Ok(vec![Issue::error(
        IssueCategory::Completeness,
        format!("Missing values detected: {}", describe_gaps(&counts)),
    )
    .with_evidence(total as f64)])
}

/// `name=n` per column; non-numeric cells are called out separately.
pub(crate) fn describe_gaps(counts: &[(&str, MeasureGaps)]) -> String {
    counts
        .iter()
        .map(|(name, gaps)| match gaps.non_numeric {
            0 => format!("{name}={}", gaps.total()),
            n => format!("{name}={} ({n} non-numeric)", gaps.total()),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn check_plausibility(
    df: &DataFrame,
    kind: SeriesKind,
    config: &ValidationConfig,
) -> PolarsResult<Vec<Issue>> {
    match kind {
        SeriesKind::Price => {
            let mut issues = Vec::new();
            for (name, band) in [
                (NOMINAL_PRICE, &config.nominal_price),
                (PRICE_INDEX, &config.price_index),
            ] {
                if let Some(values) = optional_float_values(df, name)? {
                    issues.extend(check_extent(name, &present(&values), band));
                }
            }
            Ok(issues)
        }
        SeriesKind::Climate => {
            let Some(values) = optional_float_values(df, HEATING_DEGREE_DAYS)? else {
                return Ok(Vec::new());
            };
            let periods = optional_string_values(df, PERIOD)?;
            Ok(check_climate_bounds(
                &values,
                periods.as_deref(),
                config.hdd_upper_bound,
            ))
        }
    }
}

fn check_extent(name: &str, values: &[f64], band: &ExtentBand) -> Vec<Issue> {
    let Some((min, max)) = extent(values) else {
        return vec![Issue::info(
            IssueCategory::Range,
            format!("{name}: no values to range-check"),
        )];
    };

    if band.min.contains(min) && band.max.contains(max) {
        vec![Issue::pass(
            IssueCategory::Range,
            format!("{name} in reasonable range: {min:.2} - {max:.2}"),
        )]
    } else {
        vec![Issue::warn(
            IssueCategory::Range,
            format!(
                "{name} may be unusual: {min:.2} - {max:.2} (expected min in ({}, {}), max in ({}, {}))",
                band.min.low, band.min.high, band.max.low, band.max.high
            ),
        )]
    }
}

fn check_climate_bounds(
    values: &[Option<f64>],
    periods: Option<&[Option<String>]>,
    upper_bound: f64,
) -> Vec<Issue> {
    let present_values = present(values);
    let Some((min, max)) = extent(&present_values) else {
        return vec![Issue::info(
            IssueCategory::Range,
            format!("{HEATING_DEGREE_DAYS}: no values to range-check"),
        )];
    };

    let mut issues = Vec::with_capacity(3);

    if min < 0.0 {
        let negatives = present_values.iter().filter(|v| **v < 0.0).count();
        issues.push(
            Issue::error(
                IssueCategory::Range,
                format!("{negatives} negative HDD values found (minimum {min})"),
            )
            .with_evidence(min),
        );
    } else {
        issues.push(Issue::pass(
            IssueCategory::Range,
            "No negative HDD values (physically correct)",
        ));
    }

    if min >= 0.0 && max < upper_bound {
        issues.push(Issue::pass(
            IssueCategory::Range,
            format!("HDD range is reasonable: {min:.0} - {max:.0}"),
        ));
    } else {
        issues.push(Issue::warn(
            IssueCategory::Range,
            format!("HDD range seems unusual: {min:.0} - {max:.0} (expected [0, {upper_bound}))"),
        ));
    }

    let zero_rows: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == Some(0.0))
        .map(|(idx, _)| idx)
        .collect();
    if !zero_rows.is_empty() {
        let examples: Vec<String> = zero_rows
            .iter()
            .take(3)
            .map(|&idx| {
                periods
                    .and_then(|p| p.get(idx).cloned().flatten())
                    .unwrap_or_else(|| format!("row {idx}"))
            })
            .collect();
        issues.push(
            Issue::info(
                IssueCategory::Range,
                format!(
                    "{} zero HDD months (expected for summer): e.g., {}",
                    zero_rows.len(),
                    examples.join(", ")
                ),
            )
            .with_evidence(zero_rows.len() as f64),
        );
    }

    issues
}

pub fn check_derived_consistency(df: &DataFrame, tolerance: f64) -> PolarsResult<Vec<Issue>> {
    let (Some(nominal), Some(index), Some(real)) = (
        optional_float_values(df, NOMINAL_PRICE)?,
        optional_float_values(df, PRICE_INDEX)?,
        optional_float_values(df, REAL_PRICE)?,
    ) else {
        return Ok(Vec::new());
    };

    let mut compared = 0usize;
    let mut max_dev = 0.0f64;
    for ((n, i), r) in nominal.iter().zip(&index).zip(&real) {
        let (Some(n), Some(i), Some(r)) = (n, i, r) else {
            continue;
        };
        compared += 1;
        let dev = (r - n / i).abs();
        let dev = if dev.is_nan() { f64::INFINITY } else { dev };
        max_dev = max_dev.max(dev);
    }

    if compared == 0 {
        return Ok(vec![Issue::info(
            IssueCategory::Calculation,
            "No complete rows to verify the real price calculation",
        )]);
    }

    if max_dev < tolerance {
        Ok(vec![Issue::pass(
            IssueCategory::Calculation,
            "Real price calculation verified (correct deflation)",
        )
        .with_evidence(max_dev)])
    } else {
        Ok(vec![Issue::error(
            IssueCategory::Calculation,
            format!("Real price calculation discrepancy: max diff = {max_dev:.2e}"),
        )
        .with_evidence(max_dev)])
    }
}

pub fn check_duplicates(df: &DataFrame) -> PolarsResult<Vec<Issue>> {
    let Some(periods) = optional_string_values(df, PERIOD)? else {
        return Ok(Vec::new());
    };

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut repeated: Vec<&str> = Vec::new();
    let mut excess = 0usize;
    for key in periods.iter().flatten() {
        let count = seen.entry(key.as_str()).or_insert(0);
        *count += 1;
        if *count > 1 {
            excess += 1;
            if *count == 2 {
                repeated.push(key.as_str());
            }
        }
    }

    if excess == 0 {
        return Ok(vec![Issue::pass(
            IssueCategory::DuplicateKey,
            format!("No duplicate {PERIOD} entries"),
        )]);
    }

    Ok(vec![Issue::error(
        IssueCategory::DuplicateKey,
        format!(
            "{excess} duplicate {PERIOD} entries found: {}",
            list_keys(&repeated)
        ),
    )
    .with_evidence(excess as f64)])
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(min, max), &v| (min.min(v), max.max(v))),
    )
}

fn list_keys(keys: &[&str]) -> String {
    let shown = keys
        .iter()
        .take(MAX_LISTED_KEYS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    if keys.len() > MAX_LISTED_KEYS {
        format!("{shown} (+{} more)", keys.len() - MAX_LISTED_KEYS)
    } else {
        shown
    }
}
