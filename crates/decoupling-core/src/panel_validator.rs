// crates/decoupling-core/src/panel_validator.rs

use std::collections::{BTreeSet, HashSet};

use polars::prelude::*;

use crate::config::{RowCountBand, ValidationConfig};
use crate::frame::{
    column_names, measure_gaps, missing_count, optional_float_values, optional_string_values,
    MeasureGaps,
};
use crate::issue::{error_free, Issue, IssueCategory};
use crate::schema::{HEATING_DEGREE_DAYS, MEASURE_COLUMNS, NOMINAL_PRICE, PANEL_COLUMNS, PERIOD};
use crate::series_validator::{describe_gaps, guard};
use crate::stats::pearson;

#[derive(Debug, Clone)]
pub struct PanelValidation {
    pub ok: bool,
    pub issues: Vec<Issue>,
}

/// `price` and `climate` are the sources the panel was merged from; they are
/// only read to trace panel periods back to their origin.
pub fn validate_panel(
    panel: &DataFrame,
    price: &DataFrame,
    climate: &DataFrame,
    config: &ValidationConfig,
) -> PanelValidation {
    let mut issues = check_schema(panel);
    issues.extend(guard("completeness", check_completeness(panel)));
    issues.extend(guard("chronological order", check_order(panel)));
    issues.push(check_row_count(panel.height(), &config.panel_rows));
    issues.extend(guard(
        "correlation",
        check_correlation(panel, config.correlation_threshold),
    ));
    issues.extend(guard("traceability", check_traceability(panel, price, climate)));

    PanelValidation {
        ok: error_free(&issues),
        issues,
    }
}

pub fn check_schema(panel: &DataFrame) -> Vec<Issue> {
    let actual: BTreeSet<String> = column_names(panel).into_iter().collect();
    let expected: BTreeSet<String> = PANEL_COLUMNS.iter().map(|c| c.to_string()).collect();

    if actual == expected {
        let listed = PANEL_COLUMNS.join(", ");
        return vec![Issue::pass(
            IssueCategory::Schema,
            format!("All expected columns present: {listed}"),
        )];
    }

    let mut issues = Vec::new();
    let missing: Vec<&String> = expected.difference(&actual).collect();
    let extra: Vec<&String> = actual.difference(&expected).collect();

    if !missing.is_empty() {
        issues.push(
            Issue::error(
                IssueCategory::Schema,
                format!("Missing columns: {}", join(&missing)),
            )
            .with_evidence(missing.len() as f64),
        );
    }
    if !extra.is_empty() {
        issues.push(
            Issue::warn(
                IssueCategory::Schema,
                format!("Extra columns: {}", join(&extra)),
            )
            .with_evidence(extra.len() as f64),
        );
    }
    issues
}

pub fn check_completeness(panel: &DataFrame) -> PolarsResult<Vec<Issue>> {
    let names = column_names(panel);
    let mut counts = Vec::with_capacity(names.len());
    for name in &names {
        let gaps = if MEASURE_COLUMNS.contains(&name.as_str()) {
            measure_gaps(panel, name)?
        } else {
            MeasureGaps {
                missing: missing_count(panel, name)?,
                non_numeric: 0,
            }
        };
        counts.push((name.as_str(), gaps));
    }

    let total: usize = counts.iter().map(|(_, gaps)| gaps.total()).sum();
    if total == 0 {
        return Ok(vec![Issue::pass(
            IssueCategory::Completeness,
            "No missing values in merged data",
        )]);
    }

    counts.retain(|(_, gaps)| gaps.total() > 0);
    Ok(vec![Issue::error(
        IssueCategory::Completeness,
        format!("Missing values detected: {}", describe_gaps(&counts)),
    )
    .with_evidence(total as f64)])
}

pub fn check_order(panel: &DataFrame) -> PolarsResult<Vec<Issue>> {
    let Some(periods) = optional_string_values(panel, PERIOD)? else {
        return Ok(Vec::new());
    };

    let keys: Vec<&String> = periods.iter().flatten().collect();
    let inversions = keys.windows(2).filter(|w| w[1] < w[0]).count();

    if inversions == 0 {
        Ok(vec![Issue::pass(
            IssueCategory::Ordering,
            "Dates are in chronological order",
        )])
    } else {
        Ok(vec![Issue::warn(
            IssueCategory::Ordering,
            format!("Dates not sorted ({inversions} inversions); downstream consumers may re-sort"),
        )
        .with_evidence(inversions as f64)])
    }
}

pub fn check_row_count(rows: usize, band: &RowCountBand) -> Issue {
    if band.contains(rows) {
        Issue::pass(
            IssueCategory::RowCount,
            format!("Row count is reasonable: {rows} rows"),
        )
        .with_evidence(rows as f64)
    } else {
        Issue::warn(
            IssueCategory::RowCount,
            format!(
                "Unexpected row count: {rows} (expected {}-{})",
                band.min, band.max
            ),
        )
        .with_evidence(rows as f64)
    }
}

pub fn check_correlation(panel: &DataFrame, threshold: f64) -> PolarsResult<Vec<Issue>> {
    let (Some(hdd), Some(price)) = (
        optional_float_values(panel, HEATING_DEGREE_DAYS)?,
        optional_float_values(panel, NOMINAL_PRICE)?,
    ) else {
        return Ok(Vec::new());
    };

    let Some(corr) = pearson(&price, &hdd) else {
        return Ok(vec![Issue::info(
            IssueCategory::Correlation,
            "Correlation between HDD and price is undefined (too few or constant values)",
        )]);
    };

    let mut issues = vec![Issue::info(
        IssueCategory::Correlation,
        format!("Correlation between HDD and price: {corr:.4}"),
    )
    .with_evidence(corr)];

    if corr.abs() > threshold {
        issues.push(
            Issue::warn(
                IssueCategory::Correlation,
                format!(
                    "Strong correlation between HDD and price ({corr:.4}, |r| > {threshold}); the variables may not carry independent information"
                ),
            )
            .with_evidence(corr),
        );
    } else {
        issues.push(Issue::info(
            IssueCategory::Correlation,
            "Moderate correlation suggests independence (good for analysis)",
        ));
    }
    Ok(issues)
}

/// Reports the source sizes, their expected overlap, and any panel period
/// that does not occur in both sources.
pub fn check_traceability(
    panel: &DataFrame,
    price: &DataFrame,
    climate: &DataFrame,
) -> PolarsResult<Vec<Issue>> {
    let (Some(panel_keys), Some(price_keys), Some(climate_keys)) = (
        optional_string_values(panel, PERIOD)?,
        optional_string_values(price, PERIOD)?,
        optional_string_values(climate, PERIOD)?,
    ) else {
        return Ok(vec![Issue::info(
            IssueCategory::Traceability,
            format!("Source traceability skipped: {PERIOD} missing from panel or sources"),
        )]);
    };

    let price_set: HashSet<&str> = price_keys.iter().flatten().map(String::as_str).collect();
    let climate_set: HashSet<&str> = climate_keys.iter().flatten().map(String::as_str).collect();
    let overlap = price_set.intersection(&climate_set).count();

    let mut issues = vec![Issue::info(
        IssueCategory::Traceability,
        format!(
            "Sources: price {} rows, climate {} rows, {overlap} overlapping periods; panel {} rows",
            price.height(),
            climate.height(),
            panel.height()
        ),
    )
    .with_evidence(overlap as f64)];

    let untraced: Vec<&str> = panel_keys
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|key| !price_set.contains(key) || !climate_set.contains(key))
        .collect();
    if !untraced.is_empty() {
        let shown = untraced.iter().take(10).copied().collect::<Vec<_>>().join(", ");
        issues.push(
            Issue::info(
                IssueCategory::Traceability,
                format!(
                    "{} panel periods are not present in both sources: {shown}",
                    untraced.len()
                ),
            )
            .with_evidence(untraced.len() as f64),
        );
    }

    Ok(issues)
}

fn join(names: &[&String]) -> String {
    names
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
