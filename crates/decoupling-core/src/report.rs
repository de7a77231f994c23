// crates/decoupling-core/src/report.rs

use chrono::Local;
use polars::prelude::DataFrame;
use serde::Serialize;

use crate::config::ValidationConfig;
use crate::frame::{optional_float_values, optional_string_values, period_range};
use crate::issue::{Issue, Severity};
use crate::logger::ReportLogger;
use crate::outliers::{detect_outliers, OutlierScan};
use crate::panel_validator::validate_panel;
use crate::schema::{SeriesKind, HEATING_DEGREE_DAYS, NOMINAL_PRICE, PERIOD};
use crate::series_validator::validate_series;
use crate::stats::{mean, present, std_dev};

#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub name: String,
    pub ok: bool,
    pub issues: Vec<Issue>,
}

impl DatasetReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity() == severity).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureSummary {
    pub column: String,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    pub rows: usize,
    pub first_period: Option<String>,
    pub last_period: Option<String>,
    pub measures: Vec<MeasureSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub generated_at: String,
    pub price: DatasetReport,
    pub climate: DatasetReport,
    pub panel: DatasetReport,
    pub outliers: OutlierScan,
    pub summaries: Vec<DatasetSummary>,
    pub verdict: bool,
}

impl QualityReport {
    pub fn datasets(&self) -> [&DatasetReport; 3] {
        [&self.price, &self.climate, &self.panel]
    }

    pub fn error_count(&self) -> usize {
        self.datasets()
            .iter()
            .map(|d| d.count(Severity::Error))
            .sum()
    }

    pub fn all_issues(&self) -> impl Iterator<Item = &Issue> {
        self.datasets()
            .into_iter()
            .flat_map(|d| d.issues.iter())
            .chain(self.outliers.issues.iter())
    }
}

/// Runs both series validators, the panel validator and the outlier scan in
/// that order, logging every issue under a section header. Never fails; the
/// caller decides what a failing verdict means.
pub fn generate_quality_report(
    price: &DataFrame,
    climate: &DataFrame,
    panel: &DataFrame,
    config: &ValidationConfig,
    logger: &mut ReportLogger,
) -> QualityReport {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    logger.section("DATA QUALITY VALIDATION REPORT");
    logger.info(format!("Report generated: {generated_at}"));

    logger.info("--- Price series validation ---");
    let price_result = validate_series(price, SeriesKind::Price, config);
    log_issues(logger, &price_result.issues);

    logger.info("--- Climate series validation ---");
    let climate_result = validate_series(climate, SeriesKind::Climate, config);
    log_issues(logger, &climate_result.issues);

    logger.info("--- Merged panel validation ---");
    let panel_result = validate_panel(panel, price, climate, config);
    log_issues(logger, &panel_result.issues);

    logger.section("OUTLIER DETECTION ANALYSIS");
    let outliers = detect_outliers(panel, &config.outliers.columns, &config.outliers);
    log_issues(logger, &outliers.issues);

    logger.section("SUMMARY STATISTICS");
    let summaries = vec![
        summarize("price", price, &[NOMINAL_PRICE]),
        summarize("climate", climate, &[HEATING_DEGREE_DAYS]),
        summarize("merged", panel, &[NOMINAL_PRICE, HEATING_DEGREE_DAYS]),
    ];
    for summary in &summaries {
        log_summary(logger, summary);
    }

    let report = QualityReport {
        generated_at,
        price: DatasetReport {
            name: "price".to_string(),
            ok: price_result.ok,
            issues: price_result.issues,
        },
        climate: DatasetReport {
            name: "climate".to_string(),
            ok: climate_result.ok,
            issues: climate_result.issues,
        },
        panel: DatasetReport {
            name: "merged".to_string(),
            ok: panel_result.ok,
            issues: panel_result.issues,
        },
        outliers,
        summaries,
        verdict: price_result.ok && climate_result.ok && panel_result.ok,
    };

    log_verdict(logger, &report);
    report
}

fn log_issues(logger: &mut ReportLogger, issues: &[Issue]) {
    for issue in issues {
        logger.issue(issue);
    }
}

pub fn summarize(name: &str, df: &DataFrame, measures: &[&str]) -> DatasetSummary {
    let range = optional_string_values(df, PERIOD)
        .ok()
        .flatten()
        .and_then(|periods| period_range(&periods));
    let (first_period, last_period) = match range {
        Some((first, last)) => (Some(first), Some(last)),
        None => (None, None),
    };

    let measures = measures
        .iter()
        .filter_map(|column| {
            let values = present(&optional_float_values(df, column).ok()??);
            Some(MeasureSummary {
                column: column.to_string(),
                mean: mean(&values),
                std_dev: std_dev(&values),
            })
        })
        .collect();

    DatasetSummary {
        name: name.to_string(),
        rows: df.height(),
        first_period,
        last_period,
        measures,
    }
}

fn log_summary(logger: &mut ReportLogger, summary: &DatasetSummary) {
    logger.info(format!("{} data summary:", summary.name));
    logger.info(format!("  Rows: {}", summary.rows));
    if let (Some(first), Some(last)) = (&summary.first_period, &summary.last_period) {
        logger.info(format!("  Date range: {first} to {last}"));
    }
    for measure in &summary.measures {
        let (prefix, precision) = if measure.column == NOMINAL_PRICE {
            ("$", 2)
        } else {
            ("", 1)
        };
        let fmt = |v: Option<f64>| match v {
            Some(v) => format!("{prefix}{v:.precision$}"),
            None => "n/a".to_string(),
        };
        logger.info(format!("  Mean {}: {}", measure.column, fmt(measure.mean)));
        logger.info(format!("  Std dev {}: {}", measure.column, fmt(measure.std_dev)));
    }
}

fn log_verdict(logger: &mut ReportLogger, report: &QualityReport) {
    logger.info("=".repeat(60));
    if report.verdict {
        logger.pass("DATA VALIDATION PASSED - Data is ready for analysis");
    } else {
        logger.warn("DATA VALIDATION COMPLETED WITH ERRORS");
    }
    for dataset in report.datasets() {
        logger.info(format!(
            "  {} issues: {} errors, {} warnings",
            dataset.name,
            dataset.count(Severity::Error),
            dataset.count(Severity::Warn)
        ));
    }
    logger.info("=".repeat(60));
}
