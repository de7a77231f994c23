mod common;

use std::path::Path;

use common::{climate_frame, panel_frame, price_frame};
use decoupling_core::io::{read_table, write_table_atomic};
use decoupling_core::pipeline::{self, InputPaths};
use decoupling_core::{generate_quality_report, ReportLogger, Severity, ValidationConfig};
use polars::prelude::*;

fn write_inputs(dir: &Path, n: usize) -> InputPaths {
    let paths = InputPaths {
        price: dir.join("processed").join("fred_clean.csv"),
        climate: dir.join("processed").join("noaa_clean.csv"),
        panel: dir.join("final").join("final.csv"),
    };
    write_table_atomic(&paths.price, &price_frame(n)).unwrap();
    write_table_atomic(&paths.climate, &climate_frame(n)).unwrap();
    write_table_atomic(&paths.panel, &panel_frame(n)).unwrap();
    paths
}

#[test]
fn quarter_century_panel_passes_validation() {
    let mut logger = ReportLogger::in_memory();
    let report = generate_quality_report(
        &price_frame(312),
        &climate_frame(312),
        &panel_frame(312),
        &ValidationConfig::default(),
        &mut logger,
    );

    assert!(report.verdict);
    assert_eq!(report.error_count(), 0);
    assert!(report.all_issues().all(|i| i.severity() != Severity::Error));

    let merged = &report.summaries[2];
    assert_eq!(merged.rows, 312);
    assert_eq!(merged.first_period.as_deref(), Some("2000-01"));
    assert_eq!(merged.last_period.as_deref(), Some("2025-12"));
    assert_eq!(merged.measures.len(), 2);

    let messages: Vec<&str> = logger.lines().iter().map(|l| l.message.as_str()).collect();
    assert!(messages.contains(&"DATA VALIDATION PASSED - Data is ready for analysis"));
    assert!(messages.contains(&"DATA QUALITY VALIDATION REPORT"));
}

#[test]
fn duplicate_source_row_fails_the_verdict() -> PolarsResult<()> {
    let price = price_frame(312);
    let price = price.vstack(&price.slice(100, 1))?;
    let mut logger = ReportLogger::in_memory();

    let report = generate_quality_report(
        &price,
        &climate_frame(312),
        &panel_frame(312),
        &ValidationConfig::default(),
        &mut logger,
    );

    assert!(!report.verdict);
    assert!(!report.price.ok);
    assert!(report.climate.ok);
    assert!(report.panel.ok);
    assert_eq!(report.error_count(), 1);
    assert!(logger
        .lines()
        .iter()
        .any(|l| l.severity == Severity::Warn && l.message == "DATA VALIDATION COMPLETED WITH ERRORS"));
    Ok(())
}

#[test]
fn run_writes_enriched_table_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_inputs(dir.path(), 312);
    let output = dir.path().join("final").join("final_enhanced.csv");
    let report_json = dir.path().join("results").join("quality.json");
    let log_path = dir.path().join("results").join("logs").join("data_validation.log");

    let mut logger = ReportLogger::open(&log_path).unwrap();
    let outcome = pipeline::run(
        &paths,
        &output,
        Some(&report_json),
        &ValidationConfig::default(),
        &mut logger,
    )
    .unwrap();
    logger.close().unwrap();

    assert!(outcome.report.verdict);
    assert_eq!((outcome.enriched_rows, outcome.enriched_columns), (312, 15));

    let written = read_table(&output).unwrap();
    assert_eq!(written.shape(), (312, 15));

    let preview = pipeline::preview_lines(&written, 5).unwrap();
    assert_eq!(preview.len(), 6);
    assert!(preview.iter().all(|line| !line.contains('\n')));
    assert!(preview[0].starts_with("  YearMonth | Heating_Oil_Price"));
    assert!(preview[1].starts_with("  2000-01 | "));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_json).unwrap()).unwrap();
    assert_eq!(json["verdict"], serde_json::Value::Bool(true));
    assert_eq!(json["price"]["name"], "price");

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("PASS: Price data loaded: 312 rows"));
    assert!(log.contains("PASS: Data enhancement completed"));
    let first = log.lines().next().unwrap();
    assert!(first.starts_with('['));
    assert_eq!(&first[20..22], "] ");
}

#[test]
fn failing_verdict_still_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_inputs(dir.path(), 312);
    let bad_climate = df!(
        "YearMonth" => &["2000-01", "2000-02"],
        "Heating_Degree_Days" => &[-5.0f64, 700.0],
    )
    .unwrap();
    write_table_atomic(&paths.climate, &bad_climate).unwrap();
    let output = dir.path().join("final_enhanced.csv");

    let mut logger = ReportLogger::in_memory();
    let outcome =
        pipeline::run(&paths, &output, None, &ValidationConfig::default(), &mut logger).unwrap();

    assert!(!outcome.report.verdict);
    assert!(!outcome.report.climate.ok);
    assert!(output.exists());
}

#[test]
fn unreadable_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_inputs(dir.path(), 312);
    paths.panel = dir.path().join("final").join("missing.csv");
    let output = dir.path().join("final").join("final_enhanced.csv");

    let mut logger = ReportLogger::in_memory();
    let result = pipeline::run(&paths, &output, None, &ValidationConfig::default(), &mut logger);

    assert!(result.is_err());
    assert!(!output.exists());
}
