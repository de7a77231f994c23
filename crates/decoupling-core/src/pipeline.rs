//! Validation-and-enrichment run over tables on disk.
//!
//! load -> quality report -> (optional JSON report) -> enrich -> atomic write.
//! The verdict is advisory: the enriched table is written whatever it says.
//! Any error returned from here happens before the enriched file is renamed
//! into place, so a failed run never leaves a partial output behind.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use polars::prelude::{AnyValue, DataFrame};

use crate::config::ValidationConfig;
use crate::enrichment::enrich_panel;
use crate::error::Result;
use crate::io::{read_table, write_table_atomic};
use crate::logger::ReportLogger;
use crate::report::{generate_quality_report, QualityReport};
use crate::schema::ENRICHED_COLUMNS;

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone)]
pub struct InputPaths {
    pub price: PathBuf,
    pub climate: PathBuf,
    pub panel: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Tables {
    pub price: DataFrame,
    pub climate: DataFrame,
    pub panel: DataFrame,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: QualityReport,
    pub enriched_rows: usize,
    pub enriched_columns: usize,
}

pub fn load_tables(paths: &InputPaths, logger: &mut ReportLogger) -> Result<Tables> {
    logger.info("Loading data from processed files...");
    let price = read_table(&paths.price)?;
    logger.pass(format!("Price data loaded: {} rows", price.height()));
    let climate = read_table(&paths.climate)?;
    logger.pass(format!("Climate data loaded: {} rows", climate.height()));
    let panel = read_table(&paths.panel)?;
    logger.pass(format!("Merged data loaded: {} rows", panel.height()));

    Ok(Tables {
        price,
        climate,
        panel,
    })
}

pub fn validate(
    tables: &Tables,
    config: &ValidationConfig,
    logger: &mut ReportLogger,
) -> QualityReport {
    logger.info("Starting data validation...");
    generate_quality_report(
        &tables.price,
        &tables.climate,
        &tables.panel,
        config,
        logger,
    )
}

pub fn write_report_json(path: &Path, report: &QualityReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Enriches the panel and persists it at `output`, logging the outcome.
pub fn enrich_and_write(
    panel: &DataFrame,
    output: &Path,
    logger: &mut ReportLogger,
) -> Result<DataFrame> {
    logger.info("Enhancing merged data with analytical features...");
    let enriched = enrich_panel(panel)?;
    logger.pass("Data enhancement completed");
    logger.info(format!("  Added columns: {}", ENRICHED_COLUMNS.join(", ")));

    write_table_atomic(output, &enriched)?;
    logger.pass(format!("Enhanced dataset saved: {}", output.display()));
    logger.info(format!(
        "  Rows: {}, Columns: {}",
        enriched.height(),
        enriched.width()
    ));

    logger.info(format!("Sample of enhanced data (first {PREVIEW_ROWS} rows):"));
    for line in preview_lines(&enriched, PREVIEW_ROWS)? {
        logger.info(line);
    }

    Ok(enriched)
}

/// Header plus one `|`-separated line per row, so every preview row is a
/// single log entry.
pub fn preview_lines(df: &DataFrame, rows: usize) -> Result<Vec<String>> {
    let columns = df.get_columns();
    let mut lines = Vec::with_capacity(rows.min(df.height()) + 1);
    lines.push(format!(
        "  {}",
        columns
            .iter()
            .map(|c| c.name().as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    for idx in 0..rows.min(df.height()) {
        let mut cells = Vec::with_capacity(columns.len());
        for column in columns {
            cells.push(match column.get(idx)? {
                AnyValue::Null => "null".to_string(),
                AnyValue::String(s) => s.to_string(),
                value => value.to_string(),
            });
        }
        lines.push(format!("  {}", cells.join(" | ")));
    }
    Ok(lines)
}

/// Full run: validation report, optional JSON report, enriched output.
pub fn run(
    paths: &InputPaths,
    output: &Path,
    report_json: Option<&Path>,
    config: &ValidationConfig,
    logger: &mut ReportLogger,
) -> Result<RunOutcome> {
    let tables = load_tables(paths, logger)?;
    let report = validate(&tables, config, logger);

    if let Some(path) = report_json {
        write_report_json(path, &report)?;
        logger.info(format!("Quality report written: {}", path.display()));
    }

    // Validation lines must be durable before the output file appears.
    logger.flush()?;

    let enriched = enrich_and_write(&tables.panel, output, logger)?;

    Ok(RunOutcome {
        report,
        enriched_rows: enriched.height(),
        enriched_columns: enriched.width(),
    })
}
