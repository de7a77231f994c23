use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use decoupling_core::pipeline::{self, InputPaths};
use decoupling_core::{ReportLogger, ValidationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Exit status when the run completed but the verdict is not clean and
/// `--fail-on-errors` was given.
const EXIT_VERDICT_FAILED: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Validate and enrich the heating-oil / climate panel", long_about = None)]
struct Cli {
    /// Emit console logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the quality report only
    Validate(CommonArgs),
    /// Run the quality report, then enrich and write the analysis dataset
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Price series CSV (YearMonth, Heating_Oil_Price, CPI, Real_Heating_Oil_Price)
    #[arg(long, default_value = "data/processed/fred_clean.csv")]
    price: PathBuf,
    /// Climate series CSV (YearMonth, Heating_Degree_Days)
    #[arg(long, default_value = "data/processed/noaa_clean.csv")]
    climate: PathBuf,
    /// Merged panel CSV
    #[arg(long, default_value = "data/final/final.csv")]
    panel: PathBuf,
    /// Append-only report log
    #[arg(long, default_value = "results/logs/data_validation.log")]
    log_file: PathBuf,
    /// Validation thresholds (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Also write the structured report as JSON
    #[arg(long)]
    report_json: Option<PathBuf>,
    /// Exit with status 2 when any ERROR-severity issue was found
    #[arg(long)]
    fail_on_errors: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Enriched dataset destination
    #[arg(long, default_value = "data/final/final_enhanced.csv")]
    output: PathBuf,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let common = match &cli.command {
        Command::Validate(args) => args,
        Command::Run(args) => &args.common,
    };

    let mut logger = match ReportLogger::open(&common.log_file) {
        Ok(logger) => logger,
        Err(err) => {
            tracing::error!("failed to open log file {}: {err}", common.log_file.display());
            return ExitCode::FAILURE;
        }
    };

    let status = match execute(&cli.command, &mut logger) {
        Ok(verdict) => {
            if !verdict && common.fail_on_errors {
                ExitCode::from(EXIT_VERDICT_FAILED)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            logger.error(format!("ERROR in data pipeline: {err}"));
            for cause in err.chain().skip(1) {
                logger.error(format!("  caused by: {cause}"));
            }
            ExitCode::FAILURE
        }
    };

    if let Err(err) = logger.close() {
        eprintln!("failed to flush log file: {err}");
        return ExitCode::FAILURE;
    }
    status
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Returns the verdict.
fn execute(command: &Command, logger: &mut ReportLogger) -> Result<bool> {
    match command {
        Command::Validate(args) => {
            let config = load_config(args)?;
            let tables = pipeline::load_tables(&input_paths(args), logger)
                .context("failed to load input tables")?;
            let report = pipeline::validate(&tables, &config, logger);
            if let Some(path) = &args.report_json {
                pipeline::write_report_json(path, &report)
                    .with_context(|| format!("failed to write report {}", path.display()))?;
                logger.info(format!("Quality report written: {}", path.display()));
            }
            info!(verdict = report.verdict, errors = report.error_count(), "validation finished");
            Ok(report.verdict)
        }
        Command::Run(args) => {
            let config = load_config(&args.common)?;
            let outcome = pipeline::run(
                &input_paths(&args.common),
                &args.output,
                args.common.report_json.as_deref(),
                &config,
                logger,
            )
            .context("data pipeline failed")?;

            logger.info("=".repeat(80));
            logger.pass("DATA PIPELINE COMPLETE");
            logger.info("=".repeat(80));
            info!(
                verdict = outcome.report.verdict,
                rows = outcome.enriched_rows,
                columns = outcome.enriched_columns,
                "pipeline finished"
            );
            Ok(outcome.report.verdict)
        }
    }
}

fn load_config(args: &CommonArgs) -> Result<ValidationConfig> {
    match &args.config {
        Some(path) => ValidationConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ValidationConfig::default()),
    }
}

fn input_paths(args: &CommonArgs) -> InputPaths {
    InputPaths {
        price: args.price.clone(),
        climate: args.climate.clone(),
        panel: args.panel.clone(),
    }
}
