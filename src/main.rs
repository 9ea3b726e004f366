use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use ng2parquet::{RunReport, RunSettings, StorageAddress};
use ng2parquet_config::RuntimeConfig;
use std::path::PathBuf;
use std::process::ExitCode;

/// Convert an nginx access log in object storage into day-partitioned Parquet files
#[derive(Parser)]
#[command(name = "ng2parquet")]
#[command(version)]
#[command(about = "Convert an nginx access log in object storage into day-partitioned Parquet files", long_about = None)]
struct Cli {
    /// Source object, e.g. s3://raw-logs/nginx/access.log
    #[arg(long, value_name = "S3_OBJECT")]
    input: Option<String>,

    /// Base location for the output, e.g. s3://curated/nginx
    #[arg(long, value_name = "BASE_LOCATION")]
    output: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.exit();
            }
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    let (input, output) = match parse_addresses(&cli) {
        Ok(addresses) => addresses,
        Err(message) => {
            eprintln!("error: {}\n", message);
            eprintln!("{}", Cli::command().render_help());
            return ExitCode::from(1);
        }
    };

    match run(&cli, input, output) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            eprintln!(
                "Completed with failures: {} of {} partitions failed, {} records rejected",
                report.failed(),
                report.partitions.len(),
                report.rejected.len()
            );
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn parse_addresses(cli: &Cli) -> std::result::Result<(StorageAddress, StorageAddress), String> {
    let input = cli.input.as_deref().ok_or("--input is required")?;
    let output = cli.output.as_deref().ok_or("--output is required")?;

    let input = StorageAddress::parse_object(input).map_err(|e| e.to_string())?;
    let output = StorageAddress::parse(output).map_err(|e| e.to_string())?;
    Ok((input, output))
}

fn run(cli: &Cli, input: StorageAddress, output: StorageAddress) -> Result<RunReport> {
    // Step 1: Load base configuration
    let mut config = if let Some(config_path) = &cli.config {
        RuntimeConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        RuntimeConfig::load_or_default().context("Failed to load configuration")?
    };

    // Step 2: Apply CLI overrides (highest priority)
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;

    // Step 3: Logging, then storage
    ng2parquet::init_tracing(&config.logging);
    let store = ng2parquet::init_store(&config)?;
    let settings = RunSettings::from_config(&config)?;

    // Step 4: Drive the run on a single thread; every step is awaited in order
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(ng2parquet::run(&store, &input, &output, &settings))
}
