//! CLI definition and execution
//!
//! Parses arguments, resolves the run configuration, and hands off to the
//! migration runner.

use std::path::PathBuf;

use clap::Parser;
use pm_core::{BUCKET_ENV, MigrationConfig, RecordReader, StoreSettings};
use pm_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod migrate;

/// print-migrate - Load exported print pages into S3
///
/// Reads a CSV export of cached clinical trial print pages
/// (key, cacheDate, trialIDs, searchParams, content) and stores each page
/// as an HTML object in the destination bucket.
#[derive(Parser, Debug)]
#[command(name = "print-migrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// CSV export to migrate (exactly one)
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Destination bucket
    #[arg(long, env = BUCKET_ENV, hide_env_values = true)]
    pub bucket: Option<String>,

    /// AWS region of the bucket
    #[arg(long, env = "PRINT_MIGRATE_REGION")]
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible services
    #[arg(long, env = "PRINT_MIGRATE_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, default_value = "false")]
    pub path_style: bool,

    /// Print the summary as JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, default_value = "false")]
    pub no_color: bool,

    /// Suppress per-record keys and the summary
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

/// Execute the migration and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let formatter = Formatter::new(OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    });

    let store = StoreSettings {
        region: cli.region,
        endpoint_url: cli.endpoint_url,
        force_path_style: cli.path_style,
    };

    let config = match MigrationConfig::resolve(&cli.inputs, cli.bucket.as_deref(), store) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&e.to_string());
            return ExitCode::from_error(&e);
        }
    };

    tracing::debug!(
        input = %config.input.display(),
        bucket = %config.bucket,
        "Resolved configuration"
    );

    let reader = match RecordReader::open(&config.input) {
        Ok(r) => r,
        Err(e) => {
            formatter.error(&format!(
                "Failed to open {}: {e}",
                config.input.display()
            ));
            return ExitCode::from_error(&e);
        }
    };

    let client = match S3Client::new(&config.store).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    migrate::execute(&client, &config.bucket, reader, &formatter).await
}
