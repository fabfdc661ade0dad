//! print-migrate - Load exported print pages into S3
//!
//! A one-shot migration tool: reads a CSV export of cached clinical trial
//! print pages and uploads each page to an S3 bucket.

use clap::Parser;
use print_migrate::commands::{self, Cli};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log filter used by `--debug`; keeps the AWS SDK's own logging quiet
const DEBUG_FILTER: &str = "pm_core=debug,pm_s3=debug,print_migrate=debug";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::from_default_env()
    };

    // Logs go to stderr; stdout is reserved for keys and the summary
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
