//! Console side of a migration run
//!
//! Echoes each key as it is uploaded, prints every failure, and finishes with
//! a one-line summary.

use pm_core::{Error, MigrationObserver, Migrator, ObjectStore, Result};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Prints runner progress through the formatter
struct ConsoleObserver<'a> {
    formatter: &'a Formatter,
}

impl MigrationObserver for ConsoleObserver<'_> {
    fn record_started(&mut self, key: &str) {
        self.formatter.progress(key);
    }

    fn record_failed(&mut self, error: &Error) {
        self.formatter.error(&error.to_string());
    }
}

/// How a finished run should be reported
#[derive(Debug)]
pub struct Report {
    pub exit_code: ExitCode,
    /// Rendered summary line; absent when the run aborted or output is quiet
    pub summary: Option<String>,
}

/// Upload every row into `bucket`
///
/// Keys and errors are printed as the run goes. The summary is only rendered
/// when the input was exhausted.
pub async fn run<S, I>(store: &S, bucket: &str, rows: I, formatter: &Formatter) -> Report
where
    S: ObjectStore + ?Sized,
    I: IntoIterator<Item = Result<Vec<String>>>,
{
    let mut observer = ConsoleObserver { formatter };

    match Migrator::new(store, bucket).run(rows, &mut observer).await {
        Ok(counters) => Report {
            exit_code: ExitCode::Success,
            summary: formatter.render(&counters),
        },
        Err(aborted) => {
            formatter.error(&aborted.to_string());
            Report {
                exit_code: ExitCode::from_error(&aborted.source),
                summary: None,
            }
        }
    }
}

/// Run the migration and print its summary
pub async fn execute<S, I>(store: &S, bucket: &str, rows: I, formatter: &Formatter) -> ExitCode
where
    S: ObjectStore + ?Sized,
    I: IntoIterator<Item = Result<Vec<String>>>,
{
    let report = run(store, bucket, rows, formatter).await;
    if let Some(summary) = &report.summary {
        println!("{summary}");
    }
    report.exit_code
}
