//! Migration runner
//!
//! Walks the export row by row, uploading each record as one object. Rows are
//! processed strictly in order and one at a time. A failed row is counted and
//! skipped; expired credentials stop the run.

use serde::Serialize;
use thiserror::Error;

use crate::config::CONTENT_TYPE;
use crate::error::{Error, Result};
use crate::record::Record;
use crate::traits::{ObjectStore, PutRequest};

/// Result of processing a single row
#[derive(Debug)]
pub enum RecordOutcome {
    /// Object written
    Uploaded,

    /// Row failed; the run continues with the next row
    RecoverableFailure(Error),

    /// Row failed in a way that stops the run
    FatalAbort(Error),
}

impl RecordOutcome {
    fn from_error(error: Error) -> Self {
        if error.is_fatal() {
            RecordOutcome::FatalAbort(error)
        } else {
            RecordOutcome::RecoverableFailure(error)
        }
    }
}

/// Tallies for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    /// Rows processed
    pub total: u64,
    /// Rows uploaded
    pub loaded: u64,
    /// Rows that failed
    pub errors: u64,
}

impl RunCounters {
    fn tally(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Uploaded => {
                self.loaded += 1;
                self.total += 1;
            }
            RecordOutcome::RecoverableFailure(_) => {
                self.errors += 1;
                self.total += 1;
            }
            RecordOutcome::FatalAbort(_) => self.errors += 1,
        }
    }
}

impl std::fmt::Display for RunCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total: {}, Loaded: {}, Errors: {}",
            self.total, self.loaded, self.errors
        )
    }
}

/// A run stopped before the input was exhausted
#[derive(Debug, Error)]
#[error("Migration aborted after {} records: {source}", .counters.total)]
pub struct Aborted {
    /// Counters at the time of the abort, including the failed row
    pub counters: RunCounters,
    /// What stopped the run
    #[source]
    pub source: Error,
}

/// Receives per-row progress from the runner
pub trait MigrationObserver {
    /// Called with the key of a row about to be uploaded
    fn record_started(&mut self, key: &str);

    /// Called once for every failed row
    fn record_failed(&mut self, error: &Error);
}

/// Uploads export rows into a bucket
pub struct Migrator<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    bucket: String,
    counters: RunCounters,
}

impl<'a, S: ObjectStore + ?Sized> Migrator<'a, S> {
    /// Create a runner writing into `bucket`
    pub fn new(store: &'a S, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            counters: RunCounters::default(),
        }
    }

    /// Process every row, stopping early on a fatal error
    pub async fn run<I>(
        mut self,
        rows: I,
        observer: &mut dyn MigrationObserver,
    ) -> std::result::Result<RunCounters, Aborted>
    where
        I: IntoIterator<Item = Result<Vec<String>>>,
    {
        tracing::info!(bucket = %self.bucket, "Starting migration");

        for row in rows {
            let outcome = match self.upload_row(row, observer).await {
                Ok(()) => RecordOutcome::Uploaded,
                Err(e) => RecordOutcome::from_error(e),
            };
            self.counters.tally(&outcome);

            match outcome {
                RecordOutcome::Uploaded => {}
                RecordOutcome::RecoverableFailure(e) => {
                    tracing::warn!(error = %e, "Skipping record");
                    observer.record_failed(&e);
                }
                RecordOutcome::FatalAbort(e) => {
                    tracing::error!(error = %e, counters = %self.counters, "Aborting migration");
                    observer.record_failed(&e);
                    return Err(Aborted {
                        counters: self.counters,
                        source: e,
                    });
                }
            }
        }

        tracing::info!(counters = %self.counters, "Migration finished");
        Ok(self.counters)
    }

    async fn upload_row(
        &self,
        row: Result<Vec<String>>,
        observer: &mut dyn MigrationObserver,
    ) -> Result<()> {
        let record = Record::from_fields(row?)?;
        let metadata = record.metadata();

        observer.record_started(&record.key);

        let body = record.body();
        tracing::debug!(
            key = %record.key,
            size = %humansize::format_size(body.len() as u64, humansize::BINARY),
            "Uploading record"
        );

        self.store
            .put_object(PutRequest {
                bucket: self.bucket.clone(),
                key: record.key,
                metadata,
                body,
                content_type: CONTENT_TYPE.to_string(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::RecordReader;
    use crate::traits::MockObjectStore;
    use std::io::Cursor;

    #[derive(Default)]
    struct Recorder {
        keys: Vec<String>,
        errors: Vec<String>,
    }

    impl MigrationObserver for Recorder {
        fn record_started(&mut self, key: &str) {
            self.keys.push(key.to_string());
        }

        fn record_failed(&mut self, error: &Error) {
            self.errors.push(error.to_string());
        }
    }

    fn row(key: &str) -> Result<Vec<String>> {
        Ok(vec![
            key.to_string(),
            "2020-01-01".to_string(),
            "NCI-1,NCI-2".to_string(),
            "{}".to_string(),
            format!("<p>{key}</p>"),
        ])
    }

    fn rows(keys: &[&str]) -> Vec<Result<Vec<String>>> {
        keys.iter().map(|k| row(k)).collect()
    }

    #[tokio::test]
    async fn test_all_records_uploaded() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|req| {
                req.bucket == "print-cache"
                    && req.content_type == "text/html"
                    && req.body == format!("<p>{}</p>", req.key).into_bytes()
                    && req.metadata.iter().count() == 4
                    && req.metadata.get("migrated-data") == Some("True")
                    && req.metadata.get("originally-generated") == Some("2020-01-01")
                    && req.metadata.get("trial-id-list") == Some("NCI-1,NCI-2")
                    && req.metadata.get("search-criteria") == Some("{}")
            })
            .times(3)
            .returning(|_| Ok(()));

        let mut recorder = Recorder::default();
        let counters = Migrator::new(&store, "print-cache")
            .run(rows(&["g1", "g2", "g3"]), &mut recorder)
            .await
            .unwrap();

        assert_eq!(
            counters,
            RunCounters {
                total: 3,
                loaded: 3,
                errors: 0
            }
        );
        assert_eq!(recorder.keys, vec!["g1", "g2", "g3"]);
        assert!(recorder.errors.is_empty());
    }

    #[tokio::test]
    async fn test_recoverable_storage_error_continues() {
        let mut store = MockObjectStore::new();
        store.expect_put_object().times(3).returning(|req| {
            if req.key == "g2" {
                Err(Error::storage(Some("AccessDenied"), "Access Denied"))
            } else {
                Ok(())
            }
        });

        let mut recorder = Recorder::default();
        let counters = Migrator::new(&store, "bucket")
            .run(rows(&["g1", "g2", "g3"]), &mut recorder)
            .await
            .unwrap();

        assert_eq!(counters.total, 3);
        assert_eq!(counters.loaded, 2);
        assert_eq!(counters.errors, 1);
        assert_eq!(recorder.keys, vec!["g1", "g2", "g3"]);
        assert_eq!(recorder.errors.len(), 1);
        assert!(recorder.errors[0].contains("AccessDenied"));
    }

    #[tokio::test]
    async fn test_expired_token_aborts() {
        let mut store = MockObjectStore::new();
        store.expect_put_object().times(3).returning(|req| {
            if req.key == "g3" {
                Err(Error::storage(
                    Some("ExpiredToken"),
                    "The provided token has expired.",
                ))
            } else {
                Ok(())
            }
        });

        let mut recorder = Recorder::default();
        let aborted = Migrator::new(&store, "bucket")
            .run(rows(&["g1", "g2", "g3", "g4", "g5"]), &mut recorder)
            .await
            .unwrap_err();

        assert!(matches!(aborted.source, Error::ExpiredToken(_)));
        assert_eq!(aborted.source.exit_code(), 4);
        assert_eq!(aborted.counters.errors, 1);
        assert_eq!(aborted.counters.loaded, 2);
        assert_eq!(aborted.counters.total, 2);
        assert_eq!(recorder.keys, vec!["g1", "g2", "g3"]);
        assert_eq!(recorder.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_short_record_is_recoverable() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|req| req.key == "g1" || req.key == "g3")
            .times(2)
            .returning(|_| Ok(()));

        let input = vec![
            row("g1"),
            Ok(vec!["g2".to_string(), "2020-01-01".to_string()]),
            row("g3"),
        ];

        let mut recorder = Recorder::default();
        let counters = Migrator::new(&store, "bucket")
            .run(input, &mut recorder)
            .await
            .unwrap();

        assert_eq!(
            counters,
            RunCounters {
                total: 3,
                loaded: 2,
                errors: 1
            }
        );
        // Malformed rows never reach the upload step, so their key is not echoed
        assert_eq!(recorder.keys, vec!["g1", "g3"]);
        assert!(recorder.errors[0].contains("Invalid record"));
    }

    #[tokio::test]
    async fn test_read_error_aborts() {
        let mut store = MockObjectStore::new();
        store.expect_put_object().times(1).returning(|_| Ok(()));

        let input = vec![
            row("g1"),
            Err(Error::Io(std::io::Error::other("disk gone"))),
            row("g3"),
        ];

        let mut recorder = Recorder::default();
        let aborted = Migrator::new(&store, "bucket")
            .run(input, &mut recorder)
            .await
            .unwrap_err();

        assert!(matches!(aborted.source, Error::Io(_)));
        assert_eq!(aborted.counters.loaded, 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let store = MockObjectStore::new();
        let mut recorder = Recorder::default();
        let counters = Migrator::new(&store, "bucket")
            .run(Vec::new(), &mut recorder)
            .await
            .unwrap();

        assert_eq!(counters, RunCounters::default());
    }

    #[tokio::test]
    async fn test_runs_from_reader() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|req| {
                req.key == "g1"
                    && req.metadata.get("trial-id-list") == Some("1,2,3")
                    && req.metadata.get("search-criteria") == Some(r#"{"a":1}"#)
                    && req.body == b"<p>hi</p>"
            })
            .times(1)
            .returning(|_| Ok(()));

        let input = b"\xEF\xBB\xBFg1,2024-01-01,\"1,2,3\",\"{\"\"a\"\":1}\",<p>hi</p>\r\n".to_vec();
        let reader = RecordReader::from_reader(Cursor::new(input)).unwrap();

        let mut recorder = Recorder::default();
        let counters = Migrator::new(&store, "bucket")
            .run(reader, &mut recorder)
            .await
            .unwrap();

        assert_eq!(counters.loaded, 1);
        assert_eq!(recorder.keys, vec!["g1"]);
    }

    #[tokio::test]
    async fn test_blank_line_counts_as_error() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|req| req.key == "g1" || req.key == "g2")
            .times(2)
            .returning(|_| Ok(()));

        let input = b"g1,d,t,s,c\n\ng2,d,t,s,c\n".to_vec();
        let reader = RecordReader::from_reader(Cursor::new(input)).unwrap();

        let mut recorder = Recorder::default();
        let counters = Migrator::new(&store, "bucket")
            .run(reader, &mut recorder)
            .await
            .unwrap();

        assert_eq!(
            counters,
            RunCounters {
                total: 3,
                loaded: 2,
                errors: 1
            }
        );
        assert_eq!(recorder.keys, vec!["g1", "g2"]);
        assert_eq!(recorder.errors, vec!["Invalid record: empty row at line 2"]);
    }

    #[test]
    fn test_counters_display() {
        let counters = RunCounters {
            total: 10,
            loaded: 8,
            errors: 2,
        };
        assert_eq!(counters.to_string(), "Total: 10, Loaded: 8, Errors: 2");
    }
}
