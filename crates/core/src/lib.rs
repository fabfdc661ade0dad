//! pm-core: Core library for the print-migrate tool
//!
//! This crate provides the core functionality for print-migrate, including:
//! - Run configuration resolution
//! - Print cache record model and upload metadata
//! - CSV export reader
//! - ObjectStore trait for storage operations
//! - The migration runner
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing the runner to be tested against a mocked store.

pub mod config;
pub mod error;
pub mod migrate;
pub mod reader;
pub mod record;
pub mod traits;

pub use config::{MigrationConfig, StoreSettings, BUCKET_ENV, CONTENT_TYPE};
pub use error::{Error, Result};
pub use migrate::{Aborted, MigrationObserver, Migrator, RecordOutcome, RunCounters};
pub use reader::RecordReader;
pub use record::{Record, UploadMetadata};
pub use traits::{ObjectStore, PutRequest};
