//! Run configuration
//!
//! Resolves the command-line inputs and environment into a validated
//! [`MigrationConfig`]. Resolution never touches the filesystem or the network,
//! so a bad invocation fails before the input file is opened.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Environment variable holding the destination bucket name
pub const BUCKET_ENV: &str = "PRINT_MIGRATE_BUCKET";

/// Content type attached to every migrated page
pub const CONTENT_TYPE: &str = "text/html";

/// Connection settings for the storage client
///
/// Every field is optional; unset values fall back to the SDK's default
/// provider chain (shared config files, environment, instance metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSettings {
    /// Region override
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible services
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    pub force_path_style: bool,
}

/// Validated configuration for one migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Input file path
    pub input: PathBuf,

    /// Destination bucket name, trimmed
    pub bucket: String,

    /// Storage client settings
    pub store: StoreSettings,
}

impl MigrationConfig {
    /// Resolve the run configuration
    ///
    /// `inputs` are the positional command-line arguments; exactly one is
    /// required. `bucket` is the raw bucket value from the environment and must
    /// be non-empty after trimming.
    pub fn resolve(
        inputs: &[PathBuf],
        bucket: Option<&str>,
        store: StoreSettings,
    ) -> Result<Self> {
        let input = match inputs {
            [single] => single.clone(),
            [] => {
                return Err(Error::Config(
                    "Please provide the input file name as a command line argument.".into(),
                ));
            }
            _ => {
                return Err(Error::Config(format!(
                    "Expected exactly one input file, got {}.",
                    inputs.len()
                )));
            }
        };

        let bucket = bucket.map(str::trim).unwrap_or_default();
        if bucket.is_empty() {
            return Err(Error::Config(format!(
                "Destination bucket is not set. Set {BUCKET_ENV} to the bucket name."
            )));
        }

        Ok(Self {
            input,
            bucket: bucket.to_string(),
            store,
        })
    }
}
