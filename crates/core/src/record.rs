//! Print cache records and the metadata derived from them
//!
//! Each input row describes one cached print page:
//! `key, cacheDate, trialIDs, searchParams, content`.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Number of positional fields in a print cache row
pub const FIELD_COUNT: usize = 5;

/// Metadata key marking an object as migrated rather than freshly generated
pub const METADATA_MIGRATED_KEY: &str = "migrated-data";
/// Metadata key holding the original generation timestamp
pub const METADATA_GENERATED_KEY: &str = "originally-generated";
/// Metadata key holding the JSON search criteria
pub const METADATA_SEARCH_CRITERIA_KEY: &str = "search-criteria";
/// Metadata key holding the comma-separated trial IDs
pub const METADATA_TRIAL_ID_LIST_KEY: &str = "trial-id-list";

/// One cached print page read from the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Object key (a GUID in practice, not validated)
    pub key: String,

    /// When the page was originally generated, passed through unmodified
    pub cache_date: String,

    /// Comma-separated trial IDs, not split
    pub trial_ids: String,

    /// Search criteria JSON, not parsed
    pub search_params: String,

    /// Page HTML
    pub content: String,
}

impl Record {
    /// Build a record from positional fields
    ///
    /// Fields past the fifth are ignored.
    pub fn from_fields<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = fields.into_iter().map(Into::into);
        let mut next = |name: &str, index: usize| {
            fields.next().ok_or_else(|| {
                Error::InvalidRecord(format!(
                    "expected {FIELD_COUNT} fields, missing '{name}' (field {})",
                    index + 1
                ))
            })
        };

        Ok(Self {
            key: next("key", 0)?,
            cache_date: next("cacheDate", 1)?,
            trial_ids: next("trialIDs", 2)?,
            search_params: next("searchParams", 3)?,
            content: next("content", 4)?,
        })
    }

    /// Object metadata for this record
    pub fn metadata(&self) -> UploadMetadata {
        UploadMetadata::from_record(self)
    }

    /// UTF-8 encoded page body
    pub fn body(&self) -> Vec<u8> {
        self.content.as_bytes().to_vec()
    }
}

/// User metadata attached to each uploaded object
///
/// Always carries exactly the four migration keys, even when the source
/// values are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata(BTreeMap<String, String>);

impl UploadMetadata {
    fn from_record(record: &Record) -> Self {
        let entries = [
            (METADATA_MIGRATED_KEY, "True"),
            (METADATA_GENERATED_KEY, record.cache_date.as_str()),
            (METADATA_SEARCH_CRITERIA_KEY, record.search_params.as_str()),
            (METADATA_TRIAL_ID_LIST_KEY, record.trial_ids.as_str()),
        ];

        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// Look up a metadata value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
