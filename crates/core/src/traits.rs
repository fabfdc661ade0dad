//! ObjectStore trait definition
//!
//! This trait defines the storage operations the migration needs.
//! It keeps the runner decoupled from the specific S3 SDK implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::record::UploadMetadata;

/// A single object write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRequest {
    /// Destination bucket
    pub bucket: String,

    /// Object key
    pub key: String,

    /// User metadata
    pub metadata: UploadMetadata,

    /// Object body
    pub body: Vec<u8>,

    /// Content type
    pub content_type: String,
}

/// Trait for S3-compatible storage operations
///
/// Implemented by the S3 adapter and mocked for testing. Failures reported by
/// the service are returned as [`crate::Error::Storage`] or, for expired
/// credentials, [`crate::Error::ExpiredToken`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload one object
    async fn put_object(&self, request: PutRequest) -> Result<()>;
}
