//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from pm-core.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;

use pm_core::{Error, ObjectStore, PutRequest, Result, StoreSettings};

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client
    ///
    /// Credentials come from the SDK's default provider chain. Settings left
    /// unset fall back to the same chain.
    pub async fn new(settings: &StoreSettings) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &settings.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some(endpoint) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let config = loader.load().await;

        if config.region().is_none() {
            return Err(Error::Config(
                "No AWS region configured. Set AWS_REGION or pass --region.".into(),
            ));
        }

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(settings.force_path_style)
            .build();

        tracing::debug!(
            region = ?config.region(),
            endpoint = ?settings.endpoint_url,
            path_style = settings.force_path_style,
            "Created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_object(&self, request: PutRequest) -> Result<()> {
        let mut builder = self
            .inner
            .put_object()
            .bucket(&request.bucket)
            .key(&request.key)
            .content_type(&request.content_type)
            .body(ByteStream::from(request.body));

        for (name, value) in request.metadata.iter() {
            builder = builder.metadata(name, value);
        }

        let response = builder.send().await.map_err(put_error)?;

        tracing::debug!(
            key = %request.key,
            etag = response.e_tag().map(|e| e.trim_matches('"')),
            "Uploaded object"
        );

        Ok(())
    }
}

/// Convert an SDK failure, keeping the service's error code when it sent one
fn put_error(err: SdkError<PutObjectError>) -> Error {
    let code = err.as_service_error().and_then(|e| e.code());
    Error::storage(code, DisplayErrorContext(&err).to_string())
}
