// S3 blob store

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use crate::config::Config;
use crate::store::{BlobStore, StoreError, StoredVariant};

/// Blob store backed by a single S3 bucket
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: S3Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the configured region, endpoint and credentials,
    /// falling back to the default AWS provider chain.
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "catalog-resizer-config",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            // S3-compatible endpoints are addressed path-style
            builder = builder.endpoint_url(endpoint.clone()).force_path_style(true);
        }

        tracing::info!(
            bucket = %config.bucket,
            region = config.region.as_deref().unwrap_or("default"),
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "S3 blob store initialized"
        );

        Self::new(S3Client::from_conf(builder.build()), config.bucket.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn map_get_error(key: &str, err: SdkError<GetObjectError>) -> StoreError {
    if let SdkError::ServiceError(service) = &err {
        if matches!(service.err(), GetObjectError::NoSuchKey(_)) {
            return StoreError::NotFound {
                key: key.to_string(),
            };
        }
    }
    StoreError::Backend {
        key: key.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_get_error(key, e))?;

        let body = response.body.collect().await.map_err(|e| StoreError::Body {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(body.into_bytes())
    }

    async fn put(&self, variant: StoredVariant) -> Result<(), StoreError> {
        let StoredVariant {
            key,
            data,
            content_type,
            cache_control,
        } = variant;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await
            .map_err(|e| StoreError::Backend {
                key: key.clone(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}
