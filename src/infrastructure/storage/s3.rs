use super::{ObjectMeta, ObjectStore, StoreError};
use anyhow::anyhow;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::info;

/// S3 (or MinIO) backed object store, bound to a single bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(
        region: &str,
        endpoint: Option<&str>,
        bucket: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Self {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let mut config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials);

        if let Some(endpoint) = endpoint {
            // Path-style addressing is required for MinIO
            config = config.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(config.build());

        info!("✅ Connected to S3, bucket {}", bucket);

        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StoreError::Other(anyhow!("s3 put {key}: {e}")))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        let output = match self.client.get_object().bucket(&self.bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    return Err(StoreError::NotFound);
                }
                return Err(StoreError::Other(anyhow!("s3 get {key}: {service}")));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Other(anyhow!("s3 get {key} body: {e}")))?;
        Ok(data.into_bytes())
    }

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, StoreError> {
        match self.client.head_object().bucket(&self.bucket).key(key).send().await {
            Ok(output) => {
                let size = output.content_length().unwrap_or(0).max(0) as u64;
                Ok(Some(ObjectMeta { size }))
            }
            Err(err) => {
                let service = err.into_service_error();
                if service.is_not_found() {
                    return Ok(None);
                }
                Err(StoreError::Other(anyhow!("s3 head {key}: {service}")))
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::Other(anyhow!("s3 delete {key}: {e}")))?;
        Ok(())
    }
}
