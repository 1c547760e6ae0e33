use crate::blobs::{BlobFetcher, BlobFetcherError};
use anyhow::anyhow;
use async_trait::async_trait;
use rusoto_core::RusotoError;
use rusoto_s3::{GetObjectError, GetObjectRequest, S3};
use tokio::io::AsyncReadExt;

pub struct S3BlobFetcher<S: S3 + Sync + Send> {
    s3_client: S,
}

impl<S: S3 + Sync + Send> S3BlobFetcher<S> {
    pub fn new(s3_client: S) -> Self {
        Self { s3_client }
    }
}

#[async_trait]
impl<S: S3 + Sync + Send> BlobFetcher for S3BlobFetcher<S> {
    /// Loads the whole object body into memory. Batch files are small JSON
    /// documents, so there is no streaming path and no size cap.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BlobFetcherError> {
        let request = GetObjectRequest {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            ..Default::default()
        };

        let output = self
            .s3_client
            .get_object(request)
            .await
            .map_err(|e| match e {
                RusotoError::Service(GetObjectError::NoSuchKey(_)) => {
                    BlobFetcherError::ObjectNotFound(format!(
                        "Object {key} not found in bucket {bucket}"
                    ))
                }
                _ => BlobFetcherError::Unknown(
                    anyhow!(e).context(format!("Error getting object {key} from bucket {bucket}")),
                ),
            })?;

        let body = output.body.ok_or_else(|| {
            BlobFetcherError::Unknown(anyhow!("Object {key} in bucket {bucket} has no body"))
        })?;

        let mut bytes = Vec::new();
        body.into_async_read()
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| {
                BlobFetcherError::Unknown(
                    anyhow!(e).context(format!("Error reading object {key} from bucket {bucket}")),
                )
            })?;

        Ok(bytes)
    }
}
