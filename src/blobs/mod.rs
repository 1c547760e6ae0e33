pub mod s3_blob_fetcher;

use crate::result::error::LambdaError;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum BlobFetcherError {
    #[error("{0:#}")]
    Unknown(anyhow::Error),
    #[error("{0}")]
    ObjectNotFound(String),
}

impl From<BlobFetcherError> for LambdaError {
    fn from(error: BlobFetcherError) -> Self {
        match error {
            BlobFetcherError::Unknown(e) => LambdaError::Unknown(e),
            BlobFetcherError::ObjectNotFound(msg) => LambdaError::NotFound(msg),
        }
    }
}

#[async_trait]
pub trait BlobFetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>, BlobFetcherError>;
}
