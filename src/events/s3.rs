use anyhow::{anyhow, Context};
use aws_lambda_events::event::s3::S3EventRecord;

/// Decodes an object key from the URL-encoded form S3 uses in event
/// notifications. S3 encodes spaces as `+`, so a literal plus sign in the
/// original key always arrives as `%2B`.
pub fn decode_object_key(key: &str) -> Result<String, anyhow::Error> {
    let unplussed = key.replace('+', " ");
    let decoded = urlencoding::decode(&unplussed)
        .with_context(|| format!("Error decoding object key {key}"))?;

    Ok(decoded.into_owned())
}

/// The (bucket, key) pair one notification record points at, with the key
/// already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl TryFrom<&S3EventRecord> for ObjectLocation {
    type Error = anyhow::Error;

    fn try_from(record: &S3EventRecord) -> Result<Self, Self::Error> {
        let bucket = record
            .s3
            .bucket
            .name
            .clone()
            .ok_or_else(|| anyhow!("Event record is missing the bucket name"))?;

        let key = record
            .s3
            .object
            .key
            .as_deref()
            .ok_or_else(|| anyhow!("Event record is missing the object key"))?;

        Ok(Self {
            bucket,
            key: decode_object_key(key)?,
        })
    }
}
