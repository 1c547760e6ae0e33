//! LambdaError is the error every handler in this workspace fails with.
//! Errors from the blob store, the users table and event decoding are all
//! mapped into it before they reach the runtime.

use lambda_runtime::Error as LambdaRuntimeError;

pub type LambdaRuntimeResult = std::result::Result<(), LambdaRuntimeError>;

#[derive(Debug, thiserror::Error)]
pub enum LambdaError {
    #[error("{0:#}")]
    Unknown(#[source] anyhow::Error),
    #[error("{0}")]
    NotFound(String),
}

impl From<anyhow::Error> for LambdaError {
    fn from(e: anyhow::Error) -> Self {
        Self::Unknown(e)
    }
}
