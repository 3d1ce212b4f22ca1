//! Error types for credential issuance

use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    operation::put_object::PutObjectError,
};
use thiserror::Error;

/// Result type for bucket operations
pub type BucketResult<T> = Result<T, BucketError>;

/// Errors that can occur while issuing an upload credential
#[derive(Error, Debug)]
pub enum BucketError {
    /// S3 refused to presign the request
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<SdkError<PutObjectError>> for BucketError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        Self::S3Error(format!(
            "Failed to generate presigned URL: {}",
            DisplayErrorContext(&error)
        ))
    }
}
