//! Presigned upload credentials for user images
mod error;

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::{presigning::PresigningConfig, types::ObjectCannedAcl, Client as S3Client};
use chrono::{DateTime, Utc};
use tracing::debug;

pub use error::{BucketError, BucketResult};

use crate::types::StoreConfig;

/// Scoped, single-use write authorization for one object key
#[derive(Debug, Clone)]
pub struct Credential {
    /// Presigned PUT URL
    pub upload_url: String,
    /// Public read URL of the object once written
    pub file_url: String,
    /// Key the write is scoped to
    pub object_key: String,
    /// When `upload_url` stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Issues presigned upload credentials against a single bucket
pub struct UploadStorage {
    s3_client: Arc<S3Client>,
    config: StoreConfig,
    last_issued_millis: AtomicI64,
}

impl UploadStorage {
    /// Creates a new upload storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `config` - Bucket, region and expiry resolved at startup
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, config: StoreConfig) -> Self {
        Self {
            s3_client,
            config,
            last_issued_millis: AtomicI64::new(0),
        }
    }

    /// Store settings this issuer was built with
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Millisecond issuance timestamp, strictly increasing across calls
    fn next_issuance_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_issued_millis
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }

    /// Derives a fresh object key `<issuance millis>-<file name>`
    ///
    /// Only the final path component of `file_name` is kept, byte for byte.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::InvalidInput` if no usable file name remains
    pub fn object_key(&self, file_name: &str) -> BucketResult<String> {
        let base_name = file_name
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.trim().is_empty() && *name != "." && *name != "..")
            .ok_or_else(|| BucketError::InvalidInput(format!("unusable file name: {file_name:?}")))?;

        Ok(format!("{}-{base_name}", self.next_issuance_millis()))
    }

    /// Issues a presigned PUT credential for a new object
    ///
    /// The write is limited to one key, the declared content type and a private ACL, and
    /// expires after the configured window. `file_url` is where the object will be readable
    /// if bucket policy permits public reads.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::InvalidInput` for an unusable file name
    /// Returns `BucketError::ConfigError` if the presigning config is invalid
    /// Returns `BucketError::S3Error` if presigning fails
    pub async fn issue_upload_credential(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> BucketResult<Credential> {
        let object_key = self.object_key(file_name)?;
        let expiry = Duration::from_secs(self.config.presigned_url_expiry_secs());

        let presigned_config = PresigningConfig::expires_in(expiry).map_err(|e| {
            BucketError::ConfigError(format!("Failed to create presigning config: {e}"))
        })?;

        let presigned_request = self
            .s3_client
            .put_object()
            .bucket(self.config.bucket())
            .key(&object_key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::Private)
            .presigned(presigned_config)
            .await?;

        let expires_at: DateTime<Utc> = Utc::now() + expiry;
        let file_url = self.config.public_object_url(&object_key).to_string();

        debug!(
            "Issued upload credential for object: {} expires at: {}",
            object_key, expires_at
        );

        Ok(Credential {
            upload_url: presigned_request.uri().to_string(),
            file_url,
            object_key,
            expires_at,
        })
    }
}
