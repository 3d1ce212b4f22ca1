//! Types shared by the upload backend and the upload client.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use validator::Validate;

/// Largest image accepted for upload, in bytes (5 MiB)
pub const MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Raster image types accepted for upload
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
pub enum ImageContentType {
    /// JPEG image
    #[serde(rename = "image/jpeg")]
    #[strum(serialize = "image/jpeg")]
    Jpeg,
    /// PNG image
    #[serde(rename = "image/png")]
    #[strum(serialize = "image/png")]
    Png,
    /// GIF image
    #[serde(rename = "image/gif")]
    #[strum(serialize = "image/gif")]
    Gif,
    /// WebP image
    #[serde(rename = "image/webp")]
    #[strum(serialize = "image/webp")]
    Webp,
}

/// Client-side upload constraints, checked before any network call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadPolicy {
    /// Content types a file may declare
    pub allowed_content_types: Vec<ImageContentType>,
    /// Inclusive size ceiling in bytes
    pub max_file_size_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_content_types: ImageContentType::iter().collect(),
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Whether `content_type` is one of the allowed MIME strings
    #[must_use]
    pub fn allows_content_type(&self, content_type: &str) -> bool {
        content_type
            .parse::<ImageContentType>()
            .is_ok_and(|parsed| self.allowed_content_types.contains(&parsed))
    }
}

/// Body of `POST /get-upload-url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetUploadUrlRequest {
    /// Name the user gave the file
    #[validate(length(min = 1, message = "invalid_file_name"))]
    pub file_name: String,
    /// Declared MIME type of the file
    #[validate(length(min = 1, message = "invalid_file_type"))]
    pub file_type: String,
}

/// Successful response of `POST /get-upload-url`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetUploadUrlResponse {
    /// Time-limited presigned PUT URL
    pub upload_url: String,
    /// Public address the object is reachable at once written
    pub file_url: String,
    /// Storage key the credential is scoped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_key: Option<String>,
    /// Unix timestamp (seconds) after which `upload_url` stops working
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Error body returned by the backend on any failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UploadErrorBody {
    /// Human-readable error message
    pub error: String,
}
