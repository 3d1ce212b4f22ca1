use std::sync::Arc;

use aide::axum::IntoApiResponse;
use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::upload_storage::UploadStorage;

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    /// Current version of the application
    semver: &'static str,
    /// Commit hash of the current build (if available)
    rev: Option<&'static str>,
    /// Bucket credentials are issued for
    bucket: String,
    /// Region of the bucket
    region: String,
    /// Lifetime of issued upload URLs in seconds
    presigned_url_expiry_secs: u64,
}

/// Health check endpoint
///
/// Reports the build and the store the service issues upload credentials for.
pub async fn handler(
    Extension(upload_storage): Extension<Arc<UploadStorage>>,
) -> impl IntoApiResponse {
    let config = upload_storage.config();

    Json(HealthResponse {
        status: "ok",
        semver: env!("CARGO_PKG_VERSION"),
        rev: option_env!("GIT_REV"),
        bucket: config.bucket().to_string(),
        region: config.region().to_string(),
        presigned_url_expiry_secs: config.presigned_url_expiry_secs(),
    })
}
