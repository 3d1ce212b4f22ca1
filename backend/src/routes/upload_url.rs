use std::sync::Arc;

use axum::{Extension, Json};
use common_types::{GetUploadUrlRequest, GetUploadUrlResponse};
use tracing::instrument;

use crate::{
    types::{AppError, ValidatedJson},
    upload_storage::UploadStorage,
};

/// Issues a presigned URL for uploading one image directly to S3
///
/// 1. Derives a unique object key from the issuance time and the file name
/// 2. Presigns a private PUT of that key with the declared content type
/// 3. Returns the write URL together with the URL the object will be readable at
///
/// # Errors
///
/// - `400 invalid_file_name` / `invalid_file_type` - empty fields
/// - `400 invalid_input` - file name has no usable final path component
/// - `500 credential_issuance_failed` - S3 presigning failed
#[instrument(skip(upload_storage, payload))]
pub async fn create_upload_url(
    Extension(upload_storage): Extension<Arc<UploadStorage>>,
    ValidatedJson(payload): ValidatedJson<GetUploadUrlRequest>,
) -> Result<Json<GetUploadUrlResponse>, AppError> {
    let credential = upload_storage
        .issue_upload_credential(&payload.file_name, &payload.file_type)
        .await?;

    tracing::info!(
        "issued upload credential for {} ({})",
        credential.object_key,
        payload.file_type
    );

    Ok(Json(GetUploadUrlResponse {
        upload_url: credential.upload_url,
        file_url: credential.file_url,
        object_key: Some(credential.object_key),
        expires_at: Some(credential.expires_at.timestamp()),
    }))
}
