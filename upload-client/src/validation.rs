//! Local checks run before any network call

use common_types::UploadPolicy;

use crate::{
    error::ValidationError,
    state::{SelectedFile, UploadRequest},
};

/// Validates a selection against `policy`
///
/// A file must be present, declare an allowed content type and be no larger than
/// the policy ceiling (a file of exactly the ceiling passes).
///
/// # Errors
///
/// Returns the first failing [`ValidationError`]
pub fn validate(
    file: Option<&SelectedFile>,
    policy: &UploadPolicy,
) -> Result<UploadRequest, ValidationError> {
    let file = file.ok_or(ValidationError::NoFile)?;

    if !policy.allows_content_type(&file.content_type) {
        return Err(ValidationError::UnsupportedType(file.content_type.clone()));
    }

    let size = file.size_bytes();
    if size > policy.max_file_size_bytes {
        return Err(ValidationError::SizeExceedsLimit {
            size,
            limit: policy.max_file_size_bytes,
        });
    }

    Ok(UploadRequest::from(file))
}
