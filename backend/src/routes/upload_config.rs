use aide::axum::IntoApiResponse;
use axum::Json;
use common_types::UploadPolicy;

/// Upload constraints clients should enforce before requesting a credential
pub async fn handler() -> impl IntoApiResponse {
    Json(UploadPolicy::default())
}
