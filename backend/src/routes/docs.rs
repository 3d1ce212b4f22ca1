use aide::{
    axum::ApiRouter,
    openapi::{Info, OpenApi},
    scalar::Scalar,
};
use axum::{routing::get, Extension, Json};

use crate::types::Environment;

/// Empty OpenAPI document carrying the service metadata
#[must_use]
pub fn openapi() -> OpenApi {
    OpenApi {
        info: Info {
            title: "Image Upload Backend".to_string(),
            description: Some(
                "Issues presigned S3 URLs for uploading images directly to the bucket".to_string(),
            ),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    }
}

/// API docs routes, mounted only where the environment exposes them
pub fn handler(environment: &Environment) -> ApiRouter {
    if !environment.show_api_docs() {
        return ApiRouter::new();
    }

    let scalar = Scalar::new("/openapi.json").with_title("Image Upload Backend Docs");
    ApiRouter::new()
        .route("/docs", scalar.axum_route())
        .route("/openapi.json", get(openapi_schema))
}

#[allow(clippy::unused_async)]
async fn openapi_schema(Extension(openapi): Extension<OpenApi>) -> Json<OpenApi> {
    Json(openapi)
}
