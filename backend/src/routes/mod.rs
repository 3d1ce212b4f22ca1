mod docs;
mod health;
pub mod upload_config;
pub mod upload_url;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

pub use docs::openapi;

use crate::types::Environment;

/// Creates the router with all handler routes
pub fn handler(environment: &Environment) -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler(environment))
        .api_route("/health", get(health::handler))
        .api_route("/upload-config", get(upload_config::handler))
        .api_route("/get-upload-url", post(upload_url::create_upload_url))
}
