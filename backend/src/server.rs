use std::sync::Arc;

use axum::{Extension, Router};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::routes;
use crate::{types::Environment, upload_storage::UploadStorage};

/// Port the service listens on when `PORT` is unset
const DEFAULT_PORT: u16 = 3000;

/// Builds the application router with its dependencies attached
pub fn build_router(environment: Environment, upload_storage: Arc<UploadStorage>) -> Router {
    let mut openapi = routes::openapi();

    routes::handler(&environment)
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(upload_storage))
        // Browsers call the backend cross-origin before uploading straight to S3
        .layer(CorsLayer::permissive())
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    upload_storage: Arc<UploadStorage>,
) -> anyhow::Result<()> {
    let router = build_router(environment, upload_storage)
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(tower_http::timeout::TimeoutLayer::new(
            std::time::Duration::from_secs(5),
        ));

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(DEFAULT_PORT), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Image Upload Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
