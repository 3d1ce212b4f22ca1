use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use backend::{server, types::Environment, upload_storage::UploadStorage};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env()?;

    // JSON logs for staging/production (Datadog), regular format for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let sdk_config = environment.aws_config().await;

    // Missing bucket, region or credentials is fatal: never bind the port without them
    let store_config = environment.store_config(&sdk_config).await?;
    tracing::info!(
        "Issuing upload credentials for bucket {} in {}",
        store_config.bucket(),
        store_config.region()
    );

    let s3_client = Arc::new(S3Client::from_conf(Environment::s3_client_config(
        &sdk_config,
    )));
    let upload_storage = Arc::new(UploadStorage::new(s3_client, store_config));

    server::start(environment, upload_storage).await
}
