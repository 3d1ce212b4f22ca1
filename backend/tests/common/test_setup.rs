use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::Client as S3Client;
use axum::{body::Body, http::Request, response::Response, Router};
use backend::{server, types::Environment, types::StoreConfig, upload_storage::UploadStorage};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_BUCKET: &str = "image-uploads";
pub const TEST_REGION: &str = "us-east-1";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    dotenvy::from_path(".env.example").ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// S3 client with static credentials; presigning never touches the network
pub fn static_s3_client(endpoint_url: Option<&str>) -> Arc<S3Client> {
    let mut builder = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .credentials_provider(Credentials::new("test", "test", None, None, "static"));
    if let Some(endpoint) = endpoint_url {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    Arc::new(S3Client::from_conf(builder.build()))
}

/// Base test setup with core dependencies
pub struct TestSetup {
    pub router: Router,
    pub environment: Environment,
    pub upload_storage: Arc<UploadStorage>,
}

impl TestSetup {
    pub fn new(environment: Environment) -> Self {
        setup_test_env();

        let store_config = StoreConfig::new(
            TEST_BUCKET,
            TEST_REGION,
            None,
            environment.presigned_url_expiry_secs(),
        )
        .expect("valid store config");
        let upload_storage = Arc::new(UploadStorage::new(static_s3_client(None), store_config));

        let router = server::build_router(environment.clone(), upload_storage.clone());

        Self {
            router,
            environment,
            upload_storage,
        }
    }

    pub fn development() -> Self {
        Self::new(Environment::Development {
            presign_expiry_override: None,
        })
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_raw_post_request(
        &self,
        route: &str,
        content_type: Option<&str>,
        body: &'static str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder().uri(route).method("POST");
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::from(body))?)
            .await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}
