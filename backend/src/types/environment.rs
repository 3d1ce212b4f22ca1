//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{
    meta::region::RegionProviderChain, retry::RetryConfig, timeout::TimeoutConfig,
    BehaviorVersion, Region, SdkConfig,
};

use super::store_config::{ensure_credentials, ConfigError, StoreConfig};

/// Write URLs stay valid for five minutes
const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 5 * 60;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for presigned URL expiry in seconds
        presign_expiry_override: Option<u64>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// Defaults to development when `APP_ENV` is unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` contains an unknown value
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => {
                let presign_expiry_override = env::var("PRESIGNED_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok());

                Ok(Self::Development {
                    presign_expiry_override,
                })
            }
            _ => Err(ConfigError::InvalidEnvironment(env)),
        }
    }

    /// Returns the S3 bucket name for the environment
    ///
    /// Production and staging require `S3_BUCKET_NAME`; development falls back to a local bucket.
    #[must_use]
    pub fn s3_bucket(&self) -> Option<String> {
        let configured = env::var("S3_BUCKET_NAME")
            .ok()
            .filter(|bucket| !bucket.trim().is_empty());

        match self {
            Self::Production | Self::Staging => configured,
            Self::Development { .. } => {
                Some(configured.unwrap_or_else(|| "image-uploads".to_string()))
            }
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            // LocalStack accepts any region
            loader = loader
                .endpoint_url(endpoint_url)
                .region(RegionProviderChain::default_provider().or_else(Region::new("us-east-1")));
        }

        loader.load().await
    }

    /// AWS S3 service configuration
    #[must_use]
    pub fn s3_client_config(sdk_config: &SdkConfig) -> aws_sdk_s3::Config {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);

        // Custom endpoints (LocalStack) only understand path-style addressing
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if sdk_config.endpoint_url().is_some() {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Presigned URL expiry time in seconds
    #[must_use]
    pub fn presigned_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            Self::Development {
                presign_expiry_override,
            } => presign_expiry_override.unwrap_or(DEFAULT_PRESIGNED_URL_EXPIRY_SECS),
        }
    }

    /// Resolves everything the credential issuer needs, failing fast if anything is missing
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the bucket, region or credentials are not available
    pub async fn store_config(&self, sdk_config: &SdkConfig) -> Result<StoreConfig, ConfigError> {
        let bucket = self.s3_bucket().ok_or(ConfigError::MissingBucket)?;
        let region = sdk_config
            .region()
            .map(ToString::to_string)
            .ok_or(ConfigError::MissingRegion)?;

        ensure_credentials(sdk_config).await?;

        StoreConfig::new(
            bucket,
            region,
            sdk_config.endpoint_url().map(ToString::to_string),
            self.presigned_url_expiry_secs(),
        )
    }
}
