//! Object store settings resolved once at startup

use aws_config::SdkConfig;
use aws_credential_types::provider::ProvideCredentials;
use thiserror::Error;
use url::Url;

/// Errors that prevent the service from starting
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `APP_ENV` holds an unknown value
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// No bucket name configured
    #[error("S3_BUCKET_NAME environment variable is not set")]
    MissingBucket,

    /// No AWS region could be resolved
    #[error("AWS region is not configured")]
    MissingRegion,

    /// Store credentials could not be resolved
    #[error("AWS credentials are not available: {0}")]
    MissingCredentials(String),

    /// Endpoint or derived public URL is not a valid base URL
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
}

/// Bucket identity and presigning settings for the credential issuer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
    presigned_url_expiry_secs: u64,
    public_base_url: Url,
}

impl StoreConfig {
    /// Builds a store configuration, deriving the public read base URL
    ///
    /// Objects are addressed virtual-host style on AWS
    /// (`https://<bucket>.s3.<region>.amazonaws.com/<key>`) and path style
    /// (`<endpoint>/<bucket>/<key>`) when an endpoint override is set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingBucket` or `ConfigError::MissingRegion` for blank values
    /// Returns `ConfigError::InvalidUrl` if the public base URL cannot be built
    pub fn new(
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint_url: Option<String>,
        presigned_url_expiry_secs: u64,
    ) -> Result<Self, ConfigError> {
        let bucket = bucket.into();
        let region = region.into();

        if bucket.trim().is_empty() {
            return Err(ConfigError::MissingBucket);
        }
        if region.trim().is_empty() {
            return Err(ConfigError::MissingRegion);
        }

        let public_base_url = match &endpoint_url {
            Some(endpoint) => {
                let mut url =
                    Url::parse(endpoint).map_err(|e| ConfigError::InvalidUrl(e.to_string()))?;
                url.path_segments_mut()
                    .map_err(|()| ConfigError::InvalidUrl(endpoint.clone()))?
                    .pop_if_empty()
                    .push(&bucket);
                url
            }
            None => Url::parse(&format!("https://{bucket}.s3.{region}.amazonaws.com/"))
                .map_err(|e| ConfigError::InvalidUrl(e.to_string()))?,
        };

        Ok(Self {
            bucket,
            region,
            endpoint_url,
            presigned_url_expiry_secs,
            public_base_url,
        })
    }

    /// Target bucket
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Bucket region
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Endpoint override, if any
    #[must_use]
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Lifetime of an issued write URL
    #[must_use]
    pub const fn presigned_url_expiry_secs(&self) -> u64 {
        self.presigned_url_expiry_secs
    }

    /// Address `object_key` would be publicly readable at
    ///
    /// The key is percent-encoded as a single path segment.
    #[must_use]
    pub fn public_object_url(&self, object_key: &str) -> Url {
        let mut url = self.public_base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(object_key);
        }
        url
    }
}

/// Resolves the credentials of `sdk_config` once
///
/// # Errors
///
/// Returns `ConfigError::MissingCredentials` if no provider is configured or it yields nothing
pub async fn ensure_credentials(sdk_config: &SdkConfig) -> Result<(), ConfigError> {
    let provider = sdk_config.credentials_provider().ok_or_else(|| {
        ConfigError::MissingCredentials("no credentials provider configured".to_string())
    })?;

    provider
        .provide_credentials()
        .await
        .map(|_| ())
        .map_err(|e| ConfigError::MissingCredentials(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_on_aws() {
        let config = StoreConfig::new("photos", "eu-west-1", None, 300).unwrap();
        assert_eq!(
            config.public_object_url("1700000000000-photo.png").as_str(),
            "https://photos.s3.eu-west-1.amazonaws.com/1700000000000-photo.png"
        );
    }

    #[test]
    fn test_public_url_with_endpoint_override() {
        let config = StoreConfig::new(
            "photos",
            "us-east-1",
            Some("http://localhost:4566".to_string()),
            300,
        )
        .unwrap();
        assert_eq!(
            config.public_object_url("1-cat.gif").as_str(),
            "http://localhost:4566/photos/1-cat.gif"
        );
    }

    #[test]
    fn test_public_url_encodes_key() {
        let config = StoreConfig::new("photos", "us-east-1", None, 300).unwrap();
        assert_eq!(
            config.public_object_url("1-my photo?.png").as_str(),
            "https://photos.s3.us-east-1.amazonaws.com/1-my%20photo%3F.png"
        );
    }

    #[test]
    fn test_blank_values_are_rejected() {
        assert_eq!(
            StoreConfig::new(" ", "us-east-1", None, 300),
            Err(ConfigError::MissingBucket)
        );
        assert_eq!(
            StoreConfig::new("photos", "", None, 300),
            Err(ConfigError::MissingRegion)
        );
        assert!(matches!(
            StoreConfig::new("photos", "us-east-1", Some("not a url".to_string()), 300),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_credentials_provider() {
        let sdk_config = SdkConfig::builder().build();
        assert!(matches!(
            ensure_credentials(&sdk_config).await,
            Err(ConfigError::MissingCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_static_credentials_resolve() {
        use aws_credential_types::{provider::SharedCredentialsProvider, Credentials};

        let sdk_config = SdkConfig::builder()
            .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                "test", "test", None, None, "static",
            )))
            .build();
        assert_eq!(ensure_credentials(&sdk_config).await, Ok(()));
    }
}
