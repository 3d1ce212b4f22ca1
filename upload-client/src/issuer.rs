//! Client side of the negotiation exchange

use async_trait::async_trait;
use common_types::{GetUploadUrlRequest, GetUploadUrlResponse, UploadErrorBody};
use url::Url;

use crate::error::CredentialIssuanceError;

/// Write authorization for one object, as handed out by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Presigned URL the bytes are written to
    pub write_url: Url,
    /// URL the object is readable at once written, passed through untouched
    pub read_url: String,
    /// Storage key, when the backend reports it
    pub object_key: Option<String>,
    /// Expiry of `write_url` as a Unix timestamp, when the backend reports it
    pub expires_at_epoch_seconds: Option<i64>,
}

impl TryFrom<GetUploadUrlResponse> for Credential {
    type Error = CredentialIssuanceError;

    fn try_from(response: GetUploadUrlResponse) -> Result<Self, Self::Error> {
        let write_url = Url::parse(&response.upload_url).map_err(|e| {
            CredentialIssuanceError::MalformedResponse(format!("invalid uploadUrl: {e}"))
        })?;
        if response.file_url.trim().is_empty() {
            return Err(CredentialIssuanceError::MalformedResponse(
                "empty fileUrl".to_string(),
            ));
        }

        Ok(Self {
            write_url,
            read_url: response.file_url,
            object_key: response.object_key,
            expires_at_epoch_seconds: response.expires_at,
        })
    }
}

/// Source of single-use upload credentials
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// Requests a fresh credential for a file name and content type
    async fn issue(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<Credential, CredentialIssuanceError>;
}

/// Calls `POST /get-upload-url` on the upload backend
pub struct HttpCredentialIssuer {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpCredentialIssuer {
    /// Creates an issuer for the backend at `base_url`
    ///
    /// The path is resolved relative to `base_url`, so a base with a path prefix must
    /// end with `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be built
    pub fn new(base_url: &Url) -> Result<Self, url::ParseError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Same as [`HttpCredentialIssuer::new`] with a caller-provided client
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be built
    pub fn with_client(client: reqwest::Client, base_url: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            endpoint: base_url.join("get-upload-url")?,
        })
    }

    /// Full URL of the negotiation endpoint
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl CredentialIssuer for HttpCredentialIssuer {
    async fn issue(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<Credential, CredentialIssuanceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GetUploadUrlRequest {
                file_name: file_name.to_string(),
                file_type: content_type.to_string(),
            })
            .send()
            .await
            .map_err(|e| CredentialIssuanceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            let message = response
                .json::<UploadErrorBody>()
                .await
                .map_or_else(|_| reason.to_string(), |body| body.error);
            return Err(CredentialIssuanceError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .json::<GetUploadUrlResponse>()
            .await
            .map_err(|e| CredentialIssuanceError::MalformedResponse(e.to_string()))?;

        Credential::try_from(body)
    }
}
