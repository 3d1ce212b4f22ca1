//! Byte transfer to a presigned URL

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::sync::mpsc;
use url::Url;

use crate::error::TransferError;

/// Body is handed to the transport in chunks of this size
const CHUNK_SIZE: usize = 64 * 1024;

/// A single PUT against a presigned URL
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Presigned write URL
    pub url: Url,
    /// Raw object bytes
    pub body: Bytes,
    /// Value of the `Content-Type` header; must match what the URL was signed for
    pub content_type: String,
}

/// Bytes handed to the transport so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Cumulative bytes sent
    pub bytes_sent: u64,
    /// Size of the whole body
    pub total_bytes: u64,
}

/// Sending half of a transfer's progress channel
pub type ProgressSender = mpsc::UnboundedSender<TransferProgress>;

/// Performs the write to the object store
///
/// Contract: zero or more progress events on `progress`, then exactly one terminal event,
/// the returned `Result`. The sender is owned by the call, so nothing can be reported
/// after it returns.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    /// Writes `request.body` to `request.url`
    async fn transfer(
        &self,
        request: TransferRequest,
        progress: ProgressSender,
    ) -> Result<(), TransferError>;
}

/// Streams the body with reqwest, reporting progress per chunk
#[derive(Clone, Default)]
pub struct HttpTransferExecutor {
    client: reqwest::Client,
}

impl HttpTransferExecutor {
    /// Creates an executor with a default client
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an executor with a caller-provided client
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn split_into_chunks(mut body: Bytes) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(body.len().div_ceil(CHUNK_SIZE));
    while !body.is_empty() {
        let len = body.len().min(CHUNK_SIZE);
        chunks.push(body.split_to(len));
    }
    chunks
}

#[async_trait]
impl TransferExecutor for HttpTransferExecutor {
    async fn transfer(
        &self,
        request: TransferRequest,
        progress: ProgressSender,
    ) -> Result<(), TransferError> {
        let total_bytes = request.body.len() as u64;
        let mut bytes_sent = 0u64;

        // An empty body yields no chunks, so completion is reported up front
        if total_bytes == 0 {
            let _ = progress.send(TransferProgress {
                bytes_sent,
                total_bytes,
            });
        }

        let stream = futures::stream::iter(split_into_chunks(request.body)).map(move |chunk| {
            bytes_sent += chunk.len() as u64;
            // The orchestrator may have stopped listening; the upload still completes
            let _ = progress.send(TransferProgress {
                bytes_sent,
                total_bytes,
            });
            Ok::<_, std::io::Error>(chunk)
        });

        let response = self
            .client
            .put(request.url)
            .header(CONTENT_TYPE, request.content_type)
            // Presigned PUTs do not accept chunked transfer encoding
            .header(CONTENT_LENGTH, total_bytes)
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await
            .map_err(|e| TransferError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), %body, "store rejected upload");
        Err(TransferError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
