//! Failure taxonomy of an upload attempt

use std::fmt;

use thiserror::Error;

/// A selected file failed local validation; nothing was sent over the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing was selected
    #[error("no file selected")]
    NoFile,

    /// Declared content type is not an allowed raster image type
    #[error("unsupported type: {0:?}")]
    UnsupportedType(String),

    /// File is larger than the policy ceiling
    #[error("size exceeds limit: {size} bytes is over the {limit} byte limit")]
    SizeExceedsLimit {
        /// Size of the selected file
        size: u64,
        /// Inclusive ceiling
        limit: u64,
    },
}

/// The negotiation exchange did not produce a usable credential
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialIssuanceError {
    /// The backend could not be reached
    #[error("failed to reach upload backend: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("failed to get upload URL ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// `error` field of the response body, or the status reason
        message: String,
    },

    /// The backend answered 2xx with an unusable body
    #[error("malformed upload URL response: {0}")]
    MalformedResponse(String),
}

/// The object store rejected or did not complete the write
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Transport-level failure before a status was received
    #[error("upload failed: {0}")]
    Network(String),

    /// The store answered with a non-2xx status
    #[error("upload failed with status: {status}. Response: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body returned by the store, for diagnostics
        body: String,
    },
}

/// Classification carried by `UploadState::Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadErrorClass {
    /// Credential negotiation failed
    CredentialIssuance,
    /// Byte transfer to the store failed
    Transfer,
}

impl fmt::Display for UploadErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialIssuance => f.write_str("credential issuance error"),
            Self::Transfer => f.write_str("transfer error"),
        }
    }
}

/// Errors returned by orchestrator operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The operation is not valid in the current state
    #[error("cannot upload from state {0}")]
    NotReady(&'static str),

    /// An attempt is already in flight
    #[error("an upload is already in progress")]
    Busy,

    /// See [`CredentialIssuanceError`]
    #[error(transparent)]
    CredentialIssuance(#[from] CredentialIssuanceError),

    /// See [`TransferError`]
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl UploadError {
    /// Failure class for attempt errors, `None` for contract violations
    #[must_use]
    pub const fn class(&self) -> Option<UploadErrorClass> {
        match self {
            Self::NotReady(_) | Self::Busy => None,
            Self::CredentialIssuance(_) => Some(UploadErrorClass::CredentialIssuance),
            Self::Transfer(_) => Some(UploadErrorClass::Transfer),
        }
    }
}
