//! Client-side image upload orchestration
//!
//! A file is validated locally, a presigned write URL is requested from the upload backend,
//! and the bytes are written straight to the object store while progress is reported
//! through [`UploadState`] changes.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod error;
pub mod issuer;
pub mod orchestrator;
pub mod state;
pub mod transfer;
pub mod validation;

pub use common_types::{ImageContentType, UploadPolicy};
pub use error::{
    CredentialIssuanceError, TransferError, UploadError, UploadErrorClass, ValidationError,
};
pub use issuer::{Credential, CredentialIssuer, HttpCredentialIssuer};
pub use orchestrator::{StateCallback, UploadOrchestrator, INTERRUPTED};
pub use state::{SelectedFile, UploadRequest, UploadState};
pub use transfer::{
    HttpTransferExecutor, ProgressSender, TransferExecutor, TransferProgress, TransferRequest,
};
