//! Client-side upload state

use bytes::Bytes;

use crate::error::{UploadErrorClass, ValidationError};

/// A file picked by the user, with the metadata its picker declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Name as chosen by the user
    pub name: String,
    /// Declared MIME type
    pub content_type: String,
    /// Raw file contents
    pub bytes: Bytes,
}

impl SelectedFile {
    /// Wraps a picked file
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// File size in bytes
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Metadata of a file that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Declared file name
    pub file_name: String,
    /// Declared content type
    pub content_type: String,
    /// Size in bytes
    pub size_bytes: u64,
}

impl From<&SelectedFile> for UploadRequest {
    fn from(file: &SelectedFile) -> Self {
        Self {
            file_name: file.name.clone(),
            content_type: file.content_type.clone(),
            size_bytes: file.size_bytes(),
        }
    }
}

/// The single source of truth for an upload attempt
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    /// Nothing selected yet
    #[default]
    Idle,
    /// A file was validated and can be uploaded
    FileSelected(UploadRequest),
    /// Validation is running
    Validating,
    /// The selected file was rejected locally
    Invalid(ValidationError),
    /// Waiting for the backend to issue a write URL
    RequestingCredential,
    /// Bytes are being written; percent in `0..=100`
    Transferring(u8),
    /// The object was written and is readable at this URL
    Succeeded(String),
    /// The attempt failed
    Failed(UploadErrorClass, String),
}

impl UploadState {
    /// Short state name for logs and errors
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::FileSelected(_) => "FileSelected",
            Self::Validating => "Validating",
            Self::Invalid(_) => "Invalid",
            Self::RequestingCredential => "RequestingCredential",
            Self::Transferring(_) => "Transferring",
            Self::Succeeded(_) => "Succeeded",
            Self::Failed(..) => "Failed",
        }
    }

    /// Whether a network attempt is in flight
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::RequestingCredential | Self::Transferring(_))
    }

    /// Whether no further automatic transition will happen
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(..) | Self::Invalid(_))
    }

    /// Upload progress shown to the user
    #[must_use]
    pub const fn progress_percent(&self) -> u8 {
        match self {
            Self::Transferring(percent) => *percent,
            Self::Succeeded(_) => 100,
            _ => 0,
        }
    }

    /// Read URL, only once the object has been written
    #[must_use]
    pub fn read_url(&self) -> Option<&str> {
        match self {
            Self::Succeeded(url) => Some(url),
            _ => None,
        }
    }

    /// Message to display, if the state carries one
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Invalid(reason) => Some(reason.to_string()),
            Self::Failed(_, message) => Some(message.clone()),
            _ => None,
        }
    }
}

/// Rounded percentage of `bytes_sent` over `total_bytes`, capped at 100
#[must_use]
pub fn progress_percent(bytes_sent: u64, total_bytes: u64) -> u8 {
    if total_bytes == 0 {
        return 100;
    }
    let sent = u128::from(bytes_sent.min(total_bytes));
    let total = u128::from(total_bytes);
    // round half up: floor(sent * 100 / total + 1/2)
    let percent = (sent * 200 + total) / (total * 2);
    u8::try_from(percent).unwrap_or(100)
}
