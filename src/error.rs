//! Centralized error types for tridesk.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the tridesk library.
#[derive(Error, Debug)]
pub enum TrideskError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Transport-safe (URL-safe base64) data could not be decoded.
    #[error("Transport decoding error: {0}")]
    Decode(String),

    /// The attachment retrieval collaborator failed for one reference.
    #[error("Failed to fetch attachment '{attachment_id}' of message '{message_id}': {reason}")]
    Fetch {
        message_id: String,
        attachment_id: String,
        reason: String,
    },

    /// The referenced attachment does not exist in the store.
    #[error("Attachment '{attachment_id}' not found for message '{message_id}'")]
    AttachmentNotFound {
        message_id: String,
        attachment_id: String,
    },

    /// The raw message has no payload or no header list.
    #[error("Malformed message '{0}': missing payload or headers")]
    MalformedMessage(String),

    /// A JSON document could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, TrideskError>`.
pub type Result<T> = std::result::Result<T, TrideskError>;

impl TrideskError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a `Fetch` variant for a single attachment reference.
    pub fn fetch(
        message_id: impl Into<String>,
        attachment_id: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::Fetch {
            message_id: message_id.into(),
            attachment_id: attachment_id.into(),
            reason: reason.to_string(),
        }
    }
}
