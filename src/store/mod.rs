//! Attachment retrieval: the collaborator contract used to resolve
//! out-of-band content, plus a JSON-file-backed implementation.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Out-of-band content returned by the retrieval service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedAttachment {
    /// MIME type as reported by the service, when it reports one.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// URL-safe base64 content.
    pub data: String,
    /// Decoded size in bytes as reported by the service.
    #[serde(default)]
    pub size: Option<u64>,
}

/// Fetches attachment content by message id and attachment reference.
///
/// Timeouts, retries and cancellation belong to the implementation; callers
/// only see success or a [`crate::error::TrideskError`].
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
        credential: &str,
    ) -> Result<FetchedAttachment>;
}

#[async_trait]
impl<'a, T: AttachmentFetcher + ?Sized> AttachmentFetcher for &'a T {
    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
        credential: &str,
    ) -> Result<FetchedAttachment> {
        (**self)
            .fetch_attachment(message_id, attachment_id, credential)
            .await
    }
}

#[async_trait]
impl<T: AttachmentFetcher + ?Sized> AttachmentFetcher for std::sync::Arc<T> {
    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
        credential: &str,
    ) -> Result<FetchedAttachment> {
        (**self)
            .fetch_attachment(message_id, attachment_id, credential)
            .await
    }
}
