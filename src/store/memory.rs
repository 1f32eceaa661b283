//! In-memory attachment store, optionally loaded from a JSON file of the form
//! `{ "<messageId>": { "<attachmentId>": { "mimeType": …, "data": …, "size": … } } }`.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Result, TrideskError};

use super::{AttachmentFetcher, FetchedAttachment};

/// Attachments keyed by message id, then attachment reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryAttachmentStore {
    messages: HashMap<String, HashMap<String, FetchedAttachment>>,
}

impl MemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| TrideskError::io(path, e))?;
        let store = Self::from_json(&contents)?;
        debug!(path = %path.display(), messages = store.messages.len(), "Loaded attachment store");
        Ok(store)
    }

    /// Parse a store from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            messages: serde_json::from_str(json)?,
        })
    }

    /// Add or replace one attachment.
    pub fn insert(
        &mut self,
        message_id: impl Into<String>,
        attachment_id: impl Into<String>,
        attachment: FetchedAttachment,
    ) {
        self.messages
            .entry(message_id.into())
            .or_default()
            .insert(attachment_id.into(), attachment);
    }

    /// Look up one attachment without going through the async contract.
    pub fn get(&self, message_id: &str, attachment_id: &str) -> Option<&FetchedAttachment> {
        self.messages.get(message_id)?.get(attachment_id)
    }

    /// Total number of attachments held.
    pub fn len(&self) -> usize {
        self.messages.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AttachmentFetcher for MemoryAttachmentStore {
    async fn fetch_attachment(
        &self,
        message_id: &str,
        attachment_id: &str,
        _credential: &str,
    ) -> Result<FetchedAttachment> {
        self.get(message_id, attachment_id)
            .cloned()
            .ok_or_else(|| TrideskError::AttachmentNotFound {
                message_id: message_id.to_string(),
                attachment_id: attachment_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let store = MemoryAttachmentStore::from_json(
            r#"{"m1": {"a1": {"mimeType": "image/png", "data": "iVBORw0KGgo", "size": 8}},
                "m2": {"a2": {"data": "AAAA"}, "a3": {"data": "BBBB"}}}"#,
        )
        .unwrap();
        assert_eq!(store.len(), 3);
        let a1 = store.get("m1", "a1").unwrap();
        assert_eq!(a1.mime_type.as_deref(), Some("image/png"));
        assert_eq!(a1.size, Some(8));
        assert!(store.get("m2", "a2").unwrap().mime_type.is_none());
        assert!(store.get("m1", "a2").is_none());
    }

    #[test]
    fn test_from_json_invalid() {
        let err = MemoryAttachmentStore::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, TrideskError::Json(_)));
    }

    #[tokio::test]
    async fn test_fetch_missing_is_not_found() {
        let store = MemoryAttachmentStore::new();
        assert!(store.is_empty());
        let err = store.fetch_attachment("m", "a", "token").await.unwrap_err();
        assert!(matches!(err, TrideskError::AttachmentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_fetch_present() {
        let mut store = MemoryAttachmentStore::new();
        store.insert(
            "m",
            "a",
            FetchedAttachment {
                mime_type: None,
                data: "SGk".into(),
                size: None,
            },
        );
        let fetched = store.fetch_attachment("m", "a", "").await.unwrap();
        assert_eq!(fetched.data, "SGk");
    }
}
