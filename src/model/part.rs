//! Raw message payloads as delivered by the mailbox service (JSON part trees).

use serde::{Deserialize, Serialize};

/// A raw message as returned by the message detail endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    /// Service-assigned message identifier.
    pub id: String,

    /// Conversation identifier.
    #[serde(default)]
    pub thread_id: Option<String>,

    /// Label tokens (e.g. `UNREAD`, `INBOX`, `STARRED`).
    #[serde(default)]
    pub label_ids: Vec<String>,

    /// Plain preview text.
    #[serde(default)]
    pub snippet: Option<String>,

    /// Receipt time in epoch milliseconds, encoded as a decimal string.
    #[serde(default)]
    pub internal_date: Option<String>,

    /// Root of the MIME part tree. `None` for metadata-only responses.
    #[serde(default)]
    pub payload: Option<RawMessagePart>,
}

/// A single node in a message's MIME part tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessagePart {
    /// Part identifier within the tree (`""`, `"0"`, `"1.2"`, …).
    #[serde(default)]
    pub part_id: Option<String>,

    /// MIME type, e.g. `text/html`, `image/png`, `multipart/alternative`.
    #[serde(default)]
    pub mime_type: String,

    /// Attachment filename; empty for body and container parts.
    #[serde(default)]
    pub filename: String,

    /// Part headers in wire order. `None` when the service omitted the list.
    #[serde(default)]
    pub headers: Option<Vec<Header>>,

    /// Inline data or out-of-band attachment reference.
    #[serde(default)]
    pub body: Option<PartBody>,

    /// Child parts.
    #[serde(default)]
    pub parts: Vec<RawMessagePart>,
}

/// A header name/value pair. Names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Body of a part: either inline transport-encoded data or an attachment reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    /// Opaque reference used to fetch out-of-band content.
    #[serde(default)]
    pub attachment_id: Option<String>,

    /// Decoded size in bytes as reported by the service.
    #[serde(default)]
    pub size: u64,

    /// URL-safe base64 content.
    #[serde(default)]
    pub data: Option<String>,
}

impl RawMessagePart {
    /// Headers of this part, or an empty slice when the list is absent.
    pub fn headers(&self) -> &[Header] {
        self.headers.as_deref().unwrap_or(&[])
    }

    /// First value of the named header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers()
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Inline data, if present and non-empty.
    pub fn inline_data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// Out-of-band attachment reference, if present and non-empty.
    pub fn attachment_id(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.attachment_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// The bare MIME type, lowercased, without parameters.
    pub fn essence(&self) -> String {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }

    /// Declared `charset` parameter of the `Content-Type` header, if any.
    pub fn charset(&self) -> Option<String> {
        let content_type = self.header("content-type")?;
        content_type.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"').to_string())
            } else {
                None
            }
        })
    }
}
