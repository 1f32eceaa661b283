//! Normalized, renderable message records.
//!
//! A [`NormalizedMessage`] is built fresh on every fetch and never mutated
//! afterwards; a newer fetch simply replaces it.

use std::collections::BTreeSet;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flat, renderable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMessage {
    pub id: String,
    pub thread_id: String,
    /// Plain preview text.
    pub snippet: String,
    /// HTML body with `cid:` references rewritten to `data:` URIs.
    /// Empty when the payload carries no text part.
    pub body: String,
    pub label_ids: BTreeSet<String>,
    /// Downloadable attachments in traversal order.
    pub attachments: Vec<AttachmentRef>,
    /// Inline images that were resolved to embedded data, in candidate order.
    pub inline_images: Vec<InlineImage>,
    pub headers: MessageHeaders,
}

/// Resolved display headers, with fallback text for absent ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeaders {
    pub subject: String,
    pub from: String,
    pub to: String,
    /// Raw `Date` header value (empty when absent).
    pub date: String,
    /// Parsed receipt time: the `Date` header, else the service's internal date.
    pub timestamp: Option<DateTime<Utc>>,
}

/// A downloadable attachment descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    /// Opaque reference for the attachment retrieval collaborator.
    pub attachment_id: String,
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
}

/// An inline image resolved to embedded data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    /// Content-ID without angle brackets.
    pub content_id: String,
    pub mime_type: String,
    /// Standard-alphabet base64.
    pub data: String,
}

/// An inline image as found in the part tree, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImageCandidate {
    /// Content-ID without angle brackets.
    pub content_id: String,
    pub mime_type: String,
    pub source: ImageSource,
}

/// Where a candidate's bytes live. Exactly one source exists per candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Standard-alphabet base64 carried inline in the part tree.
    Embedded(String),
    /// Attachment reference to fetch out of band.
    External(String),
}

impl NormalizedMessage {
    /// `true` if the message carries the `UNREAD` label.
    pub fn is_unread(&self) -> bool {
        self.label_ids.contains("UNREAD")
    }

    /// `true` if the message carries the `STARRED` label.
    pub fn is_starred(&self) -> bool {
        self.label_ids.contains("STARRED")
    }

    /// `true` if the message carries the `INBOX` label.
    pub fn is_in_inbox(&self) -> bool {
        self.label_ids.contains("INBOX")
    }

    /// `true` if the message carries the `IMPORTANT` label.
    pub fn is_important(&self) -> bool {
        self.label_ids.contains("IMPORTANT")
    }
}

impl MessageHeaders {
    /// The receipt time rendered with a strftime `format`.
    ///
    /// Falls back to the raw `Date` header when there is no timestamp or the
    /// format string is invalid.
    pub fn display_date(&self, format: &str) -> String {
        let Some(timestamp) = self.timestamp else {
            return self.date.clone();
        };
        let mut out = String::new();
        if write!(out, "{}", timestamp.format(format)).is_err() {
            return self.date.clone();
        }
        out
    }
}

impl AttachmentRef {
    /// Size formatted for display (e.g. `"1.5 MB"`).
    pub fn display_size(&self) -> String {
        humansize::format_size(self.size, humansize::DECIMAL)
    }
}

impl InlineImage {
    /// `data:` URI suitable for an `<img src>` attribute.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
