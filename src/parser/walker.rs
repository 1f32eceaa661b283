//! MIME payload walker: one depth-first, pre-order pass over a part tree that
//! collects body candidates, attachment descriptors and inline image candidates.
//!
//! The input tree is never modified. Earlier-declared and shallower parts are
//! visited first, so the preferred representation of a `multipart/alternative`
//! (conventionally listed first) wins.

use tracing::debug;

use crate::model::message::{AttachmentRef, ImageSource, InlineImageCandidate};
use crate::model::part::RawMessagePart;

use super::body::to_standard_base64;

/// A text part selected as a body candidate.
#[derive(Debug, Clone, Copy)]
pub struct BodyCandidate<'a> {
    /// Transport-encoded content.
    pub data: &'a str,
    /// The part, for charset lookup.
    pub part: &'a RawMessagePart,
}

/// Everything the walker found in one payload.
#[derive(Debug, Default)]
pub struct PayloadScan<'a> {
    /// First `text/html` part with inline data.
    pub html: Option<BodyCandidate<'a>>,
    /// First `text/plain` part with inline data.
    pub plain: Option<BodyCandidate<'a>>,
    /// One entry per attachment occurrence, in traversal order.
    pub attachments: Vec<AttachmentRef>,
    /// One entry per inline image occurrence, in traversal order.
    pub inline_images: Vec<InlineImageCandidate>,
}

/// Walk `root` and everything below it.
pub fn scan_payload(root: &RawMessagePart) -> PayloadScan<'_> {
    let mut scan = PayloadScan::default();
    visit(root, &mut scan);
    scan
}

fn visit<'a>(part: &'a RawMessagePart, scan: &mut PayloadScan<'a>) {
    let essence = part.essence();

    if let Some(data) = part.inline_data() {
        let slot = match essence.as_str() {
            "text/html" => Some(&mut scan.html),
            "text/plain" => Some(&mut scan.plain),
            _ => None,
        };
        // First found wins; later candidates of the same kind are ignored.
        if let Some(slot) = slot {
            if slot.is_none() {
                *slot = Some(BodyCandidate { data, part });
            }
        }
    }

    if let Some(attachment_id) = part.attachment_id() {
        if !part.filename.is_empty() {
            scan.attachments.push(AttachmentRef {
                attachment_id: attachment_id.to_string(),
                filename: part.filename.clone(),
                mime_type: part.mime_type.clone(),
                size: part.body.as_ref().map_or(0, |b| b.size),
            });
        }
    }

    if essence.starts_with("image/") {
        if let Some(candidate) = inline_image_candidate(part) {
            scan.inline_images.push(candidate);
        }
    }

    for child in &part.parts {
        visit(child, scan);
    }
}

fn inline_image_candidate(part: &RawMessagePart) -> Option<InlineImageCandidate> {
    let content_id = canonical_content_id(part.header("content-id")?);

    let source = if let Some(data) = part.inline_data() {
        ImageSource::Embedded(to_standard_base64(data))
    } else if let Some(attachment_id) = part.attachment_id() {
        ImageSource::External(attachment_id.to_string())
    } else {
        debug!(content_id = %content_id, "Inline image has neither data nor reference, skipping");
        return None;
    };

    Some(InlineImageCandidate {
        content_id,
        mime_type: part.mime_type.clone(),
        source,
    })
}

/// Strip one wrapping `<` ... `>` pair from a Content-ID header value.
/// A lone bracket on either side is kept.
pub fn canonical_content_id(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(trimmed)
        .to_string()
}
