//! Message normalization: walk the payload, pick and decode the body, collect
//! attachments, resolve inline images and rewrite `cid:` references.

use futures::future::join_all;
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::error::{Result, TrideskError};
use crate::model::message::{ImageSource, NormalizedMessage};
use crate::model::part::RawMessage;
use crate::store::AttachmentFetcher;

use super::body::{decode_body_text_with_charset, plain_text_to_html};
use super::header::resolve_headers;
use super::inline::{resolve_inline_images, rewrite_cid_references, ResolveOptions};
use super::walker::{scan_payload, BodyCandidate, PayloadScan};

/// Normalizes raw messages, fetching out-of-band inline images through `F`.
///
/// Holds no per-message state, so one normalizer can serve any number of
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct MessageNormalizer<F> {
    fetcher: F,
    fetch_inline_images: bool,
    resolve: ResolveOptions,
}

impl<F: AttachmentFetcher> MessageNormalizer<F> {
    /// A normalizer with default limits.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            fetch_inline_images: true,
            resolve: ResolveOptions::default(),
        }
    }

    /// A normalizer configured from the `[mail]` config section.
    pub fn with_config(fetcher: F, config: &MailConfig) -> Self {
        Self {
            fetcher,
            fetch_inline_images: config.fetch_inline_images,
            resolve: ResolveOptions {
                max_concurrent_fetches: config.max_concurrent_fetches,
                max_image_bytes: config.max_inline_image_bytes,
            },
        }
    }

    /// Normalize one message.
    ///
    /// Fails only with [`TrideskError::MalformedMessage`] when the payload or
    /// its header list is absent. Decode and fetch failures are absorbed.
    pub async fn normalize(&self, raw: &RawMessage, credential: &str) -> Result<NormalizedMessage> {
        let payload = raw
            .payload
            .as_ref()
            .ok_or_else(|| TrideskError::MalformedMessage(raw.id.clone()))?;
        let headers = payload
            .headers
            .as_deref()
            .ok_or_else(|| TrideskError::MalformedMessage(raw.id.clone()))?;

        let PayloadScan {
            html,
            plain,
            attachments,
            inline_images,
        } = scan_payload(payload);

        let body = select_body(html, plain);

        let candidates = if self.fetch_inline_images {
            inline_images
        } else {
            // Only what is already embedded; nothing goes over the network.
            inline_images
                .into_iter()
                .filter(|c| matches!(c.source, ImageSource::Embedded(_)))
                .collect()
        };
        let inline_images =
            resolve_inline_images(&self.fetcher, &raw.id, credential, candidates, self.resolve)
                .await;
        let body = rewrite_cid_references(&body, &inline_images);

        debug!(
            message_id = %raw.id,
            attachments = attachments.len(),
            inline_images = inline_images.len(),
            "Normalized message"
        );

        Ok(NormalizedMessage {
            id: raw.id.clone(),
            thread_id: raw.thread_id.clone().unwrap_or_default(),
            snippet: raw.snippet.clone().unwrap_or_default(),
            body,
            label_ids: raw.label_ids.iter().cloned().collect(),
            attachments,
            inline_images,
            headers: resolve_headers(headers, raw.internal_date.as_deref()),
        })
    }

    /// Normalize a batch concurrently, keeping input order.
    ///
    /// Malformed messages are left out of the result.
    pub async fn normalize_batch(
        &self,
        raws: &[RawMessage],
        credential: &str,
    ) -> Vec<NormalizedMessage> {
        let results = join_all(raws.iter().map(|raw| self.normalize(raw, credential))).await;
        let total = results.len();
        let normalized: Vec<NormalizedMessage> = results
            .into_iter()
            .filter_map(|result| match result {
                Ok(message) => Some(message),
                Err(e) => {
                    debug!(error = %e, "Dropping message from batch");
                    None
                }
            })
            .collect();
        if normalized.len() < total {
            info!(
                dropped = total - normalized.len(),
                total, "Dropped malformed messages"
            );
        }
        normalized
    }
}

/// HTML always wins; plain text is promoted only when no HTML part exists.
fn select_body(html: Option<BodyCandidate<'_>>, plain: Option<BodyCandidate<'_>>) -> String {
    if let Some(html) = html {
        return decode_candidate(html);
    }
    if let Some(plain) = plain {
        return plain_text_to_html(&decode_candidate(plain));
    }
    String::new()
}

fn decode_candidate(candidate: BodyCandidate<'_>) -> String {
    let charset = candidate.part.charset();
    decode_body_text_with_charset(candidate.data, charset.as_deref())
}

/// Normalize one message with a borrowed fetcher and default limits.
pub async fn normalize_message<F>(
    raw: &RawMessage,
    credential: &str,
    fetcher: &F,
) -> Result<NormalizedMessage>
where
    F: AttachmentFetcher,
{
    MessageNormalizer::new(fetcher).normalize(raw, credential).await
}
