//! Inline image resolution: fetch out-of-band image bytes and rewrite `cid:`
//! references in body HTML to embedded `data:` URIs.

use futures::stream::{self, StreamExt};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::model::message::{ImageSource, InlineImage, InlineImageCandidate};
use crate::store::AttachmentFetcher;

use super::body::{decode_transport, to_standard_base64};

/// Characters left unescaped by a browser's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Limits applied while resolving one message's inline images.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Fetches in flight at once for one message (minimum 1).
    pub max_concurrent_fetches: usize,
    /// Skip fetched images larger than this many decoded bytes (0 = no limit).
    pub max_image_bytes: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            max_image_bytes: 0,
        }
    }
}

/// Resolve every candidate to embedded data.
///
/// Embedded candidates pass through. External ones are fetched concurrently;
/// a failed fetch drops only that image. The result keeps candidate order.
pub async fn resolve_inline_images<F>(
    fetcher: &F,
    message_id: &str,
    credential: &str,
    candidates: Vec<InlineImageCandidate>,
    options: ResolveOptions,
) -> Vec<InlineImage>
where
    F: AttachmentFetcher + ?Sized,
{
    stream::iter(candidates)
        .map(|candidate| resolve_one(fetcher, message_id, credential, candidate, options))
        .buffered(options.max_concurrent_fetches.max(1))
        .filter_map(|resolved| async move { resolved })
        .collect()
        .await
}

async fn resolve_one<F>(
    fetcher: &F,
    message_id: &str,
    credential: &str,
    candidate: InlineImageCandidate,
    options: ResolveOptions,
) -> Option<InlineImage>
where
    F: AttachmentFetcher + ?Sized,
{
    let InlineImageCandidate {
        content_id,
        mime_type,
        source,
    } = candidate;

    let data = match source {
        ImageSource::Embedded(data) => data,
        ImageSource::External(attachment_id) => {
            let fetched = match fetcher
                .fetch_attachment(message_id, &attachment_id, credential)
                .await
            {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!(
                        message_id,
                        attachment_id = %attachment_id,
                        error = %e,
                        "Failed to fetch inline image, leaving cid reference unresolved"
                    );
                    return None;
                }
            };
            let bytes = match decode_transport(&fetched.data) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(
                        message_id,
                        attachment_id = %attachment_id,
                        error = %e,
                        "Fetched inline image is not valid base64, skipping"
                    );
                    return None;
                }
            };
            if options.max_image_bytes > 0 && bytes.len() > options.max_image_bytes {
                debug!(
                    message_id,
                    attachment_id = %attachment_id,
                    size = bytes.len(),
                    "Inline image exceeds size limit, skipping"
                );
                return None;
            }
            to_standard_base64(&fetched.data)
        }
    };

    Some(InlineImage {
        content_id,
        mime_type,
        data,
    })
}

/// Replace `src="cid:ID"` / `src='cid:ID'` with the image's `data:` URI.
///
/// Matching is case-insensitive and also covers the percent-encoded form of
/// the content id. The original quote character is kept. Encodings other
/// than the single `encodeURIComponent` form (e.g. `+` for a space) are not
/// matched.
pub fn rewrite_cid_references(body: &str, images: &[InlineImage]) -> String {
    let mut html = body.to_string();
    for image in images {
        let data_uri = image.data_uri();
        html = replace_cid(&html, &image.content_id, &data_uri);

        let encoded = utf8_percent_encode(&image.content_id, URI_COMPONENT).to_string();
        if encoded != image.content_id {
            html = replace_cid(&html, &encoded, &data_uri);
        }
    }
    html
}

fn replace_cid(html: &str, content_id: &str, data_uri: &str) -> String {
    let pattern = format!(r#"(?i)(src=)(["'])cid:{}(["'])"#, regex::escape(content_id));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!(content_id, error = %e, "Could not build cid pattern");
            return html.to_string();
        }
    };
    re.replace_all(html, |caps: &Captures<'_>| {
        // Quotes must pair up: src="cid:x' is not a reference.
        if caps[2] != caps[3] {
            return caps[0].to_string();
        }
        format!("{}{}{}{}", &caps[1], &caps[2], data_uri, &caps[2])
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TrideskError};
    use crate::store::memory::MemoryAttachmentStore;
    use crate::store::FetchedAttachment;

    fn png(cid: &str, data: &str) -> InlineImage {
        InlineImage {
            content_id: cid.into(),
            mime_type: "image/png".into(),
            data: data.into(),
        }
    }

    #[test]
    fn test_rewrite_double_quotes() {
        let out = rewrite_cid_references(r#"<img src="cid:foo@bar.com">"#, &[png("foo@bar.com", "QUJD")]);
        assert_eq!(out, r#"<img src="data:image/png;base64,QUJD">"#);
        assert!(!out.contains("cid:"));
    }

    #[test]
    fn test_rewrite_single_quotes_preserved() {
        let out = rewrite_cid_references("<img src='cid:image123'>", &[png("image123", "QUJD")]);
        assert_eq!(out, "<img src='data:image/png;base64,QUJD'>");
    }

    #[test]
    fn test_rewrite_case_insensitive() {
        let out = rewrite_cid_references(r#"<IMG SRC="CID:Logo">"#, &[png("logo", "QQ==")]);
        assert_eq!(out, r#"<IMG SRC="data:image/png;base64,QQ==">"#);
    }

    #[test]
    fn test_rewrite_percent_encoded_id() {
        let out = rewrite_cid_references(
            r#"<img src="cid:part1%40example.com"><img src="cid:part1@example.com">"#,
            &[png("part1@example.com", "QUJD")],
        );
        assert_eq!(out.matches("data:image/png;base64,QUJD").count(), 2);
        assert!(!out.contains("cid:"));
    }

    #[test]
    fn test_rewrite_other_encodings_not_matched() {
        // Form-style `+` for space is not the encodeURIComponent form.
        let body = r#"<img src="cid:my+logo">"#;
        assert_eq!(rewrite_cid_references(body, &[png("my logo", "QUJD")]), body);

        let out = rewrite_cid_references(r#"<img src="cid:my%20logo">"#, &[png("my logo", "QUJD")]);
        assert!(!out.contains("cid:"));
    }

    #[test]
    fn test_rewrite_mismatched_quotes_untouched() {
        let body = r#"<img src="cid:x'>"#;
        assert_eq!(rewrite_cid_references(body, &[png("x", "QQ==")]), body);
    }

    #[test]
    fn test_rewrite_regex_metacharacters() {
        let out = rewrite_cid_references(
            r#"<img src="cid:a.b+c"><img src="cid:aXb+c">"#,
            &[png("a.b+c", "QQ==")],
        );
        assert!(out.contains(r#"src="data:image/png;base64,QQ==""#));
        assert!(out.contains(r#"src="cid:aXb+c""#));
    }

    #[test]
    fn test_percent_encoding_matches_uri_component() {
        let encoded = utf8_percent_encode("a@b c!*'()~", URI_COMPONENT).to_string();
        assert_eq!(encoded, "a%40b%20c!*'()~");
    }

    struct FlakyFetcher;

    #[async_trait::async_trait]
    impl AttachmentFetcher for FlakyFetcher {
        async fn fetch_attachment(&self, _m: &str, attachment_id: &str, _c: &str) -> Result<FetchedAttachment> {
            if attachment_id == "bad" {
                return Err(TrideskError::fetch("m", attachment_id, "connection reset"));
            }
            Ok(FetchedAttachment {
                mime_type: Some("image/gif".into()),
                data: "R0lG-w".into(),
                size: None,
            })
        }
    }

    fn candidate(cid: &str, source: ImageSource) -> InlineImageCandidate {
        InlineImageCandidate {
            content_id: cid.into(),
            mime_type: "image/png".into(),
            source,
        }
    }

    #[tokio::test]
    async fn test_resolve_skips_failed_and_keeps_order() {
        let candidates = vec![
            candidate("one", ImageSource::External("good".into())),
            candidate("two", ImageSource::External("bad".into())),
            candidate("three", ImageSource::Embedded("QUJD".into())),
            candidate("four", ImageSource::External("good".into())),
        ];
        let resolved =
            resolve_inline_images(&FlakyFetcher, "m", "tok", candidates, ResolveOptions::default())
                .await;
        let ids: Vec<&str> = resolved.iter().map(|i| i.content_id.as_str()).collect();
        assert_eq!(ids, vec!["one", "three", "four"]);
        assert_eq!(resolved[0].data, "R0lG+w==");
        // The part's declared type is kept over the fetch response's.
        assert_eq!(resolved[0].mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_resolve_respects_size_limit() {
        let mut store = MemoryAttachmentStore::new();
        store.insert(
            "m",
            "big",
            FetchedAttachment {
                mime_type: None,
                data: "AAAAAAAA".into(), // 6 bytes
                size: None,
            },
        );
        let options = ResolveOptions {
            max_concurrent_fetches: 1,
            max_image_bytes: 4,
        };
        let resolved = resolve_inline_images(
            &store,
            "m",
            "",
            vec![candidate("big", ImageSource::External("big".into()))],
            options,
        )
        .await;
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_skips_undecodable_without_size_limit() {
        let mut store = MemoryAttachmentStore::new();
        store.insert(
            "m",
            "junk",
            FetchedAttachment {
                mime_type: None,
                data: "***".into(),
                size: None,
            },
        );
        let candidates = vec![
            candidate("junk", ImageSource::External("junk".into())),
            candidate("ok", ImageSource::Embedded("QUJD".into())),
        ];
        let resolved =
            resolve_inline_images(&store, "m", "", candidates, ResolveOptions::default()).await;
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].content_id, "ok");

        let body = rewrite_cid_references(
            r#"<img src="cid:junk"><img src="cid:ok">"#,
            &resolved,
        );
        assert_eq!(
            body,
            r#"<img src="cid:junk"><img src="data:image/png;base64,QUJD">"#
        );
    }
}
