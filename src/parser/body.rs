//! Body decoding: URL-safe base64 transport decoding and plain-text to HTML promotion.

use std::sync::OnceLock;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Result, TrideskError};

/// URL-safe alphabet, accepting input with or without `=` padding.
const TRANSPORT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode transport-safe data into raw bytes.
///
/// Standard-alphabet characters (`+`, `/`) and embedded whitespace are
/// tolerated; some services line-wrap long payloads.
pub fn decode_transport(data: &str) -> Result<Vec<u8>> {
    let normalized: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    TRANSPORT
        .decode(normalized.as_bytes())
        .map_err(|e| TrideskError::Decode(e.to_string()))
}

/// Decode transport-safe data into UTF-8 text.
///
/// Multi-byte sequences are reassembled from the full byte buffer, never
/// byte by byte. Invalid base64 yields an empty string; invalid UTF-8 is
/// replaced with U+FFFD.
pub fn decode_body_text(data: &str) -> String {
    decode_body_text_with_charset(data, None)
}

/// Decode transport-safe data into text using the part's declared charset.
///
/// `None`, `utf-8` and unknown labels decode as UTF-8.
pub fn decode_body_text_with_charset(data: &str, charset: Option<&str>) -> String {
    let bytes = match decode_transport(data) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed to decode body data, using empty body");
            return String::new();
        }
    };
    decode_charset(charset, &bytes)
}

fn decode_charset(charset: Option<&str>, bytes: &[u8]) -> String {
    let encoding = charset
        .and_then(|label| encoding_rs::Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    if encoding != encoding_rs::UTF_8 {
        debug!(charset = encoding.name(), "Decoding body with declared charset");
    }
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(charset = encoding.name(), "Body contained malformed sequences");
    }
    text.into_owned()
}

/// Convert transport-safe data into standard-alphabet, padded base64 for a
/// `data:` URI. No decoding takes place.
pub fn to_standard_base64(data: &str) -> String {
    let mut out: String = data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while out.len() % 4 != 0 {
        out.push('=');
    }
    out
}

/// Promote a plain-text body to HTML: escape, linkify, then convert line breaks.
///
/// Escaping comes first so that the anchor and `<br>` markup inserted by the
/// later steps is not itself escaped.
pub fn plain_text_to_html(text: &str) -> String {
    let escaped = escape_html(text);
    let linked = linkify(&escaped);
    convert_line_breaks(&linked)
}

/// Escape the five HTML-significant characters. `&` goes first so entities
/// produced by later replacements are not escaped twice.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn url_pattern() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    // Operates on escaped text: `&amp;` belongs to the URL, any other
    // entity (`&quot;`, `&#39;`, `&lt;`, `&gt;`) ends it.
    URL.get_or_init(|| {
        Regex::new(r#"https?://(?:[^\s"'<>&]|&amp;)+"#).expect("valid URL pattern")
    })
}

/// Wrap bare `http(s)://` URLs in anchors. Expects already-escaped text.
fn linkify(escaped: &str) -> String {
    url_pattern()
        .replace_all(escaped, |caps: &regex::Captures<'_>| {
            let url = &caps[0];
            format!(r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#)
        })
        .into_owned()
}

/// Turn `\r\n`, `\r` and `\n` into `<br>`. The two-character sequence is
/// handled first so it yields one break, not two.
fn convert_line_breaks(text: &str) -> String {
    text.replace("\r\n", "<br>")
        .replace('\r', "<br>")
        .replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii() {
        // "Hello, world"
        assert_eq!(decode_body_text("SGVsbG8sIHdvcmxk"), "Hello, world");
    }

    #[test]
    fn test_decode_multibyte_utf8() {
        // "Café ✓ 日本" encoded URL-safe without padding
        let encoded = TRANSPORT.encode("Café ✓ 日本".as_bytes());
        assert_eq!(decode_body_text(&encoded), "Café ✓ 日本");
    }

    #[test]
    fn test_decode_url_safe_alphabet() {
        // Bytes 0xfb 0xff encode to "-_8" in the URL-safe alphabet.
        assert_eq!(decode_transport("-_8").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode_transport("+/8=").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_decode_padded_and_wrapped() {
        assert_eq!(decode_body_text("SGVsbG8=\r\n"), "Hello");
        assert_eq!(decode_body_text("SGVs\nbG8"), "Hello");
    }

    #[test]
    fn test_decode_failure_yields_empty() {
        assert_eq!(decode_body_text("***not base64***"), "");
    }

    #[test]
    fn test_decode_latin1_charset() {
        let encoded = TRANSPORT.encode([0x63, 0x61, 0x66, 0xe9]);
        assert_eq!(
            decode_body_text_with_charset(&encoded, Some("iso-8859-1")),
            "café"
        );
        assert_eq!(decode_body_text_with_charset(&encoded, None), "caf\u{fffd}");
    }

    #[test]
    fn test_to_standard_base64() {
        assert_eq!(to_standard_base64("-_8"), "+/8=");
        assert_eq!(to_standard_base64("iVBORw0KGgo"), "iVBORw0KGgo=");
        assert_eq!(to_standard_base64("AAAA"), "AAAA");
    }

    #[test]
    fn test_escape_order() {
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
        assert_eq!(
            escape_html(r#"<a href="x">'b' & c</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;b&#39; &amp; c&lt;/a&gt;"
        );
    }

    #[test]
    fn test_linkify_plain_url() {
        let html = plain_text_to_html("see https://example.com/a?b=1&c=2 now");
        assert_eq!(
            html,
            "see <a href=\"https://example.com/a?b=1&amp;c=2\" target=\"_blank\" \
             rel=\"noopener noreferrer\">https://example.com/a?b=1&amp;c=2</a> now"
        );
    }

    #[test]
    fn test_linkify_stops_at_quote() {
        let html = plain_text_to_html("\"http://x.io/p\" and 'https://y.io'");
        assert!(html.contains(r#"<a href="http://x.io/p""#));
        assert!(html.contains(r#"<a href="https://y.io""#));
        assert!(html.contains("http://x.io/p</a>&quot;"));
    }

    #[test]
    fn test_line_breaks_all_conventions() {
        assert_eq!(plain_text_to_html("a\r\nb\rc\nd"), "a<br>b<br>c<br>d");
        assert_eq!(plain_text_to_html("a\r\n\r\nb"), "a<br><br>b");
    }

    #[test]
    fn test_script_is_neutralized() {
        let html = plain_text_to_html("<script>alert('x')</script>");
        assert!(!html.contains("<script>"));
        assert!(html.starts_with("&lt;script&gt;"));
    }
}
