//! Display header resolution and date parsing.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use crate::i18n;
use crate::model::message::MessageHeaders;
use crate::model::part::Header;

/// Resolve subject/from/to/date from a header list, substituting localized
/// fallback text for absent or blank values.
pub fn resolve_headers(headers: &[Header], internal_date: Option<&str>) -> MessageHeaders {
    let subject = get_header(headers, "subject")
        .unwrap_or_else(|| i18n::fallback_subject().to_string());
    let from =
        get_header(headers, "from").unwrap_or_else(|| i18n::fallback_sender().to_string());
    let to = get_header(headers, "to").unwrap_or_default();
    let date = get_header(headers, "date").unwrap_or_default();

    let timestamp = parse_date(&date).or_else(|| internal_date.and_then(parse_internal_date));

    MessageHeaders {
        subject,
        from,
        to,
        date,
        timestamp,
    }
}

/// Get the first non-blank value for a header name (case-insensitive).
pub fn get_header(headers: &[Header], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Parse the service's receipt time (epoch milliseconds as a string).
fn parse_internal_date(millis: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = millis.trim().parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

/// Parse an email date string.
///
/// Supports RFC 2822 (with or without a trailing `(UTC)`-style comment),
/// RFC 3339, and a few common named time zones.
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let trimmed = strip_zone_comment(date_str.trim());
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let replaced = replace_named_tz(strip_day_of_week(trimmed));
    let formats = ["%d %b %Y %H:%M:%S %z", "%d %b %Y %H:%M %z", "%Y-%m-%d %H:%M:%S %z"];
    for fmt in &formats {
        if let Ok(dt) = DateTime::parse_from_str(&replaced, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(&replaced, "%d %b %Y %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    debug!(date = trimmed, "Could not parse date");
    None
}

/// Drop a trailing comment such as `(UTC)` or `(PST)`.
fn strip_zone_comment(s: &str) -> &str {
    match s.rfind('(') {
        Some(pos) if s.ends_with(')') => s[..pos].trim_end(),
        _ => s,
    }
}

/// Strip a leading day-of-week prefix (`"Thu, "`).
fn strip_day_of_week(s: &str) -> &str {
    match s.split_once(',') {
        Some((dow, rest)) if dow.len() == 3 && dow.chars().all(|c| c.is_ascii_alphabetic()) => {
            rest.trim_start()
        }
        _ => s,
    }
}

/// Replace a trailing time zone abbreviation with its numeric offset.
fn replace_named_tz(s: &str) -> String {
    let tzs = [
        ("EST", "-0500"),
        ("EDT", "-0400"),
        ("CST", "-0600"),
        ("CDT", "-0500"),
        ("MST", "-0700"),
        ("MDT", "-0600"),
        ("PST", "-0800"),
        ("PDT", "-0700"),
        ("GMT", "+0000"),
        ("UTC", "+0000"),
        ("CEST", "+0200"),
        ("CET", "+0100"),
    ];
    for (name, offset) in &tzs {
        if let Some(head) = s.strip_suffix(name) {
            return format!("{head}{offset}");
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(name: &str, value: &str) -> Header {
        Header {
            name: name.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_resolve_all_present() {
        let headers = vec![
            h("Subject", "Quarterly report"),
            h("From", "Alice <alice@example.com>"),
            h("To", "bob@example.com"),
            h("Date", "Tue, 14 Jan 2025 09:30:00 +0100"),
        ];
        let resolved = resolve_headers(&headers, None);
        assert_eq!(resolved.subject, "Quarterly report");
        assert_eq!(resolved.from, "Alice <alice@example.com>");
        assert_eq!(resolved.to, "bob@example.com");
        assert_eq!(
            resolved.timestamp.map(|t| t.to_rfc3339()),
            Some("2025-01-14T08:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_resolve_fallbacks() {
        let resolved = resolve_headers(&[h("Subject", "   ")], Some("1700000000000"));
        assert_eq!(resolved.subject, "(No Subject)");
        assert_eq!(resolved.from, "(Unknown Sender)");
        assert_eq!(resolved.to, "");
        assert_eq!(resolved.date, "");
        assert_eq!(resolved.timestamp.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let headers = vec![h("SUBJECT", "Hi")];
        assert_eq!(get_header(&headers, "subject").as_deref(), Some("Hi"));
    }

    #[test]
    fn test_parse_date_with_zone_comment() {
        let dt = parse_date("Mon, 3 Feb 2025 17:04:11 +0000 (UTC)").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-02-03T17:04:11+00:00");
    }

    #[test]
    fn test_parse_date_named_tz() {
        let dt = parse_date("Mon, 3 Feb 2025 12:00:00 EST").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-02-03T17:00:00+00:00");
    }

    #[test]
    fn test_parse_date_rfc3339() {
        let dt = parse_date("2025-02-03T17:04:11Z").unwrap();
        assert_eq!(dt.timestamp(), 1_738_602_251);
    }

    #[test]
    fn test_parse_date_garbage() {
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("").is_none());
    }
}
