//! RRULE parsing and building.
//!
//! # Supported parts
//!
//! `FREQ` (DAILY, WEEKLY, MONTHLY, YEARLY), `INTERVAL`, `COUNT`, `UNTIL`,
//! `BYDAY`, `BYMONTHDAY`, `BYMONTH`, `BYSETPOS`, `WKST`.
//!
//! Unknown parts are ignored so that rules written by richer clients still
//! yield their known parts. A string without a usable `FREQ` is not a rule.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::model::recurrence::{Frequency, RecurrenceRule, Until, Weekday};

/// Prefix used when a rule is stored as a calendar recurrence line.
pub const RRULE_PREFIX: &str = "RRULE:";

/// Parse a rule string, with or without the `RRULE:` prefix.
///
/// Returns `None` for empty input or when no supported `FREQ` is present.
pub fn parse_rule(input: &str) -> Option<RecurrenceRule> {
    let text = strip_prefix(input.trim());
    if text.is_empty() {
        return None;
    }

    let mut frequency = None;
    let mut rule = RecurrenceRule::new(Frequency::Daily);

    for clause in text.split(';') {
        let Some((key, value)) = clause.split_once('=') else {
            if !clause.trim().is_empty() {
                debug!(clause, "Ignoring RRULE clause without '='");
            }
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_uppercase().as_str() {
            "FREQ" => frequency = Frequency::from_code(value),
            "INTERVAL" => {
                if let Some(n) = parse_positive(value) {
                    rule.interval = n;
                }
            }
            "COUNT" => rule.count = parse_positive(value),
            "UNTIL" => rule.until = parse_until(value),
            "BYDAY" => rule.by_day = parse_list(value),
            "BYMONTHDAY" => rule.by_month_day = parse_list(value),
            "BYMONTH" => rule.by_month = parse_list(value),
            "BYSETPOS" => rule.by_set_pos = parse_list(value),
            "WKST" => rule.week_start = Weekday::from_code(value),
            other => debug!(key = other, "Ignoring unsupported RRULE part"),
        }
    }

    rule.frequency = frequency?;
    Some(rule)
}

/// Build the canonical rule string (no prefix).
///
/// Order is fixed: `FREQ`, `INTERVAL` (only when > 1), `COUNT`, `UNTIL`,
/// `BYDAY`, `BYMONTHDAY`, `BYMONTH`, `BYSETPOS`, `WKST`. Both `COUNT` and
/// `UNTIL` are emitted if both are set.
///
/// Values the parser would reject are normalized: an interval of 0 is
/// treated as 1, a count of 0 is dropped, and a weekday with ordinal 0 is
/// written as the bare weekday.
pub fn build_rule(rule: &RecurrenceRule) -> String {
    let mut parts = vec![format!("FREQ={}", rule.frequency.code())];

    if rule.interval > 1 {
        parts.push(format!("INTERVAL={}", rule.interval));
    }
    if let Some(count) = rule.count.filter(|&c| c > 0) {
        parts.push(format!("COUNT={count}"));
    }
    if let Some(until) = &rule.until {
        parts.push(format!("UNTIL={}", format_until(until)));
    }
    if !rule.by_day.is_empty() {
        parts.push(format!("BYDAY={}", join(&rule.by_day)));
    }
    if !rule.by_month_day.is_empty() {
        parts.push(format!("BYMONTHDAY={}", join(&rule.by_month_day)));
    }
    if !rule.by_month.is_empty() {
        parts.push(format!("BYMONTH={}", join(&rule.by_month)));
    }
    if !rule.by_set_pos.is_empty() {
        parts.push(format!("BYSETPOS={}", join(&rule.by_set_pos)));
    }
    if let Some(day) = rule.week_start {
        parts.push(format!("WKST={}", day.code()));
    }

    parts.join(";")
}

/// Format an `UNTIL` value in the compact form it was parsed from.
pub fn format_until(until: &Until) -> String {
    match until {
        Until::Date(date) => date.format("%Y%m%d").to_string(),
        Until::DateTime { value, utc: true } => value.format("%Y%m%dT%H%M%SZ").to_string(),
        Until::DateTime { value, utc: false } => value.format("%Y%m%dT%H%M%S").to_string(),
    }
}

/// Parse `YYYYMMDD`, `YYYYMMDDTHHMMSS` or `YYYYMMDDTHHMMSSZ`.
pub fn parse_until(value: &str) -> Option<Until> {
    let value = value.trim();
    let parsed = if let Some(stamp) = value.strip_suffix(['Z', 'z']) {
        NaiveDateTime::parse_from_str(&stamp.to_ascii_uppercase(), "%Y%m%dT%H%M%S")
            .ok()
            .map(|value| Until::DateTime { value, utc: true })
    } else if value.contains(['T', 't']) {
        NaiveDateTime::parse_from_str(&value.to_ascii_uppercase(), "%Y%m%dT%H%M%S")
            .ok()
            .map(|value| Until::DateTime { value, utc: false })
    } else if value.len() == 8 {
        NaiveDate::parse_from_str(value, "%Y%m%d").ok().map(Until::Date)
    } else {
        None
    };
    if parsed.is_none() {
        debug!(value, "Ignoring unparseable UNTIL");
    }
    parsed
}

fn strip_prefix(text: &str) -> &str {
    match text.get(..RRULE_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(RRULE_PREFIX) => &text[RRULE_PREFIX.len()..],
        _ => text,
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Split a comma list, dropping entries that do not parse.
fn parse_list<T: FromStr>(value: &str) -> Vec<T> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| match item.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!(item, "Ignoring unparseable RRULE list entry");
                None
            }
        })
        .collect()
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&build_rule(self))
    }
}

/// Error returned when a string holds no usable rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoRule;

impl fmt::Display for NoRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no recurrence rule (missing or unsupported FREQ)")
    }
}

impl std::error::Error for NoRule {}

impl FromStr for RecurrenceRule {
    type Err = NoRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rule(s).ok_or(NoRule)
    }
}

impl RecurrenceRule {
    /// The rule as a calendar recurrence line (`RRULE:FREQ=…`).
    pub fn to_rrule_line(&self) -> String {
        format!("{RRULE_PREFIX}{}", build_rule(self))
    }
}
