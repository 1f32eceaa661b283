//! Recurrence rule types (RFC 5545 RRULE subset) and the flat UI form state.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Repetition frequency. A rule without one is not a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The RRULE token (`DAILY`, `WEEKLY`, …).
    pub fn code(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parse an RRULE token, case-insensitively. Unsupported frequencies
    /// (`HOURLY`, `SECONDLY`, …) yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Day of the week, serialized as its two-letter RRULE token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "MO")]
    Monday,
    #[serde(rename = "TU")]
    Tuesday,
    #[serde(rename = "WE")]
    Wednesday,
    #[serde(rename = "TH")]
    Thursday,
    #[serde(rename = "FR")]
    Friday,
    #[serde(rename = "SA")]
    Saturday,
    #[serde(rename = "SU")]
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// The two-letter RRULE token.
    pub fn code(self) -> &'static str {
        match self {
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }

    /// Parse a bare two-letter token, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.code().eq_ignore_ascii_case(code.trim()))
    }
}

/// A `BYDAY` entry: a weekday, optionally prefixed with a signed ordinal
/// ("2nd Tuesday" = `2TU`, "last Friday" = `-1FR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekdayNum {
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// A bare weekday entry (no ordinal).
    pub fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// The `n`th occurrence of `weekday` in the period (negative counts from the end).
    pub fn nth(ordinal: i8, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ordinal {
            Some(n) if n != 0 => write!(f, "{n}{}", self.weekday.code()),
            _ => f.write_str(self.weekday.code()),
        }
    }
}

impl FromStr for WeekdayNum {
    type Err = String;

    /// Accepts `MO`, `2TU`, `+2TU`, `-1FR`. An ordinal of zero is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() < 2 || !s.is_char_boundary(s.len() - 2) {
            return Err(format!("invalid weekday token: {s:?}"));
        }
        let (prefix, day) = s.split_at(s.len() - 2);
        let weekday = Weekday::from_code(day).ok_or_else(|| format!("invalid weekday: {day:?}"))?;
        if prefix.is_empty() {
            return Ok(Self::every(weekday));
        }
        let ordinal: i8 = prefix
            .parse()
            .map_err(|_| format!("invalid ordinal: {prefix:?}"))?;
        if ordinal == 0 {
            return Err(format!("zero ordinal in {s:?}"));
        }
        Ok(Self::nth(ordinal, weekday))
    }
}

impl TryFrom<String> for WeekdayNum {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekdayNum> for String {
    fn from(value: WeekdayNum) -> Self {
        value.to_string()
    }
}

/// Inclusive end bound of a rule. The original form is kept so that a parsed
/// `UNTIL` is re-emitted the way it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Until {
    /// `YYYYMMDD`
    Date(NaiveDate),
    /// `YYYYMMDDTHHMMSS`, with a trailing `Z` when `utc` is set.
    DateTime { value: NaiveDateTime, utc: bool },
}

impl Until {
    /// Calendar date of the bound.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Date(d) => *d,
            Self::DateTime { value, .. } => value.date(),
        }
    }
}

/// A structured recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Always at least 1; omitted from the rule string when 1.
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<Until>,
    pub by_day: Vec<WeekdayNum>,
    /// 1..=31, or negative counting from the end of the month (-1 = last day).
    pub by_month_day: Vec<i8>,
    /// 1..=12
    pub by_month: Vec<u8>,
    pub by_set_pos: Vec<i16>,
    pub week_start: Option<Weekday>,
}

impl RecurrenceRule {
    /// A rule with only a frequency (interval 1, never ends).
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            count: None,
            until: None,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_month: Vec::new(),
            by_set_pos: Vec::new(),
            week_start: None,
        }
    }

    /// `true` if neither `COUNT` nor `UNTIL` bounds the rule.
    pub fn is_endless(&self) -> bool {
        self.count.is_none() && self.until.is_none()
    }
}

/// Which monthly pattern the form edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MonthlyMode {
    DayOfMonth,
    DayOfWeek,
}

/// How the form's rule ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndMode {
    Never,
    Count,
    Until,
}

/// Flat, user-editable form state.
///
/// Only the fields relevant to the current `frequency` / `end_mode`
/// combination are read back when building a rule; the rest are kept so that
/// switching modes back and forth does not lose input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecurrenceUiState {
    pub enabled: bool,
    pub frequency: Frequency,
    pub interval: u32,
    pub weekly_days: Vec<Weekday>,
    pub monthly_mode: MonthlyMode,
    /// 1..=31, or -1 for the last day of the month.
    pub monthly_day_of_month: i8,
    /// 1..=5, or -1 for the last occurrence.
    pub monthly_week_ordinal: i8,
    pub monthly_week_day: Weekday,
    pub end_mode: EndMode,
    pub end_count: u32,
    pub end_until_date: Option<NaiveDate>,
}

impl Default for RecurrenceUiState {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: Frequency::Weekly,
            interval: 1,
            weekly_days: Vec::new(),
            monthly_mode: MonthlyMode::DayOfMonth,
            monthly_day_of_month: 1,
            monthly_week_ordinal: 1,
            monthly_week_day: Weekday::Monday,
            end_mode: EndMode::Never,
            end_count: 10,
            end_until_date: None,
        }
    }
}
