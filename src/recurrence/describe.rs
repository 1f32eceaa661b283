//! Human-readable recurrence text in two granularities.
//!
//! The short label favours compact phrasing for common patterns ("Every day",
//! "Every 2 weeks (Mon, Wed, Fri)", "Last day of every month") and falls back
//! to the full description otherwise. The full description is the frequency
//! phrase followed by one parenthesized constraint list. Both renderings end
//! with the end condition when the rule has one.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::i18n::Lang;
use crate::model::recurrence::{Frequency, RecurrenceRule, Until, Weekday, WeekdayNum};

/// Both renderings of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceDescription {
    pub short_label: String,
    pub full_description: String,
}

/// Describe a parsed rule in `lang`.
pub fn describe_rule(rule: &RecurrenceRule, lang: Lang) -> RecurrenceDescription {
    RecurrenceDescription {
        short_label: short_label(rule, lang),
        full_description: full_description(rule, lang),
    }
}

/// Compact label. Ordinal weekdays win over days of the month.
pub fn short_label(rule: &RecurrenceRule, lang: Lang) -> String {
    match compact_label(rule, lang) {
        Some(mut label) => {
            label.push_str(&end_phrase(rule, lang));
            label
        }
        None => full_description(rule, lang),
    }
}

/// Fast-path phrasing for common patterns, without the end condition.
fn compact_label(rule: &RecurrenceRule, lang: Lang) -> Option<String> {
    let plain = rule.by_day.is_empty() && rule.by_month_day.is_empty() && rule.by_month.is_empty();

    match rule.frequency {
        Frequency::Daily if rule.interval == 1 && plain => {
            return Some(every_phrase(Frequency::Daily, 1, lang));
        }
        Frequency::Weekly if !rule.by_day.is_empty() && rule.by_day.iter().all(|d| d.ordinal.is_none()) => {
            let days = rule
                .by_day
                .iter()
                .map(|d| weekday_short(d.weekday, lang))
                .collect::<Vec<_>>()
                .join(", ");
            return Some(format!(
                "{} ({days})",
                every_phrase(Frequency::Weekly, rule.interval, lang)
            ));
        }
        Frequency::Monthly => {
            if let Some((n, weekday)) = first_ordinal_weekday(&rule.by_day) {
                return Some(monthly_weekday_label(n, weekday, rule.interval, lang));
            }
            if let Some(&day) = rule.by_month_day.first() {
                return Some(monthly_day_label(day, rule.interval, lang));
            }
        }
        Frequency::Yearly if rule.interval == 1 && plain => {
            return Some(every_phrase(Frequency::Yearly, 1, lang));
        }
        _ => {}
    }

    None
}

/// Frequency phrase, constraint list and end condition.
pub fn full_description(rule: &RecurrenceRule, lang: Lang) -> String {
    let mut text = every_phrase(rule.frequency, rule.interval, lang);

    let constraint = if !rule.by_day.is_empty() {
        Some(
            rule.by_day
                .iter()
                .map(|d| weekday_entry(d, lang))
                .collect::<Vec<_>>()
                .join(", "),
        )
    } else if !rule.by_month_day.is_empty() {
        Some(
            rule.by_month_day
                .iter()
                .map(|&d| month_day(d, lang))
                .collect::<Vec<_>>()
                .join(", "),
        )
    } else if !rule.by_month.is_empty() {
        Some(
            rule.by_month
                .iter()
                .map(|&m| month_short(m, lang))
                .collect::<Vec<_>>()
                .join(", "),
        )
    } else {
        None
    };
    if let Some(list) = constraint {
        text.push_str(&format!(" ({list})"));
    }

    text.push_str(&end_phrase(rule, lang));
    text
}

/// ", up to 5 times" / ", until Jan 1, 2025", or empty for endless rules.
/// A count takes precedence over an until date.
fn end_phrase(rule: &RecurrenceRule, lang: Lang) -> String {
    if let Some(count) = rule.count {
        match lang {
            Lang::En => format!(", up to {count} {}", if count == 1 { "time" } else { "times" }),
            Lang::Es => format!(", hasta {count} {}", if count == 1 { "vez" } else { "veces" }),
        }
    } else if let Some(until) = &rule.until {
        match lang {
            Lang::En => format!(", until {}", until_date(until, lang)),
            Lang::Es => format!(", hasta el {}", until_date(until, lang)),
        }
    } else {
        String::new()
    }
}

fn first_ordinal_weekday(by_day: &[WeekdayNum]) -> Option<(i8, Weekday)> {
    by_day.iter().find_map(|d| d.ordinal.map(|n| (n, d.weekday)))
}

/// "Every day", "Every 3 weeks", "Cada 2 meses".
fn every_phrase(frequency: Frequency, interval: u32, lang: Lang) -> String {
    let interval = interval.max(1);
    let unit = frequency_unit(frequency, interval > 1, lang);
    match (lang, interval) {
        (Lang::En, 1) => format!("Every {unit}"),
        (Lang::En, n) => format!("Every {n} {unit}"),
        (Lang::Es, 1) => format!("Cada {unit}"),
        (Lang::Es, n) => format!("Cada {n} {unit}"),
    }
}

fn frequency_unit(frequency: Frequency, plural: bool, lang: Lang) -> &'static str {
    match (lang, frequency, plural) {
        (Lang::En, Frequency::Daily, false) => "day",
        (Lang::En, Frequency::Daily, true) => "days",
        (Lang::En, Frequency::Weekly, false) => "week",
        (Lang::En, Frequency::Weekly, true) => "weeks",
        (Lang::En, Frequency::Monthly, false) => "month",
        (Lang::En, Frequency::Monthly, true) => "months",
        (Lang::En, Frequency::Yearly, false) => "year",
        (Lang::En, Frequency::Yearly, true) => "years",
        (Lang::Es, Frequency::Daily, false) => "d\u{ed}a",
        (Lang::Es, Frequency::Daily, true) => "d\u{ed}as",
        (Lang::Es, Frequency::Weekly, false) => "semana",
        (Lang::Es, Frequency::Weekly, true) => "semanas",
        (Lang::Es, Frequency::Monthly, false) => "mes",
        (Lang::Es, Frequency::Monthly, true) => "meses",
        (Lang::Es, Frequency::Yearly, false) => "a\u{f1}o",
        (Lang::Es, Frequency::Yearly, true) => "a\u{f1}os",
    }
}

fn monthly_weekday_label(n: i8, weekday: Weekday, interval: u32, lang: Lang) -> String {
    let every = every_phrase(Frequency::Monthly, interval, lang);
    let day = weekday_long(weekday, lang);
    match (lang, n) {
        (Lang::En, -1) => format!("{every} on the last {day}"),
        (Lang::En, n) => format!("{every} on the {} {day}", ordinal(n, lang)),
        (Lang::Es, -1) => format!("{every} el \u{fa}ltimo {day}"),
        (Lang::Es, n) => format!("{every} el {} {day}", ordinal(n, lang)),
    }
}

fn monthly_day_label(day: i8, interval: u32, lang: Lang) -> String {
    let interval = interval.max(1);
    match (lang, day, interval) {
        (Lang::En, -1, 1) => "Last day of every month".to_string(),
        (Lang::En, -1, n) => format!("Last day of every {n} months"),
        (Lang::En, d, 1) => format!("Day {d} of every month"),
        (Lang::En, d, n) => format!("Day {d} of every {n} months"),
        (Lang::Es, -1, 1) => "\u{da}ltimo d\u{ed}a de cada mes".to_string(),
        (Lang::Es, -1, n) => format!("\u{da}ltimo d\u{ed}a de cada {n} meses"),
        (Lang::Es, d, 1) => format!("D\u{ed}a {d} de cada mes"),
        (Lang::Es, d, n) => format!("D\u{ed}a {d} de cada {n} meses"),
    }
}

/// "Mon", "2nd Tue", "last Fri".
fn weekday_entry(entry: &WeekdayNum, lang: Lang) -> String {
    let day = weekday_short(entry.weekday, lang);
    match entry.ordinal {
        None => day.to_string(),
        Some(n) => format!("{} {day}", ordinal(n, lang)),
    }
}

fn month_day(day: i8, lang: Lang) -> String {
    match (lang, day) {
        (Lang::En, -1) => "last day".to_string(),
        (Lang::Es, -1) => "\u{fa}ltimo d\u{ed}a".to_string(),
        (_, d) => d.to_string(),
    }
}

fn ordinal(n: i8, lang: Lang) -> String {
    let word = match (lang, n) {
        (Lang::En, 1) => "1st",
        (Lang::En, 2) => "2nd",
        (Lang::En, 3) => "3rd",
        (Lang::En, 4) => "4th",
        (Lang::En, 5) => "5th",
        (Lang::En, -1) => "last",
        (Lang::Es, 1) => "1.er",
        (Lang::Es, 2) => "2.\u{ba}",
        (Lang::Es, 3) => "3.er",
        (Lang::Es, 4) => "4.\u{ba}",
        (Lang::Es, 5) => "5.\u{ba}",
        (Lang::Es, -1) => "\u{fa}ltimo",
        (_, n) => return n.to_string(),
    };
    word.to_string()
}

fn weekday_short(day: Weekday, lang: Lang) -> &'static str {
    match (lang, day) {
        (Lang::En, Weekday::Monday) => "Mon",
        (Lang::En, Weekday::Tuesday) => "Tue",
        (Lang::En, Weekday::Wednesday) => "Wed",
        (Lang::En, Weekday::Thursday) => "Thu",
        (Lang::En, Weekday::Friday) => "Fri",
        (Lang::En, Weekday::Saturday) => "Sat",
        (Lang::En, Weekday::Sunday) => "Sun",
        (Lang::Es, Weekday::Monday) => "lun",
        (Lang::Es, Weekday::Tuesday) => "mar",
        (Lang::Es, Weekday::Wednesday) => "mi\u{e9}",
        (Lang::Es, Weekday::Thursday) => "jue",
        (Lang::Es, Weekday::Friday) => "vie",
        (Lang::Es, Weekday::Saturday) => "s\u{e1}b",
        (Lang::Es, Weekday::Sunday) => "dom",
    }
}

fn weekday_long(day: Weekday, lang: Lang) -> &'static str {
    match (lang, day) {
        (Lang::En, Weekday::Monday) => "Monday",
        (Lang::En, Weekday::Tuesday) => "Tuesday",
        (Lang::En, Weekday::Wednesday) => "Wednesday",
        (Lang::En, Weekday::Thursday) => "Thursday",
        (Lang::En, Weekday::Friday) => "Friday",
        (Lang::En, Weekday::Saturday) => "Saturday",
        (Lang::En, Weekday::Sunday) => "Sunday",
        (Lang::Es, Weekday::Monday) => "lunes",
        (Lang::Es, Weekday::Tuesday) => "martes",
        (Lang::Es, Weekday::Wednesday) => "mi\u{e9}rcoles",
        (Lang::Es, Weekday::Thursday) => "jueves",
        (Lang::Es, Weekday::Friday) => "viernes",
        (Lang::Es, Weekday::Saturday) => "s\u{e1}bado",
        (Lang::Es, Weekday::Sunday) => "domingo",
    }
}

fn month_short(month: u8, lang: Lang) -> String {
    const EN: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    const ES: [&str; 12] = [
        "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
    ];
    let table = match lang {
        Lang::En => &EN,
        Lang::Es => &ES,
    };
    match month {
        1..=12 => table[usize::from(month - 1)].to_string(),
        other => other.to_string(),
    }
}

/// "Jan 31, 2025" / "31 ene 2025".
fn until_date(until: &Until, lang: Lang) -> String {
    let date: NaiveDate = until.date();
    let month = u8::try_from(date.month())
        .map(|m| month_short(m, lang))
        .unwrap_or_else(|_| date.month().to_string());
    match lang {
        Lang::En => format!("{month} {}, {}", date.day(), date.year()),
        Lang::Es => format!("{} {month} {}", date.day(), date.year()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::rule::parse_rule;

    fn en(rule: &str) -> RecurrenceDescription {
        describe_rule(&parse_rule(rule).unwrap(), Lang::En)
    }

    fn es(rule: &str) -> RecurrenceDescription {
        describe_rule(&parse_rule(rule).unwrap(), Lang::Es)
    }

    #[test]
    fn test_daily() {
        let d = en("FREQ=DAILY");
        assert_eq!(d.short_label, "Every day");
        assert_eq!(d.full_description, "Every day");
        assert_eq!(en("FREQ=DAILY;INTERVAL=3;COUNT=5").short_label, "Every 3 days, up to 5 times");
    }

    #[test]
    fn test_weekly_days() {
        let d = en("RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE,FR");
        assert_eq!(d.short_label, "Every 2 weeks (Mon, Wed, Fri)");
        assert_eq!(d.full_description, "Every 2 weeks (Mon, Wed, Fri)");
        assert_eq!(en("FREQ=WEEKLY;BYDAY=TU").short_label, "Every week (Tue)");
    }

    #[test]
    fn test_monthly_last_day() {
        let d = en("RRULE:FREQ=MONTHLY;BYMONTHDAY=-1");
        assert_eq!(d.short_label, "Last day of every month");
        assert_eq!(d.full_description, "Every month (last day)");
        assert_eq!(
            en("FREQ=MONTHLY;INTERVAL=3;BYMONTHDAY=-1").short_label,
            "Last day of every 3 months"
        );
        assert_eq!(en("FREQ=MONTHLY;BYMONTHDAY=15").short_label, "Day 15 of every month");
    }

    #[test]
    fn test_monthly_ordinal_weekday_wins() {
        let d = en("FREQ=MONTHLY;BYDAY=2TU;BYMONTHDAY=15");
        assert_eq!(d.short_label, "Every month on the 2nd Tuesday");
        assert_eq!(d.full_description, "Every month (2nd Tue)");
        assert_eq!(
            en("FREQ=MONTHLY;INTERVAL=2;BYDAY=-1FR").short_label,
            "Every 2 months on the last Friday"
        );
    }

    #[test]
    fn test_yearly_and_months() {
        assert_eq!(en("FREQ=YEARLY").short_label, "Every year");
        let d = en("FREQ=YEARLY;BYMONTH=1,6");
        assert_eq!(d.short_label, "Every year (Jan, Jun)");
    }

    #[test]
    fn test_end_conditions() {
        assert_eq!(
            en("FREQ=WEEKLY;COUNT=1").full_description,
            "Every week, up to 1 time"
        );
        assert_eq!(
            en("FREQ=DAILY;UNTIL=20250131T235959Z").full_description,
            "Every day, until Jan 31, 2025"
        );
        // Count takes the end phrase when both are present.
        assert_eq!(
            en("FREQ=DAILY;COUNT=4;UNTIL=20250131").full_description,
            "Every day, up to 4 times"
        );
    }

    #[test]
    fn test_short_label_keeps_end_condition() {
        assert_eq!(en("FREQ=DAILY;COUNT=5").short_label, "Every day, up to 5 times");
        assert_eq!(
            en("FREQ=WEEKLY;BYDAY=MO;UNTIL=20250101").short_label,
            "Every week (Mon), until Jan 1, 2025"
        );
        assert_eq!(
            en("FREQ=MONTHLY;BYMONTHDAY=-1;COUNT=2").short_label,
            "Last day of every month, up to 2 times"
        );
        assert_eq!(
            es("FREQ=MONTHLY;BYDAY=-1FR;COUNT=3").short_label,
            "Cada mes el \u{fa}ltimo viernes, hasta 3 veces"
        );
    }

    #[test]
    fn test_spanish() {
        assert_eq!(es("FREQ=DAILY").short_label, "Cada d\u{ed}a");
        assert_eq!(
            es("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE,FR").short_label,
            "Cada 2 semanas (lun, mi\u{e9}, vie)"
        );
        assert_eq!(
            es("FREQ=MONTHLY;BYMONTHDAY=-1").short_label,
            "\u{da}ltimo d\u{ed}a de cada mes"
        );
        assert_eq!(
            es("FREQ=MONTHLY;BYDAY=-1FR").short_label,
            "Cada mes el \u{fa}ltimo viernes"
        );
        assert_eq!(
            es("FREQ=DAILY;UNTIL=20250131").full_description,
            "Cada d\u{ed}a, hasta el 31 ene 2025"
        );
        assert_eq!(es("FREQ=YEARLY;COUNT=3").full_description, "Cada a\u{f1}o, hasta 3 veces");
    }

    #[test]
    fn test_unusual_ordinals_are_numeric() {
        assert_eq!(en("FREQ=YEARLY;BYDAY=20MO").full_description, "Every year (20 Mon)");
        assert_eq!(en("FREQ=MONTHLY;BYMONTHDAY=-2").full_description, "Every month (-2)");
    }
}
