//! Conversion between rule strings and the flat recurrence form state.

use tracing::debug;

use crate::model::recurrence::{
    EndMode, Frequency, MonthlyMode, RecurrenceRule, RecurrenceUiState, Until, WeekdayNum,
};

use super::rule::parse_rule;

/// Populate the form from a rule string.
///
/// Empty or unparseable input gives the disabled default form.
pub fn rule_to_ui_state(text: &str) -> RecurrenceUiState {
    match parse_rule(text) {
        Some(rule) => ui_state_from_rule(&rule),
        None => RecurrenceUiState::default(),
    }
}

/// Populate the form from a parsed rule.
pub fn ui_state_from_rule(rule: &RecurrenceRule) -> RecurrenceUiState {
    let mut state = RecurrenceUiState {
        enabled: true,
        frequency: rule.frequency,
        interval: rule.interval.max(1),
        ..RecurrenceUiState::default()
    };

    state.weekly_days = rule
        .by_day
        .iter()
        .filter(|d| d.ordinal.is_none())
        .map(|d| d.weekday)
        .collect();

    if let Some((ordinal, weekday)) = rule
        .by_day
        .iter()
        .find_map(|d| d.ordinal.map(|n| (n, d.weekday)))
    {
        state.monthly_mode = MonthlyMode::DayOfWeek;
        state.monthly_week_ordinal = ordinal;
        state.monthly_week_day = weekday;
    } else if let Some(&day) = rule.by_month_day.first() {
        state.monthly_mode = MonthlyMode::DayOfMonth;
        state.monthly_day_of_month = day;
    }

    if let Some(count) = rule.count {
        state.end_count = count;
    }
    state.end_until_date = rule.until.as_ref().map(Until::date);
    state.end_mode = match (rule.count, &rule.until) {
        (Some(_), _) => EndMode::Count,
        (None, Some(_)) => EndMode::Until,
        (None, None) => EndMode::Never,
    };

    state
}

/// Build the structured rule the form describes, or `None` when disabled.
pub fn rule_from_ui_state(state: &RecurrenceUiState) -> Option<RecurrenceRule> {
    if !state.enabled {
        return None;
    }

    let mut rule = RecurrenceRule::new(state.frequency);
    rule.interval = state.interval.max(1);

    match state.frequency {
        Frequency::Weekly => {
            rule.by_day = state
                .weekly_days
                .iter()
                .copied()
                .map(WeekdayNum::every)
                .collect();
        }
        Frequency::Monthly => match state.monthly_mode {
            MonthlyMode::DayOfMonth => {
                rule.by_month_day = vec![non_zero(state.monthly_day_of_month)];
            }
            MonthlyMode::DayOfWeek => {
                rule.by_day = vec![WeekdayNum::nth(
                    non_zero(state.monthly_week_ordinal),
                    state.monthly_week_day,
                )];
            }
        },
        Frequency::Daily | Frequency::Yearly => {}
    }

    match state.end_mode {
        EndMode::Never => {}
        EndMode::Count => rule.count = Some(state.end_count.max(1)),
        EndMode::Until => match state.end_until_date {
            Some(date) => rule.until = Some(Until::Date(date)),
            None => debug!("Until end mode without a date, rule left open"),
        },
    }

    Some(rule)
}

/// Render the form as an `RRULE:` line. Disabled forms give `""`.
pub fn ui_state_to_rule(state: &RecurrenceUiState) -> String {
    rule_from_ui_state(state)
        .map(|rule| rule.to_rrule_line())
        .unwrap_or_default()
}

/// RRULE has no zero ordinal or zero month day; the form's zero means "first".
fn non_zero(n: i8) -> i8 {
    if n == 0 {
        1
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::recurrence::Weekday;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_gives_defaults() {
        for input in ["", "   ", "RRULE:", "INTERVAL=2", "FREQ=SECONDLY"] {
            let state = rule_to_ui_state(input);
            assert_eq!(state, RecurrenceUiState::default(), "input {input:?}");
            assert!(!state.enabled);
            assert_eq!(state.frequency, Frequency::Weekly);
            assert_eq!(state.interval, 1);
            assert_eq!(state.end_mode, EndMode::Never);
        }
    }

    #[test]
    fn test_weekly_to_state() {
        let state = rule_to_ui_state("RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE,FR");
        assert!(state.enabled);
        assert_eq!(state.interval, 2);
        assert_eq!(
            state.weekly_days,
            vec![Weekday::Monday, Weekday::Wednesday, Weekday::Friday]
        );
        assert_eq!(state.end_mode, EndMode::Never);
    }

    #[test]
    fn test_ordinal_weekday_forces_day_of_week() {
        let state = rule_to_ui_state("FREQ=MONTHLY;BYMONTHDAY=10;BYDAY=MO,-1FR,2TU");
        assert_eq!(state.monthly_mode, MonthlyMode::DayOfWeek);
        assert_eq!(state.monthly_week_ordinal, -1);
        assert_eq!(state.monthly_week_day, Weekday::Friday);
        assert_eq!(state.weekly_days, vec![Weekday::Monday]);
        assert_eq!(state.monthly_day_of_month, 1);
    }

    #[test]
    fn test_month_day_uses_first_value() {
        let state = rule_to_ui_state("FREQ=MONTHLY;BYMONTHDAY=-1,15");
        assert_eq!(state.monthly_mode, MonthlyMode::DayOfMonth);
        assert_eq!(state.monthly_day_of_month, -1);
    }

    #[test]
    fn test_end_modes_to_state() {
        let count = rule_to_ui_state("FREQ=DAILY;COUNT=7");
        assert_eq!(count.end_mode, EndMode::Count);
        assert_eq!(count.end_count, 7);

        let until = rule_to_ui_state("FREQ=DAILY;UNTIL=20250131T120000Z");
        assert_eq!(until.end_mode, EndMode::Until);
        assert_eq!(until.end_until_date, NaiveDate::from_ymd_opt(2025, 1, 31));

        let both = rule_to_ui_state("FREQ=DAILY;COUNT=2;UNTIL=20250131");
        assert_eq!(both.end_mode, EndMode::Count);
        assert!(both.end_until_date.is_some());
    }

    #[test]
    fn test_disabled_gives_empty() {
        let state = RecurrenceUiState {
            enabled: false,
            frequency: Frequency::Daily,
            weekly_days: vec![Weekday::Sunday],
            end_mode: EndMode::Count,
            ..RecurrenceUiState::default()
        };
        assert_eq!(ui_state_to_rule(&state), "");
    }

    #[test]
    fn test_weekly_state_to_rule() {
        let state = RecurrenceUiState {
            enabled: true,
            interval: 2,
            weekly_days: vec![Weekday::Monday, Weekday::Wednesday],
            ..RecurrenceUiState::default()
        };
        assert_eq!(ui_state_to_rule(&state), "RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE");

        let no_days = RecurrenceUiState {
            enabled: true,
            ..RecurrenceUiState::default()
        };
        assert_eq!(ui_state_to_rule(&no_days), "RRULE:FREQ=WEEKLY");
    }

    #[test]
    fn test_monthly_modes_are_exclusive() {
        let mut state = RecurrenceUiState {
            enabled: true,
            frequency: Frequency::Monthly,
            monthly_day_of_month: -1,
            monthly_week_ordinal: 2,
            monthly_week_day: Weekday::Tuesday,
            weekly_days: vec![Weekday::Friday],
            ..RecurrenceUiState::default()
        };
        assert_eq!(ui_state_to_rule(&state), "RRULE:FREQ=MONTHLY;BYMONTHDAY=-1");

        state.monthly_mode = MonthlyMode::DayOfWeek;
        assert_eq!(ui_state_to_rule(&state), "RRULE:FREQ=MONTHLY;BYDAY=2TU");
    }

    #[test]
    fn test_end_modes_to_rule() {
        let mut state = RecurrenceUiState {
            enabled: true,
            frequency: Frequency::Daily,
            end_count: 5,
            end_until_date: NaiveDate::from_ymd_opt(2025, 3, 9),
            ..RecurrenceUiState::default()
        };
        assert_eq!(ui_state_to_rule(&state), "RRULE:FREQ=DAILY");

        state.end_mode = EndMode::Count;
        assert_eq!(ui_state_to_rule(&state), "RRULE:FREQ=DAILY;COUNT=5");

        state.end_mode = EndMode::Until;
        assert_eq!(ui_state_to_rule(&state), "RRULE:FREQ=DAILY;UNTIL=20250309");

        state.end_until_date = None;
        assert_eq!(ui_state_to_rule(&state), "RRULE:FREQ=DAILY");
    }

    #[test]
    fn test_round_trip_through_form() {
        for rule in [
            "RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE,FR",
            "RRULE:FREQ=MONTHLY;BYMONTHDAY=-1",
            "RRULE:FREQ=MONTHLY;INTERVAL=3;COUNT=4;BYDAY=-1FR",
            "RRULE:FREQ=YEARLY;UNTIL=20301231",
        ] {
            assert_eq!(ui_state_to_rule(&rule_to_ui_state(rule)), rule);
        }
    }
}
