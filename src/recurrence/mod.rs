//! Recurrence rules: parse/build of RRULE strings, human-readable
//! descriptions, and conversion to and from the flat form state.
//!
//! Everything here is synchronous and pure. An absent or unparseable rule is
//! never an error: it describes as "Does not repeat" and maps to the disabled
//! form state.

pub mod describe;
pub mod rule;
pub mod ui_state;

use crate::i18n::{self, Lang};
use crate::model::recurrence::{RecurrenceRule, RecurrenceUiState};

pub use describe::RecurrenceDescription;
pub use rule::{NoRule, RRULE_PREFIX};

/// Parse a rule string (optionally `RRULE:`-prefixed).
pub fn parse_recurrence_rule(text: &str) -> Option<RecurrenceRule> {
    rule::parse_rule(text)
}

/// Build the canonical rule string, without prefix.
pub fn build_recurrence_rule(rule: &RecurrenceRule) -> String {
    rule::build_rule(rule)
}

/// Describe a rule string in the process language.
pub fn describe_recurrence(text: &str) -> RecurrenceDescription {
    describe_recurrence_in(text, i18n::lang())
}

/// Describe a rule string in `lang`.
pub fn describe_recurrence_in(text: &str, lang: Lang) -> RecurrenceDescription {
    match rule::parse_rule(text) {
        Some(rule) => describe::describe_rule(&rule, lang),
        None => {
            let none = i18n::does_not_repeat_in(lang).to_string();
            RecurrenceDescription {
                short_label: none.clone(),
                full_description: none,
            }
        }
    }
}

/// Form state for a rule string; disabled defaults when there is no rule.
pub fn recurrence_to_ui_state(text: &str) -> RecurrenceUiState {
    ui_state::rule_to_ui_state(text)
}

/// `RRULE:` line for a form state; `""` when the form is disabled.
pub fn ui_state_to_recurrence(state: &RecurrenceUiState) -> String {
    ui_state::ui_state_to_rule(state)
}
