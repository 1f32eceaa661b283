//! Core data model types: raw payloads, normalized messages, and recurrence rules.

pub mod message;
pub mod part;
pub mod recurrence;
