//! `tridesk`: mail payload normalization and recurrence rule handling.
//!
//! Two independent engines:
//!
//! - [`parser`] turns raw mail API payloads (JSON part trees) into
//!   display-ready [`NormalizedMessage`]s: decoded body, attachment list,
//!   inline images embedded as `data:` URIs.
//! - [`recurrence`] parses, builds and describes RFC 5545 `RRULE` strings and
//!   maps them to and from a flat form state.
//!
//! Out-of-band attachment content is retrieved through the
//! [`AttachmentFetcher`] trait.

pub mod config;
pub mod error;
pub mod export;
pub mod i18n;
pub mod model;
pub mod parser;
pub mod recurrence;
pub mod store;

pub use error::{Result, TrideskError};
pub use model::message::{AttachmentRef, InlineImage, MessageHeaders, NormalizedMessage};
pub use model::part::{Header, PartBody, RawMessage, RawMessagePart};
pub use model::recurrence::{RecurrenceRule, RecurrenceUiState};
pub use parser::normalize::{normalize_message, MessageNormalizer};
pub use recurrence::{
    build_recurrence_rule, describe_recurrence, describe_recurrence_in, parse_recurrence_rule,
    recurrence_to_ui_state, ui_state_to_recurrence, RecurrenceDescription,
};
pub use store::memory::MemoryAttachmentStore;
pub use store::{AttachmentFetcher, FetchedAttachment};
