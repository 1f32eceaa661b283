//! Export functionality: saving retrieved attachments to disk.

pub mod attachment;
