//! Mail payload processing: part tree walking, body decoding, header
//! resolution, inline image resolution, and the message normalizer.

pub mod body;
pub mod header;
pub mod inline;
pub mod normalize;
pub mod walker;
