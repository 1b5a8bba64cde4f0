//! Data model types.
//!
//! This module contains the value model exchanged through the substrate:
//! - Identifiers (UUIDs)
//! - Timestamps (UTC, microsecond precision)
//! - Tags (the sixteen value shapes)
//! - Values, mappings and artefacts

pub mod id;
pub mod tag;
pub mod timestamp;
pub mod value;

pub use id::Identifier;
pub use tag::Tag;
pub use timestamp::Timestamp;
pub use value::{Artefact, Mapping, Value};
