//! tagged-value: Self-describing values over an untyped JSON substrate.
//!
//! This crate provides a tagged value container and its lossless conversion
//! to and from a generic JSON tree.
//!
//! # Overview
//!
//! A [`Value`] is one of sixteen shapes: null, scalars, identifiers,
//! timestamps, raw bytes, homogeneous arrays, heterogeneous sequences,
//! mappings and artefacts (mappings stamped with a type id). Marshalling
//! writes each child's tag into the key or wrapper that introduces it, so:
//! - a 32-bit integer never comes back as a double
//! - timestamps and identifiers stay distinct from plain text
//! - a text array stays distinct from a sequence of texts
//!
//! # Quick Start
//!
//! ```rust
//! use tagged_value::{Mapping, Value, marshal, unmarshal};
//!
//! let value = Mapping::new()
//!     .with_string("name", "Alice")
//!     .with_int("age", 30)
//!     .with_string_array("tags", ["admin", "ops"])
//!     .with_artefact("home", "Geo.Point", Mapping::new().with_double("lat", 48.85))
//!     .build();
//!
//! let json = marshal(&value).unwrap();
//! assert_eq!(json["age:i"], 30);
//! assert_eq!(json["home:a"]["$type"], "Geo.Point");
//!
//! let decoded = unmarshal(&json).unwrap();
//! assert_eq!(decoded, value);
//! assert_eq!(decoded.get("age").unwrap().as_int().unwrap(), 30);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Core data types (Value, Mapping, Artefact, Tag, Identifier, Timestamp)
//! - [`codec`]: Marshalling, unmarshalling and the name/type key codec
//! - [`deserialize`]: Tag-stripping conversion to plain native values
//! - [`error`]: Error types
//! - [`limits`]: Recursion limits
//!
//! # Untrusted Input
//!
//! Unmarshalling rejects anything that does not match its tag: unknown or
//! missing key tags, repeated names, out-of-range integers, non-canonical
//! identifiers and timestamps. Nesting depth is bounded by
//! [`CodecOptions::max_depth`]. No partial result is returned on failure.

pub mod codec;
pub mod deserialize;
pub mod error;
pub mod limits;
pub mod model;

// Re-export commonly used types at crate root
pub use codec::{
    CodecOptions, TYPE_KEY, marshal, marshal_tagged, marshal_with_options, unmarshal, unmarshal_as,
    unmarshal_tagged, unmarshal_with_options,
};
pub use deserialize::{Plain, deserialize, deserialize_with_options};
pub use error::{DecodeError, DepthExceeded, EncodeError, ErrorKind, FormatError, KeyError, ShapeMismatchError};
pub use model::{Artefact, Identifier, Mapping, Tag, Timestamp, Value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
