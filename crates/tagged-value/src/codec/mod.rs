//! Substrate conversions.
//!
//! The substrate is the untyped JSON tree of [`serde_json::Value`]. Marshalling
//! embeds every child's tag in the key or wrapper that introduces it, so the
//! tree can be unmarshalled without a schema.

pub mod key;
pub mod marshal;
pub mod options;
pub mod unmarshal;

pub use key::{SEPARATOR, decode_key, encode_key};
pub use marshal::{marshal, marshal_tagged, marshal_tagged_with_options, marshal_with_options};
pub use options::{CodecOptions, TYPE_KEY};
pub use unmarshal::{
    unmarshal, unmarshal_as, unmarshal_as_with_options, unmarshal_tagged, unmarshal_tagged_with_options,
    unmarshal_with_options,
};
