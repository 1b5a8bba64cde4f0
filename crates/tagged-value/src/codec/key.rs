//! Name/type key codec.
//!
//! A substrate object key carries both a child's name and its tag:
//!
//! ```text
//! key = name ":" code
//! ```
//!
//! where `code` is [`Tag::code`]. Names may be empty but must not contain the
//! separator, so the first `:` in a key always ends the name.

use crate::error::KeyError;
use crate::model::Tag;

/// Separates the name from the tag code.
pub const SEPARATOR: char = ':';

/// Checks that a name can be embedded in a key.
pub fn validate_name(name: &str) -> Result<(), KeyError> {
    if name.contains(SEPARATOR) {
        return Err(KeyError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Encodes a name and tag into a substrate key.
pub fn encode_key(name: &str, tag: Tag) -> Result<String, KeyError> {
    validate_name(name)?;
    let code = tag.code();
    let mut key = String::with_capacity(name.len() + 1 + code.len());
    key.push_str(name);
    key.push(SEPARATOR);
    key.push_str(code);
    Ok(key)
}

/// Decodes a substrate key into its name and tag.
pub fn decode_key(key: &str) -> Result<(&str, Tag), KeyError> {
    let (name, code) = key
        .split_once(SEPARATOR)
        .ok_or_else(|| KeyError::MissingTag { key: key.to_string() })?;
    let tag = Tag::from_code(code).ok_or_else(|| KeyError::UnknownTag {
        key: key.to_string(),
        code: code.to_string(),
    })?;
    Ok((name, tag))
}
