//! Configuration shared by marshal, unmarshal and deserialize.

use std::borrow::Cow;

use crate::codec::key::validate_name;
use crate::error::KeyError;
use crate::limits::{MAX_DEPTH, MAX_DEPTH_CEILING};

/// Default reserved key holding an artefact's type id.
///
/// It contains no separator, so it can never be produced by
/// [`encode_key`](crate::codec::encode_key).
pub const TYPE_KEY: &str = "$type";

/// Options for the substrate conversions.
///
/// Both sides of an exchange must agree on the type key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    type_key: Cow<'static, str>,
    max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            type_key: Cow::Borrowed(TYPE_KEY),
            max_depth: MAX_DEPTH,
        }
    }
}

impl CodecOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the reserved artefact discriminator key.
    ///
    /// The key must not contain the key separator, otherwise it could be
    /// confused with an encoded child key.
    pub fn with_type_key(mut self, key: impl Into<Cow<'static, str>>) -> Result<Self, KeyError> {
        let key = key.into();
        validate_name(&key)?;
        self.type_key = key;
        Ok(self)
    }

    /// Sets the maximum nesting depth, clamped to
    /// [`MAX_DEPTH_CEILING`](crate::limits::MAX_DEPTH_CEILING).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_CEILING);
        self
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
