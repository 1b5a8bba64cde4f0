//! 128-bit identifiers.
//!
//! Identifiers are RFC 4122 UUIDs. Their canonical text form is the
//! hyphenated lowercase grouping `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, and
//! that is the only form accepted when parsing.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::FormatError;

/// Length of the canonical text form.
const TEXT_LEN: usize = 36;

/// An opaque 128-bit unique value.
///
/// Equality is byte equality, which coincides with equality of the canonical
/// text forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Identifier(Uuid);

impl Identifier {
    /// The all-zero identifier.
    pub const EMPTY: Identifier = Identifier(Uuid::nil());

    pub const fn empty() -> Self {
        Self::EMPTY
    }

    /// Generates a random (version 4) identifier.
    ///
    /// Uniqueness is probabilistic.
    pub fn new_random() -> Self {
        Identifier(Uuid::new_v4())
    }

    /// Derives a version 8 identifier from input bytes using SHA-256.
    ///
    /// ```text
    /// hash = SHA-256(input_bytes)[0:16]
    /// hash[6] = (hash[6] & 0x0F) | 0x80  // version 8
    /// hash[8] = (hash[8] & 0x3F) | 0x80  // RFC 4122 variant
    /// ```
    ///
    /// The same input always yields the same identifier.
    pub fn derived(input: &[u8]) -> Self {
        let hash = Sha256::digest(input);
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash[..16]);

        bytes[6] = (bytes[6] & 0x0F) | 0x80;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;

        Identifier(Uuid::from_bytes(bytes))
    }

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Identifier(Uuid::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Returns true for the all-zero identifier.
    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }

    /// Parses the canonical text form.
    pub fn from_text(s: &str) -> Result<Self, FormatError> {
        let invalid = || FormatError::Identifier { input: s.to_string() };

        if s.len() != TEXT_LEN {
            return Err(invalid());
        }
        let uuid = Uuid::parse_str(s).map_err(|_| invalid())?;

        // Uuid accepts uppercase hex; the canonical form does not.
        let id = Identifier(uuid);
        if id.to_text() != s {
            return Err(invalid());
        }
        Ok(id)
    }

    /// Returns the canonical text form.
    pub fn to_text(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for Identifier {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::from_text(s)
    }
}

impl From<Uuid> for Identifier {
    fn from(uuid: Uuid) -> Self {
        Identifier(uuid)
    }
}

impl From<Identifier> for Uuid {
    fn from(id: Identifier) -> Self {
        id.0
    }
}
