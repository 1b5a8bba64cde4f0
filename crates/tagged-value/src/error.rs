//! Error types for value extraction, key coding, marshalling and unmarshalling.

use thiserror::Error;

use crate::model::Tag;

/// Classification shared by every error in this crate.
///
/// All errors are local and synchronous: they describe caller-supplied data
/// that does not fit the value model, never a transient condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An extractor was asked for a shape other than the value's tag.
    ShapeMismatch,
    /// A substrate key has no embedded tag, an unknown tag, or repeats a name.
    MalformedKey,
    /// A name contains the key separator.
    InvalidName,
    /// Artefact content shadows the reserved discriminator key.
    ReservedKeyCollision,
    /// A substrate value does not have the shape its tag demands.
    UnexpectedShape,
    /// An element of a homogeneous array has the wrong primitive shape.
    TypeCoercion,
    /// Identifier, timestamp or raw payload text failed to parse.
    Format,
    /// The tree is nested deeper than the configured limit.
    Structure,
}

impl ErrorKind {
    /// Returns a stable name for this kind (e.g., "MalformedKey").
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::ShapeMismatch => "ShapeMismatch",
            ErrorKind::MalformedKey => "MalformedKey",
            ErrorKind::InvalidName => "InvalidName",
            ErrorKind::ReservedKeyCollision => "ReservedKeyCollision",
            ErrorKind::UnexpectedShape => "UnexpectedShape",
            ErrorKind::TypeCoercion => "TypeCoercion",
            ErrorKind::Format => "Format",
            ErrorKind::Structure => "Structure",
        }
    }
}

/// A typed extractor was called on a value carrying a different tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} value, found {actual}")]
pub struct ShapeMismatchError {
    pub expected: Tag,
    pub actual: Tag,
}

impl ShapeMismatchError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ShapeMismatch
    }
}

/// Error from the name/type key codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("name {name:?} contains the reserved separator ':'")]
    InvalidName { name: String },

    #[error("key {key:?} has no embedded tag")]
    MissingTag { key: String },

    #[error("key {key:?} has unknown tag code {code:?}")]
    UnknownTag { key: String, code: String },
}

impl KeyError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            KeyError::InvalidName { .. } => ErrorKind::InvalidName,
            KeyError::MissingTag { .. } | KeyError::UnknownTag { .. } => ErrorKind::MalformedKey,
        }
    }
}

/// Error parsing the canonical text form of a scalar payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid identifier text {input:?} (expected hyphenated lowercase hex)")]
    Identifier { input: String },

    #[error("invalid timestamp text {input:?}: {reason}")]
    Timestamp { input: String, reason: String },

    #[error("timestamp {epoch_nanos}ns since epoch is outside years 0000-9999")]
    TimestampOutOfRange { epoch_nanos: i128 },

    #[error("invalid base64 raw payload: {reason}")]
    Base64 { reason: String },
}

impl FormatError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Format
    }
}

/// The value tree is nested deeper than the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value tree exceeds maximum depth {max}")]
pub struct DepthExceeded {
    pub max: usize,
}

impl DepthExceeded {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Structure
    }
}

/// Error during marshalling (value tree to substrate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("artefact {type_id:?} content defines the reserved key {key:?}")]
    ReservedKeyCollision { key: String, type_id: String },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Structure(#[from] DepthExceeded),
}

impl EncodeError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EncodeError::Key(err) => err.kind(),
            EncodeError::ReservedKeyCollision { .. } => ErrorKind::ReservedKeyCollision,
            EncodeError::Format(_) => ErrorKind::Format,
            EncodeError::Structure(_) => ErrorKind::Structure,
        }
    }
}

/// Error during unmarshalling (substrate to value tree).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("name {name:?} appears under more than one key")]
    DuplicateName { name: String },

    #[error("expected {expected} payload, found {found}")]
    UnexpectedShape { expected: Tag, found: &'static str },

    #[error("top-level {found} does not identify its tag; decode it with an explicit tag")]
    UntaggedRoot { found: &'static str },

    #[error("artefact object has no {key:?} discriminator")]
    MissingTypeKey { key: String },

    #[error("artefact discriminator {key:?} must be a string, found {found}")]
    InvalidTypeId { key: String, found: &'static str },

    #[error("invalid tagged wrapper: {reason}")]
    InvalidWrapper { reason: &'static str },

    #[error("{tag} element {index} is {found}")]
    TypeCoercion {
        tag: Tag,
        index: usize,
        found: &'static str,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Structure(#[from] DepthExceeded),
}

impl DecodeError {
    /// Returns the error kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::Key(err) => err.kind(),
            DecodeError::DuplicateName { .. } => ErrorKind::MalformedKey,
            DecodeError::UnexpectedShape { .. }
            | DecodeError::UntaggedRoot { .. }
            | DecodeError::MissingTypeKey { .. }
            | DecodeError::InvalidTypeId { .. }
            | DecodeError::InvalidWrapper { .. } => ErrorKind::UnexpectedShape,
            DecodeError::TypeCoercion { .. } => ErrorKind::TypeCoercion,
            DecodeError::Format(_) => ErrorKind::Format,
            DecodeError::Structure(_) => ErrorKind::Structure,
        }
    }
}
