//! Variant tags: the closed set of shapes a [`Value`](crate::Value) can take.

use std::fmt;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

/// Discriminant of a [`Value`](crate::Value).
///
/// The numeric representation is stable and shared with other runtimes that
/// exchange the same substrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Tag {
    Null = 0,
    Bool = 1,
    Int = 2,
    Double = 3,
    String = 4,
    Raw = 5,
    Artefact = 6,
    Mapping = 7,
    Timestamp = 8,
    Identifier = 9,
    BoolArray = 10,
    IntArray = 11,
    DoubleArray = 12,
    StringArray = 13,
    TimestampArray = 14,
    Sequence = 15,
}

lazy_static! {
    static ref TAGS_BY_CODE: FxHashMap<&'static str, Tag> =
        Tag::ALL.iter().map(|tag| (tag.code(), *tag)).collect();
}

impl Tag {
    /// Every tag, in discriminant order.
    pub const ALL: [Tag; 16] = [
        Tag::Null,
        Tag::Bool,
        Tag::Int,
        Tag::Double,
        Tag::String,
        Tag::Raw,
        Tag::Artefact,
        Tag::Mapping,
        Tag::Timestamp,
        Tag::Identifier,
        Tag::BoolArray,
        Tag::IntArray,
        Tag::DoubleArray,
        Tag::StringArray,
        Tag::TimestampArray,
        Tag::Sequence,
    ];

    /// Creates a Tag from its numeric representation.
    pub fn from_u8(v: u8) -> Option<Tag> {
        Tag::ALL.get(usize::from(v)).copied()
    }

    /// Short code embedded in substrate keys by the key codec.
    ///
    /// Array codes are the element code followed by `[]`.
    pub fn code(self) -> &'static str {
        match self {
            Tag::Null => "n",
            Tag::Bool => "b",
            Tag::Int => "i",
            Tag::Double => "d",
            Tag::String => "s",
            Tag::Raw => "r",
            Tag::Artefact => "a",
            Tag::Mapping => "m",
            Tag::Timestamp => "t",
            Tag::Identifier => "g",
            Tag::BoolArray => "b[]",
            Tag::IntArray => "i[]",
            Tag::DoubleArray => "d[]",
            Tag::StringArray => "s[]",
            Tag::TimestampArray => "t[]",
            Tag::Sequence => "q",
        }
    }

    /// Looks up a tag by its short code.
    pub fn from_code(code: &str) -> Option<Tag> {
        TAGS_BY_CODE.get(code).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Null => "Null",
            Tag::Bool => "Bool",
            Tag::Int => "Int",
            Tag::Double => "Double",
            Tag::String => "String",
            Tag::Raw => "Raw",
            Tag::Artefact => "Artefact",
            Tag::Mapping => "Mapping",
            Tag::Timestamp => "Timestamp",
            Tag::Identifier => "Identifier",
            Tag::BoolArray => "BoolArray",
            Tag::IntArray => "IntArray",
            Tag::DoubleArray => "DoubleArray",
            Tag::StringArray => "StringArray",
            Tag::TimestampArray => "TimestampArray",
            Tag::Sequence => "Sequence",
        }
    }

    /// Returns true for the five homogeneous primitive arrays.
    pub fn is_array(self) -> bool {
        matches!(
            self,
            Tag::BoolArray | Tag::IntArray | Tag::DoubleArray | Tag::StringArray | Tag::TimestampArray
        )
    }

    /// Returns true for tags whose payload has no children.
    pub fn is_scalar(self) -> bool {
        !self.is_array() && !matches!(self, Tag::Artefact | Tag::Mapping | Tag::Sequence)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
