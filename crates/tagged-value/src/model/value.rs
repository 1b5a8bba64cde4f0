//! The tagged value container.
//!
//! A [`Value`] is one of sixteen shapes, each carrying only the payload its
//! [`Tag`] requires. Homogeneous arrays hold flat primitive vectors; the
//! [`Value::Sequence`] shape holds full values and is the only heterogeneous
//! collection.

use indexmap::IndexMap;
use lazy_static::lazy_static;

use crate::error::{EncodeError, ShapeMismatchError};
use crate::model::{Identifier, Tag, Timestamp};

/// An insertion-ordered collection of uniquely named values.
///
/// Inserting a name that already exists replaces its value in place: the
/// entry keeps the position of its first insertion.
///
/// Equality compares entries regardless of order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: IndexMap<String, Value>,
}

impl Mapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Inserts an entry, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes an entry, preserving the order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn names(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.entries.keys()
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.entries
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Adds an entry of any shape.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_null(self, name: impl Into<String>) -> Self {
        self.with(name, Value::Null)
    }

    pub fn with_bool(self, name: impl Into<String>, value: bool) -> Self {
        self.with(name, Value::Bool(value))
    }

    pub fn with_int(self, name: impl Into<String>, value: i32) -> Self {
        self.with(name, Value::Int(value))
    }

    pub fn with_double(self, name: impl Into<String>, value: f64) -> Self {
        self.with(name, Value::Double(value))
    }

    pub fn with_string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, Value::String(value.into()))
    }

    pub fn with_raw(self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.with(name, Value::Raw(value.into()))
    }

    pub fn with_identifier(self, name: impl Into<String>, value: Identifier) -> Self {
        self.with(name, Value::Identifier(value))
    }

    pub fn with_timestamp(self, name: impl Into<String>, value: Timestamp) -> Self {
        self.with(name, Value::Timestamp(value))
    }

    pub fn with_artefact(self, name: impl Into<String>, type_id: impl Into<String>, content: Mapping) -> Self {
        self.with(name, Value::artefact(type_id, content))
    }

    pub fn with_mapping(self, name: impl Into<String>, value: Mapping) -> Self {
        self.with(name, Value::Mapping(value))
    }

    pub fn with_bool_array(self, name: impl Into<String>, values: impl Into<Vec<bool>>) -> Self {
        self.with(name, Value::BoolArray(values.into()))
    }

    pub fn with_int_array(self, name: impl Into<String>, values: impl Into<Vec<i32>>) -> Self {
        self.with(name, Value::IntArray(values.into()))
    }

    pub fn with_double_array(self, name: impl Into<String>, values: impl Into<Vec<f64>>) -> Self {
        self.with(name, Value::DoubleArray(values.into()))
    }

    pub fn with_string_array<S: Into<String>>(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        self.with(name, Value::string_array(values))
    }

    pub fn with_timestamp_array(self, name: impl Into<String>, values: impl Into<Vec<Timestamp>>) -> Self {
        self.with(name, Value::TimestampArray(values.into()))
    }

    pub fn with_sequence(self, name: impl Into<String>, items: impl Into<Vec<Value>>) -> Self {
        self.with(name, Value::Sequence(items.into()))
    }

    /// Finishes building and wraps the mapping in a [`Value`].
    pub fn build(self) -> Value {
        Value::Mapping(self)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (name, value) in iter {
            mapping.insert(name, value);
        }
        mapping
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl From<IndexMap<String, Value>> for Mapping {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Self { entries }
    }
}

/// A type-tagged structured value.
#[derive(Debug, Clone, PartialEq)]
pub struct Artefact {
    /// Identifies the producer-side type of the content.
    pub type_id: String,
    pub content: Mapping,
}

impl Artefact {
    pub fn new(type_id: impl Into<String>, content: Mapping) -> Self {
        Self {
            type_id: type_id.into(),
            content,
        }
    }

    /// Creates an artefact, rejecting content that shadows `type_key`.
    ///
    /// [`marshal`](crate::codec::marshal) performs the same check; this lets
    /// a producer fail at construction instead.
    pub fn try_new(type_id: impl Into<String>, content: Mapping, type_key: &str) -> Result<Self, EncodeError> {
        let type_id = type_id.into();
        if content.contains_key(type_key) {
            return Err(EncodeError::ReservedKeyCollision {
                key: type_key.to_string(),
                type_id,
            });
        }
        Ok(Self { type_id, content })
    }
}

lazy_static! {
    static ref EMPTY_MAPPING: Value = Value::Mapping(Mapping::new());
}

/// A self-describing value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absence of a value.
    Null,
    Bool(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit IEEE 754 float. Non-finite values are allowed.
    Double(f64),
    /// UTF-8 text.
    String(String),
    /// Opaque binary payload.
    Raw(Vec<u8>),
    Artefact(Artefact),
    Mapping(Mapping),
    Timestamp(Timestamp),
    Identifier(Identifier),
    BoolArray(Vec<bool>),
    IntArray(Vec<i32>),
    DoubleArray(Vec<f64>),
    StringArray(Vec<String>),
    TimestampArray(Vec<Timestamp>),
    /// Ordered list of values of any shape.
    Sequence(Vec<Value>),
}

impl Value {
    /// Returns the tag of this value.
    pub fn tag(&self) -> Tag {
        match self {
            Value::Null => Tag::Null,
            Value::Bool(_) => Tag::Bool,
            Value::Int(_) => Tag::Int,
            Value::Double(_) => Tag::Double,
            Value::String(_) => Tag::String,
            Value::Raw(_) => Tag::Raw,
            Value::Artefact(_) => Tag::Artefact,
            Value::Mapping(_) => Tag::Mapping,
            Value::Timestamp(_) => Tag::Timestamp,
            Value::Identifier(_) => Tag::Identifier,
            Value::BoolArray(_) => Tag::BoolArray,
            Value::IntArray(_) => Tag::IntArray,
            Value::DoubleArray(_) => Tag::DoubleArray,
            Value::StringArray(_) => Tag::StringArray,
            Value::TimestampArray(_) => Tag::TimestampArray,
            Value::Sequence(_) => Tag::Sequence,
        }
    }

    fn mismatch(&self, expected: Tag) -> ShapeMismatchError {
        ShapeMismatchError {
            expected,
            actual: self.tag(),
        }
    }

    // =========================================================================
    // Construction
    // =========================================================================

    pub fn null() -> Self {
        Value::Null
    }

    pub fn bool(value: bool) -> Self {
        Value::Bool(value)
    }

    pub fn int(value: i32) -> Self {
        Value::Int(value)
    }

    pub fn double(value: f64) -> Self {
        Value::Double(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn raw(value: impl Into<Vec<u8>>) -> Self {
        Value::Raw(value.into())
    }

    pub fn identifier(value: Identifier) -> Self {
        Value::Identifier(value)
    }

    pub fn timestamp(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }

    pub fn artefact(type_id: impl Into<String>, content: Mapping) -> Self {
        Value::Artefact(Artefact::new(type_id, content))
    }

    /// Creates a mapping from named entries. Later duplicates overwrite earlier ones.
    pub fn mapping<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Mapping(entries.into_iter().collect())
    }

    /// The canonical empty mapping, the usual starting point for [`Value::with`].
    pub fn empty_mapping() -> Self {
        Value::Mapping(Mapping::new())
    }

    /// A process-wide shared empty mapping.
    pub fn shared_empty_mapping() -> &'static Value {
        &EMPTY_MAPPING
    }

    pub fn bool_array(values: impl Into<Vec<bool>>) -> Self {
        Value::BoolArray(values.into())
    }

    pub fn int_array(values: impl Into<Vec<i32>>) -> Self {
        Value::IntArray(values.into())
    }

    pub fn double_array(values: impl Into<Vec<f64>>) -> Self {
        Value::DoubleArray(values.into())
    }

    pub fn string_array<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Value::StringArray(values.into_iter().map(Into::into).collect())
    }

    pub fn timestamp_array(values: impl Into<Vec<Timestamp>>) -> Self {
        Value::TimestampArray(values.into())
    }

    pub fn sequence(items: impl Into<Vec<Value>>) -> Self {
        Value::Sequence(items.into())
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Adds a named entry to a mapping value.
    ///
    /// Consumes the value, so a chain of `with` calls has a single owner; two
    /// clones of a partially built mapping evolve independently. Fails when
    /// the value is not a mapping. [`Mapping`] has typed, infallible
    /// counterparts (`with_int`, `with_sequence`, ...).
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Result<Self, ShapeMismatchError> {
        match self {
            Value::Mapping(mapping) => Ok(Value::Mapping(mapping.with(name, value))),
            other => Err(other.mismatch(Tag::Mapping)),
        }
    }

    /// Looks up a child by name in a mapping or in artefact content.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Mapping(mapping) => mapping.get(name),
            Value::Artefact(artefact) => artefact.content.get(name),
            _ => None,
        }
    }

    // =========================================================================
    // Extraction
    // =========================================================================

    pub fn as_null(&self) -> Result<(), ShapeMismatchError> {
        match self {
            Value::Null => Ok(()),
            _ => Err(self.mismatch(Tag::Null)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ShapeMismatchError> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.mismatch(Tag::Bool)),
        }
    }

    /// Returns the integer payload. A Double is never accepted, even when integral.
    pub fn as_int(&self) -> Result<i32, ShapeMismatchError> {
        match self {
            Value::Int(n) => Ok(*n),
            _ => Err(self.mismatch(Tag::Int)),
        }
    }

    /// Returns the float payload. An Int is never widened.
    pub fn as_double(&self) -> Result<f64, ShapeMismatchError> {
        match self {
            Value::Double(x) => Ok(*x),
            _ => Err(self.mismatch(Tag::Double)),
        }
    }

    pub fn as_string(&self) -> Result<&str, ShapeMismatchError> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.mismatch(Tag::String)),
        }
    }

    pub fn as_raw(&self) -> Result<&[u8], ShapeMismatchError> {
        match self {
            Value::Raw(bytes) => Ok(bytes),
            _ => Err(self.mismatch(Tag::Raw)),
        }
    }

    pub fn as_artefact(&self) -> Result<&Artefact, ShapeMismatchError> {
        match self {
            Value::Artefact(artefact) => Ok(artefact),
            _ => Err(self.mismatch(Tag::Artefact)),
        }
    }

    pub fn as_mapping(&self) -> Result<&Mapping, ShapeMismatchError> {
        match self {
            Value::Mapping(mapping) => Ok(mapping),
            _ => Err(self.mismatch(Tag::Mapping)),
        }
    }

    pub fn as_timestamp(&self) -> Result<Timestamp, ShapeMismatchError> {
        match self {
            Value::Timestamp(ts) => Ok(*ts),
            _ => Err(self.mismatch(Tag::Timestamp)),
        }
    }

    pub fn as_identifier(&self) -> Result<Identifier, ShapeMismatchError> {
        match self {
            Value::Identifier(id) => Ok(*id),
            _ => Err(self.mismatch(Tag::Identifier)),
        }
    }

    pub fn as_bool_array(&self) -> Result<&[bool], ShapeMismatchError> {
        match self {
            Value::BoolArray(values) => Ok(values),
            _ => Err(self.mismatch(Tag::BoolArray)),
        }
    }

    pub fn as_int_array(&self) -> Result<&[i32], ShapeMismatchError> {
        match self {
            Value::IntArray(values) => Ok(values),
            _ => Err(self.mismatch(Tag::IntArray)),
        }
    }

    pub fn as_double_array(&self) -> Result<&[f64], ShapeMismatchError> {
        match self {
            Value::DoubleArray(values) => Ok(values),
            _ => Err(self.mismatch(Tag::DoubleArray)),
        }
    }

    pub fn as_string_array(&self) -> Result<&[String], ShapeMismatchError> {
        match self {
            Value::StringArray(values) => Ok(values),
            _ => Err(self.mismatch(Tag::StringArray)),
        }
    }

    pub fn as_timestamp_array(&self) -> Result<&[Timestamp], ShapeMismatchError> {
        match self {
            Value::TimestampArray(values) => Ok(values),
            _ => Err(self.mismatch(Tag::TimestampArray)),
        }
    }

    pub fn as_sequence(&self) -> Result<&[Value], ShapeMismatchError> {
        match self {
            Value::Sequence(items) => Ok(items),
            _ => Err(self.mismatch(Tag::Sequence)),
        }
    }

    pub fn into_string(self) -> Result<String, ShapeMismatchError> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(Tag::String)),
        }
    }

    pub fn into_raw(self) -> Result<Vec<u8>, ShapeMismatchError> {
        match self {
            Value::Raw(bytes) => Ok(bytes),
            other => Err(other.mismatch(Tag::Raw)),
        }
    }

    pub fn into_artefact(self) -> Result<Artefact, ShapeMismatchError> {
        match self {
            Value::Artefact(artefact) => Ok(artefact),
            other => Err(other.mismatch(Tag::Artefact)),
        }
    }

    pub fn into_mapping(self) -> Result<Mapping, ShapeMismatchError> {
        match self {
            Value::Mapping(mapping) => Ok(mapping),
            other => Err(other.mismatch(Tag::Mapping)),
        }
    }

    pub fn into_sequence(self) -> Result<Vec<Value>, ShapeMismatchError> {
        match self {
            Value::Sequence(items) => Ok(items),
            other => Err(other.mismatch(Tag::Sequence)),
        }
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Value::Raw(_))
    }

    pub fn is_artefact(&self) -> bool {
        matches!(self, Value::Artefact(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(self, Value::Timestamp(_))
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Value::Identifier(_))
    }

    pub fn is_bool_array(&self) -> bool {
        matches!(self, Value::BoolArray(_))
    }

    pub fn is_int_array(&self) -> bool {
        matches!(self, Value::IntArray(_))
    }

    pub fn is_double_array(&self) -> bool {
        matches!(self, Value::DoubleArray(_))
    }

    pub fn is_string_array(&self) -> bool {
        matches!(self, Value::StringArray(_))
    }

    pub fn is_timestamp_array(&self) -> bool {
        matches!(self, Value::TimestampArray(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Identifier> for Value {
    fn from(value: Identifier) -> Self {
        Value::Identifier(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Artefact> for Value {
    fn from(value: Artefact) -> Self {
        Value::Artefact(value)
    }
}

impl From<Mapping> for Value {
    fn from(value: Mapping) -> Self {
        Value::Mapping(value)
    }
}

impl From<Vec<bool>> for Value {
    fn from(values: Vec<bool>) -> Self {
        Value::BoolArray(values)
    }
}

impl From<Vec<i32>> for Value {
    fn from(values: Vec<i32>) -> Self {
        Value::IntArray(values)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::DoubleArray(values)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Value::StringArray(values)
    }
}

impl From<Vec<Timestamp>> for Value {
    fn from(values: Vec<Timestamp>) -> Self {
        Value::TimestampArray(values)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}
