//! Tag-stripping conversion to a plain object graph.
//!
//! A [`Plain`] graph keeps each payload in its native form but forgets the
//! distinctions only the tags carried: arrays and sequences both become
//! lists, and artefacts become maps.

use base64::{Engine, engine::general_purpose::STANDARD};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value as Json};
use tracing::{debug, trace};

use crate::codec::CodecOptions;
use crate::error::{DepthExceeded, FormatError};
use crate::model::{Identifier, Mapping, Timestamp, Value};

/// An untagged native value.
#[derive(Debug, Clone, PartialEq)]
pub enum Plain {
    Null,
    Bool(bool),
    Int(i32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(Timestamp),
    Identifier(Identifier),
    List(Vec<Plain>),
    Map(IndexMap<String, Plain>),
}

impl Plain {
    /// Renders this graph as substrate JSON without any type metadata.
    ///
    /// Timestamps and identifiers become their canonical text, bytes become
    /// base64 and non-finite doubles become `null`. The result cannot be
    /// unmarshalled back into a [`Value`].
    pub fn into_json(self) -> Result<Json, FormatError> {
        let json = match self {
            Plain::Null => Json::Null,
            Plain::Bool(b) => Json::Bool(b),
            Plain::Int(n) => Json::from(n),
            Plain::Double(x) => Number::from_f64(x).map_or(Json::Null, Json::Number),
            Plain::String(s) => Json::String(s),
            Plain::Bytes(bytes) => Json::String(STANDARD.encode(bytes)),
            Plain::Timestamp(ts) => Json::String(ts.to_text()?),
            Plain::Identifier(id) => Json::String(id.to_text()),
            Plain::List(items) => {
                let mut array = Vec::with_capacity(items.len());
                for item in items {
                    array.push(item.into_json()?);
                }
                Json::Array(array)
            }
            Plain::Map(entries) => {
                let mut object = Map::with_capacity(entries.len());
                for (name, value) in entries {
                    object.insert(name, value.into_json()?);
                }
                Json::Object(object)
            }
        };
        Ok(json)
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Plain>> {
        match self {
            Plain::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Plain]> {
        match self {
            Plain::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Strips the tags from a value tree.
///
/// An artefact becomes a map of its content with the type id inserted first
/// under the type key, unless the content already has an entry by that name.
pub fn deserialize(value: &Value) -> Result<Plain, DepthExceeded> {
    deserialize_with_options(value, &CodecOptions::default())
}

pub fn deserialize_with_options(value: &Value, options: &CodecOptions) -> Result<Plain, DepthExceeded> {
    debug!(tag = %value.tag(), "deserializing value");
    strip(value, options, 0).inspect_err(|err| {
        debug!(error = %err, "deserialize failed");
    })
}

fn strip(value: &Value, options: &CodecOptions, depth: usize) -> Result<Plain, DepthExceeded> {
    if depth > options.max_depth() {
        return Err(DepthExceeded { max: options.max_depth() });
    }

    let plain = match value {
        Value::Null => Plain::Null,
        Value::Bool(b) => Plain::Bool(*b),
        Value::Int(n) => Plain::Int(*n),
        Value::Double(x) => Plain::Double(*x),
        Value::String(s) => Plain::String(s.clone()),
        Value::Raw(bytes) => Plain::Bytes(bytes.clone()),
        Value::Timestamp(ts) => Plain::Timestamp(*ts),
        Value::Identifier(id) => Plain::Identifier(*id),
        Value::BoolArray(values) => Plain::List(values.iter().copied().map(Plain::Bool).collect()),
        Value::IntArray(values) => Plain::List(values.iter().copied().map(Plain::Int).collect()),
        Value::DoubleArray(values) => Plain::List(values.iter().copied().map(Plain::Double).collect()),
        Value::StringArray(values) => Plain::List(values.iter().cloned().map(Plain::String).collect()),
        Value::TimestampArray(values) => Plain::List(values.iter().copied().map(Plain::Timestamp).collect()),
        Value::Sequence(items) => {
            trace!(len = items.len(), depth, "stripping sequence");
            let mut stripped = Vec::with_capacity(items.len());
            for item in items {
                stripped.push(strip(item, options, depth + 1)?);
            }
            Plain::List(stripped)
        }
        Value::Mapping(mapping) => Plain::Map(strip_entries(mapping, None, options, depth)?),
        Value::Artefact(artefact) => {
            let type_key = options.type_key();
            let type_entry = if artefact.content.contains_key(type_key) {
                None
            } else {
                Some((type_key, artefact.type_id.as_str()))
            };
            Plain::Map(strip_entries(&artefact.content, type_entry, options, depth)?)
        }
    };
    Ok(plain)
}

fn strip_entries(
    mapping: &Mapping,
    type_entry: Option<(&str, &str)>,
    options: &CodecOptions,
    depth: usize,
) -> Result<IndexMap<String, Plain>, DepthExceeded> {
    trace!(entries = mapping.len(), depth, "stripping mapping");
    let mut entries = IndexMap::with_capacity(mapping.len() + usize::from(type_entry.is_some()));
    if let Some((key, type_id)) = type_entry {
        entries.insert(key.to_string(), Plain::String(type_id.to_string()));
    }
    for (name, child) in mapping {
        entries.insert(name.clone(), strip(child, options, depth + 1)?);
    }
    Ok(entries)
}
