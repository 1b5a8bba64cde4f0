//! Marshalling: value tree to untyped substrate.
//!
//! Scalars become bare substrate primitives. Type information travels in
//! the enclosing context:
//! - mapping entries embed the child's tag in the object key
//! - sequence elements are wrapped in single-entry objects keyed `":" code`
//! - artefacts add the reserved type key next to their content entries
//!
//! A scalar or homogeneous array marshalled at the top level therefore loses
//! its tag. Use [`marshal_tagged`] when the root itself must round-trip.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Number, Value as Json};
use tracing::{debug, trace};

use crate::codec::key::encode_key;
use crate::codec::options::CodecOptions;
use crate::error::{DepthExceeded, EncodeError};
use crate::model::{Artefact, Mapping, Value};

/// Marshals a value with default options.
pub fn marshal(value: &Value) -> Result<Json, EncodeError> {
    marshal_with_options(value, &CodecOptions::default())
}

/// Marshals a value with the given options.
pub fn marshal_with_options(value: &Value, options: &CodecOptions) -> Result<Json, EncodeError> {
    debug!(tag = %value.tag(), "marshalling value");
    Encoder { options }.encode(value, 0).inspect_err(|err| {
        debug!(error = %err, "marshal failed");
    })
}

/// Marshals a value inside a single-entry wrapper that records its tag.
///
/// The wrapper has the same shape as a sequence element, so any value,
/// including a bare scalar, survives [`unmarshal_tagged`](crate::codec::unmarshal_tagged).
pub fn marshal_tagged(value: &Value) -> Result<Json, EncodeError> {
    marshal_tagged_with_options(value, &CodecOptions::default())
}

pub fn marshal_tagged_with_options(value: &Value, options: &CodecOptions) -> Result<Json, EncodeError> {
    debug!(tag = %value.tag(), "marshalling tagged value");
    Encoder { options }.encode_wrapped(value, 0)
}

/// Text used for doubles the substrate number cannot carry.
pub(crate) fn non_finite_text(x: f64) -> &'static str {
    if x.is_nan() {
        "NaN"
    } else if x > 0.0 {
        "Infinity"
    } else {
        "-Infinity"
    }
}

struct Encoder<'o> {
    options: &'o CodecOptions,
}

impl Encoder<'_> {
    fn encode(&self, value: &Value, depth: usize) -> Result<Json, EncodeError> {
        if depth > self.options.max_depth() {
            return Err(DepthExceeded { max: self.options.max_depth() }.into());
        }

        let json = match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Double(x) => encode_double(*x),
            Value::String(s) => Json::String(s.clone()),
            Value::Raw(bytes) => Json::String(STANDARD.encode(bytes)),
            Value::Timestamp(ts) => Json::String(ts.to_text()?),
            Value::Identifier(id) => Json::String(id.to_text()),
            Value::BoolArray(values) => Json::Array(values.iter().map(|b| Json::Bool(*b)).collect()),
            Value::IntArray(values) => Json::Array(values.iter().map(|n| Json::from(*n)).collect()),
            Value::DoubleArray(values) => Json::Array(values.iter().map(|x| encode_double(*x)).collect()),
            Value::StringArray(values) => Json::Array(values.iter().cloned().map(Json::String).collect()),
            Value::TimestampArray(values) => {
                let mut texts = Vec::with_capacity(values.len());
                for ts in values {
                    texts.push(Json::String(ts.to_text()?));
                }
                Json::Array(texts)
            }
            Value::Sequence(items) => {
                trace!(len = items.len(), depth, "encoding sequence");
                let mut encoded = Vec::with_capacity(items.len());
                for item in items {
                    encoded.push(self.encode_wrapped(item, depth + 1)?);
                }
                Json::Array(encoded)
            }
            Value::Mapping(mapping) => {
                let mut object = Map::with_capacity(mapping.len());
                self.encode_entries(mapping, depth, &mut object)?;
                Json::Object(object)
            }
            Value::Artefact(artefact) => self.encode_artefact(artefact, depth)?,
        };
        Ok(json)
    }

    /// Encodes `{ ":" code: payload }`.
    fn encode_wrapped(&self, value: &Value, depth: usize) -> Result<Json, EncodeError> {
        let key = encode_key("", value.tag())?;
        let payload = self.encode(value, depth)?;
        let mut wrapper = Map::with_capacity(1);
        wrapper.insert(key, payload);
        Ok(Json::Object(wrapper))
    }

    fn encode_entries(
        &self,
        mapping: &Mapping,
        depth: usize,
        object: &mut Map<String, Json>,
    ) -> Result<(), EncodeError> {
        trace!(entries = mapping.len(), depth, "encoding mapping");
        for (name, child) in mapping {
            let key = encode_key(name, child.tag())?;
            object.insert(key, self.encode(child, depth + 1)?);
        }
        Ok(())
    }

    fn encode_artefact(&self, artefact: &Artefact, depth: usize) -> Result<Json, EncodeError> {
        let type_key = self.options.type_key();
        if artefact.content.contains_key(type_key) {
            return Err(EncodeError::ReservedKeyCollision {
                key: type_key.to_string(),
                type_id: artefact.type_id.clone(),
            });
        }

        let mut object = Map::with_capacity(artefact.content.len() + 1);
        object.insert(type_key.to_string(), Json::String(artefact.type_id.clone()));
        self.encode_entries(&artefact.content, depth, &mut object)?;
        Ok(Json::Object(object))
    }
}

fn encode_double(x: f64) -> Json {
    match Number::from_f64(x) {
        Some(number) => Json::Number(number),
        None => Json::String(non_finite_text(x).to_string()),
    }
}
