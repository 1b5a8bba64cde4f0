//! Unmarshalling: untyped substrate back to a value tree.
//!
//! Every recursion point needs a tag. Inside the tree it comes from the
//! mapping key or the sequence wrapper; at the root it is either recovered
//! structurally ([`unmarshal`]), supplied by the caller ([`unmarshal_as`]),
//! or read from a wrapper ([`unmarshal_tagged`]).
//!
//! Decoding is strict: nothing is coerced, and the first problem aborts the
//! whole conversion.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use crate::codec::key::decode_key;
use crate::codec::options::CodecOptions;
use crate::error::{DecodeError, DepthExceeded, FormatError};
use crate::model::{Artefact, Identifier, Mapping, Tag, Timestamp, Value};

/// Unmarshals a substrate tree whose root shape identifies its tag.
///
/// - an object is a mapping, or an artefact when it holds the type key
/// - an array is a sequence
///
/// Any other root fails with [`DecodeError::UntaggedRoot`].
pub fn unmarshal(json: &Json) -> Result<Value, DecodeError> {
    unmarshal_with_options(json, &CodecOptions::default())
}

pub fn unmarshal_with_options(json: &Json, options: &CodecOptions) -> Result<Value, DecodeError> {
    let decoder = Decoder { options };
    let tag = match json {
        Json::Object(object) if object.contains_key(options.type_key()) => Tag::Artefact,
        Json::Object(_) => Tag::Mapping,
        Json::Array(_) => Tag::Sequence,
        other => {
            return Err(DecodeError::UntaggedRoot {
                found: shape_name(other),
            });
        }
    };
    debug!(%tag, "unmarshalling value");
    decoder.decode(json, tag, 0).inspect_err(|err| {
        debug!(error = %err, "unmarshal failed");
    })
}

/// Unmarshals a substrate tree under a tag the caller kept out of band.
pub fn unmarshal_as(json: &Json, tag: Tag) -> Result<Value, DecodeError> {
    unmarshal_as_with_options(json, tag, &CodecOptions::default())
}

pub fn unmarshal_as_with_options(json: &Json, tag: Tag, options: &CodecOptions) -> Result<Value, DecodeError> {
    debug!(%tag, "unmarshalling value with explicit tag");
    Decoder { options }.decode(json, tag, 0)
}

/// Unmarshals the output of [`marshal_tagged`](crate::codec::marshal_tagged).
pub fn unmarshal_tagged(json: &Json) -> Result<Value, DecodeError> {
    unmarshal_tagged_with_options(json, &CodecOptions::default())
}

pub fn unmarshal_tagged_with_options(json: &Json, options: &CodecOptions) -> Result<Value, DecodeError> {
    debug!("unmarshalling tagged value");
    Decoder { options }.decode_wrapped(json, 0)
}

/// Describes the substrate shape of a value, for error messages.
pub(crate) fn shape_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

struct Decoder<'o> {
    options: &'o CodecOptions,
}

impl Decoder<'_> {
    fn decode(&self, json: &Json, tag: Tag, depth: usize) -> Result<Value, DecodeError> {
        if depth > self.options.max_depth() {
            return Err(DepthExceeded { max: self.options.max_depth() }.into());
        }

        let unexpected = || DecodeError::UnexpectedShape {
            expected: tag,
            found: shape_name(json),
        };

        let value = match tag {
            Tag::Null => match json {
                Json::Null => Value::Null,
                _ => return Err(unexpected()),
            },
            Tag::Bool => Value::Bool(json.as_bool().ok_or_else(unexpected)?),
            Tag::Int => Value::Int(decode_int(json).ok_or_else(unexpected)?),
            Tag::Double => Value::Double(decode_double(json).ok_or_else(unexpected)?),
            Tag::String => Value::String(json.as_str().ok_or_else(unexpected)?.to_string()),
            Tag::Raw => Value::Raw(decode_raw(json.as_str().ok_or_else(unexpected)?)?),
            Tag::Timestamp => Value::Timestamp(Timestamp::from_text(json.as_str().ok_or_else(unexpected)?)?),
            Tag::Identifier => Value::Identifier(Identifier::from_text(json.as_str().ok_or_else(unexpected)?)?),
            Tag::Artefact => {
                let object = json.as_object().ok_or_else(unexpected)?;
                Value::Artefact(self.decode_artefact(object, depth)?)
            }
            Tag::Mapping => {
                let object = json.as_object().ok_or_else(unexpected)?;
                Value::Mapping(self.decode_entries(object.iter(), object.len(), depth)?)
            }
            Tag::BoolArray => Value::BoolArray(decode_elements(json, tag, |item| item.as_bool())?),
            Tag::IntArray => Value::IntArray(decode_elements(json, tag, decode_int)?),
            Tag::DoubleArray => Value::DoubleArray(decode_elements(json, tag, decode_double)?),
            Tag::StringArray => {
                Value::StringArray(decode_elements(json, tag, |item| item.as_str().map(str::to_string))?)
            }
            Tag::TimestampArray => {
                let texts = decode_elements(json, tag, Json::as_str)?;
                let mut stamps = Vec::with_capacity(texts.len());
                for text in texts {
                    stamps.push(Timestamp::from_text(text)?);
                }
                Value::TimestampArray(stamps)
            }
            Tag::Sequence => {
                let items = json.as_array().ok_or_else(unexpected)?;
                trace!(len = items.len(), depth, "decoding sequence");
                let mut decoded = Vec::with_capacity(items.len());
                for item in items {
                    decoded.push(self.decode_wrapped(item, depth + 1)?);
                }
                Value::Sequence(decoded)
            }
        };
        Ok(value)
    }

    /// Decodes `{ ":" code: payload }`.
    fn decode_wrapped(&self, json: &Json, depth: usize) -> Result<Value, DecodeError> {
        let object = json.as_object().ok_or(DecodeError::InvalidWrapper {
            reason: "expected a single-entry object",
        })?;
        let mut entries = object.iter();
        let (key, payload) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(DecodeError::InvalidWrapper {
                    reason: "expected a single-entry object",
                });
            }
        };
        let (name, tag) = decode_key(key)?;
        if !name.is_empty() {
            return Err(DecodeError::InvalidWrapper {
                reason: "wrapper key must have an empty name",
            });
        }
        self.decode(payload, tag, depth)
    }

    fn decode_entries<'j>(
        &self,
        entries: impl Iterator<Item = (&'j String, &'j Json)>,
        capacity: usize,
        depth: usize,
    ) -> Result<Mapping, DecodeError> {
        trace!(entries = capacity, depth, "decoding mapping");
        let mut mapping = Mapping::with_capacity(capacity);
        for (key, child) in entries {
            let (name, tag) = decode_key(key)?;
            if mapping.contains_key(name) {
                return Err(DecodeError::DuplicateName {
                    name: name.to_string(),
                });
            }
            let value = self.decode(child, tag, depth + 1)?;
            mapping.insert(name, value);
        }
        Ok(mapping)
    }

    fn decode_artefact(&self, object: &Map<String, Json>, depth: usize) -> Result<Artefact, DecodeError> {
        let type_key = self.options.type_key();
        let type_id = match object.get(type_key) {
            Some(Json::String(type_id)) => type_id.clone(),
            Some(other) => {
                return Err(DecodeError::InvalidTypeId {
                    key: type_key.to_string(),
                    found: shape_name(other),
                });
            }
            None => {
                return Err(DecodeError::MissingTypeKey {
                    key: type_key.to_string(),
                });
            }
        };

        let content_entries = object.iter().filter(|(key, _)| key.as_str() != type_key);
        let content = self.decode_entries(content_entries, object.len() - 1, depth)?;
        Ok(Artefact { type_id, content })
    }
}

/// Accepts integral numbers within i32 range only.
fn decode_int(json: &Json) -> Option<i32> {
    json.as_i64().and_then(|n| i32::try_from(n).ok())
}

/// Accepts any number, or one of the non-finite spellings.
fn decode_double(json: &Json) -> Option<f64> {
    match json {
        Json::Number(number) => number.as_f64(),
        Json::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

fn decode_raw(text: &str) -> Result<Vec<u8>, FormatError> {
    STANDARD.decode(text).map_err(|err| FormatError::Base64 {
        reason: err.to_string(),
    })
}

/// Decodes a homogeneous array, failing on the first element of the wrong shape.
fn decode_elements<'j, T>(
    json: &'j Json,
    tag: Tag,
    element: impl Fn(&'j Json) -> Option<T>,
) -> Result<Vec<T>, DecodeError> {
    let items = json.as_array().ok_or(DecodeError::UnexpectedShape {
        expected: tag,
        found: shape_name(json),
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            element(item).ok_or(DecodeError::TypeCoercion {
                tag,
                index,
                found: shape_name(item),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, KeyError};
    use serde_json::json;

    #[test]
    fn test_mapping() {
        let json = json!({ "name:s": "Alice", "age:i": 30, "tags:s[]": ["a"] });
        let value = unmarshal(&json).unwrap();
        assert_eq!(
            value,
            Mapping::new()
                .with_string("name", "Alice")
                .with_int("age", 30)
                .with_string_array("tags", ["a"])
                .build()
        );
        let names: Vec<&String> = value.as_mapping().unwrap().names().collect();
        assert_eq!(names, ["name", "age", "tags"]);
    }

    #[test]
    fn test_artefact() {
        let json = json!({ "$type": "Geo.Point", "lat:d": 1.5, "lon:d": 2 });
        let value = unmarshal(&json).unwrap();
        let artefact = value.as_artefact().unwrap();
        assert_eq!(artefact.type_id, "Geo.Point");
        assert_eq!(artefact.content.len(), 2);
        // An integral JSON number is still a valid double
        assert_eq!(artefact.content.get("lon"), Some(&Value::Double(2.0)));
    }

    #[test]
    fn test_artefact_content_keeps_order() {
        let json = json!({
            "z:i": 1,
            "$type": "T",
            "a:m": { "y:i": 2, "b:i": 3 },
            "m:q": [{ ":m": { "k:i": 4, "c:i": 5 } }]
        });
        let value = unmarshal(&json).unwrap();
        let content = &value.as_artefact().unwrap().content;
        let names: Vec<&String> = content.names().collect();
        assert_eq!(names, ["z", "a", "m"]);

        let inner: Vec<&String> = content.get("a").unwrap().as_mapping().unwrap().names().collect();
        assert_eq!(inner, ["y", "b"]);

        let items = content.get("m").unwrap().as_sequence().unwrap();
        let wrapped: Vec<&String> = items[0].as_mapping().unwrap().names().collect();
        assert_eq!(wrapped, ["k", "c"]);
    }

    #[test]
    fn test_artefact_type_id_must_be_text() {
        let err = unmarshal(&json!({ "$type": 5 })).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidTypeId { key: "$type".to_string(), found: "number" }
        );
        assert_eq!(err.kind(), ErrorKind::UnexpectedShape);
    }

    #[test]
    fn test_artefact_tag_requires_type_key() {
        let json = json!({ "x:a": { "y:i": 1 } });
        let err = unmarshal(&json).unwrap_err();
        assert_eq!(err, DecodeError::MissingTypeKey { key: "$type".to_string() });
    }

    #[test]
    fn test_type_key_inside_plain_mapping_is_malformed() {
        let json = json!({ "x:m": { "$type": "T" } });
        let err = unmarshal(&json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedKey);
    }

    #[test]
    fn test_malformed_key_rejected() {
        let json = json!({ "good:i": 1, "bad": 2 });
        let err = unmarshal(&json).unwrap_err();
        assert_eq!(err, DecodeError::Key(KeyError::MissingTag { key: "bad".to_string() }));
        assert_eq!(err.kind(), ErrorKind::MalformedKey);

        let err = unmarshal(&json!({ "x:zz": 1 })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedKey);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let json = json!({ "a:i": 1, "a:s": "one" });
        let err = unmarshal(&json).unwrap_err();
        assert_eq!(err, DecodeError::DuplicateName { name: "a".to_string() });
        assert_eq!(err.kind(), ErrorKind::MalformedKey);
    }

    #[test]
    fn test_scalar_shape_mismatch() {
        let err = unmarshal(&json!({ "n:i": "5" })).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedShape { expected: Tag::Int, found: "string" });
        assert_eq!(err.kind(), ErrorKind::UnexpectedShape);

        // Fractional and out-of-range numbers are not ints
        assert!(unmarshal(&json!({ "n:i": 1.5 })).is_err());
        assert!(unmarshal(&json!({ "n:i": 3.0 })).is_err());
        assert!(unmarshal(&json!({ "n:i": 4_294_967_296i64 })).is_err());
        assert!(unmarshal(&json!({ "b:b": 1 })).is_err());
        assert!(unmarshal(&json!({ "z:n": 0 })).is_err());
        assert!(unmarshal(&json!({ "d:d": "1.5" })).is_err());
    }

    #[test]
    fn test_array_type_coercion() {
        let err = unmarshal(&json!({ "xs:i[]": [1, 2, "3"] })).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeCoercion { tag: Tag::IntArray, index: 2, found: "string" }
        );
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);

        let err = unmarshal(&json!({ "xs:s[]": ["a", null] })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeCoercion);

        let err = unmarshal(&json!({ "xs:b[]": true })).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedShape { expected: Tag::BoolArray, found: "boolean" }
        );
    }

    #[test]
    fn test_format_errors() {
        let err = unmarshal(&json!({ "id:g": "not-an-id" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = unmarshal(&json!({ "at:t": "yesterday" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = unmarshal(&json!({ "at:t[]": ["2024-03-15T14:30:00Z", "later"] })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);

        let err = unmarshal(&json!({ "blob:r": "***" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_sequence_wrappers() {
        let json = json!([{ ":i": 1 }, { ":s": "x" }, { ":q": [{ ":n": null }] }]);
        let value = unmarshal(&json).unwrap();
        assert_eq!(
            value,
            Value::sequence(vec![
                Value::int(1),
                Value::string("x"),
                Value::sequence(vec![Value::Null]),
            ])
        );
    }

    #[test]
    fn test_invalid_wrappers() {
        let bare = unmarshal(&json!(["a", "b"])).unwrap_err();
        assert_eq!(bare.kind(), ErrorKind::UnexpectedShape);

        let two = unmarshal(&json!([{ ":i": 1, ":s": "x" }])).unwrap_err();
        assert_eq!(two.kind(), ErrorKind::UnexpectedShape);

        let empty = unmarshal(&json!([{}])).unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::UnexpectedShape);

        let named = unmarshal(&json!([{ "x:i": 1 }])).unwrap_err();
        assert_eq!(
            named,
            DecodeError::InvalidWrapper { reason: "wrapper key must have an empty name" }
        );
    }

    #[test]
    fn test_untagged_root() {
        for json in [json!(1), json!("s"), json!(null), json!(true)] {
            let err = unmarshal(&json).unwrap_err();
            assert!(matches!(err, DecodeError::UntaggedRoot { .. }));
        }
    }

    #[test]
    fn test_explicit_tag() {
        assert_eq!(unmarshal_as(&json!(5), Tag::Int).unwrap(), Value::Int(5));
        assert_eq!(unmarshal_as(&json!(5), Tag::Double).unwrap(), Value::Double(5.0));
        assert_eq!(
            unmarshal_as(&json!(["a", "b"]), Tag::StringArray).unwrap(),
            Value::string_array(["a", "b"])
        );
        assert!(unmarshal_as(&json!(["a", "b"]), Tag::Sequence).is_err());
    }

    #[test]
    fn test_tagged_root() {
        assert_eq!(unmarshal_tagged(&json!({ ":d": 3 })).unwrap(), Value::Double(3.0));
        assert!(unmarshal_tagged(&json!(3)).is_err());
    }

    #[test]
    fn test_non_finite_doubles() {
        let value = unmarshal_as(&json!(["NaN", "Infinity", "-Infinity", 0.5]), Tag::DoubleArray).unwrap();
        let values = value.as_double_array().unwrap();
        assert!(values[0].is_nan());
        assert_eq!(values[1], f64::INFINITY);
        assert_eq!(values[2], f64::NEG_INFINITY);
        assert_eq!(values[3], 0.5);

        assert!(unmarshal_as(&json!("nan"), Tag::Double).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut nested = json!({ ":i": 0 });
        for _ in 0..10 {
            nested = json!({ ":q": [nested] });
        }
        let shallow = CodecOptions::new().with_max_depth(4);
        let err = unmarshal_tagged_with_options(&nested, &shallow).unwrap_err();
        assert_eq!(err, DecodeError::Structure(DepthExceeded { max: 4 }));
        assert!(unmarshal_tagged(&nested).is_ok());
    }
}
