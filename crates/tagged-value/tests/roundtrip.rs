//! End-to-end behaviour of the substrate conversions.

use serde_json::json;
use tagged_value::{
    Artefact, CodecOptions, DecodeError, ErrorKind, Identifier, Mapping, Plain, Tag, Timestamp, Value, deserialize,
    deserialize_with_options, marshal, marshal_tagged, marshal_with_options, unmarshal, unmarshal_as, unmarshal_tagged,
    unmarshal_with_options,
};
use tagged_value::codec::{marshal_tagged_with_options, unmarshal_tagged_with_options};
use tagged_value::limits::{MAX_DEPTH, MAX_DEPTH_CEILING};

mod common;
use common::assert_same_order;

fn sample_record() -> Value {
    let created = Timestamp::from_text("2024-03-15T14:30:00.25Z").unwrap();
    Mapping::new()
        .with_null("nothing")
        .with_bool("active", true)
        .with_int("count", i32::MIN)
        .with_double("ratio", 0.1)
        .with_double("whole", 3.0)
        .with_string("name", "Zoë")
        .with_raw("blob", vec![0u8, 255, 16])
        .with_identifier("id", Identifier::derived(b"record"))
        .with_timestamp("created", created)
        .with_bool_array("flags", vec![true, false])
        .with_int_array("counts", vec![1, -2, i32::MAX])
        .with_double_array("weights", vec![0.5, -1.5])
        .with_string_array("tags", ["a", "b"])
        .with_timestamp_array("history", vec![created, Timestamp::UNIX_EPOCH])
        .with_sequence(
            "mixed",
            vec![
                Value::int(1),
                Value::string("two"),
                Value::empty_mapping(),
                Value::sequence(vec![Value::Null]),
                Value::artefact("Unit", Mapping::new()),
            ],
        )
        .with_mapping("nested", Mapping::new().with_mapping("deeper", Mapping::new().with_int("x", 1)))
        .with_artefact("point", "Geo.Point", Mapping::new().with_double("lat", 1.5).with_double("lon", 2.5))
        .build()
}

#[test]
fn test_round_trip_every_shape() {
    let value = sample_record();
    let json = marshal(&value).unwrap();
    assert_eq!(unmarshal(&json).unwrap(), value);
}

#[test]
fn test_round_trip_through_text() {
    let value = sample_record();
    let text = serde_json::to_string(&marshal(&value).unwrap()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    let decoded = unmarshal(&parsed).unwrap();
    assert_eq!(decoded, value);

    // Insertion order survives at every level
    assert_same_order(&decoded, &value);
}

#[test]
fn test_nested_order_survives() {
    let inner = Mapping::new().with_int("z", 1).with_int("a", 2).with_int("m", 3);
    let value = Mapping::new()
        .with_mapping("nested", inner.clone())
        .with_artefact("thing", "T", inner.clone())
        .with_sequence(
            "items",
            vec![
                Value::Mapping(inner.clone()),
                Value::artefact("U", inner.clone()),
            ],
        )
        .build();
    let text = serde_json::to_string(&marshal(&value).unwrap()).unwrap();
    let decoded = unmarshal(&serde_json::from_str(&text).unwrap()).unwrap();
    assert_same_order(&decoded, &value);

    let names: Vec<&String> = decoded.get("thing").unwrap().as_artefact().unwrap().content.names().collect();
    assert_eq!(names, ["z", "a", "m"]);

    let tagged = unmarshal_tagged(&marshal_tagged(&value).unwrap()).unwrap();
    assert_same_order(&tagged, &value);
}

#[test]
fn test_root_artefact_round_trip() {
    let value = Value::artefact(
        "Shop.Order",
        Mapping::new()
            .with_identifier("id", Identifier::new_random())
            .with_sequence("lines", vec![Value::artefact("Shop.Line", Mapping::new().with_int("qty", 2))]),
    );
    let json = marshal(&value).unwrap();
    assert_eq!(json["$type"], "Shop.Order");
    assert_eq!(unmarshal(&json).unwrap(), value);
}

#[test]
fn test_tag_fidelity() {
    let double = Value::double(3.0);
    assert_eq!(double.as_int().unwrap_err().kind(), ErrorKind::ShapeMismatch);
    assert_eq!(Value::int(3).as_double().unwrap_err().kind(), ErrorKind::ShapeMismatch);

    // The distinction survives the substrate
    let value = Mapping::new().with_double("d", 3.0).with_int("i", 3).build();
    let decoded = unmarshal(&marshal(&value).unwrap()).unwrap();
    assert!(decoded.get("d").unwrap().is_double());
    assert!(decoded.get("i").unwrap().is_int());
}

#[test]
fn test_mapping_overwrite_position() {
    let value = Value::empty_mapping()
        .with("a", 1)
        .and_then(|v| v.with("b", 2))
        .and_then(|v| v.with("a", 3))
        .unwrap();
    let json = marshal(&value).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["a:i", "b:i"]);
    assert_eq!(json["a:i"], 3);
}

#[test]
fn test_artefact_collision() {
    let content = Mapping::new().with_string("$type", "shadow");
    assert_eq!(
        Artefact::try_new("T", content.clone(), tagged_value::TYPE_KEY).unwrap_err().kind(),
        ErrorKind::ReservedKeyCollision
    );
    assert_eq!(
        marshal(&Value::artefact("T", content)).unwrap_err().kind(),
        ErrorKind::ReservedKeyCollision
    );
}

#[test]
fn test_array_and_sequence_keep_their_tags() {
    let array = Value::string_array(["x", "y"]);
    let sequence = Value::sequence(vec![Value::string("x"), Value::string("y")]);
    let value = Mapping::new().with("array", array.clone()).with("sequence", sequence.clone()).build();

    let json = marshal(&value).unwrap();
    assert_ne!(json["array:s[]"], json["sequence:q"]);

    let decoded = unmarshal(&json).unwrap();
    assert_eq!(decoded.get("array"), Some(&array));
    assert_eq!(decoded.get("sequence"), Some(&sequence));
    assert_eq!(decoded.get("array").unwrap().tag(), Tag::StringArray);
    assert_eq!(decoded.get("sequence").unwrap().tag(), Tag::Sequence);
}

#[test]
fn test_malformed_key_rejected_without_partial_result() {
    let json = json!({
        "ok:i": 1,
        "also_ok:m": { "x:s": "y" },
        "broken": true,
    });
    let result = unmarshal(&json);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedKey);
}

#[test]
fn test_nested_malformed_key_rejected() {
    let json = json!({ "outer:q": [{ ":m": { "inner:x": 1 } }] });
    assert_eq!(unmarshal(&json).unwrap_err().kind(), ErrorKind::MalformedKey);
}

#[test]
fn test_top_level_scalars() {
    let scalars = [
        Value::int(7),
        Value::double(7.0),
        Value::string("7"),
        Value::timestamp(Timestamp::UNIX_EPOCH),
        Value::identifier(Identifier::empty()),
        Value::Null,
    ];
    for value in scalars {
        let bare = marshal(&value).unwrap();
        assert!(matches!(unmarshal(&bare), Err(DecodeError::UntaggedRoot { .. })));
        assert_eq!(unmarshal_as(&bare, value.tag()).unwrap(), value);

        let tagged = marshal_tagged(&value).unwrap();
        assert_eq!(unmarshal_tagged(&tagged).unwrap(), value);
    }

    // A bare array reads as a sequence, so its elements must be wrappers
    let array = Value::int_array(vec![7]);
    let bare = marshal(&array).unwrap();
    assert_eq!(unmarshal(&bare).unwrap_err().kind(), ErrorKind::UnexpectedShape);
    assert_eq!(unmarshal_as(&bare, Tag::IntArray).unwrap(), array);
    assert_eq!(unmarshal_tagged(&marshal_tagged(&array).unwrap()).unwrap(), array);
}

#[test]
fn test_non_finite_doubles_round_trip() {
    let value = Mapping::new()
        .with_double("inf", f64::INFINITY)
        .with_double("neg", f64::NEG_INFINITY)
        .with_double_array("nan", vec![f64::NAN])
        .build();
    let decoded = unmarshal(&marshal(&value).unwrap()).unwrap();
    assert_eq!(decoded.get("inf").unwrap().as_double().unwrap(), f64::INFINITY);
    assert_eq!(decoded.get("neg").unwrap().as_double().unwrap(), f64::NEG_INFINITY);
    assert!(decoded.get("nan").unwrap().as_double_array().unwrap()[0].is_nan());
}

#[test]
fn test_timestamp_precision() {
    let ts = Timestamp::from_epoch_micros(1_710_513_000_123_456).unwrap();
    let value = Mapping::new().with_timestamp("t", ts).build();
    let json = marshal(&value).unwrap();
    assert_eq!(json["t:t"], "2024-03-15T14:30:00.123456Z");
    assert_eq!(unmarshal(&json).unwrap().get("t").unwrap().as_timestamp().unwrap(), ts);

    // Offsets normalize to UTC
    let offset = json!({ "t:t": "2024-03-15T16:30:00.123456+02:00" });
    assert_eq!(unmarshal(&offset).unwrap().get("t").unwrap().as_timestamp().unwrap(), ts);

    // Nanoseconds are not representable
    let nanos = json!({ "t:t": "2024-03-15T14:30:00.123456789Z" });
    assert_eq!(unmarshal(&nanos).unwrap_err().kind(), ErrorKind::Format);
}

#[test]
fn test_identifier_text_must_be_canonical() {
    for text in [
        "550E8400-E29B-41D4-A716-446655440000",
        "550e8400e29b41d4a716446655440000",
        "{550e8400-e29b-41d4-a716-446655440000}",
        "urn:uuid:550e8400-e29b-41d4-a716-446655440000",
    ] {
        let json = json!({ "id:g": text });
        assert_eq!(unmarshal(&json).unwrap_err().kind(), ErrorKind::Format, "{}", text);
    }
}

#[test]
fn test_custom_type_key_both_directions() {
    let options = CodecOptions::new().with_type_key("@kind").unwrap();
    let value = Value::artefact("T", Mapping::new().with_int("n", 1));
    let json = marshal_with_options(&value, &options).unwrap();
    assert_eq!(json, json!({ "@kind": "T", "n:i": 1 }));
    assert_eq!(unmarshal_with_options(&json, &options).unwrap(), value);

    // Under the default key the same object is a malformed mapping
    assert_eq!(unmarshal(&json).unwrap_err().kind(), ErrorKind::MalformedKey);
}

#[test]
fn test_depth_limit_in_all_directions() {
    let value = nested(MAX_DEPTH + 1, |v| Value::sequence(vec![v]));
    assert_eq!(marshal(&value).unwrap_err().kind(), ErrorKind::Structure);
    assert_eq!(deserialize(&value).unwrap_err().kind(), ErrorKind::Structure);

    let deep = CodecOptions::new().with_max_depth(MAX_DEPTH + 1);
    let json = marshal_with_options(&value, &deep).unwrap();
    assert_eq!(unmarshal(&json).unwrap_err().kind(), ErrorKind::Structure);
    assert_eq!(unmarshal_with_options(&json, &deep).unwrap(), value);
}

fn nested(levels: usize, wrap: impl Fn(Value) -> Value) -> Value {
    let mut value = Value::int(0);
    for _ in 0..levels {
        value = wrap(value);
    }
    value
}

// Runs on the default test thread, so the ceiling must fit in its stack
#[test]
fn test_depth_ceiling_completes_in_all_directions() {
    let options = CodecOptions::new().with_max_depth(usize::MAX);
    assert_eq!(options.max_depth(), MAX_DEPTH_CEILING);

    let shapes: [fn(Value) -> Value; 3] = [
        |v| Value::sequence(vec![v]),
        |v| Mapping::new().with("child", v).build(),
        |v| Value::artefact("T", Mapping::new().with("child", v)),
    ];
    for wrap in shapes {
        let value = nested(MAX_DEPTH_CEILING, wrap);
        let json = marshal_with_options(&value, &options).unwrap();
        let tag = value.tag();
        assert_eq!(unmarshal_with_options(&json, &options).unwrap(), value, "{}", tag);

        let tagged = marshal_tagged_with_options(&value, &options).unwrap();
        assert_eq!(unmarshal_tagged_with_options(&tagged, &options).unwrap(), value, "{}", tag);
        assert!(deserialize_with_options(&value, &options).unwrap().into_json().is_ok());

        // One level more fails in every direction
        let deeper = wrap(value);
        assert_eq!(marshal_with_options(&deeper, &options).unwrap_err().kind(), ErrorKind::Structure);
        assert_eq!(deserialize_with_options(&deeper, &options).unwrap_err().kind(), ErrorKind::Structure);
        let deeper_json = match tag {
            Tag::Sequence => json!([{ ":q": json }]),
            Tag::Mapping => json!({ "child:m": json }),
            _ => json!({ "$type": "T", "child:a": json }),
        };
        assert_eq!(unmarshal_with_options(&deeper_json, &options).unwrap_err().kind(), ErrorKind::Structure);
    }
}

#[test]
fn test_deserialize_strips_tags() {
    let plain = deserialize(&sample_record()).unwrap();
    let map = plain.as_map().unwrap();
    assert_eq!(map["count"], Plain::Int(i32::MIN));
    assert_eq!(map["tags"], Plain::List(vec![Plain::String("a".into()), Plain::String("b".into())]));
    assert_eq!(map["point"].as_map().unwrap()["$type"], Plain::String("Geo.Point".into()));
}
