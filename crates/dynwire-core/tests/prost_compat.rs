//! Cross-checks the wire bytes against prost's generated codecs.

mod common;

use dynwire_core::{unmarshal, FieldMap, FieldValue, ScalarType, Value};
use pretty_assertions::assert_eq;
use prost::Message;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, Duration, FieldDescriptorProto, Timestamp};

#[test]
fn decodes_prost_encoded_duration() {
    common::init_tracing();

    let duration = Duration {
        seconds: -5,
        nanos: -700,
    };
    let m = unmarshal(&duration.encode_to_vec()).unwrap();

    assert_eq!(m.decode_int64(1), Some(-5));
    assert_eq!(m.decode_int32(2), Some(-700));
}

#[test]
fn prost_decodes_our_timestamp() {
    common::init_tracing();

    let mut fm = FieldMap::new();
    fm.add(1, ScalarType::Int64);
    fm.add(2, ScalarType::Int32);

    let bytes = fm
        .encode_buffer(&[
            FieldValue::new(1, 1_700_000_000i64),
            FieldValue::new(2, 123_456_789i32),
        ])
        .unwrap();

    let expected = Timestamp {
        seconds: 1_700_000_000,
        nanos: 123_456_789,
    };
    assert_eq!(bytes, expected.encode_to_vec());
    assert_eq!(Timestamp::decode(bytes.as_slice()).unwrap(), expected);
}

#[test]
fn decodes_nested_prost_message() {
    common::init_tracing();

    let descriptor = DescriptorProto {
        name: Some("Reading".to_string()),
        field: vec![FieldDescriptorProto {
            name: Some("celsius".to_string()),
            number: Some(3),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Float as i32),
            ..Default::default()
        }],
        ..Default::default()
    };

    // DescriptorProto: 1 = name (string), 2 = field (message)
    let mut outer = FieldMap::new();
    outer.add(1, ScalarType::String);
    outer.add(2, ScalarType::Message);

    let decoded = outer
        .decode_buffer(&descriptor.encode_to_vec())
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(decoded[0].value, Value::String("Reading".to_string()));

    let Value::Message(field) = &decoded[1].value else {
        panic!("field 2 did not decode as a message");
    };

    // FieldDescriptorProto: 1 = name, 3 = number, 4 = label, 5 = type
    let mut inner = FieldMap::new();
    inner.add(1, ScalarType::String);
    inner.add(3, ScalarType::Int32);
    inner.add(4, ScalarType::Enum);
    inner.add(5, ScalarType::Enum);

    let values = inner.decode_message(field).into_result().unwrap();
    assert_eq!(
        values,
        vec![
            FieldValue::new(1, "celsius"),
            FieldValue::new(3, 3i32),
            FieldValue::new(4, Label::Optional as u64),
            FieldValue::new(5, Type::Float as u64),
        ]
    );
}

#[test]
fn field_map_from_prost_descriptor() {
    common::init_tracing();

    let descriptor = DescriptorProto {
        name: Some("Duration".to_string()),
        field: vec![
            FieldDescriptorProto {
                name: Some("seconds".to_string()),
                number: Some(1),
                r#type: Some(Type::Int64 as i32),
                ..Default::default()
            },
            FieldDescriptorProto {
                name: Some("nanos".to_string()),
                number: Some(2),
                r#type: Some(Type::Int32 as i32),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    let fm = FieldMap::from_descriptor_bytes(&descriptor.encode_to_vec()).unwrap();
    let bytes = Duration {
        seconds: 42,
        nanos: 7,
    }
    .encode_to_vec();

    let values = fm.decode_buffer(&bytes).unwrap().into_result().unwrap();
    assert_eq!(
        values,
        vec![FieldValue::new(1, 42i64), FieldValue::new(2, 7i32)]
    );
}
