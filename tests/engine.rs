use std::thread;

use artnet::codec::{
    self, Config, Endianness, Error, Field, FieldValue, Primitive, Remapper, Session, Value,
    WireEnum, describe,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Default, PartialEq)]
struct Sample {
    id: u32,
    offset: i16,
    gain: f64,
    label: String,
    tag: String,
    revision: u16,
}

artnet::wire_schema! {
    Sample {
        id: Field::u32(),
        offset: Field::i16(),
        gain: Field::f64(),
        label: Field::fixed_string(12),
        tag: Field::terminated_string(),
        revision: Field::u16().since(2.0),
    }
}

#[derive(Debug, Default, PartialEq)]
struct Counted {
    count: u8,
    items: Vec<u8>,
}

artnet::wire_schema! {
    Counted {
        count: Field::u8(),
        items: Field::bytes_by("count"),
    }
}

#[derive(Debug, Default, PartialEq)]
struct Gated {
    head: u8,
    middle: u8,
    tail: u8,
}

artnet::wire_schema! {
    Gated {
        head: Field::u8(),
        middle: Field::u8().between(2.0, 3.0),
        tail: Field::u8(),
    }
}

#[derive(Debug, Default, PartialEq)]
struct Named {
    name: String,
}

artnet::wire_schema! {
    Named {
        name: Field::fixed_string(4),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Level(u8);

impl FieldValue for Level {
    fn to_value(&self) -> Value {
        Value::U8(self.0)
    }

    fn from_value(value: Value) -> codec::Result<Self> {
        u8::from_value(value).map(Level)
    }
}

impl WireEnum for Level {
    const REPR: Primitive = Primitive::F32;
}

#[derive(Debug, Default, PartialEq)]
struct BadEnum {
    level: Level,
}

artnet::wire_schema! {
    BadEnum {
        level: Field::enumeration::<Level>(),
    }
}

#[derive(Debug, Default, PartialEq)]
struct Reading {
    sensor: u8,
    value: u32,
}

artnet::wire_schema! {
    Reading {
        sensor: Field::u8(),
        value: Field::u32(),
    }
}

#[derive(Debug, Default, PartialEq)]
struct CompactReading {
    value: u16,
}

artnet::wire_schema! {
    CompactReading {
        value: Field::u16(),
    }
}

#[derive(Debug, Default, PartialEq)]
struct Envelope {
    kind: u8,
    reading: Reading,
}

artnet::wire_schema! {
    Envelope {
        kind: Field::u8(),
        reading: Field::object::<Reading>(),
    }
}

#[derive(Debug, Default, PartialEq)]
struct Overridden {
    small: u32,
    reading: Reading,
    count: u8,
    readings: Vec<Reading>,
}

artnet::wire_schema! {
    Overridden {
        small: Field::u32().wire_as(Primitive::U8),
        reading: Field::object::<Reading>().stand_in::<CompactReading>(),
        count: Field::u8(),
        readings: Field::object_array_by::<Reading>("count"),
    }
}

#[test]
fn integer_byte_order_follows_endianness() {
    let little = codec::encode(&0x0102_0304u32, &Config::default()).unwrap();
    assert_eq!(little, [0x04, 0x03, 0x02, 0x01]);

    let big = Config::default().with_endianness(Endianness::Big);
    assert_eq!(codec::encode(&0x0102_0304u32, &big).unwrap(), [1, 2, 3, 4]);
    assert_eq!(codec::decode::<u32>(&[1, 2, 3, 4], 0, &big).unwrap(), 0x0102_0304);
}

#[test]
fn terminated_string_round_trip() {
    let bytes = codec::encode(&String::from("Hi"), &Config::default()).unwrap();
    assert_eq!(bytes, [0x48, 0x69, 0x00]);
    assert_eq!(codec::decode::<String>(&bytes, 0, &Config::default()).unwrap(), "Hi");
}

#[test]
fn fixed_string_overflow_is_invalid_configuration() {
    let named = Named {
        name: "too long".into(),
    };
    let err = codec::encode(&named, &Config::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { ref field, .. } if field == "name"));
}

#[test]
fn fixed_string_is_padded_and_trimmed() {
    let named = Named { name: "ab".into() };
    let bytes = codec::encode(&named, &Config::default()).unwrap();
    assert_eq!(bytes, [b'a', b'b', 0, 0]);
    assert_eq!(codec::decode::<Named>(&bytes, 0, &Config::default()).unwrap(), named);
}

#[test]
fn length_referenced_array_follows_sibling() {
    let counted = Counted {
        count: 3,
        items: vec![1, 2, 3, 4, 5],
    };
    let bytes = codec::encode(&counted, &Config::default()).unwrap();
    assert_eq!(bytes, [3, 1, 2, 3]);

    let decoded: Counted = codec::decode(&bytes, 0, &Config::default()).unwrap();
    assert_eq!(decoded.items, [1, 2, 3]);
}

#[test]
fn short_array_is_backfilled() {
    let counted = Counted {
        count: 3,
        items: vec![9],
    };
    let bytes = codec::encode(&counted, &Config::default()).unwrap();
    assert_eq!(bytes, [3, 9, 0, 0]);
}

#[test]
fn version_gate_between_bounds() {
    let gated = Gated {
        head: 1,
        middle: 2,
        tail: 3,
    };
    let old = Config::default().with_version(1.5);
    let current = Config::default().with_version(2.5);

    assert_eq!(codec::encode(&gated, &old).unwrap(), [1, 3]);
    assert_eq!(codec::encode(&gated, &current).unwrap(), [1, 2, 3]);

    let decoded: Gated = codec::decode(&[1, 3], 0, &old).unwrap();
    assert_eq!(decoded, Gated { head: 1, middle: 0, tail: 3 });
}

#[test]
fn decode_honors_offset() {
    let decoded: Counted = codec::decode(&[0xAA, 0xBB, 2, 7, 8], 2, &Config::default()).unwrap();
    assert_eq!(decoded.items, [7, 8]);
}

#[test]
fn truncated_buffer_is_out_of_range() {
    let err = codec::decode::<Counted>(&[4, 1, 2], 0, &Config::default()).unwrap_err();
    assert!(matches!(err, Error::OutOfRange { .. }));

    let err = codec::decode::<u8>(&[1], 2, &Config::default()).unwrap_err();
    assert!(matches!(err, Error::OutOfRange { .. }));
}

#[test]
fn non_integer_enum_repr_is_unsupported() {
    let err = codec::encode(&BadEnum::default(), &Config::default()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)));
}

#[test]
fn describe_is_idempotent_across_threads() {
    let addresses: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| std::ptr::from_ref(describe::<Sample>()) as usize))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(describe::<Sample>().fields().len(), 6);
}

#[test]
fn primitive_remap_changes_wire_width() {
    let remap = Remapper::new().with_primitive(Primitive::U32, Primitive::U16);
    let config = Config::default().with_remapper(remap);
    let reading = Reading {
        sensor: 4,
        value: 0x0102,
    };
    let bytes = codec::encode(&reading, &config).unwrap();
    assert_eq!(bytes, [4, 0x02, 0x01]);
    assert_eq!(codec::decode::<Reading>(&bytes, 0, &config).unwrap(), reading);

    let overflow = Reading {
        sensor: 4,
        value: 0x1_0000,
    };
    assert!(matches!(
        codec::encode(&overflow, &config),
        Err(Error::IncompatibleMapping { .. })
    ));
}

#[test]
fn object_remap_copies_by_name() {
    let remap = Remapper::new().with_object::<Reading, CompactReading>();
    let config = Config::default().with_remapper(remap);
    let envelope = Envelope {
        kind: 1,
        reading: Reading {
            sensor: 9,
            value: 0x0304,
        },
    };
    let bytes = codec::encode(&envelope, &config).unwrap();
    assert_eq!(bytes, [1, 0x04, 0x03]);

    let decoded: Envelope = codec::decode(&bytes, 0, &config).unwrap();
    assert_eq!(decoded.reading.value, 0x0304);
    assert_eq!(decoded.reading.sensor, 0);
}

#[test]
fn mutual_object_mapping_is_reported() {
    let remap = Remapper::new()
        .with_object::<Reading, CompactReading>()
        .with_object::<CompactReading, Reading>();
    let config = Config::default().with_remapper(remap);
    let reading = Reading {
        sensor: 1,
        value: 2,
    };

    let err = codec::encode(&reading, &config).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { ref field, .. } if field == "Reading"));

    let err = codec::decode::<Reading>(&[0; 16], 0, &config).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { .. }));
}

#[test]
fn field_overrides_change_wire_layout() {
    let value = Overridden {
        small: 7,
        reading: Reading {
            sensor: 3,
            value: 0x0102,
        },
        count: 2,
        readings: Vec::new(),
    };
    let bytes = codec::encode(&value, &Config::default()).unwrap();
    assert_eq!(bytes, [7, 0x02, 0x01, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    let decoded: Overridden = codec::decode(&bytes, 0, &Config::default()).unwrap();
    assert_eq!(decoded.small, 7);
    assert_eq!(decoded.reading, Reading { sensor: 0, value: 0x0102 });
    assert_eq!(decoded.readings, [Reading::default(), Reading::default()]);
}

#[test]
fn narrowed_field_overflow_is_incompatible() {
    let value = Overridden {
        small: 0x100,
        ..Overridden::default()
    };
    assert!(matches!(
        codec::encode(&value, &Config::default()),
        Err(Error::IncompatibleMapping { .. })
    ));
}

#[test]
fn session_reuses_buffer() {
    let mut writer = Session::writer(Config::default());
    writer.encode(&7u8).unwrap();
    writer.encode(&String::from("ok")).unwrap();
    writer.encode(&0x0506u16).unwrap();
    let bytes = writer.into_bytes();
    assert_eq!(bytes, [7, b'o', b'k', 0, 0x06, 0x05]);

    let mut reader = Session::reader(bytes, Config::default());
    assert_eq!(reader.decode::<u8>().unwrap(), 7);
    assert_eq!(reader.decode::<String>().unwrap(), "ok");
    assert_eq!(reader.decode::<u16>().unwrap(), 0x0506);
    assert_eq!(reader.remaining(), 0);
    assert_eq!(reader.decode_at::<u8>(0).unwrap(), 7);
}

proptest! {
    #[test]
    fn schema_round_trip(
        id in any::<u32>(),
        offset in any::<i16>(),
        gain in -1.0e9f64..1.0e9,
        label in "[a-zA-Z0-9 ]{0,12}",
        tag in "[a-z]{0,32}",
        revision in 1u16..=u16::MAX,
        big in any::<bool>(),
        version in prop_oneof![Just(1.0), Just(2.0), Just(4.0), 0.0f64..5.0],
    ) {
        let sample = Sample { id, offset, gain, label, tag, revision };
        let endianness = if big { Endianness::Big } else { Endianness::Little };
        let config = Config::default()
            .with_endianness(endianness)
            .with_version(version);
        let bytes = codec::encode(&sample, &config).unwrap();
        let decoded = codec::decode::<Sample>(&bytes, 0, &config).unwrap();

        let mut expected = sample;
        if version < 2.0 {
            expected.revision = 0;
        }
        prop_assert_eq!(decoded, expected);
    }
}
