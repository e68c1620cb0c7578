use avrolite::prelude::*;
use avrolite::{decode, decode_with, encode, encode_to_vec, encoded_size, DecodeLimits, Error, Schema, Value};
use proptest::prelude::*;
use serde_json::json;

fn account_schema() -> Schema {
    Schema::parse_str(
        r#"{
            "type": "record",
            "name": "Account",
            "fields": [
                {"name": "id", "type": "long"},
                {"name": "owner", "type": "string"},
                {"name": "active", "type": "boolean"},
                {"name": "balance", "type": "double"},
                {"name": "ratio", "type": "float"},
                {"name": "kind", "type": {"type": "enum", "name": "Kind", "symbols": ["PERSONAL", "BUSINESS"]}},
                {"name": "key", "type": {"type": "fixed", "name": "Key", "size": 4}},
                {"name": "blob", "type": "bytes"},
                {"name": "tags", "type": {"type": "array", "items": "string"}},
                {"name": "limits", "type": {"type": "map", "values": "int"}},
                {"name": "parent", "type": ["null", "long"]}
            ]
        }"#,
    )
    .unwrap()
}

fn sample_account() -> Value {
    Value::from_literal(
        &account_schema(),
        &json!({
            "id": 981234,
            "owner": "Grace",
            "active": true,
            "balance": -12.5,
            "ratio": 0.25,
            "kind": "BUSINESS",
            "key": "\u{0001}\u{0002}\u{00fe}\u{00ff}",
            "blob": [0, 1, 2],
            "tags": ["a", "bb"],
            "limits": {"daily": 500, "monthly": -1},
            "parent": {"long": 7}
        }),
    )
    .unwrap()
}

/// Encoding then decoding a value reproduces an equal value.
#[test]
fn test_round_trip_all_types() {
    let original = sample_account();
    let bytes = encode_to_vec(&original).unwrap();
    assert_eq!(bytes.len(), encoded_size(&original).unwrap());

    let mut decoded = Value::new(&account_schema());
    assert_eq!(decode(&bytes, &mut decoded).unwrap(), bytes.len());
    assert_eq!(decoded, original);
    assert_eq!(decoded.hash(), original.hash());
    assert_eq!(decoded.to_json(), original.to_json());
}

/// The record example from the Avro specification.
#[test]
fn test_known_encoding() {
    let schema = Schema::parse_str(
        r#"{"type": "record", "name": "test", "fields": [
            {"name": "a", "type": "long"},
            {"name": "b", "type": "string"}
        ]}"#,
    )
    .unwrap();
    let v = Value::from_literal(&schema, &json!({"a": 27, "b": "foo"})).unwrap();
    assert_eq!(encode_to_vec(&v).unwrap(), vec![0x36, 0x06, 0x66, 0x6f, 0x6f]);
}

/// Decoders must accept blocks with a negative count and a byte size.
#[test]
fn test_decode_negative_block_count() {
    let schema = Schema::parse_str(r#"{"type": "array", "items": "long"}"#).unwrap();
    let mut v = Value::new(&schema);
    // -2 items in 2 bytes, then 1 more item, then the terminator
    let input = [0x03, 0x04, 0x02, 0x04, 0x02, 0x06, 0x00];
    assert_eq!(decode(&input, &mut v).unwrap(), input.len());
    assert_eq!(v.to_json(), json!([1, 2, 3]));
}

#[test]
fn test_truncated_input() {
    let bytes = encode_to_vec(&sample_account()).unwrap();
    let mut v = Value::new(&account_schema());
    for cut in [0, 1, bytes.len() / 2, bytes.len() - 1] {
        let err = decode(&bytes[..cut], &mut v).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }), "cut at {}: {:?}", cut, err);
    }
}

#[test]
fn test_bad_union_discriminant() {
    let schema = Schema::parse_str(r#"["null", "int"]"#).unwrap();
    let mut v = Value::new(&schema);
    assert!(matches!(decode(&[0x04], &mut v), Err(Error::InvalidEncoding(_))));
    assert!(matches!(decode(&[0x01], &mut v), Err(Error::InvalidEncoding(_))));
}

#[test]
fn test_hostile_lengths_hit_limits() {
    let schema = Schema::parse_str(r#"{"type": "array", "items": "null"}"#).unwrap();
    let mut v = Value::new(&schema);
    // a billion nulls encode to a handful of bytes
    let mut input = avrolite::codec::varint::encode_varint(2_000_000_000);
    input.push(0x00);
    let limits = DecodeLimits::default().with_max_block_items(1000);
    assert!(matches!(
        decode_with(&input, &mut v, &limits),
        Err(Error::InvalidEncoding(_))
    ));

    let mut s = Value::new(&Schema::string());
    let limits = DecodeLimits::default().with_max_bytes_len(2);
    assert!(matches!(
        decode_with(&[0x06, b'a', b'b', b'c'], &mut s, &limits),
        Err(Error::InvalidEncoding(_))
    ));
}

#[test]
fn test_empty_union_cannot_be_encoded() {
    let v = Value::new(&account_schema());
    assert!(matches!(encode_to_vec(&v), Err(Error::EmptyUnion)));
    let mut buf = [0u8; 64];
    assert!(matches!(encode(&v, &mut buf), Err(Error::EmptyUnion)));
}

#[test]
fn test_decode_replaces_previous_content() {
    let schema = Schema::parse_str(r#"{"type": "map", "values": "int"}"#).unwrap();
    let mut v = Value::from_literal(&schema, &json!({"old": 1})).unwrap();
    decode(&[0x02, 0x02, b'n', 0x04, 0x00], &mut v).unwrap();
    assert_eq!(v.to_json(), json!({"n": 2}));
}

fn arb_entries() -> impl Strategy<Value = Vec<(String, i64, Vec<u8>)>> {
    prop::collection::vec((".{0,12}", any::<i64>(), prop::collection::vec(any::<u8>(), 0..16)), 0..12)
}

proptest! {
    #[test]
    fn prop_round_trip_records(entries in arb_entries(), flag in any::<bool>(), x in any::<f64>()) {
        let schema = Schema::parse_str(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "flag", "type": "boolean"},
                {"name": "x", "type": "double"},
                {"name": "rows", "type": {"type": "array", "items": {
                    "type": "record", "name": "Row", "fields": [
                        {"name": "label", "type": "string"},
                        {"name": "n", "type": "long"},
                        {"name": "data", "type": ["null", "bytes"]}
                    ]}}}
            ]}"#,
        ).unwrap();

        let mut v = Value::new(&schema);
        v.get_by_name_mut("flag").unwrap().0.set_boolean(flag).unwrap();
        v.get_by_name_mut("x").unwrap().0.set_double(x).unwrap();
        {
            let (mut rows, _) = v.get_by_name_mut("rows").unwrap();
            for (label, n, data) in &entries {
                let mut row = rows.append().unwrap();
                row.get_by_name_mut("label").unwrap().0.set_string(label).unwrap();
                row.get_by_name_mut("n").unwrap().0.set_long(*n).unwrap();
                let (mut slot, _) = row.get_by_name_mut("data").unwrap();
                if data.is_empty() {
                    slot.set_branch("null").unwrap();
                } else {
                    slot.set_branch("bytes").unwrap().set_bytes(data).unwrap();
                }
            }
        }

        let bytes = encode_to_vec(&v).unwrap();
        prop_assert_eq!(bytes.len(), encoded_size(&v).unwrap());
        let mut back = Value::new(&schema);
        prop_assert_eq!(decode(&bytes, &mut back).unwrap(), bytes.len());
        prop_assert!(back.equal(&v));
        prop_assert_eq!(back.hash(), v.hash());
    }

    #[test]
    fn prop_decode_never_panics(input in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut v = Value::new(&account_schema());
        let _ = decode(&input, &mut v);
    }
}
