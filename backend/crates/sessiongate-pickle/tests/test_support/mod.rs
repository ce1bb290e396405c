//! Minimal pickle writer and value strategies for property tests.
//!
//! The writer emits the same opcode choices the reference serializer makes
//! for plain data at protocols 2 and 4, without memoization.

use num_bigint::BigInt;
use proptest::prelude::*;
use sessiongate_pickle::DecodedValue;

/// Serialize `value` and terminate the stream with `STOP`.
pub fn encode(value: &DecodedValue, protocol: u8) -> Vec<u8> {
    let mut out = encode_body(value, protocol);
    out.push(b'.');
    out
}

/// Serialize `value` without the trailing `STOP`.
pub fn encode_body(value: &DecodedValue, protocol: u8) -> Vec<u8> {
    let mut out = vec![0x80, protocol];
    write_value(&mut out, value, protocol);
    out
}

fn write_value(out: &mut Vec<u8>, value: &DecodedValue, protocol: u8) {
    match value {
        DecodedValue::None => out.push(b'N'),
        DecodedValue::Bool(true) => out.push(0x88),
        DecodedValue::Bool(false) => out.push(0x89),
        DecodedValue::Integer(v) => write_int(out, v),
        DecodedValue::Float(v) => {
            out.push(b'G');
            out.extend_from_slice(&v.to_be_bytes());
        },
        DecodedValue::Text(s) => {
            if protocol >= 4 && s.len() < 256 {
                out.push(0x8c);
                out.push(s.len() as u8);
            } else {
                out.push(b'X');
                out.extend_from_slice(&(s.len() as u32).to_le_bytes());
            }
            out.extend_from_slice(s.as_bytes());
        },
        DecodedValue::Bytes(b) => {
            if b.len() < 256 {
                out.push(b'C');
                out.push(b.len() as u8);
            } else {
                out.push(b'B');
                out.extend_from_slice(&(b.len() as u32).to_le_bytes());
            }
            out.extend_from_slice(b);
        },
        DecodedValue::Sequence(items) => {
            out.push(b']');
            if !items.is_empty() {
                out.push(b'(');
                for item in items {
                    write_value(out, item, protocol);
                }
                out.push(b'e');
            }
        },
        DecodedValue::Mapping(entries) => {
            out.push(b'}');
            if !entries.is_empty() {
                out.push(b'(');
                for (key, value) in entries {
                    write_value(out, key, protocol);
                    write_value(out, value, protocol);
                }
                out.push(b'u');
            }
        },
    }
}

fn write_int(out: &mut Vec<u8>, value: &BigInt) {
    match i32::try_from(value) {
        Ok(v) if (0..=0xff).contains(&v) => {
            out.push(b'K');
            out.push(v as u8);
        },
        Ok(v) if (0..=0xffff).contains(&v) => {
            out.push(b'M');
            out.extend_from_slice(&(v as u16).to_le_bytes());
        },
        Ok(v) => {
            out.push(b'J');
            out.extend_from_slice(&v.to_le_bytes());
        },
        Err(_) => {
            let body = value.to_signed_bytes_le();
            out.push(0x8a);
            out.push(body.len() as u8);
            out.extend_from_slice(&body);
        },
    }
}

fn leaf() -> impl Strategy<Value = DecodedValue> {
    prop_oneof![
        Just(DecodedValue::None),
        any::<bool>().prop_map(DecodedValue::Bool),
        any::<i64>().prop_map(DecodedValue::from),
        any::<i128>().prop_map(|v| DecodedValue::Integer(BigInt::from(v))),
        (-1.0e12f64..1.0e12).prop_map(DecodedValue::Float),
        "\\PC{0,24}".prop_map(DecodedValue::Text),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(DecodedValue::Bytes),
    ]
}

/// Arbitrary plain-data trees. Mapping keys are distinct text, which is
/// what session records carry.
pub fn value_tree() -> impl Strategy<Value = DecodedValue> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(DecodedValue::Sequence),
            proptest::collection::btree_map("[a-z_]{1,12}", inner, 0..6).prop_map(|entries| {
                DecodedValue::Mapping(
                    entries
                        .into_iter()
                        .map(|(k, v)| (DecodedValue::Text(k), v))
                        .collect(),
                )
            }),
        ]
    })
}
