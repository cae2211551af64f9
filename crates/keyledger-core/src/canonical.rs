//! Canonical CBOR encoding of block headers.
//!
//! Header bytes are the input to a block's fingerprint, so the encoding must
//! be deterministic (RFC 8949 Core Deterministic Encoding):
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds)

use ciborium::value::Value;

use crate::block::BlockHeader;
use crate::types::Fingerprint;

/// Header field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const VERSION: u64 = 0;
    pub const SEQUENCE: u64 = 1;
    pub const TIMESTAMP: u64 = 2;
    pub const PREVIOUS_FINGERPRINT: u64 = 3;
    pub const NONCE: u64 = 4;
}

/// Encode a block header, as stored, to canonical CBOR bytes.
pub fn canonical_header_bytes(header: &BlockHeader) -> Vec<u8> {
    canonical_link_bytes(header, header.previous_fingerprint.as_ref())
}

/// Encode a block header with `previous` in place of the stored link.
///
/// Fingerprints are computed over the predecessor's actual fingerprint, not
/// the cached copy in the header.
pub fn canonical_link_bytes(header: &BlockHeader, previous: Option<&Fingerprint>) -> Vec<u8> {
    let value = header_to_cbor_value(header, previous);
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value);
    buf
}

/// Convert a header to a CBOR Value (map with integer keys).
fn header_to_cbor_value(header: &BlockHeader, previous: Option<&Fingerprint>) -> Value {
    let previous = match previous {
        Some(fp) => Value::Bytes(fp.0.to_vec()),
        None => Value::Null,
    };

    Value::Map(vec![
        (
            Value::Integer(keys::VERSION.into()),
            Value::Integer(header.version.into()),
        ),
        (
            Value::Integer(keys::SEQUENCE.into()),
            Value::Integer(header.sequence_number.into()),
        ),
        (
            Value::Integer(keys::TIMESTAMP.into()),
            Value::Integer(header.timestamp.into()),
        ),
        (Value::Integer(keys::PREVIOUS_FINGERPRINT.into()), previous),
        (
            Value::Integer(keys::NONCE.into()),
            Value::Bytes(header.nonce.0.to_vec()),
        ),
    ])
}

/// Recursively encode a CBOR value.
///
/// Only the shapes produced by `header_to_cbor_value` are supported.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Null => buf.push(0xf6),
        other => unreachable!("block headers never encode {:?}", other),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Nonce;

    fn header(sequence_number: u64, previous: Option<Fingerprint>) -> BlockHeader {
        BlockHeader {
            version: crate::block::BLOCK_VERSION,
            sequence_number,
            timestamp: 1_736_870_400_000,
            previous_fingerprint: previous,
            nonce: Nonce::from_bytes([7; 12]),
        }
    }

    #[test]
    fn test_canonical_header_deterministic() {
        let h = header(3, Some(Fingerprint::from_bytes([1; 32])));
        assert_eq!(canonical_header_bytes(&h), canonical_header_bytes(&h));
    }

    #[test]
    fn test_genesis_header_encodes_null_link() {
        let bytes = canonical_header_bytes(&header(0, None));
        // map(5), then key 0 → version 0, key 1 → seq 0
        assert_eq!(&bytes[..5], &[0xa5, 0x00, 0x00, 0x01, 0x00]);
        assert!(bytes.contains(&0xf6));
    }

    #[test]
    fn test_header_fields_change_encoding() {
        let base = canonical_header_bytes(&header(1, None));
        assert_ne!(base, canonical_header_bytes(&header(2, None)));
        assert_ne!(
            base,
            canonical_header_bytes(&header(1, Some(Fingerprint::from_bytes([0; 32]))))
        );
    }

    #[test]
    fn test_link_bytes_override_stored_link() {
        let h = header(2, Some(Fingerprint::from_bytes([1; 32])));
        let other = Fingerprint::from_bytes([2; 32]);
        assert_eq!(
            canonical_link_bytes(&h, Some(&other)),
            canonical_header_bytes(&header(2, Some(other)))
        );
    }

    #[test]
    fn test_integer_encoding() {
        let mut buf = Vec::new();
        encode_uint(&mut buf, 0, 0);
        assert_eq!(buf, vec![0x00]);

        buf.clear();
        encode_uint(&mut buf, 0, 23);
        assert_eq!(buf, vec![0x17]);

        buf.clear();
        encode_uint(&mut buf, 0, 24);
        assert_eq!(buf, vec![0x18, 24]);

        buf.clear();
        encode_uint(&mut buf, 0, 1000);
        assert_eq!(buf, vec![0x19, 0x03, 0xe8]);

        buf.clear();
        encode_integer(&mut buf, (-1i64).into());
        assert_eq!(buf, vec![0x20]);
    }
}
