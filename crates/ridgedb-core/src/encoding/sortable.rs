//! Sort-order preserving encoding for attribute values.
//!
//! Used for every value that lands in the key portion of a record: inlined
//! sort-key and signature fields, set-property values, and slice bounds.
//! Comparing the encoded bytes gives the same ordering as comparing the
//! values of one declared type. The payload is untagged; the reader must
//! know the [`DataType`].
//!
//! # Encoding Design
//!
//! ## Integer Encoding
//!
//! Integers (and dates, as epoch milliseconds) use a "sign-flip" encoding:
//! XOR with `0x8000_0000_0000_0000` then big-endian, so negative numbers
//! sort before positive numbers.
//!
//! ## Float Encoding
//!
//! - Positive floats: flip the sign bit
//! - Negative floats: flip all bits
//! - NaN is encoded as `u64::MAX` and sorts after everything else
//!
//! Geo points are two floats, latitude first.
//!
//! ## String and Bytes Encoding
//!
//! Null-escaped and double-null terminated (see
//! [`ByteWriter::put_escaped`]), which keeps `"a" < "aa" < "ab" < "b"`.
//!
//! # Example
//!
//! ```
//! use ridgedb_core::encoding::sortable::{decode_ordered, encode_ordered};
//! use ridgedb_core::types::{DataType, Value};
//!
//! let mut encoded: Vec<_> = [Value::Int(10), Value::Int(-10), Value::Int(0)]
//!     .iter()
//!     .map(encode_ordered)
//!     .collect();
//! encoded.sort();
//!
//! let decoded: Vec<_> =
//!     encoded.iter().map(|e| decode_ordered(e, DataType::Int).unwrap()).collect();
//! assert_eq!(decoded, vec![Value::Int(-10), Value::Int(0), Value::Int(10)]);
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cursor::{ByteReader, ByteWriter};
use crate::error::{CoreError, CoreResult};
use crate::types::{DataType, Value};

/// Constant for flipping the sign bit of signed integers.
const SIGN_FLIP_I64: u64 = 0x8000_0000_0000_0000;

pub(crate) fn sortable_i64(i: i64) -> u64 {
    (i as u64) ^ SIGN_FLIP_I64
}

pub(crate) fn unsortable_i64(encoded: u64) -> i64 {
    (encoded ^ SIGN_FLIP_I64) as i64
}

fn sortable_f64(f: f64) -> u64 {
    let bits = f.to_bits();
    if f.is_nan() {
        u64::MAX
    } else if bits & SIGN_FLIP_I64 == 0 {
        // Positive float (including +0): flip sign bit
        bits ^ SIGN_FLIP_I64
    } else {
        // Negative float (including -0): flip all bits
        !bits
    }
}

fn unsortable_f64(encoded: u64) -> f64 {
    let bits = if encoded == u64::MAX {
        f64::NAN.to_bits()
    } else if encoded & SIGN_FLIP_I64 != 0 {
        encoded ^ SIGN_FLIP_I64
    } else {
        !encoded
    };
    f64::from_bits(bits)
}

pub(crate) fn date_from_millis(millis: i64) -> CoreResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| CoreError::Encoding(format!("date out of range: {millis}ms")))
}

/// Append the ordered encoding of `value` to `w`.
///
/// The value's own variant selects the payload; callers check it against
/// the declared type first.
pub fn write_ordered(w: &mut ByteWriter, value: &Value) {
    match value {
        Value::Bool(b) => w.put_u8(u8::from(*b)),
        Value::Int(i) => w.put_u64(sortable_i64(*i)),
        Value::Float(f) => w.put_u64(sortable_f64(*f)),
        Value::String(s) => w.put_escaped(s.as_bytes()),
        Value::Date(d) => w.put_u64(sortable_i64(d.timestamp_millis())),
        Value::Uuid(u) => w.put_bytes(u.as_bytes()),
        Value::Geo { lat, lon } => {
            w.put_u64(sortable_f64(*lat));
            w.put_u64(sortable_f64(*lon));
        }
        Value::Bytes(b) => w.put_escaped(b),
    }
}

/// Read an ordered value of the given declared type.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] on malformed input and
/// [`CoreError::Invariant`] for [`DataType::Generic`], which has no
/// ordered form.
pub fn read_ordered(r: &mut ByteReader<'_>, data_type: DataType) -> CoreResult<Value> {
    Ok(match data_type {
        DataType::Bool => Value::Bool(r.get_u8()? != 0),
        DataType::Int => Value::Int(unsortable_i64(r.get_u64()?)),
        DataType::Float => Value::Float(unsortable_f64(r.get_u64()?)),
        DataType::String => Value::String(r.get_escaped_string()?),
        DataType::Date => Value::Date(date_from_millis(unsortable_i64(r.get_u64()?))?),
        DataType::Uuid => {
            let bytes: [u8; 16] = r
                .get_bytes(16)?
                .try_into()
                .map_err(|_| CoreError::Encoding("failed to read uuid bytes".into()))?;
            Value::Uuid(Uuid::from_bytes(bytes))
        }
        DataType::Geo => {
            let lat = unsortable_f64(r.get_u64()?);
            let lon = unsortable_f64(r.get_u64()?);
            Value::Geo { lat, lon }
        }
        DataType::Bytes => Value::Bytes(r.get_escaped()?),
        DataType::Generic => {
            return Err(CoreError::Invariant("generic values have no ordered encoding".into()))
        }
    })
}

/// Encode a single value into a fresh ordered buffer.
#[must_use]
pub fn encode_ordered(value: &Value) -> Vec<u8> {
    let mut w = ByteWriter::new();
    write_ordered(&mut w, value);
    w.into_bytes()
}

/// Decode a single ordered value that spans all of `bytes`.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] on malformed input or trailing bytes.
pub fn decode_ordered(bytes: &[u8], data_type: DataType) -> CoreResult<Value> {
    let mut r = ByteReader::new(bytes);
    let value = read_ordered(&mut r, data_type)?;
    if !r.is_empty() {
        return Err(CoreError::Encoding("trailing bytes after ordered value".into()));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn enc(v: impl Into<Value>) -> Vec<u8> {
        encode_ordered(&v.into())
    }

    #[test]
    fn int_ordering() {
        let values = [i64::MIN, -1000, -1, 0, 1, 1000, i64::MAX];
        for pair in values.windows(2) {
            assert!(enc(pair[0]) < enc(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn float_ordering() {
        let values = [f64::NEG_INFINITY, -1000.5, -0.001, 0.0, 0.001, 1000.5, f64::INFINITY];
        for pair in values.windows(2) {
            assert!(enc(pair[0]) < enc(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn nan_sorts_last() {
        assert!(enc(f64::NAN) > enc(f64::INFINITY));
        let decoded = decode_ordered(&enc(f64::NAN), DataType::Float).unwrap();
        assert!(matches!(decoded, Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn string_ordering() {
        let values = ["", "a", "aa", "ab", "b", "ba"];
        for pair in values.windows(2) {
            assert!(enc(pair[0]) < enc(pair[1]), "{:?} < {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn string_with_embedded_null() {
        let s = "a\0b".to_owned();
        let encoded = enc(s.clone());
        assert_eq!(decode_ordered(&encoded, DataType::String).unwrap(), Value::String(s));
        assert!(enc("a") < encoded);
        assert!(encoded < enc("a\u{1}"));
    }

    #[test]
    fn date_ordering_and_roundtrip() {
        let early = date_from_millis(-86_400_000).unwrap();
        let late = date_from_millis(1_700_000_000_123).unwrap();
        assert!(enc(early) < enc(late));
        assert_eq!(decode_ordered(&enc(late), DataType::Date).unwrap(), Value::Date(late));
    }

    #[test]
    fn geo_roundtrip() {
        let v = Value::Geo { lat: 47.5, lon: -122.25 };
        let encoded = encode_ordered(&v);
        assert_eq!(decode_ordered(&encoded, DataType::Geo).unwrap(), v);
    }

    #[test]
    fn uuid_roundtrip() {
        let v = Value::Uuid(Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef));
        let encoded = encode_ordered(&v);
        assert_eq!(encoded.len(), 16);
        assert_eq!(decode_ordered(&encoded, DataType::Uuid).unwrap(), v);
    }

    #[test]
    fn generic_has_no_ordered_form() {
        let err = decode_ordered(&[0], DataType::Generic).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut encoded = enc(5i64);
        encoded.push(0);
        assert!(decode_ordered(&encoded, DataType::Int).is_err());
    }
}
