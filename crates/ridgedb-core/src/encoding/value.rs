//! Compact (unordered) attribute encoding.
//!
//! Values of a declared type are written without a tag; the schema tells
//! the reader what to expect. Values of a [`DataType::Generic`] key carry a
//! 1-byte type tag followed by the same payload.
//!
//! # Format
//!
//! - `Bool`: 1 byte (`0x00`/`0x01`)
//! - `Int`: 8 bytes big-endian
//! - `Float`: 8 bytes IEEE 754 big-endian
//! - `String`: 4 bytes length + UTF-8 bytes
//! - `Date`: 8 bytes big-endian epoch milliseconds
//! - `Uuid`: 16 bytes
//! - `Geo`: latitude then longitude, 8 bytes each
//! - `Bytes`: 4 bytes length + raw bytes

use uuid::Uuid;

use super::cursor::{ByteReader, ByteWriter};
use super::sortable::{date_from_millis, read_ordered, write_ordered};
use crate::error::{CoreError, CoreResult};
use crate::types::{DataType, Value};

/// Type tags for generic values.
pub mod tags {
    /// Boolean.
    pub const BOOL: u8 = 0x01;
    /// 64-bit signed integer.
    pub const INT: u8 = 0x02;
    /// 64-bit float.
    pub const FLOAT: u8 = 0x03;
    /// UTF-8 string.
    pub const STRING: u8 = 0x04;
    /// Raw bytes.
    pub const BYTES: u8 = 0x05;
    /// Millisecond instant.
    pub const DATE: u8 = 0x06;
    /// UUID.
    pub const UUID: u8 = 0x07;
    /// Geographic point.
    pub const GEO: u8 = 0x08;
}

/// Which encoding an attribute is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMode {
    /// Compact encoding; generic keys are tagged.
    Plain,
    /// Sort-preserving encoding; generic keys are rejected.
    Ordered,
}

const fn tag_of(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => tags::BOOL,
        Value::Int(_) => tags::INT,
        Value::Float(_) => tags::FLOAT,
        Value::String(_) => tags::STRING,
        Value::Bytes(_) => tags::BYTES,
        Value::Date(_) => tags::DATE,
        Value::Uuid(_) => tags::UUID,
        Value::Geo { .. } => tags::GEO,
    }
}

fn type_of_tag(tag: u8) -> CoreResult<DataType> {
    Ok(match tag {
        tags::BOOL => DataType::Bool,
        tags::INT => DataType::Int,
        tags::FLOAT => DataType::Float,
        tags::STRING => DataType::String,
        tags::BYTES => DataType::Bytes,
        tags::DATE => DataType::Date,
        tags::UUID => DataType::Uuid,
        tags::GEO => DataType::Geo,
        _ => return Err(CoreError::Encoding(format!("unknown value type tag: {tag:#x}"))),
    })
}

/// Append the untagged compact payload of `value`.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if a string or byte payload is too long.
pub fn write_plain(w: &mut ByteWriter, value: &Value) -> CoreResult<()> {
    match value {
        Value::Bool(b) => w.put_u8(u8::from(*b)),
        Value::Int(i) => w.put_i64(*i),
        Value::Float(f) => w.put_u64(f.to_bits()),
        Value::String(s) => w.put_length_prefixed(s.as_bytes())?,
        Value::Date(d) => w.put_i64(d.timestamp_millis()),
        Value::Uuid(u) => w.put_bytes(u.as_bytes()),
        Value::Geo { lat, lon } => {
            w.put_u64(lat.to_bits());
            w.put_u64(lon.to_bits());
        }
        Value::Bytes(b) => w.put_length_prefixed(b)?,
    }
    Ok(())
}

/// Read an untagged compact payload of a concrete declared type.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] on malformed input and
/// [`CoreError::Invariant`] for [`DataType::Generic`].
pub fn read_plain(r: &mut ByteReader<'_>, data_type: DataType) -> CoreResult<Value> {
    Ok(match data_type {
        DataType::Bool => Value::Bool(r.get_u8()? != 0),
        DataType::Int => Value::Int(r.get_i64()?),
        DataType::Float => Value::Float(f64::from_bits(r.get_u64()?)),
        DataType::String => {
            let bytes = r.get_length_prefixed()?;
            let s = std::str::from_utf8(bytes)
                .map_err(|e| CoreError::Encoding(format!("invalid UTF-8: {e}")))?;
            Value::String(s.to_owned())
        }
        DataType::Date => Value::Date(date_from_millis(r.get_i64()?)?),
        DataType::Uuid => {
            let bytes: [u8; 16] = r
                .get_bytes(16)?
                .try_into()
                .map_err(|_| CoreError::Encoding("failed to read uuid bytes".into()))?;
            Value::Uuid(Uuid::from_bytes(bytes))
        }
        DataType::Geo => {
            let lat = f64::from_bits(r.get_u64()?);
            let lon = f64::from_bits(r.get_u64()?);
            Value::Geo { lat, lon }
        }
        DataType::Bytes => Value::Bytes(r.get_length_prefixed()?.to_vec()),
        DataType::Generic => {
            return Err(CoreError::Invariant("generic values must be read tagged".into()))
        }
    })
}

/// Append a type tag followed by the compact payload.
///
/// # Errors
///
/// See [`write_plain`].
pub fn write_tagged(w: &mut ByteWriter, value: &Value) -> CoreResult<()> {
    w.put_u8(tag_of(value));
    write_plain(w, value)
}

/// Read a tagged value.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] on an unknown tag or malformed payload.
pub fn read_tagged(r: &mut ByteReader<'_>) -> CoreResult<Value> {
    let data_type = type_of_tag(r.get_u8()?)?;
    read_plain(r, data_type)
}

/// Write `value` for a key declared as `declared`.
///
/// # Errors
///
/// - [`CoreError::TypeMismatch`] if the value does not fit the declared type
/// - [`CoreError::Invariant`] if a generic key is written in ordered mode
pub fn write_attribute(
    w: &mut ByteWriter,
    value: &Value,
    declared: DataType,
    mode: AttributeMode,
) -> CoreResult<()> {
    if !declared.accepts(value) {
        return Err(CoreError::type_mismatch_with_value(
            declared.as_str(),
            value.data_type().as_str(),
            value,
        ));
    }
    match (mode, declared) {
        (AttributeMode::Ordered, DataType::Generic) => {
            Err(CoreError::Invariant("generic keys cannot be ordered".into()))
        }
        (AttributeMode::Ordered, _) => {
            write_ordered(w, value);
            Ok(())
        }
        (AttributeMode::Plain, DataType::Generic) => write_tagged(w, value),
        (AttributeMode::Plain, _) => write_plain(w, value),
    }
}

/// Read a value for a key declared as `declared`.
///
/// # Errors
///
/// Same conditions as [`write_attribute`], plus malformed input.
pub fn read_attribute(
    r: &mut ByteReader<'_>,
    declared: DataType,
    mode: AttributeMode,
) -> CoreResult<Value> {
    match (mode, declared) {
        (AttributeMode::Ordered, _) => read_ordered(r, declared),
        (AttributeMode::Plain, DataType::Generic) => read_tagged(r),
        (AttributeMode::Plain, _) => read_plain(r, declared),
    }
}
