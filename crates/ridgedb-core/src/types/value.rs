//! Attribute values stored on relations.
//!
//! [`Value`] is a closed set of attribute categories. Each property key
//! declares a [`DataType`]; values are checked against it before encoding,
//! except for keys declared [`DataType::Generic`], whose values carry their
//! own type tag.
//!
//! # Example
//!
//! ```
//! use ridgedb_core::types::{DataType, Value};
//!
//! let age: Value = 30i64.into();
//! assert_eq!(age.data_type(), DataType::Int);
//! assert!(DataType::Generic.accepts(&age));
//! assert!(!DataType::String.accepts(&age));
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A value that can be attached to a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Instant with millisecond precision
    Date(DateTime<Utc>),
    /// 128-bit UUID
    Uuid(Uuid),
    /// Geographic point (WGS84)
    Geo {
        /// Latitude in degrees
        lat: f64,
        /// Longitude in degrees
        lon: f64,
    },
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl Value {
    /// The data type this value belongs to.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Bool,
            Self::Int(_) => DataType::Int,
            Self::Float(_) => DataType::Float,
            Self::String(_) => DataType::String,
            Self::Date(_) => DataType::Date,
            Self::Uuid(_) => DataType::Uuid,
            Self::Geo { .. } => DataType::Geo,
            Self::Bytes(_) => DataType::Bytes,
        }
    }

    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the instant, if this is a date.
    #[must_use]
    pub const fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns `(lon, lat)`, if this is a geo point.
    #[must_use]
    pub const fn as_lon_lat(&self) -> Option<(f64, f64)> {
        match self {
            Self::Geo { lat, lon } => Some((*lon, *lat)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Geo { lat, lon } => write!(f, "POINT({lon} {lat})"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Date(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// Declared data type of a property key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// `Value::Bool`
    Bool,
    /// `Value::Int`
    Int,
    /// `Value::Float`
    Float,
    /// `Value::String`
    String,
    /// `Value::Date`
    Date,
    /// `Value::Uuid`
    Uuid,
    /// `Value::Geo`
    Geo,
    /// `Value::Bytes`
    Bytes,
    /// Any value; encoded with an embedded type tag.
    Generic,
}

impl DataType {
    /// Whether a value may be stored under a key of this type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        self == Self::Generic || value.data_type() == self
    }

    /// Whether values of this type are numeric.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Get a string representation of the data type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Date => "Date",
            Self::Uuid => "Uuid",
            Self::Geo => "Geo",
            Self::Bytes => "Bytes",
            Self::Generic => "Generic",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
