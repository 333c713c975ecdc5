//! Implicit keys carried out-of-band as record metadata.

use serde::{Deserialize, Serialize};

use crate::types::{DataType, SchemaId};

/// System keys that are never written into record bytes.
///
/// The store keeps them as entry metadata; decoding folds them back into the
/// property mapping under their reserved ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImplicitKey {
    /// Time-to-live in seconds.
    Ttl,
    /// Visibility label.
    Visibility,
    /// Write timestamp.
    Timestamp,
}

impl ImplicitKey {
    /// All implicit keys, in id order.
    pub const ALL: [Self; 3] = [Self::Ttl, Self::Visibility, Self::Timestamp];

    /// Reserved schema id.
    #[must_use]
    pub const fn id(self) -> SchemaId {
        match self {
            Self::Ttl => SchemaId::new(1),
            Self::Visibility => SchemaId::new(2),
            Self::Timestamp => SchemaId::new(3),
        }
    }

    /// The implicit key reserved under `id`, if any.
    #[must_use]
    pub const fn from_id(id: SchemaId) -> Option<Self> {
        match id.as_u64() {
            1 => Some(Self::Ttl),
            2 => Some(Self::Visibility),
            3 => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// Data type of the metadata value.
    #[must_use]
    pub const fn data_type(self) -> DataType {
        match self {
            Self::Ttl => DataType::Int,
            Self::Visibility => DataType::String,
            Self::Timestamp => DataType::Date,
        }
    }

    /// Whether `id` is reserved for an implicit key.
    #[must_use]
    pub const fn is_reserved(id: SchemaId) -> bool {
        Self::from_id(id).is_some()
    }
}
