//! Record header and range-bound helpers.
//!
//! Every relation record starts with a self-delimiting header packing the
//! type id, a direction id and the invisibility flag into one ordered
//! varint: `(type_id << 3) | (direction_id << 1) | invisible`. Records of
//! one type and direction therefore form a contiguous key range, with
//! outgoing edges sorting just before incoming ones.

use super::cursor::{ByteReader, ByteWriter};
use crate::error::{CoreError, CoreResult};
use crate::types::{Direction, SchemaId};

/// Direction slot encoded in the record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderDirection {
    /// A vertex property.
    Property,
    /// An edge seen from its out vertex.
    EdgeOut,
    /// An edge seen from its in vertex.
    EdgeIn,
}

impl HeaderDirection {
    /// Numeric id written into the header.
    #[must_use]
    pub const fn id(self) -> u64 {
        match self {
            Self::Property => 0,
            Self::EdgeOut => 2,
            Self::EdgeIn => 3,
        }
    }

    /// Resolve a header id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] for an unassigned id.
    pub fn from_id(id: u64) -> CoreResult<Self> {
        match id {
            0 => Ok(Self::Property),
            2 => Ok(Self::EdgeOut),
            3 => Ok(Self::EdgeIn),
            other => Err(CoreError::Encoding(format!("invalid direction id: {other}"))),
        }
    }

    /// Header slot for an edge seen in `direction`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for [`Direction::Both`], which has
    /// no single slot.
    pub fn for_edge(direction: Direction) -> CoreResult<Self> {
        match direction {
            Direction::Out => Ok(Self::EdgeOut),
            Direction::In => Ok(Self::EdgeIn),
            Direction::Both => {
                Err(CoreError::Validation("BOTH has no single header slot".into()))
            }
        }
    }

    /// Direction relative to the vertex owning the record.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Property | Self::EdgeOut => Direction::Out,
            Self::EdgeIn => Direction::In,
        }
    }
}

/// Decoded record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Relation type id.
    pub type_id: SchemaId,
    /// Direction slot.
    pub direction: HeaderDirection,
    /// Whether the relation type is invisible.
    pub invisible: bool,
}

impl RecordHeader {
    /// Write this header.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the type id does not fit the
    /// header.
    pub fn write(&self, w: &mut ByteWriter) -> CoreResult<()> {
        let type_id = self.type_id.as_u64();
        if type_id > SchemaId::MAX {
            return Err(CoreError::Validation(format!(
                "type id {} is out of range",
                self.type_id
            )));
        }
        let packed = (type_id << 3) | (self.direction.id() << 1) | u64::from(self.invisible);
        w.put_ordered_varint(packed);
        Ok(())
    }

    /// Read a header.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on malformed input.
    pub fn read(r: &mut ByteReader<'_>) -> CoreResult<Self> {
        let packed = r.get_ordered_varint()?;
        Ok(Self {
            type_id: SchemaId::new(packed >> 3),
            direction: HeaderDirection::from_id((packed >> 1) & 0b11)?,
            invisible: packed & 1 == 1,
        })
    }

    /// Encoded header bytes.
    ///
    /// # Errors
    ///
    /// See [`RecordHeader::write`].
    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        let mut w = ByteWriter::with_capacity(9);
        self.write(&mut w)?;
        Ok(w.into_bytes())
    }
}

/// Smallest buffer strictly greater than every buffer starting with `prefix`.
///
/// Used as the exclusive end of a prefix scan, and to turn an inclusive
/// upper bound (or exclusive lower bound) into a half-open byte boundary.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] if `prefix` is empty or all `0xFF`,
/// since no such buffer exists.
pub fn next_bigger(prefix: &[u8]) -> CoreResult<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Ok(end);
        }
    }
    Err(CoreError::Validation("no buffer is bigger than an all-0xFF prefix".into()))
}
