//! Composite index keys and entries.
//!
//! ```text
//! key   := [digest prefix] index_id field_value*
//! entry := 0x00 [element id if not unique] [relation id* if LIST] | element
//! ```
//!
//! Field values use the compact attribute encoding in the index's fixed
//! field order; generic keys carry a type tag. The element after the value
//! offset is a vertex id, or a relation identifier tuple for edge and
//! property indexes.

use ridgedb_core::encoding::value::{read_attribute, write_attribute};
use ridgedb_core::encoding::{AttributeMode, ByteReader, ByteWriter};
use ridgedb_core::{
    Cardinality, CoreError, ElementCategory, RelationId, RelationIdentifier, SchemaId,
    TypeInspector, Value, VertexId,
};
use sha2::{Digest, Sha256};

use super::definition::CompositeIndex;
use super::matcher::RecordEntry;
use crate::config::{HashLength, IndexConfig};
use crate::error::{IndexError, IndexResult};

/// The element an index entry points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// A vertex.
    Vertex(VertexId),
    /// An edge or a vertex property.
    Relation(RelationIdentifier),
}

impl ElementRef {
    /// Id of the element as a string; the document id in search backends.
    #[must_use]
    pub fn document_id(&self) -> &str {
        match self {
            Self::Vertex(id) => id.as_str(),
            Self::Relation(r) => r.relation_id.as_str(),
        }
    }

    /// Element category.
    #[must_use]
    pub const fn category(&self) -> ElementCategory {
        match self {
            Self::Vertex(_) => ElementCategory::Vertex,
            Self::Relation(r) if r.in_vertex.is_some() => ElementCategory::Edge,
            Self::Relation(_) => ElementCategory::Property,
        }
    }
}

/// A composite index entry: column bytes followed by the element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// Column then value, concatenated.
    pub bytes: Vec<u8>,
    /// Where the value starts.
    pub value_offset: usize,
}

impl IndexEntry {
    /// Column bytes.
    #[must_use]
    pub fn column(&self) -> &[u8] {
        &self.bytes[..self.value_offset]
    }

    /// Value bytes.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.bytes[self.value_offset..]
    }
}

/// Builds and parses composite index keys and entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeKeyCodec {
    hash: Option<HashLength>,
}

impl CompositeKeyCodec {
    /// Create a codec with an optional digest prefix.
    #[must_use]
    pub const fn new(hash: Option<HashLength>) -> Self {
        Self { hash }
    }

    /// Create a codec from the index configuration.
    #[must_use]
    pub const fn from_config(config: &IndexConfig) -> Self {
        Self::new(config.hash_keys)
    }

    /// Key for `values`, given in the index's field order.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Invariant`] if the number of values differs from the
    ///   number of fields
    /// - [`CoreError::TypeMismatch`] if a value does not fit its key
    pub fn build_key(
        &self,
        index: &CompositeIndex,
        values: &[Value],
        types: &dyn TypeInspector,
    ) -> IndexResult<Vec<u8>> {
        if values.len() != index.fields.len() {
            return Err(CoreError::Invariant(format!(
                "index '{}' has {} fields, got {} values",
                index.name,
                index.fields.len(),
                values.len()
            ))
            .into());
        }
        let mut w = ByteWriter::with_capacity(16 + 8 * values.len());
        w.put_ordered_varint(index.id.as_u64());
        for (key, value) in index.fields.iter().zip(values) {
            write_attribute(&mut w, value, types.key_data_type(*key)?, AttributeMode::Plain)?;
        }
        Ok(self.with_prefix(w.into_bytes()))
    }

    /// Key for a matched record.
    ///
    /// # Errors
    ///
    /// Same as [`build_key`](Self::build_key).
    pub fn record_key(
        &self,
        index: &CompositeIndex,
        record: &[RecordEntry],
        types: &dyn TypeInspector,
    ) -> IndexResult<Vec<u8>> {
        let values: Vec<Value> = record.iter().map(|e| e.value.clone()).collect();
        self.build_key(index, &values, types)
    }

    fn with_prefix(&self, raw: Vec<u8>) -> Vec<u8> {
        match self.hash {
            None => raw,
            Some(len) => {
                let digest = Sha256::digest(&raw);
                let mut key = Vec::with_capacity(len.bytes() + raw.len());
                key.extend_from_slice(&digest[..len.bytes()]);
                key.extend_from_slice(&raw);
                key
            }
        }
    }

    /// The key without its digest prefix.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if the key is shorter than the prefix
    /// or the prefix does not match the rest of the key.
    pub fn strip_prefix<'k>(&self, key: &'k [u8]) -> IndexResult<&'k [u8]> {
        let Some(len) = self.hash else {
            return Ok(key);
        };
        if key.len() < len.bytes() {
            let msg = "index key shorter than its digest prefix";
            return Err(CoreError::Encoding(msg.into()).into());
        }
        let (prefix, raw) = key.split_at(len.bytes());
        if Sha256::digest(raw)[..len.bytes()] != *prefix {
            return Err(CoreError::Encoding("index key digest prefix mismatch".into()).into());
        }
        Ok(raw)
    }

    /// Index id a key belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on malformed keys.
    pub fn index_id_from_key(&self, key: &[u8]) -> IndexResult<SchemaId> {
        let mut r = ByteReader::new(self.strip_prefix(key)?);
        Ok(SchemaId::new(r.get_ordered_varint()?))
    }

    /// Field values of a key, in field order.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Invariant`] if the key belongs to another index
    /// - [`CoreError::Encoding`] on malformed keys
    pub fn decode_key_values(
        &self,
        index: &CompositeIndex,
        key: &[u8],
        types: &dyn TypeInspector,
    ) -> IndexResult<Vec<Value>> {
        let mut r = ByteReader::new(self.strip_prefix(key)?);
        let id = SchemaId::new(r.get_ordered_varint()?);
        if id != index.id {
            return Err(CoreError::Invariant(format!(
                "key of index {id} decoded as index '{}'",
                index.name
            ))
            .into());
        }
        let values = index
            .fields
            .iter()
            .map(|key| {
                Ok(read_attribute(&mut r, types.key_data_type(*key)?, AttributeMode::Plain)?)
            })
            .collect::<IndexResult<Vec<_>>>()?;
        if !r.is_empty() {
            return Err(CoreError::Encoding("trailing bytes after index key".into()).into());
        }
        Ok(values)
    }

    /// Entry recording that `element` matched `index` with `record`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Invariant`] if the element category differs from
    /// the index's.
    pub fn build_entry(
        &self,
        index: &CompositeIndex,
        record: &[RecordEntry],
        element: &ElementRef,
    ) -> IndexResult<IndexEntry> {
        check_category(index, element)?;
        let mut w = ByteWriter::with_capacity(32);
        w.put_u8(0);
        if index.cardinality != Cardinality::Single {
            w.put_escaped(element.document_id().as_bytes());
        }
        if index.cardinality == Cardinality::List {
            for entry in record {
                w.put_escaped(entry.relation_id.as_str().as_bytes());
            }
        }
        let value_offset = w.position();
        match element {
            ElementRef::Vertex(id) => w.put_escaped(id.as_str().as_bytes()),
            ElementRef::Relation(r) => {
                w.put_escaped(r.relation_id.as_str().as_bytes());
                w.put_escaped(r.out_vertex.as_str().as_bytes());
                w.put_ordered_varint(r.type_id.as_u64());
                match &r.in_vertex {
                    Some(v) => {
                        w.put_u8(1);
                        w.put_escaped(v.as_str().as_bytes());
                    }
                    None => w.put_u8(0),
                }
            }
        }
        Ok(IndexEntry { bytes: w.into_bytes(), value_offset })
    }

    /// The element an entry of `index` points at.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] on malformed entries.
    pub fn decode_entry(
        &self,
        index: &CompositeIndex,
        entry: &IndexEntry,
    ) -> IndexResult<ElementRef> {
        if entry.value_offset > entry.bytes.len() || entry.column().first() != Some(&0) {
            return Err(CoreError::Encoding("malformed index entry column".into()).into());
        }
        let mut r = ByteReader::new(entry.value());
        let element = match index.element {
            ElementCategory::Vertex => ElementRef::Vertex(VertexId::new(r.get_escaped_string()?)),
            ElementCategory::Edge | ElementCategory::Property => {
                let relation_id = RelationId::new(r.get_escaped_string()?);
                let out_vertex = VertexId::new(r.get_escaped_string()?);
                let type_id = SchemaId::new(r.get_ordered_varint()?);
                let in_vertex = match r.get_u8()? {
                    0 => None,
                    1 => Some(VertexId::new(r.get_escaped_string()?)),
                    b => {
                        return Err(
                            CoreError::Encoding(format!("invalid in-vertex marker {b:#04x}")).into()
                        )
                    }
                };
                ElementRef::Relation(RelationIdentifier {
                    relation_id,
                    out_vertex,
                    type_id,
                    in_vertex,
                })
            }
        };
        if !r.is_empty() {
            return Err(CoreError::Encoding("trailing bytes after index entry".into()).into());
        }
        Ok(element)
    }
}

fn check_category(index: &CompositeIndex, element: &ElementRef) -> IndexResult<()> {
    if element.category() == index.element {
        Ok(())
    } else {
        Err(IndexError::Core(CoreError::Invariant(format!(
            "{:?} element cannot be stored in {:?} index '{}'",
            element.category(),
            index.element,
            index.name
        ))))
    }
}
