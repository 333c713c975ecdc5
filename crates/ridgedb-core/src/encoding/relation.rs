//! Relation records.
//!
//! A relation (edge or vertex property) is stored in the adjacency list of
//! each vertex it touches as one record: a key, which determines where the
//! record sorts, and a value. Both live in one buffer split at
//! `value_offset`.
//!
//! # Layout
//!
//! Every key starts with a [`RecordHeader`]. What follows depends on the
//! relation category and on how constrained the type is in the record's
//! direction:
//!
//! | category | layout             | key (after header)               | value                  |
//! |----------|--------------------|----------------------------------|------------------------|
//! | edge     | unique             | -                                | other vertex, relation |
//! | edge     | constrained        | other vertex                     | relation               |
//! | edge     | unconstrained      | sort key, other vertex, relation | -                      |
//! | property | SINGLE             | -                                | value, relation        |
//! | property | SET                | value                            | relation               |
//! | property | LIST               | sort key, relation               | value                  |
//!
//! "Unique" means at most one relation of the type per vertex in the
//! record's direction; "constrained" covers the other multiplicities that
//! bound it without making it unique.
//!
//! The value then carries the signature fields (presence byte plus ordered
//! payload) and the remaining properties as `key id` + compact payload in
//! ascending key id order. Implicit keys never enter the bytes; they travel
//! in [`RelationRecord::metadata`].
//!
//! For `DESC` types the sort-key sub-range of the key is byte-flipped, so
//! plain unsigned comparison yields descending order.
//!
//! # Example
//!
//! ```
//! use ridgedb_core::encoding::RelationCodec;
//! use ridgedb_core::schema::{Multiplicity, RelationType, Schema};
//! use ridgedb_core::types::{Direction, Relation, SchemaId};
//!
//! let mut schema = Schema::new();
//! schema
//!     .add_type(
//!         RelationType::edge_label(SchemaId::new(10), "mother")
//!             .with_multiplicity(Multiplicity::Many2One),
//!     )
//!     .unwrap();
//!
//! let edge = Relation::edge("r1", SchemaId::new(10), "v1", "v2");
//! let record = RelationCodec::encode(&edge, 0, &schema).unwrap();
//! let decoded = RelationCodec::decode(&record, false, &schema).unwrap();
//!
//! assert_eq!(decoded.direction, Direction::Out);
//! assert_eq!(decoded.other_vertex().map(|v| v.as_str()), Some("v2"));
//! assert_eq!(decoded.relation_id.as_str(), "r1");
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::cursor::{flip_bytes, ByteReader, ByteWriter};
use super::keys::{HeaderDirection, RecordHeader};
use super::value::{read_attribute, write_attribute, AttributeMode};
use crate::error::{CoreError, CoreResult};
use crate::schema::{Cardinality, ImplicitKey, RelationType, SortOrder, TypeInspector};
use crate::types::{
    DataType, Direction, Relation, RelationId, RelationKind, SchemaId, Value, VertexId,
};

const ABSENT: u8 = 0x00;
const PRESENT: u8 = 0x01;

/// One stored record: key and value bytes plus out-of-band metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationRecord {
    /// Key followed by value.
    pub bytes: Vec<u8>,
    /// Start of the value within `bytes`.
    pub value_offset: usize,
    /// Implicit keys stored as entry metadata.
    pub metadata: BTreeMap<ImplicitKey, Value>,
}

impl RelationRecord {
    /// Build a record from raw parts.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if `value_offset` is past the end.
    pub fn new(bytes: Vec<u8>, value_offset: usize) -> CoreResult<Self> {
        if value_offset > bytes.len() {
            return Err(CoreError::Validation(format!(
                "value offset {value_offset} past record of {} bytes",
                bytes.len()
            )));
        }
        Ok(Self { bytes, value_offset, metadata: BTreeMap::new() })
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: ImplicitKey, value: impl Into<Value>) -> Self {
        self.metadata.insert(key, value.into());
        self
    }

    /// Key bytes.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.bytes[..self.value_offset]
    }

    /// Value bytes.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.bytes[self.value_offset..]
    }
}

/// The far side of a relation: another vertex, or a property value.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationEnd {
    /// Edge endpoint opposite to the record owner.
    Vertex(VertexId),
    /// Property value.
    Value(Value),
}

/// Decoded relation record.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationCache {
    /// Relation type.
    pub type_id: SchemaId,
    /// Direction relative to the record owner.
    pub direction: Direction,
    /// Relation id.
    pub relation_id: RelationId,
    /// Other vertex or property value.
    pub other: RelationEnd,
    /// Property mapping; `None` after a header-only decode.
    pub properties: Option<BTreeMap<SchemaId, Value>>,
}

impl RelationCache {
    /// Whether the property mapping was decoded.
    #[must_use]
    pub const fn has_properties(&self) -> bool {
        self.properties.is_some()
    }

    /// Other vertex, for edges.
    #[must_use]
    pub const fn other_vertex(&self) -> Option<&VertexId> {
        match &self.other {
            RelationEnd::Vertex(v) => Some(v),
            RelationEnd::Value(_) => None,
        }
    }

    /// Value, for properties.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match &self.other {
            RelationEnd::Value(v) => Some(v),
            RelationEnd::Vertex(_) => None,
        }
    }

    /// A decoded property.
    #[must_use]
    pub fn get_property(&self, key: SchemaId) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(&key))
    }

    /// Rebuild the relation as seen from `owner`, the vertex whose
    /// adjacency list held the record.
    #[must_use]
    pub fn into_relation(self, owner: impl Into<VertexId>) -> Relation {
        let owner = owner.into();
        let kind = match self.other {
            RelationEnd::Vertex(other) => match self.direction {
                Direction::In => RelationKind::Edge { out_vertex: other, in_vertex: owner },
                Direction::Out | Direction::Both => {
                    RelationKind::Edge { out_vertex: owner, in_vertex: other }
                }
            },
            RelationEnd::Value(value) => RelationKind::Property { vertex: owner, value },
        };
        Relation {
            id: self.relation_id,
            type_id: self.type_id,
            kind,
            properties: self.properties.unwrap_or_default(),
        }
    }
}

/// Where the type puts its disambiguating fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    /// At most one relation per owner: nothing after the header.
    Unique,
    /// Other vertex (or value) in the key, relation id in the value.
    Constrained,
    /// Sort key and identity in the key.
    Unconstrained,
}

impl Layout {
    pub(crate) fn of(ty: &RelationType, direction: Direction) -> Self {
        if ty.is_property_key() {
            return match ty.cardinality() {
                Cardinality::Single => Self::Unique,
                Cardinality::Set => Self::Constrained,
                Cardinality::List => Self::Unconstrained,
            };
        }
        if !ty.multiplicity.is_constrained() {
            Self::Unconstrained
        } else if ty.multiplicity.is_unique(direction) {
            Self::Unique
        } else {
            Self::Constrained
        }
    }
}

/// Write an inlined sort-key or signature field.
pub(crate) fn write_inline(
    w: &mut ByteWriter,
    value: Option<&Value>,
    declared: DataType,
) -> CoreResult<()> {
    match value {
        None => {
            w.put_u8(ABSENT);
            Ok(())
        }
        Some(v) => {
            w.put_u8(PRESENT);
            write_attribute(w, v, declared, AttributeMode::Ordered)
        }
    }
}

fn read_inline(r: &mut ByteReader<'_>, declared: DataType) -> CoreResult<Option<Value>> {
    match r.get_u8()? {
        ABSENT => Ok(None),
        PRESENT => read_attribute(r, declared, AttributeMode::Ordered).map(Some),
        other => Err(CoreError::Encoding(format!("invalid presence byte: 0x{other:02x}"))),
    }
}

fn write_id(w: &mut ByteWriter, id: &str) {
    w.put_escaped(id.as_bytes());
}

fn read_vertex(r: &mut ByteReader<'_>) -> CoreResult<VertexId> {
    r.get_escaped_string().map(VertexId::new)
}

fn read_relation_id(r: &mut ByteReader<'_>) -> CoreResult<RelationId> {
    r.get_escaped_string().map(RelationId::new)
}

fn header_slot(ty: &RelationType, direction: Direction) -> CoreResult<HeaderDirection> {
    if ty.is_property_key() {
        Ok(HeaderDirection::Property)
    } else {
        HeaderDirection::for_edge(direction)
    }
}

pub(crate) fn write_header(
    w: &mut ByteWriter,
    ty: &RelationType,
    direction: Direction,
) -> CoreResult<()> {
    RecordHeader { type_id: ty.id, direction: header_slot(ty, direction)?, invisible: ty.invisible }
        .write(w)
}

/// Encodes relations to records and back. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationCodec;

impl RelationCodec {
    /// Encode `relation` as stored in the adjacency list of the vertex at
    /// `position` (0 = out vertex, 1 = in vertex; properties only have 0).
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnknownType`] if the type or a property key is unknown
    /// - [`CoreError::Validation`] for an invalid position
    /// - [`CoreError::TypeMismatch`] if a value does not fit its key
    /// - [`CoreError::Invariant`] if the relation kind contradicts its type
    pub fn encode(
        relation: &Relation,
        position: usize,
        types: &dyn TypeInspector,
    ) -> CoreResult<RelationRecord> {
        let ty = types.existing_type(relation.type_id)?;
        if position >= relation.arity() {
            return Err(CoreError::Validation(format!(
                "position {position} out of range for relation of arity {}",
                relation.arity()
            )));
        }
        let direction = Direction::from_position(position);
        let (other, value_type) = match (&relation.kind, ty.data_type()) {
            (RelationKind::Edge { .. }, None) => {
                let other = relation.other_vertex(direction).ok_or_else(|| {
                    CoreError::Invariant("edge without an opposite vertex".into())
                })?;
                (RelationEnd::Vertex(other.clone()), None)
            }
            (RelationKind::Property { value, .. }, Some(dt)) => {
                (RelationEnd::Value(value.clone()), Some(dt))
            }
            _ => {
                return Err(CoreError::Invariant(format!(
                    "relation {} does not match the category of type '{}'",
                    relation.id, ty.name
                )))
            }
        };

        let mut metadata = BTreeMap::new();
        let mut properties = BTreeMap::new();
        for (key, value) in &relation.properties {
            let declared = types.key_data_type(*key)?;
            if !declared.accepts(value) {
                return Err(CoreError::type_mismatch_with_value(
                    declared.as_str(),
                    value.data_type().as_str(),
                    value,
                ));
            }
            match ImplicitKey::from_id(*key) {
                Some(implicit) => {
                    metadata.insert(implicit, value.clone());
                }
                None => {
                    properties.insert(*key, value);
                }
            }
        }

        let mut w = ByteWriter::with_capacity(64);
        write_header(&mut w, ty, direction)?;

        let write_other = |w: &mut ByteWriter| -> CoreResult<()> {
            match (&other, value_type) {
                (RelationEnd::Vertex(v), _) => {
                    write_id(w, v.as_str());
                    Ok(())
                }
                (RelationEnd::Value(v), Some(dt)) => {
                    write_attribute(w, v, dt, AttributeMode::Plain)
                }
                (RelationEnd::Value(_), None) => {
                    Err(CoreError::Invariant("property value without a data type".into()))
                }
            }
        };

        let value_offset = match Layout::of(ty, direction) {
            Layout::Unique => {
                let offset = w.position();
                write_other(&mut w)?;
                write_id(&mut w, relation.id.as_str());
                offset
            }
            Layout::Constrained => {
                write_other(&mut w)?;
                let offset = w.position();
                write_id(&mut w, relation.id.as_str());
                offset
            }
            Layout::Unconstrained => {
                let start = w.position();
                for key in &ty.sort_key {
                    write_inline(&mut w, properties.get(key).copied(), types.key_data_type(*key)?)?;
                }
                if ty.sort_order == SortOrder::Desc {
                    let end = w.position();
                    w.flip_range(start, end);
                }
                if relation.is_edge() {
                    write_other(&mut w)?;
                    write_id(&mut w, relation.id.as_str());
                    w.position()
                } else {
                    write_id(&mut w, relation.id.as_str());
                    let offset = w.position();
                    write_other(&mut w)?;
                    offset
                }
            }
        };

        for key in &ty.signature {
            write_inline(&mut w, properties.get(key).copied(), types.key_data_type(*key)?)?;
        }
        for (key, value) in &properties {
            if ty.sort_key.contains(key) || ty.signature.contains(key) {
                continue;
            }
            w.put_ordered_varint(key.as_u64());
            write_attribute(&mut w, value, types.key_data_type(*key)?, AttributeMode::Plain)?;
        }

        Ok(RelationRecord { bytes: w.into_bytes(), value_offset, metadata })
    }

    /// Decode a record. With `exclude_properties` only the header fields
    /// (type, direction, relation id, other vertex or value) are read.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Encoding`] on malformed bytes
    /// - [`CoreError::UnknownType`] if a type id cannot be resolved
    /// - [`CoreError::Invariant`] if the record does not fit its type, in
    ///   particular a constrained relation without a value
    pub fn decode(
        record: &RelationRecord,
        exclude_properties: bool,
        types: &dyn TypeInspector,
    ) -> CoreResult<RelationCache> {
        let mut r = ByteReader::new(&record.bytes);
        let header = RecordHeader::read(&mut r)?;
        let ty = types.existing_type(header.type_id)?;
        if ty.is_property_key() != (header.direction == HeaderDirection::Property) {
            return Err(CoreError::Invariant(format!(
                "record category does not match type '{}'",
                ty.name
            )));
        }
        let direction = header.direction.direction();
        let value_type = ty.data_type();

        let read_other = |r: &mut ByteReader<'_>| -> CoreResult<RelationEnd> {
            match value_type {
                None => read_vertex(r).map(RelationEnd::Vertex),
                Some(dt) => read_attribute(r, dt, AttributeMode::Plain).map(RelationEnd::Value),
            }
        };
        let expect_offset = |r: &ByteReader<'_>| -> CoreResult<()> {
            if r.position() == record.value_offset {
                Ok(())
            } else {
                Err(CoreError::Invariant(format!(
                    "key of type '{}' ends at {} but value offset is {}",
                    ty.name,
                    r.position(),
                    record.value_offset
                )))
            }
        };
        let missing_value = || {
            CoreError::Invariant(format!("constrained relation of type '{}' has no value", ty.name))
        };

        let mut properties = BTreeMap::new();
        let (other, relation_id) = match Layout::of(ty, direction) {
            Layout::Unique => {
                expect_offset(&r)?;
                if r.is_empty() {
                    return Err(missing_value());
                }
                let other = read_other(&mut r)?;
                (other, read_relation_id(&mut r)?)
            }
            Layout::Constrained => {
                let other = read_other(&mut r)?;
                expect_offset(&r)?;
                if r.is_empty() {
                    return Err(missing_value());
                }
                (other, read_relation_id(&mut r)?)
            }
            Layout::Unconstrained => {
                let consumed = match ty.sort_order {
                    SortOrder::Asc => read_sort_key(&mut r, ty, types, &mut properties)?,
                    SortOrder::Desc => {
                        let mut flipped =
                            record.key().get(r.position()..).unwrap_or_default().to_vec();
                        flip_bytes(&mut flipped);
                        let mut fr = ByteReader::new(&flipped);
                        read_sort_key(&mut fr, ty, types, &mut properties)?
                    }
                };
                if ty.sort_order == SortOrder::Desc {
                    r.advance(consumed)?;
                }
                if value_type.is_none() {
                    let other = read_other(&mut r)?;
                    let id = read_relation_id(&mut r)?;
                    expect_offset(&r)?;
                    (other, id)
                } else {
                    let id = read_relation_id(&mut r)?;
                    expect_offset(&r)?;
                    if r.is_empty() {
                        return Err(missing_value());
                    }
                    (read_other(&mut r)?, id)
                }
            }
        };

        if exclude_properties {
            return Ok(RelationCache {
                type_id: ty.id,
                direction,
                relation_id,
                other,
                properties: None,
            });
        }

        for key in &ty.signature {
            if let Some(value) = read_inline(&mut r, types.key_data_type(*key)?)? {
                properties.insert(*key, value);
            }
        }
        while !r.is_empty() {
            let key = SchemaId::new(r.get_ordered_varint()?);
            let value = read_attribute(&mut r, types.key_data_type(key)?, AttributeMode::Plain)?;
            properties.insert(key, value);
        }
        for (implicit, value) in &record.metadata {
            properties.insert(implicit.id(), value.clone());
        }

        Ok(RelationCache {
            type_id: ty.id,
            direction,
            relation_id,
            other,
            properties: Some(properties),
        })
    }
}

/// Read the inlined sort key into `properties`; returns the bytes consumed.
fn read_sort_key(
    r: &mut ByteReader<'_>,
    ty: &RelationType,
    types: &dyn TypeInspector,
    properties: &mut BTreeMap<SchemaId, Value>,
) -> CoreResult<usize> {
    let start = r.position();
    for key in &ty.sort_key {
        if let Some(value) = read_inline(r, types.key_data_type(*key)?)? {
            properties.insert(*key, value);
        }
    }
    Ok(r.position() - start)
}

/// A stored record with memoized decodes.
///
/// Each slot is filled at most once. Concurrent readers may decode twice;
/// only one result is kept and both are equal.
#[derive(Debug)]
pub struct CachedRecord {
    record: RelationRecord,
    header: OnceLock<RelationCache>,
    full: OnceLock<RelationCache>,
}

impl CachedRecord {
    /// Wrap a record.
    #[must_use]
    pub fn new(record: RelationRecord) -> Self {
        Self { record, header: OnceLock::new(), full: OnceLock::new() }
    }

    /// The wrapped record.
    #[must_use]
    pub const fn record(&self) -> &RelationRecord {
        &self.record
    }

    /// Header fields; served from a full decode when one exists.
    ///
    /// # Errors
    ///
    /// See [`RelationCodec::decode`].
    pub fn header(&self, types: &dyn TypeInspector) -> CoreResult<&RelationCache> {
        if let Some(full) = self.full.get() {
            return Ok(full);
        }
        if let Some(header) = self.header.get() {
            return Ok(header);
        }
        let decoded = RelationCodec::decode(&self.record, true, types)?;
        Ok(self.header.get_or_init(|| decoded))
    }

    /// Full decode including properties.
    ///
    /// # Errors
    ///
    /// See [`RelationCodec::decode`].
    pub fn full(&self, types: &dyn TypeInspector) -> CoreResult<&RelationCache> {
        if let Some(full) = self.full.get() {
            return Ok(full);
        }
        let decoded = RelationCodec::decode(&self.record, false, types)?;
        Ok(self.full.get_or_init(|| decoded))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::{Multiplicity, Schema};

    const NAME: SchemaId = SchemaId::new(20);
    const AGE: SchemaId = SchemaId::new(21);
    const NOTE: SchemaId = SchemaId::new(22);
    const KNOWS: SchemaId = SchemaId::new(30);
    const ALIAS: SchemaId = SchemaId::new(31);

    fn schema() -> Schema {
        let mut s = Schema::new();
        s.add_type(RelationType::property_key(NAME, "name", DataType::String)).unwrap();
        s.add_type(RelationType::property_key(AGE, "age", DataType::Int)).unwrap();
        s.add_type(RelationType::property_key(NOTE, "note", DataType::Generic)).unwrap();
        s.add_type(
            RelationType::edge_label(KNOWS, "knows")
                .with_sort_key(vec![AGE])
                .with_signature(vec![NAME]),
        )
        .unwrap();
        s.add_type(
            RelationType::property_key(ALIAS, "alias", DataType::String)
                .with_cardinality(Cardinality::Set),
        )
        .unwrap();
        s
    }

    #[test]
    fn unconstrained_edge_keeps_everything_in_key() {
        let s = schema();
        let edge = Relation::edge("e1", KNOWS, "a", "b").with_property(AGE, 3i64);
        let record = RelationCodec::encode(&edge, 0, &s).unwrap();
        assert_eq!(record.value_offset, record.key().len());
        assert!(record.value().starts_with(&[ABSENT]));
    }

    #[test]
    fn set_property_value_is_in_key() {
        let s = schema();
        let p = Relation::property("p1", ALIAS, "v", "bob");
        let record = RelationCodec::encode(&p, 0, &s).unwrap();
        let decoded = RelationCodec::decode(&record, false, &s).unwrap();
        assert_eq!(decoded.value(), Some(&Value::from("bob")));
        assert!(record.key().windows(3).any(|w| w == b"bob"));
    }

    #[test]
    fn generic_set_property_roundtrip() {
        let mut s = schema();
        s.add_type(
            RelationType::property_key(SchemaId::new(32), "tags", DataType::Generic)
                .with_cardinality(Cardinality::Set),
        )
        .unwrap();
        for value in [Value::Int(7), Value::from("seven"), Value::Float(7.5)] {
            let p = Relation::property("p1", SchemaId::new(32), "v", value.clone());
            let record = RelationCodec::encode(&p, 0, &s).unwrap();
            let decoded = RelationCodec::decode(&record, false, &s).unwrap();
            assert_eq!(decoded.value(), Some(&value));
            assert_eq!(decoded.relation_id, RelationId::new("p1"));
        }

        let int = Relation::property("p1", SchemaId::new(32), "v", 7i64);
        let text = Relation::property("p1", SchemaId::new(32), "v", "7");
        assert_ne!(
            RelationCodec::encode(&int, 0, &s).unwrap().key(),
            RelationCodec::encode(&text, 0, &s).unwrap().key()
        );
    }

    #[test]
    fn generic_properties_roundtrip() {
        let s = schema();
        let edge = Relation::edge("e1", KNOWS, "a", "b").with_property(NOTE, 2.5f64);
        let record = RelationCodec::encode(&edge, 1, &s).unwrap();
        let decoded = RelationCodec::decode(&record, false, &s).unwrap();
        assert_eq!(decoded.direction, Direction::In);
        assert_eq!(decoded.get_property(NOTE), Some(&Value::Float(2.5)));
    }

    #[test]
    fn implicit_keys_move_to_metadata() {
        let s = schema();
        let edge = Relation::edge("e1", KNOWS, "a", "b")
            .with_property(ImplicitKey::Ttl.id(), 60i64)
            .with_property(AGE, 1i64);
        let record = RelationCodec::encode(&edge, 0, &s).unwrap();
        assert_eq!(record.metadata.get(&ImplicitKey::Ttl), Some(&Value::Int(60)));
        let decoded = RelationCodec::decode(&record, false, &s).unwrap();
        assert_eq!(decoded.get_property(ImplicitKey::Ttl.id()), Some(&Value::Int(60)));
    }

    #[test]
    fn type_mismatch_rejected() {
        let s = schema();
        let edge = Relation::edge("e1", KNOWS, "a", "b").with_property(AGE, "old");
        let err = RelationCodec::encode(&edge, 0, &s).unwrap_err();
        assert!(matches!(err, CoreError::TypeMismatch { .. }));
    }

    #[test]
    fn category_mismatch_is_fatal() {
        let s = schema();
        let bogus = Relation::edge("e1", NAME, "a", "b");
        assert!(RelationCodec::encode(&bogus, 0, &s).unwrap_err().is_fatal());
    }

    #[test]
    fn property_position_out_of_range() {
        let s = schema();
        let p = Relation::property("p1", NAME, "v", "x");
        assert!(matches!(RelationCodec::encode(&p, 1, &s), Err(CoreError::Validation(_))));
    }

    #[test]
    fn missing_constrained_value_is_fatal() {
        let mut s = schema();
        s.add_type(
            RelationType::edge_label(SchemaId::new(40), "mother")
                .with_multiplicity(Multiplicity::Many2One),
        )
        .unwrap();
        let edge = Relation::edge("r1", SchemaId::new(40), "v1", "v2");
        let record = RelationCodec::encode(&edge, 0, &s).unwrap();
        let truncated = RelationRecord::new(record.key().to_vec(), record.value_offset).unwrap();
        let err = RelationCodec::decode(&truncated, true, &s).unwrap_err();
        assert!(matches!(err, CoreError::Invariant(_)));
    }

    #[test]
    fn cached_record_prefers_full_decode() {
        let s = schema();
        let edge = Relation::edge("e1", KNOWS, "a", "b").with_property(AGE, 9i64);
        let cached = CachedRecord::new(RelationCodec::encode(&edge, 0, &s).unwrap());

        assert!(!cached.header(&s).unwrap().has_properties());
        assert!(cached.full(&s).unwrap().has_properties());
        assert!(cached.header(&s).unwrap().has_properties());
    }

    #[test]
    fn into_relation_restores_endpoints() {
        let s = schema();
        let edge = Relation::edge("e1", KNOWS, "a", "b").with_property(AGE, 9i64);
        let record = RelationCodec::encode(&edge, 1, &s).unwrap();
        let rebuilt = RelationCodec::decode(&record, false, &s).unwrap().into_relation("b");
        assert_eq!(rebuilt, edge);
    }
}
