//! Matching graph elements against composite indexes.
//!
//! A vertex holding several values for an indexed key contributes one
//! record per combination of values: two values for field A and three for
//! field B give six records, each added and removed on its own.

use ridgedb_core::{Relation, RelationId, SchemaId, Value, Vertex, VertexId};

use super::definition::CompositeIndex;

/// One property value contributing to a composite index record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordEntry {
    /// Relation (vertex property or edge) holding the value.
    pub relation_id: RelationId,
    /// The value.
    pub value: Value,
    /// Property key.
    pub key: SchemaId,
}

/// One value per index field, in field order.
pub type IndexRecord = Vec<RecordEntry>;

/// Read access to a vertex as seen by the current transaction.
///
/// Implementations must reflect uncommitted additions and removals.
pub trait VertexState {
    /// Vertex id.
    fn vertex_id(&self) -> &VertexId;

    /// Vertex label, if any.
    fn label(&self) -> Option<SchemaId>;

    /// Current values of `key` with the property relations holding them.
    fn property_values(&self, key: SchemaId) -> Vec<(&RelationId, &Value)>;
}

impl VertexState for Vertex {
    fn vertex_id(&self) -> &VertexId {
        &self.id
    }

    fn label(&self) -> Option<SchemaId> {
        self.label
    }

    fn property_values(&self, key: SchemaId) -> Vec<(&RelationId, &Value)> {
        self.properties_of(key).map(|p| (&p.id, &p.value)).collect()
    }
}

/// A value that replaces the current values of one key during matching.
///
/// Used for properties that are being added or removed and so must be
/// matched alone, whatever the vertex currently holds.
#[derive(Debug, Clone, Copy)]
pub struct Substitute<'a> {
    /// Key whose current values are ignored.
    pub key: SchemaId,
    /// Relation holding the substituted value.
    pub relation_id: &'a RelationId,
    /// The substituted value.
    pub value: &'a Value,
}

/// Finds the records an element contributes to a composite index.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexMatcher;

impl IndexMatcher {
    /// Every record `vertex` contributes to `index`.
    ///
    /// Empty if any field has no value.
    #[must_use]
    pub fn match_vertex(
        vertex: &dyn VertexState,
        index: &CompositeIndex,
        substitute: Option<Substitute<'_>>,
    ) -> Vec<IndexRecord> {
        let mut out = Vec::new();
        let mut buffer = Vec::with_capacity(index.fields.len());
        Self::expand(vertex, &index.fields, substitute, &mut buffer, &mut out);
        out
    }

    fn expand(
        vertex: &dyn VertexState,
        fields: &[SchemaId],
        substitute: Option<Substitute<'_>>,
        buffer: &mut Vec<RecordEntry>,
        out: &mut Vec<IndexRecord>,
    ) {
        let Some(&key) = fields.get(buffer.len()) else {
            out.push(buffer.clone());
            return;
        };
        let candidates = match substitute {
            Some(s) if s.key == key => vec![(s.relation_id, s.value)],
            _ => vertex.property_values(key),
        };
        for (relation_id, value) in candidates {
            let relation_id = relation_id.clone();
            buffer.push(RecordEntry { relation_id, value: value.clone(), key });
            Self::expand(vertex, fields, substitute, buffer, out);
            buffer.pop();
        }
    }

    /// The record an edge or property element contributes to `index`.
    ///
    /// `None` unless the relation carries every field.
    #[must_use]
    pub fn match_relation(relation: &Relation, index: &CompositeIndex) -> Option<IndexRecord> {
        index
            .fields
            .iter()
            .map(|key| {
                relation.get_property(*key).map(|value| RecordEntry {
                    relation_id: relation.id.clone(),
                    value: value.clone(),
                    key: *key,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use ridgedb_core::{ElementCategory, VertexProperty};

    use super::*;

    const NAME: SchemaId = SchemaId::new(20);
    const CITY: SchemaId = SchemaId::new(21);
    const SINCE: SchemaId = SchemaId::new(22);

    fn index(fields: &[SchemaId]) -> CompositeIndex {
        CompositeIndex::builder(SchemaId::new(100), "idx", ElementCategory::Vertex)
            .fields(fields.iter().copied())
            .build()
    }

    fn vertex() -> Vertex {
        Vertex::new("v1")
            .with_property(VertexProperty::new("p1", NAME, "ann"))
            .with_property(VertexProperty::new("p2", NAME, "anna"))
            .with_property(VertexProperty::new("p3", CITY, "rome"))
            .with_property(VertexProperty::new("p4", CITY, "oslo"))
            .with_property(VertexProperty::new("p5", CITY, "lima"))
    }

    #[test]
    fn cartesian_expansion() {
        let records = IndexMatcher::match_vertex(&vertex(), &index(&[NAME, CITY]), None);
        assert_eq!(records.len(), 6);
        for (i, a) in records.iter().enumerate() {
            assert_eq!(a.len(), 2);
            assert_eq!(a[0].key, NAME);
            assert_eq!(a[1].key, CITY);
            assert!(records[i + 1..].iter().all(|b| a != b));
        }
    }

    #[test]
    fn missing_field_matches_nothing() {
        let records = IndexMatcher::match_vertex(&vertex(), &index(&[NAME, SINCE]), None);
        assert!(records.is_empty());
    }

    #[test]
    fn substitute_replaces_current_values() {
        let id = RelationId::new("p9");
        let value = Value::from("ann-marie");
        let substitute = Substitute { key: NAME, relation_id: &id, value: &value };
        let records =
            IndexMatcher::match_vertex(&vertex(), &index(&[NAME, CITY]), Some(substitute));
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r[0].relation_id == id && r[0].value == value));
    }

    #[test]
    fn substitute_supplies_missing_field() {
        let id = RelationId::new("p9");
        let value = Value::Int(2001);
        let substitute = Substitute { key: SINCE, relation_id: &id, value: &value };
        let records = IndexMatcher::match_vertex(&vertex(), &index(&[SINCE]), Some(substitute));
        assert_eq!(records, vec![vec![RecordEntry { relation_id: id, value, key: SINCE }]]);
    }

    #[test]
    fn relation_needs_every_field() {
        let edge =
            Relation::edge("e1", SchemaId::new(30), "v1", "v2").with_property(SINCE, 2001i64);
        let record = IndexMatcher::match_relation(&edge, &index(&[SINCE])).unwrap_or_default();
        assert_eq!(record.len(), 1);
        assert_eq!(record[0].relation_id, RelationId::new("e1"));
        assert!(IndexMatcher::match_relation(&edge, &index(&[SINCE, NAME])).is_none());
    }
}
