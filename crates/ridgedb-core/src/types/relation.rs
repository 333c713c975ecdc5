//! Relations: edges and vertex properties.
//!
//! A [`Relation`] is either an edge between two vertices or a property
//! attaching a value to one vertex. Both carry a relation type, an id and
//! a mapping of their own properties keyed by property-key id.
//!
//! # Example
//!
//! ```
//! use ridgedb_core::types::{Direction, Relation, SchemaId, Value};
//!
//! let knows = Relation::edge("r1", SchemaId::new(100), "v1", "v2")
//!     .with_property(SchemaId::new(200), 2015i64);
//!
//! assert!(knows.is_edge());
//! assert_eq!(knows.vertex(0).as_str(), "v1");
//! assert_eq!(knows.other_vertex(Direction::Out).map(|v| v.as_str()), Some("v2"));
//! assert_eq!(knows.get_property(SchemaId::new(200)), Some(&Value::Int(2015)));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{RelationId, SchemaId, Value, VertexId};

/// Direction of a relation relative to one of its vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// The vertex is the tail of the edge (or owns the property).
    Out,
    /// The vertex is the head of the edge.
    In,
    /// Either side; only meaningful for queries.
    Both,
}

impl Direction {
    /// Direction seen from the vertex at `position` (0 = out, 1 = in).
    #[must_use]
    pub const fn from_position(position: usize) -> Self {
        if position == 0 {
            Self::Out
        } else {
            Self::In
        }
    }

    /// The opposite direction; `Both` stays `Both`.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Out => Self::In,
            Self::In => Self::Out,
            Self::Both => Self::Both,
        }
    }
}

/// What a relation connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelationKind {
    /// A directed edge.
    Edge {
        /// Tail vertex.
        out_vertex: VertexId,
        /// Head vertex.
        in_vertex: VertexId,
    },
    /// A vertex property.
    Property {
        /// Owning vertex.
        vertex: VertexId,
        /// Property value.
        value: Value,
    },
}

/// The kind of element an index or query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementCategory {
    /// Vertices.
    Vertex,
    /// Edges.
    Edge,
    /// Vertex properties indexed as elements in their own right.
    Property,
}

/// An edge or a vertex property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation id.
    pub id: RelationId,
    /// Relation type (edge label or property key).
    pub type_id: SchemaId,
    /// Endpoints and value.
    pub kind: RelationKind,
    /// Properties attached to the relation itself, keyed by property-key id.
    pub properties: BTreeMap<SchemaId, Value>,
}

impl Relation {
    /// Create an edge from `out_vertex` to `in_vertex`.
    #[must_use]
    pub fn edge(
        id: impl Into<RelationId>,
        type_id: SchemaId,
        out_vertex: impl Into<VertexId>,
        in_vertex: impl Into<VertexId>,
    ) -> Self {
        Self {
            id: id.into(),
            type_id,
            kind: RelationKind::Edge { out_vertex: out_vertex.into(), in_vertex: in_vertex.into() },
            properties: BTreeMap::new(),
        }
    }

    /// Create a vertex property.
    #[must_use]
    pub fn property(
        id: impl Into<RelationId>,
        key: SchemaId,
        vertex: impl Into<VertexId>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            type_id: key,
            kind: RelationKind::Property { vertex: vertex.into(), value: value.into() },
            properties: BTreeMap::new(),
        }
    }

    /// Add a property to this relation.
    #[must_use]
    pub fn with_property(mut self, key: SchemaId, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value.into());
        self
    }

    /// Get a property value by key id.
    #[must_use]
    pub fn get_property(&self, key: SchemaId) -> Option<&Value> {
        self.properties.get(&key)
    }

    /// Whether this relation is an edge.
    #[must_use]
    pub const fn is_edge(&self) -> bool {
        matches!(self.kind, RelationKind::Edge { .. })
    }

    /// Element category of this relation.
    #[must_use]
    pub const fn category(&self) -> ElementCategory {
        match self.kind {
            RelationKind::Edge { .. } => ElementCategory::Edge,
            RelationKind::Property { .. } => ElementCategory::Property,
        }
    }

    /// Number of vertices this relation touches.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self.kind {
            RelationKind::Edge { .. } => 2,
            RelationKind::Property { .. } => 1,
        }
    }

    /// The vertex at `position`; properties only have position 0.
    ///
    /// Positions past the arity resolve to the last vertex.
    #[must_use]
    pub fn vertex(&self, position: usize) -> &VertexId {
        match &self.kind {
            RelationKind::Edge { out_vertex, in_vertex } => {
                if position == 0 {
                    out_vertex
                } else {
                    in_vertex
                }
            }
            RelationKind::Property { vertex, .. } => vertex,
        }
    }

    /// For an edge, the endpoint opposite to the vertex seen in `direction`.
    #[must_use]
    pub fn other_vertex(&self, direction: Direction) -> Option<&VertexId> {
        match (&self.kind, direction) {
            (RelationKind::Edge { in_vertex, .. }, Direction::Out) => Some(in_vertex),
            (RelationKind::Edge { out_vertex, .. }, Direction::In) => Some(out_vertex),
            _ => None,
        }
    }

    /// For a property, its value.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            RelationKind::Property { value, .. } => Some(value),
            RelationKind::Edge { .. } => None,
        }
    }

    /// The identifier tuple that addresses this relation from outside its
    /// adjacency list: relation id, out vertex, type and in vertex.
    #[must_use]
    pub fn identifier(&self) -> RelationIdentifier {
        let in_vertex = match &self.kind {
            RelationKind::Edge { in_vertex, .. } => Some(in_vertex.clone()),
            RelationKind::Property { .. } => None,
        };
        RelationIdentifier {
            relation_id: self.id.clone(),
            out_vertex: self.vertex(0).clone(),
            type_id: self.type_id,
            in_vertex,
        }
    }
}

/// Globally addressable identity of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationIdentifier {
    /// Relation id.
    pub relation_id: RelationId,
    /// Tail vertex (or owning vertex of a property).
    pub out_vertex: VertexId,
    /// Relation type.
    pub type_id: SchemaId,
    /// Head vertex; `None` for properties.
    pub in_vertex: Option<VertexId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_positions() {
        let edge = Relation::edge("r1", SchemaId::new(10), "a", "b");
        assert_eq!(edge.vertex(0).as_str(), "a");
        assert_eq!(edge.vertex(1).as_str(), "b");
        assert_eq!(edge.other_vertex(Direction::In).map(VertexId::as_str), Some("a"));
        assert_eq!(Direction::from_position(1), Direction::In);
    }

    #[test]
    fn property_identifier_has_no_head() {
        let prop = Relation::property("p1", SchemaId::new(11), "a", "Alice");
        let rid = prop.identifier();
        assert_eq!(rid.out_vertex.as_str(), "a");
        assert!(rid.in_vertex.is_none());
        assert_eq!(prop.category(), ElementCategory::Property);
    }
}
