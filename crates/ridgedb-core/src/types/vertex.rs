//! In-memory vertex state as seen by one transaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{RelationId, SchemaId, Value, VertexId};

/// One property instance on a vertex, with its own meta-properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexProperty {
    /// Relation id of the property.
    pub id: RelationId,
    /// Property key.
    pub key: SchemaId,
    /// Value.
    pub value: Value,
    /// Meta-properties keyed by property-key id.
    pub meta: BTreeMap<SchemaId, Value>,
}

impl VertexProperty {
    /// Create a property without meta-properties.
    #[must_use]
    pub fn new(id: impl Into<RelationId>, key: SchemaId, value: impl Into<Value>) -> Self {
        Self { id: id.into(), key, value: value.into(), meta: BTreeMap::new() }
    }

    /// Attach a meta-property.
    #[must_use]
    pub fn with_meta(mut self, key: SchemaId, value: impl Into<Value>) -> Self {
        self.meta.insert(key, value.into());
        self
    }
}

/// A vertex with its current (transaction-local) properties.
///
/// SET and LIST keys may appear more than once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Vertex id.
    pub id: VertexId,
    /// Vertex label, if any.
    pub label: Option<SchemaId>,
    /// Current properties in insertion order.
    pub properties: Vec<VertexProperty>,
}

impl Vertex {
    /// Create an unlabeled vertex.
    #[must_use]
    pub fn new(id: impl Into<VertexId>) -> Self {
        Self { id: id.into(), label: None, properties: Vec::new() }
    }

    /// Set the vertex label.
    #[must_use]
    pub const fn with_label(mut self, label: SchemaId) -> Self {
        self.label = Some(label);
        self
    }

    /// Add a property instance.
    #[must_use]
    pub fn with_property(mut self, property: VertexProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// All current values for `key`.
    pub fn properties_of(&self, key: SchemaId) -> impl Iterator<Item = &VertexProperty> {
        self.properties.iter().filter(move |p| p.key == key)
    }

    /// Remove a property instance by relation id, returning it.
    pub fn remove_property(&mut self, id: &RelationId) -> Option<VertexProperty> {
        let pos = self.properties.iter().position(|p| &p.id == id)?;
        Some(self.properties.remove(pos))
    }
}
