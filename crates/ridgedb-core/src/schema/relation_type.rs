//! Relation type metadata.

use serde::{Deserialize, Serialize};

use super::{Cardinality, Multiplicity, SortOrder};
use crate::types::{DataType, SchemaId};

/// Whether a relation type labels edges or keys properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationCategory {
    /// Edge label.
    EdgeLabel,
    /// Property key with its declared data type.
    PropertyKey(DataType),
}

/// Read-only metadata for one relation type.
///
/// # Example
///
/// ```
/// use ridgedb_core::schema::{Cardinality, RelationType, SortOrder};
/// use ridgedb_core::types::{DataType, SchemaId};
///
/// let age = RelationType::property_key(SchemaId::new(20), "age", DataType::Int);
/// let knows = RelationType::edge_label(SchemaId::new(10), "knows")
///     .with_sort_key(vec![age.id])
///     .with_sort_order(SortOrder::Desc);
///
/// assert!(age.is_property_key());
/// assert_eq!(age.cardinality(), Cardinality::Single);
/// assert_eq!(knows.sort_key, vec![SchemaId::new(20)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationType {
    /// Type id.
    pub id: SchemaId,
    /// Type name, unique within a schema.
    pub name: String,
    /// Edge label or property key.
    pub category: RelationCategory,
    /// Uniqueness constraint.
    pub multiplicity: Multiplicity,
    /// Property keys inlined into the record key, in order.
    pub sort_key: Vec<SchemaId>,
    /// Property keys always inlined into the record value.
    pub signature: Vec<SchemaId>,
    /// Layout order of the sort key.
    pub sort_order: SortOrder,
    /// Hidden system type.
    pub invisible: bool,
    /// Time-to-live in seconds, if records of this type expire.
    pub ttl: Option<u32>,
}

impl RelationType {
    /// An edge label with `Multi` multiplicity.
    #[must_use]
    pub fn edge_label(id: SchemaId, name: impl Into<String>) -> Self {
        Self::new(id, name, RelationCategory::EdgeLabel, Multiplicity::Multi)
    }

    /// A property key with `Single` cardinality.
    #[must_use]
    pub fn property_key(id: SchemaId, name: impl Into<String>, data_type: DataType) -> Self {
        Self::new(id, name, RelationCategory::PropertyKey(data_type), Multiplicity::Many2One)
    }

    fn new(
        id: SchemaId,
        name: impl Into<String>,
        category: RelationCategory,
        multiplicity: Multiplicity,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            multiplicity,
            sort_key: Vec::new(),
            signature: Vec::new(),
            sort_order: SortOrder::Asc,
            invisible: false,
            ttl: None,
        }
    }

    /// Set the multiplicity.
    #[must_use]
    pub const fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    /// Set the multiplicity from a property cardinality.
    #[must_use]
    pub const fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.multiplicity = Multiplicity::from_cardinality(cardinality);
        self
    }

    /// Set the sort key.
    #[must_use]
    pub fn with_sort_key(mut self, keys: Vec<SchemaId>) -> Self {
        self.sort_key = keys;
        self
    }

    /// Set the signature.
    #[must_use]
    pub fn with_signature(mut self, keys: Vec<SchemaId>) -> Self {
        self.signature = keys;
        self
    }

    /// Set the sort order.
    #[must_use]
    pub const fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Mark the type invisible.
    #[must_use]
    pub const fn invisible(mut self) -> Self {
        self.invisible = true;
        self
    }

    /// Set the time-to-live in seconds.
    #[must_use]
    pub const fn with_ttl(mut self, seconds: u32) -> Self {
        self.ttl = Some(seconds);
        self
    }

    /// Whether this type keys properties.
    #[must_use]
    pub const fn is_property_key(&self) -> bool {
        matches!(self.category, RelationCategory::PropertyKey(_))
    }

    /// Declared data type, for property keys.
    #[must_use]
    pub const fn data_type(&self) -> Option<DataType> {
        match self.category {
            RelationCategory::PropertyKey(dt) => Some(dt),
            RelationCategory::EdgeLabel => None,
        }
    }

    /// Property cardinality implied by the multiplicity.
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.multiplicity.cardinality()
    }
}

/// Metadata for a vertex label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLabel {
    /// Label id.
    pub id: SchemaId,
    /// Label name.
    pub name: String,
    /// Time-to-live in seconds for vertices with this label.
    pub ttl: Option<u32>,
}

impl VertexLabel {
    /// Create a label without TTL.
    #[must_use]
    pub fn new(id: SchemaId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), ttl: None }
    }

    /// Set the time-to-live in seconds.
    #[must_use]
    pub const fn with_ttl(mut self, seconds: u32) -> Self {
        self.ttl = Some(seconds);
        self
    }
}
