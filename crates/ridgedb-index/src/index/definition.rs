//! Composite and mixed index definitions.

use ridgedb_core::{Cardinality, ElementCategory, SchemaId};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an index or index field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IndexStatus {
    /// Created, not yet known to every instance.
    Installed,
    /// Known everywhere, not yet reindexed.
    Registered,
    /// Maintained and queryable.
    #[default]
    Enabled,
    /// Neither maintained nor queryable.
    Disabled,
}

impl IndexStatus {
    /// Whether updates should be produced for this index or field.
    #[must_use]
    pub const fn is_maintained(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Get a string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Registered => "registered",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

/// How a string field is mapped in the search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mapping {
    /// Backend default; analyzed text for strings.
    #[default]
    Default,
    /// Analyzed, for full-text search.
    Text,
    /// Exact value, for comparisons and patterns.
    String,
    /// Both: analyzed field plus an exact sub-field.
    TextString,
}

impl Mapping {
    /// Whether contains-family predicates are answerable.
    #[must_use]
    pub const fn is_analyzed(self) -> bool {
        !matches!(self, Self::String)
    }

    /// Whether exact comparisons and patterns are answerable.
    #[must_use]
    pub const fn is_exact(self) -> bool {
        matches!(self, Self::String | Self::TextString)
    }
}

/// Who owns a mixed index's backend mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MappingSource {
    /// Registered by this system; unmapped keys get derived field names.
    #[default]
    Managed,
    /// Pre-registered outside this system; every key must be mapped.
    External,
}

/// An exact-match index stored alongside the primary records.
///
/// The field order is part of the index identity and never changes after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeIndex {
    /// Index id; the first component of every key.
    pub id: SchemaId,
    /// Unique name.
    pub name: String,
    /// Kind of element indexed.
    pub element: ElementCategory,
    /// Indexed property keys, in key order.
    pub fields: Vec<SchemaId>,
    /// How many elements may share one key.
    pub cardinality: Cardinality,
    /// Lifecycle state.
    pub status: IndexStatus,
    /// Restricts the index to one vertex label or relation type.
    pub label: Option<SchemaId>,
}

impl CompositeIndex {
    /// Start building a composite index.
    #[must_use]
    pub fn builder(
        id: SchemaId,
        name: impl Into<String>,
        element: ElementCategory,
    ) -> CompositeIndexBuilder {
        CompositeIndexBuilder::new(id, name, element)
    }

    /// Whether the index covers an element of `category` carrying `label`.
    #[must_use]
    pub fn applies_to(&self, category: ElementCategory, label: Option<SchemaId>) -> bool {
        covers(self.element, self.label, category, label)
    }

    /// Position of `key` in the field list.
    #[must_use]
    pub fn field_position(&self, key: SchemaId) -> Option<usize> {
        self.fields.iter().position(|f| *f == key)
    }
}

/// Builder for [`CompositeIndex`].
#[derive(Debug, Clone)]
pub struct CompositeIndexBuilder {
    index: CompositeIndex,
}

impl CompositeIndexBuilder {
    /// Create a builder for a non-unique, enabled index with no fields.
    #[must_use]
    pub fn new(id: SchemaId, name: impl Into<String>, element: ElementCategory) -> Self {
        Self {
            index: CompositeIndex {
                id,
                name: name.into(),
                element,
                fields: Vec::new(),
                cardinality: Cardinality::List,
                status: IndexStatus::Enabled,
                label: None,
            },
        }
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, key: SchemaId) -> Self {
        self.index.fields.push(key);
        self
    }

    /// Set all fields at once.
    #[must_use]
    pub fn fields(mut self, keys: impl IntoIterator<Item = SchemaId>) -> Self {
        self.index.fields = keys.into_iter().collect();
        self
    }

    /// Set the cardinality. `Single` makes the index unique.
    #[must_use]
    pub const fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.index.cardinality = cardinality;
        self
    }

    /// Make the index unique.
    #[must_use]
    pub const fn unique(self) -> Self {
        self.cardinality(Cardinality::Single)
    }

    /// Set the lifecycle state.
    #[must_use]
    pub const fn status(mut self, status: IndexStatus) -> Self {
        self.index.status = status;
        self
    }

    /// Restrict the index to a label or relation type.
    #[must_use]
    pub const fn label(mut self, label: SchemaId) -> Self {
        self.index.label = Some(label);
        self
    }

    /// Build the index definition.
    #[must_use]
    pub fn build(self) -> CompositeIndex {
        self.index
    }
}

/// One field of a mixed index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedField {
    /// Indexed property key.
    pub key: SchemaId,
    /// Lifecycle state of this field.
    pub status: IndexStatus,
    /// String mapping mode.
    pub mapping: Mapping,
    /// Backend field name, when not derived from the key name.
    pub mapped_name: Option<String>,
}

impl MixedField {
    /// An enabled field with the default mapping.
    #[must_use]
    pub const fn new(key: SchemaId) -> Self {
        Self { key, status: IndexStatus::Enabled, mapping: Mapping::Default, mapped_name: None }
    }

    /// Set the string mapping.
    #[must_use]
    pub const fn mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Set the lifecycle state.
    #[must_use]
    pub const fn status(mut self, status: IndexStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the backend field name.
    #[must_use]
    pub fn mapped_name(mut self, name: impl Into<String>) -> Self {
        self.mapped_name = Some(name.into());
        self
    }
}

/// An index delegated to an external search backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedIndex {
    /// Index id.
    pub id: SchemaId,
    /// Unique name; also the document collection name in the backend.
    pub name: String,
    /// Backing store name.
    pub store: String,
    /// Kind of element indexed.
    pub element: ElementCategory,
    /// Indexed fields. May grow after creation.
    pub fields: Vec<MixedField>,
    /// Restricts the index to one vertex label or relation type.
    pub label: Option<SchemaId>,
    /// Who owns the backend mapping.
    pub source: MappingSource,
}

impl MixedIndex {
    /// Start building a mixed index.
    #[must_use]
    pub fn builder(
        id: SchemaId,
        name: impl Into<String>,
        store: impl Into<String>,
        element: ElementCategory,
    ) -> MixedIndexBuilder {
        MixedIndexBuilder {
            index: Self {
                id,
                name: name.into(),
                store: store.into(),
                element,
                fields: Vec::new(),
                label: None,
                source: MappingSource::Managed,
            },
        }
    }

    /// The field over `key`, if any.
    #[must_use]
    pub fn field(&self, key: SchemaId) -> Option<&MixedField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Whether the index covers an element of `category` carrying `label`.
    #[must_use]
    pub fn applies_to(&self, category: ElementCategory, label: Option<SchemaId>) -> bool {
        covers(self.element, self.label, category, label)
    }
}

/// Builder for [`MixedIndex`].
#[derive(Debug, Clone)]
pub struct MixedIndexBuilder {
    index: MixedIndex,
}

impl MixedIndexBuilder {
    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: MixedField) -> Self {
        self.index.fields.push(field);
        self
    }

    /// Restrict the index to a label or relation type.
    #[must_use]
    pub const fn label(mut self, label: SchemaId) -> Self {
        self.index.label = Some(label);
        self
    }

    /// Set the mapping source.
    #[must_use]
    pub const fn source(mut self, source: MappingSource) -> Self {
        self.index.source = source;
        self
    }

    /// Build the index definition.
    #[must_use]
    pub fn build(self) -> MixedIndex {
        self.index
    }
}

/// Either kind of index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexDefinition {
    /// Exact-match index in the primary store.
    Composite(CompositeIndex),
    /// Search-backend index.
    Mixed(MixedIndex),
}

impl IndexDefinition {
    /// Index id.
    #[must_use]
    pub const fn id(&self) -> SchemaId {
        match self {
            Self::Composite(c) => c.id,
            Self::Mixed(m) => m.id,
        }
    }

    /// Index name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Composite(c) => &c.name,
            Self::Mixed(m) => &m.name,
        }
    }

    /// Kind of element indexed.
    #[must_use]
    pub const fn element(&self) -> ElementCategory {
        match self {
            Self::Composite(c) => c.element,
            Self::Mixed(m) => m.element,
        }
    }

    /// Label or relation type constraint.
    #[must_use]
    pub const fn label(&self) -> Option<SchemaId> {
        match self {
            Self::Composite(c) => c.label,
            Self::Mixed(m) => m.label,
        }
    }

    /// Indexed property keys.
    #[must_use]
    pub fn keys(&self) -> Vec<SchemaId> {
        match self {
            Self::Composite(c) => c.fields.clone(),
            Self::Mixed(m) => m.fields.iter().map(|f| f.key).collect(),
        }
    }

    /// Whether the index covers an element of `category` carrying `label`.
    ///
    /// An unconstrained index applies to every element of its category.
    #[must_use]
    pub fn applies_to(&self, category: ElementCategory, label: Option<SchemaId>) -> bool {
        covers(self.element(), self.label(), category, label)
    }
}

/// An unconstrained index applies to every element of its category.
fn covers(
    element: ElementCategory,
    constraint: Option<SchemaId>,
    category: ElementCategory,
    label: Option<SchemaId>,
) -> bool {
    element == category && constraint.map_or(true, |l| Some(l) == label)
}
