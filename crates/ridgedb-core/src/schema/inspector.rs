//! Type resolution seam and an in-memory schema.
//!
//! Codecs never own schema state; they resolve type ids through a
//! [`TypeInspector`]. [`Schema`] is a validated in-memory implementation,
//! suitable for embedding and for tests.
//!
//! # Example
//!
//! ```
//! use ridgedb_core::schema::{Cardinality, RelationType, Schema, TypeInspector};
//! use ridgedb_core::types::{DataType, SchemaId};
//!
//! let mut schema = Schema::new();
//! schema
//!     .add_type(RelationType::property_key(SchemaId::new(20), "name", DataType::String))
//!     .unwrap();
//! schema
//!     .add_type(
//!         RelationType::property_key(SchemaId::new(21), "alias", DataType::String)
//!             .with_cardinality(Cardinality::Set),
//!     )
//!     .unwrap();
//!
//! assert_eq!(schema.type_by_name("alias").map(|t| t.id), Some(SchemaId::new(21)));
//! assert!(schema.existing_type(SchemaId::new(99)).is_err());
//! ```

use std::collections::BTreeMap;

use super::{ImplicitKey, RelationType, VertexLabel};
use crate::error::{CoreError, CoreResult};
use crate::types::{DataType, SchemaId};

/// Resolves schema ids to type metadata.
pub trait TypeInspector {
    /// Metadata of a relation type, if known.
    fn relation_type(&self, id: SchemaId) -> Option<&RelationType>;

    /// Metadata of a relation type looked up by name.
    fn type_by_name(&self, name: &str) -> Option<&RelationType>;

    /// Metadata of a vertex label, if known.
    fn vertex_label(&self, id: SchemaId) -> Option<&VertexLabel>;

    /// Metadata of a relation type that must exist.
    fn existing_type(&self, id: SchemaId) -> CoreResult<&RelationType> {
        self.relation_type(id).ok_or(CoreError::UnknownType(id))
    }

    /// Declared data type of a property key that must exist.
    ///
    /// Implicit keys resolve to their fixed data types.
    fn key_data_type(&self, id: SchemaId) -> CoreResult<DataType> {
        if let Some(implicit) = ImplicitKey::from_id(id) {
            return Ok(implicit.data_type());
        }
        self.existing_type(id)?.data_type().ok_or_else(|| {
            CoreError::Validation(format!("relation type {id} is not a property key"))
        })
    }
}

/// Validated in-memory schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: BTreeMap<SchemaId, RelationType>,
    labels: BTreeMap<SchemaId, VertexLabel>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relation type.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the id is reserved, too large or
    /// taken, the name is taken, or the sort key / signature reference
    /// unknown, edge-label or generic keys. Constrained types may not have
    /// a sort key.
    pub fn add_type(&mut self, ty: RelationType) -> CoreResult<()> {
        if ImplicitKey::is_reserved(ty.id) {
            return Err(CoreError::Validation(format!("type id {} is reserved", ty.id)));
        }
        if ty.id.as_u64() > SchemaId::MAX {
            return Err(CoreError::Validation(format!("type id {} is out of range", ty.id)));
        }
        if self.types.contains_key(&ty.id) || self.labels.contains_key(&ty.id) {
            return Err(CoreError::Validation(format!("type id {} already registered", ty.id)));
        }
        if self.type_by_name(&ty.name).is_some() {
            return Err(CoreError::Validation(format!(
                "type name '{}' already registered",
                ty.name
            )));
        }
        if ty.multiplicity.is_constrained() && !ty.sort_key.is_empty() {
            return Err(CoreError::Validation(format!(
                "constrained type '{}' cannot declare a sort key",
                ty.name
            )));
        }
        for key in ty.sort_key.iter().chain(&ty.signature) {
            let data_type = self.key_data_type(*key)?;
            if data_type == DataType::Generic {
                return Err(CoreError::Validation(format!(
                    "generic key {key} cannot be inlined into '{}'",
                    ty.name
                )));
            }
        }
        self.types.insert(ty.id, ty);
        Ok(())
    }

    /// Register a vertex label.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the id is already in use.
    pub fn add_vertex_label(&mut self, label: VertexLabel) -> CoreResult<()> {
        if self.types.contains_key(&label.id) || self.labels.contains_key(&label.id) {
            return Err(CoreError::Validation(format!("label id {} already registered", label.id)));
        }
        self.labels.insert(label.id, label);
        Ok(())
    }

    /// Number of registered relation types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no relation types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeInspector for Schema {
    fn relation_type(&self, id: SchemaId) -> Option<&RelationType> {
        self.types.get(&id)
    }

    fn type_by_name(&self, name: &str) -> Option<&RelationType> {
        self.types.values().find(|t| t.name == name)
    }

    fn vertex_label(&self, id: SchemaId) -> Option<&VertexLabel> {
        self.labels.get(&id)
    }
}
