//! In-memory catalog of index definitions.
//!
//! # Example
//!
//! ```
//! use ridgedb_core::{ElementCategory, SchemaId};
//! use ridgedb_index::{CompositeIndex, IndexCatalog};
//!
//! let name = SchemaId::new(20);
//! let mut catalog = IndexCatalog::new();
//! let by_name =
//!     CompositeIndex::builder(SchemaId::new(100), "by_name", ElementCategory::Vertex).field(name);
//! catalog.create_index(by_name.build().into()).unwrap();
//!
//! assert_eq!(catalog.indexes_for_key(name).len(), 1);
//! assert!(catalog.get_by_name("by_name").is_some());
//! ```

use std::collections::{BTreeMap, HashMap};

use ridgedb_core::{CoreError, SchemaId};

use super::definition::{CompositeIndex, IndexDefinition, MixedField, MixedIndex};
use crate::error::{IndexError, IndexResult};

impl From<CompositeIndex> for IndexDefinition {
    fn from(index: CompositeIndex) -> Self {
        Self::Composite(index)
    }
}

impl From<MixedIndex> for IndexDefinition {
    fn from(index: MixedIndex) -> Self {
        Self::Mixed(index)
    }
}

/// Index definitions with lookup by id, name and indexed key.
///
/// The catalog itself is not thread-safe. Wrap it in a `RwLock` for
/// concurrent access.
#[derive(Debug, Default)]
pub struct IndexCatalog {
    by_id: BTreeMap<SchemaId, IndexDefinition>,
    by_name: HashMap<String, SchemaId>,
    by_key: BTreeMap<SchemaId, Vec<SchemaId>>,
}

impl IndexCatalog {
    /// Create a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an index definition.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the name is empty or taken, the
    /// id is taken, there are no fields, or a key appears twice.
    pub fn create_index(&mut self, def: IndexDefinition) -> IndexResult<()> {
        let invalid = |msg: String| IndexError::Core(CoreError::Validation(msg));
        if def.name().is_empty() {
            return Err(invalid("index name cannot be empty".into()));
        }
        let keys = def.keys();
        if keys.is_empty() {
            return Err(invalid(format!("index '{}' must have at least one field", def.name())));
        }
        for (i, key) in keys.iter().enumerate() {
            if keys[..i].contains(key) {
                return Err(invalid(format!("index '{}' lists key {key} twice", def.name())));
            }
        }
        if self.by_name.contains_key(def.name()) {
            return Err(invalid(format!("index '{}' already exists", def.name())));
        }
        if self.by_id.contains_key(&def.id()) {
            return Err(invalid(format!("index id {} already in use", def.id())));
        }

        let id = def.id();
        for key in keys {
            self.by_key.entry(key).or_default().push(id);
        }
        self.by_name.insert(def.name().to_owned(), id);
        self.by_id.insert(id, def);
        Ok(())
    }

    /// Add a field to an existing mixed index.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnknownIndex`] if `index` is not a mixed index,
    /// or [`CoreError::Validation`] if the key is already indexed.
    pub fn add_mixed_field(&mut self, index: SchemaId, field: MixedField) -> IndexResult<()> {
        let Some(IndexDefinition::Mixed(mixed)) = self.by_id.get_mut(&index) else {
            return Err(IndexError::unknown_id(index));
        };
        if mixed.field(field.key).is_some() {
            return Err(IndexError::Core(CoreError::Validation(format!(
                "key {} already indexed by '{}'",
                field.key, mixed.name
            ))));
        }
        self.by_key.entry(field.key).or_default().push(index);
        mixed.fields.push(field);
        Ok(())
    }

    /// Remove an index by name.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnknownIndex`] if no index has this name.
    pub fn drop_index(&mut self, name: &str) -> IndexResult<IndexDefinition> {
        let id = self.by_name.remove(name).ok_or_else(|| IndexError::UnknownIndex(name.into()))?;
        let def = self.by_id.remove(&id).ok_or_else(|| IndexError::unknown_id(id))?;
        for key in def.keys() {
            if let Some(ids) = self.by_key.get_mut(&key) {
                ids.retain(|i| *i != id);
                if ids.is_empty() {
                    self.by_key.remove(&key);
                }
            }
        }
        Ok(def)
    }

    /// Get an index definition by id.
    #[must_use]
    pub fn get(&self, id: SchemaId) -> Option<&IndexDefinition> {
        self.by_id.get(&id)
    }

    /// Get an index definition by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&IndexDefinition> {
        self.by_name.get(name).and_then(|id| self.by_id.get(id))
    }

    /// The composite index with this id.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnknownIndex`] if there is none.
    pub fn composite(&self, id: SchemaId) -> IndexResult<&CompositeIndex> {
        match self.by_id.get(&id) {
            Some(IndexDefinition::Composite(c)) => Ok(c),
            _ => Err(IndexError::unknown_id(id)),
        }
    }

    /// The mixed index with this id.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnknownIndex`] if there is none.
    pub fn mixed(&self, id: SchemaId) -> IndexResult<&MixedIndex> {
        match self.by_id.get(&id) {
            Some(IndexDefinition::Mixed(m)) => Ok(m),
            _ => Err(IndexError::unknown_id(id)),
        }
    }

    /// Indexes that include `key`, in id order.
    #[must_use]
    pub fn indexes_for_key(&self, key: SchemaId) -> Vec<&IndexDefinition> {
        self.by_key
            .get(&key)
            .map(|ids| {
                let mut defs: Vec<_> = ids.iter().filter_map(|id| self.by_id.get(id)).collect();
                defs.sort_by_key(|d| d.id());
                defs
            })
            .unwrap_or_default()
    }

    /// Mixed indexes in id order.
    pub fn mixed_indexes(&self) -> impl Iterator<Item = &MixedIndex> {
        self.by_id.values().filter_map(|d| match d {
            IndexDefinition::Mixed(m) => Some(m),
            IndexDefinition::Composite(_) => None,
        })
    }

    /// Number of indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
