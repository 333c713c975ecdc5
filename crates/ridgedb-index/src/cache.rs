//! Backend field names of mixed indexes.
//!
//! Resolving a key to its backend field name needs the index definition,
//! the schema and the default fields registered for the store. The
//! [`SchemaCache`] keeps the result per index until it is expired by id or
//! invalidated by store. Both entry points are idempotent, so concurrent
//! writers may issue them redundantly.
//!
//! Every expiry bumps a generation counter. A lookup that computed its
//! names under an older generation returns them without caching, so an
//! expiry racing a lookup is never undone.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ridgedb_core::{SchemaId, TypeInspector};
use tracing::debug;

use crate::defaults::DefaultFieldRegistry;
use crate::error::{IndexError, IndexResult};
use crate::index::{MappingSource, MixedIndex};

/// Resolved backend field names of one mixed index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    /// Backing store name.
    pub store: String,
    names: BTreeMap<SchemaId, String>,
}

impl FieldNames {
    /// Backend field name of `key`, if mapped.
    #[must_use]
    pub fn get(&self, key: SchemaId) -> Option<&str> {
        self.names.get(&key).map(String::as_str)
    }

    /// Key mapped to a backend field name.
    #[must_use]
    pub fn key_of(&self, field: &str) -> Option<SchemaId> {
        self.names.iter().find(|(_, name)| *name == field).map(|(key, _)| *key)
    }

    /// Number of mapped keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no key is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<SchemaId, Arc<FieldNames>>,
    generation: u64,
}

/// Thread-safe cache of [`FieldNames`] per mixed index.
#[derive(Debug, Default)]
pub struct SchemaCache {
    state: RwLock<CacheState>,
}

impl SchemaCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Field names of `index`, computed on first use.
    ///
    /// Fields without a mapped name are named after their key in managed
    /// indexes and left unmapped in external ones. Default fields
    /// registered with the index are included under their reserved
    /// names.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownType`](ridgedb_core::CoreError::UnknownType)
    /// if a managed field's key is not in the schema.
    pub fn field_names(
        &self,
        index: &MixedIndex,
        types: &dyn TypeInspector,
        defaults: &DefaultFieldRegistry,
    ) -> IndexResult<Arc<FieldNames>> {
        let generation = {
            let state = self.read();
            if let Some(names) = state.entries.get(&index.id) {
                return Ok(Arc::clone(names));
            }
            state.generation
        };

        let mut names = BTreeMap::new();
        for field in &index.fields {
            let name = match (&field.mapped_name, index.source) {
                (Some(name), _) => name.clone(),
                (None, MappingSource::Managed) => types.existing_type(field.key)?.name.clone(),
                (None, MappingSource::External) => continue,
            };
            names.insert(field.key, name);
        }
        for field in defaults.registered_fields(&index.store, &index.name) {
            names.entry(field.key).or_insert_with(|| field.name.clone());
        }
        let names = Arc::new(FieldNames { store: index.store.clone(), names });

        let mut state = self.write();
        if state.generation == generation {
            state.entries.insert(index.id, Arc::clone(&names));
            debug!(index = %index.name, fields = names.len(), "cached mixed index field names");
        } else {
            debug!(index = %index.name, "cache expired during lookup; names not cached");
        }
        Ok(names)
    }

    /// Backend field name of `key` in `index`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::SchemaViolation`] if the index's mapping is external
    ///   and does not map `key`
    /// - [`IndexError::InvalidQuery`] if a managed index does not cover `key`
    pub fn resolve(
        &self,
        index: &MixedIndex,
        key: SchemaId,
        types: &dyn TypeInspector,
        defaults: &DefaultFieldRegistry,
    ) -> IndexResult<String> {
        let names = self.field_names(index, types, defaults)?;
        match (names.get(key), index.source) {
            (Some(name), _) => Ok(name.to_owned()),
            (None, MappingSource::External) => Err(IndexError::SchemaViolation(format!(
                "key {key} is not mapped in external index '{}'",
                index.name
            ))),
            (None, MappingSource::Managed) => Err(IndexError::InvalidQuery(format!(
                "key {key} is not indexed by '{}'",
                index.name
            ))),
        }
    }

    /// Drop the entry of index `id`. Returns whether one was present.
    pub fn expire(&self, id: SchemaId) -> bool {
        let mut state = self.write();
        state.generation += 1;
        let removed = state.entries.remove(&id).is_some();
        if removed {
            debug!(index = %id, "expired mixed index field names");
        }
        removed
    }

    /// Drop the entries of every index backed by `store`. Returns how many.
    pub fn invalidate(&self, store: &str) -> usize {
        let mut state = self.write();
        state.generation += 1;
        let before = state.entries.len();
        state.entries.retain(|_, names| names.store != store);
        let removed = before - state.entries.len();
        if removed > 0 {
            debug!(store, removed, "invalidated mixed index field names");
        }
        removed
    }

    /// Number of cached indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use ridgedb_core::schema::VertexLabel;
    use ridgedb_core::{DataType, ElementCategory, RelationType, Schema};

    use super::*;
    use crate::defaults::FieldRegistrar;
    use crate::error::BackendError;
    use crate::index::{Mapping, MixedField};

    const NAME: SchemaId = SchemaId::new(20);
    const BIO: SchemaId = SchemaId::new(21);
    const NOTES: SchemaId = SchemaId::new(22);

    fn schema() -> Schema {
        let mut s = Schema::new();
        s.add_type(RelationType::property_key(NAME, "name", DataType::String)).unwrap();
        s.add_type(RelationType::property_key(BIO, "bio", DataType::String)).unwrap();
        s.add_type(RelationType::property_key(NOTES, "notes", DataType::String)).unwrap();
        s
    }

    fn index(id: u64, store: &str, source: MappingSource) -> MixedIndex {
        let name = format!("search{id}");
        MixedIndex::builder(SchemaId::new(id), name, store, ElementCategory::Vertex)
            .field(MixedField::new(NAME))
            .field(MixedField::new(BIO).mapped_name("biography"))
            .source(source)
            .build()
    }

    #[test]
    fn managed_names_derive_from_keys() {
        let cache = SchemaCache::new();
        let defaults = DefaultFieldRegistry::new();
        let idx = index(200, "es", MappingSource::Managed);
        let names = cache.field_names(&idx, &schema(), &defaults).unwrap();
        assert_eq!(names.get(NAME), Some("name"));
        assert_eq!(names.get(BIO), Some("biography"));
        assert_eq!(names.key_of("biography"), Some(BIO));
        assert_eq!(cache.len(), 1);
        assert!(matches!(
            cache.resolve(&idx, NOTES, &schema(), &defaults),
            Err(IndexError::InvalidQuery(_))
        ));
    }

    #[test]
    fn external_unmapped_key_is_schema_violation() {
        let cache = SchemaCache::new();
        let defaults = DefaultFieldRegistry::new();
        let idx = index(201, "es", MappingSource::External);
        assert_eq!(cache.resolve(&idx, BIO, &schema(), &defaults).unwrap(), "biography");
        assert!(matches!(
            cache.resolve(&idx, NAME, &schema(), &defaults),
            Err(IndexError::SchemaViolation(_))
        ));
    }

    #[test]
    fn expire_and_invalidate_are_idempotent() {
        let cache = SchemaCache::new();
        let defaults = DefaultFieldRegistry::new();
        let s = schema();
        cache.field_names(&index(200, "es", MappingSource::Managed), &s, &defaults).unwrap();
        cache.field_names(&index(201, "es", MappingSource::Managed), &s, &defaults).unwrap();
        cache.field_names(&index(202, "solr", MappingSource::Managed), &s, &defaults).unwrap();

        assert!(cache.expire(SchemaId::new(202)));
        assert!(!cache.expire(SchemaId::new(202)));
        assert_eq!(cache.invalidate("es"), 2);
        assert_eq!(cache.invalidate("es"), 0);
        assert!(cache.is_empty());
    }

    struct Accept;

    impl FieldRegistrar for Accept {
        fn register_field(
            &self,
            _store: &str,
            _index: &str,
            _field: &str,
            _data_type: DataType,
            _mapping: Mapping,
        ) -> Result<(), BackendError> {
            Ok(())
        }
    }

    /// Registers the notes field the first time a type is looked up, as a
    /// concurrent writer would while a lookup is computing names.
    struct Interleaved<'a> {
        schema: Schema,
        cache: &'a SchemaCache,
        defaults: &'a DefaultFieldRegistry,
        index: &'a MixedIndex,
        fired: Cell<bool>,
    }

    impl TypeInspector for Interleaved<'_> {
        fn relation_type(&self, id: SchemaId) -> Option<&RelationType> {
            if !self.fired.replace(true) {
                let field = self.defaults.field(NOTES)?;
                self.defaults.ensure_registered(self.index, field, &Accept, self.cache).ok()?;
            }
            self.schema.relation_type(id)
        }

        fn type_by_name(&self, name: &str) -> Option<&RelationType> {
            self.schema.type_by_name(name)
        }

        fn vertex_label(&self, id: SchemaId) -> Option<&VertexLabel> {
            self.schema.vertex_label(id)
        }
    }

    #[test]
    fn expiry_during_lookup_is_not_undone() {
        let cache = SchemaCache::new();
        let defaults = DefaultFieldRegistry::new().with_field(
            NOTES,
            "__notes",
            DataType::String,
            Mapping::Text,
        );
        let idx = index(200, "es", MappingSource::Managed);
        let types = Interleaved {
            schema: schema(),
            cache: &cache,
            defaults: &defaults,
            index: &idx,
            fired: Cell::new(false),
        };

        cache.field_names(&idx, &types, &defaults).unwrap();
        assert!(types.fired.get());
        assert!(cache.is_empty());
        assert_eq!(cache.resolve(&idx, NOTES, &types, &defaults).unwrap(), "__notes");
        assert_eq!(cache.len(), 1);
    }
}
