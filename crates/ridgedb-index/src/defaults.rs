//! Default fields of mixed index documents.
//!
//! Some keys (attachments, notes and the like) are indexed in every mixed
//! vertex index without being declared as index fields. They live under
//! reserved field names, and each backend index learns about one the first
//! time a value for it reaches that index.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError};

use ridgedb_core::{DataType, SchemaId};
use tracing::info;

use crate::cache::SchemaCache;
use crate::error::{BackendError, IndexResult};
use crate::index::{Mapping, MixedIndex};

/// Registers new fields with a search backend.
pub trait FieldRegistrar {
    /// Add `field` to the mapping of `index` in `store`.
    ///
    /// # Errors
    ///
    /// Returns a classified [`BackendError`] if the backend refuses.
    fn register_field(
        &self,
        store: &str,
        index: &str,
        field: &str,
        data_type: DataType,
        mapping: Mapping,
    ) -> Result<(), BackendError>;
}

/// A key indexed under a reserved field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultField {
    /// Property key.
    pub key: SchemaId,
    /// Reserved backend field name.
    pub name: String,
    /// Declared data type.
    pub data_type: DataType,
    /// String mapping mode.
    pub mapping: Mapping,
}

/// Store, index name and field name of one registration.
type Registration = (String, String, String);

/// Default fields and the backend indexes that already know them.
#[derive(Debug, Default)]
pub struct DefaultFieldRegistry {
    fields: BTreeMap<SchemaId, DefaultField>,
    registered: Mutex<HashSet<Registration>>,
}

impl DefaultFieldRegistry {
    /// A registry without default fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a default field.
    #[must_use]
    pub fn with_field(
        mut self,
        key: SchemaId,
        name: impl Into<String>,
        data_type: DataType,
        mapping: Mapping,
    ) -> Self {
        self.fields.insert(key, DefaultField { key, name: name.into(), data_type, mapping });
        self
    }

    /// The default field over `key`, if any.
    #[must_use]
    pub fn field(&self, key: SchemaId) -> Option<&DefaultField> {
        self.fields.get(&key)
    }

    /// Whether index `index` in `store` already knows the field named `name`.
    #[must_use]
    pub fn is_registered(&self, store: &str, index: &str, name: &str) -> bool {
        let registered = self.registered.lock().unwrap_or_else(PoisonError::into_inner);
        registered.contains(&registration(store, index, name))
    }

    /// Default fields index `index` in `store` already knows.
    #[must_use]
    pub fn registered_fields(&self, store: &str, index: &str) -> Vec<&DefaultField> {
        let registered = self.registered.lock().unwrap_or_else(PoisonError::into_inner);
        self.fields
            .values()
            .filter(|f| registered.contains(&registration(store, index, &f.name)))
            .collect()
    }

    /// Make sure the backend index behind `index` knows `field`.
    ///
    /// Registrations are tracked per backend index, so every mixed index on
    /// a store gets its own mapping. On first sight the field is registered
    /// synchronously through `registrar` and the index's cached field names
    /// are expired. Returns whether a registration happened.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Backend`](crate::IndexError::Backend) if the
    /// registration fails; the field stays unregistered.
    pub fn ensure_registered(
        &self,
        index: &MixedIndex,
        field: &DefaultField,
        registrar: &dyn FieldRegistrar,
        cache: &SchemaCache,
    ) -> IndexResult<bool> {
        let mut registered = self.registered.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = registration(&index.store, &index.name, &field.name);
        if registered.contains(&entry) {
            return Ok(false);
        }
        registrar.register_field(
            &index.store,
            &index.name,
            &field.name,
            field.data_type,
            field.mapping,
        )?;
        registered.insert(entry);
        drop(registered);

        cache.expire(index.id);
        info!(
            store = %index.store,
            index = %index.name,
            field = %field.name,
            "registered default field"
        );
        Ok(true)
    }
}

fn registration(store: &str, index: &str, field: &str) -> Registration {
    (store.to_owned(), index.to_owned(), field.to_owned())
}
