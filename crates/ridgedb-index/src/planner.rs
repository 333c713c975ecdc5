//! Index updates for graph mutations.
//!
//! The planner is stateless apart from its injected collaborators. For
//! each mutated property it visits every index over the property's key
//! that covers the element:
//!
//! - composite indexes get one update per matched record
//! - mixed indexes get one document-field update per property
//!
//! Disabled indexes and fields are skipped. Default fields are routed into
//! every mixed vertex index of the element, registering them with the
//! backend first when an index has not seen them yet.

use std::collections::BTreeMap;

use ridgedb_core::schema::ImplicitKey;
use ridgedb_core::{ElementCategory, Relation, SchemaId, TypeInspector, Value, VertexProperty};
use tracing::debug;

use crate::cache::SchemaCache;
use crate::config::IndexConfig;
use crate::defaults::{DefaultField, DefaultFieldRegistry, FieldRegistrar};
use crate::document::AuxiliaryKeys;
use crate::error::IndexResult;
use crate::index::{
    CompositeIndex, CompositeKeyCodec, ElementRef, IndexCatalog, IndexDefinition, IndexMatcher,
    MixedIndex, RecordEntry, Substitute, VertexState,
};
use crate::update::{min_ttl, CompositeUpdate, IndexUpdate, IndexUpdateSet, MixedUpdate, UpdateKind};

/// A graph change that may affect indexes.
#[derive(Clone, Copy)]
pub enum Mutation<'m> {
    /// An edge or property element was added or removed.
    Relation {
        /// The relation with all its properties.
        relation: &'m Relation,
        /// Added or removed.
        kind: UpdateKind,
    },
    /// A property was added to or removed from a vertex.
    VertexProperty {
        /// The vertex as seen by the transaction.
        vertex: &'m dyn VertexState,
        /// The property.
        property: &'m VertexProperty,
        /// Added or removed.
        kind: UpdateKind,
    },
}

/// Turns mutations into [`IndexUpdate`]s.
pub struct IndexUpdatePlanner<'a> {
    catalog: &'a IndexCatalog,
    types: &'a dyn TypeInspector,
    cache: &'a SchemaCache,
    defaults: &'a DefaultFieldRegistry,
    registrar: Option<&'a dyn FieldRegistrar>,
    keys: CompositeKeyCodec,
    auxiliary: AuxiliaryKeys,
}

impl<'a> IndexUpdatePlanner<'a> {
    /// Create a planner over `catalog`.
    ///
    /// Without a registrar, default fields are not indexed.
    #[must_use]
    pub fn new(
        catalog: &'a IndexCatalog,
        types: &'a dyn TypeInspector,
        cache: &'a SchemaCache,
        defaults: &'a DefaultFieldRegistry,
        config: &IndexConfig,
    ) -> Self {
        Self {
            catalog,
            types,
            cache,
            defaults,
            registrar: None,
            keys: CompositeKeyCodec::from_config(config),
            auxiliary: AuxiliaryKeys::default(),
        }
    }

    /// Set the meta-property keys feeding auxiliary sub-fields.
    #[must_use]
    pub const fn with_auxiliary(mut self, auxiliary: AuxiliaryKeys) -> Self {
        self.auxiliary = auxiliary;
        self
    }

    /// Set the backend used to register default fields.
    #[must_use]
    pub fn with_registrar(mut self, registrar: &'a dyn FieldRegistrar) -> Self {
        self.registrar = Some(registrar);
        self
    }

    /// Updates caused by `mutation`.
    ///
    /// # Errors
    ///
    /// - [`IndexError::Core`](crate::IndexError::Core) if a key is unknown
    ///   or a value does not fit its key
    /// - [`IndexError::SchemaViolation`](crate::IndexError::SchemaViolation)
    ///   if an external mapping lacks an indexed key
    /// - [`IndexError::Backend`](crate::IndexError::Backend) if a default
    ///   field cannot be registered
    pub fn plan(&self, mutation: Mutation<'_>) -> IndexResult<IndexUpdateSet> {
        let mut updates = IndexUpdateSet::new();
        self.plan_into(mutation, &mut updates)?;
        Ok(updates)
    }

    /// Add the updates caused by `mutation` to `updates`.
    ///
    /// # Errors
    ///
    /// Same as [`plan`](Self::plan).
    pub fn plan_into(
        &self,
        mutation: Mutation<'_>,
        updates: &mut IndexUpdateSet,
    ) -> IndexResult<()> {
        let before = updates.len();
        match mutation {
            Mutation::Relation { relation, kind } => self.plan_relation(relation, kind, updates)?,
            Mutation::VertexProperty { vertex, property, kind } => {
                self.plan_vertex_property(vertex, property, kind, updates)?;
            }
        }
        debug!(planned = updates.len() - before, "planned index updates");
        Ok(())
    }

    fn plan_relation(
        &self,
        relation: &Relation,
        kind: UpdateKind,
        updates: &mut IndexUpdateSet,
    ) -> IndexResult<()> {
        let category = relation.category();
        let label_ttl = self.types.existing_type(relation.type_id)?.ttl;
        let element = ElementRef::Relation(relation.identifier());

        for (key, value) in &relation.properties {
            if ImplicitKey::is_reserved(*key) {
                continue;
            }
            for def in self.catalog.indexes_for_key(*key) {
                if !def.applies_to(category, Some(relation.type_id)) {
                    continue;
                }
                match def {
                    IndexDefinition::Composite(index) => {
                        if !index.status.is_maintained() {
                            debug!(index = %index.name, "skipping disabled composite index");
                            continue;
                        }
                        if let Some(record) = IndexMatcher::match_relation(relation, index) {
                            let element = element.clone();
                            let update =
                                self.composite_update(index, &record, element, kind, label_ttl)?;
                            updates.insert(update);
                        }
                    }
                    IndexDefinition::Mixed(index) => {
                        if let Some(update) = self.mixed_update(
                            index,
                            *key,
                            value,
                            &relation.properties,
                            &element,
                            kind,
                            label_ttl,
                        )? {
                            updates.insert(update);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn plan_vertex_property(
        &self,
        vertex: &dyn VertexState,
        property: &VertexProperty,
        kind: UpdateKind,
        updates: &mut IndexUpdateSet,
    ) -> IndexResult<()> {
        let label = vertex.label();
        let label_ttl = label.and_then(|l| self.types.vertex_label(l)).and_then(|l| l.ttl);
        let element = ElementRef::Vertex(vertex.vertex_id().clone());
        let key = property.key;

        for def in self.catalog.indexes_for_key(key) {
            if !def.applies_to(ElementCategory::Vertex, label) {
                continue;
            }
            match def {
                IndexDefinition::Composite(index) => {
                    if !index.status.is_maintained() {
                        debug!(index = %index.name, "skipping disabled composite index");
                        continue;
                    }
                    let substitute =
                        Substitute { key, relation_id: &property.id, value: &property.value };
                    for record in IndexMatcher::match_vertex(vertex, index, Some(substitute)) {
                        let element = element.clone();
                        let update =
                            self.composite_update(index, &record, element, kind, label_ttl)?;
                        updates.insert(update);
                    }
                }
                IndexDefinition::Mixed(index) => {
                    if let Some(update) = self.mixed_update(
                        index,
                        key,
                        &property.value,
                        &property.meta,
                        &element,
                        kind,
                        label_ttl,
                    )? {
                        updates.insert(update);
                    }
                }
            }
        }

        if let Some(field) = self.defaults.field(key) {
            self.plan_default_field(field, property, label, &element, kind, label_ttl, updates)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn plan_default_field(
        &self,
        field: &DefaultField,
        property: &VertexProperty,
        label: Option<SchemaId>,
        element: &ElementRef,
        kind: UpdateKind,
        label_ttl: Option<u32>,
        updates: &mut IndexUpdateSet,
    ) -> IndexResult<()> {
        let Some(registrar) = self.registrar else {
            debug!(field = %field.name, "no registrar; default field not indexed");
            return Ok(());
        };
        let cardinality = self.types.existing_type(field.key)?.cardinality();
        let key_ttl = self.types.existing_type(field.key)?.ttl;
        for index in self.catalog.mixed_indexes() {
            let declared = index.field(field.key).is_some();
            if declared || !index.applies_to(ElementCategory::Vertex, label) {
                continue;
            }
            if kind == UpdateKind::Add {
                self.defaults.ensure_registered(index, field, registrar, self.cache)?;
            }
            updates.insert(IndexUpdate::Mixed(MixedUpdate {
                index: index.id,
                store: index.store.clone(),
                element: element.clone(),
                field: field.name.clone(),
                cardinality,
                kind,
                value: self.auxiliary.field_value(&property.value, &property.meta),
                ttl: ttl_for(kind, [label_ttl, key_ttl]),
            }));
        }
        Ok(())
    }

    fn composite_update(
        &self,
        index: &CompositeIndex,
        record: &[RecordEntry],
        element: ElementRef,
        kind: UpdateKind,
        label_ttl: Option<u32>,
    ) -> IndexResult<IndexUpdate> {
        let key = self.keys.record_key(index, record, self.types)?;
        let entry = self.keys.build_entry(index, record, &element)?;
        let mut ttls = vec![label_ttl];
        for e in record {
            ttls.push(self.types.existing_type(e.key)?.ttl);
        }
        Ok(IndexUpdate::Composite(CompositeUpdate {
            index: index.id,
            kind,
            key,
            entry,
            element,
            ttl: ttl_for(kind, ttls),
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn mixed_update(
        &self,
        index: &MixedIndex,
        key: SchemaId,
        value: &Value,
        meta: &BTreeMap<SchemaId, Value>,
        element: &ElementRef,
        kind: UpdateKind,
        label_ttl: Option<u32>,
    ) -> IndexResult<Option<IndexUpdate>> {
        let Some(field) = index.field(key) else {
            return Ok(None);
        };
        if !field.status.is_maintained() {
            debug!(index = %index.name, key = %key, "skipping disabled mixed index field");
            return Ok(None);
        }
        let name = self.cache.resolve(index, key, self.types, self.defaults)?;
        let ty = self.types.existing_type(key)?;
        Ok(Some(IndexUpdate::Mixed(MixedUpdate {
            index: index.id,
            store: index.store.clone(),
            element: element.clone(),
            field: name,
            cardinality: ty.cardinality(),
            kind,
            value: self.auxiliary.field_value(value, meta),
            ttl: ttl_for(kind, [label_ttl, ty.ttl]),
        })))
    }
}

fn ttl_for(kind: UpdateKind, ttls: impl IntoIterator<Item = Option<u32>>) -> Option<u32> {
    match kind {
        UpdateKind::Add => min_ttl(ttls),
        UpdateKind::Delete => None,
    }
}
