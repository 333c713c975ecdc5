//! `RidgeDB` Index
//!
//! Secondary indexes over the graph stored by `ridgedb-core`.
//!
//! # Overview
//!
//! - **Definitions**: [`CompositeIndex`] (exact match, stored next to the
//!   graph) and [`MixedIndex`] (delegated to a search backend), kept in an
//!   [`IndexCatalog`]
//! - **Maintenance**: the [`IndexUpdatePlanner`] turns one mutation into an
//!   [`IndexUpdateSet`]; composite keys come from the [`CompositeKeyCodec`]
//!   and the [`IndexMatcher`], mixed documents from [`MixedDocument`]
//! - **Queries**: the [`IndexQueryTranslator`] lowers a [`Condition`] to
//!   composite keys or a search backend query
//! - **Bulk writes**: [`IndexBatch`] with an injected [`ResourcePressure`]
//!
//! # Example
//!
//! ```
//! use ridgedb_core::{
//!     DataType, ElementCategory, RelationType, Schema, SchemaId, Vertex, VertexProperty,
//! };
//! use ridgedb_index::{
//!     CompositeIndex, Condition, DefaultFieldRegistry, IndexCatalog, IndexConfig,
//!     IndexQueryTranslator, IndexUpdatePlanner, Mutation, SchemaCache, TranslatedQuery,
//!     UpdateKind,
//! };
//!
//! let name = SchemaId::new(20);
//! let mut schema = Schema::new();
//! schema.add_type(RelationType::property_key(name, "name", DataType::String)).unwrap();
//!
//! let mut catalog = IndexCatalog::new();
//! catalog
//!     .create_index(
//!         CompositeIndex::builder(SchemaId::new(100), "by_name", ElementCategory::Vertex)
//!             .field(name)
//!             .build()
//!             .into(),
//!     )
//!     .unwrap();
//!
//! let (cache, defaults, config) =
//!     (SchemaCache::new(), DefaultFieldRegistry::new(), IndexConfig::new());
//! let property = VertexProperty::new("p1", name, "ann");
//! let vertex = Vertex::new("v1").with_property(property.clone());
//!
//! let planner = IndexUpdatePlanner::new(&catalog, &schema, &cache, &defaults, &config);
//! let mutation =
//!     Mutation::VertexProperty { vertex: &vertex, property: &property, kind: UpdateKind::Add };
//! let updates = planner.plan(mutation).unwrap();
//! assert_eq!(updates.len(), 1);
//!
//! let translator = IndexQueryTranslator::new(&schema, &cache, &defaults, &config);
//! let index = catalog.get_by_name("by_name").unwrap();
//! let TranslatedQuery::Composite(query) =
//!     translator.translate(index, &Condition::equals(name, "ann"), &[]).unwrap()
//! else {
//!     unreachable!()
//! };
//! assert_eq!(query.keys, vec![updates.composite().next().unwrap().key.clone()]);
//! ```
//!
//! # Modules
//!
//! - [`index`] - Definitions, catalog, composite keys and matching
//! - [`planner`] - Index updates implied by a mutation
//! - [`query`] - Query translation and raw query substitution
//! - [`batch`] - Bulk update batches
//! - [`error`] - Error types ([`IndexError`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod batch;
pub mod cache;
pub mod config;
pub mod defaults;
pub mod document;
pub mod error;
pub mod index;
pub mod planner;
pub mod query;
pub mod update;

// Re-export commonly used types
pub use batch::{IndexBatch, IndexWriter, NoPressure, ResourcePressure};
pub use cache::{FieldNames, SchemaCache};
pub use config::{BatchConfig, HashLength, IndexConfig};
pub use defaults::{DefaultField, DefaultFieldRegistry, FieldRegistrar};
pub use document::{AuxiliaryKeys, FieldSlot, MixedDocument, MixedFieldValue};
pub use error::{BackendError, BackendErrorKind, IndexError, IndexResult};
pub use index::{
    CompositeIndex, CompositeKeyCodec, ElementRef, IndexCatalog, IndexDefinition, IndexEntry,
    IndexMatcher, IndexStatus, Mapping, MappingSource, MixedField, MixedIndex, VertexState,
};
pub use planner::{IndexUpdatePlanner, Mutation};
pub use query::{
    Cmp, CompositeQuery, Condition, Geo, IndexQueryTranslator, MixedQuery, OrderBy, Predicate,
    RawQuery, Text, TranslatedQuery,
};
pub use update::{CompositeUpdate, IndexUpdate, IndexUpdateSet, MixedUpdate, UpdateKind};
