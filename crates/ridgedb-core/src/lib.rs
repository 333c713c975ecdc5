//! `RidgeDB` Core
//!
//! This crate turns graph relations into ordered binary records for a
//! sparse, sorted key-value store, and builds the byte ranges used to scan
//! them back.
//!
//! # Overview
//!
//! - **Identifiers**: [`SchemaId`] for types, [`VertexId`] and [`RelationId`] for graph elements
//! - **Graph primitives**: [`Relation`] (edges and vertex properties) and [`Vertex`]
//! - **Values**: [`Value`], checked against each key's declared [`DataType`]
//! - **Schema**: [`RelationType`] metadata resolved through the [`TypeInspector`] seam
//! - **Encoding**: [`RelationCodec`] and [`SliceRangeBuilder`]
//!
//! # Example
//!
//! ```
//! use ridgedb_core::{
//!     DataType, Direction, Relation, RelationCodec, RelationType, Schema, SchemaId,
//!     SliceRangeBuilder, SortKeyInterval, TypeInspector,
//! };
//!
//! let (since, knows) = (SchemaId::new(20), SchemaId::new(30));
//! let mut schema = Schema::new();
//! schema.add_type(RelationType::property_key(since, "since", DataType::Int)).unwrap();
//! schema.add_type(RelationType::edge_label(knows, "knows").with_sort_key(vec![since])).unwrap();
//!
//! let edge = Relation::edge("e1", knows, "alice", "bob").with_property(since, 2015i64);
//! let record = RelationCodec::encode(&edge, 0, &schema).unwrap();
//!
//! let ty = schema.existing_type(knows).unwrap();
//! let range = SliceRangeBuilder::build(
//!     ty,
//!     Direction::Out,
//!     &[SortKeyInterval::half_open(2010i64, 2020i64)],
//!     None,
//!     &schema,
//! )
//! .unwrap();
//! assert!(range.contains(record.key()));
//! ```
//!
//! # Modules
//!
//! - [`types`] - Identifiers, values, relations and vertices
//! - [`schema`] - Relation type metadata and the [`TypeInspector`] trait
//! - [`encoding`] - Byte cursors, attribute codecs, relation records, slice ranges
//! - [`error`] - Error types ([`CoreError`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod encoding;
pub mod error;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use encoding::{
    CachedRecord, RelationCache, RelationCodec, RelationRecord, SliceRange, SliceRangeBuilder,
    SortKeyInterval,
};
pub use error::{CoreError, CoreResult};
pub use schema::{
    Cardinality, ImplicitKey, Multiplicity, RelationType, Schema, SortOrder, TypeInspector,
};
pub use types::{
    DataType, Direction, ElementCategory, Relation, RelationId, RelationIdentifier, SchemaId, Value,
    Vertex, VertexId, VertexProperty,
};
