//! Index definitions, composite keys and element matching.
//!
//! - [`CompositeIndex`] / [`MixedIndex`]: what is indexed and how
//! - [`IndexCatalog`]: lookup by id, name and indexed key
//! - [`CompositeKeyCodec`]: composite keys and entries
//! - [`IndexMatcher`]: the records an element contributes to an index

mod catalog;
mod definition;
mod key;
mod matcher;

pub use catalog::IndexCatalog;
pub use definition::{
    CompositeIndex, CompositeIndexBuilder, IndexDefinition, IndexStatus, Mapping, MappingSource,
    MixedField, MixedIndex, MixedIndexBuilder,
};
pub use key::{CompositeKeyCodec, ElementRef, IndexEntry};
pub use matcher::{IndexMatcher, IndexRecord, RecordEntry, Substitute, VertexState};
