//! Binary encoding of relations for the adjacency-list store.
//!
//! - [`ByteWriter`] / [`ByteReader`]: position-tracked buffers
//! - [`sortable`]: order-preserving attribute payloads for key positions
//! - [`value`]: compact attribute payloads, tagged for generic keys
//! - [`keys`]: the record header and range-bound helpers
//! - [`RelationCodec`]: relation <-> [`RelationRecord`]
//! - [`SliceRangeBuilder`]: `[start, end)` ranges for adjacency scans
//!
//! All codecs are stateless and resolve type metadata through a
//! [`TypeInspector`](crate::schema::TypeInspector).

mod cursor;
pub mod keys;
mod relation;
mod slice;
pub mod sortable;
pub mod value;

#[cfg(test)]
mod proptest_tests;

pub use cursor::{flip_bytes, ByteReader, ByteWriter};
pub use keys::{next_bigger, HeaderDirection, RecordHeader};
pub use relation::{CachedRecord, RelationCache, RelationCodec, RelationEnd, RelationRecord};
pub use slice::{SliceRange, SliceRangeBuilder, SortKeyInterval};
pub use value::AttributeMode;
