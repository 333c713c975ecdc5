//! Schema metadata consumed by the codecs.

mod implicit;
mod inspector;
mod multiplicity;
mod relation_type;

pub use implicit::ImplicitKey;
pub use inspector::{Schema, TypeInspector};
pub use multiplicity::{Cardinality, Multiplicity, SortOrder};
pub use relation_type::{RelationCategory, RelationType, VertexLabel};
