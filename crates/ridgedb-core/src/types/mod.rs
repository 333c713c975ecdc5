//! Core data types: identifiers, values, relations and vertices.

mod id;
mod relation;
mod value;
mod vertex;

pub use id::{RelationId, SchemaId, VertexId};
pub use relation::{Direction, ElementCategory, Relation, RelationIdentifier, RelationKind};
pub use value::{DataType, Value};
pub use vertex::{Vertex, VertexProperty};
