//! Reconstructs the logical schema tree from `FileMetaData.schema`'s
//! flat pre-order element list, and precomputes everything the record
//! assembler needs to walk it without re-deriving structure per row.

pub mod descriptor;
pub mod path;
pub mod tree;

pub use descriptor::{ColumnDescriptor, SchemaDescriptor};
pub use path::{FieldPath, PathStep};
pub use tree::{GroupKind, GroupNode, PrimitiveNode, SchemaNode};
