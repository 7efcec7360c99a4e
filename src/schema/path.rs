//! Precomputed root-to-leaf paths used by the record assembler to walk a
//! schema without re-deriving level arithmetic on every row.

use super::tree::{GroupKind, SchemaNode};
use crate::metadata::types::Repetition;

/// One step from a schema node's parent down to (and including) a leaf.
#[derive(Debug, Clone)]
pub struct PathStep {
    pub name: String,
    /// This node's position among its parent's children — used to address
    /// a `Struct` container's fixed slots.
    pub index_in_parent: usize,
    /// Cumulative max definition level through and including this step.
    pub definition_level: i16,
    /// Cumulative max repetition level through and including this step.
    pub repetition_level: i16,
    pub is_repeated: bool,
    /// This step is the repeated element (or its transparent wrapper) of
    /// a list.
    pub is_list: bool,
    /// This step is the repeated `key_value` group (or its transparent
    /// wrapper) of a map.
    pub is_map: bool,
    /// A canonical 3-level list/map wrapper group: record assembly
    /// descends through it without allocating a separate container level.
    pub is_wrapper: bool,
    /// Whether this step is itself a container (struct/list/map) rather
    /// than the final primitive leaf.
    pub is_group: bool,
    /// Number of named children, for `Struct` slot allocation.
    pub child_count: usize,
}

/// The full root-to-leaf path for one primitive column.
#[derive(Debug, Clone)]
pub struct FieldPath {
    pub steps: Vec<PathStep>,
    pub max_definition_level: i16,
    pub max_repetition_level: i16,
}

impl FieldPath {
    /// The field path has no containers between root and leaf: the leaf
    /// is a direct, non-repeated child of the root struct.
    pub fn is_flat(&self) -> bool {
        self.steps.len() == 1 && !self.steps[0].is_group && self.max_repetition_level == 0
    }
}

/// Walks from the root's direct children down to every primitive leaf,
/// building one [`FieldPath`] per leaf. The recursion visits fields in
/// schema-declaration order, the same pre-order traversal
/// `build_schema_tree` uses to assign column indices, so the result is
/// already in column-index order; `descriptor.rs` relies on this to zip
/// paths positionally against its own pre-order leaf list.
pub fn build_field_paths(root: &SchemaNode) -> Vec<FieldPath> {
    let mut paths = Vec::new();
    let root_fields = match root {
        SchemaNode::Group(g) => &g.fields,
        SchemaNode::Primitive(_) => unreachable!("root is always a group"),
    };
    for (idx, child) in root_fields.iter().enumerate() {
        walk(child, idx, 0, 0, Vec::new(), &mut paths);
    }
    paths
}

fn walk(
    node: &SchemaNode,
    index_in_parent: usize,
    parent_def: i16,
    parent_rep: i16,
    mut prefix: Vec<PathStep>,
    out: &mut Vec<FieldPath>,
) {
    let repetition = node.repetition();
    let mut def = parent_def;
    let mut rep = parent_rep;
    if repetition != Repetition::Required {
        def += 1;
    }
    if repetition == Repetition::Repeated {
        rep += 1;
    }

    match node {
        SchemaNode::Primitive(p) => {
            prefix.push(PathStep {
                name: p.name.clone(),
                index_in_parent,
                definition_level: def,
                repetition_level: rep,
                is_repeated: repetition == Repetition::Repeated,
                is_list: false,
                is_map: false,
                is_wrapper: false,
                is_group: false,
                child_count: 0,
            });
            out.push(FieldPath {
                steps: prefix,
                max_definition_level: def,
                max_repetition_level: rep,
            });
        }
        SchemaNode::Group(g) => {
            let (is_list, is_map, is_wrapper) = match g.kind {
                GroupKind::List => (true, false, false),
                GroupKind::ListWrapper => (true, false, true),
                GroupKind::Map => (false, true, false),
                GroupKind::MapWrapper => (false, true, true),
                GroupKind::Struct => (false, false, false),
            };
            prefix.push(PathStep {
                name: g.name.clone(),
                index_in_parent,
                definition_level: def,
                repetition_level: rep,
                is_repeated: repetition == Repetition::Repeated,
                is_list,
                is_map,
                is_wrapper,
                is_group: true,
                child_count: g.fields.len(),
            });
            for (idx, child) in g.fields.iter().enumerate() {
                walk(child, idx, def, rep, prefix.clone(), out);
            }
        }
    }
}
