//! Flat, dense view of the schema: one [`ColumnDescriptor`] per primitive
//! leaf, in the same pre-order used for column chunk indices within a row
//! group.

use crate::error::Result;
use crate::metadata::types::{ConvertedType, LogicalType, PhysicalType};
use crate::metadata::SchemaElement;

use super::path::{build_field_paths, FieldPath};
use super::tree::{build_schema_tree, retag_container_children, SchemaNode};

/// Everything needed to decode and assemble one primitive column, without
/// walking the tree again.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub column_index: usize,
    pub physical_type: PhysicalType,
    pub type_length: Option<i32>,
    pub converted_type: Option<ConvertedType>,
    pub logical_type: Option<LogicalType>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub max_definition_level: i16,
    pub max_repetition_level: i16,
    pub path: FieldPath,
}

impl ColumnDescriptor {
    /// Dotted name, e.g. `phoneNumber.phone`, matching the projection
    /// syntax.
    pub fn dotted_path(&self) -> String {
        self.path
            .steps
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// The schema tree plus a flat, dense `ColumnDescriptor` list over its
/// primitive leaves.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    pub root: SchemaNode,
    pub columns: Vec<ColumnDescriptor>,
}

impl SchemaDescriptor {
    pub fn from_elements(elements: &[SchemaElement]) -> Result<Self> {
        let (mut root, num_columns) = build_schema_tree(elements)?;
        retag_container_children(&mut root);

        let paths = build_field_paths(&root);
        if paths.len() != num_columns {
            return Err(crate::error::oos_err!(
                "schema produced {} field paths for {} primitive columns",
                paths.len(),
                num_columns
            ));
        }

        let leaves = collect_leaves(&root);
        let mut columns = Vec::with_capacity(num_columns);
        for (leaf, path) in leaves.into_iter().zip(paths.into_iter()) {
            columns.push(ColumnDescriptor {
                column_index: leaf.column_index,
                physical_type: leaf.physical_type,
                type_length: leaf.type_length,
                converted_type: leaf.converted_type,
                logical_type: leaf.logical_type,
                precision: leaf.precision,
                scale: leaf.scale,
                max_definition_level: path.max_definition_level,
                max_repetition_level: path.max_repetition_level,
                path,
            });
        }
        columns.sort_by_key(|c| c.column_index);

        Ok(SchemaDescriptor { root, columns })
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

fn collect_leaves(node: &SchemaNode) -> Vec<&super::tree::PrimitiveNode> {
    let mut out = Vec::new();
    collect_leaves_into(node, &mut out);
    out.sort_by_key(|p| p.column_index);
    out
}

fn collect_leaves_into<'a>(node: &'a SchemaNode, out: &mut Vec<&'a super::tree::PrimitiveNode>) {
    match node {
        SchemaNode::Primitive(p) => out.push(p),
        SchemaNode::Group(g) => {
            for field in &g.fields {
                collect_leaves_into(field, out);
            }
        }
    }
}
