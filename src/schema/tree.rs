//! The schema tree reconstructed from `FileMetaData`'s pre-order
//! `SchemaElement` list: primitive leaves (with a pre-order column index)
//! and groups (struct / list / map), per `spec.md` §3.

use crate::error::{oos_err, Result};
use crate::metadata::types::{ConvertedType, LogicalType, PhysicalType, Repetition};
use crate::metadata::SchemaElement;

/// What shape a group node represents, determined from its own and its
/// children's converted/logical type annotations. `ListWrapper` is the
/// transparent middle group of the canonical 3-level list encoding: it is
/// never addressed directly during record assembly, only skipped through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Struct,
    /// This group is annotated LIST; `fields[0]` is either the element
    /// directly (legacy 2-level) or a `ListWrapper` group (3-level).
    List,
    /// The transparent single-child repeated group inside a 3-level list.
    ListWrapper,
    /// This group is annotated MAP/MAP_KEY_VALUE's outer container;
    /// `fields[0]` is a repeated `MapWrapper` group with `key`/`value`.
    Map,
    /// The repeated `key_value` group inside a map.
    MapWrapper,
}

#[derive(Debug, Clone)]
pub struct PrimitiveNode {
    pub name: String,
    pub repetition: Repetition,
    pub physical_type: PhysicalType,
    pub type_length: Option<i32>,
    pub converted_type: Option<ConvertedType>,
    pub logical_type: Option<LogicalType>,
    /// `DECIMAL`'s scale and precision, legacy (`ConvertedType::Decimal`)
    /// or current (`LogicalType::Decimal`) — needed independently of
    /// either annotation since a decimal's scale isn't recoverable from
    /// the physical type alone.
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    /// Index of this column in the pre-order traversal of the schema's
    /// primitive leaves; used as the dense column index throughout.
    pub column_index: usize,
}

#[derive(Debug, Clone)]
pub struct GroupNode {
    pub name: String,
    pub repetition: Repetition,
    pub converted_type: Option<ConvertedType>,
    pub logical_type: Option<LogicalType>,
    pub kind: GroupKind,
    pub fields: Vec<SchemaNode>,
}

#[derive(Debug, Clone)]
pub enum SchemaNode {
    Primitive(PrimitiveNode),
    Group(GroupNode),
}

impl SchemaNode {
    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Primitive(p) => &p.name,
            SchemaNode::Group(g) => &g.name,
        }
    }

    pub fn repetition(&self) -> Repetition {
        match self {
            SchemaNode::Primitive(p) => p.repetition,
            SchemaNode::Group(g) => g.repetition,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, SchemaNode::Group(_))
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            SchemaNode::Group(g) => Some(g),
            _ => None,
        }
    }
}

fn is_list_annotated(converted: Option<ConvertedType>, logical: Option<LogicalType>) -> bool {
    matches!(logical, Some(LogicalType::List)) || matches!(converted, Some(ConvertedType::List))
}

fn is_map_annotated(converted: Option<ConvertedType>, logical: Option<LogicalType>) -> bool {
    matches!(logical, Some(LogicalType::Map))
        || matches!(
            converted,
            Some(ConvertedType::Map) | Some(ConvertedType::MapKeyValue)
        )
}

/// Builds the schema tree from the pre-order element list, assigning
/// pre-order column indices to primitive leaves as they're encountered.
pub fn build_schema_tree(elements: &[SchemaElement]) -> Result<(SchemaNode, usize)> {
    let mut cursor = 0usize;
    let mut next_column_index = 0usize;
    let root = build_node(elements, &mut cursor, &mut next_column_index, true)?;
    if cursor != elements.len() {
        return Err(oos_err!(
            "schema had {} trailing elements not consumed by the tree",
            elements.len() - cursor
        ));
    }
    Ok((root, next_column_index))
}

fn build_node(
    elements: &[SchemaElement],
    cursor: &mut usize,
    next_column_index: &mut usize,
    is_root: bool,
) -> Result<SchemaNode> {
    let element = elements
        .get(*cursor)
        .ok_or_else(|| oos_err!("schema element list ended unexpectedly"))?;
    *cursor += 1;

    if element.is_primitive() {
        let column_index = *next_column_index;
        *next_column_index += 1;
        return Ok(SchemaNode::Primitive(PrimitiveNode {
            name: element.name.clone(),
            repetition: element
                .repetition_type
                .ok_or_else(|| oos_err!("primitive `{}` missing repetition", element.name))?,
            physical_type: element
                .physical_type
                .ok_or_else(|| oos_err!("primitive `{}` missing physical type", element.name))?,
            type_length: element.type_length,
            converted_type: element.converted_type,
            logical_type: element.logical_type,
            precision: element.precision,
            scale: element.scale,
            column_index,
        }));
    }

    let num_children = element.num_children.unwrap_or(0) as usize;
    let mut fields = Vec::with_capacity(num_children);
    for _ in 0..num_children {
        fields.push(build_node(elements, cursor, next_column_index, false)?);
    }

    let repetition = if is_root {
        Repetition::Required
    } else {
        element
            .repetition_type
            .ok_or_else(|| oos_err!("group `{}` missing repetition", element.name))?
    };

    let kind = classify_group(element.converted_type, element.logical_type, &fields);

    Ok(SchemaNode::Group(GroupNode {
        name: element.name.clone(),
        repetition,
        converted_type: element.converted_type,
        logical_type: element.logical_type,
        kind,
        fields,
    }))
}

fn classify_group(
    converted: Option<ConvertedType>,
    logical: Option<LogicalType>,
    fields: &[SchemaNode],
) -> GroupKind {
    if is_list_annotated(converted, logical) {
        return GroupKind::List;
    }
    if is_map_annotated(converted, logical) {
        return GroupKind::Map;
    }
    GroupKind::Struct
}

/// Re-tags a group's sole repeated child once we know its enclosing group
/// is a `List`/`Map`, distinguishing the transparent 3-level wrapper from
/// a direct (legacy 2-level, or unannotated "classic Dremel") repeated
/// field. Called bottom-up after the tree is built since the decision
/// depends on the parent's annotation.
pub fn retag_container_children(node: &mut SchemaNode) {
    if let SchemaNode::Group(g) = node {
        match g.kind {
            GroupKind::List if g.fields.len() == 1 => {
                if let SchemaNode::Group(child) = &mut g.fields[0] {
                    if child.repetition == Repetition::Repeated && child.fields.len() == 1 {
                        child.kind = GroupKind::ListWrapper;
                    }
                }
            }
            GroupKind::Map if g.fields.len() == 1 => {
                if let SchemaNode::Group(child) = &mut g.fields[0] {
                    if child.repetition == Repetition::Repeated {
                        child.kind = GroupKind::MapWrapper;
                    }
                }
            }
            _ => {}
        }
        for field in &mut g.fields {
            retag_container_children(field);
        }
    }
}
