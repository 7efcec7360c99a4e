//! Dremel-style record assembly: turns each leaf column's flat
//! definition/repetition level streams back into nested records, the way
//! [`crate::schema`] shredded them in the first place.
//!
//! Assembly happens in three passes:
//!  1. [`assemble_leaf`] walks one column's level streams and rebuilds a
//!     single-field chain of structs/lists down to that one leaf, skipping
//!     over the transparent 3-level list/map wrapper groups.
//!  2. [`merge_records`] unions the per-leaf chains for one row group into
//!     complete records, field by field.
//!  3. [`reshape`] walks the merged tree against the schema one more time
//!     to collapse the wrapper groups' leftover struct layer into plain
//!     [`Value::List`]/[`Value::Map`] values.
//!
//! This mirrors the structure (if not the hard-coded `max_rep`/`max_def`)
//! of `primitive_nested.rs`'s `compose_array`, generalized to arbitrary
//! nesting depth and to merging more than one leaf column per record.

use crate::column::ColumnValues;
use crate::error::{general_err, Result};
use crate::schema::tree::{GroupKind, SchemaNode};
use crate::schema::{FieldPath, PathStep};

/// An assembled record value. Logical-type conversion (timestamps,
/// decimals, UTF-8 strings, ...) happens downstream of this, since it
/// needs a column's logical type and assembly only ever sees physical
/// representations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Int96([u8; 12]),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    FixedLenByteArray(Vec<u8>),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(Vec<(String, Value)>),
}

impl Value {
    pub fn as_struct_fields(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Navigates a dotted path of struct field names (e.g.
    /// `"contacts.name"`) from this value, returning `None` if any step
    /// along the way is missing, null, or not a struct. Used by
    /// [`crate::cursor::RowCursor`]'s named getters to look up a field
    /// without the caller destructuring the tree by hand.
    pub fn field(&self, dotted_path: &str) -> Option<&Value> {
        let mut current = self;
        for part in dotted_path.split('.') {
            let fields = current.as_struct_fields()?;
            current = &fields.iter().find(|(name, _)| name == part)?.1;
        }
        Some(current)
    }
}

/// Pulls leaf values out of a decoded column chunk's dense, non-null
/// value vector in order, one per `Value::Null`-free occurrence.
struct LeafValues<'a> {
    values: &'a ColumnValues,
    pos: usize,
}

impl<'a> LeafValues<'a> {
    fn new(values: &'a ColumnValues) -> Self {
        LeafValues { values, pos: 0 }
    }

    fn next(&mut self) -> Value {
        let index = self.pos;
        self.pos += 1;
        match self.values {
            ColumnValues::Boolean(v) => Value::Boolean(v[index]),
            ColumnValues::Int32(v) => Value::Int32(v[index]),
            ColumnValues::Int64(v) => Value::Int64(v[index]),
            ColumnValues::Int96(v) => Value::Int96(v[index]),
            ColumnValues::Float(v) => Value::Float(v[index]),
            ColumnValues::Double(v) => Value::Double(v[index]),
            ColumnValues::ByteArray(v) => Value::ByteArray(v[index].clone()),
            ColumnValues::FixedLenByteArray(v) => Value::FixedLenByteArray(v[index].clone()),
        }
    }
}

/// Builds the value contributed by `steps[idx]` for the occurrence at
/// `occ[*pos]`, advancing `pos` past every entry consumed by this step and
/// its descendants.
fn build_step(
    steps: &[PathStep],
    idx: usize,
    occ: &[(i16, i16)],
    pos: &mut usize,
    leaf_values: &mut LeafValues,
) -> Value {
    let step = &steps[idx];

    if step.is_repeated {
        let mut elements = Vec::new();
        let mut first = true;
        loop {
            if *pos >= occ.len() {
                break;
            }
            let (rep, def) = occ[*pos];
            if !first && rep < step.repetition_level {
                break;
            }
            if def < step.definition_level {
                // Either a genuinely empty list, or this occurrence closes
                // without ever entering the list at all.
                *pos += 1;
                break;
            }
            first = false;
            elements.push(build_node_content(steps, idx, occ, pos, leaf_values));
        }
        return Value::List(elements);
    }

    if *pos >= occ.len() {
        return Value::Null;
    }
    let (_, def) = occ[*pos];
    if def < step.definition_level {
        *pos += 1;
        return Value::Null;
    }
    build_node_content(steps, idx, occ, pos, leaf_values)
}

/// Builds the content of one confirmed-present occurrence of `steps[idx]`
/// (its presence, and for repeated steps its list membership, has already
/// been decided by the caller).
fn build_node_content(
    steps: &[PathStep],
    idx: usize,
    occ: &[(i16, i16)],
    pos: &mut usize,
    leaf_values: &mut LeafValues,
) -> Value {
    let step = &steps[idx];
    let is_last = idx == steps.len() - 1;

    if is_last {
        *pos += 1;
        return leaf_values.next();
    }
    if step.is_wrapper {
        return build_step(steps, idx + 1, occ, pos, leaf_values);
    }
    let child_name = steps[idx + 1].name.clone();
    Value::Struct(vec![(child_name, build_step(steps, idx + 1, occ, pos, leaf_values))])
}

/// Rebuilds one column's contribution to every record in a row group: a
/// chain of single-field structs/lists from the schema root down to this
/// leaf, with `Value::Null` standing in wherever an ancestor was absent.
pub fn assemble_leaf(
    path: &FieldPath,
    definition_levels: &[i16],
    repetition_levels: &[i16],
    values: &ColumnValues,
    num_records: usize,
) -> Result<Vec<Value>> {
    if definition_levels.len() != repetition_levels.len() {
        return Err(general_err!(
            "definition and repetition level streams have different lengths ({} vs {})",
            definition_levels.len(),
            repetition_levels.len()
        ));
    }
    let occ: Vec<(i16, i16)> = repetition_levels
        .iter()
        .zip(definition_levels.iter())
        .map(|(&r, &d)| (r, d))
        .collect();

    let mut pos = 0usize;
    let mut leaf_values = LeafValues::new(values);
    let mut out = Vec::with_capacity(num_records);
    let root_name = path.steps[0].name.clone();
    for _ in 0..num_records {
        if pos >= occ.len() {
            return Err(general_err!(
                "level stream exhausted before assembling {} of {} records",
                out.len(),
                num_records
            ));
        }
        let inner = build_step(&path.steps, 0, &occ, &mut pos, &mut leaf_values);
        out.push(Value::Struct(vec![(root_name.clone(), inner)]));
    }
    if pos != occ.len() {
        return Err(general_err!(
            "{} trailing level entries were not consumed during assembly",
            occ.len() - pos
        ));
    }
    Ok(out)
}

/// Unions two partial records built by [`assemble_leaf`] for different
/// leaves of the same row into one. Two leaves only ever disagree where
/// one contributed a field the other didn't touch (`Struct` union) or
/// where both walk the same repeated ancestor in lock step (`List` zip).
pub fn merge(a: Value, b: Value) -> Result<Value> {
    match (a, b) {
        (Value::Null, other) | (other, Value::Null) => Ok(other),
        (Value::Struct(mut af), Value::Struct(bf)) => {
            for (key, value) in bf {
                match af.iter().position(|(k, _)| *k == key) {
                    Some(i) => {
                        let existing = std::mem::replace(&mut af[i].1, Value::Null);
                        af[i].1 = merge(existing, value)?;
                    }
                    None => af.push((key, value)),
                }
            }
            Ok(Value::Struct(af))
        }
        (Value::List(ae), Value::List(be)) => {
            if ae.len() != be.len() {
                return Err(general_err!(
                    "sibling columns disagree on list length ({} vs {}) while merging a record",
                    ae.len(),
                    be.len()
                ));
            }
            let merged = ae
                .into_iter()
                .zip(be)
                .map(|(x, y)| merge(x, y))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(merged))
        }
        (a, b) if a == b => Ok(a),
        (a, b) => Err(general_err!(
            "sibling columns produced incompatible values while merging a record: {:?} vs {:?}",
            a,
            b
        )),
    }
}

/// Folds every leaf's per-record [`Value`] into one record per row.
/// `per_leaf[i][r]` is leaf `i`'s contribution to record `r`.
pub fn merge_records(per_leaf: &[Vec<Value>], num_records: usize) -> Result<Vec<Value>> {
    let mut out = Vec::with_capacity(num_records);
    for r in 0..num_records {
        let mut record = Value::Null;
        for leaf in per_leaf {
            let contribution = leaf
                .get(r)
                .cloned()
                .ok_or_else(|| general_err!("column is missing record {}", r))?;
            record = merge(record, contribution)?;
        }
        out.push(record);
    }
    Ok(out)
}

/// Collapses the transparent wrapper groups' leftover struct layer: each
/// `List`/`Map`-kind group's assembled value is `Struct([(wrapper_name,
/// List(...))])` (the wrapper's name leaking through from [`build_node_content`]);
/// this walks the schema alongside the value tree and replaces it with a
/// direct `List`/`Map`, recursing into element/key/value types as it goes.
pub fn reshape(schema: &SchemaNode, value: Value) -> Result<Value> {
    match schema {
        SchemaNode::Primitive(_) => Ok(value),
        SchemaNode::Group(group) => match group.kind {
            GroupKind::Struct => {
                let Value::Struct(fields) = value else {
                    return Ok(value);
                };
                let mut out = Vec::with_capacity(fields.len());
                for (name, field_value) in fields {
                    let child = group
                        .fields
                        .iter()
                        .find(|c| c.name() == name)
                        .ok_or_else(|| general_err!("no schema field named `{}`", name))?;
                    out.push((name, reshape(child, field_value)?));
                }
                Ok(Value::Struct(out))
            }
            GroupKind::List => {
                let elements = unwrap_wrapper_list(value)?;
                let element_node = list_element_node(group.fields.first())?;
                let reshaped = elements
                    .into_iter()
                    .map(|e| reshape(element_node, e))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List(reshaped))
            }
            GroupKind::Map => {
                let elements = unwrap_wrapper_list(value)?;
                let wrapper = group
                    .fields
                    .first()
                    .and_then(|n| n.as_group())
                    .ok_or_else(|| general_err!("MAP group has no key_value wrapper"))?;
                let key_node = wrapper
                    .fields
                    .first()
                    .ok_or_else(|| general_err!("map key_value wrapper has no key field"))?;
                let value_node = wrapper
                    .fields
                    .get(1)
                    .ok_or_else(|| general_err!("map key_value wrapper has no value field"))?;
                let mut pairs = Vec::with_capacity(elements.len());
                for element in elements {
                    let fields = element.as_struct_fields().unwrap_or(&[]).to_vec();
                    let key = field_or_null(&fields, key_node.name());
                    let val = field_or_null(&fields, value_node.name());
                    pairs.push((reshape(key_node, key)?, reshape(value_node, val)?));
                }
                Ok(Value::Map(pairs))
            }
            // Wrapper kinds never appear directly as a schema child in our
            // traversal; `reshape` only ever recurses into them via
            // `list_element_node`/the map branch above, which route
            // straight past them to the real element/key/value node.
            GroupKind::ListWrapper | GroupKind::MapWrapper => Ok(value),
        },
    }
}

fn field_or_null(fields: &[(String, Value)], name: &str) -> Value {
    fields
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.clone())
        .unwrap_or(Value::Null)
}

/// A `List`/`Map` group's assembled value is `Struct([(_, List(elems))])`
/// when present, or `Value::Null` when the whole group was absent.
fn unwrap_wrapper_list(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Struct(mut fields) if fields.len() == 1 => match fields.pop().unwrap().1 {
            Value::List(elements) => Ok(elements),
            other => Err(general_err!(
                "expected a list beneath a list/map wrapper, found {:?}",
                other
            )),
        },
        other => Err(general_err!(
            "expected a single-field wrapper struct for a list/map group, found {:?}",
            other
        )),
    }
}

/// The schema node describing one list element: the wrapper's sole child
/// for the canonical 3-level encoding, or the repeated field itself for
/// the legacy 2-level encoding.
fn list_element_node(first_child: Option<&SchemaNode>) -> Result<&SchemaNode> {
    let first_child = first_child.ok_or_else(|| general_err!("LIST group has no children"))?;
    match first_child.as_group() {
        Some(group) if group.kind == GroupKind::ListWrapper => group
            .fields
            .first()
            .ok_or_else(|| general_err!("list wrapper group has no element field")),
        _ => Ok(first_child),
    }
}
