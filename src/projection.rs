//! Maps user-facing dotted column names to the dense projected index
//! space a [`crate::schema::SchemaDescriptor`] addresses columns by.

use crate::error::{general_err, Result};
use crate::schema::SchemaDescriptor;

/// A column selection resolved against a [`SchemaDescriptor`].
///
/// `None` means "every column, in schema order" — the common case, kept
/// as an identity shortcut so whole-file reads skip any index
/// indirection.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Schema column indices to keep, in the order they should appear in
    /// projected batches. `None` selects everything.
    selected: Option<Vec<usize>>,
}

impl Projection {
    /// Select every column, in their natural schema order.
    pub fn all() -> Self {
        Projection { selected: None }
    }

    /// Select columns by dotted path (e.g. `"user.address.city"`),
    /// matching [`crate::schema::ColumnDescriptor::dotted_path`]. Order
    /// of `names` is preserved in projected batches. Duplicate names are
    /// rejected, as is any name absent from the schema.
    pub fn by_names(schema: &SchemaDescriptor, names: &[&str]) -> Result<Self> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let column = schema
                .columns
                .iter()
                .find(|c| c.dotted_path() == *name)
                .ok_or_else(|| general_err!("no such column in schema: `{}`", name))?;
            if selected.contains(&column.column_index) {
                return Err(general_err!("column `{}` selected more than once", name));
            }
            selected.push(column.column_index);
        }
        Ok(Projection {
            selected: Some(selected),
        })
    }

    /// Select columns directly by their dense schema index.
    pub fn by_indices(schema: &SchemaDescriptor, indices: &[usize]) -> Result<Self> {
        for &index in indices {
            if schema.column(index).is_none() {
                return Err(general_err!(
                    "column index {} out of range (schema has {} columns)",
                    index,
                    schema.num_columns()
                ));
            }
        }
        Ok(Projection {
            selected: Some(indices.to_vec()),
        })
    }

    pub fn is_all(&self) -> bool {
        self.selected.is_none()
    }

    /// Schema column indices selected, in projected-batch order.
    pub fn resolve(&self, schema: &SchemaDescriptor) -> Vec<usize> {
        match &self.selected {
            Some(indices) => indices.clone(),
            None => (0..schema.num_columns()).collect(),
        }
    }
}
