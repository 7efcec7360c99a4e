use crate::error::{oos_err, Result};
use crate::thrift::{FieldHeader, ThriftCompactReader};

use super::row_group::RowGroupMetaData;
use super::schema_element::{decode_list, SchemaElement};

/// A `key: value` pair from a file's or column chunk's free-form metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<String>,
}

impl KeyValue {
    fn decode(r: &mut ThriftCompactReader) -> Result<Self> {
        let mut key = None;
        let mut value = None;
        r.struct_begin();
        loop {
            match r.read_field_begin()? {
                FieldHeader::Stop => break,
                FieldHeader::BoolField { .. } => {}
                FieldHeader::Field { id, ty } => match id {
                    1 => key = Some(r.read_string()?),
                    2 => value = Some(r.read_string()?),
                    _ => r.skip(ty)?,
                },
            }
        }
        r.struct_end();
        Ok(KeyValue {
            key: key.ok_or_else(|| oos_err!("KeyValue missing `key`"))?,
            value,
        })
    }
}

/// Which of a column's physical values defines its sort order. Only the
/// `TypeDefinedOrder` variant is emitted by any known writer; it carries
/// no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrder {
    TypeDefinedOrder,
}

impl ColumnOrder {
    fn decode(r: &mut ThriftCompactReader) -> Result<Self> {
        r.struct_begin();
        let mut result = None;
        loop {
            match r.read_field_begin()? {
                FieldHeader::Stop => break,
                FieldHeader::BoolField { .. } => {}
                FieldHeader::Field { id, ty } => {
                    if id == 1 {
                        // TypeDefinedOrder: empty struct
                        r.struct_begin();
                        loop {
                            match r.read_field_begin()? {
                                FieldHeader::Stop => break,
                                FieldHeader::BoolField { .. } => {}
                                FieldHeader::Field { ty, .. } => r.skip(ty)?,
                            }
                        }
                        r.struct_end();
                        result = Some(ColumnOrder::TypeDefinedOrder);
                    } else {
                        r.skip(ty)?;
                    }
                }
            }
        }
        r.struct_end();
        Ok(result.unwrap_or(ColumnOrder::TypeDefinedOrder))
    }
}

/// The fully decoded file footer.
#[derive(Debug, Clone)]
pub struct FileMetaData {
    pub version: i32,
    pub schema: Vec<SchemaElement>,
    pub num_rows: i64,
    pub row_groups: Vec<RowGroupMetaData>,
    pub key_value_metadata: Option<Vec<KeyValue>>,
    pub created_by: Option<String>,
    pub column_orders: Option<Vec<ColumnOrder>>,
}

impl FileMetaData {
    pub(crate) fn decode(r: &mut ThriftCompactReader) -> Result<Self> {
        let mut version = None;
        let mut schema = None;
        let mut num_rows = None;
        let mut row_groups = None;
        let mut key_value_metadata = None;
        let mut created_by = None;
        let mut column_orders = None;

        r.struct_begin();
        loop {
            match r.read_field_begin()? {
                FieldHeader::Stop => break,
                FieldHeader::BoolField { .. } => {}
                FieldHeader::Field { id, ty } => match id {
                    1 => version = Some(r.read_i32()?),
                    2 => schema = Some(decode_list(r, SchemaElement::decode)?),
                    3 => num_rows = Some(r.read_i64()?),
                    4 => row_groups = Some(decode_list(r, RowGroupMetaData::decode)?),
                    5 => key_value_metadata = Some(decode_list(r, KeyValue::decode)?),
                    6 => created_by = Some(r.read_string()?),
                    7 => column_orders = Some(decode_list(r, ColumnOrder::decode)?),
                    _ => r.skip(ty)?,
                },
            }
        }
        r.struct_end();

        Ok(FileMetaData {
            version: version.ok_or_else(|| oos_err!("FileMetaData missing `version`"))?,
            schema: schema.ok_or_else(|| oos_err!("FileMetaData missing `schema`"))?,
            num_rows: num_rows.ok_or_else(|| oos_err!("FileMetaData missing `num_rows`"))?,
            row_groups: row_groups.ok_or_else(|| oos_err!("FileMetaData missing `row_groups`"))?,
            key_value_metadata,
            created_by,
            column_orders,
        })
    }
}
