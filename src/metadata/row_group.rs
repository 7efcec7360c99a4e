use crate::error::{oos_err, Result};
use crate::thrift::{FieldHeader, ThriftCompactReader};

use super::column_chunk::ColumnChunkMetaData;
use super::schema_element::decode_list;

/// A horizontal partition of the file holding one full set of column
/// chunks.
#[derive(Debug, Clone)]
pub struct RowGroupMetaData {
    pub columns: Vec<ColumnChunkMetaData>,
    pub total_byte_size: i64,
    pub num_rows: i64,
    pub file_offset: Option<i64>,
    pub total_compressed_size: Option<i64>,
    pub ordinal: Option<i16>,
}

impl RowGroupMetaData {
    pub(crate) fn decode(r: &mut ThriftCompactReader) -> Result<Self> {
        let mut columns = None;
        let mut total_byte_size = None;
        let mut num_rows = None;
        let mut file_offset = None;
        let mut total_compressed_size = None;
        let mut ordinal = None;

        r.struct_begin();
        loop {
            match r.read_field_begin()? {
                FieldHeader::Stop => break,
                FieldHeader::BoolField { .. } => {}
                FieldHeader::Field { id, ty } => match id {
                    1 => columns = Some(decode_list(r, ColumnChunkMetaData::decode)?),
                    2 => total_byte_size = Some(r.read_i64()?),
                    3 => num_rows = Some(r.read_i64()?),
                    4 => {
                        // sorting_columns: list<SortingColumn>, not modeled
                        let (_ty, size) = r.read_list_begin()?;
                        for _ in 0..size {
                            r.skip(crate::thrift::CompactType::Struct)?;
                        }
                    }
                    5 => file_offset = Some(r.read_i64()?),
                    6 => total_compressed_size = Some(r.read_i64()?),
                    7 => ordinal = Some(r.read_i16()?),
                    _ => r.skip(ty)?,
                },
            }
        }
        r.struct_end();

        Ok(RowGroupMetaData {
            columns: columns.ok_or_else(|| oos_err!("RowGroup missing `columns`"))?,
            total_byte_size: total_byte_size
                .ok_or_else(|| oos_err!("RowGroup missing `total_byte_size`"))?,
            num_rows: num_rows.ok_or_else(|| oos_err!("RowGroup missing `num_rows`"))?,
            file_offset,
            total_compressed_size,
            ordinal,
        })
    }
}
