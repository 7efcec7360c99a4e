use crate::error::{oos_err, Result};
use crate::thrift::{FieldHeader, ThriftCompactReader};

use super::schema_element::decode_list;
use super::statistics::Statistics;
use super::types::{Compression, Encoding, PhysicalType};

/// The part of a column chunk that actually describes the column's data:
/// type, encodings in use, codec, sizes, and page offsets.
#[derive(Debug, Clone)]
pub struct ColumnMetaData {
    pub physical_type: PhysicalType,
    pub encodings: Vec<Encoding>,
    pub path_in_schema: Vec<String>,
    pub codec: Compression,
    pub num_values: i64,
    pub total_uncompressed_size: i64,
    pub total_compressed_size: i64,
    pub data_page_offset: i64,
    pub index_page_offset: Option<i64>,
    pub dictionary_page_offset: Option<i64>,
    pub statistics: Option<Statistics>,
}

impl ColumnMetaData {
    /// Per Open Question (1): presence of a dictionary is determined by
    /// the encoding set, not by whether `dictionary_page_offset` is zero.
    pub fn has_dictionary_page(&self) -> bool {
        self.encodings.iter().any(|e| e.is_dictionary())
    }

    fn decode(r: &mut ThriftCompactReader) -> Result<Self> {
        let mut physical_type = None;
        let mut encodings = None;
        let mut path_in_schema = None;
        let mut codec = None;
        let mut num_values = None;
        let mut total_uncompressed_size = None;
        let mut total_compressed_size = None;
        let mut data_page_offset = None;
        let mut index_page_offset = None;
        let mut dictionary_page_offset = None;
        let mut statistics = None;

        r.struct_begin();
        loop {
            match r.read_field_begin()? {
                FieldHeader::Stop => break,
                FieldHeader::BoolField { .. } => {}
                FieldHeader::Field { id, ty } => match id {
                    1 => physical_type = Some(PhysicalType::from_i32(r.read_i32()?)?),
                    2 => {
                        encodings = Some(decode_list(r, |r| Encoding::from_i32(r.read_i32()?))?)
                    }
                    3 => {
                        path_in_schema = Some(decode_list(r, |r| r.read_string())?);
                    }
                    4 => codec = Some(Compression::from_i32(r.read_i32()?)?),
                    5 => num_values = Some(r.read_i64()?),
                    6 => total_uncompressed_size = Some(r.read_i64()?),
                    7 => total_compressed_size = Some(r.read_i64()?),
                    8 => {
                        decode_list(r, |r| r.read_string())?;
                    } // key_value_metadata: unused
                    9 => data_page_offset = Some(r.read_i64()?),
                    10 => index_page_offset = Some(r.read_i64()?),
                    11 => dictionary_page_offset = Some(r.read_i64()?),
                    12 => statistics = Some(Statistics::decode(r)?),
                    _ => r.skip(ty)?,
                },
            }
        }
        r.struct_end();

        Ok(ColumnMetaData {
            physical_type: physical_type
                .ok_or_else(|| oos_err!("ColumnMetaData missing `type`"))?,
            encodings: encodings.ok_or_else(|| oos_err!("ColumnMetaData missing `encodings`"))?,
            path_in_schema: path_in_schema
                .ok_or_else(|| oos_err!("ColumnMetaData missing `path_in_schema`"))?,
            codec: codec.ok_or_else(|| oos_err!("ColumnMetaData missing `codec`"))?,
            num_values: num_values.ok_or_else(|| oos_err!("ColumnMetaData missing `num_values`"))?,
            total_uncompressed_size: total_uncompressed_size
                .ok_or_else(|| oos_err!("ColumnMetaData missing `total_uncompressed_size`"))?,
            total_compressed_size: total_compressed_size
                .ok_or_else(|| oos_err!("ColumnMetaData missing `total_compressed_size`"))?,
            data_page_offset: data_page_offset
                .ok_or_else(|| oos_err!("ColumnMetaData missing `data_page_offset`"))?,
            index_page_offset,
            dictionary_page_offset,
            statistics,
        })
    }
}

/// One column's contiguous byte region inside one row group.
#[derive(Debug, Clone)]
pub struct ColumnChunkMetaData {
    pub file_path: Option<String>,
    pub file_offset: i64,
    pub meta_data: ColumnMetaData,
}

impl ColumnChunkMetaData {
    /// The `[start, start+len)` byte range of this chunk within the file,
    /// starting at the dictionary page when present, else the first data
    /// page.
    pub fn byte_range(&self) -> (u64, u64) {
        let start = if self.meta_data.has_dictionary_page() {
            self.meta_data
                .dictionary_page_offset
                .unwrap_or(self.meta_data.data_page_offset)
        } else {
            self.meta_data.data_page_offset
        };
        (start as u64, self.meta_data.total_compressed_size as u64)
    }

    pub(crate) fn decode(r: &mut ThriftCompactReader) -> Result<Self> {
        let mut file_path = None;
        let mut file_offset = None;
        let mut meta_data = None;

        r.struct_begin();
        loop {
            match r.read_field_begin()? {
                FieldHeader::Stop => break,
                FieldHeader::BoolField { .. } => {}
                FieldHeader::Field { id, ty } => match id {
                    1 => file_path = Some(r.read_string()?),
                    2 => file_offset = Some(r.read_i64()?),
                    3 => meta_data = Some(ColumnMetaData::decode(r)?),
                    _ => r.skip(ty)?,
                },
            }
        }
        r.struct_end();

        Ok(ColumnChunkMetaData {
            file_path,
            file_offset: file_offset
                .ok_or_else(|| oos_err!("ColumnChunk missing `file_offset`"))?,
            meta_data: meta_data.ok_or_else(|| oos_err!("ColumnChunk missing `meta_data`"))?,
        })
    }
}
