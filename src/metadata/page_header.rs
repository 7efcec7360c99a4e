use crate::error::{oos_err, Result};
use crate::thrift::{FieldHeader, ThriftCompactReader};

use super::statistics::Statistics;
use super::types::{Encoding, PageType};

/// `DATA_PAGE` (v1) sub-header.
#[derive(Debug, Clone)]
pub struct DataPageHeaderV1 {
    pub num_values: i32,
    pub encoding: Encoding,
    pub definition_level_encoding: Encoding,
    pub repetition_level_encoding: Encoding,
    pub statistics: Option<Statistics>,
}

/// `DATA_PAGE_V2` sub-header. Unlike v1, level lengths are explicit and
/// only the value region is (optionally) compressed.
#[derive(Debug, Clone)]
pub struct DataPageHeaderV2 {
    pub num_values: i32,
    pub num_nulls: i32,
    pub num_rows: i32,
    pub encoding: Encoding,
    pub definition_levels_byte_length: i32,
    pub repetition_levels_byte_length: i32,
    pub is_compressed: bool,
    pub statistics: Option<Statistics>,
}

/// `DICTIONARY_PAGE` sub-header.
#[derive(Debug, Clone)]
pub struct DictionaryPageHeader {
    pub num_values: i32,
    pub encoding: Encoding,
    pub is_sorted: Option<bool>,
}

#[derive(Debug, Clone)]
pub enum PageHeaderVariant {
    V1(DataPageHeaderV1),
    V2(DataPageHeaderV2),
    Dictionary(DictionaryPageHeader),
}

/// The thrift-compact struct preceding each page, shared by all page
/// kinds: type, sizes, and a type-specific sub-header.
#[derive(Debug, Clone)]
pub struct PageHeader {
    pub page_type: PageType,
    pub uncompressed_page_size: i32,
    pub compressed_page_size: i32,
    pub crc: Option<i32>,
    pub variant: PageHeaderVariant,
}

impl PageHeader {
    pub fn num_values(&self) -> usize {
        (match &self.variant {
            PageHeaderVariant::V1(h) => h.num_values,
            PageHeaderVariant::V2(h) => h.num_values,
            PageHeaderVariant::Dictionary(h) => h.num_values,
        }) as usize
    }

    pub(crate) fn decode(r: &mut ThriftCompactReader) -> Result<Self> {
        let mut page_type = None;
        let mut uncompressed_page_size = None;
        let mut compressed_page_size = None;
        let mut crc = None;
        let mut v1 = None;
        let mut v2 = None;
        let mut dict = None;

        r.struct_begin();
        loop {
            match r.read_field_begin()? {
                FieldHeader::Stop => break,
                FieldHeader::BoolField { .. } => {}
                FieldHeader::Field { id, ty } => match id {
                    1 => page_type = Some(PageType::from_i32(r.read_i32()?)?),
                    2 => uncompressed_page_size = Some(r.read_i32()?),
                    3 => compressed_page_size = Some(r.read_i32()?),
                    4 => crc = Some(r.read_i32()?),
                    5 => v1 = Some(decode_data_page_header_v1(r)?),
                    6 => r.skip(ty)?, // index_page_header: empty, out of scope
                    7 => dict = Some(decode_dictionary_page_header(r)?),
                    8 => v2 = Some(decode_data_page_header_v2(r)?),
                    _ => r.skip(ty)?,
                },
            }
        }
        r.struct_end();

        let page_type = page_type.ok_or_else(|| oos_err!("PageHeader missing `type`"))?;
        let variant = match page_type {
            PageType::DataPage => PageHeaderVariant::V1(
                v1.ok_or_else(|| oos_err!("DATA_PAGE header missing `data_page_header`"))?,
            ),
            PageType::DataPageV2 => PageHeaderVariant::V2(
                v2.ok_or_else(|| oos_err!("DATA_PAGE_V2 header missing `data_page_header_v2`"))?,
            ),
            PageType::DictionaryPage => PageHeaderVariant::Dictionary(dict.ok_or_else(|| {
                oos_err!("DICTIONARY_PAGE header missing `dictionary_page_header`")
            })?),
            PageType::IndexPage => return Err(oos_err!("INDEX_PAGE is not supported")),
        };

        Ok(PageHeader {
            page_type,
            uncompressed_page_size: uncompressed_page_size
                .ok_or_else(|| oos_err!("PageHeader missing `uncompressed_page_size`"))?,
            compressed_page_size: compressed_page_size
                .ok_or_else(|| oos_err!("PageHeader missing `compressed_page_size`"))?,
            crc,
            variant,
        })
    }
}

fn decode_data_page_header_v1(r: &mut ThriftCompactReader) -> Result<DataPageHeaderV1> {
    let mut num_values = None;
    let mut encoding = None;
    let mut definition_level_encoding = None;
    let mut repetition_level_encoding = None;
    let mut statistics = None;

    r.struct_begin();
    loop {
        match r.read_field_begin()? {
            FieldHeader::Stop => break,
            FieldHeader::BoolField { .. } => {}
            FieldHeader::Field { id, ty } => match id {
                1 => num_values = Some(r.read_i32()?),
                2 => encoding = Some(Encoding::from_i32(r.read_i32()?)?),
                3 => definition_level_encoding = Some(Encoding::from_i32(r.read_i32()?)?),
                4 => repetition_level_encoding = Some(Encoding::from_i32(r.read_i32()?)?),
                5 => statistics = Some(Statistics::decode(r)?),
                _ => r.skip(ty)?,
            },
        }
    }
    r.struct_end();

    Ok(DataPageHeaderV1 {
        num_values: num_values.ok_or_else(|| oos_err!("DataPageHeader missing `num_values`"))?,
        encoding: encoding.ok_or_else(|| oos_err!("DataPageHeader missing `encoding`"))?,
        definition_level_encoding: definition_level_encoding
            .ok_or_else(|| oos_err!("DataPageHeader missing `definition_level_encoding`"))?,
        repetition_level_encoding: repetition_level_encoding
            .ok_or_else(|| oos_err!("DataPageHeader missing `repetition_level_encoding`"))?,
        statistics,
    })
}

fn decode_data_page_header_v2(r: &mut ThriftCompactReader) -> Result<DataPageHeaderV2> {
    let mut num_values = None;
    let mut num_nulls = None;
    let mut num_rows = None;
    let mut encoding = None;
    let mut definition_levels_byte_length = None;
    let mut repetition_levels_byte_length = None;
    let mut is_compressed = true; // thrift default
    let mut statistics = None;

    r.struct_begin();
    loop {
        match r.read_field_begin()? {
            FieldHeader::Stop => break,
            FieldHeader::BoolField { id, value } => {
                if id == 7 {
                    is_compressed = value;
                }
            }
            FieldHeader::Field { id, ty } => match id {
                1 => num_values = Some(r.read_i32()?),
                2 => num_nulls = Some(r.read_i32()?),
                3 => num_rows = Some(r.read_i32()?),
                4 => encoding = Some(Encoding::from_i32(r.read_i32()?)?),
                5 => definition_levels_byte_length = Some(r.read_i32()?),
                6 => repetition_levels_byte_length = Some(r.read_i32()?),
                8 => statistics = Some(Statistics::decode(r)?),
                _ => r.skip(ty)?,
            },
        }
    }
    r.struct_end();

    Ok(DataPageHeaderV2 {
        num_values: num_values.ok_or_else(|| oos_err!("DataPageHeaderV2 missing `num_values`"))?,
        num_nulls: num_nulls.ok_or_else(|| oos_err!("DataPageHeaderV2 missing `num_nulls`"))?,
        num_rows: num_rows.ok_or_else(|| oos_err!("DataPageHeaderV2 missing `num_rows`"))?,
        encoding: encoding.ok_or_else(|| oos_err!("DataPageHeaderV2 missing `encoding`"))?,
        definition_levels_byte_length: definition_levels_byte_length.ok_or_else(|| {
            oos_err!("DataPageHeaderV2 missing `definition_levels_byte_length`")
        })?,
        repetition_levels_byte_length: repetition_levels_byte_length.ok_or_else(|| {
            oos_err!("DataPageHeaderV2 missing `repetition_levels_byte_length`")
        })?,
        is_compressed,
        statistics,
    })
}

fn decode_dictionary_page_header(r: &mut ThriftCompactReader) -> Result<DictionaryPageHeader> {
    let mut num_values = None;
    let mut encoding = None;
    let mut is_sorted = None;

    r.struct_begin();
    loop {
        match r.read_field_begin()? {
            FieldHeader::Stop => break,
            FieldHeader::BoolField { id, value } => {
                if id == 3 {
                    is_sorted = Some(value);
                }
            }
            FieldHeader::Field { id, ty } => match id {
                1 => num_values = Some(r.read_i32()?),
                2 => encoding = Some(Encoding::from_i32(r.read_i32()?)?),
                _ => r.skip(ty)?,
            },
        }
    }
    r.struct_end();

    Ok(DictionaryPageHeader {
        num_values: num_values
            .ok_or_else(|| oos_err!("DictionaryPageHeader missing `num_values`"))?,
        encoding: encoding.ok_or_else(|| oos_err!("DictionaryPageHeader missing `encoding`"))?,
        is_sorted,
    })
}
