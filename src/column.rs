//! Decodes one column chunk's pages into dense, typed value vectors plus
//! their full definition/repetition level streams. This is the layer
//! that resolves dictionaries and dispatches on value encoding; nested
//! record assembly from the level streams happens in
//! [`crate::assembly`].

use crate::compression::DecompressorRegistry;
use crate::encoding::{
    byte_stream_split, delta_bitpacked, delta_byte_array, delta_length_byte_array, hybrid_rle,
    plain,
};
use crate::error::{general_err, oos_err, Result};
use crate::metadata::types::{Compression, Encoding, PhysicalType};
use crate::page::{DataPageContent, DictionaryPageContent, ParsedPage, PageScanner};
use crate::schema::ColumnDescriptor;

/// Dense, non-null values for one column chunk, typed by the column's
/// physical type.
#[derive(Debug, Clone)]
pub enum ColumnValues {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Int96(Vec<[u8; 12]>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    ByteArray(Vec<Vec<u8>>),
    FixedLenByteArray(Vec<Vec<u8>>),
}

impl ColumnValues {
    fn empty(physical_type: PhysicalType) -> Self {
        match physical_type {
            PhysicalType::Boolean => ColumnValues::Boolean(Vec::new()),
            PhysicalType::Int32 => ColumnValues::Int32(Vec::new()),
            PhysicalType::Int64 => ColumnValues::Int64(Vec::new()),
            PhysicalType::Int96 => ColumnValues::Int96(Vec::new()),
            PhysicalType::Float => ColumnValues::Float(Vec::new()),
            PhysicalType::Double => ColumnValues::Double(Vec::new()),
            PhysicalType::ByteArray => ColumnValues::ByteArray(Vec::new()),
            PhysicalType::FixedLenByteArray => ColumnValues::FixedLenByteArray(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Boolean(v) => v.len(),
            ColumnValues::Int32(v) => v.len(),
            ColumnValues::Int64(v) => v.len(),
            ColumnValues::Int96(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Double(v) => v.len(),
            ColumnValues::ByteArray(v) => v.len(),
            ColumnValues::FixedLenByteArray(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn extend(&mut self, other: ColumnValues) -> Result<()> {
        match (self, other) {
            (ColumnValues::Boolean(a), ColumnValues::Boolean(b)) => Ok(a.extend(b)),
            (ColumnValues::Int32(a), ColumnValues::Int32(b)) => Ok(a.extend(b)),
            (ColumnValues::Int64(a), ColumnValues::Int64(b)) => Ok(a.extend(b)),
            (ColumnValues::Int96(a), ColumnValues::Int96(b)) => Ok(a.extend(b)),
            (ColumnValues::Float(a), ColumnValues::Float(b)) => Ok(a.extend(b)),
            (ColumnValues::Double(a), ColumnValues::Double(b)) => Ok(a.extend(b)),
            (ColumnValues::ByteArray(a), ColumnValues::ByteArray(b)) => Ok(a.extend(b)),
            (ColumnValues::FixedLenByteArray(a), ColumnValues::FixedLenByteArray(b)) => {
                Ok(a.extend(b))
            }
            _ => Err(general_err!("mismatched physical types within one column chunk")),
        }
    }

    /// Picks `indices` out of this vector (used to resolve dictionary
    /// indices against a decoded dictionary page).
    fn gather(&self, indices: &[u32]) -> Result<ColumnValues> {
        fn pick<T: Clone>(v: &[T], indices: &[u32]) -> Result<Vec<T>> {
            indices
                .iter()
                .map(|&i| {
                    v.get(i as usize)
                        .cloned()
                        .ok_or_else(|| oos_err!("dictionary index {} out of range", i))
                })
                .collect()
        }
        Ok(match self {
            ColumnValues::Boolean(v) => ColumnValues::Boolean(pick(v, indices)?),
            ColumnValues::Int32(v) => ColumnValues::Int32(pick(v, indices)?),
            ColumnValues::Int64(v) => ColumnValues::Int64(pick(v, indices)?),
            ColumnValues::Int96(v) => ColumnValues::Int96(pick(v, indices)?),
            ColumnValues::Float(v) => ColumnValues::Float(pick(v, indices)?),
            ColumnValues::Double(v) => ColumnValues::Double(pick(v, indices)?),
            ColumnValues::ByteArray(v) => ColumnValues::ByteArray(pick(v, indices)?),
            ColumnValues::FixedLenByteArray(v) => ColumnValues::FixedLenByteArray(pick(v, indices)?),
        })
    }
}

/// A fully materialized column chunk: one definition/repetition level
/// per occurrence (including nulls), and dense values for the
/// occurrences that are actually present.
#[derive(Debug, Clone)]
pub struct ColumnChunkBatch {
    pub values: ColumnValues,
    pub definition_levels: Vec<i16>,
    pub repetition_levels: Vec<i16>,
}

fn decode_plain(physical_type: PhysicalType, type_length: Option<i32>, data: &[u8], count: usize) -> Result<ColumnValues> {
    Ok(match physical_type {
        PhysicalType::Boolean => ColumnValues::Boolean(plain::read_boolean(data, count)?),
        PhysicalType::Int32 => ColumnValues::Int32(plain::read_i32(data, count)?),
        PhysicalType::Int64 => ColumnValues::Int64(plain::read_i64(data, count)?),
        PhysicalType::Int96 => ColumnValues::Int96(plain::read_i96(data, count)?),
        PhysicalType::Float => ColumnValues::Float(plain::read_f32(data, count)?),
        PhysicalType::Double => ColumnValues::Double(plain::read_f64(data, count)?),
        PhysicalType::ByteArray => ColumnValues::ByteArray(plain::read_byte_array(data, count)?),
        PhysicalType::FixedLenByteArray => {
            let type_length = type_length
                .ok_or_else(|| oos_err!("FIXED_LEN_BYTE_ARRAY column missing type_length"))?
                as usize;
            ColumnValues::FixedLenByteArray(plain::read_fixed_len_byte_array(
                data,
                type_length,
                count,
            )?)
        }
    })
}

fn element_width(physical_type: PhysicalType, type_length: Option<i32>) -> Result<usize> {
    Ok(match physical_type {
        PhysicalType::Int32 | PhysicalType::Float => 4,
        PhysicalType::Int64 | PhysicalType::Double => 8,
        PhysicalType::FixedLenByteArray => type_length
            .ok_or_else(|| oos_err!("FIXED_LEN_BYTE_ARRAY column missing type_length"))?
            as usize,
        other => return Err(general_err!("BYTE_STREAM_SPLIT is not valid for {:?}", other)),
    })
}

fn decode_values(
    encoding: Encoding,
    physical_type: PhysicalType,
    type_length: Option<i32>,
    data: &[u8],
    count: usize,
    dictionary: Option<&ColumnValues>,
) -> Result<ColumnValues> {
    match encoding {
        Encoding::Plain => decode_plain(physical_type, type_length, data, count),
        Encoding::PlainDictionary | Encoding::RleDictionary => {
            let dictionary = dictionary.ok_or_else(|| {
                oos_err!("dictionary-encoded page with no preceding dictionary page")
            })?;
            let indices = hybrid_rle::decode_dictionary_indices(data, count)?;
            dictionary.gather(&indices)
        }
        Encoding::Rle => {
            if physical_type != PhysicalType::Boolean {
                return Err(general_err!("RLE value encoding is only valid for BOOLEAN"));
            }
            let (values, _) = hybrid_rle::decode_length_prefixed(data, 1, count)?;
            Ok(ColumnValues::Boolean(values.into_iter().map(|v| v == 1).collect()))
        }
        Encoding::DeltaBinaryPacked => {
            if physical_type != PhysicalType::Int32 && physical_type != PhysicalType::Int64 {
                return Err(general_err!(
                    "DELTA_BINARY_PACKED is only valid for INT32/INT64"
                ));
            }
            let (values, _) = delta_bitpacked::decode(data)?;
            Ok(if physical_type == PhysicalType::Int32 {
                ColumnValues::Int32(values.into_iter().map(|v| v as i32).collect())
            } else {
                ColumnValues::Int64(values)
            })
        }
        Encoding::DeltaLengthByteArray => {
            if physical_type != PhysicalType::ByteArray {
                return Err(general_err!(
                    "DELTA_LENGTH_BYTE_ARRAY is only valid for BYTE_ARRAY"
                ));
            }
            let (values, _) = delta_length_byte_array::decode(data)?;
            Ok(ColumnValues::ByteArray(values))
        }
        Encoding::DeltaByteArray => {
            let values = delta_byte_array::decode(data)?;
            match physical_type {
                PhysicalType::ByteArray => Ok(ColumnValues::ByteArray(values)),
                PhysicalType::FixedLenByteArray => Ok(ColumnValues::FixedLenByteArray(values)),
                other => Err(general_err!("DELTA_BYTE_ARRAY is not valid for {:?}", other)),
            }
        }
        Encoding::ByteStreamSplit => {
            let width = element_width(physical_type, type_length)?;
            let reassembled = byte_stream_split::decode(data, width, count)?;
            decode_plain(physical_type, type_length, &reassembled, count)
        }
        Encoding::BitPacked => Err(general_err!(
            "the legacy BIT_PACKED value encoding is not supported"
        )),
    }
}

fn non_null_count(definition_levels: &[i16], max_definition_level: i16) -> usize {
    if max_definition_level == 0 {
        definition_levels.len()
    } else {
        definition_levels
            .iter()
            .filter(|&&level| level == max_definition_level)
            .count()
    }
}

/// `crate::page` already strips each level stream's own framing (the
/// 4-byte length prefix for `DATA_PAGE` v1, the explicit header lengths
/// for v2), so both versions hand us bare hybrid RLE bytes here.
fn decode_levels(raw: &[u8], max_level: i16, count: usize) -> Result<Vec<i16>> {
    if max_level == 0 {
        return Ok(vec![0; count]);
    }
    let num_bits = hybrid_rle::bit_width_for_max_level(max_level);
    let (values, _) = hybrid_rle::decode(raw, num_bits, count)?;
    values
        .into_iter()
        .map(|v| {
            i16::try_from(v).map_err(|_| oos_err!("level value {} does not fit in i16", v))
        })
        .collect()
}

/// Reads every page of one column chunk's mapped byte range into a
/// single materialized batch. The whole file already lives behind a
/// memory map, so there is no benefit to incremental page-at-a-time
/// decoding here; pagination for callers is handled by slicing this
/// batch in [`crate::cursor`].
pub fn read_column_chunk(
    buf: &[u8],
    descriptor: &ColumnDescriptor,
    compression: Compression,
    validate_crc: bool,
    decompressors: &DecompressorRegistry,
) -> Result<ColumnChunkBatch> {
    let scanner = PageScanner::with_options(
        buf,
        compression,
        descriptor.max_definition_level,
        descriptor.max_repetition_level,
        validate_crc,
        decompressors,
    )?;

    let mut dictionary: Option<ColumnValues> = None;
    let mut values = ColumnValues::empty(descriptor.physical_type);
    let mut definition_levels = Vec::new();
    let mut repetition_levels = Vec::new();

    for page in scanner {
        match page? {
            ParsedPage::Dictionary(DictionaryPageContent {
                num_values,
                encoding,
                values: raw,
                ..
            }) => {
                if encoding != Encoding::Plain && encoding != Encoding::PlainDictionary {
                    return Err(general_err!(
                        "dictionary page encoded with unexpected encoding {:?}",
                        encoding
                    ));
                }
                dictionary = Some(decode_plain(
                    descriptor.physical_type,
                    descriptor.type_length,
                    &raw,
                    num_values,
                )?);
            }
            ParsedPage::Data(DataPageContent {
                num_values,
                encoding,
                rep_levels: raw_rep,
                def_levels: raw_def,
                values: raw_values,
                ..
            }) => {
                let rep = decode_levels(&raw_rep, descriptor.max_repetition_level, num_values)?;
                let def = decode_levels(&raw_def, descriptor.max_definition_level, num_values)?;
                let present = non_null_count(&def, descriptor.max_definition_level);

                let decoded = decode_values(
                    encoding,
                    descriptor.physical_type,
                    descriptor.type_length,
                    &raw_values,
                    present,
                    dictionary.as_ref(),
                )?;

                values.extend(decoded)?;
                definition_levels.extend(def);
                repetition_levels.extend(rep);
            }
        }
    }

    Ok(ColumnChunkBatch {
        values,
        definition_levels,
        repetition_levels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_null_count_with_no_nulls_possible() {
        assert_eq!(non_null_count(&[0, 0, 0], 0), 3);
    }

    #[test]
    fn non_null_count_counts_max_level_only() {
        assert_eq!(non_null_count(&[2, 1, 2, 0], 2), 2);
    }
}
