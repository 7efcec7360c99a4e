//! The RLE / bit-packing hybrid used for definition levels, repetition
//! levels, dictionary indices, and RLE-encoded `BOOLEAN` columns.
//! See the "Run Length Encoding / Bit-Packing Hybrid" section of the
//! Parquet encodings document.

use crate::encoding::bitpacking::{ceil8, unpack};
use crate::encoding::varint::decode_uleb128;
use crate::error::{oos_err, Result};

enum Run<'a> {
    Rle { value: u32, run_length: usize },
    Bitpacked { packed: &'a [u8], run_length: usize },
}

/// Reads one run header and returns the run plus bytes consumed,
/// including the header varint.
fn read_run<'a>(data: &'a [u8], num_bits: u8) -> Result<(Run<'a>, usize)> {
    let (indicator, header_len) = decode_uleb128(data)?;
    let rest = &data[header_len..];
    if indicator & 1 == 1 {
        let run_length = (indicator >> 1) as usize;
        let byte_len = ceil8(run_length * num_bits as usize);
        if rest.len() < byte_len {
            return Err(oos_err!(
                "bitpacked run claims {} values but only {} bytes remain",
                run_length,
                rest.len()
            ));
        }
        Ok((
            Run::Bitpacked {
                packed: &rest[..byte_len],
                run_length,
            },
            header_len + byte_len,
        ))
    } else {
        let run_length = (indicator >> 1) as usize;
        let value_len = ceil8(num_bits as usize);
        if rest.len() < value_len {
            return Err(oos_err!("rle run header truncated"));
        }
        let mut value: u32 = 0;
        for (i, &byte) in rest[..value_len].iter().enumerate() {
            value |= (byte as u32) << (8 * i);
        }
        Ok((Run::Rle { value, run_length }, header_len + value_len))
    }
}

/// Decodes exactly `count` values at `num_bits` width from a hybrid
/// RLE/bit-packing stream with no outer length prefix (used for
/// dictionary indices and `DATA_PAGE_V2` level streams, whose lengths
/// are known up front). Returns the values and the number of bytes
/// consumed, which may be less than `data.len()` if trailing runs are
/// unused.
pub fn decode(data: &[u8], num_bits: u8, count: usize) -> Result<(Vec<u32>, usize)> {
    if num_bits == 0 {
        return Ok((vec![0; count], 0));
    }
    let mut out = Vec::with_capacity(count);
    let mut consumed = 0usize;
    while out.len() < count {
        if consumed >= data.len() {
            return Err(oos_err!(
                "hybrid rle stream exhausted after {} of {} values",
                out.len(),
                count
            ));
        }
        let (run, run_len) = read_run(&data[consumed..], num_bits)?;
        consumed += run_len;
        let remaining = count - out.len();
        match run {
            Run::Rle { value, run_length } => {
                let take = run_length.min(remaining);
                out.extend(std::iter::repeat(value).take(take));
            }
            Run::Bitpacked { packed, run_length } => {
                let values = unpack(packed, num_bits, run_length)?;
                let take = run_length.min(remaining);
                out.extend_from_slice(&values[..take]);
            }
        }
    }
    Ok((out, consumed))
}

/// Decodes a level or RLE-boolean stream prefixed by its own 4-byte
/// little-endian length, as `DATA_PAGE` (v1) embeds them in the page
/// body. Returns the values and total bytes consumed (length prefix
/// included).
pub fn decode_length_prefixed(data: &[u8], num_bits: u8, count: usize) -> Result<(Vec<u32>, usize)> {
    if data.len() < 4 {
        return Err(oos_err!("hybrid rle stream missing 4-byte length prefix"));
    }
    let length = u32::from_le_bytes(data[..4].try_into().unwrap()) as usize;
    let body = data
        .get(4..4 + length)
        .ok_or_else(|| oos_err!("hybrid rle length prefix {} exceeds available data", length))?;
    let (values, _) = decode(body, num_bits, count)?;
    Ok((values, 4 + length))
}

/// Dictionary indices: a single leading byte gives the bit width, then
/// the rest of the page is a hybrid RLE stream with no further framing.
pub fn decode_dictionary_indices(data: &[u8], count: usize) -> Result<Vec<u32>> {
    let &bit_width = data
        .first()
        .ok_or_else(|| oos_err!("dictionary-indices page is empty"))?;
    if bit_width > 32 {
        return Err(oos_err!("dictionary index bit width {} exceeds 32", bit_width));
    }
    let (values, _) = decode(&data[1..], bit_width, count)?;
    Ok(values)
}

/// The smallest bit width able to represent `max_value` distinct index
/// values (0..max_value exclusive), as used to size a dictionary's index
/// stream.
pub fn bit_width_for_dictionary_size(dictionary_len: usize) -> u8 {
    if dictionary_len <= 1 {
        return 0;
    }
    (usize::BITS - (dictionary_len - 1).leading_zeros()) as u8
}

/// The bit width a definition/repetition level stream needs to represent
/// every value in `0..=max_level`.
pub fn bit_width_for_max_level(max_level: i16) -> u8 {
    if max_level <= 0 {
        return 0;
    }
    (u32::BITS - (max_level as u32).leading_zeros()) as u8
}
