//! `DELTA_BINARY_PACKED`: a self-describing header (block size, miniblock
//! count, total value count, first value) followed by blocks of
//! min-delta + per-miniblock bit widths + bit-packed deltas. Used
//! directly for `INT32`/`INT64` columns, and as the length stream
//! underneath `DELTA_LENGTH_BYTE_ARRAY` and `DELTA_BYTE_ARRAY`.

use crate::encoding::bitpacking::{ceil8, unpack};
use crate::encoding::varint::{decode_uleb128, decode_zigzag};
use crate::error::{oos_err, Result};

/// Decodes a full `DELTA_BINARY_PACKED` stream, returning the values and
/// the number of bytes consumed (trailing bytes beyond the stream are
/// untouched, matching how a page may pack several such streams back to
/// back).
pub fn decode(data: &[u8]) -> Result<(Vec<i64>, usize)> {
    let mut pos = 0usize;

    let (block_size, len) = decode_uleb128(&data[pos..])?;
    pos += len;
    if block_size == 0 || block_size % 128 != 0 {
        return Err(oos_err!(
            "delta binary packed block size {} is not a positive multiple of 128",
            block_size
        ));
    }

    let (num_mini_blocks, len) = decode_uleb128(&data[pos..])?;
    pos += len;
    let num_mini_blocks = num_mini_blocks as usize;
    if num_mini_blocks == 0 {
        return Err(oos_err!("delta binary packed header has zero mini-blocks"));
    }
    if block_size % num_mini_blocks as u64 != 0 {
        return Err(oos_err!(
            "block size {} not divisible by {} mini-blocks",
            block_size,
            num_mini_blocks
        ));
    }
    let values_per_mini_block = (block_size / num_mini_blocks as u64) as usize;
    if values_per_mini_block % 8 != 0 {
        return Err(oos_err!(
            "mini-block size {} is not a multiple of 8",
            values_per_mini_block
        ));
    }

    let (total_count, len) = decode_uleb128(&data[pos..])?;
    pos += len;
    let total_count = total_count as usize;

    if total_count == 0 {
        // A header with no values still needs a first_value field per spec.
        let (_first_value, len) = decode_zigzag(&data[pos..])?;
        pos += len;
        return Ok((Vec::new(), pos));
    }

    let (first_value, len) = decode_zigzag(&data[pos..])?;
    pos += len;

    let mut out = Vec::with_capacity(total_count);
    out.push(first_value);
    let mut previous = first_value;

    while out.len() < total_count {
        let (min_delta, len) = decode_zigzag(&data[pos..])?;
        pos += len;

        let bitwidths = data
            .get(pos..pos + num_mini_blocks)
            .ok_or_else(|| oos_err!("delta binary packed block header truncated"))?;
        pos += num_mini_blocks;

        for &num_bits in bitwidths {
            if out.len() == total_count {
                break;
            }
            let remaining = total_count - out.len();
            let take = remaining.min(values_per_mini_block);

            if num_bits == 0 {
                for _ in 0..take {
                    previous += min_delta;
                    out.push(previous);
                }
                continue;
            }
            if num_bits > 32 {
                return Err(oos_err!("delta mini-block bit width {} exceeds 32", num_bits));
            }
            let miniblock_bytes = ceil8(values_per_mini_block * num_bits as usize);
            let packed = data
                .get(pos..pos + miniblock_bytes)
                .ok_or_else(|| oos_err!("delta binary packed mini-block truncated"))?;
            pos += miniblock_bytes;

            let unpacked = unpack(packed, num_bits, take)?;
            for raw in unpacked {
                previous += min_delta + raw as i64;
                out.push(previous);
            }
        }
    }

    Ok((out, pos))
}
