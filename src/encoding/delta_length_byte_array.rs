//! `DELTA_LENGTH_BYTE_ARRAY`: a `DELTA_BINARY_PACKED` stream of lengths
//! followed by the concatenated value bytes.

use crate::encoding::delta_bitpacked;
use crate::error::{oos_err, Result};

/// Decodes all values, returning them plus total bytes consumed.
pub fn decode(data: &[u8]) -> Result<(Vec<Vec<u8>>, usize)> {
    let (lengths, mut pos) = delta_bitpacked::decode(data)?;

    let mut values = Vec::with_capacity(lengths.len());
    for length in lengths {
        let length = usize::try_from(length)
            .map_err(|_| oos_err!("negative delta-length-byte-array length {}", length))?;
        let slice = data
            .get(pos..pos + length)
            .ok_or_else(|| oos_err!("delta-length-byte-array value truncated"))?;
        values.push(slice.to_vec());
        pos += length;
    }
    Ok((values, pos))
}
