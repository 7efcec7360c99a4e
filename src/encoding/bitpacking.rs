//! Scalar LSB-first bit unpacking, the primitive `hybrid_rle`'s bitpacked
//! runs (and `PLAIN`-encoded `BOOLEAN` columns) are built on.
//!
//! This is a plain bit-by-bit unpacker rather than a SIMD block decoder:
//! the fixed-block vectorized approach pays for itself at the scale of a
//! columnar engine's hot loop, but a scalar decoder is far easier to keep
//! panic-free against truncated or adversarial pages, which matters more
//! here.

use crate::error::{oos_err, Result};

/// Ceiling division by 8, e.g. the byte length needed to hold `value`
/// bits.
#[inline]
pub fn ceil8(value: usize) -> usize {
    value / 8 + ((value % 8 != 0) as usize)
}

/// Unpacks `count` values of `num_bits` width (1..=32), LSB-first within
/// each byte, from `data`.
pub fn unpack(data: &[u8], num_bits: u8, count: usize) -> Result<Vec<u32>> {
    if num_bits == 0 {
        return Ok(vec![0; count]);
    }
    if num_bits > 32 {
        return Err(oos_err!("bit width {} exceeds 32", num_bits));
    }
    let required = ceil8(count * num_bits as usize);
    if data.len() < required {
        return Err(oos_err!(
            "bitpacked run needs {} bytes, only {} available",
            required,
            data.len()
        ));
    }

    let mut out = Vec::with_capacity(count);
    let mut bit_buffer: u64 = 0;
    let mut bits_in_buffer: u32 = 0;
    let mut byte_pos = 0usize;
    let mask = if num_bits == 32 {
        u32::MAX
    } else {
        (1u32 << num_bits) - 1
    };

    for _ in 0..count {
        while bits_in_buffer < num_bits as u32 {
            bit_buffer |= (data[byte_pos] as u64) << bits_in_buffer;
            bits_in_buffer += 8;
            byte_pos += 1;
        }
        out.push((bit_buffer as u32) & mask);
        bit_buffer >>= num_bits;
        bits_in_buffer -= num_bits as u32;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpacks_3_bit_sequence() {
        // 0..=7 packed at 3 bits each, LSB-first.
        let data = [0b10001000u8, 0b11000110, 0b11111010];
        let result = unpack(&data, 3, 8).unwrap();
        assert_eq!(result, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn unpacks_1_bit_booleans() {
        let data = [0b10101010u8];
        let result = unpack(&data, 1, 8).unwrap();
        assert_eq!(result, vec![0, 1, 0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let data = [0u8];
        assert!(unpack(&data, 5, 8).is_err());
    }
}
