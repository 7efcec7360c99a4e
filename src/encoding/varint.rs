//! ULEB128 and zigzag varints, as used by `DELTA_BINARY_PACKED` block
//! headers (distinct from the thrift-compact varints in [`crate::thrift`],
//! which share the same bit layout but live on a different wire).

use crate::error::{oos_err, Result};

/// Decodes a ULEB128 varint, returning the value and bytes consumed.
/// Bounds- and overflow-checked, unlike a trusting reference decoder.
pub fn decode_uleb128(buf: &[u8]) -> Result<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    for (consumed, &byte) in buf.iter().enumerate() {
        if shift >= 64 {
            return Err(oos_err!("uleb128 varint longer than 64 bits"));
        }
        result |= u64::from(byte & 0x7f).checked_shl(shift).unwrap_or(0);
        if byte & 0x80 == 0 {
            return Ok((result, consumed + 1));
        }
        shift += 7;
    }
    Err(oos_err!("uleb128 varint truncated"))
}

pub fn decode_zigzag(buf: &[u8]) -> Result<(i64, usize)> {
    let (u, consumed) = decode_uleb128(buf)?;
    Ok(((u >> 1) as i64 ^ -((u & 1) as i64), consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uleb128_roundtrip() {
        let data = [0xe5, 0x8e, 0x26];
        let (value, len) = decode_uleb128(&data).unwrap();
        assert_eq!(value, 624_485);
        assert_eq!(len, 3);
    }

    #[test]
    fn uleb128_truncated_is_an_error() {
        let data = [0x80, 0x80];
        assert!(decode_uleb128(&data).is_err());
    }

    #[test]
    fn zigzag_small_values() {
        let cases = [(0u8, 0i64), (1, -1), (2, 1), (3, -2), (4, 2)];
        for (byte, expected) in cases {
            let (value, _) = decode_zigzag(&[byte]).unwrap();
            assert_eq!(value, expected);
        }
    }
}
