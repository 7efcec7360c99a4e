//! `BYTE_STREAM_SPLIT`: each value's bytes are transposed into `width`
//! separate byte planes, trading encoded-size predictability for a
//! compressor-friendly layout. Supported for `FLOAT`, `DOUBLE`, `INT32`,
//! `INT64`, and fixed-width `FIXED_LEN_BYTE_ARRAY` columns.

use crate::error::{oos_err, Result};

/// Un-transposes a byte-stream-split page back into `count` contiguous,
/// little-endian values of `width` bytes each — the same layout `PLAIN`
/// decoding expects.
pub fn decode(data: &[u8], width: usize, count: usize) -> Result<Vec<u8>> {
    if width == 0 {
        return Err(oos_err!("byte_stream_split element width must be positive"));
    }
    let required = width
        .checked_mul(count)
        .ok_or_else(|| oos_err!("byte_stream_split size overflow"))?;
    if data.len() < required {
        return Err(oos_err!(
            "byte_stream_split needs {} bytes, only {} available",
            required,
            data.len()
        ));
    }

    let mut out = vec![0u8; required];
    for plane in 0..width {
        for i in 0..count {
            out[i * width + plane] = data[plane * count + i];
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untransposes_f32_planes() {
        // two f32 values: 1.0f32 = [0,0,128,63], 2.0f32 = [0,0,0,64]
        let planes = [0u8, 0, 0, 0, 128, 0, 63, 64];
        let values = decode(&planes, 4, 2).unwrap();
        assert_eq!(&values[0..4], &[0, 0, 128, 63]);
        assert_eq!(&values[4..8], &[0, 0, 0, 64]);
        assert_eq!(f32::from_le_bytes(values[0..4].try_into().unwrap()), 1.0);
        assert_eq!(f32::from_le_bytes(values[4..8].try_into().unwrap()), 2.0);
    }

    #[test]
    fn truncated_input_is_an_error() {
        assert!(decode(&[0u8; 3], 4, 2).is_err());
    }
}
