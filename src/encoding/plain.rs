//! `PLAIN`: values laid out back-to-back with no framing beyond each
//! type's own fixed or length-prefixed shape.

use crate::error::{oos_err, Result};

fn take<'a>(data: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    let slice = data
        .get(*pos..*pos + len)
        .ok_or_else(|| oos_err!("plain-encoded value truncated"))?;
    *pos += len;
    Ok(slice)
}

pub fn read_i32(data: &[u8], count: usize) -> Result<Vec<i32>> {
    let mut pos = 0;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(i32::from_le_bytes(take(data, &mut pos, 4)?.try_into().unwrap()));
    }
    Ok(out)
}

pub fn read_i64(data: &[u8], count: usize) -> Result<Vec<i64>> {
    let mut pos = 0;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(i64::from_le_bytes(take(data, &mut pos, 8)?.try_into().unwrap()));
    }
    Ok(out)
}

/// INT96 has no native Rust integer type; the 12 raw bytes are carried
/// through and interpreted by the logical-type converter on demand.
pub fn read_i96(data: &[u8], count: usize) -> Result<Vec<[u8; 12]>> {
    let mut pos = 0;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(take(data, &mut pos, 12)?.try_into().unwrap());
    }
    Ok(out)
}

pub fn read_f32(data: &[u8], count: usize) -> Result<Vec<f32>> {
    let mut pos = 0;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(f32::from_le_bytes(take(data, &mut pos, 4)?.try_into().unwrap()));
    }
    Ok(out)
}

pub fn read_f64(data: &[u8], count: usize) -> Result<Vec<f64>> {
    let mut pos = 0;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(f64::from_le_bytes(take(data, &mut pos, 8)?.try_into().unwrap()));
    }
    Ok(out)
}

pub fn read_fixed_len_byte_array(
    data: &[u8],
    type_length: usize,
    count: usize,
) -> Result<Vec<Vec<u8>>> {
    let mut pos = 0;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(take(data, &mut pos, type_length)?.to_vec());
    }
    Ok(out)
}

pub fn read_byte_array(data: &[u8], count: usize) -> Result<Vec<Vec<u8>>> {
    let mut pos = 0;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let len_bytes = take(data, &mut pos, 4)?;
        let len = u32::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
        out.push(take(data, &mut pos, len)?.to_vec());
    }
    Ok(out)
}

/// `BOOLEAN` is the one `PLAIN` shape narrower than a byte: values are
/// bit-packed LSB-first, 8 per byte, with the final byte padded.
pub fn read_boolean(data: &[u8], count: usize) -> Result<Vec<bool>> {
    let required = crate::encoding::bitpacking::ceil8(count);
    if data.len() < required {
        return Err(oos_err!(
            "plain boolean column needs {} bytes, only {} available",
            required,
            data.len()
        ));
    }
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let byte = data[i / 8];
        out.push((byte >> (i % 8)) & 1 == 1);
    }
    Ok(out)
}
