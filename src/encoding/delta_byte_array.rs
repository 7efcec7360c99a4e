//! `DELTA_BYTE_ARRAY`: prefix lengths (`DELTA_BINARY_PACKED`) shared with
//! the previous value, followed by a `DELTA_LENGTH_BYTE_ARRAY` stream of
//! suffixes. Used for sorted/dictionary-like string columns.

use crate::encoding::{delta_bitpacked, delta_length_byte_array};
use crate::error::{oos_err, Result};

pub fn decode(data: &[u8]) -> Result<Vec<Vec<u8>>> {
    let (prefix_lengths, consumed) = delta_bitpacked::decode(data)?;
    let (suffixes, _) = delta_length_byte_array::decode(&data[consumed..])?;

    if prefix_lengths.len() != suffixes.len() {
        return Err(oos_err!(
            "delta byte array has {} prefix lengths but {} suffixes",
            prefix_lengths.len(),
            suffixes.len()
        ));
    }

    let mut values = Vec::with_capacity(suffixes.len());
    let mut previous: Vec<u8> = Vec::new();
    for (prefix_len, suffix) in prefix_lengths.into_iter().zip(suffixes.into_iter()) {
        let prefix_len = usize::try_from(prefix_len)
            .map_err(|_| oos_err!("negative delta byte array prefix length {}", prefix_len))?;
        let prefix = previous
            .get(..prefix_len)
            .ok_or_else(|| oos_err!("delta byte array prefix length exceeds previous value"))?;
        let mut value = Vec::with_capacity(prefix_len + suffix.len());
        value.extend_from_slice(prefix);
        value.extend_from_slice(&suffix);
        previous = value.clone();
        values.push(value);
    }
    Ok(values)
}
