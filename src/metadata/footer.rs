use crate::error::{oos_err, Result};
use crate::thrift::ThriftCompactReader;

use super::file_metadata::FileMetaData;

const FOOTER_SIZE: usize = 8;
const PARQUET_MAGIC: [u8; 4] = *b"PAR1";

/// Parses the footer out of a fully-mapped file.
///
/// Layout:
/// ```text
/// +-------------------------+----------------------+------+
/// |  row groups & pages     | thrift FileMetaData   | A|B  |
/// +-------------------------+----------------------+------+
/// ```
/// where B is a 4-byte little-endian length of the thrift metadata and A
/// is the trailing 4-byte `PAR1` magic. The same magic must also open the
/// file.
pub fn read_file_metadata(buf: &[u8]) -> Result<FileMetaData> {
    if buf.len() < FOOTER_SIZE + PARQUET_MAGIC.len() {
        return Err(oos_err!(
            "file of {} bytes is too small to hold a parquet footer",
            buf.len()
        ));
    }

    if buf[..4] != PARQUET_MAGIC {
        return Err(oos_err!("missing leading PAR1 magic"));
    }
    if buf[buf.len() - 4..] != PARQUET_MAGIC {
        return Err(oos_err!("missing trailing PAR1 magic"));
    }

    let len_bytes = &buf[buf.len() - FOOTER_SIZE..buf.len() - 4];
    let metadata_len = i32::from_le_bytes(len_bytes.try_into().unwrap());
    if metadata_len < 0 {
        return Err(oos_err!("negative footer length {}", metadata_len));
    }
    let metadata_len = metadata_len as usize;

    let footer_start = buf
        .len()
        .checked_sub(FOOTER_SIZE + metadata_len)
        .ok_or_else(|| oos_err!("footer length {} exceeds file size", metadata_len))?;

    let metadata_bytes = &buf[footer_start..buf.len() - FOOTER_SIZE];
    let mut reader = ThriftCompactReader::new(metadata_bytes);
    FileMetaData::decode(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_small_file() {
        let buf = [0u8; 4];
        assert!(read_file_metadata(&buf).is_err());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = vec![0u8; 16];
        buf[..4].copy_from_slice(b"PAR1");
        buf[12..16].copy_from_slice(b"XXXX");
        assert!(read_file_metadata(&buf).is_err());
    }
}
