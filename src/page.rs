//! Splits a column chunk's byte range into individual pages: decodes each
//! page's thrift header, decompresses its body, and slices the
//! repetition-level / definition-level / values regions apart. Encoding
//! decode proper (hybrid RLE, delta, dictionary lookups, ...) happens one
//! layer up, in [`crate::column`], which is the one place that knows a
//! column's schema-derived bit widths.

use crate::compression::{Decompressor, DecompressorRegistry};
use crate::error::{oos_err, Result};
use crate::metadata::types::{Compression, Encoding};
use crate::metadata::{PageHeader, PageHeaderVariant};
use crate::thrift::ThriftCompactReader;

/// A decoded `DATA_PAGE`/`DATA_PAGE_V2`, with level streams sliced out
/// but not yet interpreted. `rep_levels`/`def_levels` are empty when the
/// column has no repetition/definition levels to decode (i.e. the
/// schema's max level is 0).
#[derive(Debug)]
pub struct DataPageContent {
    pub num_values: usize,
    pub num_nulls: Option<usize>,
    pub num_rows: Option<usize>,
    pub encoding: Encoding,
    pub rep_levels: Vec<u8>,
    pub def_levels: Vec<u8>,
    pub values: Vec<u8>,
}

#[derive(Debug)]
pub struct DictionaryPageContent {
    pub num_values: usize,
    pub encoding: Encoding,
    pub is_sorted: bool,
    pub values: Vec<u8>,
}

#[derive(Debug)]
pub enum ParsedPage {
    Data(DataPageContent),
    Dictionary(DictionaryPageContent),
}

/// Walks a column chunk's mapped byte range page by page.
pub struct PageScanner<'a> {
    buf: &'a [u8],
    pos: usize,
    compression: Compression,
    max_definition_level: i16,
    max_repetition_level: i16,
    decompressor: Option<Box<dyn Decompressor>>,
    validate_crc: bool,
}

impl<'a> PageScanner<'a> {
    pub fn new(
        buf: &'a [u8],
        compression: Compression,
        max_definition_level: i16,
        max_repetition_level: i16,
    ) -> Result<Self> {
        Self::with_options(
            buf,
            compression,
            max_definition_level,
            max_repetition_level,
            false,
            &DecompressorRegistry::default(),
        )
    }

    /// Like [`PageScanner::new`], but resolves the codec through
    /// `registry` (falling back to the built-in set) and, if
    /// `validate_crc` is set, checks each page's optional CRC32 (computed
    /// over the page body as stored, before decompression) against the
    /// header's declared value when one is present.
    pub fn with_options(
        buf: &'a [u8],
        compression: Compression,
        max_definition_level: i16,
        max_repetition_level: i16,
        validate_crc: bool,
        registry: &DecompressorRegistry,
    ) -> Result<Self> {
        let decompressor = registry.create(compression)?;
        Ok(PageScanner {
            buf,
            pos: 0,
            compression,
            max_definition_level,
            max_repetition_level,
            decompressor,
            validate_crc,
        })
    }

    fn decompress(&mut self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
        match &mut self.decompressor {
            Some(codec) => {
                let out = codec.decompress(input, uncompressed_size)?;
                if out.len() != uncompressed_size {
                    return Err(oos_err!(
                        "page decompressed to {} bytes, header declared {}",
                        out.len(),
                        uncompressed_size
                    ));
                }
                Ok(out)
            }
            None => {
                if input.len() != uncompressed_size {
                    return Err(oos_err!(
                        "uncompressed page body is {} bytes, header declared {}",
                        input.len(),
                        uncompressed_size
                    ));
                }
                Ok(input.to_vec())
            }
        }
    }

    /// Splits a fully-decompressed `DATA_PAGE` (v1) body into its
    /// rep/def/value regions. Each level stream, if present, is prefixed
    /// by its own 4-byte little-endian byte length.
    fn split_v1_body(&self, body: &[u8]) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
        let mut cursor = 0usize;
        let mut take_stream = |has_level: bool, body: &[u8], cursor: &mut usize| -> Result<Vec<u8>> {
            if !has_level {
                return Ok(Vec::new());
            }
            let len_bytes = body
                .get(*cursor..*cursor + 4)
                .ok_or_else(|| oos_err!("data page v1 level stream missing length prefix"))?;
            let len = u32::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
            let stream = body
                .get(*cursor + 4..*cursor + 4 + len)
                .ok_or_else(|| oos_err!("data page v1 level stream truncated"))?
                .to_vec();
            *cursor += 4 + len;
            Ok(stream)
        };

        let rep = take_stream(self.max_repetition_level > 0, body, &mut cursor)?;
        let def = take_stream(self.max_definition_level > 0, body, &mut cursor)?;
        let values = body[cursor..].to_vec();
        Ok((rep, def, values))
    }

    fn read_page_header(&mut self) -> Result<PageHeader> {
        let mut reader = ThriftCompactReader::new(&self.buf[self.pos..]);
        let header = PageHeader::decode(&mut reader)?;
        self.pos += reader.consumed();
        Ok(header)
    }

    fn next_page(&mut self) -> Result<Option<ParsedPage>> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }
        let header = self.read_page_header()?;
        let compressed_size = header.compressed_page_size as usize;
        let body = self
            .buf
            .get(self.pos..self.pos + compressed_size)
            .ok_or_else(|| oos_err!("page body truncated"))?;
        self.pos += compressed_size;

        if self.validate_crc {
            if let Some(expected) = header.crc {
                let actual = crc32fast::hash(body) as i32;
                if actual != expected {
                    return Err(oos_err!(
                        "page crc mismatch: header declared {}, computed {}",
                        expected,
                        actual
                    ));
                }
            }
        }

        match header.variant {
            PageHeaderVariant::Dictionary(dict_header) => {
                let values = self.decompress(body, header.uncompressed_page_size as usize)?;
                Ok(Some(ParsedPage::Dictionary(DictionaryPageContent {
                    num_values: dict_header.num_values as usize,
                    encoding: dict_header.encoding,
                    is_sorted: dict_header.is_sorted.unwrap_or(false),
                    values,
                })))
            }
            PageHeaderVariant::V1(v1) => {
                let decompressed = self.decompress(body, header.uncompressed_page_size as usize)?;
                let (rep_levels, def_levels, values) = self.split_v1_body(&decompressed)?;
                Ok(Some(ParsedPage::Data(DataPageContent {
                    num_values: v1.num_values as usize,
                    num_nulls: None,
                    num_rows: None,
                    encoding: v1.encoding,
                    rep_levels,
                    def_levels,
                    values,
                })))
            }
            PageHeaderVariant::V2(v2) => {
                let rep_len = v2.repetition_levels_byte_length as usize;
                let def_len = v2.definition_levels_byte_length as usize;
                let levels_len = rep_len + def_len;
                let levels = body
                    .get(..levels_len)
                    .ok_or_else(|| oos_err!("data page v2 level streams truncated"))?;
                let rep_levels = levels.get(..rep_len).unwrap_or(&[]).to_vec();
                let def_levels = levels.get(rep_len..levels_len).unwrap_or(&[]).to_vec();

                let value_region = &body[levels_len..];
                let uncompressed_value_size =
                    header.uncompressed_page_size as usize - levels_len;
                let values = if v2.is_compressed {
                    self.decompress(value_region, uncompressed_value_size)?
                } else {
                    value_region.to_vec()
                };

                Ok(Some(ParsedPage::Data(DataPageContent {
                    num_values: v2.num_values as usize,
                    num_nulls: Some(v2.num_nulls as usize),
                    num_rows: Some(v2.num_rows as usize),
                    encoding: v2.encoding,
                    rep_levels,
                    def_levels,
                    values,
                })))
            }
        }
    }
}

impl<'a> Iterator for PageScanner<'a> {
    type Item = Result<ParsedPage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page().transpose()
    }
}
