//! Decompression codecs. A reader only ever decompresses, so unlike the
//! teacher's two-way `Codec` trait this crate exposes one direction.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{general_err, Result};
use crate::metadata::types::Compression;

/// A Parquet page compression codec.
pub trait Decompressor: std::fmt::Debug + Send {
    /// Decompresses `input` into a buffer of exactly `uncompressed_size`
    /// bytes, as declared by the page header.
    fn decompress(&mut self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>>;
}

/// Builds the codec for a chunk's declared compression, or `None` for
/// `UNCOMPRESSED` (the common case, callers should skip the allocation
/// entirely rather than round-trip through an identity codec).
pub fn create_decompressor(codec: Compression) -> Result<Option<Box<dyn Decompressor>>> {
    match codec {
        Compression::Uncompressed => Ok(None),
        #[cfg(feature = "snappy")]
        Compression::Snappy => Ok(Some(Box::new(snappy::SnappyDecompressor::new()))),
        #[cfg(feature = "gzip")]
        Compression::Gzip => Ok(Some(Box::new(gzip::GzipDecompressor::new()))),
        #[cfg(feature = "brotli")]
        Compression::Brotli => Ok(Some(Box::new(brotli_codec::BrotliDecompressor::new()))),
        #[cfg(feature = "lz4")]
        Compression::Lz4 => Ok(Some(Box::new(lz4::Lz4Decompressor::new()))),
        #[cfg(feature = "lz4")]
        Compression::Lz4Raw => Ok(Some(Box::new(lz4::Lz4RawDecompressor::new()))),
        #[cfg(feature = "zstd")]
        Compression::Zstd => Ok(Some(Box::new(zstd_codec::ZstdDecompressor::new()))),
        other => Err(general_err!("compression codec {:?} is not enabled", other)),
    }
}

/// Per-codec decompressor factories, consulted before falling back to
/// [`create_decompressor`]'s built-in set. Lets a host override or add a
/// codec (say, a vendored `LZO` implementation) without forking the
/// reader.
#[derive(Clone, Default)]
pub struct DecompressorRegistry {
    overrides: HashMap<Compression, Arc<dyn Fn() -> Box<dyn Decompressor> + Send + Sync>>,
}

impl std::fmt::Debug for DecompressorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecompressorRegistry")
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DecompressorRegistry {
    /// Registers a factory for `codec`, shadowing the built-in one (if
    /// any) for readers using this registry.
    pub fn with_override(
        mut self,
        codec: Compression,
        factory: impl Fn() -> Box<dyn Decompressor> + Send + Sync + 'static,
    ) -> Self {
        self.overrides.insert(codec, Arc::new(factory));
        self
    }

    pub fn create(&self, codec: Compression) -> Result<Option<Box<dyn Decompressor>>> {
        if let Some(factory) = self.overrides.get(&codec) {
            return Ok(Some(factory()));
        }
        create_decompressor(codec)
    }
}

#[cfg(feature = "snappy")]
mod snappy {
    use super::Decompressor;
    use crate::error::{general_err, Result};

    #[derive(Debug, Default)]
    pub struct SnappyDecompressor;

    impl SnappyDecompressor {
        pub fn new() -> Self {
            Self
        }
    }

    impl Decompressor for SnappyDecompressor {
        fn decompress(&mut self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
            let mut output = vec![0u8; uncompressed_size];
            snap::raw::Decoder::new()
                .decompress(input, &mut output)
                .map_err(|e| general_err!("snappy decompression failed: {}", e))?;
            Ok(output)
        }
    }
}

#[cfg(feature = "gzip")]
mod gzip {
    use super::Decompressor;
    use crate::error::{general_err, Result};
    use std::io::Read;

    #[derive(Debug, Default)]
    pub struct GzipDecompressor;

    impl GzipDecompressor {
        pub fn new() -> Self {
            Self
        }
    }

    impl Decompressor for GzipDecompressor {
        fn decompress(&mut self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
            let mut output = vec![0u8; uncompressed_size];
            flate2::read::GzDecoder::new(input)
                .read_exact(&mut output)
                .map_err(|e| general_err!("gzip decompression failed: {}", e))?;
            Ok(output)
        }
    }
}

#[cfg(feature = "brotli")]
mod brotli_codec {
    use super::Decompressor;
    use crate::error::{general_err, Result};
    use std::io::Read;

    const BUFFER_SIZE: usize = 4096;

    #[derive(Debug, Default)]
    pub struct BrotliDecompressor;

    impl BrotliDecompressor {
        pub fn new() -> Self {
            Self
        }
    }

    impl Decompressor for BrotliDecompressor {
        fn decompress(&mut self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
            let mut output = vec![0u8; uncompressed_size];
            brotli::Decompressor::new(input, BUFFER_SIZE)
                .read_exact(&mut output)
                .map_err(|e| general_err!("brotli decompression failed: {}", e))?;
            Ok(output)
        }
    }
}

#[cfg(feature = "zstd")]
mod zstd_codec {
    use super::Decompressor;
    use crate::error::{general_err, Result};
    use std::io::Read;

    #[derive(Debug, Default)]
    pub struct ZstdDecompressor;

    impl ZstdDecompressor {
        pub fn new() -> Self {
            Self
        }
    }

    impl Decompressor for ZstdDecompressor {
        fn decompress(&mut self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
            let mut output = vec![0u8; uncompressed_size];
            zstd::Decoder::new(input)
                .map_err(|e| general_err!("zstd decompression failed: {}", e))?
                .read_exact(&mut output)
                .map_err(|e| general_err!("zstd decompression failed: {}", e))?;
            Ok(output)
        }
    }
}

#[cfg(feature = "lz4")]
mod lz4 {
    use super::Decompressor;
    use crate::error::{general_err, Result};

    /// Parquet's plain `LZ4` codec is notoriously ambiguous: some writers
    /// (old Hadoop `Lz4Codec`) emit the Hadoop frame format, others emit
    /// raw LZ4 blocks with no framing at all, and files labeled plain
    /// `LZ4` have shipped with both historically, with nothing in
    /// `ColumnMetaData` to tell them apart. We try the frame format first
    /// and fall back to a raw block decode using the page's declared
    /// uncompressed size.
    #[derive(Debug, Default)]
    pub struct Lz4Decompressor;

    impl Lz4Decompressor {
        pub fn new() -> Self {
            Self
        }
    }

    impl Decompressor for Lz4Decompressor {
        fn decompress(&mut self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
            let framed = (|| -> std::io::Result<Vec<u8>> {
                let mut decoder = lz4_flex::frame::FrameDecoder::new(input);
                let mut out = Vec::new();
                std::io::Read::read_to_end(&mut decoder, &mut out)?;
                Ok(out)
            })();
            if let Ok(output) = framed {
                if output.len() == uncompressed_size {
                    return Ok(output);
                }
            }
            log::warn!("LZ4 page did not parse as framed; falling back to a raw block decode");
            lz4_flex::block::decompress(input, uncompressed_size)
                .map_err(|e| general_err!("lz4 decompression failed: {}", e))
        }
    }

    /// `LZ4_RAW`: the column metadata unambiguously advertises a bare LZ4
    /// block, so there is no frame format to try first.
    #[derive(Debug, Default)]
    pub struct Lz4RawDecompressor;

    impl Lz4RawDecompressor {
        pub fn new() -> Self {
            Self
        }
    }

    impl Decompressor for Lz4RawDecompressor {
        fn decompress(&mut self, input: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
            lz4_flex::block::decompress(input, uncompressed_size)
                .map_err(|e| general_err!("lz4_raw decompression failed: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_needs_no_decompressor() {
        assert!(create_decompressor(Compression::Uncompressed)
            .unwrap()
            .is_none());
    }

    #[cfg(feature = "snappy")]
    #[test]
    fn snappy_roundtrip() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let compressed = snap::raw::Encoder::new().compress_vec(&original).unwrap();
        let mut codec = create_decompressor(Compression::Snappy).unwrap().unwrap();
        let out = codec.decompress(&compressed, original.len()).unwrap();
        assert_eq!(out, original);
    }

    #[cfg(feature = "lz4")]
    #[test]
    fn lz4_raw_rejects_framed_input_lz4_falls_back() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let raw_block = lz4_flex::block::compress(&original);

        // LZ4_RAW never attempts the frame format: a raw block decodes
        // directly regardless of what plain LZ4 would have tried first.
        let mut raw_codec = create_decompressor(Compression::Lz4Raw).unwrap().unwrap();
        assert_eq!(
            raw_codec.decompress(&raw_block, original.len()).unwrap(),
            original
        );

        // Plain LZ4 tries the frame format first, then falls back to the
        // same raw block decode when framing fails.
        let mut lz4_codec = create_decompressor(Compression::Lz4).unwrap().unwrap();
        assert_eq!(
            lz4_codec.decompress(&raw_block, original.len()).unwrap(),
            original
        );
    }
}
