//! A from-scratch reader for the Apache Parquet file format: footer and
//! page metadata, every value encoding, block decompression, nested
//! record assembly, and logical-type conversion, with no dependency on
//! any reference Parquet or Thrift crate.
//!
//! [`cursor::FileReader::open`] memory-maps a file and parses its
//! footer; [`cursor::FileReader::row_cursor`] hands back a batched
//! iterator of assembled [`assembly::Value`] records, optionally
//! restricted to a [`projection::Projection`]. [`cursor::open_all`]
//! chains several files into one stream.

// `memmap2::Mmap::map` is inherently unsafe (the file must not be
// mutated out from under the mapping); that one call site is carved out
// with `#[allow(unsafe_code)]` in `cursor`, everything else in the crate
// is safe.
#![deny(unsafe_code)]

pub mod error;
pub mod assembly;
pub mod column;
pub mod compression;
pub mod cursor;
pub mod encoding;
pub mod logical;
pub mod metadata;
pub mod page;
pub mod projection;
pub mod schema;
mod thrift;

pub use cursor::{open_all, open_all_with_options, FileReader, MultiFileCursor, ReaderOptions, RowCursor};
pub use error::{ParquetError, Result};
pub use projection::Projection;
