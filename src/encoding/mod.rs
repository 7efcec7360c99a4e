//! Decoders for every value encoding a Parquet page can use. Each
//! submodule implements exactly one encoding from the Parquet encodings
//! document and is oblivious to page framing or compression, which live
//! one layer up in [`crate::page`].

pub mod bitpacking;
pub mod byte_stream_split;
pub mod delta_bitpacked;
pub mod delta_byte_array;
pub mod delta_length_byte_array;
pub mod hybrid_rle;
pub mod plain;
pub mod varint;
