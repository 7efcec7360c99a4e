//! Thrift-compact metadata decoding: `FileMetaData`, `RowGroupMetaData`,
//! `ColumnChunkMetaData`/`ColumnMetaData`, page headers, and the physical /
//! logical / converted type enums they carry.

mod column_chunk;
mod file_metadata;
mod footer;
mod page_header;
mod row_group;
mod schema_element;
mod statistics;
pub mod types;

pub use column_chunk::{ColumnChunkMetaData, ColumnMetaData};
pub use file_metadata::{ColumnOrder, FileMetaData, KeyValue};
pub use footer::read_file_metadata;
pub use page_header::{
    DataPageHeaderV1, DataPageHeaderV2, DictionaryPageHeader, PageHeader, PageHeaderVariant,
};
pub use row_group::RowGroupMetaData;
pub use schema_element::SchemaElement;
pub use statistics::Statistics;
