//! Opens memory-mapped Parquet files and exposes a row-batched cursor
//! that assembles projected columns into nested records one row group
//! at a time. Pagination within a row group is just slicing the
//! [`ColumnChunkBatch`](crate::column::ColumnChunkBatch) values that
//! [`crate::column`] already materializes eagerly.

use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use memmap2::Mmap;
use rayon::prelude::*;

use crate::assembly::{assemble_leaf, merge_records, reshape, Value};
use crate::column::read_column_chunk;
use crate::compression::DecompressorRegistry;
use crate::error::{general_err, Result};
use crate::logical;
use crate::metadata::types::LogicalType;
use crate::metadata::{read_file_metadata, FileMetaData};
use crate::projection::Projection;
use crate::schema::{ColumnDescriptor, SchemaDescriptor};

const DEFAULT_BATCH_SIZE: usize = 8192;
const MAX_BATCH_SIZE: usize = 1024 * 1024;

/// Configuration shared by [`FileReader::open_with_options`] and
/// [`open_all`].
#[derive(Clone)]
pub struct ReaderOptions {
    /// Maximum number of records a single [`RowCursor::next_batch`] call
    /// returns. Default 8192, capped at 1Mi.
    pub batch_size: usize,
    /// Codec factories consulted before the built-in decompressor set.
    pub decompressors: DecompressorRegistry,
    /// Check each page's optional CRC32 against its header.
    pub crc_validate: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            batch_size: DEFAULT_BATCH_SIZE,
            decompressors: DecompressorRegistry::default(),
            crc_validate: false,
        }
    }
}

impl ReaderOptions {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(general_err!(
                "batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE,
                self.batch_size
            ));
        }
        Ok(())
    }
}

struct Inner {
    path: PathBuf,
    mmap: Mmap,
    metadata: FileMetaData,
    schema: SchemaDescriptor,
    options: ReaderOptions,
}

/// A memory-mapped Parquet file with its footer and schema already
/// parsed. Cheap to clone: clones share the same mapping and metadata.
#[derive(Clone)]
pub struct FileReader(Arc<Inner>);

impl FileReader {
    /// Maps `path` and parses its footer, using default [`ReaderOptions`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ReaderOptions) -> Result<Self> {
        options.validate()?;
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        // The mapping is read-only and the file is not expected to be
        // mutated out from under us for the reader's lifetime.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        let metadata = read_file_metadata(&mmap)?;
        let schema = SchemaDescriptor::from_elements(&metadata.schema)?;
        log::debug!(
            "opened {:?}: {} rows across {} row groups",
            path,
            metadata.num_rows,
            metadata.row_groups.len()
        );
        Ok(FileReader(Arc::new(Inner {
            path,
            mmap,
            metadata,
            schema,
            options,
        })))
    }

    pub fn path(&self) -> &Path {
        &self.0.path
    }

    pub fn metadata(&self) -> &FileMetaData {
        &self.0.metadata
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.0.schema
    }

    pub fn num_rows(&self) -> i64 {
        self.0.metadata.num_rows
    }

    /// A cursor over this file's rows, yielding batches of at most
    /// `options.batch_size` assembled records.
    pub fn row_cursor(&self, projection: Projection) -> RowCursor {
        RowCursor::new(self.clone(), projection)
    }

    /// Releases this reader's reference to the memory mapping. The
    /// mapping itself stays resident until every clone (and every
    /// [`RowCursor`] built from one) is also dropped.
    pub fn close(self) {}

    /// Decodes and assembles every projected column of one row group,
    /// fanning out across columns with rayon and merging the per-column
    /// trees into complete records.
    fn load_row_group(&self, row_group_index: usize, projection: &Projection) -> Result<Vec<Value>> {
        let row_group = self
            .0
            .metadata
            .row_groups
            .get(row_group_index)
            .ok_or_else(|| general_err!("row group {} out of range", row_group_index))?;
        let num_rows = row_group.num_rows as usize;
        let indices = projection.resolve(&self.0.schema);

        let per_leaf: Vec<Vec<Value>> = indices
            .par_iter()
            .map(|&column_index| -> Result<Vec<Value>> {
                let descriptor = self.0.schema.column(column_index).ok_or_else(|| {
                    general_err!("projected column {} out of range", column_index)
                })?;
                let chunk_meta = row_group.columns.get(column_index).ok_or_else(|| {
                    general_err!(
                        "row group {} has no column chunk at index {}",
                        row_group_index,
                        column_index
                    )
                })?;
                let (start, len) = chunk_meta.byte_range();
                let buf = self
                    .0
                    .mmap
                    .get(start as usize..(start + len) as usize)
                    .ok_or_else(|| general_err!("column chunk byte range exceeds file bounds"))?;
                let batch = read_column_chunk(
                    buf,
                    descriptor,
                    chunk_meta.meta_data.codec,
                    self.0.options.crc_validate,
                    &self.0.options.decompressors,
                )?;
                log::trace!(
                    "row group {} column {} ({}): decoded {} values",
                    row_group_index,
                    column_index,
                    descriptor.dotted_path(),
                    batch.values.len(),
                );
                assemble_leaf(
                    &descriptor.path,
                    &batch.definition_levels,
                    &batch.repetition_levels,
                    &batch.values,
                    num_rows,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let merged = merge_records(&per_leaf, num_rows)?;
        let reshaped = merged
            .into_iter()
            .map(|record| reshape(&self.0.schema.root, record))
            .collect::<Result<Vec<_>>>()?;
        log::debug!(
            "row group {} assembled {} records",
            row_group_index,
            reshaped.len()
        );
        Ok(reshaped)
    }
}

/// A row-batched cursor over one file, advancing row group by row group.
///
/// Exposes two layers over the same underlying batch loader: the batch
/// API ([`next_batch`](Self::next_batch)), returning a `Vec<Value>` at a
/// time, and the single-record API (`has_next`/`next`/the typed
/// getters/`close`) most callers want, which buffers batches internally
/// and hands out one record at a time.
pub struct RowCursor {
    reader: FileReader,
    projection: Projection,
    batch_size: usize,
    next_row_group: usize,
    pending: std::vec::IntoIter<Value>,
    row_buffer: VecDeque<Value>,
    current: Option<Value>,
    closed: bool,
}

impl RowCursor {
    fn new(reader: FileReader, projection: Projection) -> Self {
        let batch_size = reader.0.options.batch_size;
        RowCursor {
            reader,
            projection,
            batch_size,
            next_row_group: 0,
            pending: Vec::new().into_iter(),
            row_buffer: VecDeque::new(),
            current: None,
            closed: false,
        }
    }

    /// Returns up to `batch_size` records, loading and assembling
    /// further row groups as needed. `None` once every row group in the
    /// file has been consumed.
    pub fn next_batch(&mut self) -> Result<Option<Vec<Value>>> {
        let mut batch = Vec::with_capacity(self.batch_size);
        loop {
            for value in self.pending.by_ref() {
                batch.push(value);
                if batch.len() == self.batch_size {
                    return Ok(Some(batch));
                }
            }
            if self.next_row_group >= self.reader.0.metadata.row_groups.len() {
                return Ok(if batch.is_empty() { None } else { Some(batch) });
            }
            let records = self
                .reader
                .load_row_group(self.next_row_group, &self.projection)?;
            self.next_row_group += 1;
            self.pending = records.into_iter();
        }
    }

    /// Reports whether a further call to [`next`](Self::next) would
    /// advance to another record, pulling and buffering the next batch
    /// if the current one is exhausted. Always `false` after
    /// [`close`](Self::close).
    pub fn has_next(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        if self.row_buffer.is_empty() {
            if let Some(batch) = self.next_batch()? {
                self.row_buffer.extend(batch);
            }
        }
        Ok(!self.row_buffer.is_empty())
    }

    /// Advances to the next record, returning `false` (and leaving no
    /// current record) once the file is exhausted.
    pub fn next(&mut self) -> Result<bool> {
        if !self.has_next()? {
            self.current = None;
            return Ok(false);
        }
        self.current = self.row_buffer.pop_front();
        Ok(true)
    }

    /// Stops the cursor: further `has_next`/`next` calls return `false`
    /// without touching the underlying file.
    pub fn close(&mut self) {
        self.closed = true;
        self.row_buffer.clear();
        self.pending = Vec::new().into_iter();
        self.current = None;
    }

    fn current_record(&self) -> Result<&Value> {
        self.current
            .as_ref()
            .ok_or_else(|| general_err!("next() has not yet produced a current record"))
    }

    fn column_descriptor(&self, name: &str) -> Result<&ColumnDescriptor> {
        self.reader
            .0
            .schema
            .columns
            .iter()
            .find(|c| c.dotted_path() == name)
            .ok_or_else(|| general_err!("no such column `{}`", name))
    }

    fn effective_logical(&self, descriptor: &ColumnDescriptor) -> Option<LogicalType> {
        logical::effective_logical_type(
            descriptor.converted_type,
            descriptor.logical_type,
            descriptor.precision,
            descriptor.scale,
        )
    }

    /// Whether the named field of the current record is `Value::Null`.
    pub fn is_null(&self, name: &str) -> Result<bool> {
        Ok(matches!(navigate(self.current_record()?, name)?, Value::Null))
    }

    pub fn get_i32(&self, name: &str) -> Result<i32> {
        match navigate(self.current_record()?, name)? {
            Value::Int32(v) => Ok(*v),
            other => Err(type_mismatch(name, "INT32", other)),
        }
    }

    pub fn get_i64(&self, name: &str) -> Result<i64> {
        match navigate(self.current_record()?, name)? {
            Value::Int64(v) => Ok(*v),
            other => Err(type_mismatch(name, "INT64", other)),
        }
    }

    pub fn get_f32(&self, name: &str) -> Result<f32> {
        match navigate(self.current_record()?, name)? {
            Value::Float(v) => Ok(*v),
            other => Err(type_mismatch(name, "FLOAT", other)),
        }
    }

    pub fn get_f64(&self, name: &str) -> Result<f64> {
        match navigate(self.current_record()?, name)? {
            Value::Double(v) => Ok(*v),
            other => Err(type_mismatch(name, "DOUBLE", other)),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool> {
        match navigate(self.current_record()?, name)? {
            Value::Boolean(v) => Ok(*v),
            other => Err(type_mismatch(name, "BOOLEAN", other)),
        }
    }

    pub fn get_binary(&self, name: &str) -> Result<&[u8]> {
        match navigate(self.current_record()?, name)? {
            Value::ByteArray(v) | Value::FixedLenByteArray(v) => Ok(v),
            other => Err(type_mismatch(name, "BYTE_ARRAY", other)),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<String> {
        match navigate(self.current_record()?, name)? {
            Value::ByteArray(bytes) => logical::string_from_bytes(bytes),
            other => Err(type_mismatch(name, "STRING", other)),
        }
    }

    pub fn get_date(&self, name: &str) -> Result<chrono::NaiveDate> {
        match navigate(self.current_record()?, name)? {
            Value::Int32(days) => logical::date_from_days(*days),
            other => Err(type_mismatch(name, "DATE", other)),
        }
    }

    pub fn get_time(&self, name: &str) -> Result<chrono::NaiveTime> {
        let descriptor = self.column_descriptor(name)?;
        let unit = match self.effective_logical(descriptor) {
            Some(LogicalType::Time { unit, .. }) => unit,
            _ => return Err(general_err!("column `{}` has no TIME logical type", name)),
        };
        match navigate(self.current_record()?, name)? {
            Value::Int32(v) => logical::time_from_raw(*v as i64, unit),
            Value::Int64(v) => logical::time_from_raw(*v, unit),
            other => Err(type_mismatch(name, "TIME", other)),
        }
    }

    pub fn get_timestamp(&self, name: &str) -> Result<chrono::DateTime<chrono::Utc>> {
        if let Value::Int96(raw) = navigate(self.current_record()?, name)? {
            return logical::timestamp_from_int96(*raw);
        }
        let descriptor = self.column_descriptor(name)?;
        let unit = match self.effective_logical(descriptor) {
            Some(LogicalType::Timestamp { unit, .. }) => unit,
            _ => return Err(general_err!("column `{}` has no TIMESTAMP logical type", name)),
        };
        match navigate(self.current_record()?, name)? {
            Value::Int64(v) => logical::timestamp_from_raw(*v, unit),
            other => Err(type_mismatch(name, "TIMESTAMP", other)),
        }
    }

    pub fn get_decimal(&self, name: &str) -> Result<logical::Decimal> {
        let descriptor = self.column_descriptor(name)?;
        let scale = match self.effective_logical(descriptor) {
            Some(LogicalType::Decimal { scale, .. }) => scale,
            _ => return Err(general_err!("column `{}` has no DECIMAL logical type", name)),
        };
        match navigate(self.current_record()?, name)? {
            Value::Int32(v) => Ok(logical::decimal_from_i32(*v, scale)),
            Value::Int64(v) => Ok(logical::decimal_from_i64(*v, scale)),
            Value::ByteArray(bytes) | Value::FixedLenByteArray(bytes) => {
                logical::decimal_from_be_bytes(bytes, scale)
            }
            other => Err(type_mismatch(name, "DECIMAL", other)),
        }
    }

    pub fn get_uuid(&self, name: &str) -> Result<uuid::Uuid> {
        match navigate(self.current_record()?, name)? {
            Value::FixedLenByteArray(bytes) => logical::uuid_from_bytes(bytes),
            other => Err(type_mismatch(name, "UUID", other)),
        }
    }

    pub fn get_struct(&self, name: &str) -> Result<&[(String, Value)]> {
        navigate(self.current_record()?, name)?
            .as_struct_fields()
            .ok_or_else(|| general_err!("column `{}` is not a struct", name))
    }

    pub fn get_list(&self, name: &str) -> Result<&[Value]> {
        match navigate(self.current_record()?, name)? {
            Value::List(elements) => Ok(elements),
            other => Err(type_mismatch(name, "LIST", other)),
        }
    }

    pub fn get_map(&self, name: &str) -> Result<&[(Value, Value)]> {
        match navigate(self.current_record()?, name)? {
            Value::Map(entries) => Ok(entries),
            other => Err(type_mismatch(name, "MAP", other)),
        }
    }

    /// Specialized list accessor avoiding a `Vec<Value>` of boxed
    /// primitives for the common all-`INT32` case.
    pub fn get_i32_list(&self, name: &str) -> Result<Vec<i32>> {
        self.get_list(name)?
            .iter()
            .map(|v| match v {
                Value::Int32(x) => Ok(*x),
                other => Err(type_mismatch(name, "LIST<INT32>", other)),
            })
            .collect()
    }

    /// Specialized list accessor avoiding a `Vec<Value>` of boxed
    /// primitives for the common all-`INT64` case.
    pub fn get_i64_list(&self, name: &str) -> Result<Vec<i64>> {
        self.get_list(name)?
            .iter()
            .map(|v| match v {
                Value::Int64(x) => Ok(*x),
                other => Err(type_mismatch(name, "LIST<INT64>", other)),
            })
            .collect()
    }
}

fn navigate<'a>(record: &'a Value, name: &str) -> Result<&'a Value> {
    record
        .field(name)
        .ok_or_else(|| general_err!("no such column `{}`", name))
}

fn type_mismatch(name: &str, expected: &str, actual: &Value) -> crate::error::ParquetError {
    general_err!(
        "column `{}` is not {}: assembled value is {:?}",
        name,
        expected,
        actual
    )
}

/// A cursor over several files in sequence, presenting one continuous
/// batch stream. While the current file is being consumed, the next
/// file's footer is parsed in the background on rayon's pool so opening
/// it costs nothing extra once the current file runs dry.
pub struct MultiFileCursor {
    remaining_paths: VecDeque<PathBuf>,
    options: ReaderOptions,
    projection: Projection,
    current: Option<RowCursor>,
    prefetch: Option<mpsc::Receiver<Result<FileReader>>>,
}

impl MultiFileCursor {
    fn spawn_prefetch(&mut self) {
        self.prefetch = self.remaining_paths.pop_front().map(|path| {
            let options = self.options.clone();
            let (tx, rx) = mpsc::channel();
            rayon::spawn(move || {
                let _ = tx.send(FileReader::open_with_options(&path, options));
            });
            rx
        });
    }

    /// Returns up to `batch_size` records, crossing file boundaries
    /// transparently. `None` once every file has been consumed.
    pub fn next_batch(&mut self) -> Result<Option<Vec<Value>>> {
        loop {
            if let Some(cursor) = self.current.as_mut() {
                if let Some(batch) = cursor.next_batch()? {
                    return Ok(Some(batch));
                }
                self.current = None;
            }
            let Some(rx) = self.prefetch.take() else {
                return Ok(None);
            };
            let reader = rx
                .recv()
                .map_err(|_| general_err!("file prefetch thread disconnected"))??;
            log::debug!("multi-file cursor advanced to {:?}", reader.path());
            self.current = Some(reader.row_cursor(self.projection.clone()));
            self.spawn_prefetch();
        }
    }
}

impl Iterator for MultiFileCursor {
    type Item = Result<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}

/// Opens `paths` in order as one continuous row stream, using default
/// [`ReaderOptions`].
pub fn open_all(paths: Vec<PathBuf>, projection: Projection) -> Result<MultiFileCursor> {
    open_all_with_options(paths, projection, ReaderOptions::default())
}

pub fn open_all_with_options(
    paths: Vec<PathBuf>,
    projection: Projection,
    options: ReaderOptions,
) -> Result<MultiFileCursor> {
    options.validate()?;
    if paths.is_empty() {
        return Err(general_err!("open_all requires at least one file path"));
    }
    let mut cursor = MultiFileCursor {
        remaining_paths: paths.into(),
        options,
        projection,
        current: None,
        prefetch: None,
    };
    cursor.spawn_prefetch();
    Ok(cursor)
}
