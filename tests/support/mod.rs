//! A tiny thrift-compact struct writer used only to hand-build minimal
//! Parquet files for the end-to-end tests in this directory. Mirrors the
//! encoder helper already used in `src/page.rs`'s own unit tests
//! (`thrift_page_header`/`zigzag_push`), generalized enough to build a
//! whole footer rather than a single page header.
//!
//! There is no general-purpose Thrift writer here, on purpose: the
//! library itself never writes Parquet, so this exists purely as test
//! tooling, the way `parquet2`'s own `tests/it` hand-builds fixtures
//! instead of depending on a reference writer.

pub struct ThriftWriter {
    pub buf: Vec<u8>,
    last_field_id: i16,
    field_id_stack: Vec<i16>,
}

impl ThriftWriter {
    pub fn new() -> Self {
        ThriftWriter {
            buf: Vec::new(),
            last_field_id: 0,
            field_id_stack: Vec::new(),
        }
    }

    pub fn struct_begin(&mut self) {
        self.field_id_stack.push(self.last_field_id);
        self.last_field_id = 0;
    }

    pub fn struct_end(&mut self) {
        self.buf.push(0x00);
        self.last_field_id = self.field_id_stack.pop().unwrap_or(0);
    }

    fn field_header(&mut self, id: i16, type_code: u8) {
        let delta = id - self.last_field_id;
        if (1..=15).contains(&delta) {
            self.buf.push(((delta as u8) << 4) | type_code);
        } else {
            self.buf.push(type_code);
            self.write_zigzag(id as i64);
        }
        self.last_field_id = id;
    }

    pub fn write_uvarint(&mut self, mut v: u64) {
        loop {
            let mut byte = (v & 0x7f) as u8;
            v >>= 7;
            if v != 0 {
                byte |= 0x80;
            }
            self.buf.push(byte);
            if v == 0 {
                break;
            }
        }
    }

    pub fn write_zigzag(&mut self, v: i64) {
        let zz = ((v << 1) ^ (v >> 63)) as u64;
        self.write_uvarint(zz);
    }

    pub fn field_i32(&mut self, id: i16, v: i32) {
        self.field_header(id, 0x05);
        self.write_zigzag(v as i64);
    }

    pub fn field_i64(&mut self, id: i16, v: i64) {
        self.field_header(id, 0x06);
        self.write_zigzag(v);
    }

    pub fn field_string(&mut self, id: i16, v: &str) {
        self.field_header(id, 0x08);
        self.write_uvarint(v.len() as u64);
        self.buf.extend_from_slice(v.as_bytes());
    }

    /// Begins a struct-valued field; caller follows with the nested
    /// struct's own fields and a trailing `struct_end`.
    pub fn field_struct_begin(&mut self, id: i16) {
        self.field_header(id, 0x0c);
        self.struct_begin();
    }

    /// Writes a list field's header only (short form, `len < 15`); caller
    /// writes each bare element value immediately after.
    pub fn field_list_header(&mut self, id: i16, len: usize, elem_type_code: u8) {
        assert!(len < 15, "test fixtures only need the short list form");
        self.field_header(id, 0x09);
        self.buf.push(((len as u8) << 4) | elem_type_code);
    }

    /// A bare (unframed) i32 list element.
    pub fn list_elem_i32(&mut self, v: i32) {
        self.write_zigzag(v as i64);
    }

    /// A bare (unframed) string list element.
    pub fn list_elem_string(&mut self, v: &str) {
        self.write_uvarint(v.len() as u64);
        self.buf.extend_from_slice(v.as_bytes());
    }

    /// A `bool` field: compact protocol folds the value into the field
    /// header's type code (1 = true, 2 = false) with no payload.
    pub fn field_bool(&mut self, id: i16, v: bool) {
        self.field_header(id, if v { 0x01 } else { 0x02 });
    }
}

/// Compact-protocol element-type codes, as used inside list headers.
pub const CTY_STRUCT: u8 = 0x0c;
pub const CTY_I32: u8 = 0x05;
pub const CTY_STRING: u8 = 0x08;

/// A plain, uncompressed `DATA_PAGE` (v1) of `count` non-null fixed-width
/// values for a required, non-nested column (no rep/def level streams).
pub fn encode_required_data_page_v1(values: &[u8], count: i32) -> Vec<u8> {
    let mut header = ThriftWriter::new();
    header.field_i32(1, 0); // PageType::DataPage
    header.field_i32(2, values.len() as i32); // uncompressed_page_size
    header.field_i32(3, values.len() as i32); // compressed_page_size
    header.field_struct_begin(5); // DataPageHeader
    header.field_i32(1, count); // num_values
    header.field_i32(2, 0); // encoding = PLAIN
    header.field_i32(3, 2); // definition_level_encoding = RLE (unused)
    header.field_i32(4, 2); // repetition_level_encoding = RLE (unused)
    header.struct_end();
    header.struct_end();

    let mut page = header.buf;
    page.extend_from_slice(values);
    page
}

/// Describes one required, non-nested primitive column for
/// [`build_flat_file`]: its name, physical type code, and already-encoded
/// per-row-group page bytes.
pub struct FlatColumn {
    pub name: &'static str,
    pub physical_type: i32,
    /// One entry per row group: that row group's fully encoded page
    /// bytes for this column.
    pub row_group_pages: Vec<Vec<u8>>,
}

/// Builds a complete `.parquet` file with a flat (no nesting, no
/// optional/repeated fields) schema: every column is `REQUIRED` and
/// top-level. Handles multiple row groups.
pub fn build_flat_file(columns: &[FlatColumn], rows_per_group: &[i64]) -> Vec<u8> {
    let num_rows: i64 = rows_per_group.iter().sum();
    let mut out = Vec::new();
    out.extend_from_slice(b"PAR1");

    // Column-major layout: for each row group, each column's pages are
    // written back to back; record offsets so ColumnMetaData can point
    // at them.
    let mut offsets: Vec<Vec<(i64, i64)>> = vec![Vec::new(); rows_per_group.len()];
    for (row_group_index, _) in rows_per_group.iter().enumerate() {
        for column in columns {
            let pages = &column.row_group_pages[row_group_index];
            let offset = out.len() as i64;
            out.extend_from_slice(pages);
            offsets[row_group_index].push((offset, pages.len() as i64));
        }
    }

    let mut w = ThriftWriter::new();
    w.struct_begin(); // FileMetaData
    w.field_i32(1, 1); // version

    w.field_list_header(2, columns.len() + 1, CTY_STRUCT); // schema
    // root group: no physical_type, no repetition (root is implicitly
    // REQUIRED and the decoder never reads its repetition field).
    w.struct_begin();
    w.field_string(4, "schema");
    w.field_i32(5, columns.len() as i32); // num_children
    w.struct_end();
    for column in columns {
        w.struct_begin();
        w.field_i32(1, column.physical_type);
        w.field_i32(3, 0); // Repetition::Required
        w.field_string(4, column.name);
        w.struct_end();
    }

    w.field_i64(3, num_rows);

    w.field_list_header(4, rows_per_group.len(), CTY_STRUCT); // row_groups
    for (row_group_index, &row_count) in rows_per_group.iter().enumerate() {
        w.struct_begin(); // RowGroupMetaData
        w.field_list_header(1, columns.len(), CTY_STRUCT); // columns
        for (column_index, column) in columns.iter().enumerate() {
            let (offset, len) = offsets[row_group_index][column_index];
            w.struct_begin(); // ColumnChunkMetaData
            w.field_i64(2, offset); // file_offset
            w.field_struct_begin(3); // ColumnMetaData
            w.field_i32(1, column.physical_type);
            w.field_list_header(2, 1, CTY_I32); // encodings
            w.list_elem_i32(0); // Encoding::Plain
            w.field_list_header(3, 1, CTY_STRING); // path_in_schema
            w.list_elem_string(column.name);
            w.field_i32(4, 0); // codec = Uncompressed
            w.field_i64(5, row_count); // num_values
            w.field_i64(6, len); // total_uncompressed_size
            w.field_i64(7, len); // total_compressed_size
            w.field_i64(9, offset); // data_page_offset
            w.struct_end(); // ColumnMetaData
            w.struct_end(); // ColumnChunkMetaData
        }
        let total_bytes: i64 = offsets[row_group_index].iter().map(|(_, len)| len).sum();
        w.field_i64(2, total_bytes); // total_byte_size
        w.field_i64(3, row_count); // num_rows
        w.struct_end(); // RowGroupMetaData
    }
    w.struct_end(); // FileMetaData

    let metadata = w.buf;
    out.extend_from_slice(&metadata);
    out.extend_from_slice(&(metadata.len() as i32).to_le_bytes());
    out.extend_from_slice(b"PAR1");
    out
}

// --- General-purpose wire-format helpers for nested/encoded fixtures ---
//
// Everything below generalizes past `build_flat_file`'s required-only,
// PLAIN-only world: optional/repeated columns need rep/def level
// streams, and dictionary/delta encodings need their own byte shapes.
// Each encoder here is the mirror image of the matching decoder in
// `src/encoding` or `src/page.rs` — see those modules' doc comments for
// the wire shapes being reproduced.

pub fn write_uvarint_into(out: &mut Vec<u8>, mut v: u64) {
    loop {
        let mut byte = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if v == 0 {
            break;
        }
    }
}

pub fn write_zigzag_into(out: &mut Vec<u8>, v: i64) {
    let zz = ((v << 1) ^ (v >> 63)) as u64;
    write_uvarint_into(out, zz);
}

/// The smallest bit width able to represent `0..=max_value`, matching
/// `hybrid_rle::bit_width_for_max_level`/`bit_width_for_dictionary_size`.
pub fn bits_needed(max_value: u32) -> u8 {
    if max_value == 0 {
        0
    } else {
        (32 - max_value.leading_zeros()) as u8
    }
}

/// Bit-packs `values` LSB-first within each byte — the mirror of
/// `encoding::bitpacking::unpack`.
pub fn pack_bits(values: &[u32], num_bits: u8) -> Vec<u8> {
    if num_bits == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut bit_buffer: u64 = 0;
    let mut bits_in_buffer: u32 = 0;
    for &v in values {
        bit_buffer |= (v as u64) << bits_in_buffer;
        bits_in_buffer += num_bits as u32;
        while bits_in_buffer >= 8 {
            out.push((bit_buffer & 0xff) as u8);
            bit_buffer >>= 8;
            bits_in_buffer -= 8;
        }
    }
    if bits_in_buffer > 0 {
        out.push((bit_buffer & 0xff) as u8);
    }
    out
}

/// Encodes `values` as a single bit-packed hybrid-RLE run (no outer
/// framing): a uleb128 `(count << 1) | 1` header followed by the packed
/// bytes. `src/encoding/hybrid_rle.rs` treats a bitpacked run's count as
/// the literal number of values, so no run need be padded to a multiple
/// of 8.
fn encode_bitpacked_run(values: &[u32], num_bits: u8) -> Vec<u8> {
    let mut out = Vec::new();
    write_uvarint_into(&mut out, ((values.len() as u64) << 1) | 1);
    out.extend(pack_bits(values, num_bits));
    out
}

/// A definition/repetition level stream, sized for `max_level`, with no
/// length prefix (the shape `DATA_PAGE_V2` and `decode_levels` expect
/// once `src/page.rs` has stripped v1's own framing).
pub fn encode_level_stream(levels: &[i16], max_level: i16) -> Vec<u8> {
    if max_level == 0 {
        return Vec::new();
    }
    let num_bits = bits_needed(max_level as u32);
    let values: Vec<u32> = levels.iter().map(|&l| l as u32).collect();
    encode_bitpacked_run(&values, num_bits)
}

/// Prefixes `body` with its own 4-byte little-endian length, as
/// `DATA_PAGE` v1 embeds each level stream in the page body.
pub fn length_prefixed(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Dictionary indices: a leading bit-width byte, then the indices as one
/// bitpacked hybrid-RLE run.
pub fn encode_dictionary_indices(indices: &[u32], dictionary_len: usize) -> Vec<u8> {
    let num_bits = bits_needed(dictionary_len.saturating_sub(1) as u32);
    let mut out = vec![num_bits];
    out.extend(encode_bitpacked_run(indices, num_bits));
    out
}

/// PLAIN-encoded `BYTE_ARRAY` values: each a 4-byte little-endian length
/// prefix followed by the raw UTF-8 bytes.
pub fn encode_plain_byte_array_values(values: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for v in values {
        out.extend_from_slice(&(v.len() as u32).to_le_bytes());
        out.extend_from_slice(v.as_bytes());
    }
    out
}

/// A `DATA_PAGE` (v1), generalized over optional rep/def level streams
/// and value encoding. `values` is the already-encoded value region
/// (PLAIN bytes, a dictionary-index stream, a delta stream, ...).
pub fn encode_data_page_v1(
    values: &[u8],
    count: i32,
    encoding: i32,
    rep_levels: &[i16],
    max_repetition_level: i16,
    def_levels: &[i16],
    max_definition_level: i16,
) -> Vec<u8> {
    let mut body = Vec::new();
    if max_repetition_level > 0 {
        body.extend(length_prefixed(&encode_level_stream(rep_levels, max_repetition_level)));
    }
    if max_definition_level > 0 {
        body.extend(length_prefixed(&encode_level_stream(def_levels, max_definition_level)));
    }
    body.extend_from_slice(values);

    let mut header = ThriftWriter::new();
    header.field_i32(1, 0); // PageType::DataPage
    header.field_i32(2, body.len() as i32);
    header.field_i32(3, body.len() as i32);
    header.field_struct_begin(5); // DataPageHeader
    header.field_i32(1, count);
    header.field_i32(2, encoding);
    header.field_i32(3, 2); // definition_level_encoding = RLE (unused)
    header.field_i32(4, 2); // repetition_level_encoding = RLE (unused)
    header.struct_end();
    header.struct_end();

    let mut page = header.buf;
    page.extend_from_slice(&body);
    page
}

/// A `DICTIONARY_PAGE` of PLAIN-encoded values.
pub fn encode_dictionary_page(values: &[u8], num_values: i32) -> Vec<u8> {
    let mut header = ThriftWriter::new();
    header.field_i32(1, 2); // PageType::DictionaryPage
    header.field_i32(2, values.len() as i32);
    header.field_i32(3, values.len() as i32);
    header.field_struct_begin(7); // DictionaryPageHeader
    header.field_i32(1, num_values);
    header.field_i32(2, 0); // Encoding::Plain
    header.struct_end();
    header.struct_end();

    let mut page = header.buf;
    page.extend_from_slice(values);
    page
}

/// `DELTA_BINARY_PACKED` over `values`, block size 128 with 4 mini-blocks
/// of 32 values each, spanning as many blocks as needed. `src/encoding/
/// delta_bitpacked.rs::decode` reads a mini-block's packed bytes sized
/// from the mini-block's fixed capacity regardless of how many of its
/// slots are real, so every mini-block here is zero-padded to that
/// capacity before packing.
pub fn encode_delta_binary_packed_i64(values: &[i64]) -> Vec<u8> {
    const BLOCK_SIZE: u64 = 128;
    const NUM_MINI_BLOCKS: u64 = 4;
    const VALUES_PER_MINI_BLOCK: usize = 32;

    let mut out = Vec::new();
    write_uvarint_into(&mut out, BLOCK_SIZE);
    write_uvarint_into(&mut out, NUM_MINI_BLOCKS);
    write_uvarint_into(&mut out, values.len() as u64);

    if values.is_empty() {
        write_zigzag_into(&mut out, 0);
        return out;
    }

    write_zigzag_into(&mut out, values[0]);

    let deltas: Vec<i64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let mut pos = 0usize;
    while pos < deltas.len() {
        let end = (pos + BLOCK_SIZE as usize).min(deltas.len());
        let block_deltas = &deltas[pos..end];
        pos = end;

        let min_delta = block_deltas.iter().copied().min().unwrap();
        write_zigzag_into(&mut out, min_delta);

        let relative: Vec<u32> = block_deltas.iter().map(|&d| (d - min_delta) as u32).collect();

        let mut bitwidths = Vec::with_capacity(NUM_MINI_BLOCKS as usize);
        let mut packed = Vec::new();
        let mut idx = 0usize;
        for _ in 0..NUM_MINI_BLOCKS {
            let take = (relative.len() - idx).min(VALUES_PER_MINI_BLOCK);
            let slice = &relative[idx..idx + take];
            idx += take;
            let max_val = slice.iter().copied().max().unwrap_or(0);
            let num_bits = bits_needed(max_val);
            bitwidths.push(num_bits);
            if num_bits > 0 {
                let mut padded = slice.to_vec();
                padded.resize(VALUES_PER_MINI_BLOCK, 0);
                packed.extend(pack_bits(&padded, num_bits));
            }
        }
        out.extend_from_slice(&bitwidths);
        out.extend_from_slice(&packed);
    }

    out
}

/// A `LogicalType` union variant, for [`SchemaElementSpec::logical_type`].
pub enum LogicalTypeSpec {
    Date,
    /// `unit`: 0 = Millis, 1 = Micros, 2 = Nanos.
    Timestamp { unit: u8, is_adjusted_to_utc: bool },
    Decimal { scale: i32, precision: i32 },
    Uuid,
    /// The bare `LIST` annotation: a group's sole repeated child is
    /// retagged into the transparent 3-level wrapper once this is set.
    List,
}

/// One `SchemaElement`, built independent of `build_flat_file`'s
/// required-top-level-only assumption: carries repetition, nesting
/// (`num_children`), and logical-type annotations.
pub struct SchemaElementSpec {
    pub name: &'static str,
    /// `None` only for the schema root. 0 = Required, 1 = Optional,
    /// 2 = Repeated otherwise.
    pub repetition: Option<i32>,
    pub physical_type: Option<i32>,
    pub type_length: Option<i32>,
    pub num_children: Option<i32>,
    pub logical_type: Option<LogicalTypeSpec>,
}

impl SchemaElementSpec {
    pub fn group(name: &'static str, repetition: i32, num_children: i32) -> Self {
        SchemaElementSpec {
            name,
            repetition: Some(repetition),
            physical_type: None,
            type_length: None,
            num_children: Some(num_children),
            logical_type: None,
        }
    }

    fn primitive(name: &'static str, repetition: i32, physical_type: i32) -> Self {
        SchemaElementSpec {
            name,
            repetition: Some(repetition),
            physical_type: Some(physical_type),
            type_length: None,
            num_children: None,
            logical_type: None,
        }
    }

    pub fn required(name: &'static str, physical_type: i32) -> Self {
        Self::primitive(name, 0, physical_type)
    }

    pub fn optional(name: &'static str, physical_type: i32) -> Self {
        Self::primitive(name, 1, physical_type)
    }

    pub fn repeated(name: &'static str, physical_type: i32) -> Self {
        Self::primitive(name, 2, physical_type)
    }

    pub fn repeated_group(name: &'static str, num_children: i32) -> Self {
        Self::group(name, 2, num_children)
    }

    pub fn with_type_length(mut self, type_length: i32) -> Self {
        self.type_length = Some(type_length);
        self
    }

    pub fn with_logical_type(mut self, logical_type: LogicalTypeSpec) -> Self {
        self.logical_type = Some(logical_type);
        self
    }

    fn root(num_children: i32) -> Self {
        SchemaElementSpec {
            name: "schema",
            repetition: None,
            physical_type: None,
            type_length: None,
            num_children: Some(num_children),
            logical_type: None,
        }
    }
}

fn write_schema_element(w: &mut ThriftWriter, spec: &SchemaElementSpec) {
    w.struct_begin();
    if let Some(physical_type) = spec.physical_type {
        w.field_i32(1, physical_type);
    }
    if let Some(type_length) = spec.type_length {
        w.field_i32(2, type_length);
    }
    if let Some(repetition) = spec.repetition {
        w.field_i32(3, repetition);
    }
    w.field_string(4, spec.name);
    if let Some(num_children) = spec.num_children {
        w.field_i32(5, num_children);
    }
    if let Some(logical_type) = &spec.logical_type {
        w.field_struct_begin(10); // LogicalType union
        match logical_type {
            LogicalTypeSpec::Date => {
                w.field_struct_begin(6); // DateType
                w.struct_end();
            }
            LogicalTypeSpec::Timestamp { unit, is_adjusted_to_utc } => {
                w.field_struct_begin(8); // TimestampType
                w.field_bool(1, *is_adjusted_to_utc);
                w.field_struct_begin(2); // TimeUnit union
                w.field_struct_begin(1 + *unit as i16); // Millis=1/Micros=2/Nanos=3
                w.struct_end();
                w.struct_end(); // TimeUnit
                w.struct_end(); // TimestampType
            }
            LogicalTypeSpec::Decimal { scale, precision } => {
                w.field_struct_begin(5); // DecimalType
                w.field_i32(1, *scale);
                w.field_i32(2, *precision);
                w.struct_end();
            }
            LogicalTypeSpec::Uuid => {
                w.field_struct_begin(14); // UUIDType
                w.struct_end();
            }
            LogicalTypeSpec::List => {
                w.field_struct_begin(3); // ListType
                w.struct_end();
            }
        }
        w.struct_end(); // LogicalType union
    }
    w.struct_end(); // SchemaElement
}

/// Encodes every non-root element in pre-order, prepending the synthetic
/// root. `root_num_children` is the root's direct child count, which for
/// a nested schema is smaller than `elements.len()` (that also holds
/// deeper descendants); each group element's own `num_children` is what
/// tells the tree-builder how many of the following entries are its
/// children. Returns the concatenated struct bytes and total element
/// count (root included), ready for [`build_file`].
pub fn encode_schema(root_num_children: i32, elements: &[SchemaElementSpec]) -> (Vec<u8>, usize) {
    let root = SchemaElementSpec::root(root_num_children);
    let mut out = Vec::new();
    for spec in std::iter::once(&root).chain(elements.iter()) {
        let mut w = ThriftWriter::new();
        write_schema_element(&mut w, spec);
        out.extend_from_slice(&w.buf);
    }
    (out, elements.len() + 1)
}

/// One column chunk for [`build_file`]: its already-encoded page bytes
/// (optional dictionary page followed by one or more data pages) plus
/// enough metadata to describe it in the footer.
pub struct ColumnChunkSpec {
    pub path_in_schema: Vec<&'static str>,
    pub physical_type: i32,
    pub encodings: Vec<i32>,
    pub bytes: Vec<u8>,
    pub num_values: i64,
    /// Byte length of the leading dictionary page within `bytes`, or 0
    /// when there is none.
    pub dictionary_page_len: usize,
}

impl ColumnChunkSpec {
    pub fn has_dictionary(&self) -> bool {
        self.dictionary_page_len > 0
    }
}

pub struct RowGroupSpec {
    pub num_rows: i64,
    pub columns: Vec<ColumnChunkSpec>,
}

/// Builds a complete `.parquet` file from a pre-encoded schema (see
/// [`encode_schema`]) and row groups whose column chunks carry their own
/// already-encoded page bytes (see [`encode_data_page_v1`]/
/// [`encode_dictionary_page`]). Generalizes [`build_flat_file`] to
/// nested, optional/repeated, and dictionary-encoded schemas.
pub fn build_file(schema_body: Vec<u8>, schema_element_count: usize, row_groups: Vec<RowGroupSpec>) -> Vec<u8> {
    let num_rows: i64 = row_groups.iter().map(|rg| rg.num_rows).sum();
    let mut out = Vec::new();
    out.extend_from_slice(b"PAR1");

    let mut offsets: Vec<Vec<(i64, i64)>> = Vec::new();
    for row_group in &row_groups {
        let mut rg_offsets = Vec::new();
        for column in &row_group.columns {
            let offset = out.len() as i64;
            out.extend_from_slice(&column.bytes);
            rg_offsets.push((offset, column.bytes.len() as i64));
        }
        offsets.push(rg_offsets);
    }

    let mut w = ThriftWriter::new();
    w.struct_begin(); // FileMetaData
    w.field_i32(1, 1); // version

    w.field_list_header(2, schema_element_count, CTY_STRUCT); // schema
    w.buf.extend_from_slice(&schema_body);

    w.field_i64(3, num_rows);

    w.field_list_header(4, row_groups.len(), CTY_STRUCT); // row_groups
    for (row_group_index, row_group) in row_groups.iter().enumerate() {
        w.struct_begin(); // RowGroupMetaData
        w.field_list_header(1, row_group.columns.len(), CTY_STRUCT); // columns
        for (column_index, column) in row_group.columns.iter().enumerate() {
            let (offset, len) = offsets[row_group_index][column_index];
            w.struct_begin(); // ColumnChunkMetaData
            w.field_i64(2, offset); // file_offset
            w.field_struct_begin(3); // ColumnMetaData
            w.field_i32(1, column.physical_type);
            w.field_list_header(2, column.encodings.len(), CTY_I32); // encodings
            for &encoding in &column.encodings {
                w.list_elem_i32(encoding);
            }
            w.field_list_header(3, column.path_in_schema.len(), CTY_STRING); // path_in_schema
            for name in &column.path_in_schema {
                w.list_elem_string(name);
            }
            w.field_i32(4, 0); // codec = Uncompressed
            w.field_i64(5, column.num_values); // num_values
            w.field_i64(6, len); // total_uncompressed_size
            w.field_i64(7, len); // total_compressed_size
            if column.has_dictionary() {
                w.field_i64(9, offset + column.dictionary_page_len as i64); // data_page_offset
                w.field_i64(11, offset); // dictionary_page_offset
            } else {
                w.field_i64(9, offset); // data_page_offset
            }
            w.struct_end(); // ColumnMetaData
            w.struct_end(); // ColumnChunkMetaData
        }
        let total_bytes: i64 = offsets[row_group_index].iter().map(|(_, len)| len).sum();
        w.field_i64(2, total_bytes); // total_byte_size
        w.field_i64(3, row_group.num_rows); // num_rows
        w.struct_end(); // RowGroupMetaData
    }
    w.struct_end(); // FileMetaData

    let metadata = w.buf;
    out.extend_from_slice(&metadata);
    out.extend_from_slice(&(metadata.len() as i32).to_le_bytes());
    out.extend_from_slice(b"PAR1");
    out
}
