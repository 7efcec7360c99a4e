use crate::error::Result;
use crate::thrift::{FieldHeader, ThriftCompactReader};

/// Raw, undecoded column statistics. Predicate pushdown and
/// statistics-based skipping are non-goals; this struct exists only so
/// that `ColumnMetaData` round-trips the bytes the writer stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub max: Option<Vec<u8>>,
    pub min: Option<Vec<u8>>,
    pub null_count: Option<i64>,
    pub distinct_count: Option<i64>,
    pub max_value: Option<Vec<u8>>,
    pub min_value: Option<Vec<u8>>,
    pub is_max_value_exact: Option<bool>,
    pub is_min_value_exact: Option<bool>,
}

impl Statistics {
    pub(crate) fn decode(r: &mut ThriftCompactReader) -> Result<Self> {
        let mut out = Statistics::default();
        r.struct_begin();
        loop {
            match r.read_field_begin()? {
                FieldHeader::Stop => break,
                FieldHeader::BoolField { id, value } => match id {
                    7 => out.is_max_value_exact = Some(value),
                    8 => out.is_min_value_exact = Some(value),
                    _ => {}
                },
                FieldHeader::Field { id, ty } => match id {
                    1 => out.max = Some(r.read_binary()?.to_vec()),
                    2 => out.min = Some(r.read_binary()?.to_vec()),
                    3 => out.null_count = Some(r.read_i64()?),
                    4 => out.distinct_count = Some(r.read_i64()?),
                    5 => out.max_value = Some(r.read_binary()?.to_vec()),
                    6 => out.min_value = Some(r.read_binary()?.to_vec()),
                    _ => r.skip(ty)?,
                },
            }
        }
        r.struct_end();
        Ok(out)
    }
}
