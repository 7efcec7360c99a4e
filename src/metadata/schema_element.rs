use crate::error::{oos_err, Result};
use crate::thrift::{FieldHeader, ThriftCompactReader};

use super::types::{ConvertedType, LogicalType, PhysicalType, Repetition, TimeUnit};

/// One element of `FileMetaData.schema`'s pre-order list: either a
/// primitive leaf (`num_children` absent/zero and a physical type
/// present) or an interior group.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaElement {
    pub physical_type: Option<PhysicalType>,
    pub type_length: Option<i32>,
    pub repetition_type: Option<Repetition>,
    pub name: String,
    pub num_children: Option<i32>,
    pub converted_type: Option<ConvertedType>,
    pub scale: Option<i32>,
    pub precision: Option<i32>,
    pub field_id: Option<i32>,
    pub logical_type: Option<LogicalType>,
}

impl SchemaElement {
    pub fn is_primitive(&self) -> bool {
        self.physical_type.is_some()
    }

    pub(crate) fn decode(r: &mut ThriftCompactReader) -> Result<Self> {
        let mut physical_type = None;
        let mut type_length = None;
        let mut repetition_type = None;
        let mut name = None;
        let mut num_children = None;
        let mut converted_type = None;
        let mut scale = None;
        let mut precision = None;
        let mut field_id = None;
        let mut logical_type = None;

        r.struct_begin();
        loop {
            match r.read_field_begin()? {
                FieldHeader::Stop => break,
                FieldHeader::BoolField { .. } => {}
                FieldHeader::Field { id, ty } => match id {
                    1 => physical_type = Some(PhysicalType::from_i32(r.read_i32()?)?),
                    2 => type_length = Some(r.read_i32()?),
                    3 => repetition_type = Some(Repetition::from_i32(r.read_i32()?)?),
                    4 => name = Some(r.read_string()?),
                    5 => num_children = Some(r.read_i32()?),
                    6 => converted_type = Some(ConvertedType::from_i32(r.read_i32()?)?),
                    7 => scale = Some(r.read_i32()?),
                    8 => precision = Some(r.read_i32()?),
                    9 => field_id = Some(r.read_i32()?),
                    10 => logical_type = Some(decode_logical_type(r)?),
                    _ => r.skip(ty)?,
                },
            }
        }
        r.struct_end();

        Ok(SchemaElement {
            physical_type,
            type_length,
            repetition_type,
            name: name.ok_or_else(|| oos_err!("SchemaElement missing required field `name`"))?,
            num_children,
            converted_type,
            scale,
            precision,
            field_id,
            logical_type,
        })
    }
}

fn decode_time_unit(r: &mut ThriftCompactReader) -> Result<TimeUnit> {
    r.struct_begin();
    let mut unit = None;
    loop {
        match r.read_field_begin()? {
            FieldHeader::Stop => break,
            FieldHeader::BoolField { .. } => {}
            FieldHeader::Field { id, ty } => {
                // each branch (MILLIS/MICROS/NANOS) is an empty struct
                r.struct_begin();
                loop {
                    match r.read_field_begin()? {
                        FieldHeader::Stop => break,
                        FieldHeader::BoolField { .. } => {}
                        FieldHeader::Field { ty: inner_ty, .. } => r.skip(inner_ty)?,
                    }
                }
                r.struct_end();
                unit = Some(match id {
                    1 => TimeUnit::Millis,
                    2 => TimeUnit::Micros,
                    3 => TimeUnit::Nanos,
                    _ => {
                        let _ = ty;
                        return Err(oos_err!("unknown TimeUnit field {}", id));
                    }
                });
            }
        }
    }
    r.struct_end();
    unit.ok_or_else(|| oos_err!("TimeUnit union had no set field"))
}

/// Decodes the `LogicalType` union: exactly one field is set, naming the
/// annotation and carrying its own parameter struct.
fn decode_logical_type(r: &mut ThriftCompactReader) -> Result<LogicalType> {
    r.struct_begin();
    let mut result = None;
    loop {
        match r.read_field_begin()? {
            FieldHeader::Stop => break,
            FieldHeader::BoolField { .. } => {}
            FieldHeader::Field { id, ty } => {
                result = Some(match id {
                    1 => {
                        skip_empty_struct(r)?;
                        LogicalType::String
                    }
                    2 => {
                        skip_empty_struct(r)?;
                        LogicalType::Map
                    }
                    3 => {
                        skip_empty_struct(r)?;
                        LogicalType::List
                    }
                    4 => {
                        skip_empty_struct(r)?;
                        LogicalType::Enum
                    }
                    5 => {
                        // DecimalType { 1: i32 scale, 2: i32 precision }
                        r.struct_begin();
                        let mut scale = 0;
                        let mut precision = 0;
                        loop {
                            match r.read_field_begin()? {
                                FieldHeader::Stop => break,
                                FieldHeader::BoolField { .. } => {}
                                FieldHeader::Field { id, ty } => match id {
                                    1 => scale = r.read_i32()?,
                                    2 => precision = r.read_i32()?,
                                    _ => r.skip(ty)?,
                                },
                            }
                        }
                        r.struct_end();
                        LogicalType::Decimal { precision, scale }
                    }
                    6 => {
                        skip_empty_struct(r)?;
                        LogicalType::Date
                    }
                    7 => {
                        let (is_adjusted_to_utc, unit) = decode_time_params(r)?;
                        LogicalType::Time {
                            unit,
                            is_adjusted_to_utc,
                        }
                    }
                    8 => {
                        let (is_adjusted_to_utc, unit) = decode_time_params(r)?;
                        LogicalType::Timestamp {
                            unit,
                            is_adjusted_to_utc,
                        }
                    }
                    10 => {
                        // IntType { 1: byte bitWidth, 2: bool isSigned }
                        r.struct_begin();
                        let mut bit_width = 0u8;
                        let mut signed = false;
                        loop {
                            match r.read_field_begin()? {
                                FieldHeader::Stop => break,
                                FieldHeader::BoolField { id, value } => {
                                    if id == 2 {
                                        signed = value;
                                    }
                                }
                                FieldHeader::Field { id, ty } => {
                                    if id == 1 {
                                        bit_width = r.read_byte()?;
                                    } else {
                                        r.skip(ty)?;
                                    }
                                }
                            }
                        }
                        r.struct_end();
                        LogicalType::Integer { bit_width, signed }
                    }
                    11 => {
                        skip_empty_struct(r)?;
                        LogicalType::Unknown
                    }
                    12 => {
                        skip_empty_struct(r)?;
                        LogicalType::Json
                    }
                    13 => {
                        skip_empty_struct(r)?;
                        LogicalType::Bson
                    }
                    14 => {
                        skip_empty_struct(r)?;
                        LogicalType::Uuid
                    }
                    _ => {
                        r.skip(ty)?;
                        continue;
                    }
                });
            }
        }
    }
    r.struct_end();
    result.ok_or_else(|| oos_err!("LogicalType union had no set field"))
}

fn decode_time_params(r: &mut ThriftCompactReader) -> Result<(bool, TimeUnit)> {
    r.struct_begin();
    let mut is_adjusted_to_utc = false;
    let mut unit = TimeUnit::Millis;
    loop {
        match r.read_field_begin()? {
            FieldHeader::Stop => break,
            FieldHeader::BoolField { id, value } => {
                if id == 1 {
                    is_adjusted_to_utc = value;
                }
            }
            FieldHeader::Field { id, ty } => {
                if id == 2 {
                    unit = decode_time_unit(r)?;
                } else {
                    r.skip(ty)?;
                }
            }
        }
    }
    r.struct_end();
    Ok((is_adjusted_to_utc, unit))
}

fn skip_empty_struct(r: &mut ThriftCompactReader) -> Result<()> {
    r.struct_begin();
    loop {
        match r.read_field_begin()? {
            FieldHeader::Stop => break,
            FieldHeader::BoolField { .. } => {}
            FieldHeader::Field { ty, .. } => r.skip(ty)?,
        }
    }
    r.struct_end();
    Ok(())
}

pub(crate) fn decode_list<T>(
    r: &mut ThriftCompactReader,
    mut elem: impl FnMut(&mut ThriftCompactReader) -> Result<T>,
) -> Result<Vec<T>> {
    let (_ty, size) = r.read_list_begin()?;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        out.push(elem(r)?);
    }
    Ok(out)
}
