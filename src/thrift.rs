//! A minimal decoder for the subset of the Thrift compact protocol used by
//! Parquet's footer metadata and page headers.
//!
//! This is not a general Thrift runtime: it has no code generation, no
//! writer, and no support for protocol versions other than "compact". It
//! exists because the specification requires metadata decoding with no
//! dependency on the reference Thrift/Parquet ecosystem.
//!
//! See <https://github.com/apache/thrift/blob/master/doc/specs/thrift-compact-protocol.md>.

use crate::error::{oos_err, Result};

/// The element/field type tags used by the compact protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactType {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    Binary,
    List,
    Set,
    Map,
    Struct,
}

impl CompactType {
    fn from_collection_code(code: u8) -> Result<Self> {
        Ok(match code {
            1 => CompactType::Bool,
            3 => CompactType::Byte,
            4 => CompactType::I16,
            5 => CompactType::I32,
            6 => CompactType::I64,
            7 => CompactType::Double,
            8 => CompactType::Binary,
            9 => CompactType::List,
            10 => CompactType::Set,
            11 => CompactType::Map,
            12 => CompactType::Struct,
            other => return Err(oos_err!("unknown thrift compact type code {}", other)),
        })
    }
}

/// The result of `read_field_begin`: either the end of the enclosing
/// struct, or a field header. Boolean fields carry their value directly in
/// the header (compact-protocol types 1/2), so there is no following
/// payload to read for them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldHeader {
    Stop,
    Field { id: i16, ty: CompactType },
    BoolField { id: i16, value: bool },
}

/// A cursor over a byte buffer decoding the Thrift compact protocol.
///
/// Maintains a field-id stack so that, when descending into a nested
/// struct, the next field-id delta is computed relative to 0 rather than
/// to the enclosing struct's last field id.
pub struct ThriftCompactReader<'a> {
    buf: &'a [u8],
    pos: usize,
    field_id_stack: Vec<i16>,
    last_field_id: i16,
}

impl<'a> ThriftCompactReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            field_id_stack: Vec::new(),
            last_field_id: 0,
        }
    }

    /// Number of bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    fn require(&self, n: usize) -> Result<()> {
        if self.pos + n > self.buf.len() {
            return Err(oos_err!(
                "unexpected end of thrift buffer: need {} bytes, have {}",
                n,
                self.buf.len() - self.pos
            ));
        }
        Ok(())
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.require(1)?;
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn peek_byte(&self) -> Result<u8> {
        self.require(1)?;
        Ok(self.buf[self.pos])
    }

    /// Reads an unsigned LEB128 varint (little-endian base-128, up to 10
    /// continuation bytes for a `u64`).
    pub fn read_uvarint(&mut self) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        for _ in 0..10 {
            let byte = self.read_byte()?;
            result |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
        Err(oos_err!(
            "malformed varint: more than 10 continuation bytes"
        ))
    }

    /// Reads a zigzag-encoded signed varint.
    pub fn read_zigzag(&mut self) -> Result<i64> {
        let u = self.read_uvarint()?;
        Ok(((u >> 1) as i64) ^ -((u & 1) as i64))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_zigzag()? as i16)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_zigzag()? as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_zigzag()
    }

    /// Doubles are stored as 8 raw little-endian bytes, never varint-packed.
    pub fn read_double(&mut self) -> Result<f64> {
        self.require(8)?;
        let bytes: [u8; 8] = self.buf[self.pos..self.pos + 8].try_into().unwrap();
        self.pos += 8;
        Ok(f64::from_le_bytes(bytes))
    }

    pub fn read_binary(&mut self) -> Result<&'a [u8]> {
        let len = self.read_uvarint()? as usize;
        self.require(len)?;
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_binary()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| oos_err!("field is not valid utf-8: {}", e))
    }

    pub fn read_bool_value(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    /// Enters a new struct: field-id deltas inside it start back at 0.
    pub fn struct_begin(&mut self) {
        self.field_id_stack.push(self.last_field_id);
        self.last_field_id = 0;
    }

    /// Leaves the current struct, restoring the enclosing struct's last
    /// field id so that siblings continue to compute correct deltas.
    pub fn struct_end(&mut self) {
        self.last_field_id = self.field_id_stack.pop().unwrap_or(0);
    }

    /// Reads one field header, or `Stop` if the struct has ended.
    pub fn read_field_begin(&mut self) -> Result<FieldHeader> {
        let header = self.read_byte()?;
        if header == 0 {
            return Ok(FieldHeader::Stop);
        }

        let delta = (header & 0xf0) >> 4;
        let type_code = header & 0x0f;

        let id = if delta == 0 {
            self.read_i16()?
        } else {
            self.last_field_id + delta as i16
        };
        self.last_field_id = id;

        Ok(match type_code {
            1 => FieldHeader::BoolField { id, value: true },
            2 => FieldHeader::BoolField { id, value: false },
            3 => FieldHeader::Field {
                id,
                ty: CompactType::Byte,
            },
            4 => FieldHeader::Field {
                id,
                ty: CompactType::I16,
            },
            5 => FieldHeader::Field {
                id,
                ty: CompactType::I32,
            },
            6 => FieldHeader::Field {
                id,
                ty: CompactType::I64,
            },
            7 => FieldHeader::Field {
                id,
                ty: CompactType::Double,
            },
            8 => FieldHeader::Field {
                id,
                ty: CompactType::Binary,
            },
            9 => FieldHeader::Field {
                id,
                ty: CompactType::List,
            },
            10 => FieldHeader::Field {
                id,
                ty: CompactType::Set,
            },
            11 => FieldHeader::Field {
                id,
                ty: CompactType::Map,
            },
            12 => FieldHeader::Field {
                id,
                ty: CompactType::Struct,
            },
            other => return Err(oos_err!("unknown thrift field type code {}", other)),
        })
    }

    /// Skips a value of the given type without materializing it. Used to
    /// tolerate unknown fields written by newer writers.
    pub fn skip(&mut self, ty: CompactType) -> Result<()> {
        match ty {
            CompactType::Bool => {
                self.read_bool_value()?;
            }
            CompactType::Byte => {
                self.read_byte()?;
            }
            CompactType::I16 | CompactType::I32 | CompactType::I64 => {
                self.read_zigzag()?;
            }
            CompactType::Double => {
                self.read_double()?;
            }
            CompactType::Binary => {
                self.read_binary()?;
            }
            CompactType::List | CompactType::Set => {
                let (elem_ty, size) = self.read_list_begin()?;
                for _ in 0..size {
                    self.skip(elem_ty)?;
                }
            }
            CompactType::Map => {
                let (key_ty, val_ty, size) = self.read_map_begin()?;
                for _ in 0..size {
                    self.skip(key_ty)?;
                    self.skip(val_ty)?;
                }
            }
            CompactType::Struct => {
                self.struct_begin();
                loop {
                    match self.read_field_begin()? {
                        FieldHeader::Stop => break,
                        FieldHeader::BoolField { .. } => {}
                        FieldHeader::Field { ty, .. } => self.skip(ty)?,
                    }
                }
                self.struct_end();
            }
        }
        Ok(())
    }

    /// Reads a list/set header: `(element_type, size)`. A short-form header
    /// packs size (0-14) and element type into one byte; size 15 signals an
    /// out-of-line varint size follows.
    pub fn read_list_begin(&mut self) -> Result<(CompactType, usize)> {
        let header = self.read_byte()?;
        let size_nibble = (header & 0xf0) >> 4;
        let type_code = header & 0x0f;
        let size = if size_nibble == 15 {
            self.read_uvarint()? as usize
        } else {
            size_nibble as usize
        };
        Ok((CompactType::from_collection_code(type_code)?, size))
    }

    /// Reads a map header: `(key_type, value_type, size)`. An empty map is
    /// encoded as a single zero byte with no following type byte.
    pub fn read_map_begin(&mut self) -> Result<(CompactType, CompactType, usize)> {
        let size = self.read_uvarint()? as usize;
        if size == 0 {
            // parquet.thrift never defines a bare `map<...>` field, but we
            // still decode the wire form faithfully for completeness.
            return Ok((CompactType::Bool, CompactType::Bool, 0));
        }
        let types = self.read_byte()?;
        let key_ty = CompactType::from_collection_code((types & 0xf0) >> 4)?;
        let val_ty = CompactType::from_collection_code(types & 0x0f)?;
        Ok((key_ty, val_ty, size))
    }
}
