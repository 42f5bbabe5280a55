//! The field-codec collaborator: per-type fixed-portion encoding/decoding
//! and the XML type-name ↔ type-tag mapping.
//!
//! Every fixed-width type is followed by a one-byte null flag (0 = present,
//! non-zero = null), except [`FieldType::Bool`], which folds the null state
//! into the value byte itself (0 = false, 1 = true, 2 = null). The four
//! variable-data types (`VString`, `VWString`, `Blob`, `SpatialObject`)
//! share a 4-byte fixed-portion descriptor whose bytes are opaque to the
//! record codec; this crate implements no variable-data write path, so
//! encoding any record containing one of them fails before any bytes are
//! emitted (see [`crate::record`]).

use encoding_rs::WINDOWS_1252;
use std::io::{Cursor, Write};
use yxdb_core::error::{Result, YxdbError};
use yxdb_core::io::{ByteReader, ByteWriter};

/// One field's declared type, size, and scale, as parsed from the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
    /// Declared width, present for types whose fixed portion depends on it
    /// (`FixedDecimal`, `String`, `WString`).
    pub size: Option<i64>,
    /// Declared decimal scale, present only for `FixedDecimal`.
    pub scale: Option<i64>,
}

/// The scalar/varying/blob kinds the field codec knows how to encode and
/// decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `Boolean`: folds null into the value byte.
    Bool,
    /// `Byte`: 1 byte plus a null flag.
    Byte,
    /// `Int16`: 2 bytes LE plus a null flag.
    Int16,
    /// `Int32`: 4 bytes LE plus a null flag.
    Int32,
    /// `Int64`: 8 bytes LE plus a null flag.
    Int64,
    /// `Float`: 4 bytes LE IEEE-754 plus a null flag.
    Float,
    /// `Double`: 8 bytes LE IEEE-754 plus a null flag.
    Double,
    /// `FixedDecimal`: `size` ASCII bytes of decimal text plus a null flag.
    FixedDecimal,
    /// `String`: `size` Windows-1252 bytes plus a null flag.
    String,
    /// `WString`: `size` UTF-16LE code units plus a null flag.
    WString,
    /// `V_String`: 4-byte descriptor, payload in the variable-data tail.
    VString,
    /// `V_WString`: 4-byte descriptor, UTF-16LE payload in the tail.
    VWString,
    /// `Date`: 10 ASCII bytes `YYYY-MM-DD` plus a null flag.
    Date,
    /// `DateTime`: 19 ASCII bytes `YYYY-MM-DD HH:MM:SS` plus a null flag.
    DateTime,
    /// `Blob`: 4-byte descriptor, payload in the variable-data tail.
    Blob,
    /// `SpatialObject`: same wire shape as `Blob`.
    SpatialObject,
}

impl FieldType {
    /// Parse the XML `type="…"` spelling into a [`FieldType`].
    pub fn from_xml_name(name: &str) -> Result<Self> {
        Ok(match name {
            "Boolean" => FieldType::Bool,
            "Byte" => FieldType::Byte,
            "Int16" => FieldType::Int16,
            "Int32" => FieldType::Int32,
            "Int64" => FieldType::Int64,
            "Float" => FieldType::Float,
            "Double" => FieldType::Double,
            "FixedDecimal" => FieldType::FixedDecimal,
            "String" => FieldType::String,
            "WString" => FieldType::WString,
            "V_String" => FieldType::VString,
            "V_WString" => FieldType::VWString,
            "Date" => FieldType::Date,
            "DateTime" => FieldType::DateTime,
            "Blob" => FieldType::Blob,
            "SpatialObject" => FieldType::SpatialObject,
            other => return Err(YxdbError::unknown_field_type(other)),
        })
    }

    /// Render this [`FieldType`] back to its XML `type="…"` spelling.
    pub fn to_xml_name(self) -> &'static str {
        match self {
            FieldType::Bool => "Boolean",
            FieldType::Byte => "Byte",
            FieldType::Int16 => "Int16",
            FieldType::Int32 => "Int32",
            FieldType::Int64 => "Int64",
            FieldType::Float => "Float",
            FieldType::Double => "Double",
            FieldType::FixedDecimal => "FixedDecimal",
            FieldType::String => "String",
            FieldType::WString => "WString",
            FieldType::VString => "V_String",
            FieldType::VWString => "V_WString",
            FieldType::Date => "Date",
            FieldType::DateTime => "DateTime",
            FieldType::Blob => "Blob",
            FieldType::SpatialObject => "SpatialObject",
        }
    }

    /// Whether this type carries its payload in the record's variable-data
    /// tail rather than in the fixed portion.
    pub fn has_variable_data(self) -> bool {
        matches!(
            self,
            FieldType::VString | FieldType::VWString | FieldType::Blob | FieldType::SpatialObject
        )
    }
}

impl Field {
    /// Whether this field's type carries variable data.
    pub fn has_variable_data(&self) -> bool {
        self.field_type.has_variable_data()
    }

    /// Fixed-portion width in bytes, including the null-flag byte (folded
    /// into the value for `Bool`, separate for everything else). Variable-
    /// data types report the 4-byte descriptor width.
    pub fn fixed_width(&self) -> Result<usize> {
        Ok(match self.field_type {
            FieldType::Bool => 1,
            FieldType::Byte => 2,
            FieldType::Int16 => 3,
            FieldType::Int32 => 5,
            FieldType::Int64 => 9,
            FieldType::Float => 5,
            FieldType::Double => 9,
            FieldType::FixedDecimal => self.required_size()? as usize + 1,
            FieldType::String => self.required_size()? as usize + 1,
            FieldType::WString => self.required_size()? as usize * 2 + 1,
            FieldType::Date => 11,
            FieldType::DateTime => 20,
            FieldType::VString
            | FieldType::VWString
            | FieldType::Blob
            | FieldType::SpatialObject => 4,
        })
    }

    fn required_size(&self) -> Result<i64> {
        self.size
            .ok_or(YxdbError::MissingFieldAttribute { attribute: "size" })
    }
}

/// A decoded or to-be-encoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent value; semantics depend on the field's type (see module docs).
    Null,
    /// `Boolean` value.
    Bool(bool),
    /// `Byte` value.
    Byte(u8),
    /// `Int16` value.
    Int16(i16),
    /// `Int32` value.
    Int32(i32),
    /// `Int64` value.
    Int64(i64),
    /// `Float` value.
    Float(f32),
    /// `Double` value.
    Double(f64),
    /// `FixedDecimal` value, stored as its ASCII decimal text.
    FixedDecimal(String),
    /// `String` value, decoded from Windows-1252.
    String(String),
    /// `WString` value, decoded from UTF-16LE.
    WString(String),
    /// `Date` value, stored as its `YYYY-MM-DD` text.
    Date(String),
    /// `DateTime` value, stored as its `YYYY-MM-DD HH:MM:SS` text.
    DateTime(String),
    /// Opaque 4-byte fixed-portion descriptor for a variable-data field,
    /// carried through unresolved because this crate does not decode the
    /// variable-data tail into a value.
    VariableDataDescriptor([u8; 4]),
}

/// Decode one field's fixed portion from `reader` according to `field`.
pub fn decode_fixed(
    reader: &mut ByteReader<Cursor<Vec<u8>>>,
    field: &Field,
) -> Result<FieldValue> {
    Ok(match field.field_type {
        FieldType::Bool => match reader.read_u8()? {
            0 => FieldValue::Bool(false),
            1 => FieldValue::Bool(true),
            _ => FieldValue::Null,
        },
        FieldType::Byte => read_null_flagged(reader, |r| Ok(FieldValue::Byte(r.read_u8()?)))?,
        FieldType::Int16 => {
            read_null_flagged(reader, |r| Ok(FieldValue::Int16(r.read_u16_le()? as i16)))?
        }
        FieldType::Int32 => {
            read_null_flagged(reader, |r| Ok(FieldValue::Int32(r.read_u32_le()? as i32)))?
        }
        FieldType::Int64 => {
            read_null_flagged(reader, |r| Ok(FieldValue::Int64(r.read_u64_le()? as i64)))?
        }
        FieldType::Float => read_null_flagged(reader, |r| {
            Ok(FieldValue::Float(f32::from_bits(r.read_u32_le()?)))
        })?,
        FieldType::Double => read_null_flagged(reader, |r| {
            Ok(FieldValue::Double(f64::from_bits(r.read_u64_le()?)))
        })?,
        FieldType::FixedDecimal => {
            let size = field.required_size()? as usize;
            read_null_flagged(reader, |r| {
                let bytes = r.read_bytes(size)?;
                Ok(FieldValue::FixedDecimal(ascii_text(&bytes)))
            })?
        }
        FieldType::String => {
            let size = field.required_size()? as usize;
            read_null_flagged(reader, |r| {
                let bytes = r.read_bytes(size)?;
                let (text, _, _) = WINDOWS_1252.decode(&bytes);
                Ok(FieldValue::String(trim_nul(&text)))
            })?
        }
        FieldType::WString => {
            let size = field.required_size()? as usize;
            read_null_flagged(reader, |r| {
                let bytes = r.read_bytes(size * 2)?;
                Ok(FieldValue::WString(trim_nul(&decode_utf16le(&bytes))))
            })?
        }
        FieldType::Date => read_null_flagged(reader, |r| {
            let bytes = r.read_bytes(10)?;
            Ok(FieldValue::Date(ascii_text(&bytes)))
        })?,
        FieldType::DateTime => read_null_flagged(reader, |r| {
            let bytes = r.read_bytes(19)?;
            Ok(FieldValue::DateTime(ascii_text(&bytes)))
        })?,
        FieldType::VString
        | FieldType::VWString
        | FieldType::Blob
        | FieldType::SpatialObject => {
            let bytes = reader.read_bytes(4)?;
            let descriptor = [bytes[0], bytes[1], bytes[2], bytes[3]];
            FieldValue::VariableDataDescriptor(descriptor)
        }
    })
}

/// Encode one field's fixed portion to `writer` according to `field`.
///
/// Encoding a variable-data field is always a programmer error at this
/// layer: callers must route through [`crate::record::encode`], which
/// rejects the whole record before calling this function for any of its
/// fields.
pub fn encode_fixed<W: Write>(
    writer: &mut ByteWriter<W>,
    field: &Field,
    value: &FieldValue,
) -> Result<()> {
    match field.field_type {
        FieldType::Bool => {
            let byte = match value {
                FieldValue::Bool(false) => 0,
                FieldValue::Bool(true) => 1,
                FieldValue::Null => 2,
                _ => return Err(type_mismatch(field)),
            };
            writer.write_u8(byte)?;
        }
        FieldType::Byte => write_null_flagged(writer, 1, value, |w, v| match v {
            FieldValue::Byte(b) => w.write_u8(*b),
            _ => Err(type_mismatch(field)),
        })?,
        FieldType::Int16 => write_null_flagged(writer, 2, value, |w, v| match v {
            FieldValue::Int16(i) => w.write_u16_le(*i as u16),
            _ => Err(type_mismatch(field)),
        })?,
        FieldType::Int32 => write_null_flagged(writer, 4, value, |w, v| match v {
            FieldValue::Int32(i) => w.write_u32_le(*i as u32),
            _ => Err(type_mismatch(field)),
        })?,
        FieldType::Int64 => write_null_flagged(writer, 8, value, |w, v| match v {
            FieldValue::Int64(i) => w.write_u64_le(*i as u64),
            _ => Err(type_mismatch(field)),
        })?,
        FieldType::Float => write_null_flagged(writer, 4, value, |w, v| match v {
            FieldValue::Float(f) => w.write_u32_le(f.to_bits()),
            _ => Err(type_mismatch(field)),
        })?,
        FieldType::Double => write_null_flagged(writer, 8, value, |w, v| match v {
            FieldValue::Double(f) => w.write_u64_le(f.to_bits()),
            _ => Err(type_mismatch(field)),
        })?,
        FieldType::FixedDecimal => {
            let size = field.required_size()? as usize;
            write_null_flagged(writer, size, value, |w, v| match v {
                FieldValue::FixedDecimal(text) => w.write_bytes(&pad_ascii(text, size)),
                _ => Err(type_mismatch(field)),
            })?
        }
        FieldType::String => {
            let size = field.required_size()? as usize;
            write_null_flagged(writer, size, value, |w, v| match v {
                FieldValue::String(text) => {
                    let (bytes, _, _) = WINDOWS_1252.encode(text);
                    let mut padded = bytes.into_owned();
                    padded.resize(size, 0);
                    w.write_bytes(&padded)
                }
                _ => Err(type_mismatch(field)),
            })?
        }
        FieldType::WString => {
            let size = field.required_size()? as usize;
            write_null_flagged(writer, size * 2, value, |w, v| match v {
                FieldValue::WString(text) => {
                    let mut units: Vec<u16> = text.encode_utf16().collect();
                    units.resize(size, 0);
                    let bytes: Vec<u8> = units.iter().flat_map(|u| u.to_le_bytes()).collect();
                    w.write_bytes(&bytes)
                }
                _ => Err(type_mismatch(field)),
            })?
        }
        FieldType::Date => write_null_flagged(writer, 10, value, |w, v| match v {
            FieldValue::Date(text) => w.write_bytes(&pad_ascii(text, 10)),
            _ => Err(type_mismatch(field)),
        })?,
        FieldType::DateTime => write_null_flagged(writer, 19, value, |w, v| match v {
            FieldValue::DateTime(text) => w.write_bytes(&pad_ascii(text, 19)),
            _ => Err(type_mismatch(field)),
        })?,
        FieldType::VString
        | FieldType::VWString
        | FieldType::Blob
        | FieldType::SpatialObject => {
            return Err(YxdbError::VariableDataUnimplemented);
        }
    }
    Ok(())
}

fn type_mismatch(field: &Field) -> YxdbError {
    YxdbError::record_stream_malformed(format!(
        "value does not match declared type for field {:?}",
        field.name
    ))
}

/// Read a non-null-folding fixed-width value, preceded by a one-byte null
/// flag (0 = present).
fn read_null_flagged(
    reader: &mut ByteReader<Cursor<Vec<u8>>>,
    read_value: impl FnOnce(&mut ByteReader<Cursor<Vec<u8>>>) -> Result<FieldValue>,
) -> Result<FieldValue> {
    let value = read_value(reader)?;
    let flag = reader.read_u8()?;
    Ok(if flag == 0 { value } else { FieldValue::Null })
}

/// Write a non-null-folding fixed-width value of `width` bytes, followed by
/// a one-byte null flag. `Null` writes `width` zero bytes and a non-zero
/// flag instead of calling `write_value`.
fn write_null_flagged<W: Write>(
    writer: &mut ByteWriter<W>,
    width: usize,
    value: &FieldValue,
    write_value: impl FnOnce(&mut ByteWriter<W>, &FieldValue) -> Result<()>,
) -> Result<()> {
    match value {
        FieldValue::Null => {
            writer.write_bytes(&vec![0u8; width])?;
            writer.write_u8(1)?;
        }
        other => {
            write_value(writer, other)?;
            writer.write_u8(0)?;
        }
    }
    Ok(())
}

fn ascii_text(bytes: &[u8]) -> String {
    trim_nul(&String::from_utf8_lossy(bytes))
}

fn trim_nul(text: &str) -> String {
    text.trim_end_matches('\0').to_string()
}

fn pad_ascii(text: &str, size: usize) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(size, 0);
    bytes
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}
