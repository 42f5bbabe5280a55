//! The record codec: one row's fixed-portion fields, decoded or encoded in
//! schema order.
//!
//! Variable-data fields (see [`crate::field`]) contribute only their 4-byte
//! fixed-portion descriptor here; this crate does not resolve the
//! variable-data tail into per-field values, and refuses to encode any
//! record whose schema declares a variable-width field. On decode, a record
//! whose schema has any such field is still followed by one u32le-prefixed
//! tail blob covering every variable field in that record; this codec reads
//! and discards it so the record stream stays aligned, without attempting to
//! split it back out per field (see the crate-level Non-goals).

use std::io::{Cursor, Write};
use yxdb_core::error::Result;
use yxdb_core::io::{ByteReader, ByteWriter};

use crate::field::{self, FieldValue};
use crate::schema::RecordInfo;

/// One record: field values parallel to the schema's field sequence.
pub type Record = Vec<FieldValue>;

/// Decode a single record's fixed portion, in schema order, followed by the
/// record's variable-data tail (if the schema has any variable-width field).
pub fn decode(reader: &mut ByteReader<Cursor<Vec<u8>>>, schema: &RecordInfo) -> Result<Record> {
    let record: Record = schema
        .fields
        .iter()
        .map(|f| field::decode_fixed(reader, f))
        .collect::<Result<_>>()?;

    if schema.has_variable_data() {
        let tail_len = reader.read_u32_le()? as usize;
        reader.read_bytes(tail_len)?;
    }

    Ok(record)
}

/// Encode a single record's fixed portion, in schema order.
///
/// Fails with [`yxdb_core::error::YxdbError::VariableDataUnimplemented`]
/// before writing any bytes if the schema declares a variable-width field.
pub fn encode<W: Write>(
    writer: &mut ByteWriter<W>,
    schema: &RecordInfo,
    record: &Record,
) -> Result<()> {
    if schema.has_variable_data() {
        return Err(yxdb_core::error::YxdbError::VariableDataUnimplemented);
    }

    for (value, f) in record.iter().zip(&schema.fields) {
        field::encode_fixed(writer, f, value)?;
    }
    Ok(())
}

/// Decode every record from a block payload, stopping exactly at
/// end-of-input. A partial trailing record (fewer bytes than one full
/// record's fixed width) is a fatal error, not a silent truncation.
pub fn decode_all(payload: &[u8], schema: &RecordInfo) -> Result<Vec<Record>> {
    let len = payload.len();
    let mut reader = ByteReader::new(Cursor::new(payload.to_vec()));
    let mut records = Vec::new();

    while (reader.bytes_read() as usize) < len {
        match decode(&mut reader, schema) {
            Ok(record) => records.push(record),
            Err(yxdb_core::error::YxdbError::Io(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                return Err(yxdb_core::error::YxdbError::record_stream_malformed(
                    "block payload ends with a partial record shorter than the schema's fixed width",
                ));
            }
            Err(e) => return Err(e),
        }
    }

    let consumed = reader.bytes_read() as usize;
    if consumed != len {
        return Err(yxdb_core::error::YxdbError::record_stream_malformed(format!(
            "block payload has {} trailing bytes after the last complete record",
            len - consumed
        )));
    }

    Ok(records)
}

/// Encode every record in `records` into one block payload, in order.
pub fn encode_all(records: &[Record], schema: &RecordInfo) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = ByteWriter::new(&mut buf);
        for record in records {
            encode(&mut writer, schema, record)?;
        }
    }
    Ok(buf)
}
