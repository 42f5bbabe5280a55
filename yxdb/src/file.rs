//! Top-level file composition: header, schema, block stream, block index,
//! assembled and decomposed in the order the format publishes.

use std::io::{Cursor, Read, Write};
use yxdb_core::error::Result;
use yxdb_core::io::{ByteReader, ByteWriter};

use crate::block;
use crate::blockindex::BlockIndex;
use crate::header::{Header, HEADER_SIZE};
use crate::record::{self, Record};
use crate::schema::RecordInfo;
use crate::stream::RecordReader;
use crate::stream::RecordWriter;

/// A fully decoded YXDB file.
#[derive(Debug, Clone, PartialEq)]
pub struct YxdbFile {
    /// The 512-byte fixed header.
    pub header: Header,
    /// The parsed schema.
    pub schema: RecordInfo,
    /// Decoded records, in write order.
    pub records: Vec<Record>,
    /// The trailing block index.
    pub block_index: BlockIndex,
}

impl YxdbFile {
    /// Decode a complete YXDB file from `bytes`.
    ///
    /// Follows the published order: 512-byte header, `metaInfoLength * 2`
    /// byte schema, the block stream up to `recordBlockIndexPos`, then the
    /// block index to end-of-input.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(Cursor::new(bytes.to_vec()));

        let header = reader.isolate(HEADER_SIZE, "header", Header::decode)?;

        let schema_len = header.meta_info_length as usize * 2;
        let schema = reader.isolate(schema_len, "schema", |inner| {
            let bytes = inner.read_bytes(schema_len)?;
            RecordInfo::decode(&bytes)
        })?;

        let num_block_bytes =
            header.record_block_index_pos as usize - (HEADER_SIZE + schema_len);
        let payload = reader.isolate(num_block_bytes, "block stream", block::decode)?;

        let records = record::decode_all(&payload, &schema)?;

        let block_index = {
            let remaining = reader.read_remaining()?;
            let remaining_len = remaining.len();
            let mut tail_reader = ByteReader::new(Cursor::new(remaining));
            tail_reader.isolate(remaining_len, "block index", BlockIndex::decode)?
        };

        Ok(YxdbFile {
            header,
            schema,
            records,
            block_index,
        })
    }

    /// Encode this file to a byte buffer, recomputing `metaInfoLength`,
    /// `recordBlockIndexPos`, and `numRecords` from the schema and record
    /// stream rather than trusting whatever the in-memory `header` carries
    /// for those three fields.
    ///
    /// The schema and block stream are rendered to an in-memory buffer
    /// first so the header's forward-pointing fields can be computed
    /// before the header itself is written (see the design notes on the
    /// two-pass header).
    pub fn encode(&self) -> Result<Vec<u8>> {
        let schema_bytes = self.schema.encode()?;

        let block_payload = record::encode_all(&self.records, &self.schema)?;
        let mut block_bytes = Vec::new();
        {
            let mut writer = ByteWriter::new(&mut block_bytes);
            block::encode(&mut writer, &block_payload)?;
        }

        let mut header = self.header.clone();
        header.meta_info_length = (schema_bytes.len() / 2) as u32;
        header.record_block_index_pos =
            (HEADER_SIZE + schema_bytes.len() + block_bytes.len()) as u64;
        header.num_records = self.records.len() as u64;

        let mut output = Vec::with_capacity(header.record_block_index_pos as usize);
        {
            let mut writer = ByteWriter::new(&mut output);
            header.encode(&mut writer)?;
            writer.write_bytes(&schema_bytes)?;
            writer.write_bytes(&block_bytes)?;
            self.block_index.encode(&mut writer)?;
        }

        Ok(output)
    }
}

/// Decode a header and schema from `source`, returning them alongside a
/// [`RecordReader`] over the remaining block stream rather than collecting
/// every record into memory up front. This is the streaming counterpart to
/// [`YxdbFile::decode`], per the format's memory note: callers that only
/// need to scan or fold over records should prefer this entry point.
///
/// The trailing block index is not read; callers that need it should use
/// [`YxdbFile::decode`] instead.
pub fn decode_streaming<R: Read>(source: R) -> Result<(Header, RecordInfo, RecordReader<R>)> {
    let mut reader = ByteReader::new(source);

    let header = reader.isolate(HEADER_SIZE, "header", Header::decode)?;

    let schema_len = header.meta_info_length as usize * 2;
    let schema = reader.isolate(schema_len, "schema", |inner| {
        let bytes = inner.read_bytes(schema_len)?;
        RecordInfo::decode(&bytes)
    })?;

    let num_block_bytes = header.record_block_index_pos as usize - (HEADER_SIZE + schema_len);
    let record_reader = RecordReader::from_byte_reader(reader, num_block_bytes, schema.clone());

    Ok((header, schema, record_reader))
}

/// Encode a header template, schema, and a record source into `sink`,
/// flushing one miniblock per [`crate::stream::RECORDS_PER_BLOCK`] records
/// via [`RecordWriter`] instead of buffering every record as one `Vec`.
///
/// The block stream is still buffered in memory before the header is
/// written, because `meta_info_length`, `record_block_index_pos`, and
/// `num_records` are not known until the whole tail has been rendered (the
/// two-pass header the format's design notes call for); only the *record*
/// stream itself is processed lazily. Returns the total bytes written.
pub fn encode_streaming<W: Write>(
    header_template: &Header,
    schema: &RecordInfo,
    records: impl IntoIterator<Item = Record>,
    block_index: &BlockIndex,
    mut sink: W,
) -> Result<u64> {
    let schema_bytes = schema.encode()?;

    let mut block_bytes = Vec::new();
    let mut count: u64 = 0;
    {
        let mut record_writer = RecordWriter::new(&mut block_bytes, schema.clone());
        for record in records {
            record_writer.write_record(record)?;
            count += 1;
        }
        record_writer.finish()?;
    }

    let mut header = header_template.clone();
    header.meta_info_length = (schema_bytes.len() / 2) as u32;
    header.record_block_index_pos = (HEADER_SIZE + schema_bytes.len() + block_bytes.len()) as u64;
    header.num_records = count;

    let mut writer = ByteWriter::new(&mut sink);
    header.encode(&mut writer)?;
    writer.write_bytes(&schema_bytes)?;
    writer.write_bytes(&block_bytes)?;
    block_index.encode(&mut writer)?;

    Ok(writer.bytes_written())
}
