//! Pull-based streaming interfaces over the block stream's record sequence.
//!
//! [`crate::record::decode_all`]/[`crate::record::encode_all`] and
//! [`crate::file::YxdbFile`] collect every record into one in-memory
//! `Vec`, which the format's own design notes flag as a slow path (see the
//! crate-level memory note). [`RecordReader`] and [`RecordWriter`] are the
//! canonical primary interface: a lazy, pull-based sequence that keeps at
//! most one miniblock's worth of decoded bytes resident, regardless of how
//! many records the file holds.

use std::io::{Cursor, Read, Write};
use yxdb_core::error::{Result, YxdbError};
use yxdb_core::io::{ByteReader, ByteWriter};

use crate::block;
use crate::miniblock;
use crate::record::{self, Record};
use crate::schema::RecordInfo;

/// Records-per-block flush threshold on the write path (see the format's
/// observable constants).
pub const RECORDS_PER_BLOCK: usize = 65_536;

/// A lazy, pull-based reader over one block stream's record sequence.
///
/// Decodes one miniblock at a time and drains its records before pulling
/// the next, so memory use is bounded by one miniblock's payload plus
/// whatever partial record straddles a miniblock boundary, rather than by
/// the total record count.
pub struct RecordReader<R: Read> {
    reader: ByteReader<R>,
    remaining: usize,
    schema: RecordInfo,
    residue: Vec<u8>,
    exhausted: bool,
}

impl<R: Read> RecordReader<R> {
    /// Create a reader over a block stream of exactly `block_stream_len`
    /// bytes (as published by
    /// `header.recordBlockIndexPos - (512 + header.metaInfoLength * 2)`),
    /// decoding records against `schema`.
    pub fn new(reader: R, block_stream_len: usize, schema: RecordInfo) -> Self {
        Self::from_byte_reader(ByteReader::new(reader), block_stream_len, schema)
    }

    pub(crate) fn from_byte_reader(
        reader: ByteReader<R>,
        block_stream_len: usize,
        schema: RecordInfo,
    ) -> Self {
        Self {
            reader,
            remaining: block_stream_len,
            schema,
            residue: Vec::new(),
            exhausted: false,
        }
    }

    /// Pull the next miniblock's payload, appending it to the residue left
    /// over from the previous one. Returns `false` once the block stream's
    /// window is exhausted.
    fn pull_miniblock(&mut self) -> Result<bool> {
        match block::decode_one(&mut self.reader, &mut self.remaining)? {
            Some(payload) => {
                self.residue.extend_from_slice(&payload);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        if self.exhausted {
            return None;
        }

        loop {
            if !self.residue.is_empty() {
                let mut cursor = ByteReader::new(Cursor::new(self.residue.clone()));
                match record::decode(&mut cursor, &self.schema) {
                    Ok(rec) => {
                        let consumed = cursor.bytes_read() as usize;
                        self.residue.drain(..consumed);
                        return Some(Ok(rec));
                    }
                    Err(YxdbError::Io(e))
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        // Not enough bytes yet for a full record; the record
                        // straddles a miniblock boundary, so fall through to
                        // pulling more payload below.
                    }
                    Err(e) => return Some(Err(e)),
                }
            }

            match self.pull_miniblock() {
                Ok(true) => continue,
                Ok(false) => {
                    self.exhausted = true;
                    if self.residue.is_empty() {
                        return None;
                    }
                    return Some(Err(YxdbError::record_stream_malformed(
                        "block stream ended with a partial record",
                    )));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// A pull-based writer over one block stream, flushing one miniblock every
/// [`RECORDS_PER_BLOCK`] records (or on an explicit [`RecordWriter::flush`]
/// or [`RecordWriter::finish`]).
pub struct RecordWriter<W: Write> {
    writer: ByteWriter<W>,
    schema: RecordInfo,
    pending: Vec<Record>,
    emitted_any: bool,
}

impl<W: Write> RecordWriter<W> {
    /// Create a writer emitting miniblocks for `schema`-shaped records to
    /// `writer`.
    pub fn new(writer: W, schema: RecordInfo) -> Self {
        Self {
            writer: ByteWriter::new(writer),
            schema,
            pending: Vec::new(),
            emitted_any: false,
        }
    }

    /// Queue one record, flushing a miniblock automatically once
    /// [`RECORDS_PER_BLOCK`] records have accumulated.
    pub fn write_record(&mut self, record: Record) -> Result<()> {
        self.pending.push(record);
        if self.pending.len() >= RECORDS_PER_BLOCK {
            self.flush()?;
        }
        Ok(())
    }

    /// Encode every pending record into one miniblock and emit it. A no-op
    /// if nothing is pending.
    pub fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let payload = record::encode_all(&self.pending, &self.schema)?;
        self.pending.clear();
        miniblock::encode(&mut self.writer, &payload)?;
        self.emitted_any = true;
        Ok(())
    }

    /// Flush any pending records and, if the stream never emitted a single
    /// miniblock (the zero-record case), emit the mandatory trailing empty
    /// one. Returns the total bytes written to the block stream.
    pub fn finish(mut self) -> Result<u64> {
        self.flush()?;
        if !self.emitted_any {
            miniblock::encode(&mut self.writer, &[])?;
        }
        Ok(self.writer.bytes_written())
    }

    /// Bytes written to the underlying sink so far.
    pub fn bytes_written(&self) -> u64 {
        self.writer.bytes_written()
    }
}
