//! Block codec: a miniblock stream concatenated into one logical byte
//! sequence.
//!
//! Decoding always runs inside an `isolate(N, …)` window computed from the
//! header (`recordBlockIndexPos - (512 + metaInfoLength*2)`); a miniblock
//! stream that under- or over-runs that window is a fatal format error,
//! enforced by `isolate` itself rather than by this module.

use std::io::{Cursor, Read, Write};
use yxdb_core::error::Result;
use yxdb_core::io::{ByteReader, ByteWriter};

use crate::miniblock;

/// Target size, in bytes, of a miniblock chunk when splitting an encode
/// payload that was not already pre-chunked by the caller.
pub const MINIBLOCK_THRESHOLD: usize = 65_536;

/// Decode a block: repeatedly decode miniblocks until the isolated window
/// is exhausted, concatenating their payloads.
pub fn decode(reader: &mut ByteReader<Cursor<Vec<u8>>>) -> Result<Vec<u8>> {
    let total = reader.get_ref().get_ref().len() as u64;
    let mut output = Vec::new();
    while reader.bytes_read() < total {
        let payload = miniblock::decode(reader)?;
        output.extend_from_slice(&payload);
    }
    Ok(output)
}

/// Decode exactly one miniblock from `reader`, bounded by `*remaining`
/// bytes of the enclosing block-stream window, without materializing the
/// rest of the stream.
///
/// Returns `Ok(None)` once `remaining` bytes have all been consumed. Used
/// by [`crate::stream::RecordReader`] to pull the block stream one
/// miniblock at a time, so at most one miniblock's worth of decoded bytes
/// is resident regardless of how many records the file holds.
pub fn decode_one<R: Read>(
    reader: &mut ByteReader<R>,
    remaining: &mut usize,
) -> Result<Option<Vec<u8>>> {
    if *remaining == 0 {
        return Ok(None);
    }

    let before = reader.bytes_read();
    let payload = miniblock::decode(reader)?;
    let consumed = (reader.bytes_read() - before) as usize;

    if consumed > *remaining {
        return Err(yxdb_core::error::YxdbError::record_stream_malformed(
            "miniblock decode ran past the end of the block stream window",
        ));
    }
    *remaining -= consumed;
    Ok(Some(payload))
}

/// Encode a block by splitting `payload` into `MINIBLOCK_THRESHOLD`-sized
/// miniblocks. An empty payload still emits exactly one empty miniblock.
pub fn encode<W: Write>(writer: &mut ByteWriter<W>, payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        return miniblock::encode(writer, &[]);
    }

    for chunk in payload.chunks(MINIBLOCK_THRESHOLD) {
        miniblock::encode(writer, chunk)?;
    }
    Ok(())
}

/// Encode a block from an already-chunked sequence of miniblock payloads,
/// preserving the caller's chunk boundaries (e.g. one chunk per flushed
/// batch of records).
pub fn encode_chunks<W: Write>(writer: &mut ByteWriter<W>, chunks: &[Vec<u8>]) -> Result<()> {
    if chunks.is_empty() {
        return miniblock::encode(writer, &[]);
    }
    for chunk in chunks {
        miniblock::encode(writer, chunk)?;
    }
    Ok(())
}
