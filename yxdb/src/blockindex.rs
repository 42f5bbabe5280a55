//! The trailing block index: a dense array of block offsets.
//!
//! Wire form: a u32le count `N` followed by exactly `N` little-endian u64
//! offsets. This region runs from `header.record_block_index_pos` to the
//! end of the file.

use std::io::{Cursor, Write};
use yxdb_core::error::Result;
use yxdb_core::io::{ByteReader, ByteWriter};

/// A dense array of block offsets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockIndex {
    /// Byte offsets of each block in the file, in order.
    pub offsets: Vec<u64>,
}

impl BlockIndex {
    /// Decode a [`BlockIndex`] from the remainder of the file.
    pub fn decode(reader: &mut ByteReader<Cursor<Vec<u8>>>) -> Result<Self> {
        let count = reader.read_u32_le()? as usize;
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            offsets.push(reader.read_u64_le()?);
        }
        Ok(BlockIndex { offsets })
    }

    /// Encode this [`BlockIndex`].
    pub fn encode<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
        writer.write_u32_le(self.offsets.len() as u32)?;
        for offset in &self.offsets {
            writer.write_u64_le(*offset)?;
        }
        Ok(())
    }
}
