//! The fixed 512-byte header region at the start of every YXDB file.
//!
//! All multi-byte fields are little-endian. `description` is a zero-padded
//! fixed-width UTF-8 byte run; `mystery` and `reservedSpace` have no known
//! meaning and are preserved byte-for-byte across decode/encode.

use std::io::{Cursor, Write};
use yxdb_core::error::Result;
use yxdb_core::io::{ByteReader, ByteWriter};

/// Total size in bytes of the header region.
pub const HEADER_SIZE: usize = 512;

/// Size in bytes of the `description` field.
const DESCRIPTION_SIZE: usize = 64;

/// Byte offset at which the schema region begins.
pub const SCHEMA_START_OFFSET: u64 = 0x200;

/// `fileId` value for a file that carries a spatial index.
pub const FILE_ID_WITH_SPATIAL_INDEX: u32 = 0x0044_0205;

/// `fileId` value for a file with no spatial index.
pub const FILE_ID_WITHOUT_SPATIAL_INDEX: u32 = 0x0044_0204;

/// Size in bytes of the `reservedSpace` tail, computed so the whole header
/// is exactly [`HEADER_SIZE`] bytes.
const RESERVED_SPACE_SIZE: usize =
    HEADER_SIZE - DESCRIPTION_SIZE - 4 - 4 - 4 - 4 - 4 - 4 - 8 - 8 - 8 - 4;

/// The decoded 512-byte file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Free-text description, at most 64 UTF-8 bytes, zero-padded on encode
    /// and truncated on encode if longer.
    pub description: String,
    /// File identifier; either [`FILE_ID_WITH_SPATIAL_INDEX`] or
    /// [`FILE_ID_WITHOUT_SPATIAL_INDEX`].
    pub file_id: u32,
    /// POSIX timestamp (seconds) truncated to 32 bits.
    pub creation_date: u32,
    /// Opaque flag word 1.
    pub flags1: u32,
    /// Opaque flag word 2.
    pub flags2: u32,
    /// Length of the schema region in UTF-16 code units (so the region is
    /// `meta_info_length * 2` bytes).
    pub meta_info_length: u32,
    /// Opaque field of unknown meaning, preserved verbatim.
    pub mystery: u32,
    /// Byte offset of the spatial index, or 0 if absent.
    pub spatial_index_pos: u64,
    /// Byte offset of the trailing [`crate::blockindex::BlockIndex`].
    pub record_block_index_pos: u64,
    /// Advisory record count; not enforced against the decoded stream.
    pub num_records: u64,
    /// Compression scheme version.
    pub compression_version: u32,
    /// Opaque trailing bytes filling out the 512-byte page.
    pub reserved_space: Vec<u8>,
}

impl Default for Header {
    /// A blank header with no spatial index and compression version 1.
    /// The three forward-pointing fields (`meta_info_length`,
    /// `record_block_index_pos`, `num_records`) are recomputed by
    /// [`crate::file::YxdbFile::encode`] regardless of their value here.
    fn default() -> Self {
        Header {
            description: String::new(),
            file_id: FILE_ID_WITHOUT_SPATIAL_INDEX,
            creation_date: 0,
            flags1: 0,
            flags2: 0,
            meta_info_length: 0,
            mystery: 0,
            spatial_index_pos: 0,
            record_block_index_pos: 0,
            num_records: 0,
            compression_version: 1,
            reserved_space: Vec::new(),
        }
    }
}

impl Header {
    /// Decode a [`Header`] from exactly [`HEADER_SIZE`] bytes.
    pub fn decode(reader: &mut ByteReader<Cursor<Vec<u8>>>) -> Result<Self> {
        let description_bytes = reader.read_bytes(DESCRIPTION_SIZE)?;
        let description = decode_description(&description_bytes);

        let file_id = reader.read_u32_le()?;
        let creation_date = reader.read_u32_le()?;
        let flags1 = reader.read_u32_le()?;
        let flags2 = reader.read_u32_le()?;
        let meta_info_length = reader.read_u32_le()?;
        let mystery = reader.read_u32_le()?;
        let spatial_index_pos = reader.read_u64_le()?;
        let record_block_index_pos = reader.read_u64_le()?;
        let num_records = reader.read_u64_le()?;
        let compression_version = reader.read_u32_le()?;
        let reserved_space = reader.read_bytes(RESERVED_SPACE_SIZE)?;

        Ok(Header {
            description,
            file_id,
            creation_date,
            flags1,
            flags2,
            meta_info_length,
            mystery,
            spatial_index_pos,
            record_block_index_pos,
            num_records,
            compression_version,
            reserved_space,
        })
    }

    /// Encode this header to exactly [`HEADER_SIZE`] bytes.
    pub fn encode<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
        writer.write_bytes(&encode_description(&self.description))?;
        writer.write_u32_le(self.file_id)?;
        writer.write_u32_le(self.creation_date)?;
        writer.write_u32_le(self.flags1)?;
        writer.write_u32_le(self.flags2)?;
        writer.write_u32_le(self.meta_info_length)?;
        writer.write_u32_le(self.mystery)?;
        writer.write_u64_le(self.spatial_index_pos)?;
        writer.write_u64_le(self.record_block_index_pos)?;
        writer.write_u64_le(self.num_records)?;
        writer.write_u32_le(self.compression_version)?;

        let mut reserved = self.reserved_space.clone();
        reserved.resize(RESERVED_SPACE_SIZE, 0);
        writer.write_bytes(&reserved)?;
        Ok(())
    }
}

/// Decode the zero-padded description field, trimming trailing NUL bytes.
fn decode_description(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Encode a description string to exactly [`DESCRIPTION_SIZE`] bytes,
/// truncating if too long and zero-padding if short.
fn encode_description(description: &str) -> [u8; DESCRIPTION_SIZE] {
    let mut buf = [0u8; DESCRIPTION_SIZE];
    let bytes = description.as_bytes();
    let len = bytes.len().min(DESCRIPTION_SIZE);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}
