//! # yxdb
//!
//! A pure Rust codec for the YXDB file format: a binary, block-compressed,
//! record-oriented table format with an XML-serialized schema.
//!
//! ## Layout
//!
//! ```text
//! 0x000  description        64 bytes, UTF-8, zero-padded
//! 0x040  fileId             u32le
//! 0x044  creationDate       u32le
//! 0x048  flags1             u32le
//! 0x04C  flags2             u32le
//! 0x050  metaInfoLength     u32le (UTF-16 code units)
//! 0x054  mystery            u32le
//! 0x058  spatialIndexPos    u64le
//! 0x060  recordBlockIndexPos u64le
//! 0x068  numRecords         u64le
//! 0x070  compressionVersion u32le
//! 0x074  reservedSpace      bytes to offset 0x200
//! 0x200  schema (UTF-16LE XML, metaInfoLength*2 bytes, '\n\0' trailer)
//! …      block stream (miniblocks until recordBlockIndexPos)
//! recordBlockIndexPos: blockIndex (u32 count, then N x u64 offsets)
//! ```
//!
//! ## Modules
//!
//! - [`header`]: the 512-byte fixed header
//! - [`miniblock`]: length-prefixed, optionally LZF-compressed payload framing
//! - [`block`]: concatenation of a miniblock stream into one byte sequence
//! - [`schema`]: the `RecordInfo` XML schema codec
//! - [`field`]: per-type field value encode/decode
//! - [`record`]: one row's fixed-portion fields, in schema order
//! - [`blockindex`]: the trailing array of block offsets
//! - [`file`]: top-level composition of all of the above
//! - [`stream`]: pull-based `RecordReader`/`RecordWriter` for bounded-memory
//!   access to the record sequence
//!
//! ## Example
//!
//! ```
//! use yxdb::field::{Field, FieldType, FieldValue};
//! use yxdb::file::YxdbFile;
//! use yxdb::header::Header;
//! use yxdb::blockindex::BlockIndex;
//! use yxdb::schema::RecordInfo;
//!
//! let schema = RecordInfo {
//!     fields: vec![Field {
//!         name: "x".to_string(),
//!         field_type: FieldType::Int32,
//!         size: None,
//!         scale: None,
//!     }],
//! };
//!
//! let file = YxdbFile {
//!     header: Header::default(),
//!     schema,
//!     records: vec![vec![FieldValue::Int32(1)], vec![FieldValue::Int32(2)]],
//!     block_index: BlockIndex::default(),
//! };
//!
//! let bytes = file.encode().unwrap();
//! let decoded = YxdbFile::decode(&bytes).unwrap();
//! assert_eq!(decoded.records, file.records);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod block;
pub mod blockindex;
pub mod field;
pub mod file;
pub mod header;
pub mod miniblock;
pub mod record;
pub mod schema;
pub mod stream;

pub use field::{Field, FieldType, FieldValue};
pub use file::YxdbFile;
pub use header::Header;
pub use record::Record;
pub use schema::RecordInfo;
pub use stream::{RecordReader, RecordWriter};
pub use yxdb_core::error::{Result, YxdbError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::blockindex::BlockIndex;
    pub use crate::field::{Field, FieldType, FieldValue};
    pub use crate::file::YxdbFile;
    pub use crate::header::Header;
    pub use crate::record::Record;
    pub use crate::schema::RecordInfo;
    pub use crate::stream::{RecordReader, RecordWriter};
    pub use yxdb_core::error::{Result, YxdbError};
}
