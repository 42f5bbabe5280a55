//! # yxdb-core
//!
//! Core components for the yxdb-rs codec.
//!
//! This crate provides the fundamental building blocks every region of the
//! file format is built from:
//!
//! - [`io`]: `ByteReader`/`ByteWriter` and the `isolate` sub-reader helper
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! yxdb-rs is layered as:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: File codec (yxdb crate)                              │
//! │     header, schema, record, file composition            │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Block/miniblock codec (yxdb crate) + LZF (yxdb-lzf)  │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Byte I/O (this crate)                                │
//! │     ByteReader/ByteWriter, isolate, error types           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use yxdb_core::io::{ByteReader, ByteWriter};
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! {
//!     let mut writer = ByteWriter::new(&mut output);
//!     writer.write_u32_le(0x00440204).unwrap();
//! }
//!
//! let mut reader = ByteReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_u32_le().unwrap(), 0x00440204);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod io;

// Re-exports for convenience
pub use error::{Result, YxdbError};
pub use io::{ByteReader, ByteWriter};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, YxdbError};
    pub use crate::io::{ByteReader, ByteWriter};
}
