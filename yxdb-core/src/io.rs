//! Byte-level I/O primitives shared by every region of the YXDB codec.
//!
//! This module provides `ByteReader`/`ByteWriter` for the little-endian
//! fixed-width integers, raw byte runs, and text encodings the file format
//! is built from, plus an `isolate` helper that runs an inner parser over
//! exactly `n` bytes and fails if it consumes a different number.
//!
//! # Example
//!
//! ```
//! use yxdb_core::io::{ByteReader, ByteWriter};
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! {
//!     let mut writer = ByteWriter::new(&mut output);
//!     writer.write_u32_le(0x00440204).unwrap();
//!     writer.write_u64_le(512).unwrap();
//! }
//!
//! let mut reader = ByteReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_u32_le().unwrap(), 0x00440204);
//! assert_eq!(reader.read_u64_le().unwrap(), 512);
//! ```

use crate::error::{Result, YxdbError};
use std::io::{Cursor, Read, Write};

/// A byte-level reader that wraps any `Read` implementation.
///
/// Tracks the number of bytes consumed so far, which `isolate` uses to
/// detect an inner parser that under- or over-consumes its window.
#[derive(Debug)]
pub struct ByteReader<R: Read> {
    reader: R,
    bytes_read: u64,
}

impl<R: Read> ByteReader<R> {
    /// Create a new `ByteReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            bytes_read: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `ByteReader` and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Total number of bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        self.bytes_read += 1;
        Ok(buf[0])
    }

    /// Read a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.reader.read_exact(&mut buf)?;
        self.bytes_read += 2;
        Ok(u16::from_le_bytes(buf))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.reader.read_exact(&mut buf)?;
        self.bytes_read += 4;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read a little-endian `u64`.
    pub fn read_u64_le(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.reader.read_exact(&mut buf)?;
        self.bytes_read += 8;
        Ok(u64::from_le_bytes(buf))
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.reader.read_exact(&mut buf)?;
        self.bytes_read += n as u64;
        Ok(buf)
    }

    /// Read every remaining byte through end-of-input.
    pub fn read_remaining(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let n = self.reader.read_to_end(&mut buf)?;
        self.bytes_read += n as u64;
        Ok(buf)
    }
}

impl<'a> ByteReader<Cursor<&'a [u8]>> {
    /// Create a reader directly over a byte slice.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(Cursor::new(data))
    }
}

impl<R: Read> ByteReader<R> {
    /// Read exactly `n` bytes from `self`, hand them to `f` as an isolated
    /// in-memory reader, and fail unless `f` consumes all `n` bytes.
    ///
    /// This is the "isolate" primitive used throughout the file codec: the
    /// header is isolated to 512 bytes, the schema to `metaInfoLength * 2`
    /// bytes, and the block stream to `recordBlockIndexPos - (512 +
    /// metaInfoLength*2)` bytes. An inner parser that stops early or tries
    /// to read past the window is a fatal format error.
    pub fn isolate<T>(
        &mut self,
        n: usize,
        label: &str,
        f: impl FnOnce(&mut ByteReader<Cursor<Vec<u8>>>) -> Result<T>,
    ) -> Result<T> {
        let window = self.read_bytes(n)?;
        let mut sub = ByteReader::new(Cursor::new(window));
        let value = f(&mut sub)?;
        let consumed = sub.bytes_read() as usize;
        if consumed != n {
            return Err(YxdbError::isolation_mismatch(label, n, consumed));
        }
        Ok(value)
    }
}

/// A byte-level writer that wraps any `Write` implementation.
///
/// Append-only; tracks the number of bytes written so other components
/// (the header's `metaInfoLength`, the block stream's length) can observe
/// how much a prior stage emitted.
#[derive(Debug)]
pub struct ByteWriter<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> ByteWriter<W> {
    /// Create a new `ByteWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume this `ByteWriter` and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Total number of bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_all(&[value])?;
        self.bytes_written += 1;
        Ok(())
    }

    /// Write a little-endian `u16`.
    pub fn write_u16_le(&mut self, value: u16) -> Result<()> {
        self.writer.write_all(&value.to_le_bytes())?;
        self.bytes_written += 2;
        Ok(())
    }

    /// Write a little-endian `u32`.
    pub fn write_u32_le(&mut self, value: u32) -> Result<()> {
        self.writer.write_all(&value.to_le_bytes())?;
        self.bytes_written += 4;
        Ok(())
    }

    /// Write a little-endian `u64`.
    pub fn write_u64_le(&mut self, value: u64) -> Result<()> {
        self.writer.write_all(&value.to_le_bytes())?;
        self.bytes_written += 8;
        Ok(())
    }

    /// Write a raw byte run.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_integers() {
        let mut output = Vec::new();
        {
            let mut writer = ByteWriter::new(&mut output);
            writer.write_u8(0xAB).unwrap();
            writer.write_u16_le(0x1234).unwrap();
            writer.write_u32_le(0x89ABCDEF).unwrap();
            writer.write_u64_le(0x0123456789ABCDEF).unwrap();
        }

        let mut reader = ByteReader::from_slice(&output);
        assert_eq!(reader.read_u8().unwrap(), 0xAB);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_le().unwrap(), 0x89ABCDEF);
        assert_eq!(reader.read_u64_le().unwrap(), 0x0123456789ABCDEF);
    }

    #[test]
    fn test_bytes_written_tracks_output() {
        let mut output = Vec::new();
        let mut writer = ByteWriter::new(&mut output);
        writer.write_u32_le(1).unwrap();
        writer.write_bytes(b"hello").unwrap();
        assert_eq!(writer.bytes_written(), 9);
    }

    #[test]
    fn test_isolate_exact_consumption_succeeds() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut reader = ByteReader::from_slice(&data);
        let result = reader
            .isolate(4, "test-region", |inner| {
                let a = inner.read_u16_le()?;
                let b = inner.read_u16_le()?;
                Ok((a, b))
            })
            .unwrap();
        assert_eq!(result, (0x0201, 0x0403));
        // Two bytes remain outside the isolated window.
        assert_eq!(reader.read_remaining().unwrap(), vec![5, 6]);
    }

    #[test]
    fn test_isolate_under_consumption_fails() {
        let data = [1u8, 2, 3, 4];
        let mut reader = ByteReader::from_slice(&data);
        let err = reader
            .isolate(4, "test-region", |inner| inner.read_u16_le().map_err(Into::into))
            .unwrap_err();
        assert!(matches!(err, YxdbError::IsolationMismatch { .. }));
    }

    #[test]
    fn test_isolate_over_consumption_fails() {
        let data = [1u8, 2];
        let mut reader = ByteReader::from_slice(&data);
        let err = reader
            .isolate(2, "test-region", |inner| inner.read_u32_le().map_err(Into::into))
            .unwrap_err();
        assert!(matches!(err, YxdbError::Io(_)));
    }

    #[test]
    fn test_read_remaining_consumes_to_eof() {
        let data = [1u8, 2, 3];
        let mut reader = ByteReader::from_slice(&data);
        assert_eq!(reader.read_remaining().unwrap(), vec![1, 2, 3]);
        assert_eq!(reader.bytes_read(), 3);
    }
}
