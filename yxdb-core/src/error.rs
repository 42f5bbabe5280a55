//! Error types for yxdb-rs operations.
//!
//! This module provides a comprehensive error type that covers every failure
//! mode the codec can surface: isolated-region truncation, LZF decompression
//! overflow, schema well-formedness, schema/record mismatches, and the
//! acknowledged variable-data write gap.

use std::io;
use thiserror::Error;

/// The main error type for yxdb-rs operations.
#[derive(Debug, Error)]
pub enum YxdbError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An isolated region was under- or over-consumed by its inner parser.
    #[error("{label}: expected to consume {expected} bytes, consumed {actual}")]
    IsolationMismatch {
        /// Label identifying the region (e.g. "header", "schema", "block stream").
        label: String,
        /// Number of bytes the region was isolated to.
        expected: usize,
        /// Number of bytes the inner parser actually consumed.
        actual: usize,
    },

    /// LZF decompression would exceed the fixed output buffer capacity.
    #[error(
        "unable to decompress; increase buffer size? (needed at least {needed} bytes, buffer is {capacity})"
    )]
    DecompressionOverflow {
        /// Minimum bytes needed to hold the decompressed payload.
        needed: usize,
        /// Capacity of the fixed output buffer.
        capacity: usize,
    },

    /// The schema region is not well-formed XML.
    #[error("schema is not well-formed XML: {message}")]
    XmlMalformed {
        /// Description of the parse failure.
        message: String,
    },

    /// No `RecordInfo` element was found in the schema document.
    #[error("no RecordInfo entries found")]
    MissingRecordInfo,

    /// More than one `RecordInfo` element was found in the schema document.
    #[error("too many RecordInfo entries found: {count}")]
    TooManyRecordInfo {
        /// Number of `RecordInfo` elements found.
        count: usize,
    },

    /// A `Field` element is missing a required attribute.
    #[error("field is missing required attribute `{attribute}`")]
    MissingFieldAttribute {
        /// The missing attribute's name.
        attribute: &'static str,
    },

    /// A `Field` attribute that should parse as a base-10 integer does not.
    #[error("field attribute `{attribute}` is not a valid integer: {value:?}")]
    InvalidIntegerAttribute {
        /// The attribute's name.
        attribute: &'static str,
        /// The raw attribute text that failed to parse.
        value: String,
    },

    /// A `type="…"` attribute does not match any known field type.
    #[error("unknown field type: {type_name:?}")]
    UnknownFieldType {
        /// The unrecognized type string.
        type_name: String,
    },

    /// The record decoder ran past the end of the block payload, or the
    /// payload has bytes left over after the last complete record.
    #[error("record stream malformed: {message}")]
    RecordStreamMalformed {
        /// Description of the mismatch.
        message: String,
    },

    /// An attempt was made to encode a record whose schema declares a
    /// variable-width field (varying string, varying wide string, or blob).
    #[error("variable data unimplemented")]
    VariableDataUnimplemented,

    /// The schema region is shorter than the mandatory two-code-unit
    /// UTF-16LE trailer.
    #[error("schema region of {length} bytes is too short to contain the trailer")]
    SchemaTrailerMissing {
        /// Actual length of the schema region in bytes.
        length: usize,
    },
}

/// Result type alias for yxdb-rs operations.
pub type Result<T> = std::result::Result<T, YxdbError>;

impl YxdbError {
    /// Create an isolation-mismatch error.
    pub fn isolation_mismatch(label: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::IsolationMismatch {
            label: label.into(),
            expected,
            actual,
        }
    }

    /// Create a decompression-overflow error.
    pub fn decompression_overflow(needed: usize, capacity: usize) -> Self {
        Self::DecompressionOverflow { needed, capacity }
    }

    /// Create an XML-malformed error.
    pub fn xml_malformed(message: impl Into<String>) -> Self {
        Self::XmlMalformed {
            message: message.into(),
        }
    }

    /// Create a too-many-RecordInfo error.
    pub fn too_many_record_info(count: usize) -> Self {
        Self::TooManyRecordInfo { count }
    }

    /// Create a missing-field-attribute error.
    pub fn missing_field_attribute(attribute: &'static str) -> Self {
        Self::MissingFieldAttribute { attribute }
    }

    /// Create an invalid-integer-attribute error.
    pub fn invalid_integer_attribute(attribute: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidIntegerAttribute {
            attribute,
            value: value.into(),
        }
    }

    /// Create an unknown-field-type error.
    pub fn unknown_field_type(type_name: impl Into<String>) -> Self {
        Self::UnknownFieldType {
            type_name: type_name.into(),
        }
    }

    /// Create a record-stream-malformed error.
    pub fn record_stream_malformed(message: impl Into<String>) -> Self {
        Self::RecordStreamMalformed {
            message: message.into(),
        }
    }

    /// Create a schema-trailer-missing error.
    pub fn schema_trailer_missing(length: usize) -> Self {
        Self::SchemaTrailerMissing { length }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = YxdbError::isolation_mismatch("header", 512, 400);
        assert!(err.to_string().contains("header"));

        let err = YxdbError::decompression_overflow(300_000, 262_144);
        assert!(err.to_string().contains("increase buffer size"));

        let err = YxdbError::unknown_field_type("V_Nonsense");
        assert!(err.to_string().contains("V_Nonsense"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err: YxdbError = io_err.into();
        assert!(matches!(err, YxdbError::Io(_)));
    }

    #[test]
    fn test_variable_data_unimplemented_message() {
        let err = YxdbError::VariableDataUnimplemented;
        assert_eq!(err.to_string(), "variable data unimplemented");
    }
}
