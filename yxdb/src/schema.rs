//! The `RecordInfo` schema codec: UTF-16LE XML embedded in the file between
//! the header and the block stream.
//!
//! Wire form: `<MetaInfo><RecordInfo><Field .../>…</RecordInfo></MetaInfo>`,
//! with no XML declaration, encoded UTF-16LE and terminated by a `'\n'`
//! then `'\0'` code unit. Attribute order on re-encode follows the XML
//! writer's own emission order, not necessarily the original byte stream;
//! tests compare parsed structure, not raw bytes, except for the trailer.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use std::io::Cursor;
use yxdb_core::error::{Result, YxdbError};

use crate::field::{Field, FieldType};

/// A parsed schema: an ordered sequence of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    /// Fields in document order; order is significant and preserved.
    pub fields: Vec<Field>,
}

impl RecordInfo {
    /// Whether any field in this schema carries variable data (varying
    /// strings or blobs).
    pub fn has_variable_data(&self) -> bool {
        self.fields.iter().any(Field::has_variable_data)
    }

    /// Decode a [`RecordInfo`] from the raw UTF-16LE schema region bytes
    /// (including the `'\n\0'` trailer).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(YxdbError::schema_trailer_missing(bytes.len()));
        }

        let text = decode_utf16le_trimmed(bytes);
        let mut reader = Reader::from_str(&text);
        reader.config_mut().trim_text(true);

        let mut record_infos_seen = 0usize;
        let mut fields = Vec::new();
        let mut in_record_info = false;
        let mut buf = Vec::new();

        loop {
            match reader
                .read_event_into(&mut buf)
                .map_err(|e| YxdbError::xml_malformed(e.to_string()))?
            {
                Event::Eof => break,
                Event::Start(tag) | Event::Empty(tag) => {
                    let name = tag.name();
                    let local = name.as_ref();
                    if local == b"RecordInfo" {
                        record_infos_seen += 1;
                        in_record_info = true;
                    } else if local == b"Field" && in_record_info {
                        fields.push(parse_field(&tag)?);
                    }
                }
                Event::End(tag) => {
                    if tag.name().as_ref() == b"RecordInfo" {
                        in_record_info = false;
                    }
                }
                _ => {}
            }
            buf.clear();
        }

        match record_infos_seen {
            0 => Err(YxdbError::MissingRecordInfo),
            1 => Ok(RecordInfo { fields }),
            n => Err(YxdbError::too_many_record_info(n)),
        }
    }

    /// Encode this [`RecordInfo`] to the raw UTF-16LE schema region bytes,
    /// including the `'\n\0'` trailer.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut xml_buf = Vec::new();
        {
            let mut writer = Writer::new(Cursor::new(&mut xml_buf));
            writer
                .write_event(Event::Start(BytesStart::new("MetaInfo")))
                .map_err(xml_write_err)?;
            writer
                .write_event(Event::Start(BytesStart::new("RecordInfo")))
                .map_err(xml_write_err)?;

            for field in &self.fields {
                let mut tag = BytesStart::new("Field");
                tag.push_attribute(("name", field.name.as_str()));
                tag.push_attribute(("type", field.field_type.to_xml_name()));
                let size_text;
                if let Some(size) = field.size {
                    size_text = size.to_string();
                    tag.push_attribute(("size", size_text.as_str()));
                }
                let scale_text;
                if let Some(scale) = field.scale {
                    scale_text = scale.to_string();
                    tag.push_attribute(("scale", scale_text.as_str()));
                }
                writer
                    .write_event(Event::Empty(tag))
                    .map_err(xml_write_err)?;
            }

            writer
                .write_event(Event::End(BytesEnd::new("RecordInfo")))
                .map_err(xml_write_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("MetaInfo")))
                .map_err(xml_write_err)?;
        }

        let xml_text = String::from_utf8(xml_buf)
            .map_err(|e| YxdbError::xml_malformed(e.to_string()))?;

        let mut full_text = xml_text;
        full_text.push('\n');
        full_text.push('\0');

        Ok(encode_utf16le(&full_text))
    }
}

/// quick-xml's `BytesText::unescape` error doesn't implement our error
/// type directly; this narrows every writer failure to one variant.
fn xml_write_err(e: quick_xml::Error) -> YxdbError {
    YxdbError::xml_malformed(e.to_string())
}

fn parse_field(tag: &BytesStart) -> Result<Field> {
    let mut name = None;
    let mut field_type = None;
    let mut size = None;
    let mut scale = None;

    for attr in tag.attributes() {
        let attr = attr.map_err(|e| YxdbError::xml_malformed(e.to_string()))?;
        let key = attr.key.as_ref();
        let value = attr
            .unescape_value()
            .map_err(|e| YxdbError::xml_malformed(e.to_string()))?
            .into_owned();

        match key {
            b"name" => name = Some(value),
            b"type" => field_type = Some(FieldType::from_xml_name(&value)?),
            b"size" => {
                size = Some(value.parse::<i64>().map_err(|_| {
                    YxdbError::invalid_integer_attribute("size", value.clone())
                })?)
            }
            b"scale" => {
                scale = Some(value.parse::<i64>().map_err(|_| {
                    YxdbError::invalid_integer_attribute("scale", value.clone())
                })?)
            }
            _ => {}
        }
    }

    Ok(Field {
        name: name.ok_or(YxdbError::MissingFieldAttribute { attribute: "name" })?,
        field_type: field_type.ok_or(YxdbError::MissingFieldAttribute { attribute: "type" })?,
        size,
        scale,
    })
}

/// Strip the mandatory trailing `'\n\0'` code units and decode the rest as
/// UTF-16LE text.
fn decode_utf16le_trimmed(bytes: &[u8]) -> String {
    let trimmed = &bytes[..bytes.len() - 4];
    let units: Vec<u16> = trimmed
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn encode_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int32_field(name: &str) -> Field {
        Field {
            name: name.to_string(),
            field_type: FieldType::Int32,
            size: None,
            scale: None,
        }
    }

    #[test]
    fn test_roundtrip_single_field_schema() {
        let schema = RecordInfo {
            fields: vec![int32_field("x")],
        };
        let encoded = schema.encode().unwrap();
        let decoded = RecordInfo::decode(&encoded).unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn test_roundtrip_multi_field_schema_with_size_and_scale() {
        let schema = RecordInfo {
            fields: vec![
                int32_field("a"),
                Field {
                    name: "b".to_string(),
                    field_type: FieldType::Double,
                    size: Some(8),
                    scale: None,
                },
                Field {
                    name: "c".to_string(),
                    field_type: FieldType::FixedDecimal,
                    size: Some(10),
                    scale: Some(2),
                },
            ],
        };
        let encoded = schema.encode().unwrap();
        let decoded = RecordInfo::decode(&encoded).unwrap();
        assert_eq!(decoded, schema);
    }

    #[test]
    fn test_decode_literal_xml_with_multiple_fields() {
        let xml = "<MetaInfo><RecordInfo><Field name=\"a\" type=\"Int32\"/>\
                   <Field name=\"b\" type=\"Double\" size=\"8\"/></RecordInfo></MetaInfo>\n\0";
        let bytes = encode_utf16le(xml);
        let decoded = RecordInfo::decode(&bytes).unwrap();
        assert_eq!(decoded.fields.len(), 2);
        assert_eq!(decoded.fields[0].name, "a");
        assert_eq!(decoded.fields[0].field_type, FieldType::Int32);
        assert_eq!(decoded.fields[1].name, "b");
        assert_eq!(decoded.fields[1].field_type, FieldType::Double);
        assert_eq!(decoded.fields[1].size, Some(8));
    }

    #[test]
    fn test_decode_rejects_missing_record_info() {
        let xml = "<MetaInfo></MetaInfo>\n\0";
        let bytes = encode_utf16le(xml);
        let err = RecordInfo::decode(&bytes).unwrap_err();
        assert!(matches!(err, YxdbError::MissingRecordInfo));
    }

    #[test]
    fn test_decode_rejects_multiple_record_info() {
        let xml = "<MetaInfo><RecordInfo></RecordInfo><RecordInfo></RecordInfo></MetaInfo>\n\0";
        let bytes = encode_utf16le(xml);
        let err = RecordInfo::decode(&bytes).unwrap_err();
        assert!(matches!(err, YxdbError::TooManyRecordInfo { count: 2 }));
    }

    #[test]
    fn test_decode_rejects_region_shorter_than_trailer() {
        let err = RecordInfo::decode(&[0u8; 2]).unwrap_err();
        assert!(matches!(err, YxdbError::SchemaTrailerMissing { length: 2 }));
    }

    #[test]
    fn test_decode_rejects_missing_required_attribute() {
        let xml = "<MetaInfo><RecordInfo><Field type=\"Int32\"/></RecordInfo></MetaInfo>\n\0";
        let bytes = encode_utf16le(xml);
        let err = RecordInfo::decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            YxdbError::MissingFieldAttribute { attribute: "name" }
        ));
    }

    #[test]
    fn test_decode_rejects_malformed_integer_attribute() {
        let xml = "<MetaInfo><RecordInfo><Field name=\"a\" type=\"Int32\" size=\"x\"/>\
                   </RecordInfo></MetaInfo>\n\0";
        let bytes = encode_utf16le(xml);
        let err = RecordInfo::decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            YxdbError::InvalidIntegerAttribute { attribute: "size", .. }
        ));
    }

    #[test]
    fn test_decode_ignores_unknown_attribute() {
        let xml = "<MetaInfo><RecordInfo>\
                   <Field name=\"a\" type=\"Int32\" description=\"notes\"/>\
                   </RecordInfo></MetaInfo>\n\0";
        let bytes = encode_utf16le(xml);
        let decoded = RecordInfo::decode(&bytes).unwrap();
        assert_eq!(decoded.fields.len(), 1);
        assert_eq!(decoded.fields[0].name, "a");
    }

    #[test]
    fn test_single_field_no_size_no_scale_omits_attributes_on_encode() {
        let schema = RecordInfo {
            fields: vec![int32_field("x")],
        };
        let encoded = schema.encode().unwrap();
        let text = decode_utf16le_trimmed(&encoded);
        assert!(!text.contains("size="));
        assert!(!text.contains("scale="));
    }

    #[test]
    fn test_has_variable_data_true_when_any_field_is_variable() {
        let schema = RecordInfo {
            fields: vec![
                int32_field("a"),
                Field {
                    name: "b".to_string(),
                    field_type: FieldType::VString,
                    size: None,
                    scale: None,
                },
            ],
        };
        assert!(schema.has_variable_data());
    }

    #[test]
    fn test_has_variable_data_false_for_fixed_width_only_schema() {
        let schema = RecordInfo {
            fields: vec![int32_field("a"), int32_field("b")],
        };
        assert!(!schema.has_variable_data());
    }

    #[test]
    fn test_encode_ends_with_newline_nul_trailer() {
        let schema = RecordInfo {
            fields: vec![int32_field("x")],
        };
        let encoded = schema.encode().unwrap();
        let last_two_units = &encoded[encoded.len() - 4..];
        assert_eq!(&last_two_units[0..2], &10u16.to_le_bytes());
        assert_eq!(&last_two_units[2..4], &0u16.to_le_bytes());
    }
}
