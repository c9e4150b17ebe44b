//! BSON document encoder.
//!
//! BSON is a little-endian binary format. All multi-byte integers are
//! written in little-endian byte order.

use crate::values::BsonValue;

/// Encodes a BSON document (a slice of key-value pairs) to bytes.
///
/// The top level must always be a document. BSON has no scalar top-level
/// encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct BsonEncoder;

impl BsonEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes a BSON document to bytes.
    pub fn encode(&self, fields: &[(String, BsonValue)]) -> Vec<u8> {
        let mut buf = Vec::new();
        write_document(&mut buf, fields);
        buf
    }
}

/// Appends a complete document (size header, elements, terminator) to `buf`.
pub(crate) fn write_document(buf: &mut Vec<u8>, fields: &[(String, BsonValue)]) {
    let start = buf.len();
    buf.extend_from_slice(&[0u8; 4]); // size placeholder
    for (key, value) in fields {
        write_element(buf, key, value);
    }
    buf.push(0);
    patch_size(buf, start);
}

/// Back-fills the i32 size header of a document that begins at `start`.
pub(crate) fn patch_size(buf: &mut [u8], start: usize) {
    let size = (buf.len() - start) as i32;
    buf[start..start + 4].copy_from_slice(&size.to_le_bytes());
}

pub(crate) fn write_element(buf: &mut Vec<u8>, key: &str, value: &BsonValue) {
    buf.push(value.wire_type().tag());
    write_cstring(buf, key);
    match value {
        BsonValue::Float(f) => buf.extend_from_slice(&f.to_le_bytes()),
        BsonValue::Str(s) => write_string(buf, s),
        BsonValue::Document(fields) => write_document(buf, fields),
        BsonValue::Array(arr) => {
            // Arrays are documents keyed by decimal index.
            let start = buf.len();
            buf.extend_from_slice(&[0u8; 4]);
            for (i, v) in arr.iter().enumerate() {
                write_element(buf, &i.to_string(), v);
            }
            buf.push(0);
            patch_size(buf, start);
        }
        BsonValue::Binary(bin) => {
            buf.extend_from_slice(&(bin.data.len() as i32).to_le_bytes());
            buf.push(bin.subtype);
            buf.extend_from_slice(&bin.data);
        }
        BsonValue::Boolean(b) => buf.push(u8::from(*b)),
        BsonValue::DateTime(ms) => buf.extend_from_slice(&ms.to_le_bytes()),
        BsonValue::Null => {}
        BsonValue::Int32(i) => buf.extend_from_slice(&i.to_le_bytes()),
        BsonValue::Int64(i) => buf.extend_from_slice(&i.to_le_bytes()),
    }
}

/// Writes a null-terminated C-string. Stops at any null byte in the input.
pub(crate) fn write_cstring(buf: &mut Vec<u8>, s: &str) {
    buf.extend(s.bytes().take_while(|&b| b != 0));
    buf.push(0);
}

/// Writes a BSON string: little-endian i32 (byte_count+1) + UTF-8 bytes + null byte.
pub(crate) fn write_string(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    buf.extend_from_slice(&((bytes.len() as i32) + 1).to_le_bytes());
    buf.extend_from_slice(bytes);
    buf.push(0);
}
