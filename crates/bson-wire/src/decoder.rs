//! BSON document decoder.
//!
//! BSON is a little-endian binary format.

use crate::error::BsonError;
use crate::values::{BsonBinary, BsonValue};
use crate::wire_type::WireType;

/// Smallest legal document: size header plus terminator.
pub(crate) const MIN_DOCUMENT_SIZE: i32 = 5;

/// BSON document decoder.
#[derive(Debug, Default)]
pub struct BsonDecoder {
    x: usize,
}

impl BsonDecoder {
    pub fn new() -> Self {
        Self { x: 0 }
    }

    /// Decodes a BSON document from bytes, returning an error on malformed input.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<(String, BsonValue)>, BsonError> {
        self.x = 0;
        read_document(data, &mut self.x)
    }

    /// Number of bytes consumed by the last [`decode`](Self::decode).
    pub fn consumed(&self) -> usize {
        self.x
    }
}

pub(crate) fn read_document(
    data: &[u8],
    x: &mut usize,
) -> Result<Vec<(String, BsonValue)>, BsonError> {
    let start = *x;
    let size = read_i32(data, x)?;
    let end = document_end(data, start, size)?;
    let mut fields = Vec::new();
    while *x < end {
        let tag = read_u8(data, x)?;
        if tag == 0 {
            return Err(BsonError::InvalidDocumentSize(size));
        }
        let typ = WireType::try_from(tag)?;
        let key = read_cstring(data, x)?;
        let value = read_value(data, x, typ)?;
        // an element may not run into or past the terminator
        if *x > end {
            return Err(BsonError::InvalidDocumentSize(size));
        }
        fields.push((key, value));
    }
    if data[end] != 0 {
        return Err(BsonError::InvalidDocumentSize(size));
    }
    *x = end + 1;
    Ok(fields)
}

/// Reads the payload of one element whose tag has already been consumed.
pub(crate) fn read_value(data: &[u8], x: &mut usize, typ: WireType) -> Result<BsonValue, BsonError> {
    Ok(match typ {
        WireType::Double => BsonValue::Float(f64::from_le_bytes(read_array(data, x)?)),
        WireType::String => BsonValue::Str(read_string(data, x)?),
        WireType::Document => BsonValue::Document(read_document(data, x)?),
        WireType::Array => {
            let mut indexed: Vec<(usize, BsonValue)> = read_document(data, x)?
                .into_iter()
                .map(|(k, v)| (k.parse::<usize>().unwrap_or(0), v))
                .collect();
            indexed.sort_by_key(|(i, _)| *i);
            BsonValue::Array(indexed.into_iter().map(|(_, v)| v).collect())
        }
        WireType::Binary => {
            let length = read_i32(data, x)?;
            let subtype = read_u8(data, x)?;
            let length = usize::try_from(length).map_err(|_| BsonError::UnexpectedEof)?;
            BsonValue::Binary(BsonBinary {
                subtype,
                data: take(data, x, length)?.to_vec(),
            })
        }
        WireType::Boolean => BsonValue::Boolean(read_u8(data, x)? == 1),
        WireType::DateTime => BsonValue::DateTime(i64::from_le_bytes(read_array(data, x)?)),
        WireType::Null => BsonValue::Null,
        WireType::Int32 => BsonValue::Int32(read_i32(data, x)?),
        WireType::Int64 => BsonValue::Int64(i64::from_le_bytes(read_array(data, x)?)),
    })
}

/// Advances past the payload of one element without materializing it.
pub(crate) fn skip_value(data: &[u8], x: &mut usize, typ: WireType) -> Result<(), BsonError> {
    let len = match typ {
        WireType::Null => 0,
        WireType::Boolean => 1,
        WireType::Int32 => 4,
        WireType::Double | WireType::DateTime | WireType::Int64 => 8,
        WireType::String => {
            string_bytes(data, x)?;
            return Ok(());
        }
        WireType::Binary => {
            let len = read_i32(data, x)?;
            usize::try_from(len).map_err(|_| BsonError::UnexpectedEof)? + 1
        }
        WireType::Document | WireType::Array => {
            take(data, x, raw_document_len(data, *x)?)?;
            return Ok(());
        }
    };
    take(data, x, len)?;
    Ok(())
}

/// Byte length of the embedded document starting at `x`. The whole document
/// is checked, nested elements included.
pub(crate) fn raw_document_len(data: &[u8], x: usize) -> Result<usize, BsonError> {
    let mut cursor = x;
    read_document(data, &mut cursor)?;
    Ok(cursor - x)
}

/// Validates a document size header read at `start` and returns the index of
/// its terminating null byte.
pub(crate) fn document_end(data: &[u8], start: usize, size: i32) -> Result<usize, BsonError> {
    if size < MIN_DOCUMENT_SIZE {
        return Err(BsonError::InvalidDocumentSize(size));
    }
    let end = start + size as usize;
    if end > data.len() {
        return Err(BsonError::UnexpectedEof);
    }
    Ok(end - 1)
}

pub(crate) fn take<'a>(data: &'a [u8], x: &mut usize, n: usize) -> Result<&'a [u8], BsonError> {
    let end = x.checked_add(n).ok_or(BsonError::UnexpectedEof)?;
    let bytes = data.get(*x..end).ok_or(BsonError::UnexpectedEof)?;
    *x = end;
    Ok(bytes)
}

pub(crate) fn read_array<const N: usize>(data: &[u8], x: &mut usize) -> Result<[u8; N], BsonError> {
    let mut out = [0u8; N];
    out.copy_from_slice(take(data, x, N)?);
    Ok(out)
}

pub(crate) fn read_u8(data: &[u8], x: &mut usize) -> Result<u8, BsonError> {
    Ok(read_array::<1>(data, x)?[0])
}

pub(crate) fn read_i32(data: &[u8], x: &mut usize) -> Result<i32, BsonError> {
    Ok(i32::from_le_bytes(read_array(data, x)?))
}

pub(crate) fn read_cstring(data: &[u8], x: &mut usize) -> Result<String, BsonError> {
    let rest = data.get(*x..).ok_or(BsonError::UnexpectedEof)?;
    let len = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or(BsonError::UnexpectedEof)?;
    let s = std::str::from_utf8(&rest[..len]).map_err(|_| BsonError::InvalidUtf8)?;
    *x += len + 1;
    Ok(s.to_owned())
}

/// Reads a length-prefixed string payload, without its null terminator.
fn string_bytes<'a>(data: &'a [u8], x: &mut usize) -> Result<&'a [u8], BsonError> {
    // length includes the null terminator
    let length = read_i32(data, x)?;
    if length < 1 {
        return Err(BsonError::InvalidStringLength(length));
    }
    match take(data, x, length as usize)?.split_last() {
        Some((&0, text)) => Ok(text),
        _ => Err(BsonError::UnterminatedString),
    }
}

pub(crate) fn read_string(data: &[u8], x: &mut usize) -> Result<String, BsonError> {
    let text = string_bytes(data, x)?;
    let s = std::str::from_utf8(text).map_err(|_| BsonError::InvalidUtf8)?;
    Ok(s.to_owned())
}
