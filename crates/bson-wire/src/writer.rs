//! Cursor writer that builds one top-level BSON document.

use crate::adapter::WireWriter;
use crate::decoder::raw_document_len;
use crate::encoder::{patch_size, write_cstring, write_element, write_string};
use crate::error::BsonError;
use crate::values::BsonValue;
use crate::wire_type::WireType;

/// Builds a BSON document element by element.
///
/// Each element is written as a name followed by exactly one value:
///
/// ```
/// use bson_wire::{BsonDecoder, BsonValue, BsonWriter, WireWriter};
///
/// let mut w = BsonWriter::new();
/// w.write_name("when").unwrap();
/// w.write_date_time(1_000).unwrap();
/// let bytes = w.finish().unwrap();
/// let fields = BsonDecoder::new().decode(&bytes).unwrap();
/// assert_eq!(fields, vec![("when".to_owned(), BsonValue::DateTime(1_000))]);
/// ```
#[derive(Debug)]
pub struct BsonWriter {
    buf: Vec<u8>,
    pending_name: Option<String>,
}

impl Default for BsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonWriter {
    pub fn new() -> Self {
        Self {
            // size header, patched in finish()
            buf: vec![0u8; 4],
            pending_name: None,
        }
    }

    /// Names the next element. Must be followed by exactly one value write.
    pub fn write_name(&mut self, name: &str) -> Result<(), BsonError> {
        if let Some(pending) = &self.pending_name {
            return Err(BsonError::NameAlreadyPending(pending.clone()));
        }
        self.pending_name = Some(name.to_owned());
        Ok(())
    }

    pub fn write_boolean(&mut self, value: bool) -> Result<(), BsonError> {
        self.begin(WireType::Boolean)?;
        self.buf.push(u8::from(value));
        Ok(())
    }

    pub fn write_int32(&mut self, value: i32) -> Result<(), BsonError> {
        self.begin(WireType::Int32)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn write_int64(&mut self, value: i64) -> Result<(), BsonError> {
        self.begin(WireType::Int64)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn write_double(&mut self, value: f64) -> Result<(), BsonError> {
        self.begin(WireType::Double)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes any value under the pending name.
    pub fn write_value(&mut self, value: &BsonValue) -> Result<(), BsonError> {
        let name = self.pending_name.take().ok_or(BsonError::MissingElementName)?;
        write_element(&mut self.buf, &name, value);
        Ok(())
    }

    /// Terminates the document and returns its bytes.
    pub fn finish(mut self) -> Result<Vec<u8>, BsonError> {
        if let Some(pending) = self.pending_name {
            return Err(BsonError::NameAlreadyPending(pending));
        }
        self.buf.push(0);
        patch_size(&mut self.buf, 0);
        Ok(self.buf)
    }

    /// Emits the tag and name of the next element.
    fn begin(&mut self, typ: WireType) -> Result<(), BsonError> {
        let name = self.pending_name.take().ok_or(BsonError::MissingElementName)?;
        self.buf.push(typ.tag());
        write_cstring(&mut self.buf, &name);
        Ok(())
    }
}

impl WireWriter for BsonWriter {
    fn write_null(&mut self) -> Result<(), BsonError> {
        self.begin(WireType::Null)
    }

    fn write_string(&mut self, value: &str) -> Result<(), BsonError> {
        self.begin(WireType::String)?;
        write_string(&mut self.buf, value);
        Ok(())
    }

    fn write_date_time(&mut self, millis: i64) -> Result<(), BsonError> {
        self.begin(WireType::DateTime)?;
        self.buf.extend_from_slice(&millis.to_le_bytes());
        Ok(())
    }

    fn write_raw_document(&mut self, document: &[u8]) -> Result<(), BsonError> {
        if raw_document_len(document, 0)? != document.len() {
            return Err(BsonError::InvalidDocumentSize(document.len() as i32));
        }
        self.begin(WireType::Document)?;
        self.buf.extend_from_slice(document);
        Ok(())
    }
}
