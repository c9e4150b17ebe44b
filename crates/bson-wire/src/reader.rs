//! Cursor reader over one top-level BSON document.

use crate::adapter::WireReader;
use crate::decoder::{
    raw_document_len, read_array, read_cstring, read_i32, read_string, read_u8,
    read_value, skip_value, take,
};
use crate::error::BsonError;
use crate::values::BsonValue;
use crate::wire_type::WireType;

/// Walks the elements of a BSON document one at a time.
///
/// ```
/// use bson_wire::{BsonReader, BsonValue, BsonEncoder, WireReader, WireType};
///
/// let bytes = BsonEncoder::new().encode(&[("a".into(), BsonValue::Str("x".into()))]);
/// let mut reader = BsonReader::new(&bytes).unwrap();
/// assert_eq!(reader.read_name().unwrap().as_deref(), Some("a"));
/// assert_eq!(reader.current_wire_type().unwrap(), WireType::String);
/// assert_eq!(reader.read_string().unwrap(), "x");
/// assert_eq!(reader.read_name().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct BsonReader<'a> {
    data: &'a [u8],
    x: usize,
    /// Index of the top-level document's terminating null byte.
    end: usize,
    current: Option<WireType>,
}

impl<'a> BsonReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, BsonError> {
        // the whole document is checked before the first element is handed out
        let size = raw_document_len(data, 0)?;
        Ok(Self {
            data,
            x: 4,
            end: size - 1,
            current: None,
        })
    }

    /// Advances to the next element and returns its name, or `None` once the
    /// document is exhausted. An unread current value is skipped first.
    pub fn read_name(&mut self) -> Result<Option<String>, BsonError> {
        if self.current.is_some() {
            self.skip_value()?;
        }
        if self.x >= self.end {
            return Ok(None);
        }
        let tag = read_u8(self.data, &mut self.x)?;
        if tag == 0 {
            self.x = self.end;
            return Ok(None);
        }
        let typ = WireType::try_from(tag)?;
        let name = read_cstring(self.data, &mut self.x)?;
        self.current = Some(typ);
        Ok(Some(name))
    }

    /// Reads the current value whatever its type.
    pub fn read_value(&mut self) -> Result<BsonValue, BsonError> {
        let typ = self.take_current()?;
        read_value(self.data, &mut self.x, typ)
    }

    pub fn read_boolean(&mut self) -> Result<bool, BsonError> {
        self.expect(WireType::Boolean)?;
        Ok(read_u8(self.data, &mut self.x)? == 1)
    }

    pub fn read_int32(&mut self) -> Result<i32, BsonError> {
        self.expect(WireType::Int32)?;
        read_i32(self.data, &mut self.x)
    }

    fn take_current(&mut self) -> Result<WireType, BsonError> {
        self.current.take().ok_or(BsonError::NoCurrentElement)
    }

    /// Consumes the current element's tag if it matches `expected`. On a
    /// mismatch the cursor is left where it was.
    fn expect(&mut self, expected: WireType) -> Result<(), BsonError> {
        let actual = self.current.ok_or(BsonError::NoCurrentElement)?;
        if actual != expected {
            return Err(BsonError::UnexpectedWireType { expected, actual });
        }
        self.current = None;
        Ok(())
    }
}

impl WireReader for BsonReader<'_> {
    fn current_wire_type(&self) -> Result<WireType, BsonError> {
        self.current.ok_or(BsonError::NoCurrentElement)
    }

    fn read_null(&mut self) -> Result<(), BsonError> {
        self.expect(WireType::Null)
    }

    fn read_string(&mut self) -> Result<String, BsonError> {
        self.expect(WireType::String)?;
        read_string(self.data, &mut self.x)
    }

    fn read_date_time(&mut self) -> Result<i64, BsonError> {
        self.expect(WireType::DateTime)?;
        Ok(i64::from_le_bytes(read_array(self.data, &mut self.x)?))
    }

    fn read_raw_document(&mut self) -> Result<Vec<u8>, BsonError> {
        self.expect(WireType::Document)?;
        let len = raw_document_len(self.data, self.x)?;
        Ok(take(self.data, &mut self.x, len)?.to_vec())
    }

    fn skip_value(&mut self) -> Result<(), BsonError> {
        let typ = self.take_current()?;
        skip_value(self.data, &mut self.x, typ)
    }
}
