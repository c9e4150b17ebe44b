//! The primitive operations field codecs are allowed to perform.
//!
//! A codec never walks a document itself. It is handed a reader positioned at
//! one element's value, or a writer whose element name has already been
//! written, and performs exactly one value read or write through these traits.

use crate::error::BsonError;
use crate::wire_type::WireType;

pub trait WireReader {
    /// Tag of the element the cursor is positioned at.
    fn current_wire_type(&self) -> Result<WireType, BsonError>;

    fn read_null(&mut self) -> Result<(), BsonError>;

    fn read_string(&mut self) -> Result<String, BsonError>;

    /// Reads a UTC datetime as milliseconds since the Unix epoch.
    fn read_date_time(&mut self) -> Result<i64, BsonError>;

    /// Reads an embedded document as one opaque block, size header included.
    fn read_raw_document(&mut self) -> Result<Vec<u8>, BsonError>;

    /// Consumes the current value, whatever its type.
    fn skip_value(&mut self) -> Result<(), BsonError>;
}

pub trait WireWriter {
    fn write_null(&mut self) -> Result<(), BsonError>;

    fn write_string(&mut self, value: &str) -> Result<(), BsonError>;

    /// Writes a UTC datetime given as milliseconds since the Unix epoch.
    fn write_date_time(&mut self, millis: i64) -> Result<(), BsonError>;

    /// Injects a pre-serialized document as the current element's value.
    fn write_raw_document(&mut self, document: &[u8]) -> Result<(), BsonError>;
}
