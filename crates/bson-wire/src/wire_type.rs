//! Element type tags.

use std::fmt;

use crate::error::BsonError;

/// The tag a BSON element carries ahead of its name and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Boolean = 0x08,
    /// UTC datetime, milliseconds since the Unix epoch.
    DateTime = 0x09,
    Null = 0x0a,
    Int32 = 0x10,
    Int64 = 0x12,
}

impl WireType {
    /// Returns the on-wire tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            WireType::Double => "double",
            WireType::String => "string",
            WireType::Document => "document",
            WireType::Array => "array",
            WireType::Binary => "binary",
            WireType::Boolean => "boolean",
            WireType::DateTime => "datetime",
            WireType::Null => "null",
            WireType::Int32 => "int32",
            WireType::Int64 => "int64",
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = BsonError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0x01 => Ok(WireType::Double),
            0x02 => Ok(WireType::String),
            0x03 => Ok(WireType::Document),
            0x04 => Ok(WireType::Array),
            0x05 => Ok(WireType::Binary),
            0x08 => Ok(WireType::Boolean),
            0x09 => Ok(WireType::DateTime),
            0x0a => Ok(WireType::Null),
            0x10 => Ok(WireType::Int32),
            0x12 => Ok(WireType::Int64),
            t => Err(BsonError::UnsupportedType(t)),
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
