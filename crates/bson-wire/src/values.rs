//! BSON value model.

use crate::wire_type::WireType;

/// BSON binary data (subtype + raw bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct BsonBinary {
    pub subtype: u8,
    pub data: Vec<u8>,
}

/// A BSON value that can appear as a document field value.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    Float(f64),
    Str(String),
    /// Embedded document, fields in document order.
    Document(Vec<(String, BsonValue)>),
    Array(Vec<BsonValue>),
    Binary(BsonBinary),
    Boolean(bool),
    /// Milliseconds since the Unix epoch.
    DateTime(i64),
    Null,
    Int32(i32),
    Int64(i64),
}

impl BsonValue {
    /// The element tag this value is written with.
    pub fn wire_type(&self) -> WireType {
        match self {
            BsonValue::Float(_) => WireType::Double,
            BsonValue::Str(_) => WireType::String,
            BsonValue::Document(_) => WireType::Document,
            BsonValue::Array(_) => WireType::Array,
            BsonValue::Binary(_) => WireType::Binary,
            BsonValue::Boolean(_) => WireType::Boolean,
            BsonValue::DateTime(_) => WireType::DateTime,
            BsonValue::Null => WireType::Null,
            BsonValue::Int32(_) => WireType::Int32,
            BsonValue::Int64(_) => WireType::Int64,
        }
    }
}
