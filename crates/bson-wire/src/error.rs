//! BSON wire error type.

use thiserror::Error;

use crate::wire_type::WireType;

/// Error type for BSON reading and writing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BsonError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unsupported BSON element type: 0x{0:02x}")]
    UnsupportedType(u8),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("invalid string length: {0}")]
    InvalidStringLength(i32),
    #[error("string is not null-terminated")]
    UnterminatedString,
    #[error("invalid document size: {0}")]
    InvalidDocumentSize(i32),
    #[error("expected a {expected} element, found {actual}")]
    UnexpectedWireType { expected: WireType, actual: WireType },
    #[error("no current element; call read_name() first")]
    NoCurrentElement,
    #[error("value written without an element name")]
    MissingElementName,
    #[error("element name {0:?} is still waiting for a value")]
    NameAlreadyPending(String),
}
