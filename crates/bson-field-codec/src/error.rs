use bson_wire::{BsonError, WireType};
use thiserror::Error;

use crate::format::TIMESTAMP_FORMAT;

/// Error type for field encoding and decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("{value:?} does not match the timestamp format {}", TIMESTAMP_FORMAT)]
    FormatMismatch { value: String },
    #[error("{codec} cannot deserialize from wire type {wire_type}")]
    UnsupportedWireType {
        codec: &'static str,
        wire_type: WireType,
    },
    #[error("invalid representation: {0}")]
    InvalidConfiguration(String),
    #[error("{0} epoch milliseconds is outside the supported timestamp range")]
    TimestampOutOfRange(i64),
    #[error("a codec is already registered for {type_name}.{field}")]
    DuplicateRegistration { type_name: String, field: String },
    #[error("no codec registered for {type_name}.{field}")]
    UnregisteredField { type_name: String, field: String },
    #[error("{type_name} document has no {field} field")]
    MissingField {
        type_name: &'static str,
        field: &'static str,
    },
    #[error("{codec} expects a {expected} value")]
    ValueKindMismatch {
        codec: &'static str,
        expected: &'static str,
    },
    #[error("malformed codec configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Wire(#[from] BsonError),
}
