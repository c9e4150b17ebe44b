use bson_wire::{WireReader, WireWriter};

use crate::error::CodecError;

/// Converts one typed value to and from a single BSON element value.
///
/// `encode` is called after the element name has been written; `decode` is
/// called with the reader positioned on the element. Implementations perform
/// exactly one value read or write and keep no per-call state, so a single
/// instance may serve any number of threads.
pub trait FieldCodec: Send + Sync {
    type Value;

    fn encode(&self, writer: &mut dyn WireWriter, value: &Self::Value) -> Result<(), CodecError>;

    fn decode(&self, reader: &mut dyn WireReader) -> Result<Self::Value, CodecError>;
}
