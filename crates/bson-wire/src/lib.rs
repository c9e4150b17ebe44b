//! BSON wire layer: the value model, whole-document encode/decode, and the
//! element-at-a-time reader/writer that field codecs drive.

pub mod adapter;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod reader;
pub mod values;
pub mod wire_type;
pub mod writer;

pub use adapter::{WireReader, WireWriter};
pub use decoder::BsonDecoder;
pub use encoder::BsonEncoder;
pub use error::BsonError;
pub use reader::BsonReader;
pub use values::{BsonBinary, BsonValue};
pub use wire_type::WireType;
pub use writer::BsonWriter;
