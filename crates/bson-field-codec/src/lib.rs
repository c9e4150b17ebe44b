//! Typed field codecs for BSON documents.
//!
//! Each codec converts one strongly-typed value to and from the primitives
//! exposed by [`bson_wire::WireReader`] / [`bson_wire::WireWriter`]:
//!
//! - [`ArrayDocumentCodec`]: `key=value` token lists stored as an embedded
//!   document.
//! - [`NullableTimestampCodec`]: optional instants, read from either string or
//!   native datetime elements, always written as native datetimes.
//! - [`ConfigurableTimestampCodec`]: mandatory instants whose written
//!   [`Representation`] is fixed when the codec is built.
//!
//! Codecs hold no mutable state and are looked up once per field through a
//! [`CodecRegistry`].

mod array;
mod codec;
pub mod config;
mod error;
pub mod format;
pub mod registry;
mod timestamp;

pub use array::ArrayDocumentCodec;
pub use codec::FieldCodec;
pub use config::{CodecKind, FieldConfig, RegistryConfig};
pub use error::CodecError;
pub use registry::{CodecEntry, CodecRegistry, CodecRegistryBuilder, DocumentRecord, FieldValue};
pub use timestamp::{ConfigurableTimestampCodec, NullableTimestampCodec, Representation};

/// An instant in time as handled by the timestamp codecs.
pub type Instant = chrono::DateTime<chrono::Utc>;
