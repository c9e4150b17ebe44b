//! Registration-time lookup table from `(type, field)` to codec.
//!
//! The table is built once, typically at startup, and is read-only after
//! [`CodecRegistryBuilder::build`]. Entries hold their codec behind an `Arc`
//! so one instance can back any number of fields.

use std::collections::HashMap;
use std::sync::Arc;

use bson_wire::{BsonReader, BsonWriter, WireReader, WireWriter};

use crate::array::ArrayDocumentCodec;
use crate::codec::FieldCodec;
use crate::config::{CodecKind, RegistryConfig};
use crate::error::CodecError;
use crate::timestamp::{ConfigurableTimestampCodec, NullableTimestampCodec, Representation};
use crate::Instant;

/// A registered codec.
#[derive(Debug, Clone)]
pub enum CodecEntry {
    Tokens(Arc<ArrayDocumentCodec>),
    NullableTimestamp(Arc<NullableTimestampCodec>),
    Timestamp(Arc<ConfigurableTimestampCodec>),
}

/// A field value of whichever kind its codec handles.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Tokens(Option<Vec<String>>),
    OptionalInstant(Option<Instant>),
    Instant(Instant),
}

impl CodecEntry {
    pub fn codec_name(&self) -> &'static str {
        match self {
            CodecEntry::Tokens(_) => ArrayDocumentCodec::NAME,
            CodecEntry::NullableTimestamp(_) => NullableTimestampCodec::NAME,
            CodecEntry::Timestamp(_) => ConfigurableTimestampCodec::NAME,
        }
    }

    fn value_kind(&self) -> &'static str {
        match self {
            CodecEntry::Tokens(_) => "token list",
            CodecEntry::NullableTimestamp(_) => "optional instant",
            CodecEntry::Timestamp(_) => "instant",
        }
    }

    pub fn encode(&self, writer: &mut dyn WireWriter, value: &FieldValue) -> Result<(), CodecError> {
        match (self, value) {
            (CodecEntry::Tokens(codec), FieldValue::Tokens(v)) => codec.encode(writer, v),
            (CodecEntry::NullableTimestamp(codec), FieldValue::OptionalInstant(v)) => {
                codec.encode(writer, v)
            }
            (CodecEntry::Timestamp(codec), FieldValue::Instant(v)) => codec.encode(writer, v),
            _ => Err(CodecError::ValueKindMismatch {
                codec: self.codec_name(),
                expected: self.value_kind(),
            }),
        }
    }

    pub fn decode(&self, reader: &mut dyn WireReader) -> Result<FieldValue, CodecError> {
        Ok(match self {
            CodecEntry::Tokens(codec) => FieldValue::Tokens(codec.decode(reader)?),
            CodecEntry::NullableTimestamp(codec) => {
                FieldValue::OptionalInstant(codec.decode(reader)?)
            }
            CodecEntry::Timestamp(codec) => FieldValue::Instant(codec.decode(reader)?),
        })
    }
}

/// A type whose fields are persisted through a [`CodecRegistry`].
pub trait DocumentRecord: Sized {
    const TYPE_NAME: &'static str;

    fn to_fields(&self) -> Vec<(&'static str, FieldValue)>;

    fn from_fields(fields: HashMap<String, FieldValue>) -> Result<Self, CodecError>;
}

#[derive(Debug, Default)]
pub struct CodecRegistryBuilder {
    types: HashMap<String, HashMap<String, CodecEntry>>,
}

impl CodecRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        type_name: &str,
        field: &str,
        entry: CodecEntry,
    ) -> Result<Self, CodecError> {
        let fields = self.types.entry(type_name.to_owned()).or_default();
        if fields.contains_key(field) {
            return Err(CodecError::DuplicateRegistration {
                type_name: type_name.to_owned(),
                field: field.to_owned(),
            });
        }
        fields.insert(field.to_owned(), entry);
        Ok(self)
    }

    pub fn build(self) -> CodecRegistry {
        let fields: usize = self.types.values().map(HashMap::len).sum();
        tracing::debug!(types = self.types.len(), fields, "codec registry built");
        CodecRegistry { types: self.types }
    }
}

#[derive(Debug, Default)]
pub struct CodecRegistry {
    types: HashMap<String, HashMap<String, CodecEntry>>,
}

impl CodecRegistry {
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::new()
    }

    /// Builds a registry from configuration. Timestamp codecs with the same
    /// representation share one instance.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, CodecError> {
        let tokens = Arc::new(ArrayDocumentCodec::new());
        let nullable = Arc::new(NullableTimestampCodec::new());
        let native = Arc::new(ConfigurableTimestampCodec::default());
        let mut timestamps: HashMap<Representation, Arc<ConfigurableTimestampCodec>> =
            HashMap::new();

        let mut builder = Self::builder();
        for field in &config.fields {
            let entry = match (field.codec, field.representation.as_deref()) {
                (CodecKind::Tokens, None) => CodecEntry::Tokens(Arc::clone(&tokens)),
                (CodecKind::NullableTimestamp, None) => {
                    CodecEntry::NullableTimestamp(Arc::clone(&nullable))
                }
                (CodecKind::Timestamp, representation) => {
                    let representation = match representation {
                        Some(name) => name.parse()?,
                        None => native.representation(),
                    };
                    let codec = timestamps
                        .entry(representation)
                        .or_insert_with(|| native.with_representation(representation));
                    CodecEntry::Timestamp(Arc::clone(codec))
                }
                (kind, Some(_)) => {
                    return Err(CodecError::InvalidConfiguration(format!(
                        "{}.{}: {kind:?} codec takes no representation",
                        field.type_name, field.field
                    )))
                }
            };
            builder = builder.register(&field.type_name, &field.field, entry)?;
        }
        Ok(builder.build())
    }

    pub fn get(&self, type_name: &str, field: &str) -> Option<&CodecEntry> {
        self.types.get(type_name)?.get(field)
    }

    /// Writes `fields` as one document, each through its registered codec.
    pub fn encode_document(
        &self,
        type_name: &str,
        fields: &[(&str, FieldValue)],
    ) -> Result<Vec<u8>, CodecError> {
        let mut writer = BsonWriter::new();
        for (field, value) in fields {
            let entry = self.get(type_name, field).ok_or_else(|| CodecError::UnregisteredField {
                type_name: type_name.to_owned(),
                field: (*field).to_owned(),
            })?;
            writer.write_name(field)?;
            entry.encode(&mut writer, value)?;
        }
        Ok(writer.finish()?)
    }

    /// Reads a document in field order. Elements with no registered codec are
    /// skipped.
    pub fn decode_document(
        &self,
        type_name: &str,
        document: &[u8],
    ) -> Result<Vec<(String, FieldValue)>, CodecError> {
        let mut reader = BsonReader::new(document)?;
        let mut fields = Vec::new();
        while let Some(field) = reader.read_name()? {
            match self.get(type_name, &field) {
                Some(entry) => {
                    let value = entry.decode(&mut reader)?;
                    fields.push((field, value));
                }
                None => {
                    tracing::trace!(type_name, %field, "skipping unregistered field");
                    reader.skip_value()?;
                }
            }
        }
        Ok(fields)
    }

    pub fn encode_record<R: DocumentRecord>(&self, record: &R) -> Result<Vec<u8>, CodecError> {
        self.encode_document(R::TYPE_NAME, &record.to_fields())
    }

    pub fn decode_record<R: DocumentRecord>(&self, document: &[u8]) -> Result<R, CodecError> {
        let fields = self.decode_document(R::TYPE_NAME, document)?;
        R::from_fields(fields.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn registry() -> CodecRegistry {
        CodecRegistry::builder()
            .register("Job", "args", CodecEntry::Tokens(Arc::new(ArrayDocumentCodec)))
            .unwrap()
            .register(
                "Job",
                "created",
                CodecEntry::Timestamp(Arc::new(ConfigurableTimestampCodec::new(
                    Representation::AsString,
                ))),
            )
            .unwrap()
            .build()
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = CodecRegistry::builder()
            .register("Job", "args", CodecEntry::Tokens(Arc::new(ArrayDocumentCodec)))
            .unwrap()
            .register("Job", "args", CodecEntry::Tokens(Arc::new(ArrayDocumentCodec)))
            .unwrap_err();
        assert!(matches!(err, CodecError::DuplicateRegistration { .. }));
    }

    #[test]
    fn lookup_is_per_type_and_field() {
        let registry = registry();
        assert!(matches!(registry.get("Job", "args"), Some(CodecEntry::Tokens(_))));
        assert!(registry.get("Job", "missing").is_none());
        assert!(registry.get("Other", "args").is_none());
    }

    #[test]
    fn wrong_value_kind_is_rejected() {
        let err = registry()
            .encode_document("Job", &[("args", FieldValue::OptionalInstant(None))])
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::ValueKindMismatch {
                codec: ArrayDocumentCodec::NAME,
                ..
            }
        ));
    }

    #[test]
    fn unregistered_field_fails_on_encode() {
        let err = registry()
            .encode_document("Job", &[("nope", FieldValue::Tokens(None))])
            .unwrap_err();
        assert!(matches!(err, CodecError::UnregisteredField { .. }));
    }

    #[test]
    fn unregistered_elements_are_skipped_on_decode() {
        let mut w = BsonWriter::new();
        w.write_name("extra").unwrap();
        w.write_int32(7).unwrap();
        w.write_name("created").unwrap();
        w.write_string("2024-05-06T07:08:09.000000Z").unwrap();
        let bytes = w.finish().unwrap();
        let fields = registry().decode_document("Job", &bytes).unwrap();
        assert_eq!(
            fields,
            vec![(
                "created".to_owned(),
                FieldValue::Instant(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap())
            )]
        );
    }
}
