//! Token-list codec.
//!
//! A list such as `["mode=fast", "input.txt", "level=3"]` is stored as the
//! embedded document `{mode: "fast", arg2: "input.txt", level: "3"}`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bson_wire::{BsonDecoder, BsonEncoder, BsonValue, WireReader, WireType, WireWriter};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::codec::FieldCodec;
use crate::error::CodecError;
use crate::format::{format_timestamp, from_millis};

/// Codec for an optional list of `key=value` tokens.
///
/// Decoding is permissive: an element that is neither null nor a document,
/// or an empty document, decodes as `None` instead of failing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArrayDocumentCodec;

impl ArrayDocumentCodec {
    pub const NAME: &'static str = "ArrayDocumentCodec";

    pub fn new() -> Self {
        Self
    }

    /// Builds the document fields for `tokens`.
    ///
    /// A token is split at its first `=` into field name and value. A token
    /// without `=` is stored under `arg<N>`, where `N` is its one-based
    /// position in `tokens`. Empty tokens are dropped without renumbering the
    /// ones after them. A repeated name keeps its first position and takes
    /// the last value. Field names end at their first NUL, the point where
    /// the wire format cuts them, so names that only differ after a NUL are
    /// the same field.
    pub fn field_set<S: AsRef<str>>(tokens: &[S]) -> IndexMap<String, String> {
        let mut fields = IndexMap::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            if token.is_empty() {
                continue;
            }
            match token.split_once('=') {
                Some((name, rest)) => {
                    let name = name.split('\0').next().unwrap_or_default();
                    fields.insert(name.to_owned(), rest.to_owned())
                }
                None => fields.insert(format!("arg{}", i + 1), token.to_owned()),
            };
        }
        fields
    }
}

impl FieldCodec for ArrayDocumentCodec {
    type Value = Option<Vec<String>>;

    fn encode(
        &self,
        writer: &mut dyn WireWriter,
        value: &Option<Vec<String>>,
    ) -> Result<(), CodecError> {
        let Some(tokens) = value else {
            writer.write_null()?;
            return Ok(());
        };
        let fields: Vec<(String, BsonValue)> = Self::field_set(tokens.as_slice())
            .into_iter()
            .map(|(name, value)| (name, BsonValue::Str(value)))
            .collect();
        writer.write_raw_document(&BsonEncoder::new().encode(&fields))?;
        Ok(())
    }

    fn decode(&self, reader: &mut dyn WireReader) -> Result<Option<Vec<String>>, CodecError> {
        match reader.current_wire_type()? {
            WireType::Null => {
                reader.read_null()?;
                Ok(None)
            }
            WireType::Document => {
                let raw = reader.read_raw_document()?;
                let fields = BsonDecoder::new().decode(&raw)?;
                if fields.is_empty() {
                    return Ok(None);
                }
                Ok(Some(
                    fields
                        .iter()
                        .map(|(name, value)| format!("{name}={}", render(value)))
                        .collect(),
                ))
            }
            wire_type => {
                tracing::trace!(codec = Self::NAME, %wire_type, "not a document, decoding as absent");
                reader.skip_value()?;
                Ok(None)
            }
        }
    }
}

/// Text for the value half of a decoded token. Strings are used verbatim;
/// anything else written by another producer is rendered as JSON.
fn render(value: &BsonValue) -> String {
    match value {
        BsonValue::Str(s) => s.clone(),
        BsonValue::Null => String::new(),
        other => to_json(other).to_string(),
    }
}

fn to_json(value: &BsonValue) -> Value {
    match value {
        BsonValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        BsonValue::Str(s) => Value::String(s.clone()),
        BsonValue::Document(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect::<Map<_, _>>(),
        ),
        BsonValue::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        BsonValue::Binary(bin) => Value::String(STANDARD.encode(&bin.data)),
        BsonValue::Boolean(b) => Value::Bool(*b),
        BsonValue::DateTime(ms) => match from_millis(*ms) {
            Ok(instant) => Value::String(format_timestamp(&instant)),
            Err(_) => Value::from(*ms),
        },
        BsonValue::Null => Value::Null,
        BsonValue::Int32(i) => Value::from(*i),
        BsonValue::Int64(i) => Value::from(*i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson_wire::{BsonReader, BsonWriter};

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn round_trip(value: Option<Vec<String>>) -> Option<Vec<String>> {
        let mut w = BsonWriter::new();
        w.write_name("args").unwrap();
        ArrayDocumentCodec.encode(&mut w, &value).unwrap();
        let bytes = w.finish().unwrap();
        let mut r = BsonReader::new(&bytes).unwrap();
        r.read_name().unwrap();
        ArrayDocumentCodec.decode(&mut r).unwrap()
    }

    #[test]
    fn bare_tokens_get_positional_names() {
        let fields = ArrayDocumentCodec::field_set(&["a=1", "bare", "c=3"]);
        let fields: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(fields, [("a", "1"), ("arg2", "bare"), ("c", "3")]);
    }

    #[test]
    fn empty_tokens_leave_numbering_gaps() {
        let fields = ArrayDocumentCodec::field_set(&["", "x", "", "y"]);
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(names, ["arg2", "arg4"]);
    }

    #[test]
    fn splits_at_first_equals_only() {
        let fields = ArrayDocumentCodec::field_set(&["url=a=b", "=v"]);
        assert_eq!(fields["url"], "a=b");
        assert_eq!(fields[""], "v");
    }

    #[test]
    fn repeated_names_keep_last_value() {
        let fields = ArrayDocumentCodec::field_set(&["k=1", "j=2", "k=3"]);
        let fields: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(fields, [("k", "3"), ("j", "2")]);
    }

    #[test]
    fn names_differing_after_a_nul_are_one_field() {
        let fields = ArrayDocumentCodec::field_set(&["a\0x=1", "a\0y=2", "b=3"]);
        let fields: Vec<(&str, &str)> =
            fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(fields, [("a", "2"), ("b", "3")]);
        assert_eq!(
            round_trip(Some(tokens(&["a\0x=1", "a\0y=2"]))),
            Some(tokens(&["a=2"]))
        );
    }

    #[test]
    fn round_trip_normalizes_bare_tokens() {
        assert_eq!(
            round_trip(Some(tokens(&["a=1", "bare", "c=3"]))),
            Some(tokens(&["a=1", "arg2=bare", "c=3"]))
        );
    }

    #[test]
    fn broken_token_document_never_decodes() {
        // {args: {a: <string, length -1>}}
        let bytes = [
            23, 0, 0, 0, 0x03, b'a', b'r', b'g', b's', 0, // outer header + "args"
            12, 0, 0, 0, 0x02, b'a', 0, 0xff, 0xff, 0xff, 0xff, 0, // token document
            0,
        ];
        assert_eq!(
            BsonReader::new(&bytes).unwrap_err(),
            bson_wire::BsonError::InvalidStringLength(-1)
        );
    }

    #[test]
    fn null_and_empty_decode_as_absent() {
        assert_eq!(round_trip(None), None);
        assert_eq!(round_trip(Some(Vec::new())), None);
        assert_eq!(round_trip(Some(tokens(&["", ""]))), None);
    }

    #[test]
    fn foreign_values_are_rendered() {
        assert_eq!(render(&BsonValue::Int32(5)), "5");
        assert_eq!(render(&BsonValue::Boolean(true)), "true");
        assert_eq!(render(&BsonValue::DateTime(0)), "\"1970-01-01T00:00:00.000000Z\"");
        assert_eq!(
            render(&BsonValue::Document(vec![
                ("z".into(), BsonValue::Int64(1)),
                ("a".into(), BsonValue::Str("s".into())),
            ])),
            r#"{"z":1,"a":"s"}"#
        );
    }
}
