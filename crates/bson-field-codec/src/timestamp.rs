//! Timestamp codecs.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bson_wire::{WireReader, WireType, WireWriter};

use crate::codec::FieldCodec;
use crate::error::CodecError;
use crate::format::{format_timestamp, from_millis, parse_timestamp, to_millis};
use crate::Instant;

/// How a timestamp is physically stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    /// Fixed-layout text, see [`crate::format`].
    AsString,
    /// BSON UTC datetime (epoch milliseconds).
    AsNativeTimestamp,
}

impl Representation {
    pub fn wire_type(self) -> WireType {
        match self {
            Representation::AsString => WireType::String,
            Representation::AsNativeTimestamp => WireType::DateTime,
        }
    }
}

impl TryFrom<WireType> for Representation {
    type Error = CodecError;

    fn try_from(wire_type: WireType) -> Result<Self, Self::Error> {
        match wire_type {
            WireType::String => Ok(Representation::AsString),
            WireType::DateTime => Ok(Representation::AsNativeTimestamp),
            other => Err(CodecError::InvalidConfiguration(format!(
                "{other} is not a timestamp representation"
            ))),
        }
    }
}

impl FromStr for Representation {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Representation::AsString),
            "datetime" => Ok(Representation::AsNativeTimestamp),
            other => Err(CodecError::InvalidConfiguration(format!(
                "unknown timestamp representation {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.wire_type(), f)
    }
}

/// Reads a string or native datetime element; anything else is rejected.
fn decode_instant(
    codec: &'static str,
    reader: &mut dyn WireReader,
    wire_type: WireType,
) -> Result<Instant, CodecError> {
    match wire_type {
        WireType::String => parse_timestamp(&reader.read_string()?),
        WireType::DateTime => from_millis(reader.read_date_time()?),
        wire_type => Err(CodecError::UnsupportedWireType { codec, wire_type }),
    }
}

/// Codec for an optional instant.
///
/// Decoding accepts null, string and native datetime elements so that values
/// written as text by older writers stay readable. Encoding always writes a
/// native datetime.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NullableTimestampCodec;

impl NullableTimestampCodec {
    pub const NAME: &'static str = "NullableTimestampCodec";

    pub fn new() -> Self {
        Self
    }
}

impl FieldCodec for NullableTimestampCodec {
    type Value = Option<Instant>;

    fn encode(&self, writer: &mut dyn WireWriter, value: &Option<Instant>) -> Result<(), CodecError> {
        match value {
            None => writer.write_null()?,
            Some(instant) => writer.write_date_time(to_millis(instant))?,
        }
        Ok(())
    }

    fn decode(&self, reader: &mut dyn WireReader) -> Result<Option<Instant>, CodecError> {
        match reader.current_wire_type()? {
            WireType::Null => {
                reader.read_null()?;
                Ok(None)
            }
            wire_type => decode_instant(Self::NAME, reader, wire_type).map(Some),
        }
    }
}

/// Codec for a mandatory instant with a fixed write representation.
///
/// The representation only governs encoding; decoding accepts both. A null
/// element is not a legal value for this codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurableTimestampCodec {
    representation: Representation,
}

impl Default for ConfigurableTimestampCodec {
    fn default() -> Self {
        Self::new(Representation::AsNativeTimestamp)
    }
}

impl ConfigurableTimestampCodec {
    pub const NAME: &'static str = "ConfigurableTimestampCodec";

    pub fn new(representation: Representation) -> Self {
        Self { representation }
    }

    /// Builds a codec from a raw wire type. Only `string` and `datetime` are
    /// valid.
    pub fn with_wire_type(wire_type: WireType) -> Result<Self, CodecError> {
        Representation::try_from(wire_type).map(Self::new)
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// Returns a codec writing `representation`. When it matches the current
    /// one, the same shared instance is returned.
    pub fn with_representation(self: &Arc<Self>, representation: Representation) -> Arc<Self> {
        if self.representation == representation {
            Arc::clone(self)
        } else {
            Arc::new(Self::new(representation))
        }
    }
}

impl FieldCodec for ConfigurableTimestampCodec {
    type Value = Instant;

    fn encode(&self, writer: &mut dyn WireWriter, value: &Instant) -> Result<(), CodecError> {
        match self.representation {
            Representation::AsString => writer.write_string(&format_timestamp(value))?,
            Representation::AsNativeTimestamp => writer.write_date_time(to_millis(value))?,
        }
        Ok(())
    }

    fn decode(&self, reader: &mut dyn WireReader) -> Result<Instant, CodecError> {
        let wire_type = reader.current_wire_type()?;
        decode_instant(Self::NAME, reader, wire_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson_wire::{BsonReader, BsonWriter};
    use chrono::{DateTime, Utc};

    fn instant(text: &str) -> Instant {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    fn encoded<C: FieldCodec>(codec: &C, value: &C::Value) -> Vec<u8> {
        let mut w = BsonWriter::new();
        w.write_name("v").unwrap();
        codec.encode(&mut w, value).unwrap();
        w.finish().unwrap()
    }

    fn decoded<C: FieldCodec>(codec: &C, bytes: &[u8]) -> Result<C::Value, CodecError> {
        let mut r = BsonReader::new(bytes).unwrap();
        r.read_name().unwrap();
        codec.decode(&mut r)
    }

    fn written_type(bytes: &[u8]) -> WireType {
        let mut r = BsonReader::new(bytes).unwrap();
        r.read_name().unwrap();
        r.current_wire_type().unwrap()
    }

    #[test]
    fn nullable_writes_native_datetime_or_null() {
        let codec = NullableTimestampCodec::new();
        let t = instant("2020-02-29T12:00:00.5Z");
        assert_eq!(written_type(&encoded(&codec, &Some(t))), WireType::DateTime);
        assert_eq!(written_type(&encoded(&codec, &None)), WireType::Null);
        assert_eq!(decoded(&codec, &encoded(&codec, &Some(t))).unwrap(), Some(t));
        assert_eq!(decoded(&codec, &encoded(&codec, &None)).unwrap(), None);
    }

    #[test]
    fn nullable_reads_legacy_strings() {
        let mut w = BsonWriter::new();
        w.write_name("v").unwrap();
        w.write_string("2020-02-29T12:00:00.500000Z").unwrap();
        let bytes = w.finish().unwrap();
        assert_eq!(
            decoded(&NullableTimestampCodec, &bytes).unwrap(),
            Some(instant("2020-02-29T12:00:00.5Z"))
        );
    }

    #[test]
    fn representation_selects_written_wire_type() {
        let t = instant("1999-12-31T23:59:59.999Z");
        let text = ConfigurableTimestampCodec::new(Representation::AsString);
        let native = ConfigurableTimestampCodec::new(Representation::AsNativeTimestamp);
        assert_eq!(written_type(&encoded(&text, &t)), WireType::String);
        assert_eq!(written_type(&encoded(&native, &t)), WireType::DateTime);
        // either codec reads either representation
        assert_eq!(decoded(&native, &encoded(&text, &t)).unwrap(), t);
        assert_eq!(decoded(&text, &encoded(&native, &t)).unwrap(), t);
    }

    #[test]
    fn configurable_rejects_null() {
        let bytes = encoded(&NullableTimestampCodec, &None);
        let err = decoded(&ConfigurableTimestampCodec::default(), &bytes).unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnsupportedWireType {
                wire_type: WireType::Null,
                ..
            }
        ));
    }

    #[test]
    fn cursor_position_after_a_failed_decode() {
        let mut w = BsonWriter::new();
        w.write_name("bad").unwrap();
        w.write_string("not a timestamp").unwrap();
        w.write_name("flag").unwrap();
        w.write_boolean(true).unwrap();
        w.write_name("next").unwrap();
        w.write_null().unwrap();
        let bytes = w.finish().unwrap();
        let codec = ConfigurableTimestampCodec::default();

        let mut r = BsonReader::new(&bytes).unwrap();
        r.read_name().unwrap();
        // a malformed string is consumed before it is parsed
        assert!(matches!(
            codec.decode(&mut r),
            Err(CodecError::FormatMismatch { .. })
        ));
        assert!(r.read_string().is_err());

        // a wire-type mismatch leaves the value in place
        assert_eq!(r.read_name().unwrap().as_deref(), Some("flag"));
        assert!(matches!(
            codec.decode(&mut r),
            Err(CodecError::UnsupportedWireType { .. })
        ));
        assert!(r.read_boolean().unwrap());
        assert_eq!(r.read_name().unwrap().as_deref(), Some("next"));
    }

    #[test]
    fn with_wire_type_validates() {
        assert_eq!(
            ConfigurableTimestampCodec::with_wire_type(WireType::String)
                .unwrap()
                .representation(),
            Representation::AsString
        );
        for bad in [WireType::Boolean, WireType::Int64, WireType::Null, WireType::Document] {
            assert!(matches!(
                ConfigurableTimestampCodec::with_wire_type(bad),
                Err(CodecError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn with_representation_shares_or_builds() {
        let codec = Arc::new(ConfigurableTimestampCodec::new(Representation::AsString));
        let same = codec.with_representation(Representation::AsString);
        assert!(Arc::ptr_eq(&codec, &same));
        let other = codec.with_representation(Representation::AsNativeTimestamp);
        assert!(!Arc::ptr_eq(&codec, &other));
        assert_eq!(other.representation(), Representation::AsNativeTimestamp);
        assert_eq!(codec.representation(), Representation::AsString);
    }

    #[test]
    fn representation_parses_from_names() {
        assert_eq!("string".parse::<Representation>().unwrap(), Representation::AsString);
        assert_eq!(
            "datetime".parse::<Representation>().unwrap(),
            Representation::AsNativeTimestamp
        );
        assert!(matches!(
            "int64".parse::<Representation>(),
            Err(CodecError::InvalidConfiguration(_))
        ));
        assert_eq!(Representation::AsString.to_string(), "string");
    }
}
