//! The fixed text layout used for string-encoded timestamps.
//!
//! Timestamps are written as `YYYY-MM-DDTHH:MM:SS.ffffffZ`. On read, the zone
//! suffix may be `Z`, a `+HH:MM` / `-HH:MM` offset, or absent (read as UTC);
//! the fraction must have exactly six digits.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::error::CodecError;

/// Human-readable form of the layout, used in error messages.
pub const TIMESTAMP_FORMAT: &str = "yyyy-MM-ddTHH:mm:ss.ffffffK";

const LOCAL_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const OFFSET_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, CodecError> {
    let mismatch = || CodecError::FormatMismatch {
        value: text.to_owned(),
    };
    if let Some(local) = text.strip_suffix('Z') {
        return parse_utc(local).ok_or_else(mismatch);
    }
    if let Ok(value) = DateTime::parse_from_str(text, OFFSET_PATTERN) {
        return Ok(value.with_timezone(&Utc));
    }
    parse_utc(text).ok_or_else(mismatch)
}

fn parse_utc(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, LOCAL_PATTERN)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub(crate) fn to_millis(value: &DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> Result<DateTime<Utc>, CodecError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(CodecError::TimestampOutOfRange(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(text: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(text).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn formats_six_fraction_digits_and_z() {
        let t = instant("2021-03-04T05:06:07.123456789Z");
        assert_eq!(format_timestamp(&t), "2021-03-04T05:06:07.123456Z");
        let whole = instant("2021-03-04T05:06:07Z");
        assert_eq!(format_timestamp(&whole), "2021-03-04T05:06:07.000000Z");
    }

    #[test]
    fn accepts_every_zone_suffix() {
        let expected = instant("2021-03-04T05:06:07.123456Z");
        assert_eq!(parse_timestamp("2021-03-04T05:06:07.123456Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-03-04T07:06:07.123456+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2021-03-04T05:06:07.123456").unwrap(), expected);
    }

    #[test]
    fn rejects_other_layouts() {
        for text in [
            "",
            "yesterday",
            "2021-03-04T05:06:07Z",
            "2021-03-04T05:06:07.123Z",
            "2021-03-04T05:06:07.1234567Z",
            "2021-03-04 05:06:07.123456Z",
            "2021-13-04T05:06:07.123456Z",
        ] {
            assert!(
                matches!(parse_timestamp(text), Err(CodecError::FormatMismatch { .. })),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn millis_outside_range_are_rejected() {
        assert!(matches!(
            from_millis(i64::MAX),
            Err(CodecError::TimestampOutOfRange(i64::MAX))
        ));
        assert_eq!(from_millis(0).unwrap(), instant("1970-01-01T00:00:00Z"));
    }
}
