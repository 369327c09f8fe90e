//! Scalar value grammar
//!
//! Textual forms on the wire:
//!
//! ```text
//! integer   -?[0-9]+
//! string    UTF-8
//! bytes     verbatim
//! boolean   True | False
//! float     shortest round-trip decimal | Inf | -Inf | nan
//! decimal   plain or d.dddE±n text (no Infinity / NaN / sNaN)
//! datetime  YYYY-MM-DDThh:mm:ss.ffffff+HH:MM (32 bytes)
//! ```

use std::str::FromStr;

use bigdecimal::BigDecimal;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDateTime, TimeZone, Timelike};

use super::{AmpType, Value};
use crate::protocol::{BooleanSyntax, CodecConfig, Error, IntegerSyntax, Result};

/// Length of a timestamp carrying an explicit offset
pub const ZONED_TIMESTAMP_LEN: usize = 32;

const OFFSET_START: usize = 26;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DECIMAL_SPECIALS: [&str; 6] = ["Infinity", "-Infinity", "NaN", "-NaN", "sNaN", "-sNaN"];

/// Encode a scalar value under its declared type
pub fn encode(ty: &AmpType, value: &Value) -> Result<Bytes> {
    let bytes = match (ty, value) {
        (AmpType::Integer, Value::Integer(i)) => Bytes::from(i.to_string()),
        (AmpType::String, Value::String(s)) => Bytes::copy_from_slice(s.as_bytes()),
        (AmpType::Bytes | AmpType::ByteBuffer, Value::Bytes(b)) => b.clone(),
        (AmpType::Bytes | AmpType::ByteBuffer, Value::ByteBuffer(b)) => {
            Bytes::copy_from_slice(b)
        }
        (AmpType::Boolean, Value::Boolean(b)) => Bytes::from_static(encode_boolean(*b)),
        (AmpType::Float, Value::Float(f)) => Bytes::from(encode_float(*f)),
        (AmpType::Decimal, Value::Decimal(d)) => Bytes::from(encode_decimal(d)),
        (AmpType::DateTime, Value::DateTime(dt)) => Bytes::from(encode_timestamp(dt)?),
        (ty, value) => return Err(Error::type_mismatch(ty.name(), value.kind())),
    };
    Ok(bytes)
}

/// Decode a scalar value under its declared type
pub fn decode(ty: &AmpType, bytes: Bytes, config: &CodecConfig) -> Result<Value> {
    let value = match ty {
        AmpType::Integer => Value::Integer(decode_integer(&bytes, config.integer_syntax)?),
        AmpType::String => Value::String(decode_string(&bytes)?),
        AmpType::Bytes => Value::Bytes(bytes),
        AmpType::ByteBuffer => Value::ByteBuffer(BytesMut::from(&bytes[..])),
        AmpType::Boolean => Value::Boolean(decode_boolean(&bytes, config.boolean_syntax)?),
        AmpType::Float => Value::Float(decode_float(&bytes)?),
        AmpType::Decimal => Value::Decimal(decode_decimal(&bytes)?),
        AmpType::DateTime => Value::DateTime(decode_timestamp(&bytes)?),
        AmpType::List | AmpType::Item(_) => {
            return Err(Error::Malformed(format!("{ty} is not a scalar type")));
        }
    };
    Ok(value)
}

fn ascii_text<'a>(expected: &'static str, bytes: &'a [u8]) -> Result<&'a str> {
    if !bytes.is_ascii() {
        return Err(Error::mismatch_bytes(expected, bytes));
    }
    std::str::from_utf8(bytes).map_err(|_| Error::mismatch_bytes(expected, bytes))
}

/// Decode UTF-8 text
pub fn decode_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| Error::mismatch_bytes("string", bytes))
}

/// Parse an integer under `syntax`
pub fn decode_integer(bytes: &[u8], syntax: IntegerSyntax) -> Result<i64> {
    let text = ascii_text("integer", bytes)?;
    let mismatch = || Error::type_mismatch("integer", text);

    let (negative, unsigned) = match syntax {
        IntegerSyntax::Decimal => match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        },
        IntegerSyntax::Lenient => {
            if let Some(rest) = text.strip_prefix('-') {
                (true, rest)
            } else {
                (false, text.strip_prefix('+').unwrap_or(text))
            }
        }
    };

    let (radix, digits) = match syntax {
        IntegerSyntax::Decimal => (10, unsigned),
        IntegerSyntax::Lenient => {
            if let Some(hex) = unsigned
                .strip_prefix("0x")
                .or_else(|| unsigned.strip_prefix("0X"))
                .or_else(|| unsigned.strip_prefix('#'))
            {
                (16, hex)
            } else if unsigned.len() > 1 && unsigned.starts_with('0') {
                (8, &unsigned[1..])
            } else {
                (10, unsigned)
            }
        }
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(mismatch());
    }

    let signed = if negative {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    i64::from_str_radix(&signed, radix).map_err(|_| mismatch())
}

/// Wire form of a boolean
#[must_use]
pub const fn encode_boolean(value: bool) -> &'static [u8] {
    if value { b"True" } else { b"False" }
}

/// Parse a boolean under `syntax`
pub fn decode_boolean(bytes: &[u8], syntax: BooleanSyntax) -> Result<bool> {
    match (bytes, syntax) {
        (b"True", _) => Ok(true),
        (b"False", _) | (_, BooleanSyntax::Lenient) => Ok(false),
        (_, BooleanSyntax::Strict) => Err(Error::mismatch_bytes("boolean", bytes)),
    }
}

/// Wire form of a float
#[must_use]
pub fn encode_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{value:?}")
    }
}

/// Parse a float, recognising the `Inf` / `-Inf` / `nan` sentinels
pub fn decode_float(bytes: &[u8]) -> Result<f64> {
    let text = ascii_text("float", bytes)?;
    match text {
        "Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        "nan" => Ok(f64::NAN),
        _ => text
            .parse::<f64>()
            .map_err(|_| Error::type_mismatch("float", text)),
    }
}

/// Canonical wire form of a decimal.
///
/// Plain notation while the scale is non-negative and the adjusted exponent
/// is at least -6; otherwise one leading digit and an `E` exponent that
/// always carries its sign (`1E+30`, `1.5E-13`).
#[must_use]
pub fn encode_decimal(value: &BigDecimal) -> String {
    let (digits, scale) = value.as_bigint_and_exponent();
    let digits = digits.to_string();
    let (sign, magnitude) = match digits.strip_prefix('-') {
        Some(magnitude) => ("-", magnitude),
        None => ("", digits.as_str()),
    };
    let len = magnitude.len();
    let adjusted = i64::try_from(len).unwrap_or(i64::MAX) - 1 - scale;

    if scale >= 0 && adjusted >= -6 {
        let scale = usize::try_from(scale).unwrap_or(usize::MAX);
        if scale == 0 {
            format!("{sign}{magnitude}")
        } else if len > scale {
            let (whole, fraction) = magnitude.split_at(len - scale);
            format!("{sign}{whole}.{fraction}")
        } else {
            format!("{sign}0.{}{magnitude}", "0".repeat(scale - len))
        }
    } else {
        let (lead, rest) = magnitude.split_at(1);
        let point = if rest.is_empty() { "" } else { "." };
        let exp_sign = if adjusted >= 0 { "+" } else { "" };
        format!("{sign}{lead}{point}{rest}E{exp_sign}{adjusted}")
    }
}

/// Parse a decimal, refusing the non-finite specials
pub fn decode_decimal(bytes: &[u8]) -> Result<BigDecimal> {
    let text = ascii_text("decimal", bytes)?;
    if DECIMAL_SPECIALS.contains(&text) {
        return Err(Error::Unsupported(format!("decimal value {text:?}")));
    }
    BigDecimal::from_str(text).map_err(|_| Error::type_mismatch("decimal", text))
}

/// Wire form of a timestamp: always 32 bytes, microsecond precision
pub fn encode_timestamp(value: &DateTime<FixedOffset>) -> Result<String> {
    if !(0..=9999).contains(&value.year()) {
        return Err(Error::Unsupported(format!(
            "timestamp year {} outside 0000-9999",
            value.year()
        )));
    }
    let offset = value.offset().local_minus_utc();
    if offset % 60 != 0 {
        return Err(Error::Unsupported(format!(
            "UTC offset of {offset}s is not a whole number of minutes"
        )));
    }
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.unsigned_abs();
    Ok(format!(
        "{}.{:06}{sign}{:02}:{:02}",
        value.format("%Y-%m-%dT%H:%M:%S"),
        value.nanosecond() % 1_000_000_000 / 1_000,
        offset / 3600,
        offset % 3600 / 60
    ))
}

/// Parse a timestamp; text without an offset is taken as UTC
pub fn decode_timestamp(bytes: &[u8]) -> Result<DateTime<FixedOffset>> {
    let text = ascii_text("datetime", bytes)?;
    let mismatch = || Error::type_mismatch("datetime", text);

    let (local, offset) = if text.len() == ZONED_TIMESTAMP_LEN {
        (&text[..OFFSET_START], parse_offset(&text[OFFSET_START..]).ok_or_else(mismatch)?)
    } else {
        (text, FixedOffset::east_opt(0).ok_or_else(mismatch)?)
    };

    let naive = NaiveDateTime::parse_from_str(local, TIMESTAMP_FORMAT).map_err(|_| mismatch())?;
    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(mismatch)
}

/// `±HH:MM`
fn parse_offset(text: &str) -> Option<FixedOffset> {
    let bytes = text.as_bytes();
    if bytes.len() != 6 || bytes[3] != b':' {
        return None;
    }
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let hours: i32 = text[1..3].parse().ok()?;
    let minutes: i32 = text[4..6].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timestamp(text: &str) -> DateTime<FixedOffset> {
        decode_timestamp(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_integer_forms() {
        let lenient = IntegerSyntax::Lenient;
        assert_eq!(decode_integer(b"7", lenient).unwrap(), 7);
        assert_eq!(decode_integer(b"-42", lenient).unwrap(), -42);
        assert_eq!(decode_integer(b"+5", lenient).unwrap(), 5);
        assert_eq!(decode_integer(b"0x1F", lenient).unwrap(), 31);
        assert_eq!(decode_integer(b"-#10", lenient).unwrap(), -16);
        assert_eq!(decode_integer(b"010", lenient).unwrap(), 8);
        assert_eq!(decode_integer(b"0", lenient).unwrap(), 0);
        assert_eq!(
            decode_integer(b"-9223372036854775808", lenient).unwrap(),
            i64::MIN
        );

        for bad in [&b""[..], b"-", b"12a", b" 1", b"0x", b"09", b"--1", b"9223372036854775808"] {
            assert!(
                matches!(decode_integer(bad, lenient), Err(Error::TypeMismatch { .. })),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_decimal_only_integers() {
        let decimal = IntegerSyntax::Decimal;
        assert_eq!(decode_integer(b"010", decimal).unwrap(), 10);
        assert_eq!(decode_integer(b"-3", decimal).unwrap(), -3);
        assert!(decode_integer(b"0x10", decimal).is_err());
        assert!(decode_integer(b"+3", decimal).is_err());
    }

    #[test]
    fn test_boolean_forms() {
        assert!(decode_boolean(b"True", BooleanSyntax::Lenient).unwrap());
        assert!(!decode_boolean(b"False", BooleanSyntax::Lenient).unwrap());
        assert!(!decode_boolean(b"true", BooleanSyntax::Lenient).unwrap());
        assert!(!decode_boolean(b"", BooleanSyntax::Lenient).unwrap());

        assert!(!decode_boolean(b"False", BooleanSyntax::Strict).unwrap());
        assert!(decode_boolean(b"yes", BooleanSyntax::Strict).is_err());
        assert_eq!(encode_boolean(true), b"True");
        assert_eq!(encode_boolean(false), b"False");
    }

    #[test]
    fn test_float_sentinels() {
        assert_eq!(encode_float(f64::INFINITY), "Inf");
        assert_eq!(encode_float(f64::NEG_INFINITY), "-Inf");
        assert_eq!(encode_float(f64::NAN), "nan");
        assert_eq!(decode_float(b"Inf").unwrap(), f64::INFINITY);
        assert_eq!(decode_float(b"-Inf").unwrap(), f64::NEG_INFINITY);
        assert!(decode_float(b"nan").unwrap().is_nan());
    }

    #[test]
    fn test_float_text() {
        assert_eq!(encode_float(7.0), "7.0");
        assert_eq!(encode_float(0.1), "0.1");
        assert_eq!(encode_float(1e300), "1e300");
        assert_eq!(decode_float(b"1.5").unwrap(), 1.5);
        assert_eq!(decode_float(b"1e+300").unwrap(), 1e300);
        assert!(matches!(decode_float(b"one"), Err(Error::TypeMismatch { .. })));

        for value in [0.1, -2.5e-10, 123_456_789.123, f64::MAX, f64::MIN_POSITIVE] {
            assert_eq!(decode_float(encode_float(value).as_bytes()).unwrap(), value);
        }
    }

    #[test]
    fn test_decimal_specials_rejected() {
        for special in DECIMAL_SPECIALS {
            assert!(
                matches!(decode_decimal(special.as_bytes()), Err(Error::Unsupported(_))),
                "{special}"
            );
        }
        assert!(matches!(decode_decimal(b"1.2.3"), Err(Error::TypeMismatch { .. })));
        assert_eq!(
            decode_decimal(b"-12.340").unwrap(),
            BigDecimal::from_str("-12.34").unwrap()
        );
    }

    #[test]
    fn test_decimal_text() {
        for (text, wire) in [
            ("0", "0"),
            ("-12.340", "-12.340"),
            ("0.001", "0.001"),
            ("0.000001", "0.000001"),
            ("0.0000000000001", "1E-13"),
            ("1E+30", "1E+30"),
            ("1e30", "1E+30"),
            ("-1.25e-9", "-1.25E-9"),
            ("123E+2", "1.23E+4"),
            ("12345678901234567890.000001", "12345678901234567890.000001"),
        ] {
            let value = BigDecimal::from_str(text).unwrap();
            assert_eq!(encode_decimal(&value), wire, "{text}");
            assert_eq!(decode_decimal(wire.as_bytes()).unwrap(), value, "{text}");
        }
    }

    #[test]
    fn test_timestamp_rejects_sub_minute_offset() {
        let offset = FixedOffset::east_opt(3630).unwrap();
        let value = offset.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(encode_timestamp(&value), Err(Error::Unsupported(_))));
        assert!(matches!(
            encode(&AmpType::DateTime, &Value::DateTime(value)),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_timestamp_with_offset() {
        let text = "2023-04-05T06:07:08.009000+02:30";
        let value = timestamp(text);

        assert_eq!(value.offset().local_minus_utc(), 2 * 3600 + 30 * 60);
        assert_eq!(value.hour(), 6);
        assert_eq!(value.nanosecond(), 9_000_000);
        assert_eq!(encode_timestamp(&value).unwrap(), text);
        assert_eq!(encode_timestamp(&value).unwrap().len(), ZONED_TIMESTAMP_LEN);
    }

    #[test]
    fn test_timestamp_negative_offset() {
        let text = "1999-12-31T23:59:59.123456-05:00";
        let value = timestamp(text);
        assert_eq!(value.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(encode_timestamp(&value).unwrap(), text);
    }

    #[test]
    fn test_timestamp_without_offset_is_utc() {
        let value = timestamp("2020-01-02T03:04:05.000006");
        assert_eq!(value.offset().local_minus_utc(), 0);
        assert_eq!(
            encode_timestamp(&value).unwrap(),
            "2020-01-02T03:04:05.000006+00:00"
        );
    }

    #[test]
    fn test_timestamp_truncates_to_microseconds() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let value = offset
            .with_ymd_and_hms(2021, 6, 7, 8, 9, 10)
            .unwrap()
            .with_nanosecond(123_456_789)
            .unwrap();
        assert_eq!(
            encode_timestamp(&value).unwrap(),
            "2021-06-07T08:09:10.123456+00:00"
        );
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        for bad in [
            "",
            "2023-04-05",
            "2023-13-05T06:07:08.009000+02:30",
            "2023-04-05T06:07:08.009000*02:30",
            "2023-04-05T06:07:08.009000+02:75",
        ] {
            assert!(
                matches!(decode_timestamp(bad.as_bytes()), Err(Error::TypeMismatch { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_scalar_type_mismatch() {
        let result = encode(&AmpType::Integer, &Value::String("7".to_string()));
        assert!(matches!(
            result,
            Err(Error::TypeMismatch { expected: "integer", .. })
        ));
        assert!(decode(&AmpType::List, Bytes::new(), &CodecConfig::default()).is_err());
    }

    #[test]
    fn test_byte_buffer_is_copied() {
        let wire = Bytes::from_static(b"\x00\x01\xFF");
        let value = decode(&AmpType::ByteBuffer, wire.clone(), &CodecConfig::default()).unwrap();
        assert_eq!(value, Value::ByteBuffer(BytesMut::from(&b"\x00\x01\xFF"[..])));
        assert_eq!(encode(&AmpType::ByteBuffer, &value).unwrap(), wire);
    }
}
