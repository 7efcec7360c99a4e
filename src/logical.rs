//! Converts raw physical values to their logical-type representation:
//! dates, times, timestamps, decimals, UUIDs, and UTF-8 strings.
//!
//! Conversion is opportunistic and pure: these are plain functions over a
//! physical value and a logical type's parameters, with no dependency on
//! [`crate::assembly`] or [`crate::column`] beyond the raw byte shapes
//! those modules already hand back.

use crate::error::{oos_err, Result};
use crate::metadata::types::{ConvertedType, LogicalType, TimeUnit};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

const DAYS_FROM_CE_TO_UNIX_EPOCH: i64 = 719_163;

/// A fixed-point decimal: `unscaled * 10^-scale`. Parquet decimals carry
/// no native Rust type; this preserves full precision as a 128-bit
/// unscaled integer rather than rounding into `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    pub unscaled: i128,
    pub scale: i32,
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scale <= 0 {
            return write!(f, "{}", self.unscaled * 10i128.pow((-self.scale) as u32));
        }
        let scale = self.scale as u32;
        let divisor = 10i128.pow(scale);
        let sign = if self.unscaled < 0 { "-" } else { "" };
        let magnitude = self.unscaled.unsigned_abs();
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            magnitude / divisor as u128,
            magnitude % divisor as u128,
            width = scale as usize
        )
    }
}

/// Resolves a column's effective logical type: the logical type wins when
/// both are present; otherwise the legacy converted type is mapped to its
/// logical equivalent. Returns `None` for converted types with no
/// value-level meaning (`LIST`/`MAP`/`MAP_KEY_VALUE`, which only shape the
/// schema tree) or with no logical equivalent (`INTERVAL`).
pub fn effective_logical_type(
    converted_type: Option<ConvertedType>,
    logical_type: Option<LogicalType>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> Option<LogicalType> {
    if let Some(logical) = logical_type {
        return Some(logical);
    }
    Some(match converted_type? {
        ConvertedType::Utf8 => LogicalType::String,
        ConvertedType::Enum => LogicalType::Enum,
        ConvertedType::Json => LogicalType::Json,
        ConvertedType::Bson => LogicalType::Bson,
        ConvertedType::Date => LogicalType::Date,
        ConvertedType::TimeMillis => LogicalType::Time {
            unit: TimeUnit::Millis,
            is_adjusted_to_utc: true,
        },
        ConvertedType::TimeMicros => LogicalType::Time {
            unit: TimeUnit::Micros,
            is_adjusted_to_utc: true,
        },
        ConvertedType::TimestampMillis => LogicalType::Timestamp {
            unit: TimeUnit::Millis,
            is_adjusted_to_utc: true,
        },
        ConvertedType::TimestampMicros => LogicalType::Timestamp {
            unit: TimeUnit::Micros,
            is_adjusted_to_utc: true,
        },
        ConvertedType::Decimal => LogicalType::Decimal {
            precision: precision.unwrap_or(0),
            scale: scale.unwrap_or(0),
        },
        ConvertedType::Uint8 => LogicalType::Integer { bit_width: 8, signed: false },
        ConvertedType::Uint16 => LogicalType::Integer { bit_width: 16, signed: false },
        ConvertedType::Uint32 => LogicalType::Integer { bit_width: 32, signed: false },
        ConvertedType::Uint64 => LogicalType::Integer { bit_width: 64, signed: false },
        ConvertedType::Int8 => LogicalType::Integer { bit_width: 8, signed: true },
        ConvertedType::Int16 => LogicalType::Integer { bit_width: 16, signed: true },
        ConvertedType::Int32 => LogicalType::Integer { bit_width: 32, signed: true },
        ConvertedType::Int64 => LogicalType::Integer { bit_width: 64, signed: true },
        ConvertedType::Interval | ConvertedType::List | ConvertedType::Map | ConvertedType::MapKeyValue => {
            return None
        }
    })
}

/// `DATE`: days since the Unix epoch, as an `INT32`.
pub fn date_from_days(days: i32) -> Result<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days as i64 + DAYS_FROM_CE_TO_UNIX_EPOCH)
        .ok_or_else(|| oos_err!("date value {} days is out of chrono's representable range", days))
}

fn unit_divisor_for_seconds(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Millis => 1_000,
        TimeUnit::Micros => 1_000_000,
        TimeUnit::Nanos => 1_000_000_000,
    }
}

/// `TIME`: time of day scaled by `unit`, stored as `INT32` (millis only)
/// or `INT64` (micros/nanos).
pub fn time_from_raw(raw: i64, unit: TimeUnit) -> Result<NaiveTime> {
    let divisor = unit_divisor_for_seconds(unit);
    let seconds = raw.div_euclid(divisor);
    let remainder = raw.rem_euclid(divisor);
    let nanos = remainder * (1_000_000_000 / divisor);
    let seconds_in_day = seconds.rem_euclid(86_400);
    NaiveTime::from_num_seconds_from_midnight_opt(seconds_in_day as u32, nanos as u32)
        .ok_or_else(|| oos_err!("time value {} is out of range for unit {:?}", raw, unit))
}

/// `TIMESTAMP`: an instant scaled by `unit`, stored as `INT64`.
/// `is_adjusted_to_utc` only describes how the writer interpreted the
/// value; the instant returned here is always UTC.
pub fn timestamp_from_raw(raw: i64, unit: TimeUnit) -> Result<DateTime<Utc>> {
    let (secs, nanos) = match unit {
        TimeUnit::Millis => (raw.div_euclid(1_000), raw.rem_euclid(1_000) * 1_000_000),
        TimeUnit::Micros => (raw.div_euclid(1_000_000), raw.rem_euclid(1_000_000) * 1_000),
        TimeUnit::Nanos => (raw.div_euclid(1_000_000_000), raw.rem_euclid(1_000_000_000)),
    };
    DateTime::from_timestamp(secs, nanos as u32)
        .ok_or_else(|| oos_err!("timestamp value {} is out of chrono's representable range", raw))
}

/// Legacy `INT96` timestamp: 12 bytes of (nanoseconds-of-day: i64 LE,
/// Julian day: i32 LE). Exposed only on explicit request, per the physical
/// layer's decision to carry INT96 through as raw bytes by default.
pub fn timestamp_from_int96(raw: [u8; 12]) -> Result<DateTime<Utc>> {
    const JULIAN_DAY_OF_UNIX_EPOCH: i64 = 2_440_588;
    let nanos_of_day = i64::from_le_bytes(raw[0..8].try_into().unwrap());
    let julian_day = i32::from_le_bytes(raw[8..12].try_into().unwrap()) as i64;
    let days_since_epoch = julian_day - JULIAN_DAY_OF_UNIX_EPOCH;
    let secs = days_since_epoch * 86_400 + nanos_of_day.div_euclid(1_000_000_000);
    let nanos = nanos_of_day.rem_euclid(1_000_000_000);
    DateTime::from_timestamp(secs, nanos as u32)
        .ok_or_else(|| oos_err!("INT96 timestamp is out of chrono's representable range"))
}

/// `DECIMAL`: two's-complement big-endian bytes (from `INT32`, `INT64`,
/// `BYTE_ARRAY`, or `FIXED_LEN_BYTE_ARRAY`) interpreted with the column's
/// scale.
pub fn decimal_from_be_bytes(bytes: &[u8], scale: i32) -> Result<Decimal> {
    if bytes.is_empty() {
        return Err(oos_err!("decimal value has no bytes"));
    }
    if bytes.len() > 16 {
        return Err(oos_err!(
            "decimal value is {} bytes, wider than this reader's 128-bit accumulator",
            bytes.len()
        ));
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut buf = [if negative { 0xffu8 } else { 0 }; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    let unscaled = i128::from_be_bytes(buf);
    Ok(Decimal { unscaled, scale })
}

pub fn decimal_from_i32(value: i32, scale: i32) -> Decimal {
    Decimal { unscaled: value as i128, scale }
}

pub fn decimal_from_i64(value: i64, scale: i32) -> Decimal {
    Decimal { unscaled: value as i128, scale }
}

/// `UUID`: a 16-byte `FIXED_LEN_BYTE_ARRAY`.
pub fn uuid_from_bytes(bytes: &[u8]) -> Result<uuid::Uuid> {
    let array: [u8; 16] = bytes
        .try_into()
        .map_err(|_| oos_err!("UUID value is {} bytes, expected 16", bytes.len()))?;
    Ok(uuid::Uuid::from_bytes(array))
}

/// `STRING`/`ENUM` (`UTF8`): a `BYTE_ARRAY` validated as UTF-8.
pub fn string_from_bytes(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| oos_err!("string column contains invalid UTF-8: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_zero_is_unix_epoch() {
        assert_eq!(date_from_days(0).unwrap(), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
    }

    #[test]
    fn date_matches_worked_example() {
        // 1990-01-15 is 7319 days after the Unix epoch.
        let date = date_from_days(7319).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1990, 1, 15).unwrap());
    }

    #[test]
    fn timestamp_millis_matches_worked_example() {
        let ts = timestamp_from_raw(1_735_727_400_000, TimeUnit::Millis).unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-01-01T10:30:00+00:00");
    }

    #[test]
    fn decimal_renders_with_fixed_scale() {
        let decimal = decimal_from_i64(123_456, 2);
        assert_eq!(decimal.to_string(), "1234.56");
    }

    #[test]
    fn decimal_from_bytes_handles_negative_two_complement() {
        // -1 encoded as a single two's-complement byte.
        let decimal = decimal_from_be_bytes(&[0xff], 0).unwrap();
        assert_eq!(decimal.unscaled, -1);
    }

    #[test]
    fn uuid_round_trips_canonical_bytes() {
        let bytes = [
            0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56, 0x78, 0x12, 0x34, 0x56, 0x78, 0x12, 0x34,
            0x56, 0x78,
        ];
        let uuid = uuid_from_bytes(&bytes).unwrap();
        assert_eq!(uuid.to_string(), "12345678-1234-5678-1234-567812345678");
    }

    #[test]
    fn string_rejects_invalid_utf8() {
        assert!(string_from_bytes(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn int96_timestamp_matches_julian_day_arithmetic() {
        // Julian day 2440588 (the Unix epoch) at midnight.
        let mut raw = [0u8; 12];
        raw[8..12].copy_from_slice(&2_440_588i32.to_le_bytes());
        let ts = timestamp_from_int96(raw).unwrap();
        assert_eq!(ts.to_rfc3339(), "1970-01-01T00:00:00+00:00");
    }
}
