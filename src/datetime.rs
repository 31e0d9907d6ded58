//! Fixed-format ISO-8601 date rendering.
//!
//! The runtime represents a date as milliseconds since the Unix epoch
//! in an `f64`, with NaN marking an invalid date.

use chrono::{DateTime, Datelike, Utc};

use crate::error::ConvError;

/// Largest magnitude, in milliseconds from the epoch, the host accepts
/// as a time value.
pub const MAX_EPOCH_MILLIS: f64 = 8_640_000_000_000_000.0;

/// Render an epoch-milliseconds time value as
/// `YYYY-MM-DDTHH:mm:ss.sssZ` — UTC, millisecond precision, four-digit
/// year. Fractions of a millisecond are truncated toward zero.
///
/// Fails when the value is not a valid time (NaN, infinite, outside
/// the host's time range) or when the year does not fit the fixed
/// four-digit field.
pub fn iso_utc(epoch_millis: f64) -> Result<String, ConvError> {
    if !epoch_millis.is_finite() || epoch_millis.abs() > MAX_EPOCH_MILLIS {
        return Err(ConvError::InvalidDate {
            millis: epoch_millis,
        });
    }
    let ms = epoch_millis.trunc() as i64;
    let dt = DateTime::<Utc>::from_timestamp_millis(ms).ok_or(ConvError::InvalidDate {
        millis: epoch_millis,
    })?;
    if !(0..=9999).contains(&dt.year()) {
        return Err(ConvError::InvalidDate {
            millis: epoch_millis,
        });
    }
    Ok(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}
