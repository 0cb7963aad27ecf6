//! Wire formats for timestamps and durations.
//!
//! Durations travel as protobuf-style strings (`"120s"`, `"0.5s"`) and
//! timestamps as RFC 3339 strings. Timestamps keep their UTC offset so that
//! two models built in different time zones can be told apart.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

use crate::error::SchemaError;

/// A point in time with the UTC offset it was written with.
pub type Timestamp = DateTime<FixedOffset>;

/// Time origin of a model that does not set `globalStartTime`.
pub fn unix_epoch() -> Timestamp {
    DateTime::<Utc>::default().fixed_offset()
}

/// Renders a timestamp as `YYYY-MM-DD HH:MM:SS+HH:MM`.
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S%:z").to_string()
}

/// Formats a duration as seconds with an `s` suffix, dropping a zero fraction.
pub fn format_duration(duration: TimeDelta) -> String {
    let seconds = duration.num_seconds();
    let nanos = (duration - TimeDelta::seconds(seconds))
        .num_nanoseconds()
        .unwrap_or(0)
        .abs();
    if nanos == 0 {
        return format!("{seconds}s");
    }
    let sign = if seconds == 0 && duration < TimeDelta::zero() { "-" } else { "" };
    let fraction = format!("{nanos:09}");
    format!("{sign}{seconds}.{}s", fraction.trim_end_matches('0'))
}

/// Parses `"<seconds>[.<fraction>]s"`, with at most nanosecond precision.
pub fn parse_duration(text: &str) -> Result<TimeDelta, SchemaError> {
    let invalid = || SchemaError::InvalidDuration(text.to_string());

    let body = text.trim().strip_suffix('s').ok_or_else(invalid)?;
    let (negative, body) = match body.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !digits(whole)
        || !digits(fraction)
        || fraction.len() > 9
    {
        return Err(invalid());
    }

    let seconds: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let nanos: i64 = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<9}").parse().map_err(|_| invalid())?
    };

    let magnitude = TimeDelta::try_seconds(seconds).ok_or_else(invalid)? + TimeDelta::nanoseconds(nanos);
    Ok(if negative { -magnitude } else { magnitude })
}

/// `serde(with = ...)` adapter for duration strings.
pub mod duration_format {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(duration: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<TimeDelta, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse_duration(&text).map_err(de::Error::custom)
    }
}
