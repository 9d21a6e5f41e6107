use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Strictly ordered x-axis key shared by every series of one render pass.
///
/// Values are UTC unix seconds. Date-only inputs resolve to midnight UTC.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CanonicalTime(i64);

impl CanonicalTime {
    #[must_use]
    pub const fn from_unix_seconds(seconds: i64) -> Self {
        Self(seconds)
    }

    #[must_use]
    pub const fn unix_seconds(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CanonicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Candle time as it arrives on the wire.
///
/// The backend formats bars as `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`, but raw
/// bars (`YYYYMMDD`, `YYYYMMDD HH:MM:SS`) and numeric unix stamps also occur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeInput {
    Unix(i64),
    Fractional(f64),
    Text(String),
}

impl TimeInput {
    pub fn normalize(&self) -> ChartResult<CanonicalTime> {
        match self {
            Self::Unix(value) => Ok(unix_to_canonical(*value)),
            Self::Fractional(value) => {
                if !value.is_finite() {
                    return Err(invalid_time(value.to_string(), "numeric time must be finite"));
                }
                let whole = value.trunc();
                if whole < I64_LOWER || whole >= I64_UPPER {
                    return Err(invalid_time(
                        value.to_string(),
                        "numeric time is outside the unix range",
                    ));
                }
                Ok(unix_to_canonical(whole as i64))
            }
            Self::Text(raw) => normalize_time(raw),
        }
    }
}

impl From<&str> for TimeInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for TimeInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for TimeInput {
    fn from(value: i64) -> Self {
        Self::Unix(value)
    }
}

// Exact f64 bounds of i64: -2^63 and 2^63.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

// Offsets without a colon (`-0500`), which RFC 3339 parsing rejects.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"];

// Stamps above this are taken as milliseconds (year 5138 in seconds).
const MILLISECOND_THRESHOLD: i64 = 100_000_000_000;

/// Maps one textual candle time to its canonical key.
///
/// The primary parser covers RFC 3339, the common date-time layouts and plain
/// dates. When it fails, a manual year/month/day split is attempted on the
/// date part. Anything else is an error; the caller decides whether to drop
/// the candle.
pub fn normalize_time(raw: &str) -> ChartResult<CanonicalTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_time(raw, "empty time string"));
    }

    if let Some(time) = parse_primary(trimmed) {
        return Ok(time);
    }
    if let Some(time) = parse_ymd_split(trimmed) {
        return Ok(time);
    }
    Err(invalid_time(raw, "no supported date/time layout matched"))
}

fn parse_primary(input: &str) -> Option<CanonicalTime> {
    if input.bytes().all(|byte| byte.is_ascii_digit()) {
        if input.len() == 8 {
            return NaiveDate::parse_from_str(input, "%Y%m%d")
                .ok()
                .and_then(date_to_canonical);
        }
        return input.parse::<i64>().ok().map(unix_to_canonical);
    }

    if let Ok(time) = DateTime::parse_from_rfc3339(input) {
        return Some(CanonicalTime(time.timestamp()));
    }

    for format in OFFSET_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(input, format) {
            return Some(CanonicalTime(time.timestamp()));
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(input, format) {
            return Some(CanonicalTime(time.and_utc().timestamp()));
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(date_to_canonical)
}

fn parse_ymd_split(input: &str) -> Option<CanonicalTime> {
    let date_part = input
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;
    let mut parts = date_part.split(['-', '/', '.']);
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day).and_then(date_to_canonical)
}

fn date_to_canonical(date: NaiveDate) -> Option<CanonicalTime> {
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| CanonicalTime(midnight.and_utc().timestamp()))
}

fn unix_to_canonical(value: i64) -> CanonicalTime {
    if value.unsigned_abs() >= MILLISECOND_THRESHOLD.unsigned_abs() {
        CanonicalTime(value.div_euclid(1000))
    } else {
        CanonicalTime(value)
    }
}

fn invalid_time(raw: impl Into<String>, reason: &str) -> ChartError {
    ChartError::InvalidTime {
        raw: raw.into(),
        reason: reason.to_owned(),
    }
}

/// Maps source candle positions to canonical times.
///
/// Pattern annotations address candles by their position in the payload, so
/// the timeline keeps one slot per source candle. Slots of candles that were
/// dropped during normalization stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    slots: Vec<Option<CanonicalTime>>,
}

impl Timeline {
    #[must_use]
    pub fn from_slots(slots: Vec<Option<CanonicalTime>>) -> Self {
        Self { slots }
    }

    /// Number of source candles, including dropped ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn contains_index(&self, index: usize) -> bool {
        index < self.slots.len()
    }

    /// Canonical time of the candle at `index`, `None` when out of range or dropped.
    #[must_use]
    pub fn time_at(&self, index: usize) -> Option<CanonicalTime> {
        self.slots.get(index).copied().flatten()
    }

    pub fn slots(&self) -> impl Iterator<Item = Option<CanonicalTime>> + '_ {
        self.slots.iter().copied()
    }

    /// Resolved times in source order.
    pub fn times(&self) -> impl Iterator<Item = CanonicalTime> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millisecond_stamps_are_scaled_down() {
        assert_eq!(
            unix_to_canonical(1_700_000_000_000),
            CanonicalTime(1_700_000_000)
        );
        assert_eq!(unix_to_canonical(1_700_000_000), CanonicalTime(1_700_000_000));
        assert_eq!(
            unix_to_canonical(i64::MIN),
            CanonicalTime(i64::MIN.div_euclid(1000))
        );
    }

    #[test]
    fn split_fallback_rejects_extra_components() {
        assert!(parse_ymd_split("2024-01-05-07").is_none());
        assert!(parse_ymd_split("2024.1.5").is_some());
    }
}
