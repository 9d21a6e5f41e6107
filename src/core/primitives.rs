use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::core::CanonicalTime;
use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_canonical(time: DateTime<Utc>) -> CanonicalTime {
    CanonicalTime::from_unix_seconds(time.timestamp())
}

/// Reads a JSON number as a finite `f64`; `null`, strings and non-finite
/// values count as absent.
#[must_use]
pub fn finite_number(value: &serde_json::Value) -> Option<f64> {
    value.as_f64().filter(|number| number.is_finite())
}
