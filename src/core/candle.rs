use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::primitives::{datetime_to_canonical, decimal_to_f64};
use crate::core::{CanonicalTime, TimeInput, Timeline};
use crate::error::{ChartError, ChartResult};

/// Candle exactly as delivered by the analyze endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandle {
    pub time: TimeInput,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl RawCandle {
    #[must_use]
    pub fn new(
        time: impl Into<TimeInput>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            time: time.into(),
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Validated OHLCV bar on the canonical time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: CanonicalTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Builds a candle from feed values.
    ///
    /// Only non-finite values and a negative volume are rejected. OHLC
    /// geometry is left as delivered; see [`Candle::new_strict`].
    pub fn new(
        time: CanonicalTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> ChartResult<Self> {
        if !open.is_finite()
            || !high.is_finite()
            || !low.is_finite()
            || !close.is_finite()
            || !volume.is_finite()
        {
            return Err(ChartError::InvalidData(
                "ohlcv values must be finite".to_owned(),
            ));
        }

        if volume < 0.0 {
            return Err(ChartError::InvalidData(
                "volume must be >= 0".to_owned(),
            ));
        }

        Ok(Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Builds a candle with consistent OHLC geometry.
    ///
    /// On top of [`Candle::new`]:
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    pub fn new_strict(
        time: CanonicalTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> ChartResult<Self> {
        let candle = Self::new(time, open, high, low, close, volume)?;

        if low > high {
            return Err(ChartError::InvalidData(
                "ohlc low must be <= high".to_owned(),
            ));
        }

        if open < low || open > high || close < low || close > high {
            return Err(ChartError::InvalidData(
                "ohlc open/close must be within low/high range".to_owned(),
            ));
        }

        Ok(candle)
    }

    /// Converts strongly-typed temporal/decimal input into a validated candle.
    pub fn from_decimal_time(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> ChartResult<Self> {
        Self::new_strict(
            datetime_to_canonical(time),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
            decimal_to_f64(volume, "volume")?,
        )
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.close >= self.open
    }
}

/// Source candle that could not be placed on the canonical axis.
#[derive(Debug)]
pub struct RejectedCandle {
    pub index: usize,
    pub error: ChartError,
}

/// Candles of one data refresh after time normalization.
///
/// `candles` only holds accepted bars, in strictly increasing time order.
/// `timeline` keeps one slot per source bar so pattern indices still resolve.
#[derive(Debug, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
    timeline: Timeline,
    rejected: Vec<RejectedCandle>,
}

impl CandleSeries {
    /// Normalizes source candles into a strictly ordered series.
    ///
    /// A bar is dropped when its time does not parse, a value is not finite,
    /// its volume is negative, or its time does not advance past the
    /// previously accepted bar. Dropped
    /// bars keep an empty timeline slot.
    #[must_use]
    pub fn normalize(raw: &[RawCandle]) -> Self {
        let mut candles = Vec::with_capacity(raw.len());
        let mut slots = Vec::with_capacity(raw.len());
        let mut rejected = Vec::new();

        for (index, bar) in raw.iter().enumerate() {
            match accept_candle(bar, candles.last()) {
                Ok(candle) => {
                    slots.push(Some(candle.time));
                    candles.push(candle);
                }
                Err(error) => {
                    warn!(index, error = %error, "dropping candle");
                    slots.push(None);
                    rejected.push(RejectedCandle { index, error });
                }
            }
        }

        debug!(
            source_count = raw.len(),
            accepted_count = candles.len(),
            rejected_count = rejected.len(),
            "normalized candles"
        );

        Self {
            candles,
            timeline: Timeline::from_slots(slots),
            rejected,
        }
    }

    /// Builds a series from candles already on the canonical axis.
    pub fn from_candles(candles: Vec<Candle>) -> ChartResult<Self> {
        for pair in candles.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(ChartError::InvalidData(format!(
                    "candle times must be strictly increasing ({} then {})",
                    pair[0].time, pair[1].time
                )));
            }
        }
        let timeline = Timeline::from_slots(candles.iter().map(|c| Some(c.time)).collect());
        Ok(Self {
            candles,
            timeline,
            rejected: Vec::new(),
        })
    }

    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[must_use]
    pub fn rejected(&self) -> &[RejectedCandle] {
        &self.rejected
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Source candle count, including rejected bars.
    #[must_use]
    pub fn source_len(&self) -> usize {
        self.timeline.len()
    }
}

fn accept_candle(bar: &RawCandle, previous: Option<&Candle>) -> ChartResult<Candle> {
    let time = bar.time.normalize()?;
    let candle = Candle::new(time, bar.open, bar.high, bar.low, bar.close, bar.volume)?;
    if let Some(previous) = previous {
        if candle.time <= previous.time {
            return Err(ChartError::InvalidData(format!(
                "candle time {} does not advance past {}",
                candle.time, previous.time
            )));
        }
    }
    Ok(candle)
}
