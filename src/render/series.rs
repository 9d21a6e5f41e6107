use serde::{Deserialize, Serialize};

use crate::core::{Candle, CanonicalTime, SeriesPoint};
use crate::error::{ChartError, ChartResult};
use crate::extensions::SeriesMarker;
use crate::render::{Color, LineStyle};

/// Series flavours a host surface must be able to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    Candlestick,
    Histogram,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub color: Color,
    /// Bearish color for candlesticks; unused by other kinds.
    pub down_color: Option<Color>,
    pub line_width: f64,
    pub line_style: LineStyle,
    pub last_value_visible: bool,
}

impl SeriesStyle {
    #[must_use]
    pub const fn line(color: Color, line_width: f64, line_style: LineStyle) -> Self {
        Self {
            color,
            down_color: None,
            line_width,
            line_style,
            last_value_visible: false,
        }
    }

    #[must_use]
    pub const fn candlestick(up: Color, down: Color) -> Self {
        Self {
            color: up,
            down_color: Some(down),
            line_width: 1.0,
            line_style: LineStyle::Solid,
            last_value_visible: true,
        }
    }

    #[must_use]
    pub const fn histogram(color: Color) -> Self {
        Self {
            color,
            down_color: None,
            line_width: 1.0,
            line_style: LineStyle::Solid,
            last_value_visible: false,
        }
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(ChartError::InvalidData(
                "series line width must be finite and > 0".to_owned(),
            ));
        }
        self.color.validate()?;
        if let Some(down) = self.down_color {
            down.validate()?;
        }
        Ok(())
    }
}

/// One volume bar with its own color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramPoint {
    pub time: CanonicalTime,
    pub value: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SeriesData {
    Candles(Vec<Candle>),
    Line(Vec<SeriesPoint>),
    Histogram(Vec<HistogramPoint>),
}

impl SeriesData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Candles(candles) => candles.len(),
            Self::Line(points) => points.len(),
            Self::Histogram(points) => points.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Times in data order.
    pub fn times(&self) -> Box<dyn Iterator<Item = CanonicalTime> + '_> {
        match self {
            Self::Candles(candles) => Box::new(candles.iter().map(|c| c.time)),
            Self::Line(points) => Box::new(points.iter().map(|p| p.time)),
            Self::Histogram(points) => Box::new(points.iter().map(|p| p.time)),
        }
    }

    /// Checks what every chart host expects from `setData`: strictly
    /// increasing times and finite values.
    pub fn validate(&self) -> ChartResult<()> {
        let mut previous: Option<CanonicalTime> = None;
        for time in self.times() {
            if previous.is_some_and(|prev| time <= prev) {
                return Err(ChartError::InvalidData(format!(
                    "series times must be strictly increasing (at {time})"
                )));
            }
            previous = Some(time);
        }

        let finite = match self {
            Self::Candles(_) => true,
            Self::Line(points) => points.iter().all(|p| p.value.is_finite()),
            Self::Histogram(points) => points.iter().all(|p| p.value.is_finite()),
        };
        if !finite {
            return Err(ChartError::InvalidData(
                "series values must be finite".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Everything needed to materialize one series on a surface.
///
/// Two specs that compare equal render identically, which is what lets the
/// registry skip a recompute whose output did not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub key: String,
    pub kind: SeriesKind,
    pub style: SeriesStyle,
    pub data: SeriesData,
    pub markers: Vec<SeriesMarker>,
}

impl SeriesSpec {
    #[must_use]
    pub fn line(key: impl Into<String>, style: SeriesStyle, points: Vec<SeriesPoint>) -> Self {
        Self {
            key: key.into(),
            kind: SeriesKind::Line,
            style,
            data: SeriesData::Line(points),
            markers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_markers(mut self, markers: Vec<SeriesMarker>) -> Self {
        self.markers = markers;
        self
    }
}
