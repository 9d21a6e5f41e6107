use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::api::{IndicatorSnapshot, OverlayCategory};
use crate::diagnostics::OverlayDiagnostic;
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalKind {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Direction implied by the endpoint prices, the way the backend labels strokes.
    #[must_use]
    pub fn from_prices(start_price: f64, end_price: f64) -> Self {
        if end_price > start_price {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// Local extremum marker at one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fractal {
    pub index: usize,
    pub price: f64,
    pub kind: FractalKind,
}

/// Directional line between two candles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternLine {
    pub start_index: usize,
    pub end_index: usize,
    pub start_price: f64,
    pub end_price: f64,
    pub direction: Direction,
}

pub type Stroke = PatternLine;
pub type Segment = PatternLine;

/// Consolidation zone spanning an index range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentralBank {
    pub start_index: usize,
    pub end_index: usize,
    pub high: f64,
    pub low: f64,
    /// Midline reported by the backend; not drawn.
    pub center: Option<f64>,
}

/// Closed set of structural annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PatternElement {
    Fractal(Fractal),
    Stroke(Stroke),
    Segment(Segment),
    CentralBank(CentralBank),
}

impl PatternElement {
    #[must_use]
    pub fn category(&self) -> OverlayCategory {
        match self {
            Self::Fractal(_) => OverlayCategory::Fractals,
            Self::Stroke(_) => OverlayCategory::Strokes,
            Self::Segment(_) => OverlayCategory::Segments,
            Self::CentralBank(_) => OverlayCategory::CentralBanks,
        }
    }
}

/// Validated pattern annotations of one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSet {
    pub fractals: Vec<Fractal>,
    pub strokes: Vec<Stroke>,
    pub segments: Vec<Segment>,
    pub central_banks: Vec<CentralBank>,
}

impl PatternSet {
    #[must_use]
    pub fn from_elements(elements: impl IntoIterator<Item = PatternElement>) -> Self {
        let mut set = Self::default();
        for element in elements {
            match element {
                PatternElement::Fractal(fractal) => set.fractals.push(fractal),
                PatternElement::Stroke(stroke) => set.strokes.push(stroke),
                PatternElement::Segment(segment) => set.segments.push(segment),
                PatternElement::CentralBank(bank) => set.central_banks.push(bank),
            }
        }
        set
    }

    pub fn elements(&self) -> impl Iterator<Item = PatternElement> + '_ {
        self.fractals
            .iter()
            .copied()
            .map(PatternElement::Fractal)
            .chain(self.strokes.iter().copied().map(PatternElement::Stroke))
            .chain(self.segments.iter().copied().map(PatternElement::Segment))
            .chain(
                self.central_banks
                    .iter()
                    .copied()
                    .map(PatternElement::CentralBank),
            )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fractals.is_empty()
            && self.strokes.is_empty()
            && self.segments.is_empty()
            && self.central_banks.is_empty()
    }

    /// Reads `fractals`, `strokes`, `segments` and `central_banks` from a snapshot.
    ///
    /// Each entry is validated on its own; malformed entries are rejected with
    /// a diagnostic and never reach rendering. A missing key means the pattern
    /// type is absent, not an error.
    #[must_use]
    pub fn from_indicators(snapshot: &IndicatorSnapshot) -> (Self, Vec<OverlayDiagnostic>) {
        let mut set = Self::default();
        let mut diagnostics = Vec::new();

        if let Some(value) = snapshot.raw("fractals") {
            for (position, entry) in fractal_entries(value).into_iter().enumerate() {
                match entry {
                    Ok(fractal) => set.fractals.push(fractal),
                    Err(err) => {
                        diagnostics.push(rejected(OverlayCategory::Fractals, position, err));
                    }
                }
            }
        }

        for (key, category, target) in [
            ("strokes", OverlayCategory::Strokes, &mut set.strokes),
            ("segments", OverlayCategory::Segments, &mut set.segments),
        ] {
            for (position, entry) in list_entries(snapshot.raw(key)).enumerate() {
                match parse_line(entry) {
                    Ok(line) => target.push(line),
                    Err(err) => diagnostics.push(rejected(category, position, err)),
                }
            }
        }

        for (position, entry) in list_entries(snapshot.raw("central_banks")).enumerate() {
            match parse_central_bank(entry) {
                Ok(bank) => set.central_banks.push(bank),
                Err(err) => {
                    diagnostics.push(rejected(OverlayCategory::CentralBanks, position, err));
                }
            }
        }

        (set, diagnostics)
    }
}

fn rejected(category: OverlayCategory, position: usize, err: ChartError) -> OverlayDiagnostic {
    warn!(%category, position, error = %err, "rejecting pattern entry");
    OverlayDiagnostic::PatternRejected {
        category,
        position,
        reason: err.to_string(),
    }
}

fn list_entries(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .map(|entries| entries.iter())
        .into_iter()
        .flatten()
}

#[derive(Deserialize)]
struct WireFractal {
    index: i64,
    price: f64,
    #[serde(default, alias = "type")]
    kind: Option<FractalKind>,
}

#[derive(Deserialize)]
struct WireLine {
    start_index: i64,
    end_index: i64,
    start_price: f64,
    end_price: f64,
    #[serde(default, rename = "type", alias = "direction")]
    direction: Option<Direction>,
}

#[derive(Deserialize)]
struct WireCentralBank {
    start_index: i64,
    end_index: i64,
    high: f64,
    low: f64,
    #[serde(default)]
    center: Option<f64>,
}

// Accepts a flat list of tagged fractals or the backend's
// `{top_fractals, bottom_fractals}` grouping.
fn fractal_entries(value: &Value) -> Vec<ChartResult<Fractal>> {
    match value {
        Value::Array(entries) => entries
            .iter()
            .map(|entry| parse_fractal(entry, None))
            .collect(),
        Value::Object(groups) => {
            let mut out = Vec::new();
            for (group, kind) in [
                ("top_fractals", FractalKind::Top),
                ("bottom_fractals", FractalKind::Bottom),
            ] {
                for entry in list_entries(groups.get(group)) {
                    out.push(parse_fractal(entry, Some(kind)));
                }
            }
            out
        }
        other => vec![Err(ChartError::InvalidData(format!(
            "fractals must be a list or a top/bottom grouping, got {other}"
        )))],
    }
}

fn parse_fractal(entry: &Value, group_kind: Option<FractalKind>) -> ChartResult<Fractal> {
    let wire: WireFractal = decode(entry, "fractal")?;
    let kind = group_kind
        .or(wire.kind)
        .ok_or_else(|| ChartError::InvalidData("fractal kind is missing".to_owned()))?;
    Ok(Fractal {
        index: to_index(wire.index, "index")?,
        price: finite(wire.price, "price")?,
        kind,
    })
}

fn parse_line(entry: &Value) -> ChartResult<PatternLine> {
    let wire: WireLine = decode(entry, "line")?;
    let start_price = finite(wire.start_price, "start_price")?;
    let end_price = finite(wire.end_price, "end_price")?;
    Ok(PatternLine {
        start_index: to_index(wire.start_index, "start_index")?,
        end_index: to_index(wire.end_index, "end_index")?,
        start_price,
        end_price,
        direction: wire
            .direction
            .unwrap_or_else(|| Direction::from_prices(start_price, end_price)),
    })
}

fn parse_central_bank(entry: &Value) -> ChartResult<CentralBank> {
    let wire: WireCentralBank = decode(entry, "central bank")?;
    let high = finite(wire.high, "high")?;
    let low = finite(wire.low, "low")?;
    if low > high {
        return Err(ChartError::InvalidData(
            "central bank low must be <= high".to_owned(),
        ));
    }
    Ok(CentralBank {
        start_index: to_index(wire.start_index, "start_index")?,
        end_index: to_index(wire.end_index, "end_index")?,
        high,
        low,
        center: wire.center.filter(|center| center.is_finite()),
    })
}

fn decode<T: DeserializeOwned>(entry: &Value, what: &str) -> ChartResult<T> {
    T::deserialize(entry)
        .map_err(|e| ChartError::InvalidData(format!("malformed {what} entry: {e}")))
}

fn to_index(value: i64, field: &str) -> ChartResult<usize> {
    usize::try_from(value)
        .map_err(|_| ChartError::InvalidData(format!("`{field}` must be >= 0, got {value}")))
}

fn finite(value: f64, field: &str) -> ChartResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ChartError::InvalidData(format!("`{field}` must be finite")))
    }
}
