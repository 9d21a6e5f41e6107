//! Pattern annotations to series specs.
//!
//! Every function here is pure. Elements that cannot be placed on the
//! canonical axis are skipped individually and reported as
//! `ElementSkipped`; the rest of the list still renders.

use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::core::{CandleSeries, CanonicalTime, SeriesPoint};
use crate::diagnostics::{OverlayDiagnostic, SkipReason};
use crate::extensions::{
    CentralBank, Direction, Fractal, FractalKind, MarkerPosition, MarkerShape, PatternLine,
    SeriesMarker, sort_markers,
};
use crate::render::{LineStyle, OverlayPalette, SeriesSpec, SeriesStyle};

use super::OverlayCategory;
use super::overlay_builder::CategoryOverlay;

/// Output of one pattern renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternRender {
    pub specs: Vec<SeriesSpec>,
    pub diagnostics: Vec<OverlayDiagnostic>,
}

impl PatternRender {
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.specs.iter().map(|spec| spec.markers.len()).sum()
    }

    fn skip(&mut self, category: OverlayCategory, position: usize, reason: SkipReason) {
        trace!(%category, position, ?reason, "skipping pattern element");
        self.diagnostics.push(OverlayDiagnostic::ElementSkipped {
            category,
            position,
            reason,
        });
    }

    fn finish(self, category: OverlayCategory, total: usize) -> Self {
        if !self.diagnostics.is_empty() {
            debug!(
                %category,
                total,
                skipped = self.diagnostics.len(),
                "pattern elements skipped"
            );
        }
        self
    }
}

impl From<PatternRender> for CategoryOverlay {
    fn from(render: PatternRender) -> Self {
        Self {
            specs: render.specs,
            diagnostics: render.diagnostics,
        }
    }
}

/// Fractals as point markers.
///
/// Markers ride on a transparent carrier line keyed `fractals` with one
/// point per distinct fractal time. Tops sit above the bar pointing down,
/// bottoms below the bar pointing up.
#[must_use]
pub fn render_fractals(
    fractals: &[Fractal],
    candles: &CandleSeries,
    palette: &OverlayPalette,
    marker_text: bool,
) -> PatternRender {
    let category = OverlayCategory::Fractals;
    let mut out = PatternRender::default();

    let mut placed: Vec<(CanonicalTime, &Fractal)> = Vec::with_capacity(fractals.len());
    for (position, fractal) in fractals.iter().enumerate() {
        match resolve(candles, fractal.index) {
            Ok(time) => placed.push((time, fractal)),
            Err(reason) => out.skip(category, position, reason),
        }
    }
    if placed.is_empty() {
        return out.finish(category, fractals.len());
    }
    placed.sort_by_key(|(time, fractal)| (*time, fractal.kind, OrderedFloat(fractal.price)));

    let mut carrier: Vec<SeriesPoint> = Vec::new();
    let mut markers = Vec::with_capacity(placed.len());
    for (time, fractal) in placed {
        if carrier.last().is_none_or(|point| point.time < time) {
            carrier.push(SeriesPoint::new(time, fractal.price));
        }
        markers.push(fractal_marker(time, fractal, palette, marker_text));
    }
    sort_markers(&mut markers);

    let style = SeriesStyle::line(palette.bullish.with_alpha(0.0), 1.0, LineStyle::Solid);
    out.specs
        .push(SeriesSpec::line("fractals", style, carrier).with_markers(markers));
    out.finish(category, fractals.len())
}

fn fractal_marker(
    time: CanonicalTime,
    fractal: &Fractal,
    palette: &OverlayPalette,
    marker_text: bool,
) -> SeriesMarker {
    let (position, shape, label, tag) = match fractal.kind {
        FractalKind::Top => (MarkerPosition::AboveBar, MarkerShape::ArrowDown, "T", "top"),
        FractalKind::Bottom => (MarkerPosition::BelowBar, MarkerShape::ArrowUp, "B", "bottom"),
    };
    let marker = SeriesMarker::new(
        format!("fractal-{tag}-{}", fractal.index),
        time,
        position,
        shape,
        palette.fractal(fractal.kind),
    )
    .with_price(fractal.price);
    if marker_text {
        marker.with_text(label)
    } else {
        marker
    }
}

/// Strokes as two-point solid lines colored by direction.
#[must_use]
pub fn render_strokes(
    strokes: &[PatternLine],
    candles: &CandleSeries,
    palette: &OverlayPalette,
) -> PatternRender {
    render_lines(
        OverlayCategory::Strokes,
        "stroke",
        strokes,
        candles,
        |direction| SeriesStyle::line(palette.direction(direction), 2.0, LineStyle::Solid),
    )
}

/// Segments as heavier two-point lines; down segments are dashed.
#[must_use]
pub fn render_segments(
    segments: &[PatternLine],
    candles: &CandleSeries,
    palette: &OverlayPalette,
) -> PatternRender {
    render_lines(
        OverlayCategory::Segments,
        "segment",
        segments,
        candles,
        |direction| {
            let dash = match direction {
                Direction::Up => LineStyle::Solid,
                Direction::Down => LineStyle::Dashed,
            };
            SeriesStyle::line(palette.segment(direction), 3.0, dash)
        },
    )
}

fn render_lines(
    category: OverlayCategory,
    prefix: &str,
    lines: &[PatternLine],
    candles: &CandleSeries,
    style_for: impl Fn(Direction) -> SeriesStyle,
) -> PatternRender {
    let mut out = PatternRender::default();
    for (position, line) in lines.iter().enumerate() {
        if line.start_index == line.end_index {
            out.skip(category, position, SkipReason::DegenerateGeometry);
            continue;
        }
        let endpoints = resolve(candles, line.start_index)
            .and_then(|start| Ok((start, resolve(candles, line.end_index)?)));
        let (start, end) = match endpoints {
            Ok(pair) => pair,
            Err(reason) => {
                out.skip(category, position, reason);
                continue;
            }
        };
        if start >= end {
            out.skip(category, position, SkipReason::DegenerateGeometry);
            continue;
        }

        out.specs.push(SeriesSpec::line(
            format!("{prefix}-{position}"),
            style_for(line.direction),
            vec![
                SeriesPoint::new(start, line.start_price),
                SeriesPoint::new(end, line.end_price),
            ],
        ));
    }
    out.finish(category, lines.len())
}

/// Central banks as a pair of flat lines at `high` and `low` across every
/// resolved candle of `start_index..=end_index`.
#[must_use]
pub fn render_central_banks(
    banks: &[CentralBank],
    candles: &CandleSeries,
    palette: &OverlayPalette,
) -> PatternRender {
    let category = OverlayCategory::CentralBanks;
    let timeline = candles.timeline();
    let style = SeriesStyle::line(palette.central_bank, 1.0, LineStyle::Solid);
    let mut out = PatternRender::default();

    for (position, bank) in banks.iter().enumerate() {
        if bank.start_index > bank.end_index {
            out.skip(category, position, SkipReason::EmptyRange);
            continue;
        }
        if !timeline.contains_index(bank.end_index) {
            out.skip(category, position, SkipReason::IndexOutOfRange);
            continue;
        }
        let times: Vec<CanonicalTime> = (bank.start_index..=bank.end_index)
            .filter_map(|index| timeline.time_at(index))
            .collect();
        if times.is_empty() {
            out.skip(category, position, SkipReason::UnresolvedTime);
            continue;
        }

        for (edge, price) in [("high", bank.high), ("low", bank.low)] {
            out.specs.push(SeriesSpec::line(
                format!("central-bank-{position}-{edge}"),
                style,
                times
                    .iter()
                    .map(|time| SeriesPoint::new(*time, price))
                    .collect(),
            ));
        }
    }
    out.finish(category, banks.len())
}

fn resolve(candles: &CandleSeries, index: usize) -> Result<CanonicalTime, SkipReason> {
    let timeline = candles.timeline();
    if !timeline.contains_index(index) {
        return Err(SkipReason::IndexOutOfRange);
    }
    timeline.time_at(index).ok_or(SkipReason::UnresolvedTime)
}
