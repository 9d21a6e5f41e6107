use tracing::warn;

use crate::core::{CandleSeries, SeriesPoint, moving_average};
use crate::diagnostics::OverlayDiagnostic;
use crate::extensions::PatternSet;
use crate::render::{
    HistogramPoint, LineStyle, OverlayPalette, SeriesData, SeriesKind, SeriesSpec, SeriesStyle,
};

use super::pattern_renderer::{
    render_central_banks, render_fractals, render_segments, render_strokes,
};
use super::{IndicatorSnapshot, IndicatorValue, LengthMismatchPolicy, OverlayCategory};

/// Read-only inputs of one recompute pass.
#[derive(Debug, Clone, Copy)]
pub struct OverlayContext<'a> {
    pub candles: &'a CandleSeries,
    pub snapshot: &'a IndicatorSnapshot,
    pub patterns: &'a PatternSet,
    pub palette: &'a OverlayPalette,
    pub policy: LengthMismatchPolicy,
    pub fractal_marker_text: bool,
}

/// Series and diagnostics produced for one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryOverlay {
    pub specs: Vec<SeriesSpec>,
    pub diagnostics: Vec<OverlayDiagnostic>,
}

impl CategoryOverlay {
    fn push(&mut self, spec: Option<SeriesSpec>) {
        self.specs.extend(spec);
    }
}

/// Builds the series of `category` from the pass inputs.
///
/// Pure: equal inputs give equal output, which is what keeps repeated passes
/// from churning the surface.
#[must_use]
pub fn build_category(category: OverlayCategory, ctx: OverlayContext<'_>) -> CategoryOverlay {
    let candles = ctx.candles;
    match category {
        OverlayCategory::Base => CategoryOverlay {
            specs: base_series(candles, ctx.palette),
            diagnostics: Vec::new(),
        },
        OverlayCategory::MovingAverage(period) => CategoryOverlay {
            specs: moving_average_series(candles, period, ctx.palette)
                .into_iter()
                .collect(),
            diagnostics: Vec::new(),
        },
        OverlayCategory::Bollinger => bollinger(ctx),
        OverlayCategory::Sar => sar(ctx),
        OverlayCategory::Vwap => vwap(ctx),
        OverlayCategory::Pivot => pivot(ctx),
        OverlayCategory::SuperTrend => supertrend(ctx),
        OverlayCategory::SupportResistance => support_resistance(ctx),
        OverlayCategory::Fractals => render_fractals(
            &ctx.patterns.fractals,
            candles,
            ctx.palette,
            ctx.fractal_marker_text,
        )
        .into(),
        OverlayCategory::Strokes => {
            render_strokes(&ctx.patterns.strokes, candles, ctx.palette).into()
        }
        OverlayCategory::Segments => {
            render_segments(&ctx.patterns.segments, candles, ctx.palette).into()
        }
        OverlayCategory::CentralBanks => {
            render_central_banks(&ctx.patterns.central_banks, candles, ctx.palette).into()
        }
    }
}

/// Candlestick price series plus a volume histogram colored by bar direction.
#[must_use]
pub fn base_series(candles: &CandleSeries, palette: &OverlayPalette) -> Vec<SeriesSpec> {
    if candles.is_empty() {
        return Vec::new();
    }

    let price = SeriesSpec {
        key: "price".to_owned(),
        kind: SeriesKind::Candlestick,
        style: SeriesStyle::candlestick(palette.bullish, palette.bearish),
        data: SeriesData::Candles(candles.candles().to_vec()),
        markers: Vec::new(),
    };
    let volume = SeriesSpec {
        key: "volume".to_owned(),
        kind: SeriesKind::Histogram,
        style: SeriesStyle::histogram(palette.volume(true)),
        data: SeriesData::Histogram(
            candles
                .candles()
                .iter()
                .map(|candle| HistogramPoint {
                    time: candle.time,
                    value: candle.volume,
                    color: palette.volume(candle.is_bullish()),
                })
                .collect(),
        ),
        markers: Vec::new(),
    };
    vec![price, volume]
}

/// Client-side simple moving average; `None` when the period exceeds the data.
#[must_use]
pub fn moving_average_series(
    candles: &CandleSeries,
    period: usize,
    palette: &OverlayPalette,
) -> Option<SeriesSpec> {
    let points = moving_average(candles.candles(), period);
    if points.is_empty() {
        return None;
    }
    Some(SeriesSpec::line(
        format!("ma{period}"),
        SeriesStyle::line(palette.moving_average(period), 1.5, LineStyle::Solid),
        points,
    ))
}

fn bollinger(ctx: OverlayContext<'_>) -> CategoryOverlay {
    let palette = ctx.palette;
    let mut out = CategoryOverlay::default();
    for (indicator, style) in [
        (
            "bb_upper",
            SeriesStyle::line(palette.band, 1.0, LineStyle::Dashed),
        ),
        (
            "bb_middle",
            SeriesStyle::line(palette.band_middle, 1.0, LineStyle::Solid),
        ),
        (
            "bb_lower",
            SeriesStyle::line(palette.band, 1.0, LineStyle::Dashed),
        ),
    ] {
        let spec = indicator_line(ctx, OverlayCategory::Bollinger, indicator, style, &mut out);
        out.push(spec);
    }
    out
}

fn sar(ctx: OverlayContext<'_>) -> CategoryOverlay {
    let palette = ctx.palette;
    let color = match ctx.snapshot.text("sar_signal") {
        Some("buy") => palette.bullish,
        Some("sell") => palette.bearish,
        _ => palette.sar,
    };
    let mut out = CategoryOverlay::default();
    let spec = indicator_line(
        ctx,
        OverlayCategory::Sar,
        "sar",
        SeriesStyle::line(color, 2.0, LineStyle::Dotted),
        &mut out,
    );
    out.push(spec);
    out
}

fn vwap(ctx: OverlayContext<'_>) -> CategoryOverlay {
    let indicator = if ctx.snapshot.contains("vwap") {
        "vwap"
    } else {
        "vwap_20"
    };
    let mut out = CategoryOverlay::default();
    let spec = indicator_line(
        ctx,
        OverlayCategory::Vwap,
        indicator,
        SeriesStyle::line(ctx.palette.vwap, 1.5, LineStyle::Solid),
        &mut out,
    );
    out.push(spec);
    out
}

fn pivot(ctx: OverlayContext<'_>) -> CategoryOverlay {
    let palette = ctx.palette;
    let pivot_style = SeriesStyle::line(palette.pivot, 1.0, LineStyle::Solid);
    let resistance_style = SeriesStyle::line(palette.resistance, 1.0, LineStyle::Dashed);
    let support_style = SeriesStyle::line(palette.support, 1.0, LineStyle::Dashed);

    let mut out = CategoryOverlay::default();
    for (indicator, style) in [
        ("pivot", pivot_style),
        ("pivot_r1", resistance_style),
        ("pivot_r2", resistance_style),
        ("pivot_r3", resistance_style),
        ("pivot_s1", support_style),
        ("pivot_s2", support_style),
        ("pivot_s3", support_style),
    ] {
        let spec = indicator_line(ctx, OverlayCategory::Pivot, indicator, style, &mut out);
        out.push(spec);
    }
    out
}

fn supertrend(ctx: OverlayContext<'_>) -> CategoryOverlay {
    let palette = ctx.palette;
    let color = match ctx.snapshot.text("supertrend_direction") {
        Some("up") => palette.bullish,
        Some("down") => palette.bearish,
        _ => palette.supertrend,
    };
    let mut out = CategoryOverlay::default();
    let spec = indicator_line(
        ctx,
        OverlayCategory::SuperTrend,
        "supertrend",
        SeriesStyle::line(color, 2.0, LineStyle::Solid),
        &mut out,
    );
    out.push(spec);
    out
}

fn support_resistance(ctx: OverlayContext<'_>) -> CategoryOverlay {
    let palette = ctx.palette;
    let mut out = CategoryOverlay::default();
    for (indicator, style) in [
        (
            "resistance_20d_high",
            SeriesStyle::line(palette.resistance, 1.0, LineStyle::LargeDashed),
        ),
        (
            "support_20d_low",
            SeriesStyle::line(palette.support, 1.0, LineStyle::LargeDashed),
        ),
    ] {
        let spec = indicator_line(
            ctx,
            OverlayCategory::SupportResistance,
            indicator,
            style,
            &mut out,
        );
        out.push(spec);
    }
    out
}

/// One indicator as a line keyed by the indicator name.
///
/// Scalars are broadcast over every accepted candle time. Full series map
/// 1:1 onto the source candle slots; a length mismatch is reported and
/// handled per `LengthMismatchPolicy`.
fn indicator_line(
    ctx: OverlayContext<'_>,
    category: OverlayCategory,
    indicator: &str,
    style: SeriesStyle,
    out: &mut CategoryOverlay,
) -> Option<SeriesSpec> {
    let points = match ctx.snapshot.value(indicator)? {
        IndicatorValue::Scalar(value) => ctx
            .candles
            .timeline()
            .times()
            .map(|time| SeriesPoint::new(time, value))
            .collect::<Vec<_>>(),
        IndicatorValue::Series(values) => {
            let expected = ctx.candles.source_len();
            if values.len() != expected {
                warn!(
                    %category,
                    indicator,
                    expected,
                    actual = values.len(),
                    policy = ?ctx.policy,
                    "indicator length does not match candles"
                );
                out.diagnostics.push(OverlayDiagnostic::LengthMismatch {
                    category,
                    indicator: indicator.to_owned(),
                    expected,
                    actual: values.len(),
                });
                if ctx.policy == LengthMismatchPolicy::Reject {
                    return None;
                }
            }
            ctx.candles
                .timeline()
                .slots()
                .zip(values)
                .filter_map(|(slot, value)| Some(SeriesPoint::new(slot?, value?)))
                .collect()
        }
    };

    if points.is_empty() {
        return None;
    }
    Some(SeriesSpec::line(indicator, style, points))
}
