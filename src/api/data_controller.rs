use tracing::debug;

use crate::core::{CandleSeries, RawCandle};
use crate::diagnostics::{OverlayDiagnostic, RenderReport};
use crate::error::ChartResult;
use crate::extensions::PatternSet;
use crate::render::ChartSurface;

use super::{AnalyzeResponse, IndicatorSnapshot, OverlayEngine};

impl<S: ChartSurface> OverlayEngine<S> {
    /// Replaces candles and indicators and recomputes every category.
    ///
    /// Candles whose time does not parse, whose values are invalid, or whose
    /// time does not advance are dropped. Malformed pattern entries are
    /// rejected. Both are reported as diagnostics; the pass itself only
    /// fails when the engine has been torn down or the surface errors.
    pub fn set_data(
        &mut self,
        candles: &[RawCandle],
        snapshot: IndicatorSnapshot,
    ) -> ChartResult<RenderReport> {
        self.ensure_live()?;

        let candles = CandleSeries::normalize(candles);
        let (patterns, pattern_diagnostics) = PatternSet::from_indicators(&snapshot);

        self.ingest_diagnostics = candles
            .rejected()
            .iter()
            .map(|rejected| OverlayDiagnostic::CandleRejected {
                index: rejected.index,
                reason: rejected.error.to_string(),
            })
            .chain(pattern_diagnostics)
            .collect();

        debug!(
            candles = candles.len(),
            indicators = snapshot.len(),
            fractals = patterns.fractals.len(),
            strokes = patterns.strokes.len(),
            segments = patterns.segments.len(),
            central_banks = patterns.central_banks.len(),
            "set overlay data"
        );

        self.candles = candles;
        self.snapshot = snapshot;
        self.patterns = patterns;
        self.on_data_changed()
    }

    /// Feeds a parsed analyze payload through `set_data`.
    pub fn apply_response(&mut self, response: AnalyzeResponse) -> ChartResult<RenderReport> {
        self.set_data(&response.candles, response.indicators)
    }

    /// Parses and applies a raw analyze payload.
    pub fn apply_response_json(&mut self, input: &str) -> ChartResult<RenderReport> {
        self.apply_response(AnalyzeResponse::from_json_str(input)?)
    }
}
