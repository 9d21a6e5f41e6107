use tracing::debug;

use crate::core::CandleSeries;
use crate::error::ChartResult;
use crate::extensions::PatternSet;
use crate::render::{ChartSurface, OverlayPalette};

use super::{
    IndicatorSnapshot, OverlayEngine, OverlayEngineConfig, SeriesRegistry, VisibilityState,
};

impl<S: ChartSurface> OverlayEngine<S> {
    /// Creates an engine bound to `surface`.
    ///
    /// Every toggleable category starts hidden and no series exists until
    /// the first `set_data`.
    pub fn new(surface: S, config: OverlayEngineConfig) -> ChartResult<Self> {
        config.validate()?;

        let mut registry = SeriesRegistry::new(surface);
        registry.resize(config.viewport)?;

        debug!(
            symbol = %config.symbol,
            width = config.viewport.width,
            height = config.viewport.height,
            theme = ?config.theme,
            "overlay engine initialized"
        );

        Ok(Self {
            palette: OverlayPalette::for_theme(config.theme),
            visibility: VisibilityState::new(&config.moving_average_periods),
            registry,
            candles: CandleSeries::default(),
            snapshot: IndicatorSnapshot::new(),
            patterns: PatternSet::default(),
            ingest_diagnostics: Vec::new(),
            config,
        })
    }
}
