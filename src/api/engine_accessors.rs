use crate::core::{CandleSeries, Viewport};
use crate::extensions::PatternSet;
use crate::render::{ChartSurface, OverlayPalette};

use super::{
    IndicatorSnapshot, LiveSeries, OverlayCategory, OverlayEngine, OverlayEngineConfig,
    SeriesRegistry, VisibilityState,
};

impl<S: ChartSurface> OverlayEngine<S> {
    #[must_use]
    pub fn config(&self) -> &OverlayEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    #[must_use]
    pub fn palette(&self) -> &OverlayPalette {
        &self.palette
    }

    #[must_use]
    pub fn visibility(&self) -> &VisibilityState {
        &self.visibility
    }

    #[must_use]
    pub fn is_visible(&self, category: OverlayCategory) -> bool {
        self.visibility.is_visible(category)
    }

    #[must_use]
    pub fn candles(&self) -> &CandleSeries {
        &self.candles
    }

    #[must_use]
    pub fn snapshot(&self) -> &IndicatorSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Live series of one category, in creation order.
    #[must_use]
    pub fn live_series(&self, category: OverlayCategory) -> Vec<&LiveSeries> {
        self.registry
            .handles(category)
            .iter()
            .filter_map(|handle| self.registry.get(*handle))
            .collect()
    }

    #[must_use]
    pub fn live_handle_count(&self) -> usize {
        self.registry.live_count()
    }

    #[must_use]
    pub fn registry(&self) -> &SeriesRegistry<S> {
        &self.registry
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        self.registry.surface()
    }

    /// Host access to the surface. Series must still go through the engine.
    pub fn surface_mut(&mut self) -> &mut S {
        self.registry.surface_mut()
    }
}
