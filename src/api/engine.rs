use tracing::{debug, warn};

use crate::core::{CandleSeries, Viewport};
use crate::diagnostics::{OverlayDiagnostic, RecomputeTrigger, RenderReport};
use crate::error::{ChartError, ChartResult};
use crate::extensions::PatternSet;
use crate::render::{ChartSurface, OverlayPalette};

use super::overlay_builder::{CategoryOverlay, OverlayContext, build_category};
use super::{
    IndicatorSnapshot, OverlayCategory, OverlayEngineConfig, SeriesRegistry, VisibilityState,
};

/// Main orchestration facade consumed by host applications.
///
/// `OverlayEngine` owns the surface through its `SeriesRegistry` and runs
/// one synchronous recompute pass per trigger: new data, a visibility toggle
/// or a resize. Each pass touches only the categories the trigger affects.
pub struct OverlayEngine<S: ChartSurface> {
    pub(super) config: OverlayEngineConfig,
    pub(super) palette: OverlayPalette,
    pub(super) registry: SeriesRegistry<S>,
    pub(super) visibility: VisibilityState,
    pub(super) candles: CandleSeries,
    pub(super) snapshot: IndicatorSnapshot,
    pub(super) patterns: PatternSet,
    /// Diagnostics raised while ingesting the current data.
    pub(super) ingest_diagnostics: Vec<OverlayDiagnostic>,
}

impl<S: ChartSurface> OverlayEngine<S> {
    /// Flips one overlay category and recomputes only that category.
    pub fn toggle(&mut self, category: OverlayCategory) -> ChartResult<RenderReport> {
        self.ensure_live()?;
        self.visibility.toggle(category)?;
        self.on_visibility_changed(category)
    }

    /// Toggles a category by its dashboard name (`ma20`, `centralBanks`, ...).
    pub fn toggle_named(&mut self, name: &str) -> ChartResult<RenderReport> {
        let category: OverlayCategory = name.parse()?;
        self.toggle(category)
    }

    /// Sets one category; a call that does not change the flag is a no-op pass.
    pub fn set_visible(
        &mut self,
        category: OverlayCategory,
        visible: bool,
    ) -> ChartResult<RenderReport> {
        self.ensure_live()?;
        if !self.visibility.set_visible(category, visible)? {
            return Ok(RenderReport::new(RecomputeTrigger::VisibilityChanged(
                category,
            )));
        }
        self.on_visibility_changed(category)
    }

    /// Updates surface geometry. No series is recomputed.
    pub fn resize(&mut self, width: u32, height: u32) -> ChartResult<RenderReport> {
        self.ensure_live()?;
        let viewport = Viewport::new(width, height);
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport { width, height });
        }
        self.config.viewport = viewport;
        self.registry.resize(viewport)?;
        debug!(width, height, "resized overlay surface");
        Ok(RenderReport::new(RecomputeTrigger::Resized))
    }

    /// Disposes every live series. Later calls, and the final drop, do nothing.
    ///
    /// Returns how many series were disposed.
    pub fn teardown(&mut self) -> usize {
        self.registry.dispose_all()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.registry.is_closed()
    }

    pub(super) fn ensure_live(&self) -> ChartResult<()> {
        if self.registry.is_closed() {
            return Err(ChartError::InvalidData(
                "overlay engine has been torn down".to_owned(),
            ));
        }
        Ok(())
    }

    /// Full pass after new data: base plus every configured category.
    pub(super) fn on_data_changed(&mut self) -> ChartResult<RenderReport> {
        let mut report = RenderReport::new(RecomputeTrigger::DataChanged);
        report
            .diagnostics
            .extend(self.ingest_diagnostics.iter().cloned());

        let categories: Vec<OverlayCategory> = std::iter::once(OverlayCategory::Base)
            .chain(self.visibility.categories())
            .collect();
        for category in categories {
            self.recompute_category(category, &mut report)?;
        }
        log_pass(&report);
        Ok(report)
    }

    pub(super) fn on_visibility_changed(
        &mut self,
        category: OverlayCategory,
    ) -> ChartResult<RenderReport> {
        let mut report = RenderReport::new(RecomputeTrigger::VisibilityChanged(category));
        report.diagnostics.extend(
            self.ingest_diagnostics
                .iter()
                .filter(|entry| entry.category() == Some(category))
                .cloned(),
        );
        self.recompute_category(category, &mut report)?;
        log_pass(&report);
        Ok(report)
    }

    /// Brings one category in line with the current data and its flag.
    ///
    /// Hidden categories are disposed. Visible ones are rebuilt and synced;
    /// the registry disposes the previous series before creating new ones.
    fn recompute_category(
        &mut self,
        category: OverlayCategory,
        report: &mut RenderReport,
    ) -> ChartResult<()> {
        if !self.visibility.is_visible(category) {
            report.disposed += self.registry.dispose_category(category);
            return Ok(());
        }

        let overlay = if category == OverlayCategory::Fractals
            && !self.registry.surface().supports_markers()
        {
            warn!(%category, "surface does not support markers; skipping fractals");
            CategoryOverlay {
                specs: Vec::new(),
                diagnostics: vec![OverlayDiagnostic::MarkersUnsupported { category }],
            }
        } else {
            build_category(category, self.context())
        };
        report.diagnostics.extend(overlay.diagnostics);

        let sync = self.registry.sync_category(category, overlay.specs)?;
        report.created += sync.created;
        report.disposed += sync.disposed;
        report.markers += sync.markers;
        if sync.unchanged {
            report.unchanged += 1;
        }
        for (key, err) in sync.failures {
            report.diagnostics.push(OverlayDiagnostic::SurfaceFailure {
                category,
                key,
                message: err.to_string(),
            });
        }
        Ok(())
    }

    fn context(&self) -> OverlayContext<'_> {
        OverlayContext {
            candles: &self.candles,
            snapshot: &self.snapshot,
            patterns: &self.patterns,
            palette: &self.palette,
            policy: self.config.length_mismatch_policy,
            fractal_marker_text: self.config.fractal_marker_text,
        }
    }
}

fn log_pass(report: &RenderReport) {
    debug!(
        trigger = ?report.trigger,
        created = report.created,
        disposed = report.disposed,
        unchanged = report.unchanged,
        markers = report.markers,
        diagnostics = report.diagnostics.len(),
        "overlay pass complete"
    );
}
