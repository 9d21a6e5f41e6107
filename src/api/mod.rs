mod data_controller;
mod engine;
mod engine_accessors;
mod engine_config;
mod engine_init;
mod overlay_builder;
mod pattern_renderer;
mod registry;
mod snapshot;
mod visibility;

pub use engine::OverlayEngine;
pub use engine_config::{LengthMismatchPolicy, OverlayEngineConfig};
pub use overlay_builder::{
    CategoryOverlay, OverlayContext, base_series, build_category, moving_average_series,
};
pub use pattern_renderer::{
    PatternRender, render_central_banks, render_fractals, render_segments, render_strokes,
};
pub use registry::{CategorySync, LiveSeries, SeriesHandle, SeriesRegistry};
pub use snapshot::{AnalyzeResponse, IndicatorSnapshot, IndicatorValue};
pub use visibility::{OverlayCategory, VisibilityState};
