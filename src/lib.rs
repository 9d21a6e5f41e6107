//! chart-overlay: indicator and pattern overlays for a price chart surface.
//!
//! The engine turns an analyze snapshot (candles plus a flat indicator
//! object) into series on a host `ChartSurface`. Overlay categories are
//! toggled independently; every recompute pass is synchronous and touches
//! only the categories its trigger affects.

pub mod api;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod extensions;
pub mod render;
pub mod telemetry;

pub use api::{OverlayCategory, OverlayEngine, OverlayEngineConfig};
pub use error::{ChartError, ChartResult};
