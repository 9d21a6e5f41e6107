mod palette;
mod primitives;
mod recording_surface;
mod series;

pub use palette::{OverlayPalette, Theme};
pub use primitives::{Color, LineStyle};
pub use recording_surface::{RecordedSeries, RecordingSurface, SurfaceCall};
pub use series::{HistogramPoint, SeriesData, SeriesKind, SeriesSpec, SeriesStyle};

use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::extensions::SeriesMarker;

/// Identifier a surface hands out for one live series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceSeriesId(pub u64);

/// Capability contract of the host chart widget.
///
/// Only the series registry talks to a surface, so every series on it is
/// accounted for by exactly one registry handle. Marker support is optional
/// and must be probed with `supports_markers` before calling `set_markers`.
pub trait ChartSurface {
    fn add_series(&mut self, kind: SeriesKind, style: &SeriesStyle)
    -> ChartResult<SurfaceSeriesId>;

    /// Removes a series. Returns `ChartError::UnknownSeries` when the surface
    /// no longer holds it.
    fn remove_series(&mut self, id: SurfaceSeriesId) -> ChartResult<()>;

    fn set_data(&mut self, id: SurfaceSeriesId, data: &SeriesData) -> ChartResult<()>;

    fn supports_markers(&self) -> bool {
        false
    }

    fn set_markers(&mut self, id: SurfaceSeriesId, markers: &[SeriesMarker]) -> ChartResult<()> {
        let _ = (id, markers);
        Err(ChartError::Surface(
            "surface has no marker capability".to_owned(),
        ))
    }

    /// Adjusts surface geometry; series content is untouched.
    fn resize(&mut self, viewport: Viewport) -> ChartResult<()>;
}
