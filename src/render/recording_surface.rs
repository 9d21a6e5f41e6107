use indexmap::IndexMap;

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::extensions::SeriesMarker;
use crate::render::{ChartSurface, SeriesData, SeriesKind, SeriesStyle, SurfaceSeriesId};

/// Surface call, in the order it was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceCall {
    Add(SurfaceSeriesId, SeriesKind),
    Remove(SurfaceSeriesId),
    SetData(SurfaceSeriesId, usize),
    SetMarkers(SurfaceSeriesId, usize),
    Resize(Viewport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSeries {
    pub kind: SeriesKind,
    pub style: SeriesStyle,
    pub data: Option<SeriesData>,
    pub markers: Vec<SeriesMarker>,
}

/// Headless surface used by tests and server-side rendering checks.
///
/// It keeps the live series and a call log, and validates every payload the
/// way a real chart host would, so malformed series surface as errors instead
/// of silently rendering.
#[derive(Debug)]
pub struct RecordingSurface {
    next_id: u64,
    markers_supported: bool,
    viewport: Option<Viewport>,
    series: IndexMap<SurfaceSeriesId, RecordedSeries>,
    calls: Vec<SurfaceCall>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            markers_supported: true,
            viewport: None,
            series: IndexMap::new(),
            calls: Vec::new(),
        }
    }

    /// Surface lacking the marker capability.
    #[must_use]
    pub fn without_markers() -> Self {
        Self {
            markers_supported: false,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn live_series_count(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn series(&self, id: SurfaceSeriesId) -> Option<&RecordedSeries> {
        self.series.get(&id)
    }

    pub fn live_series(&self) -> impl Iterator<Item = (SurfaceSeriesId, &RecordedSeries)> + '_ {
        self.series.iter().map(|(id, series)| (*id, series))
    }

    #[must_use]
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.series.values().map(|series| series.markers.len()).sum()
    }

    /// Drops a series behind the registry's back, like a host that
    /// invalidates series on its own.
    pub fn release_externally(&mut self, id: SurfaceSeriesId) -> bool {
        self.series.shift_remove(&id).is_some()
    }

    fn live_mut(&mut self, id: SurfaceSeriesId) -> ChartResult<&mut RecordedSeries> {
        self.series
            .get_mut(&id)
            .ok_or(ChartError::UnknownSeries(id))
    }
}

impl ChartSurface for RecordingSurface {
    fn add_series(
        &mut self,
        kind: SeriesKind,
        style: &SeriesStyle,
    ) -> ChartResult<SurfaceSeriesId> {
        style.validate()?;
        let id = SurfaceSeriesId(self.next_id);
        self.next_id += 1;
        self.series.insert(
            id,
            RecordedSeries {
                kind,
                style: *style,
                data: None,
                markers: Vec::new(),
            },
        );
        self.calls.push(SurfaceCall::Add(id, kind));
        Ok(id)
    }

    fn remove_series(&mut self, id: SurfaceSeriesId) -> ChartResult<()> {
        if self.series.shift_remove(&id).is_none() {
            return Err(ChartError::UnknownSeries(id));
        }
        self.calls.push(SurfaceCall::Remove(id));
        Ok(())
    }

    fn set_data(&mut self, id: SurfaceSeriesId, data: &SeriesData) -> ChartResult<()> {
        data.validate()?;
        let series = self.live_mut(id)?;
        let matches_kind = matches!(
            (series.kind, data),
            (SeriesKind::Candlestick, SeriesData::Candles(_))
                | (SeriesKind::Line, SeriesData::Line(_))
                | (SeriesKind::Histogram, SeriesData::Histogram(_))
        );
        if !matches_kind {
            return Err(ChartError::InvalidData(format!(
                "{:?} series cannot take this data shape",
                series.kind
            )));
        }
        series.data = Some(data.clone());
        self.calls.push(SurfaceCall::SetData(id, data.len()));
        Ok(())
    }

    fn supports_markers(&self) -> bool {
        self.markers_supported
    }

    fn set_markers(&mut self, id: SurfaceSeriesId, markers: &[SeriesMarker]) -> ChartResult<()> {
        if !self.markers_supported {
            return Err(ChartError::Surface(
                "surface has no marker capability".to_owned(),
            ));
        }
        let series = self.live_mut(id)?;
        series.markers = markers.to_vec();
        self.calls.push(SurfaceCall::SetMarkers(id, markers.len()));
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = Some(viewport);
        self.calls.push(SurfaceCall::Resize(viewport));
        Ok(())
    }
}
