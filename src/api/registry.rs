use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::{ChartSurface, SeriesSpec, SurfaceSeriesId};

use super::OverlayCategory;

/// Opaque reference to one live series.
///
/// Handles are arena slots with a generation counter, so a handle kept after
/// disposal never aliases the series that later reuses its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesHandle {
    index: u32,
    generation: u32,
}

/// Registry view of one series on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSeries {
    category: OverlayCategory,
    surface_id: SurfaceSeriesId,
    spec: SeriesSpec,
}

impl LiveSeries {
    #[must_use]
    pub fn category(&self) -> OverlayCategory {
        self.category
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.spec.key
    }

    #[must_use]
    pub fn surface_id(&self) -> SurfaceSeriesId {
        self.surface_id
    }

    #[must_use]
    pub fn spec(&self) -> &SeriesSpec {
        &self.spec
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    live: Option<LiveSeries>,
}

/// Outcome of replacing one category's series.
#[derive(Debug, Default)]
pub struct CategorySync {
    pub created: usize,
    pub disposed: usize,
    pub markers: usize,
    /// The requested specs matched the live ones; nothing was touched.
    pub unchanged: bool,
    pub failures: Vec<(String, ChartError)>,
}

/// Sole owner of the surface and of every series on it.
///
/// All series are grouped by `OverlayCategory`. Writing a category always
/// disposes its previous series before creating new ones, and disposal never
/// fails: a series the surface already dropped is simply forgotten.
pub struct SeriesRegistry<S: ChartSurface> {
    surface: S,
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_category: IndexMap<OverlayCategory, SmallVec<[SeriesHandle; 4]>>,
    /// Specs of the last sync per category, including ones the surface refused.
    requested: IndexMap<OverlayCategory, Vec<SeriesSpec>>,
    closed: bool,
}

impl<S: ChartSurface> SeriesRegistry<S> {
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            slots: Vec::new(),
            free: Vec::new(),
            by_category: IndexMap::new(),
            requested: IndexMap::new(),
            closed: false,
        }
    }

    /// Creates one series for `category`.
    ///
    /// A live series with the same category and key is disposed first.
    pub fn materialize(
        &mut self,
        category: OverlayCategory,
        spec: SeriesSpec,
    ) -> ChartResult<SeriesHandle> {
        self.ensure_open()?;
        self.requested.shift_remove(&category);
        self.create(category, spec)
    }

    fn create(&mut self, category: OverlayCategory, spec: SeriesSpec) -> ChartResult<SeriesHandle> {
        if let Some(existing) = self.find(category, &spec.key) {
            self.dispose(existing);
        }

        let surface_id = self.surface.add_series(spec.kind, &spec.style)?;
        if let Err(err) = self.write_series(surface_id, &spec) {
            self.release_surface_series(surface_id);
            return Err(err);
        }

        trace!(
            %category,
            key = %spec.key,
            points = spec.data.len(),
            markers = spec.markers.len(),
            "materialized series"
        );
        let handle = self.allocate(LiveSeries {
            category,
            surface_id,
            spec,
        });
        self.by_category.entry(category).or_default().push(handle);
        Ok(handle)
    }

    /// Replaces every series of `category` with `specs`.
    ///
    /// When `specs` equals the live specs in order, or the specs of the
    /// previous sync of this category, the category is left untouched and
    /// the existing handles survive. Series the surface refused last time are
    /// therefore only retried once their spec changes.
    pub fn sync_category(
        &mut self,
        category: OverlayCategory,
        specs: Vec<SeriesSpec>,
    ) -> ChartResult<CategorySync> {
        self.ensure_open()?;

        let mut outcome = CategorySync::default();
        if self.live_specs_match(category, &specs) {
            outcome.unchanged = true;
            return Ok(outcome);
        }

        outcome.disposed = self.dispose_category(category);
        let markers_supported = self.surface.supports_markers();
        for spec in specs.iter().cloned() {
            let key = spec.key.clone();
            let markers = spec.markers.len();
            match self.create(category, spec) {
                Ok(_) => {
                    outcome.created += 1;
                    if markers_supported {
                        outcome.markers += markers;
                    }
                }
                Err(err) => {
                    warn!(%category, %key, error = %err, "failed to materialize series");
                    outcome.failures.push((key, err));
                }
            }
        }
        self.requested.insert(category, specs);
        Ok(outcome)
    }

    /// Disposes every series of `category`. Returns how many were live.
    pub fn dispose_category(&mut self, category: OverlayCategory) -> usize {
        self.requested.shift_remove(&category);
        let Some(handles) = self.by_category.shift_remove(&category) else {
            return 0;
        };
        let disposed = handles
            .into_iter()
            .filter(|handle| self.release(*handle))
            .count();
        if disposed > 0 {
            debug!(%category, disposed, "disposed category");
        }
        disposed
    }

    /// Disposes every live series and closes the registry.
    ///
    /// Only the first call does work; later calls return 0. A closed
    /// registry rejects further materialization.
    pub fn dispose_all(&mut self) -> usize {
        if self.closed {
            return 0;
        }
        self.closed = true;
        let categories: Vec<OverlayCategory> = self.by_category.keys().copied().collect();
        let disposed = categories
            .into_iter()
            .map(|category| self.dispose_category(category))
            .sum::<usize>();
        debug!(disposed, "disposed all series");
        disposed
    }

    pub fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.surface.resize(viewport)
    }

    #[must_use]
    pub fn handles(&self, category: OverlayCategory) -> &[SeriesHandle] {
        self.by_category
            .get(&category)
            .map(|handles| handles.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn get(&self, handle: SeriesHandle) -> Option<&LiveSeries> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.live.as_ref())
    }

    #[must_use]
    pub fn contains(&self, handle: SeriesHandle) -> bool {
        self.get(handle).is_some()
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.by_category.values().map(|handles| handles.len()).sum()
    }

    pub fn categories(&self) -> impl Iterator<Item = OverlayCategory> + '_ {
        self.by_category.keys().copied()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Host access to the widget itself. Series must still be created and
    /// removed through the registry.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn ensure_open(&self) -> ChartResult<()> {
        if self.closed {
            return Err(ChartError::InvalidData(
                "series registry has been torn down".to_owned(),
            ));
        }
        Ok(())
    }

    fn find(&self, category: OverlayCategory, key: &str) -> Option<SeriesHandle> {
        self.handles(category)
            .iter()
            .copied()
            .find(|handle| self.get(*handle).is_some_and(|live| live.key() == key))
    }

    fn live_specs_match(&self, category: OverlayCategory, specs: &[SeriesSpec]) -> bool {
        if self
            .requested
            .get(&category)
            .is_some_and(|previous| previous.as_slice() == specs)
        {
            return true;
        }
        let handles = self.handles(category);
        handles.len() == specs.len()
            && handles
                .iter()
                .zip(specs)
                .all(|(handle, spec)| self.get(*handle).is_some_and(|live| live.spec == *spec))
    }

    fn write_series(&mut self, surface_id: SurfaceSeriesId, spec: &SeriesSpec) -> ChartResult<()> {
        self.surface.set_data(surface_id, &spec.data)?;
        if spec.markers.is_empty() {
            return Ok(());
        }
        if !self.surface.supports_markers() {
            warn!(key = %spec.key, "surface lacks marker support; skipping markers");
            return Ok(());
        }
        self.surface.set_markers(surface_id, &spec.markers)
    }

    fn allocate(&mut self, live: LiveSeries) -> SeriesHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.live = Some(live);
            return SeriesHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            live: Some(live),
        });
        SeriesHandle {
            index,
            generation: 0,
        }
    }

    /// Disposes one handle and drops it from its category list.
    fn dispose(&mut self, handle: SeriesHandle) {
        let Some(category) = self.get(handle).map(LiveSeries::category) else {
            return;
        };
        if let Some(handles) = self.by_category.get_mut(&category) {
            handles.retain(|entry| *entry != handle);
            if handles.is_empty() {
                self.by_category.shift_remove(&category);
            }
        }
        self.release(handle);
    }

    /// Frees the slot behind `handle` and removes its surface series.
    fn release(&mut self, handle: SeriesHandle) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
        else {
            return false;
        };
        let Some(live) = slot.live.take() else {
            return false;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.release_surface_series(live.surface_id);
        true
    }

    fn release_surface_series(&mut self, surface_id: SurfaceSeriesId) {
        match self.surface.remove_series(surface_id) {
            Ok(()) => {}
            Err(ChartError::UnknownSeries(id)) => {
                debug!(?id, "series already released by surface");
            }
            Err(err) => {
                warn!(?surface_id, error = %err, "surface failed to remove series");
            }
        }
    }
}

impl<S: ChartSurface> Drop for SeriesRegistry<S> {
    fn drop(&mut self) {
        self.dispose_all();
    }
}
