use chart_overlay::api::{OverlayCategory, SeriesRegistry};
use chart_overlay::core::{CanonicalTime, SeriesPoint};
use chart_overlay::render::{
    ChartSurface, Color, LineStyle, RecordingSurface, SeriesSpec, SeriesStyle, SurfaceCall,
};

fn line(key: &str, base: f64) -> SeriesSpec {
    let points = (0..3)
        .map(|i| {
            SeriesPoint::new(
                CanonicalTime::from_unix_seconds(1_700_000_000 + i * 60),
                base + i as f64,
            )
        })
        .collect();
    SeriesSpec::line(
        key,
        SeriesStyle::line(Color::rgb(0.2, 0.4, 0.8), 1.0, LineStyle::Solid),
        points,
    )
}

#[test]
fn materialize_registers_one_handle_per_series() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    let handle = registry
        .materialize(OverlayCategory::Vwap, line("vwap", 10.0))
        .expect("materialize");

    assert!(registry.contains(handle));
    assert_eq!(registry.handles(OverlayCategory::Vwap), &[handle]);
    assert_eq!(registry.live_count(), 1);
    assert_eq!(registry.surface().live_series_count(), 1);
}

#[test]
fn same_key_replaces_previous_series() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    let first = registry
        .materialize(OverlayCategory::Vwap, line("vwap", 10.0))
        .expect("first");
    let second = registry
        .materialize(OverlayCategory::Vwap, line("vwap", 20.0))
        .expect("second");

    assert!(!registry.contains(first));
    assert!(registry.contains(second));
    assert_eq!(registry.live_count(), 1);
    assert_eq!(registry.surface().live_series_count(), 1);
}

#[test]
fn sync_disposes_before_creating() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    registry
        .sync_category(OverlayCategory::Pivot, vec![line("pivot", 10.0)])
        .expect("initial sync");
    registry.surface_mut().clear_calls();

    let sync = registry
        .sync_category(
            OverlayCategory::Pivot,
            vec![line("pivot", 11.0), line("pivot_r1", 12.0)],
        )
        .expect("replacement sync");

    assert_eq!(sync.disposed, 1);
    assert_eq!(sync.created, 2);
    let calls = registry.surface().calls();
    assert!(matches!(calls.first(), Some(SurfaceCall::Remove(_))));
    assert_eq!(
        calls
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Add(..)))
            .count(),
        2
    );
}

#[test]
fn identical_sync_keeps_handles() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    let specs = vec![line("bb_upper", 12.0), line("bb_lower", 8.0)];
    registry
        .sync_category(OverlayCategory::Bollinger, specs.clone())
        .expect("first sync");
    let before = registry.handles(OverlayCategory::Bollinger).to_vec();
    registry.surface_mut().clear_calls();

    let sync = registry
        .sync_category(OverlayCategory::Bollinger, specs)
        .expect("second sync");

    assert!(sync.unchanged);
    assert_eq!(registry.handles(OverlayCategory::Bollinger), before.as_slice());
    assert!(registry.surface().calls().is_empty());
}

#[test]
fn identical_sync_after_a_refused_series_leaves_the_category_alone() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    let mut unordered = line("pivot_r1", 12.0);
    unordered.data = chart_overlay::render::SeriesData::Line(vec![
        SeriesPoint::new(CanonicalTime::from_unix_seconds(10), 1.0),
        SeriesPoint::new(CanonicalTime::from_unix_seconds(5), 1.0),
    ]);
    let specs = vec![line("pivot", 10.0), unordered];

    let first = registry
        .sync_category(OverlayCategory::Pivot, specs.clone())
        .expect("first sync");
    assert_eq!(first.created, 1);
    assert_eq!(first.failures.len(), 1);
    let before = registry.handles(OverlayCategory::Pivot).to_vec();
    registry.surface_mut().clear_calls();

    let second = registry
        .sync_category(OverlayCategory::Pivot, specs)
        .expect("second sync");

    assert!(second.unchanged);
    assert_eq!(second.disposed, 0);
    assert_eq!(registry.handles(OverlayCategory::Pivot), before.as_slice());
    assert!(registry.surface().calls().is_empty());

    let retried = registry
        .sync_category(OverlayCategory::Pivot, vec![line("pivot", 11.0)])
        .expect("changed sync");
    assert!(!retried.unchanged);
    assert_eq!(retried.disposed, 1);
    assert_eq!(retried.created, 1);
}

#[test]
fn disposing_a_category_leaves_others_alone() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    let vwap = registry
        .materialize(OverlayCategory::Vwap, line("vwap", 10.0))
        .expect("vwap");
    registry
        .sync_category(
            OverlayCategory::Bollinger,
            vec![line("bb_upper", 12.0), line("bb_lower", 8.0)],
        )
        .expect("bollinger");

    assert_eq!(registry.dispose_category(OverlayCategory::Bollinger), 2);
    assert_eq!(registry.dispose_category(OverlayCategory::Bollinger), 0);
    assert!(registry.contains(vwap));
    assert_eq!(registry.surface().live_series_count(), 1);
}

#[test]
fn disposal_tolerates_series_released_by_the_surface() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    let handle = registry
        .materialize(OverlayCategory::Sar, line("sar", 10.0))
        .expect("sar");
    let surface_id = registry.get(handle).expect("live").surface_id();
    assert!(registry.surface_mut().release_externally(surface_id));

    assert_eq!(registry.dispose_category(OverlayCategory::Sar), 1);
    assert!(!registry.contains(handle));
    assert_eq!(registry.live_count(), 0);
}

#[test]
fn stale_handles_never_alias_reused_slots() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    let old = registry
        .materialize(OverlayCategory::Sar, line("sar", 10.0))
        .expect("old");
    registry.dispose_category(OverlayCategory::Sar);
    let new = registry
        .materialize(OverlayCategory::Vwap, line("vwap", 10.0))
        .expect("new");

    assert_ne!(old, new);
    assert!(registry.get(old).is_none());
    assert_eq!(registry.get(new).expect("live").key(), "vwap");
}

#[test]
fn dispose_all_runs_once_and_closes_the_registry() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    registry
        .sync_category(OverlayCategory::Pivot, vec![line("pivot", 10.0)])
        .expect("pivot");
    registry
        .materialize(OverlayCategory::Vwap, line("vwap", 10.0))
        .expect("vwap");

    assert_eq!(registry.dispose_all(), 2);
    assert_eq!(registry.dispose_all(), 0);
    assert!(registry.is_closed());
    assert_eq!(registry.surface().live_series_count(), 0);
    assert!(
        registry
            .materialize(OverlayCategory::Vwap, line("vwap", 10.0))
            .is_err()
    );
}

#[test]
fn failed_write_releases_the_surface_series() {
    let mut registry = SeriesRegistry::new(RecordingSurface::new());
    let mut spec = line("vwap", 10.0);
    spec.data = chart_overlay::render::SeriesData::Line(vec![
        SeriesPoint::new(CanonicalTime::from_unix_seconds(10), 1.0),
        SeriesPoint::new(CanonicalTime::from_unix_seconds(5), 1.0),
    ]);

    assert!(registry.materialize(OverlayCategory::Vwap, spec).is_err());
    assert_eq!(registry.live_count(), 0);
    assert_eq!(registry.surface().live_series_count(), 0);
}

#[test]
fn markers_are_skipped_on_surfaces_without_the_capability() {
    let mut registry = SeriesRegistry::new(RecordingSurface::without_markers());
    let marker = chart_overlay::extensions::SeriesMarker::new(
        "m",
        CanonicalTime::from_unix_seconds(1_700_000_000),
        chart_overlay::extensions::MarkerPosition::AboveBar,
        chart_overlay::extensions::MarkerShape::ArrowDown,
        Color::rgb(1.0, 0.0, 0.0),
    );
    let spec = line("carrier", 10.0).with_markers(vec![marker]);

    let sync = registry
        .sync_category(OverlayCategory::Fractals, vec![spec])
        .expect("sync");

    assert_eq!(sync.created, 1);
    assert_eq!(sync.markers, 0);
    assert!(!registry.surface().supports_markers());
    assert_eq!(registry.surface().marker_count(), 0);
}
