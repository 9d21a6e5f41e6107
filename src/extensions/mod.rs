//! Annotations layered on top of the base price series.
//!
//! Markers are the point capability of a surface; patterns are the
//! structural annotations (fractals, strokes, segments, central banks)
//! delivered with an indicator snapshot.

pub mod markers;
pub mod patterns;

pub use markers::{MarkerPosition, MarkerShape, SeriesMarker, sort_markers};
pub use patterns::{
    CentralBank, Direction, Fractal, FractalKind, PatternElement, PatternLine, PatternSet,
    Segment, Stroke,
};
