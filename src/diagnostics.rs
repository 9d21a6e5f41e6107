//! Diagnostic channel for recovered contract violations.
//!
//! Nothing in a render pass aborts on bad input: offending candles, pattern
//! elements or indicator arrays are skipped and reported here, and every
//! entry is also logged through `tracing`.

use serde::{Deserialize, Serialize};

use crate::api::OverlayCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    /// Index outside `0..len(candles)`.
    IndexOutOfRange,
    /// Index in range but its candle was dropped during normalization.
    UnresolvedTime,
    /// Both endpoints resolve to the same or decreasing times.
    DegenerateGeometry,
    /// Empty or inverted index range.
    EmptyRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlayDiagnostic {
    CandleRejected {
        index: usize,
        reason: String,
    },
    PatternRejected {
        category: OverlayCategory,
        position: usize,
        reason: String,
    },
    ElementSkipped {
        category: OverlayCategory,
        position: usize,
        reason: SkipReason,
    },
    LengthMismatch {
        category: OverlayCategory,
        indicator: String,
        expected: usize,
        actual: usize,
    },
    MarkersUnsupported {
        category: OverlayCategory,
    },
    SurfaceFailure {
        category: OverlayCategory,
        key: String,
        message: String,
    },
}

impl OverlayDiagnostic {
    #[must_use]
    pub fn category(&self) -> Option<OverlayCategory> {
        match self {
            Self::CandleRejected { .. } => None,
            Self::PatternRejected { category, .. }
            | Self::ElementSkipped { category, .. }
            | Self::LengthMismatch { category, .. }
            | Self::MarkersUnsupported { category }
            | Self::SurfaceFailure { category, .. } => Some(*category),
        }
    }
}

/// Event that started a recompute pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecomputeTrigger {
    DataChanged,
    VisibilityChanged(OverlayCategory),
    Resized,
}

/// Outcome of one synchronous recompute pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderReport {
    pub trigger: RecomputeTrigger,
    pub created: usize,
    pub disposed: usize,
    /// Categories whose output was identical to the live series and left untouched.
    pub unchanged: usize,
    pub markers: usize,
    pub diagnostics: Vec<OverlayDiagnostic>,
}

impl RenderReport {
    #[must_use]
    pub fn new(trigger: RecomputeTrigger) -> Self {
        Self {
            trigger,
            created: 0,
            disposed: 0,
            unchanged: 0,
            markers: 0,
            diagnostics: Vec::new(),
        }
    }

    /// `true` when the pass neither created nor disposed any series.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.disposed == 0
    }

    pub fn diagnostics_for(
        &self,
        category: OverlayCategory,
    ) -> impl Iterator<Item = &OverlayDiagnostic> + '_ {
        self.diagnostics
            .iter()
            .filter(move |entry| entry.category() == Some(category))
    }
}
