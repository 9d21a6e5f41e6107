use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::CanonicalTime;
use crate::render::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerPosition {
    AboveBar,
    BelowBar,
    InBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerShape {
    ArrowUp,
    ArrowDown,
    Circle,
    Square,
}

/// Point annotation attached to a series at one canonical time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMarker {
    pub id: String,
    pub time: CanonicalTime,
    pub position: MarkerPosition,
    pub shape: MarkerShape,
    pub color: Color,
    /// Price the marker annotates; hosts anchor on the bar, this is informative.
    pub price: Option<f64>,
    pub text: Option<String>,
}

impl SeriesMarker {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        time: CanonicalTime,
        position: MarkerPosition,
        shape: MarkerShape,
        color: Color,
    ) -> Self {
        Self {
            id: id.into(),
            time,
            position,
            shape,
            color,
            price: None,
            text: None,
        }
    }

    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Sorts markers into the order hosts expect for `setMarkers`.
///
/// Order is stable by time, then price, then id, so equal inputs always
/// produce equal marker lists.
pub fn sort_markers(markers: &mut [SeriesMarker]) {
    markers.sort_by(|a, b| {
        a.time
            .cmp(&b.time)
            .then_with(|| a.price.map(OrderedFloat).cmp(&b.price.map(OrderedFloat)))
            .then_with(|| a.id.cmp(&b.id))
    });
}
