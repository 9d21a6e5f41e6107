use serde::{Deserialize, Serialize};

use crate::core::CanonicalTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One value of a line overlay, aligned on the canonical time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: CanonicalTime,
    pub value: f64,
}

impl SeriesPoint {
    #[must_use]
    pub fn new(time: CanonicalTime, value: f64) -> Self {
        Self { time, value }
    }
}
