use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChartError, ChartResult};

/// One toggleable group of chart series.
///
/// `Base` is the price/volume pair; it is always materialized and cannot be
/// toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OverlayCategory {
    Base,
    MovingAverage(usize),
    Bollinger,
    Sar,
    Vwap,
    Pivot,
    SuperTrend,
    SupportResistance,
    Fractals,
    Strokes,
    Segments,
    CentralBanks,
}

impl OverlayCategory {
    /// Indicator and pattern categories that do not depend on configuration.
    pub const FIXED: [Self; 10] = [
        Self::Bollinger,
        Self::Sar,
        Self::Vwap,
        Self::Pivot,
        Self::SuperTrend,
        Self::SupportResistance,
        Self::Fractals,
        Self::Strokes,
        Self::Segments,
        Self::CentralBanks,
    ];

    #[must_use]
    pub fn is_pattern(self) -> bool {
        matches!(
            self,
            Self::Fractals | Self::Strokes | Self::Segments | Self::CentralBanks
        )
    }
}

impl fmt::Display for OverlayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::MovingAverage(period) => write!(f, "ma{period}"),
            Self::Bollinger => f.write_str("bollinger"),
            Self::Sar => f.write_str("sar"),
            Self::Vwap => f.write_str("vwap"),
            Self::Pivot => f.write_str("pivot"),
            Self::SuperTrend => f.write_str("supertrend"),
            Self::SupportResistance => f.write_str("support_resistance"),
            Self::Fractals => f.write_str("fractals"),
            Self::Strokes => f.write_str("strokes"),
            Self::Segments => f.write_str("segments"),
            Self::CentralBanks => f.write_str("central_banks"),
        }
    }
}

impl FromStr for OverlayCategory {
    type Err = ChartError;

    /// Accepts the toggle names used by the dashboard (`ma20`, `bollinger`,
    /// `centralBanks`/`central_banks`, ...).
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let category = match input {
            "base" => Self::Base,
            "bollinger" => Self::Bollinger,
            "sar" => Self::Sar,
            "vwap" => Self::Vwap,
            "pivot" => Self::Pivot,
            "supertrend" | "superTrend" => Self::SuperTrend,
            "support_resistance" | "supportResistance" => Self::SupportResistance,
            "fractals" => Self::Fractals,
            "strokes" => Self::Strokes,
            "segments" => Self::Segments,
            "central_banks" | "centralBanks" => Self::CentralBanks,
            other => {
                let period = other
                    .strip_prefix("ma")
                    .and_then(|digits| digits.parse::<usize>().ok())
                    .filter(|period| *period > 0)
                    .ok_or_else(|| {
                        ChartError::InvalidData(format!("unknown overlay category `{other}`"))
                    })?;
                Self::MovingAverage(period)
            }
        };
        Ok(category)
    }
}

/// Per-category visibility flags.
///
/// Every toggleable category starts hidden. Flags change only through
/// explicit toggles and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityState {
    flags: IndexMap<OverlayCategory, bool>,
}

impl VisibilityState {
    /// Creates all-off state for the given moving-average periods plus the
    /// fixed categories.
    #[must_use]
    pub fn new(moving_average_periods: &[usize]) -> Self {
        let flags = moving_average_periods
            .iter()
            .map(|period| OverlayCategory::MovingAverage(*period))
            .chain(OverlayCategory::FIXED)
            .map(|category| (category, false))
            .collect();
        Self { flags }
    }

    #[must_use]
    pub fn is_known(&self, category: OverlayCategory) -> bool {
        category == OverlayCategory::Base || self.flags.contains_key(&category)
    }

    #[must_use]
    pub fn is_visible(&self, category: OverlayCategory) -> bool {
        category == OverlayCategory::Base || self.flags.get(&category).copied().unwrap_or(false)
    }

    /// Flips one category and returns its new state.
    pub fn toggle(&mut self, category: OverlayCategory) -> ChartResult<bool> {
        let flag = self.flag_mut(category)?;
        *flag = !*flag;
        let visible = *flag;
        debug!(%category, visible, "toggled overlay category");
        Ok(visible)
    }

    /// Sets one category; returns `true` when the flag actually changed.
    pub fn set_visible(&mut self, category: OverlayCategory, visible: bool) -> ChartResult<bool> {
        let flag = self.flag_mut(category)?;
        if *flag == visible {
            return Ok(false);
        }
        *flag = visible;
        debug!(%category, visible, "set overlay category visibility");
        Ok(true)
    }

    /// Toggleable categories in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = OverlayCategory> + '_ {
        self.flags.keys().copied()
    }

    pub fn visible_categories(&self) -> impl Iterator<Item = OverlayCategory> + '_ {
        self.flags
            .iter()
            .filter(|(_, visible)| **visible)
            .map(|(category, _)| *category)
    }

    fn flag_mut(&mut self, category: OverlayCategory) -> ChartResult<&mut bool> {
        if category == OverlayCategory::Base {
            return Err(ChartError::InvalidData(
                "base price/volume series cannot be toggled".to_owned(),
            ));
        }
        self.flags.get_mut(&category).ok_or_else(|| {
            ChartError::InvalidData(format!("overlay category `{category}` is not configured"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_round_trip_through_display() {
        for category in OverlayCategory::FIXED
            .into_iter()
            .chain([OverlayCategory::MovingAverage(20)])
        {
            let parsed: OverlayCategory = category.to_string().parse().expect("parse");
            assert_eq!(parsed, category);
        }
        assert_eq!(
            "centralBanks".parse::<OverlayCategory>().expect("camel case"),
            OverlayCategory::CentralBanks
        );
        assert!("ma0".parse::<OverlayCategory>().is_err());
        assert!("macd".parse::<OverlayCategory>().is_err());
    }
}
