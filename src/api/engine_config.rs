use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::Theme;

/// What to do when a full-length indicator array and the candles disagree
/// in length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthMismatchPolicy {
    /// Map the common prefix and report the mismatch.
    #[default]
    Truncate,
    /// Drop the whole line and report the mismatch.
    Reject,
}

/// Public engine bootstrap configuration.
///
/// Host chart props (`symbol`, viewport, `theme`) plus the overlay knobs.
/// Serializable so hosts can persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayEngineConfig {
    pub symbol: String,
    pub viewport: Viewport,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_moving_average_periods")]
    pub moving_average_periods: Vec<usize>,
    #[serde(default)]
    pub length_mismatch_policy: LengthMismatchPolicy,
    /// Label fractal markers with `T`/`B`.
    #[serde(default = "default_fractal_marker_text")]
    pub fractal_marker_text: bool,
}

impl OverlayEngineConfig {
    /// Creates a config with the stock moving-average set (5/10/20/50).
    #[must_use]
    pub fn new(symbol: impl Into<String>, viewport: Viewport) -> Self {
        Self {
            symbol: symbol.into(),
            viewport,
            theme: Theme::default(),
            moving_average_periods: default_moving_average_periods(),
            length_mismatch_policy: LengthMismatchPolicy::default(),
            fractal_marker_text: default_fractal_marker_text(),
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_height(mut self, height: u32) -> Self {
        self.viewport.height = height;
        self
    }

    #[must_use]
    pub fn with_moving_average_periods(mut self, periods: Vec<usize>) -> Self {
        self.moving_average_periods = periods;
        self
    }

    #[must_use]
    pub fn with_length_mismatch_policy(mut self, policy: LengthMismatchPolicy) -> Self {
        self.length_mismatch_policy = policy;
        self
    }

    #[must_use]
    pub fn with_fractal_marker_text(mut self, enabled: bool) -> Self {
        self.fractal_marker_text = enabled;
        self
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        if self.symbol.trim().is_empty() {
            return Err(ChartError::InvalidData(
                "symbol must not be empty".to_owned(),
            ));
        }
        for (position, period) in self.moving_average_periods.iter().enumerate() {
            if *period == 0 {
                return Err(ChartError::InvalidData(
                    "moving average period must be > 0".to_owned(),
                ));
            }
            if self.moving_average_periods[..position].contains(period) {
                return Err(ChartError::InvalidData(format!(
                    "moving average period {period} is configured twice"
                )));
            }
        }
        Ok(())
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse engine config json: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize engine config: {e}"))
        })
    }
}

fn default_moving_average_periods() -> Vec<usize> {
    vec![5, 10, 20, 50]
}

fn default_fractal_marker_text() -> bool {
    true
}
