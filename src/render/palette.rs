use serde::{Deserialize, Serialize};

use crate::extensions::{Direction, FractalKind};
use crate::render::Color;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Overlay colors for one theme.
///
/// Up/top annotations share the bullish color, down/bottom the bearish one,
/// so a given pattern always renders in the same palette.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPalette {
    pub bullish: Color,
    pub bearish: Color,
    pub volume_alpha: f64,
    pub moving_averages: [Color; 4],
    pub band: Color,
    pub band_middle: Color,
    pub sar: Color,
    pub vwap: Color,
    pub pivot: Color,
    pub resistance: Color,
    pub support: Color,
    pub supertrend: Color,
    pub central_bank: Color,
    pub segment_up: Color,
    pub segment_down: Color,
}

impl OverlayPalette {
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                bullish: Color::from_rgb8(0x26, 0xa6, 0x9a),
                bearish: Color::from_rgb8(0xef, 0x53, 0x50),
                volume_alpha: 0.5,
                moving_averages: [
                    Color::from_rgb8(0x21, 0x96, 0xf3),
                    Color::from_rgb8(0xff, 0x98, 0x00),
                    Color::from_rgb8(0x9c, 0x27, 0xb0),
                    Color::from_rgb8(0x4c, 0xaf, 0x50),
                ],
                band: Color::from_rgb8(0x78, 0x90, 0x9c),
                band_middle: Color::from_rgb8(0x60, 0x7d, 0x8b),
                sar: Color::from_rgb8(0xff, 0x57, 0x22),
                vwap: Color::from_rgb8(0xff, 0xc1, 0x07),
                pivot: Color::from_rgb8(0x79, 0x55, 0x48),
                resistance: Color::from_rgb8(0xe5, 0x39, 0x35),
                support: Color::from_rgb8(0x43, 0xa0, 0x47),
                supertrend: Color::from_rgb8(0x00, 0x96, 0x88),
                central_bank: Color::from_rgb8(0x67, 0x3a, 0xb7),
                segment_up: Color::from_rgb8(0x00, 0x79, 0x6b),
                segment_down: Color::from_rgb8(0xc6, 0x28, 0x28),
            },
            Theme::Dark => Self {
                bullish: Color::from_rgb8(0x4d, 0xb6, 0xac),
                bearish: Color::from_rgb8(0xff, 0x70, 0x70),
                volume_alpha: 0.4,
                moving_averages: [
                    Color::from_rgb8(0x64, 0xb5, 0xf6),
                    Color::from_rgb8(0xff, 0xb7, 0x4d),
                    Color::from_rgb8(0xba, 0x68, 0xc8),
                    Color::from_rgb8(0x81, 0xc7, 0x84),
                ],
                band: Color::from_rgb8(0x90, 0xa4, 0xae),
                band_middle: Color::from_rgb8(0xb0, 0xbe, 0xc5),
                sar: Color::from_rgb8(0xff, 0x8a, 0x65),
                vwap: Color::from_rgb8(0xff, 0xd5, 0x4f),
                pivot: Color::from_rgb8(0xa1, 0x88, 0x7f),
                resistance: Color::from_rgb8(0xef, 0x9a, 0x9a),
                support: Color::from_rgb8(0xa5, 0xd6, 0xa7),
                supertrend: Color::from_rgb8(0x4d, 0xd0, 0xe1),
                central_bank: Color::from_rgb8(0xb3, 0x9d, 0xdb),
                segment_up: Color::from_rgb8(0x80, 0xcb, 0xc4),
                segment_down: Color::from_rgb8(0xef, 0x9a, 0x9a),
            },
        }
    }

    /// Color of the moving average with `period`.
    ///
    /// The four stock periods keep fixed slots; other periods cycle through
    /// the same slots by value.
    #[must_use]
    pub fn moving_average(&self, period: usize) -> Color {
        let slot = match period {
            5 => 0,
            10 => 1,
            20 => 2,
            50 => 3,
            other => other % self.moving_averages.len(),
        };
        self.moving_averages[slot]
    }

    #[must_use]
    pub fn direction(&self, direction: Direction) -> Color {
        match direction {
            Direction::Up => self.bullish,
            Direction::Down => self.bearish,
        }
    }

    #[must_use]
    pub fn segment(&self, direction: Direction) -> Color {
        match direction {
            Direction::Up => self.segment_up,
            Direction::Down => self.segment_down,
        }
    }

    /// Tops mark potential reversals down, bottoms reversals up.
    #[must_use]
    pub fn fractal(&self, kind: FractalKind) -> Color {
        match kind {
            FractalKind::Top => self.bearish,
            FractalKind::Bottom => self.bullish,
        }
    }

    #[must_use]
    pub fn volume(&self, bullish: bool) -> Color {
        let base = if bullish { self.bullish } else { self.bearish };
        base.with_alpha(self.volume_alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_periods_get_distinct_colors() {
        let palette = OverlayPalette::for_theme(Theme::Light);
        let colors = [5, 10, 20, 50].map(|period| palette.moving_average(period));
        for i in 0..colors.len() {
            for j in (i + 1)..colors.len() {
                assert_ne!(colors[i], colors[j]);
            }
        }
    }
}
