#[cfg(feature = "parallel-overlays")]
use rayon::prelude::*;

use crate::core::{Candle, SeriesPoint};

/// Simple moving average of `close` over a trailing window of `period` candles.
///
/// The output holds `max(0, n - period + 1)` points; point `k` carries the
/// time of candle `k + period - 1` and the mean of the `period` closes ending
/// there. A zero period or a period longer than the input yields no points.
#[must_use]
pub fn moving_average(candles: &[Candle], period: usize) -> Vec<SeriesPoint> {
    if period == 0 || period > candles.len() {
        return Vec::new();
    }

    #[cfg(feature = "parallel-overlays")]
    {
        candles
            .par_windows(period)
            .map(|window| window_mean(window, period))
            .collect()
    }

    #[cfg(not(feature = "parallel-overlays"))]
    {
        candles
            .windows(period)
            .map(|window| window_mean(window, period))
            .collect()
    }
}

fn window_mean(window: &[Candle], period: usize) -> SeriesPoint {
    let sum: f64 = window.iter().map(|candle| candle.close).sum();
    // windows() never yields an empty slice for period > 0
    let time = window[window.len() - 1].time;
    SeriesPoint::new(time, sum / period as f64)
}
