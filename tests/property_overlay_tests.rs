use chart_overlay::api::{IndicatorSnapshot, OverlayCategory, OverlayEngine, OverlayEngineConfig};
use chart_overlay::core::{Candle, CandleSeries, CanonicalTime, RawCandle, Viewport, moving_average};
use chart_overlay::render::RecordingSurface;
use proptest::prelude::*;

fn candles_from(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            Candle::new(
                CanonicalTime::from_unix_seconds(1_600_000_000 + i as i64 * 3_600),
                *close,
                *close,
                *close,
                *close,
                0.0,
            )
            .expect("valid candle")
        })
        .collect()
}

proptest! {
    #[test]
    fn normalization_preserves_strict_order(
        start in 946_684_800i64..1_900_000_000,
        gaps in proptest::collection::vec(1i64..86_400 * 7, 1..80)
    ) {
        let mut stamp = start;
        let raw: Vec<RawCandle> = gaps
            .iter()
            .map(|gap| {
                stamp += gap;
                let text = chrono::DateTime::from_timestamp(stamp, 0)
                    .expect("in range")
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string();
                RawCandle::new(text, 10.0, 11.0, 9.0, 10.5, 1.0)
            })
            .collect();

        let series = CandleSeries::normalize(&raw);

        prop_assert_eq!(series.len(), raw.len());
        prop_assert!(series.rejected().is_empty());
        prop_assert!(series.candles().windows(2).all(|pair| pair[0].time < pair[1].time));
    }

    #[test]
    fn moving_average_length_and_window_means(
        closes in proptest::collection::vec(1.0f64..1_000.0, 0..120),
        period in 1usize..40
    ) {
        let candles = candles_from(&closes);
        let points = moving_average(&candles, period);

        let expected_len = (closes.len() + 1).saturating_sub(period);
        prop_assert_eq!(points.len(), expected_len);
        for (k, point) in points.iter().enumerate() {
            let window = &closes[k..k + period];
            let mean = window.iter().sum::<f64>() / period as f64;
            prop_assert!((point.value - mean).abs() <= 1e-9 * mean.abs().max(1.0));
            prop_assert_eq!(point.time, candles[k + period - 1].time);
        }
    }

    #[test]
    fn repeated_pass_keeps_live_handles(
        closes in proptest::collection::vec(50.0f64..150.0, 1..60),
        ma_on in any::<bool>(),
        bands_on in any::<bool>()
    ) {
        let raw: Vec<RawCandle> = closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                RawCandle::new(
                    1_700_000_000 + i as i64 * 86_400,
                    *close,
                    *close + 1.0,
                    *close - 1.0,
                    *close,
                    1.0,
                )
            })
            .collect();
        let snapshot = IndicatorSnapshot::new().with_scalar("bb_middle", 100.0);
        let config = OverlayEngineConfig::new("TEST", Viewport::new(640, 480));
        let mut engine = OverlayEngine::new(RecordingSurface::new(), config).expect("engine init");
        engine.set_data(&raw, snapshot.clone()).expect("first pass");
        if ma_on {
            engine.toggle(OverlayCategory::MovingAverage(5)).expect("ma5");
        }
        if bands_on {
            engine.toggle(OverlayCategory::Bollinger).expect("bands");
        }
        let live_before = engine.live_handle_count();

        let report = engine.set_data(&raw, snapshot).expect("second pass");

        prop_assert!(report.is_noop());
        prop_assert_eq!(engine.live_handle_count(), live_before);
        prop_assert_eq!(engine.surface().live_series_count(), live_before);
    }
}
