use chart_overlay::api::{IndicatorSnapshot, OverlayCategory, OverlayEngine, OverlayEngineConfig};
use chart_overlay::core::{Candle, CanonicalTime, RawCandle, Viewport, moving_average};
use chart_overlay::render::RecordingSurface;
use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;

fn generated_bars(count: usize) -> Vec<(i64, f64, f64, f64, f64)> {
    (0..count)
        .map(|i| {
            let t = 1_500_000_000 + i as i64 * 60;
            let base = 100.0 + i as f64 * 0.05;
            let open = base;
            let close = if i % 2 == 0 { base + 1.0 } else { base - 1.0 };
            let low = open.min(close) - 0.75;
            let high = open.max(close) + 0.75;
            (t, open, high, low, close)
        })
        .collect()
}

fn bench_moving_average_10k(c: &mut Criterion) {
    let candles: Vec<Candle> = generated_bars(10_000)
        .into_iter()
        .map(|(t, open, high, low, close)| {
            Candle::new(CanonicalTime::from_unix_seconds(t), open, high, low, close, 10.0)
                .expect("valid generated candle")
        })
        .collect();

    c.bench_function("moving_average_10k_period_20", |b| {
        b.iter(|| {
            let points = moving_average(black_box(&candles), black_box(20));
            black_box(points);
        })
    });
}

fn bench_full_overlay_pass_5k(c: &mut Criterion) {
    let raw: Vec<RawCandle> = generated_bars(5_000)
        .into_iter()
        .map(|(t, open, high, low, close)| RawCandle::new(t, open, high, low, close, 10.0))
        .collect();
    let snapshot = IndicatorSnapshot::new()
        .with_series("bb_upper", vec![110.0; 5_000])
        .with_scalar("bb_middle", 100.0)
        .with_scalar("bb_lower", 90.0)
        .with_scalar("vwap", 101.0)
        .with_raw(
            "fractals",
            json!({
                "top_fractals": (0..200).map(|i| json!({"index": i * 20 + 5, "price": 120.0})).collect::<Vec<_>>(),
                "bottom_fractals": (0..200).map(|i| json!({"index": i * 20 + 15, "price": 80.0})).collect::<Vec<_>>()
            }),
        );

    c.bench_function("full_overlay_pass_5k", |b| {
        b.iter(|| {
            let config = OverlayEngineConfig::new("BENCH", Viewport::new(1920, 1080));
            let mut engine =
                OverlayEngine::new(RecordingSurface::new(), config).expect("engine init");
            for category in [
                OverlayCategory::MovingAverage(20),
                OverlayCategory::MovingAverage(50),
                OverlayCategory::Bollinger,
                OverlayCategory::Vwap,
                OverlayCategory::Fractals,
            ] {
                engine.set_visible(category, true).expect("show category");
            }
            let report = engine
                .set_data(black_box(&raw), snapshot.clone())
                .expect("full pass");
            black_box(report);
        })
    });
}

criterion_group!(benches, bench_moving_average_10k, bench_full_overlay_pass_5k);
criterion_main!(benches);
