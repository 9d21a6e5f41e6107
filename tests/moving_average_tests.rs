use approx::assert_relative_eq;
use chart_overlay::core::{Candle, CanonicalTime, moving_average};

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            Candle::new(
                CanonicalTime::from_unix_seconds(1_700_000_000 + i as i64 * 86_400),
                *close,
                *close,
                *close,
                *close,
                1_000.0,
            )
            .expect("valid candle")
        })
        .collect()
}

#[test]
fn three_period_average_of_one_to_five() {
    let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let points = moving_average(&candles, 3);

    let values: Vec<f64> = points.iter().map(|point| point.value).collect();
    assert_eq!(values.len(), 3);
    for (value, expected) in values.iter().zip([2.0, 3.0, 4.0]) {
        assert_relative_eq!(*value, expected);
    }
}

#[test]
fn points_carry_the_time_of_the_window_end() {
    let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let points = moving_average(&candles, 3);

    let times: Vec<CanonicalTime> = points.iter().map(|point| point.time).collect();
    let expected: Vec<CanonicalTime> = candles[2..].iter().map(|candle| candle.time).collect();
    assert_eq!(times, expected);
}

#[test]
fn period_longer_than_data_or_zero_yields_nothing() {
    let candles = candles_from_closes(&[1.0, 2.0, 3.0]);
    assert!(moving_average(&candles, 4).is_empty());
    assert!(moving_average(&candles, 0).is_empty());
    assert!(moving_average(&[], 1).is_empty());
}

#[test]
fn period_equal_to_length_yields_one_point() {
    let candles = candles_from_closes(&[2.0, 4.0, 6.0, 8.0]);
    let points = moving_average(&candles, 4);
    assert_eq!(points.len(), 1);
    assert_relative_eq!(points[0].value, 5.0);
}
