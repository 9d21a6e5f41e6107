use chart_overlay::ChartError;
use chart_overlay::core::{CanonicalTime, TimeInput, normalize_time};

const JAN_2_2024: i64 = 1_704_153_600;
const JAN_2_2024_0930: i64 = JAN_2_2024 + 9 * 3_600 + 30 * 60;

#[test]
fn date_only_strings_resolve_to_utc_midnight() {
    for raw in ["2024-01-02", "20240102", " 2024-01-02 "] {
        let time = normalize_time(raw).expect("date parses");
        assert_eq!(time, CanonicalTime::from_unix_seconds(JAN_2_2024), "{raw}");
    }
}

#[test]
fn backend_date_time_layouts_share_one_axis() {
    for raw in [
        "2024-01-02 09:30:00",
        "2024-01-02T09:30:00",
        "2024-01-02 09:30",
        "20240102 09:30:00",
        "2024/01/02 09:30:00",
        "2024-01-02T09:30:00Z",
        "2024-01-02T17:30:00+08:00",
    ] {
        let time = normalize_time(raw).expect("date time parses");
        assert_eq!(time.unix_seconds(), JAN_2_2024_0930, "{raw}");
    }
}

#[test]
fn manual_split_fallback_accepts_dotted_dates() {
    let time = normalize_time("2024.01.02").expect("split fallback");
    assert_eq!(time.unix_seconds(), JAN_2_2024);
}

#[test]
fn unparsable_time_is_an_error_not_now() {
    for raw in ["", "   ", "yesterday", "2024-13-40", "2024-01-02-03"] {
        let err = normalize_time(raw).expect_err("must not parse");
        assert!(matches!(err, ChartError::InvalidTime { .. }), "{raw}: {err}");
    }
}

#[test]
fn numeric_inputs_accept_seconds_and_milliseconds() {
    let seconds = TimeInput::from(JAN_2_2024).normalize().expect("seconds");
    let millis = TimeInput::from(JAN_2_2024 * 1_000)
        .normalize()
        .expect("milliseconds");
    let text = TimeInput::from("1704153600").normalize().expect("digits");

    assert_eq!(seconds.unix_seconds(), JAN_2_2024);
    assert_eq!(millis, seconds);
    assert_eq!(text, seconds);
    assert!(TimeInput::Fractional(f64::NAN).normalize().is_err());
}

#[test]
fn wire_time_decodes_from_string_or_number() {
    let from_text: TimeInput = serde_json::from_str("\"2024-01-02\"").expect("text time");
    let from_number: TimeInput = serde_json::from_str("1704153600").expect("numeric time");

    assert_eq!(from_text.normalize().expect("text"), from_number.normalize().expect("number"));
}

#[test]
fn extreme_unix_stamps_do_not_overflow() {
    let min = TimeInput::Unix(i64::MIN).normalize().expect("i64::MIN scales");
    let max = TimeInput::Unix(i64::MAX).normalize().expect("i64::MAX scales");

    assert_eq!(min.unix_seconds(), i64::MIN.div_euclid(1_000));
    assert_eq!(max.unix_seconds(), i64::MAX.div_euclid(1_000));
}

#[test]
fn out_of_range_or_non_finite_floats_are_invalid_times() {
    for value in [-1e30, 1e30, 9.3e18, -9.3e18, f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let err = TimeInput::Fractional(value)
            .normalize()
            .expect_err("must not normalize");
        assert!(matches!(err, ChartError::InvalidTime { .. }), "{value}: {err}");
    }
}

#[test]
fn fractional_stamps_truncate_to_whole_seconds() {
    let seconds = TimeInput::Fractional(JAN_2_2024 as f64 + 0.75)
        .normalize()
        .expect("fractional seconds");
    let millis = TimeInput::Fractional(JAN_2_2024 as f64 * 1_000.0 + 250.0)
        .normalize()
        .expect("fractional milliseconds");

    assert_eq!(seconds.unix_seconds(), JAN_2_2024);
    assert_eq!(millis.unix_seconds(), JAN_2_2024);
}

#[test]
fn huge_digit_strings_are_invalid_times() {
    let err = normalize_time("99999999999999999999999").expect_err("overflowing digits");
    assert!(matches!(err, ChartError::InvalidTime { .. }));
}

#[test]
fn offsets_without_a_colon_keep_the_intraday_time() {
    let first = normalize_time("2024-01-02T04:30:00-0500").expect("offset layout");
    let second = normalize_time("2024-01-02T05:30:00-0500").expect("offset layout");
    let spaced = normalize_time("2024-01-02 17:30:00+0800").expect("spaced offset layout");

    assert_eq!(first.unix_seconds(), JAN_2_2024_0930);
    assert_eq!(second.unix_seconds(), JAN_2_2024_0930 + 3_600);
    assert_eq!(spaced.unix_seconds(), JAN_2_2024_0930);
}
