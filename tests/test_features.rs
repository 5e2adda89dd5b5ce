use std::f64::consts::PI;
use std::fs;

use assert_approx_eq::assert_approx_eq;
use chrono::NaiveDate;
use demand_forecast::{synthetic, FeatureBuilder, FeatureConfig, ForecastError, Observation};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample(days: u64) -> Vec<Observation> {
    let start = date(2023, 1, 1);
    let end = start + chrono::Days::new(days - 1);
    synthetic::generate(start, end, 42).unwrap()
}

#[test]
fn test_default_column_order() {
    let frame = FeatureBuilder::default().build(&sample(100)).unwrap();

    assert_eq!(
        frame.dataframe().get_column_names(),
        vec![
            "date",
            "demand",
            "avg_price",
            "promotion",
            "holiday",
            "temperature",
            "year",
            "month",
            "day_of_year",
            "week_of_year",
            "quarter",
            "is_weekend",
            "month_sin",
            "month_cos",
            "day_of_year_sin",
            "day_of_year_cos",
            "demand_lag_1",
            "demand_lag_7",
            "demand_lag_30",
            "demand_mean_7",
            "demand_mean_30",
        ]
    );
}

#[test]
fn test_warmup_rows_are_dropped() {
    let observations = sample(100);
    let frame = FeatureBuilder::default().build(&observations).unwrap();

    assert_eq!(frame.len(), 70);
    assert_eq!(frame.dates().unwrap()[0], observations[30].date);
    assert_eq!(frame.feature_columns().len(), 19);
    assert!(!frame.feature_columns().iter().any(|c| c == "date" || c == "demand"));
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(30)]
fn test_lag_columns_shift_demand(#[case] lag: usize) {
    let observations = sample(100);
    let frame = FeatureBuilder::default().build(&observations).unwrap();

    let lagged = frame.column_as_f64(&format!("demand_lag_{lag}")).unwrap();
    for (row, value) in lagged.iter().enumerate() {
        assert_eq!(*value, observations[30 + row - lag].demand);
    }
}

#[rstest]
#[case(7)]
#[case(30)]
fn test_rolling_means_are_trailing_and_inclusive(#[case] window: usize) {
    let observations = sample(100);
    let frame = FeatureBuilder::default().build(&observations).unwrap();

    let means = frame.column_as_f64(&format!("demand_mean_{window}")).unwrap();
    for (row, value) in means.iter().enumerate() {
        let end = 30 + row;
        let expected: f64 = observations[end + 1 - window..=end]
            .iter()
            .map(|r| r.demand)
            .sum::<f64>()
            / window as f64;
        assert_approx_eq!(*value, expected, 1e-9);
    }
}

#[test]
fn test_calendar_features_for_a_known_date() {
    // 2023-02-05 is a Sunday in ISO week 5, day 36 of the year
    let observations = sample(90);
    let frame = FeatureBuilder::default().build(&observations).unwrap();

    let row = frame
        .dates()
        .unwrap()
        .iter()
        .position(|d| *d == date(2023, 2, 5))
        .unwrap();

    assert_eq!(frame.column_as_f64("year").unwrap()[row], 2023.0);
    assert_eq!(frame.column_as_f64("month").unwrap()[row], 2.0);
    assert_eq!(frame.column_as_f64("day_of_year").unwrap()[row], 36.0);
    assert_eq!(frame.column_as_f64("week_of_year").unwrap()[row], 5.0);
    assert_eq!(frame.column_as_f64("quarter").unwrap()[row], 1.0);
    assert_eq!(frame.column_as_f64("is_weekend").unwrap()[row], 1.0);

    assert_approx_eq!(
        frame.column_as_f64("month_sin").unwrap()[row],
        (2.0 * PI * 2.0 / 12.0).sin(),
        1e-12
    );
    assert_approx_eq!(
        frame.column_as_f64("month_cos").unwrap()[row],
        0.5,
        1e-12
    );
    assert_approx_eq!(
        frame.column_as_f64("day_of_year_sin").unwrap()[row],
        (2.0 * PI * 36.0 / 365.0).sin(),
        1e-12
    );
}

#[test]
fn test_cyclic_encodings_stay_bounded() {
    let frame = FeatureBuilder::default().build(&sample(400)).unwrap();

    for name in ["month_sin", "month_cos", "day_of_year_sin", "day_of_year_cos"] {
        let values = frame.column_as_f64(name).unwrap();
        assert!(
            values.iter().all(|v| (-1.0..=1.0).contains(v)),
            "{name} out of bounds"
        );
    }
}

#[test]
fn test_weekend_flag_only_on_weekends() {
    let observations = sample(100);
    let frame = FeatureBuilder::default().build(&observations).unwrap();

    let weekend = frame.column_as_f64("is_weekend").unwrap();
    for (day, flag) in frame.dates().unwrap().iter().zip(weekend.iter()) {
        let expected = matches!(
            day.format("%a").to_string().as_str(),
            "Sat" | "Sun"
        );
        assert_eq!(*flag == 1.0, expected, "mismatch on {day}");
    }
}

#[test]
fn test_unsorted_input_is_rejected() {
    let mut observations = sample(60);
    observations.swap(10, 20);

    let result = FeatureBuilder::default().build(&observations);
    assert!(matches!(result, Err(ForecastError::DataFormat(_))));
}

#[test]
fn test_exactly_warmup_rows_is_insufficient() {
    let result = FeatureBuilder::default().build(&sample(30));
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));

    // One more observation yields exactly one feature row
    let frame = FeatureBuilder::default().build(&sample(31)).unwrap();
    assert_eq!(frame.len(), 1);
}

#[test]
fn test_custom_lags_and_windows() {
    let config = FeatureConfig {
        lags: vec![1, 2],
        rolling_windows: vec![3],
    };
    let observations = sample(20);
    let frame = FeatureBuilder::new(config).build(&observations).unwrap();

    // warmup = max(lag 2, window 3 - 1) = 2
    assert_eq!(frame.len(), 18);
    assert!(frame.has_column("demand_lag_2"));
    assert!(frame.has_column("demand_mean_3"));
    assert!(!frame.has_column("demand_lag_30"));
}

#[test]
fn test_no_history_features_keeps_every_row() {
    let config = FeatureConfig {
        lags: vec![],
        rolling_windows: vec![],
    };
    let observations = sample(15);
    let frame = FeatureBuilder::new(config).build(&observations).unwrap();

    assert_eq!(frame.len(), 15);
    assert_eq!(frame.feature_columns().len(), 14);
}

#[test]
fn test_zero_lag_is_rejected() {
    let config = FeatureConfig {
        lags: vec![0, 1],
        rolling_windows: vec![7],
    };
    let result = FeatureBuilder::new(config).build(&sample(40));
    assert!(matches!(result, Err(ForecastError::DataFormat(_))));
}

#[test]
fn test_repeated_lags_or_windows_are_rejected() {
    // A repeated offset would produce two columns with the same name
    let config = FeatureConfig {
        lags: vec![1, 7, 7],
        rolling_windows: vec![7],
    };
    let result = FeatureBuilder::new(config).build(&sample(40));
    assert!(matches!(result, Err(ForecastError::DataFormat(_))));

    let config = FeatureConfig {
        lags: vec![1],
        rolling_windows: vec![7, 30, 7],
    };
    let result = FeatureBuilder::new(config).build(&sample(40));
    assert!(matches!(result, Err(ForecastError::DataFormat(_))));
}

#[test]
fn test_write_csv_exports_every_row() {
    let observations = sample(45);
    let frame = FeatureBuilder::default().build(&observations).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("processed").join("features.csv");
    frame.write_csv(&path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("date,demand,avg_price"));
    assert_eq!(lines.clone().count(), frame.len());

    // Dates export in ISO form, starting after the warmup window
    let first = lines.next().unwrap();
    assert!(first.starts_with(&observations[30].date.to_string()));
}

#[test]
fn test_slice_preserves_schema() {
    let frame = FeatureBuilder::default().build(&sample(60)).unwrap();
    let tail = frame.slice(20, None);

    assert_eq!(tail.len(), frame.len() - 20);
    assert_eq!(tail.feature_columns(), frame.feature_columns());
    assert_eq!(tail.dates().unwrap()[0], frame.dates().unwrap()[20]);
}
