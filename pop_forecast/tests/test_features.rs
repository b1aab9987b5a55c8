use pop_forecast::features::{build_features, lag_column, MAX_LAG_ORDER};
use pop_forecast::{ForecastError, YearlySeries};
use rstest::rstest;

fn series(years: usize) -> YearlySeries {
    YearlySeries::from_pairs((0..years).map(|i| (1990 + i as i32, 1_000.0 + 25.0 * i as f64)))
        .unwrap()
}

#[rstest]
#[case(10, 1, 8)]
#[case(10, 2, 7)]
#[case(10, 3, 6)]
#[case(5, 4, 0)]
#[case(3, 5, 0)]
fn test_row_count(#[case] years: usize, #[case] n_lags: usize, #[case] expected: usize) {
    let table = build_features(&series(years), n_lags).unwrap();
    assert_eq!(table.len(), expected);
    assert_eq!(table.n_lags(), n_lags);
}

#[test]
fn test_rows_have_no_missing_values() {
    let table = build_features(&series(12), 3).unwrap();

    for row in table.rows() {
        assert!(row.population_total.is_finite());
        assert!(row.growth_rate.is_finite());
        assert!(row.target_pop_next.is_finite());
        for k in 1..=3 {
            assert!(row.lag(k).unwrap().is_finite());
        }
    }
}

#[test]
fn test_lags_and_target_line_up_with_years() {
    let source = series(8);
    let table = build_features(&source, 2).unwrap();

    assert_eq!(table.years(), vec![1992, 1993, 1994, 1995, 1996]);

    let first = &table.rows()[0];
    assert_eq!(first.population_total, 1_050.0);
    assert_eq!(first.lag(1), Some(1_025.0));
    assert_eq!(first.lag(2), Some(1_000.0));
    assert_eq!(first.target_pop_next, 1_075.0);
    assert!((first.growth_rate - (1_050.0 / 1_025.0 - 1.0)).abs() < 1e-15);
}

#[test]
fn test_column_access() {
    let table = build_features(&series(6), 2).unwrap();

    assert!(table.has_column("population_total"));
    assert!(table.has_column("growth_rate"));
    assert!(table.has_column(&lag_column(2)));
    assert!(!table.has_column(&lag_column(3)));
    assert!(!table.has_column("pop_lag_02"));
    let lag_1: Vec<Option<f64>> = table.rows().iter().map(|r| r.value("pop_lag_1")).collect();
    assert_eq!(lag_1, vec![Some(1_025.0), Some(1_050.0), Some(1_075.0)]);
}

#[test]
fn test_oversized_lag_order_rejected() {
    let result = build_features(&series(30), usize::MAX);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));

    // The largest accepted order on a short series gives an empty table
    let table = build_features(&series(30), MAX_LAG_ORDER).unwrap();
    assert!(table.is_empty());
}

#[test]
fn test_zero_lags_rejected() {
    let result = build_features(&series(6), 0);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}
