use approx::assert_abs_diff_eq;
use approx::assert_relative_eq;
use pop_forecast::features::{build_features, lag_column};
use pop_forecast::models::linear::{self, default_candidates};
use pop_forecast::models::{ModelParams, SkipReason};
use pop_forecast::report::ReportRow;
use pop_forecast::{
    estimate_growth, evaluate_baseline_constant_growth, fit_ar, fit_linear, forecast,
    run_lag_sensitivity, Evaluation, ForecastError, YearlySeries,
};

fn constant_growth(start_year: i32, years: usize, rate: f64) -> YearlySeries {
    YearlySeries::from_pairs(
        (0..years).map(|i| (start_year + i as i32, 1_000_000.0 * (1.0 + rate).powi(i as i32))),
    )
    .unwrap()
}

fn linear_trend(start_year: i32, years: usize) -> YearlySeries {
    YearlySeries::from_pairs(
        (0..years).map(|i| (start_year + i as i32, 5_000_000.0 + 40_000.0 * i as f64)),
    )
    .unwrap()
}

/// Smooth growth with a small cycle so that lagged columns are not collinear
fn wavy_growth(start_year: i32, years: usize) -> YearlySeries {
    YearlySeries::from_pairs((0..years).map(|i| {
        let t = i as f64;
        (
            start_year + i as i32,
            5_000_000.0 + 40_000.0 * t + 300.0 * t * t + 15_000.0 * (t * 0.7).sin(),
        )
    }))
    .unwrap()
}

#[test]
fn test_baseline_recovers_constant_growth() {
    // Ten years of exact 2% growth, test period starts at the eighth year
    let series = constant_growth(1990, 10, 0.02);
    let evaluation = evaluate_baseline_constant_growth(&series, 1997, 1990).unwrap();
    let result = evaluation.scored().unwrap();

    assert_eq!(result.train_size, 7);
    assert_eq!(result.test_size, 3);
    assert_eq!(result.train_rmse, None);
    assert_relative_eq!(result.params.avg_growth().unwrap(), 0.02, epsilon = 1e-12);
    assert_abs_diff_eq!(result.test_rmse, 0.0, epsilon = 1e-3);
    assert!(!result.is_degraded());
}

#[test]
fn test_baseline_growth_window_excludes_test_years() {
    // 1% until 1999, 10% afterwards; the estimate must only see the 1% years
    let mut pairs = Vec::new();
    let mut population = 1_000_000.0;
    for year in 1990..2005 {
        pairs.push((year, population));
        population *= if year < 1999 { 1.01 } else { 1.10 };
    }
    let series = YearlySeries::from_pairs(pairs).unwrap();

    let evaluation = evaluate_baseline_constant_growth(&series, 2000, 1990).unwrap();
    let result = evaluation.scored().unwrap();
    assert_relative_eq!(result.params.avg_growth().unwrap(), 0.01, epsilon = 1e-12);
    assert!(result.test_rmse > 0.0);
}

#[test]
fn test_estimate_growth_window() {
    let mut pairs = Vec::new();
    let mut population = 2_000_000.0;
    for year in 1980..2000 {
        pairs.push((year, population));
        population *= if year < 1989 { 1.01 } else { 1.05 };
    }
    let series = YearlySeries::from_pairs(pairs).unwrap();

    assert_relative_eq!(estimate_growth(&series, None, Some(1989)), 0.01, epsilon = 1e-12);
    assert_relative_eq!(estimate_growth(&series, Some(1989), None), 0.05, epsilon = 1e-12);

    // A single year in the window leaves no growth rate to average
    assert!(estimate_growth(&series, Some(1999), None).is_nan());
    assert!(estimate_growth(&series, Some(2050), None).is_nan());
}

#[test]
fn test_forecast_follows_compound_growth() {
    let series = constant_growth(2000, 4, 0.0);
    let last = *series.last().unwrap();
    let extended = forecast(&series, 0.03, 5).unwrap();

    assert_eq!(extended.len(), 9);
    for h in 1..=5 {
        let record = extended.records()[3 + h];
        assert_eq!(record.year, last.year + h as i32);
        assert_relative_eq!(
            record.population_total,
            last.population_total * 1.03f64.powi(h as i32),
            max_relative = 1e-12
        );
    }
}

#[test]
fn test_nan_growth_yields_degraded_result() {
    let series = constant_growth(1990, 10, 0.02);
    // Growth window starts at the last training year, so there is no rate to average
    let evaluation = evaluate_baseline_constant_growth(&series, 1995, 1994).unwrap();
    let result = evaluation.scored().unwrap();

    assert!(result.params.avg_growth().unwrap().is_nan());
    assert!(result.test_rmse.is_nan());
    assert!(result.is_degraded());
    assert_eq!(ReportRow::from(&evaluation).status, "degraded");
}

#[test]
fn test_ar1_on_linear_trend_fits_exactly() {
    let series = linear_trend(1980, 20);
    let table = build_features(&series, 1).unwrap();
    let evaluation = fit_ar(&table, 1995, 1).unwrap();
    let result = evaluation.scored().unwrap();

    assert_eq!(result.model, "AR(1)");
    assert_abs_diff_eq!(result.train_rmse.unwrap(), 0.0, epsilon = 1e-4);
    assert_abs_diff_eq!(result.test_rmse, 0.0, epsilon = 1e-4);

    match &result.params {
        ModelParams::Autoregressive {
            n_lags,
            coefficients,
            intercept,
            r_squared,
        } => {
            assert_eq!(*n_lags, 1);
            assert_relative_eq!(*r_squared, 1.0, epsilon = 1e-9);
            assert_relative_eq!(coefficients[0], 1.0, epsilon = 1e-9);
            assert_relative_eq!(*intercept, 80_000.0, max_relative = 1e-6);
        }
        other => panic!("unexpected params: {:?}", other),
    }

    // Targets are the year after each test row
    assert_eq!(result.test_predictions.target_years, vec![1996, 1997, 1998, 1999]);
}

#[test]
fn test_ar_missing_lag_column() {
    let series = linear_trend(1980, 20);
    let table = build_features(&series, 2).unwrap();

    match fit_ar(&table, 1995, 3) {
        Err(ForecastError::DataShape(msg)) => {
            assert!(msg.contains(&lag_column(3)));
            assert!(msg.contains("pop_lag_2"));
        }
        other => panic!("expected a data shape error, got {:?}", other),
    }

    assert!(matches!(
        fit_ar(&table, 1995, 0),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_linear_regression_uses_default_features() {
    let series = wavy_growth(1980, 20);
    let table = build_features(&series, 2).unwrap();
    let evaluation = fit_linear(&table, 1995, &default_candidates()).unwrap();
    let result = evaluation.scored().unwrap();

    assert_eq!(result.model, linear::MODEL_NAME);
    assert_eq!(result.train_size, 13);
    assert_eq!(result.test_size, 4);
    assert_eq!(
        result.params.feature_names().unwrap(),
        &["population_total", "growth_rate", "pop_lag_1", "pop_lag_2"]
    );
    assert!(result.train_rmse.unwrap().is_finite());
    assert!(result.test_rmse.is_finite());
    // A smooth trend is mostly explained by its own level
    let r_squared = result.params.r_squared().unwrap();
    assert!(r_squared > 0.9 && r_squared <= 1.0 + 1e-12);
    assert!(result.params.avg_growth().is_none());
    assert!(result.params.n_lags().is_none());
}

#[test]
fn test_linear_selects_available_candidates_only() {
    let series = wavy_growth(1980, 20);
    let table = build_features(&series, 1).unwrap();
    let evaluation = fit_linear(&table, 1995, &default_candidates()).unwrap();

    // pop_lag_2 is not in a one-lag table
    assert_eq!(
        evaluation.scored().unwrap().params.feature_names().unwrap(),
        &["population_total", "growth_rate", "pop_lag_1"]
    );
}

#[test]
fn test_linear_without_features_is_skipped() {
    let series = wavy_growth(1980, 20);
    let table = build_features(&series, 2).unwrap();
    let evaluation = fit_linear(&table, 1995, &["unemployment".to_string()]).unwrap();

    match evaluation {
        Evaluation::Skipped { reason, .. } => assert_eq!(reason, SkipReason::NoFeatures),
        other => panic!("expected a skipped evaluation, got {:?}", other),
    }
}

#[test]
fn test_empty_splits_are_skipped_for_every_model() {
    let series = constant_growth(1990, 10, 0.02);
    let table = build_features(&series, 2).unwrap();

    for test_start_year in [1900, 2100] {
        let evaluations = vec![
            evaluate_baseline_constant_growth(&series, test_start_year, 1990).unwrap(),
            fit_linear(&table, test_start_year, &default_candidates()).unwrap(),
            fit_ar(&table, test_start_year, 2).unwrap(),
        ];

        for evaluation in &evaluations {
            assert!(evaluation.is_skipped(), "{} was scored", evaluation.model());
            assert!(evaluation.train_size() == 0 || evaluation.test_size() == 0);
            let row = ReportRow::from(evaluation);
            assert!(row.test_rmse.is_none());
            assert!(row.status.starts_with("skipped"));
        }
    }
}

#[test]
fn test_lag_sensitivity_sweep() {
    let series = wavy_growth(1960, 40);
    let sweep = run_lag_sensitivity(&series, 1990, 5).unwrap();

    assert_eq!(sweep.len(), 5);
    for (p, evaluation) in (1..=5).zip(sweep.iter()) {
        let result = evaluation.scored().unwrap();
        assert_eq!(result.model, format!("AR({})", p));
        assert_eq!(result.params.n_lags(), Some(p));
        assert_eq!(result.train_size, 30 - p);
        assert_eq!(result.test_size, 9);
        assert!(result.test_rmse.is_finite());
        assert!(result.test_rmse >= 0.0);
    }

    assert!(matches!(
        run_lag_sensitivity(&series, 1990, 0),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_lag_sensitivity_short_series_skips_high_orders() {
    let series = wavy_growth(1990, 8);
    let sweep = run_lag_sensitivity(&series, 1993, 5).unwrap();

    assert_eq!(sweep.len(), 5);
    // AR(5) leaves rows for 1995 and 1996 only, both in the test period
    assert!(sweep[4].is_skipped());
    assert!(sweep[0].scored().is_some());
}

#[test]
fn test_oversized_ar_orders_are_rejected() {
    let series = wavy_growth(1960, 40);
    let table = build_features(&series, 2).unwrap();

    assert!(matches!(
        fit_ar(&table, 1990, usize::MAX),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(matches!(
        run_lag_sensitivity(&series, 1990, usize::MAX),
        Err(ForecastError::InvalidParameter(_))
    ));
}
