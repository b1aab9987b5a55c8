use pop_forecast::diagnostics::summarize_residuals;
use pop_forecast::report::ReportRow;
use pop_forecast::{compare_series, run_lag_sensitivity, ComparisonConfig, YearlySeries};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Pop Forecast: Synthetic Model Comparison");
    println!("========================================\n");

    // Fifty years of decelerating growth with a mild cycle
    let series = create_sample_series()?;
    println!(
        "Sample series created: {} years ({}-{})\n",
        series.len(),
        series.first().map_or(0, |r| r.year),
        series.last().map_or(0, |r| r.year)
    );

    let config = ComparisonConfig {
        test_start_year: 2005,
        start_year_for_growth: 1985,
        ..ComparisonConfig::default()
    };

    let table = compare_series(&series, &config)?;
    println!("{}", table);

    if let Some(best) = table.best() {
        println!("Lowest test RMSE: {} ({:.0})", best.model, best.test_rmse);
        if let Some(r_squared) = best.params.r_squared() {
            println!("Train R-squared: {:.4}", r_squared);
        }
        println!();
        if let Some(summary) = summarize_residuals(&best.test_predictions) {
            println!("{}", summary);
        }
    }

    println!("Lag sensitivity:");
    for evaluation in run_lag_sensitivity(&series, config.test_start_year, config.max_lag)? {
        let row = ReportRow::from(&evaluation);
        match row.test_rmse {
            Some(rmse) => println!("  {:<6} test RMSE {:>12.0}", row.model, rmse),
            None => println!("  {:<6} {}", row.model, row.status),
        }
    }

    Ok(())
}

fn create_sample_series() -> pop_forecast::Result<YearlySeries> {
    let mut population = 5_500_000.0;
    let mut pairs = Vec::with_capacity(50);

    for i in 0..50 {
        let year = 1970 + i;
        pairs.push((year, population));
        let rate = 0.012 - 0.00012 * i as f64 + 0.002 * (i as f64 * 0.5).sin();
        population *= 1.0 + rate;
    }

    YearlySeries::from_pairs(pairs)
}
