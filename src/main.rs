//! # popgrowth
//!
//! Command-line entry point: loads a yearly population series, compares the
//! forecasting models and writes the result tables.

use anyhow::{bail, Context, Result};
use clap::Parser;
use pop_forecast::pipeline::{run_best_effort, standard_tasks};
use pop_forecast::report::save_comparison;
use pop_forecast::{compare_series, ComparisonConfig, CsvSeriesProvider, SeriesProvider};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "popgrowth")]
#[command(about = "Compare yearly population forecasting models", long_about = None)]
struct Cli {
    /// Input CSV with one row per year (or per year and breakdown)
    #[arg(short, long)]
    data: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First year of the test period
    #[arg(long)]
    test_start_year: Option<i32>,

    /// Lag order of the feature table and the AR model
    #[arg(long)]
    n_lags: Option<usize>,

    /// First year of the baseline growth window
    #[arg(long)]
    start_year_for_growth: Option<i32>,

    /// Directory receiving the tables/ output
    #[arg(short, long, default_value = "results")]
    output_dir: PathBuf,

    /// Name of the year column
    #[arg(long, default_value = "year")]
    year_column: String,

    /// Name of the population column
    #[arg(long, default_value = "population_total")]
    value_column: String,

    /// Keep only rows where COLUMN equals VALUE; may be repeated
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    filters: Vec<String>,
}

impl Cli {
    fn comparison_config(&self) -> Result<ComparisonConfig> {
        let mut config = match &self.config {
            Some(path) => ComparisonConfig::from_json_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => ComparisonConfig::default(),
        };

        if let Some(year) = self.test_start_year {
            config.test_start_year = year;
        }
        if let Some(n_lags) = self.n_lags {
            config.n_lags = n_lags;
        }
        if let Some(year) = self.start_year_for_growth {
            config.start_year_for_growth = year;
        }

        config.validate()?;
        Ok(config)
    }

    fn provider(&self) -> Result<CsvSeriesProvider> {
        let mut provider = CsvSeriesProvider::new(&self.data)
            .with_columns(&self.year_column, &self.value_column);

        for filter in &self.filters {
            let Some((column, value)) = filter.split_once('=') else {
                bail!("filter '{}' must have the form COLUMN=VALUE", filter);
            };
            provider = provider.with_filter(column.trim(), value.trim());
        }

        Ok(provider)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "popgrowth=info,pop_forecast=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.comparison_config()?;
    let provider = cli.provider()?;

    let series = provider
        .load()
        .with_context(|| format!("loading {}", cli.data.display()))?;
    info!(
        years = series.len(),
        test_start_year = config.test_start_year,
        n_lags = config.n_lags,
        "starting model comparison"
    );

    let table = compare_series(&series, &config)?;
    println!("{}", table);

    let tables_dir = cli.output_dir.join("tables");
    let comparison_path = tables_dir.join("model_comparison.csv");
    save_comparison(&comparison_path, &table)
        .with_context(|| format!("writing {}", comparison_path.display()))?;
    info!(path = %comparison_path.display(), "saved comparison table");

    let reports = run_best_effort(standard_tasks(&series, &config, &table, &tables_dir));
    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    if failed > 0 {
        warn!(failed, total = reports.len(), "some post-processing tasks were skipped");
    }
    println!(
        "Wrote tables to {} ({} of {} follow-up tasks completed)",
        tables_dir.display(),
        reports.len() - failed,
        reports.len()
    );

    Ok(())
}
