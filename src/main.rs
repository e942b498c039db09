//! pricecast - electricity price forecast showcase
//!
//! Command-line front end over the forecast core: browse the tested period,
//! check the accuracy of the stored predictions, and request custom forecasts.
//!
//! # Usage
//! ```sh
//! pricecast predict --temperature 12.5 --wind-speed 3 --hour 18
//! pricecast history --date 2018-10-02
//! pricecast metrics
//! ```
//!
//! # Environment Variables
//! - `MODEL_PATH` - Model artifact (default: xgboost_model.json)
//! - `DATASET_PATH` - Test predictions CSV (default: test_predictions.csv)
//! - `MODEL_FORMAT` - xgboost | smartcore | onnx | auto (default: auto)
//! - `FEATURE_MODE` - observed | calendar (default: observed)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pricecast::application::ForecastContext;
use pricecast::config::{Config, ModelFormat};
use pricecast::domain::forecast::{
    DEFAULT_HOUR, DEFAULT_TEMPERATURE_C, DEFAULT_WIND_SPEED_MS, ForecastConditions, HOUR_RANGE,
    TEMPERATURE_RANGE_C, WIND_SPEED_RANGE_MS,
};
use pricecast::domain::performance::PredictionMetrics;
use pricecast::interfaces::report;
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Electricity price forecast showcase", long_about = None)]
struct Cli {
    /// Model artifact path (overrides MODEL_PATH)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Test predictions CSV path (overrides DATASET_PATH)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Model artifact format (overrides MODEL_FORMAT)
    #[arg(long, global = true)]
    model_format: Option<ModelFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict the price for custom conditions
    Predict {
        /// Temperature in °C (-10 to 40)
        #[arg(long, default_value_t = DEFAULT_TEMPERATURE_C, allow_hyphen_values = true)]
        temperature: f64,

        /// Wind speed in m/s (0 to 20)
        #[arg(long, default_value_t = DEFAULT_WIND_SPEED_MS)]
        wind_speed: f64,

        /// Hour of the day (0 to 23)
        #[arg(long, default_value_t = DEFAULT_HOUR)]
        hour: u32,

        /// Pull out-of-range inputs into the supported ranges instead of failing
        #[arg(long)]
        clamp: bool,

        /// Print the assembled model input
        #[arg(long)]
        show_features: bool,
    },

    /// Show actual vs. predicted prices for one day or the whole tested period
    History {
        /// Day to show (YYYY-MM-DD); defaults to the second day of the dataset
        #[arg(long, conflicts_with = "full")]
        date: Option<NaiveDate>,

        /// Show the full tested period
        #[arg(long)]
        full: bool,
    },

    /// Accuracy of the stored predictions
    Metrics {
        /// Restrict to a single day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays clean for reports
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    if let Some(data) = cli.data {
        config.dataset_path = data;
    }
    if cli.model_format.is_some() {
        config.model_format = cli.model_format;
    }
    info!(
        "pricecast {} starting (model={:?}, data={:?})",
        env!("CARGO_PKG_VERSION"),
        config.model_path,
        config.dataset_path
    );

    let context = ForecastContext::load(&config).context("Failed to load model and dataset")?;

    match cli.command {
        Command::Predict {
            temperature,
            wind_speed,
            hour,
            clamp,
            show_features,
        } => {
            let conditions =
                resolve_conditions(ForecastConditions::new(temperature, wind_speed, hour), clamp)?;
            run_predict(&context, conditions, show_features)
        }
        Command::History { date, full } => run_history(&context, date, full),
        Command::Metrics { date } => run_metrics(&context, date),
    }
}

/// Applies the slider ranges: rejects out-of-range input, or clamps it when
/// asked to. NaN never passes.
fn resolve_conditions(conditions: ForecastConditions, clamp: bool) -> Result<ForecastConditions> {
    let resolved = if clamp { conditions.clamped() } else { conditions };
    if !resolved.is_within_slider_bounds() {
        anyhow::bail!(
            "Conditions {:?} are outside the supported ranges (temperature {:?} °C, wind speed {:?} m/s, hour {:?})",
            conditions,
            TEMPERATURE_RANGE_C,
            WIND_SPEED_RANGE_MS,
            HOUR_RANGE
        );
    }
    if resolved != conditions {
        warn!("Clamped {:?} to {:?}", conditions, resolved);
    }
    Ok(resolved)
}

fn run_predict(context: &ForecastContext, conditions: ForecastConditions, show_features: bool) -> Result<()> {
    let forecast = context
        .forecast(&conditions)
        .context("Prediction failed")?;
    println!("{}", report::forecast_summary(&forecast, show_features));
    Ok(())
}

fn run_history(context: &ForecastContext, date: Option<NaiveDate>, full: bool) -> Result<()> {
    let series = context.series();

    if full {
        println!("Full Test Period: Actual vs. Predicted Prices\n");
        print!("{}", report::price_table(series));
        return Ok(());
    }

    let Some((first, last)) = series.date_bounds() else {
        anyhow::bail!("The dataset has no records");
    };
    let date = date.or_else(|| series.default_date()).unwrap_or(first);

    let rows = series.on_date(date);
    if rows.is_empty() {
        warn!("No data for {}", date);
        println!(
            "No data available for {}. Choose a date between {} and {}.",
            date, first, last
        );
        return Ok(());
    }

    println!("Prices on {}\n", date);
    print!("{}", report::price_table(rows));
    Ok(())
}

fn run_metrics(context: &ForecastContext, date: Option<NaiveDate>) -> Result<()> {
    let series = context.series();
    let metrics = match date {
        Some(d) => PredictionMetrics::from_records(series.on_date(d)),
        None => PredictionMetrics::from_records(series),
    };

    match metrics {
        Some(m) => println!("{}", report::metrics_summary(&m)),
        None => println!("No records to evaluate."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_conditions_pass_through() {
        let c = ForecastConditions::new(-10.0, 20.0, 23);
        assert_eq!(resolve_conditions(c, false).unwrap(), c);
        assert_eq!(resolve_conditions(c, true).unwrap(), c);
    }

    #[test]
    fn test_out_of_range_rejected_without_clamp() {
        assert!(resolve_conditions(ForecastConditions::new(41.0, 5.0, 12), false).is_err());
        assert!(resolve_conditions(ForecastConditions::new(10.0, -0.5, 12), false).is_err());
        assert!(resolve_conditions(ForecastConditions::new(10.0, 5.0, 24), false).is_err());
    }

    #[test]
    fn test_clamp_pulls_into_range() {
        let c = resolve_conditions(ForecastConditions::new(55.0, -3.0, 30), true).unwrap();
        assert_eq!(c, ForecastConditions::new(40.0, 0.0, 23));
    }

    #[test]
    fn test_nan_rejected_even_when_clamping() {
        assert!(resolve_conditions(ForecastConditions::new(f64::NAN, 5.0, 12), true).is_err());
    }

    #[test]
    fn test_cli_parses_predict_flags() {
        let cli = Cli::try_parse_from([
            "pricecast",
            "predict",
            "--temperature",
            "-5",
            "--hour",
            "30",
            "--clamp",
        ])
        .unwrap();
        match cli.command {
            Command::Predict {
                temperature,
                hour,
                clamp,
                ..
            } => {
                assert_eq!(temperature, -5.0);
                assert_eq!(hour, 30);
                assert!(clamp);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
