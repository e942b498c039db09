//! Plain-text rendering of history tables, metrics and forecasts for the CLI.

use crate::domain::forecast::Forecast;
use crate::domain::market::HistoricalRecord;
use crate::domain::performance::PredictionMetrics;
use std::fmt::Write;

pub const PRICE_UNIT: &str = "EUR/MWh";

/// Renders `timestamp | actual | predicted` rows.
pub fn price_table<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a HistoricalRecord>,
{
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:>14} {:>16}",
        "timestamp", "actual_price", "predicted_price"
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:<20} {:>14.2} {:>16.2}",
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.actual_price,
            r.predicted_price
        );
    }
    out
}

pub fn metrics_summary(metrics: &PredictionMetrics) -> String {
    format!(
        "Records: {}\nMean Absolute Error (MAE): {:.2} {unit}\nRoot Mean Squared Error (RMSE): {:.2} {unit}\nMean bias: {:+.2} {unit}",
        metrics.count,
        metrics.mae,
        metrics.rmse,
        metrics.bias,
        unit = PRICE_UNIT
    )
}

pub fn forecast_summary(forecast: &Forecast, show_features: bool) -> String {
    let mut out = format!(
        "Predicted Electricity Price: {:.2} {}",
        forecast.price, PRICE_UNIT
    );
    if show_features {
        out.push_str("\n\nModel input:");
        for (name, value) in forecast.features.named() {
            let _ = write!(out, "\n  {:<14} {}", name, value);
        }
    }
    out
}
