// Forecast accuracy
pub mod metrics;

pub use metrics::PredictionMetrics;
