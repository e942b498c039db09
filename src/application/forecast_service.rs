use crate::application::feature_assembler::FeatureAssembler;
use crate::application::ml::{PriceModel, load_model, load_model_as};
use crate::config::Config;
use crate::domain::errors::Result;
use crate::domain::forecast::{Forecast, ForecastConditions};
use crate::domain::market::PriceSeries;
use crate::domain::ml::FeatureVector;
use crate::infrastructure::dataset_loader::load_dataset;
use tracing::{debug, info};

/// Read-only serving context: the loaded model, the price history and the
/// feature layout, owned together for the lifetime of the process.
///
/// Construct it once at startup and hand a reference (or an `Arc`) to the
/// presentation layer. Nothing is mutated after construction, so it can be
/// shared across threads without locking.
pub struct ForecastContext {
    model: Box<dyn PriceModel>,
    series: PriceSeries,
    assembler: FeatureAssembler,
}

impl ForecastContext {
    pub fn new(model: Box<dyn PriceModel>, series: PriceSeries, assembler: FeatureAssembler) -> Self {
        Self {
            model,
            series,
            assembler,
        }
    }

    /// Loads the model and dataset named in `config`. Both loads are fatal on
    /// failure.
    pub fn load(config: &Config) -> Result<Self> {
        let model = match config.model_format {
            Some(format) => load_model_as(&config.model_path, format)?,
            None => load_model(&config.model_path)?,
        };
        let series = load_dataset(&config.dataset_path)?;
        let assembler = FeatureAssembler::new(config.features.placeholders, config.features.mode);

        info!(
            "Forecast context ready: model={} ({}), records={}, feature_mode={}",
            model.name(),
            model.version(),
            series.len(),
            assembler.mode()
        );
        Ok(Self::new(model, series, assembler))
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn model(&self) -> &dyn PriceModel {
        self.model.as_ref()
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    /// Runs the model on an already assembled vector.
    pub fn predict_features(&self, features: &FeatureVector) -> Result<f64> {
        self.model.predict(features)
    }

    /// Predicts the price for the given conditions against the loaded history.
    pub fn predict(&self, temperature: f64, wind_speed: f64, hour: u32) -> Result<f64> {
        self.forecast(&ForecastConditions::new(temperature, wind_speed, hour))
            .map(|f| f.price)
    }

    /// Like [`predict`](Self::predict), also returning the model input.
    pub fn forecast(&self, conditions: &ForecastConditions) -> Result<Forecast> {
        let features = self.assembler.assemble(conditions, &self.series)?;
        let price = self.predict_features(&features)?;
        debug!(
            temperature = conditions.temperature,
            wind_speed = conditions.wind_speed,
            hour = conditions.hour,
            price,
            "Served forecast"
        );

        Ok(Forecast {
            conditions: *conditions,
            features,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ForecastError;
    use crate::domain::market::HistoricalRecord;
    use crate::infrastructure::mock::MockPriceModel;
    use chrono::{NaiveDate, TimeDelta};

    fn series(prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        PriceSeries::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| HistoricalRecord::new(start + TimeDelta::hours(i as i64), *p, *p))
                .collect(),
        )
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_context_is_shareable() {
        assert_send_sync::<ForecastContext>();
    }

    #[test]
    fn test_predict_combines_assembler_and_model() {
        // weights pick out temperature + lag_1
        let mut weights = [0.0; 12];
        weights[0] = 1.0;
        weights[7] = 1.0;
        let ctx = ForecastContext::new(
            Box::new(MockPriceModel::new(weights, 0.5)),
            series(&[100.0, 110.0]),
            FeatureAssembler::default(),
        );

        let price = ctx.predict(10.0, 5.0, 12).unwrap();
        assert!((price - 120.5).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_returns_inputs() {
        let ctx = ForecastContext::new(
            Box::new(MockPriceModel::constant(42.0)),
            series(&[100.0, 110.0]),
            FeatureAssembler::default(),
        );

        let forecast = ctx.forecast(&ForecastConditions::new(10.0, 5.0, 12)).unwrap();
        assert_eq!(forecast.price, 42.0);
        assert_eq!(forecast.features.get("price_lag_1"), Some(110.0));
        assert_eq!(forecast.features.get("price_lag_24"), Some(100.0));
        assert_eq!(forecast.conditions.hour, 12);
    }

    #[test]
    fn test_empty_history_surfaces_insufficient_history() {
        let ctx = ForecastContext::new(
            Box::new(MockPriceModel::constant(42.0)),
            PriceSeries::default(),
            FeatureAssembler::default(),
        );
        assert!(matches!(
            ctx.predict(10.0, 5.0, 12),
            Err(ForecastError::InsufficientHistory)
        ));
    }

    #[test]
    fn test_model_rejection_propagates() {
        let ctx = ForecastContext::new(
            Box::new(MockPriceModel::rejecting("model expects 10 features, got 12")),
            series(&[1.0]),
            FeatureAssembler::default(),
        );

        match ctx.predict(10.0, 5.0, 12) {
            Err(ForecastError::InferenceError { source, .. }) => {
                assert_eq!(source.to_string(), "model expects 10 features, got 12")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
