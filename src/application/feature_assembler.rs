use crate::domain::errors::{ForecastError, Result};
use crate::domain::forecast::ForecastConditions;
use crate::domain::market::PriceSeries;
use crate::domain::ml::feature_registry::{
    DAILY_LAG, FEATURE_COUNT, IDX_CLOUD_COVER, IDX_DAY_OF_WEEK, IDX_HOUR, IDX_HUMIDITY, IDX_MONTH,
    IDX_PRECIPITATION, IDX_PRICE_LAG_1, IDX_PRICE_LAG_24, IDX_PRICE_SPREAD, IDX_SUNSHINE,
    IDX_TEMPERATURE, IDX_WIND_SPEED, SHORT_LAG,
};
use crate::domain::ml::{FeatureMode, FeatureVector, PlaceholderFeatures};
use chrono::{Datelike, NaiveDateTime, TimeDelta};
use tracing::debug;

/// Lagged actual prices relative to the forecast point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagFeatures {
    pub lag_1: f64,
    pub lag_24: f64,
}

/// Price `lag` steps before the forecast point, which sits one step after
/// the last element. Short histories fall back to the earliest price.
pub fn lag_value(prices: &[f64], lag: usize) -> Option<f64> {
    let last = prices.len().checked_sub(1)?;
    let idx = prices.len().saturating_sub(lag).min(last);
    prices.get(idx).copied()
}

/// Builds model input from user conditions and the price history.
#[derive(Debug, Clone, Default)]
pub struct FeatureAssembler {
    placeholders: PlaceholderFeatures,
    mode: FeatureMode,
}

impl FeatureAssembler {
    pub fn new(placeholders: PlaceholderFeatures, mode: FeatureMode) -> Self {
        Self { placeholders, mode }
    }

    pub fn placeholders(&self) -> &PlaceholderFeatures {
        &self.placeholders
    }

    pub fn mode(&self) -> FeatureMode {
        self.mode
    }

    pub fn lag_features(&self, series: &PriceSeries) -> Result<LagFeatures> {
        let prices = series.actual_prices();
        let (Some(lag_1), Some(lag_24)) = (lag_value(&prices, SHORT_LAG), lag_value(&prices, DAILY_LAG))
        else {
            return Err(ForecastError::InsufficientHistory);
        };

        if prices.len() < DAILY_LAG {
            debug!(
                "Only {} records of history, forward-filling lag_{} from the earliest price",
                prices.len(),
                DAILY_LAG
            );
        }

        Ok(LagFeatures { lag_1, lag_24 })
    }

    /// Assembles the 12-field vector in [`FEATURE_NAMES`](crate::domain::ml::FEATURE_NAMES) order.
    ///
    /// Fails only when `series` is empty.
    pub fn assemble(
        &self,
        conditions: &ForecastConditions,
        series: &PriceSeries,
    ) -> Result<FeatureVector> {
        let lags = self.lag_features(series)?;
        let (day_of_week, month) = self.calendar_slots(series);
        let p = &self.placeholders;

        let mut values = [0.0; FEATURE_COUNT];
        values[IDX_TEMPERATURE] = conditions.temperature;
        values[IDX_HUMIDITY] = p.humidity;
        values[IDX_WIND_SPEED] = conditions.wind_speed;
        values[IDX_PRECIPITATION] = p.precipitation;
        values[IDX_HOUR] = conditions.hour as f64;
        values[IDX_DAY_OF_WEEK] = day_of_week;
        values[IDX_MONTH] = month;
        values[IDX_PRICE_LAG_1] = lags.lag_1;
        values[IDX_PRICE_LAG_24] = lags.lag_24;
        values[IDX_CLOUD_COVER] = p.cloud_cover;
        values[IDX_SUNSHINE] = p.sunshine;
        values[IDX_PRICE_SPREAD] = p.price_spread;

        let features = FeatureVector::new(values);
        debug!(?features, mode = %self.mode, "Assembled feature vector");
        Ok(features)
    }

    fn calendar_slots(&self, series: &PriceSeries) -> (f64, f64) {
        let observed = (self.placeholders.day_of_week, self.placeholders.month);
        match self.mode {
            FeatureMode::Observed => observed,
            FeatureMode::Calendar => series
                .latest()
                .and_then(|r| forecast_point(r.timestamp))
                .map(|ts| {
                    (
                        ts.weekday().num_days_from_monday() as f64,
                        ts.month() as f64,
                    )
                })
                .unwrap_or(observed),
        }
    }
}

/// The hour after the most recent record.
fn forecast_point(latest: NaiveDateTime) -> Option<NaiveDateTime> {
    latest.checked_add_signed(TimeDelta::hours(1))
}
