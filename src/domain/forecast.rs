use crate::domain::ml::FeatureVector;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Slider ranges offered to users of the showcase. The core does not enforce
/// them; presentation layers clamp or reject out-of-range input.
pub const TEMPERATURE_RANGE_C: RangeInclusive<f64> = -10.0..=40.0;
pub const WIND_SPEED_RANGE_MS: RangeInclusive<f64> = 0.0..=20.0;
pub const HOUR_RANGE: RangeInclusive<u32> = 0..=23;

pub const DEFAULT_TEMPERATURE_C: f64 = 10.0;
pub const DEFAULT_WIND_SPEED_MS: f64 = 5.0;
pub const DEFAULT_HOUR: u32 = 12;

/// User-controlled inputs for an ad-hoc forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastConditions {
    pub temperature: f64,
    pub wind_speed: f64,
    pub hour: u32,
}

impl ForecastConditions {
    pub fn new(temperature: f64, wind_speed: f64, hour: u32) -> Self {
        Self {
            temperature,
            wind_speed,
            hour,
        }
    }

    pub fn is_within_slider_bounds(&self) -> bool {
        TEMPERATURE_RANGE_C.contains(&self.temperature)
            && WIND_SPEED_RANGE_MS.contains(&self.wind_speed)
            && HOUR_RANGE.contains(&self.hour)
    }

    /// Pulls each field into its slider range.
    pub fn clamped(&self) -> Self {
        Self {
            temperature: self
                .temperature
                .clamp(*TEMPERATURE_RANGE_C.start(), *TEMPERATURE_RANGE_C.end()),
            wind_speed: self
                .wind_speed
                .clamp(*WIND_SPEED_RANGE_MS.start(), *WIND_SPEED_RANGE_MS.end()),
            hour: self.hour.min(*HOUR_RANGE.end()),
        }
    }
}

impl Default for ForecastConditions {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE_C, DEFAULT_WIND_SPEED_MS, DEFAULT_HOUR)
    }
}

/// A served prediction together with the input that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Forecast {
    pub conditions: ForecastConditions,
    pub features: FeatureVector,
    /// Predicted price in EUR/MWh.
    pub price: f64,
}
