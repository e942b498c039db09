use crate::domain::market::HistoricalRecord;
use serde::Serialize;

/// Accuracy of the stored predictions against observed prices
///
/// Errors are `predicted - actual`, in EUR/MWh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionMetrics {
    pub count: usize,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean signed error; positive means the model over-predicts
    pub bias: f64,
}

impl PredictionMetrics {
    /// Returns `None` for an empty slice.
    pub fn from_records<'a, I>(records: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a HistoricalRecord>,
    {
        let mut count = 0usize;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut signed_sum = 0.0;

        for record in records {
            let err = record.error();
            count += 1;
            abs_sum += err.abs();
            sq_sum += err * err;
            signed_sum += err;
        }

        if count == 0 {
            return None;
        }

        let n = count as f64;
        Some(Self {
            count,
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
            bias: signed_sum / n,
        })
    }
}
