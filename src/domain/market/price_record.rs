use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One row of the historical test-prediction dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoricalRecord {
    pub timestamp: NaiveDateTime,
    pub actual_price: f64,
    /// Price produced by an earlier run of the model, never recomputed here.
    pub predicted_price: f64,
}

impl HistoricalRecord {
    pub fn new(timestamp: NaiveDateTime, actual_price: f64, predicted_price: f64) -> Self {
        Self {
            timestamp,
            actual_price,
            predicted_price,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Signed prediction error (`predicted - actual`).
    pub fn error(&self) -> f64 {
        self.predicted_price - self.actual_price
    }
}

/// Immutable, ordered price history.
///
/// Records keep the order they were loaded in. Ascending timestamps are
/// assumed by the lag features but not enforced.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    records: Vec<HistoricalRecord>,
}

impl PriceSeries {
    pub fn new(records: Vec<HistoricalRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoricalRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record (the last one in load order).
    pub fn latest(&self) -> Option<&HistoricalRecord> {
        self.records.last()
    }

    pub fn actual_prices(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.actual_price).collect()
    }

    /// True when every timestamp is strictly greater than the previous one.
    pub fn is_ascending(&self) -> bool {
        self.records
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp)
    }

    /// Earliest and latest calendar dates present in the series.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.timestamp).min()?;
        let max = self.records.iter().map(|r| r.timestamp).max()?;
        Some((min.date(), max.date()))
    }

    /// Date shown first when browsing a single day: the day after the first
    /// date, or the last date if the series spans a single day.
    pub fn default_date(&self) -> Option<NaiveDate> {
        let (first, last) = self.date_bounds()?;
        let next = first.checked_add_days(Days::new(1)).unwrap_or(first);
        Some(next.min(last))
    }

    pub fn on_date(&self, date: NaiveDate) -> Vec<&HistoricalRecord> {
        self.records.iter().filter(|r| r.date() == date).collect()
    }

    /// Records whose date falls within `start..=end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&HistoricalRecord> {
        self.records
            .iter()
            .filter(|r| {
                let date = r.date();
                date >= start && date <= end
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a HistoricalRecord;
    type IntoIter = std::slice::Iter<'a, HistoricalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
