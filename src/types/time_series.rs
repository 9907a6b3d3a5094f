//! The in-memory water-level series of one station.

use crate::types::series_frame::{SeriesFrame, DATETIME_COLUMN, VALUE_COLUMN};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// A single observation. The timestamp carries no timezone and is treated as
/// naive local time of the station; the value is in the units declared by the
/// station's `Units` header field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub datetime: NaiveDateTime,
    pub value: f64,
}

/// Samples ordered ascending by timestamp.
///
/// Rows sharing an exact timestamp are all kept, in the order they appeared in
/// the source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Builds a series from samples in any order.
    pub fn from_unsorted(mut samples: Vec<Sample>) -> Self {
        // stable: equal timestamps keep file order
        samples.sort_by_key(|s| s.datetime);
        Self { samples }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Calendar dates of the first and last sample, used as date-picker bounds.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first()?.datetime.date(), self.last()?.datetime.date()))
    }

    /// Samples whose calendar date lies within `from..=to`. Reversed bounds
    /// are swapped.
    pub fn between(&self, from: NaiveDate, to: NaiveDate) -> &[Sample] {
        let (from, to) = if from > to { (to, from) } else { (from, to) };
        let start = self.samples.partition_point(|s| s.datetime.date() < from);
        let end = self.samples.partition_point(|s| s.datetime.date() <= to);
        &self.samples[start..end]
    }

    /// Materializes the series as a polars `DataFrame` with a `DateTime`
    /// (datetime, millisecond precision) and a `Value` (f64) column.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let millis: Vec<i64> = self
            .samples
            .iter()
            .map(|s| s.datetime.and_utc().timestamp_millis())
            .collect();
        let values: Vec<f64> = self.samples.iter().map(|s| s.value).collect();

        let datetime = Series::new(DATETIME_COLUMN.into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        let value = Series::new(VALUE_COLUMN.into(), values);

        DataFrame::new(vec![datetime.into(), value.into()])
    }

    /// Lazy view over [`TimeSeries::to_frame`].
    pub fn to_lazy(&self) -> PolarsResult<SeriesFrame> {
        Ok(SeriesFrame::new(self.to_frame()?.lazy()))
    }
}
