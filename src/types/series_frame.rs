//! Contains the `SeriesFrame` structure for lazy operations on a station's
//! water-level series.

use chrono::{Days, NaiveDate, NaiveTime};
use std::fmt;
use polars::prelude::{col, lit, DataFrame, Expr, LazyFrame, PolarsResult};

/// Name of the timestamp column.
pub const DATETIME_COLUMN: &str = "DateTime";
/// Name of the measurement column.
pub const VALUE_COLUMN: &str = "Value";

/// A wrapper around a Polars `LazyFrame` holding one station's series.
///
/// The frame has two columns: [`DATETIME_COLUMN`] (timezone-naive datetime)
/// and [`VALUE_COLUMN`] (f64). Filters are applied lazily; nothing is
/// computed until [`SeriesFrame::collect`] is called.
///
/// Instances are obtained from [`crate::TimeSeries::to_lazy`] or the
/// [`crate::GnssWater::station_series`] builder.
#[derive(Clone)]
pub struct SeriesFrame {
    /// The underlying Polars LazyFrame.
    pub frame: LazyFrame,
}

impl SeriesFrame {
    pub fn new(frame: LazyFrame) -> Self {
        Self { frame }
    }

    /// Applies an arbitrary Polars predicate, returning a new frame.
    ///
    /// ```no_run
    /// # use gnss_water::{TimeSeries, VALUE_COLUMN};
    /// use polars::prelude::{col, lit};
    ///
    /// # fn run(series: TimeSeries) -> polars::prelude::PolarsResult<()> {
    /// let high_water = series.to_lazy()?.filter(col(VALUE_COLUMN).gt(lit(48.0)));
    /// println!("{}", high_water.collect()?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter(&self, predicate: Expr) -> SeriesFrame {
        SeriesFrame::new(self.frame.clone().filter(predicate))
    }

    /// Keeps samples on or after the start of day `from`.
    pub fn since(&self, from: NaiveDate) -> SeriesFrame {
        self.filter(col(DATETIME_COLUMN).gt_eq(lit(from.and_time(NaiveTime::MIN))))
    }

    /// Keeps samples up to and including the whole day `to`.
    pub fn until(&self, to: NaiveDate) -> SeriesFrame {
        match to.checked_add_days(Days::new(1)) {
            Some(next_day) => {
                self.filter(col(DATETIME_COLUMN).lt(lit(next_day.and_time(NaiveTime::MIN))))
            }
            None => self.clone(),
        }
    }

    /// Keeps samples whose calendar date lies within `from..=to`.
    ///
    /// Both bounds are inclusive whole days. If `from` is after `to` the
    /// bounds are swapped rather than producing an empty frame.
    pub fn get_range(&self, from: NaiveDate, to: NaiveDate) -> SeriesFrame {
        let (from, to) = if from > to { (to, from) } else { (from, to) };
        self.since(from).until(to)
    }

    pub fn collect(&self) -> PolarsResult<DataFrame> {
        self.frame.clone().collect()
    }
}

impl fmt::Debug for SeriesFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesFrame").finish_non_exhaustive()
    }
}
