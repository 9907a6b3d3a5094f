pub mod memo;
pub mod series_cache;

pub use memo::MemoCache;
pub use series_cache::{SeriesCache, StationSeries};
