pub mod series_frame;
pub mod station;
pub mod time_series;
