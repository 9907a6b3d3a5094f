use crate::config::ConfigError;
use crate::remote::RemoteUnavailable;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GnssWaterError {
    #[error(transparent)]
    Remote(#[from] RemoteUnavailable),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No station with id '{0}' in the current listing")]
    StationNotFound(String),

    #[error("Failed to build series frame")]
    Polars(#[from] PolarsError),
}
