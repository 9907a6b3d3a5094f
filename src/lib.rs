mod cache;
mod config;
mod error;
mod gnss_water;
mod parser;
mod registry;
mod remote;
mod snapshot;
mod types;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use error::GnssWaterError;
pub use gnss_water::*;

pub use cache::{MemoCache, SeriesCache, StationSeries};

pub use parser::{
    parse_header, parse_station, Header, ParseIssue, ParsedStation, RowError, REQUIRED_FIELDS,
};

pub use registry::{
    station_id_from_filename, CollisionRule, StationConflict, StationMap, StationRegistry,
};

pub use remote::store::STATION_FILE_EXTENSION;
pub use remote::{is_station_file, RemoteItem, RemoteStore, RemoteUnavailable, WebDavClient};

pub use snapshot::{
    item_cache_key, remote_snapshot_hash, CacheKey, Fingerprint, RemoteSnapshot,
};

pub use types::series_frame::{SeriesFrame, DATETIME_COLUMN, VALUE_COLUMN};
pub use types::station::{StationMeta, StationRecord};
pub use types::time_series::{Sample, TimeSeries};
