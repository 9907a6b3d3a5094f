//! Defines the data structures describing a discovered GNSS-IR station: its
//! metadata header and the registry record handed to the presentation layer.

use crate::snapshot::CacheKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata header of a station file.
///
/// Keys are normalized when the header is parsed: lower-cased, trimmed, with
/// inner whitespace replaced by `_` (`# Water Body: Rhine` is stored under
/// `water_body`). A `BTreeMap` keeps iteration order stable so that two
/// parses of the same header compare and print identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationMeta {
    fields: BTreeMap<String, String>,
}

impl StationMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, normalizing the key. A repeated key overwrites the
    /// earlier value.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(normalize_key(key), value.into());
    }

    /// Returns the raw value for `key` (the key is normalized first), or `None`
    /// when the field is absent or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(&normalize_key(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn station(&self) -> Option<&str> {
        self.get("station")
    }

    pub fn location(&self) -> Option<&str> {
        self.get("location")
    }

    pub fn water_body(&self) -> Option<&str> {
        self.get("water_body")
    }

    /// Sensor description; older files use a bare `Sensor` field.
    pub fn sensor_type(&self) -> Option<&str> {
        self.get("sensor_type").or_else(|| self.get("sensor"))
    }

    /// Vertical datum; older files use a bare `Datum` field.
    pub fn vertical_datum(&self) -> Option<&str> {
        self.get("vertical_datum").or_else(|| self.get("datum"))
    }

    pub fn units(&self) -> Option<&str> {
        self.get("units")
    }

    pub fn provider(&self) -> Option<&str> {
        self.get("provider")
    }

    /// Link to the raw observations. Providers write `NaN` when they do not
    /// publish raw data, which is reported as absent.
    pub fn raw_data_url(&self) -> Option<&str> {
        self.get("access_raw_data")
            .filter(|v| !v.eq_ignore_ascii_case("nan"))
    }

    pub fn gnss_receiver(&self) -> Option<&str> {
        self.get("gnss_receiver")
    }

    pub fn gnss_antenna(&self) -> Option<&str> {
        self.get("gnss_antenna")
    }
}

/// Normalizes a header key: trimmed, lower-cased, whitespace runs become `_`.
pub(crate) fn normalize_key(key: &str) -> String {
    key.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// A station as known to the [`crate::StationRegistry`].
///
/// Produced once per remote snapshot. Coordinates are optional: a file whose
/// header lacks `Latitude`/`Longitude` (or carries unparsable values) is still
/// registered, just without a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    /// Short identifier, the filename prefix before the first `_` (e.g. `cam4`).
    pub station_id: String,
    /// Remote reference (WebDAV href) used to fetch the file body.
    pub path: String,
    /// Fingerprint of this file's listing entry; changes whenever the file does.
    pub cache_key: CacheKey,
    /// File name as listed remotely (e.g. `cam4_1h.txt`).
    pub file_name: String,
    /// Latitude in decimal degrees, if present and valid.
    pub lat: Option<f64>,
    /// Longitude in decimal degrees, if present and valid.
    pub lon: Option<f64>,
    pub meta: StationMeta,
}

impl StationRecord {
    /// Both coordinates, when the header provided them.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }

    /// Temporal resolution encoded in the filename (`cam4_1h.txt` → `1h`).
    pub fn temporal_resolution(&self) -> Option<&str> {
        let stem = self
            .file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(stem, _)| stem);
        stem.split_once('_')
            .map(|(_, resolution)| resolution)
            .filter(|r| !r.is_empty())
    }
}
