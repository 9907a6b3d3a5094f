//! Main entry point: lists the remote folder, keeps the station map and the
//! series cache, and hands out series for the presentation layer.

use crate::cache::series_cache::{SeriesCache, StationSeries};
use crate::config::Config;
use crate::error::GnssWaterError;
use crate::registry::{StationMap, StationRegistry};
use crate::remote::{RemoteStore, RemoteUnavailable, WebDavClient};
use crate::snapshot::{CacheKey, RemoteSnapshot};
use crate::types::series_frame::SeriesFrame;
use crate::types::station::StationRecord;
use bon::bon;
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

/// Client for GNSS-IR water-level stations published on a WebDAV share.
///
/// Owns the remote store, the [`StationRegistry`] and the [`SeriesCache`].
/// Every call is a plain request/response chain; nothing runs in the
/// background.
pub struct GnssWater {
    store: Arc<dyn RemoteStore>,
    config: Config,
    registry: StationRegistry,
    series: SeriesCache,
}

#[bon]
impl GnssWater {
    /// Creates a client talking to the WebDAV share described by `config`.
    ///
    /// Missing credentials are not an error here; listing then degrades to
    /// an empty station map.
    ///
    /// # Errors
    ///
    /// Returns [`GnssWaterError::Remote`] if the HTTP client cannot be built.
    ///
    /// ```no_run
    /// # use gnss_water::{Config, GnssWater, GnssWaterError};
    /// # async fn run() -> Result<(), GnssWaterError> {
    /// let client = GnssWater::new(Config::load()?)?;
    /// let stations = client.load_stations().await;
    /// println!("{} stations", stations.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: Config) -> Result<Self, GnssWaterError> {
        let store = WebDavClient::new(config.clone())?;
        Ok(Self::with_store(Arc::new(store), config))
    }

    /// Creates a client on top of any [`RemoteStore`].
    pub fn with_store(store: Arc<dyn RemoteStore>, config: Config) -> Self {
        Self {
            store,
            registry: StationRegistry::new(config.header_probe_bytes),
            series: SeriesCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lists the remote folder once and fingerprints the result.
    pub async fn snapshot(&self) -> Result<RemoteSnapshot, RemoteUnavailable> {
        let items = self.store.list_remote_txts().await?;
        info!("Remote folder lists {} station files", items.len());
        Ok(RemoteSnapshot::from_items(items))
    }

    /// Current station map.
    ///
    /// Unchanged remote contents are answered from the registry without
    /// probing any file. Series of files no longer listed are dropped from
    /// the cache. If the folder cannot be listed the result is an empty map,
    /// so the caller can show a "no stations" state.
    pub async fn load_stations(&self) -> Arc<StationMap> {
        let snapshot = match self.snapshot().await {
            Ok(snapshot) => {
                self.series
                    .retain_paths(snapshot.items().iter().map(|i| i.href.as_str()))
                    .await;
                snapshot
            }
            Err(e) => {
                warn!("Remote folder unavailable, no stations loaded: {}", e);
                RemoteSnapshot::empty()
            }
        };
        self.registry
            .discover_stations(self.store.as_ref(), &snapshot)
            .await
    }

    /// Full series of the file at `path`, memoized on `(path, cache_key)`.
    /// Unreachable files give an empty series.
    pub async fn get_series_for(&self, path: &str, cache_key: &CacheKey) -> Arc<StationSeries> {
        self.series
            .get_series_for(self.store.as_ref(), path, cache_key)
            .await
    }

    /// Looks up a station and loads its series, optionally limited to a
    /// date range.
    ///
    /// Both bounds are inclusive calendar dates and either may be omitted.
    /// When both are given in reverse order they are swapped; a single bound
    /// outside the series yields an empty frame.
    ///
    /// # Errors
    ///
    /// Returns [`GnssWaterError::StationNotFound`] if `station` is not in the
    /// current map, or [`GnssWaterError::Polars`] if the frame cannot be
    /// built.
    ///
    /// ```no_run
    /// # use gnss_water::{Config, GnssWater, GnssWaterError};
    /// # use chrono::NaiveDate;
    /// # async fn run(client: GnssWater) -> Result<(), GnssWaterError> {
    /// let (record, series, frame) = client
    ///     .station_series()
    ///     .station("cam4")
    ///     .from(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    ///     .call()
    ///     .await?;
    /// println!("{} ({} samples)", record.station_id, series.series.len());
    /// println!("{}", frame.collect()?);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn station_series(
        &self,
        station: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<(StationRecord, Arc<StationSeries>, SeriesFrame), GnssWaterError> {
        let stations = self.load_stations().await;
        let record = stations
            .get(station)
            .cloned()
            .ok_or_else(|| GnssWaterError::StationNotFound(station.to_string()))?;

        let series = self.get_series_for(&record.path, &record.cache_key).await;
        let all = series.to_lazy()?;
        let frame = match (from, to) {
            (Some(from), Some(to)) => all.get_range(from, to),
            (Some(from), None) => all.since(from),
            (None, Some(to)) => all.until(to),
            (None, None) => all,
        };

        Ok((record, series, frame))
    }

    /// Drops the station map and all cached series.
    pub async fn invalidate(&self) {
        self.registry.invalidate().await;
        self.series.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::item_cache_key;
    use crate::testing::{FakeStore, CAM4};
    use polars::prelude::DataType;

    fn client(store: &Arc<FakeStore>) -> GnssWater {
        GnssWater::with_store(store.clone(), Config::default())
    }

    #[tokio::test]
    async fn loads_stations_and_series_end_to_end() {
        let store = Arc::new(FakeStore::new());
        store.put("cam4_1h.txt", CAM4, None);
        store.put("r6gb_15m.txt", "# Station: r6gb\n#\n", None);
        let client = client(&store);

        let stations = client.load_stations().await;
        assert_eq!(stations.len(), 2);
        assert_eq!(stations.located().count(), 1);

        let cam4 = stations.get("cam4").unwrap();
        let series = client.get_series_for(&cam4.path, &cam4.cache_key).await;
        assert_eq!(series.series.len(), 3);

        let frame = series.to_frame().unwrap();
        assert_eq!(frame.height(), 3);
        assert!(matches!(
            frame.column("DateTime").unwrap().dtype(),
            DataType::Datetime(_, None)
        ));
    }

    #[tokio::test]
    async fn unreachable_remote_degrades_to_empty_map() {
        let store = Arc::new(FakeStore::new());
        store.put("cam4_1h.txt", CAM4, None);
        store.set_offline(true);
        let client = client(&store);

        let stations = client.load_stations().await;
        assert!(stations.is_empty());
        assert!(stations.conflicts.is_empty());
    }

    #[tokio::test]
    async fn unchanged_listing_reuses_station_map() {
        let store = Arc::new(FakeStore::new());
        store.put("cam4_1h.txt", CAM4, None);
        let client = client(&store);

        let first = client.load_stations().await;
        let second = client.load_stations().await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.listing_count(), 2);
        assert_eq!(store.head_fetch_count("/solutions/cam4_1h.txt"), 1);
    }

    #[tokio::test]
    async fn removed_file_disappears_from_map() {
        let store = Arc::new(FakeStore::new());
        store.put("cam4_1h.txt", CAM4, None);
        store.put("rpr1_5m.txt", "# Station: rpr1\n#\n", None);
        let client = client(&store);
        assert_eq!(client.load_stations().await.len(), 2);

        store.remove("rpr1_5m.txt");
        let stations = client.load_stations().await;
        assert_eq!(stations.len(), 1);
        assert!(stations.get("rpr1").is_none());
    }

    #[tokio::test]
    async fn removed_file_drops_cached_series() {
        let store = Arc::new(FakeStore::new());
        store.put("cam4_1h.txt", CAM4, None);
        let rpr1 = store.put("rpr1_5m.txt", CAM4, None);
        let client = client(&store);
        client.load_stations().await;
        client
            .get_series_for(&rpr1.href, &item_cache_key(&rpr1))
            .await;
        assert_eq!(client.series.len().await, 1);

        store.remove("rpr1_5m.txt");
        client.load_stations().await;
        assert_eq!(client.series.len().await, 0);

        let cam4 = store.put("cam4_1h.txt", CAM4, None);
        client
            .get_series_for(&cam4.href, &item_cache_key(&cam4))
            .await;
        store.set_offline(true);
        client.load_stations().await;
        assert_eq!(client.series.len().await, 1);
    }

    #[tokio::test]
    async fn station_series_with_range() {
        let store = Arc::new(FakeStore::new());
        store.put("cam4_1h.txt", CAM4, None);
        let client = client(&store);

        let (record, series, frame) = client
            .station_series()
            .station("cam4")
            .from(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap())
            .call()
            .await
            .unwrap();

        assert_eq!(record.station_id, "cam4");
        assert_eq!(series.series.len(), 3);
        assert_eq!(frame.collect().unwrap().height(), 1);

        let (_, _, reversed) = client
            .station_series()
            .station("cam4")
            .from(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap())
            .to(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .call()
            .await
            .unwrap();
        assert_eq!(reversed.collect().unwrap().height(), 3);
        assert_eq!(store.fetch_count("/solutions/cam4_1h.txt"), 1);
    }

    #[tokio::test]
    async fn single_bound_outside_series_is_empty() {
        let store = Arc::new(FakeStore::new());
        store.put("cam4_1h.txt", CAM4, None);
        let client = client(&store);

        let (_, _, after) = client
            .station_series()
            .station("cam4")
            .from(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
            .call()
            .await
            .unwrap();
        assert_eq!(after.collect().unwrap().height(), 0);

        let (_, _, before) = client
            .station_series()
            .station("cam4")
            .to(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
            .call()
            .await
            .unwrap();
        assert_eq!(before.collect().unwrap().height(), 0);

        let (_, _, first_day) = client
            .station_series()
            .station("cam4")
            .to(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
            .call()
            .await
            .unwrap();
        assert_eq!(first_day.collect().unwrap().height(), 2);
    }

    #[tokio::test]
    async fn unknown_station_is_an_error() {
        let store = Arc::new(FakeStore::new());
        let client = client(&store);

        let err = client
            .station_series()
            .station("nope")
            .call()
            .await
            .unwrap_err();
        assert!(matches!(err, GnssWaterError::StationNotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn invalidate_forces_fresh_discovery() {
        let store = Arc::new(FakeStore::new());
        store.put("cam4_1h.txt", CAM4, None);
        let client = client(&store);

        client.load_stations().await;
        client.invalidate().await;
        client.load_stations().await;

        assert_eq!(store.head_fetch_count("/solutions/cam4_1h.txt"), 2);
    }
}
