use crate::cache::memo::MemoCache;
use crate::parser::{parse_station, ParseIssue, ParsedStation};
use crate::remote::RemoteStore;
use crate::snapshot::CacheKey;
use crate::types::series_frame::SeriesFrame;
use crate::types::station::StationMeta;
use crate::types::time_series::TimeSeries;
use log::{debug, info, warn};
use polars::prelude::{DataFrame, PolarsResult};
use std::collections::HashSet;
use std::sync::Arc;

/// Metadata and full time series of one station file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSeries {
    pub meta: StationMeta,
    pub series: TimeSeries,
    pub issues: Vec<ParseIssue>,
}

impl StationSeries {
    /// Result used when the file could not be fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        self.series.to_frame()
    }

    pub fn to_lazy(&self) -> PolarsResult<SeriesFrame> {
        self.series.to_lazy()
    }
}

impl From<ParsedStation> for StationSeries {
    fn from(parsed: ParsedStation) -> Self {
        Self {
            meta: parsed.meta,
            series: parsed.series,
            issues: parsed.issues,
        }
    }
}

/// Full-file fetch and parse, memoized on `(path, cache_key)`.
///
/// This is the only place that downloads complete station files. A changed
/// `cache_key` means the file changed remotely and forces one new fetch.
/// Unreachable files yield an empty series that is not memoized, so the next
/// call tries again.
pub struct SeriesCache {
    entries: MemoCache<(String, CacheKey), StationSeries>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self {
            entries: MemoCache::new(),
        }
    }

    pub async fn get_series_for(
        &self,
        store: &dyn RemoteStore,
        path: &str,
        cache_key: &CacheKey,
    ) -> Arc<StationSeries> {
        let key = (path.to_string(), cache_key.clone());
        if let Some(cached) = self.entries.get(&key).await {
            debug!("Series cache hit for {}", path);
            return cached;
        }

        let raw = match store.fetch(path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not fetch {}, returning an empty series: {}", path, e);
                return Arc::new(StationSeries::empty());
            }
        };

        let parsed = parse_station(&raw);
        let dropped = parsed.malformed_rows();
        if dropped > 0 {
            warn!("Dropped {} malformed rows from {}", dropped, path);
        }
        info!("Loaded {} samples from {}", parsed.series.len(), path);

        // older versions of the same file can never be requested again
        let stale = self
            .entries
            .invalidate_where(|(p, k)| p == path && k != cache_key)
            .await;
        if stale > 0 {
            debug!("Evicted {} outdated series for {}", stale, path);
        }

        self.entries.insert(key, parsed.into()).await
    }

    /// Drops the series of every path not in `live`.
    pub async fn retain_paths<'a, I>(&self, live: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let live: HashSet<&str> = live.into_iter().collect();
        let removed = self
            .entries
            .invalidate_where(|(p, _)| !live.contains(p.as_str()))
            .await;
        if removed > 0 {
            debug!("Evicted {} series of files no longer listed", removed);
        }
        removed
    }

    /// Drops the entry of one file, whatever its cache key.
    pub async fn invalidate(&self, path: &str) -> usize {
        self.entries.invalidate_where(|(p, _)| p == path).await
    }

    pub async fn clear(&self) {
        self.entries.clear().await;
    }

    pub async fn len(&self) -> usize {
        self.entries.len().await
    }
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new()
    }
}
