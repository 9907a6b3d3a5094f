//! Station discovery, memoized on the remote snapshot fingerprint.

pub mod conflict;

pub use conflict::{station_id_from_filename, CollisionRule, StationConflict};

use crate::cache::memo::MemoCache;
use crate::parser::{parse_header, Header};
use crate::remote::{RemoteItem, RemoteStore};
use crate::snapshot::{item_cache_key, CacheKey, Fingerprint, RemoteSnapshot};
use crate::types::station::StationRecord;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Result of one discovery run.
#[derive(Debug, Clone, PartialEq)]
pub struct StationMap {
    /// Fingerprint of the snapshot this map was built from.
    pub fingerprint: Fingerprint,
    pub stations: BTreeMap<String, StationRecord>,
    /// Files that lost a station id collision.
    pub conflicts: Vec<StationConflict>,
}

impl StationMap {
    pub fn empty(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            stations: BTreeMap::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn get(&self, station_id: &str) -> Option<&StationRecord> {
        self.stations.get(station_id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Stations that carry both coordinates, i.e. the ones that can be
    /// placed on a map.
    pub fn located(&self) -> impl Iterator<Item = &StationRecord> {
        self.stations.values().filter(|s| s.coordinates().is_some())
    }
}

/// Builds and memoizes the station map.
///
/// A map is computed once per snapshot fingerprint. Headers are probed with
/// a bounded partial read and remembered per file cache key, so a change to
/// one file only re-probes that file.
pub struct StationRegistry {
    rule: CollisionRule,
    header_probe_bytes: usize,
    maps: MemoCache<Fingerprint, StationMap>,
    headers: MemoCache<CacheKey, Header>,
}

impl StationRegistry {
    pub fn new(header_probe_bytes: usize) -> Self {
        Self {
            rule: CollisionRule::default(),
            header_probe_bytes,
            maps: MemoCache::new(),
            headers: MemoCache::new(),
        }
    }

    pub fn rule(&self) -> CollisionRule {
        self.rule
    }

    /// Returns the station map for `snapshot`.
    ///
    /// Calling this twice with the same fingerprint returns the same map
    /// without touching the store. Stations whose header cannot be read are
    /// still registered, with empty metadata and no coordinates; such a
    /// partial map is not memoized.
    pub async fn discover_stations(
        &self,
        store: &dyn RemoteStore,
        snapshot: &RemoteSnapshot,
    ) -> Arc<StationMap> {
        let fingerprint = snapshot.fingerprint();
        if let Some(map) = self.maps.get(fingerprint).await {
            debug!("Station map cache hit for snapshot {}", fingerprint);
            return map;
        }

        let mut candidates: BTreeMap<String, Vec<&RemoteItem>> = BTreeMap::new();
        for item in snapshot.items() {
            candidates
                .entry(station_id_from_filename(&item.name))
                .or_default()
                .push(item);
        }

        let mut map = StationMap::empty(fingerprint.clone());
        let mut complete = true;
        for (station_id, files) in candidates {
            let Some((winner, losers)) = self.rule.resolve(&files) else {
                continue;
            };
            for loser in losers {
                warn!(
                    "Station id '{}' claimed by {} and {}; keeping {} ({})",
                    station_id, winner.href, loser.href, winner.href, self.rule
                );
                map.conflicts.push(StationConflict {
                    station_id: station_id.clone(),
                    kept: winner.href.clone(),
                    discarded: loser.href.clone(),
                    rule: self.rule,
                });
            }

            let (record, probed) = self.probe(store, station_id.clone(), winner).await;
            complete &= probed;
            map.stations.insert(station_id, record);
        }

        info!(
            "Discovered {} stations ({} conflicts) for snapshot {}",
            map.len(),
            map.conflicts.len(),
            fingerprint
        );

        self.forget_outdated(snapshot).await;
        if !complete {
            // partial maps are not memoized
            return Arc::new(map);
        }
        self.maps.insert(fingerprint.clone(), map).await
    }

    async fn probe(
        &self,
        store: &dyn RemoteStore,
        station_id: String,
        item: &RemoteItem,
    ) -> (StationRecord, bool) {
        let cache_key = item_cache_key(item);

        let (header, probed) = match self.headers.get(&cache_key).await {
            Some(header) => ((*header).clone(), true),
            None => match store.fetch_head(&item.href, self.header_probe_bytes).await {
                Ok(head) => {
                    let header = parse_header(&head);
                    for issue in &header.issues {
                        debug!("{}: {}", item.name, issue);
                    }
                    self.headers.insert(cache_key.clone(), header.clone()).await;
                    (header, true)
                }
                Err(e) => {
                    warn!("Could not read header of {}: {}", item.href, e);
                    (Header::default(), false)
                }
            },
        };

        let record = StationRecord {
            station_id,
            path: item.href.clone(),
            cache_key,
            file_name: item.name.clone(),
            lat: header.lat,
            lon: header.lon,
            meta: header.meta,
        };
        (record, probed)
    }

    /// Keeps only the entries belonging to `snapshot`.
    async fn forget_outdated(&self, snapshot: &RemoteSnapshot) {
        let fingerprint = snapshot.fingerprint();
        self.maps.invalidate_where(|f| f != fingerprint).await;

        let live: HashSet<CacheKey> = snapshot.items().iter().map(item_cache_key).collect();
        self.headers.invalidate_where(|k| !live.contains(k)).await;
    }

    pub async fn invalidate(&self) {
        self.maps.clear().await;
        self.headers.clear().await;
    }
}
