//! In-memory [`RemoteStore`] used by the unit tests.

use crate::remote::{RemoteItem, RemoteStore, RemoteUnavailable};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) const CAM4: &str = "# Station: cam4
# Location: Douala
# Latitude: 4.05
# Longitude: 9.70
# Sensor Type: Raspberry Pi Reflector
# Water Body: Wouri River
# Vertical datum: EGM2008
# Units: m
# Provider: University of Bonn
# Access Raw Data: NaN
# GNSS Receiver: u-blox ZED-F9P
# GNSS Antenna: u-blox ANN-MB
#
DateTime,Height
2025-06-01T18:50:18,47.531
2025-06-01T20:09:29,47.767
2025-06-02T08:15:00,47.690
";

struct FakeFile {
    item: RemoteItem,
    body: String,
}

/// Store holding files in memory and counting every fetch per href.
#[derive(Default)]
pub(crate) struct FakeStore {
    files: Mutex<BTreeMap<String, FakeFile>>,
    fetches: Mutex<HashMap<String, usize>>,
    head_fetches: Mutex<HashMap<String, usize>>,
    listings: AtomicUsize,
    offline: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces `name` under `/solutions/`. The etag is derived from
    /// the body so that a content change also changes the listing.
    pub fn put(&self, name: &str, body: &str, last_modified: Option<&str>) -> RemoteItem {
        let href = format!("/solutions/{name}");
        let item = RemoteItem {
            name: name.to_string(),
            href: href.clone(),
            size: Some(body.len() as u64),
            last_modified: last_modified.map(str::to_string),
            etag: Some(format!("\"{:x}\"", body.len() * 31 + body.lines().count())),
        };
        self.files.lock().unwrap().insert(
            href,
            FakeFile {
                item: item.clone(),
                body: body.to_string(),
            },
        );
        item
    }

    pub fn remove(&self, name: &str) {
        self.files
            .lock()
            .unwrap()
            .remove(&format!("/solutions/{name}"));
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fetch_count(&self, href: &str) -> usize {
        self.fetches.lock().unwrap().get(href).copied().unwrap_or(0)
    }

    pub fn head_fetch_count(&self, href: &str) -> usize {
        self.head_fetches
            .lock()
            .unwrap()
            .get(href)
            .copied()
            .unwrap_or(0)
    }

    pub fn listing_count(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), RemoteUnavailable> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteUnavailable::NotConfigured);
        }
        Ok(())
    }

    fn body(&self, href: &str) -> Result<String, RemoteUnavailable> {
        self.files
            .lock()
            .unwrap()
            .get(href)
            .map(|f| f.body.clone())
            .ok_or_else(|| RemoteUnavailable::NotFound(href.to_string()))
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn list_remote_txts(&self) -> Result<Vec<RemoteItem>, RemoteUnavailable> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self
            .files
            .lock()
            .unwrap()
            .values()
            .map(|f| f.item.clone())
            .collect())
    }

    async fn fetch(&self, href: &str) -> Result<String, RemoteUnavailable> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(href.to_string())
            .or_default() += 1;
        self.check_online()?;
        self.body(href)
    }

    async fn fetch_head(&self, href: &str, max_bytes: usize) -> Result<String, RemoteUnavailable> {
        *self
            .head_fetches
            .lock()
            .unwrap()
            .entry(href.to_string())
            .or_default() += 1;
        self.check_online()?;
        let body = self.body(href)?;
        if body.len() <= max_bytes {
            return Ok(body);
        }
        let mut cut = max_bytes;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        let head = &body[..cut];
        Ok(head.rfind('\n').map_or("", |i| &head[..=i]).to_string())
    }
}
