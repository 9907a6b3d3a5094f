//! Fingerprints of the remote folder and of individual files.
//!
//! A [`RemoteSnapshot`] summarizes one listing of the remote folder. Its
//! fingerprint is the cache key of the station registry: the registry is
//! rebuilt only when the fingerprint changes. Each file additionally gets its
//! own [`CacheKey`], which keys the series cache.

use crate::remote::RemoteItem;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

/// Per-file fingerprint; changes whenever the listed file changes.
pub type CacheKey = Fingerprint;

impl Fingerprint {
    /// Wraps an already computed hex digest.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_hasher(hasher: Sha256) -> Self {
        Self(format!("{:x}", hasher.finalize()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feeds one length-prefixed field so that adjacent fields can never run
/// into each other (`"ab" + "c"` hashes differently from `"a" + "bc"`).
fn feed(hasher: &mut Sha256, field: Option<&str>) {
    match field {
        Some(value) => {
            hasher.update([1u8]);
            hasher.update((value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

fn feed_item(hasher: &mut Sha256, item: &RemoteItem) {
    let size = item.size.map(|s| s.to_string());
    feed(hasher, Some(&item.href));
    feed(hasher, Some(&item.name));
    feed(hasher, size.as_deref());
    feed(hasher, item.last_modified.as_deref());
    feed(hasher, item.etag.as_deref());
}

/// Cache key of a single listed file: a digest of its href, name, size,
/// last-modified stamp and ETag.
pub fn item_cache_key(item: &RemoteItem) -> CacheKey {
    let mut hasher = Sha256::new();
    feed_item(&mut hasher, item);
    Fingerprint::from_hasher(hasher)
}

/// Reduces a listing to a single fingerprint.
///
/// The result depends on the content of the listing only, never on its
/// order: items are hashed individually and the per-item digests are sorted
/// before being combined.
pub fn remote_snapshot_hash(items: &[RemoteItem]) -> Fingerprint {
    let mut keys: Vec<CacheKey> = items.iter().map(item_cache_key).collect();
    keys.sort();

    let mut hasher = Sha256::new();
    hasher.update((keys.len() as u64).to_le_bytes());
    for key in &keys {
        hasher.update(key.as_str().as_bytes());
    }
    Fingerprint::from_hasher(hasher)
}

/// One listing of the remote folder together with its fingerprint.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSnapshot {
    fingerprint: Fingerprint,
    items: Vec<RemoteItem>,
}

impl RemoteSnapshot {
    /// Captures a listing. Items are stored sorted by href so that two
    /// snapshots with equal fingerprints also iterate identically.
    pub fn from_items(mut items: Vec<RemoteItem>) -> Self {
        let fingerprint = remote_snapshot_hash(&items);
        items.sort_by(|a, b| a.href.cmp(&b.href));
        Self { fingerprint, items }
    }

    /// Snapshot of an empty or unreachable folder.
    pub fn empty() -> Self {
        Self::from_items(Vec::new())
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn items(&self) -> &[RemoteItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, size: u64, modified: &str) -> RemoteItem {
        RemoteItem {
            name: name.to_string(),
            href: format!("/public.php/webdav/solutions/{name}"),
            size: Some(size),
            last_modified: Some(modified.to_string()),
            etag: None,
        }
    }

    fn listing() -> Vec<RemoteItem> {
        vec![
            item("cam4_1h.txt", 1024, "Sun, 01 Jun 2025 18:50:18 GMT"),
            item("r6gb_30m.txt", 2048, "Mon, 02 Jun 2025 08:00:00 GMT"),
            item("rpr1_5m.txt", 4096, "Tue, 03 Jun 2025 12:30:00 GMT"),
        ]
    }

    #[test]
    fn permutations_hash_equally() {
        let forward = listing();
        let mut reversed = listing();
        reversed.reverse();
        let mut rotated = listing();
        rotated.rotate_left(1);

        let expected = remote_snapshot_hash(&forward);
        assert_eq!(remote_snapshot_hash(&reversed), expected);
        assert_eq!(remote_snapshot_hash(&rotated), expected);
    }

    #[test]
    fn any_changed_indicator_changes_the_hash() {
        let base = remote_snapshot_hash(&listing());

        let mut resized = listing();
        resized[1].size = Some(2049);
        assert_ne!(remote_snapshot_hash(&resized), base);

        let mut touched = listing();
        touched[0].last_modified = Some("Sun, 01 Jun 2025 18:50:19 GMT".into());
        assert_ne!(remote_snapshot_hash(&touched), base);

        let mut retagged = listing();
        retagged[2].etag = Some("\"abc\"".into());
        assert_ne!(remote_snapshot_hash(&retagged), base);

        let mut removed = listing();
        removed.pop();
        assert_ne!(remote_snapshot_hash(&removed), base);

        let mut added = listing();
        added.push(item("cam5_1h.txt", 10, "Wed, 04 Jun 2025 00:00:00 GMT"));
        assert_ne!(remote_snapshot_hash(&added), base);
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        let mut a = item("ab", 1, "x");
        a.etag = Some("c".into());
        let mut b = item("ab", 1, "xc");
        b.etag = None;
        assert_ne!(item_cache_key(&a), item_cache_key(&b));
    }

    #[test]
    fn snapshot_orders_items_and_keeps_fingerprint() {
        let mut reversed = listing();
        reversed.reverse();
        let a = RemoteSnapshot::from_items(listing());
        let b = RemoteSnapshot::from_items(reversed);

        assert_eq!(a, b);
        assert_eq!(a.items()[0].name, "cam4_1h.txt");
        assert_eq!(a.fingerprint().as_str().len(), 64);
    }

    #[test]
    fn empty_snapshot_is_stable() {
        assert_eq!(
            RemoteSnapshot::empty().fingerprint(),
            RemoteSnapshot::from_items(vec![]).fingerprint()
        );
    }
}
