use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory memoization table.
///
/// Values are stored behind `Arc` and replaced whole, so a reader always
/// sees either the previous or the new value, never a partial one. The lock
/// is only held for map access; callers compute values outside of it, which
/// means two concurrent callers may compute the same entry and the later
/// insert wins. Computations stored here are idempotent, so that is harmless.
pub struct MemoCache<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub async fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.lock().await.insert(key, Arc::clone(&value));
        value
    }

    /// Removes the entry for `key`. Returns whether one existed.
    pub async fn invalidate(&self, key: &K) -> bool {
        self.entries.lock().await.remove(key).is_some()
    }

    /// Removes every entry for which `stale` returns true.
    pub async fn invalidate_where<F>(&self, mut stale: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|k, _| !stale(k));
        before - entries.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
