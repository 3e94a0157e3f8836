use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clock::{to_time_delta, Clock};
use crate::kv::KeyValueStore;

/// Bump this when the persisted payload shape changes to orphan old entries.
const CACHE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry<T> {
    key: String,
    payload: T,
    fetched_at: DateTime<Utc>,
}

/// TTL-bounded JSON cache over a [`KeyValueStore`].
///
/// An entry older than the TTL is absent, never a fallback value. Payload and
/// timestamp are written as one value, so a write is atomic per key.
pub struct CatalogCache {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    prefix: String,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(
        store: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        namespace: &str,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            prefix: format!("{namespace}:v{CACHE_VERSION}:"),
            ttl,
        }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Fresh payload for `key`. Expired or unreadable entries are removed.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let storage_key = self.storage_key(key);
        let raw = self.store.get(&storage_key)?;
        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Dropping unreadable cache entry {}: {}", storage_key, e);
                self.store.remove(&storage_key);
                return None;
            }
        };
        if entry.key != key {
            tracing::debug!("Cache entry {} belongs to {}, dropping", storage_key, entry.key);
            self.store.remove(&storage_key);
            return None;
        }
        let age = self.clock.now() - entry.fetched_at;
        if age > to_time_delta(self.ttl) {
            tracing::debug!("Cache entry {} expired ({}s old)", storage_key, age.num_seconds());
            self.store.remove(&storage_key);
            return None;
        }
        Some(entry.payload)
    }

    /// Write `payload` stamped with the current time; last write wins.
    pub fn put<T: Serialize>(&self, key: &str, payload: &T) {
        let entry = CacheEntry {
            key: key.to_string(),
            payload,
            fetched_at: self.clock.now(),
        };
        match serde_json::to_string(&entry) {
            Ok(json) => self.store.set(&self.storage_key(key), &json),
            Err(e) => tracing::warn!("Failed to serialize cache entry {}: {}", key, e),
        }
    }

    /// Remove every entry under this cache's namespace. Returns how many.
    pub fn clear(&self) -> usize {
        let keys: Vec<String> = self
            .store
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(&self.prefix))
            .collect();
        for key in &keys {
            self.store.remove(key);
        }
        tracing::info!("Catalog cache cleared ({} entries)", keys.len());
        keys.len()
    }
}
