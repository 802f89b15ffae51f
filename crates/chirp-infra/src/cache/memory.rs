//! In-memory cache implementation - used as fallback when Redis is unavailable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use chirp_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// Map size at which the first expiry sweep runs.
const MIN_SWEEP_THRESHOLD: usize = 1024;

struct Entries {
    map: HashMap<String, CacheEntry>,
    sweep_at: usize,
}

impl Entries {
    /// Drop expired entries once the map has grown to the sweep threshold.
    /// The next threshold is twice the surviving size.
    fn sweep_if_due(&mut self, now: Instant, min_threshold: usize) {
        if self.map.len() < self.sweep_at {
            return;
        }
        self.map.retain(|_, e| !e.is_expired(now));
        self.sweep_at = (self.map.len() * 2).max(min_threshold);
    }
}

/// In-memory cache using a HashMap behind an async RwLock.
///
/// Expired entries are dropped lazily on read; writes sweep the whole map
/// only when it reaches a threshold that doubles with the live set.
/// Data is lost on process restart.
pub struct InMemoryCache {
    store: RwLock<Entries>,
    min_sweep_threshold: usize,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_sweep_threshold(MIN_SWEEP_THRESHOLD)
    }

    fn with_sweep_threshold(min_sweep_threshold: usize) -> Self {
        let min_sweep_threshold = min_sweep_threshold.max(1);
        Self {
            store: RwLock::new(Entries {
                map: HashMap::new(),
                sweep_at: min_sweep_threshold,
            }),
            min_sweep_threshold,
        }
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let store = self.store.read().await;
        store.map.values().filter(|e| !e.is_expired(now)).count()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let store = self.store.read().await;
        let Some(entry) = store.map.get(key) else {
            return Ok(None);
        };

        if entry.is_expired(now) {
            drop(store);
            let mut store = self.store.write().await;
            // Another writer may have refreshed the key in between.
            if store.map.get(key).is_some_and(|e| e.is_expired(now)) {
                store.map.remove(key);
            }
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut store = self.store.write().await;

        store.sweep_if_due(now, self.min_sweep_threshold);
        store.map.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|d| now + d),
            },
        );

        Ok(())
    }
}
