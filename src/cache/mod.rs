//! In-memory TTL caching with request de-duplication.
//!
//! Caches are explicit objects owned by the service layer, constructed
//! once at startup. Each exposes get/insert/invalidate/clear plus
//! read-only statistics, so lifecycle and contents are visible in tests
//! instead of hiding in module state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

/// Read-only cache introspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

impl CacheStats {
    /// Merge another cache's statistics into this one.
    pub fn merge(mut self, other: CacheStats) -> CacheStats {
        self.size += other.size;
        self.keys.extend(other.keys);
        self
    }
}

/// Build a cache key from an endpoint and its query parameters.
///
/// Parameters are sorted so equivalent queries share a key regardless of
/// argument order.
pub fn cache_key(endpoint: &str, params: &[(&str, String)]) -> String {
    let mut pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    pairs.sort();
    format!("{}?{}", endpoint, pairs.join("&"))
}

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// A TTL cache keyed by request parameters.
///
/// `get_or_fetch` de-duplicates concurrent misses per key: while one
/// caller is fetching, others wait and then read the stored value
/// instead of issuing their own fetch.
pub struct TtlCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<T>>>,
    gates: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Get a value if present and still fresh.
    pub fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    /// Store a value, resetting its TTL.
    pub fn insert(&self, key: &str, value: T) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop a single entry.
    pub fn invalidate(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
        self.gates.lock().unwrap().clear();
    }

    /// Current size and key set.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock().unwrap();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }

    fn gate(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self.gates.lock().unwrap();
        gates
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Return a fresh cached value, or run `fetch` and store its result.
    ///
    /// The per-key gate guarantees the check-fetch-store sequence is not
    /// interleaved for the same key: two concurrent misses perform one
    /// fetch between them.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(key) {
            debug!("cache hit for {}", key);
            return Ok(hit);
        }

        let gate = self.gate(key);
        let _guard = gate.lock().await;

        // A concurrent caller may have stored the value while we waited.
        if let Some(hit) = self.get(key) {
            debug!("cache hit for {} after waiting on in-flight fetch", key);
            return Ok(hit);
        }

        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }
}
