//! Time-bounded key/value cache for derived data.
//!
//! Entries expire lazily on read. [`EphemeralCache::spawn_sweeper`] adds a
//! periodic cleanup task on the current Tokio runtime.

pub mod invalidation;

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tokio::{runtime::TryCurrentError, task::JoinHandle};

use crate::utils::lock;

pub use invalidation::{CacheInvalidator, PrefixInvalidate, cached_translations};

pub const DEFAULT_TTL: Duration = CacheTtl::MEDIUM;
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Standard lifetimes for cached values.
pub struct CacheTtl;

impl CacheTtl {
    pub const SHORT: Duration = Duration::from_secs(30);
    pub const MEDIUM: Duration = Duration::from_secs(5 * 60);
    pub const LONG: Duration = Duration::from_secs(30 * 60);
    pub const VERY_LONG: Duration = Duration::from_secs(2 * 60 * 60);
}

/// Cache key namespaces. Invalidation works on the prefixes.
pub struct CacheKeys;

impl CacheKeys {
    pub const PROJECT_PREFIX: &'static str = "project:";
    pub const ARB_PREFIX: &'static str = "arb:";
    pub const DART_PREFIX: &'static str = "dart:";
    pub const STATS_PREFIX: &'static str = "stats:";
    pub const PLUGIN_PREFIX: &'static str = "plugin:";

    pub const PROJECT_CONFIG: &'static str = "project:config";
    pub const PROJECT_L10N_CONFIG: &'static str = "project:l10n_config";
    pub const PROJECT_PUBSPEC: &'static str = "project:pubspec";
    pub const ARB_KEYS: &'static str = "arb:all_keys";
    pub const TRANSLATION_STATS: &'static str = "stats:translations";
    pub const PLUGIN_CONFIG: &'static str = "plugin:config";

    pub fn arb_file(locale: &str) -> String {
        format!("arb:file:{}", locale)
    }

    pub fn arb_content(locale: &str) -> String {
        format!("arb:content:{}", locale)
    }

    pub fn arb_translations(key: &str) -> String {
        format!("arb:translations:{}", key)
    }

    pub fn dart_references(uri: &str) -> String {
        format!("dart:references:{}", uri)
    }

    pub fn dart_parse_result(uri: &str, version: u64) -> String {
        format!("dart:parse:{}:{}", uri, version)
    }

    pub fn diagnostics(uri: &str) -> String {
        format!("diagnostics:{}", uri)
    }

    pub fn locale_stats(locale: &str) -> String {
        format!("stats:locale:{}", locale)
    }

    pub fn file_watcher(pattern: &str) -> String {
        format!("watcher:{}", pattern)
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub created_at: Instant,
    pub expires_at: Instant,
    pub access_count: u64,
    pub last_accessed_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
            access_count: 0,
            last_accessed_at: now,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CacheStats {
    /// Stored entries, expired ones included until they are swept.
    pub size: usize,
    pub expired: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 before any lookup.
    pub hit_rate: f64,
}

struct State<V> {
    entries: HashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
}

pub struct EphemeralCache<V> {
    state: Mutex<State<V>>,
    default_ttl: Duration,
}

impl<V: Clone> Default for EphemeralCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> EphemeralCache<V> {
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));
        lock(&self.state).entries.insert(key.into(), entry);
    }

    /// Returns a live value, dropping it first if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut guard = lock(&self.state);
        let state = &mut *guard;
        match state.entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.access_count += 1;
                entry.last_accessed_at = now;
                let value = entry.value.clone();
                state.hits += 1;
                Some(value)
            }
            Some(_) => {
                state.entries.remove(key);
                state.misses += 1;
                None
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Like [`get`](Self::get) without touching access counters.
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut state = lock(&self.state);
        let Some(expired) = state.entries.get(key).map(|e| e.is_expired(now)) else {
            return false;
        };
        if expired {
            state.entries.remove(key);
        }
        !expired
    }

    pub fn delete(&self, key: &str) -> bool {
        lock(&self.state).entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
    }

    /// Removes every key starting with `prefix`. Returns how many were removed.
    pub fn clear_by_prefix(&self, prefix: &str) -> usize {
        let mut state = lock(&self.state);
        let before = state.entries.len();
        state.entries.retain(|key, _| !key.starts_with(prefix));
        before - state.entries.len()
    }

    /// Returns the cached value or stores the factory's result.
    ///
    /// Concurrent callers that miss may each run the factory; the last write
    /// wins. A factory error is returned and nothing is stored.
    pub fn get_or_compute<E>(
        &self,
        key: &str,
        factory: impl FnOnce() -> Result<V, E>,
        ttl: Option<Duration>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = factory()?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    pub async fn get_or_compute_async<E, F, Fut>(
        &self,
        key: &str,
        factory: F,
        ttl: Option<Duration>,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = factory().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Live values for the keys that have one.
    pub fn get_many<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> HashMap<String, V> {
        keys.into_iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }

    pub fn set_many(&self, entries: impl IntoIterator<Item = (String, V)>, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut state = lock(&self.state);
        for (key, value) in entries {
            state.entries.insert(key, CacheEntry::new(value, ttl));
        }
    }

    /// Drops expired entries. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut state = lock(&self.state);
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(now));
        before - state.entries.len()
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let state = lock(&self.state);
        let lookups = state.hits + state.misses;
        CacheStats {
            size: state.entries.len(),
            expired: state.entries.values().filter(|e| e.is_expired(now)).count(),
            hits: state.hits,
            misses: state.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                state.hits as f64 / lookups as f64
            },
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = lock(&self.state).entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// A copy of the stored entry, expired or not.
    pub fn entry(&self, key: &str) -> Option<CacheEntry<V>> {
        lock(&self.state).entries.get(key).cloned()
    }
}

impl<V: Clone + Send + 'static> EphemeralCache<V> {
    /// Runs [`cleanup`](Self::cleanup) every `interval` on the current runtime.
    ///
    /// The task holds a weak reference and ends once the cache is dropped.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
    ) -> Result<JoinHandle<()>, TryCurrentError> {
        let runtime = tokio::runtime::Handle::try_current()?;
        let cache = Arc::downgrade(self);
        Ok(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let removed = cache.cleanup();
                if removed > 0 {
                    tracing::debug!(removed, "swept expired cache entries");
                }
            }
        }))
    }
}
