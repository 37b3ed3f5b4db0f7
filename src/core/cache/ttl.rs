//! Memoizing key-value cache with passive expiry and stale fallback.
//!
//! Entries are created lazily by [`TtlCache::store`] and expire passively:
//! nothing sweeps the map, a read that finds an expired entry evicts it.
//!
//! All mutations (`store`, `evict`) run under one gate shared by every key,
//! held across the compute callback. The gate is not reentrant: a compute
//! callback must not call `store` or `evict` on the same cache. Reads never
//! wait on the gate; a read that finds an expired entry evicts it only when
//! the gate is free, so a recompute in progress keeps its stale fallback.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};

use super::clock::{Clock, SystemClock};

/// Extension applied to a stale entry when recomputation fails.
pub const DEFAULT_STALE_EXTENSION: Duration = Duration::from_secs(30);

/// When an entry stops being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(DateTime<Utc>),
}

impl Expiry {
    /// Expiry for a freshly computed value; a zero TTL never expires.
    fn for_ttl(now: DateTime<Utc>, ttl: Duration) -> Self {
        if ttl.is_zero() {
            return Self::Never;
        }
        Self::after(now, ttl)
    }

    fn after(now: DateTime<Utc>, window: Duration) -> Self {
        TimeDelta::from_std(window)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .map_or(Self::Never, Self::At)
    }

    fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Never => true,
            Self::At(at) => *at > now,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expiry: Expiry,
}

/// How [`TtlCache::store`] keeps a computed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePolicy {
    ttl: Duration,
    stale_extension: Option<Duration>,
}

impl StorePolicy {
    /// Values never expire.
    #[must_use]
    pub const fn eternal() -> Self {
        Self {
            ttl: Duration::ZERO,
            stale_extension: None,
        }
    }

    /// Values expire `ttl` after they are stored; zero means never.
    #[must_use]
    pub const fn ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            stale_extension: None,
        }
    }

    #[must_use]
    pub const fn ttl_secs(secs: u64) -> Self {
        Self::ttl(Duration::from_secs(secs))
    }

    /// Serve the previous value for [`DEFAULT_STALE_EXTENSION`] when the
    /// compute callback fails.
    #[must_use]
    pub const fn allow_stale(self) -> Self {
        self.with_stale_extension(DEFAULT_STALE_EXTENSION)
    }

    /// Serve the previous value for `extension` when the compute callback fails.
    #[must_use]
    pub const fn with_stale_extension(mut self, extension: Duration) -> Self {
        self.stale_extension = Some(extension);
        self
    }

    #[must_use]
    pub const fn ttl_duration(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub const fn stale_extension(&self) -> Option<Duration> {
        self.stale_extension
    }
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self::eternal()
    }
}

/// Process-lifetime cache handed to entry points.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    write_gate: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache on wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache on the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            write_gate: Mutex::new(()),
            clock,
        }
    }

    /// Live value for `key`. An expired entry is reported absent and evicted
    /// unless a store holds the gate.
    #[must_use]
    pub fn read(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return None,
                Some(entry) if entry.expiry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let Some(_gate) = self.write_gate.try_lock() else {
            return None;
        };
        // Only drop the entry if no store refreshed it in between.
        let mut entries = self.entries.write();
        if entries
            .get(key)
            .is_some_and(|entry| !entry.expiry.is_live(now))
        {
            entries.remove(key);
        }
        None
    }

    /// Live value for `key` without evicting an expired entry.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<V> {
        self.live_value(key, self.clock.now())
    }

    /// Return the live value for `key`, computing and storing one if needed.
    ///
    /// `compute` is never invoked while a live value exists. When it returns
    /// `None` and the policy allows stale values, a previous entry (expired or
    /// not) is kept for the stale extension and its value returned; without
    /// that allowance the entry is evicted and `None` returned.
    pub fn store<F>(&self, key: &str, policy: StorePolicy, compute: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        let _gate = self.write_gate.lock();

        if let Some(value) = self.live_value(key, self.clock.now()) {
            return Some(value);
        }

        let computed = compute();
        let now = self.clock.now();
        let mut entries = self.entries.write();

        match (computed, policy.stale_extension) {
            (Some(value), _) => {
                entries.insert(
                    key.to_string(),
                    CacheEntry {
                        value: value.clone(),
                        expiry: Expiry::for_ttl(now, policy.ttl),
                    },
                );
                Some(value)
            }
            (None, Some(extension)) => entries.get_mut(key).map(|entry| {
                if entry.expiry != Expiry::Never {
                    entry.expiry = Expiry::after(now, extension);
                }
                entry.value.clone()
            }),
            (None, None) => {
                entries.remove(key);
                None
            }
        }
    }

    /// [`peek`](Self::peek) first and fall back to [`store`](Self::store).
    pub fn read_then_store<F>(&self, key: &str, policy: StorePolicy, compute: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        if let Some(value) = self.peek(key) {
            return Some(value);
        }
        self.store(key, policy, compute)
    }

    /// Remove the entry for `key`, live or not.
    pub fn evict(&self, key: &str) {
        let _gate = self.write_gate.lock();
        self.entries.write().remove(key);
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn live_value(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.expiry.is_live(now))
            .map(|entry| entry.value.clone())
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.read().len())
            .finish_non_exhaustive()
    }
}
