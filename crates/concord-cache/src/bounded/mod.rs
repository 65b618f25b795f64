//! Bounded TTL cache
//!
//! Fixed-capacity store for hot short-lived objects. Every entry carries an
//! expiry; reads refresh it (a time-based proxy for recency). When the cache
//! is full, inserting evicts the single entry nearest to expiry.
//!
//! All operations serialize on one lock: even lookups mutate (they refresh
//! the expiry), so there is no lock-free read path. Expiry is lazy — there
//! are no per-entry timers; entries past their expiry are swept on mutating
//! operations and filtered out of reads.

use concord_core::Snowflake;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

struct Inner<V> {
    entries: HashMap<Snowflake, Entry<V>>,
    /// Expiry-ordered index over `entries`; kept in lockstep
    order: BTreeSet<(Instant, Snowflake)>,
}

impl<V> Inner<V> {
    fn take(&mut self, id: Snowflake) -> Option<Entry<V>> {
        let entry = self.entries.remove(&id)?;
        self.order.remove(&(entry.expires_at, id));
        Some(entry)
    }

    fn insert(&mut self, id: Snowflake, value: V, expires_at: Instant) {
        if let Some(previous) = self.entries.insert(id, Entry { value, expires_at }) {
            self.order.remove(&(previous.expires_at, id));
        }
        self.order.insert((expires_at, id));
    }

    fn sweep_expired(&mut self, now: Instant) {
        while let Some(&(expires_at, id)) = self.order.iter().next() {
            if expires_at > now {
                break;
            }
            self.order.remove(&(expires_at, id));
            self.entries.remove(&id);
        }
    }

    /// Evict the single entry nearest to expiry
    fn evict_nearest(&mut self) -> Option<Snowflake> {
        let &(expires_at, id) = self.order.iter().next()?;
        self.order.remove(&(expires_at, id));
        self.entries.remove(&id);
        Some(id)
    }
}

/// Fixed-capacity cache with expiry-based eviction
pub struct BoundedCache<V> {
    inner: Mutex<Inner<V>>,
    capacity: usize,
    ttl: Duration,
}

impl<V: Clone> BoundedCache<V> {
    /// Create a cache holding at most `capacity` entries, each expiring
    /// `ttl` after its last insert or read
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: BTreeSet::new(),
            }),
            capacity,
            ttl,
        }
    }

    /// Insert an item with the default TTL, evicting the nearest-to-expiry
    /// entry if the cache is at capacity
    pub fn insert(&self, id: Snowflake, value: V) {
        self.insert_with_ttl(id, value, self.ttl);
    }

    /// Insert an item with an explicit TTL
    pub fn insert_with_ttl(&self, id: Snowflake, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        inner.sweep_expired(now);
        if !inner.entries.contains_key(&id) && inner.entries.len() >= self.capacity {
            if let Some(evicted) = inner.evict_nearest() {
                tracing::trace!(id = %evicted, "Evicted nearest-to-expiry cache entry");
            }
        }
        inner.insert(id, value, now + ttl);
    }

    /// Look up an entry, refreshing its expiry on hit
    pub fn get(&self, id: Snowflake) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let entry = inner.take(id)?;
        if entry.expires_at <= now {
            return None;
        }
        let value = entry.value.clone();
        // Touch: refresh the expiry so recently read entries survive longest
        inner.insert(id, entry.value, now + self.ttl);
        Some(value)
    }

    /// Remove an entry along with its expiry bookkeeping
    pub fn remove(&self, id: Snowflake) -> Option<V> {
        self.inner.lock().take(id).map(|entry| entry.value)
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.sweep_expired(Instant::now());
        inner.entries.len()
    }

    /// Check whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether an unexpired entry exists, without refreshing it
    pub fn contains(&self, id: Snowflake) -> bool {
        let inner = self.inner.lock();
        inner
            .entries
            .get(&id)
            .is_some_and(|e| e.expires_at > Instant::now())
    }

    /// The configured capacity
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<V> std::fmt::Debug for BoundedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("len", &self.inner.lock().entries.len())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}
