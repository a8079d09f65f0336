//! Bounded in-memory cache for geocoding results.
//!
//! Lookups against external providers are slow and rate limited, so both
//! directions are memoized. The cache holds a fixed number of entries,
//! evicts the least recently used entry when full, and optionally expires
//! entries after a TTL.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Fixed-capacity key-value cache with least-recently-used eviction and
/// an optional TTL.
///
/// A capacity of zero disables caching entirely: every insert is a no-op
/// and every lookup misses.
pub struct BoundedCache<K, V> {
    capacity: usize,
    ttl: Option<Duration>,
    entries: HashMap<K, CacheEntry<V>>,
    // Recency order: lowest stamp is the least recently used key.
    order: BTreeMap<u64, K>,
    next_stamp: u64,
}

struct CacheEntry<V> {
    value: V,
    stamp: u64,
    inserted_at: Instant,
}

impl<K, V> BoundedCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// Creates a cache holding at most `capacity` entries. Entries older
    /// than `ttl` read as misses; `None` disables expiry.
    #[must_use]
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            capacity,
            ttl,
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_stamp: 0,
        }
    }

    /// Returns the cached value for `key`, refreshing its recency.
    ///
    /// Expired entries are removed and read as misses.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let (stamp, expired) = match self.entries.get(key) {
            None => return None,
            Some(entry) => (
                entry.stamp,
                self.ttl.is_some_and(|ttl| entry.inserted_at.elapsed() > ttl),
            ),
        };
        if expired {
            self.entries.remove(key);
            self.order.remove(&stamp);
            return None;
        }

        self.order.remove(&stamp);
        let new_stamp = self.bump_stamp();
        self.order.insert(new_stamp, key.clone());
        let entry = self.entries.get_mut(key)?;
        entry.stamp = new_stamp;
        Some(entry.value.clone())
    }

    /// Inserts `value` under `key`, evicting the least recently used
    /// entry if the cache is full. Re-inserting an existing key replaces
    /// its value and refreshes both recency and TTL.
    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(old) = self.entries.remove(&key) {
            self.order.remove(&old.stamp);
        }
        while self.entries.len() >= self.capacity {
            let Some((_, oldest)) = self.order.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
        }

        let stamp = self.bump_stamp();
        self.order.insert(stamp, key.clone());
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stamp,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of live entries (expired entries count until touched).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bump_stamp(&mut self) -> u64 {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        stamp
    }
}

/// Rounds a coordinate pair to four decimal places (roughly 11 m of
/// latitude) for use as a reverse-lookup cache key, so nearby queries
/// share an entry.
#[must_use]
pub fn coordinate_key(latitude: f64, longitude: f64) -> (i64, i64) {
    #[allow(clippy::cast_possible_truncation)] // coordinates are bounded, the product fits i64
    let round = |coord: f64| (coord * 10_000.0).round() as i64;
    (round(latitude), round(longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = BoundedCache::new(2, None);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&"a").is_none());
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[test]
    fn get_refreshes_recency() {
        let mut cache = BoundedCache::new(2, None);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
        cache.insert("c", 3);
        assert_eq!(cache.get(&"a"), Some(1));
        assert!(cache.get(&"b").is_none());
    }

    #[test]
    fn reinsert_replaces_without_growth() {
        let mut cache = BoundedCache::new(2, None);
        cache.insert("a", 1);
        cache.insert("a", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"a"), Some(2));
    }

    #[test]
    fn ttl_expires_entries() {
        let mut cache = BoundedCache::new(10, Some(Duration::from_millis(5)));
        cache.insert("a", 1);
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get(&"a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_never_stores() {
        let mut cache = BoundedCache::new(0, None);
        cache.insert("a", 1);
        assert!(cache.is_empty());
        assert!(cache.get(&"a").is_none());
    }

    #[test]
    fn coordinate_keys_round_to_four_decimals() {
        assert_eq!(
            coordinate_key(28.613_89, 77.208_99),
            coordinate_key(28.613_91, 77.209_01)
        );
        assert_ne!(coordinate_key(28.6139, 77.2090), coordinate_key(28.6141, 77.2090));
    }
}
