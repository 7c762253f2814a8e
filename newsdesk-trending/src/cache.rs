//! Time-bounded cache of trending rankings.
//!
//! Entries expire lazily: a read that finds an entry at or past its TTL
//! removes it and reports a miss. There is no background eviction.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use newsdesk_core::LocationCluster;

use crate::TrendingResult;

/// Cache key: the query cluster and requested limit.
///
/// Displays as `trending_{cluster}_{limit}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    cluster: LocationCluster,
    limit: usize,
}

impl CacheKey {
    /// Key for `cluster` and `limit`.
    #[must_use]
    pub const fn new(cluster: LocationCluster, limit: usize) -> Self {
        Self { cluster, limit }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trending_{}_{}", self.cluster, self.limit)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: TrendingResult,
    inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        // A clock that stepped backwards yields a negative age, which is fresh.
        (now - self.inserted_at)
            .to_std()
            .map_or(true, |age| age < ttl)
    }
}

/// TTL cache guarded by a read-write lock.
///
/// Concurrent misses for one key may both compute and both `put`; the last
/// write wins.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use chrono::Utc;
/// use newsdesk_core::LocationCluster;
/// use newsdesk_trending::{CacheKey, TrendingCache, TrendingResult};
///
/// let cache = TrendingCache::new(Duration::from_secs(300));
/// let key = CacheKey::new(LocationCluster::from_lat_lon(1.0, 2.0), 5);
/// let now = Utc::now();
/// let result = TrendingResult::new(Vec::new(), LocationCluster::from_lat_lon(1.0, 2.0), now, Vec::new());
/// cache.put(key.clone(), result.clone(), now);
/// assert_eq!(cache.get(&key, now), Some(result));
/// assert_eq!(key.to_string(), "trending_1.0_2.0_5");
/// ```
#[derive(Debug)]
pub struct TrendingCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl TrendingCache {
    /// Create an empty cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Entry lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached result for `key` if it is younger than the TTL.
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<TrendingResult> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                Some(entry) if entry.is_fresh(now, self.ttl) => return Some(entry.result.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries
            .get(key)
            .is_some_and(|entry| !entry.is_fresh(now, self.ttl))
        {
            entries.remove(key);
            debug!("evicted expired entry {key}");
        }
        None
    }

    /// Store `result` under `key`, replacing any previous entry.
    pub fn put(&self, key: CacheKey, result: TrendingResult, now: DateTime<Utc>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: now,
            },
        );
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of stored entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Report whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as TimeDelta;
    use newsdesk_core::test_support::reference_time;
    use rstest::{fixture, rstest};

    fn result() -> TrendingResult {
        TrendingResult::new(
            Vec::new(),
            LocationCluster::from_lat_lon(37.77, -122.42),
            reference_time(),
            Vec::new(),
        )
    }

    fn key(limit: usize) -> CacheKey {
        CacheKey::new(LocationCluster::from_lat_lon(37.77, -122.42), limit)
    }

    #[fixture]
    fn cache() -> TrendingCache {
        TrendingCache::new(Duration::from_secs(300))
    }

    #[rstest]
    fn key_formats_like_legacy_keys() {
        assert_eq!(key(5).to_string(), "trending_37.8_-122.4_5");
    }

    #[rstest]
    fn hit_within_ttl(cache: TrendingCache) {
        let now = reference_time();
        cache.put(key(5), result(), now);
        let later = now + TimeDelta::seconds(299);
        assert_eq!(cache.get(&key(5), later), Some(result()));
    }

    #[rstest]
    fn miss_at_ttl_evicts(cache: TrendingCache) {
        let now = reference_time();
        cache.put(key(5), result(), now);
        assert_eq!(cache.get(&key(5), now + TimeDelta::seconds(300)), None);
        assert!(cache.is_empty());
    }

    #[rstest]
    fn limit_is_part_of_key(cache: TrendingCache) {
        cache.put(key(5), result(), reference_time());
        assert_eq!(cache.get(&key(10), reference_time()), None);
    }

    #[rstest]
    fn put_refreshes_timestamp(cache: TrendingCache) {
        let now = reference_time();
        cache.put(key(5), result(), now);
        cache.put(key(5), result(), now + TimeDelta::seconds(200));
        assert!(cache.get(&key(5), now + TimeDelta::seconds(400)).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn invalidate_all_clears(cache: TrendingCache) {
        cache.put(key(5), result(), reference_time());
        cache.put(key(10), result(), reference_time());
        cache.invalidate_all();
        assert_eq!(cache.get(&key(5), reference_time()), None);
        assert_eq!(cache.get(&key(10), reference_time()), None);
    }

    #[rstest]
    fn backwards_clock_counts_as_fresh(cache: TrendingCache) {
        let now = reference_time();
        cache.put(key(5), result(), now);
        assert!(cache.get(&key(5), now - TimeDelta::seconds(10)).is_some());
    }
}
