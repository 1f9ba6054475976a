//! Volatile cache tier.
//!
//! Process-local, best-effort store of domain payloads under string keys,
//! each with an optional time-to-live. Expiry is lazy: an expired entry is
//! removed the moment a lookup observes it. The background sweeper
//! (`cache::sweeper`) bounds memory growth from keys nobody re-reads, but
//! correctness never depends on it.
//!
//! Hit/miss counters are owned by the store instance and survive entry
//! eviction; only [`MemoryStore::clear`] resets them. One instance is
//! created per process and shared by all domain caches.

use std::collections::HashMap;
use std::sync::RwLock;

use metrics::counter;
use time::{Duration, OffsetDateTime};

use crate::domain::documents::CachedDocument;
use crate::domain::inference::ModelResponse;

use super::lock::{rw_read, rw_write};
use super::{METRIC_L1_EXPIRED_TOTAL, METRIC_L1_HIT_TOTAL, METRIC_L1_MISS_TOTAL};

const SOURCE: &str = "cache::memory";

/// Payload stored in the volatile tier.
///
/// The three domain caches share one store; key prefixes keep their entries
/// apart, and the enum keeps the payloads typed.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Document(CachedDocument),
    Embedding(Vec<f32>),
    Response(ModelResponse),
}

struct MemoryEntry {
    value: CachedValue,
    expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, Default)]
struct KeyCounters {
    hits: u64,
    misses: u64,
}

/// Hit/miss counters for one key, or aggregated across all keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

impl TierStats {
    fn from_counts(hits: u64, misses: u64) -> Self {
        Self {
            hits,
            misses,
            hit_rate: hit_rate(hits, misses),
        }
    }
}

/// `hits / (hits + misses)`, `0.0` when nothing has been observed.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

fn deadline_passed(expires_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
    match expires_at {
        Some(deadline) => now > deadline,
        None => false,
    }
}

enum Lookup {
    Hit(CachedValue),
    Expired,
    Absent,
}

/// Volatile tier storage shared by every domain cache in the process.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    counters: RwLock<HashMap<String, KeyCounters>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            counters: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a live entry.
    ///
    /// An entry whose deadline has passed is removed as a side effect and
    /// reported (and counted) as a miss.
    pub fn get(&self, key: &str) -> Option<CachedValue> {
        let now = OffsetDateTime::now_utc();
        let outcome = {
            let mut entries = rw_write(&self.entries, SOURCE, "get");
            match entries.get(key) {
                None => Lookup::Absent,
                Some(entry) if deadline_passed(entry.expires_at, now) => {
                    entries.remove(key);
                    Lookup::Expired
                }
                Some(entry) => Lookup::Hit(entry.value.clone()),
            }
        };

        match outcome {
            Lookup::Hit(value) => {
                self.record_hit(key);
                Some(value)
            }
            Lookup::Expired => {
                counter!(METRIC_L1_EXPIRED_TOTAL).increment(1);
                self.record_miss(key);
                None
            }
            Lookup::Absent => {
                self.record_miss(key);
                None
            }
        }
    }

    /// Insert or overwrite an entry.
    ///
    /// A missing, zero, or negative `ttl_seconds` stores the entry without
    /// an expiry. Counters are not touched by writes.
    pub fn set(&self, key: impl Into<String>, value: CachedValue, ttl_seconds: Option<i64>) {
        let expires_at = ttl_seconds
            .filter(|secs| *secs > 0)
            .map(|secs| OffsetDateTime::now_utc() + Duration::seconds(secs));
        self.insert_with_deadline(key, value, expires_at);
    }

    pub(crate) fn insert_with_deadline(
        &self,
        key: impl Into<String>,
        value: CachedValue,
        expires_at: Option<OffsetDateTime>,
    ) {
        let mut entries = rw_write(&self.entries, SOURCE, "set");
        entries.insert(key.into(), MemoryEntry { value, expires_at });
    }

    /// Remove an entry if present.
    pub fn delete(&self, key: &str) {
        rw_write(&self.entries, SOURCE, "delete").remove(key);
    }

    /// Existence check with the same lazy-expiry side effect as [`get`],
    /// but without touching the hit/miss counters.
    ///
    /// [`get`]: MemoryStore::get
    pub fn has(&self, key: &str) -> bool {
        let now = OffsetDateTime::now_utc();
        let mut entries = rw_write(&self.entries, SOURCE, "has");
        match entries.get(key) {
            None => false,
            Some(entry) if deadline_passed(entry.expires_at, now) => {
                entries.remove(key);
                counter!(METRIC_L1_EXPIRED_TOTAL).increment(1);
                false
            }
            Some(_) => true,
        }
    }

    /// Number of live entries. Sweeps expired entries first so stale data
    /// never inflates the count.
    pub fn size(&self) -> usize {
        self.sweep_expired();
        rw_read(&self.entries, SOURCE, "size").len()
    }

    /// Evict every entry whose deadline has passed. Returns the number
    /// evicted. Shares its expiry predicate with the lazy path.
    pub fn sweep_expired(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut entries = rw_write(&self.entries, SOURCE, "sweep_expired");
        let before = entries.len();
        entries.retain(|_, entry| !deadline_passed(entry.expires_at, now));
        let evicted = before - entries.len();
        if evicted > 0 {
            counter!(METRIC_L1_EXPIRED_TOTAL).increment(evicted as u64);
        }
        evicted
    }

    /// Remove every entry whose key starts with `prefix`; returns the count
    /// removed. Counters for those keys are preserved: they describe lookup
    /// history, not entry lifetime.
    pub fn clear_prefix(&self, prefix: &str) -> usize {
        let mut entries = rw_write(&self.entries, SOURCE, "clear_prefix");
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    /// Remove all entries and reset all counters.
    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
        rw_write(&self.counters, SOURCE, "clear.counters").clear();
    }

    /// Counters for one key, or the sum across every key observed so far
    /// (including keys whose entries have since been evicted).
    pub fn stats(&self, key: Option<&str>) -> TierStats {
        let counters = rw_read(&self.counters, SOURCE, "stats");
        match key {
            Some(key) => {
                let counts = counters.get(key).copied().unwrap_or_default();
                TierStats::from_counts(counts.hits, counts.misses)
            }
            None => {
                let (hits, misses) = counters
                    .values()
                    .fold((0, 0), |(h, m), c| (h + c.hits, m + c.misses));
                TierStats::from_counts(hits, misses)
            }
        }
    }

    fn record_hit(&self, key: &str) {
        let mut counters = rw_write(&self.counters, SOURCE, "record_hit");
        counters.entry(key.to_string()).or_default().hits += 1;
        drop(counters);
        counter!(METRIC_L1_HIT_TOTAL).increment(1);
    }

    fn record_miss(&self, key: &str) {
        let mut counters = rw_write(&self.counters, SOURCE, "record_miss");
        counters.entry(key.to_string()).or_default().misses += 1;
        drop(counters);
        counter!(METRIC_L1_MISS_TOTAL).increment(1);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
