//! Bounded FIFO containers
//!
//! `BoundedFifo` keeps values by key in insertion order and drops the oldest
//! key once capacity is exceeded. Re-inserting a live key replaces its value
//! without refreshing its age.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct BoundedFifo<K, V> {
    order: VecDeque<K>,
    entries: HashMap<K, V>,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> BoundedFifo<K, V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a value, returning the evicted oldest entry if the bound was hit
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return None;
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);

        if self.order.len() > self.capacity {
            let oldest = self.order.pop_front()?;
            let value = self.entries.remove(&oldest)?;
            return Some((oldest, value));
        }

        None
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Oldest key still retained
    pub fn oldest(&self) -> Option<&K> {
        self.order.front()
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order.iter().filter_map(|k| self.entries.get(k).map(|v| (k, v)))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}

/// A cached analysis record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub entry_type: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}

impl CacheEntry {
    pub fn new(entry_type: impl Into<String>, data: serde_json::Value, source: impl Into<String>) -> Self {
        Self { entry_type: entry_type.into(), data, timestamp: Utc::now(), source: source.into() }
    }
}

/// Recent-analysis cache keyed by `"{type}:{source}"`
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    entries: BoundedFifo<String, CacheEntry>,
}

impl AnalysisCache {
    pub fn new(capacity: usize) -> Self {
        Self { entries: BoundedFifo::new(capacity) }
    }

    pub fn record(&mut self, entry: CacheEntry) {
        let key = format!("{}:{}", entry.entry_type, entry.source);
        if let Some((evicted, _)) = self.entries.insert(key, entry) {
            debug!("Analysis cache full, evicted {}", evicted);
        }
    }

    pub fn get(&self, entry_type: &str, source: &str) -> Option<&CacheEntry> {
        self.entries.get(&format!("{}:{}", entry_type, source))
    }

    /// Most recent entries first
    pub fn recent(&self, limit: usize) -> Vec<CacheEntry> {
        let mut entries: Vec<_> = self.entries.values().cloned().collect();
        entries.reverse();
        entries.truncate(limit);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hundred_and_first_insert_evicts_oldest() {
        let mut fifo = BoundedFifo::new(100);
        for i in 0..100 {
            assert!(fifo.insert(i, i * 10).is_none());
        }
        assert_eq!(fifo.len(), 100);

        let evicted = fifo.insert(100, 1000);
        assert_eq!(evicted, Some((0, 0)));
        assert_eq!(fifo.len(), 100);
        assert!(!fifo.contains_key(&0));
        assert_eq!(fifo.oldest(), Some(&1));
        assert_eq!(fifo.get(&100), Some(&1000));
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut fifo = BoundedFifo::new(2);
        fifo.insert("a", 1);
        fifo.insert("b", 2);
        fifo.insert("a", 3);
        assert_eq!(fifo.get(&"a"), Some(&3));

        let evicted = fifo.insert("c", 4);
        assert_eq!(evicted, Some(("a", 3)));
        let keys: Vec<_> = fifo.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["b", "c"]);
    }

    #[test]
    fn test_analysis_cache_recent_order() {
        let mut cache = AnalysisCache::new(100);
        cache.record(CacheEntry::new("classification", serde_json::json!(1), "a.tsx"));
        cache.record(CacheEntry::new("classification", serde_json::json!(2), "b.tsx"));

        let recent = cache.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].source, "b.tsx");
        assert_eq!(cache.get("classification", "a.tsx").map(|e| e.data.clone()), Some(serde_json::json!(1)));
    }

    #[test]
    fn test_analysis_cache_capacity() {
        let mut cache = AnalysisCache::new(100);
        for i in 0..101 {
            cache.record(CacheEntry::new("classification", serde_json::json!(i), format!("f{}.ts", i)));
        }
        assert_eq!(cache.len(), 100);
        assert!(cache.get("classification", "f0.ts").is_none());
        assert!(cache.get("classification", "f1.ts").is_some());
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(capacity in 1usize..64, keys in proptest::collection::vec(0u32..200, 0..300)) {
            let mut fifo = BoundedFifo::new(capacity);
            for k in keys {
                fifo.insert(k, ());
                prop_assert!(fifo.len() <= capacity);
            }
        }
    }
}
