use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use crate::query::ast::Query;
use crate::search::results::SearchResults;

/// Query cache for avoiding recomputation
pub struct QueryCache {
    cache: Mutex<LruCache<QueryKey, SearchResults>>,
    pub capacity: usize,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct QueryKey {
    pub query: Query,
    pub limit: usize,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        QueryCache {
            cache: Mutex::new(LruCache::new(cap)),
            capacity,
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, key: &QueryKey) -> Option<SearchResults> {
        let mut cache = self.cache.lock();
        if let Some(results) = cache.get(key) {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
            Some(results.clone())
        } else {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    pub fn put(&self, key: QueryKey, results: SearchResults) {
        let mut cache = self.cache.lock();
        cache.put(key, results);
    }

    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.cache.lock().len(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(total: usize) -> SearchResults {
        SearchResults {
            hits: Vec::new(),
            total_hits: total,
            max_score: 0.0,
            took_ms: 0,
        }
    }

    #[test]
    fn hit_and_miss_accounting() {
        let cache = QueryCache::new(4);
        let key = QueryKey { query: Query::term("body", "rust"), limit: 10 };

        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), results(3));
        assert_eq!(cache.get(&key).unwrap().total_hits, 3);

        let stats = cache.stats();
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn limit_is_part_of_the_key() {
        let cache = QueryCache::new(4);
        let ten = QueryKey { query: Query::term("body", "rust"), limit: 10 };
        let twenty = QueryKey { query: Query::term("body", "rust"), limit: 20 };

        cache.put(ten.clone(), results(10));
        assert!(cache.get(&twenty).is_none());
        assert!(cache.get(&ten).is_some());
    }
}
