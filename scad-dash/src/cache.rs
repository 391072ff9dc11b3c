//! Memoization of aggregation results
//!
//! Keyed by the operation (which carries its limit) and the filter set. For
//! operations that pick their own content type, the filter's content type is
//! dropped from the key.
//! Entries live for the lifetime of the cache: there is no eviction and no
//! invalidation, which is only sound because the catalog is read-only.
//!
//! Concurrent misses on the same key may both compute; the results are
//! interchangeable and the last insert wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::filter::{ContentTypeFilter, FilterSet};
use crate::query::{Operation, ResultTable};

/// Full argument tuple of one aggregation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub operation: Operation,
    pub filter: FilterSet,
}

impl CacheKey {
    pub fn new(operation: Operation, filter: FilterSet) -> Self {
        let filter = if operation.fixes_type() {
            filter.with_content_type(ContentTypeFilter::All)
        } else {
            filter
        };
        Self { operation, filter }
    }
}

/// Shared, unbounded result cache
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, Arc<ResultTable>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<ResultTable>> {
        // A poisoned lock only means a writer panicked mid-insert; the map is still usable
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn insert(&self, key: CacheKey, table: ResultTable) -> Arc<ResultTable> {
        let table = Arc::new(table);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, Arc::clone(&table));
        table
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CertificationCount, RankingKind};

    fn certifications(count: i64) -> ResultTable {
        ResultTable::Certifications(vec![CertificationCount {
            age_certification: "R".to_string(),
            count,
        }])
    }

    #[test]
    fn test_hit_after_insert() {
        let cache = QueryCache::new();
        let key = CacheKey::new(Operation::AgeCertificationTop, FilterSet::default());

        assert!(cache.get(&key).is_none());
        cache.insert(key, certifications(3));
        assert_eq!(*cache.get(&key).unwrap(), certifications(3));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_distinguish_limit_and_filter() {
        let cache = QueryCache::new();
        let top5 = Operation::ranking(RankingKind::TopMovies, 5);
        let top10 = Operation::ranking(RankingKind::TopMovies, 10);
        let recent = FilterSet::default().with_years(Some(2000), None);

        cache.insert(CacheKey::new(top5, FilterSet::default()), ResultTable::Rankings(vec![]));

        assert!(cache.get(&CacheKey::new(top10, FilterSet::default())).is_none());
        assert!(cache.get(&CacheKey::new(top5, recent)).is_none());
        assert!(cache.get(&CacheKey::new(top5, FilterSet::default())).is_some());
    }

    #[test]
    fn test_content_type_ignored_for_fixed_type_operations() {
        let shows = FilterSet::default().with_content_type(ContentTypeFilter::Show);
        let top = Operation::ranking(RankingKind::TopMovies, 10);
        let seasons = Operation::TopSeasonsShows { limit: 10 };

        assert_eq!(CacheKey::new(top, shows), CacheKey::new(top, FilterSet::default()));
        assert_eq!(
            CacheKey::new(seasons, shows),
            CacheKey::new(seasons, FilterSet::default())
        );
        assert_ne!(
            CacheKey::new(Operation::AverageScoresByType, shows),
            CacheKey::new(Operation::AverageScoresByType, FilterSet::default())
        );
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = QueryCache::new();
        let key = CacheKey::new(Operation::AgeCertificationTop, FilterSet::default());

        cache.insert(key, certifications(1));
        cache.insert(key, certifications(2));
        assert_eq!(*cache.get(&key).unwrap(), certifications(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = QueryCache::new();
        cache.insert(
            CacheKey::new(Operation::DecadeHistogram, FilterSet::default()),
            ResultTable::Decades(vec![]),
        );
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(QueryCache::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let key = CacheKey::new(Operation::AgeCertificationTop, FilterSet::default());
                    cache.insert(key, certifications(i));
                    cache.get(&key).is_some()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(cache.len(), 1);
    }
}
