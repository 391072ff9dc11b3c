//! Analytics service: cache-through aggregation with soft failures
//!
//! A failing query never aborts a render pass. The affected section comes
//! back empty with a notice, and nothing is memoized for it.

use std::sync::Arc;

use scad_common::Result;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::cache::{CacheKey, QueryCache};
use crate::db::Store;
use crate::filter::{FilterSet, YearBounds};
use crate::query::{self, Operation, RankingKind, ResultTable};

/// One named result table of a render pass
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub operation: Operation,
    pub table: Arc<ResultTable>,
    /// Set when the query failed; `table` is then empty
    pub notice: Option<String>,
}

impl Section {
    pub fn is_degraded(&self) -> bool {
        self.notice.is_some()
    }
}

/// Every section of one dashboard render pass, in display order
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub filter: FilterSet,
    pub bounds: YearBounds,
    pub sections: Vec<Section>,
}

/// Operations of a full render pass, in display order
pub fn dashboard_operations(limit: i64) -> Vec<Operation> {
    let mut operations: Vec<Operation> = RankingKind::ALL
        .into_iter()
        .map(|kind| Operation::Ranking { kind, limit })
        .collect();
    operations.extend([
        Operation::ProductionCountries,
        Operation::DecadeHistogram,
        Operation::AgeCertificationTop,
        Operation::TopSeasonsShows { limit },
        Operation::AverageScoresByType,
    ]);
    operations
}

#[derive(Clone)]
pub struct Analytics {
    store: Store,
    cache: Arc<QueryCache>,
    bounds: Arc<OnceCell<YearBounds>>,
}

impl Analytics {
    pub fn new(store: Store, cache: Arc<QueryCache>) -> Self {
        Self {
            store,
            cache,
            bounds: Arc::new(OnceCell::new()),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Run `operation`, serving repeated argument tuples from the cache
    ///
    /// Errors propagate; see [`Analytics::run`] for the soft variant.
    pub async fn table(&self, operation: Operation, filter: FilterSet) -> Result<Arc<ResultTable>> {
        let key = CacheKey::new(operation, filter);
        if let Some(table) = self.cache.get(&key) {
            debug!(operation = operation.name(), "Cache hit");
            return Ok(table);
        }

        debug!(operation = operation.name(), "Cache miss");
        let table = query::execute(&self.store, &operation, &filter).await?;
        Ok(self.cache.insert(key, table))
    }

    /// Run `operation`, converting a failure into an empty section with a notice
    pub async fn run(&self, operation: Operation, filter: FilterSet) -> Section {
        match self.table(operation, filter).await {
            Ok(table) => Section {
                operation,
                table,
                notice: None,
            },
            Err(e) => {
                warn!(operation = operation.name(), "Query failed: {}", e);
                Section {
                    operation,
                    table: Arc::new(ResultTable::empty_for(&operation)),
                    notice: Some(format!("No data available: {}", e)),
                }
            }
        }
    }

    /// Observed year range, falling back to constants when it cannot be read
    ///
    /// Only a successful lookup is remembered.
    pub async fn year_bounds(&self) -> YearBounds {
        let result = self
            .bounds
            .get_or_try_init(|| query::year_bounds(&self.store))
            .await;
        match result {
            Ok(bounds) => *bounds,
            Err(e) => {
                warn!("Year range lookup failed, using fallback bounds: {}", e);
                YearBounds::default()
            }
        }
    }

    /// One full render pass; sections run one after another
    pub async fn dashboard(&self, filter: FilterSet, limit: i64) -> Dashboard {
        let bounds = self.year_bounds().await;
        let mut sections = Vec::new();
        for operation in dashboard_operations(limit) {
            sections.push(self.run(operation, filter).await);
        }

        Dashboard {
            filter,
            bounds,
            sections,
        }
    }
}
