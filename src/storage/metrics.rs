use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for tracking skip list operations.
///
/// Implementations must be cheap: hooks run on every insert and search,
/// outside the structure lock.
pub trait SkipListMetrics: Send + Sync {
    /// Records a new key spliced into the index.
    fn inserted(&self);

    /// Records an existing key whose record was replaced in place.
    fn updated(&self);

    /// Records a point lookup.
    ///
    /// # Parameters
    /// * `hit` - Whether the key was found.
    fn searched(&self, hit: bool);

    /// Records a level draw that exceeded the configured maximum.
    fn level_clamped(&self);
}

/// A no-op implementation of [`SkipListMetrics`] that discards all recorded metrics.
#[derive(Default)]
pub struct NoopMetrics;

impl SkipListMetrics for NoopMetrics {
    fn inserted(&self) {}
    fn updated(&self) {}
    fn searched(&self, _hit: bool) {}
    fn level_clamped(&self) {}
}

/// A thread-safe counter-based implementation of [`SkipListMetrics`].
#[derive(Default)]
pub struct CounterMetrics {
    /// Number of new keys inserted.
    pub inserts: AtomicU64,

    /// Number of in-place record replacements.
    pub updates: AtomicU64,

    /// Number of lookups that found their key.
    pub search_hits: AtomicU64,

    /// Number of lookups that did not.
    pub search_misses: AtomicU64,

    /// Number of level draws clamped to the ceiling.
    pub levels_clamped: AtomicU64,
}

/// Point-in-time copy of [`CounterMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkipListMetricsSnapshot {
    /// Number of new keys inserted.
    pub inserts: u64,
    /// Number of in-place record replacements.
    pub updates: u64,
    /// Number of lookups that found their key.
    pub search_hits: u64,
    /// Number of lookups that did not.
    pub search_misses: u64,
    /// Number of level draws clamped to the ceiling.
    pub levels_clamped: u64,
}

impl CounterMetrics {
    /// Reads every counter.
    pub fn snapshot(&self) -> SkipListMetricsSnapshot {
        SkipListMetricsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            search_hits: self.search_hits.load(Ordering::Relaxed),
            search_misses: self.search_misses.load(Ordering::Relaxed),
            levels_clamped: self.levels_clamped.load(Ordering::Relaxed),
        }
    }
}

impl SkipListMetrics for CounterMetrics {
    fn inserted(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    fn updated(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    fn searched(&self, hit: bool) {
        if hit {
            self.search_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.search_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn level_clamped(&self) {
        self.levels_clamped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Returns the default metrics implementation wrapped in an [`Arc`].
pub fn default_metrics() -> Arc<dyn SkipListMetrics> {
    Arc::new(NoopMetrics)
}
