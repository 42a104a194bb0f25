//! Memtable storage layer.
//!
//! Holds the record type, the skip list index that orders records by key and
//! the memtable generation built on top of it, along with their options and
//! metrics hooks.

/// Ordered in-memory index.
///
/// Arena-backed skip list with prefix scoring and a single reader-writer lock.
pub mod skiplist;

mod memtable;
mod metrics;
mod options;
mod record;

/// Write buffer generation.
pub use memtable::Memtable;

/// Metrics hooks for the index.
pub use metrics::{
    default_metrics, CounterMetrics, NoopMetrics, SkipListMetrics, SkipListMetricsSnapshot,
};

/// Index and memtable configuration.
pub use options::{MemtableOptions, SkipListOptions, DEFAULT_MEMTABLE_SIZE};

/// Records stored in the index.
pub use record::{Entry, BIT_VALUE_POINTER, META_SIZE};

pub use skiplist::SkipList;
