//! One generation of buffered writes in front of the table layer.
//!
//! A memtable accepts writes while *writable*, is sealed once it reaches its
//! flush threshold, and keeps serving reads from its skip list until the
//! flush pipeline has drained it.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::options::MemtableOptions;
use super::record::Entry;
use super::skiplist::{Iter, SkipList};
use crate::types::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Writable,
    Sealed,
}

/// Mutable write buffer backed by a [`SkipList`].
pub struct Memtable {
    id: u64,
    table: SkipList,
    state: RwLock<State>,
    // Signed so that concurrent updates of one key may briefly overshoot
    // below zero without wrapping.
    footprint: AtomicI64,
    memtable_size: u64,
    value_threshold: usize,
}

impl Memtable {
    /// Creates an empty writable generation.
    pub fn new(opts: MemtableOptions) -> Result<Self> {
        opts.validate()?;
        let table = SkipList::with_options(opts.skiplist)?;
        debug!(
            id = opts.id,
            memtable_size = opts.memtable_size,
            "memtable.create"
        );
        Ok(Self {
            id: opts.id,
            table,
            state: RwLock::new(State::Writable),
            footprint: AtomicI64::new(0),
            memtable_size: opts.memtable_size,
            value_threshold: opts.value_threshold,
        })
    }

    /// Generation id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Buffers `entry`, returning the record it replaced.
    ///
    /// Fails with [`Error::Sealed`] once the generation is sealed.
    pub fn put(&self, entry: impl Into<Arc<Entry>>) -> Result<Option<Arc<Entry>>> {
        let entry = entry.into();
        let state = self.state.read();
        if *state == State::Sealed {
            return Err(Error::Sealed);
        }
        let added = entry.estimate_size(self.value_threshold) as i64;
        let old = self.table.insert(entry)?;
        let removed = old
            .as_ref()
            .map_or(0, |e| e.estimate_size(self.value_threshold) as i64);
        self.footprint.fetch_add(added - removed, Ordering::Relaxed);
        drop(state);

        trace!(id = self.id, added, removed, "memtable.put");
        Ok(old)
    }

    /// Returns the record stored under `key`, expired or not.
    pub fn get(&self, key: &[u8]) -> Option<Arc<Entry>> {
        self.table.search(key)
    }

    /// Returns the record stored under `key` unless it expired before `now`
    /// (seconds since the Unix epoch).
    pub fn get_at(&self, key: &[u8], now: u64) -> Option<Arc<Entry>> {
        self.table.search(key).filter(|e| !e.is_expired(now))
    }

    /// Stops accepting writes. Idempotent.
    ///
    /// Waits for in-flight puts to finish, so every write that returned `Ok`
    /// is visible to readers of the sealed generation.
    pub fn seal(&self) {
        let mut state = self.state.write();
        if *state == State::Sealed {
            return;
        }
        *state = State::Sealed;
        debug!(
            id = self.id,
            len = self.table.len(),
            footprint = self.footprint(),
            "memtable.seal"
        );
    }

    /// Whether [`Memtable::seal`] has run.
    pub fn is_sealed(&self) -> bool {
        *self.state.read_recursive() == State::Sealed
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no keys are buffered.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Raw key plus value bytes held by the index.
    pub fn size(&self) -> u64 {
        self.table.size()
    }

    /// Estimated bytes this generation occupies once flushed.
    pub fn footprint(&self) -> u64 {
        self.footprint.load(Ordering::Relaxed).max(0) as u64
    }

    /// Whether the estimated flushed footprint reached the flush threshold.
    pub fn is_full(&self) -> bool {
        self.footprint() >= self.memtable_size
    }

    /// Ordered iteration for the flush pipeline.
    ///
    /// Reads stay available to the holder while a seal or close is queued;
    /// a [`Memtable::put`] from the holding thread deadlocks.
    pub fn iter(&self) -> Iter<'_> {
        self.table.iter()
    }

    /// The underlying index.
    pub fn skiplist(&self) -> &SkipList {
        &self.table
    }

    /// Seals the generation and releases the index.
    pub fn close(&self) -> Result<()> {
        self.seal();
        self.table.close()?;
        self.footprint.store(0, Ordering::Relaxed);
        debug!(id = self.id, "memtable.close");
        Ok(())
    }
}

impl fmt::Debug for Memtable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memtable")
            .field("id", &self.id)
            .field("state", &*self.state.read_recursive())
            .field("footprint", &self.footprint())
            .field("memtable_size", &self.memtable_size)
            .field("table", &self.table)
            .finish()
    }
}
