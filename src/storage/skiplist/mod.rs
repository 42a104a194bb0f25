//! Ordered in-memory index backing a memtable generation.
//!
//! A skip list keeps records sorted by key across a stack of linked levels.
//! Level 0 links every node; each higher level links a random subset of the
//! level below, so a lookup descends from the sparsest level and skips most
//! of the list:
//!
//! ```text
//! L2: HEAD ──────────────► c ─────────────────► NIL
//! L1: HEAD ──────► b ────► c ────────► e ─────► NIL
//! L0: HEAD ─► a ─► b ────► c ─► d ───► e ─────► NIL
//! ```
//!
//! Nodes live in an arena and link to each other by slot index. Every
//! comparison first checks a score packed from the leading key bytes and only
//! falls back to a byte comparison on a tie.
//!
//! All structure state sits behind one reader-writer lock: inserts hold it
//! exclusively for the whole descent and splice, searches share it. Shared
//! acquisitions are recursive so a thread holding an [`Iter`] can still
//! search while a writer is queued.

mod arena;
mod level;
mod score;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::{debug, trace, warn};

use self::arena::{Arena, NodeId};
use self::level::LevelGenerator;
use super::metrics::{default_metrics, SkipListMetrics};
use super::options::SkipListOptions;
use super::record::Entry;
use crate::types::format::MAX_SKIPLIST_LEVEL;
use crate::types::{Error, Result};

pub use self::score::{compare, score};

/// Concurrent ordered index of [`Entry`] records keyed by `Entry::key`.
pub struct SkipList {
    inner: RwLock<Inner>,
    max_level: usize,
    metrics: Arc<dyn SkipListMetrics>,
}

struct Inner {
    arena: Arena,
    levels: LevelGenerator,
    len: usize,
    size: u64,
    closed: bool,
}

impl SkipList {
    /// Creates an empty index with default options and an entropy seed.
    pub fn new() -> Self {
        Self::build(SkipListOptions::default())
    }

    /// Creates an empty index, rejecting invalid options.
    pub fn with_options(opts: SkipListOptions) -> Result<Self> {
        opts.validate()?;
        Ok(Self::build(opts))
    }

    fn build(opts: SkipListOptions) -> Self {
        debug!(
            max_level = opts.max_level,
            seeded = opts.seed.is_some(),
            "skiplist.create"
        );
        Self {
            inner: RwLock::new(Inner {
                arena: Arena::new(opts.max_level),
                levels: LevelGenerator::new(opts.seed),
                len: 0,
                size: 0,
                closed: false,
            }),
            max_level: opts.max_level,
            metrics: opts.metrics.unwrap_or_else(default_metrics),
        }
    }

    /// Inserts `entry` under its key.
    ///
    /// An existing record with the same key is replaced in place and
    /// returned; the distinct key count is unchanged and the size accounting
    /// swaps the old record's size for the new one.
    pub fn insert(&self, entry: Arc<Entry>) -> Result<Option<Arc<Entry>>> {
        if entry.key.is_empty() {
            return Err(Error::EmptyKey);
        }
        let score = score(&entry.key);

        let mut guard = self.inner.write();
        let inner = &mut *guard;
        if inner.closed {
            return Err(Error::Closed);
        }

        let mut preds = [NodeId::HEAD; MAX_SKIPLIST_LEVEL];
        let mut cursor = NodeId::HEAD;
        let mut level = self.max_level;
        while level > 0 {
            level -= 1;
            let mut next = inner.arena.next(cursor, level);
            while !next.is_nil() {
                let node = inner.arena.node(next);
                match compare(score, &entry.key, node.score, node.key()) {
                    Ordering::Greater => {
                        cursor = next;
                        next = inner.arena.next(cursor, level);
                    }
                    Ordering::Equal => return Ok(self.replace(inner, next, entry)),
                    Ordering::Less => break,
                }
            }
            preds[level] = cursor;
            // Levels below that link `cursor` to the node just rejected
            // would stop at once; reuse the predecessor without scanning.
            while level > 0 && inner.arena.next(cursor, level - 1) == next {
                level -= 1;
                preds[level] = cursor;
            }
        }

        let height = self.clamp_level(inner.levels.next_level());
        let size = entry.size();
        let id = inner.arena.alloc(score, entry, height)?;
        for (level, &pred) in preds.iter().enumerate().take(height) {
            let succ = inner.arena.next(pred, level);
            inner.arena.set_next(id, level, succ);
            inner.arena.set_next(pred, level, id);
        }
        inner.len += 1;
        inner.size += size;
        drop(guard);

        trace!(height, size, "skiplist.insert");
        self.metrics.inserted();
        Ok(None)
    }

    fn replace(&self, inner: &mut Inner, id: NodeId, entry: Arc<Entry>) -> Option<Arc<Entry>> {
        let new_size = entry.size();
        let old = inner.arena.node_mut(id).entry.replace(entry);
        let old_size = old.as_ref().map_or(0, |e| e.size());
        inner.size = inner.size - old_size + new_size;
        trace!(old_size, new_size, "skiplist.insert.update");
        self.metrics.updated();
        old
    }

    fn clamp_level(&self, drawn: usize) -> usize {
        if drawn > self.max_level {
            warn!(drawn, max_level = self.max_level, "skiplist.level.clamped");
            self.metrics.level_clamped();
            return self.max_level;
        }
        drawn
    }

    /// Returns the record stored under `key`, if any.
    pub fn search(&self, key: &[u8]) -> Option<Arc<Entry>> {
        let found = self.find(key);
        trace!(hit = found.is_some(), "skiplist.search");
        self.metrics.searched(found.is_some());
        found
    }

    fn find(&self, key: &[u8]) -> Option<Arc<Entry>> {
        let inner = self.inner.read_recursive();
        if inner.len == 0 {
            return None;
        }
        let score = score(key);
        let mut cursor = NodeId::HEAD;
        let mut level = self.max_level;
        while level > 0 {
            level -= 1;
            let mut next = inner.arena.next(cursor, level);
            while !next.is_nil() {
                let node = inner.arena.node(next);
                match compare(score, key, node.score, node.key()) {
                    Ordering::Greater => {
                        cursor = next;
                        next = inner.arena.next(cursor, level);
                    }
                    Ordering::Equal => return node.entry.clone(),
                    Ordering::Less => break,
                }
            }
            while level > 0 && inner.arena.next(cursor, level - 1) == next {
                level -= 1;
            }
        }
        None
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find(key).is_some()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.read_recursive().len
    }

    /// Whether the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of [`Entry::size`] over every stored record.
    pub fn size(&self) -> u64 {
        self.inner.read_recursive().size
    }

    /// Tower height ceiling.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Whether [`SkipList::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.inner.read_recursive().closed
    }

    /// Releases every node and rejects further inserts. Idempotent.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.closed {
            return Ok(());
        }
        let released = inner.len;
        inner.arena.reset(self.max_level);
        inner.len = 0;
        inner.size = 0;
        inner.closed = true;
        debug!(released, "skiplist.close");
        Ok(())
    }

    /// Iterates records in ascending key order.
    ///
    /// The iterator holds the read lock until dropped, so inserts from other
    /// threads wait for it. The holder may keep calling the shared accessors;
    /// calling [`SkipList::insert`] or [`SkipList::close`] from the same
    /// thread deadlocks.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.inner.read_recursive(),
            cursor: NodeId::HEAD,
        }
    }

    /// Copies out every record in ascending key order.
    pub fn entries(&self) -> Vec<Arc<Entry>> {
        self.iter().collect()
    }

    /// Walks every level and checks ordering, the express-lane subsequence
    /// property, tower heights and the length and size counters.
    pub fn check_invariants(&self) -> Result<()> {
        let inner = self.inner.read_recursive();
        let arena = &inner.arena;

        let mut lower: Option<HashSet<NodeId>> = None;
        for level in 0..self.max_level {
            let mut members = HashSet::new();
            let mut prev: Option<NodeId> = None;
            let mut cursor = arena.next(NodeId::HEAD, level);
            while !cursor.is_nil() {
                let node = arena.node(cursor);
                if node.height() == 0 || node.height() > self.max_level {
                    return Err(Error::Corruption("tower height out of range"));
                }
                if let Some(prev) = prev {
                    let p = arena.node(prev);
                    if compare(p.score, p.key(), node.score, node.key()) != Ordering::Less {
                        return Err(Error::Corruption("level chain not strictly increasing"));
                    }
                }
                if let Some(lower) = &lower {
                    if !lower.contains(&cursor) {
                        return Err(Error::Corruption("node missing from lower level"));
                    }
                }
                members.insert(cursor);
                prev = Some(cursor);
                cursor = arena.next(cursor, level);
            }
            if level == 0 {
                if members.len() != inner.len {
                    return Err(Error::Corruption("length counter disagrees with level 0"));
                }
                let size: u64 = members
                    .iter()
                    .filter_map(|id| arena.node(*id).entry.as_ref())
                    .map(|e| e.size())
                    .sum();
                if size != inner.size {
                    return Err(Error::Corruption("size counter disagrees with level 0"));
                }
            }
            lower = Some(members);
        }
        if inner.len + 1 != arena.slots() {
            return Err(Error::Corruption("unlinked node in arena"));
        }
        Ok(())
    }

    #[cfg(test)]
    fn tower_heights(&self) -> Vec<usize> {
        let inner = self.inner.read_recursive();
        let mut heights = Vec::with_capacity(inner.len);
        let mut cursor = inner.arena.next(NodeId::HEAD, 0);
        while !cursor.is_nil() {
            heights.push(inner.arena.node(cursor).height());
            cursor = inner.arena.next(cursor, 0);
        }
        heights
    }
}

impl Default for SkipList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SkipList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read_recursive();
        f.debug_struct("SkipList")
            .field("len", &inner.len)
            .field("size", &inner.size)
            .field("max_level", &self.max_level)
            .field("closed", &inner.closed)
            .finish()
    }
}

/// Level-0 walk returned by [`SkipList::iter`].
pub struct Iter<'a> {
    inner: RwLockReadGuard<'a, Inner>,
    cursor: NodeId,
}

impl Iterator for Iter<'_> {
    type Item = Arc<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.arena.next(self.cursor, 0);
        if next.is_nil() {
            return None;
        }
        self.cursor = next;
        self.inner.arena.node(next).entry.clone()
    }
}
