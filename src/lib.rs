//! In-memory write buffer for an LSM key-value engine.
//!
//! Writes land in a [`Memtable`] generation whose records are ordered by a
//! concurrent [`SkipList`]. Once a generation reaches its flush threshold it
//! is sealed and drained in key order by the table layer.
//!
//! ```
//! use memlane::{Entry, Memtable, MemtableOptions};
//!
//! let mem = Memtable::new(MemtableOptions::default())?;
//! mem.put(Entry::new("bob", "1"))?;
//! mem.put(Entry::new("alice", "2"))?;
//! assert_eq!(mem.get(b"bob").unwrap().value, "1");
//! let keys: Vec<_> = mem.iter().map(|e| e.key.clone()).collect();
//! assert_eq!(keys, ["alice", "bob"]);
//! # Ok::<(), memlane::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod storage;
pub mod types;

pub use storage::{Entry, Memtable, MemtableOptions, SkipList, SkipListOptions};
pub use types::{Error, Result};
