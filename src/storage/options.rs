use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::metrics::SkipListMetrics;
use crate::types::format::{DEFAULT_MAX_LEVEL, DEFAULT_VALUE_THRESHOLD, MAX_SKIPLIST_LEVEL};
use crate::types::{Error, Result};

/// Default flush threshold for one memtable generation (64 MiB).
pub const DEFAULT_MEMTABLE_SIZE: u64 = 64 << 20;

/// Configuration supplied when creating a [`super::SkipList`].
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipListOptions {
    /// Ceiling on tower height, header included.
    pub max_level: usize,
    /// Seed for the level generator; `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Optional metrics sink.
    #[serde(skip)]
    pub metrics: Option<Arc<dyn SkipListMetrics>>,
}

impl SkipListOptions {
    /// Sets the tower height ceiling.
    pub fn max_level(mut self, levels: usize) -> Self {
        self.max_level = levels;
        self
    }

    /// Seeds the level generator for reproducible layouts.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn SkipListMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Rejects settings the index cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_level == 0 || self.max_level > MAX_SKIPLIST_LEVEL {
            return Err(Error::InvalidOption(format!(
                "max_level must be within 1..={MAX_SKIPLIST_LEVEL}"
            )));
        }
        Ok(())
    }
}

impl Default for SkipListOptions {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            seed: None,
            metrics: None,
        }
    }
}

impl fmt::Debug for SkipListOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkipListOptions")
            .field("max_level", &self.max_level)
            .field("seed", &self.seed)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

/// Configuration for one memtable generation.
///
/// Loadable from TOML:
///
/// ```toml
/// id = 3
/// memtable_size = 1048576
/// value_threshold = 1024
///
/// [skiplist]
/// max_level = 32
/// seed = 7
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MemtableOptions {
    /// Generation id assigned by the memtable manager.
    pub id: u64,
    /// Estimated flushed footprint at which the generation reports full.
    pub memtable_size: u64,
    /// Values at or above this size are counted as value-log pointers.
    pub value_threshold: usize,
    /// Options for the underlying ordered index.
    pub skiplist: SkipListOptions,
}

impl MemtableOptions {
    /// Sets the generation id.
    pub fn id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Sets the flush threshold in bytes.
    pub fn memtable_size(mut self, bytes: u64) -> Self {
        self.memtable_size = bytes;
        self
    }

    /// Sets the inline value threshold in bytes.
    pub fn value_threshold(mut self, bytes: usize) -> Self {
        self.value_threshold = bytes;
        self
    }

    /// Replaces the skip list options.
    pub fn skiplist(mut self, opts: SkipListOptions) -> Self {
        self.skiplist = opts;
        self
    }

    /// Rejects settings the memtable cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.memtable_size == 0 {
            return Err(Error::InvalidOption("memtable_size must be non-zero".into()));
        }
        if self.value_threshold == 0 {
            return Err(Error::InvalidOption("value_threshold must be non-zero".into()));
        }
        self.skiplist.validate()
    }

    /// Parses options from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let opts: Self = toml::from_str(src)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reads and parses a TOML options file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let src = fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }
}

impl Default for MemtableOptions {
    fn default() -> Self {
        Self {
            id: 0,
            memtable_size: DEFAULT_MEMTABLE_SIZE,
            value_threshold: DEFAULT_VALUE_THRESHOLD,
            skiplist: SkipListOptions::default(),
        }
    }
}
