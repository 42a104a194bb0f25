//! Shared error type, checksum helpers and on-disk format constants.

pub mod checksum;
pub mod format;

pub use checksum::{crc32c, verify_crc32c, Checksum, Crc32c};

/// Errors surfaced by the memtable and its ordered index.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// IO failure while loading configuration.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed TOML configuration.
    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
    /// A record with an empty key was offered to the index.
    #[error("empty key")]
    EmptyKey,
    /// The index has been closed and its nodes released.
    #[error("skiplist closed")]
    Closed,
    /// The memtable generation is sealed and only serves reads.
    #[error("memtable sealed")]
    Sealed,
    /// The node arena ran out of addressable slots.
    #[error("skiplist arena full")]
    ArenaFull,
    /// A structural invariant of the index does not hold.
    #[error("corruption: {0}")]
    Corruption(&'static str),
    /// A configuration value was rejected.
    #[error("invalid option: {0}")]
    InvalidOption(String),
    /// Stored and computed checksums disagree.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum recorded alongside the data.
        expected: u32,
        /// Checksum computed over the data.
        actual: u32,
    },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
