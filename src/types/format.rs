//! Constants shared with the on-disk layers that consume flushed memtables.
//!
//! Nothing in the in-memory index reads these; they live here so table
//! writers, the manifest and the value log agree on one definition.

use std::fs::OpenOptions;

/// Tag stamped at the head of every persisted table.
pub const MAGIC_TEXT: [u8; 4] = *b"HARD";
/// Format version written next to [`MAGIC_TEXT`].
pub const MAGIC_VERSION: u32 = 1;

/// Name of the live manifest file.
pub const MANIFEST_FILENAME: &str = "MANIFEST";
/// Name of the manifest written during a rewrite before it is renamed over
/// [`MANIFEST_FILENAME`].
pub const MANIFEST_REWRITE_FILENAME: &str = "REWRITEMANIFEST";

/// Permission bits for newly created engine files.
pub const DEFAULT_FILE_MODE: u32 = 0o666;

/// Values at or above this many bytes are stored out of line in the value log.
pub const DEFAULT_VALUE_THRESHOLD: usize = 1024;

/// Number of levels in the LSM tree below the memtable.
pub const MAX_LEVEL_NUM: usize = 7;

/// Default ceiling on skip list tower height.
pub const DEFAULT_MAX_LEVEL: usize = 48;

/// Largest tower height a skip list accepts.
pub const MAX_SKIPLIST_LEVEL: usize = 64;

/// Encoded size of a value-log pointer: file id, length and offset as `u32`.
pub const VALUE_POINTER_SIZE: usize = 12;

/// Open options for engine files: read, write, create and append.
pub fn default_open_options() -> OpenOptions {
    let mut opts = OpenOptions::new();
    opts.read(true).write(true).create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(DEFAULT_FILE_MODE);
    }
    opts
}
