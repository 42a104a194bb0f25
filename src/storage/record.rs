use bytes::Bytes;

use crate::types::format::VALUE_POINTER_SIZE;

/// Size in bytes of the metadata flag stored with every record.
pub const META_SIZE: usize = 1;

/// Meta bit marking a record whose value lives in the value log.
pub const BIT_VALUE_POINTER: u8 = 1 << 1;

/// One key/value pair as handed to the memtable.
///
/// Records are shared with the index through `Arc<Entry>`; the index never
/// copies the key or value bytes. `Bytes` is immutable, so the key cannot
/// change underneath the ordering once inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Ordering and equality key.
    pub key: Bytes,
    /// Payload bytes.
    pub value: Bytes,
    /// Expiry as seconds since the Unix epoch, `0` for never.
    pub expires_at: u64,
    /// Flag byte interpreted by the value log and table layers.
    pub meta: u8,
    /// Version assigned by the write path.
    pub version: u64,
}

impl Entry {
    /// Creates a record with no expiry, no meta flags and version zero.
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            expires_at: 0,
            meta: 0,
            version: 0,
        }
    }

    /// Sets the expiry timestamp.
    pub fn with_expires_at(mut self, expires_at: u64) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Sets the meta flag byte.
    pub fn with_meta(mut self, meta: u8) -> Self {
        self.meta = meta;
        self
    }

    /// Sets the version.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Key plus value length in bytes.
    pub fn size(&self) -> u64 {
        (self.key.len() + self.value.len()) as u64
    }

    /// Bytes this record occupies once flushed.
    ///
    /// Values shorter than `value_threshold` stay inline next to the key;
    /// larger ones are replaced by a value pointer.
    pub fn estimate_size(&self, value_threshold: usize) -> u64 {
        let value = if self.value_is_inline(value_threshold) {
            self.value.len()
        } else {
            VALUE_POINTER_SIZE
        };
        (self.key.len() + value + META_SIZE) as u64
    }

    /// Whether the value stays next to the key when flushed.
    pub fn value_is_inline(&self, value_threshold: usize) -> bool {
        self.value.len() < value_threshold
    }

    /// Whether the record carries an expiry that is at or before `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at != 0 && self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::format::DEFAULT_VALUE_THRESHOLD;

    #[test]
    fn size_counts_key_and_value() {
        let e = Entry::new("ab", "ccc");
        assert_eq!(e.size(), 5);
        assert_eq!(Entry::new("", "").size(), 0);
    }

    #[test]
    fn estimate_size_switches_to_pointer() {
        let small = Entry::new("key", vec![0u8; 10]);
        assert_eq!(small.estimate_size(DEFAULT_VALUE_THRESHOLD), 3 + 10 + 1);

        let large = Entry::new("key", vec![0u8; DEFAULT_VALUE_THRESHOLD]);
        assert!(!large.value_is_inline(DEFAULT_VALUE_THRESHOLD));
        assert_eq!(
            large.estimate_size(DEFAULT_VALUE_THRESHOLD),
            (3 + VALUE_POINTER_SIZE + 1) as u64
        );
    }

    #[test]
    fn expiry() {
        let e = Entry::new("k", "v");
        assert!(!e.is_expired(u64::MAX));
        let e = e.with_expires_at(100);
        assert!(!e.is_expired(99));
        assert!(e.is_expired(100));
    }
}
