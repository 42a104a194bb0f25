//! Castagnoli CRC32 helpers for flushed tables and manifests.

#![forbid(unsafe_code)]

use crc::{Crc, Digest, CRC_32_ISCSI};

use super::{Error, Result};

/// CRC32 table built from the Castagnoli polynomial.
pub static CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

/// Streaming checksum over a sequence of byte slices.
pub trait Checksum {
    /// Discards everything fed so far.
    fn reset(&mut self);
    /// Feeds more bytes into the running checksum.
    fn update(&mut self, bytes: &[u8]);
    /// Returns the checksum of all bytes fed since the last reset.
    fn finalize(&self) -> u32;
}

/// Castagnoli CRC32 used to stamp flushed tables and manifests.
#[derive(Clone)]
pub struct Crc32c {
    inner: Digest<'static, u32>,
}

impl Default for Crc32c {
    fn default() -> Self {
        Self {
            inner: CASTAGNOLI.digest(),
        }
    }
}

impl Checksum for Crc32c {
    fn reset(&mut self) {
        self.inner = CASTAGNOLI.digest();
    }

    fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn finalize(&self) -> u32 {
        self.inner.clone().finalize()
    }
}

/// One-shot Castagnoli CRC32 of `bytes`.
pub fn crc32c(bytes: &[u8]) -> u32 {
    CASTAGNOLI.checksum(bytes)
}

/// Recomputes the checksum of `bytes` and compares it with `expected`.
pub fn verify_crc32c(bytes: &[u8], expected: u32) -> Result<()> {
    let actual = crc32c(bytes);
    if actual != expected {
        return Err(Error::ChecksumMismatch { expected, actual });
    }
    Ok(())
}
