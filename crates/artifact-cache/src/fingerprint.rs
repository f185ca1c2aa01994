//! Content fingerprints stored alongside every artifact.
//!
//! A fingerprint is the row count plus a 64-bit hash of the inputs an
//! artifact was derived from. Comparing it on load catches artifacts
//! built from a different (or reordered) feature table.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Encoded size of a fingerprint in the file header
pub const FINGERPRINT_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub row_count: u64,
    pub content_hash: u64,
}

impl Fingerprint {
    pub fn new(row_count: u64, content_hash: u64) -> Self {
        Self {
            row_count,
            content_hash,
        }
    }

    /// Fingerprint an ordered sequence of rows
    ///
    /// Row order matters: the same rows in another order hash differently.
    pub fn of_rows<I, T>(rows: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Hash,
    {
        let mut hasher = DefaultHasher::new();
        let mut row_count = 0u64;
        for row in rows {
            row.hash(&mut hasher);
            row_count += 1;
        }
        row_count.hash(&mut hasher);
        Self {
            row_count,
            content_hash: hasher.finish(),
        }
    }

    /// Mix a build parameter (e.g. the vocabulary limit) into the hash
    pub fn salted<T: Hash>(self, salt: T) -> Self {
        let mut hasher = DefaultHasher::new();
        self.content_hash.hash(&mut hasher);
        salt.hash(&mut hasher);
        Self {
            row_count: self.row_count,
            content_hash: hasher.finish(),
        }
    }

    pub(crate) fn to_bytes(self) -> [u8; FINGERPRINT_LEN] {
        let mut out = [0u8; FINGERPRINT_LEN];
        out[..8].copy_from_slice(&self.row_count.to_le_bytes());
        out[8..].copy_from_slice(&self.content_hash.to_le_bytes());
        out
    }

    pub(crate) fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        let mut row_count = [0u8; 8];
        let mut content_hash = [0u8; 8];
        row_count.copy_from_slice(&bytes[..8]);
        content_hash.copy_from_slice(&bytes[8..]);
        Self {
            row_count: u64::from_le_bytes(row_count),
            content_hash: u64::from_le_bytes(content_hash),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows/{:016x}", self.row_count, self.content_hash)
    }
}
