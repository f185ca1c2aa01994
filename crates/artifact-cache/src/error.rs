//! Error types for the artifact cache.

use crate::fingerprint::Fingerprint;
use thiserror::Error;

/// Errors raised while reading or writing cached artifacts
#[derive(Error, Debug)]
pub enum CacheError {
    /// No entry is stored under this key
    #[error("Artifact '{key}' has not been built")]
    MissingArtifact { key: String },

    /// The stored bytes could not be decoded
    #[error("Artifact '{key}' is corrupt: {reason}")]
    CorruptArtifact { key: String, reason: String },

    /// The entry was built from different inputs than the current ones
    #[error("Artifact '{key}' is stale: built from {found}, current inputs are {expected}")]
    StaleArtifact {
        key: String,
        expected: Fingerprint,
        found: Fingerprint,
    },

    /// The entry could not be written to durable storage
    #[error("Failed to persist artifact '{key}': {source}")]
    PersistenceError {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The entry exists but could not be read
    #[error("Failed to read artifact '{key}': {source}")]
    ReadError {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Key contains characters that cannot map to a file name
    #[error("Invalid artifact key: '{0}'")]
    InvalidKey(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CacheError>;
