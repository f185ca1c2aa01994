//! # Artifact Cache Crate
//!
//! Persists expensive derived artifacts (the feature table, one similarity
//! matrix per dimension) so they are computed once and reused across runs.
//!
//! ## Main Components
//!
//! - **store**: `ArtifactCache`, the file-backed store with atomic writes
//! - **fingerprint**: `Fingerprint`, the input summary stored with each entry
//! - **error**: Error types for cache access
//!
//! ## Example Usage
//!
//! ```ignore
//! use artifact_cache::{ArtifactCache, Fingerprint};
//!
//! let cache = ArtifactCache::open("Files")?;
//! let fingerprint = Fingerprint::of_rows(column.iter());
//!
//! if !cache.exists("similarity_tags") {
//!     cache.save("similarity_tags", &matrix, fingerprint)?;
//! }
//! let matrix: Option<SimilarityMatrix> =
//!     cache.load_validated("similarity_tags", &fingerprint)?;
//! ```

pub mod error;
pub mod fingerprint;
pub mod store;

pub use error::{CacheError, Result};
pub use fingerprint::Fingerprint;
pub use store::{ARTIFACT_MAGIC, ArtifactCache, CachedArtifact, FORMAT_VERSION};
