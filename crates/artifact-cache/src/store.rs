//! File-backed artifact store.
//!
//! Each entry lives at `<root>/<key>.bin`:
//!
//! ```text
//! [magic u8][format version u32][row count u64][content hash u64][bitcode payload]
//! ```
//!
//! All integers are little-endian. Writes go to a temp file in the same
//! directory and are renamed into place, so a reader never sees a torn
//! entry and concurrent writers resolve to last-writer-wins.

use crate::error::{CacheError, Result};
use crate::fingerprint::{FINGERPRINT_LEN, Fingerprint};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

/// First byte of every artifact file
pub const ARTIFACT_MAGIC: u8 = 0xA7;

/// Bumped whenever the header or payload encoding changes
pub const FORMAT_VERSION: u32 = 1;

const HEADER_LEN: usize = 1 + 4 + FINGERPRINT_LEN;

/// A decoded artifact together with the fingerprint it was saved with
#[derive(Debug, Clone, PartialEq)]
pub struct CachedArtifact<T> {
    pub fingerprint: Fingerprint,
    pub value: T,
}

/// Persists expensive derived artifacts keyed by name
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: PathBuf,
}

impl ArtifactCache {
    /// Cache rooted at `root`; the directory is not created
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let cache = Self::new(root);
        fs::create_dir_all(&cache.root).map_err(|source| CacheError::PersistenceError {
            key: cache.root.display().to_string(),
            source,
        })?;
        Ok(cache)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic storage path for `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.bin")))
    }

    /// Storage-existence check only; the content is not inspected
    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Read only the fingerprint header of an entry
    pub fn fingerprint(&self, key: &str) -> Result<Option<Fingerprint>> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        let mut header = [0u8; HEADER_LEN];
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(read_error(key, source)),
        };
        match file.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(corrupt(key, "truncated header"));
            }
            Err(source) => return Err(read_error(key, source)),
        }
        parse_header(key, &header).map(Some)
    }

    /// Load and decode an entry, or `None` if it was never saved
    #[instrument(skip(self))]
    pub fn load<T>(&self, key: &str) -> Result<Option<CachedArtifact<T>>>
    where
        T: for<'a> bitcode::Decode<'a>,
    {
        let path = self.path_for(key)?;
        if !path.is_file() {
            debug!("No cached artifact at {:?}", path);
            return Ok(None);
        }
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(read_error(key, source)),
        };
        if bytes.len() < HEADER_LEN {
            return Err(corrupt(key, "truncated header"));
        }

        let fingerprint = parse_header(key, &bytes[..HEADER_LEN])?;
        let value = bitcode::decode::<T>(&bytes[HEADER_LEN..])
            .map_err(|e| corrupt(key, &format!("payload does not decode: {e}")))?;

        debug!("Loaded artifact '{}' ({} bytes)", key, bytes.len());
        Ok(Some(CachedArtifact { fingerprint, value }))
    }

    /// Load an entry and require it to match `expected`
    ///
    /// Fails with `StaleArtifact` when the stored fingerprint differs.
    pub fn load_validated<T>(&self, key: &str, expected: &Fingerprint) -> Result<Option<T>>
    where
        T: for<'a> bitcode::Decode<'a>,
    {
        match self.load::<T>(key)? {
            None => Ok(None),
            Some(cached) if cached.fingerprint == *expected => Ok(Some(cached.value)),
            Some(cached) => Err(CacheError::StaleArtifact {
                key: key.to_string(),
                expected: *expected,
                found: cached.fingerprint,
            }),
        }
    }

    /// Encode and atomically persist an entry, replacing any previous one
    #[instrument(skip(self, value))]
    pub fn save<T>(&self, key: &str, value: &T, fingerprint: Fingerprint) -> Result<()>
    where
        T: bitcode::Encode,
    {
        let path = self.path_for(key)?;
        let payload = bitcode::encode(value);

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.push(ARTIFACT_MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&fingerprint.to_bytes());
        bytes.extend_from_slice(&payload);

        let persist_err = |source: io::Error| CacheError::PersistenceError {
            key: key.to_string(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.root).map_err(persist_err)?;
        tmp.write_all(&bytes).map_err(persist_err)?;
        tmp.as_file().sync_all().map_err(persist_err)?;
        tmp.persist(&path).map_err(|e| persist_err(e.error))?;

        info!("Saved artifact '{}' to {:?} ({} bytes)", key, path, bytes.len());
        Ok(())
    }

    /// Delete an entry; returns whether one existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Removed artifact '{}'", key);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => {
                warn!("Could not remove artifact '{}': {}", key, source);
                Err(CacheError::PersistenceError {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}

fn parse_header(key: &str, header: &[u8]) -> Result<Fingerprint> {
    if header[0] != ARTIFACT_MAGIC {
        return Err(corrupt(key, "missing artifact magic byte"));
    }
    let mut version = [0u8; 4];
    version.copy_from_slice(&header[1..5]);
    let version = u32::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(corrupt(
            key,
            &format!("format version {version}, expected {FORMAT_VERSION}"),
        ));
    }
    let mut fingerprint = [0u8; FINGERPRINT_LEN];
    fingerprint.copy_from_slice(&header[5..HEADER_LEN]);
    Ok(Fingerprint::from_bytes(fingerprint))
}

fn corrupt(key: &str, reason: &str) -> CacheError {
    CacheError::CorruptArtifact {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn read_error(key: &str, source: io::Error) -> CacheError {
    CacheError::ReadError {
        key: key.to_string(),
        source,
    }
}
