//! Ingestion boundary.
//!
//! The engine never parses raw metadata itself; it asks a `CatalogSource`
//! for a ready-made `FeatureTable`.

use crate::error::Result;
use crate::parser;
use crate::types::{FeatureTable, MovieRecord};
use std::path::{Path, PathBuf};
use tracing::info;

/// Anything that can hand the engine a cleaned feature table.
///
/// `Send + Sync` so a source can be shared with the engine across threads.
pub trait CatalogSource: Send + Sync {
    /// Name of this source (for logging)
    fn name(&self) -> &str;

    /// Produce the feature table in its canonical row order
    fn load_catalog(&self) -> Result<FeatureTable>;
}

/// Reads a JSON Lines catalog from disk
#[derive(Debug, Clone)]
pub struct JsonLinesCatalog {
    path: PathBuf,
}

impl JsonLinesCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonLinesCatalog {
    fn name(&self) -> &str {
        "json-lines"
    }

    fn load_catalog(&self) -> Result<FeatureTable> {
        info!("Loading movie catalog from {:?}", self.path);
        let table = parser::parse_catalog(&self.path)?;
        info!("Loaded {} movies", table.len());
        Ok(table)
    }
}

/// Rows already held in memory (tests, embedding callers)
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    rows: Vec<MovieRecord>,
}

impl InMemoryCatalog {
    pub fn new(rows: Vec<MovieRecord>) -> Self {
        Self { rows }
    }
}

impl CatalogSource for InMemoryCatalog {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn load_catalog(&self) -> Result<FeatureTable> {
        FeatureTable::from_rows(self.rows.clone())
    }
}
