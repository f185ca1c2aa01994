//! Core domain types for the movie catalog.
//!
//! This module defines the fundamental data structures used throughout the system.
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (MovieId)
//! - Structs with public fields
//! - Enums for fixed sets of values, with `FromStr` and `Display`
//! - Derive macros for serde (ingestion) and bitcode (artifact cache)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DataLoadError, Result};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a movie
pub type MovieId = u32;

// =============================================================================
// Feature Dimensions
// =============================================================================

/// One independently vectorized text attribute of a movie
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Tags,
    Genres,
    Keywords,
    Cast,
    ProductionCompany,
}

impl Dimension {
    /// Every dimension, in canonical build order
    pub const ALL: [Dimension; 5] = [
        Dimension::Tags,
        Dimension::Genres,
        Dimension::Keywords,
        Dimension::Cast,
        Dimension::ProductionCompany,
    ];

    /// Short name used on the command line and in log lines
    pub fn name(self) -> &'static str {
        match self {
            Dimension::Tags => "tags",
            Dimension::Genres => "genres",
            Dimension::Keywords => "keywords",
            Dimension::Cast => "cast",
            Dimension::ProductionCompany => "production_company",
        }
    }

    /// Cache key of the similarity matrix built for this dimension
    pub fn cache_key(self) -> String {
        format!("similarity_{}", self.name())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tags" => Ok(Dimension::Tags),
            "genres" => Ok(Dimension::Genres),
            "keywords" => Ok(Dimension::Keywords),
            "cast" | "tcast" => Ok(Dimension::Cast),
            "production_company" | "production_companies" | "tprduction_comp" => {
                Ok(Dimension::ProductionCompany)
            }
            _ => Err(DataLoadError::InvalidDimension(s.to_string())),
        }
    }
}

// =============================================================================
// Movie Records
// =============================================================================

/// Display metadata shown next to a recommendation
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct DisplayMeta {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    /// Poster URL or reference
    ///
    /// Rust concept: `Option<T>` models "may be absent" without null
    #[serde(default)]
    pub poster_ref: Option<String>,
}

/// One row of the feature table
///
/// Each feature field is a token-joined text blob produced by the
/// external cleaning step (e.g. `"samworthington zoesaldana"` for cast).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub genres: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub cast: String,
    #[serde(default)]
    pub production_companies: String,
    #[serde(default)]
    pub display: DisplayMeta,
}

impl MovieRecord {
    /// Text blob for a feature dimension
    pub fn feature(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Tags => &self.tags,
            Dimension::Genres => &self.genres,
            Dimension::Keywords => &self.keywords,
            Dimension::Cast => &self.cast,
            Dimension::ProductionCompany => &self.production_companies,
        }
    }
}

/// A way of naming a movie in a query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MovieRef {
    Id(MovieId),
    Title(String),
}

impl fmt::Display for MovieRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieRef::Id(id) => write!(f, "id {}", id),
            MovieRef::Title(title) => write!(f, "'{}'", title),
        }
    }
}

impl From<MovieId> for MovieRef {
    fn from(id: MovieId) -> Self {
        MovieRef::Id(id)
    }
}

impl From<&str> for MovieRef {
    fn from(title: &str) -> Self {
        MovieRef::Title(title.to_string())
    }
}

impl From<String> for MovieRef {
    fn from(title: String) -> Self {
        MovieRef::Title(title)
    }
}

// =============================================================================
// FeatureTable - The Feature Store
// =============================================================================

/// Ordered movie rows.
///
/// The row position is the canonical key into every similarity matrix,
/// so rows are never reordered or filtered once the table is built.
#[derive(Debug, Clone, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct FeatureTable {
    rows: Vec<MovieRecord>,
}

impl FeatureTable {
    /// Build a table from rows in their final order
    ///
    /// Fails if two rows share an id.
    pub fn from_rows(rows: Vec<MovieRecord>) -> Result<Self> {
        let table = Self { rows };
        table.validate()?;
        Ok(table)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in canonical order
    ///
    /// Rust concept: `&[T]` is a slice (view into the vector)
    pub fn rows(&self) -> &[MovieRecord] {
        &self.rows
    }

    /// Row at a position
    pub fn get(&self, position: usize) -> Option<&MovieRecord> {
        self.rows.get(position)
    }

    /// One feature column, in row order
    pub fn column(&self, dimension: Dimension) -> Vec<&str> {
        self.rows.iter().map(|r| r.feature(dimension)).collect()
    }

    /// Resolve a reference to a row position
    ///
    /// Exact match only. Duplicate titles resolve to the first row.
    pub fn position_of(&self, movie: &MovieRef) -> Option<usize> {
        match movie {
            MovieRef::Id(id) => self.rows.iter().position(|r| r.id == *id),
            MovieRef::Title(title) => self.rows.iter().position(|r| r.title == *title),
        }
    }

    /// Check the id uniqueness invariant
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<MovieId, usize> = HashMap::with_capacity(self.rows.len());
        for (position, row) in self.rows.iter().enumerate() {
            if seen.insert(row.id, position).is_some() {
                return Err(DataLoadError::DuplicateId {
                    id: row.id,
                    position,
                });
            }
        }
        Ok(())
    }
}

impl Default for FeatureTable {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}
