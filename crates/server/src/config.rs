//! Engine configuration.
//!
//! Plain struct with defaults and builder-style setters; the CLI maps its
//! flags onto it.

use data_loader::Dimension;
use pipeline::DEFAULT_VOCABULARY_LIMIT;
use std::path::PathBuf;

/// Directory artifacts are cached in when none is given
pub const DEFAULT_CACHE_DIR: &str = "Files";

/// Number of recommendations returned when the caller does not say
pub const DEFAULT_K: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Where cached artifacts live
    pub cache_dir: PathBuf,
    /// Vocabulary cap for every dimension
    pub vocabulary_limit: usize,
    /// Default result count for `recommend`
    pub default_k: usize,
    /// Dimensions this engine builds and serves
    pub dimensions: Vec<Dimension>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            vocabulary_limit: DEFAULT_VOCABULARY_LIMIT,
            default_k: DEFAULT_K,
            dimensions: Dimension::ALL.to_vec(),
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_vocabulary_limit(mut self, limit: usize) -> Self {
        self.vocabulary_limit = limit;
        self
    }

    pub fn with_default_k(mut self, k: usize) -> Self {
        self.default_k = k;
        self
    }

    /// Restrict the served dimensions (duplicates are dropped, order kept)
    pub fn with_dimensions(mut self, dimensions: impl IntoIterator<Item = Dimension>) -> Self {
        self.dimensions.clear();
        for dimension in dimensions {
            if !self.dimensions.contains(&dimension) {
                self.dimensions.push(dimension);
            }
        }
        self
    }

    pub fn is_enabled(&self, dimension: Dimension) -> bool {
        self.dimensions.contains(&dimension)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.vocabulary_limit, 5000);
        assert_eq!(config.default_k, 5);
        assert_eq!(config.dimensions.len(), 5);
        assert_eq!(config.cache_dir, PathBuf::from("Files"));
    }

    #[test]
    fn test_with_dimensions_dedups() {
        let config = EngineConfig::new().with_dimensions([
            Dimension::Genres,
            Dimension::Tags,
            Dimension::Genres,
        ]);
        assert_eq!(config.dimensions, vec![Dimension::Genres, Dimension::Tags]);
        assert!(!config.is_enabled(Dimension::Cast));
    }
}
