//! # Recommendation Engine
//!
//! The explicit context object every query runs against. Built once at
//! process start, then shared by reference (it is `Send + Sync`).
//!
//! 1. Load the feature table (cache first, ingestion collaborator otherwise)
//! 2. `ensure_built` each dimension: vectorize, build, save similarity matrix
//! 3. Serve `recommend` / `get_details` from cached artifacts
//!
//! Every cached matrix carries the fingerprint of the column it was built
//! from, so a matrix built against a different table is reported as stale
//! instead of silently indexing the wrong rows.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use artifact_cache::{ArtifactCache, CacheError, Fingerprint};
use data_loader::{CatalogSource, Dimension, FeatureTable, MovieId, MovieRecord, MovieRef};
use pipeline::{SimilarityMatrix, build_dimension};
use rand::Rng;

use crate::config::EngineConfig;
use crate::details::{DetailResolver, MovieDetails};
use crate::error::{EngineError, Result};

/// Cache key of the feature table itself
pub const FEATURE_TABLE_KEY: &str = "feature_table";

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub score: f32,
}

/// What `ensure_built` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildStatus {
    /// Nothing was cached; built and saved
    Built,
    /// A matching artifact was already cached; no work done
    AlreadyCached,
    /// The cached artifact was built from other inputs; rebuilt and replaced
    Rebuilt,
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BuildStatus::Built => "built",
            BuildStatus::AlreadyCached => "already cached",
            BuildStatus::Rebuilt => "rebuilt",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub struct RecommendationEngine {
    config: EngineConfig,
    table: Arc<FeatureTable>,
    cache: ArtifactCache,
    details: DetailResolver,
    /// Matrices already loaded or built by this process
    loaded: RwLock<HashMap<Dimension, Arc<SimilarityMatrix>>>,
    builds_run: AtomicUsize,
}

impl RecommendationEngine {
    /// Open the engine, loading the feature table from the cache or, when
    /// it is not cached yet, from `source` (and then caching it).
    ///
    /// A cached table is trusted over `source`; clear it to re-ingest.
    #[instrument(skip(config, source), fields(cache_dir = ?config.cache_dir, source = source.name()))]
    pub fn open(config: EngineConfig, source: &dyn CatalogSource) -> Result<Self> {
        let cache = ArtifactCache::open(&config.cache_dir)?;

        let table = match cache.load::<FeatureTable>(FEATURE_TABLE_KEY)? {
            Some(cached) => {
                let table = cached.value;
                if table_fingerprint(&table) != cached.fingerprint {
                    return Err(CacheError::CorruptArtifact {
                        key: FEATURE_TABLE_KEY.to_string(),
                        reason: "content does not match its stored fingerprint".to_string(),
                    }
                    .into());
                }
                table.validate().map_err(|e| CacheError::CorruptArtifact {
                    key: FEATURE_TABLE_KEY.to_string(),
                    reason: e.to_string(),
                })?;
                info!("Loaded cached feature table ({} movies)", table.len());
                table
            }
            None => {
                let table = source.load_catalog()?;
                if let Err(e) = cache.save(FEATURE_TABLE_KEY, &table, table_fingerprint(&table)) {
                    // The table is still usable for this run
                    warn!("Feature table not cached: {}", e);
                }
                table
            }
        };

        Ok(Self::with_cache(config, table, cache))
    }

    /// Engine over an already-loaded table; the table itself is not cached
    pub fn from_table(config: EngineConfig, table: FeatureTable) -> Result<Self> {
        let cache = ArtifactCache::open(&config.cache_dir)?;
        Ok(Self::with_cache(config, table, cache))
    }

    fn with_cache(config: EngineConfig, table: FeatureTable, cache: ArtifactCache) -> Self {
        let table = Arc::new(table);
        Self {
            details: DetailResolver::new(table.clone()),
            config,
            table,
            cache,
            loaded: RwLock::new(HashMap::new()),
            builds_run: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// Number of similarity builds this engine has actually run
    pub fn builds_run(&self) -> usize {
        self.builds_run.load(Ordering::Relaxed)
    }

    /// Parse a dimension name and check it is configured
    pub fn dimension(&self, name: &str) -> Result<Dimension> {
        let dimension: Dimension = name
            .parse()
            .map_err(|_| EngineError::InvalidDimension(name.to_string()))?;
        self.check_dimension(dimension)?;
        Ok(dimension)
    }

    /// Build and cache the similarity matrix for `dimension` unless a
    /// matching one is already cached.
    ///
    /// A cached entry whose header matches is still decoded and size-checked;
    /// one that fails is `CorruptArtifact`, never silently rebuilt.
    ///
    /// If the save fails the matrix is kept in memory for this process
    /// and `PersistenceError` is returned.
    #[instrument(skip(self))]
    pub fn ensure_built(&self, dimension: Dimension) -> Result<BuildStatus> {
        self.check_dimension(dimension)?;
        let key = dimension.cache_key();
        let expected = self.dimension_fingerprint(dimension);

        let status = match self.cache.fingerprint(&key)? {
            Some(found) if found == expected => {
                // A matching header is not enough: the payload must decode too
                if !self.read_loaded().contains_key(&dimension) {
                    self.load_cached(dimension, key, &expected)?;
                }
                debug!("{} similarity already cached", dimension);
                return Ok(BuildStatus::AlreadyCached);
            }
            Some(found) => {
                warn!(
                    "{} similarity is stale (cached {}, current {}); rebuilding",
                    dimension, found, expected
                );
                BuildStatus::Rebuilt
            }
            None => BuildStatus::Built,
        };

        let start = Instant::now();
        let matrix = Arc::new(build_dimension(
            &self.table,
            dimension,
            self.config.vocabulary_limit,
        )?);
        self.builds_run.fetch_add(1, Ordering::Relaxed);
        info!("Built {} similarity in {:?}", dimension, start.elapsed());

        let saved = self.cache.save(&key, matrix.as_ref(), expected);
        self.memoize(dimension, matrix);
        saved?;
        Ok(status)
    }

    /// `ensure_built` for every configured dimension.
    ///
    /// Dimensions are independent: one failing does not stop the rest.
    pub fn ensure_all_built(&self) -> Vec<(Dimension, Result<BuildStatus>)> {
        self.config
            .dimensions
            .iter()
            .map(|&dimension| {
                let result = self.ensure_built(dimension);
                if let Err(e) = &result {
                    warn!("Build of {} failed: {}", dimension, e);
                }
                (dimension, result)
            })
            .collect()
    }

    /// Remove the cached matrix for `dimension`; returns whether one existed
    pub fn clear(&self, dimension: Dimension) -> Result<bool> {
        self.check_dimension(dimension)?;
        self.write_loaded().remove(&dimension);
        Ok(self.cache.remove(&dimension.cache_key())?)
    }

    /// Top `k` movies most similar to `movie` along `dimension`.
    ///
    /// Scores descend; ties go to the earlier row. The movie itself is
    /// never included. Returns `min(k, N - 1)` results.
    #[instrument(skip(self, movie), fields(movie = %movie))]
    pub fn recommend(
        &self,
        movie: &MovieRef,
        dimension: Dimension,
        k: usize,
    ) -> Result<Vec<Recommendation>> {
        self.check_dimension(dimension)?;
        let position = self.resolve(movie)?;
        let matrix = self.similarity(dimension)?;

        let ranked = rank_neighbours(matrix.row(position), position, k);
        let recommendations: Vec<Recommendation> = ranked
            .into_iter()
            .map(|(neighbour, score)| {
                let record = &self.table.rows()[neighbour];
                Recommendation {
                    movie_id: record.id,
                    title: record.title.clone(),
                    score,
                }
            })
            .collect();

        debug!("Returning {} recommendations", recommendations.len());
        Ok(recommendations)
    }

    /// `recommend` with the configured default `k`
    pub fn recommend_default(
        &self,
        movie: &MovieRef,
        dimension: Dimension,
    ) -> Result<Vec<Recommendation>> {
        self.recommend(movie, dimension, self.config.default_k)
    }

    /// Display metadata for `movie`
    pub fn get_details(&self, movie: &MovieRef) -> Result<MovieDetails> {
        self.details.get_details(movie)
    }

    /// Details of a random movie
    pub fn suggest<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<MovieDetails> {
        self.details.suggest(rng)
    }

    /// Case-insensitive title search: exact matches first, then substring
    /// matches, each in row order.
    pub fn search(&self, fragment: &str, limit: usize) -> Vec<&MovieRecord> {
        let needle = fragment.to_lowercase();
        let mut exact = Vec::new();
        let mut partial = Vec::new();
        for record in self.table.rows() {
            let title = record.title.to_lowercase();
            if title == needle {
                exact.push(record);
            } else if title.contains(&needle) {
                partial.push(record);
            }
        }
        exact.into_iter().chain(partial).take(limit).collect()
    }

    fn check_dimension(&self, dimension: Dimension) -> Result<()> {
        if self.config.is_enabled(dimension) {
            Ok(())
        } else {
            Err(EngineError::InvalidDimension(dimension.to_string()))
        }
    }

    fn resolve(&self, movie: &MovieRef) -> Result<usize> {
        self.table
            .position_of(movie)
            .ok_or_else(|| EngineError::UnknownMovie(movie.to_string()))
    }

    /// The validated similarity matrix for `dimension`
    fn similarity(&self, dimension: Dimension) -> Result<Arc<SimilarityMatrix>> {
        if let Some(matrix) = self.read_loaded().get(&dimension) {
            return Ok(matrix.clone());
        }

        let key = dimension.cache_key();
        let expected = self.dimension_fingerprint(dimension);
        if !self.cache.exists(&key) {
            return Err(CacheError::MissingArtifact { key }.into());
        }
        self.load_cached(dimension, key, &expected)
    }

    /// Decode a cached matrix, check it fits the table, and memoize it
    fn load_cached(
        &self,
        dimension: Dimension,
        key: String,
        expected: &Fingerprint,
    ) -> Result<Arc<SimilarityMatrix>> {
        let matrix = self
            .cache
            .load_validated::<SimilarityMatrix>(&key, expected)?
            .ok_or_else(|| CacheError::MissingArtifact { key: key.clone() })?;

        if !matrix.is_well_formed() || matrix.size() != self.table.len() {
            return Err(CacheError::CorruptArtifact {
                key,
                reason: format!(
                    "matrix size {} does not match {} movies",
                    matrix.size(),
                    self.table.len()
                ),
            }
            .into());
        }

        let matrix = Arc::new(matrix);
        self.memoize(dimension, matrix.clone());
        Ok(matrix)
    }

    fn dimension_fingerprint(&self, dimension: Dimension) -> Fingerprint {
        Fingerprint::of_rows(
            self.table
                .rows()
                .iter()
                .map(|r| (r.id, r.feature(dimension))),
        )
        .salted((dimension, self.config.vocabulary_limit))
    }

    fn memoize(&self, dimension: Dimension, matrix: Arc<SimilarityMatrix>) {
        self.write_loaded().insert(dimension, matrix);
    }

    // The map only ever holds complete Arcs, so a poisoned lock is still usable
    fn read_loaded(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<Dimension, Arc<SimilarityMatrix>>> {
        self.loaded.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_loaded(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<Dimension, Arc<SimilarityMatrix>>> {
        self.loaded.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Fingerprint of the whole table, rows in order
pub fn table_fingerprint(table: &FeatureTable) -> Fingerprint {
    Fingerprint::of_rows(table.rows())
}

/// Positions of the `k` highest scores in `row`, skipping `exclude`.
///
/// Ordered by score descending, then position ascending.
pub fn rank_neighbours(row: &[f32], exclude: usize, k: usize) -> Vec<(usize, f32)> {
    let mut candidates: Vec<(usize, f32)> = row
        .iter()
        .copied()
        .enumerate()
        .filter(|&(position, _)| position != exclude)
        .collect();

    let order = |a: &(usize, f32), b: &(usize, f32)| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0));

    if k == 0 {
        return Vec::new();
    }
    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, order);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(order);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_excludes_self_and_breaks_ties_by_position() {
        let row = [1.0, 0.3, 0.7, 0.3, 0.0];

        let ranked = rank_neighbours(&row, 0, 3);
        assert_eq!(ranked, vec![(2, 0.7), (1, 0.3), (3, 0.3)]);
    }

    #[test]
    fn test_rank_bounds() {
        let row = [0.2, 1.0, 0.9];

        assert!(rank_neighbours(&row, 1, 0).is_empty());
        assert_eq!(rank_neighbours(&row, 1, 10), vec![(2, 0.9), (0, 0.2)]);
    }

    #[test]
    fn test_rank_partial_selection_matches_full_sort() {
        let row: Vec<f32> = (0..50).map(|i| ((i * 37) % 11) as f32 / 10.0).collect();

        let top = rank_neighbours(&row, 4, 7);
        let all = rank_neighbours(&row, 4, usize::MAX);
        assert_eq!(top, all[..7].to_vec());
        assert!(top.iter().all(|&(p, _)| p != 4));
    }
}
