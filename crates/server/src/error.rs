//! Error types for engine queries and builds.

use artifact_cache::CacheError;
use data_loader::DataLoadError;
use pipeline::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The movie reference matched no row of the feature table
    #[error("Unknown movie: {0}")]
    UnknownMovie(String),

    /// Dimension is unknown or not among the configured ones
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error(transparent)]
    Data(#[from] DataLoadError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Missing, corrupt, stale or unwritable artifacts
    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
