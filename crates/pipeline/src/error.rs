//! Error types for the build pipeline.

use thiserror::Error;

/// Errors raised while turning a feature column into a similarity matrix
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The column to vectorize has no rows at all
    #[error("Cannot vectorize an empty column")]
    EmptyColumn,
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PipelineError>;
