//! Build pipeline turning feature columns into similarity matrices.
//!
//! This crate provides:
//! - `CountVectorizer` for bag-of-words count vectors over a capped vocabulary
//! - `similarity::build` for the pairwise cosine similarity matrix
//! - `build_dimension` chaining both for one column of a feature table
//!
//! ## Architecture
//! Each feature dimension is an independent build unit:
//! 1. Take the dimension's text column from the feature table (row order kept)
//! 2. Vectorize it
//! 3. Compute the N x N cosine similarity matrix
//!
//! ## Example Usage
//! ```ignore
//! use data_loader::Dimension;
//! use pipeline::build_dimension;
//!
//! let matrix = build_dimension(&table, Dimension::Tags, 5000)?;
//! let row = matrix.row(0);
//! ```

pub mod error;
pub mod stopwords;
pub mod vectorizer;
pub mod similarity;

// Re-export main types
pub use error::{PipelineError, Result};
pub use similarity::SimilarityMatrix;
pub use vectorizer::{CountMatrix, CountVectorizer, DEFAULT_VOCABULARY_LIMIT, vectorize};

use data_loader::{Dimension, FeatureTable};
use tracing::{info, instrument};

/// Vectorize one dimension of `table` and build its similarity matrix
#[instrument(skip(table), fields(rows = table.len()))]
pub fn build_dimension(
    table: &FeatureTable,
    dimension: Dimension,
    vocabulary_limit: usize,
) -> Result<SimilarityMatrix> {
    let column = table.column(dimension);
    let counts = vectorize(&column, vocabulary_limit)?;
    let matrix = similarity::build(&counts);
    info!(
        "Built {} similarity over {} movies (vocabulary {})",
        dimension,
        matrix.size(),
        counts.width()
    );
    Ok(matrix)
}
