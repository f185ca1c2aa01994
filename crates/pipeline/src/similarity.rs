//! Pairwise cosine similarity over count vectors.
//!
//! ## Algorithm
//! cos(v_i, v_j) = (v_i . v_j) / (||v_i|| x ||v_j||)
//!
//! A zero vector is similar to nothing, itself included (score 0).
//! Dot products are exact integer sums, so (i, j) and (j, i) are
//! bit-identical.

use crate::vectorizer::CountMatrix;
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Dense N x N similarity matrix, row-major.
///
/// Rows carry no labels: row `i` belongs to row `i` of the feature table
/// the matrix was built from.
#[derive(Debug, Clone, PartialEq, bitcode::Encode, bitcode::Decode)]
pub struct SimilarityMatrix {
    size: u64,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Wrap raw row-major values; `None` if the length is not `size * size`
    pub fn from_values(size: usize, values: Vec<f32>) -> Option<Self> {
        if size.checked_mul(size)? != values.len() {
            return None;
        }
        Some(Self {
            size: size as u64,
            values,
        })
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Similarity of every row against row `i`
    pub fn row(&self, i: usize) -> &[f32] {
        let n = self.size();
        &self.values[i * n..(i + 1) * n]
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.values[i * self.size() + j]
    }

    /// True when the stored entries are consistent with `size`
    pub fn is_well_formed(&self) -> bool {
        let n = self.size();
        n.checked_mul(n) == Some(self.values.len())
    }
}

/// Build the full similarity matrix for a set of count vectors
///
/// Rows are computed in parallel; the result does not depend on scheduling.
#[instrument(skip(vectors), fields(rows = vectors.n_rows(), width = vectors.width()))]
pub fn build(vectors: &CountMatrix) -> SimilarityMatrix {
    let n = vectors.n_rows();
    if n == 0 {
        return SimilarityMatrix {
            size: 0,
            values: Vec::new(),
        };
    }

    let norms: Vec<f64> = (0..n)
        .map(|i| {
            let squares: u64 = vectors
                .row(i)
                .iter()
                .map(|&(_, c)| (c as u64) * (c as u64))
                .sum();
            (squares as f64).sqrt()
        })
        .collect();

    let mut values = vec![0.0f32; n * n];
    values
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(i, out)| {
            if norms[i] == 0.0 {
                return; // zero vector: the whole row stays 0
            }
            let row_i = vectors.row(i);
            for (j, cell) in out.iter_mut().enumerate() {
                if i == j {
                    *cell = 1.0;
                } else if norms[j] > 0.0 {
                    let dot = sparse_dot(row_i, vectors.row(j));
                    let cosine = dot as f64 / (norms[i] * norms[j]);
                    *cell = cosine.clamp(0.0, 1.0) as f32;
                }
            }
        });

    debug!("Built {}x{} similarity matrix", n, n);
    SimilarityMatrix {
        size: n as u64,
        values,
    }
}

/// Dot product of two sorted sparse rows
fn sparse_dot(a: &[(u32, u32)], b: &[(u32, u32)]) -> u64 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0u64;
    while i < a.len() && j < b.len() {
        let (col_a, count_a) = a[i];
        let (col_b, count_b) = b[j];
        if col_a == col_b {
            dot += count_a as u64 * count_b as u64;
            i += 1;
            j += 1;
        } else if col_a < col_b {
            i += 1;
        } else {
            j += 1;
        }
    }
    dot
}
