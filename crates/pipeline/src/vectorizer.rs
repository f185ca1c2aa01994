//! Bag-of-words vectorizer.
//!
//! Turns a text column into term-frequency count vectors over a bounded
//! vocabulary.
//!
//! ## Algorithm
//! 1. Tokenize every row: lower-case, split on non-word characters,
//!    keep tokens of at least two characters, drop stopwords
//! 2. Count each token across the whole column
//! 3. Keep the `vocabulary_limit` most frequent tokens
//!    (ties: the token seen first wins)
//! 4. Count vocabulary tokens per row

use crate::error::{PipelineError, Result};
use crate::stopwords::is_stop_word;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Vocabulary size used when no limit is configured
pub const DEFAULT_VOCABULARY_LIMIT: usize = 5000;

/// Sparse row-major matrix of non-negative term counts.
///
/// Row `i` lists `(column, count)` pairs sorted by column, zero counts omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountMatrix {
    vocabulary: Vec<String>,
    rows: Vec<Vec<(u32, u32)>>,
}

impl CountMatrix {
    /// Number of rows (one per input text)
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (vocabulary size)
    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vocabulary tokens, indexed by column
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Nonzero entries of one row
    pub fn row(&self, i: usize) -> &[(u32, u32)] {
        &self.rows[i]
    }

    /// Count at (row, column)
    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.rows[i]
            .binary_search_by_key(&(j as u32), |&(col, _)| col)
            .map(|idx| self.rows[i][idx].1)
            .unwrap_or(0)
    }

    /// Dense copy of one row
    pub fn dense_row(&self, i: usize) -> Vec<u32> {
        let mut dense = vec![0; self.width()];
        for &(col, count) in &self.rows[i] {
            dense[col as usize] = count;
        }
        dense
    }
}

/// Count vectorizer with a capped vocabulary
#[derive(Debug, Clone, Copy)]
pub struct CountVectorizer {
    vocabulary_limit: usize,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self {
            vocabulary_limit: DEFAULT_VOCABULARY_LIMIT,
        }
    }

    /// Configure the vocabulary cap (default: 5000)
    pub fn with_vocabulary_limit(mut self, limit: usize) -> Self {
        self.vocabulary_limit = limit;
        self
    }

    pub fn vocabulary_limit(&self) -> usize {
        self.vocabulary_limit
    }

    /// Learn the vocabulary from `column` and count every row against it
    #[instrument(skip(self, column), fields(rows = column.len(), limit = self.vocabulary_limit))]
    pub fn fit_transform<S: AsRef<str> + Sync>(&self, column: &[S]) -> Result<CountMatrix> {
        if column.is_empty() {
            return Err(PipelineError::EmptyColumn);
        }

        // Tokenizing is independent per row; collect keeps row order
        let tokenized: Vec<Vec<String>> = column
            .par_iter()
            .map(|text| tokenize(text.as_ref()))
            .collect();

        // token -> (total count, first-seen rank)
        let mut frequencies: HashMap<&str, (u64, usize)> = HashMap::new();
        for token in tokenized.iter().flatten() {
            let next_rank = frequencies.len();
            frequencies.entry(token.as_str()).or_insert((0, next_rank)).0 += 1;
        }
        let distinct = frequencies.len();

        let mut ranked: Vec<(&str, u64, usize)> = frequencies
            .into_iter()
            .map(|(token, (count, rank))| (token, count, rank))
            .collect();
        ranked.sort_unstable_by_key(|&(_, count, rank)| (Reverse(count), rank));
        ranked.truncate(self.vocabulary_limit);

        let vocabulary: Vec<String> = ranked.iter().map(|(t, _, _)| t.to_string()).collect();
        let columns: HashMap<&str, u32> = ranked
            .iter()
            .enumerate()
            .map(|(col, (token, _, _))| (*token, col as u32))
            .collect();

        let rows: Vec<Vec<(u32, u32)>> = tokenized
            .par_iter()
            .map(|tokens| {
                let mut counts: HashMap<u32, u32> = HashMap::new();
                for token in tokens {
                    if let Some(&col) = columns.get(token.as_str()) {
                        *counts.entry(col).or_insert(0) += 1;
                    }
                }
                let mut row: Vec<(u32, u32)> = counts.into_iter().collect();
                row.sort_unstable_by_key(|&(col, _)| col);
                row
            })
            .collect();

        debug!(
            "Vectorized {} rows: {} distinct tokens, vocabulary {}",
            rows.len(),
            distinct,
            vocabulary.len()
        );

        Ok(CountMatrix { vocabulary, rows })
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Vectorize a column with the given vocabulary cap
pub fn vectorize<S: AsRef<str> + Sync>(column: &[S], vocabulary_limit: usize) -> Result<CountMatrix> {
    CountVectorizer::new()
        .with_vocabulary_limit(vocabulary_limit)
        .fit_transform(column)
}

/// Split text into lower-cased word tokens of two or more characters,
/// with stopwords removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| !is_stop_word(w))
        .map(|w| w.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("The Hero, and a VILLAIN!"),
            vec!["hero".to_string(), "villain".to_string()]
        );
        assert!(tokenize("x y z").is_empty());
    }

    #[test]
    fn test_empty_column_fails() {
        let column: Vec<&str> = Vec::new();
        assert_eq!(vectorize(&column, 10), Err(PipelineError::EmptyColumn));
    }

    #[test]
    fn test_counts_and_vocabulary_order() {
        let column = ["action hero", "action villain", "romance drama"];
        let counts = vectorize(&column, 10).unwrap();

        assert_eq!(counts.n_rows(), 3);
        assert_eq!(counts.width(), 5);
        // "action" is the most frequent; the rest keep first-seen order
        assert_eq!(
            counts.vocabulary(),
            &["action", "hero", "villain", "romance", "drama"]
        );
        assert_eq!(counts.dense_row(0), vec![1, 1, 0, 0, 0]);
        assert_eq!(counts.dense_row(1), vec![1, 0, 1, 0, 0]);
        assert_eq!(counts.get(2, 4), 1);
    }

    #[test]
    fn test_vocabulary_limit_keeps_most_frequent() {
        let column = ["space space war", "space opera", "war drama"];
        let counts = vectorize(&column, 2).unwrap();

        assert_eq!(counts.vocabulary(), &["space", "war"]);
        assert_eq!(counts.dense_row(0), vec![2, 1]);
        assert_eq!(counts.dense_row(1), vec![1, 0]);
    }

    #[test]
    fn test_tie_at_limit_keeps_first_seen() {
        // All three tokens appear once; the cut falls inside the tie
        let column = ["alpha beta", "gamma"];
        let counts = vectorize(&column, 2).unwrap();

        assert_eq!(counts.vocabulary(), &["alpha", "beta"]);
        assert_eq!(counts.dense_row(0), vec![1, 1]);
        assert!(counts.row(1).is_empty());
    }

    #[test]
    fn test_stopword_only_rows_are_zero() {
        let column = ["the and of", "", "robot"];
        let counts = vectorize(&column, 10).unwrap();

        assert_eq!(counts.width(), 1);
        assert!(counts.row(0).is_empty());
        assert!(counts.row(1).is_empty());
        assert_eq!(counts.dense_row(2), vec![1]);
    }
}
