//! Integration tests for the build pipeline.
//!
//! These tests run vectorization and the similarity build on a small
//! feature table, the way the engine does for each dimension.

use data_loader::{DisplayMeta, Dimension, FeatureTable, MovieRecord};
use pipeline::{PipelineError, build_dimension};

fn movie(id: u32, title: &str, tags: &str, genres: &str) -> MovieRecord {
    MovieRecord {
        id,
        title: title.to_string(),
        tags: tags.to_string(),
        genres: genres.to_string(),
        keywords: String::new(),
        cast: String::new(),
        production_companies: String::new(),
        display: DisplayMeta::default(),
    }
}

fn create_test_table() -> FeatureTable {
    FeatureTable::from_rows(vec![
        movie(1, "A", "action hero", "action"),
        movie(2, "B", "action villain", "action thriller"),
        movie(3, "C", "romance drama", "romance"),
    ])
    .unwrap()
}

#[test]
fn test_build_is_deterministic() {
    let table = create_test_table();

    let first = build_dimension(&table, Dimension::Tags, 10).unwrap();
    let second = build_dimension(&table, Dimension::Tags, 10).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_dimensions_are_independent() {
    let table = create_test_table();

    let tags = build_dimension(&table, Dimension::Tags, 10).unwrap();
    let genres = build_dimension(&table, Dimension::Genres, 10).unwrap();

    assert!(tags.get(0, 1) > tags.get(0, 2));
    // "action" vs "action thriller": 1 / sqrt(2)
    assert!((genres.get(0, 1) - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    assert_ne!(tags, genres);
}

#[test]
fn test_all_empty_dimension_is_zero_matrix() {
    let table = create_test_table();

    let cast = build_dimension(&table, Dimension::Cast, 10).unwrap();

    assert_eq!(cast.size(), 3);
    for i in 0..3 {
        assert!(cast.row(i).iter().all(|&s| s == 0.0));
    }
}

#[test]
fn test_empty_table_fails() {
    let table = FeatureTable::default();
    let err = build_dimension(&table, Dimension::Tags, 10).unwrap_err();
    assert_eq!(err, PipelineError::EmptyColumn);
}
