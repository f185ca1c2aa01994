//! # Data Loader Crate
//!
//! This crate holds the feature store: the cleaned movie table whose row
//! order every similarity matrix is indexed by.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, FeatureTable, Dimension, MovieRef)
//! - **parser**: Parse JSON Lines catalogs into Rust structs
//! - **source**: The `CatalogSource` ingestion boundary
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{CatalogSource, Dimension, JsonLinesCatalog, MovieRef};
//!
//! let table = JsonLinesCatalog::new("data/movies.jsonl").load_catalog()?;
//!
//! let position = table.position_of(&MovieRef::from("Avatar")).unwrap();
//! let tags = table.column(Dimension::Tags);
//! println!("{} -> {}", table.rows()[position].title, tags[position]);
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod source;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use source::{CatalogSource, InMemoryCatalog, JsonLinesCatalog};
pub use types::{
    // Type aliases
    MovieId,
    // Core types
    DisplayMeta,
    FeatureTable,
    MovieRecord,
    MovieRef,
    // Enums
    Dimension,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: MovieId, title: &str, tags: &str) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            tags: tags.to_string(),
            genres: String::new(),
            keywords: String::new(),
            cast: String::new(),
            production_companies: String::new(),
            display: DisplayMeta::default(),
        }
    }

    #[test]
    fn test_empty_table() {
        let table = FeatureTable::default();
        assert!(table.is_empty());
        assert!(table.position_of(&MovieRef::Id(1)).is_none());
    }

    #[test]
    fn test_position_of_first_match_wins() {
        let table = FeatureTable::from_rows(vec![
            record(7, "Twin", "a"),
            record(8, "Other", "b"),
            record(9, "Twin", "c"),
        ])
        .unwrap();

        assert_eq!(table.position_of(&MovieRef::from("Twin")), Some(0));
        assert_eq!(table.position_of(&MovieRef::Id(9)), Some(2));
        assert_eq!(table.position_of(&MovieRef::from("twin")), None);
    }

    #[test]
    fn test_column_follows_row_order() {
        let table = FeatureTable::from_rows(vec![
            record(3, "C", "third"),
            record(1, "A", "first"),
        ])
        .unwrap();

        assert_eq!(table.column(Dimension::Tags), vec!["third", "first"]);
    }

    #[test]
    fn test_dimension_parsing() {
        assert_eq!("tags".parse::<Dimension>().unwrap(), Dimension::Tags);
        assert_eq!("TCAST".parse::<Dimension>().unwrap(), Dimension::Cast);
        assert_eq!(
            "tprduction_comp".parse::<Dimension>().unwrap(),
            Dimension::ProductionCompany
        );
        assert!(matches!(
            "ratings".parse::<Dimension>(),
            Err(DataLoadError::InvalidDimension(_))
        ));
        assert_eq!(Dimension::Genres.cache_key(), "similarity_genres");
    }
}
