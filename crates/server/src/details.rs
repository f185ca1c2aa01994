//! Display metadata lookups.
//!
//! Resolves a movie reference with the same policy as the recommendation
//! path (exact match, first row wins) so both agree on which movie a
//! title names.

use std::sync::Arc;

use data_loader::{FeatureTable, MovieId, MovieRecord, MovieRef};
use rand::Rng;
use serde::Serialize;

use crate::error::{EngineError, Result};

/// Everything a presentation layer needs to show one movie.
///
/// `poster_ref` is passed through as stored; callers supply their own
/// placeholder when it is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetails {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub overview: String,
    pub release_date: String,
    pub poster_ref: Option<String>,
}

impl From<&MovieRecord> for MovieDetails {
    fn from(record: &MovieRecord) -> Self {
        Self {
            movie_id: record.id,
            title: record.title.clone(),
            genres: record.display.genres.clone(),
            overview: record.display.overview.clone(),
            release_date: record.display.release_date.clone(),
            poster_ref: record.display.poster_ref.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetailResolver {
    table: Arc<FeatureTable>,
}

impl DetailResolver {
    pub fn new(table: Arc<FeatureTable>) -> Self {
        Self { table }
    }

    /// Details of the movie `movie` resolves to
    pub fn get_details(&self, movie: &MovieRef) -> Result<MovieDetails> {
        self.table
            .position_of(movie)
            .and_then(|position| self.table.get(position))
            .map(MovieDetails::from)
            .ok_or_else(|| EngineError::UnknownMovie(movie.to_string()))
    }

    /// Details of a uniformly random movie; `None` for an empty catalog
    pub fn suggest<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<MovieDetails> {
        if self.table.is_empty() {
            return None;
        }
        let position = rng.random_range(0..self.table.len());
        self.table.get(position).map(MovieDetails::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::DisplayMeta;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn create_test_table() -> Arc<FeatureTable> {
        let movie = |id: MovieId, title: &str, poster: Option<&str>| MovieRecord {
            id,
            title: title.to_string(),
            tags: String::new(),
            genres: String::new(),
            keywords: String::new(),
            cast: String::new(),
            production_companies: String::new(),
            display: DisplayMeta {
                genres: vec!["Action".to_string(), "Science Fiction".to_string()],
                overview: format!("About {title}"),
                release_date: "2009-12-10".to_string(),
                poster_ref: poster.map(str::to_string),
            },
        };
        Arc::new(
            FeatureTable::from_rows(vec![
                movie(1, "Avatar", Some("/avatar.jpg")),
                movie(2, "Remake", None),
                movie(3, "Remake", Some("/remake-2.jpg")),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_details_by_title_and_id() {
        let resolver = DetailResolver::new(create_test_table());

        let avatar = resolver.get_details(&MovieRef::from("Avatar")).unwrap();
        assert_eq!(avatar.movie_id, 1);
        assert_eq!(avatar.genres.len(), 2);
        assert_eq!(avatar.poster_ref.as_deref(), Some("/avatar.jpg"));

        let by_id = resolver.get_details(&MovieRef::Id(3)).unwrap();
        assert_eq!(by_id.poster_ref.as_deref(), Some("/remake-2.jpg"));
    }

    #[test]
    fn test_duplicate_title_resolves_to_first_row() {
        let resolver = DetailResolver::new(create_test_table());

        let remake = resolver.get_details(&MovieRef::from("Remake")).unwrap();
        assert_eq!(remake.movie_id, 2);
        // No poster stored, none fabricated
        assert!(remake.poster_ref.is_none());
    }

    #[test]
    fn test_unknown_movie() {
        let resolver = DetailResolver::new(create_test_table());

        let err = resolver.get_details(&MovieRef::from("Unknown Movie")).unwrap_err();
        assert!(matches!(err, EngineError::UnknownMovie(_)));
    }

    #[test]
    fn test_suggest() {
        let resolver = DetailResolver::new(create_test_table());
        let mut rng = StdRng::seed_from_u64(7);

        let pick = resolver.suggest(&mut rng).unwrap();
        assert!((1..=3).contains(&pick.movie_id));

        let empty = DetailResolver::new(Arc::new(FeatureTable::default()));
        assert!(empty.suggest(&mut rng).is_none());
    }
}
