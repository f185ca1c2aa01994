//! Server crate for the ReelRecs recommendation engine.
//!
//! This crate contains the engine context that ties the feature table,
//! the build pipeline and the artifact cache together, plus the detail
//! resolver used to display results.

pub mod config;
pub mod details;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use details::{DetailResolver, MovieDetails};
pub use engine::{BuildStatus, FEATURE_TABLE_KEY, Recommendation, RecommendationEngine};
pub use error::{EngineError, Result};
