//! Simple test harness for the recommendation engine.
//!
//! Loads a catalog, makes sure every similarity matrix is built, and logs
//! recommendations for the first movie along each dimension.
//!
//! Usage: `server [CATALOG] [CACHE_DIR]`

use std::env;

use anyhow::{Context, Result};
use tracing::{info, warn};

use data_loader::{JsonLinesCatalog, MovieRef};
use server::{EngineConfig, RecommendationEngine};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,server=debug")),
        )
        .init();

    let mut args = env::args().skip(1);
    let catalog_path = args.next().unwrap_or_else(|| "data/movies.jsonl".to_string());
    let mut config = EngineConfig::default();
    if let Some(cache_dir) = args.next() {
        config = config.with_cache_dir(cache_dir);
    }

    info!("Starting ReelRecs engine test harness");
    let catalog = JsonLinesCatalog::new(&catalog_path);
    let engine = RecommendationEngine::open(config, &catalog)
        .with_context(|| format!("Failed to open engine over {catalog_path}"))?;

    for (dimension, result) in engine.ensure_all_built() {
        match result {
            Ok(status) => info!("{}: {}", dimension, status),
            Err(e) => warn!("{}: {}", dimension, e),
        }
    }

    let Some(first) = engine.table().get(0) else {
        info!("Catalog is empty, nothing to recommend");
        return Ok(());
    };
    let movie = MovieRef::Id(first.id);
    info!("Recommendations for '{}':", first.title);

    for &dimension in &engine.config().dimensions {
        match engine.recommend_default(&movie, dimension) {
            Ok(recommendations) => {
                for (i, rec) in recommendations.iter().enumerate() {
                    info!("[{}] {}. {} - Score: {:.3}", dimension, i + 1, rec.title, rec.score);
                }
            }
            Err(e) => warn!("[{}] {}", dimension, e),
        }
    }

    Ok(())
}
