use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{Dimension, JsonLinesCatalog, MovieId, MovieRef};
use server::{
    EngineConfig, FEATURE_TABLE_KEY, MovieDetails, Recommendation, RecommendationEngine,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Shown when a movie has no poster reference
const POSTER_PLACEHOLDER: &str = "placeholder.png";

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Content-based movie recommendations from tag, genre, keyword, cast and studio similarity", long_about = None)]
struct Cli {
    /// Path to the cleaned movie catalog (JSON Lines)
    #[arg(short, long, default_value = "data/movies.jsonl")]
    catalog: PathBuf,

    /// Directory for cached artifacts
    #[arg(long, default_value = server::config::DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,

    /// Vocabulary cap used when vectorizing
    #[arg(long, default_value_t = pipeline_default_limit())]
    vocabulary_limit: usize,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Movie selection shared by several commands
#[derive(Args)]
#[group(required = true, multiple = false)]
struct MovieArgs {
    /// Exact movie title (first match wins for duplicates)
    #[arg(long)]
    title: Option<String>,

    /// Movie id
    #[arg(long)]
    id: Option<MovieId>,
}

impl MovieArgs {
    fn to_ref(&self) -> Result<MovieRef> {
        match (&self.title, self.id) {
            (Some(title), None) => Ok(MovieRef::Title(title.clone())),
            (None, Some(id)) => Ok(MovieRef::Id(id)),
            _ => Err(anyhow!("pass exactly one of --title or --id")),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or verify) cached similarity matrices
    Build {
        /// Only this dimension (default: all)
        #[arg(long)]
        dimension: Option<String>,
    },

    /// Get movies similar to a movie
    Recommend {
        #[command(flatten)]
        movie: MovieArgs,

        /// Feature dimension to compare on
        #[arg(long, default_value = "tags")]
        dimension: String,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Show genres, release date and overview for each result
        #[arg(long)]
        details: bool,
    },

    /// Show display metadata for a movie
    Details {
        #[command(flatten)]
        movie: MovieArgs,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Suggest a random movie
    Suggest,

    /// Delete cached artifacts so they are rebuilt
    Clear {
        /// Similarity matrix to delete
        #[arg(long, required_unless_present = "table")]
        dimension: Option<String>,

        /// Also delete the cached feature table (re-ingest on next start)
        #[arg(long)]
        table: bool,
    },
}

fn pipeline_default_limit() -> usize {
    EngineConfig::default().vocabulary_limit
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::new()
        .with_cache_dir(&cli.cache_dir)
        .with_vocabulary_limit(cli.vocabulary_limit);

    // Load the feature table (from cache when available)
    let start = Instant::now();
    let catalog = JsonLinesCatalog::new(&cli.catalog);
    let engine = RecommendationEngine::open(config, &catalog)
        .with_context(|| format!("Failed to open catalog {}", cli.catalog.display()))?;
    if !cli.json {
        println!(
            "{} Loaded {} movies in {:?}",
            "✓".green(),
            engine.table().len(),
            start.elapsed()
        );
    }

    // Dispatch to appropriate command handler
    match &cli.command {
        Commands::Build { dimension } => handle_build(&engine, dimension.as_deref(), cli.json)?,
        Commands::Recommend {
            movie,
            dimension,
            limit,
            details,
        } => handle_recommend(&engine, &movie.to_ref()?, dimension, *limit, *details, cli.json)?,
        Commands::Details { movie } => handle_details(&engine, &movie.to_ref()?, cli.json)?,
        Commands::Search { title } => handle_search(&engine, title, cli.json)?,
        Commands::Suggest => handle_suggest(&engine, cli.json)?,
        Commands::Clear { dimension, table } => {
            handle_clear(&engine, dimension.as_deref(), *table)?
        }
    }

    Ok(())
}

/// Handle the 'build' command
fn handle_build(engine: &RecommendationEngine, dimension: Option<&str>, json: bool) -> Result<()> {
    let results = match dimension {
        Some(name) => {
            let dimension = engine.dimension(name)?;
            vec![(dimension, engine.ensure_built(dimension))]
        }
        None => engine.ensure_all_built(),
    };

    let mut failures = 0;
    let mut report = Vec::new();
    for (dimension, result) in results {
        match result {
            Ok(status) => {
                report.push(serde_json::json!({ "dimension": dimension, "status": status }));
                if !json {
                    println!("{} {}: {}", "•".green(), dimension, status);
                }
            }
            Err(e) => {
                failures += 1;
                report.push(serde_json::json!({ "dimension": dimension, "error": e.to_string() }));
                if !json {
                    println!("{} {}: {}", "✗".red(), dimension, e);
                }
            }
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    info!("Build finished with {} failure(s)", failures);
    if failures > 0 {
        bail!("{} dimension(s) failed to build", failures);
    }
    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    engine: &RecommendationEngine,
    movie: &MovieRef,
    dimension: &str,
    limit: usize,
    details: bool,
    json: bool,
) -> Result<()> {
    let dimension = engine.dimension(dimension)?;
    debug!("Recommending {} movies for {} on {}", limit, movie, dimension);
    let recommendations = engine
        .recommend(movie, dimension, limit)
        .with_context(|| format!("Could not recommend for {movie} on {dimension}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    print_recommendations(movie, dimension, &recommendations);
    if details {
        for rec in &recommendations {
            let info = engine.get_details(&MovieRef::Id(rec.movie_id))?;
            print_details(&info);
        }
    }
    Ok(())
}

/// Handle the 'details' command
fn handle_details(engine: &RecommendationEngine, movie: &MovieRef, json: bool) -> Result<()> {
    let details = engine.get_details(movie)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        print_details(&details);
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(engine: &RecommendationEngine, title: &str, json: bool) -> Result<()> {
    let matches = engine.search(title, 20);
    debug!("Search '{}' matched {} movies", title, matches.len());

    if json {
        let hits: Vec<_> = matches
            .iter()
            .map(|m| serde_json::json!({ "movie_id": m.id, "title": m.title }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for movie in matches {
        println!(
            "{}: {} [{}] {}",
            movie.id,
            movie.title,
            movie.display.genres.join(", "),
            movie.display.release_date
        );
    }
    Ok(())
}

/// Handle the 'suggest' command
fn handle_suggest(engine: &RecommendationEngine, json: bool) -> Result<()> {
    let details = engine
        .suggest(&mut rand::rng())
        .ok_or_else(|| anyhow!("The catalog is empty"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
    } else {
        println!("{}", "Auto-suggested movie:".bold().blue());
        print_details(&details);
    }
    Ok(())
}

/// Handle the 'clear' command
fn handle_clear(engine: &RecommendationEngine, dimension: Option<&str>, table: bool) -> Result<()> {
    if let Some(name) = dimension {
        let dimension: Dimension = engine.dimension(name)?;
        let removed = engine.clear(dimension)?;
        println!(
            "{} {} similarity {}",
            "•".green(),
            dimension,
            if removed { "cleared" } else { "was not cached" }
        );
    }
    if table {
        let removed = engine.cache().remove(FEATURE_TABLE_KEY)?;
        println!(
            "{} feature table {}",
            "•".green(),
            if removed { "cleared" } else { "was not cached" }
        );
    }
    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(movie: &MovieRef, dimension: Dimension, recommendations: &[Recommendation]) {
    println!(
        "{}",
        format!("Best recommendations for {} based on {}:", movie, dimension)
            .bold()
            .blue()
    );
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} (id {}) - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.title,
            rec.movie_id,
            rec.score
        );
    }
}

fn print_details(details: &MovieDetails) {
    println!("{}", details.title.bold());
    println!("  {}Poster: {}", "• ".cyan(), details.poster_ref.as_deref().unwrap_or(POSTER_PLACEHOLDER));
    println!("  {}Genres: {}", "• ".cyan(), details.genres.join(" . "));
    println!("  {}Release Date: {}", "• ".cyan(), details.release_date);
    println!("  {}Overview: {}", "• ".cyan(), details.overview);
}
