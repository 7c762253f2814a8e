//! Command-line interface for the Newsdesk engine.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use geo::Coord;
use newsdesk_core::validate_coordinate;

mod error;
mod find;
mod ingest;
mod output;
mod query;
mod trending;

pub use error::CliError;
pub use output::{
    ArticleListView, ArticleView, EnrichView, LoadView, QueryView, RejectedView,
    TrendingArticleView, TrendingView,
};

use find::FindArgs;
use ingest::{EnrichArgs, LoadArgs};
use query::QueryArgs;
use trending::TrendingArgs;

const ARG_DB: &str = "db";
const ARG_DATA_FILE: &str = "data-file";
const ARG_BATCH_SIZE: &str = "batch-size";
const ARG_LAT: &str = "lat";
const ARG_LON: &str = "lon";
const ARG_LIMIT: &str = "limit";
const ARG_SIMULATE: &str = "simulate";
const ARG_SEED: &str = "seed";
const ARG_CATEGORY: &str = "category";
const ARG_SOURCE: &str = "source";
const ARG_SEARCH: &str = "search";
const ARG_MIN_SCORE: &str = "min-score";
const ARG_RADIUS_KM: &str = "radius-km";
const ARG_QUERY_TEXT: &str = "text";
const ARG_ANALYSER_ENDPOINT: &str = "analyser-endpoint";
const ARG_ANALYSER_API_KEY: &str = "analyser-api-key";
const ENV_TRENDING_LAT: &str = "NEWSDESK_CMDS_TRENDING_LAT";
const ENV_TRENDING_LON: &str = "NEWSDESK_CMDS_TRENDING_LON";
const ENV_FIND_LAT: &str = "NEWSDESK_CMDS_FIND_LAT";
const ENV_FIND_LON: &str = "NEWSDESK_CMDS_FIND_LON";
const ENV_QUERY_LAT: &str = "NEWSDESK_CMDS_QUERY_LAT";
const ENV_QUERY_LON: &str = "NEWSDESK_CMDS_QUERY_LON";
const ENV_QUERY_TEXT: &str = "NEWSDESK_CMDS_QUERY_TEXT";

/// Database used when `--db` is not given.
pub const DEFAULT_DB: &str = "newsdesk.db";
/// Data file used when `--data-file` is not given.
pub const DEFAULT_DATA_FILE: &str = "news_data.json";

/// Run the Newsdesk CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Load(args) => ingest::run_load(args, writer),
        Command::Enrich(args) => ingest::run_enrich(args, writer),
        Command::Trending(args) => trending::run_trending(args, writer),
        Command::Find(args) => find::run_find(args, writer),
        Command::Query(args) => query::run_query(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "newsdesk",
    about = "Load, enrich and retrieve news articles",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load articles from a JSON data file into the database.
    Load(LoadArgs),
    /// Generate summaries for stored articles that lack one.
    Enrich(EnrichArgs),
    /// Rank articles by recent reader activity near a location.
    Trending(TrendingArgs),
    /// List articles by category, source, text, score or distance.
    Find(FindArgs),
    /// Answer a natural-language question about the news.
    Query(QueryArgs),
}

/// Fail unless `path` is an existing regular file.
fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match newsdesk_data::fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Combine optional `lat`/`lon` flags; one without the other is an error.
fn optional_location(
    lat: Option<f64>,
    lon: Option<f64>,
    env_lat: &'static str,
    env_lon: &'static str,
) -> Result<Option<Coord<f64>>, CliError> {
    match (lat, lon) {
        (Some(latitude), Some(longitude)) => Ok(Some(validate_coordinate(latitude, longitude)?)),
        (None, None) => Ok(None),
        (Some(_), None) => Err(CliError::MissingArgument {
            field: ARG_LON,
            env: env_lon,
        }),
        (None, Some(_)) => Err(CliError::MissingArgument {
            field: ARG_LAT,
            env: env_lat,
        }),
    }
}

#[cfg(test)]
mod tests;
