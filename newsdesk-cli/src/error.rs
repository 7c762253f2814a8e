//! Error types emitted by the Newsdesk CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use newsdesk_core::{CoordinateError, QueryError, StoreError};
use newsdesk_data::{AnalyserBuildError, EnrichError, LoadError, SqliteStoreError};
use newsdesk_trending::{SimulationError, TrendingError, TrendingQueryError};
use thiserror::Error;

/// Errors emitted by the Newsdesk CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// `find` needs exactly one selector.
    #[error("find needs exactly one of --category, --source, --search, --min-score or --lat/--lon")]
    FindSelector,
    /// A reader location was out of range.
    #[error("invalid location: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the news database failed.
    #[error(transparent)]
    OpenStore(#[from] SqliteStoreError),
    /// The news database failed during a command.
    #[error("news database failed: {0}")]
    Store(#[from] StoreError),
    /// Loading the article data file failed.
    #[error("failed to load articles from {path:?}: {source}")]
    Load {
        path: Utf8PathBuf,
        #[source]
        source: LoadError,
    },
    /// Listing articles for enrichment failed.
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    /// The trending query was out of range.
    #[error("invalid trending query: {0}")]
    TrendingQuery(#[from] TrendingQueryError),
    /// The simulator configuration was rejected.
    #[error("invalid interaction simulation: {0}")]
    Simulation(#[from] SimulationError),
    /// Ranking trending articles failed.
    #[error("trending ranking failed: {0}")]
    Trending(#[from] TrendingError),
    /// Constructing the text analyser failed.
    #[error("failed to build text analyser for {endpoint:?}: {source}")]
    BuildAnalyser {
        endpoint: String,
        #[source]
        source: AnalyserBuildError,
    },
    /// Answering a natural-language query failed.
    #[error("query failed: {0}")]
    Query(#[from] QueryError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
