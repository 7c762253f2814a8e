//! `query` command: natural-language retrieval.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use log::info;
use newsdesk_core::{DEFAULT_QUERY_LIMIT, KeywordOnlyAnalyser, QueryRouter, TextAnalyser};
use newsdesk_data::{
    DEFAULT_ANALYSER_ENDPOINT, HttpTextAnalyser, HttpTextAnalyserConfig, SqliteNewsStore,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::{QueryView, write_json};
use crate::{
    ARG_ANALYSER_API_KEY, ARG_ANALYSER_ENDPOINT, ARG_DB, ARG_LAT, ARG_LIMIT, ARG_LON,
    ARG_QUERY_TEXT, CliError, DEFAULT_DB, ENV_QUERY_LAT, ENV_QUERY_LON, ENV_QUERY_TEXT,
    optional_location, require_existing,
};

/// CLI arguments for the `query` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "query",
    long_about = "Classify a free-text question by keyword, extract its \
                 salient entities, and answer it from the catalogue. \
                 Entity extraction calls the analysis service when an API \
                 key is configured and is skipped otherwise. Location \
                 questions need --lat and --lon.",
    about = "Answer a natural-language news question"
)]
#[ortho_config(prefix = "NEWSDESK")]
pub(crate) struct QueryArgs {
    /// The question, for example "technology news from Reuters".
    #[arg(value_name = ARG_QUERY_TEXT)]
    #[serde(default)]
    pub(crate) text: Option<String>,
    /// Path to the SQLite news database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Reader latitude in degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Reader longitude in degrees.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Maximum number of articles.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Base URL of the entity analysis service.
    #[arg(long = ARG_ANALYSER_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) analyser_endpoint: Option<String>,
    /// API key for the entity analysis service.
    #[arg(long = ARG_ANALYSER_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) analyser_api_key: Option<String>,
}

impl QueryArgs {
    fn into_config(self) -> Result<QueryConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        QueryConfig::try_from(merged)
    }
}

/// Resolved `query` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QueryConfig {
    pub(crate) text: String,
    pub(crate) db: Utf8PathBuf,
    pub(crate) location: Option<Coord<f64>>,
    pub(crate) limit: usize,
    pub(crate) analyser_endpoint: String,
    pub(crate) analyser_api_key: Option<String>,
}

impl TryFrom<QueryArgs> for QueryConfig {
    type Error = CliError;

    fn try_from(args: QueryArgs) -> Result<Self, Self::Error> {
        let text = args.text.ok_or(CliError::MissingArgument {
            field: ARG_QUERY_TEXT,
            env: ENV_QUERY_TEXT,
        })?;
        let location = optional_location(args.lat, args.lon, ENV_QUERY_LAT, ENV_QUERY_LON)?;
        Ok(Self {
            text,
            db: args.db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DB)),
            location,
            limit: args.limit.unwrap_or(DEFAULT_QUERY_LIMIT),
            analyser_endpoint: args
                .analyser_endpoint
                .unwrap_or_else(|| DEFAULT_ANALYSER_ENDPOINT.to_owned()),
            analyser_api_key: args.analyser_api_key,
        })
    }
}

/// Builds the entity analyser for the current query invocation.
pub(crate) trait AnalyserBuilder {
    fn build(&self, config: &QueryConfig) -> Result<Box<dyn TextAnalyser>, CliError>;
}

pub(crate) struct DefaultAnalyserBuilder;

impl AnalyserBuilder for DefaultAnalyserBuilder {
    fn build(&self, config: &QueryConfig) -> Result<Box<dyn TextAnalyser>, CliError> {
        let Some(api_key) = &config.analyser_api_key else {
            info!("no analyser API key configured; routing on keywords only");
            return Ok(Box::new(KeywordOnlyAnalyser));
        };
        let analyser_config = HttpTextAnalyserConfig::new(config.analyser_endpoint.clone())
            .with_api_key(api_key.clone());
        let analyser = HttpTextAnalyser::with_config(analyser_config).map_err(|source| {
            CliError::BuildAnalyser {
                endpoint: config.analyser_endpoint.clone(),
                source,
            }
        })?;
        Ok(Box::new(analyser))
    }
}

pub(crate) fn run_query(args: QueryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_query_with(&config, &DefaultAnalyserBuilder, writer)
}

pub(crate) fn run_query_with(
    config: &QueryConfig,
    builder: &dyn AnalyserBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    require_existing(&config.db, ARG_DB)?;
    let store = SqliteNewsStore::open(&config.db)?;
    let analyser = builder.build(config)?;
    let router = QueryRouter::new(store, analyser).with_limit(config.limit);
    let answer = router.answer(&config.text, config.location)?;
    write_json(writer, &QueryView::from(&answer))
}
