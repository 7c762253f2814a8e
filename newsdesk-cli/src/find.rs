//! `find` command: direct catalogue listings.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use newsdesk_core::{ArticleCatalog, DEFAULT_QUERY_LIMIT, NEARBY_QUERY_RADIUS_KM};
use newsdesk_data::SqliteNewsStore;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::{ArticleListView, write_json};
use crate::{
    ARG_CATEGORY, ARG_DB, ARG_LAT, ARG_LIMIT, ARG_LON, ARG_MIN_SCORE, ARG_RADIUS_KM, ARG_SEARCH,
    ARG_SOURCE, CliError, DEFAULT_DB, ENV_FIND_LAT, ENV_FIND_LON, optional_location,
    require_existing,
};

/// CLI arguments for the `find` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "find",
    long_about = "List stored articles using exactly one selector: a \
                 category tag, a source name fragment, free-text terms, a \
                 minimum relevance score, or a location with a radius.",
    about = "List articles matching one selector"
)]
#[ortho_config(prefix = "NEWSDESK")]
pub(crate) struct FindArgs {
    /// Path to the SQLite news database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Category tag, matched whole and ignoring case.
    #[arg(long = ARG_CATEGORY, value_name = "name")]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Fragment of the source name, ignoring case.
    #[arg(long = ARG_SOURCE, value_name = "name")]
    #[serde(default)]
    pub(crate) source: Option<String>,
    /// Terms matched against titles and descriptions.
    #[arg(long = ARG_SEARCH, value_name = "terms")]
    #[serde(default)]
    pub(crate) search: Option<String>,
    /// Inclusive minimum relevance score.
    #[arg(long = ARG_MIN_SCORE, value_name = "score")]
    #[serde(default)]
    pub(crate) min_score: Option<f32>,
    /// Latitude of the search centre.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the search centre.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Search radius in kilometres (default 10).
    #[arg(long = ARG_RADIUS_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) radius_km: Option<f64>,
    /// Maximum number of articles.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

impl FindArgs {
    fn into_config(self) -> Result<FindConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FindConfig::try_from(merged)
    }
}

/// The listing requested by `find`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FindSelector {
    Category(String),
    Source(String),
    Search(String),
    MinScore(f32),
    Nearby { centre: Coord<f64>, radius_km: f64 },
}

/// Resolved `find` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FindConfig {
    pub(crate) db: Utf8PathBuf,
    pub(crate) selector: FindSelector,
    pub(crate) limit: usize,
}

impl TryFrom<FindArgs> for FindConfig {
    type Error = CliError;

    fn try_from(args: FindArgs) -> Result<Self, Self::Error> {
        let location = optional_location(args.lat, args.lon, ENV_FIND_LAT, ENV_FIND_LON)?;
        let radius_km = args.radius_km.unwrap_or(NEARBY_QUERY_RADIUS_KM);
        let selectors: Vec<FindSelector> = [
            args.category.map(FindSelector::Category),
            args.source.map(FindSelector::Source),
            args.search.map(FindSelector::Search),
            args.min_score.map(FindSelector::MinScore),
            location.map(|centre| FindSelector::Nearby { centre, radius_km }),
        ]
        .into_iter()
        .flatten()
        .collect();
        let [selector] = <[FindSelector; 1]>::try_from(selectors)
            .map_err(|_| CliError::FindSelector)?;
        Ok(Self {
            db: args.db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DB)),
            selector,
            limit: args.limit.unwrap_or(DEFAULT_QUERY_LIMIT),
        })
    }
}

pub(crate) fn run_find(args: FindArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_find_with(&config, writer)
}

pub(crate) fn run_find_with(config: &FindConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    require_existing(&config.db, ARG_DB)?;
    let store = SqliteNewsStore::open(&config.db)?;
    let limit = config.limit;
    let articles = match &config.selector {
        FindSelector::Category(category) => store.by_category(category, limit)?,
        FindSelector::Source(source) => store.by_source(source, limit)?,
        FindSelector::Search(terms) => store.search(terms, limit)?,
        FindSelector::MinScore(min_score) => store.by_min_score(*min_score, limit)?,
        FindSelector::Nearby { centre, radius_km } => store.nearby(*centre, *radius_km, limit)?,
    };
    write_json(writer, &ArticleListView::new(&articles))
}
