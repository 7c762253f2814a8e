//! `trending` command: rank articles by nearby reader activity.

use std::io::Write;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use log::{debug, warn};
use newsdesk_core::{Clock, SystemClock};
use newsdesk_data::SqliteNewsStore;
use newsdesk_trending::{
    DEFAULT_LIMIT, InteractionSimulator, SimulationConfig, TrendingConfig, TrendingQuery,
    TrendingService,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::{TrendingView, write_json};
use crate::{
    ARG_DB, ARG_LAT, ARG_LIMIT, ARG_LON, ARG_SEED, ARG_SIMULATE, CliError, DEFAULT_DB,
    ENV_TRENDING_LAT, ENV_TRENDING_LON, require_existing,
};

/// CLI arguments for the `trending` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "trending",
    long_about = "Rank stored articles by weighted, recency-decayed reader \
                 interactions recorded near the given location. When the \
                 database holds no interactions, synthetic traffic is \
                 simulated first unless --simulate false is given. Scores \
                 are recorded in the database for the location cluster.",
    about = "Show trending articles near a location"
)]
#[ortho_config(prefix = "NEWSDESK")]
pub(crate) struct TrendingArgs {
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
    /// Maximum number of articles (1 to 50).
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Simulate interactions when the database has none (default true).
    #[arg(long = ARG_SIMULATE, value_name = "bool")]
    #[serde(default)]
    pub(crate) simulate: Option<bool>,
    /// Seed for simulated interactions; random when omitted.
    #[arg(long = ARG_SEED, value_name = "number")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

impl TrendingArgs {
    fn into_config(self) -> Result<TrendingCommandConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TrendingCommandConfig::try_from(merged)
    }
}

/// Resolved `trending` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrendingCommandConfig {
    pub(crate) db: Utf8PathBuf,
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    pub(crate) limit: usize,
    pub(crate) simulate: bool,
    pub(crate) seed: Option<u64>,
}

impl TryFrom<TrendingArgs> for TrendingCommandConfig {
    type Error = CliError;

    fn try_from(args: TrendingArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_TRENDING_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LON,
            env: ENV_TRENDING_LON,
        })?;
        Ok(Self {
            db: args.db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DB)),
            lat,
            lon,
            limit: args.limit.unwrap_or(DEFAULT_LIMIT),
            simulate: args.simulate.unwrap_or(true),
            seed: args.seed,
        })
    }
}

pub(crate) fn run_trending(args: TrendingArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_trending_with(&config, SystemClock, writer)
}

pub(crate) fn run_trending_with<C>(
    config: &TrendingCommandConfig,
    clock: C,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    C: Clock,
{
    require_existing(&config.db, ARG_DB)?;
    let query = TrendingQuery::new(config.lat, config.lon, config.limit)?;
    let store = Arc::new(SqliteNewsStore::open(&config.db)?);
    let seed = config
        .seed
        .unwrap_or_else(|| clock.now().timestamp_micros().unsigned_abs());
    let trending_config = TrendingConfig {
        seed_on_empty: config.simulate,
        ..TrendingConfig::default()
    };
    let mut service = TrendingService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        clock,
        trending_config,
    );
    if config.simulate {
        debug!("simulating interactions with seed {seed} if none are stored");
        service = service.with_seeder(InteractionSimulator::seeded(
            seed,
            SimulationConfig::default(),
        )?);
    }

    let result = service.get_trending(&query)?;
    if let Err(err) = store.record_scores(&result.score_entries()) {
        warn!(
            "failed to record trending scores for {}: {err}",
            result.location_cluster
        );
    }
    write_json(writer, &TrendingView::from(&result))
}
