//! `load` and `enrich` commands: populate the news database.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use newsdesk_core::{ExtractiveSummariser, Summariser};
use newsdesk_data::{ENRICH_BATCH_SIZE, SqliteNewsStore, enrich_summaries, load_articles_from_path};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::output::{EnrichView, LoadView, write_json};
use crate::{
    ARG_BATCH_SIZE, ARG_DATA_FILE, ARG_DB, CliError, DEFAULT_DATA_FILE, DEFAULT_DB,
    require_existing,
};

/// CLI arguments for the `load` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "load",
    long_about = "Read a JSON array of article records and store every new \
                 article with a generated summary. Articles already in the \
                 database are left untouched and invalid records are \
                 reported without stopping the load.",
    about = "Load articles from a JSON data file"
)]
#[ortho_config(prefix = "NEWSDESK")]
pub(crate) struct LoadArgs {
    /// Path to the SQLite news database; created when missing.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Path to the JSON article data file.
    #[arg(long = ARG_DATA_FILE, value_name = "path")]
    #[serde(default)]
    pub(crate) data_file: Option<Utf8PathBuf>,
}

impl LoadArgs {
    fn into_config(self) -> Result<LoadConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(LoadConfig::from(merged))
    }
}

/// Resolved `load` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadConfig {
    pub(crate) db: Utf8PathBuf,
    pub(crate) data_file: Utf8PathBuf,
}

impl From<LoadArgs> for LoadConfig {
    fn from(args: LoadArgs) -> Self {
        Self {
            db: args.db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DB)),
            data_file: args
                .data_file
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATA_FILE)),
        }
    }
}

pub(crate) fn run_load(args: LoadArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_load_with(&config, &ExtractiveSummariser, writer)
}

pub(crate) fn run_load_with(
    config: &LoadConfig,
    summariser: &dyn Summariser,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    require_existing(&config.data_file, ARG_DATA_FILE)?;
    let store = SqliteNewsStore::open(&config.db)?;
    let report =
        load_articles_from_path(&store, &config.data_file, summariser).map_err(|source| {
            CliError::Load {
                path: config.data_file.clone(),
                source,
            }
        })?;
    write_json(writer, &LoadView::from(&report))
}

/// CLI arguments for the `enrich` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "enrich",
    long_about = "Generate summaries for stored articles whose summary is \
                 missing or blank. Articles are committed in batches; a \
                 failed batch is reported and the run continues.",
    about = "Backfill missing article summaries"
)]
#[ortho_config(prefix = "NEWSDESK")]
pub(crate) struct EnrichArgs {
    /// Path to the SQLite news database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Articles summarised per committed batch.
    #[arg(long = ARG_BATCH_SIZE, value_name = "count")]
    #[serde(default)]
    pub(crate) batch_size: Option<usize>,
}

impl EnrichArgs {
    fn into_config(self) -> Result<EnrichConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(EnrichConfig::from(merged))
    }
}

/// Resolved `enrich` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EnrichConfig {
    pub(crate) db: Utf8PathBuf,
    pub(crate) batch_size: usize,
}

impl From<EnrichArgs> for EnrichConfig {
    fn from(args: EnrichArgs) -> Self {
        Self {
            db: args.db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DB)),
            batch_size: args.batch_size.unwrap_or(ENRICH_BATCH_SIZE),
        }
    }
}

pub(crate) fn run_enrich(args: EnrichArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_enrich_with(&config, &ExtractiveSummariser, writer)
}

pub(crate) fn run_enrich_with(
    config: &EnrichConfig,
    summariser: &dyn Summariser,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    require_existing(&config.db, ARG_DB)?;
    let store = SqliteNewsStore::open(&config.db)?;
    let report = enrich_summaries(&store, summariser, config.batch_size)?;
    if report.failed_batches > 0 {
        info!(
            "{} summary batches failed; rerun enrich to retry them",
            report.failed_batches
        );
    }
    write_json(writer, &EnrichView::from(report))
}
