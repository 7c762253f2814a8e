//! Persistence and ingestion for the Newsdesk engine.
//!
//! Responsibilities:
//! - Store articles, interactions and trending scores in SQLite behind the
//!   `newsdesk-core` store traits.
//! - Load articles from JSON files and backfill missing summaries.
//! - Call a remote entity-analysis service for query routing.
//!
//! Boundaries:
//! - Do not encode ranking or routing rules (they live in `newsdesk-core`
//!   and `newsdesk-trending`).
//!
//! Invariants:
//! - Every store operation is safe to call from several threads.
//! - No global mutable state.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod analyser;
mod enrich;
pub mod fs;
mod loader;
mod store;

pub use analyser::{
    AnalyserBuildError, AnalyzeEntitiesRequest, AnalyzeEntitiesResponse,
    DEFAULT_ANALYSER_ENDPOINT, DEFAULT_USER_AGENT, HttpTextAnalyser, HttpTextAnalyserConfig,
    ResponseEntity,
};
pub use enrich::{ENRICH_BATCH_SIZE, EnrichError, EnrichReport, enrich_summaries};
pub use loader::{
    LoadError, LoadReport, RecordError, RejectedRecord, load_articles, load_articles_from_path,
    parse_publication_date,
};
pub use store::{SCHEMA_VERSION, SqliteNewsStore, SqliteStoreError, initialise_schema};
