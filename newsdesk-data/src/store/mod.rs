//! SQLite persistence for articles, interactions and trending snapshots.
//!
//! The module is split into focused submodules:
//! - `schema` creates the tables and records the schema version.
//! - `rows` converts between SQLite rows and domain values.
//! - `sqlite` implements the core store traits over one connection.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

mod rows;
mod schema;
mod sqlite;

pub use schema::{SCHEMA_VERSION, initialise_schema};
pub use sqlite::SqliteNewsStore;

/// Errors raised while opening or migrating the news database.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The database directory could not be created.
    #[error("failed to create directory for {path}")]
    CreateDirectory {
        /// Database location.
        path: Utf8PathBuf,
        /// Filesystem error.
        #[source]
        source: io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}")]
    Open {
        /// Database location.
        path: Utf8PathBuf,
        /// Driver error.
        #[source]
        source: rusqlite::Error,
    },
    /// A schema statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Description of the failed step.
        step: &'static str,
        /// Driver error.
        #[source]
        source: rusqlite::Error,
    },
    /// The database was created by an incompatible version.
    #[error(
        "expected news schema version {expected} but found {found}; apply migrations before retrying"
    )]
    VersionMismatch {
        /// Version this crate writes.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
}
