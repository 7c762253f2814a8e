//! Tables backing [`SqliteNewsStore`](super::SqliteNewsStore).

use rusqlite::{Connection, OptionalExtension, Transaction};

use super::SqliteStoreError;

/// Schema version written by this crate.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the article, interaction and trending score tables.
///
/// Idempotent for databases already at [`SCHEMA_VERSION`]; other versions
/// are rejected so migrations can be applied explicitly.
///
/// # Errors
/// Returns [`SqliteStoreError::Migration`] when a statement fails and
/// [`SqliteStoreError::VersionMismatch`] for an unexpected stored version.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use newsdesk_data::{SCHEMA_VERSION, initialise_schema};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut conn = Connection::open_in_memory()?;
/// initialise_schema(&mut conn)?;
/// initialise_schema(&mut conn)?;
/// let version: i64 =
///     conn.query_row("SELECT version FROM newsdesk_schema_version", [], |row| row.get(0))?;
/// assert_eq!(version, SCHEMA_VERSION);
/// # Ok(())
/// # }
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let transaction = connection
        .transaction()
        .map_err(|source| SqliteStoreError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_tables(&transaction)?;
    create_indexes(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SqliteStoreError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), SqliteStoreError> {
    run_migration_step(
        transaction,
        "create articles",
        "CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL CHECK (length(trim(title)) > 0),
            description TEXT NOT NULL DEFAULT '',
            url TEXT NOT NULL DEFAULT '',
            publication_date TEXT NOT NULL,
            source_name TEXT NOT NULL DEFAULT '',
            categories TEXT NOT NULL DEFAULT '[]',
            relevance_score REAL NOT NULL,
            latitude REAL,
            longitude REAL,
            summary TEXT
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "create interactions",
        "CREATE TABLE IF NOT EXISTS interactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            article_id TEXT NOT NULL,
            interaction_type TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            user_latitude REAL,
            user_longitude REAL
        )",
    )?;
    run_migration_step(
        transaction,
        "create trending_scores",
        "CREATE TABLE IF NOT EXISTS trending_scores (
            article_id TEXT NOT NULL,
            location_cluster TEXT NOT NULL,
            trending_score REAL NOT NULL,
            calculated_at TEXT NOT NULL,
            PRIMARY KEY (article_id, location_cluster)
        ) WITHOUT ROWID",
    )
}

fn create_indexes(transaction: &Transaction<'_>) -> Result<(), SqliteStoreError> {
    run_migration_step(
        transaction,
        "index articles by date",
        "CREATE INDEX IF NOT EXISTS idx_articles_publication_date
            ON articles(publication_date)",
    )?;
    run_migration_step(
        transaction,
        "index articles by relevance",
        "CREATE INDEX IF NOT EXISTS idx_articles_relevance
            ON articles(relevance_score)",
    )?;
    run_migration_step(
        transaction,
        "index trending_scores by cluster",
        "CREATE INDEX IF NOT EXISTS idx_trending_scores_cluster
            ON trending_scores(location_cluster, trending_score)",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), SqliteStoreError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS newsdesk_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing: Option<i64> = transaction
        .query_row(
            "SELECT version FROM newsdesk_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| SqliteStoreError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(SqliteStoreError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO newsdesk_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| SqliteStoreError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SqliteStoreError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SqliteStoreError::Migration { step, source })
}
