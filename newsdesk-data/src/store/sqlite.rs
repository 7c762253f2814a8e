//! Store trait implementations over a single SQLite connection.

use std::fmt;
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use log::debug;
use newsdesk_core::{
    Article, ArticleCatalog, ArticleId, ArticleLookup, InteractionEvent, InteractionStore,
    LocationCluster, StoreError, TrendingScoreEntry, rank_by_distance, search_terms,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Params, params, params_from_iter};

use super::rows::{
    ARTICLE_COLUMNS, EVENT_COLUMNS, article_from_row, decode_id, decode_instant,
    encode_categories, encode_instant, event_from_row,
};
use super::{SqliteStoreError, initialise_schema};
use crate::fs::ensure_parent_dir;

/// News store persisted in one SQLite database.
///
/// Implements [`ArticleLookup`], [`ArticleCatalog`] and [`InteractionStore`]
/// so the same handle can back trending and query routing. Access is
/// serialised through a mutex around the connection.
///
/// # Examples
/// ```
/// use newsdesk_core::{Article, ArticleLookup};
/// use newsdesk_data::SqliteNewsStore;
/// use uuid::Uuid;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteNewsStore::open_in_memory()?;
/// let article = Article::builder(Uuid::from_u128(1), "Ferry timetable changes").build()?;
/// assert!(store.insert_article(&article)?);
/// assert!(!store.insert_article(&article)?);
/// assert_eq!(store.get_by_id(article.id)?, Some(article));
/// # Ok(())
/// # }
/// ```
pub struct SqliteNewsStore {
    connection: Mutex<Connection>,
    path: Option<Utf8PathBuf>,
}

impl fmt::Debug for SqliteNewsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteNewsStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteNewsStore {
    /// Open or create the database at `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the directory or database cannot be
    /// created or the schema cannot be initialised.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(path).map_err(|source| SqliteStoreError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| SqliteStoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_connection(connection, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the schema cannot be initialised.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| SqliteStoreError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(connection, None)
    }

    fn from_connection(
        mut connection: Connection,
        path: Option<Utf8PathBuf>,
    ) -> Result<Self, SqliteStoreError> {
        initialise_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
            path,
        })
    }

    /// Location of the database file; `None` when in memory.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    fn with_connection<T, F>(&self, operation: &'static str, action: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T>,
    {
        let mut connection = self
            .connection
            .lock()
            .map_err(|_| StoreError::Poisoned { operation })?;
        action(&mut *connection).map_err(|err| StoreError::unavailable(operation, err))
    }

    fn query_articles<P: Params>(
        &self,
        operation: &'static str,
        sql: &str,
        params: P,
    ) -> Result<Vec<Article>, StoreError> {
        self.with_connection(operation, |connection| {
            let mut statement = connection.prepare(sql)?;
            let rows = statement.query_map(params, article_from_row)?;
            rows.collect()
        })
    }

    /// Insert `article` unless its id is already stored.
    ///
    /// Returns `true` when a row was written.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the row cannot be written.
    pub fn insert_article(&self, article: &Article) -> Result<bool, StoreError> {
        self.with_connection("insert article", |connection| {
            let inserted = connection.execute(
                "INSERT OR IGNORE INTO articles (id, title, description, url, publication_date, \
                 source_name, categories, relevance_score, latitude, longitude, summary) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    article.id.to_string(),
                    article.title,
                    article.description,
                    article.url,
                    encode_instant(article.publication_date),
                    article.source_name,
                    encode_categories(&article.categories)?,
                    article.relevance_score,
                    article.location.map(|location| location.y),
                    article.location.map(|location| location.x),
                    article.summary,
                ],
            )?;
            Ok(inserted == 1)
        })
    }

    /// Report whether an article with `id` is stored.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    pub fn contains_article(&self, id: ArticleId) -> Result<bool, StoreError> {
        self.with_connection("check article", |connection| {
            connection
                .query_row(
                    "SELECT 1 FROM articles WHERE id = ?1",
                    [id.to_string()],
                    |_| Ok(()),
                )
                .optional()
                .map(|found| found.is_some())
        })
    }

    /// Number of stored articles.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    pub fn article_count(&self) -> Result<usize, StoreError> {
        self.with_connection("count articles", |connection| {
            connection.query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))
        })
    }

    /// Articles whose summary is missing or blank, in id order.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    pub fn articles_needing_summary(&self) -> Result<Vec<Article>, StoreError> {
        self.query_articles(
            "articles needing summary",
            &format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles \
                 WHERE summary IS NULL OR trim(summary) = '' ORDER BY id"
            ),
            [],
        )
    }

    /// Write summaries for several articles in one transaction.
    ///
    /// Returns how many articles were updated; unknown ids are ignored.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the batch cannot be committed; no summary
    /// from the batch is kept in that case.
    pub fn update_summaries(&self, summaries: &[(ArticleId, String)]) -> Result<usize, StoreError> {
        self.with_connection("update summaries", |connection| {
            let transaction = connection.transaction()?;
            let mut updated = 0;
            {
                let mut statement =
                    transaction.prepare("UPDATE articles SET summary = ?2 WHERE id = ?1")?;
                for (id, summary) in summaries {
                    updated += statement.execute(params![id.to_string(), summary])?;
                }
            }
            transaction.commit()?;
            Ok(updated)
        })
    }

    /// Upsert trending score snapshots, one row per article and cluster.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the snapshots cannot be committed.
    pub fn record_scores(&self, entries: &[TrendingScoreEntry]) -> Result<usize, StoreError> {
        self.with_connection("record trending scores", |connection| {
            let transaction = connection.transaction()?;
            {
                let mut statement = transaction.prepare(
                    "INSERT INTO trending_scores \
                     (article_id, location_cluster, trending_score, calculated_at) \
                     VALUES (?1, ?2, ?3, ?4) \
                     ON CONFLICT (article_id, location_cluster) DO UPDATE SET \
                     trending_score = excluded.trending_score, \
                     calculated_at = excluded.calculated_at",
                )?;
                for entry in entries {
                    statement.execute(params![
                        entry.article_id.to_string(),
                        entry.location_cluster.as_str(),
                        entry.score,
                        encode_instant(entry.computed_at),
                    ])?;
                }
            }
            transaction.commit()?;
            debug!("recorded {} trending score snapshots", entries.len());
            Ok(entries.len())
        })
    }

    /// Recorded snapshots for `cluster`, highest score first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the store cannot be queried.
    pub fn scores_for_cluster(
        &self,
        cluster: &LocationCluster,
        limit: usize,
    ) -> Result<Vec<TrendingScoreEntry>, StoreError> {
        self.with_connection("read trending scores", |connection| {
            let mut statement = connection.prepare(
                "SELECT article_id, trending_score, calculated_at FROM trending_scores \
                 WHERE location_cluster = ?1 ORDER BY trending_score DESC, article_id LIMIT ?2",
            )?;
            let rows = statement.query_map(params![cluster.as_str(), sql_limit(limit)], |row| {
                Ok(TrendingScoreEntry {
                    article_id: decode_id(row, 0)?,
                    location_cluster: cluster.clone(),
                    score: row.get(1)?,
                    computed_at: decode_instant(row, 2)?,
                })
            })?;
            rows.collect()
        })
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl ArticleLookup for SqliteNewsStore {
    fn get_by_id(&self, id: ArticleId) -> Result<Option<Article>, StoreError> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1");
        self.with_connection("get article", |connection| {
            connection
                .query_row(&sql, [id.to_string()], article_from_row)
                .optional()
        })
    }

    fn located_articles(&self, limit: usize) -> Result<Vec<Article>, StoreError> {
        self.query_articles(
            "located articles",
            &format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles \
                 WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
                 ORDER BY publication_date DESC, id LIMIT ?1"
            ),
            [sql_limit(limit)],
        )
    }
}

impl ArticleCatalog for SqliteNewsStore {
    fn by_category(&self, category: &str, limit: usize) -> Result<Vec<Article>, StoreError> {
        self.query_articles(
            "articles by category",
            &format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles \
                 WHERE EXISTS (SELECT 1 FROM json_each(articles.categories) AS tag \
                               WHERE lower(tag.value) = lower(?1)) \
                 ORDER BY publication_date DESC LIMIT ?2"
            ),
            params![category, sql_limit(limit)],
        )
    }

    fn by_source(&self, source: &str, limit: usize) -> Result<Vec<Article>, StoreError> {
        self.query_articles(
            "articles by source",
            &format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles \
                 WHERE instr(lower(source_name), lower(?1)) > 0 \
                 ORDER BY publication_date DESC LIMIT ?2"
            ),
            params![source, sql_limit(limit)],
        )
    }

    fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>, StoreError> {
        let terms = search_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let clauses: Vec<String> = (1..=terms.len())
            .map(|n| format!("instr(lower(title), ?{n}) > 0 OR instr(lower(description), ?{n}) > 0"))
            .collect();
        let limit_param = terms.len() + 1;
        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE {} \
             ORDER BY relevance_score DESC LIMIT ?{limit_param}",
            clauses.join(" OR ")
        );
        let mut values: Vec<Value> = terms.into_iter().map(Value::Text).collect();
        values.push(Value::Integer(sql_limit(limit)));
        self.query_articles("search articles", &sql, params_from_iter(values))
    }

    fn by_min_score(&self, min_score: f32, limit: usize) -> Result<Vec<Article>, StoreError> {
        self.query_articles(
            "articles by score",
            &format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles WHERE relevance_score >= ?1 \
                 ORDER BY relevance_score DESC LIMIT ?2"
            ),
            params![min_score, sql_limit(limit)],
        )
    }

    fn nearby(
        &self,
        centre: Coord<f64>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Article>, StoreError> {
        let located = self.query_articles(
            "nearby articles",
            &format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles \
                 WHERE latitude IS NOT NULL AND longitude IS NOT NULL"
            ),
            [],
        )?;
        Ok(rank_by_distance(located, centre, radius_km, limit))
    }
}

impl InteractionStore for SqliteNewsStore {
    fn append(&self, event: InteractionEvent) -> Result<(), StoreError> {
        self.append_all(vec![event]).map(|_| ())
    }

    fn append_all(&self, events: Vec<InteractionEvent>) -> Result<usize, StoreError> {
        self.with_connection("append interactions", |connection| {
            let transaction = connection.transaction()?;
            {
                let mut statement = transaction.prepare(
                    "INSERT INTO interactions (article_id, user_id, interaction_type, \
                     timestamp, user_latitude, user_longitude) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for event in &events {
                    statement.execute(params![
                        event.article_id.to_string(),
                        event.actor_id,
                        event.kind.as_str(),
                        encode_instant(event.timestamp),
                        event.location.map(|location| location.y),
                        event.location.map(|location| location.x),
                    ])?;
                }
            }
            transaction.commit()?;
            Ok(events.len())
        })
    }

    fn all_events(&self) -> Result<Vec<InteractionEvent>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM interactions ORDER BY id");
        self.with_connection("read interactions", |connection| {
            let mut statement = connection.prepare(&sql)?;
            let rows = statement.query_map([], event_from_row)?;
            rows.collect()
        })
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.with_connection("count interactions", |connection| {
            connection.query_row("SELECT COUNT(*) FROM interactions", [], |row| row.get(0))
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.with_connection("clear interactions", |connection| {
            connection.execute("DELETE FROM interactions", []).map(|_| ())
        })
    }
}
