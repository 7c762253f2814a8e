//! Flat-file article loading.
//!
//! The input is a JSON array of article records:
//!
//! ```json
//! [{
//!   "id": "5b1f0c3e-8f4a-4c52-9d55-1f0b7b4b9a01",
//!   "title": "Harbour reopens",
//!   "description": "The harbour reopened on Monday.",
//!   "url": "https://news.example/harbour",
//!   "publication_date": "2025-03-14T08:30:00Z",
//!   "source_name": "Chronicle",
//!   "category": ["local"],
//!   "relevance_score": 0.72,
//!   "latitude": 37.77,
//!   "longitude": -122.42
//! }]
//! ```
//!
//! Records whose id is already stored are skipped. Invalid records are
//! rejected individually and reported; they never abort the load.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{info, warn};
use newsdesk_core::{Article, ArticleError, StoreError, Summariser};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::SqliteNewsStore;
use crate::fs::read_to_string;

const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Deserialize)]
struct ArticleRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
    publication_date: String,
    #[serde(default)]
    source_name: String,
    #[serde(default, alias = "categories")]
    category: Vec<String>,
    relevance_score: f32,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Why a single record was rejected.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record did not have the expected shape.
    #[error("record is malformed")]
    Malformed {
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// The id was not a UUID.
    #[error("invalid article id '{id}'")]
    InvalidId {
        /// Offending id.
        id: String,
        /// Parse error.
        #[source]
        source: uuid::Error,
    },
    /// The publication date matched no accepted format.
    #[error("invalid publication date '{value}'")]
    InvalidDate {
        /// Offending text.
        value: String,
    },
    /// The article failed validation.
    #[error(transparent)]
    Article(#[from] ArticleError),
}

/// A record that was not loaded.
#[derive(Debug)]
pub struct RejectedRecord {
    /// Zero-based position in the input array.
    pub index: usize,
    /// Rejection reason.
    pub error: RecordError,
}

/// Outcome of a load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Records in the input.
    pub total: usize,
    /// Newly stored articles.
    pub inserted: usize,
    /// Records whose id was already stored.
    pub skipped_existing: usize,
    /// Records that failed validation.
    pub rejected: Vec<RejectedRecord>,
}

/// Errors that abort a load.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The data file could not be read.
    #[error("failed to read article data from {path}")]
    Read {
        /// Data file location.
        path: Utf8PathBuf,
        /// Filesystem error.
        #[source]
        source: io::Error,
    },
    /// The input was not a JSON array.
    #[error("article data is not a JSON array")]
    NotAnArray {
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// The store rejected a write.
    #[error("failed to store articles")]
    Store(#[from] StoreError),
}

/// Load the JSON array at `path` into `store`.
///
/// # Errors
/// Returns [`LoadError::Read`] when the file cannot be read and otherwise as
/// [`load_articles`].
pub fn load_articles_from_path<S>(
    store: &SqliteNewsStore,
    path: &Utf8Path,
    summariser: &S,
) -> Result<LoadReport, LoadError>
where
    S: Summariser + ?Sized,
{
    let json = read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let report = load_articles(store, &json, summariser)?;
    info!(
        "loaded {} of {} articles from {path} ({} existing, {} rejected)",
        report.inserted,
        report.total,
        report.skipped_existing,
        report.rejected.len()
    );
    Ok(report)
}

/// Load a JSON array of article records into `store`.
///
/// New articles receive a summary from `summariser`.
///
/// # Errors
/// Returns [`LoadError::NotAnArray`] when `json` is not an array and
/// [`LoadError::Store`] when the store fails.
///
/// # Examples
/// ```
/// use newsdesk_core::ExtractiveSummariser;
/// use newsdesk_data::{SqliteNewsStore, load_articles};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteNewsStore::open_in_memory()?;
/// let json = r#"[
///     {"id": "00000000-0000-0000-0000-000000000001", "title": "Harbour reopens",
///      "publication_date": "2025-03-14T08:30:00Z", "relevance_score": 0.7},
///     {"id": "not-a-uuid", "title": "Broken", "publication_date": "2025-03-14",
///      "relevance_score": 0.1}
/// ]"#;
/// let report = load_articles(&store, json, &ExtractiveSummariser)?;
/// assert_eq!((report.total, report.inserted, report.rejected.len()), (2, 1, 1));
/// # Ok(())
/// # }
/// ```
pub fn load_articles<S>(
    store: &SqliteNewsStore,
    json: &str,
    summariser: &S,
) -> Result<LoadReport, LoadError>
where
    S: Summariser + ?Sized,
{
    let records: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|source| LoadError::NotAnArray { source })?;
    let mut report = LoadReport {
        total: records.len(),
        ..LoadReport::default()
    };

    for (index, value) in records.into_iter().enumerate() {
        let article = match parse_record(value) {
            Ok(article) => article,
            Err(error) => {
                warn!("rejecting article record {index}: {error}");
                report.rejected.push(RejectedRecord { index, error });
                continue;
            }
        };
        if store.contains_article(article.id)? {
            report.skipped_existing += 1;
            continue;
        }
        let summary = summariser.summarise(&article.title, &article.description);
        let summarised = Article {
            summary: Some(summary),
            ..article
        };
        if store.insert_article(&summarised)? {
            report.inserted += 1;
        } else {
            report.skipped_existing += 1;
        }
    }
    Ok(report)
}

fn parse_record(value: serde_json::Value) -> Result<Article, RecordError> {
    let record: ArticleRecord =
        serde_json::from_value(value).map_err(|source| RecordError::Malformed { source })?;
    let id = Uuid::parse_str(record.id.trim()).map_err(|source| RecordError::InvalidId {
        id: record.id.clone(),
        source,
    })?;
    let publication_date = parse_publication_date(&record.publication_date)?;
    Article::builder(id, record.title)
        .description(record.description)
        .url(record.url)
        .publication_date(publication_date)
        .source_name(record.source_name)
        .categories(record.category)
        .relevance_score(record.relevance_score)
        .coordinates(record.latitude, record.longitude)
        .build()
        .map_err(RecordError::from)
}

/// Parse an ISO 8601 instant.
///
/// Accepts RFC 3339 with `Z` or an offset, a naive date-time (taken as UTC)
/// with `T` or a space separator, or a bare date (midnight UTC).
///
/// # Errors
/// Returns [`RecordError::InvalidDate`] when no format matches.
///
/// # Examples
/// ```
/// use newsdesk_data::parse_publication_date;
///
/// # fn main() -> Result<(), newsdesk_data::RecordError> {
/// let zulu = parse_publication_date("2025-03-14T08:30:00Z")?;
/// let offset = parse_publication_date("2025-03-14T10:30:00+02:00")?;
/// let naive = parse_publication_date("2025-03-14 08:30:00")?;
/// assert_eq!(zulu, offset);
/// assert_eq!(zulu, naive);
/// # Ok(())
/// # }
/// ```
pub fn parse_publication_date(value: &str) -> Result<DateTime<Utc>, RecordError> {
    let text = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RecordError::InvalidDate {
            value: value.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use newsdesk_core::{ArticleLookup, ExtractiveSummariser};
    use rstest::{fixture, rstest};

    const FIRST_ID: &str = "00000000-0000-0000-0000-000000000001";

    #[fixture]
    fn store() -> SqliteNewsStore {
        SqliteNewsStore::open_in_memory().expect("open store")
    }

    fn record(id: &str, date: &str) -> String {
        format!(
            r#"{{"id": "{id}", "title": "Tram line extension approved by council",
                "description": "Construction begins in spring across the city centre.",
                "url": "https://news.example/tram", "publication_date": "{date}",
                "source_name": "Chronicle", "category": ["local", "transport"],
                "relevance_score": 0.8, "latitude": 37.77, "longitude": -122.42}}"#
        )
    }

    #[rstest]
    #[case("2025-03-14T08:30:00Z")]
    #[case("2025-03-14T09:30:00+01:00")]
    #[case("2025-03-14T08:30:00")]
    #[case("2025-03-14 08:30:00.000")]
    fn accepts_date_forms(#[case] text: &str) {
        let expected = Utc
            .with_ymd_and_hms(2025, 3, 14, 8, 30, 0)
            .single()
            .expect("valid date");
        assert_eq!(parse_publication_date(text).expect("parse"), expected);
    }

    #[rstest]
    fn bare_dates_are_midnight_utc() {
        let expected = Utc
            .with_ymd_and_hms(2025, 3, 14, 0, 0, 0)
            .single()
            .expect("valid date");
        assert_eq!(
            parse_publication_date("2025-03-14").expect("parse"),
            expected
        );
    }

    #[rstest]
    #[case("14/03/2025")]
    #[case("")]
    fn rejects_unknown_dates(#[case] text: &str) {
        assert!(matches!(
            parse_publication_date(text),
            Err(RecordError::InvalidDate { .. })
        ));
    }

    #[rstest]
    fn loads_and_summarises_new_articles(store: SqliteNewsStore) {
        let json = format!("[{}]", record(FIRST_ID, "2025-03-14T08:30:00Z"));
        let report = load_articles(&store, &json, &ExtractiveSummariser).expect("load");
        assert_eq!(report.inserted, 1);

        let id = Uuid::parse_str(FIRST_ID).expect("uuid");
        let article = store.get_by_id(id).expect("lookup").expect("stored");
        assert_eq!(article.categories, vec!["local", "transport"]);
        assert_eq!(
            article.summary.as_deref(),
            Some(
                "Tram line extension approved by council. \
                 Construction begins in spring across the city centre."
            )
        );
    }

    #[rstest]
    fn reloading_skips_existing_ids(store: SqliteNewsStore) {
        let json = format!("[{}]", record(FIRST_ID, "2025-03-14T08:30:00Z"));
        load_articles(&store, &json, &ExtractiveSummariser).expect("first load");
        let report = load_articles(&store, &json, &ExtractiveSummariser).expect("second load");
        assert_eq!((report.inserted, report.skipped_existing), (0, 1));
        assert_eq!(store.article_count().expect("count"), 1);
    }

    #[rstest]
    fn invalid_records_are_counted_not_fatal(store: SqliteNewsStore) {
        let json = format!(
            "[{}, {}, {}, {{\"title\": \"No id\"}}]",
            record(FIRST_ID, "2025-03-14T08:30:00Z"),
            record("00000000-0000-0000-0000-000000000002", "yesterday"),
            record("bad-id", "2025-03-14"),
        );
        let report = load_articles(&store, &json, &ExtractiveSummariser).expect("load");
        assert_eq!(report.total, 4);
        assert_eq!(report.inserted, 1);
        let reasons: Vec<(usize, bool, bool, bool)> = report
            .rejected
            .iter()
            .map(|rejected| {
                (
                    rejected.index,
                    matches!(rejected.error, RecordError::InvalidDate { .. }),
                    matches!(rejected.error, RecordError::InvalidId { .. }),
                    matches!(rejected.error, RecordError::Malformed { .. }),
                )
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                (1, true, false, false),
                (2, false, true, false),
                (3, false, false, true)
            ]
        );
    }

    #[rstest]
    fn out_of_range_relevance_is_rejected(store: SqliteNewsStore) {
        let json = format!("[{}]", record(FIRST_ID, "2025-03-14").replace("0.8", "1.8"));
        let report = load_articles(&store, &json, &ExtractiveSummariser).expect("load");
        assert!(matches!(
            report.rejected.first().map(|rejected| &rejected.error),
            Some(RecordError::Article(ArticleError::RelevanceOutOfRange { .. }))
        ));
    }

    #[rstest]
    fn non_array_input_aborts(store: SqliteNewsStore) {
        let err = load_articles(&store, "{\"id\": 1}", &ExtractiveSummariser).expect_err("object");
        assert!(matches!(err, LoadError::NotAnArray { .. }));
    }
}
