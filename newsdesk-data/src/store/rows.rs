//! Row encoding for the news tables.
//!
//! Identifiers are stored as hyphenated UUID text, instants as RFC 3339
//! text with microsecond precision and a `Z` suffix so that lexical order
//! matches chronological order, and categories as a JSON array.

use chrono::{DateTime, SecondsFormat, Utc};
use geo::Coord;
use newsdesk_core::{Article, ArticleId, InteractionEvent, InteractionKind};
use rusqlite::Row;
use rusqlite::types::Type;
use uuid::Uuid;

/// Column list matching [`article_from_row`].
pub(super) const ARTICLE_COLUMNS: &str = "id, title, description, url, publication_date, \
     source_name, categories, relevance_score, latitude, longitude, summary";

/// Column list matching [`event_from_row`].
pub(super) const EVENT_COLUMNS: &str =
    "article_id, user_id, interaction_type, timestamp, user_latitude, user_longitude";

pub(super) fn encode_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(super) fn encode_categories(categories: &[String]) -> rusqlite::Result<String> {
    serde_json::to_string(categories)
        .map_err(|err| rusqlite::Error::ToSqlConversionFailure(Box::new(err)))
}

pub(super) fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    let categories: String = row.get(6)?;
    Ok(Article {
        id: decode_id(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        url: row.get(3)?,
        publication_date: decode_instant(row, 4)?,
        source_name: row.get(5)?,
        categories: serde_json::from_str(&categories)
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(err)))?,
        relevance_score: row.get(7)?,
        location: decode_location(row.get(8)?, row.get(9)?),
        summary: row.get(10)?,
    })
}

pub(super) fn event_from_row(row: &Row<'_>) -> rusqlite::Result<InteractionEvent> {
    let raw_kind: String = row.get(2)?;
    let kind: InteractionKind = raw_kind.parse().map_err(|message: String| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, message.into())
    })?;
    Ok(InteractionEvent {
        article_id: decode_id(row, 0)?,
        actor_id: row.get(1)?,
        kind,
        location: decode_location(row.get(4)?, row.get(5)?),
        timestamp: decode_instant(row, 3)?,
    })
}

pub(super) fn decode_id(row: &Row<'_>, index: usize) -> rusqlite::Result<ArticleId> {
    let text: String = row.get(index)?;
    Uuid::parse_str(&text)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

pub(super) fn decode_instant(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err)))
}

const fn decode_location(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coord<f64>> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Some(Coord { x: lon, y: lat }),
        _ => None,
    }
}
