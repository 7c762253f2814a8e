//! Request and response types for an `analyzeEntities` endpoint.
//!
//! The shapes follow the Cloud Natural Language REST API:
//! <https://cloud.google.com/natural-language/docs/reference/rest/v1/documents/analyzeEntities>

use newsdesk_core::Entity;
use serde::{Deserialize, Serialize};

/// Request body for entity analysis of plain text.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeEntitiesRequest<'a> {
    document: Document<'a>,
    encoding_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

impl<'a> AnalyzeEntitiesRequest<'a> {
    /// Analyse `content` as UTF-8 plain text.
    #[must_use]
    pub const fn plain_text(content: &'a str) -> Self {
        Self {
            document: Document {
                kind: "PLAIN_TEXT",
                content,
            },
            encoding_type: "UTF8",
        }
    }
}

/// Response body; unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeEntitiesResponse {
    /// Entities in the order the service reports them.
    #[serde(default)]
    pub entities: Vec<ResponseEntity>,
}

/// One entity from the response.
#[derive(Debug, Deserialize)]
pub struct ResponseEntity {
    /// Surface text of the entity.
    #[serde(default)]
    pub name: String,
    /// Salience in `0.0..=1.0`.
    #[serde(default)]
    pub salience: f32,
}

impl From<AnalyzeEntitiesResponse> for Vec<Entity> {
    fn from(response: AnalyzeEntitiesResponse) -> Self {
        response
            .entities
            .into_iter()
            .map(|entity| Entity {
                name: entity.name,
                salience: entity.salience,
            })
            .collect()
    }
}
