//! News articles as served by the query and trending operations.

use chrono::{DateTime, Utc};
use geo::Coord;
use thiserror::Error;
use uuid::Uuid;

use crate::{CoordinateError, validate_coordinate};

/// Unique article identifier.
pub type ArticleId = Uuid;

/// A news article with optional location and generated summary.
///
/// # Examples
/// ```
/// use uuid::Uuid;
/// use newsdesk_core::Article;
///
/// # fn main() -> Result<(), newsdesk_core::ArticleError> {
/// let article = Article::builder(Uuid::from_u128(1), "Bridge reopens")
///     .source_name("Chronicle")
///     .categories(["local", "transport", "local"])
///     .relevance_score(0.8)
///     .coordinates(Some(37.77), Some(-122.42))
///     .build()?;
/// assert_eq!(article.categories, vec!["local", "transport"]);
/// assert!(article.location.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    /// Unique identifier.
    pub id: ArticleId,
    /// Headline.
    pub title: String,
    /// Standfirst or body excerpt.
    pub description: String,
    /// Canonical link.
    pub url: String,
    /// Publication instant.
    pub publication_date: DateTime<Utc>,
    /// Publisher name.
    pub source_name: String,
    /// Category tags in first-seen order, without duplicates.
    pub categories: Vec<String>,
    /// Editorial relevance in `0.0..=1.0`.
    pub relevance_score: f32,
    /// Location the story concerns (`x = lon`, `y = lat`).
    pub location: Option<Coord<f64>>,
    /// Generated summary, when enrichment has run.
    pub summary: Option<String>,
}

impl Article {
    /// Start building an article with the mandatory fields.
    #[must_use]
    pub fn builder(id: ArticleId, title: impl Into<String>) -> ArticleBuilder {
        ArticleBuilder::new(id, title.into())
    }

    /// Report whether the article carries a usable location.
    #[must_use]
    pub const fn is_located(&self) -> bool {
        self.location.is_some()
    }

    /// Report whether any category matches `category`, ignoring ASCII case.
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(category))
    }

    /// Report whether the summary is missing or blank.
    #[must_use]
    pub fn needs_summary(&self) -> bool {
        self.summary
            .as_deref()
            .is_none_or(|text| text.trim().is_empty())
    }
}

/// Errors returned by [`ArticleBuilder::build`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArticleError {
    /// The headline was empty or whitespace.
    #[error("article {id} must have a title")]
    EmptyTitle {
        /// Identifier of the rejected article.
        id: ArticleId,
    },
    /// The relevance score was outside `0.0..=1.0`.
    #[error("article {id} relevance score {score} is outside [0, 1]")]
    RelevanceOutOfRange {
        /// Identifier of the rejected article.
        id: ArticleId,
        /// Offending score.
        score: f32,
    },
    /// Both coordinates were present but invalid.
    #[error("article {id} has an invalid location")]
    InvalidLocation {
        /// Identifier of the rejected article.
        id: ArticleId,
        /// Validation failure.
        #[source]
        source: CoordinateError,
    },
}

/// Builder validating [`Article`] invariants.
#[derive(Debug, Clone)]
pub struct ArticleBuilder {
    id: ArticleId,
    title: String,
    description: String,
    url: String,
    publication_date: DateTime<Utc>,
    source_name: String,
    categories: Vec<String>,
    relevance_score: f32,
    latitude: Option<f64>,
    longitude: Option<f64>,
    summary: Option<String>,
}

impl ArticleBuilder {
    fn new(id: ArticleId, title: String) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            url: String::new(),
            publication_date: DateTime::<Utc>::default(),
            source_name: String::new(),
            categories: Vec::new(),
            relevance_score: 0.0,
            latitude: None,
            longitude: None,
            summary: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the canonical URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the publication instant.
    #[must_use]
    pub fn publication_date(mut self, date: DateTime<Utc>) -> Self {
        self.publication_date = date;
        self
    }

    /// Set the publisher name.
    #[must_use]
    pub fn source_name(mut self, source: impl Into<String>) -> Self {
        self.source_name = source.into();
        self
    }

    /// Set category tags; duplicates are dropped.
    #[must_use]
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Vec::new();
        for category in categories {
            let tag = category.into();
            if !self.categories.contains(&tag) {
                self.categories.push(tag);
            }
        }
        self
    }

    /// Set the editorial relevance score.
    #[must_use]
    pub fn relevance_score(mut self, score: f32) -> Self {
        self.relevance_score = score;
        self
    }

    /// Set raw coordinates; a lone latitude or longitude is ignored.
    #[must_use]
    pub fn coordinates(mut self, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Set the generated summary.
    #[must_use]
    pub fn summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }

    /// Validate and construct the [`Article`].
    ///
    /// # Errors
    /// Returns [`ArticleError`] for a blank title, an out-of-range relevance
    /// score or an invalid coordinate pair.
    pub fn build(self) -> Result<Article, ArticleError> {
        let id = self.id;
        if self.title.trim().is_empty() {
            return Err(ArticleError::EmptyTitle { id });
        }
        if !(0.0..=1.0).contains(&self.relevance_score) {
            return Err(ArticleError::RelevanceOutOfRange {
                id,
                score: self.relevance_score,
            });
        }
        let location = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(
                validate_coordinate(lat, lon)
                    .map_err(|source| ArticleError::InvalidLocation { id, source })?,
            ),
            _ => None,
        };
        Ok(Article {
            id,
            title: self.title,
            description: self.description,
            url: self.url,
            publication_date: self.publication_date,
            source_name: self.source_name,
            categories: self.categories,
            relevance_score: self.relevance_score,
            location,
            summary: self.summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn builder() -> ArticleBuilder {
        Article::builder(Uuid::from_u128(7), "Harbour festival returns")
    }

    #[rstest]
    fn partial_coordinates_are_absent(builder: ArticleBuilder) {
        let article = builder
            .coordinates(Some(51.5), None)
            .build()
            .expect("valid article");
        assert!(article.location.is_none());
    }

    #[rstest]
    fn full_coordinates_are_kept(builder: ArticleBuilder) {
        let article = builder
            .coordinates(Some(51.5), Some(-0.12))
            .build()
            .expect("valid article");
        assert_eq!(article.location, Some(Coord { x: -0.12, y: 51.5 }));
    }

    #[rstest]
    fn rejects_blank_title() {
        let err = Article::builder(Uuid::from_u128(1), "   ")
            .build()
            .expect_err("blank title");
        assert!(matches!(err, ArticleError::EmptyTitle { .. }));
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.01)]
    fn rejects_relevance_out_of_range(builder: ArticleBuilder, #[case] score: f32) {
        let err = builder
            .relevance_score(score)
            .build()
            .expect_err("score out of range");
        assert!(matches!(err, ArticleError::RelevanceOutOfRange { .. }));
    }

    #[rstest]
    fn rejects_invalid_location(builder: ArticleBuilder) {
        let err = builder
            .coordinates(Some(120.0), Some(0.0))
            .build()
            .expect_err("latitude out of range");
        assert!(matches!(err, ArticleError::InvalidLocation { .. }));
    }

    #[rstest]
    fn category_match_ignores_case(builder: ArticleBuilder) {
        let article = builder
            .categories(["Technology"])
            .build()
            .expect("valid article");
        assert!(article.has_category("technology"));
        assert!(!article.has_category("sports"));
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(String::from("  ")), true)]
    #[case(Some(String::from("Summary.")), false)]
    fn detects_missing_summary(
        builder: ArticleBuilder,
        #[case] summary: Option<String>,
        #[case] expected: bool,
    ) {
        let article = builder.summary(summary).build().expect("valid article");
        assert_eq!(article.needs_summary(), expected);
    }
}
