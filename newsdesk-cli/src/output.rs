//! JSON views written to stdout by every command.

use std::io::Write;

use newsdesk_core::{Article, QueryAnswer, QueryIntent};
use newsdesk_data::{EnrichReport, LoadReport};
use newsdesk_trending::TrendingResult;
use serde::{Deserialize, Serialize};

use crate::CliError;

/// An article as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub publication_date: String,
    pub source_name: String,
    pub category: Vec<String>,
    pub relevance_score: f32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub llm_summary: Option<String>,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.to_string(),
            title: article.title.clone(),
            description: article.description.clone(),
            url: article.url.clone(),
            publication_date: article.publication_date.to_rfc3339(),
            source_name: article.source_name.clone(),
            category: article.categories.clone(),
            relevance_score: article.relevance_score,
            latitude: article.location.map(|coord| coord.y),
            longitude: article.location.map(|coord| coord.x),
            llm_summary: article.summary.clone(),
        }
    }
}

fn article_views(articles: &[Article]) -> Vec<ArticleView> {
    articles.iter().map(ArticleView::from).collect()
}

/// Articles listed by `find`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleListView {
    pub articles: Vec<ArticleView>,
    pub total_results: usize,
}

impl ArticleListView {
    pub fn new(articles: &[Article]) -> Self {
        Self {
            articles: article_views(articles),
            total_results: articles.len(),
        }
    }
}

/// One ranked article printed by `trending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingArticleView {
    #[serde(flatten)]
    pub article: ArticleView,
    pub trending_score: f64,
}

/// Result printed by `trending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingView {
    pub articles: Vec<TrendingArticleView>,
    pub location_cluster: String,
    pub total_count: usize,
    pub computed_at: String,
}

impl From<&TrendingResult> for TrendingView {
    fn from(result: &TrendingResult) -> Self {
        Self {
            articles: result
                .articles
                .iter()
                .map(|entry| TrendingArticleView {
                    article: ArticleView::from(&entry.article),
                    trending_score: entry.score,
                })
                .collect(),
            location_cluster: result.location_cluster.as_str().to_owned(),
            total_count: result.total_count,
            computed_at: result.computed_at.to_rfc3339(),
        }
    }
}

/// Result printed by `query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryView {
    pub query_used: String,
    pub intent: QueryIntent,
    pub entities: Vec<String>,
    pub confidence: f32,
    pub total_results: usize,
    pub articles: Vec<ArticleView>,
}

impl From<&QueryAnswer> for QueryView {
    fn from(answer: &QueryAnswer) -> Self {
        Self {
            query_used: answer.query_used.clone(),
            intent: answer.analysis.intent,
            entities: answer.analysis.entities.clone(),
            confidence: answer.analysis.confidence,
            total_results: answer.total_results(),
            articles: article_views(&answer.articles),
        }
    }
}

/// A record skipped by `load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedView {
    pub index: usize,
    pub reason: String,
}

/// Result printed by `load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadView {
    pub total: usize,
    pub inserted: usize,
    pub skipped_existing: usize,
    pub rejected: Vec<RejectedView>,
}

impl From<&LoadReport> for LoadView {
    fn from(report: &LoadReport) -> Self {
        Self {
            total: report.total,
            inserted: report.inserted,
            skipped_existing: report.skipped_existing,
            rejected: report
                .rejected
                .iter()
                .map(|record| RejectedView {
                    index: record.index,
                    reason: record.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Result printed by `enrich`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichView {
    pub pending: usize,
    pub updated: usize,
    pub failed_batches: usize,
}

impl From<EnrichReport> for EnrichView {
    fn from(report: EnrichReport) -> Self {
        Self {
            pending: report.pending,
            updated: report.updated,
            failed_batches: report.failed_batches,
        }
    }
}

/// Write `view` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, view: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(view).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
