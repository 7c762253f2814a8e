//! Backfill summaries for stored articles that lack one.

use log::{info, warn};
use newsdesk_core::{StoreError, Summariser};
use thiserror::Error;

use crate::SqliteNewsStore;

/// Articles summarised and committed together.
pub const ENRICH_BATCH_SIZE: usize = 10;

/// Outcome of an enrichment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrichReport {
    /// Articles that needed a summary.
    pub pending: usize,
    /// Articles whose summary was written.
    pub updated: usize,
    /// Batches whose commit failed; their articles keep no summary.
    pub failed_batches: usize,
}

/// Errors that stop enrichment before any batch runs.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// The pending articles could not be listed.
    #[error("failed to list articles without summaries")]
    Pending {
        /// Store failure.
        #[source]
        source: StoreError,
    },
}

/// Summarise every stored article whose summary is missing or blank.
///
/// Articles are processed in batches of `batch_size` (at least one); each
/// batch is committed on its own, so a failed commit is counted and the
/// run continues with the next batch.
///
/// # Errors
/// Returns [`EnrichError::Pending`] when the pending articles cannot be read.
///
/// # Examples
/// ```
/// use newsdesk_core::{Article, ExtractiveSummariser};
/// use newsdesk_data::{ENRICH_BATCH_SIZE, SqliteNewsStore, enrich_summaries};
/// use uuid::Uuid;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteNewsStore::open_in_memory()?;
/// let article = Article::builder(Uuid::from_u128(1), "Council approves new cycle lanes")
///     .description("Work starts next month.")
///     .build()?;
/// store.insert_article(&article)?;
///
/// let report = enrich_summaries(&store, &ExtractiveSummariser, ENRICH_BATCH_SIZE)?;
/// assert_eq!((report.pending, report.updated), (1, 1));
/// assert!(store.articles_needing_summary()?.is_empty());
/// # Ok(())
/// # }
/// ```
pub fn enrich_summaries<S>(
    store: &SqliteNewsStore,
    summariser: &S,
    batch_size: usize,
) -> Result<EnrichReport, EnrichError>
where
    S: Summariser + ?Sized,
{
    let pending = store
        .articles_needing_summary()
        .map_err(|source| EnrichError::Pending { source })?;
    let mut report = EnrichReport {
        pending: pending.len(),
        ..EnrichReport::default()
    };
    if pending.is_empty() {
        info!("every article already has a summary");
        return Ok(report);
    }

    for batch in pending.chunks(batch_size.max(1)) {
        let summaries: Vec<_> = batch
            .iter()
            .map(|article| {
                (
                    article.id,
                    summariser.summarise(&article.title, &article.description),
                )
            })
            .collect();
        match store.update_summaries(&summaries) {
            Ok(updated) => report.updated += updated,
            Err(err) => {
                warn!("summary batch of {} articles failed: {err}", batch.len());
                report.failed_batches += 1;
            }
        }
    }
    info!(
        "enriched {} of {} articles ({} failed batches)",
        report.updated, report.pending, report.failed_batches
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsdesk_core::ArticleLookup;
    use newsdesk_core::test_support::sample_articles;
    use rstest::{fixture, rstest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingSummariser {
        calls: AtomicUsize,
    }

    impl Summariser for CountingSummariser {
        fn summarise(&self, title: &str, _description: &str) -> String {
            self.calls.fetch_add(1, Ordering::Relaxed);
            format!("Summary of {title}")
        }
    }

    #[fixture]
    fn store() -> SqliteNewsStore {
        let store = SqliteNewsStore::open_in_memory().expect("open store");
        for article in sample_articles() {
            store.insert_article(&article).expect("insert");
        }
        store
    }

    #[rstest]
    #[case(ENRICH_BATCH_SIZE)]
    #[case(2)]
    #[case(0)]
    fn fills_every_missing_summary(store: SqliteNewsStore, #[case] batch_size: usize) {
        let summariser = CountingSummariser::default();
        let report = enrich_summaries(&store, &summariser, batch_size).expect("enrich");
        assert_eq!(
            report,
            EnrichReport {
                pending: 5,
                updated: 5,
                failed_batches: 0
            }
        );
        assert_eq!(summariser.calls.load(Ordering::Relaxed), 5);
        let first = sample_articles().remove(0);
        let stored = store.get_by_id(first.id).expect("lookup").expect("stored");
        assert_eq!(
            stored.summary.as_deref(),
            Some("Summary of Telescope captures distant galaxy")
        );
    }

    #[rstest]
    fn second_run_has_nothing_to_do(store: SqliteNewsStore) {
        let summariser = CountingSummariser::default();
        enrich_summaries(&store, &summariser, ENRICH_BATCH_SIZE).expect("first run");
        let report = enrich_summaries(&store, &summariser, ENRICH_BATCH_SIZE).expect("second run");
        assert_eq!(report, EnrichReport::default());
        assert_eq!(summariser.calls.load(Ordering::Relaxed), 5);
    }
}
