//! Error types raised by trending queries, scoring and simulation.

use newsdesk_core::{CoordinateError, StoreError};
use rand::distributions::WeightedError;
use thiserror::Error;

/// Errors returned by [`TrendingQuery::new`](crate::TrendingQuery::new).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendingQueryError {
    /// The query point was not a valid coordinate.
    #[error("invalid query location")]
    Location(#[from] CoordinateError),
    /// The requested result size was zero or too large.
    #[error("limit {limit} is outside 1..={max}")]
    LimitOutOfRange {
        /// Requested limit.
        limit: usize,
        /// Largest accepted limit.
        max: usize,
    },
}

/// Errors returned by [`TrendingService::get_trending`](crate::TrendingService::get_trending).
///
/// Failures are never cached.
#[derive(Debug, Error)]
pub enum TrendingError {
    /// Reading or seeding the interaction log failed.
    #[error("interaction store failed")]
    Interactions {
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
    /// Resolving ranked articles failed.
    #[error("article lookup failed")]
    Articles {
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
}

/// Errors returned when building an
/// [`InteractionSimulator`](crate::InteractionSimulator).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// The interaction kind weights cannot form a distribution.
    #[error("interaction kind weights are invalid")]
    KindWeights(#[source] WeightedError),
    /// The actor jitter was negative or not finite.
    #[error("actor jitter {0} must be a finite, non-negative number of degrees")]
    Jitter(f64),
    /// The actor pool was empty.
    #[error("actor pool must contain at least one actor")]
    EmptyActorPool,
}
