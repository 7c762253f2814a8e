//! Validated trending requests.

use geo::Coord;
use newsdesk_core::{LocationCluster, validate_coordinate};

use crate::{MAX_LIMIT, TrendingQueryError};

/// A trending request for a location and result size.
///
/// # Examples
/// ```
/// use newsdesk_trending::TrendingQuery;
///
/// # fn main() -> Result<(), newsdesk_trending::TrendingQueryError> {
/// let query = TrendingQuery::new(37.77, -122.42, 5)?;
/// assert_eq!(query.cluster().as_str(), "37.8_-122.4");
/// assert!(TrendingQuery::new(95.0, 0.0, 5).is_err());
/// assert!(TrendingQuery::new(0.0, 0.0, 0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingQuery {
    location: Coord<f64>,
    limit: usize,
}

impl TrendingQuery {
    /// Validate the location and limit.
    ///
    /// # Errors
    /// Returns [`TrendingQueryError::Location`] for a non-finite or
    /// out-of-range coordinate and [`TrendingQueryError::LimitOutOfRange`]
    /// when `limit` is not in `1..=MAX_LIMIT`.
    pub fn new(lat: f64, lon: f64, limit: usize) -> Result<Self, TrendingQueryError> {
        let location = validate_coordinate(lat, lon)?;
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(TrendingQueryError::LimitOutOfRange {
                limit,
                max: MAX_LIMIT,
            });
        }
        Ok(Self { location, limit })
    }

    /// Query point (`x = lon`, `y = lat`).
    #[must_use]
    pub const fn location(&self) -> Coord<f64> {
        self.location
    }

    /// Maximum number of articles to return.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Cluster the query point falls in.
    #[must_use]
    pub fn cluster(&self) -> LocationCluster {
        LocationCluster::from_coord(self.location)
    }
}
