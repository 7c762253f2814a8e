//! Coarse geographic buckets used as cache and grouping keys.
//!
//! A cluster is the pair of coordinates rounded to one decimal degree, which
//! is roughly an 11 km cell at the equator and narrower towards the poles.
//! Points that round to the same pair share a cluster on purpose; this is
//! the caching granularity, not a precision bug.
//!
//! # Examples
//! ```
//! use newsdesk_core::LocationCluster;
//!
//! let a = LocationCluster::from_lat_lon(1.23, 4.56);
//! let b = LocationCluster::from_lat_lon(1.249, 4.649);
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "1.2_4.6");
//! ```

use std::fmt;

use geo::Coord;

/// Deterministic cluster key derived from a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LocationCluster(String);

impl LocationCluster {
    /// Build the cluster for a latitude/longitude pair.
    #[must_use]
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self(cluster_key(lat, lon))
    }

    /// Build the cluster for a `geo` coordinate (`x = lon`, `y = lat`).
    #[must_use]
    pub fn from_coord(coord: Coord<f64>) -> Self {
        Self::from_lat_lon(coord.y, coord.x)
    }

    /// Borrow the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Format a coordinate as `"{lat}_{lon}"` with one decimal place each.
///
/// Formatting rounds on the exact binary value, so halfway cases resolve
/// the same way on every platform.
#[must_use]
pub fn cluster_key(lat: f64, lon: f64) -> String {
    format!("{}_{}", one_decimal(lat), one_decimal(lon))
}

fn one_decimal(value: f64) -> String {
    let text = format!("{value:.1}");
    // Values in (-0.05, 0) would otherwise print as "-0.0".
    if text == "-0.0" {
        return String::from("0.0");
    }
    text
}
