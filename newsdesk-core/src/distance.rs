//! Great-circle distance and coordinate validation.
//!
//! Coordinates use `geo::Coord` with `x = longitude` and `y = latitude`, in
//! degrees. [`distance_km`] performs no validation of its own; callers that
//! accept coordinates from outside the process should run
//! [`validate_coordinate`] first.

use geo::Coord;
use thiserror::Error;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Inclusive latitude bounds in degrees.
pub const LATITUDE_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

/// Inclusive longitude bounds in degrees.
pub const LONGITUDE_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;

/// Errors returned by [`validate_coordinate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was not finite or fell outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    /// Longitude was not finite or fell outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

/// Validate a latitude/longitude pair and return it as a [`Coord`].
///
/// # Errors
/// Returns [`CoordinateError`] when either component is non-finite or out of
/// range.
///
/// # Examples
/// ```
/// use newsdesk_core::validate_coordinate;
///
/// let coord = validate_coordinate(37.77, -122.42)?;
/// assert_eq!(coord.y, 37.77);
/// assert!(validate_coordinate(91.0, 0.0).is_err());
/// # Ok::<(), newsdesk_core::CoordinateError>(())
/// ```
pub fn validate_coordinate(lat: f64, lon: f64) -> Result<Coord<f64>, CoordinateError> {
    if !lat.is_finite() || !LATITUDE_RANGE.contains(&lat) {
        return Err(CoordinateError::Latitude(lat));
    }
    if !lon.is_finite() || !LONGITUDE_RANGE.contains(&lon) {
        return Err(CoordinateError::Longitude(lon));
    }
    Ok(Coord { x: lon, y: lat })
}

/// Haversine distance between two coordinates in kilometres.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use newsdesk_core::distance_km;
///
/// let london = Coord { x: -0.1278, y: 51.5074 };
/// let paris = Coord { x: 2.3522, y: 48.8566 };
/// let km = distance_km(london, paris);
/// assert!((km - 343.5).abs() < 1.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
pub fn distance_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat_a = a.y.to_radians();
    let lat_b = b.y.to_radians();
    let delta_lat = (b.y - a.y).to_radians();
    let delta_lon = (b.x - a.x).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());

    EARTH_RADIUS_KM * angle
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests compare floating-point distances"
)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn coord(lat: f64, lon: f64) -> Coord<f64> {
        Coord { x: lon, y: lat }
    }

    #[rstest]
    #[case(coord(0.0, 0.0), coord(0.0, 1.0), 111.19)]
    #[case(coord(37.7749, -122.4194), coord(34.0522, -118.2437), 559.12)]
    #[case(coord(90.0, 0.0), coord(-90.0, 0.0), 20_015.09)]
    fn matches_known_distances(#[case] a: Coord<f64>, #[case] b: Coord<f64>, #[case] km: f64) {
        let actual = distance_km(a, b);
        assert!((actual - km).abs() < 0.5, "expected ~{km}, got {actual}");
    }

    #[rstest]
    fn nan_input_propagates() {
        assert!(distance_km(coord(f64::NAN, 0.0), coord(0.0, 0.0)).is_nan());
    }

    #[rstest]
    #[case(-90.0, -180.0)]
    #[case(90.0, 180.0)]
    #[case(0.0, 0.0)]
    fn accepts_boundary_coordinates(#[case] lat: f64, #[case] lon: f64) {
        assert_eq!(validate_coordinate(lat, lon), Ok(coord(lat, lon)));
    }

    #[rstest]
    #[case(90.5, 0.0, CoordinateError::Latitude(90.5))]
    #[case(0.0, -180.5, CoordinateError::Longitude(-180.5))]
    fn rejects_out_of_range(#[case] lat: f64, #[case] lon: f64, #[case] err: CoordinateError) {
        assert_eq!(validate_coordinate(lat, lon), Err(err));
    }

    #[rstest]
    fn rejects_non_finite() {
        assert!(matches!(
            validate_coordinate(f64::NAN, 0.0),
            Err(CoordinateError::Latitude(_))
        ));
        assert!(matches!(
            validate_coordinate(0.0, f64::INFINITY),
            Err(CoordinateError::Longitude(_))
        ));
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(
            lat_a in -90.0_f64..=90.0,
            lon_a in -180.0_f64..=180.0,
            lat_b in -90.0_f64..=90.0,
            lon_b in -180.0_f64..=180.0,
        ) {
            let forward = distance_km(coord(lat_a, lon_a), coord(lat_b, lon_b));
            let backward = distance_km(coord(lat_b, lon_b), coord(lat_a, lon_a));
            prop_assert!((forward - backward).abs() < 1e-9);
        }

        #[test]
        fn distance_to_self_is_zero(lat in -90.0_f64..=90.0, lon in -180.0_f64..=180.0) {
            prop_assert_eq!(distance_km(coord(lat, lon), coord(lat, lon)), 0.0);
        }
    }
}
