//! Validated WGS84 coordinate pairs.

use crate::error::PointError;

/// Number of fractional digits kept for stored coordinates.
///
/// Matches the `numeric(10, 7)` columns of the `geo_points` table.
pub const COORDINATE_SCALE: i32 = 7;

const SCALE_FACTOR: f64 = 10_000_000.0;

/// A latitude/longitude pair in decimal degrees.
///
/// Construction validates the ranges and rounds both values to
/// [`COORDINATE_SCALE`] fractional digits, so the decimal columns and the
/// encoded geometry always carry the exact same numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validates and normalises a `(latitude, longitude)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Validation`] if either value is not finite,
    /// the latitude is outside `[-90, 90]` or the longitude is outside
    /// `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PointError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(PointError::Validation(format!(
                "latitude must be within [-90, 90], got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(PointError::Validation(format!(
                "longitude must be within [-180, 180], got {longitude}"
            )));
        }
        Ok(Self {
            latitude: round_to_scale(latitude),
            longitude: round_to_scale(longitude),
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns the pair as a [`geo::Point`] in GIS axis order (x = longitude).
    #[must_use]
    pub fn to_geo_point(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

/// Rounds to [`COORDINATE_SCALE`] fractional digits.
///
/// `-0.0` is folded into `0.0` so equal coordinates encode identically.
fn round_to_scale(value: f64) -> f64 {
    let rounded = (value * SCALE_FACTOR).round() / SCALE_FACTOR;
    if rounded == 0.0 { 0.0 } else { rounded }
}
