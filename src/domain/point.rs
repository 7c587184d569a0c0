//! The incident point aggregate and its create/patch inputs.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};

use super::{Coordinates, OwnerId, PointCategory, PointId};
use crate::error::PointError;
use crate::geometry::{EncodedGeometry, codec};

/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Tolerance used when checking that stored coordinates and geometry agree.
const COORDINATE_TOLERANCE: f64 = 1e-7;

/// Author of a point, as needed for projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    /// Owner identifier. Never reassigned after creation.
    pub id: OwnerId,
    /// Username from the user directory, if the owner is known there.
    pub display_name: Option<String>,
}

impl Owner {
    /// An owner known only by id.
    #[must_use]
    pub const fn anonymous(id: OwnerId) -> Self {
        Self {
            id,
            display_name: None,
        }
    }
}

/// A single geo-located incident report.
///
/// Coordinates and geometry are private and only change together through
/// [`Point::relocate`], so the decimal pair and the encoded geometry can
/// never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Unique point identifier (immutable after creation).
    pub id: PointId,
    coordinates: Coordinates,
    geometry: EncodedGeometry,
    /// Incident kind.
    pub category: PointCategory,
    /// Optional free text, at most [`MAX_DESCRIPTION_CHARS`] characters.
    pub description: Option<String>,
    /// Author of the report.
    pub owner: Owner,
    /// Creation timestamp (microsecond precision).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation (microsecond precision).
    pub updated_at: DateTime<Utc>,
}

impl Point {
    /// Builds a brand-new point with a fresh id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Codec`] if the geometry cannot be encoded.
    pub fn create(
        owner: Owner,
        coordinates: Coordinates,
        category: PointCategory,
        description: Option<String>,
    ) -> Result<Self, PointError> {
        let now = now_micros();
        Ok(Self {
            id: PointId::new(),
            coordinates,
            geometry: codec::encode(coordinates)?,
            category,
            description,
            owner,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a point from stored columns.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Codec`] if the geometry does not decode and
    /// [`PointError::Persistence`] if it encodes a different location than
    /// the decimal columns.
    #[allow(clippy::too_many_arguments)]
    pub fn from_stored(
        id: PointId,
        coordinates: Coordinates,
        geometry: EncodedGeometry,
        category: PointCategory,
        description: Option<String>,
        owner: Owner,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, PointError> {
        let decoded = geometry.decode()?;
        if (decoded.x() - coordinates.longitude()).abs() > COORDINATE_TOLERANCE
            || (decoded.y() - coordinates.latitude()).abs() > COORDINATE_TOLERANCE
        {
            return Err(PointError::Persistence(format!(
                "point {id}: stored geometry ({}, {}) disagrees with coordinates ({}, {})",
                decoded.y(),
                decoded.x(),
                coordinates.latitude(),
                coordinates.longitude()
            )));
        }
        Ok(Self {
            id,
            coordinates,
            geometry,
            category,
            description,
            owner,
            created_at,
            updated_at,
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates.latitude()
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates.longitude()
    }

    /// Validated coordinate pair.
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    /// Encoded SRID 4326 geometry of the same location.
    #[must_use]
    pub const fn geometry(&self) -> &EncodedGeometry {
        &self.geometry
    }

    /// Moves the point, re-encoding the geometry in the same step.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Codec`] if the geometry cannot be encoded; the
    /// point is left unchanged.
    pub fn relocate(&mut self, coordinates: Coordinates) -> Result<(), PointError> {
        self.geometry = codec::encode(coordinates)?;
        self.coordinates = coordinates;
        Ok(())
    }

    /// Marks the point as mutated now.
    pub fn touch(&mut self) {
        self.updated_at = next_update_timestamp(self.updated_at);
    }
}

/// A point returned by a proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityMatch {
    /// The matching point.
    pub point: Point,
    /// Geodesic distance from the search origin, in meters.
    pub distance_m: f64,
}

/// Input for creating a point, as supplied by the validation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Incident kind.
    pub category: PointCategory,
    /// Optional free text.
    pub description: Option<String>,
}

/// Partial update of a point. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointPatch {
    /// New latitude.
    pub latitude: Option<f64>,
    /// New longitude.
    pub longitude: Option<f64>,
    /// New category.
    pub category: Option<PointCategory>,
    /// New description; an empty string clears it.
    pub description: Option<String>,
}

impl PointPatch {
    /// Returns `true` if either coordinate is being changed.
    #[must_use]
    pub const fn moves_point(&self) -> bool {
        self.latitude.is_some() || self.longitude.is_some()
    }
}

/// Checks the description length and folds empty text into `None`.
///
/// # Errors
///
/// Returns [`PointError::Validation`] if the text is longer than
/// [`MAX_DESCRIPTION_CHARS`] characters.
pub fn normalize_description(description: Option<String>) -> Result<Option<String>, PointError> {
    match description {
        None => Ok(None),
        Some(text) if text.is_empty() => Ok(None),
        Some(text) => {
            let len = text.chars().count();
            if len > MAX_DESCRIPTION_CHARS {
                return Err(PointError::Validation(format!(
                    "description must be at most {MAX_DESCRIPTION_CHARS} characters, got {len}"
                )));
            }
            Ok(Some(text))
        }
    }
}

/// Current time truncated to the microsecond resolution of `timestamptz`.
#[must_use]
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Next `updated_at` value: now, but always strictly after `previous`.
#[must_use]
pub fn next_update_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros();
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}
