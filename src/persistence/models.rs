//! Database row models for the `geo_points` table.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Coordinates, Owner, OwnerId, Point, PointCategory, PointId, ProximityMatch};
use crate::error::PointError;
use crate::geometry::EncodedGeometry;

/// A `geo_points` row joined with the owner's username.
///
/// Decimal columns are read as `float8` and the geometry as EWKB bytes.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PointRow {
    /// Primary key.
    pub id: Uuid,
    /// `numeric(10, 7)` latitude cast to `float8`.
    pub latitude: f64,
    /// `numeric(10, 7)` longitude cast to `float8`.
    pub longitude: f64,
    /// `ST_AsEWKB(geom)`.
    pub geom: Vec<u8>,
    /// Category name.
    pub category: String,
    /// Optional description.
    pub description: Option<String>,
    /// Author of the point.
    pub owner_id: Uuid,
    /// `users.username`, if the owner exists in the user table.
    pub owner_name: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A [`PointRow`] with its distance from a search origin.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProximityRow {
    /// The point columns.
    #[sqlx(flatten)]
    pub point: PointRow,
    /// `ST_Distance` on `geography`, in meters.
    pub distance_m: f64,
}

impl TryFrom<PointRow> for Point {
    type Error = PointError;

    fn try_from(row: PointRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<PointCategory>()
            .map_err(|e| PointError::Persistence(format!("point {}: {e}", row.id)))?;
        let coordinates = Coordinates::new(row.latitude, row.longitude)
            .map_err(|e| PointError::Persistence(format!("point {}: {e}", row.id)))?;
        let geometry = EncodedGeometry::from_bytes(row.geom)?;

        Self::from_stored(
            PointId::from_uuid(row.id),
            coordinates,
            geometry,
            category,
            row.description,
            Owner {
                id: OwnerId::from_uuid(row.owner_id),
                display_name: row.owner_name,
            },
            row.created_at,
            row.updated_at,
        )
    }
}

impl TryFrom<ProximityRow> for ProximityMatch {
    type Error = PointError;

    fn try_from(row: ProximityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            point: Point::try_from(row.point)?,
            distance_m: row.distance_m,
        })
    }
}
