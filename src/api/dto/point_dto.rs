//! Point DTOs for create, update, read and search operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{NewPoint, OwnerId, Point, PointCategory, PointId, PointPatch, ProximityMatch};
use crate::error::PointError;
use crate::geometry::CodecError;
use crate::geometry::export::decode_geometry;
use crate::service::ProximityQuery;

/// Request body for `POST /points`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePointRequest {
    /// Latitude in decimal degrees, `[-90, 90]`.
    pub latitude: f64,
    /// Longitude in decimal degrees, `[-180, 180]`.
    pub longitude: f64,
    /// Incident kind (also accepted as `type`).
    #[serde(alias = "type")]
    pub category: PointCategory,
    /// Optional free text, at most 500 characters.
    #[serde(default)]
    pub description: Option<String>,
}

impl From<CreatePointRequest> for NewPoint {
    fn from(req: CreatePointRequest) -> Self {
        Self {
            latitude: req.latitude,
            longitude: req.longitude,
            category: req.category,
            description: req.description,
        }
    }
}

/// Request body for `PUT`/`PATCH /points/{id}`. Absent fields are kept.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdatePointRequest {
    /// New latitude.
    pub latitude: Option<f64>,
    /// New longitude.
    pub longitude: Option<f64>,
    /// New incident kind (also accepted as `type`).
    #[serde(alias = "type")]
    pub category: Option<PointCategory>,
    /// New description; an empty string clears it.
    pub description: Option<String>,
}

impl From<UpdatePointRequest> for PointPatch {
    fn from(req: UpdatePointRequest) -> Self {
        Self {
            latitude: req.latitude,
            longitude: req.longitude,
            category: req.category,
            description: req.description,
        }
    }
}

/// Query parameters for `GET /points` and `GET /points/geojson`.
///
/// Either none or all of `lat`, `lng` and `radius` must be given.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PointQueryParams {
    /// Search origin latitude.
    pub lat: Option<f64>,
    /// Search origin longitude.
    pub lng: Option<f64>,
    /// Search radius in kilometers.
    pub radius: Option<f64>,
    /// Restrict a search to one category (also accepted as `type`).
    #[serde(alias = "type")]
    pub category: Option<String>,
}

impl PointQueryParams {
    /// Turns the parameters into a search, or `None` for a plain listing.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Validation`] if only some of the search
    /// parameters are present or the category is unknown.
    pub fn into_query(self) -> Result<Option<ProximityQuery>, PointError> {
        let category = self
            .category
            .as_deref()
            .map(str::parse::<PointCategory>)
            .transpose()
            .map_err(|e| PointError::Validation(e.to_string()))?;

        match (self.lat, self.lng, self.radius) {
            (Some(latitude), Some(longitude), Some(radius_km)) => Ok(Some(ProximityQuery {
                latitude,
                longitude,
                radius_km,
                category,
            })),
            (None, None, None) => Ok(None),
            _ => Err(PointError::Validation(
                "lat, lng and radius must be given together".to_string(),
            )),
        }
    }
}

/// Author of a point as shown to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDto {
    /// Owner identifier.
    pub id: OwnerId,
    /// Username, when known.
    pub display_name: Option<String>,
}

/// A single point.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointResponse {
    /// Point identifier.
    pub id: PointId,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// GeoJSON geometry (`[lng, lat]`).
    #[schema(value_type = Object)]
    pub geometry: Option<geojson::Geometry>,
    /// Incident kind.
    pub category: PointCategory,
    /// Optional free text.
    pub description: Option<String>,
    /// Author of the point.
    pub owner: OwnerDto,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PointResponse {
    /// Projects a domain point.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the stored geometry does not decode.
    pub fn from_point(point: &Point) -> Result<Self, CodecError> {
        Ok(Self {
            id: point.id,
            latitude: point.latitude(),
            longitude: point.longitude(),
            geometry: decode_geometry(point.geometry().as_bytes())?,
            category: point.category,
            description: point.description.clone(),
            owner: OwnerDto {
                id: point.owner.id,
                display_name: point.owner.display_name.clone(),
            },
            created_at: point.created_at,
            updated_at: point.updated_at,
        })
    }
}

/// A search hit: the point plus its distance from the origin.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProximityResultDto {
    /// The matching point.
    #[serde(flatten)]
    pub point: PointResponse,
    /// Geodesic distance from the search origin, in meters.
    pub distance_meters: f64,
}

impl ProximityResultDto {
    /// Projects a search match.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if the stored geometry does not decode.
    pub fn from_match(m: &ProximityMatch) -> Result<Self, CodecError> {
        Ok(Self {
            point: PointResponse::from_point(&m.point)?,
            distance_meters: m.distance_m,
        })
    }
}

/// Response for the list endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct PointListResponse {
    /// Points, oldest first.
    pub points: Vec<PointResponse>,
    /// Number of points.
    pub count: usize,
}

/// Response for a radius search.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProximityListResponse {
    /// Hits, nearest first.
    pub points: Vec<ProximityResultDto>,
    /// Number of hits.
    pub count: usize,
}
