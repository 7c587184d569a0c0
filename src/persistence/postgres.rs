//! PostgreSQL + PostGIS implementation of the persistence layer.
//!
//! Expected schema (managed outside this crate):
//!
//! ```sql
//! CREATE TABLE geo_points (
//!     id          uuid PRIMARY KEY,
//!     latitude    numeric(10, 7) NOT NULL,
//!     longitude   numeric(10, 7) NOT NULL,
//!     geom        geometry(Point, 4326) NOT NULL,
//!     category    text NOT NULL,
//!     description text,
//!     owner_id    uuid NOT NULL REFERENCES users (id),
//!     created_at  timestamptz NOT NULL,
//!     updated_at  timestamptz NOT NULL
//! );
//! CREATE INDEX geo_points_geog_idx ON geo_points USING gist ((geom::geography));
//! CREATE INDEX geo_points_owner_idx ON geo_points (owner_id);
//! ```
//!
//! Geometry travels as EWKB bytes in both directions (`ST_GeomFromEWKB`
//! on write, `ST_AsEWKB` on read) and is produced/validated by
//! [`crate::geometry::codec`].

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::PointRepository;
use super::models::{PointRow, ProximityRow};
use crate::config::ServiceConfig;
use crate::domain::{Coordinates, OwnerId, Point, PointCategory, PointId, ProximityMatch};
use crate::error::PointError;

/// Builds a `SELECT` of the point columns from `<source> p` joined with
/// `users u`. `$prefix` goes in front (for a CTE) and `$tail` after the
/// join (for `WHERE` / `ORDER BY`).
macro_rules! select_points {
    ($prefix:literal, $source:literal, $tail:literal) => {
        concat!(
            $prefix,
            "SELECT p.id, p.latitude::float8 AS latitude, p.longitude::float8 AS longitude, \
             ST_AsEWKB(p.geom) AS geom, p.category, p.description, p.owner_id, \
             u.username AS owner_name, p.created_at, p.updated_at \
             FROM ",
            $source,
            " p LEFT JOIN users u ON u.id = p.owner_id ",
            $tail
        )
    };
}

const INSERT_POINT: &str = select_points!(
    "WITH inserted AS (\
     INSERT INTO geo_points \
     (id, latitude, longitude, geom, category, description, owner_id, created_at, updated_at) \
     VALUES ($1, $2::numeric(10, 7), $3::numeric(10, 7), ST_GeomFromEWKB($4), $5, $6, $7, $8, $9) \
     RETURNING *) ",
    "inserted",
    ""
);

const UPDATE_POINT: &str = select_points!(
    "WITH updated AS (\
     UPDATE geo_points SET \
     latitude = $3::numeric(10, 7), longitude = $4::numeric(10, 7), geom = ST_GeomFromEWKB($5), \
     category = $6, description = $7, updated_at = $8 \
     WHERE id = $1 AND owner_id = $2 \
     RETURNING *) ",
    "updated",
    ""
);

const FIND_POINT: &str = select_points!("", "geo_points", "WHERE p.id = $1");

const LIST_POINTS: &str = select_points!("", "geo_points", "ORDER BY p.created_at ASC, p.id ASC");

const LIST_OWNER_POINTS: &str = select_points!(
    "",
    "geo_points",
    "WHERE p.owner_id = $1 ORDER BY p.created_at ASC, p.id ASC"
);

const FIND_WITHIN: &str = "SELECT p.id, p.latitude::float8 AS latitude, \
     p.longitude::float8 AS longitude, ST_AsEWKB(p.geom) AS geom, p.category, p.description, \
     p.owner_id, u.username AS owner_name, p.created_at, p.updated_at, \
     ST_Distance(p.geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography) AS distance_m \
     FROM geo_points p LEFT JOIN users u ON u.id = p.owner_id \
     WHERE ST_DWithin(p.geom::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3) \
     AND ($4::text IS NULL OR p.category = $4) \
     ORDER BY distance_m ASC, p.id ASC";

/// PostgreSQL-backed [`PointRepository`] using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPointRepository {
    pool: PgPool,
}

impl PostgresPointRepository {
    /// Creates a repository over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized and timed from the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`PointError::Persistence`] if the database cannot be
    /// reached within the configured timeout.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, PointError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| PointError::Persistence(e.to_string()))?;
        Ok(Self::new(pool))
    }
}

fn into_points(rows: Vec<PointRow>) -> Result<Vec<Point>, PointError> {
    rows.into_iter().map(Point::try_from).collect()
}

#[async_trait]
impl PointRepository for PostgresPointRepository {
    async fn insert(&self, point: Point) -> Result<Point, PointError> {
        let row = sqlx::query_as::<_, PointRow>(INSERT_POINT)
            .bind(point.id.as_uuid())
            .bind(point.latitude())
            .bind(point.longitude())
            .bind(point.geometry().as_bytes())
            .bind(point.category.as_str())
            .bind(point.description.as_deref())
            .bind(point.owner.id.as_uuid())
            .bind(point.created_at)
            .bind(point.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PointError::Persistence(e.to_string()))?;

        tracing::debug!(point_id = %point.id, "point inserted");
        Point::try_from(row)
    }

    async fn find_by_id(&self, id: PointId) -> Result<Option<Point>, PointError> {
        let row = sqlx::query_as::<_, PointRow>(FIND_POINT)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PointError::Persistence(e.to_string()))?;

        row.map(Point::try_from).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Point>, PointError> {
        let rows = sqlx::query_as::<_, PointRow>(LIST_POINTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PointError::Persistence(e.to_string()))?;

        into_points(rows)
    }

    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<Point>, PointError> {
        let rows = sqlx::query_as::<_, PointRow>(LIST_OWNER_POINTS)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PointError::Persistence(e.to_string()))?;

        into_points(rows)
    }

    async fn update(&self, point: Point) -> Result<Option<Point>, PointError> {
        let row = sqlx::query_as::<_, PointRow>(UPDATE_POINT)
            .bind(point.id.as_uuid())
            .bind(point.owner.id.as_uuid())
            .bind(point.latitude())
            .bind(point.longitude())
            .bind(point.geometry().as_bytes())
            .bind(point.category.as_str())
            .bind(point.description.as_deref())
            .bind(point.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PointError::Persistence(e.to_string()))?;

        tracing::debug!(point_id = %point.id, matched = row.is_some(), "point update");
        row.map(Point::try_from).transpose()
    }

    async fn delete_owned(&self, id: PointId, owner: OwnerId) -> Result<bool, PointError> {
        let result = sqlx::query("DELETE FROM geo_points WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| PointError::Persistence(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_within(
        &self,
        origin: Coordinates,
        radius_m: f64,
        category: Option<PointCategory>,
    ) -> Result<Vec<ProximityMatch>, PointError> {
        let rows = sqlx::query_as::<_, ProximityRow>(FIND_WITHIN)
            .bind(origin.longitude())
            .bind(origin.latitude())
            .bind(radius_m)
            .bind(category.map(PointCategory::as_str))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PointError::Persistence(e.to_string()))?;

        rows.into_iter().map(ProximityMatch::try_from).collect()
    }
}
