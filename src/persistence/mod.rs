//! Persistence layer: the storage contract for points and its backends.
//!
//! [`PointRepository`] is the seam between the point store / proximity
//! engine and the database. Every method is a single round trip that
//! either completes or fails; nothing holds a lock across calls.
//!
//! Two backends are provided:
//!
//! - [`MemoryPointRepository`]: process-local, R-tree accelerated.
//! - [`PostgresPointRepository`]: PostgreSQL + PostGIS via `sqlx`.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{Coordinates, OwnerId, Point, PointCategory, PointId, ProximityMatch};
use crate::error::PointError;

pub use memory::MemoryPointRepository;
pub use postgres::PostgresPointRepository;

/// Storage operations needed by the point store and the proximity engine.
///
/// Returned points carry the owner's display name when the user
/// directory knows it.
#[async_trait]
pub trait PointRepository: Send + Sync + std::fmt::Debug {
    /// Persists a new point (coordinates and geometry in one write) and
    /// returns it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Persistence`] if the write fails.
    async fn insert(&self, point: Point) -> Result<Point, PointError>;

    /// Looks a point up by id.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Persistence`] on storage failure, or a
    /// [`PointError::Codec`] if the stored geometry is corrupt.
    async fn find_by_id(&self, id: PointId) -> Result<Option<Point>, PointError>;

    /// Returns every point ordered by `(created_at, id)`.
    ///
    /// # Errors
    ///
    /// Same as [`PointRepository::find_by_id`].
    async fn list_all(&self) -> Result<Vec<Point>, PointError>;

    /// Returns the points authored by `owner`, ordered by `(created_at, id)`.
    ///
    /// # Errors
    ///
    /// Same as [`PointRepository::find_by_id`].
    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<Point>, PointError>;

    /// Overwrites the mutable columns of an existing point in one write,
    /// guarded by both its id and its owner.
    ///
    /// Returns `None` if no row matched (deleted in the meantime).
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Persistence`] if the write fails.
    async fn update(&self, point: Point) -> Result<Option<Point>, PointError>;

    /// Deletes the point if it exists and belongs to `owner`.
    ///
    /// Returns `false` when nothing was deleted, without saying why.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Persistence`] if the write fails.
    async fn delete_owned(&self, id: PointId, owner: OwnerId) -> Result<bool, PointError>;

    /// Returns the points within `radius_m` meters of `origin` with their
    /// geodesic distance, optionally restricted to one category.
    ///
    /// Result order is unspecified.
    ///
    /// # Errors
    ///
    /// Same as [`PointRepository::find_by_id`].
    async fn find_within(
        &self,
        origin: Coordinates,
        radius_m: f64,
        category: Option<PointCategory>,
    ) -> Result<Vec<ProximityMatch>, PointError>;
}
