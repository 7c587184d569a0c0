//! In-memory point storage with an R-tree spatial index.
//!
//! [`MemoryPointRepository`] keeps all points in a `HashMap` plus an
//! [`rstar::RTree`] over `(lng, lat)`. Both live behind one
//! [`tokio::sync::RwLock`], so the map and the index are always updated
//! together and a search never observes one without the other.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rstar::{AABB, RTree, RTreeObject};
use tokio::sync::RwLock;

use super::PointRepository;
use crate::domain::{Coordinates, OwnerId, Point, PointCategory, PointId, ProximityMatch};
use crate::error::PointError;
use crate::geometry::distance::{LonLatBox, search_boxes};
use crate::geometry::geodesic_distance_m;

/// Index entry: a point id at its `[lng, lat]` position.
#[derive(Debug, Clone, PartialEq)]
struct IndexedPoint {
    id: PointId,
    position: [f64; 2],
}

impl IndexedPoint {
    fn of(point: &Point) -> Self {
        Self {
            id: point.id,
            position: [point.longitude(), point.latitude()],
        }
    }
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    points: HashMap<PointId, Point>,
    index: RTree<IndexedPoint>,
    owners: HashMap<OwnerId, String>,
}

impl MemoryState {
    /// Returns a copy of the stored point with the owner name resolved.
    fn resolved(&self, point: &Point) -> Point {
        let mut point = point.clone();
        point.owner.display_name = self.owners.get(&point.owner.id).cloned();
        point
    }

    fn sorted<'a>(&self, points: impl Iterator<Item = &'a Point>) -> Vec<Point> {
        let mut out: Vec<Point> = points.map(|p| self.resolved(p)).collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        out
    }
}

/// Process-local [`PointRepository`].
///
/// Also acts as its own user directory: owners registered with
/// [`MemoryPointRepository::register_owner`] get their display name
/// attached to every point they own.
#[derive(Debug, Default)]
pub struct MemoryPointRepository {
    state: RwLock<MemoryState>,
}

impl MemoryPointRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records (or renames) a user in the directory.
    pub async fn register_owner(&self, id: OwnerId, display_name: impl Into<String>) {
        self.state
            .write()
            .await
            .owners
            .insert(id, display_name.into());
    }

    /// Number of stored points.
    pub async fn len(&self) -> usize {
        self.state.read().await.points.len()
    }

    /// Returns `true` if no points are stored.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.points.is_empty()
    }
}

fn envelope(b: &LonLatBox) -> AABB<[f64; 2]> {
    AABB::from_corners([b.min_lng, b.min_lat], [b.max_lng, b.max_lat])
}

#[async_trait]
impl PointRepository for MemoryPointRepository {
    async fn insert(&self, point: Point) -> Result<Point, PointError> {
        let mut state = self.state.write().await;
        if state.points.contains_key(&point.id) {
            return Err(PointError::Persistence(format!(
                "point {} already exists",
                point.id
            )));
        }
        state.index.insert(IndexedPoint::of(&point));
        let stored = state.resolved(&point);
        state.points.insert(point.id, point);
        tracing::debug!(point_id = %stored.id, "point stored in memory");
        Ok(stored)
    }

    async fn find_by_id(&self, id: PointId) -> Result<Option<Point>, PointError> {
        let state = self.state.read().await;
        Ok(state.points.get(&id).map(|p| state.resolved(p)))
    }

    async fn list_all(&self) -> Result<Vec<Point>, PointError> {
        let state = self.state.read().await;
        Ok(state.sorted(state.points.values()))
    }

    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<Point>, PointError> {
        let state = self.state.read().await;
        Ok(state.sorted(state.points.values().filter(|p| p.owner.id == owner)))
    }

    async fn update(&self, point: Point) -> Result<Option<Point>, PointError> {
        let mut state = self.state.write().await;
        let Some(existing) = state.points.get(&point.id) else {
            return Ok(None);
        };
        if existing.owner.id != point.owner.id {
            return Ok(None);
        }

        let old_entry = IndexedPoint::of(existing);
        let new_entry = IndexedPoint::of(&point);
        if old_entry != new_entry {
            state.index.remove(&old_entry);
            state.index.insert(new_entry);
        }

        let stored = state.resolved(&point);
        state.points.insert(point.id, point);
        Ok(Some(stored))
    }

    async fn delete_owned(&self, id: PointId, owner: OwnerId) -> Result<bool, PointError> {
        let mut state = self.state.write().await;
        let owned = state
            .points
            .get(&id)
            .is_some_and(|p| p.owner.id == owner);
        if !owned {
            return Ok(false);
        }
        if let Some(point) = state.points.remove(&id) {
            state.index.remove(&IndexedPoint::of(&point));
        }
        Ok(true)
    }

    async fn find_within(
        &self,
        origin: Coordinates,
        radius_m: f64,
        category: Option<PointCategory>,
    ) -> Result<Vec<ProximityMatch>, PointError> {
        let state = self.state.read().await;
        let origin = origin.to_geo_point();

        let mut seen = HashSet::new();
        let mut matches = Vec::new();
        for search_box in search_boxes(origin, radius_m) {
            for entry in state.index.locate_in_envelope(&envelope(&search_box)) {
                if !seen.insert(entry.id) {
                    continue;
                }
                let Some(point) = state.points.get(&entry.id) else {
                    continue;
                };
                if category.is_some_and(|c| c != point.category) {
                    continue;
                }
                let distance_m = geodesic_distance_m(origin, point.coordinates().to_geo_point());
                if distance_m <= radius_m {
                    matches.push(ProximityMatch {
                        point: state.resolved(point),
                        distance_m,
                    });
                }
            }
        }
        Ok(matches)
    }
}
