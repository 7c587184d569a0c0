//! Point store: create, read, update and delete with ownership checks.

use std::sync::Arc;

use crate::domain::point::normalize_description;
use crate::domain::{Coordinates, NewPoint, Owner, OwnerId, Point, PointId, PointPatch};
use crate::error::PointError;
use crate::persistence::PointRepository;

/// CRUD operations on points.
///
/// Every mutation follows the same pattern: validate input → load the
/// current row → check ownership → recompute coordinates and geometry
/// together → single guarded write.
#[derive(Debug, Clone)]
pub struct PointStore {
    repository: Arc<dyn PointRepository>,
}

impl PointStore {
    /// Creates a store over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn PointRepository>) -> Self {
        Self { repository }
    }

    /// Creates a point owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Validation`] for out-of-range coordinates or
    /// an over-long description, or [`PointError::Persistence`] if the
    /// write fails.
    pub async fn create(&self, owner: OwnerId, input: NewPoint) -> Result<Point, PointError> {
        let coordinates = Coordinates::new(input.latitude, input.longitude)?;
        let description = normalize_description(input.description)?;
        let point = Point::create(
            Owner::anonymous(owner),
            coordinates,
            input.category,
            description,
        )?;
        self.repository.insert(point).await
    }

    /// Returns the point with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::NotFound`] if no such point exists, or any
    /// storage error from the repository.
    pub async fn get_by_id(&self, id: PointId) -> Result<Point, PointError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(PointError::NotFound(id))
    }

    /// Returns all points ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns any storage error from the repository.
    pub async fn list_all(&self) -> Result<Vec<Point>, PointError> {
        self.repository.list_all().await
    }

    /// Returns the points authored by `owner`, ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns any storage error from the repository.
    pub async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<Point>, PointError> {
        self.repository.list_by_owner(owner).await
    }

    /// Applies a partial update on behalf of `requester`.
    ///
    /// Only the fields present in `patch` change. Moving the point
    /// re-encodes the geometry in the same write. `updated_at` always
    /// advances, even for an empty patch.
    ///
    /// # Errors
    ///
    /// - [`PointError::NotFound`] if the point does not exist (or vanished
    ///   before the write).
    /// - [`PointError::Forbidden`] if `requester` is not the owner.
    /// - [`PointError::Validation`] for invalid patch values.
    pub async fn update(
        &self,
        id: PointId,
        requester: OwnerId,
        patch: PointPatch,
    ) -> Result<Point, PointError> {
        let mut point = self.get_by_id(id).await?;
        if point.owner.id != requester {
            return Err(PointError::Forbidden(id));
        }

        if patch.moves_point() {
            let coordinates = Coordinates::new(
                patch.latitude.unwrap_or(point.latitude()),
                patch.longitude.unwrap_or(point.longitude()),
            )?;
            point.relocate(coordinates)?;
        }
        if let Some(category) = patch.category {
            point.category = category;
        }
        if patch.description.is_some() {
            point.description = normalize_description(patch.description)?;
        }
        point.touch();

        self.repository
            .update(point)
            .await?
            .ok_or(PointError::NotFound(id))
    }

    /// Deletes a point on behalf of `requester`.
    ///
    /// A point owned by someone else is reported exactly like a missing
    /// one, so callers cannot learn which ids exist.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::NotFound`] if nothing was deleted, or any
    /// storage error from the repository.
    pub async fn delete(&self, id: PointId, requester: OwnerId) -> Result<(), PointError> {
        if self.repository.delete_owned(id, requester).await? {
            Ok(())
        } else {
            Err(PointError::NotFound(id))
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::PointCategory;
    use crate::persistence::MemoryPointRepository;

    fn store() -> PointStore {
        PointStore::new(Arc::new(MemoryPointRepository::new()))
    }

    fn owner() -> OwnerId {
        OwnerId::from_uuid(uuid::Uuid::new_v4())
    }

    fn input(lat: f64, lng: f64) -> NewPoint {
        NewPoint {
            latitude: lat,
            longitude: lng,
            category: PointCategory::Accident,
            description: Some("two cars".to_string()),
        }
    }

    async fn created(store: &PointStore, owner: OwnerId) -> Point {
        let Ok(point) = store.create(owner, input(19.4326, -99.1332)).await else {
            panic!("create failed");
        };
        point
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = store();
        let alice = owner();
        let point = created(&store, alice).await;

        let Ok(found) = store.get_by_id(point.id).await else {
            panic!("point should exist");
        };
        assert_eq!(found.owner.id, alice);
        assert_eq!(found.category, PointCategory::Accident);
        assert_eq!(found.description.as_deref(), Some("two cars"));
        let Ok(decoded) = found.geometry().decode() else {
            panic!("geometry should decode");
        };
        assert!((decoded.x() - -99.1332).abs() < 1e-7);
        assert!((decoded.y() - 19.4326).abs() < 1e-7);
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_without_writing() {
        let repo = Arc::new(MemoryPointRepository::new());
        let store = PointStore::new(Arc::clone(&repo) as Arc<dyn PointRepository>);

        assert!(matches!(
            store.create(owner(), input(91.0, 0.0)).await,
            Err(PointError::Validation(_))
        ));
        assert!(matches!(
            store.create(owner(), input(0.0, f64::NAN)).await,
            Err(PointError::Validation(_))
        ));
        let mut long = input(0.0, 0.0);
        long.description = Some("x".repeat(501));
        assert!(matches!(
            store.create(owner(), long).await,
            Err(PointError::Validation(_))
        ));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let id = PointId::new();
        assert!(matches!(
            store().get_by_id(id).await,
            Err(PointError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn description_only_patch_leaves_location_alone() {
        let store = store();
        let alice = owner();
        let point = created(&store, alice).await;

        let patch = PointPatch {
            description: Some("cleared by police".to_string()),
            ..PointPatch::default()
        };
        let Ok(updated) = store.update(point.id, alice, patch).await else {
            panic!("update failed");
        };

        assert_eq!(updated.description.as_deref(), Some("cleared by police"));
        assert_eq!(updated.coordinates(), point.coordinates());
        assert_eq!(updated.geometry(), point.geometry());
        assert_eq!(updated.category, point.category);
        assert_eq!(updated.created_at, point.created_at);
        assert!(updated.updated_at > point.updated_at);
    }

    #[tokio::test]
    async fn moving_one_coordinate_keeps_the_other() {
        let store = store();
        let alice = owner();
        let point = created(&store, alice).await;

        let patch = PointPatch {
            latitude: Some(20.0),
            ..PointPatch::default()
        };
        let Ok(updated) = store.update(point.id, alice, patch).await else {
            panic!("update failed");
        };
        assert!((updated.latitude() - 20.0).abs() < 1e-9);
        assert!((updated.longitude() - point.longitude()).abs() < 1e-9);

        let Ok(decoded) = updated.geometry().decode() else {
            panic!("geometry should decode");
        };
        assert!((decoded.y() - 20.0).abs() < 1e-9);
        assert!((decoded.x() - point.longitude()).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_description_clears_it() {
        let store = store();
        let alice = owner();
        let point = created(&store, alice).await;

        let patch = PointPatch {
            description: Some(String::new()),
            ..PointPatch::default()
        };
        let Ok(updated) = store.update(point.id, alice, patch).await else {
            panic!("update failed");
        };
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn invalid_patch_changes_nothing() {
        let store = store();
        let alice = owner();
        let point = created(&store, alice).await;

        let patch = PointPatch {
            longitude: Some(200.0),
            category: Some(PointCategory::Other),
            ..PointPatch::default()
        };
        assert!(matches!(
            store.update(point.id, alice, patch).await,
            Err(PointError::Validation(_))
        ));

        let Ok(after) = store.get_by_id(point.id).await else {
            panic!("point should exist");
        };
        assert_eq!(after, point);
    }

    #[tokio::test]
    async fn non_owner_update_is_forbidden_and_mutates_nothing() {
        let store = store();
        let alice = owner();
        let point = created(&store, alice).await;

        let patch = PointPatch {
            category: Some(PointCategory::Congestion),
            ..PointPatch::default()
        };
        assert!(matches!(
            store.update(point.id, owner(), patch).await,
            Err(PointError::Forbidden(_))
        ));

        let Ok(after) = store.get_by_id(point.id).await else {
            panic!("point should exist");
        };
        assert_eq!(after, point);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        assert!(matches!(
            store()
                .update(PointId::new(), owner(), PointPatch::default())
                .await,
            Err(PointError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn non_owner_delete_looks_like_not_found() {
        let store = store();
        let alice = owner();
        let point = created(&store, alice).await;

        assert!(matches!(
            store.delete(point.id, owner()).await,
            Err(PointError::NotFound(_))
        ));
        assert!(store.get_by_id(point.id).await.is_ok());

        assert!(store.delete(point.id, alice).await.is_ok());
        assert!(matches!(
            store.get_by_id(point.id).await,
            Err(PointError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(point.id, alice).await,
            Err(PointError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_by_owner_scopes_results() {
        let store = store();
        let alice = owner();
        let bob = owner();
        let _ = created(&store, alice).await;
        let _ = created(&store, alice).await;
        let _ = created(&store, bob).await;

        let Ok(all) = store.list_all().await else {
            panic!("list failed");
        };
        assert_eq!(all.len(), 3);

        let Ok(mine) = store.list_by_owner(alice).await else {
            panic!("list failed");
        };
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|p| p.owner.id == alice));
    }
}
