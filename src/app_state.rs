//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::PointRepository;
use crate::service::{PointStore, ProximityQueryEngine, SearchLimits};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// CRUD operations on points.
    pub point_store: Arc<PointStore>,
    /// Radius searches.
    pub proximity: Arc<ProximityQueryEngine>,
}

impl AppState {
    /// Wires the store and the engine to one repository.
    #[must_use]
    pub fn new(repository: Arc<dyn PointRepository>, limits: SearchLimits) -> Self {
        Self {
            point_store: Arc::new(PointStore::new(Arc::clone(&repository))),
            proximity: Arc::new(ProximityQueryEngine::new(repository, limits)),
        }
    }
}
