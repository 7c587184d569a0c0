//! Proximity search: points within a radius of an origin, nearest first.

use std::sync::Arc;

use crate::domain::{Coordinates, PointCategory, ProximityMatch};
use crate::error::PointError;
use crate::persistence::PointRepository;

/// Accepted search radius range, in kilometers (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    /// Smallest accepted radius.
    pub min_radius_km: f64,
    /// Largest accepted radius.
    pub max_radius_km: f64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            min_radius_km: 0.1,
            max_radius_km: 100.0,
        }
    }
}

/// A radius search request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    /// Origin latitude in decimal degrees.
    pub latitude: f64,
    /// Origin longitude in decimal degrees.
    pub longitude: f64,
    /// Search radius in kilometers.
    pub radius_km: f64,
    /// Restrict results to one category.
    pub category: Option<PointCategory>,
}

/// Runs radius searches against a [`PointRepository`].
///
/// The repository does the index-accelerated candidate selection; the
/// engine then enforces the inclusion rule (`distance <= radius`, the
/// category filter) and sorts by `(distance, id)`, so results are the
/// same whichever backend is in use.
#[derive(Debug, Clone)]
pub struct ProximityQueryEngine {
    repository: Arc<dyn PointRepository>,
    limits: SearchLimits,
}

impl ProximityQueryEngine {
    /// Creates an engine with the given radius limits.
    #[must_use]
    pub fn new(repository: Arc<dyn PointRepository>, limits: SearchLimits) -> Self {
        Self { repository, limits }
    }

    /// Returns every point within `query.radius_km` of the origin,
    /// nearest first, ties broken by ascending point id.
    ///
    /// # Errors
    ///
    /// Returns [`PointError::Validation`] for an invalid origin or a
    /// radius outside the configured limits, or any storage error from
    /// the repository.
    pub async fn search(&self, query: &ProximityQuery) -> Result<Vec<ProximityMatch>, PointError> {
        let origin = Coordinates::new(query.latitude, query.longitude)?;
        let radius_m = self.radius_m(query.radius_km)?;

        let mut matches: Vec<ProximityMatch> = self
            .repository
            .find_within(origin, radius_m, query.category)
            .await?
            .into_iter()
            .filter(|m| m.distance_m <= radius_m)
            .filter(|m| query.category.is_none_or(|c| c == m.point.category))
            .collect();

        matches.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.point.id.cmp(&b.point.id))
        });
        Ok(matches)
    }

    fn radius_m(&self, radius_km: f64) -> Result<f64, PointError> {
        let SearchLimits {
            min_radius_km,
            max_radius_km,
        } = self.limits;
        if !radius_km.is_finite() || !(min_radius_km..=max_radius_km).contains(&radius_km) {
            return Err(PointError::Validation(format!(
                "radius must be within [{min_radius_km}, {max_radius_km}] km, got {radius_km}"
            )));
        }
        Ok(radius_km * 1000.0)
    }
}
