//! Geodesic distance and conservative lon/lat search boxes.
//!
//! Distances are measured on the WGS84 ellipsoid, the same model PostGIS
//! uses for `geography` distances. Search boxes are used by the
//! in-memory index to narrow candidates before the exact distance check;
//! they may include points outside the radius but never exclude one
//! inside it.

use std::f64::consts::{FRAC_PI_2, PI};

use geo::{Distance, Geodesic};

/// Smallest radius of curvature of the WGS84 ellipsoid (meridional, at the
/// equator), in meters. Converting a distance to an angle with it gives the
/// largest possible angular extent.
const MIN_RADIUS_OF_CURVATURE_M: f64 = 6_335_439.0;

/// Extra margin applied to the angular radius of a search box.
const BOX_MARGIN: f64 = 1.01;

/// Ellipsoidal (WGS84) distance in meters between two `(lng, lat)` points.
#[must_use]
pub fn geodesic_distance_m(a: geo::Point<f64>, b: geo::Point<f64>) -> f64 {
    Geodesic.distance(a, b)
}

/// Axis-aligned lon/lat box in degrees. Never crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLatBox {
    /// Western edge.
    pub min_lng: f64,
    /// Southern edge.
    pub min_lat: f64,
    /// Eastern edge.
    pub max_lng: f64,
    /// Northern edge.
    pub max_lat: f64,
}

impl LonLatBox {
    /// Returns `true` if `(lng, lat)` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        (self.min_lng..=self.max_lng).contains(&lng) && (self.min_lat..=self.max_lat).contains(&lat)
    }
}

/// Boxes that together cover every point within `radius_m` of `origin`.
///
/// Returns one box normally, two when the circle crosses the
/// antimeridian, and a single full-longitude band when it covers a pole.
#[must_use]
pub fn search_boxes(origin: geo::Point<f64>, radius_m: f64) -> Vec<LonLatBox> {
    let angular = (radius_m.max(0.0) * BOX_MARGIN) / MIN_RADIUS_OF_CURVATURE_M;
    let lat = origin.y().to_radians();
    let lng = origin.x().to_radians();

    let min_lat = lat - angular;
    let max_lat = lat + angular;

    let band = |min_lat: f64, max_lat: f64| LonLatBox {
        min_lng: -180.0,
        min_lat: min_lat.max(-FRAC_PI_2).to_degrees(),
        max_lng: 180.0,
        max_lat: max_lat.min(FRAC_PI_2).to_degrees(),
    };

    if min_lat <= -FRAC_PI_2 || max_lat >= FRAC_PI_2 {
        return vec![band(min_lat, max_lat)];
    }

    let ratio = angular.sin() / lat.cos();
    if ratio >= 1.0 {
        return vec![band(min_lat, max_lat)];
    }
    let delta_lng = ratio.asin();
    let min_lng = lng - delta_lng;
    let max_lng = lng + delta_lng;

    let make = |min_lng: f64, max_lng: f64| LonLatBox {
        min_lng: min_lng.to_degrees(),
        min_lat: min_lat.to_degrees(),
        max_lng: max_lng.to_degrees(),
        max_lat: max_lat.to_degrees(),
    };

    if min_lng < -PI {
        vec![make(min_lng + 2.0 * PI, PI), make(-PI, max_lng)]
    } else if max_lng > PI {
        vec![make(min_lng, PI), make(-PI, max_lng - 2.0 * PI)]
    } else {
        vec![make(min_lng, max_lng)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> geo::Point<f64> {
        geo::Point::new(lng, lat)
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = pt(19.4326, -99.1332);
        assert!(geodesic_distance_m(p, p).abs() < 1e-6);
    }

    #[test]
    fn hundredth_degree_at_equator_is_about_1113_m() {
        let d = geodesic_distance_m(pt(0.0, 0.0), pt(0.0, 0.01));
        assert!((d - 1113.2).abs() < 1.0, "got {d}");
    }

    #[test]
    fn mexico_city_sample_distance() {
        // 0.0026° of latitude and 0.0032° of longitude at 19.43° N.
        let d = geodesic_distance_m(pt(19.4300, -99.1300), pt(19.4326, -99.1332));
        assert!((d - 443.0).abs() < 443.0 * 0.05, "got {d}");
    }

    #[test]
    fn box_covers_points_on_the_circle() {
        let origin = pt(45.0, 10.0);
        let radius = 50_000.0;
        let boxes = search_boxes(origin, radius);
        assert_eq!(boxes.len(), 1);
        // Points just inside the radius in the four cardinal directions.
        for (lat, lng) in [(45.449, 10.0), (44.551, 10.0), (45.0, 10.63), (45.0, 9.37)] {
            let d = geodesic_distance_m(origin, pt(lat, lng));
            assert!(d <= radius, "sample ({lat}, {lng}) at {d} m is outside the radius");
            assert!(boxes.iter().any(|b| b.contains(lng, lat)), "({lat}, {lng})");
        }
    }

    #[test]
    fn box_splits_at_antimeridian() {
        let boxes = search_boxes(pt(0.0, 179.99), 5_000.0);
        assert_eq!(boxes.len(), 2);
        assert!(boxes.iter().any(|b| b.contains(-179.99, 0.0)));
        assert!(boxes.iter().any(|b| b.contains(179.98, 0.0)));
    }

    #[test]
    fn box_near_pole_spans_all_longitudes() {
        let boxes = search_boxes(pt(89.99, 0.0), 10_000.0);
        assert_eq!(boxes.len(), 1);
        assert!(boxes.iter().all(|b| b.min_lng <= -180.0 && b.max_lng >= 180.0));
        assert!(boxes.iter().any(|b| b.contains(179.0, 89.995)));
    }
}
