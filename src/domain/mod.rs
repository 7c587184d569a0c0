//! Domain layer: identifiers, categories, coordinates and the point
//! aggregate.
//!
//! Everything here is plain data plus the invariants that keep a point
//! consistent: coordinate ranges, the coordinate/geometry pairing,
//! bounded descriptions and monotonically increasing `updated_at`.

pub mod category;
pub mod coordinates;
pub mod point;
pub mod point_id;

pub use category::PointCategory;
pub use coordinates::Coordinates;
pub use point::{NewPoint, Owner, Point, PointPatch, ProximityMatch};
pub use point_id::{OwnerId, PointId};
