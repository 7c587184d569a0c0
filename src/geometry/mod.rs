//! Geometry layer: binary point codec, geodesic distance and GeoJSON
//! projection.

pub mod codec;
pub mod distance;
pub mod export;

pub use codec::{CodecError, EncodedGeometry, SRID_WGS84};
pub use distance::geodesic_distance_m;
