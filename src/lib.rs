//! # traffic-geopoints
//!
//! Geo-located traffic incident reports: users drop points (accident,
//! congestion, obstruction, other) on a map, edit or delete their own,
//! and anyone can list them, search them by geodesic radius, or export
//! them as GeoJSON.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── PointStore, ProximityQueryEngine (service/)
//!     │
//!     ├── GeometryCodec, geodesic distance, GeoJSON export (geometry/)
//!     ├── Point aggregate (domain/)
//!     │
//!     └── PointRepository (persistence/)
//!           ├── in-memory + R-tree
//!           └── PostgreSQL + PostGIS
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod persistence;
pub mod service;
