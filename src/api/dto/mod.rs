//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire, like the GeoJSON properties.

pub mod point_dto;

pub use point_dto::*;
