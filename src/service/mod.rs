//! Service layer: the point store and the proximity engine.
//!
//! Both hold an `Arc<dyn PointRepository>` handed in at construction and
//! keep no other state, so they can be shared freely between requests.
//! Neither logs nor retries; errors go back to the caller untouched.

pub mod point_store;
pub mod proximity;

pub use point_store::PointStore;
pub use proximity::{ProximityQuery, ProximityQueryEngine, SearchLimits};
