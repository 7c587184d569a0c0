//! Type-safe identifiers for incident points and their owners.
//!
//! [`PointId`] and [`OwnerId`] both wrap a [`uuid::Uuid`] but are distinct
//! types so that a point id can never be passed where an owner id is
//! expected (the ownership checks compare owners, never points).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for an incident point.
///
/// Generated once at creation time (UUID v4) and immutable thereafter.
/// Ordering is the byte order of the UUID, which is the same order
/// PostgreSQL uses for `uuid` columns; proximity results rely on it as
/// the tie-break key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PointId(uuid::Uuid);

impl PointId {
    /// Creates a new random `PointId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `PointId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for PointId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for PointId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<PointId> for uuid::Uuid {
    fn from(id: PointId) -> Self {
        id.0
    }
}

/// Identifier of the user who authored a point.
///
/// Issued by the external user/authentication collaborator; this crate
/// only stores it and compares it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct OwnerId(uuid::Uuid);

impl OwnerId {
    /// Creates an `OwnerId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<uuid::Uuid> for OwnerId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        let a = PointId::new();
        let b = PointId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_uuid_format() {
        let id = PointId::new();
        let s = format!("{id}");
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn serializes_as_bare_uuid_string() {
        let uuid = uuid::Uuid::nil();
        let Ok(json) = serde_json::to_string(&PointId::from_uuid(uuid)) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn ordering_follows_uuid_bytes() {
        let low = PointId::from_uuid(uuid::Uuid::from_u128(1));
        let high = PointId::from_uuid(uuid::Uuid::from_u128(2));
        assert!(low < high);
    }

    #[test]
    fn owner_id_parses_with_whitespace() {
        let uuid = uuid::Uuid::new_v4();
        let Ok(parsed) = format!(" {uuid} ").parse::<OwnerId>() else {
            panic!("owner id should parse");
        };
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn owner_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<OwnerId>().is_err());
    }
}
