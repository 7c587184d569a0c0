//! Incident categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The fixed set of incident kinds a point can report.
///
/// Serialized with the English names. The Spanish names used by older
/// clients are accepted as input aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PointCategory {
    /// A collision or crash.
    #[serde(alias = "accidente")]
    Accident,
    /// Slow or stopped traffic.
    #[serde(alias = "congestión")]
    Congestion,
    /// Something blocking the road.
    #[serde(alias = "obstrucción")]
    Obstruction,
    /// Anything else.
    #[serde(alias = "otro")]
    Other,
}

impl PointCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Accident,
        Self::Congestion,
        Self::Obstruction,
        Self::Other,
    ];

    /// Storage and wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accident => "accident",
            Self::Congestion => "congestion",
            Self::Obstruction => "obstruction",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PointCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`PointCategory`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'; expected one of: accident, congestion, obstruction, other")]
pub struct UnknownCategory(pub String);

impl FromStr for PointCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "accident" | "accidente" => Ok(Self::Accident),
            "congestion" | "congestión" => Ok(Self::Congestion),
            "obstruction" | "obstrucción" => Ok(Self::Obstruction),
            "other" | "otro" => Ok(Self::Other),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn as_str_round_trips_through_from_str() {
        for category in PointCategory::ALL {
            assert_eq!(category.as_str().parse::<PointCategory>(), Ok(category));
        }
    }

    #[test]
    fn spanish_names_are_accepted() {
        assert_eq!("accidente".parse(), Ok(PointCategory::Accident));
        assert_eq!("congestión".parse(), Ok(PointCategory::Congestion));
        assert_eq!("obstrucción".parse(), Ok(PointCategory::Obstruction));
        assert_eq!("otro".parse(), Ok(PointCategory::Other));
    }

    #[test]
    fn serde_uses_english_names_and_reads_aliases() {
        let Ok(json) = serde_json::to_string(&PointCategory::Obstruction) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "\"obstruction\"");

        let Ok(parsed) = serde_json::from_str::<PointCategory>("\"accidente\"") else {
            panic!("alias should deserialize");
        };
        assert_eq!(parsed, PointCategory::Accident);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let Err(err) = "pothole".parse::<PointCategory>() else {
            panic!("pothole is not a category");
        };
        assert!(err.to_string().contains("pothole"));
    }
}
