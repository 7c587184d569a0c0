//! GeoJSON projection of points.
//!
//! Pure functions: they read a [`Point`] and build `geojson` values
//! without touching the input. Property names are camelCase to match the
//! rest of the wire format.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};

use super::codec::{self, CodecError};
use crate::domain::Point;

/// Decodes EWKB bytes straight into a GeoJSON geometry.
///
/// Empty input yields `Ok(None)` (no geometry).
///
/// # Errors
///
/// Returns a [`CodecError`] for malformed input.
pub fn decode_geometry(bytes: &[u8]) -> Result<Option<Geometry>, CodecError> {
    Ok(codec::decode(bytes)?.map(|point| Geometry::new(geojson::Value::from(&point))))
}

/// Projects a point as a GeoJSON `Feature`.
///
/// # Errors
///
/// Returns a [`CodecError`] if the point's geometry does not decode.
pub fn to_feature(point: &Point) -> Result<Feature, CodecError> {
    Ok(Feature {
        bbox: None,
        geometry: decode_geometry(point.geometry().as_bytes())?,
        id: Some(Id::String(point.id.to_string())),
        properties: Some(properties(point)),
        foreign_members: None,
    })
}

/// Projects points as a `FeatureCollection`, preserving their order.
///
/// # Errors
///
/// Returns the first [`CodecError`] raised by [`to_feature`].
pub fn to_feature_collection<'a, I>(points: I) -> Result<FeatureCollection, CodecError>
where
    I: IntoIterator<Item = &'a Point>,
{
    let features = points
        .into_iter()
        .map(to_feature)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collection(features))
}

/// Projects search results, adding a `distanceMeters` property to each
/// feature. Order is preserved.
///
/// # Errors
///
/// Returns the first [`CodecError`] raised by [`to_feature`].
pub fn to_distance_collection<'a, I>(matches: I) -> Result<FeatureCollection, CodecError>
where
    I: IntoIterator<Item = (&'a Point, f64)>,
{
    let features = matches
        .into_iter()
        .map(|(point, distance_m)| {
            let mut feature = to_feature(point)?;
            feature.set_property("distanceMeters", distance_m);
            Ok(feature)
        })
        .collect::<Result<Vec<_>, CodecError>>()?;
    Ok(collection(features))
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn properties(point: &Point) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert("id".to_string(), JsonValue::from(point.id.to_string()));
    props.insert(
        "category".to_string(),
        JsonValue::from(point.category.as_str()),
    );
    props.insert(
        "description".to_string(),
        point
            .description
            .clone()
            .map_or(JsonValue::Null, JsonValue::from),
    );
    props.insert(
        "ownerId".to_string(),
        JsonValue::from(point.owner.id.to_string()),
    );
    props.insert(
        "ownerDisplayName".to_string(),
        point
            .owner
            .display_name
            .clone()
            .map_or(JsonValue::Null, JsonValue::from),
    );
    props.insert(
        "createdAt".to_string(),
        JsonValue::from(point.created_at.to_rfc3339()),
    );
    props.insert(
        "updatedAt".to_string(),
        JsonValue::from(point.updated_at.to_rfc3339()),
    );
    props
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, Owner, OwnerId, PointCategory};

    fn point(lat: f64, lng: f64, name: Option<&str>) -> Point {
        let Ok(c) = Coordinates::new(lat, lng) else {
            panic!("valid coordinates");
        };
        let owner = Owner {
            id: OwnerId::from_uuid(uuid::Uuid::new_v4()),
            display_name: name.map(str::to_string),
        };
        let Ok(p) = Point::create(
            owner,
            c,
            PointCategory::Congestion,
            Some("stalled truck".to_string()),
        ) else {
            panic!("point should encode");
        };
        p
    }

    fn to_json<T: serde::Serialize>(value: &T) -> serde_json::Value {
        let Ok(json) = serde_json::to_value(value) else {
            panic!("serialization failed");
        };
        json
    }

    #[test]
    fn feature_has_lng_lat_geometry_and_properties() {
        let p = point(19.4326, -99.1332, Some("ana"));
        let Ok(feature) = to_feature(&p) else {
            panic!("projection failed");
        };
        let json = to_json(&feature);

        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Point");
        assert_eq!(json["geometry"]["coordinates"][0], -99.1332);
        assert_eq!(json["geometry"]["coordinates"][1], 19.4326);

        let props = &json["properties"];
        assert_eq!(props["id"], p.id.to_string());
        assert_eq!(props["category"], "congestion");
        assert_eq!(props["description"], "stalled truck");
        assert_eq!(props["ownerId"], p.owner.id.to_string());
        assert_eq!(props["ownerDisplayName"], "ana");
        assert!(props["createdAt"].is_string());
        assert!(props["updatedAt"].is_string());
    }

    #[test]
    fn unknown_owner_projects_null_display_name() {
        let p = point(1.0, 2.0, None);
        let Ok(feature) = to_feature(&p) else {
            panic!("projection failed");
        };
        assert!(to_json(&feature)["properties"]["ownerDisplayName"].is_null());
    }

    #[test]
    fn collection_preserves_order() {
        let points = [point(1.0, 1.0, None), point(2.0, 2.0, None), point(3.0, 3.0, None)];
        let Ok(fc) = to_feature_collection(&points) else {
            panic!("projection failed");
        };
        let json = to_json(&fc);
        assert_eq!(json["type"], "FeatureCollection");
        let Some(features) = json["features"].as_array() else {
            panic!("features should be an array");
        };
        let ids: Vec<_> = features
            .iter()
            .map(|f| f["properties"]["id"].clone())
            .collect();
        let expected: Vec<_> = points
            .iter()
            .map(|p| serde_json::Value::from(p.id.to_string()))
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn empty_collection() {
        let Ok(fc) = to_feature_collection(std::iter::empty::<&Point>()) else {
            panic!("projection failed");
        };
        assert!(fc.features.is_empty());
    }

    #[test]
    fn distance_collection_adds_distance() {
        let p = point(0.0, 0.0, None);
        let Ok(fc) = to_distance_collection([(&p, 12.5)]) else {
            panic!("projection failed");
        };
        let json = to_json(&fc);
        assert_eq!(json["features"][0]["properties"]["distanceMeters"], 12.5);
    }

    #[test]
    fn decode_geometry_handles_absent_and_malformed() {
        assert!(matches!(decode_geometry(&[]), Ok(None)));
        assert!(decode_geometry(&[1, 2, 3]).is_err());
    }
}
