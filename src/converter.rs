use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::point::GeoPoint;
use crate::route::Route;
use crate::simulator::Cursor;

/// GeoJSON view of a route and, optionally, the walker's marker on it.
///
/// The route comes first so the marker draws on top of it.
pub fn to_feature_collection(
    route: &Route,
    name: Option<&str>,
    marker: Option<Cursor>,
) -> FeatureCollection {
    let mut features = Vec::new();

    if let Some(feature) = route_to_feature(route, name) {
        features.push(feature);
    }
    if let Some(cursor) = marker {
        features.push(position_to_feature(cursor.position, cursor.segment));
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// The route as a LineString, or a Point when it has a single point.
/// An empty route has no feature.
pub fn route_to_feature(route: &Route, name: Option<&str>) -> Option<Feature> {
    let geometry = match route.points() {
        [] => return None,
        [only] => Value::Point(point_coords(only)),
        points => Value::LineString(points.iter().map(point_coords).collect()),
    };

    let mut props = Map::new();
    props.insert("kind".to_string(), JsonValue::String("route".to_string()));
    if let Some(name) = name {
        props.insert("name".to_string(), JsonValue::String(name.to_string()));
    }
    props.insert("points".to_string(), JsonValue::from(route.point_count()));
    props.insert("lengthM".to_string(), JsonValue::from(route.total_length()));

    Some(feature(geometry, props))
}

pub fn position_to_feature(position: GeoPoint, segment: usize) -> Feature {
    let mut props = Map::new();
    props.insert(
        "kind".to_string(),
        JsonValue::String("position".to_string()),
    );
    props.insert("segment".to_string(), JsonValue::from(segment));

    feature(Value::Point(point_coords(&position)), props)
}

fn feature(value: Value, props: Map<String, JsonValue>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// [lon, lat, ele]
fn point_coords(point: &GeoPoint) -> Vec<f64> {
    vec![point.longitude, point.latitude, point.elevation]
}
