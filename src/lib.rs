pub mod converter;
pub mod drift;
pub mod error;
pub mod geodesy;
pub mod gpx_types;
pub mod options;
pub mod parser;
pub mod point;
pub mod route;
pub mod simulator;
pub mod sink;
pub mod walker;
pub mod writer;

use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

pub use crate::error::{Error, FormatError, RouteError, SimulatorError};
pub use crate::options::{RoutingMode, SimulatorConfig, SpeedProfile};
pub use crate::point::GeoPoint;
pub use crate::route::Route;
pub use crate::simulator::{Cursor, RouteEvent, Simulator, StateChange, Tick, WalkingState};
pub use crate::sink::PositionSink;
pub use crate::walker::Walker;

const DEFAULT_TRACK_NAME: &str = "Route";

/// Decode a GPX 1.0/1.1 string into the walking route, returned as an array
/// of `{ latitude, longitude, elevation }` objects.
#[wasm_bindgen(js_name = decodeGpx)]
pub fn decode_gpx(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let route = parser::parse_route(gpx_string)?;
    to_js(&route)
}

/// Encode an array of points as a GPX 1.1 document with a single track.
#[wasm_bindgen(js_name = encodeGpx)]
pub fn encode_gpx(points: JsValue, track_name: Option<String>) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let route = parse_points(points)?;
    let name = track_name.as_deref().unwrap_or(DEFAULT_TRACK_NAME);
    Ok(writer::encode_route(&route, name)?)
}

/// Route points as a GeoJSON FeatureCollection, returned as a JS object.
#[wasm_bindgen(js_name = routeToGeoJson)]
pub fn route_to_geojson(points: JsValue, name: Option<String>) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let route = parse_points(points)?;
    let fc = converter::to_feature_collection(&route, name.as_deref(), None);
    to_js(&fc)
}

/// Route points as a GeoJSON FeatureCollection, returned as a JSON string.
#[wasm_bindgen(js_name = routeToGeoJsonString)]
pub fn route_to_geojson_string(points: JsValue, name: Option<String>) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let route = parse_points(points)?;
    let fc = converter::to_feature_collection(&route, name.as_deref(), None);
    serde_json::to_string(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
}

pub(crate) fn parse_options(options: JsValue) -> Result<SimulatorConfig, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(SimulatorConfig::default())
    } else {
        from_js(options)
    }
}

pub(crate) fn parse_points(points: JsValue) -> Result<Route, JsValue> {
    let points: Vec<GeoPoint> = from_js(points)?;
    Ok(Route::from_points(points)?)
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Serialize to plain JS objects rather than `Map`s.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
