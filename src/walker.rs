//! JavaScript-facing wrapper around [`Simulator`].
//!
//! The host owns the timer: it reads `tickIntervalMs`, calls `tick()` on that
//! interval and receives positions through the `onPosition` callback.

use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::converter;
use crate::gpx_types::GpxDocument;
use crate::options::{RoutingMode, SpeedProfile};
use crate::parser;
use crate::point::GeoPoint;
use crate::simulator::{Cursor, Simulator, StateChange, WalkingState};
use crate::sink::PositionSink;
use crate::writer;
use crate::{DEFAULT_TRACK_NAME, from_js, parse_options, parse_points, to_js};

/// Forwards positions or state changes to a JS callback.
struct JsSink {
    on_position: Option<Function>,
    on_state_change: Option<Function>,
}

impl JsSink {
    fn call(callback: &Function, arg: Result<JsValue, JsValue>) {
        let result = arg.and_then(|value| callback.call1(&JsValue::NULL, &value));
        if let Err(err) = result {
            tracing::warn!(error = ?err, "JS callback failed");
        }
    }
}

impl PositionSink for JsSink {
    fn on_position(&mut self, position: GeoPoint) {
        if let Some(callback) = &self.on_position {
            Self::call(callback, to_js(&position));
        }
    }

    fn on_state_change(&mut self, change: StateChange) {
        if let Some(callback) = &self.on_state_change {
            Self::call(callback, to_js(&change));
        }
    }
}

#[wasm_bindgen]
pub struct Walker {
    simulator: Simulator,
    name: Option<String>,
}

#[wasm_bindgen]
impl Walker {
    /// Create a walker from an options object (see `SimulatorConfig`).
    /// Without a `driftSeed` the drift noise is seeded from `Math.random()`.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<Walker, JsValue> {
        console_error_panic_hook::set_once();

        let mut config = parse_options(options)?;
        if config.drift_seed.is_none() {
            config.drift_seed = Some((js_sys::Math::random() * u64::MAX as f64) as u64);
        }

        Ok(Walker {
            simulator: Simulator::new(config),
            name: None,
        })
    }

    /// Load a GPX document as the route. Returns the number of points.
    #[wasm_bindgen(js_name = loadGpx)]
    pub fn load_gpx(&mut self, gpx_string: &str) -> Result<usize, JsValue> {
        let doc = parser::parse_gpx(gpx_string)?;
        self.name = document_name(&doc);
        self.simulator.load_route(doc.walking_route());
        Ok(self.simulator.route().point_count())
    }

    /// Load an array of `{ latitude, longitude, elevation? }` objects.
    #[wasm_bindgen(js_name = loadPoints)]
    pub fn load_points(&mut self, points: JsValue, name: Option<String>) -> Result<(), JsValue> {
        let route = parse_points(points)?;
        self.name = name;
        self.simulator.load_route(route);
        Ok(())
    }

    #[wasm_bindgen(js_name = onPosition)]
    pub fn on_position(&mut self, callback: Function) {
        self.simulator.subscribe(Box::new(JsSink {
            on_position: Some(callback),
            on_state_change: None,
        }));
    }

    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&mut self, callback: Function) {
        self.simulator.subscribe(Box::new(JsSink {
            on_position: None,
            on_state_change: Some(callback),
        }));
    }

    pub fn start(&mut self) -> Result<(), JsValue> {
        self.simulator.start()?;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), JsValue> {
        self.simulator.pause()?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), JsValue> {
        self.simulator.resume()?;
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<(), JsValue> {
        self.simulator.toggle()?;
        Ok(())
    }

    pub fn stop(&mut self) {
        self.simulator.stop();
    }

    /// Advance one step. Returns `null` when not walking, otherwise
    /// `{ position, cursor, event }`.
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        match self.simulator.tick()? {
            Some(tick) => to_js(&tick),
            None => Ok(JsValue::NULL),
        }
    }

    /// `"walking"`, `"running"`, `"driving"` or `{ custom: metersPerSecond }`.
    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, speed: JsValue) -> Result<(), JsValue> {
        let speed: SpeedProfile = from_js(speed)?;
        Ok(self.simulator.set_speed(speed)?)
    }

    /// `"stopAtEnd"`, `"loopToStart"` or `"reverseWalk"`.
    #[wasm_bindgen(js_name = setRoutingMode)]
    pub fn set_routing_mode(&mut self, mode: JsValue) -> Result<(), JsValue> {
        let mode: RoutingMode = from_js(mode)?;
        self.simulator.set_routing_mode(mode);
        Ok(())
    }

    /// Send one position to the `onPosition` callbacks. Only while stopped.
    pub fn teleport(
        &mut self,
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
    ) -> Result<(), JsValue> {
        let point = GeoPoint::new(latitude, longitude, elevation.unwrap_or(0.0));
        Ok(self.simulator.teleport(point)?)
    }

    /// Teleport to a typed-in coordinate such as `"35.6762, 139.6503"`.
    #[wasm_bindgen(js_name = teleportTo)]
    pub fn teleport_to(&mut self, text: &str) -> Result<(), JsValue> {
        let point: GeoPoint = text.parse()?;
        Ok(self.simulator.teleport(point)?)
    }

    #[wasm_bindgen(js_name = setDrift)]
    pub fn set_drift(&mut self, enabled: bool) {
        self.simulator.set_drift(enabled);
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.simulator.state().as_str().to_string()
    }

    #[wasm_bindgen(getter, js_name = tickIntervalMs)]
    pub fn tick_interval_ms(&self) -> f64 {
        self.simulator.config().tick_interval_ms as f64
    }

    #[wasm_bindgen(getter, js_name = pointCount)]
    pub fn point_count(&self) -> usize {
        self.simulator.route().point_count()
    }

    pub fn points(&self) -> Result<JsValue, JsValue> {
        to_js(self.simulator.route())
    }

    /// The current route as a GPX 1.1 document.
    #[wasm_bindgen(js_name = toGpx)]
    pub fn to_gpx(&self, track_name: Option<String>) -> Result<String, JsValue> {
        let name = track_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(DEFAULT_TRACK_NAME);
        Ok(writer::encode_route(self.simulator.route(), name)?)
    }

    /// Route and marker as a GeoJSON FeatureCollection. The marker is only
    /// present while walking or paused.
    #[wasm_bindgen(js_name = toGeoJson)]
    pub fn to_geojson(&self) -> Result<JsValue, JsValue> {
        let fc = converter::to_feature_collection(
            self.simulator.route(),
            self.name.as_deref(),
            self.marker(),
        );
        to_js(&fc)
    }

    #[wasm_bindgen(js_name = appendPoint)]
    pub fn append_point(
        &mut self,
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
    ) -> Result<(), JsValue> {
        let point = GeoPoint::new(latitude, longitude, elevation.unwrap_or(0.0));
        Ok(self.simulator.edit_route(|route| route.append(point))?)
    }

    /// Append a typed-in coordinate such as `"35.6762, 139.6503"`.
    #[wasm_bindgen(js_name = appendCoordinate)]
    pub fn append_coordinate(&mut self, text: &str) -> Result<(), JsValue> {
        let point: GeoPoint = text.parse()?;
        Ok(self.simulator.edit_route(|route| route.append(point))?)
    }

    /// Insert the midpoint of `afterIndex` and its successor. Returns the new index.
    #[wasm_bindgen(js_name = insertMidpoint)]
    pub fn insert_midpoint(&mut self, after_index: usize) -> Result<usize, JsValue> {
        Ok(self
            .simulator
            .edit_route(|route| route.insert_midpoint(after_index))?)
    }

    /// Insert a point halfway between `index` and the point before it.
    #[wasm_bindgen(js_name = insertBefore)]
    pub fn insert_before(&mut self, index: usize) -> Result<usize, JsValue> {
        Ok(self.simulator.edit_route(|route| route.insert_before(index))?)
    }

    /// Insert a point halfway between `index` and the point after it.
    #[wasm_bindgen(js_name = insertAfter)]
    pub fn insert_after(&mut self, index: usize) -> Result<usize, JsValue> {
        Ok(self.simulator.edit_route(|route| route.insert_after(index))?)
    }

    #[wasm_bindgen(js_name = removeAt)]
    pub fn remove_at(&mut self, index: usize) -> Result<JsValue, JsValue> {
        let removed = self.simulator.edit_route(|route| route.remove_at(index))?;
        to_js(&removed)
    }

    #[wasm_bindgen(js_name = setPoint)]
    pub fn set_point(
        &mut self,
        index: usize,
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
    ) -> Result<(), JsValue> {
        let point = GeoPoint::new(latitude, longitude, elevation.unwrap_or(0.0));
        self.simulator.edit_route(|route| route.set_at(index, point))?;
        Ok(())
    }

    #[wasm_bindgen(js_name = clearRoute)]
    pub fn clear_route(&mut self) -> Result<(), JsValue> {
        self.simulator.edit_route(|route| {
            route.clear();
            Ok(())
        })?;
        self.name = None;
        Ok(())
    }
}

impl Walker {
    fn marker(&self) -> Option<Cursor> {
        if self.simulator.route().is_empty() || self.simulator.state() == WalkingState::Stopped {
            return None;
        }
        let cursor = self.simulator.cursor();
        Some(Cursor {
            position: self.simulator.emitted_position().unwrap_or(cursor.position),
            segment: cursor.segment,
        })
    }
}

/// First track name, falling back to the metadata name.
fn document_name(doc: &GpxDocument) -> Option<String> {
    doc.tracks
        .iter()
        .find_map(|trk| trk.name.clone())
        .or_else(|| doc.metadata.name.clone())
}
