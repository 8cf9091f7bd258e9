//! The walking simulator: a state machine advanced by an external periodic tick.
//!
//! Each tick moves the cursor `speed * interval` meters along the current
//! segment. When a tick would pass the end of the segment the cursor jumps to
//! the next one and walks the leftover distance from its start point, so at
//! sharp turns the path cuts slightly short of the exact crossing point.

use std::fmt;

use serde::Serialize;

use crate::drift::Drift;
use crate::error::{Error, RouteError, SimulatorError};
use crate::geodesy;
use crate::options::{RoutingMode, SimulatorConfig, SpeedProfile};
use crate::point::GeoPoint;
use crate::route::Route;
use crate::sink::PositionSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WalkingState {
    #[default]
    Stopped,
    Active,
    Paused,
}

impl WalkingState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Active => "active",
            Self::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateChange {
    pub from: WalkingState,
    pub to: WalkingState,
}

/// End-of-route handling that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteEvent {
    /// Holding at the last point. The simulator stays active.
    ReachedEnd,
    LoopedToStart,
    /// The route's points were reversed in place.
    Reversed,
}

/// Where the simulator is on its route. Segment `i` joins points `i` and `i + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Cursor {
    pub position: GeoPoint,
    pub segment: usize,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tick {
    /// Emitted position, drift included.
    pub position: GeoPoint,
    pub cursor: Cursor,
    pub event: Option<RouteEvent>,
}

pub struct Simulator {
    config: SimulatorConfig,
    route: Route,
    state: WalkingState,
    cursor: Cursor,
    emitted: Option<GeoPoint>,
    drift: Drift,
    sinks: Vec<Box<dyn PositionSink>>,
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("points", &self.route.point_count())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        let drift = Drift::new(config.drift_seed);
        Self {
            config,
            route: Route::new(),
            state: WalkingState::Stopped,
            cursor: Cursor::default(),
            emitted: None,
            drift,
            sinks: Vec::new(),
        }
    }

    pub fn with_route(config: SimulatorConfig, route: Route) -> Self {
        let mut simulator = Self::new(config);
        simulator.load_route(route);
        simulator
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn state(&self) -> WalkingState {
        self.state
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Position emitted by the most recent tick, cleared on reset.
    pub fn emitted_position(&self) -> Option<GeoPoint> {
        self.emitted
    }

    pub fn subscribe(&mut self, sink: Box<dyn PositionSink>) {
        self.sinks.push(sink);
    }

    pub fn set_speed(&mut self, speed: SpeedProfile) -> Result<(), SimulatorError> {
        self.config.speed = speed.validated()?;
        Ok(())
    }

    /// Takes effect at the next end-of-route event.
    pub fn set_routing_mode(&mut self, mode: RoutingMode) {
        self.config.routing_mode = mode;
    }

    pub fn set_drift(&mut self, enabled: bool) {
        self.config.drift = enabled;
    }

    /// Replace the route. A running walk is stopped first; the cursor always
    /// starts over at the first point.
    pub fn load_route(&mut self, route: Route) -> Option<StateChange> {
        let change = self.stop();
        self.route = route;
        self.reset();
        tracing::info!(
            points = self.route.point_count(),
            length_m = self.route.total_length(),
            "Loaded route"
        );
        change
    }

    /// Mutate the route while not walking. The cursor is re-anchored at the
    /// start afterwards since indices may have shifted. A paused walk whose
    /// route drops below two points is stopped.
    pub fn edit_route<T>(
        &mut self,
        edit: impl FnOnce(&mut Route) -> Result<T, RouteError>,
    ) -> Result<T, Error> {
        if self.state == WalkingState::Active {
            return Err(SimulatorError::RouteLocked.into());
        }

        let result = edit(&mut self.route)?;

        if self.state == WalkingState::Paused && !self.route.is_walkable() {
            self.stop();
        } else {
            self.reset();
        }
        Ok(result)
    }

    pub fn start(&mut self) -> Result<StateChange, SimulatorError> {
        if self.state != WalkingState::Stopped {
            return Err(SimulatorError::InvalidTransition {
                from: self.state,
                action: "start",
            });
        }
        if !self.route.is_walkable() {
            return Err(SimulatorError::NoRouteLoaded {
                points: self.route.point_count(),
            });
        }

        self.reset();
        Ok(self.transition(WalkingState::Active))
    }

    pub fn pause(&mut self) -> Result<StateChange, SimulatorError> {
        match self.state {
            WalkingState::Active => Ok(self.transition(WalkingState::Paused)),
            from => Err(SimulatorError::InvalidTransition {
                from,
                action: "pause",
            }),
        }
    }

    pub fn resume(&mut self) -> Result<StateChange, SimulatorError> {
        match self.state {
            WalkingState::Paused => Ok(self.transition(WalkingState::Active)),
            from => Err(SimulatorError::InvalidTransition {
                from,
                action: "resume",
            }),
        }
    }

    /// Single start/pause/resume control: starts when stopped, otherwise
    /// flips between active and paused.
    pub fn toggle(&mut self) -> Result<StateChange, SimulatorError> {
        match self.state {
            WalkingState::Stopped => self.start(),
            WalkingState::Active => self.pause(),
            WalkingState::Paused => self.resume(),
        }
    }

    /// Stop and rewind to the first point. Returns `None` when already stopped.
    pub fn stop(&mut self) -> Option<StateChange> {
        self.reset();
        match self.state {
            WalkingState::Stopped => None,
            _ => Some(self.transition(WalkingState::Stopped)),
        }
    }

    /// Push a single position to every sink without walking, e.g. a typed-in
    /// coordinate. Only allowed while stopped; the cursor is left alone.
    pub fn teleport(&mut self, point: GeoPoint) -> Result<(), Error> {
        if self.state != WalkingState::Stopped {
            return Err(SimulatorError::InvalidTransition {
                from: self.state,
                action: "teleport",
            }
            .into());
        }
        let point = GeoPoint::checked(point.latitude, point.longitude, point.elevation)?;

        tracing::info!(lat = point.latitude, lon = point.longitude, "Teleport");
        for sink in &mut self.sinks {
            sink.on_position(point);
        }
        Ok(())
    }

    /// Re-anchor the cursor at point 0, segment 0, without changing state.
    pub fn reset(&mut self) {
        self.cursor = Cursor {
            position: self.route.points().first().copied().unwrap_or_default(),
            segment: 0,
        };
        self.emitted = None;
    }

    /// Advance one tick and push the emitted position to every sink.
    ///
    /// Returns `Ok(None)` when not active. A route of fewer than two points
    /// leaves everything untouched.
    pub fn tick(&mut self) -> Result<Option<Tick>, SimulatorError> {
        if self.state != WalkingState::Active {
            tracing::trace!(state = ?self.state, "Ignoring tick");
            return Ok(None);
        }
        if !self.route.is_walkable() {
            tracing::warn!(points = self.route.point_count(), "Cannot advance");
            return Err(SimulatorError::PrerequisiteNotMet {
                points: self.route.point_count(),
            });
        }

        // a config built in Rust bypasses the deserialization check
        self.config.speed.validated().inspect_err(|err| {
            tracing::warn!(%err, "Cannot advance");
        })?;
        let event = self.advance(self.config.step_distance());

        let position = if self.config.drift {
            self.drift.apply(self.cursor.position)
        } else {
            self.cursor.position
        };
        self.emitted = Some(position);

        for sink in &mut self.sinks {
            sink.on_position(position);
        }

        tracing::trace!(
            segment = self.cursor.segment,
            lat = position.latitude,
            lon = position.longitude,
            "Tick"
        );

        Ok(Some(Tick {
            position,
            cursor: self.cursor,
            event,
        }))
    }

    fn advance(&mut self, step: f64) -> Option<RouteEvent> {
        let points = self.route.points();
        let segment = self.cursor.segment;

        let (Some(&from), Some(&to)) = (points.get(segment), points.get(segment + 1)) else {
            // only reachable if the route changed behind the cursor
            self.reset();
            return None;
        };

        let remaining = geodesy::distance(self.cursor.position, to);
        if step < remaining {
            let heading = geodesy::bearing(from, to);
            self.cursor.position = geodesy::destination(self.cursor.position, heading, step)
                .with_elevation(from.elevation);
            return None;
        }

        let next = segment + 1;
        match points.get(next + 1) {
            Some(&after) => {
                let start = points[next];
                let heading = geodesy::bearing(start, after);
                self.cursor = Cursor {
                    position: geodesy::destination(start, heading, step - remaining)
                        .with_elevation(start.elevation),
                    segment: next,
                };
                None
            }
            None => Some(self.finish_route()),
        }
    }

    fn finish_route(&mut self) -> RouteEvent {
        let event = match self.config.routing_mode {
            RoutingMode::StopAtEnd => {
                let points = self.route.points();
                let last = points.len() - 1;
                self.cursor = Cursor {
                    position: points[last].with_elevation(points[last - 1].elevation),
                    segment: last - 1,
                };
                RouteEvent::ReachedEnd
            }
            RoutingMode::LoopToStart => {
                self.reset();
                RouteEvent::LoopedToStart
            }
            RoutingMode::ReverseWalk => {
                self.route.reverse();
                self.reset();
                RouteEvent::Reversed
            }
        };
        tracing::debug!(?event, "End of route");
        event
    }

    fn transition(&mut self, to: WalkingState) -> StateChange {
        let change = StateChange {
            from: self.state,
            to,
        };
        self.state = to;
        tracing::debug!(from = ?change.from, to = ?change.to, "Walking state changed");
        for sink in &mut self.sinks {
            sink.on_state_change(change);
        }
        change
    }
}
