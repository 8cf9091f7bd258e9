use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SimulatorError;

/// Fast walking pace, 8.8 km/h.
pub const WALKING_SPEED_MPS: f64 = 2.47;

/// Options for the walking simulator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorConfig {
    /// Movement speed (default: walking)
    #[serde(default)]
    pub speed: SpeedProfile,

    /// What happens at the end of the route (default: reverseWalk)
    #[serde(default)]
    pub routing_mode: RoutingMode,

    /// Perturb emitted positions with GPS-like noise (default: false)
    #[serde(default)]
    pub drift: bool,

    /// Interval between ticks in milliseconds (default: 500)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Seed for the drift noise; a fixed seed is used when absent
    #[serde(default)]
    pub drift_seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            speed: SpeedProfile::default(),
            routing_mode: RoutingMode::default(),
            drift: false,
            tick_interval_ms: default_tick_interval_ms(),
            drift_seed: None,
        }
    }
}

impl SimulatorConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Distance covered in one tick, in meters.
    pub fn step_distance(&self) -> f64 {
        self.speed.meters_per_second() * self.tick_interval().as_secs_f64()
    }
}

/// Deserialization goes through [`SpeedProfile::validated`], so a custom
/// speed read from JS is always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "RawSpeedProfile")]
pub enum SpeedProfile {
    #[default]
    Walking,
    Running,
    Driving,
    /// Explicit speed in meters per second.
    Custom(f64),
}

impl SpeedProfile {
    pub fn meters_per_second(self) -> f64 {
        match self {
            Self::Walking => WALKING_SPEED_MPS,
            Self::Running => WALKING_SPEED_MPS * 3.0,
            Self::Driving => WALKING_SPEED_MPS * 12.0,
            Self::Custom(mps) => mps,
        }
    }

    /// Rejects a NaN, infinite or negative custom speed.
    pub fn validated(self) -> Result<Self, SimulatorError> {
        let mps = self.meters_per_second();
        if mps.is_finite() && mps >= 0.0 {
            Ok(self)
        } else {
            Err(SimulatorError::InvalidSpeed { mps })
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawSpeedProfile {
    Walking,
    Running,
    Driving,
    Custom(f64),
}

impl TryFrom<RawSpeedProfile> for SpeedProfile {
    type Error = SimulatorError;

    fn try_from(raw: RawSpeedProfile) -> Result<Self, Self::Error> {
        match raw {
            RawSpeedProfile::Walking => Self::Walking,
            RawSpeedProfile::Running => Self::Running,
            RawSpeedProfile::Driving => Self::Driving,
            RawSpeedProfile::Custom(mps) => Self::Custom(mps),
        }
        .validated()
    }
}

/// Policy applied when the cursor runs off the last segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutingMode {
    /// Hold at the last point.
    StopAtEnd,
    /// Jump back to the first point and walk in the same direction.
    LoopToStart,
    /// Reverse the route and walk it back.
    #[default]
    ReverseWalk,
}

fn default_tick_interval_ms() -> u64 {
    500
}
