use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::point::GeoPoint;

/// Offset magnitude per axis, in degrees.
pub const DRIFT_RANGE_DEG: Range<f64> = 0.00001..0.00004;

const DEFAULT_SEED: u64 = 0x5EED_6A5D;

/// GPS receiver noise applied to emitted positions.
#[derive(Debug, Clone)]
pub struct Drift {
    rng: StdRng,
}

impl Drift {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed.unwrap_or(DEFAULT_SEED)),
        }
    }

    /// `point` shifted by an independent offset on each axis.
    pub fn apply(&mut self, point: GeoPoint) -> GeoPoint {
        let lat = self.offset();
        let lon = self.offset();
        GeoPoint {
            latitude: point.latitude + lat,
            longitude: point.longitude + lon,
            ..point
        }
    }

    fn offset(&mut self) -> f64 {
        let magnitude = self.rng.random_range(DRIFT_RANGE_DEG);
        if self.rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }
}
