use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

/// A geographic position in degrees, with elevation in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: f64,
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}°, {:.6}°, {:.1} m)",
            self.latitude, self.longitude, self.elevation
        )
    }
}

impl GeoPoint {
    /// Build a point without checking the coordinate domain.
    pub const fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Build a point, rejecting latitudes outside [-90, 90] and longitudes
    /// outside [-180, 180].
    pub fn checked(latitude: f64, longitude: f64, elevation: f64) -> Result<Self, RouteError> {
        let point = Self::new(latitude, longitude, elevation);
        if point.is_valid() {
            Ok(point)
        } else {
            Err(RouteError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
            && self.elevation.is_finite()
    }

    pub fn with_elevation(self, elevation: f64) -> Self {
        Self { elevation, ..self }
    }

    /// Arithmetic mean of latitude, longitude and elevation. Not a geodesic midpoint.
    pub fn linear_midpoint(&self, other: &GeoPoint) -> GeoPoint {
        GeoPoint::new(
            (self.latitude + other.latitude) / 2.0,
            (self.longitude + other.longitude) / 2.0,
            (self.elevation + other.elevation) / 2.0,
        )
    }
}

/// Parses manual coordinate entry: `"lat, lon"` or `"lat, lon, ele"`.
impl FromStr for GeoPoint {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparsable = || RouteError::UnparsableCoordinate(s.to_string());

        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| unparsable())?;

        match values.as_slice() {
            [lat, lon] => GeoPoint::checked(*lat, *lon, 0.0),
            [lat, lon, ele] => GeoPoint::checked(*lat, *lon, *ele),
            _ => Err(unparsable()),
        }
    }
}
