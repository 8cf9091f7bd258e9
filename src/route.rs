use serde::Serialize;

use crate::error::RouteError;
use crate::geodesy;
use crate::point::GeoPoint;

type Result<T> = std::result::Result<T, RouteError>;

/// An ordered sequence of points to walk.
///
/// Points are identified by index. Indices are stable under `append` and shift
/// under insertion and removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a route from points, rejecting any out-of-domain coordinate.
    pub fn from_points(points: Vec<GeoPoint>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
            return Err(RouteError::InvalidCoordinate {
                latitude: bad.latitude,
                longitude: bad.longitude,
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A single point cannot define a segment.
    pub fn is_walkable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn point_at(&self, index: usize) -> Result<GeoPoint> {
        self.points.get(index).copied().ok_or(RouteError::IndexOutOfRange {
            index,
            len: self.points.len(),
        })
    }

    pub fn append(&mut self, point: GeoPoint) -> Result<()> {
        if !point.is_valid() {
            return Err(RouteError::InvalidCoordinate {
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }
        self.points.push(point);
        Ok(())
    }

    /// Insert the arithmetic midpoint of points `after_index` and
    /// `after_index + 1` between them. Returns the index of the new point.
    pub fn insert_midpoint(&mut self, after_index: usize) -> Result<usize> {
        let (a, b) = match (
            self.points.get(after_index),
            after_index.checked_add(1).and_then(|i| self.points.get(i)),
        ) {
            (Some(a), Some(b)) => (*a, *b),
            _ => {
                return Err(RouteError::IndexOutOfRange {
                    index: after_index,
                    len: self.points.len(),
                });
            }
        };

        self.points.insert(after_index + 1, a.linear_midpoint(&b));
        Ok(after_index + 1)
    }

    /// Insert a midpoint between `index` and its predecessor. Fails for the first point.
    pub fn insert_before(&mut self, index: usize) -> Result<usize> {
        if index == 0 || index >= self.points.len() {
            return Err(RouteError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        self.insert_midpoint(index - 1)
    }

    /// Insert a midpoint between `index` and its successor. Fails for the last point.
    pub fn insert_after(&mut self, index: usize) -> Result<usize> {
        self.insert_midpoint(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<GeoPoint> {
        if index >= self.points.len() {
            return Err(RouteError::IndexOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        Ok(self.points.remove(index))
    }

    /// Replace the point at `index`, e.g. after it was dragged on the map.
    pub fn set_at(&mut self, index: usize, point: GeoPoint) -> Result<GeoPoint> {
        if !point.is_valid() {
            return Err(RouteError::InvalidCoordinate {
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }
        let len = self.points.len();
        let slot = self
            .points
            .get_mut(index)
            .ok_or(RouteError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, point))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Sum of the great-circle lengths of all segments, in meters.
    pub fn total_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| geodesy::distance(pair[0], pair[1]))
            .sum()
    }
}
