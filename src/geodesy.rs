//! Great-circle math on a spherical Earth.
//!
//! Stepping along a route compounds these results tick after tick, so the
//! formulas stay exactly as the simulator has always used them: a Cartesian
//! dot product for distance, the forward azimuth for bearing and the direct
//! problem for the destination point.

use std::f64::consts::TAU;

use crate::point::GeoPoint;

/// Earth's radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

/// Great-circle distance in meters.
///
/// Both points are projected onto the sphere and the angle between the
/// position vectors is recovered from their dot product. The cosine is
/// clamped to [-1, 1] so nearly identical points yield 0 rather than NaN.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    if a.latitude == b.latitude && a.longitude == b.longitude {
        return 0.0;
    }

    let (x1, y1, z1) = to_cartesian(a);
    let (x2, y2, z2) = to_cartesian(b);

    let dot = x1 * x2 + y1 * y2 + z1 * z2;
    let cos_theta = (dot / (EARTH_RADIUS_M * EARTH_RADIUS_M)).clamp(-1.0, 1.0);

    EARTH_RADIUS_M * cos_theta.acos()
}

fn to_cartesian(p: GeoPoint) -> (f64, f64, f64) {
    let lat = p.latitude.to_radians();
    let lon = p.longitude.to_radians();

    let rho = EARTH_RADIUS_M * lat.cos();
    (rho * lon.cos(), rho * lon.sin(), EARTH_RADIUS_M * lat.sin())
}

/// Initial bearing from `from` toward `to`, in radians within [0, 2π).
pub fn bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let x = lat_from.cos() * lat_to.sin() - lat_from.sin() * lat_to.cos() * delta_lon.cos();
    let y = delta_lon.sin() * lat_to.cos();

    let normalized = (y.atan2(x) + TAU) % TAU;
    // atan2 of -0.0 lands exactly on TAU after the shift
    if normalized >= TAU { 0.0 } else { normalized }
}

/// Point reached by travelling `distance` meters from `start` along `bearing`
/// (radians). Only latitude and longitude are computed; elevation is 0.
///
/// The longitude is wrapped back into [-180, 180] after crossing the
/// antimeridian.
pub fn destination(start: GeoPoint, bearing: f64, distance: f64) -> GeoPoint {
    let ratio = distance / EARTH_RADIUS_M;
    let (ratio_sin, ratio_cos) = ratio.sin_cos();

    let lat1 = start.latitude.to_radians();
    let lon1 = start.longitude.to_radians();
    let (lat1_sin, lat1_cos) = lat1.sin_cos();

    let lat2 = (lat1_sin * ratio_cos + lat1_cos * ratio_sin * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * ratio_sin * lat1_cos).atan2(ratio_cos - lat1_sin * lat2.sin());

    GeoPoint::new(lat2.to_degrees(), wrap_longitude(lon2.to_degrees()), 0.0)
}

/// In-range values pass through untouched.
fn wrap_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn samples() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0, 0.0),
            GeoPoint::new(35.6762, 139.6503, 40.0),
            GeoPoint::new(-33.8568, 151.2153, 0.0),
            GeoPoint::new(48.05744, -123.119625, 0.0),
            GeoPoint::new(89.9, 45.0, 0.0),
            GeoPoint::new(-89.9, -179.9, 0.0),
        ]
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for p in samples() {
            assert_eq!(distance(p, p), 0.0, "{p}");
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pts = samples();
        for a in &pts {
            for b in &pts {
                assert_eq!(distance(*a, *b), distance(*b, *a));
            }
        }
    }

    #[test]
    fn test_distance_one_degree_on_equator() {
        let d = distance(GeoPoint::new(0.0, 0.0, 0.0), GeoPoint::new(0.0, 1.0, 0.0));
        let expected = EARTH_RADIUS_M * 1.0_f64.to_radians();
        assert!((d - expected).abs() < 1e-3, "{d}");
    }

    #[test]
    fn test_distance_antipodes_does_not_nan() {
        let d = distance(GeoPoint::new(0.0, 0.0, 0.0), GeoPoint::new(0.0, 180.0, 0.0));
        assert!((d - EARTH_RADIUS_M * PI).abs() < 1e-3);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0, 0.0);
        let north = bearing(origin, GeoPoint::new(1.0, 0.0, 0.0));
        let east = bearing(origin, GeoPoint::new(0.0, 1.0, 0.0));
        let south = bearing(origin, GeoPoint::new(-1.0, 0.0, 0.0));
        let west = bearing(origin, GeoPoint::new(0.0, -1.0, 0.0));

        assert!(north.abs() < 1e-12);
        assert!((east - FRAC_PI_2).abs() < 1e-12);
        assert!((south - PI).abs() < 1e-12);
        assert!((west - 3.0 * FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_bearing_range() {
        let pts = samples();
        for a in &pts {
            for b in &pts {
                let brg = bearing(*a, *b);
                assert!((0.0..TAU).contains(&brg), "{a} -> {b}: {brg}");
            }
        }
    }

    #[test]
    fn test_destination_distance_round_trip() {
        for p in samples().into_iter().filter(|p| p.latitude.abs() < 80.0) {
            for step in [1.235, 30.0, 500.0, 12_000.0] {
                for brg in [0.0, 1.0, FRAC_PI_2, 3.0, 5.5] {
                    let q = destination(p, brg, step);
                    let d = distance(p, q);
                    // acos loses precision for short arcs: centimetres at metre scale
                    assert!((d - step).abs() < 0.05, "{p} {brg} {step}: {d}");
                }
            }
        }
    }

    #[test]
    fn test_destination_follows_bearing() {
        let start = GeoPoint::new(10.0, 20.0, 0.0);
        let end = GeoPoint::new(10.5, 20.5, 0.0);
        let q = destination(start, bearing(start, end), distance(start, end));
        assert!((q.latitude - end.latitude).abs() < 1e-9);
        assert!((q.longitude - end.longitude).abs() < 1e-9);
        assert_eq!(q.elevation, 0.0);
    }

    #[test]
    fn test_destination_wraps_at_antimeridian() {
        let east = destination(GeoPoint::new(0.0, 179.9999, 0.0), FRAC_PI_2, 20.0);
        assert!(east.is_valid(), "{east}");
        assert!(east.longitude < -179.9998 && east.longitude > -180.0, "{east}");

        let west = destination(GeoPoint::new(10.0, -179.9999, 0.0), 1.5 * PI, 20.0);
        assert!(west.is_valid(), "{west}");
        assert!(west.longitude > 179.9998, "{west}");

        let start = GeoPoint::new(0.0, 179.9999, 0.0);
        assert!((distance(start, east) - 20.0).abs() < 0.05);
    }

    #[test]
    fn test_wrap_longitude_passes_in_range_values() {
        assert_eq!(wrap_longitude(0.001), 0.001);
        assert_eq!(wrap_longitude(-180.0), -180.0);
        assert_eq!(wrap_longitude(180.0), 180.0);
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
    }
}
