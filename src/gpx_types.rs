use crate::point::GeoPoint;
use crate::route::Route;

pub const GPX10_NAMESPACE: &str = "http://www.topografix.com/GPX/1/0";
pub const GPX11_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

/// Schema version a document was read from. Parsed documents are always
/// held in the 1.1 shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpxVersion {
    V1_0,
    #[default]
    V1_1,
}

impl GpxVersion {
    pub fn from_namespace(ns: &str) -> Option<Self> {
        match ns {
            GPX10_NAMESPACE => Some(Self::V1_0),
            GPX11_NAMESPACE => Some(Self::V1_1),
            _ => None,
        }
    }
}

/// Parsed GPX data containing all waypoints, routes, and tracks.
#[derive(Debug, Default)]
pub struct GpxDocument {
    pub version: GpxVersion,
    pub metadata: GpxMetadata,
    pub waypoints: Vec<GpxPoint>,
    pub routes: Vec<GpxRoute>,
    pub tracks: Vec<GpxTrack>,
}

impl GpxDocument {
    /// A document holding `route` as a single track with a single segment.
    pub fn from_route(route: &Route, track_name: &str) -> Self {
        let points = route.points().iter().map(GpxPoint::from).collect();
        Self {
            tracks: vec![GpxTrack {
                name: Some(track_name.to_string()),
                segments: vec![GpxSegment { points }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    /// Waypoints followed by every track point, in document order.
    /// `<rte>` points do not take part in the walk.
    pub fn walking_route(&self) -> Route {
        let points = self
            .waypoints
            .iter()
            .chain(
                self.tracks
                    .iter()
                    .flat_map(|trk| trk.segments.iter())
                    .flat_map(|seg| seg.points.iter()),
            )
            .map(GpxPoint::to_geo_point)
            .collect();
        // coordinates are range-checked by the parser
        Route::from_points(points).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty() && self.routes.is_empty() && self.tracks.is_empty()
    }
}

/// Document-level metadata. GPX 1.0 keeps these fields directly under `<gpx>`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GpxMetadata {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub author: Option<String>,
    pub time: Option<String>,
    pub link: Option<GpxLink>,
}

impl GpxMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single GPX point (used for wpt, rtept, trkpt).
#[derive(Debug, Clone, PartialEq)]
pub struct GpxPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    pub time: Option<String>,
    pub name: Option<String>,
    pub desc: Option<String>,
    pub sym: Option<String>,
    pub link: Option<GpxLink>,
}

impl GpxPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ele: None,
            time: None,
            name: None,
            desc: None,
            sym: None,
            link: None,
        }
    }

    /// Missing elevation reads as 0.
    pub fn to_geo_point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon, self.ele.unwrap_or(0.0))
    }
}

impl From<&GeoPoint> for GpxPoint {
    fn from(p: &GeoPoint) -> Self {
        Self {
            ele: Some(p.elevation),
            ..Self::new(p.latitude, p.longitude)
        }
    }
}

/// A GPX link element. GPX 1.0 `<url>`/`<urlname>` pairs are read into this.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpxLink {
    pub href: String,
    pub text: Option<String>,
}

/// A GPX route (<rte>).
#[derive(Debug, Default)]
pub struct GpxRoute {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub link: Option<GpxLink>,
    pub points: Vec<GpxPoint>,
}

/// A GPX track (<trk>).
#[derive(Debug, Default)]
pub struct GpxTrack {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub track_type: Option<String>,
    pub link: Option<GpxLink>,
    pub segments: Vec<GpxSegment>,
}

/// A GPX track segment (<trkseg>).
#[derive(Debug, Default)]
pub struct GpxSegment {
    pub points: Vec<GpxPoint>,
}
