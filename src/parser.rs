use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::FormatError;
use crate::gpx_types::*;
use crate::route::Route;

type Result<T> = std::result::Result<T, FormatError>;

/// Parse a GPX XML string into a GpxDocument.
///
/// The root must be `<gpx>` in the GPX 1.0 or 1.1 namespace. 1.0 documents are
/// read into the 1.1 shape: `<url>`/`<urlname>` become links and the
/// document-level name, description, author and time become metadata.
pub fn parse_gpx(xml: &str) -> Result<GpxDocument> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let version = root_version(&e)?;
                let doc = parse_root(&mut reader, version)?;
                tracing::debug!(
                    ?version,
                    waypoints = doc.waypoints.len(),
                    routes = doc.routes.len(),
                    tracks = doc.tracks.len(),
                    "Parsed GPX document"
                );
                return Ok(doc);
            }
            Ok(Event::Empty(e)) => {
                let version = root_version(&e)?;
                return Ok(GpxDocument {
                    version,
                    ..Default::default()
                });
            }
            Ok(Event::Eof) => return Err(FormatError::MissingRoot),
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }
}

/// Parse a GPX document straight into the route to walk.
pub fn parse_route(xml: &str) -> Result<Route> {
    Ok(parse_gpx(xml)?.walking_route())
}

pub fn read_file(path: impl AsRef<Path>) -> Result<GpxDocument> {
    let xml = std::fs::read_to_string(path)?;
    parse_gpx(&xml)
}

/// Check the root element and resolve its namespace to a schema version.
fn root_version(e: &BytesStart<'_>) -> Result<GpxVersion> {
    let name = e.name();
    if e.local_name().as_ref() != b"gpx" {
        return Err(FormatError::UnexpectedRoot(
            String::from_utf8_lossy(name.as_ref()).into_owned(),
        ));
    }

    let ns_key = match name.prefix() {
        Some(prefix) => [b"xmlns:".as_slice(), prefix.as_ref()].concat(),
        None => b"xmlns".to_vec(),
    };

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| FormatError::XmlParse(e.into()))?;
        if attr.key.as_ref() == ns_key.as_slice() {
            let ns = String::from_utf8_lossy(&attr.value).trim().to_string();
            return GpxVersion::from_namespace(&ns).ok_or(FormatError::UnrecognizedNamespace(ns));
        }
    }

    Err(FormatError::MissingNamespace)
}

/// Parse the children of `<gpx>`. Called after receiving Event::Start for the root.
fn parse_root<'a>(reader: &mut Reader<&'a [u8]>, version: GpxVersion) -> Result<GpxDocument> {
    let mut doc = GpxDocument {
        version,
        ..Default::default()
    };
    let legacy = version == GpxVersion::V1_0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"wpt" => doc.waypoints.push(parse_point(&e, reader, "wpt", version)?),
                b"rte" => doc.routes.push(parse_rte(reader, version)?),
                b"trk" => doc.tracks.push(parse_track(reader, version)?),
                b"metadata" if !legacy => doc.metadata = parse_metadata(reader)?,
                b"name" if legacy => doc.metadata.name = Some(read_text_owned(reader, &e)?),
                b"desc" if legacy => doc.metadata.desc = Some(read_text_owned(reader, &e)?),
                b"author" if legacy => doc.metadata.author = Some(read_text_owned(reader, &e)?),
                b"time" if legacy => doc.metadata.time = Some(read_text_owned(reader, &e)?),
                local @ (b"url" | b"urlname") if legacy => {
                    read_legacy_link(local, &e, reader, &mut doc.metadata.link)?
                }
                _ => {
                    // email, keywords, bounds, extensions
                    reader
                        .read_to_end(e.name())
                        .map_err(FormatError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"wpt" => doc.waypoints.push(parse_lat_lon(&e, "wpt")?),
                b"rte" => doc.routes.push(GpxRoute::default()),
                b"trk" => doc.tracks.push(GpxTrack::default()),
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"gpx" => break,
            Ok(Event::Eof) => return Err(FormatError::UnexpectedEof("gpx".to_string())),
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(doc)
}

/// Parse the required lat/lon attributes of a point element's start tag.
fn parse_lat_lon(e: &BytesStart<'_>, element: &'static str) -> Result<GpxPoint> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| FormatError::XmlParse(e.into()))?;
        let val = String::from_utf8_lossy(&attr.value);
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(parse_coordinate(&val, -90.0, 90.0, element, "lat")?),
            b"lon" => lon = Some(parse_coordinate(&val, -180.0, 180.0, element, "lon")?),
            _ => {}
        }
    }

    let lat = lat.ok_or(FormatError::MissingAttribute {
        element,
        attribute: "lat",
    })?;
    let lon = lon.ok_or(FormatError::MissingAttribute {
        element,
        attribute: "lon",
    })?;

    Ok(GpxPoint::new(lat, lon))
}

fn parse_coordinate(
    val: &str,
    min: f64,
    max: f64,
    element: &'static str,
    attribute: &'static str,
) -> Result<f64> {
    match val.trim().parse::<f64>() {
        Ok(v) if (min..=max).contains(&v) => Ok(v),
        _ => Err(FormatError::InvalidAttribute {
            element,
            attribute,
            value: val.to_string(),
        }),
    }
}

/// Parse a point element (wpt, rtept, trkpt) and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
    element: &'static str,
    version: GpxVersion,
) -> Result<GpxPoint> {
    let mut point = parse_lat_lon(start, element)?;
    let legacy = version == GpxVersion::V1_0;
    let end_name = start.name().0.to_vec(); // own the end tag name for comparison

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    point.ele = match text.trim().parse::<f64>() {
                        Ok(ele) if ele.is_finite() => Some(ele),
                        _ => {
                            return Err(FormatError::InvalidElement {
                                element: "ele",
                                value: text,
                            });
                        }
                    };
                }
                b"time" => point.time = Some(read_text_owned(reader, &e)?),
                b"name" => point.name = Some(read_text_owned(reader, &e)?),
                b"desc" => point.desc = Some(read_text_owned(reader, &e)?),
                b"sym" => point.sym = Some(read_text_owned(reader, &e)?),
                b"link" if !legacy => point.link = Some(parse_link(&e, reader)?),
                local @ (b"url" | b"urlname") if legacy => {
                    read_legacy_link(local, &e, reader, &mut point.link)?
                }
                _ => {
                    // 1.0 course/speed, extensions and the remaining descriptive fields
                    reader
                        .read_to_end(e.name())
                        .map_err(FormatError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(FormatError::UnexpectedEof(element.to_string())),
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(point)
}

/// Parse a GPX 1.1 `<link>` element.
fn parse_link<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<GpxLink> {
    let mut link = GpxLink::default();
    for attr in start.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"href" {
            link.href = String::from_utf8_lossy(&attr.value).into_owned();
        }
    }

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"text" => link.text = Some(read_text_owned(reader, &e)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(FormatError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"link" => break,
            Ok(Event::Eof) => return Err(FormatError::UnexpectedEof("link".to_string())),
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(link)
}

/// Fold a GPX 1.0 `<url>` or `<urlname>` element into a 1.1 link.
fn read_legacy_link<'a>(
    local: &[u8],
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
    link: &mut Option<GpxLink>,
) -> Result<()> {
    let text = read_text_owned(reader, start)?;
    let link = link.get_or_insert_with(GpxLink::default);
    if local == b"url" {
        link.href = text.trim().to_string();
    } else {
        link.text = Some(text);
    }
    Ok(())
}

/// Parse a GPX 1.1 `<metadata>` element.
fn parse_metadata<'a>(reader: &mut Reader<&'a [u8]>) -> Result<GpxMetadata> {
    let mut metadata = GpxMetadata::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => metadata.name = Some(read_text_owned(reader, &e)?),
                b"desc" => metadata.desc = Some(read_text_owned(reader, &e)?),
                b"time" => metadata.time = Some(read_text_owned(reader, &e)?),
                b"author" => metadata.author = parse_author(reader)?,
                b"link" => metadata.link = Some(parse_link(&e, reader)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(FormatError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"metadata" => break,
            Ok(Event::Eof) => return Err(FormatError::UnexpectedEof("metadata".to_string())),
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(metadata)
}

/// Read the `<name>` of a 1.1 `<author>` person element.
fn parse_author<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Option<String>> {
    let mut name = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => name = Some(read_text_owned(reader, &e)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(FormatError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"author" => break,
            Ok(Event::Eof) => return Err(FormatError::UnexpectedEof("author".to_string())),
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(name)
}

/// Parse a <rte> element.
fn parse_rte<'a>(reader: &mut Reader<&'a [u8]>, version: GpxVersion) -> Result<GpxRoute> {
    let mut route = GpxRoute::default();
    let legacy = version == GpxVersion::V1_0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => route.name = Some(read_text_owned(reader, &e)?),
                b"desc" => route.desc = Some(read_text_owned(reader, &e)?),
                b"link" if !legacy => route.link = Some(parse_link(&e, reader)?),
                local @ (b"url" | b"urlname") if legacy => {
                    read_legacy_link(local, &e, reader, &mut route.link)?
                }
                b"rtept" => route.points.push(parse_point(&e, reader, "rtept", version)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(FormatError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"rtept" {
                    route.points.push(parse_lat_lon(&e, "rtept")?);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"rte" => break,
            Ok(Event::Eof) => return Err(FormatError::UnexpectedEof("rte".to_string())),
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(route)
}

/// Parse a <trk> element.
fn parse_track<'a>(reader: &mut Reader<&'a [u8]>, version: GpxVersion) -> Result<GpxTrack> {
    let mut track = GpxTrack::default();
    let legacy = version == GpxVersion::V1_0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => track.name = Some(read_text_owned(reader, &e)?),
                b"desc" => track.desc = Some(read_text_owned(reader, &e)?),
                b"type" => track.track_type = Some(read_text_owned(reader, &e)?),
                b"link" if !legacy => track.link = Some(parse_link(&e, reader)?),
                local @ (b"url" | b"urlname") if legacy => {
                    read_legacy_link(local, &e, reader, &mut track.link)?
                }
                b"trkseg" => track.segments.push(parse_segment(reader, version)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(FormatError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkseg" {
                    track.segments.push(GpxSegment::default());
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => return Err(FormatError::UnexpectedEof("trk".to_string())),
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(track)
}

/// Parse a <trkseg> element.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>, version: GpxVersion) -> Result<GpxSegment> {
    let mut segment = GpxSegment::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => segment
                    .points
                    .push(parse_point(&e, reader, "trkpt", version)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(FormatError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    segment.points.push(parse_lat_lon(&e, "trkpt")?);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => return Err(FormatError::UnexpectedEof("trkseg".to_string())),
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(segment)
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::CData(e)) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Ok(Event::GeneralRef(e)) => {
                // Handle character references (&#60; &#x3C;) and predefined entities
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    let name: &[u8] = e.as_ref();
                    match name {
                        b"amp" => text.push('&'),
                        b"lt" => text.push('<'),
                        b"gt" => text.push('>'),
                        b"quot" => text.push('"'),
                        b"apos" => text.push('\''),
                        _ => {} // Unknown entity, skip
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => {
                return Err(FormatError::UnexpectedEof(
                    String::from_utf8_lossy(&end_name).into_owned(),
                ));
            }
            Err(e) => return Err(FormatError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS11: &str = r#"xmlns="http://www.topografix.com/GPX/1/1" version="1.1""#;

    fn gpx11(body: &str) -> String {
        format!(r#"<?xml version="1.0"?><gpx {NS11}>{body}</gpx>"#)
    }

    #[test]
    fn test_minimal_waypoint() {
        let xml = r#"<?xml version="1.0"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1">
  <wpt lat="35.6762" lon="139.6503"/>
</gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(data.version, GpxVersion::V1_1);
        assert_eq!(data.waypoints.len(), 1);
        assert!((data.waypoints[0].lat - 35.6762).abs() < 1e-10);
        assert!((data.waypoints[0].lon - 139.6503).abs() < 1e-10);
        assert_eq!(data.waypoints[0].ele, None);
    }

    #[test]
    fn test_waypoint_with_children() {
        let xml = gpx11(
            r#"
  <wpt lat="35.6762" lon="139.6503">
    <ele> 40.5 </ele>
    <time>2025-01-01T00:00:00Z</time>
    <name>Tokyo Tower</name>
    <desc>A famous landmark</desc>
    <sym>Flag</sym>
    <cmt>ignored</cmt>
  </wpt>"#,
        );
        let data = parse_gpx(&xml).unwrap();
        let pt = &data.waypoints[0];
        assert_eq!(pt.ele, Some(40.5));
        assert_eq!(pt.time.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(pt.name.as_deref(), Some("Tokyo Tower"));
        assert_eq!(pt.desc.as_deref(), Some("A famous landmark"));
        assert_eq!(pt.sym.as_deref(), Some("Flag"));
    }

    #[test]
    fn test_simple_route_kept_but_not_walked() {
        let xml = gpx11(
            r#"
  <rte>
    <name>Test Route</name>
    <rtept lat="35.0" lon="139.0"/>
    <rtept lat="36.0" lon="140.0"/>
    <rtept lat="37.0" lon="141.0"/>
  </rte>"#,
        );
        let data = parse_gpx(&xml).unwrap();
        assert_eq!(data.routes.len(), 1);
        assert_eq!(data.routes[0].name.as_deref(), Some("Test Route"));
        assert_eq!(data.routes[0].points.len(), 3);
        assert!(data.walking_route().is_empty());
    }

    #[test]
    fn test_simple_track() {
        let xml = gpx11(
            r#"
  <trk>
    <name>Morning Run</name>
    <type>running</type>
    <trkseg>
      <trkpt lat="35.0" lon="139.0"><ele>10.0</ele></trkpt>
      <trkpt lat="35.001" lon="139.001"><ele>11.0</ele></trkpt>
      <trkpt lat="35.002" lon="139.002"><ele>12.0</ele></trkpt>
    </trkseg>
  </trk>"#,
        );
        let data = parse_gpx(&xml).unwrap();
        assert_eq!(data.tracks.len(), 1);
        assert_eq!(data.tracks[0].name.as_deref(), Some("Morning Run"));
        assert_eq!(data.tracks[0].track_type.as_deref(), Some("running"));
        assert_eq!(data.tracks[0].segments[0].points.len(), 3);
        assert_eq!(data.tracks[0].segments[0].points[2].ele, Some(12.0));
    }

    #[test]
    fn test_multi_segment_track_flattens_in_order() {
        let xml = gpx11(
            r#"
  <trk>
    <trkseg>
      <trkpt lat="35.0" lon="139.0"/>
      <trkpt lat="35.001" lon="139.001"/>
    </trkseg>
    <trkseg/>
    <trkseg>
      <trkpt lat="36.0" lon="140.0"/>
    </trkseg>
  </trk>"#,
        );
        let data = parse_gpx(&xml).unwrap();
        assert_eq!(data.tracks[0].segments.len(), 3);
        let route = data.walking_route();
        let lats: Vec<f64> = route.points().iter().map(|p| p.latitude).collect();
        assert_eq!(lats, vec![35.0, 35.001, 36.0]);
    }

    #[test]
    fn test_waypoints_precede_track_points() {
        let xml = gpx11(
            r#"
  <trk><trkseg><trkpt lat="2.0" lon="2.0"/></trkseg></trk>
  <wpt lat="1.0" lon="1.0"><ele>5</ele></wpt>"#,
        );
        let route = parse_route(&xml).unwrap();
        assert_eq!(route.point_count(), 2);
        assert_eq!(route.point_at(0).unwrap().latitude, 1.0);
        assert_eq!(route.point_at(0).unwrap().elevation, 5.0);
        assert_eq!(route.point_at(1).unwrap().latitude, 2.0);
    }

    #[test]
    fn test_empty_gpx() {
        let data = parse_gpx(&gpx11("")).unwrap();
        assert!(data.is_empty());

        let xml = r#"<gpx xmlns="http://www.topografix.com/GPX/1/1"/>"#;
        assert!(parse_gpx(xml).unwrap().is_empty());
    }

    #[test]
    fn test_extensions_skipped() {
        let xml = gpx11(
            r#"
  <trk>
    <trkseg>
      <trkpt lat="35.0" lon="139.0">
        <extensions>
          <gpxtpx:TrackPointExtension xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
            <gpxtpx:hr>150</gpxtpx:hr>
          </gpxtpx:TrackPointExtension>
        </extensions>
      </trkpt>
    </trkseg>
  </trk>"#,
        );
        let data = parse_gpx(&xml).unwrap();
        assert_eq!(data.tracks[0].segments[0].points.len(), 1);
    }

    #[test]
    fn test_missing_namespace_rejected() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <wpt lat="35.0" lon="139.0"><name>Test</name></wpt>
</gpx>"#;
        assert!(matches!(parse_gpx(xml), Err(FormatError::MissingNamespace)));
    }

    #[test]
    fn test_unknown_namespace_rejected() {
        let xml = r#"<gpx xmlns="http://example.com/not-gpx"><wpt lat="1" lon="1"/></gpx>"#;
        match parse_gpx(xml) {
            Err(FormatError::UnrecognizedNamespace(ns)) => {
                assert_eq!(ns, "http://example.com/not-gpx")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_prefixed_root() {
        let xml = r#"<g:gpx xmlns:g="http://www.topografix.com/GPX/1/1">
  <g:wpt lat="1.0" lon="2.0"/>
</g:gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(data.waypoints.len(), 1);
    }

    #[test]
    fn test_wrong_root_rejected() {
        let xml = r#"<kml xmlns="http://www.opengis.net/kml/2.2"></kml>"#;
        assert!(matches!(
            parse_gpx(xml),
            Err(FormatError::UnexpectedRoot(name)) if name == "kml"
        ));
        assert!(matches!(parse_gpx(""), Err(FormatError::MissingRoot)));
        assert!(matches!(
            parse_gpx("<?xml version=\"1.0\"?>"),
            Err(FormatError::MissingRoot)
        ));
    }

    #[test]
    fn test_malformed_xml_rejected() {
        let mismatched = gpx11(r#"<trk><trkseg><trkpt lat="1" lon="1"></trkseg></trk>"#);
        assert!(parse_gpx(&mismatched).is_err());

        let truncated = r#"<gpx xmlns="http://www.topografix.com/GPX/1/1"><trk><trkseg><trkpt lat="1" lon="1"/>"#;
        assert!(parse_gpx(truncated).is_err());
    }

    #[test]
    fn test_missing_lat_lon_rejected() {
        let xml = gpx11(
            r#"
  <wpt lat="35.0" lon="139.0"><name>Good</name></wpt>
  <wpt><name>Bad - no coords</name></wpt>"#,
        );
        assert!(matches!(
            parse_gpx(&xml),
            Err(FormatError::MissingAttribute {
                element: "wpt",
                attribute: "lat"
            })
        ));

        let xml = gpx11(r#"<trk><trkseg><trkpt lat="1.0"/></trkseg></trk>"#);
        assert!(matches!(
            parse_gpx(&xml),
            Err(FormatError::MissingAttribute {
                element: "trkpt",
                attribute: "lon"
            })
        ));
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let xml = gpx11(r#"<wpt lat="abc" lon="139.0"/>"#);
        match parse_gpx(&xml) {
            Err(FormatError::InvalidAttribute {
                element,
                attribute,
                value,
            }) => {
                assert_eq!(element, "wpt");
                assert_eq!(attribute, "lat");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let xml = gpx11(r#"<wpt lat="10.0" lon="181.0"/>"#);
        assert!(matches!(
            parse_gpx(&xml),
            Err(FormatError::InvalidAttribute { attribute: "lon", .. })
        ));
    }

    #[test]
    fn test_invalid_elevation_rejected() {
        let xml = gpx11(r#"<wpt lat="10.0" lon="10.0"><ele>high</ele></wpt>"#);
        assert!(matches!(
            parse_gpx(&xml),
            Err(FormatError::InvalidElement { element: "ele", .. })
        ));
    }

    #[test]
    fn test_cdata() {
        let xml = gpx11(
            r#"
  <wpt lat="35.0" lon="139.0">
    <name><![CDATA[Test & Name]]></name>
  </wpt>"#,
        );
        let data = parse_gpx(&xml).unwrap();
        assert_eq!(data.waypoints[0].name.as_deref(), Some("Test & Name"));
    }

    #[test]
    fn test_xml_entities() {
        let xml = gpx11(
            r#"
  <wpt lat="35.0" lon="139.0">
    <name>Caf&#233; &amp; Bar &lt;Tokyo&gt;</name>
  </wpt>"#,
        );
        let data = parse_gpx(&xml).unwrap();
        assert_eq!(data.waypoints[0].name.as_deref(), Some("Café & Bar <Tokyo>"));
    }

    #[test]
    fn test_link_element() {
        let xml = gpx11(
            r#"
  <wpt lat="35.0" lon="139.0">
    <link href="https://example.com">
      <text>Example</text>
      <type>text/html</type>
    </link>
  </wpt>"#,
        );
        let data = parse_gpx(&xml).unwrap();
        let link = data.waypoints[0].link.as_ref().unwrap();
        assert_eq!(link.href, "https://example.com");
        assert_eq!(link.text.as_deref(), Some("Example"));
    }

    #[test]
    fn test_metadata() {
        let xml = gpx11(
            r#"
  <metadata>
    <name>Commute</name>
    <desc>Home to office</desc>
    <author><name>Rider</name><email id="r" domain="example.com"/></author>
    <link href="https://example.com/commute"><text>Details</text></link>
    <time>2024-05-01T08:00:00Z</time>
    <bounds minlat="1" minlon="1" maxlat="2" maxlon="2"/>
  </metadata>"#,
        );
        let data = parse_gpx(&xml).unwrap();
        assert_eq!(data.metadata.name.as_deref(), Some("Commute"));
        assert_eq!(data.metadata.desc.as_deref(), Some("Home to office"));
        assert_eq!(data.metadata.author.as_deref(), Some("Rider"));
        assert_eq!(data.metadata.time.as_deref(), Some("2024-05-01T08:00:00Z"));
        assert_eq!(
            data.metadata.link.as_ref().map(|l| l.href.as_str()),
            Some("https://example.com/commute")
        );
    }

    #[test]
    fn test_gpx10_mapped_to_11_shape() {
        let xml = r#"<?xml version="1.0"?>
<gpx xmlns="http://www.topografix.com/GPX/1/0" version="1.0" creator="legacy">
  <name>Old Walk</name>
  <desc>Recorded in 2004</desc>
  <author>Someone</author>
  <email>someone@example.com</email>
  <url>https://example.com/walk</url>
  <urlname>Walk page</urlname>
  <time>2004-06-01T10:00:00Z</time>
  <bounds minlat="35" minlon="139" maxlat="36" maxlon="140"/>
  <wpt lat="35.5" lon="139.5">
    <ele>12</ele>
    <name>Legacy Point</name>
    <url>https://example.com/pt</url>
  </wpt>
  <trk>
    <name>Track</name>
    <urlname>Track page</urlname>
    <trkseg>
      <trkpt lat="35.0" lon="139.0">
        <ele>3.5</ele>
        <speed>5.5</speed>
        <course>180.0</course>
      </trkpt>
      <trkpt lat="35.001" lon="139.001"/>
    </trkseg>
  </trk>
</gpx>"#;
        let data = parse_gpx(xml).unwrap();
        assert_eq!(data.version, GpxVersion::V1_0);
        assert_eq!(data.metadata.name.as_deref(), Some("Old Walk"));
        assert_eq!(data.metadata.desc.as_deref(), Some("Recorded in 2004"));
        assert_eq!(data.metadata.author.as_deref(), Some("Someone"));
        assert_eq!(data.metadata.time.as_deref(), Some("2004-06-01T10:00:00Z"));
        assert_eq!(
            data.metadata.link,
            Some(GpxLink {
                href: "https://example.com/walk".to_string(),
                text: Some("Walk page".to_string()),
            })
        );

        let wpt = &data.waypoints[0];
        assert_eq!(wpt.name.as_deref(), Some("Legacy Point"));
        assert_eq!(wpt.link.as_ref().unwrap().href, "https://example.com/pt");
        assert_eq!(
            data.tracks[0].link.as_ref().unwrap().text.as_deref(),
            Some("Track page")
        );

        let route = data.walking_route();
        assert_eq!(route.point_count(), 3);
        assert_eq!(route.point_at(1).unwrap().elevation, 3.5);
        assert_eq!(route.point_at(2).unwrap().elevation, 0.0);
    }

    #[test]
    fn test_gpx11_ignores_legacy_url_elements() {
        let xml = gpx11(r#"<wpt lat="1" lon="1"><url>https://example.com</url></wpt>"#);
        let data = parse_gpx(&xml).unwrap();
        assert_eq!(data.waypoints[0].link, None);
    }

    #[test]
    fn test_read_missing_file() {
        assert!(matches!(
            read_file("does/not/exist.gpx"),
            Err(FormatError::Io(_))
        ));
    }
}
