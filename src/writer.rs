use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::FormatError;
use crate::gpx_types::*;
use crate::route::Route;

type Result<T> = std::result::Result<T, FormatError>;

pub const CREATOR: &str = "route-walker";

/// Serialize a document as GPX 1.1.
///
/// Coordinates and elevation use the shortest decimal text that reads back to
/// the same `f64`.
pub fn write_gpx(doc: &GpxDocument) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("gpx");
    root.push_attribute(("xmlns", GPX11_NAMESPACE));
    root.push_attribute(("version", "1.1"));
    root.push_attribute(("creator", CREATOR));
    writer.write_event(Event::Start(root))?;

    if !doc.metadata.is_empty() {
        write_metadata(&mut writer, &doc.metadata)?;
    }

    for wpt in &doc.waypoints {
        write_point(&mut writer, "wpt", wpt)?;
    }

    for rte in &doc.routes {
        writer.write_event(Event::Start(BytesStart::new("rte")))?;
        write_optional(&mut writer, "name", &rte.name)?;
        write_optional(&mut writer, "desc", &rte.desc)?;
        if let Some(link) = &rte.link {
            write_link(&mut writer, link)?;
        }
        for pt in &rte.points {
            write_point(&mut writer, "rtept", pt)?;
        }
        writer.write_event(Event::End(BytesEnd::new("rte")))?;
    }

    for trk in &doc.tracks {
        writer.write_event(Event::Start(BytesStart::new("trk")))?;
        write_optional(&mut writer, "name", &trk.name)?;
        write_optional(&mut writer, "desc", &trk.desc)?;
        if let Some(link) = &trk.link {
            write_link(&mut writer, link)?;
        }
        write_optional(&mut writer, "type", &trk.track_type)?;
        for seg in &trk.segments {
            writer.write_event(Event::Start(BytesStart::new("trkseg")))?;
            for pt in &seg.points {
                write_point(&mut writer, "trkpt", pt)?;
            }
            writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("trk")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Encode `route` as a GPX 1.1 document with one named track and one segment.
pub fn encode_route(route: &Route, track_name: &str) -> Result<String> {
    write_gpx(&GpxDocument::from_route(route, track_name))
}

pub fn write_file(path: impl AsRef<Path>, doc: &GpxDocument) -> Result<()> {
    let xml = write_gpx(doc)?;
    std::fs::write(path, xml)?;
    Ok(())
}

fn write_metadata<W: Write>(writer: &mut Writer<W>, metadata: &GpxMetadata) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("metadata")))?;
    write_optional(writer, "name", &metadata.name)?;
    write_optional(writer, "desc", &metadata.desc)?;
    if let Some(author) = &metadata.author {
        writer.write_event(Event::Start(BytesStart::new("author")))?;
        write_text_element(writer, "name", author)?;
        writer.write_event(Event::End(BytesEnd::new("author")))?;
    }
    if let Some(link) = &metadata.link {
        write_link(writer, link)?;
    }
    write_optional(writer, "time", &metadata.time)?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;
    Ok(())
}

/// Children follow the order of the 1.1 `wptType` sequence.
fn write_point<W: Write>(writer: &mut Writer<W>, element: &str, pt: &GpxPoint) -> Result<()> {
    let mut start = BytesStart::new(element);
    start.push_attribute(("lat", pt.lat.to_string().as_str()));
    start.push_attribute(("lon", pt.lon.to_string().as_str()));
    writer.write_event(Event::Start(start))?;

    if let Some(ele) = pt.ele {
        write_text_element(writer, "ele", &ele.to_string())?;
    }
    write_optional(writer, "time", &pt.time)?;
    write_optional(writer, "name", &pt.name)?;
    write_optional(writer, "desc", &pt.desc)?;
    if let Some(link) = &pt.link {
        write_link(writer, link)?;
    }
    write_optional(writer, "sym", &pt.sym)?;

    writer.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

fn write_link<W: Write>(writer: &mut Writer<W>, link: &GpxLink) -> Result<()> {
    let mut start = BytesStart::new("link");
    start.push_attribute(("href", link.href.as_str()));
    writer.write_event(Event::Start(start))?;
    write_optional(writer, "text", &link.text)?;
    writer.write_event(Event::End(BytesEnd::new("link")))?;
    Ok(())
}

fn write_optional<W: Write>(
    writer: &mut Writer<W>,
    element: &str,
    value: &Option<String>,
) -> Result<()> {
    match value {
        Some(text) => write_text_element(writer, element, text),
        None => Ok(()),
    }
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, element: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(element)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}
