//! EWKT/WKT geometry codec.
//!
//! Decoding accepts an optional leading `SRID=<code>;` prefix
//! (case-insensitive, anchored at the start of the text); the remainder is
//! parsed as WKT. Encoding always emits the prefix. The writer produces the
//! compact form (`POINT(10 20)`, no space before the parenthesis) with
//! coordinates capped at [`COORD_DECIMALS`] decimal places so reprojection
//! round-trips re-emit the text they started from.

use crate::crs::{SpatialReference, TaggedGeometry};
use crate::error::{GeoFieldError, GeoFieldResult};
use crate::geometry::{
    Geometry, GeometryCollection, LineString, LinearRing, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};

/// Maximum decimal places written per coordinate.
pub const COORD_DECIMALS: usize = 12;

/// Parse EWKT (or bare WKT) into a tagged geometry.
///
/// Text without an `SRID=` prefix is assumed to already be in
/// `default_reference`.
pub fn decode(text: &str, default_reference: &SpatialReference) -> GeoFieldResult<TaggedGeometry> {
    let text = text.trim();
    let (srid, body) = strip_srid(text);
    let reference = match srid {
        Some(srid) => SpatialReference::epsg(srid),
        None => default_reference.clone(),
    };
    let geometry = parse_wkt(body)?;
    Ok(TaggedGeometry::new(geometry, reference))
}

/// Serialize a geometry as EWKT in the given reference.
pub fn encode(geometry: &Geometry, reference: &SpatialReference) -> GeoFieldResult<String> {
    let srid = reference.srid()?;
    Ok(format!("SRID={};{}", srid, write_wkt(geometry)))
}

/// Split a leading `SRID=<digits>;` prefix off the text, if present.
fn strip_srid(text: &str) -> (Option<i32>, &str) {
    if text.len() < 5 || !text.as_bytes()[..5].eq_ignore_ascii_case(b"SRID=") {
        return (None, text);
    }
    let rest = &text[5..];
    if let Some(semi) = rest.find(';') {
        if let Ok(srid) = rest[..semi].parse::<i32>() {
            return (Some(srid), &rest[semi + 1..]);
        }
    }
    (None, text)
}

/// Parse a WKT body into a geometry.
pub fn parse_wkt(wkt: &str) -> GeoFieldResult<Geometry> {
    let s = wkt.trim();
    let tag_end = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    let tag = s[..tag_end].to_ascii_uppercase();
    if tag.is_empty() {
        return Err(GeoFieldError::malformed("missing geometry tag"));
    }
    let body = paren_body(&s[tag_end..])?;

    match tag.as_str() {
        "POINT" => Ok(Geometry::Point(parse_coord_pair(body)?)),
        "LINESTRING" => Ok(Geometry::LineString(parse_linestring(body)?)),
        "POLYGON" => Ok(Geometry::Polygon(parse_polygon(body)?)),
        "MULTIPOINT" => {
            let points = split_top_level(body)?
                .into_iter()
                .map(|component| {
                    // both MULTIPOINT((1 2),(3 4)) and MULTIPOINT(1 2,3 4)
                    let component = component.trim();
                    if component.starts_with('(') {
                        parse_coord_pair(paren_body(component)?)
                    } else {
                        parse_coord_pair(component)
                    }
                })
                .collect::<GeoFieldResult<Vec<_>>>()?;
            Ok(Geometry::MultiPoint(MultiPoint { points }))
        }
        "MULTILINESTRING" => {
            let linestrings = split_top_level(body)?
                .into_iter()
                .map(|component| parse_linestring(paren_body(component)?))
                .collect::<GeoFieldResult<Vec<_>>>()?;
            Ok(Geometry::MultiLineString(MultiLineString { linestrings }))
        }
        "MULTIPOLYGON" => {
            let polygons = split_top_level(body)?
                .into_iter()
                .map(|component| parse_polygon(paren_body(component)?))
                .collect::<GeoFieldResult<Vec<_>>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon { polygons }))
        }
        "GEOMETRYCOLLECTION" => {
            let geometries = split_top_level(body)?
                .into_iter()
                .map(parse_wkt)
                .collect::<GeoFieldResult<Vec<_>>>()?;
            Ok(Geometry::GeometryCollection(GeometryCollection {
                geometries,
            }))
        }
        other => Err(GeoFieldError::unknown_kind(other)),
    }
}

/// Write a geometry as WKT.
pub fn write_wkt(geometry: &Geometry) -> String {
    match geometry {
        Geometry::Point(p) => format!("POINT({})", write_coord(p)),
        Geometry::LineString(l) => format!("LINESTRING({})", write_coords(&l.points)),
        Geometry::Polygon(p) => format!("POLYGON({})", write_rings(p)),
        Geometry::MultiPoint(mp) => {
            let parts: Vec<String> = mp
                .points
                .iter()
                .map(|p| format!("({})", write_coord(p)))
                .collect();
            format!("MULTIPOINT({})", parts.join(","))
        }
        Geometry::MultiLineString(ml) => {
            let parts: Vec<String> = ml
                .linestrings
                .iter()
                .map(|l| format!("({})", write_coords(&l.points)))
                .collect();
            format!("MULTILINESTRING({})", parts.join(","))
        }
        Geometry::MultiPolygon(mp) => {
            let parts: Vec<String> = mp
                .polygons
                .iter()
                .map(|p| format!("({})", write_rings(p)))
                .collect();
            format!("MULTIPOLYGON({})", parts.join(","))
        }
        Geometry::GeometryCollection(gc) => {
            let parts: Vec<String> = gc.geometries.iter().map(write_wkt).collect();
            format!("GEOMETRYCOLLECTION({})", parts.join(","))
        }
    }
}

/// The contents of a parenthesized body, outermost parens removed.
fn paren_body(s: &str) -> GeoFieldResult<&str> {
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Ok(inner)
    } else {
        Err(GeoFieldError::malformed(format!(
            "expected parenthesized body, got '{}'",
            s
        )))
    }
}

/// Split a body at commas that sit outside any nested parentheses.
fn split_top_level(s: &str) -> GeoFieldResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(GeoFieldError::malformed("unbalanced parentheses"));
                }
            }
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(GeoFieldError::malformed("unbalanced parentheses"));
    }
    parts.push(s[start..].trim());
    Ok(parts)
}

fn parse_coord_pair(s: &str) -> GeoFieldResult<Point> {
    let coords: Vec<&str> = s.split_whitespace().collect();
    if coords.len() != 2 {
        return Err(GeoFieldError::malformed(format!(
            "expected an 'x y' coordinate pair, got '{}'",
            s
        )));
    }
    let x: f64 = coords[0]
        .parse()
        .map_err(|_| GeoFieldError::malformed(format!("invalid X coordinate '{}'", coords[0])))?;
    let y: f64 = coords[1]
        .parse()
        .map_err(|_| GeoFieldError::malformed(format!("invalid Y coordinate '{}'", coords[1])))?;
    Ok(Point::new(x, y))
}

fn parse_point_list(s: &str) -> GeoFieldResult<Vec<Point>> {
    split_top_level(s)?
        .into_iter()
        .map(parse_coord_pair)
        .collect()
}

fn parse_linestring(body: &str) -> GeoFieldResult<LineString> {
    LineString::new(parse_point_list(body)?)
}

fn parse_polygon(body: &str) -> GeoFieldResult<Polygon> {
    let mut rings = split_top_level(body)?
        .into_iter()
        .map(|ring| LinearRing::new(parse_point_list(paren_body(ring)?)?))
        .collect::<GeoFieldResult<Vec<_>>>()?
        .into_iter();
    let exterior = rings
        .next()
        .ok_or_else(|| GeoFieldError::malformed("POLYGON must have at least one ring"))?;
    Polygon::new(exterior, rings.collect())
}

fn write_rings(polygon: &Polygon) -> String {
    let mut parts = vec![format!("({})", write_coords(&polygon.exterior_ring.points))];
    for ring in &polygon.interior_rings {
        parts.push(format!("({})", write_coords(&ring.points)));
    }
    parts.join(",")
}

fn write_coords(points: &[Point]) -> String {
    points
        .iter()
        .map(write_coord)
        .collect::<Vec<_>>()
        .join(",")
}

fn write_coord(point: &Point) -> String {
    format!("{} {}", fmt_coord(point.x), fmt_coord(point.y))
}

/// Format a coordinate with at most [`COORD_DECIMALS`] decimals, trailing
/// zeros trimmed.
fn fmt_coord(value: f64) -> String {
    let mut s = format!("{:.*}", COORD_DECIMALS, value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
