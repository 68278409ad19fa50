//! Core geometry types for the editing and display sessions.
//!
//! This module provides the building blocks shared by the codec, the
//! projection transformer, and the session state machines: points, lines,
//! polygons, and their multi-geometry counterparts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GeoFieldError, GeoFieldResult};

/// Universal geometry type covering the seven supported kinds.
///
/// Coordinates are two-dimensional and expressed in the units of whatever
/// spatial reference the surrounding context carries; the geometry itself is
/// reference-agnostic (see [`crate::crs::TaggedGeometry`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point(Point),
    LineString(LineString),
    Polygon(Polygon),
    MultiPoint(MultiPoint),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    GeometryCollection(GeometryCollection),
}

/// The kind tag of a geometry, without its coordinate payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    GeometryCollection,
}

/// A two-dimensional coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (longitude in geographic systems)
    pub x: f64,
    /// Y coordinate (latitude in geographic systems)
    pub y: f64,
}

/// A linear geometry composed of two or more points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    /// Ordered sequence of points forming the line
    pub points: Vec<Point>,
}

/// A polygon geometry with exterior boundary and optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Exterior boundary ring (closed)
    pub exterior_ring: LinearRing,
    /// Interior rings representing holes (each closed)
    pub interior_rings: Vec<LinearRing>,
}

/// A closed linear ring used in polygon construction.
///
/// The first and last points are identical; rings that arrive open are
/// closed on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRing {
    pub points: Vec<Point>,
}

/// A collection of multiple Point geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPoint {
    pub points: Vec<Point>,
}

/// A collection of multiple LineString geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLineString {
    pub linestrings: Vec<LineString>,
}

/// A collection of multiple Polygon geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    pub polygons: Vec<Polygon>,
}

/// A heterogeneous collection of any geometry types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryCollection {
    pub geometries: Vec<Geometry>,
}

/// A bounding box representing the spatial extent of a geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate the planar distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl LineString {
    /// Create a new LineString from a vector of points.
    pub fn new(points: Vec<Point>) -> GeoFieldResult<Self> {
        if points.len() < 2 {
            return Err(GeoFieldError::invalid_geometry(
                "LineString must contain at least 2 points",
            ));
        }
        Ok(Self { points })
    }

    /// Check if the LineString is closed (first and last points are the same).
    pub fn is_closed(&self) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        self.points.first() == self.points.last()
    }
}

impl LinearRing {
    /// Create a new LinearRing from a vector of points, closing it if open.
    pub fn new(mut points: Vec<Point>) -> GeoFieldResult<Self> {
        if points.len() < 4 {
            return Err(GeoFieldError::invalid_geometry(
                "LinearRing must contain at least 4 points",
            ));
        }
        if points.first() != points.last() {
            points.push(points[0]);
        }
        Ok(Self { points })
    }

    /// Check if the ring is valid (closed and has at least 4 points).
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 4 && self.points.first() == self.points.last()
    }
}

impl Polygon {
    /// Create a new Polygon with an exterior ring and optional interior rings.
    pub fn new(exterior_ring: LinearRing, interior_rings: Vec<LinearRing>) -> GeoFieldResult<Self> {
        if !exterior_ring.is_valid() {
            return Err(GeoFieldError::invalid_geometry("Exterior ring is not valid"));
        }
        for ring in &interior_rings {
            if !ring.is_valid() {
                return Err(GeoFieldError::invalid_geometry(
                    "One or more interior rings are not valid",
                ));
            }
        }
        Ok(Self {
            exterior_ring,
            interior_rings,
        })
    }

    /// Create a simple polygon from a vector of points (no holes).
    pub fn from_points(points: Vec<Point>) -> GeoFieldResult<Self> {
        let exterior_ring = LinearRing::new(points)?;
        Self::new(exterior_ring, vec![])
    }
}

impl Geometry {
    /// Get the kind tag of the geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// Check if the geometry has no coordinate data.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) => false, // Points are never empty
            Geometry::LineString(l) => l.points.is_empty(),
            Geometry::Polygon(p) => p.exterior_ring.points.is_empty(),
            Geometry::MultiPoint(mp) => mp.points.is_empty(),
            Geometry::MultiLineString(ml) => ml.linestrings.is_empty(),
            Geometry::MultiPolygon(mp) => mp.polygons.is_empty(),
            Geometry::GeometryCollection(gc) => gc.geometries.is_empty(),
        }
    }

    /// Calculate the bounding box of the geometry, if it has any coordinates.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;
        self.visit_points(&mut |p| {
            bbox.get_or_insert_with(|| BoundingBox::around(p)).extend(p);
        });
        bbox
    }

    /// Representative anchor point of the geometry (bounding box center).
    pub fn anchor_point(&self) -> Option<Point> {
        self.bounding_box().map(|b| b.center())
    }

    /// Invoke `f` on every coordinate of the geometry, in encounter order.
    pub fn visit_points<F: FnMut(&Point)>(&self, f: &mut F) {
        match self {
            Geometry::Point(p) => f(p),
            Geometry::LineString(l) => l.points.iter().for_each(|p| f(p)),
            Geometry::Polygon(p) => {
                p.exterior_ring.points.iter().for_each(|pt| f(pt));
                for ring in &p.interior_rings {
                    ring.points.iter().for_each(|pt| f(pt));
                }
            }
            Geometry::MultiPoint(mp) => mp.points.iter().for_each(|p| f(p)),
            Geometry::MultiLineString(ml) => {
                for l in &ml.linestrings {
                    l.points.iter().for_each(|p| f(p));
                }
            }
            Geometry::MultiPolygon(mp) => {
                for poly in &mp.polygons {
                    poly.exterior_ring.points.iter().for_each(|pt| f(pt));
                    for ring in &poly.interior_rings {
                        ring.points.iter().for_each(|pt| f(pt));
                    }
                }
            }
            Geometry::GeometryCollection(gc) => {
                for g in &gc.geometries {
                    g.visit_points(f);
                }
            }
        }
    }
}

impl GeometryKind {
    /// Get the geometry kind as its WKT tag.
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::LineString => "LINESTRING",
            GeometryKind::Polygon => "POLYGON",
            GeometryKind::MultiPoint => "MULTIPOINT",
            GeometryKind::MultiLineString => "MULTILINESTRING",
            GeometryKind::MultiPolygon => "MULTIPOLYGON",
            GeometryKind::GeometryCollection => "GEOMETRYCOLLECTION",
        }
    }

    /// Whether the kind is a multi-part geometry (including collections).
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            GeometryKind::MultiPoint
                | GeometryKind::MultiLineString
                | GeometryKind::MultiPolygon
                | GeometryKind::GeometryCollection
        )
    }
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create a degenerate box around a single point.
    pub fn around(point: &Point) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    /// Grow the box to include a point.
    pub fn extend(&mut self, point: &Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    /// Grow the box to include another box.
    pub fn extend_box(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Check if this bounding box intersects with another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    /// Calculate the center point of the bounding box.
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind().name())
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
