//! Coordinate Reference System (CRS) support.
//!
//! A [`SpatialReference`] names a coordinate system by its code (typically
//! `EPSG:<srid>`); geometries are bound to one through [`TaggedGeometry`].
//! Reprojection is split in two: the pure orchestration functions
//! [`transform_geometry`] and [`transform_features`], which walk geometry
//! structure without touching the math, and the [`CoordinateTransform`]
//! trait, the seam for the actual coordinate mapping. A default
//! [`CoordinateTransformer`] covers the WGS84 / web-mercator pairs the map
//! stack uses.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::error::{GeoFieldError, GeoFieldResult};
use crate::feature::Feature;
use crate::geometry::{
    Geometry, GeometryCollection, LineString, LinearRing, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};

/// World Geodetic System 1984
pub const WGS84_SRID: i32 = 4326;
/// Web Mercator (Google Maps, OpenStreetMap)
pub const WEB_MERCATOR_SRID: i32 = 3857;
/// Legacy alias for Web Mercator, still used by older map stacks
pub const LEGACY_WEB_MERCATOR_SRID: i32 = 900913;

const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// An identifier naming a coordinate reference system.
///
/// Two references are equal iff their codes match textually. The SRID is
/// the numeric suffix of the code: the segment after the final `:`, or the
/// whole code when it is bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialReference {
    code: String,
}

impl SpatialReference {
    /// Create a reference from its textual code, e.g. `"EPSG:4326"`.
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self { code: code.into() }
    }

    /// Create an `EPSG:<srid>` reference.
    pub fn epsg(srid: i32) -> Self {
        Self::new(format!("EPSG:{}", srid))
    }

    /// WGS84 (GPS latitude/longitude)
    pub fn wgs84() -> Self {
        Self::epsg(WGS84_SRID)
    }

    /// Web Mercator
    pub fn web_mercator() -> Self {
        Self::epsg(WEB_MERCATOR_SRID)
    }

    /// Legacy Web Mercator alias
    pub fn legacy_web_mercator() -> Self {
        Self::epsg(LEGACY_WEB_MERCATOR_SRID)
    }

    /// The full textual code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Reduce the code to its numeric SRID suffix.
    pub fn srid(&self) -> GeoFieldResult<i32> {
        let suffix = match self.code.rsplit(':').next() {
            Some(s) => s,
            None => self.code.as_str(),
        };
        suffix.parse::<i32>().map_err(|_| {
            GeoFieldError::invalid_reference(format!(
                "cannot derive an SRID from code '{}'",
                self.code
            ))
        })
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// A geometry together with the spatial reference it is expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedGeometry {
    pub geometry: Geometry,
    pub reference: SpatialReference,
}

impl TaggedGeometry {
    pub fn new(geometry: Geometry, reference: SpatialReference) -> Self {
        Self {
            geometry,
            reference,
        }
    }
}

/// Coordinate mapping between two spatial references.
///
/// Implementations carry the projection math; the geometry walking lives in
/// [`transform_geometry`] / [`transform_features`].
pub trait CoordinateTransform {
    /// Map a single coordinate pair from one reference to another.
    fn transform_point(
        &self,
        point: &Point,
        from: &SpatialReference,
        to: &SpatialReference,
    ) -> GeoFieldResult<Point>;
}

/// Transform a geometry between two spatial references.
///
/// When `from` and `to` carry the same code the input is returned unchanged
/// (as a clone; callers must not assume aliasing either way). Otherwise
/// every coordinate pair is remapped through `mapper`, preserving the
/// geometry's structure and component order.
pub fn transform_geometry(
    geometry: &Geometry,
    from: &SpatialReference,
    to: &SpatialReference,
    mapper: &dyn CoordinateTransform,
) -> GeoFieldResult<Geometry> {
    if from.code() == to.code() {
        return Ok(geometry.clone());
    }
    map_geometry(geometry, &|p| mapper.transform_point(p, from, to))
}

/// Transform an ordered sequence of features element-wise.
///
/// Order and count are preserved; attributes and styles are carried across
/// untouched.
pub fn transform_features(
    features: &[Feature],
    from: &SpatialReference,
    to: &SpatialReference,
    mapper: &dyn CoordinateTransform,
) -> GeoFieldResult<Vec<Feature>> {
    features
        .iter()
        .map(|feature| {
            let geometry = transform_geometry(&feature.geometry, from, to, mapper)?;
            let mut transformed = feature.clone();
            transformed.geometry = geometry;
            Ok(transformed)
        })
        .collect()
}

fn map_geometry(
    geometry: &Geometry,
    f: &dyn Fn(&Point) -> GeoFieldResult<Point>,
) -> GeoFieldResult<Geometry> {
    let mapped = match geometry {
        Geometry::Point(p) => Geometry::Point(f(p)?),
        Geometry::LineString(l) => Geometry::LineString(map_linestring(l, f)?),
        Geometry::Polygon(p) => Geometry::Polygon(map_polygon(p, f)?),
        Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint {
            points: mp.points.iter().map(f).collect::<GeoFieldResult<_>>()?,
        }),
        Geometry::MultiLineString(ml) => Geometry::MultiLineString(MultiLineString {
            linestrings: ml
                .linestrings
                .iter()
                .map(|l| map_linestring(l, f))
                .collect::<GeoFieldResult<_>>()?,
        }),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon {
            polygons: mp
                .polygons
                .iter()
                .map(|p| map_polygon(p, f))
                .collect::<GeoFieldResult<_>>()?,
        }),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection {
            geometries: gc
                .geometries
                .iter()
                .map(|g| map_geometry(g, f))
                .collect::<GeoFieldResult<_>>()?,
        }),
    };
    Ok(mapped)
}

fn map_linestring(
    linestring: &LineString,
    f: &dyn Fn(&Point) -> GeoFieldResult<Point>,
) -> GeoFieldResult<LineString> {
    Ok(LineString {
        points: linestring
            .points
            .iter()
            .map(f)
            .collect::<GeoFieldResult<_>>()?,
    })
}

fn map_polygon(
    polygon: &Polygon,
    f: &dyn Fn(&Point) -> GeoFieldResult<Point>,
) -> GeoFieldResult<Polygon> {
    let map_ring = |ring: &LinearRing| -> GeoFieldResult<LinearRing> {
        Ok(LinearRing {
            points: ring.points.iter().map(f).collect::<GeoFieldResult<_>>()?,
        })
    };
    Ok(Polygon {
        exterior_ring: map_ring(&polygon.exterior_ring)?,
        interior_rings: polygon
            .interior_rings
            .iter()
            .map(map_ring)
            .collect::<GeoFieldResult<_>>()?,
    })
}

/// Default coordinate transformer for the map-stack projections.
///
/// Keys on SRID suffixes, so `EPSG:4326` and a bare `4326` interoperate.
/// Supports the WGS84 / spherical-mercator pairs; any other combination is
/// a [`GeoFieldError::Crs`] error.
#[derive(Debug, Clone, Default)]
pub struct CoordinateTransformer;

impl CoordinateTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Transform WGS84 coordinates to Web Mercator.
    fn wgs84_to_web_mercator(&self, point: &Point) -> Point {
        let lon_rad = point.x.to_radians();
        let lat_rad = point.y.to_radians();

        let x = EARTH_RADIUS_METERS * lon_rad;
        let y = EARTH_RADIUS_METERS * ((PI / 4.0) + (lat_rad / 2.0)).tan().ln();

        Point::new(x, y)
    }

    /// Transform Web Mercator coordinates to WGS84.
    fn web_mercator_to_wgs84(&self, point: &Point) -> Point {
        let x = point.x / EARTH_RADIUS_METERS;
        let y = point.y / EARTH_RADIUS_METERS;

        let lon = x.to_degrees();
        let lat = (2.0 * y.exp().atan() - PI / 2.0).to_degrees();

        Point::new(lon, lat)
    }
}

// 900913 is the same projection as 3857 under an older name.
fn canonical_srid(srid: i32) -> i32 {
    if srid == LEGACY_WEB_MERCATOR_SRID {
        WEB_MERCATOR_SRID
    } else {
        srid
    }
}

impl CoordinateTransform for CoordinateTransformer {
    fn transform_point(
        &self,
        point: &Point,
        from: &SpatialReference,
        to: &SpatialReference,
    ) -> GeoFieldResult<Point> {
        let from_srid = canonical_srid(from.srid()?);
        let to_srid = canonical_srid(to.srid()?);

        if from_srid == to_srid {
            return Ok(*point);
        }
        match (from_srid, to_srid) {
            (WGS84_SRID, WEB_MERCATOR_SRID) => Ok(self.wgs84_to_web_mercator(point)),
            (WEB_MERCATOR_SRID, WGS84_SRID) => Ok(self.web_mercator_to_wgs84(point)),
            _ => Err(GeoFieldError::crs(format!(
                "Transformation from SRID {} to {} not implemented",
                from_srid, to_srid
            ))),
        }
    }
}
