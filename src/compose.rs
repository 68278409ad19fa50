//! Splitting multi-part geometries into editable single-part features and
//! recombining them for serialization.
//!
//! Component order is preserved in both directions; nothing is sorted or
//! deduplicated.

use serde::{Deserialize, Serialize};

use crate::error::{GeoFieldError, GeoFieldResult};
use crate::feature::Feature;
use crate::geometry::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};

/// Target kind for [`compose`]: a fixed multi-geometry, or a heterogeneous
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeKind {
    Point,
    LineString,
    Polygon,
    Collection,
}

/// Flatten a geometry into single-part features, one per component.
///
/// Multi-part geometries and collections yield their components in original
/// order; a single-part geometry yields itself. The features carry no
/// attributes.
pub fn decompose(geometry: &Geometry) -> Vec<Feature> {
    let geometries: Vec<Geometry> = match geometry {
        Geometry::MultiPoint(mp) => mp.points.iter().map(|p| Geometry::Point(*p)).collect(),
        Geometry::MultiLineString(ml) => ml
            .linestrings
            .iter()
            .map(|l| Geometry::LineString(l.clone()))
            .collect(),
        Geometry::MultiPolygon(mp) => mp
            .polygons
            .iter()
            .map(|p| Geometry::Polygon(p.clone()))
            .collect(),
        Geometry::GeometryCollection(gc) => gc.geometries.clone(),
        single => vec![single.clone()],
    };
    geometries.into_iter().map(Feature::new).collect()
}

/// Recombine an ordered sequence of single-part features into one geometry.
///
/// A fixed `kind` produces the matching Multi* geometry and fails with
/// [`GeoFieldError::KindMismatch`] when any component is of a different
/// kind; [`CompositeKind::Collection`] accepts anything.
pub fn compose(kind: CompositeKind, features: &[Feature]) -> GeoFieldResult<Geometry> {
    match kind {
        CompositeKind::Point => {
            let points = features
                .iter()
                .map(|f| match &f.geometry {
                    Geometry::Point(p) => Ok(*p),
                    other => Err(mismatch("POINT", other)),
                })
                .collect::<GeoFieldResult<Vec<Point>>>()?;
            Ok(Geometry::MultiPoint(MultiPoint { points }))
        }
        CompositeKind::LineString => {
            let linestrings = features
                .iter()
                .map(|f| match &f.geometry {
                    Geometry::LineString(l) => Ok(l.clone()),
                    other => Err(mismatch("LINESTRING", other)),
                })
                .collect::<GeoFieldResult<Vec<LineString>>>()?;
            Ok(Geometry::MultiLineString(MultiLineString { linestrings }))
        }
        CompositeKind::Polygon => {
            let polygons = features
                .iter()
                .map(|f| match &f.geometry {
                    Geometry::Polygon(p) => Ok(p.clone()),
                    other => Err(mismatch("POLYGON", other)),
                })
                .collect::<GeoFieldResult<Vec<Polygon>>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon { polygons }))
        }
        CompositeKind::Collection => Ok(Geometry::GeometryCollection(GeometryCollection {
            geometries: features.iter().map(|f| f.geometry.clone()).collect(),
        })),
    }
}

fn mismatch(expected: &str, found: &Geometry) -> GeoFieldError {
    GeoFieldError::kind_mismatch(expected, found.kind().name())
}
