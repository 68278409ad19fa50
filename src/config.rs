//! Configuration structs with documented defaults.
//!
//! The defaults mirror the conventional map-widget setup: a web-mercator
//! map with WGS84 field text, magenta vector styling, and 20 px clustering.
//! All options are explicit struct fields; callers override by mutating a
//! `Default` value rather than merging option bags.

use serde::{Deserialize, Serialize};

use crate::compose::CompositeKind;
use crate::crs::SpatialReference;
use crate::geometry::GeometryKind;

/// A drawable single-part geometry kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawKind {
    Point,
    LineString,
    Polygon,
}

impl DrawKind {
    /// The geometry kind a drawn feature of this kind has.
    pub fn kind(&self) -> GeometryKind {
        match self {
            DrawKind::Point => GeometryKind::Point,
            DrawKind::LineString => GeometryKind::LineString,
            DrawKind::Polygon => GeometryKind::Polygon,
        }
    }

    /// The multi-geometry kind this draw kind composes into.
    pub fn composite(&self) -> CompositeKind {
        match self {
            DrawKind::Point => CompositeKind::Point,
            DrawKind::LineString => CompositeKind::LineString,
            DrawKind::Polygon => CompositeKind::Polygon,
        }
    }
}

/// What an editing surface lets the user draw: one fixed kind, or a set of
/// kinds (in which case collections serialize heterogeneously).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeometryChoice {
    Single(DrawKind),
    Any(Vec<DrawKind>),
}

/// Vector overlay styling, resolved (no optional fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub fill_color: String,
    pub stroke_color: String,
    pub point_radius: f64,
    pub fill_opacity: f64,
    pub stroke_width: f64,
}

impl Default for OverlayStyle {
    /// Magenta overlay: fill/stroke `#ff00ff`, radius 6, opacity 0.5, width 2.
    fn default() -> Self {
        Self {
            fill_color: "#ff00ff".to_string(),
            stroke_color: "#ff00ff".to_string(),
            point_radius: 6.0,
            fill_opacity: 0.5,
            stroke_width: 2.0,
        }
    }
}

impl OverlayStyle {
    /// Default styling for selected features (`#9999ff`).
    pub fn select_default() -> Self {
        Self {
            fill_color: "#9999ff".to_string(),
            stroke_color: "#9999ff".to_string(),
            ..Self::default()
        }
    }
}

/// A partial style; set fields replace the base value, unset fields keep it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

impl StyleOverride {
    /// Resolve the override against a base style, field-wise.
    pub fn over(&self, base: &OverlayStyle) -> OverlayStyle {
        OverlayStyle {
            fill_color: self
                .fill_color
                .clone()
                .unwrap_or_else(|| base.fill_color.clone()),
            stroke_color: self
                .stroke_color
                .clone()
                .unwrap_or_else(|| base.stroke_color.clone()),
            point_radius: self.point_radius.unwrap_or(base.point_radius),
            fill_opacity: self.fill_opacity.unwrap_or(base.fill_opacity),
            stroke_width: self.stroke_width.unwrap_or(base.stroke_width),
        }
    }
}

/// How a multi-item cluster popup lays out its content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterDisplay {
    /// One popup page per member
    #[default]
    Paged,
    /// A single page with the members as a list
    List,
}

/// Per-map configuration shared by editing and display sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Storage projection the map works in (default `EPSG:900913`)
    pub projection: SpatialReference,
    /// Projection of the text field and display coordinates (default `EPSG:4326`)
    pub display_projection: SpatialReference,
    /// Base vector style
    pub overlay_style: OverlayStyle,
    /// Style applied to selected features
    pub select_overlay_style: OverlayStyle,
    /// Whether display sessions cluster their features (default off)
    pub cluster: bool,
    /// Cluster popup layout (default [`ClusterDisplay::Paged`])
    pub cluster_display: ClusterDisplay,
    /// Screen-space clustering distance in pixels (default 20)
    pub cluster_distance: f64,
    /// Separator in popup page labels, as in `"1 of 3"` (default `" of "`)
    pub popup_separator: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            projection: SpatialReference::legacy_web_mercator(),
            display_projection: SpatialReference::wgs84(),
            overlay_style: OverlayStyle::default(),
            select_overlay_style: OverlayStyle::select_default(),
            cluster: false,
            cluster_display: ClusterDisplay::default(),
            cluster_distance: 20.0,
            popup_separator: " of ".to_string(),
        }
    }
}

/// Per-surface editing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditConfig {
    /// What the user may draw (default a single point)
    pub geometry: GeometryChoice,
    /// Whether the surface holds multiple geometries (default false)
    pub is_collection: bool,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryChoice::Single(DrawKind::Point),
            is_collection: false,
        }
    }
}

impl EditConfig {
    /// Derive the editing configuration for a stored column kind.
    ///
    /// Multi-part kinds edit as collections of their single-part kind;
    /// heterogeneous collections allow every draw kind.
    pub fn for_stored_kind(kind: GeometryKind) -> Self {
        let geometry = match kind {
            GeometryKind::GeometryCollection => GeometryChoice::Any(vec![
                DrawKind::Polygon,
                DrawKind::Point,
                DrawKind::LineString,
            ]),
            GeometryKind::Point | GeometryKind::MultiPoint => {
                GeometryChoice::Single(DrawKind::Point)
            }
            GeometryKind::Polygon | GeometryKind::MultiPolygon => {
                GeometryChoice::Single(DrawKind::Polygon)
            }
            GeometryKind::LineString | GeometryKind::MultiLineString => {
                GeometryChoice::Single(DrawKind::LineString)
            }
        };
        Self {
            geometry,
            is_collection: kind.is_multi(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_projections() {
        let config = MapConfig::default();
        assert_eq!(config.projection.code(), "EPSG:900913");
        assert_eq!(config.display_projection.code(), "EPSG:4326");
        assert_eq!(config.popup_separator, " of ");
        assert_eq!(config.cluster_distance, 20.0);
        assert!(!config.cluster);
    }

    #[test]
    fn test_style_override_partial() {
        let over = StyleOverride {
            stroke_width: Some(4.0),
            ..StyleOverride::default()
        };
        let resolved = over.over(&OverlayStyle::default());
        assert_eq!(resolved.stroke_width, 4.0);
        assert_eq!(resolved.fill_color, "#ff00ff");
    }

    #[test]
    fn test_edit_config_for_stored_kind() {
        let multi = EditConfig::for_stored_kind(GeometryKind::MultiPolygon);
        assert!(multi.is_collection);
        assert_eq!(multi.geometry, GeometryChoice::Single(DrawKind::Polygon));

        let single = EditConfig::for_stored_kind(GeometryKind::Point);
        assert!(!single.is_collection);
        assert_eq!(single.geometry, GeometryChoice::Single(DrawKind::Point));

        let collection = EditConfig::for_stored_kind(GeometryKind::GeometryCollection);
        assert!(collection.is_collection);
        assert!(matches!(collection.geometry, GeometryChoice::Any(ref kinds) if kinds.len() == 3));
    }

    #[test]
    fn test_draw_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&DrawKind::LineString).unwrap(),
            "\"linestring\""
        );
        let choice: GeometryChoice = serde_json::from_str("[\"point\", \"polygon\"]").unwrap();
        assert!(matches!(choice, GeometryChoice::Any(ref kinds) if kinds.len() == 2));
    }
}
