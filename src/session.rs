//! The editable geometry set: a per-surface session that keeps a text field
//! synchronized with the geometries drawn on the map.
//!
//! The session owns the field text and the ordered feature list. Every
//! mutating transition ends by re-serializing the features into the field,
//! so the field is current after any completed event. Events arrive one at
//! a time from the interaction controller; the `&mut self` receivers make
//! concurrent mutation of one session impossible.

use std::fmt;

use tracing::debug;

use crate::compose::{compose, decompose, CompositeKind};
use crate::config::{EditConfig, GeometryChoice, MapConfig};
use crate::crs::{
    transform_features, transform_geometry, CoordinateTransform, CoordinateTransformer,
};
use crate::error::GeoFieldResult;
use crate::ewkt;
use crate::feature::Feature;

/// Cardinality state of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No features, non-collection mode
    Empty,
    /// Exactly one feature, non-collection mode
    Single,
    /// Collection mode, any number of features
    Collecting,
}

/// One editing surface's session state.
pub struct EditableSession {
    map: MapConfig,
    config: EditConfig,
    transformer: Box<dyn CoordinateTransform>,
    features: Vec<Feature>,
    committed: usize,
    field: String,
}

impl fmt::Debug for EditableSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditableSession")
            .field("config", &self.config)
            .field("features", &self.features.len())
            .field("committed", &self.committed)
            .field("field", &self.field)
            .finish()
    }
}

impl EditableSession {
    /// Create a session with the default coordinate transformer.
    pub fn new(map: MapConfig, config: EditConfig) -> Self {
        Self::with_transformer(map, config, Box::new(CoordinateTransformer::new()))
    }

    /// Create a session with a caller-supplied coordinate transformer.
    pub fn with_transformer(
        map: MapConfig,
        config: EditConfig,
        transformer: Box<dyn CoordinateTransform>,
    ) -> Self {
        Self {
            map,
            config,
            transformer,
            features: Vec::new(),
            committed: 0,
            field: String::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        if self.config.is_collection {
            SessionState::Collecting
        } else if self.features.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Single
        }
    }

    /// The features currently on the editing surface, in layer order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Feature count as of the most recent completed synchronization.
    pub fn committed_count(&self) -> usize {
        self.committed
    }

    /// The current field text (empty, or one EWKT geometry).
    pub fn field_text(&self) -> &str {
        &self.field
    }

    /// Load the session from initial field text.
    ///
    /// Empty or whitespace-only text leaves the session empty with no
    /// error. Otherwise the text is decoded (the display projection is the
    /// default for SRID-less input), reprojected into the map projection,
    /// flattened into single-part features, and written back to the field
    /// so the SRID prefix is present even if the input lacked one.
    pub fn initialize_from_text(&mut self, text: &str) -> GeoFieldResult<()> {
        let text = text.trim();
        if text.is_empty() {
            debug!("empty field text, session starts empty");
            return Ok(());
        }
        let tagged = ewkt::decode(text, &self.map.display_projection)?;
        let storage = transform_geometry(
            &tagged.geometry,
            &tagged.reference,
            &self.map.projection,
            self.transformer.as_ref(),
        )?;
        self.features = decompose(&storage);
        self.committed = self.features.len();
        debug!("initialized session with {} feature(s)", self.committed);
        self.serialize()?;
        Ok(())
    }

    /// Handle a "feature added" event from the interaction controller.
    ///
    /// In non-collection mode the surface shows only the newest drawn
    /// shape: older features are evicted oldest-first.
    pub fn feature_added(&mut self, feature: Feature) -> GeoFieldResult<()> {
        self.features.push(feature);
        if !self.config.is_collection && self.features.len() > 1 {
            let evicted = self.features.len() - 1;
            self.features.drain(..evicted);
            debug!("evicted {} older feature(s)", evicted);
        }
        self.committed = if self.config.is_collection {
            self.features.len()
        } else {
            1
        };
        self.serialize()?;
        Ok(())
    }

    /// Handle a "feature modified" event.
    ///
    /// `working` is the controller's current working set in layer order.
    /// Entries at index >= the committed count are transient sketch
    /// vertices injected during the modify gesture and are dropped before
    /// anything persists. In non-collection mode only the first entry (the
    /// modified feature itself) is kept.
    pub fn feature_modified(&mut self, mut working: Vec<Feature>) -> GeoFieldResult<()> {
        if self.config.is_collection {
            if working.len() > self.committed {
                debug!(
                    "dropping {} transient sketch feature(s)",
                    working.len() - self.committed
                );
            }
            working.truncate(self.committed);
            self.features = working;
            self.committed = self.features.len();
        } else {
            match working.into_iter().next() {
                Some(modified) => {
                    self.features = vec![modified];
                    self.committed = 1;
                }
                None => return Ok(()),
            }
        }
        self.serialize()?;
        Ok(())
    }

    /// Remove all features and blank the field.
    pub fn clear(&mut self) {
        self.features.clear();
        self.committed = 0;
        self.field.clear();
        debug!("cleared session");
    }

    /// Re-serialize the current features into the field text and return it.
    ///
    /// Features are reprojected from the map projection into the display
    /// projection. Collection surfaces with a fixed draw kind serialize as
    /// the matching Multi* geometry; surfaces allowing several kinds
    /// serialize as a `GEOMETRYCOLLECTION`; non-collection surfaces
    /// serialize their newest feature. With no features the field becomes
    /// the empty string.
    pub fn serialize(&mut self) -> GeoFieldResult<&str> {
        if self.features.is_empty() {
            self.field.clear();
            return Ok(&self.field);
        }
        let display = transform_features(
            &self.features,
            &self.map.projection,
            &self.map.display_projection,
            self.transformer.as_ref(),
        )?;
        let geometry = if self.config.is_collection {
            let kind = match &self.config.geometry {
                GeometryChoice::Single(draw) => draw.composite(),
                GeometryChoice::Any(_) => CompositeKind::Collection,
            };
            compose(kind, &display)?
        } else {
            match display.last() {
                Some(feature) => feature.geometry.clone(),
                None => {
                    self.field.clear();
                    return Ok(&self.field);
                }
            }
        };
        self.field = ewkt::encode(&geometry, &self.map.display_projection)?;
        debug!("synchronized field text ({} bytes)", self.field.len());
        Ok(&self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DrawKind;
    use crate::crs::SpatialReference;
    use crate::ewkt::parse_wkt;
    use crate::geometry::{Geometry, Point};

    fn wgs84_map() -> MapConfig {
        // storage and display in the same projection keeps coordinates literal
        MapConfig {
            projection: SpatialReference::wgs84(),
            display_projection: SpatialReference::wgs84(),
            ..MapConfig::default()
        }
    }

    fn point_feature(x: f64, y: f64) -> Feature {
        Feature::new(Geometry::Point(Point::new(x, y)))
    }

    fn collection_config(kind: DrawKind) -> EditConfig {
        EditConfig {
            geometry: GeometryChoice::Single(kind),
            is_collection: true,
        }
    }

    #[test]
    fn test_empty_field_leaves_session_empty() {
        let mut session = EditableSession::new(wgs84_map(), EditConfig::default());
        session.initialize_from_text("").unwrap();
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.field_text(), "");
        session.initialize_from_text("   \n").unwrap();
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_initialize_adds_missing_srid_prefix() {
        let mut session = EditableSession::new(wgs84_map(), EditConfig::default());
        session.initialize_from_text("POINT(10 20)").unwrap();
        assert_eq!(session.field_text(), "SRID=4326;POINT(10 20)");
        assert_eq!(session.state(), SessionState::Single);
    }

    #[test]
    fn test_initialize_malformed_fails() {
        let mut session = EditableSession::new(wgs84_map(), EditConfig::default());
        assert!(session.initialize_from_text("POINT(10)").is_err());
    }

    #[test]
    fn test_initialize_decomposes_multi() {
        let mut session =
            EditableSession::new(wgs84_map(), collection_config(DrawKind::Point));
        session
            .initialize_from_text("SRID=4326;MULTIPOINT((1 2),(3 4),(5 6))")
            .unwrap();
        assert_eq!(session.features().len(), 3);
        assert_eq!(session.committed_count(), 3);
        assert_eq!(
            session.field_text(),
            "SRID=4326;MULTIPOINT((1 2),(3 4),(5 6))"
        );
    }

    #[test]
    fn test_non_collection_eviction_is_oldest_first() {
        let mut session = EditableSession::new(wgs84_map(), EditConfig::default());
        session.feature_added(point_feature(1.0, 1.0)).unwrap();
        session.feature_added(point_feature(2.0, 2.0)).unwrap();
        assert_eq!(session.features().len(), 1);
        assert_eq!(
            session.features()[0].geometry,
            Geometry::Point(Point::new(2.0, 2.0))
        );
        assert_eq!(session.field_text(), "SRID=4326;POINT(2 2)");
    }

    #[test]
    fn test_collection_add_serializes_multi() {
        let mut session =
            EditableSession::new(wgs84_map(), collection_config(DrawKind::Point));
        session.feature_added(point_feature(1.0, 1.0)).unwrap();
        session.feature_added(point_feature(2.0, 2.0)).unwrap();
        assert_eq!(session.committed_count(), 2);
        assert_eq!(session.field_text(), "SRID=4326;MULTIPOINT((1 1),(2 2))");
    }

    #[test]
    fn test_modification_truncates_sketch_vertices() {
        let mut session =
            EditableSession::new(wgs84_map(), collection_config(DrawKind::Point));
        session.feature_added(point_feature(1.0, 1.0)).unwrap();
        session.feature_added(point_feature(2.0, 2.0)).unwrap();
        assert_eq!(session.committed_count(), 2);

        // a modify gesture hands back five features, three of them vertices
        let working = vec![
            point_feature(1.5, 1.5),
            point_feature(2.0, 2.0),
            point_feature(9.0, 9.0),
            point_feature(9.1, 9.1),
            point_feature(9.2, 9.2),
        ];
        session.feature_modified(working).unwrap();
        assert_eq!(session.features().len(), 2);
        assert_eq!(
            session.field_text(),
            "SRID=4326;MULTIPOINT((1.5 1.5),(2 2))"
        );
    }

    #[test]
    fn test_modify_single_mode_replaces_feature() {
        let mut session = EditableSession::new(wgs84_map(), EditConfig::default());
        session.feature_added(point_feature(1.0, 1.0)).unwrap();
        session
            .feature_modified(vec![point_feature(4.0, 4.0)])
            .unwrap();
        assert_eq!(session.field_text(), "SRID=4326;POINT(4 4)");
        assert_eq!(session.committed_count(), 1);
    }

    #[test]
    fn test_clear_emits_empty_string() {
        let mut session = EditableSession::new(wgs84_map(), EditConfig::default());
        session.feature_added(point_feature(1.0, 1.0)).unwrap();
        assert!(!session.field_text().is_empty());
        session.clear();
        assert_eq!(session.field_text(), "");
        assert_eq!(session.committed_count(), 0);
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_heterogeneous_collection_serializes_as_collection() {
        let config = EditConfig {
            geometry: GeometryChoice::Any(vec![DrawKind::Point, DrawKind::LineString]),
            is_collection: true,
        };
        let mut session = EditableSession::new(wgs84_map(), config);
        session.feature_added(point_feature(1.0, 2.0)).unwrap();
        session
            .feature_added(Feature::new(parse_wkt("LINESTRING(0 0,1 1)").unwrap()))
            .unwrap();
        assert_eq!(
            session.field_text(),
            "SRID=4326;GEOMETRYCOLLECTION(POINT(1 2),LINESTRING(0 0,1 1))"
        );
    }

    #[test]
    fn test_storage_reprojection_round_trip() {
        // WGS84 field text over a web-mercator map
        let map = MapConfig {
            projection: SpatialReference::new("3857"),
            display_projection: SpatialReference::new("4326"),
            ..MapConfig::default()
        };
        let mut session = EditableSession::new(map, EditConfig::default());
        session
            .initialize_from_text("SRID=4326;POINT(10 20)")
            .unwrap();

        // session coordinates are in the storage projection
        match &session.features()[0].geometry {
            Geometry::Point(p) => {
                assert!((p.x - 1_113_194.9).abs() < 1.0);
                assert!((p.y - 2_273_030.9).abs() < 1.0);
            }
            other => panic!("Expected point, got {}", other),
        }

        assert_eq!(session.serialize().unwrap(), "SRID=4326;POINT(10 20)");
    }
}
