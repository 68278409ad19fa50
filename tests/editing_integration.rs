//! End-to-end tests for the editing and display flows
//!
//! These drive a full session the way a map widget would: initial field
//! text in, user gestures against the session, EWKT back out.

use geofield::{
    pixel_proximity, ClusterDisplay, Content, DrawKind, EditConfig, EditableSession, Feature,
    Geometry, GeometryChoice, MapConfig, Point, ScaleContext, SessionState, SpatialReference,
};

fn mercator_map() -> MapConfig {
    MapConfig {
        projection: SpatialReference::new("3857"),
        display_projection: SpatialReference::new("4326"),
        ..MapConfig::default()
    }
}

fn point_feature(x: f64, y: f64) -> Feature {
    Feature::new(Geometry::Point(Point::new(x, y)))
}

#[test]
fn test_point_field_round_trip() {
    let mut session = EditableSession::new(mercator_map(), EditConfig::default());
    session
        .initialize_from_text("SRID=4326;POINT(10 20)")
        .unwrap();

    assert_eq!(session.state(), SessionState::Single);
    assert_eq!(session.features().len(), 1);
    assert_eq!(session.serialize().unwrap(), "SRID=4326;POINT(10 20)");
}

#[test]
fn test_collection_editing_flow() {
    let config = EditConfig {
        geometry: GeometryChoice::Single(DrawKind::Point),
        is_collection: true,
    };
    let mut session = EditableSession::new(mercator_map(), config);

    // start from stored multi-part text
    session
        .initialize_from_text("SRID=4326;MULTIPOINT((1 1),(2 2))")
        .unwrap();
    assert_eq!(session.state(), SessionState::Collecting);
    assert_eq!(session.committed_count(), 2);
    assert_eq!(
        session.field_text(),
        "SRID=4326;MULTIPOINT((1 1),(2 2))"
    );

    // draw a third point (storage projection coordinates)
    let drawn = Geometry::Point(Point::new(0.0, 0.0));
    session.feature_added(Feature::new(drawn)).unwrap();
    assert_eq!(session.committed_count(), 3);
    assert_eq!(
        session.field_text(),
        "SRID=4326;MULTIPOINT((1 1),(2 2),(0 0))"
    );

    // a modify gesture hands back the working set plus sketch vertices
    let mut working: Vec<Feature> = session.features().to_vec();
    working.push(point_feature(9_999_999.0, 9_999_999.0));
    working.push(point_feature(9_999_998.0, 9_999_998.0));
    session.feature_modified(working).unwrap();
    assert_eq!(session.committed_count(), 3);
    assert_eq!(
        session.field_text(),
        "SRID=4326;MULTIPOINT((1 1),(2 2),(0 0))"
    );

    // clearing blanks the field
    session.clear();
    assert_eq!(session.field_text(), "");
    assert_eq!(session.committed_count(), 0);
}

#[test]
fn test_single_surface_shows_newest_shape() {
    let mut session = EditableSession::new(mercator_map(), EditConfig::default());
    session.feature_added(point_feature(0.0, 0.0)).unwrap();
    let first_text = session.field_text().to_string();
    session
        .feature_added(point_feature(1_113_194.9079327357, 0.0))
        .unwrap();
    assert_eq!(session.features().len(), 1);
    assert_ne!(session.field_text(), first_text);
    assert_eq!(session.field_text(), "SRID=4326;POINT(10 0)");
}

#[test]
fn test_display_flow_with_clusters_and_popups() {
    let map = MapConfig {
        projection: SpatialReference::new("4326"),
        display_projection: SpatialReference::new("4326"),
        cluster: true,
        cluster_display: ClusterDisplay::Paged,
        ..MapConfig::default()
    };
    let batch: Vec<(String, Content)> = vec![
        (
            "SRID=4326;POINT(0 0)".to_string(),
            Content::Html("<p>first</p>".to_string()),
        ),
        (
            "SRID=4326;POINT(0.00001 0.00001)".to_string(),
            Content::Html("<p>second</p>".to_string()),
        ),
        (
            "SRID=4326;POINT(40 40)".to_string(),
            Content::Html("<p>lonely</p>".to_string()),
        ),
    ];
    let mut session = geofield::DisplaySession::new(map, &batch).unwrap();

    session.aggregate(&ScaleContext::new(0.0001), pixel_proximity(20.0));
    assert_eq!(session.clusters().len(), 2);
    assert_eq!(session.clusters()[0].count(), 2);
    assert_eq!(session.clusters()[0].visual_params().label, "2");

    // paginate through the two-member cluster with wraparound
    {
        let popup = session.select(0).unwrap().unwrap();
        assert_eq!(popup.page_label(" of "), "1 of 2");
    }
    let popup = session.popup_mut().unwrap();
    popup.next();
    assert_eq!(popup.current_content(), "<p>second</p>");
    popup.next();
    assert_eq!(popup.current_content(), "<p>first</p>");
    popup.previous();
    assert_eq!(popup.current_content(), "<p>second</p>");

    // zooming closes the popup and invalidates the clusters
    session.zoom_end();
    assert!(session.popup().is_none());
    assert!(session.clusters().is_empty());
}

#[test]
fn test_malformed_initial_text_is_an_error_but_empty_is_not() {
    let mut session = EditableSession::new(mercator_map(), EditConfig::default());
    assert!(session.initialize_from_text("POINT(bogus)").is_err());

    let mut session = EditableSession::new(mercator_map(), EditConfig::default());
    session.initialize_from_text("").unwrap();
    assert_eq!(session.state(), SessionState::Empty);
}
