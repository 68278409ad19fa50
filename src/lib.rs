//! # Geometry form-field editing core
//!
//! `geofield` keeps a textual form field continuously synchronized with a
//! set of geographic geometries edited on a map, and drives the cluster and
//! popup presentation of read-only overlays. Map rendering, tile loading,
//! and gesture handling stay with external collaborators; this crate owns
//! the codec and synchronization logic between them.
//!
//! ## Core Components
//!
//! - [`Geometry`]: tagged geometry model over the seven simple-feature kinds
//! - [`ewkt`]: the EWKT/WKT codec binding geometries to their [`SpatialReference`]
//! - [`transform_geometry`] / [`CoordinateTransform`]: projection orchestration
//!   with pluggable coordinate math
//! - [`compose`] / [`decompose`]: multi-geometry splitting and recombination
//! - [`EditableSession`]: the per-surface state machine that mirrors every
//!   edit back into its field text
//! - [`DisplaySession`]: read-only overlays with clustering and paginated
//!   popups
//!
//! ## Examples
//!
//! ```rust
//! use geofield::{EditConfig, EditableSession, MapConfig, SpatialReference};
//!
//! let map = MapConfig {
//!     projection: SpatialReference::web_mercator(),
//!     display_projection: SpatialReference::wgs84(),
//!     ..MapConfig::default()
//! };
//! let mut session = EditableSession::new(map, EditConfig::default());
//! session.initialize_from_text("SRID=4326;POINT(10 20)").unwrap();
//! assert_eq!(session.field_text(), "SRID=4326;POINT(10 20)");
//! ```

pub mod cluster;
pub mod compose;
pub mod config;
pub mod crs;
pub mod display;
pub mod error;
pub mod ewkt;
pub mod feature;
pub mod geometry;
pub mod popup;
pub mod session;

pub use cluster::{
    aggregate, pixel_proximity, visual_params_for_count, ClusterGroup, ScaleContext, VisualParams,
};
pub use compose::{compose, decompose, CompositeKind};
pub use config::{
    ClusterDisplay, DrawKind, EditConfig, GeometryChoice, MapConfig, OverlayStyle, StyleOverride,
};
pub use crs::{
    transform_features, transform_geometry, CoordinateTransform, CoordinateTransformer,
    SpatialReference, TaggedGeometry, LEGACY_WEB_MERCATOR_SRID, WEB_MERCATOR_SRID, WGS84_SRID,
};
pub use display::{cluster_pages, DisplaySession, StyleContext, StyleFn, StyleValue};
pub use error::{GeoFieldError, GeoFieldResult};
pub use ewkt::{decode, encode};
pub use feature::{Content, ContentAttributes, Feature};
pub use geometry::{
    BoundingBox, Geometry, GeometryCollection, GeometryKind, LineString, LinearRing,
    MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
pub use popup::Popup;
pub use session::{EditableSession, SessionState};
