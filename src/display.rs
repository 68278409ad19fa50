//! Read-only display sessions: an informational overlay built from a batch
//! of geometry/content pairs, with optional clustering and paginated
//! popups.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::cluster::{aggregate, visual_params_for_count, ClusterGroup, ScaleContext};
use crate::config::{ClusterDisplay, MapConfig};
use crate::crs::{transform_geometry, CoordinateTransform, CoordinateTransformer};
use crate::error::GeoFieldResult;
use crate::ewkt;
use crate::feature::{Content, Feature};
use crate::geometry::{BoundingBox, Geometry};
use crate::popup::Popup;

/// A display surface holding a static set of content-bearing features.
pub struct DisplaySession {
    map: MapConfig,
    features: Vec<Feature>,
    clusters: Vec<ClusterGroup>,
    popup: Option<Popup>,
}

impl fmt::Debug for DisplaySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplaySession")
            .field("features", &self.features.len())
            .field("clusters", &self.clusters.len())
            .field("popup_open", &self.popup.is_some())
            .finish()
    }
}

impl DisplaySession {
    /// Build a session from an ordered batch of `(EWKT text, content)`
    /// pairs, using the default coordinate transformer.
    ///
    /// SRID-less entries are read in the display projection; all features
    /// are reprojected into the map projection. A `GEOMETRYCOLLECTION`
    /// entry fans out into one feature per component, each sharing the
    /// entry's content; Multi* geometries stay whole.
    pub fn new(map: MapConfig, batch: &[(String, Content)]) -> GeoFieldResult<Self> {
        Self::with_transformer(map, batch, &CoordinateTransformer::new())
    }

    /// Build a session with a caller-supplied coordinate transformer.
    pub fn with_transformer(
        map: MapConfig,
        batch: &[(String, Content)],
        transformer: &dyn CoordinateTransform,
    ) -> GeoFieldResult<Self> {
        let mut features = Vec::new();
        for (text, content) in batch {
            let tagged = ewkt::decode(text, &map.display_projection)?;
            let geometry = transform_geometry(
                &tagged.geometry,
                &tagged.reference,
                &map.projection,
                transformer,
            )?;
            match geometry {
                Geometry::GeometryCollection(gc) => {
                    for component in gc.geometries {
                        features.push(content.into_feature(component, &map.overlay_style));
                    }
                }
                single => features.push(content.into_feature(single, &map.overlay_style)),
            }
        }
        debug!("display session holds {} feature(s)", features.len());
        Ok(Self {
            map,
            features,
            clusters: Vec::new(),
            popup: None,
        })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn clusters(&self) -> &[ClusterGroup] {
        &self.clusters
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Mutable popup access, for page navigation.
    pub fn popup_mut(&mut self) -> Option<&mut Popup> {
        self.popup.as_mut()
    }

    /// Cluster the features at the given view scale.
    ///
    /// A no-op unless clustering is enabled in the map configuration.
    pub fn aggregate<F>(&mut self, ctx: &ScaleContext, proximity: F)
    where
        F: Fn(&Feature, &Feature, &ScaleContext) -> bool,
    {
        if !self.map.cluster {
            return;
        }
        self.clusters = aggregate(&self.features, ctx, proximity);
    }

    /// Open the popup for the selected feature (or cluster group, when
    /// clustered).
    ///
    /// Returns the open popup, or `None` when the index is out of range or
    /// the selection has no content to show.
    pub fn select(&mut self, index: usize) -> GeoFieldResult<Option<&Popup>> {
        let pages = if self.map.cluster && !self.clusters.is_empty() {
            match self.clusters.get(index) {
                Some(group) => cluster_pages(group, self.map.cluster_display),
                None => Vec::new(),
            }
        } else {
            self.features
                .get(index)
                .and_then(|f| f.html())
                .map(|html| vec![html.to_string()])
                .unwrap_or_default()
        };
        if pages.is_empty() {
            self.popup = None;
            return Ok(None);
        }
        self.popup = Some(Popup::open(pages)?);
        Ok(self.popup.as_ref())
    }

    /// Close any open popup.
    pub fn deselect(&mut self) {
        self.popup = None;
    }

    /// Handle the end of a zoom gesture: the popup closes unconditionally
    /// and cluster groups are discarded (re-aggregate at the new scale).
    pub fn zoom_end(&mut self) {
        debug!("zoom changed, closing popup and dropping cluster groups");
        self.popup = None;
        self.clusters.clear();
    }

    /// The spatial extent of all features, including cluster members.
    pub fn data_extent(&self) -> Option<BoundingBox> {
        let mut extent: Option<BoundingBox> = None;
        for feature in &self.features {
            if let Some(bbox) = feature.geometry.bounding_box() {
                extent = Some(match extent.take() {
                    Some(mut e) => {
                        e.extend_box(&bbox);
                        e
                    }
                    None => bbox,
                });
            }
        }
        extent
    }
}

/// Popup pages for a cluster group.
///
/// Paged mode yields one page per member with content; list mode folds a
/// multi-member group into a single list page.
pub fn cluster_pages(group: &ClusterGroup, display: ClusterDisplay) -> Vec<String> {
    match display {
        ClusterDisplay::Paged => group
            .members
            .iter()
            .filter_map(|member| member.html().map(str::to_string))
            .collect(),
        ClusterDisplay::List => {
            let items: Vec<&str> = group.members.iter().filter_map(|m| m.html()).collect();
            match items.len() {
                0 => Vec::new(),
                1 => vec![items[0].to_string()],
                _ => {
                    let mut html = String::from("<ul class='clusterList'>");
                    for item in items {
                        html.push_str("<li>");
                        html.push_str(item);
                        html.push_str("</li>");
                    }
                    html.push_str("</ul>");
                    vec![html]
                }
            }
        }
    }
}

/// A derived style parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

/// A pure style function over a feature.
pub type StyleFn = fn(&Feature) -> StyleValue;

/// The mapping of derived-parameter names to style functions exposed to the
/// external renderer.
#[derive(Debug, Clone)]
pub struct StyleContext {
    entries: HashMap<&'static str, StyleFn>,
}

impl StyleContext {
    /// The standard cluster-aware context: `radius`, `width`, `label`.
    pub fn standard() -> Self {
        let mut entries: HashMap<&'static str, StyleFn> = HashMap::new();
        entries.insert("radius", cluster_radius);
        entries.insert("width", cluster_width);
        entries.insert("label", cluster_label);
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<StyleFn> {
        self.entries.get(name).copied()
    }

    /// Evaluate a named parameter for a feature.
    pub fn resolve(&self, name: &str, feature: &Feature) -> Option<StyleValue> {
        self.get(name).map(|f| f(feature))
    }
}

impl Default for StyleContext {
    fn default() -> Self {
        Self::standard()
    }
}

fn cluster_radius(feature: &Feature) -> StyleValue {
    StyleValue::Number(visual_params_for_count(feature.member_count()).radius)
}

fn cluster_width(feature: &Feature) -> StyleValue {
    StyleValue::Number(visual_params_for_count(feature.member_count()).stroke_width)
}

fn cluster_label(feature: &Feature) -> StyleValue {
    StyleValue::Text(visual_params_for_count(feature.member_count()).label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::pixel_proximity;
    use crate::crs::SpatialReference;

    fn wgs84_map() -> MapConfig {
        MapConfig {
            projection: SpatialReference::wgs84(),
            display_projection: SpatialReference::wgs84(),
            ..MapConfig::default()
        }
    }

    fn clustered_map() -> MapConfig {
        MapConfig {
            cluster: true,
            ..wgs84_map()
        }
    }

    fn batch(entries: &[(&str, &str)]) -> Vec<(String, Content)> {
        entries
            .iter()
            .map(|(wkt, html)| (wkt.to_string(), Content::Html(html.to_string())))
            .collect()
    }

    #[test]
    fn test_batch_builds_features() {
        let session = DisplaySession::new(
            wgs84_map(),
            &batch(&[("SRID=4326;POINT(1 2)", "<p>one</p>")]),
        )
        .unwrap();
        assert_eq!(session.features().len(), 1);
        assert_eq!(session.features()[0].html(), Some("<p>one</p>"));
    }

    #[test]
    fn test_collection_entry_fans_out() {
        let session = DisplaySession::new(
            wgs84_map(),
            &batch(&[(
                "SRID=4326;GEOMETRYCOLLECTION(POINT(1 2),POINT(3 4))",
                "<p>shared</p>",
            )]),
        )
        .unwrap();
        assert_eq!(session.features().len(), 2);
        assert!(session
            .features()
            .iter()
            .all(|f| f.html() == Some("<p>shared</p>")));
    }

    #[test]
    fn test_multi_entry_stays_whole() {
        let session = DisplaySession::new(
            wgs84_map(),
            &batch(&[("SRID=4326;MULTIPOINT((1 2),(3 4))", "<p>multi</p>")]),
        )
        .unwrap();
        assert_eq!(session.features().len(), 1);
    }

    #[test]
    fn test_select_plain_feature_opens_single_page() {
        let mut session = DisplaySession::new(
            wgs84_map(),
            &batch(&[("SRID=4326;POINT(1 2)", "<p>one</p>")]),
        )
        .unwrap();
        let popup = session.select(0).unwrap().unwrap();
        assert_eq!(popup.page_count(), 1);
        assert!(!popup.has_pagination());
        assert_eq!(popup.current_content(), "<p>one</p>");
    }

    #[test]
    fn test_select_without_content_opens_nothing() {
        let mut session = DisplaySession::new(
            wgs84_map(),
            &batch(&[("SRID=4326;POINT(1 2)", "<p>one</p>")]),
        )
        .unwrap();
        assert!(session.select(5).unwrap().is_none());
        assert!(session.popup().is_none());
    }

    #[test]
    fn test_cluster_selection_paginates_members() {
        let mut session = DisplaySession::new(
            clustered_map(),
            &batch(&[
                ("SRID=4326;POINT(0 0)", "<p>a</p>"),
                ("SRID=4326;POINT(0.00001 0)", "<p>b</p>"),
                ("SRID=4326;POINT(50 50)", "<p>c</p>"),
            ]),
        )
        .unwrap();
        session.aggregate(&ScaleContext::new(0.0001), pixel_proximity(20.0));
        assert_eq!(session.clusters().len(), 2);

        let popup = session.select(0).unwrap().unwrap();
        assert_eq!(popup.page_count(), 2);
        assert!(popup.has_pagination());
        assert_eq!(popup.current_content(), "<p>a</p>");
    }

    #[test]
    fn test_list_mode_folds_into_one_page() {
        let map = MapConfig {
            cluster_display: ClusterDisplay::List,
            ..clustered_map()
        };
        let mut session = DisplaySession::new(
            map,
            &batch(&[
                ("SRID=4326;POINT(0 0)", "<p>a</p>"),
                ("SRID=4326;POINT(0.00001 0)", "<p>b</p>"),
            ]),
        )
        .unwrap();
        session.aggregate(&ScaleContext::new(0.0001), pixel_proximity(20.0));
        let popup = session.select(0).unwrap().unwrap();
        assert_eq!(popup.page_count(), 1);
        assert_eq!(
            popup.current_content(),
            "<ul class='clusterList'><li><p>a</p></li><li><p>b</p></li></ul>"
        );
    }

    #[test]
    fn test_zoom_closes_popup_unconditionally() {
        let mut session = DisplaySession::new(
            wgs84_map(),
            &batch(&[("SRID=4326;POINT(1 2)", "<p>one</p>")]),
        )
        .unwrap();
        session.select(0).unwrap();
        assert!(session.popup().is_some());
        session.zoom_end();
        assert!(session.popup().is_none());
        assert!(session.clusters().is_empty());
    }

    #[test]
    fn test_style_context_matches_cluster_params() {
        let mut session = DisplaySession::new(
            clustered_map(),
            &batch(&[
                ("SRID=4326;POINT(0 0)", "<p>a</p>"),
                ("SRID=4326;POINT(0.00001 0)", "<p>b</p>"),
            ]),
        )
        .unwrap();
        session.aggregate(&ScaleContext::new(0.0001), pixel_proximity(20.0));
        let feature = session.clusters()[0].to_feature();

        let context = StyleContext::standard();
        assert_eq!(
            context.resolve("radius", &feature),
            Some(StyleValue::Number(8.0))
        );
        assert_eq!(
            context.resolve("width", &feature),
            Some(StyleValue::Number(2.0))
        );
        assert_eq!(
            context.resolve("label", &feature),
            Some(StyleValue::Text("2".to_string()))
        );
        assert!(context.resolve("opacity", &feature).is_none());

        // a plain feature resolves to the unclustered style
        let plain = &session.features()[0];
        assert_eq!(
            context.resolve("radius", plain),
            Some(StyleValue::Number(6.0))
        );
        assert_eq!(
            context.resolve("width", plain),
            Some(StyleValue::Number(1.0))
        );
        assert_eq!(
            context.resolve("label", plain),
            Some(StyleValue::Text(String::new()))
        );
    }

    #[test]
    fn test_data_extent() {
        let session = DisplaySession::new(
            wgs84_map(),
            &batch(&[
                ("SRID=4326;POINT(1 2)", "<p>a</p>"),
                ("SRID=4326;POINT(-3 8)", "<p>b</p>"),
            ]),
        )
        .unwrap();
        let extent = session.data_extent().unwrap();
        assert_eq!(extent.min_x, -3.0);
        assert_eq!(extent.max_y, 8.0);
    }
}
