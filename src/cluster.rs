//! Spatial cluster aggregation and cluster visual parameters.
//!
//! Grouping is order-stable: the first feature seen seeds a group, and each
//! later feature joins the nearest existing group that passes the proximity
//! predicate, or seeds its own. The proximity metric itself is supplied by
//! the caller (typically a screen-space test built with
//! [`pixel_proximity`]); this module only orchestrates the grouping.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::feature::Feature;

/// View-scale information the proximity predicate needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleContext {
    /// Map units per pixel at the current zoom
    pub resolution: f64,
}

impl Default for ScaleContext {
    fn default() -> Self {
        Self { resolution: 1.0 }
    }
}

impl ScaleContext {
    pub fn new(resolution: f64) -> Self {
        Self { resolution }
    }
}

/// A representative anchor feature plus its ordered members (length >= 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterGroup {
    pub anchor: Feature,
    pub members: Vec<Feature>,
}

impl ClusterGroup {
    fn seed(feature: &Feature) -> Self {
        Self {
            anchor: feature.clone(),
            members: vec![feature.clone()],
        }
    }

    /// Number of member features.
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Visual parameters for rendering this group.
    pub fn visual_params(&self) -> VisualParams {
        visual_params_for_count(self.count())
    }

    /// The group as a single renderable feature: the anchor stamped with
    /// its member list and a `count` attribute.
    pub fn to_feature(&self) -> Feature {
        let mut feature = self.anchor.clone();
        feature.set_attribute("count", Value::from(self.count()));
        feature.cluster = Some(self.members.clone());
        feature
    }
}

/// Derived rendering parameters for a cluster marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualParams {
    /// Marker radius in pixels
    pub radius: f64,
    /// Stroke width in pixels
    pub stroke_width: f64,
    /// Member count as text, empty for a lone feature
    pub label: String,
}

/// Group features into spatial clusters at the current view scale.
///
/// `proximity` decides whether a feature belongs with a group's anchor;
/// among the groups that accept it, the nearest anchor wins.
pub fn aggregate<F>(features: &[Feature], ctx: &ScaleContext, proximity: F) -> Vec<ClusterGroup>
where
    F: Fn(&Feature, &Feature, &ScaleContext) -> bool,
{
    let mut groups: Vec<ClusterGroup> = Vec::new();
    for feature in features {
        let nearest = groups
            .iter_mut()
            .filter(|group| proximity(&group.anchor, feature, ctx))
            .min_by(|a, b| {
                let da = anchor_distance(&a.anchor, feature);
                let db = anchor_distance(&b.anchor, feature);
                da.total_cmp(&db)
            });
        match nearest {
            Some(group) => group.members.push(feature.clone()),
            None => groups.push(ClusterGroup::seed(feature)),
        }
    }
    debug!(
        "aggregated {} features into {} cluster groups",
        features.len(),
        groups.len()
    );
    groups
}

/// Cluster marker radius and label from the member count.
///
/// The count boundaries are contractual: 1 -> 6 px, 2-5 -> 8, 6-25 -> 10,
/// 26-50 -> 12, above 50 -> 14.
pub fn visual_params_for_count(count: usize) -> VisualParams {
    let radius = if count == 1 {
        6.0
    } else if count <= 5 {
        8.0
    } else if count <= 25 {
        10.0
    } else if count <= 50 {
        12.0
    } else {
        14.0
    };
    VisualParams {
        radius,
        stroke_width: if count > 1 { 2.0 } else { 1.0 },
        label: if count > 1 {
            count.to_string()
        } else {
            String::new()
        },
    }
}

/// Build the standard screen-space proximity predicate: anchors closer than
/// `threshold_px` pixels at the context's resolution cluster together.
pub fn pixel_proximity(threshold_px: f64) -> impl Fn(&Feature, &Feature, &ScaleContext) -> bool {
    move |a, b, ctx| {
        anchor_distance(a, b) / ctx.resolution < threshold_px
    }
}

fn anchor_distance(a: &Feature, b: &Feature) -> f64 {
    match (a.anchor_point(), b.anchor_point()) {
        (Some(pa), Some(pb)) => pa.distance(&pb),
        _ => f64::INFINITY,
    }
}
