//! Features: geometries carrying display attributes and style.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{OverlayStyle, StyleOverride};
use crate::geometry::{Geometry, Point};

/// A geometry plus an attribute bag and optional style override.
///
/// Cluster membership is attached by the aggregation pass; it is `None` for
/// features that have not been through one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    /// Arbitrary key/value attributes (the `html` key feeds popups)
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    /// Per-feature style, resolved against the layer default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<OverlayStyle>,
    /// Ordered cluster members, set once aggregated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<Vec<Feature>>,
}

impl Feature {
    /// Create a bare feature with no attributes.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            attributes: Map::new(),
            style: None,
            cluster: None,
        }
    }

    /// Create a feature carrying an `html` content attribute.
    pub fn with_html<S: Into<String>>(geometry: Geometry, html: S) -> Self {
        let mut feature = Self::new(geometry);
        feature
            .attributes
            .insert("html".to_string(), Value::String(html.into()));
        feature
    }

    /// The feature's popup content, if any.
    pub fn html(&self) -> Option<&str> {
        self.attributes.get("html").and_then(Value::as_str)
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute<S: Into<String>>(&mut self, key: S, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Number of features this one stands for (cluster members, else itself).
    pub fn member_count(&self) -> usize {
        match &self.cluster {
            Some(members) => members.len(),
            None => 1,
        }
    }

    /// Representative anchor point (bounding box center of the geometry).
    pub fn anchor_point(&self) -> Option<Point> {
        self.geometry.anchor_point()
    }
}

/// One entry of a display content batch: a bare HTML block, or a structured
/// attribute bag with at least an `html` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Html(String),
    Attributes(ContentAttributes),
}

/// Structured popup content with an optional per-feature style override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAttributes {
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleOverride>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Content {
    /// The HTML block of the content.
    pub fn html(&self) -> &str {
        match self {
            Content::Html(html) => html,
            Content::Attributes(attrs) => &attrs.html,
        }
    }

    /// Build the feature for this content over a geometry, resolving any
    /// style override against the layer default.
    pub fn into_feature(&self, geometry: Geometry, base_style: &OverlayStyle) -> Feature {
        let mut feature = Feature::with_html(geometry, self.html());
        if let Content::Attributes(attrs) = self {
            for (key, value) in &attrs.extra {
                feature.attributes.insert(key.clone(), value.clone());
            }
            if let Some(style) = &attrs.style {
                feature.style = Some(style.over(base_style));
            }
        }
        feature
    }
}
