use serde::{Deserialize, Serialize};

use super::bundling::{BundledEdge, ClusterHalo};
use super::hierarchy::HierarchyData;
use super::highlight::HighlightState;
use super::scales::HeatmapScales;
use crate::ir::AggregatedCandidate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Counter-clockwise polygon, implicitly closed.
pub type HullPolygon = Vec<Point>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeLabel {
    pub text: String,
    pub show: bool,
    pub is_cluster_label: bool,
}

/// One node of the 3-level ontology tree.
///
/// Level 1 is a super-category, level 2 a category, level 3 a leaf column.
/// Leaves have `children == None` and carry `original_column`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub label: NodeLabel,
    pub level: u8,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    pub is_expanded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Pre-order walk over this node and every descendant.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPlacement {
    pub x: f32,
    pub y: f32,
    pub show: bool,
    pub text: String,
    pub is_cluster_label: bool,
}

/// Pixel interval allocated to one hierarchy group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSpan {
    pub id: String,
    pub x: f32,
    pub width: f32,
    pub center_x: f32,
}

impl SegmentSpan {
    pub fn new(id: impl Into<String>, x: f32, width: f32) -> Self {
        Self {
            id: id.into(),
            x,
            width,
            center_x: x + width / 2.0,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Known on-screen extent of a positioned column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnExtent {
    pub id: String,
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementStrategy {
    Fixed,
    #[default]
    Dynamic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub name: String,
    pub cluster: String,
    pub position: Point,
    pub selected: bool,
}

/// Vertical placement of the stacked rows below the heatmap grid.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandRows {
    pub columns_y: f32,
    pub category_y: f32,
    pub super_category_y: f32,
}

/// Everything one layout pass produces; rebuilt from scratch on every input change.
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub grid_origin: Point,
    pub axis_baseline: f32,
    pub cells: Vec<AggregatedCandidate>,
    pub scales: HeatmapScales,
    pub tree: Vec<TreeNode>,
    pub visible_columns: Vec<String>,
    pub labels: Vec<LabelPlacement>,
    pub hierarchy: HierarchyData,
    pub category_spans: Vec<SegmentSpan>,
    pub super_category_spans: Vec<SegmentSpan>,
    pub rows: BandRows,
    pub edges: Vec<BundledEdge>,
    pub scatter_origin: Point,
    pub scatter: Vec<ScatterPoint>,
    pub halos: Vec<ClusterHalo>,
    pub lasso_area: Vec<Point>,
    pub highlight: HighlightState,
    pub query: Option<String>,
}
