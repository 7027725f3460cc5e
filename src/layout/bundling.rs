use super::geometry::{circle_points, convex_hull, pad_hull, polygon_path};
use super::hierarchy::ColumnData;
use super::{Point, SegmentSpan};
use crate::config::{BandConfig, ClusterConfig};
use crate::ir::ScatterNode;
use serde::Serialize;
use std::collections::HashMap;

/// Cubic curve from a column's bottom edge to its category band.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundledEdge {
    pub id: String,
    pub column: String,
    pub category: String,
    pub start: Point,
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
    pub path: String,
}

pub fn bundle_edges(
    columns: &[ColumnData],
    category_spans: &[SegmentSpan],
    columns_y: f32,
    category_y: f32,
    config: &BandConfig,
) -> Vec<BundledEdge> {
    let spans: HashMap<&str, &SegmentSpan> =
        category_spans.iter().map(|s| (s.id.as_str(), s)).collect();
    let offset = (columns_y - category_y) * 0.5;

    columns
        .iter()
        .filter_map(|column| {
            let span = spans.get(column.category.as_str())?;
            let start = Point::new(column.center(), columns_y + config.column_height);
            let end = Point::new(span.center_x, category_y);
            let c1 = Point::new(start.x, start.y - offset * config.bundle_start_factor);
            let c2 = Point::new(end.x, end.y + offset * config.bundle_end_factor);
            Some(BundledEdge {
                id: format!("edge-{}-{}", column.id, span.id),
                column: column.name.clone(),
                category: span.id.clone(),
                path: format!(
                    "M {:.2},{:.2} C {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
                    start.x, start.y, c1.x, c1.y, c2.x, c2.y, end.x, end.y
                ),
                start,
                c1,
                c2,
                end,
            })
        })
        .collect()
}

/// Padded convex outline around one cluster of scatter nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterHalo {
    pub cluster: String,
    pub polygon: Vec<Point>,
    pub path: String,
}

/// One halo per distinct cluster, in first-seen order.
///
/// Every member contributes a ring of samples so that single nodes and
/// collinear clusters still get a proper area.
pub fn cluster_halos(nodes: &[ScatterNode], config: &ClusterConfig) -> Vec<ClusterHalo> {
    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<Point>> = HashMap::new();
    for node in nodes {
        let cluster = node.cluster.as_str();
        let ring = circle_points(node.coordinates, config.halo_radius, config.halo_samples);
        members
            .entry(cluster)
            .or_insert_with(|| {
                order.push(cluster);
                Vec::new()
            })
            .extend(ring);
    }

    order
        .into_iter()
        .filter_map(|cluster| {
            let points = members.remove(cluster)?;
            let polygon = pad_hull(&convex_hull(&points), config.hull_padding);
            Some(ClusterHalo {
                cluster: cluster.to_string(),
                path: polygon_path(&polygon),
                polygon,
            })
        })
        .collect()
}
