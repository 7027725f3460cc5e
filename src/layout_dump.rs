use crate::ir::AggregatedCandidate;
use crate::layout::hierarchy::HierarchyData;
use crate::layout::{
    BandRows, HighlightState, LabelPlacement, Scene, ScatterPoint, SegmentSpan, TreeNode,
};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Stable JSON view of a computed scene, for snapshot diffs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub width: f32,
    pub height: f32,
    pub grid_origin: [f32; 2],
    pub cell_size: f32,
    pub color_domain: [f32; 2],
    pub cells: &'a [AggregatedCandidate],
    pub tree: &'a [TreeNode],
    pub visible_columns: &'a [String],
    pub labels: Vec<&'a LabelPlacement>,
    pub hierarchy: &'a HierarchyData,
    pub category_spans: &'a [SegmentSpan],
    pub super_category_spans: &'a [SegmentSpan],
    pub rows: BandRows,
    pub edges: Vec<EdgeDump<'a>>,
    pub scatter: &'a [ScatterPoint],
    pub halos: Vec<HaloDump<'a>>,
    pub highlight: &'a HighlightState,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump<'a> {
    pub column: &'a str,
    pub category: &'a str,
    pub points: [[f32; 2]; 4],
}

#[derive(Debug, Serialize)]
pub struct HaloDump<'a> {
    pub cluster: &'a str,
    pub points: Vec<[f32; 2]>,
}

impl<'a> LayoutDump<'a> {
    /// Only labels that are shown end up in the dump.
    pub fn from_scene(scene: &'a Scene) -> Self {
        let edges = scene
            .edges
            .iter()
            .map(|edge| EdgeDump {
                column: &edge.column,
                category: &edge.category,
                points: [edge.start, edge.c1, edge.c2, edge.end].map(|p| [p.x, p.y]),
            })
            .collect();
        let halos = scene
            .halos
            .iter()
            .map(|halo| HaloDump {
                cluster: &halo.cluster,
                points: halo.polygon.iter().map(|p| [p.x, p.y]).collect(),
            })
            .collect();
        let (lo, hi) = scene.scales.color.domain;

        LayoutDump {
            width: scene.width,
            height: scene.height,
            grid_origin: [scene.grid_origin.x, scene.grid_origin.y],
            cell_size: scene.scales.cell_size,
            color_domain: [lo, hi],
            cells: &scene.cells,
            tree: &scene.tree,
            visible_columns: &scene.visible_columns,
            labels: scene.labels.iter().filter(|p| p.show).collect(),
            hierarchy: &scene.hierarchy,
            category_spans: &scene.category_spans,
            super_category_spans: &scene.super_category_spans,
            rows: scene.rows,
            edges,
            scatter: &scene.scatter,
            halos,
            highlight: &scene.highlight,
        }
    }
}

pub fn layout_dump_json(scene: &Scene) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_scene(scene))?)
}

pub fn write_layout_dump(path: &Path, scene: &Scene) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_scene(scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
