pub mod bundling;
pub mod geometry;
pub mod hierarchy;
pub mod highlight;
pub mod label_placement;
pub mod lasso;
pub mod scales;
pub mod segments;
pub mod text;
pub mod tree;
pub(crate) mod types;
pub use types::*;

pub use bundling::{BundledEdge, ClusterHalo, bundle_edges, cluster_halos};
pub use geometry::{centroid, convex_hull, pad_hull, point_in_polygon};
pub use hierarchy::HierarchyData;
pub use highlight::{ElementStyle, Emphasis, HighlightState, HoverTarget};
pub use label_placement::{place_labels, visible_labels};
pub use lasso::{LassoSelection, SurfaceTransform};
pub use scales::{BandScale, HeatmapScales, OrdinalScale};
pub use segments::{allocate_segments, super_category_spans};
pub use text::{TextFit, intelligent_text_split, should_display_text};
pub use tree::{ExpansionSet, OntologyLayout};

use crate::config::LayoutConfig;
use crate::ir::{Dimensions, LayoutInput, ScatterNode, aggregate_candidates, filter_by_threshold};

/// Runs one full layout pass.
///
/// Coordinates in the returned scene are relative to `grid_origin`; the
/// renderer translates by it. Nothing is carried between calls, so a changed
/// input (a toggled expansion set, a new hover) simply means calling this
/// again.
pub fn compute_scene(input: &LayoutInput, config: &LayoutConfig, dims: &Dimensions) -> Scene {
    let candidates = filter_by_threshold(&input.candidates, config.heatmap.candidate_threshold);
    let cells = aggregate_candidates(&candidates);
    let scales = HeatmapScales::build(&cells, dims, config.heatmap.color_padding_percent);

    let grid_width = scales.x.range().1;
    let axis_baseline = scales.y.range().1;
    let usable_width = if grid_width > 0.0 {
        grid_width
    } else {
        dims.inner_width()
    };

    let expansion = match &input.expanded {
        Some(ids) => ExpansionSet::from_ids(ids.iter().cloned()),
        None => ExpansionSet::seeded(&config.tree.root_sentinel),
    };
    let ontology = OntologyLayout::build(
        &input.ontology,
        scales.x.domain(),
        &expansion,
        &scales.x,
        usable_width,
        &config.tree,
    );
    let visible_columns = ontology.visible_columns();
    let labels = place_labels(&ontology.tree_data, &config.labels, &expansion);

    let bands = &config.bands;
    let tree_height = config.tree.super_row_expanded_offset + bands.hierarchy_spacing;
    let columns_y = axis_baseline + tree_height;
    let category_y = columns_y + bands.column_height + 2.0 * bands.hierarchy_spacing;
    let rows = BandRows {
        columns_y,
        category_y,
        super_category_y: category_y + bands.hierarchy_height + bands.hierarchy_spacing,
    };

    let hierarchy = HierarchyData::from_tree(&ontology.tree_data, bands);
    let extents = hierarchy.column_extents();
    let positions = config
        .segments
        .columns_positioned
        .then_some(extents.as_slice());
    let category_spans = allocate_segments(
        &hierarchy.category_groups(),
        &config.segments,
        usable_width,
        positions,
    );
    let super_spans = super_category_spans(&hierarchy.envelope_groups(), &category_spans);
    let edges = bundle_edges(
        &hierarchy.columns,
        &category_spans,
        rows.columns_y,
        rows.category_y,
        bands,
    );

    let bands_bottom = rows.super_category_y + bands.hierarchy_height;
    let scatter_origin = Point::new(0.0, bands_bottom + 2.0 * bands.hierarchy_spacing);
    let panel = fit_scatter(
        &input.scatter,
        usable_width,
        config.clusters.panel_height,
        config.clusters.halo_radius + config.clusters.node_radius,
    );
    let halos = cluster_halos(&panel, &config.clusters);
    let lasso = LassoSelection::from_area(input.lasso.clone());
    let scatter: Vec<ScatterPoint> = panel
        .into_iter()
        .map(|node| ScatterPoint {
            selected: lasso.is_point_in_selection(node.coordinates),
            name: node.name,
            cluster: node.cluster,
            position: node.coordinates,
        })
        .collect();

    let highlight = HighlightState::parse(input.hover.as_deref()).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring hover target");
        HighlightState::default()
    });

    let content_bottom = if scatter.is_empty() {
        bands_bottom
    } else {
        scatter_origin.y + config.clusters.panel_height
    };
    let content_right = category_spans
        .iter()
        .chain(super_spans.iter())
        .map(SegmentSpan::right)
        .fold(usable_width, f32::max);
    let margin = dims.margin;

    tracing::debug!(
        cells = cells.len(),
        leaves = hierarchy.columns.len(),
        visible = visible_columns.len(),
        labels = labels.len(),
        categories = category_spans.len(),
        edges = edges.len(),
        halos = halos.len(),
        selected = scatter.iter().filter(|p| p.selected).count(),
        "computed scene"
    );

    Scene {
        width: dims.width.max(margin.left + content_right + margin.right),
        height: margin.top + content_bottom + margin.bottom,
        grid_origin: Point::new(margin.left, margin.top),
        axis_baseline,
        cells,
        scales,
        tree: ontology.tree_data,
        visible_columns,
        labels,
        hierarchy,
        category_spans,
        super_category_spans: super_spans,
        rows,
        edges,
        scatter_origin,
        scatter,
        halos,
        lasso_area: input.lasso.clone(),
        highlight,
        query: input.query.clone().filter(|q| !q.trim().is_empty()),
    }
}

/// Maps raw scatter coordinates into a `width × height` panel, keeping `pad`
/// clear on every side. A flat axis collapses to the panel's middle.
fn fit_scatter(nodes: &[ScatterNode], width: f32, height: f32, pad: f32) -> Vec<ScatterNode> {
    let bounds = nodes.iter().fold(None, |acc: Option<(Point, Point)>, node| {
        let p = node.coordinates;
        Some(match acc {
            None => (p, p),
            Some((lo, hi)) => (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            ),
        })
    });
    let Some((lo, hi)) = bounds else {
        return Vec::new();
    };
    let fit = |value: f32, lo: f32, hi: f32, extent: f32| {
        let inner = (extent - 2.0 * pad).max(0.0);
        if hi - lo <= f32::EPSILON {
            extent / 2.0
        } else {
            pad + (value - lo) / (hi - lo) * inner
        }
    };
    nodes
        .iter()
        .map(|node| ScatterNode {
            name: node.name.clone(),
            cluster: node.cluster.clone(),
            coordinates: Point::new(
                fit(node.coordinates.x, lo.x, hi.x, width),
                fit(node.coordinates.y, lo.y, hi.y, height),
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Candidate, Margin, OntologyLeaf};

    fn input() -> LayoutInput {
        LayoutInput {
            candidates: vec![
                Candidate::new("age", "A_1", 0.9),
                Candidate::new("age", "A_2", 0.4),
                Candidate::new("sex", "B_1", 0.7),
                Candidate::new("sex", "A_1", 0.05),
            ],
            ontology: vec![
                OntologyLeaf::new("A_1", "A", "Root"),
                OntologyLeaf::new("A_2", "A", "Root"),
                OntologyLeaf::new("B_1", "B", "Root"),
            ],
            expanded: Some(vec!["Root".into(), "A".into()]),
            ..LayoutInput::default()
        }
    }

    fn dims() -> Dimensions {
        Dimensions::new(
            480.0,
            200.0,
            Margin {
                top: 40.0,
                right: 40.0,
                bottom: 20.0,
                left: 40.0,
            },
        )
    }

    #[test]
    fn scene_wires_tree_bands_and_edges() {
        let scene = compute_scene(&input(), &LayoutConfig::default(), &dims());
        assert_eq!(scene.cells.len(), 4);
        assert_eq!(scene.visible_columns, vec!["A_1", "A_2"]);
        assert_eq!(scene.hierarchy.columns.len(), 3);
        assert_eq!(scene.category_spans.len(), 2);
        assert_eq!(scene.super_category_spans.len(), 1);
        assert_eq!(scene.edges.len(), 3);
        assert!(scene.rows.category_y > scene.rows.columns_y);
        assert!(scene.rows.super_category_y > scene.rows.category_y);
        assert_eq!(scene.grid_origin, Point::new(40.0, 40.0));
    }

    fn lopsided_input() -> LayoutInput {
        let mut ontology = vec![
            OntologyLeaf::new("solo_0", "p00", "g"),
            OntologyLeaf::new("solo_1", "p01", "g"),
            OntologyLeaf::new("solo_2", "p02", "g"),
        ];
        ontology.extend((0..17).map(|i| OntologyLeaf::new(format!("big_{i}"), "big", "g")));
        LayoutInput {
            candidates: ontology
                .iter()
                .map(|leaf| Candidate::new("s", leaf.name.clone(), 0.5))
                .collect(),
            ontology,
            ..LayoutInput::default()
        }
    }

    #[test]
    fn category_bands_never_overlap_when_they_fit() {
        let input = lopsided_input();
        let default_config = LayoutConfig::default();
        let mut positioned = LayoutConfig::default();
        positioned.segments.columns_positioned = true;

        let wide = Dimensions::new(
            1200.0,
            400.0,
            Margin {
                top: 40.0,
                right: 70.0,
                bottom: 20.0,
                left: 70.0,
            },
        );

        for config in [&default_config, &positioned] {
            let scene = compute_scene(&input, config, &wide);
            let spans = &scene.category_spans;
            assert_eq!(spans.len(), 4);
            for pair in spans.windows(2) {
                assert!(
                    pair[1].x >= pair[0].right(),
                    "{} at {} overlaps {} ending at {}",
                    pair[1].id,
                    pair[1].x,
                    pair[0].id,
                    pair[0].right()
                );
            }
        }
    }

    #[test]
    fn threshold_drops_weak_candidates() {
        let mut config = LayoutConfig::default();
        config.heatmap.candidate_threshold = 0.1;
        let scene = compute_scene(&input(), &config, &dims());
        assert_eq!(scene.cells.len(), 3);
    }

    #[test]
    fn missing_expansion_seeds_root_sentinel() {
        let mut input = input();
        input.expanded = None;
        let scene = compute_scene(&input, &LayoutConfig::default(), &dims());
        assert!(scene.visible_columns.is_empty());
        assert_eq!(scene.labels.len(), 1);
    }

    #[test]
    fn lasso_marks_scatter_points() {
        let mut input = input();
        input.scatter = vec![
            ScatterNode {
                name: "age".into(),
                cluster: "c".into(),
                coordinates: Point::new(0.0, 0.0),
            },
            ScatterNode {
                name: "sex".into(),
                cluster: "c".into(),
                coordinates: Point::new(1.0, 1.0),
            },
        ];
        // panel-local square around the top-left node
        input.lasso = vec![
            Point::new(0.0, 0.0),
            Point::new(60.0, 0.0),
            Point::new(60.0, 60.0),
            Point::new(0.0, 60.0),
        ];
        let scene = compute_scene(&input, &LayoutConfig::default(), &dims());
        assert_eq!(scene.scatter.len(), 2);
        assert!(scene.scatter[0].selected);
        assert!(!scene.scatter[1].selected);
        assert_eq!(scene.halos.len(), 1);
    }

    #[test]
    fn bad_hover_degrades_to_no_highlight() {
        let mut input = input();
        input.hover = Some("bogus".into());
        let scene = compute_scene(&input, &LayoutConfig::default(), &dims());
        assert!(!scene.highlight.is_active());
    }

    #[test]
    fn scatter_fit_keeps_padding() {
        let nodes = vec![
            ScatterNode {
                name: "a".into(),
                cluster: "x".into(),
                coordinates: Point::new(-5.0, 2.0),
            },
            ScatterNode {
                name: "b".into(),
                cluster: "x".into(),
                coordinates: Point::new(5.0, 2.0),
            },
        ];
        let fitted = fit_scatter(&nodes, 100.0, 50.0, 10.0);
        assert_eq!(fitted[0].coordinates, Point::new(10.0, 25.0));
        assert_eq!(fitted[1].coordinates, Point::new(90.0, 25.0));
    }
}
