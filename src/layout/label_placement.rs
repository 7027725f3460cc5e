// Axis label placement for the ontology tree.
// Pure geometry over positioned tree nodes; the renderer decides what to draw.

use super::tree::ExpansionSet;
use super::{LabelPlacement, Orientation, PlacementStrategy, TreeNode};
use crate::config::LabelConfig;
use std::cmp::Ordering;

/// One placement candidate per node reachable through expanded ancestors, in
/// pre-order.
///
/// Cluster labels are always shown; leaf labels only when flagged. With the
/// dynamic strategy, shown placements are pushed forward along the axis until
/// neighbours sit at least `spacing` apart. Placements are never pulled back.
/// Vertical axes run along `y`, horizontal ones along `x`.
pub fn place_labels(
    nodes: &[TreeNode],
    config: &LabelConfig,
    expansion: &ExpansionSet,
) -> Vec<LabelPlacement> {
    let mut placements = Vec::new();
    for node in nodes {
        collect(node, expansion, &mut placements);
    }

    if config.strategy == PlacementStrategy::Dynamic {
        spread(&mut placements, config.orientation, config.spacing);
    }
    placements
}

fn collect(node: &TreeNode, expansion: &ExpansionSet, out: &mut Vec<LabelPlacement>) {
    out.push(LabelPlacement {
        x: node.x,
        y: node.y,
        show: node.label.is_cluster_label || node.label.show,
        text: node.label.text.clone(),
        is_cluster_label: node.label.is_cluster_label,
    });
    if expansion.contains(&node.id) {
        for child in node.children() {
            collect(child, expansion, out);
        }
    }
}

fn spread(placements: &mut [LabelPlacement], orientation: Orientation, spacing: f32) {
    let mut shown: Vec<usize> = (0..placements.len())
        .filter(|&i| placements[i].show)
        .collect();
    shown.sort_by(|&a, &b| {
        axis(&placements[a], orientation)
            .partial_cmp(&axis(&placements[b], orientation))
            .unwrap_or(Ordering::Equal)
    });

    let mut last: Option<f32> = None;
    for index in shown {
        let placement = &mut placements[index];
        let mut coord = axis(placement, orientation);
        if let Some(prev) = last
            && coord - prev < spacing
        {
            coord = prev + spacing;
            // prev + spacing can round below the floor
            while coord - prev < spacing && coord.is_finite() {
                coord = step_up(coord);
            }
            match orientation {
                Orientation::Horizontal => placement.x = coord,
                Orientation::Vertical => placement.y = coord,
            }
        }
        last = Some(coord);
    }
}

/// Next representable f32 above `value`.
fn step_up(value: f32) -> f32 {
    if value.is_nan() || value == f32::INFINITY {
        return value;
    }
    if value == 0.0 {
        return f32::from_bits(1);
    }
    let bits = value.to_bits();
    if value > 0.0 {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

fn axis(placement: &LabelPlacement, orientation: Orientation) -> f32 {
    match orientation {
        Orientation::Horizontal => placement.x,
        Orientation::Vertical => placement.y,
    }
}

/// The shown placements that land inside `[0, viewport]` along the axis,
/// capped at `max_labels_per_view`. Cluster labels win over leaf labels when
/// the cap bites; otherwise axis order is kept.
pub fn visible_labels<'a>(
    placements: &'a [LabelPlacement],
    viewport: f32,
    config: &LabelConfig,
) -> Vec<&'a LabelPlacement> {
    let mut visible: Vec<&LabelPlacement> = placements
        .iter()
        .filter(|p| p.show)
        .filter(|p| {
            let coord = axis(p, config.orientation);
            (0.0..=viewport).contains(&coord)
        })
        .collect();
    visible.sort_by(|a, b| {
        b.is_cluster_label.cmp(&a.is_cluster_label).then(
            axis(a, config.orientation)
                .partial_cmp(&axis(b, config.orientation))
                .unwrap_or(Ordering::Equal),
        )
    });
    visible.truncate(config.max_labels_per_view);
    visible.sort_by(|a, b| {
        axis(a, config.orientation)
            .partial_cmp(&axis(b, config.orientation))
            .unwrap_or(Ordering::Equal)
    });
    visible
}
