// Space-filling span allocation for category and super-category bands.

use super::{ColumnExtent, SegmentSpan};
use crate::config::SegmentConfig;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A hierarchy group competing for horizontal space.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentGroup {
    pub id: String,
    pub weight: f32,
    pub members: Vec<String>,
}

impl SegmentGroup {
    pub fn new(id: impl Into<String>, weight: f32) -> Self {
        Self {
            id: id.into(),
            weight,
            members: Vec::new(),
        }
    }

    /// Group weighted by its member count.
    pub fn with_members(id: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            id: id.into(),
            weight: members.len() as f32,
            members,
        }
    }
}

/// Parent group whose span is the envelope of its children's spans.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeGroup {
    pub id: String,
    pub children: Vec<String>,
}

/// Proportional allocation, left to right in the given order.
///
/// Groups whose share of the total weight is below `min_width / total_width`
/// get exactly `min_width`; the rest get `min_width` plus a weight-proportional
/// share of whatever width is left after every group's minimum and the gaps.
/// When that leftover is negative the extra share clamps to zero, so an
/// over-full layout comes out dense (and wider than `total_width`) instead of
/// failing.
pub fn allocate_proportional(
    groups: &[SegmentGroup],
    total_width: f32,
    min_width: f32,
    spacing: f32,
) -> Vec<SegmentSpan> {
    if groups.is_empty() {
        return Vec::new();
    }
    let count = groups.len() as f32;
    let total_weight: f32 = groups.iter().map(|g| g.weight.max(0.0)).sum();
    let threshold = if total_width > 0.0 {
        min_width / total_width
    } else {
        f32::INFINITY
    };
    let is_thin = |group: &SegmentGroup| {
        total_weight <= 0.0 || group.weight.max(0.0) / total_weight < threshold
    };

    let available = total_width - min_width * count - spacing * (count - 1.0);
    let wide_weight: f32 = groups
        .iter()
        .filter(|g| !is_thin(g))
        .map(|g| g.weight.max(0.0))
        .sum();
    if available < 0.0 {
        tracing::warn!(
            groups = groups.len(),
            total_width,
            min_width,
            "segment allocation is over-constrained; spans will overflow"
        );
    }

    let mut spans = Vec::with_capacity(groups.len());
    let mut cursor = 0.0f32;
    for group in groups {
        let extra = if is_thin(group) || wide_weight <= 0.0 {
            0.0
        } else {
            (group.weight.max(0.0) * available / wide_weight).max(0.0)
        };
        let width = min_width + extra;
        spans.push(SegmentSpan::new(group.id.clone(), cursor, width));
        cursor += width + spacing;
    }
    spans
}

/// Spans measured from the members' known extents, floored at `min_width`.
/// Groups with no positioned member produce no span.
///
/// Groups are taken as already ordered left to right. A span that the width
/// floor pushed into its successor shifts that successor right, so siblings
/// never overlap and keep at least `spacing` between them.
pub fn allocate_from_extents(
    groups: &[SegmentGroup],
    extents: &[ColumnExtent],
    min_width: f32,
    spacing: f32,
) -> Vec<SegmentSpan> {
    let by_id: HashMap<&str, &ColumnExtent> =
        extents.iter().map(|e| (e.id.as_str(), e)).collect();
    let mut cursor = f32::NEG_INFINITY;
    let mut shifted = 0usize;
    let spans: Vec<SegmentSpan> = groups
        .iter()
        .filter_map(|group| {
            let (left, right) = member_bounds(group, &by_id)?;
            let width = (right - left).max(min_width);
            let x = if left < cursor {
                shifted += 1;
                cursor
            } else {
                left
            };
            cursor = x + width + spacing;
            Some(SegmentSpan::new(group.id.clone(), x, width))
        })
        .collect();
    if shifted > 0 {
        tracing::debug!(shifted, "positioned segments pushed apart by the width floor");
    }
    spans
}

fn member_bounds(
    group: &SegmentGroup,
    by_id: &HashMap<&str, &ColumnExtent>,
) -> Option<(f32, f32)> {
    group
        .members
        .iter()
        .filter_map(|member| by_id.get(member.as_str()))
        .fold(None, |acc, extent| {
            let (l, r) = (extent.x, extent.x + extent.width);
            Some(match acc {
                None => (l, r),
                Some((al, ar)) => (al.min(l), ar.max(r)),
            })
        })
}

/// Orders groups by their leftmost positioned member; groups without one keep
/// their relative order at the end.
pub fn sort_by_leftmost(groups: &mut [SegmentGroup], extents: &[ColumnExtent]) {
    let by_id: HashMap<&str, &ColumnExtent> =
        extents.iter().map(|e| (e.id.as_str(), e)).collect();
    groups.sort_by(|a, b| {
        let la = member_bounds(a, &by_id).map(|(l, _)| l);
        let lb = member_bounds(b, &by_id).map(|(l, _)| l);
        match (la, lb) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Category allocation in either mode. With `column_positions` the groups are
/// sorted by leftmost column and measured; without, they are distributed
/// proportionally over `total_width` in the given order.
pub fn allocate_segments(
    groups: &[SegmentGroup],
    config: &SegmentConfig,
    total_width: f32,
    column_positions: Option<&[ColumnExtent]>,
) -> Vec<SegmentSpan> {
    match column_positions {
        Some(extents) => {
            let mut sorted = groups.to_vec();
            sort_by_leftmost(&mut sorted, extents);
            allocate_from_extents(
                &sorted,
                extents,
                config.min_category_width,
                config.segment_spacing,
            )
        }
        None => allocate_proportional(
            groups,
            total_width,
            config.min_category_width,
            config.segment_spacing,
        ),
    }
}

/// Envelope spans of parent groups over already allocated child spans.
pub fn super_category_spans(
    parents: &[EnvelopeGroup],
    child_spans: &[SegmentSpan],
) -> Vec<SegmentSpan> {
    parents
        .iter()
        .filter_map(|parent| {
            let (left, right) = child_spans
                .iter()
                .filter(|span| parent.children.contains(&span.id))
                .fold(None, |acc: Option<(f32, f32)>, span| {
                    Some(match acc {
                        None => (span.x, span.right()),
                        Some((l, r)) => (l.min(span.x), r.max(span.right())),
                    })
                })?;
            Some(SegmentSpan::new(parent.id.clone(), left, right - left))
        })
        .collect()
}
