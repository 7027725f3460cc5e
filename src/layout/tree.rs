use super::scales::OrdinalScale;
use super::{NodeLabel, TreeNode};
use crate::config::TreeConfig;
use crate::ir::OntologyLeaf;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Ids of the nodes whose children are revealed.
///
/// Copy-on-write: [`ExpansionSet::toggled`] returns a new set and leaves the
/// receiver untouched, so a layout pass holding a clone never sees a partial
/// update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSet {
    ids: Arc<BTreeSet<String>>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(root_sentinel: &str) -> Self {
        Self::from_ids([root_sentinel])
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Arc::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    #[must_use]
    pub fn toggled(&self, id: &str) -> Self {
        let mut next = (*self.ids).clone();
        if !next.remove(id) {
            next.insert(id.to_string());
        }
        Self {
            ids: Arc::new(next),
        }
    }
}

/// A built ontology axis: the positioned tree plus the expansion set it was
/// built against.
#[derive(Debug, Clone)]
pub struct OntologyLayout {
    pub tree_data: Vec<TreeNode>,
    expansion: ExpansionSet,
}

impl OntologyLayout {
    /// Builds the 3-level tree for the leaves that appear in `columns`.
    ///
    /// Super-categories split `usable_width` evenly by index; categories split
    /// their super-category's slot evenly after being ordered by their
    /// leftmost leaf. Leaves sit at the scale's band centre on `y = 0`.
    pub fn build(
        leaves: &[OntologyLeaf],
        columns: &[String],
        expansion: &ExpansionSet,
        scale: &dyn OrdinalScale,
        usable_width: f32,
        config: &TreeConfig,
    ) -> Self {
        let visible: HashSet<&str> = columns.iter().map(String::as_str).collect();
        let filtered: Vec<&OntologyLeaf> = leaves
            .iter()
            .filter(|leaf| visible.contains(leaf.name.as_str()))
            .collect();

        let grandparents = first_seen(filtered.iter().map(|leaf| leaf.grandparent.as_str()));
        let slot_width = if grandparents.is_empty() {
            0.0
        } else {
            usable_width / grandparents.len() as f32
        };
        let parent_y = if expansion.len() > config.deep_expansion_threshold {
            config.deep_row_offset
        } else {
            config.shallow_row_offset
        };

        let tree_data: Vec<TreeNode> = grandparents
            .iter()
            .enumerate()
            .map(|(gp_index, grandparent)| {
                let members: Vec<&OntologyLeaf> = filtered
                    .iter()
                    .copied()
                    .filter(|leaf| leaf.grandparent == *grandparent)
                    .collect();
                let slot_start = slot_width * gp_index as f32;

                let mut parents: Vec<(&str, Vec<TreeNode>, f32)> =
                    first_seen(members.iter().map(|leaf| leaf.parent.as_str()))
                        .into_iter()
                        .map(|parent| {
                            let leaves: Vec<TreeNode> = members
                                .iter()
                                .filter(|leaf| leaf.parent == parent)
                                .map(|leaf| leaf_node(leaf, scale, expansion))
                                .collect();
                            let leftmost = leaves.iter().map(|n| n.x).fold(f32::INFINITY, f32::min);
                            (parent, leaves, leftmost)
                        })
                        .collect();
                parents.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));

                let parent_count = parents.len().max(1) as f32;
                let children: Vec<TreeNode> = parents
                    .into_iter()
                    .enumerate()
                    .map(|(p_index, (parent, leaves, _))| TreeNode {
                        id: parent.to_string(),
                        label: cluster_label(parent),
                        level: 2,
                        x: slot_start + slot_width * (p_index as f32 + 0.5) / parent_count,
                        y: parent_y,
                        children: Some(leaves),
                        is_expanded: expansion.contains(parent),
                        original_column: None,
                        width: None,
                    })
                    .collect();

                let is_expanded = expansion.contains(grandparent);
                TreeNode {
                    id: grandparent.to_string(),
                    label: cluster_label(grandparent),
                    level: 1,
                    x: slot_start + slot_width / 2.0,
                    y: if is_expanded {
                        config.super_row_expanded_offset
                    } else {
                        config.super_row_collapsed_offset
                    },
                    children: Some(children),
                    is_expanded,
                    original_column: None,
                    width: None,
                }
            })
            .collect();

        tracing::debug!(
            leaves = filtered.len(),
            super_categories = tree_data.len(),
            expanded = expansion.len(),
            "built ontology tree"
        );

        Self {
            tree_data,
            expansion: expansion.clone(),
        }
    }

    pub fn expansion(&self) -> &ExpansionSet {
        &self.expansion
    }

    /// The expansion set with `id` flipped. Rebuild the layout against it.
    pub fn toggle_node(&self, id: &str) -> ExpansionSet {
        self.expansion.toggled(id)
    }

    /// Leaf ids reachable through expanded ancestors, in pre-order.
    pub fn visible_columns(&self) -> Vec<String> {
        fn traverse(node: &TreeNode, expansion: &ExpansionSet, out: &mut Vec<String>) {
            match &node.children {
                Some(children) if expansion.contains(&node.id) => {
                    for child in children {
                        traverse(child, expansion, out);
                    }
                }
                _ => {
                    if let Some(column) = &node.original_column {
                        out.push(column.clone());
                    }
                }
            }
        }

        let mut out = Vec::new();
        for node in &self.tree_data {
            traverse(node, &self.expansion, &mut out);
        }
        out
    }
}

fn leaf_node(leaf: &OntologyLeaf, scale: &dyn OrdinalScale, expansion: &ExpansionSet) -> TreeNode {
    TreeNode {
        id: leaf.name.clone(),
        label: NodeLabel {
            text: leaf.name.clone(),
            show: true,
            is_cluster_label: false,
        },
        level: 3,
        x: scale.center(&leaf.name),
        y: 0.0,
        children: None,
        is_expanded: expansion.contains(&leaf.name),
        original_column: Some(leaf.name.clone()),
        width: Some(scale.bandwidth()),
    }
}

fn cluster_label(text: &str) -> NodeLabel {
    NodeLabel {
        text: text.to_string(),
        show: true,
        is_cluster_label: true,
    }
}

fn first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(*value)).collect()
}
