use super::segments::{EnvelopeGroup, SegmentGroup};
use super::{ColumnExtent, TreeNode};
use crate::config::BandConfig;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnData {
    pub id: String,
    pub name: String,
    pub category: String,
    pub super_category: String,
    /// Left edge.
    pub x: f32,
    pub width: f32,
    pub is_expanded: bool,
}

impl ColumnData {
    pub fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryData {
    pub id: String,
    pub super_category: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuperCategoryData {
    pub id: String,
    pub categories: Vec<String>,
}

/// Flat records of the three tree levels, in the shape the band rows need.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyData {
    pub columns: Vec<ColumnData>,
    pub categories: Vec<CategoryData>,
    pub super_categories: Vec<SuperCategoryData>,
}

impl HierarchyData {
    pub fn from_tree(tree: &[TreeNode], config: &BandConfig) -> Self {
        let mut data = Self::default();
        for (s, super_node) in tree.iter().enumerate() {
            let mut category_ids = Vec::new();
            for (c, category_node) in super_node.children().iter().enumerate() {
                let mut column_names = Vec::new();
                for (k, leaf) in category_node.children().iter().enumerate() {
                    let width = leaf.width.unwrap_or(config.default_column_width);
                    let name = leaf.original_column.clone().unwrap_or_else(|| leaf.id.clone());
                    column_names.push(name.clone());
                    data.columns.push(ColumnData {
                        id: format!("col-{s}-{c}-{k}"),
                        name,
                        category: category_node.id.clone(),
                        super_category: super_node.id.clone(),
                        x: leaf.x - width / 2.0,
                        width,
                        is_expanded: leaf.is_expanded,
                    });
                }
                category_ids.push(category_node.id.clone());
                data.categories.push(CategoryData {
                    id: category_node.id.clone(),
                    super_category: super_node.id.clone(),
                    columns: column_names,
                });
            }
            data.super_categories.push(SuperCategoryData {
                id: super_node.id.clone(),
                categories: category_ids,
            });
        }
        data.columns
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        data
    }

    /// Categories weighted by column count, for the segment allocator.
    pub fn category_groups(&self) -> Vec<SegmentGroup> {
        self.categories
            .iter()
            .map(|category| SegmentGroup::with_members(category.id.clone(), category.columns.clone()))
            .collect()
    }

    pub fn envelope_groups(&self) -> Vec<EnvelopeGroup> {
        self.super_categories
            .iter()
            .map(|sup| EnvelopeGroup {
                id: sup.id.clone(),
                children: sup.categories.clone(),
            })
            .collect()
    }

    /// Measured column extents keyed by column name.
    pub fn column_extents(&self) -> Vec<ColumnExtent> {
        self.columns
            .iter()
            .map(|column| ColumnExtent {
                id: column.name.clone(),
                x: column.x,
                width: column.width,
            })
            .collect()
    }

    pub fn category_of(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.category.as_str())
    }

    pub fn super_category_of(&self, category: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == category)
            .map(|c| c.super_category.as_str())
    }
}
