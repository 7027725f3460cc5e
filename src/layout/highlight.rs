use super::hierarchy::HierarchyData;
use crate::error::LayoutError;
use serde::Serialize;
use std::str::FromStr;

/// The element under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum HoverTarget {
    SuperCategory(String),
    Category(String),
    Column(String),
    Edge(String),
}

impl FromStr for HoverTarget {
    type Err = LayoutError;

    /// `super:<id>`, `category:<id>`, `column:<name>` or `edge:<column>`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let unknown = || LayoutError::UnknownHoverTarget(raw.to_string());
        let (kind, id) = raw.split_once(':').ok_or_else(unknown)?;
        let id = id.trim();
        if id.is_empty() {
            return Err(unknown());
        }
        match kind.trim() {
            "super" | "superCategory" => Ok(Self::SuperCategory(id.to_string())),
            "category" => Ok(Self::Category(id.to_string())),
            "column" => Ok(Self::Column(id.to_string())),
            "edge" => Ok(Self::Edge(id.to_string())),
            _ => Err(unknown()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Default,
    Highlighted,
    Faded,
}

/// Paint attributes derived from an [`Emphasis`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementStyle {
    pub opacity: f32,
    pub stroke_width: f32,
    pub stroke_opacity: f32,
    pub dash: Option<&'static str>,
}

const EDGE_STROKE_WIDTH: f32 = 1.5;
const EDGE_DASH: &str = "3,3";

impl Emphasis {
    /// Style for column boxes and band segments.
    pub fn band_style(self) -> ElementStyle {
        let (opacity, stroke_width) = match self {
            Emphasis::Default => (1.0, 1.0),
            Emphasis::Highlighted => (1.0, 2.0),
            Emphasis::Faded => (0.2, 1.0),
        };
        ElementStyle {
            opacity,
            stroke_width,
            stroke_opacity: 1.0,
            dash: None,
        }
    }

    pub fn edge_style(self) -> ElementStyle {
        let stroke_opacity = match self {
            Emphasis::Default => 0.7,
            Emphasis::Highlighted => 1.0,
            Emphasis::Faded => 0.2,
        };
        ElementStyle {
            opacity: 1.0,
            stroke_width: EDGE_STROKE_WIDTH,
            stroke_opacity,
            dash: Some(EDGE_DASH),
        }
    }
}

/// Hover state every visual element reads to derive its own style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighlightState {
    pub hovered: Option<HoverTarget>,
}

impl HighlightState {
    pub fn new(hovered: Option<HoverTarget>) -> Self {
        Self { hovered }
    }

    pub fn parse(raw: Option<&str>) -> Result<Self, LayoutError> {
        let hovered = raw
            .filter(|s| !s.trim().is_empty())
            .map(HoverTarget::from_str)
            .transpose()?;
        Ok(Self { hovered })
    }

    pub fn is_active(&self) -> bool {
        self.hovered.is_some()
    }

    pub fn super_category_emphasis(&self, id: &str, hierarchy: &HierarchyData) -> Emphasis {
        self.emphasis(|target| match target {
            HoverTarget::SuperCategory(s) => s == id,
            HoverTarget::Category(c) => hierarchy.super_category_of(c) == Some(id),
            HoverTarget::Column(_) | HoverTarget::Edge(_) => false,
        })
    }

    pub fn category_emphasis(&self, id: &str, hierarchy: &HierarchyData) -> Emphasis {
        self.emphasis(|target| match target {
            HoverTarget::SuperCategory(s) => hierarchy.super_category_of(id) == Some(s.as_str()),
            HoverTarget::Category(c) => c == id,
            HoverTarget::Column(n) | HoverTarget::Edge(n) => hierarchy.category_of(n) == Some(id),
        })
    }

    pub fn column_emphasis(&self, column: &str, hierarchy: &HierarchyData) -> Emphasis {
        self.emphasis(|target| self.touches_column(target, column, hierarchy))
    }

    /// Edges share their column's emphasis.
    pub fn edge_emphasis(&self, column: &str, hierarchy: &HierarchyData) -> Emphasis {
        self.emphasis(|target| self.touches_column(target, column, hierarchy))
    }

    fn touches_column(&self, target: &HoverTarget, column: &str, hierarchy: &HierarchyData) -> bool {
        match target {
            HoverTarget::SuperCategory(s) => hierarchy
                .category_of(column)
                .and_then(|c| hierarchy.super_category_of(c))
                == Some(s.as_str()),
            HoverTarget::Category(c) => hierarchy.category_of(column) == Some(c.as_str()),
            HoverTarget::Column(n) | HoverTarget::Edge(n) => n == column,
        }
    }

    fn emphasis(&self, related: impl Fn(&HoverTarget) -> bool) -> Emphasis {
        match &self.hovered {
            None => Emphasis::Default,
            Some(target) if related(target) => Emphasis::Highlighted,
            Some(_) => Emphasis::Faded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::hierarchy::{CategoryData, ColumnData, SuperCategoryData};

    fn hierarchy() -> HierarchyData {
        let column = |name: &str, category: &str, sup: &str| ColumnData {
            id: format!("col-{name}"),
            name: name.to_string(),
            category: category.to_string(),
            super_category: sup.to_string(),
            x: 0.0,
            width: 10.0,
            is_expanded: false,
        };
        HierarchyData {
            columns: vec![column("a", "P", "G"), column("b", "Q", "G"), column("c", "R", "H")],
            categories: vec![
                CategoryData {
                    id: "P".into(),
                    super_category: "G".into(),
                    columns: vec!["a".into()],
                },
                CategoryData {
                    id: "Q".into(),
                    super_category: "G".into(),
                    columns: vec!["b".into()],
                },
                CategoryData {
                    id: "R".into(),
                    super_category: "H".into(),
                    columns: vec!["c".into()],
                },
            ],
            super_categories: vec![
                SuperCategoryData {
                    id: "G".into(),
                    categories: vec!["P".into(), "Q".into()],
                },
                SuperCategoryData {
                    id: "H".into(),
                    categories: vec!["R".into()],
                },
            ],
        }
    }

    #[test]
    fn nothing_hovered_is_default() {
        let data = hierarchy();
        let state = HighlightState::default();
        assert_eq!(state.column_emphasis("a", &data), Emphasis::Default);
        assert_eq!(state.super_category_emphasis("G", &data), Emphasis::Default);
    }

    #[test]
    fn super_category_hover_covers_its_subtree() {
        let data = hierarchy();
        let state = HighlightState::parse(Some("super:G")).unwrap();
        assert_eq!(state.super_category_emphasis("G", &data), Emphasis::Highlighted);
        assert_eq!(state.category_emphasis("Q", &data), Emphasis::Highlighted);
        assert_eq!(state.column_emphasis("a", &data), Emphasis::Highlighted);
        assert_eq!(state.edge_emphasis("b", &data), Emphasis::Highlighted);
        assert_eq!(state.column_emphasis("c", &data), Emphasis::Faded);
        assert_eq!(state.super_category_emphasis("H", &data), Emphasis::Faded);
    }

    #[test]
    fn category_hover_lights_its_parent_and_columns() {
        let data = hierarchy();
        let state = HighlightState::parse(Some("category:P")).unwrap();
        assert_eq!(state.super_category_emphasis("G", &data), Emphasis::Highlighted);
        assert_eq!(state.column_emphasis("a", &data), Emphasis::Highlighted);
        assert_eq!(state.category_emphasis("Q", &data), Emphasis::Faded);
        assert_eq!(state.edge_emphasis("b", &data), Emphasis::Faded);
    }

    #[test]
    fn edge_hover_lights_column_and_category() {
        let data = hierarchy();
        let state = HighlightState::parse(Some("edge:b")).unwrap();
        assert_eq!(state.column_emphasis("b", &data), Emphasis::Highlighted);
        assert_eq!(state.category_emphasis("Q", &data), Emphasis::Highlighted);
        assert_eq!(state.column_emphasis("a", &data), Emphasis::Faded);
        assert_eq!(state.super_category_emphasis("G", &data), Emphasis::Faded);
    }

    #[test]
    fn styles_follow_emphasis() {
        assert_eq!(Emphasis::Faded.band_style().opacity, 0.2);
        assert_eq!(Emphasis::Highlighted.band_style().stroke_width, 2.0);
        assert_eq!(Emphasis::Default.edge_style().stroke_opacity, 0.7);
        assert_eq!(Emphasis::Highlighted.edge_style().dash, Some("3,3"));
    }

    #[test]
    fn malformed_hover_specs_are_rejected() {
        assert!(matches!(
            HighlightState::parse(Some("row:1")),
            Err(LayoutError::UnknownHoverTarget(_))
        ));
        assert!(HighlightState::parse(Some("column:")).is_err());
        assert!(HighlightState::parse(Some("plain")).is_err());
        assert_eq!(HighlightState::parse(None).unwrap(), HighlightState::default());
    }
}
