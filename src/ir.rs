use crate::error::LayoutError;
use crate::layout::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One scored source → target proposal from a single matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub source_column: String,
    pub target_column: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
}

impl Candidate {
    pub fn new(source: impl Into<String>, target: impl Into<String>, score: f32) -> Self {
        Self {
            source_column: source.into(),
            target_column: target.into(),
            score,
            matcher: None,
        }
    }
}

/// All matchers' proposals for one (source, target) pair; one heatmap cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedCandidate {
    pub source_column: String,
    pub target_column: String,
    pub matchers: Vec<String>,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyLeaf {
    pub name: String,
    pub parent: String,
    pub grandparent: String,
}

impl OntologyLeaf {
    pub fn new(
        name: impl Into<String>,
        parent: impl Into<String>,
        grandparent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            grandparent: grandparent.into(),
        }
    }
}

/// A column projected into the cluster scatter panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterNode {
    pub name: String,
    pub cluster: String,
    pub coordinates: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
    pub margin: Margin,
}

impl Dimensions {
    pub fn new(width: f32, height: f32, margin: Margin) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn inner_width(&self) -> f32 {
        (self.width - self.margin.left - self.margin.right).max(0.0)
    }

    pub fn inner_height(&self) -> f32 {
        (self.height - self.margin.top - self.margin.bottom).max(0.0)
    }
}

/// Driver document: everything one layout pass consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInput {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, alias = "targetOntology")]
    pub ontology: Vec<OntologyLeaf>,
    #[serde(default)]
    pub expanded: Option<Vec<String>>,
    #[serde(default)]
    pub scatter: Vec<ScatterNode>,
    #[serde(default)]
    pub lasso: Vec<Point>,
    #[serde(default)]
    pub hover: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

pub fn parse_input(contents: &str, path: &Path) -> Result<LayoutInput, LayoutError> {
    json5::from_str(contents).map_err(|err| LayoutError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

pub fn load_input(path: &Path) -> Result<LayoutInput, LayoutError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LayoutError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_input(&contents, path)
}

pub fn filter_by_threshold(candidates: &[Candidate], threshold: f32) -> Vec<Candidate> {
    candidates
        .iter()
        .filter(|candidate| candidate.score >= threshold)
        .cloned()
        .collect()
}

/// Collapses per-matcher candidates into one cell per (source, target) pair,
/// keeping first-seen order and the best score.
pub fn aggregate_candidates(candidates: &[Candidate]) -> Vec<AggregatedCandidate> {
    let mut out: Vec<AggregatedCandidate> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    for candidate in candidates {
        let key = (
            candidate.source_column.as_str(),
            candidate.target_column.as_str(),
        );
        let slot = *index.entry(key).or_insert_with(|| {
            out.push(AggregatedCandidate {
                source_column: candidate.source_column.clone(),
                target_column: candidate.target_column.clone(),
                matchers: Vec::new(),
                score: candidate.score,
            });
            out.len() - 1
        });
        let cell = &mut out[slot];
        cell.score = cell.score.max(candidate.score);
        if let Some(matcher) = &candidate.matcher
            && !cell.matchers.contains(matcher)
        {
            cell.matchers.push(matcher.clone());
        }
    }
    out
}
