use crate::ir::Margin;
use crate::layout::{Orientation, PlacementStrategy};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_SEPARATORS: [char; 5] = ['_', '-', '.', '/', '\\'];

/// Category band allocation. Bands are weighted by column count unless
/// `columns_positioned` is set, in which case they are measured from the
/// laid-out columns and pushed apart where the width floor makes them meet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    pub min_category_width: f32,
    pub segment_spacing: f32,
    pub columns_positioned: bool,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_category_width: 80.0,
            segment_spacing: 2.0,
            columns_positioned: false,
        }
    }
}

/// Row offsets of the ontology axis. Parents jump from the shallow to the
/// deep offset once more than `deep_expansion_threshold` ids are expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub root_sentinel: String,
    pub shallow_row_offset: f32,
    pub deep_row_offset: f32,
    pub deep_expansion_threshold: usize,
    pub super_row_expanded_offset: f32,
    pub super_row_collapsed_offset: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root_sentinel: "root".to_string(),
            shallow_row_offset: 40.0,
            deep_row_offset: 80.0,
            deep_expansion_threshold: 2,
            super_row_expanded_offset: 120.0,
            super_row_collapsed_offset: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    pub spacing: f32,
    pub max_labels_per_view: usize,
    pub strategy: PlacementStrategy,
    pub orientation: Orientation,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            spacing: 40.0,
            max_labels_per_view: 30,
            strategy: PlacementStrategy::Dynamic,
            orientation: Orientation::Horizontal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFitConfig {
    pub char_width_factor: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub max_lines: usize,
    pub min_chars_per_line: usize,
    pub text_padding: f32,
    pub separators: Vec<char>,
}

impl Default for TextFitConfig {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
            font_size: 10.0,
            line_height: 14.0,
            max_lines: 3,
            min_chars_per_line: 3,
            text_padding: 12.0,
            separators: DEFAULT_SEPARATORS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    pub color_padding_percent: f32,
    pub candidate_threshold: f32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            color_padding_percent: 5.0,
            candidate_threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandConfig {
    pub column_height: f32,
    pub default_column_width: f32,
    pub hierarchy_height: f32,
    pub hierarchy_spacing: f32,
    pub bundle_start_factor: f32,
    pub bundle_end_factor: f32,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            column_height: 60.0,
            default_column_width: 100.0,
            hierarchy_height: 30.0,
            hierarchy_spacing: 20.0,
            bundle_start_factor: 0.3,
            bundle_end_factor: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub halo_radius: f32,
    pub halo_samples: usize,
    pub hull_padding: f32,
    pub panel_height: f32,
    pub node_radius: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            halo_radius: 10.0,
            halo_samples: 12,
            hull_padding: 0.15,
            panel_height: 320.0,
            node_radius: 4.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub segments: SegmentConfig,
    pub tree: TreeConfig,
    pub labels: LabelConfig,
    pub text: TextFitConfig,
    pub heatmap: HeatmapConfig,
    pub bands: BandConfig,
    pub clusters: ClusterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub margin: Margin,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            margin: Margin {
                top: 40.0,
                right: 70.0,
                bottom: 20.0,
                left: 70.0,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    line_color: Option<String>,
    band_stroke: Option<String>,
    column_fill: Option<String>,
    heatmap_low: Option<String>,
    heatmap_high: Option<String>,
    highlight_color: Option<String>,
    lasso_stroke: Option<String>,
    background: Option<String>,
    category_palette: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SegmentConfigFile {
    min_category_width: Option<f32>,
    segment_spacing: Option<f32>,
    columns_positioned: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TreeConfigFile {
    root_sentinel: Option<String>,
    shallow_row_offset: Option<f32>,
    deep_row_offset: Option<f32>,
    deep_expansion_threshold: Option<usize>,
    super_row_expanded_offset: Option<f32>,
    super_row_collapsed_offset: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LabelConfigFile {
    spacing: Option<f32>,
    max_labels_per_view: Option<usize>,
    strategy: Option<PlacementStrategy>,
    orientation: Option<Orientation>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TextFitConfigFile {
    char_width_factor: Option<f32>,
    font_size: Option<f32>,
    line_height: Option<f32>,
    max_lines: Option<usize>,
    min_chars_per_line: Option<usize>,
    text_padding: Option<f32>,
    separators: Option<Vec<char>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct HeatmapConfigFile {
    color_padding_percent: Option<f32>,
    candidate_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BandConfigFile {
    column_height: Option<f32>,
    default_column_width: Option<f32>,
    hierarchy_height: Option<f32>,
    hierarchy_spacing: Option<f32>,
    bundle_start_factor: Option<f32>,
    bundle_end_factor: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ClusterConfigFile {
    halo_radius: Option<f32>,
    halo_samples: Option<usize>,
    hull_padding: Option<f32>,
    panel_height: Option<f32>,
    node_radius: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<Margin>,
    segments: Option<SegmentConfigFile>,
    tree: Option<TreeConfigFile>,
    labels: Option<LabelConfigFile>,
    text: Option<TextFitConfigFile>,
    heatmap: Option<HeatmapConfigFile>,
    bands: Option<BandConfigFile>,
    clusters: Option<ClusterConfigFile>,
}

/// Loads a JSON5 (or plain JSON) config file on top of the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.layout.text.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.band_stroke {
            config.theme.band_stroke = v;
        }
        if let Some(v) = vars.column_fill {
            config.theme.column_fill = v;
        }
        if let Some(v) = vars.heatmap_low {
            config.theme.heatmap_low = v;
        }
        if let Some(v) = vars.heatmap_high {
            config.theme.heatmap_high = v;
        }
        if let Some(v) = vars.highlight_color {
            config.theme.highlight_color = v;
        }
        if let Some(v) = vars.lasso_stroke {
            config.theme.lasso_stroke = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.category_palette
            && !v.is_empty()
        {
            config.theme.category_palette = v;
        }
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }
    if let Some(v) = parsed.margin {
        config.render.margin = v;
    }

    if let Some(segments) = parsed.segments {
        if let Some(v) = segments.min_category_width {
            config.layout.segments.min_category_width = v;
        }
        if let Some(v) = segments.segment_spacing {
            config.layout.segments.segment_spacing = v;
        }
        if let Some(v) = segments.columns_positioned {
            config.layout.segments.columns_positioned = v;
        }
    }

    if let Some(tree) = parsed.tree {
        if let Some(v) = tree.root_sentinel {
            config.layout.tree.root_sentinel = v;
        }
        if let Some(v) = tree.shallow_row_offset {
            config.layout.tree.shallow_row_offset = v;
        }
        if let Some(v) = tree.deep_row_offset {
            config.layout.tree.deep_row_offset = v;
        }
        if let Some(v) = tree.deep_expansion_threshold {
            config.layout.tree.deep_expansion_threshold = v;
        }
        if let Some(v) = tree.super_row_expanded_offset {
            config.layout.tree.super_row_expanded_offset = v;
        }
        if let Some(v) = tree.super_row_collapsed_offset {
            config.layout.tree.super_row_collapsed_offset = v;
        }
    }

    if let Some(labels) = parsed.labels {
        if let Some(v) = labels.spacing {
            config.layout.labels.spacing = v;
        }
        if let Some(v) = labels.max_labels_per_view {
            config.layout.labels.max_labels_per_view = v;
        }
        if let Some(v) = labels.strategy {
            config.layout.labels.strategy = v;
        }
        if let Some(v) = labels.orientation {
            config.layout.labels.orientation = v;
        }
    }

    if let Some(text) = parsed.text {
        if let Some(v) = text.char_width_factor {
            config.layout.text.char_width_factor = v;
        }
        if let Some(v) = text.font_size {
            config.layout.text.font_size = v;
        }
        if let Some(v) = text.line_height {
            config.layout.text.line_height = v;
        }
        if let Some(v) = text.max_lines {
            config.layout.text.max_lines = v;
        }
        if let Some(v) = text.min_chars_per_line {
            config.layout.text.min_chars_per_line = v;
        }
        if let Some(v) = text.text_padding {
            config.layout.text.text_padding = v;
        }
        if let Some(v) = text.separators {
            config.layout.text.separators = v;
        }
    }

    if let Some(heatmap) = parsed.heatmap {
        if let Some(v) = heatmap.color_padding_percent {
            config.layout.heatmap.color_padding_percent = v;
        }
        if let Some(v) = heatmap.candidate_threshold {
            config.layout.heatmap.candidate_threshold = v;
        }
    }

    if let Some(bands) = parsed.bands {
        if let Some(v) = bands.column_height {
            config.layout.bands.column_height = v;
        }
        if let Some(v) = bands.default_column_width {
            config.layout.bands.default_column_width = v;
        }
        if let Some(v) = bands.hierarchy_height {
            config.layout.bands.hierarchy_height = v;
        }
        if let Some(v) = bands.hierarchy_spacing {
            config.layout.bands.hierarchy_spacing = v;
        }
        if let Some(v) = bands.bundle_start_factor {
            config.layout.bands.bundle_start_factor = v;
        }
        if let Some(v) = bands.bundle_end_factor {
            config.layout.bands.bundle_end_factor = v;
        }
    }

    if let Some(clusters) = parsed.clusters {
        if let Some(v) = clusters.halo_radius {
            config.layout.clusters.halo_radius = v;
        }
        if let Some(v) = clusters.halo_samples {
            config.layout.clusters.halo_samples = v;
        }
        if let Some(v) = clusters.hull_padding {
            config.layout.clusters.hull_padding = v;
        }
        if let Some(v) = clusters.panel_height {
            config.layout.clusters.panel_height = v;
        }
        if let Some(v) = clusters.node_radius {
            config.layout.clusters.node_radius = v;
        }
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}
