use crate::config::LayoutConfig;
use crate::layout::text::{
    TextSegment, highlight_segments, intelligent_text_split, multi_line_offset,
    should_display_text, truncate_string,
};
use crate::layout::{
    ElementStyle, Emphasis, LassoSelection, OrdinalScale, Scene, SegmentSpan, TreeNode,
    visible_labels,
};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const CELL_GAP: f32 = 1.0;
const SOURCE_LABEL_GAP: f32 = 6.0;
const TREE_NODE_RADIUS: f32 = 3.0;
const LABEL_BASELINE_SHIFT: f32 = 14.0;
const HALO_FILL_OPACITY: f32 = 0.15;

/// Where and how one block of fitted text is drawn.
struct TextBox<'a> {
    x: f32,
    y: f32,
    width: f32,
    anchor: &'a str,
    bold: bool,
}

pub fn render_svg(scene: &Scene, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = scene.width.max(200.0);
    let height = scene.height.max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<g transform=\"translate({:.2},{:.2})\">",
        scene.grid_origin.x, scene.grid_origin.y
    ));

    render_heatmap(&mut svg, scene, theme, config);
    render_tree_axis(&mut svg, scene, theme, config);
    render_bands(&mut svg, scene, theme, config);
    render_scatter(&mut svg, scene, theme);

    svg.push_str("</g></svg>");
    svg
}

fn render_heatmap(svg: &mut String, scene: &Scene, theme: &Theme, config: &LayoutConfig) {
    let ramp = theme.heatmap_ramp();
    let size = (scene.scales.cell_size - CELL_GAP).max(0.0);
    svg.push_str("<g class=\"heatmap\">");
    for cell in &scene.cells {
        let (Some(x), Some(y)) = (
            scene.scales.x.position(&cell.target_column),
            scene.scales.y.position(&cell.source_column),
        ) else {
            continue;
        };
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{size:.2}\" height=\"{size:.2}\" fill=\"{}\"><title>{} → {}: {:.3}</title></rect>",
            scene.scales.cell_color(cell.score, &ramp),
            escape_xml(&cell.source_column),
            escape_xml(&cell.target_column),
            cell.score
        ));
    }

    let label_width = scene.grid_origin.x - SOURCE_LABEL_GAP;
    for source in scene.scales.y.domain() {
        let Some(label) = single_line_label(source, label_width, config) else {
            continue;
        };
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            -SOURCE_LABEL_GAP,
            scene.scales.y.center(source),
            escape_xml(&theme.font_family),
            config.text.font_size,
            theme.text_color,
            escape_xml(&label)
        ));
    }
    svg.push_str("</g>");
}

fn render_tree_axis(svg: &mut String, scene: &Scene, theme: &Theme, config: &LayoutConfig) {
    let baseline = scene.axis_baseline;
    svg.push_str("<g class=\"ontology-axis\">");
    svg.push_str(&format!(
        "<line x1=\"0\" y1=\"{baseline:.2}\" x2=\"{:.2}\" y2=\"{baseline:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
        scene.scales.x.range().1,
        theme.line_color
    ));

    fn links(svg: &mut String, node: &TreeNode, baseline: f32, theme: &Theme) {
        if !node.is_expanded {
            return;
        }
        for child in node.children() {
            svg.push_str(&format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
                node.x,
                baseline + node.y,
                child.x,
                baseline + child.y,
                theme.line_color
            ));
            links(svg, child, baseline, theme);
        }
    }
    for node in &scene.tree {
        links(svg, node, baseline, theme);
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{TREE_NODE_RADIUS}\" fill=\"{}\"/>",
            node.x,
            baseline + node.y,
            theme.line_color
        ));
    }

    let viewport = scene.scales.x.range().1;
    for placement in visible_labels(&scene.labels, viewport, &config.labels) {
        push_fitted_text(
            svg,
            &placement.text,
            TextBox {
                x: placement.x,
                y: baseline + placement.y + LABEL_BASELINE_SHIFT,
                width: config.labels.spacing,
                anchor: "middle",
                bold: placement.is_cluster_label,
            },
            scene.query.as_deref(),
            theme,
            config,
        );
    }
    svg.push_str("</g>");
}

fn render_bands(svg: &mut String, scene: &Scene, theme: &Theme, config: &LayoutConfig) {
    let bands = &config.bands;
    let rows = scene.rows;
    let hierarchy = &scene.hierarchy;
    let highlight = &scene.highlight;
    let category_ids: Vec<String> = hierarchy.categories.iter().map(|c| c.id.clone()).collect();
    let super_ids: Vec<String> = hierarchy
        .super_categories
        .iter()
        .map(|s| s.id.clone())
        .collect();

    svg.push_str("<g class=\"bundled-paths\">");
    for edge in &scene.edges {
        let style = highlight.edge_emphasis(&edge.column, hierarchy).edge_style();
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\"{}/>",
            edge.path,
            theme.category_color(&category_ids, &edge.category),
            stroke_attrs(&style)
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"columns\">");
    for column in &hierarchy.columns {
        let style = highlight.column_emphasis(&column.name, hierarchy).band_style();
        svg.push_str(&format!(
            "<g opacity=\"{:.2}\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.1}\"/>",
            style.opacity,
            column.x,
            rows.columns_y,
            column.width,
            bands.column_height,
            theme.column_fill,
            theme.band_stroke,
            style.stroke_width
        ));
        push_fitted_text(
            svg,
            &column.name,
            TextBox {
                x: column.center(),
                y: rows.columns_y + bands.column_height / 2.0,
                width: column.width - config.text.text_padding,
                anchor: "middle",
                bold: false,
            },
            scene.query.as_deref(),
            theme,
            config,
        );
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    let row = |svg: &mut String,
               class: &str,
               spans: &[SegmentSpan],
               y: f32,
               ids: &[String],
               emphasis: &dyn Fn(&str) -> Emphasis| {
        svg.push_str(&format!("<g class=\"{class}\">"));
        for span in spans {
            let style = emphasis(span.id.as_str()).band_style();
            svg.push_str(&format!(
                "<g opacity=\"{:.2}\"><rect x=\"{:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.1}\"/>",
                style.opacity,
                span.x,
                span.width,
                bands.hierarchy_height,
                theme.category_color(ids, &span.id),
                theme.band_stroke,
                style.stroke_width
            ));
            push_fitted_text(
                svg,
                &span.id,
                TextBox {
                    x: span.center_x,
                    y: y + bands.hierarchy_height / 2.0,
                    width: span.width - config.text.text_padding,
                    anchor: "middle",
                    bold: true,
                },
                scene.query.as_deref(),
                theme,
                config,
            );
            svg.push_str("</g>");
        }
        svg.push_str("</g>");
    };
    row(
        svg,
        "categories",
        &scene.category_spans,
        rows.category_y,
        &category_ids,
        &|id| highlight.category_emphasis(id, hierarchy),
    );
    row(
        svg,
        "super-categories",
        &scene.super_category_spans,
        rows.super_category_y,
        &super_ids,
        &|id| highlight.super_category_emphasis(id, hierarchy),
    );
}

fn render_scatter(svg: &mut String, scene: &Scene, theme: &Theme) {
    if scene.scatter.is_empty() {
        return;
    }
    let origin = scene.scatter_origin;
    let clusters: Vec<String> = scene.halos.iter().map(|h| h.cluster.clone()).collect();
    svg.push_str(&format!(
        "<g class=\"clusters\" transform=\"translate({:.2},{:.2})\">",
        origin.x, origin.y
    ));
    for halo in &scene.halos {
        let color = theme.category_color(&clusters, &halo.cluster);
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"{color}\" fill-opacity=\"{HALO_FILL_OPACITY}\" stroke=\"{color}\" stroke-width=\"1\"/>",
            halo.path
        ));
    }
    for point in &scene.scatter {
        let (stroke, width) = if point.selected {
            (theme.highlight_color.as_str(), 2.0)
        } else {
            ("none", 0.0)
        };
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"4\" fill=\"{}\" stroke=\"{stroke}\" stroke-width=\"{width}\"><title>{}</title></circle>",
            point.position.x,
            point.position.y,
            theme.category_color(&clusters, &point.cluster),
            escape_xml(&point.name)
        ));
    }
    if scene.lasso_area.len() >= 3 {
        svg.push_str(&format!(
            "<path class=\"lasso\" d=\"{}\" fill=\"{}\" fill-opacity=\"0.1\" stroke=\"{}\" stroke-dasharray=\"4,2\"/>",
            LassoSelection::path_data(&scene.lasso_area),
            theme.lasso_stroke,
            theme.lasso_stroke
        ));
    }
    svg.push_str("</g>");
}

fn stroke_attrs(style: &ElementStyle) -> String {
    let mut attrs = format!(
        " stroke-width=\"{:.1}\" stroke-opacity=\"{:.2}\"",
        style.stroke_width, style.stroke_opacity
    );
    if let Some(dash) = style.dash {
        attrs.push_str(&format!(" stroke-dasharray=\"{dash}\""));
    }
    attrs
}

/// Emits `text` wrapped to `area.width`, or nothing when the box is too narrow
/// to be legible.
fn push_fitted_text(
    svg: &mut String,
    text: &str,
    area: TextBox<'_>,
    query: Option<&str>,
    theme: &Theme,
    config: &LayoutConfig,
) {
    let fit_cfg = &config.text;
    if !should_display_text(area.width, fit_cfg.font_size, fit_cfg) {
        return;
    }
    let fit = intelligent_text_split(text, area.width, fit_cfg.font_size, fit_cfg.max_lines, fit_cfg);
    let start_y = area.y - multi_line_offset(fit.lines.len(), fit_cfg.line_height);
    let weight = if area.bold { " font-weight=\"600\"" } else { "" };

    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{start_y:.2}\" text-anchor=\"{}\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\"{weight}>",
        area.x,
        area.anchor,
        escape_xml(&theme.font_family),
        fit_cfg.font_size,
        theme.text_color
    ));
    if fit.is_truncated {
        svg.push_str(&format!("<title>{}</title>", escape_xml(text)));
    }
    for (idx, line) in fit.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { fit_cfg.line_height };
        svg.push_str(&format!("<tspan x=\"{:.2}\" dy=\"{dy:.2}\">", area.x));
        match query {
            Some(query) => {
                for TextSegment { text: run, matched } in highlight_segments(line, query) {
                    if matched {
                        svg.push_str(&format!(
                            "<tspan fill=\"{}\" font-weight=\"700\">{}</tspan>",
                            theme.highlight_color,
                            escape_xml(&run)
                        ));
                    } else {
                        svg.push_str(&escape_xml(&run));
                    }
                }
            }
            None => svg.push_str(&escape_xml(line)),
        }
        svg.push_str("</tspan>");
    }
    svg.push_str("</text>");
}

/// One-line label cut to the characters that fit in `width`.
fn single_line_label(text: &str, width: f32, config: &LayoutConfig) -> Option<String> {
    let fit_cfg = &config.text;
    if !should_display_text(width, fit_cfg.font_size, fit_cfg) {
        return None;
    }
    let chars = crate::layout::text::approx_chars_per_line(width, fit_cfg.font_size, fit_cfg);
    Some(truncate_string(text, chars, "..."))
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &crate::config::RenderConfig,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }
    std::sync::Arc::make_mut(&mut opt.fontdb).load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
