use std::path::Path;

use schemaviz::config::{Config, TreeConfig};
use schemaviz::ir::{Dimensions, LayoutInput, OntologyLeaf, load_input};
use schemaviz::layout::segments::{SegmentGroup, allocate_proportional};
use schemaviz::layout::{
    BandScale, ExpansionSet, LassoSelection, OntologyLayout, Point, Scene, TreeNode, compute_scene,
    point_in_polygon,
};
use schemaviz::layout_dump::layout_dump_json;
use schemaviz::render_svg;

fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn scene_for(input: &LayoutInput, config: &Config) -> Scene {
    let dims = Dimensions::new(config.render.width, config.render.height, config.render.margin);
    compute_scene(input, &config.layout, &dims)
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.starts_with("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.ends_with("</svg>"), "{fixture}: missing </svg tag");
    assert_eq!(
        svg.matches("<g").count(),
        svg.matches("</g>").count(),
        "{fixture}: unbalanced groups"
    );
    assert_eq!(
        svg.matches("<text").count(),
        svg.matches("</text>").count(),
        "{fixture}: unbalanced text"
    );
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let fixtures = ["clinical.json5", "scatter_lasso.json", "crowded.json"];
    let config = Config::default();
    for name in fixtures {
        let path = fixture_path(name);
        assert!(path.exists(), "fixture missing: {name}");
        let input = load_input(&path).expect("fixture parse failed");
        let scene = scene_for(&input, &config);
        let svg = render_svg(&scene, &config.theme, &config.layout);
        assert_valid_svg(&svg, name);
        let dump = layout_dump_json(&scene).expect("dump failed");
        assert!(dump.contains("\"categorySpans\""), "{name}: dump shape");
    }
}

#[test]
fn clinical_fixture_layout() {
    let input = load_input(&fixture_path("clinical.json5")).unwrap();
    let scene = scene_for(&input, &Config::default());

    // Aggregation keeps one cell per (source, target) pair.
    assert_eq!(scene.cells.len(), 12);
    let age = scene
        .cells
        .iter()
        .find(|c| c.target_column == "age_at_diagnosis")
        .unwrap();
    assert_eq!(age.score, 0.91);
    assert_eq!(age.matchers.len(), 2);

    let supers: Vec<_> = scene.tree.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(supers, vec!["clinical", "biospecimen"]);
    assert_eq!(
        scene.visible_columns,
        vec!["days_to_birth", "gender", "ethnicity", "race"]
    );
    assert_eq!(scene.super_category_spans.len(), 2);
    assert!(scene.highlight.is_active());
    assert_eq!(scene.query.as_deref(), Some("age"));
}

#[test]
fn scatter_fixture_selects_lassoed_nodes() {
    let input = load_input(&fixture_path("scatter_lasso.json")).unwrap();
    let scene = scene_for(&input, &Config::default());
    let selected: Vec<_> = scene
        .scatter
        .iter()
        .filter(|p| p.selected)
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(selected, vec!["bmi", "weight_kg", "height_cm"]);
    assert_eq!(scene.halos.len(), 2);
    for point in &scene.scatter {
        let halo = scene.halos.iter().find(|h| h.cluster == point.cluster).unwrap();
        assert!(point_in_polygon(&halo.polygon, point.position));
    }
}

#[test]
fn crowded_bands_stay_dense_without_failing() {
    let input = load_input(&fixture_path("crowded.json")).unwrap();
    let mut config = Config::default();
    config.render.width = 400.0;
    let scene = scene_for(&input, &config);
    assert_eq!(scene.category_spans.len(), 8);
    for span in &scene.category_spans {
        assert!(span.width >= config.layout.segments.min_category_width);
    }
    for pair in scene.category_spans.windows(2) {
        assert!(pair[1].x > pair[0].x);
    }
    assert!(scene.width > config.render.width);
}

#[test]
fn documented_allocation_example() {
    let groups = vec![SegmentGroup::new("x", 1.0), SegmentGroup::new("y", 9.0)];
    let spans = allocate_proportional(&groups, 200.0, 40.0, 0.0);
    assert_eq!((spans[0].x, spans[0].width), (0.0, 40.0));
    assert!((spans[1].x - 40.0).abs() < 1e-4);
    assert!((spans[1].width - 160.0).abs() < 1e-4);
}

fn example_tree(expansion: &ExpansionSet) -> OntologyLayout {
    let leaves = vec![
        OntologyLeaf::new("A_1", "A", "Root"),
        OntologyLeaf::new("A_2", "A", "Root"),
        OntologyLeaf::new("B_1", "B", "Root"),
    ];
    let columns: Vec<String> = leaves.iter().map(|l| l.name.clone()).collect();
    let scale = BandScale::new(columns.iter().cloned(), (0.0, 300.0));
    OntologyLayout::build(&leaves, &columns, expansion, &scale, 300.0, &TreeConfig::default())
}

#[test]
fn documented_tree_example() {
    let layout = example_tree(&ExpansionSet::from_ids(["Root", "A"]));
    assert_eq!(layout.tree_data.len(), 1);
    let root = &layout.tree_data[0];
    assert!(root.is_expanded);
    let a = &root.children()[0];
    let b = &root.children()[1];
    assert!(a.is_expanded);
    assert!(!b.is_expanded);
    assert_eq!(b.children().len(), 1);
    assert_eq!(layout.visible_columns(), vec!["A_1", "A_2"]);

    let toggled = layout.toggle_node("B");
    let rebuilt = example_tree(&toggled);
    assert_eq!(rebuilt.visible_columns(), vec!["A_1", "A_2", "B_1"]);
}

#[test]
fn tree_levels_step_by_one() {
    let layout = example_tree(&ExpansionSet::from_ids(["Root", "A", "B"]));
    let mut seen = Vec::new();
    for root in &layout.tree_data {
        assert_eq!(root.level, 1);
        root.walk(&mut |node: &TreeNode| {
            for child in node.children() {
                assert_eq!(child.level, node.level + 1);
            }
            if node.is_leaf() {
                seen.push(node.id.clone());
            }
        });
    }
    seen.sort();
    assert_eq!(seen, vec!["A_1", "A_2", "B_1"]);
}

#[test]
fn documented_lasso_example() {
    let mut lasso = LassoSelection::new();
    lasso.start_selection(Point::new(0.0, 0.0));
    for p in [(10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
        lasso.update_selection(p.into());
    }
    lasso.end_selection();
    assert!(lasso.is_point_in_selection(Point::new(5.0, 5.0)));
    assert!(!lasso.is_point_in_selection(Point::new(20.0, 20.0)));

    lasso.clear_selection();
    assert!(!lasso.is_point_in_selection(Point::new(5.0, 5.0)));
}
