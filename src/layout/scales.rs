use crate::ir::{AggregatedCandidate, Dimensions};
use crate::theme::ColorInterpolator;
use serde::Serialize;
use std::collections::HashMap;

/// Discrete key → pixel band lookup.
pub trait OrdinalScale {
    /// Start of the band for `key`, or `None` outside the domain.
    fn position(&self, key: &str) -> Option<f32>;

    fn bandwidth(&self) -> f32;

    /// Band centre. Keys outside the domain are treated as sitting at 0.
    fn center(&self, key: &str) -> f32 {
        self.position(key).unwrap_or(0.0) + self.bandwidth() / 2.0
    }

    fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }
}

/// Evenly divided bands over `range`, no inner padding.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BandScale {
    domain: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    range: (f32, f32),
    step: f32,
}

impl BandScale {
    /// Duplicate keys keep their first position.
    pub fn new<I, S>(keys: I, range: (f32, f32)) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut domain = Vec::new();
        let mut index = HashMap::new();
        for key in keys {
            let key = key.into();
            if !index.contains_key(&key) {
                index.insert(key.clone(), domain.len());
                domain.push(key);
            }
        }
        let step = if domain.is_empty() {
            0.0
        } else {
            (range.1 - range.0) / domain.len() as f32
        };
        Self {
            domain,
            index,
            range,
            step,
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn range(&self) -> (f32, f32) {
        self.range
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }
}

impl OrdinalScale for BandScale {
    fn position(&self, key: &str) -> Option<f32> {
        self.index
            .get(key)
            .map(|&slot| self.range.0 + self.step * slot as f32)
    }

    fn bandwidth(&self) -> f32 {
        self.step
    }
}

/// Linear score → `[0, 1]` mapping feeding a color interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SequentialScale {
    pub domain: (f32, f32),
}

impl SequentialScale {
    pub fn new(domain: (f32, f32)) -> Self {
        Self { domain }
    }

    /// Normalized position of `value`, clamped. A collapsed domain maps
    /// everything to the midpoint.
    pub fn normalize(&self, value: f32) -> f32 {
        let (lo, hi) = self.domain;
        let span = hi - lo;
        if !span.is_finite() || span.abs() <= f32::EPSILON {
            return 0.5;
        }
        ((value - lo) / span).clamp(0.0, 1.0)
    }

    pub fn color(&self, value: f32, interpolator: &dyn ColorInterpolator) -> String {
        interpolator.interpolate(self.normalize(value))
    }
}

/// Axis and color scales for one heatmap render.
///
/// Rebuilt from scratch whenever the visible cells change; holds no state
/// between renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapScales {
    pub x: BandScale,
    pub y: BandScale,
    pub color: SequentialScale,
    pub cell_size: f32,
    pub data_range: (f32, f32),
}

impl HeatmapScales {
    pub fn build(cells: &[AggregatedCandidate], dims: &Dimensions, padding_percent: f32) -> Self {
        let targets = BandScale::new(cells.iter().map(|c| c.target_column.as_str()), (0.0, 0.0));
        let sources = BandScale::new(cells.iter().map(|c| c.source_column.as_str()), (0.0, 0.0));
        let columns = targets.len() as f32;
        let row_count = sources.len() as f32;
        let rows = row_count.max(1.0);

        let cell_size = (dims.inner_width() / (columns + 1.0))
            .min(dims.inner_height() / rows)
            .max(0.0);
        let cell_size = if cell_size.is_finite() { cell_size } else { 0.0 };

        let data_range = score_range(cells);
        let pad = (data_range.1 - data_range.0) * padding_percent / 100.0;

        Self {
            x: BandScale::new(targets.domain, (0.0, cell_size * columns)),
            y: BandScale::new(sources.domain, (0.0, cell_size * row_count)),
            color: SequentialScale::new((data_range.0 - pad, data_range.1 + pad)),
            cell_size,
            data_range,
        }
    }

    pub fn cell_color(&self, score: f32, interpolator: &dyn ColorInterpolator) -> String {
        self.color.color(score, interpolator)
    }
}

fn score_range(cells: &[AggregatedCandidate]) -> (f32, f32) {
    let scores = cells.iter().map(|c| c.score).filter(|s| s.is_finite());
    let (lo, hi) = scores.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s), hi.max(s))
    });
    if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Margin;

    fn cell(source: &str, target: &str, score: f32) -> AggregatedCandidate {
        AggregatedCandidate {
            source_column: source.to_string(),
            target_column: target.to_string(),
            matchers: Vec::new(),
            score,
        }
    }

    #[test]
    fn band_scale_dedupes_in_first_seen_order() {
        let scale = BandScale::new(["b", "a", "b", "c"], (0.0, 300.0));
        assert_eq!(scale.domain(), ["b", "a", "c"]);
        assert_eq!(scale.position("a"), Some(100.0));
        assert_eq!(scale.bandwidth(), 100.0);
        assert_eq!(scale.center("c"), 250.0);
    }

    #[test]
    fn missing_key_centres_on_origin() {
        let scale = BandScale::new(["a"], (0.0, 40.0));
        assert_eq!(scale.position("zzz"), None);
        assert_eq!(scale.center("zzz"), 20.0);
        assert!(!scale.contains("zzz"));
    }

    #[test]
    fn cells_stay_square_and_inside_the_box() {
        let cells = vec![
            cell("s1", "t1", 0.2),
            cell("s1", "t2", 0.8),
            cell("s2", "t3", 0.5),
        ];
        let dims = Dimensions::new(400.0, 100.0, Margin::default());
        let scales = HeatmapScales::build(&cells, &dims, 5.0);
        // min(400 / 4, 100 / 2)
        assert_eq!(scales.cell_size, 50.0);
        assert_eq!(scales.x.range(), (0.0, 150.0));
        assert_eq!(scales.y.range(), (0.0, 100.0));
        assert_eq!(scales.x.position("t2"), Some(50.0));
    }

    #[test]
    fn color_domain_is_padded() {
        let cells = vec![cell("a", "x", 0.0), cell("b", "y", 1.0)];
        let dims = Dimensions::new(100.0, 100.0, Margin::default());
        let scales = HeatmapScales::build(&cells, &dims, 10.0);
        let (lo, hi) = scales.color.domain;
        assert!((lo + 0.1).abs() < 1e-6);
        assert!((hi - 1.1).abs() < 1e-6);
        let t = scales.color.normalize(1.0);
        assert!(t < 1.0 && t > 0.9);
    }

    #[test]
    fn empty_cells_use_unit_range() {
        let dims = Dimensions::new(100.0, 100.0, Margin::default());
        let scales = HeatmapScales::build(&[], &dims, 5.0);
        assert_eq!(scales.data_range, (0.0, 1.0));
        assert!(scales.x.is_empty());
        assert!(scales.cell_size.is_finite());
    }

    #[test]
    fn collapsed_domain_maps_to_midpoint() {
        let scale = SequentialScale::new((0.7, 0.7));
        assert_eq!(scale.normalize(0.7), 0.5);
        let ramp = |t: f32| format!("{t:.1}");
        assert_eq!(scale.color(0.2, &ramp), "0.5");
    }
}
