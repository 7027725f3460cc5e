use serde::{Deserialize, Serialize};

const CATEGORICAL_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const TABLEAU_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc949", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub text_color: String,
    pub line_color: String,
    pub band_stroke: String,
    pub column_fill: String,
    pub heatmap_low: String,
    pub heatmap_high: String,
    pub highlight_color: String,
    pub lasso_stroke: String,
    pub background: String,
    pub category_palette: Vec<String>,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"Roboto\", \"Helvetica\", \"Arial\", sans-serif".to_string(),
            text_color: "#212121".to_string(),
            line_color: "#616161".to_string(),
            band_stroke: "#212121".to_string(),
            column_fill: "#FFFFFF".to_string(),
            heatmap_low: "#F7FBFF".to_string(),
            heatmap_high: "#08306B".to_string(),
            highlight_color: "#1976D2".to_string(),
            lasso_stroke: "#1976D2".to_string(),
            background: "#FFFFFF".to_string(),
            category_palette: CATEGORICAL_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            band_stroke: "#C7D2E5".to_string(),
            column_fill: "#F8FAFF".to_string(),
            heatmap_low: "#EEF2F8".to_string(),
            heatmap_high: "#1C2430".to_string(),
            highlight_color: "#3B82F6".to_string(),
            lasso_stroke: "#3B82F6".to_string(),
            background: "#FFFFFF".to_string(),
            category_palette: TABLEAU_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Categorical color for `id`: palette slot by position in `ids`, or a
    /// character-sum hash for ids outside the list.
    pub fn category_color(&self, ids: &[String], id: &str) -> String {
        if self.category_palette.is_empty() {
            return self.line_color.clone();
        }
        let slot = match ids.iter().position(|candidate| candidate == id) {
            Some(index) => index,
            None => id.chars().map(|ch| ch as usize).sum(),
        };
        self.category_palette[slot % self.category_palette.len()].clone()
    }

    pub fn heatmap_ramp(&self) -> LinearRamp {
        LinearRamp::new(&self.heatmap_low, &self.heatmap_high)
    }
}

/// Opaque `t ∈ [0, 1] → color` mapping used by sequential scales.
pub trait ColorInterpolator {
    fn interpolate(&self, t: f32) -> String;
}

impl<F> ColorInterpolator for F
where
    F: Fn(f32) -> String,
{
    fn interpolate(&self, t: f32) -> String {
        self(t)
    }
}

/// Two-stop RGB ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRamp {
    low: [u8; 3],
    high: [u8; 3],
}

impl LinearRamp {
    pub fn new(low: &str, high: &str) -> Self {
        Self {
            low: parse_hex(low).unwrap_or([255, 255, 255]),
            high: parse_hex(high).unwrap_or([0, 0, 0]),
        }
    }
}

impl ColorInterpolator for LinearRamp {
    fn interpolate(&self, t: f32) -> String {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let channel = |i: usize| {
            let lo = self.low[i] as f32;
            let hi = self.high[i] as f32;
            (lo + (hi - lo) * t).round() as u8
        };
        format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
    }
}

pub fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|ch| [ch, ch]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let value = u32::from_str_radix(&expanded, 16).ok()?;
    Some([(value >> 16) as u8, (value >> 8) as u8, value as u8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_accepts_short_and_long_forms() {
        assert_eq!(parse_hex("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex("#08306B"), Some([8, 48, 107]));
        assert_eq!(parse_hex("blue"), None);
    }

    #[test]
    fn ramp_hits_endpoints_and_clamps() {
        let ramp = LinearRamp::new("#000000", "#ffffff");
        assert_eq!(ramp.interpolate(0.0), "#000000");
        assert_eq!(ramp.interpolate(1.0), "#ffffff");
        assert_eq!(ramp.interpolate(2.0), "#ffffff");
        assert_eq!(ramp.interpolate(f32::NAN), "#000000");
    }

    #[test]
    fn category_color_is_stable() {
        let theme = Theme::classic();
        let ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(theme.category_color(&ids, "b"), CATEGORICAL_PALETTE[1]);
        assert_eq!(theme.category_color(&ids, "zz"), theme.category_color(&ids, "zz"));
    }
}
