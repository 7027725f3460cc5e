use crate::config::TextFitConfig;
use regex::RegexBuilder;

const ELLIPSIS: &str = "...";

/// Result of fitting a label into a width-limited box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFit {
    pub lines: Vec<String>,
    pub is_truncated: bool,
}

/// Character budget per line for `available_width` at `font_size`.
pub fn approx_chars_per_line(available_width: f32, font_size: f32, config: &TextFitConfig) -> usize {
    let char_width = font_size * config.char_width_factor;
    if char_width <= 0.0 || !available_width.is_finite() {
        return 0;
    }
    (available_width / char_width).floor().max(0.0) as usize
}

/// Whether any label text is worth drawing in `available_width`.
pub fn should_display_text(available_width: f32, font_size: f32, config: &TextFitConfig) -> bool {
    approx_chars_per_line(available_width, font_size, config) >= config.min_chars_per_line
}

/// Splits `text` into at most `max_lines` lines of roughly equal character
/// budget.
///
/// Breaks prefer the first separator from `config.separators` that occurs in
/// the text. The separator stays attached to the start of the fragment that
/// follows it, so joining the lines of an untruncated fit gives back `text`.
/// Fragments longer than a line are hard-broken. Overflow is marked with a
/// trailing ellipsis on the last kept line.
pub fn intelligent_text_split(
    text: &str,
    available_width: f32,
    font_size: f32,
    max_lines: usize,
    config: &TextFitConfig,
) -> TextFit {
    let budget = approx_chars_per_line(available_width, font_size, config).max(1);
    let max_lines = max_lines.max(1);
    if text.chars().count() <= budget {
        return TextFit {
            lines: vec![text.to_string()],
            is_truncated: false,
        };
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for fragment in fragments(text, &config.separators) {
        let fragment_len = fragment.chars().count();
        if current.chars().count() + fragment_len <= budget {
            current.push_str(fragment);
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        let chars: Vec<char> = fragment.chars().collect();
        let mut chunks = chars.chunks(budget).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                lines.push(piece);
            } else {
                current = piece;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let is_truncated = lines.len() > max_lines;
    if is_truncated {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = with_ellipsis(last);
        }
    }
    TextFit {
        lines,
        is_truncated,
    }
}

fn fragments<'a>(text: &'a str, separators: &[char]) -> Vec<&'a str> {
    let Some(separator) = separators.iter().copied().find(|sep| text.contains(*sep)) else {
        return vec![text];
    };
    let mut out = Vec::new();
    let mut start = 0;
    for (index, _) in text.match_indices(separator) {
        if index > start {
            out.push(&text[start..index]);
        }
        start = index;
    }
    out.push(&text[start..]);
    out
}

fn with_ellipsis(line: &str) -> String {
    let count = line.chars().count();
    if count > ELLIPSIS.len() {
        let kept: String = line.chars().take(count - ELLIPSIS.len()).collect();
        format!("{kept}{ELLIPSIS}")
    } else {
        format!("{line}{ELLIPSIS}")
    }
}

/// Vertical shift that centres `line_count` lines on the anchor.
pub fn multi_line_offset(line_count: usize, line_height: f32) -> f32 {
    line_count.saturating_sub(1) as f32 * line_height / 2.0
}

/// `text` cut to `max_chars` characters including the ellipsis.
pub fn truncate_string(text: &str, max_chars: usize, ellipsis: &str) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let room = max_chars.saturating_sub(ellipsis.chars().count());
    let kept: String = text.chars().take(room).collect();
    format!("{kept}{ellipsis}")
}

/// A run of label text, flagged when it matches the search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub matched: bool,
}

/// Splits `text` around case-insensitive literal matches of `query`.
pub fn highlight_segments(text: &str, query: &str) -> Vec<TextSegment> {
    let unmatched = || {
        vec![TextSegment {
            text: text.to_string(),
            matched: false,
        }]
    };
    if query.trim().is_empty() {
        return unmatched();
    }
    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return unmatched();
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            segments.push(TextSegment {
                text: text[cursor..found.start()].to_string(),
                matched: false,
            });
        }
        segments.push(TextSegment {
            text: found.as_str().to_string(),
            matched: true,
        });
        cursor = found.end();
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(TextSegment {
            text: text[cursor..].to_string(),
            matched: false,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(text: &str, width: f32, max_lines: usize) -> TextFit {
        // font 10 * 0.6 = 6px per char
        intelligent_text_split(text, width, 10.0, max_lines, &TextFitConfig::default())
    }

    #[test]
    fn short_text_is_returned_unchanged() {
        let result = fit("age", 60.0, 3);
        assert_eq!(result.lines, vec!["age"]);
        assert!(!result.is_truncated);
    }

    #[test]
    fn splits_on_first_present_separator() {
        let result = fit("patient_age-group", 60.0, 3);
        // 10 chars per line; '_' wins over '-'
        assert_eq!(result.lines, vec!["patient", "_age-group"]);
        assert_eq!(result.lines.concat(), "patient_age-group");
        assert!(!result.is_truncated);
    }

    #[test]
    fn packs_small_fragments_together() {
        let result = fit("a.b.c.d.e.f", 36.0, 3);
        assert_eq!(result.lines, vec!["a.b.c", ".d.e.f"]);
    }

    #[test]
    fn long_fragment_is_hard_broken() {
        let result = fit("abcdefghijkl", 30.0, 5);
        assert_eq!(result.lines, vec!["abcde", "fghij", "kl"]);
        assert!(!result.is_truncated);
    }

    #[test]
    fn overflow_gets_an_ellipsis() {
        let result = fit("first_second_third_fourth", 42.0, 2);
        assert!(result.is_truncated);
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.lines[0], "first");
        assert_eq!(result.lines[1], "_sec...");
    }

    #[test]
    fn tiny_last_line_gets_ellipsis_appended() {
        let result = fit("ab_cd_ef", 18.0, 2);
        assert!(result.is_truncated);
        assert_eq!(result.lines, vec!["ab", "_cd..."]);
    }

    #[test]
    fn splitting_is_pure() {
        let first = fit("measurement/unit/scale_value", 48.0, 3);
        let second = fit("measurement/unit/scale_value", 48.0, 3);
        assert_eq!(first, second);
    }

    #[test]
    fn display_guard_uses_min_chars() {
        let config = TextFitConfig::default();
        assert!(!should_display_text(12.0, 10.0, &config));
        assert!(should_display_text(18.0, 10.0, &config));
    }

    #[test]
    fn helpers() {
        assert_eq!(multi_line_offset(3, 14.0), 14.0);
        assert_eq!(multi_line_offset(0, 14.0), 0.0);
        assert_eq!(truncate_string("category_name", 8, "..."), "categ...");
        assert_eq!(truncate_string("short", 8, "..."), "short");
    }

    #[test]
    fn highlight_is_literal_and_case_insensitive() {
        let segments = highlight_segments("Patient.Age (years)", "age (");
        let matched: Vec<_> = segments.iter().filter(|s| s.matched).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].text, "Age (");
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, "Patient.Age (years)");
    }

    #[test]
    fn empty_query_yields_one_run() {
        let segments = highlight_segments("name", "");
        assert_eq!(segments.len(), 1);
        assert!(!segments[0].matched);
    }
}
