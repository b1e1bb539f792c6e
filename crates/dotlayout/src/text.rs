use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone)]
pub struct TextStyle {
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

pub const DEFAULT_FONT_NAME: &str = "Times-Roman";
pub const DEFAULT_FONT_SIZE: f64 = 14.0;
pub const DEFAULT_FONT_COLOR: &str = "black";
pub const MIN_FONT_SIZE: f64 = 1.0;

/// Character-cell text estimate: every column of `unicode-width` counts as
/// `char_width_factor` ems.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    pub fn text_lines(text: &str) -> Vec<&str> {
        text.split('\n').collect()
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let lines = Self::text_lines(text);
        let font_size = style.font_size.max(MIN_FONT_SIZE);
        let columns = lines.iter().map(|l| l.width()).max().unwrap_or(0);

        TextMetrics {
            width: columns as f64 * font_size * char_width_factor,
            height: lines.len() as f64 * font_size * line_height_factor,
            line_count: lines.len(),
        }
    }
}

/// Names substituted into label escapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelContext<'a> {
    pub graph: &'a str,
    pub node: Option<&'a str>,
    pub tail: Option<&'a str>,
    pub head: Option<&'a str>,
    pub directed: bool,
}

/// Expands Graphviz label escapes.
///
/// `\N`, `\G`, `\T`, `\H` and `\E` become object names; `\n`, `\l` and `\r` all end a line
/// (the result uses `'\n'`); any other escaped character stands for itself. A trailing line
/// break does not open an empty last line.
pub fn expand_label(template: &str, cx: &LabelContext<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            'N' => out.push_str(cx.node.unwrap_or_default()),
            'G' => out.push_str(cx.graph),
            'T' => out.push_str(cx.tail.unwrap_or_default()),
            'H' => out.push_str(cx.head.unwrap_or_default()),
            'E' => {
                if let (Some(t), Some(h)) = (cx.tail, cx.head) {
                    out.push_str(t);
                    out.push_str(if cx.directed { "->" } else { "--" });
                    out.push_str(h);
                }
            }
            'n' | 'l' | 'r' => {
                if chars.peek().is_some() {
                    out.push('\n');
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_uses_widest_line() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle {
            font_family: None,
            font_size: 10.0,
        };
        let metrics = m.measure("ab\nabcd", &style);
        assert_eq!(metrics.line_count, 2);
        assert!((metrics.width - 24.0).abs() < 1e-9);
        assert!((metrics.height - 24.0).abs() < 1e-9);
    }

    #[test]
    fn wide_characters_take_two_cells() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle::default();
        let narrow = m.measure("ab", &style);
        let wide = m.measure("日本", &style);
        assert!((wide.width - 2.0 * narrow.width).abs() < 1e-9);
    }

    #[test]
    fn escapes_expand_object_names() {
        let cx = LabelContext {
            graph: "G",
            node: None,
            tail: Some("a"),
            head: Some("b"),
            directed: true,
        };
        assert_eq!(expand_label("\\E in \\G", &cx), "a->b in G");
        assert_eq!(expand_label("\\T\\n\\H\\l", &cx), "a\nb");
        assert_eq!(expand_label("say \\\"hi\\\"", &cx), "say \"hi\"");

        let cx = LabelContext {
            graph: "G",
            node: Some("n1"),
            ..LabelContext::default()
        };
        assert_eq!(expand_label("\\N", &cx), "n1");
    }
}
