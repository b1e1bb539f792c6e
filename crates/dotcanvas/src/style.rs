//! `style` flags, colors and pens.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleFlag {
    Default,
    Filled,
    Invisible,
    Diagonals,
    Rounded,
    Dashed,
    Dotted,
    Solid,
    Bold,
}

impl StyleFlag {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "default" => StyleFlag::Default,
            "filled" => StyleFlag::Filled,
            "invisible" | "invis" => StyleFlag::Invisible,
            "diagonals" => StyleFlag::Diagonals,
            "rounded" => StyleFlag::Rounded,
            "dashed" => StyleFlag::Dashed,
            "dotted" => StyleFlag::Dotted,
            "solid" => StyleFlag::Solid,
            "bold" => StyleFlag::Bold,
            _ => return None,
        })
    }
}

/// Unordered set of style flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSet(FxHashSet<StyleFlag>);

impl StyleSet {
    /// Parses a comma-separated `style` value. Unknown tokens are dropped.
    pub fn parse(value: &str) -> Self {
        Self(
            value
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .filter_map(StyleFlag::from_token)
                .collect(),
        )
    }

    pub fn contains(&self, flag: StyleFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn insert(&mut self, flag: StyleFlag) -> bool {
        self.0.insert(flag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = StyleFlag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<StyleFlag> for StyleSet {
    fn from_iter<I: IntoIterator<Item = StyleFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let h = h.clamp(0.0, 1.0) * 6.0;
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let i = (h.floor() as i32).rem_euclid(6);
        let f = h - h.floor();
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match i {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        let byte = |c: f64| (c * 255.0).round() as u8;
        Color::rgb(byte(r), byte(g), byte(b))
    }
}

impl From<svgtypes::Color> for Color {
    fn from(c: svgtypes::Color) -> Self {
        Color::rgba(c.red, c.green, c.blue, c.alpha)
    }
}

/// Parses a Graphviz color value.
///
/// Accepts CSS/X11 names and `#rrggbb[aa]` (through `svgtypes`), `/scheme/name` (the scheme is
/// ignored), `H,S,V` or `H S V` float triples in `[0, 1]`, and `transparent`.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.eq_ignore_ascii_case("transparent") {
        return Some(Color::TRANSPARENT);
    }
    let name = match value.strip_prefix('/') {
        Some(rest) => rest.rsplit('/').next().unwrap_or(rest),
        None => value,
    };

    if name.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        let parts: Vec<f64> = name
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        return match parts.as_slice() {
            [h, s, v] => Some(Color::from_hsv(*h, *s, *v)),
            _ => None,
        };
    }

    let name = if name.starts_with('#') {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    };
    svgtypes::Color::from_str(&name).ok().map(Color::from)
}

/// Resolves a color attribute, keeping `prior` when the value is empty or unparsable.
pub fn resolve_color(value: Option<&str>, prior: Color) -> Color {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => prior,
        Some(v) => parse_color(v).unwrap_or_else(|| {
            tracing::warn!(color = v, "unparsable color");
            prior
        }),
    }
}

/// Fill color for a node: `fillcolor`, else `color`, else `prior`. Only applies to filled
/// nodes.
pub fn resolve_fill(
    styles: &StyleSet,
    fillcolor: Option<&str>,
    color: Option<&str>,
    prior: Color,
) -> Color {
    if !styles.contains(StyleFlag::Filled) {
        return prior;
    }
    match fillcolor.filter(|v| !v.trim().is_empty()) {
        Some(fill) => resolve_color(Some(fill), prior),
        None => resolve_color(color, prior),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Dash {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl Dash {
    /// SVG `stroke-dasharray` pattern.
    pub fn pattern(self) -> Option<&'static str> {
        match self {
            Dash::Solid => None,
            Dash::Dashed => Some("5,2"),
            Dash::Dotted => Some("1,5"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub color: Color,
    pub width: f64,
    pub dash: Dash,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            dash: Dash::Solid,
        }
    }
}

impl Pen {
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Dash::Solid,
        }
    }

    /// Applies the line-related flags of `styles`.
    pub fn styled(mut self, styles: &StyleSet) -> Self {
        if styles.contains(StyleFlag::Bold) {
            self.width *= 2.0;
        }
        if styles.contains(StyleFlag::Dashed) {
            self.dash = Dash::Dashed;
        } else if styles.contains(StyleFlag::Dotted) {
            self.dash = Dash::Dotted;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tokens_are_ignored() {
        let styles = StyleSet::parse("filled,bold,bogus");
        let expected: StyleSet = [StyleFlag::Filled, StyleFlag::Bold].into_iter().collect();
        assert_eq!(styles, expected);
        assert!(StyleSet::parse("").is_empty());
        assert_eq!(StyleSet::parse(" dashed , ,invis").len(), 2);
    }

    #[test]
    fn fill_prefers_fillcolor_then_color() {
        let filled = StyleSet::parse("filled");
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        assert_eq!(
            resolve_fill(&filled, None, Some("red"), Color::TRANSPARENT),
            red
        );
        assert_eq!(
            resolve_fill(&filled, Some("blue"), Some("red"), Color::TRANSPARENT),
            blue
        );
        assert_eq!(
            resolve_fill(&filled, Some(""), None, Color::TRANSPARENT),
            Color::TRANSPARENT
        );
        assert_eq!(
            resolve_fill(&StyleSet::default(), Some("blue"), None, Color::TRANSPARENT),
            Color::TRANSPARENT
        );
    }

    #[test]
    fn color_forms() {
        assert_eq!(parse_color("Red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("#00ff00"), Some(Color::rgb(0, 255, 0)));
        assert_eq!(parse_color("/x11/blue"), Some(Color::rgb(0, 0, 255)));
        assert_eq!(parse_color("0.0 1.0 1.0"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(parse_color("0.5,0,1"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(parse_color("transparent"), Some(Color::TRANSPARENT));
        assert_eq!(parse_color("not-a-color"), None);
        assert_eq!(parse_color("1,2"), None);
    }

    #[test]
    fn unparsable_colors_keep_the_prior_value() {
        assert_eq!(resolve_color(Some("nope"), Color::BLACK), Color::BLACK);
        assert_eq!(resolve_color(None, Color::BLACK), Color::BLACK);
    }

    #[test]
    fn pens_follow_line_styles() {
        let pen = Pen::default().styled(&StyleSet::parse("bold,dotted"));
        assert_eq!(pen.width, 2.0);
        assert_eq!(pen.dash, Dash::Dotted);
        assert_eq!(Dash::Dashed.pattern(), Some("5,2"));
    }
}
