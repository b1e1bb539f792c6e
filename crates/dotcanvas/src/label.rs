//! Label placement.
//!
//! A label's text box is aligned inside its space rectangle (always centered horizontally),
//! then moved so its center sits on the label center. Text is emitted as one baseline-anchored
//! run per line, plus the glyph outlines of every run; the last line sits on the box bottom
//! raised by the font descent.

use crate::font::{Font, FontMetrics};
use crate::geometry::to_display;
use crate::style::{Color, resolve_color};
use dotlayout::TextLabel;
use kurbo::{Affine, BezPath, Point, Rect, Shape, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    Bottom,
    #[default]
    Center,
}

impl VAlign {
    /// `'t'` and `'b'` select top and bottom; anything else centers.
    pub fn from_char(c: char) -> Self {
        match c {
            't' => VAlign::Top,
            'b' => VAlign::Bottom,
            _ => VAlign::Center,
        }
    }
}

/// One line of text; `origin` is the left end of its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub text: String,
    pub font: Font,
    /// Size from the layout engine, in points.
    pub point_size: f64,
    pub color: Color,
    pub valign: VAlign,
    /// Text box after centering on the label center.
    pub rect: Rect,
    pub runs: Vec<TextRun>,
    /// Glyph outlines of all runs, anchored on their baselines.
    pub glyphs: BezPath,
}

impl LabelLayout {
    /// Text box as a path.
    pub fn outline(&self) -> BezPath {
        self.rect.to_path(0.1)
    }

    pub(crate) fn translate(&mut self, by: Vec2) {
        self.rect = self.rect + by;
        for run in &mut self.runs {
            run.origin += by;
        }
        self.glyphs.apply_affine(Affine::translate(by));
    }
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
}

/// Box of `text` aligned within `space`: centered horizontally, vertically per `valign`.
pub fn text_bounding_rect(
    metrics: &dyn FontMetrics,
    font: &Font,
    space: Rect,
    valign: VAlign,
    text: &str,
) -> Rect {
    let width = lines(text)
        .map(|l| metrics.advance(font, l))
        .fold(0.0, f64::max);
    let height = lines(text).count() as f64 * metrics.line_spacing(font);

    let x = space.x0 + (space.width() - width) / 2.0;
    let y = match valign {
        VAlign::Top => space.y0,
        VAlign::Bottom => space.y1 - height,
        VAlign::Center => space.y0 + (space.height() - height) / 2.0,
    };
    Rect::new(x, y, x + width, y + height)
}

fn baseline_runs(metrics: &dyn FontMetrics, font: &Font, rect: Rect, text: &str) -> Vec<TextRun> {
    let all: Vec<&str> = lines(text).collect();
    let spacing = metrics.line_spacing(font);
    let last_baseline = rect.y1 - metrics.descent(font);
    let center_x = rect.center().x;
    all.iter()
        .enumerate()
        .map(|(i, line)| {
            let above = (all.len() - 1 - i) as f64;
            TextRun {
                text: (*line).to_string(),
                origin: Point::new(
                    center_x - metrics.advance(font, line) / 2.0,
                    last_baseline - above * spacing,
                ),
            }
        })
        .collect()
}

/// Places `label` in display coordinates.
///
/// A label without an explicit position is centered on the origin, which for node labels is
/// the node center in item-local coordinates.
pub fn layout_label(
    label: &TextLabel,
    graph_height: f64,
    dpi: f64,
    metrics: &dyn FontMetrics,
) -> LabelLayout {
    let center = label
        .pos
        .map(|p| to_display(p, graph_height))
        .unwrap_or(Point::ZERO);
    let font = Font::from_points(label.fontname.clone(), label.fontsize, dpi);
    let valign = VAlign::from_char(label.valign);
    let space = Rect::new(0.0, 0.0, label.space.width, label.space.height);

    let rect = text_bounding_rect(metrics, &font, space, valign, &label.text);
    let rect = Rect::from_center_size(center, rect.size());
    let runs = baseline_runs(metrics, &font, rect, &label.text);
    let mut glyphs = BezPath::new();
    for run in &runs {
        let path = metrics.glyph_path(&font, &run.text, run.origin);
        glyphs.extend(path.elements().iter().copied());
    }

    LabelLayout {
        text: label.text.clone(),
        color: resolve_color(Some(&label.fontcolor), Color::BLACK),
        point_size: label.fontsize,
        font,
        valign,
        rect,
        runs,
        glyphs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::DeterministicFontMetrics;
    use dotlayout::geom::{point, size};

    fn font() -> Font {
        Font {
            family: "Times-Roman".to_string(),
            pixel_size: 10.0,
        }
    }

    fn text_label(text: &str, pos: Option<dotlayout::Point>, valign: char) -> TextLabel {
        TextLabel {
            text: text.to_string(),
            fontname: "Times-Roman".to_string(),
            fontsize: 10.0,
            fontcolor: "red".to_string(),
            pos,
            valign,
            dimen: size(40.0, 20.0),
            space: size(40.0, 20.0),
        }
    }

    #[test]
    fn bottom_alignment_touches_the_space_bottom() {
        let m = DeterministicFontMetrics::default();
        let space = Rect::new(0.0, 0.0, 100.0, 50.0);
        let r = text_bounding_rect(&m, &font(), space, VAlign::Bottom, "abc");
        assert_eq!(r.y1, 50.0);
        assert_eq!(r.center().x, 50.0);

        let r = text_bounding_rect(&m, &font(), space, VAlign::Top, "abc");
        assert_eq!(r.y0, 0.0);
    }

    #[test]
    fn valign_defaults_to_center() {
        assert_eq!(VAlign::from_char('c'), VAlign::Center);
        assert_eq!(VAlign::from_char('x'), VAlign::Center);
        let m = DeterministicFontMetrics::default();
        let space = Rect::new(0.0, 0.0, 100.0, 50.0);
        let r = text_bounding_rect(&m, &font(), space, VAlign::Center, "abc");
        assert!((r.center().y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn unset_position_centers_on_the_origin() {
        let m = DeterministicFontMetrics::default();
        let l = layout_label(&text_label("hello", None, 'c'), 100.0, 72.0, &m);
        assert!((l.rect.center().x).abs() < 1e-9);
        assert!((l.rect.center().y).abs() < 1e-9);
        assert_eq!(l.color, Color::rgb(255, 0, 0));
        assert_eq!(l.font.pixel_size, 10.0);
    }

    #[test]
    fn explicit_position_is_flipped() {
        let m = DeterministicFontMetrics::default();
        let l = layout_label(&text_label("hi", Some(point(30.0, 20.0)), 'c'), 100.0, 72.0, &m);
        assert!((l.rect.center() - Point::new(30.0, 80.0)).hypot() < 1e-9);
    }

    #[test]
    fn runs_sit_on_baselines() {
        let m = DeterministicFontMetrics::default();
        let l = layout_label(&text_label("one\ntwo", None, 'c'), 100.0, 72.0, &m);
        assert_eq!(l.runs.len(), 2);
        let last = &l.runs[1];
        assert!((last.origin.y - (l.rect.y1 - 2.0)).abs() < 1e-9);
        assert!((l.runs[0].origin.y - (last.origin.y - 12.0)).abs() < 1e-9);
        assert!((last.origin.x - l.rect.x0).abs() < 1e-9);
    }

    #[test]
    fn glyph_path_sits_on_the_text_baseline() {
        let m = DeterministicFontMetrics::default();
        let mut l = layout_label(&text_label("ab", Some(point(30.0, 20.0)), 'c'), 100.0, 72.0, &m);
        let glyphs = l.glyphs.bounding_box();
        let baseline = l.rect.y1 - m.descent(&l.font);
        assert!((glyphs.y1 - baseline).abs() < 1e-9);
        assert!((glyphs.y0 - (baseline - m.ascent(&l.font))).abs() < 1e-9);
        assert!(l.rect.contains(glyphs.center()));

        l.translate(Vec2::new(-30.0, -80.0));
        let moved = l.glyphs.bounding_box();
        assert!((moved.y1 - (baseline - 80.0)).abs() < 1e-9);
        assert!((moved.x0 - (glyphs.x0 - 30.0)).abs() < 1e-9);
    }
}
