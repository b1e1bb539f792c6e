//! Font metrics and glyph outlines from installed fonts.
//!
//! Text is shaped with `parley`; glyph outlines are read from the shaped run's font with
//! `skrifa`. When no font resolves (for example on a headless machine without fonts) every
//! query falls back to [`DeterministicFontMetrics`].

use crate::font::{DeterministicFontMetrics, Font, FontMetrics};
use kurbo::{BezPath, Point, Vec2};
use parley::layout::{Layout, PositionedLayoutItem};
use parley::{FontContext, FontStack, LayoutContext, StyleProperty};
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::{FontRef, GlyphId, MetadataProvider};
use std::sync::Mutex;

/// Shaped for vertical metrics: one ascender and one descender.
const METRICS_SAMPLE: &str = "Hg";

struct Contexts {
    fonts: FontContext,
    layouts: LayoutContext<()>,
}

pub struct SystemFontMetrics {
    contexts: Mutex<Contexts>,
    fallback: DeterministicFontMetrics,
}

impl std::fmt::Debug for SystemFontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFontMetrics")
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl Default for SystemFontMetrics {
    fn default() -> Self {
        Self::new(DeterministicFontMetrics::default())
    }
}

impl SystemFontMetrics {
    pub fn new(fallback: DeterministicFontMetrics) -> Self {
        Self {
            contexts: Mutex::new(Contexts {
                fonts: FontContext::new(),
                layouts: LayoutContext::new(),
            }),
            fallback,
        }
    }

    /// Shapes one line of `text`; `None` when nothing resolved to a glyph.
    fn shape(&self, font: &Font, text: &str) -> Option<Layout<()>> {
        if text.is_empty() {
            return None;
        }
        let mut guard = self.contexts.lock().ok()?;
        let Contexts { fonts, layouts } = &mut *guard;
        let mut builder = layouts.ranged_builder(fonts, text, 1.0, true);
        builder.push_default(StyleProperty::FontSize(font.pixel_size as f32));
        builder.push_default(StyleProperty::FontStack(FontStack::Source(
            font.family.as_str().into(),
        )));
        let mut layout = builder.build(text);
        layout.break_all_lines(None);

        let shaped = layout.lines().any(|line| {
            line.items().any(|item| match item {
                PositionedLayoutItem::GlyphRun(run) => run.glyphs().next().is_some(),
                _ => false,
            })
        });
        shaped.then_some(layout)
    }

    fn first_line_metric(
        &self,
        font: &Font,
        text: &str,
        metric: impl Fn(&parley::layout::LineMetrics) -> f32,
    ) -> Option<f64> {
        let layout = self.shape(font, text)?;
        let line = layout.lines().next()?;
        Some(f64::from(metric(line.metrics())))
    }
}

impl FontMetrics for SystemFontMetrics {
    fn ascent(&self, font: &Font) -> f64 {
        self.first_line_metric(font, METRICS_SAMPLE, |m| m.ascent)
            .unwrap_or_else(|| self.fallback.ascent(font))
    }

    fn descent(&self, font: &Font) -> f64 {
        self.first_line_metric(font, METRICS_SAMPLE, |m| m.descent)
            .unwrap_or_else(|| self.fallback.descent(font))
    }

    fn line_spacing(&self, font: &Font) -> f64 {
        self.first_line_metric(font, METRICS_SAMPLE, |m| m.line_height)
            .unwrap_or_else(|| self.fallback.line_spacing(font))
    }

    fn advance(&self, font: &Font, text: &str) -> f64 {
        match self.shape(font, text) {
            Some(layout) => f64::from(layout.width()),
            None => self.fallback.advance(font, text),
        }
    }

    fn glyph_path(&self, font: &Font, text: &str, origin: Point) -> BezPath {
        let Some(layout) = self.shape(font, text) else {
            return self.fallback.glyph_path(font, text, origin);
        };
        let Some(first_baseline) = layout.lines().next().map(|l| l.metrics().baseline) else {
            return BezPath::new();
        };

        let mut path = BezPath::new();
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline() - first_baseline;
                let run = glyph_run.run();
                let data = run.font();
                let Ok(font_ref) = FontRef::from_index(data.data.as_ref(), data.index) else {
                    tracing::debug!(family = %font.family, "shaped font is unreadable");
                    continue;
                };
                let outlines = font_ref.outline_glyphs();
                let size = Size::new(run.font_size());

                for glyph in glyph_run.glyphs() {
                    let at = Vec2::new(f64::from(x + glyph.x), f64::from(y - glyph.y));
                    x += glyph.advance;
                    let Some(outline) = outlines.get(GlyphId::new(glyph.id)) else {
                        continue;
                    };
                    let mut pen = PathPen {
                        path: &mut path,
                        origin: origin + at,
                    };
                    let settings = DrawSettings::unhinted(size, LocationRef::default());
                    if let Err(err) = outline.draw(settings, &mut pen) {
                        tracing::debug!(?err, glyph = glyph.id, "glyph outline failed");
                    }
                }
            }
        }
        path
    }
}

/// Appends font-unit outlines (y up) to a display-space path (y down).
struct PathPen<'a> {
    path: &'a mut BezPath,
    origin: Point,
}

impl PathPen<'_> {
    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(self.origin.x + f64::from(x), self.origin.y - f64::from(y))
    }
}

impl OutlinePen for PathPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (c, p) = (self.point(cx0, cy0), self.point(x, y));
        self.path.quad_to(c, p);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (c0, c1, p) = (self.point(cx0, cy0), self.point(cx1, cy1), self.point(x, y));
        self.path.curve_to(c0, c1, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    fn font() -> Font {
        Font {
            family: "serif".to_string(),
            pixel_size: 20.0,
        }
    }

    #[test]
    fn pen_flips_font_units_onto_the_baseline() {
        let mut path = BezPath::new();
        let mut pen = PathPen {
            path: &mut path,
            origin: Point::new(10.0, 50.0),
        };
        pen.move_to(0.0, 0.0);
        pen.line_to(4.0, 8.0);
        pen.close();
        let bounds = path.bounding_box();
        assert_eq!(bounds.y1, 50.0);
        assert_eq!(bounds.y0, 42.0);
        assert_eq!(bounds.x1, 14.0);
    }

    #[test]
    fn outlines_exist_with_or_without_installed_fonts() {
        let m = SystemFontMetrics::default();
        let origin = Point::new(0.0, 100.0);
        let path = m.glyph_path(&font(), "Ab", origin);
        assert!(!path.elements().is_empty());
        let bounds = path.bounding_box();
        // Ink sits around the baseline, never a full line below it.
        assert!(bounds.y0 < origin.y);
        assert!(bounds.y1 < origin.y + m.line_spacing(&font()));
        assert!(m.advance(&font(), "Ab") > 0.0);
        assert!(m.glyph_path(&font(), "", origin).elements().is_empty());
    }
}
