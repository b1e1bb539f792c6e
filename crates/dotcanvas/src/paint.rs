//! Painting surfaces.
//!
//! Items paint in their local coordinates between [`Painter::begin_item`] and
//! [`Painter::end_item`]; the background is painted in scene coordinates.

use crate::font::Font;
use crate::item::ColorizeEffect;
use crate::label::TextRun;
use crate::style::{Color, Pen};
use kurbo::{BezPath, Line, Rect, Vec2};
use std::fmt::Write as _;

pub trait Painter {
    /// Starts an item whose local origin is at `offset` in the scene.
    fn begin_item(&mut self, offset: Vec2, effect: Option<&ColorizeEffect>);
    fn end_item(&mut self);

    fn draw_path(&mut self, path: &BezPath, pen: Option<&Pen>, fill: Option<Color>);
    fn draw_line(&mut self, line: Line, pen: &Pen);
    fn draw_rect(&mut self, rect: Rect, pen: &Pen);
    fn draw_text(&mut self, run: &TextRun, font: &Font, fill: Color, pen: Option<&Pen>);
}

fn fmt(v: f64) -> String {
    let v = if v.abs() < 1e-9 { 0.0 } else { v };
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn stroke_attrs(pen: Option<&Pen>) -> String {
    let Some(pen) = pen else {
        return r#" stroke="none""#.to_string();
    };
    let mut out = format!(
        r#" stroke="{}" stroke-width="{}""#,
        pen.color.to_hex(),
        fmt(pen.width)
    );
    if pen.color.a != 255 {
        let _ = write!(&mut out, r#" stroke-opacity="{}""#, fmt(pen.color.opacity()));
    }
    if let Some(dash) = pen.dash.pattern() {
        let _ = write!(&mut out, r#" stroke-dasharray="{dash}""#);
    }
    out
}

fn fill_attrs(fill: Option<Color>) -> String {
    match fill {
        Some(c) if !c.is_transparent() => {
            let mut out = format!(r#" fill="{}""#, c.to_hex());
            if c.a != 255 {
                let _ = write!(&mut out, r#" fill-opacity="{}""#, fmt(c.opacity()));
            }
            out
        }
        _ => r#" fill="none""#.to_string(),
    }
}

/// Serializes painted content into a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgPainter {
    view_box: Rect,
    body: String,
    effects: Vec<ColorizeEffect>,
}

impl SvgPainter {
    pub fn new(view_box: Rect) -> Self {
        Self {
            view_box,
            body: String::new(),
            effects: Vec::new(),
        }
    }

    fn filter_id(&mut self, effect: &ColorizeEffect) -> String {
        let index = match self.effects.iter().position(|e| e == effect) {
            Some(i) => i,
            None => {
                self.effects.push(*effect);
                self.effects.len() - 1
            }
        };
        format!("colorize-{index}")
    }

    fn defs(&self) -> String {
        if self.effects.is_empty() {
            return String::new();
        }
        let mut out = String::from("<defs>");
        for (i, e) in self.effects.iter().enumerate() {
            // Luminance of the source mixed with the tint color by `strength`.
            let s = e.strength.clamp(0.0, 1.0);
            let keep = 1.0 - s;
            let row = |c: u8, own: usize| {
                let mut coeffs = [0.2126 * s, 0.7152 * s, 0.0722 * s];
                for v in &mut coeffs {
                    *v *= f64::from(c) / 255.0;
                }
                coeffs[own] += keep;
                format!("{} {} {} 0 0", fmt(coeffs[0]), fmt(coeffs[1]), fmt(coeffs[2]))
            };
            let _ = write!(
                &mut out,
                r#"<filter id="colorize-{i}"><feColorMatrix type="matrix" values="{} {} {} 0 0 0 1 0"/></filter>"#,
                row(e.color.r, 0),
                row(e.color.g, 1),
                row(e.color.b, 2),
            );
        }
        out.push_str("</defs>");
        out
    }

    /// Finishes the document.
    pub fn finish(self) -> String {
        let r = self.view_box;
        let mut out = String::new();
        let _ = write!(
            &mut out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
            fmt(r.x0),
            fmt(r.y0),
            fmt(r.width()),
            fmt(r.height()),
            fmt(r.width()),
            fmt(r.height()),
        );
        out.push_str(&self.defs());
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

impl Painter for SvgPainter {
    fn begin_item(&mut self, offset: Vec2, effect: Option<&ColorizeEffect>) {
        let _ = write!(
            &mut self.body,
            r#"<g transform="translate({} {})""#,
            fmt(offset.x),
            fmt(offset.y)
        );
        if let Some(effect) = effect {
            let id = self.filter_id(effect);
            let _ = write!(&mut self.body, r#" filter="url(#{id})""#);
        }
        self.body.push('>');
    }

    fn end_item(&mut self) {
        self.body.push_str("</g>");
    }

    fn draw_path(&mut self, path: &BezPath, pen: Option<&Pen>, fill: Option<Color>) {
        if path.elements().is_empty() {
            return;
        }
        let _ = write!(
            &mut self.body,
            r#"<path d="{}"{}{}/>"#,
            path.to_svg(),
            fill_attrs(fill),
            stroke_attrs(pen)
        );
    }

    fn draw_line(&mut self, line: Line, pen: &Pen) {
        let _ = write!(
            &mut self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
            fmt(line.p0.x),
            fmt(line.p0.y),
            fmt(line.p1.x),
            fmt(line.p1.y),
            stroke_attrs(Some(pen))
        );
    }

    fn draw_rect(&mut self, rect: Rect, pen: &Pen) {
        let _ = write!(
            &mut self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none"{}/>"#,
            fmt(rect.x0),
            fmt(rect.y0),
            fmt(rect.width()),
            fmt(rect.height()),
            stroke_attrs(Some(pen))
        );
    }

    fn draw_text(&mut self, run: &TextRun, font: &Font, fill: Color, pen: Option<&Pen>) {
        if run.text.is_empty() {
            return;
        }
        let _ = write!(
            &mut self.body,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}"{}{}>{}</text>"#,
            fmt(run.origin.x),
            fmt(run.origin.y),
            escape_xml(&font.family),
            fmt(font.pixel_size),
            fill_attrs(Some(fill)),
            stroke_attrs(pen),
            escape_xml(&run.text)
        );
    }
}
