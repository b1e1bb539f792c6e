//! Fonts, font metrics and display devices.

use dotlayout::{DeterministicTextMeasurer, TextMeasurer, TextStyle};
use kurbo::{BezPath, Point, Rect, Shape};
use serde::{Deserialize, Serialize};

/// Logical DPI used when no display device is available.
pub const FALLBACK_DPI: f64 = 96.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub pixel_size: f64,
}

impl Font {
    /// Font sized for a label of `point_size` points on a device with logical DPI `dpi`.
    pub fn from_points(family: impl Into<String>, point_size: f64, dpi: f64) -> Self {
        Self {
            family: family.into(),
            pixel_size: pixel_size(point_size, dpi),
        }
    }
}

/// `point_size * 72 / dpi`; a non-positive DPI is treated as [`FALLBACK_DPI`].
pub fn pixel_size(point_size: f64, dpi: f64) -> f64 {
    let dpi = if dpi > 0.0 { dpi } else { FALLBACK_DPI };
    point_size * 72.0 / dpi
}

pub trait FontMetrics {
    fn ascent(&self, font: &Font) -> f64;
    fn descent(&self, font: &Font) -> f64;
    /// Distance between consecutive baselines.
    fn line_spacing(&self, font: &Font) -> f64;
    /// Horizontal advance of a single line of text.
    fn advance(&self, font: &Font, text: &str) -> f64;
    /// Glyph outlines of a single line of text in display coordinates (y grows downward),
    /// with the left end of the baseline at `origin`.
    fn glyph_path(&self, font: &Font, text: &str, origin: Point) -> BezPath;
}

/// Fixed-ratio metrics: widths from the layout engine's deterministic text measurer, ascent
/// and descent as fractions of the pixel size.
///
/// Glyphs are drawn as one box per visible character, standing on the baseline and as tall
/// as the ascent.
#[derive(Debug, Clone)]
pub struct DeterministicFontMetrics {
    pub measurer: DeterministicTextMeasurer,
    pub ascent_factor: f64,
    pub descent_factor: f64,
    pub line_height_factor: f64,
}

impl Default for DeterministicFontMetrics {
    fn default() -> Self {
        Self {
            measurer: DeterministicTextMeasurer::default(),
            ascent_factor: 0.8,
            descent_factor: 0.2,
            line_height_factor: 1.2,
        }
    }
}

impl FontMetrics for DeterministicFontMetrics {
    fn ascent(&self, font: &Font) -> f64 {
        font.pixel_size * self.ascent_factor
    }

    fn descent(&self, font: &Font) -> f64 {
        font.pixel_size * self.descent_factor
    }

    fn line_spacing(&self, font: &Font) -> f64 {
        font.pixel_size * self.line_height_factor
    }

    fn advance(&self, font: &Font, text: &str) -> f64 {
        self.measurer
            .measure(
                text,
                &TextStyle {
                    font_family: Some(font.family.clone()),
                    font_size: font.pixel_size,
                },
            )
            .width
    }

    fn glyph_path(&self, font: &Font, text: &str, origin: Point) -> BezPath {
        let top = origin.y - self.ascent(font);
        let mut path = BezPath::new();
        let mut x = origin.x;
        let mut buf = [0u8; 4];
        for c in text.chars() {
            let advance = self.advance(font, c.encode_utf8(&mut buf));
            if !c.is_whitespace() && advance > 0.0 {
                let gap = 0.1 * advance;
                let cell = Rect::new(x + gap, top, x + advance - gap, origin.y);
                path.extend(cell.path_elements(0.1));
            }
            x += advance;
        }
        path
    }
}

/// Surface the scene is shown on.
pub trait DisplayDevice {
    fn logical_dpi_y(&self) -> f64;
}

/// A device with a fixed logical DPI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDpi(pub f64);

impl DisplayDevice for FixedDpi {
    fn logical_dpi_y(&self) -> f64 {
        self.0
    }
}

/// Logical DPI of `device`, or [`FALLBACK_DPI`] without one.
pub fn logical_dpi(device: Option<&dyn DisplayDevice>) -> f64 {
    device
        .map(|d| d.logical_dpi_y())
        .filter(|dpi| *dpi > 0.0)
        .unwrap_or(FALLBACK_DPI)
}
