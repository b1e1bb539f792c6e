//! Layout-space geometry.
//!
//! Layout space follows the Graphviz convention: units are points (1/72 inch) and the origin
//! is the bottom-left corner of the drawing, with `y` growing upward.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSpace {}

pub type Point = euclid::Point2D<f64, LayoutSpace>;
pub type Vector = euclid::Vector2D<f64, LayoutSpace>;
pub type Size = euclid::Size2D<f64, LayoutSpace>;
/// Lower-left (`min`) / upper-right (`max`) box.
pub type BoundingBox = euclid::Box2D<f64, LayoutSpace>;

pub const POINTS_PER_INCH: f64 = 72.0;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

/// Box centered on `center`.
pub fn centered_box(center: Point, size: Size) -> BoundingBox {
    let half = vector(size.width / 2.0, size.height / 2.0);
    BoundingBox::new(center - half, center + half)
}

/// Grows `bb` so that it contains `p`. An empty accumulator adopts `p`.
pub(crate) fn include_point(bb: &mut Option<BoundingBox>, p: Point) {
    *bb = Some(match bb.take() {
        Some(b) => BoundingBox::new(b.min.min(p), b.max.max(p)),
        None => BoundingBox::new(p, p),
    });
}

pub(crate) fn include_box(bb: &mut Option<BoundingBox>, other: BoundingBox) {
    include_point(bb, other.min);
    include_point(bb, other.max);
}
