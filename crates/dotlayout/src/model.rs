//! Post-layout records attached to graphs, nodes and edges.

use crate::geom::{BoundingBox, Point, Size};
use crate::shapes::ShapeDesc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLayout {
    pub bb: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    /// Center of the node.
    pub coord: Point,
    /// Node size in points, peripheries included.
    pub size: Size,
    pub shape: ShapeDesc,
    pub shape_info: ShapeInfo,
    pub label: Option<TextLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeInfo {
    Polygon(Polygon),
    Record(Vec<RecordField>),
}

/// Vertex rings of a polygon-family shape.
///
/// Vertices are relative to the node center. `vertices` holds `max(peripheries, 1)` rings of
/// `sides` points each; ellipses use `sides == 2` (lower-left and upper-right corners).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub regular: bool,
    pub peripheries: usize,
    pub sides: usize,
    pub orientation: f64,
    pub distortion: f64,
    pub skew: f64,
    pub vertices: Vec<Point>,
}

impl Polygon {
    /// Rings in inner-to-outer order; only the first `peripheries` rings are drawn.
    pub fn rings(&self) -> impl Iterator<Item = &[Point]> {
        self.vertices.chunks(self.sides.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordField {
    pub text: String,
    /// Field box relative to the node center.
    pub bb: BoundingBox,
}

/// One Bézier segment of an edge spline chain.
///
/// `points` holds `3k + 1` control points. `start`/`end` carry the literal end points of the
/// straight connectors drawn before/after the curve (arrow tips).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bezier {
    pub points: Vec<Point>,
    pub start: Option<Point>,
    pub end: Option<Point>,
}

impl Bezier {
    pub fn is_well_formed(&self) -> bool {
        self.points.len() % 3 == 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLayout {
    pub splines: Vec<Bezier>,
    pub label: Option<TextLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub text: String,
    pub fontname: String,
    /// Font size in points.
    pub fontsize: f64,
    pub fontcolor: String,
    /// Center of the label when the layout placed it explicitly.
    pub pos: Option<Point>,
    /// `'t'`, `'b'` or `'c'`.
    pub valign: char,
    /// Text extent plus padding.
    pub dimen: Size,
    /// Area the text is aligned within.
    pub space: Size,
}
