//! Shape name classification.

/// Renderable family of a node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeFamily {
    Polygon,
    Ellipse,
    /// Recognized, but not drawn.
    Record,
    Unsupported,
}

const POLYGON_SHAPES: &[&str] = &[
    "rectangle",
    "box",
    "square",
    "polygon",
    "diamond",
    "star",
    "rect",
    "triangle",
    "trapezium",
    "parallelogram",
    "house",
    "pentagon",
    "hexagon",
    "septagon",
    "octagon",
    "doubleoctagon",
    "tripleoctagon",
    "invtriangle",
    "invtrapezium",
    "invhouse",
    "Mdiamond",
    "Msquare",
    "note",
];

const ELLIPSE_SHAPES: &[&str] = &["ellipse", "circle", "oval"];

const RECORD_SHAPES: &[&str] = &["record", "Mrecord"];

/// Exact-match lookup of a shape descriptor name. Unknown names are logged and reported as
/// [`ShapeFamily::Unsupported`].
pub fn classify(shape_name: &str) -> ShapeFamily {
    if POLYGON_SHAPES.contains(&shape_name) {
        ShapeFamily::Polygon
    } else if ELLIPSE_SHAPES.contains(&shape_name) {
        ShapeFamily::Ellipse
    } else if RECORD_SHAPES.contains(&shape_name) {
        ShapeFamily::Record
    } else {
        tracing::warn!(shape = shape_name, "unsupported shape type");
        ShapeFamily::Unsupported
    }
}
