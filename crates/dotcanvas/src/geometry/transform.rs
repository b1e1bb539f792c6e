//! Layout space to display space.
//!
//! The layout engine puts the origin at the bottom-left corner with `y` growing upward; the
//! display surface puts it at the top-left with `y` growing downward.

use dotlayout::{BoundingBox, Graph};
use kurbo::{Point, Rect};

/// Maps a layout point to display coordinates for a graph of height `graph_height`.
pub fn to_display(p: dotlayout::Point, graph_height: f64) -> Point {
    Point::new(p.x, graph_height - p.y)
}

/// Height of the graph's current bounding box.
pub fn graph_height(graph: &Graph) -> f64 {
    let bb = graph.bounding_box();
    bb.max.y - bb.min.y
}

/// The engine's lower-left/upper-right box as a normalized scene rectangle.
pub fn scene_rect(bb: &BoundingBox) -> Rect {
    Rect::new(bb.min.x, bb.max.y, bb.max.x, bb.min.y).abs()
}
