//! Node outlines.
//!
//! Shape vertices are relative to the node center, which is also the origin of the node item's
//! local coordinate system, so they are used as they are.

use crate::shape::{ShapeFamily, classify};
use dotlayout::{NodeLayout, Polygon, ShapeInfo};
use kurbo::{BezPath, Ellipse, Point, Rect, Shape};

/// Flattening tolerance used when converting ellipses to Bézier paths.
const ELLIPSE_TOLERANCE: f64 = 0.1;

/// The drawn rings of `poly`, each optionally closed by repeating its first vertex.
///
/// Only the first `peripheries` rings are returned, so a polygon with zero peripheries has
/// none.
pub fn polygon_rings(poly: &Polygon, close: bool) -> Vec<Vec<Point>> {
    if poly.sides == 0 {
        return Vec::new();
    }
    poly.rings()
        .take(poly.peripheries)
        .filter(|ring| ring.len() == poly.sides)
        .map(|ring| {
            let mut pts: Vec<Point> = ring.iter().map(|v| Point::new(v.x, v.y)).collect();
            if close {
                if let Some(&first) = pts.first() {
                    pts.push(first);
                }
            }
            pts
        })
        .collect()
}

fn add_polygon(path: &mut BezPath, pts: &[Point]) {
    let Some((&first, rest)) = pts.split_first() else {
        return;
    };
    path.move_to(first);
    for &p in rest {
        path.line_to(p);
    }
}

/// Builds the outline of a laid-out node in node-local coordinates.
///
/// Records, unsupported shapes and malformed ellipse descriptors produce an empty path.
pub fn node_path(layout: &NodeLayout) -> BezPath {
    let mut path = BezPath::new();
    let ShapeInfo::Polygon(poly) = &layout.shape_info else {
        if classify(&layout.shape.name) != ShapeFamily::Record {
            tracing::warn!(shape = %layout.shape.name, "node has no polygon data");
        }
        return path;
    };

    match classify(&layout.shape.name) {
        ShapeFamily::Polygon => {
            for ring in polygon_rings(poly, true) {
                add_polygon(&mut path, &ring);
                path.close_path();
            }
        }
        ShapeFamily::Ellipse => {
            if let Some(ring) = polygon_rings(poly, false).first() {
                if let [a, b] = ring.as_slice() {
                    let ellipse = Ellipse::from_rect(Rect::from_points(*a, *b).abs());
                    path.extend(ellipse.path_elements(ELLIPSE_TOLERANCE));
                } else {
                    tracing::warn!(
                        vertices = ring.len(),
                        "ellipse descriptor must have exactly two vertices"
                    );
                }
            }
        }
        ShapeFamily::Record | ShapeFamily::Unsupported => {}
    }
    path
}
