//! Edge paths and arrowheads.
//!
//! Spline points are in layout space; every point is flipped into display space with the
//! graph height given by the caller.

use super::transform::to_display;
use dotlayout::Bezier;
use kurbo::{BezPath, Line, Point, Vec2};

/// Triangle of a "normal" arrowhead on `line`.
///
/// The base straddles `line.p0` perpendicular to the segment, the apex is `line.p1`. The first
/// point is repeated at the end so the polygon is closed.
pub fn create_normal_arrow(line: Line) -> [Point; 4] {
    const SCALE_FACTOR: f64 = 0.5;

    let d = line.p1 - line.p0;
    let normal = Vec2::new(d.y, -d.x);
    let translation = normal * SCALE_FACTOR;
    let first_and_last = line.p0 + translation;
    [first_and_last, line.p1, line.p0 - translation, first_and_last]
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

fn display_points(b: &Bezier, height: f64) -> Vec<Point> {
    b.points.iter().map(|&p| to_display(p, height)).collect()
}

/// Stitches a spline chain into one path: connectors, arrowheads and cubic segments.
///
/// Segments whose control point count is not `3k + 1` are skipped.
pub fn spline_path(splines: &[Bezier], height: f64) -> BezPath {
    let mut path = BezPath::new();
    for b in splines {
        if !b.is_well_formed() {
            tracing::warn!(points = b.points.len(), "skipping malformed spline segment");
            continue;
        }
        let pts = display_points(b, height);
        let first = pts[0];

        match b.start {
            Some(sp) => {
                let sp = to_display(sp, height);
                path.move_to(sp);
                path.line_to(first);
                add_polygon(&mut path, &create_normal_arrow(Line::new(first, sp)));
                // Resume the curve where the connector ended.
                path.move_to(first);
            }
            None => path.move_to(first),
        }

        for c in pts[1..].chunks_exact(3) {
            path.curve_to(c[0], c[1], c[2]);
        }

        if let Some(ep) = b.end {
            let ep = to_display(ep, height);
            let last = pts[pts.len() - 1];
            path.line_to(ep);
            add_polygon(&mut path, &create_normal_arrow(Line::new(last, ep)));
        }
    }
    path
}

/// Only the arrowheads of a spline chain.
pub fn arrow_path(splines: &[Bezier], height: f64) -> BezPath {
    let mut path = BezPath::new();
    for b in splines.iter().filter(|b| b.is_well_formed()) {
        let pts = display_points(b, height);
        if let Some(sp) = b.start {
            add_polygon(
                &mut path,
                &create_normal_arrow(Line::new(pts[0], to_display(sp, height))),
            );
        }
        if let Some(ep) = b.end {
            add_polygon(
                &mut path,
                &create_normal_arrow(Line::new(pts[pts.len() - 1], to_display(ep, height))),
            );
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotlayout::geom::point;
    use kurbo::{PathEl, Shape};

    #[test]
    fn arrow_is_closed_and_points_at_p1() {
        let arrow = create_normal_arrow(Line::new((0.0, 0.0), (10.0, 0.0)));
        assert_eq!(arrow[0], arrow[3]);
        assert_eq!(arrow[1], Point::new(10.0, 0.0));
        assert_eq!(arrow[0], Point::new(0.0, -5.0));
        assert_eq!(arrow[2], Point::new(0.0, 5.0));
    }

    fn segment(n: usize, y0: f64) -> Bezier {
        Bezier {
            points: (0..n).map(|i| point(i as f64 * 10.0, y0)).collect(),
            start: None,
            end: None,
        }
    }

    fn curves(path: &BezPath) -> usize {
        path.elements()
            .iter()
            .filter(|el| matches!(el, PathEl::CurveTo(..)))
            .count()
    }

    #[test]
    fn one_cubic_per_triple() {
        let path = spline_path(&[segment(7, 10.0)], 100.0);
        assert_eq!(curves(&path), 2);
        assert_eq!(path.elements()[0], PathEl::MoveTo(Point::new(0.0, 90.0)));
    }

    #[test]
    fn malformed_segments_are_skipped() {
        let path = spline_path(&[segment(4, 10.0), segment(5, 20.0), segment(4, 30.0)], 100.0);
        assert_eq!(curves(&path), 2);
        let moves: Vec<_> = path
            .elements()
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) => Some(p.y),
                _ => None,
            })
            .collect();
        assert_eq!(moves, vec![90.0, 70.0]);
    }

    #[test]
    fn end_connector_adds_an_arrowhead() {
        let mut b = segment(4, 50.0);
        b.end = Some(point(40.0, 50.0));
        let path = spline_path(std::slice::from_ref(&b), 100.0);
        let bb = path.bounding_box();
        assert_eq!(bb.x1, 40.0);
        // Arrow half-width is half the connector length.
        assert!((bb.y0 - 45.0).abs() < 1e-9 && (bb.y1 - 55.0).abs() < 1e-9);

        let arrows = arrow_path(&[b], 100.0);
        assert_eq!(arrows.elements().len(), 4);
    }

    #[test]
    fn start_connector_arrow_points_at_the_start() {
        let mut b = segment(4, 50.0);
        for p in &mut b.points {
            p.x += 10.0;
        }
        b.start = Some(point(0.0, 50.0));
        let arrows = arrow_path(&[b], 100.0);
        assert_eq!(arrows.elements()[1], PathEl::LineTo(Point::new(0.0, 50.0)));
    }
}
