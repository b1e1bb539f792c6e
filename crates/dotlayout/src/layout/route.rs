//! Edge routing.
//!
//! A route is the polyline through the edge's rank waypoints, clipped against both end node
//! shapes and shortened by the arrow lengths. It is then smoothed into a chain of cubic Bézier
//! segments that passes through every waypoint.

use super::size::{EdgeSpec, SizedNode};
use crate::geom::{Point, Size, Vector, point, vector};
use crate::model::{Bezier, ShapeInfo};
use crate::shapes::ellipse_boundary;

/// Width of a self loop beyond the node, per nesting level.
const LOOP_WIDTH: f64 = 18.0;
/// Distance between parallel edges at their midpoint.
pub(crate) const PARALLEL_SEP: f64 = 12.0;

#[derive(Debug, Clone)]
enum Boundary {
    Rect,
    Ellipse,
    /// Outer ring, relative to the center.
    Polygon(Vec<Point>),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeGeom {
    pub center: Point,
    pub size: Size,
    boundary: Boundary,
}

impl NodeGeom {
    pub(crate) fn new(center: Point, sized: &SizedNode) -> Self {
        let boundary = match &sized.shape_info {
            ShapeInfo::Polygon(p) if p.sides == 2 => Boundary::Ellipse,
            ShapeInfo::Polygon(p) if p.sides >= 3 => {
                let rings = p.peripheries.max(1);
                let start = (rings - 1) * p.sides;
                match p.vertices.get(start..start + p.sides) {
                    Some(ring) => Boundary::Polygon(ring.to_vec()),
                    None => Boundary::Rect,
                }
            }
            _ => Boundary::Rect,
        };
        Self {
            center,
            size: sized.size,
            boundary,
        }
    }

    fn half(&self) -> Size {
        Size::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Point where the ray from the center toward `toward` leaves the node.
    pub(crate) fn clip(&self, toward: Point) -> Point {
        let d = toward - self.center;
        if d.x == 0.0 && d.y == 0.0 {
            return self.center;
        }
        let offset = match &self.boundary {
            Boundary::Rect => intersect_rect(self.half(), d),
            Boundary::Ellipse => {
                let (x, y) = ellipse_boundary(self.half(), d.x, d.y);
                vector(x, y)
            }
            Boundary::Polygon(ring) => {
                intersect_polygon(ring, d).unwrap_or_else(|| intersect_rect(self.half(), d))
            }
        };
        self.center + offset
    }
}

fn intersect_rect(half: Size, d: Vector) -> Vector {
    let (mut w, mut h) = (half.width, half.height);
    if d.y.abs() * w > d.x.abs() * h {
        if d.y < 0.0 {
            h = -h;
        }
        vector(if d.y == 0.0 { 0.0 } else { h * d.x / d.y }, h)
    } else {
        if d.x < 0.0 {
            w = -w;
        }
        vector(w, if d.x == 0.0 { 0.0 } else { w * d.y / d.x })
    }
}

/// Nearest crossing of the ray `t * d` (`t > 0`) with the closed ring.
fn intersect_polygon(ring: &[Point], d: Vector) -> Option<Vector> {
    let mut best: Option<f64> = None;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        let e = b - *a;
        let denom = d.cross(e);
        if denom.abs() < 1e-12 {
            continue;
        }
        let a = a.to_vector();
        // Solve t * d = a + s * e.
        let t = a.cross(e) / denom;
        let s = a.cross(d) / denom;
        if t > 0.0 && (-1e-9..=1.0 + 1e-9).contains(&s) {
            best = Some(best.map_or(t, |b: f64| b.min(t)));
        }
    }
    best.map(|t| d * t)
}

fn unit(v: Vector) -> Option<Vector> {
    let len = v.length();
    (len > 1e-9).then(|| v / len)
}

/// Control points of a smooth cubic chain through `pts`.
///
/// Two points give a straight segment with control points at the thirds; longer routes use
/// Catmull-Rom tangents, so the curve passes through every waypoint.
pub(crate) fn smooth(pts: &[Point]) -> Vec<Point> {
    match pts.len() {
        0 => Vec::new(),
        1 => vec![pts[0]],
        2 => {
            let d = pts[1] - pts[0];
            vec![pts[0], pts[0] + d / 3.0, pts[0] + d * (2.0 / 3.0), pts[1]]
        }
        n => {
            let mut out = Vec::with_capacity(3 * (n - 1) + 1);
            out.push(pts[0]);
            for i in 0..n - 1 {
                let prev = pts[i.saturating_sub(1)];
                let next = pts[(i + 2).min(n - 1)];
                out.push(pts[i] + (pts[i + 1] - prev) / 6.0);
                out.push(pts[i + 1] - (next - pts[i]) / 6.0);
                out.push(pts[i + 1]);
            }
            out
        }
    }
}

/// Moves `from` toward `to` by the arrow length, keeping at least a third of the segment for
/// the curve.
fn shorten(from: Point, to: Point, len: f64, share: f64) -> Point {
    let d = to - from;
    let Some(u) = unit(d) else {
        return from;
    };
    from + u * len.min(d.length() * share)
}

/// Routes an edge through `waypoints`, given in tail to head order with the node centers at
/// both ends. `bow` offsets a direct route sideways (parallel edges).
pub(crate) fn route(
    spec: &EdgeSpec,
    waypoints: &[Point],
    tail: &NodeGeom,
    head: &NodeGeom,
    bow: f64,
) -> Bezier {
    let n = waypoints.len();
    let mut pts = waypoints.to_vec();
    if n >= 2 {
        let first = tail.clip(waypoints[1]);
        let last = head.clip(waypoints[n - 2]);
        if (last - first).length() > 1e-9 {
            pts[0] = first;
            pts[n - 1] = last;
        }
    }

    let share = if spec.tail_arrow && spec.head_arrow {
        1.0 / 3.0
    } else {
        2.0 / 3.0
    };
    let mut start = None;
    let mut end = None;
    if n >= 2 {
        if spec.tail_arrow && spec.arrow_len > 0.0 {
            start = Some(pts[0]);
            pts[0] = shorten(pts[0], pts[1], spec.arrow_len, share);
        }
        if spec.head_arrow && spec.arrow_len > 0.0 {
            end = Some(pts[n - 1]);
            pts[n - 1] = shorten(pts[n - 1], pts[n - 2], spec.arrow_len, share);
        }
    }

    let mut points = smooth(&pts);
    if n == 2 && bow != 0.0 {
        if let Some(u) = unit(pts[1] - pts[0]) {
            // Interior control points shifted by `b` move the curve midpoint by `0.75 * b`.
            let shift = vector(-u.y, u.x) * (bow * 4.0 / 3.0);
            points[1] += shift;
            points[2] += shift;
        }
    }

    Bezier { points, start, end }
}

/// Routes a self loop on the right side of the node. `level` nests repeated loops.
pub(crate) fn self_loop(spec: &EdgeSpec, node: &NodeGeom, level: usize) -> (Bezier, Point) {
    let c = node.center;
    let half = node.half();
    let width = LOOP_WIDTH * (level + 1) as f64;
    let outer = c.x + half.width + width;
    let rise = half.height / 3.0;

    let s = node.clip(point(c.x + half.width, c.y + half.height / 2.0));
    let e = node.clip(point(c.x + half.width, c.y - half.height / 2.0));
    let mut points = vec![
        s,
        point(s.x + width / 2.0, s.y + rise),
        point(outer, s.y + rise),
        point(outer, c.y),
        point(outer, e.y - rise),
        point(e.x + width / 2.0, e.y - rise),
        e,
    ];

    let mut start = None;
    let mut end = None;
    if spec.tail_arrow && spec.arrow_len > 0.0 {
        start = Some(s);
        points[0] = shorten(s, points[1], spec.arrow_len, 0.5);
    }
    if spec.head_arrow && spec.arrow_len > 0.0 {
        end = Some(e);
        points[6] = shorten(e, points[5], spec.arrow_len, 0.5);
    }

    (Bezier { points, start, end }, point(outer, c.y))
}

/// Middle of a waypoint polyline.
pub(crate) fn midpoint(pts: &[Point]) -> Point {
    match pts.len() {
        0 => point(0.0, 0.0),
        n if n % 2 == 1 => pts[n / 2],
        n => pts[n / 2 - 1].lerp(pts[n / 2], 0.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::size;
    use crate::model::Polygon;
    use crate::shapes::lookup;

    fn spec(tail_arrow: bool, head_arrow: bool) -> EdgeSpec {
        let mut g = crate::graph::Graph::open("g");
        let a = g.add_node("a");
        EdgeSpec {
            tail: a,
            head: a,
            minlen: 1,
            label: None,
            tail_arrow,
            head_arrow,
            arrow_len: 10.0,
        }
    }

    fn box_node(center: Point) -> NodeGeom {
        let sized = SizedNode {
            shape: lookup("box"),
            shape_info: ShapeInfo::Polygon(Polygon {
                regular: false,
                peripheries: 1,
                sides: 4,
                orientation: 0.0,
                distortion: 0.0,
                skew: 0.0,
                vertices: vec![
                    point(27.0, 18.0),
                    point(-27.0, 18.0),
                    point(-27.0, -18.0),
                    point(27.0, -18.0),
                ],
            }),
            size: size(54.0, 36.0),
            label: None,
        };
        NodeGeom::new(center, &sized)
    }

    fn ellipse_node(center: Point) -> NodeGeom {
        let sized = SizedNode {
            shape: lookup("ellipse"),
            shape_info: ShapeInfo::Polygon(Polygon {
                regular: false,
                peripheries: 1,
                sides: 2,
                orientation: 0.0,
                distortion: 0.0,
                skew: 0.0,
                vertices: vec![point(-27.0, -18.0), point(27.0, 18.0)],
            }),
            size: size(54.0, 36.0),
            label: None,
        };
        NodeGeom::new(center, &sized)
    }

    fn close(a: Point, b: Point) -> bool {
        (a - b).length() < 1e-6
    }

    #[test]
    fn clipping_hits_the_shape_boundary() {
        let b = box_node(point(100.0, 100.0));
        assert!(close(b.clip(point(100.0, 0.0)), point(100.0, 82.0)));
        assert!(close(b.clip(point(300.0, 100.0)), point(127.0, 100.0)));

        let e = ellipse_node(point(0.0, 0.0));
        assert!(close(e.clip(point(0.0, 50.0)), point(0.0, 18.0)));
        assert!(close(e.clip(point(-50.0, 0.0)), point(-27.0, 0.0)));
    }

    #[test]
    fn direct_route_is_one_cubic_with_an_end_arrow() {
        let tail = box_node(point(27.0, 90.0));
        let head = box_node(point(27.0, 18.0));
        let waypoints = [tail.center, head.center];
        let b = route(&spec(false, true), &waypoints, &tail, &head, 0.0);
        assert!(b.is_well_formed());
        assert_eq!(b.points.len(), 4);
        assert_eq!(b.start, None);
        assert!(close(b.end.unwrap(), point(27.0, 36.0)));
        assert!(close(b.points[0], point(27.0, 72.0)));
        assert!(close(b.points[3], point(27.0, 46.0)));
    }

    #[test]
    fn long_route_passes_through_waypoints() {
        let tail = box_node(point(0.0, 200.0));
        let head = box_node(point(0.0, 0.0));
        let waypoints = [tail.center, point(40.0, 100.0), head.center];
        let b = route(&spec(false, false), &waypoints, &tail, &head, 0.0);
        assert_eq!(b.points.len(), 7);
        assert!(close(b.points[3], point(40.0, 100.0)));
    }

    #[test]
    fn bowed_routes_separate_parallel_edges() {
        let tail = box_node(point(0.0, 100.0));
        let head = box_node(point(0.0, 0.0));
        let waypoints = [tail.center, head.center];
        let left = route(&spec(false, false), &waypoints, &tail, &head, -6.0);
        let right = route(&spec(false, false), &waypoints, &tail, &head, 6.0);
        assert!(left.points[1].x != right.points[1].x);
    }

    #[test]
    fn self_loop_is_two_cubics_right_of_the_node() {
        let node = box_node(point(0.0, 0.0));
        let (b, label_anchor) = self_loop(&spec(false, true), &node, 0);
        assert_eq!(b.points.len(), 7);
        assert!(b.end.is_some());
        assert!(b.points.iter().all(|p| p.x > 0.0));
        assert_eq!(label_anchor, point(27.0 + LOOP_WIDTH, 0.0));
    }

    #[test]
    fn smooth_chain_has_three_points_per_segment() {
        let pts = [point(0.0, 0.0), point(1.0, 1.0), point(2.0, 0.0), point(3.0, 1.0)];
        assert_eq!(smooth(&pts).len(), 10);
    }
}
