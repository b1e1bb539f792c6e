//! Shape descriptors and vertex generation.
//!
//! Polygon vertices are generated the way Graphviz does it: a unit polygon is built from the
//! sector angle, distorted/skewed, rotated by the orientation and finally scaled so that it
//! spans the node box. Extra peripheries are offset outward along the vertex bisectors.

use crate::geom::{Point, Size, point, size};
use crate::model::Polygon;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

/// Distance between concentric peripheries, in points.
pub const PERIPHERY_GAP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Polygon,
    Star,
    Point,
    Record,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDesc {
    pub name: String,
    pub kind: ShapeKind,
    pub regular: bool,
    pub peripheries: usize,
    /// `0` reads the count from the node's `sides` attribute; `1` or `2` is an ellipse.
    pub sides: usize,
    pub orientation: f64,
    pub distortion: f64,
    pub skew: f64,
}

impl Template {
    const fn poly(
        regular: bool,
        peripheries: usize,
        sides: usize,
        orientation: f64,
        distortion: f64,
        skew: f64,
    ) -> Template {
        Template {
            kind: ShapeKind::Polygon,
            regular,
            peripheries,
            sides,
            orientation,
            distortion,
            skew,
        }
    }
}

impl ShapeDesc {
    pub fn is_ellipse(&self) -> bool {
        matches!(self.kind, ShapeKind::Polygon | ShapeKind::Point) && (1..3).contains(&self.sides)
    }

    /// Label text is not drawn for these shapes.
    pub fn hides_label(&self) -> bool {
        self.kind == ShapeKind::Point
    }
}

#[derive(Debug, Clone, Copy)]
struct Template {
    kind: ShapeKind,
    regular: bool,
    peripheries: usize,
    sides: usize,
    orientation: f64,
    distortion: f64,
    skew: f64,
}

const BOX: Template = Template::poly(false, 1, 4, 0.0, 0.0, 0.0);
const ELLIPSE: Template = Template::poly(false, 1, 1, 0.0, 0.0, 0.0);
const PLAIN: Template = Template::poly(false, 0, 4, 0.0, 0.0, 0.0);

fn template(name: &str) -> Option<Template> {
    let t = match name {
        "box" | "rect" | "rectangle" | "note" | "tab" | "folder" | "box3d" | "component"
        | "underline" => BOX,
        "polygon" => Template::poly(false, 1, 0, 0.0, 0.0, 0.0),
        "ellipse" | "oval" => ELLIPSE,
        "circle" | "Mcircle" => Template::poly(true, 1, 1, 0.0, 0.0, 0.0),
        "doublecircle" => Template::poly(true, 2, 1, 0.0, 0.0, 0.0),
        "egg" => Template::poly(false, 1, 1, 0.0, -0.3, 0.0),
        "triangle" => Template::poly(false, 1, 3, 0.0, 0.0, 0.0),
        "invtriangle" => Template::poly(false, 1, 3, 180.0, 0.0, 0.0),
        "plaintext" | "plain" | "none" => PLAIN,
        "diamond" | "Mdiamond" => Template::poly(false, 1, 4, 45.0, 0.0, 0.0),
        "square" | "Msquare" => Template::poly(true, 1, 4, 0.0, 0.0, 0.0),
        "trapezium" => Template::poly(false, 1, 4, 0.0, -0.4, 0.0),
        "invtrapezium" => Template::poly(false, 1, 4, 180.0, -0.4, 0.0),
        "parallelogram" => Template::poly(false, 1, 4, 0.0, 0.0, 0.6),
        "house" => Template::poly(false, 1, 5, 0.0, -0.64, 0.0),
        "invhouse" => Template::poly(false, 1, 5, 180.0, -0.64, 0.0),
        "pentagon" => Template::poly(false, 1, 5, 0.0, 0.0, 0.0),
        "hexagon" => Template::poly(false, 1, 6, 0.0, 0.0, 0.0),
        "septagon" => Template::poly(false, 1, 7, 0.0, 0.0, 0.0),
        "octagon" => Template::poly(false, 1, 8, 0.0, 0.0, 0.0),
        "doubleoctagon" => Template::poly(false, 2, 8, 0.0, 0.0, 0.0),
        "tripleoctagon" => Template::poly(false, 3, 8, 0.0, 0.0, 0.0),
        "star" => Template {
            kind: ShapeKind::Star,
            ..Template::poly(false, 1, 10, 0.0, 0.0, 0.0)
        },
        "point" => Template {
            kind: ShapeKind::Point,
            ..Template::poly(true, 1, 1, 0.0, 0.0, 0.0)
        },
        "record" | "Mrecord" => Template {
            kind: ShapeKind::Record,
            ..BOX
        },
        _ => return None,
    };
    Some(t)
}

/// Looks up the descriptor for a shape name.
///
/// Unknown names keep their name but carry box parameters, so the node still gets a size and
/// vertex data.
pub fn lookup(name: &str) -> ShapeDesc {
    let name = if name.is_empty() { "ellipse" } else { name };
    let t = template(name).unwrap_or_else(|| {
        tracing::warn!(shape = name, "unknown shape; using box geometry");
        BOX
    });
    ShapeDesc {
        name: name.to_string(),
        kind: t.kind,
        regular: t.regular,
        peripheries: t.peripheries,
        sides: t.sides,
        orientation: t.orientation,
        distortion: t.distortion,
        skew: t.skew,
    }
}

pub fn is_known(name: &str) -> bool {
    template(name).is_some()
}

/// Inputs of polygon sizing, already resolved from node attributes.
#[derive(Debug, Clone)]
pub(crate) struct PolygonRequest {
    pub regular: bool,
    pub peripheries: usize,
    pub sides: usize,
    pub orientation: f64,
    pub distortion: f64,
    pub skew: f64,
    /// Label extent including margins.
    pub label: Size,
    /// `width`/`height` attributes, in points.
    pub min: Size,
    pub fixed: bool,
    pub star: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct PolygonOutcome {
    pub polygon: Polygon,
    /// Outer size, peripheries included.
    pub size: Size,
}

pub(crate) fn build_polygon(req: &PolygonRequest) -> PolygonOutcome {
    let ellipse = req.sides < 3;
    let is_box = req.sides == 4
        && (req.orientation.round() as i64) % 90 == 0
        && req.distortion == 0.0
        && req.skew == 0.0;

    let mut bb = req.label;
    if !req.fixed {
        if req.star {
            bb = star_size(bb);
        } else if ellipse {
            let temp = bb.height * SQRT_2;
            if req.min.height > temp {
                let ratio = bb.height / req.min.height;
                bb.width *= (1.0 / (1.0 - ratio * ratio)).sqrt();
            } else {
                bb.width *= SQRT_2;
                bb.height = temp;
            }
        } else if !is_box {
            let temp = (PI / req.sides as f64).cos();
            bb.width /= temp;
            bb.height /= temp;
        }
    }

    bb = if req.fixed {
        req.min
    } else {
        size(bb.width.max(req.min.width), bb.height.max(req.min.height))
    };
    if req.regular {
        let side = if req.fixed {
            bb.width.min(bb.height)
        } else {
            bb.width.max(bb.height)
        };
        bb = size(side, side);
    }

    let rings = req.peripheries.max(1);
    let (sides, vertices) = if ellipse {
        let mut half = point(bb.width / 2.0, bb.height / 2.0);
        let mut vertices = vec![point(-half.x, -half.y), half];
        for _ in 1..req.peripheries {
            half = point(half.x + PERIPHERY_GAP, half.y + PERIPHERY_GAP);
            vertices.push(point(-half.x, -half.y));
            vertices.push(half);
        }
        (2, vertices)
    } else {
        let ring = if req.star {
            let (ring, sz) = star_vertices(bb);
            bb = sz;
            ring
        } else {
            let (ring, sz) = regular_ring(req, bb, is_box);
            bb = sz;
            ring
        };
        let sides = ring.len();
        let mut vertices = ring;
        vertices.resize(sides * rings, point(0.0, 0.0));
        if req.peripheries > 1 {
            grow_peripheries(&mut vertices, sides, req.peripheries);
        }
        (sides, vertices)
    };

    let mut outer = bb;
    if req.peripheries > 1 {
        let last = &vertices[(rings - 1) * sides..];
        for p in last.iter() {
            outer.width = outer.width.max(2.0 * p.x.abs());
            outer.height = outer.height.max(2.0 * p.y.abs());
        }
    }

    PolygonOutcome {
        polygon: Polygon {
            regular: req.regular,
            peripheries: req.peripheries,
            sides,
            orientation: req.orientation,
            distortion: req.distortion,
            skew: req.skew,
            vertices,
        },
        size: outer,
    }
}

/// Unit polygon scaled to `bb`. Returns the ring and the box it finally spans.
fn regular_ring(req: &PolygonRequest, bb: Size, is_box: bool) -> (Vec<Point>, Size) {
    let sides = req.sides;
    let sector = 2.0 * PI / sides as f64;
    let side_length = (sector / 2.0).sin();
    let skew_dist = (req.distortion.abs() + req.skew.abs()).hypot(1.0);
    let g_distortion = req.distortion * SQRT_2 / (sector / 2.0).cos();
    let g_skew = req.skew / 2.0;

    let mut angle = (sector - PI) / 2.0;
    let (sin, cos) = angle.sin_cos();
    let mut r = point(0.5 * cos, 0.5 * sin);
    angle += (PI - sector) / 2.0;

    let mut ring = Vec::with_capacity(sides);
    let (mut xmax, mut ymax) = (0.0f64, 0.0f64);
    for _ in 0..sides {
        angle += sector;
        let (sin, cos) = angle.sin_cos();
        r = point(r.x + side_length * cos, r.y + side_length * sin);

        let px = r.x * (skew_dist + r.y * g_distortion) + r.y * g_skew;
        let py = r.y;
        let alpha = req.orientation.to_radians() + py.atan2(px);
        let (sin, cos) = alpha.sin_cos();
        let radius = px.hypot(py);
        let p = point(radius * cos * bb.width, radius * sin * bb.height);

        xmax = xmax.max(p.x.abs());
        ymax = ymax.max(p.y.abs());
        ring.push(p);

        if is_box {
            ring.extend([point(-p.x, p.y), point(-p.x, -p.y), point(p.x, -p.y)]);
            break;
        }
    }

    xmax *= 2.0;
    ymax *= 2.0;
    let spans = size(bb.width.max(xmax), bb.height.max(ymax));
    let sx = if xmax > 0.0 { spans.width / xmax } else { 1.0 };
    let sy = if ymax > 0.0 { spans.height / ymax } else { 1.0 };
    for p in &mut ring {
        *p = point(p.x * sx, p.y * sy);
    }
    (ring, spans)
}

/// Offsets the first ring outward by `PERIPHERY_GAP` per periphery, along each vertex bisector.
fn grow_peripheries(vertices: &mut [Point], sides: usize, peripheries: usize) {
    let mut q = vertices[sides - 1];
    let mut r = vertices[0];
    let mut beta = (r.y - q.y).atan2(r.x - q.x);
    for i in 0..sides {
        q = r;
        r = vertices[(i + 1) % sides];
        let alpha = beta;
        beta = (r.y - q.y).atan2(r.x - q.x);
        let gamma = (alpha + PI - beta) / 2.0;
        let dist = PERIPHERY_GAP / gamma.sin();
        let (sin, cos) = (alpha - gamma).sin_cos();
        let step = point(cos * dist, sin * dist);

        let mut p = q;
        for j in 1..peripheries {
            p = point(p.x + step.x, p.y + step.y);
            vertices[i + j * sides] = p;
        }
    }
}

const STAR_ALPHA: f64 = PI / 10.0;
const STAR_ALPHA2: f64 = 2.0 * STAR_ALPHA;
const STAR_ALPHA3: f64 = 3.0 * STAR_ALPHA;
const STAR_ALPHA4: f64 = 2.0 * STAR_ALPHA2;

fn star_size(sz: Size) -> Size {
    let rx = sz.width / (2.0 * STAR_ALPHA.cos());
    let ry = sz.height / (STAR_ALPHA.sin() + STAR_ALPHA3.sin());
    let r0 = rx.max(ry);
    let r = r0 * STAR_ALPHA4.sin() * STAR_ALPHA2.cos() / (STAR_ALPHA.cos() * STAR_ALPHA4.cos());
    size(2.0 * r * STAR_ALPHA.cos(), r * (1.0 + STAR_ALPHA3.sin()))
}

fn star_vertices(bb: Size) -> (Vec<Point>, Size) {
    let aspect = (1.0 + STAR_ALPHA3.sin()) / (2.0 * STAR_ALPHA.cos());
    let mut sz = bb;
    let a = sz.height / sz.width;
    if a > aspect {
        sz.width = sz.height / aspect;
    } else if a < aspect {
        sz.height = sz.width * aspect;
    }

    let r = sz.width / (2.0 * STAR_ALPHA.cos());
    let r0 = r * STAR_ALPHA.cos() * STAR_ALPHA4.cos() / (STAR_ALPHA4.sin() * STAR_ALPHA2.cos());
    let offset = r * (1.0 - STAR_ALPHA3.sin()) / 2.0;

    let mut theta = STAR_ALPHA;
    let mut ring = Vec::with_capacity(10);
    for _ in 0..5 {
        ring.push(point(r * theta.cos(), r * theta.sin() - offset));
        theta += STAR_ALPHA2;
        ring.push(point(r0 * theta.cos(), r0 * theta.sin() - offset));
        theta += STAR_ALPHA2;
    }
    (ring, sz)
}

/// Splits a record label into its top-level fields.
///
/// Braces group nested fields and are flattened; `<port>` prefixes are dropped.
pub fn record_fields(label: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = label.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '|' | '{' | '}' => {
                push_field(&mut fields, &mut current);
            }
            '<' => {
                for p in chars.by_ref() {
                    if p == '>' {
                        break;
                    }
                }
            }
            c => current.push(c),
        }
    }
    push_field(&mut fields, &mut current);
    if fields.is_empty() {
        fields.push(String::new());
    }
    fields
}

fn push_field(fields: &mut Vec<String>, current: &mut String) {
    let text = current.trim();
    if !text.is_empty() {
        fields.push(text.to_string());
    }
    current.clear();
}

/// Offset from the center of an axis-aligned ellipse to its boundary, in direction `(dx, dy)`.
pub(crate) fn ellipse_boundary(half: Size, dx: f64, dy: f64) -> (f64, f64) {
    if (dx == 0.0 && dy == 0.0) || half.width <= 0.0 || half.height <= 0.0 {
        return (0.0, 0.0);
    }
    let (sin, cos) = dy.atan2(dx).sin_cos();
    let t = 1.0 / ((cos / half.width).powi(2) + (sin / half.height).powi(2)).sqrt();
    (t * cos, t * sin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sides: usize) -> PolygonRequest {
        PolygonRequest {
            regular: false,
            peripheries: 1,
            sides,
            orientation: 0.0,
            distortion: 0.0,
            skew: 0.0,
            label: size(30.0, 20.0),
            min: size(54.0, 36.0),
            fixed: false,
            star: false,
        }
    }

    #[test]
    fn unknown_shape_keeps_its_name_with_box_parameters() {
        let desc = lookup("bogus");
        assert_eq!(desc.name, "bogus");
        assert_eq!(desc.sides, 4);
        assert_eq!(desc.peripheries, 1);
        assert!(!is_known("bogus"));
        assert!(is_known("Mrecord"));
        assert_eq!(lookup("Mrecord").kind, ShapeKind::Record);
    }

    #[test]
    fn box_is_symmetric_and_spans_the_minimum_size() {
        let out = build_polygon(&request(4));
        assert_eq!(out.polygon.sides, 4);
        assert_eq!(out.size, size(54.0, 36.0));
        let v = &out.polygon.vertices;
        assert_eq!(v.len(), 4);
        assert!((v[0].x - 27.0).abs() < 1e-9 && (v[0].y - 18.0).abs() < 1e-9);
        assert_eq!(v[1], point(-v[0].x, v[0].y));
        assert_eq!(v[2], point(-v[0].x, -v[0].y));
    }

    #[test]
    fn ellipse_stores_corner_pairs_per_periphery() {
        let mut req = request(1);
        req.peripheries = 2;
        let out = build_polygon(&req);
        assert_eq!(out.polygon.sides, 2);
        let v = &out.polygon.vertices;
        assert_eq!(v.len(), 4);
        assert_eq!(v[0], point(-v[1].x, -v[1].y));
        assert!((v[3].x - v[1].x - PERIPHERY_GAP).abs() < 1e-9);
        assert!((out.size.width - 2.0 * v[3].x).abs() < 1e-9);
    }

    #[test]
    fn diamond_vertices_lie_on_the_axes() {
        let mut req = request(4);
        req.orientation = 45.0;
        let out = build_polygon(&req);
        for p in &out.polygon.vertices {
            assert!(p.x.abs() < 1e-6 || p.y.abs() < 1e-6, "{p:?}");
        }
    }

    #[test]
    fn plaintext_keeps_one_ring_for_sizing() {
        let mut req = request(4);
        req.peripheries = 0;
        let out = build_polygon(&req);
        assert_eq!(out.polygon.peripheries, 0);
        assert_eq!(out.polygon.vertices.len(), 4);
    }

    #[test]
    fn star_has_ten_vertices() {
        let mut req = request(10);
        req.star = true;
        let out = build_polygon(&req);
        assert_eq!(out.polygon.vertices.len(), 10);
        assert_eq!(out.polygon.sides, 10);
    }

    #[test]
    fn record_fields_flatten_groups_and_ports() {
        assert_eq!(
            record_fields("<f0> left|{mid|<p> \\| bar}|right"),
            vec!["left", "mid", "| bar", "right"]
        );
        assert_eq!(record_fields(""), vec![""]);
    }
}
