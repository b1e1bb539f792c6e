//! Node sizing and label metrics.

use super::RankDir;
use crate::attr::parse_bool;
use crate::geom::{BoundingBox, POINTS_PER_INCH, Size, point, size};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::model::{RecordField, ShapeInfo, TextLabel};
use crate::shapes::{self, PolygonRequest, ShapeDesc, ShapeKind};
use crate::text::{
    DEFAULT_FONT_COLOR, DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE, LabelContext, MIN_FONT_SIZE,
    TextMeasurer, TextStyle, expand_label,
};

const DEFAULT_NODE_WIDTH: f64 = 0.75;
const DEFAULT_NODE_HEIGHT: f64 = 0.5;
const DEFAULT_POINT_SIZE: f64 = 0.05;
const DEFAULT_MARGIN: (f64, f64) = (0.11, 0.055);
/// Padding around edge label text, in points.
const EDGE_LABEL_PAD: (f64, f64) = (16.0, 8.0);
const ARROW_LENGTH: f64 = 10.0;

#[derive(Debug, Clone)]
pub(crate) struct SizedNode {
    pub shape: ShapeDesc,
    pub shape_info: ShapeInfo,
    /// Drawn size, peripheries included.
    pub size: Size,
    pub label: Option<TextLabel>,
}

#[derive(Debug, Clone)]
pub(crate) struct EdgeSpec {
    pub tail: NodeId,
    pub head: NodeId,
    pub minlen: usize,
    pub label: Option<TextLabel>,
    pub tail_arrow: bool,
    pub head_arrow: bool,
    pub arrow_len: f64,
}

pub(crate) fn number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.split_whitespace().next())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn font(value: impl Fn(&str) -> Option<String>) -> (String, f64, String) {
    let name = value("fontname")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FONT_NAME.to_string());
    let size = number(value("fontsize").as_deref())
        .unwrap_or(DEFAULT_FONT_SIZE)
        .max(MIN_FONT_SIZE);
    let color = value("fontcolor")
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_FONT_COLOR.to_string());
    (name, size, color)
}

fn measure(
    measurer: &dyn TextMeasurer,
    text: &str,
    fontname: &str,
    fontsize: f64,
) -> Size {
    let m = measurer.measure(
        text,
        &TextStyle {
            font_family: Some(fontname.to_string()),
            font_size: fontsize,
        },
    );
    size(m.width, m.height)
}

/// `margin` attribute in inches (`"x,y"` or a single value for both axes).
fn margin(value: Option<&str>) -> Option<(f64, f64)> {
    let value = value.filter(|v| !v.trim().is_empty())?;
    let mut parts = value.split(',').map(|p| p.trim().parse::<f64>().ok());
    let x = parts.next().flatten()?;
    let y = parts.next().flatten().unwrap_or(x);
    Some((x.max(0.0), y.max(0.0)))
}

pub(crate) fn size_node(
    graph: &Graph,
    node: NodeId,
    rankdir: RankDir,
    measurer: &dyn TextMeasurer,
) -> SizedNode {
    let attr = |name: &str| graph.node_attr(node, name).map(str::to_string);
    let shape = shapes::lookup(attr("shape").as_deref().unwrap_or_default());
    let (fontname, fontsize, fontcolor) = font(attr);

    let cx = LabelContext {
        graph: graph.name(),
        node: Some(graph.node_name(node)),
        ..LabelContext::default()
    };
    let template = attr("label").unwrap_or_else(|| "\\N".to_string());
    let text = if shape.hides_label() {
        String::new()
    } else {
        expand_label(&template, &cx)
    };

    let default_margin = if shape.name == "plain" {
        (0.0, 0.0)
    } else {
        DEFAULT_MARGIN
    };
    let (mx, my) = margin(attr("margin").as_deref()).unwrap_or(default_margin);
    let pad = size(2.0 * mx * POINTS_PER_INCH, 2.0 * my * POINTS_PER_INCH);

    let (default_width, default_height) = if shape.kind == ShapeKind::Point {
        (DEFAULT_POINT_SIZE, DEFAULT_POINT_SIZE)
    } else {
        (DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)
    };
    let width = number(attr("width").as_deref())
        .unwrap_or(default_width)
        .max(0.0);
    let height = number(attr("height").as_deref())
        .unwrap_or(default_height)
        .max(0.0);
    let min = size(width * POINTS_PER_INCH, height * POINTS_PER_INCH);
    let fixed = attr("fixedsize").is_some_and(|v| parse_bool(&v) || v == "shape");

    let valign = match attr("labelloc").as_deref().and_then(|v| v.chars().next()) {
        Some('t') | Some('T') => 't',
        Some('b') | Some('B') => 'b',
        _ => 'c',
    };

    if shape.kind == ShapeKind::Record {
        let horizontal = !rankdir.is_horizontal();
        let (fields, node_size) = layout_record(
            &text, horizontal, min, fixed, pad, measurer, &fontname, fontsize,
        );
        // The node label keeps every field's text, without port tags.
        let text = fields
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("|");
        let label = (!text.is_empty()).then(|| TextLabel {
            dimen: measure(measurer, &text, &fontname, fontsize) + pad,
            space: size(
                (node_size.width - pad.width).max(0.0),
                (node_size.height - pad.height).max(0.0),
            ),
            text,
            fontname,
            fontsize,
            fontcolor,
            pos: None,
            valign,
        });
        return SizedNode {
            shape,
            shape_info: ShapeInfo::Record(fields),
            size: node_size,
            label,
        };
    }

    let text_size = measure(measurer, &text, &fontname, fontsize);
    let dimen = if text.is_empty() {
        size(0.0, 0.0)
    } else {
        text_size + pad
    };

    let peripheries = attr("peripheries")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(shape.peripheries);
    let mut sides = shape.sides;
    let mut distortion = shape.distortion;
    let mut skew = shape.skew;
    if sides == 0 {
        sides = attr("sides")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(4);
        distortion = number(attr("distortion").as_deref()).unwrap_or(0.0);
        skew = number(attr("skew").as_deref()).unwrap_or(0.0);
    }
    let orientation = shape.orientation + number(attr("orientation").as_deref()).unwrap_or(0.0);
    let regular = shape.regular || attr("regular").is_some_and(|v| parse_bool(&v));

    let outcome = shapes::build_polygon(&PolygonRequest {
        regular,
        peripheries,
        sides,
        orientation,
        distortion,
        skew,
        label: dimen,
        min,
        fixed,
        star: shape.kind == ShapeKind::Star,
    });

    let label = (!shape.hides_label()).then(|| TextLabel {
        text,
        fontname,
        fontsize,
        fontcolor,
        pos: None,
        valign,
        dimen,
        space: size(
            (outcome.size.width - pad.width).max(text_size.width),
            (outcome.size.height - pad.height).max(text_size.height),
        ),
    });

    SizedNode {
        shape,
        shape_info: ShapeInfo::Polygon(outcome.polygon),
        size: outcome.size,
        label,
    }
}

#[allow(clippy::too_many_arguments)]
fn layout_record(
    text: &str,
    horizontal: bool,
    min: Size,
    fixed: bool,
    pad: Size,
    measurer: &dyn TextMeasurer,
    fontname: &str,
    fontsize: f64,
) -> (Vec<RecordField>, Size) {
    let texts = shapes::record_fields(text);
    let sizes: Vec<Size> = texts
        .iter()
        .map(|t| measure(measurer, t, fontname, fontsize) + pad)
        .collect();

    let (along, across): (f64, f64) = if horizontal {
        (
            sizes.iter().map(|s| s.width).sum(),
            sizes.iter().map(|s| s.height).fold(0.0, f64::max),
        )
    } else {
        (
            sizes.iter().map(|s| s.height).sum(),
            sizes.iter().map(|s| s.width).fold(0.0, f64::max),
        )
    };
    let natural = if horizontal {
        size(along, across)
    } else {
        size(across, along)
    };
    let total = if fixed {
        min
    } else {
        size(natural.width.max(min.width), natural.height.max(min.height))
    };

    let scale = if horizontal {
        if along > 0.0 { total.width / along } else { 1.0 }
    } else if along > 0.0 {
        total.height / along
    } else {
        1.0
    };

    let mut cursor = 0.0;
    let fields = texts
        .into_iter()
        .zip(&sizes)
        .map(|(text, s)| {
            let bb = if horizontal {
                let w = s.width * scale;
                let x0 = -total.width / 2.0 + cursor;
                cursor += w;
                BoundingBox::new(
                    point(x0, -total.height / 2.0),
                    point(x0 + w, total.height / 2.0),
                )
            } else {
                let h = s.height * scale;
                let y1 = total.height / 2.0 - cursor;
                cursor += h;
                BoundingBox::new(
                    point(-total.width / 2.0, y1 - h),
                    point(total.width / 2.0, y1),
                )
            };
            RecordField { text, bb }
        })
        .collect();
    (fields, total)
}

pub(crate) fn edge_spec(graph: &Graph, edge: EdgeId, measurer: &dyn TextMeasurer) -> EdgeSpec {
    let attr = |name: &str| graph.edge_attr(edge, name).map(str::to_string);
    let tail = graph.tail(edge);
    let head = graph.head(edge);

    let minlen = attr("minlen")
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1);

    let label = attr("label").filter(|l| !l.is_empty()).map(|template| {
        let (fontname, fontsize, fontcolor) = font(&attr);
        let cx = LabelContext {
            graph: graph.name(),
            node: None,
            tail: Some(graph.node_name(tail)),
            head: Some(graph.node_name(head)),
            directed: graph.is_directed(),
        };
        let text = expand_label(&template, &cx);
        let dimen = measure(measurer, &text, &fontname, fontsize)
            + size(EDGE_LABEL_PAD.0, EDGE_LABEL_PAD.1);
        TextLabel {
            text,
            fontname,
            fontsize,
            fontcolor,
            pos: None,
            valign: 'c',
            dimen,
            space: dimen,
        }
    });

    let default_dir = if graph.is_directed() { "forward" } else { "none" };
    let dir = attr("dir")
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| default_dir.to_string());
    let (mut tail_arrow, mut head_arrow) = match dir.as_str() {
        "back" => (true, false),
        "both" => (true, true),
        "none" => (false, false),
        _ => (false, true),
    };
    if attr("arrowhead").as_deref() == Some("none") {
        head_arrow = false;
    }
    if attr("arrowtail").as_deref() == Some("none") {
        tail_arrow = false;
    }
    let arrow_len = ARROW_LENGTH * number(attr("arrowsize").as_deref()).unwrap_or(1.0).max(0.0);

    EdgeSpec {
        tail,
        head,
        minlen,
        label,
        tail_arrow,
        head_arrow,
        arrow_len,
    }
}
