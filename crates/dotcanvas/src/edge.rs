//! Edge scene items.

use crate::geometry::{arrow_path, spline_path};
use crate::item::{ColorizeEffect, ITEM_Z_VALUE, RefreshContext, Selection};
use crate::label::{LabelLayout, layout_label};
use crate::paint::Painter;
use crate::style::{Pen, StyleSet, resolve_color};
use dotlayout::EdgeId;
use kurbo::{Affine, BezPath, Point, Rect, Shape, Stroke, StrokeOpts};

/// Width of the stroked outline used for picking edges.
pub const SELECTION_STROKE_WIDTH: f64 = 20.0;

const STROKE_TOLERANCE: f64 = 0.1;

/// Renderable wrapper around one graph edge.
///
/// The item is centered on its own visual content: `pos` is the center of the union of the
/// curve and label bounds, and all cached paths are relative to it.
#[derive(Debug, Clone)]
pub struct EdgeItem {
    id: EdgeId,
    pos: Point,
    path: BezPath,
    arrows: BezPath,
    outline: BezPath,
    bounding_box: Rect,
    styles: StyleSet,
    pen: Pen,
    label: Option<LabelLayout>,
    selection: Selection,
}

fn union(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, b) => a.or(b),
    }
}

fn path_bounds(path: &BezPath) -> Option<Rect> {
    (!path.elements().is_empty()).then(|| path.bounding_box())
}

impl EdgeItem {
    pub(crate) fn new(id: EdgeId) -> Self {
        Self {
            id,
            pos: Point::ZERO,
            path: BezPath::new(),
            arrows: BezPath::new(),
            outline: BezPath::new(),
            bounding_box: Rect::ZERO,
            styles: StyleSet::default(),
            pen: Pen::default(),
            label: None,
            selection: Selection::default(),
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Curve, connectors and arrowheads in local coordinates.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Arrowheads only, in local coordinates.
    pub fn arrow_path(&self) -> &BezPath {
        &self.arrows
    }

    /// Hit-test outline: curve and label box widened by [`SELECTION_STROKE_WIDTH`].
    pub fn shape(&self) -> &BezPath {
        &self.outline
    }

    pub fn label(&self) -> Option<&LabelLayout> {
        self.label.as_ref()
    }

    pub fn styles(&self) -> &StyleSet {
        &self.styles
    }

    pub fn pen(&self) -> &Pen {
        &self.pen
    }

    pub fn z_value(&self) -> f64 {
        ITEM_Z_VALUE
    }

    pub fn is_selected(&self) -> bool {
        self.selection.is_selected()
    }

    pub fn effect(&self) -> Option<&ColorizeEffect> {
        self.selection.effect()
    }

    pub fn bounding_rect(&self) -> Rect {
        self.bounding_box
    }

    pub fn scene_bounding_rect(&self) -> Rect {
        self.bounding_box + self.pos.to_vec2()
    }

    pub fn contains(&self, scene_point: Point) -> bool {
        self.outline.contains(scene_point - self.pos.to_vec2())
    }

    pub(crate) fn set_selected(&mut self, selected: bool) -> bool {
        self.selection.set(selected)
    }

    pub(crate) fn update_state(&mut self, ctx: &RefreshContext<'_>) {
        let graph = ctx.graph;
        let Some(layout) = graph.edge_layout(self.id) else {
            tracing::debug!(edge = self.id.index(), "edge has no layout yet");
            return;
        };

        self.styles = StyleSet::parse(graph.edge_attr(self.id, "style").unwrap_or_default());
        let color = resolve_color(graph.edge_attr(self.id, "color"), self.pen.color);
        self.pen = Pen::new(color, 1.0).styled(&self.styles);

        let mut path = spline_path(&layout.splines, ctx.height);
        let mut arrows = arrow_path(&layout.splines, ctx.height);
        let mut label = layout
            .label
            .as_ref()
            .map(|l| layout_label(l, ctx.height, ctx.dpi, ctx.metrics));
        let label_bounds = label.as_ref().map(|l| l.rect);

        let Some(bounds) = union(path_bounds(&path), label_bounds) else {
            tracing::warn!(edge = self.id.index(), "edge has no drawable geometry");
            self.path = path;
            self.arrows = arrows;
            self.outline = BezPath::new();
            self.bounding_box = Rect::ZERO;
            self.label = label;
            return;
        };

        self.pos = bounds.center();
        let to_local = Affine::translate(-self.pos.to_vec2());
        path.apply_affine(to_local);
        arrows.apply_affine(to_local);
        if let Some(label) = &mut label {
            label.translate(-self.pos.to_vec2());
        }

        let mut joint = path.clone();
        if let Some(label) = &label {
            joint.extend(label.outline().elements().iter().copied());
        }
        self.outline = kurbo::stroke(
            joint.elements().iter().copied(),
            &Stroke::new(SELECTION_STROKE_WIDTH),
            &StrokeOpts::default(),
            STROKE_TOLERANCE,
        );
        self.bounding_box = bounds + (-self.pos.to_vec2());
        self.path = path;
        self.arrows = arrows;
        self.label = label;
    }

    pub fn paint(&self, painter: &mut dyn Painter) {
        painter.begin_item(self.pos.to_vec2(), self.effect());
        let mut pen = self.pen;
        if self.is_selected() {
            pen.width *= 2.0;
        }
        painter.draw_path(&self.path, Some(&pen), None);
        if let Some(label) = &self.label {
            let text_pen = Pen::new(label.color, pen.width / 4.0);
            for run in &label.runs {
                painter.draw_text(run, &label.font, label.color, Some(&text_pen));
            }
        }
        painter.end_item();
    }
}
