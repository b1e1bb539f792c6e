//! Node scene items.

use crate::geometry::{node_path, to_display};
use crate::item::{ColorizeEffect, ITEM_Z_VALUE, RefreshContext, Selection};
use crate::label::{LabelLayout, layout_label};
use crate::paint::Painter;
use crate::style::{Color, Pen, StyleFlag, StyleSet, resolve_color, resolve_fill};
use dotlayout::NodeId;
use kurbo::{BezPath, Point, Rect, Shape};

/// Renderable wrapper around one graph node.
///
/// Geometry is kept in item-local coordinates centered on the node; [`NodeItem::pos`] places
/// the item in the scene. Nothing here is meaningful before the first layout pass.
#[derive(Debug, Clone)]
pub struct NodeItem {
    id: NodeId,
    pos: Point,
    path: BezPath,
    bounding_box: Rect,
    styles: StyleSet,
    pen: Pen,
    fill: Color,
    label: Option<LabelLayout>,
    selection: Selection,
}

impl NodeItem {
    pub(crate) fn new(id: NodeId) -> Self {
        Self {
            id,
            pos: Point::ZERO,
            path: BezPath::new(),
            bounding_box: Rect::ZERO,
            styles: StyleSet::default(),
            pen: Pen::default(),
            fill: Color::TRANSPARENT,
            label: None,
            selection: Selection::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node center in scene coordinates.
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Outline in local coordinates, used for painting and hit testing.
    pub fn shape(&self) -> &BezPath {
        &self.path
    }

    pub fn styles(&self) -> &StyleSet {
        &self.styles
    }

    pub fn pen(&self) -> &Pen {
        &self.pen
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn label(&self) -> Option<&LabelLayout> {
        self.label.as_ref()
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

    pub fn is_visible(&self) -> bool {
        !self.styles.contains(StyleFlag::Invisible)
    }

    /// Local bounding rectangle; one unit larger on each side while selected.
    pub fn bounding_rect(&self) -> Rect {
        if self.is_selected() {
            self.bounding_box.inflate(1.0, 1.0)
        } else {
            self.bounding_box
        }
    }

    pub fn scene_bounding_rect(&self) -> Rect {
        self.bounding_rect() + self.pos.to_vec2()
    }

    /// Hit test against the outline, in scene coordinates.
    pub fn contains(&self, scene_point: Point) -> bool {
        self.path.contains(scene_point - self.pos.to_vec2())
    }

    pub(crate) fn set_selected(&mut self, selected: bool) -> bool {
        self.selection.set(selected)
    }

    /// Rebuilds position, colors, outline and label from the node's current layout.
    pub(crate) fn update_state(&mut self, ctx: &RefreshContext<'_>) {
        let graph = ctx.graph;
        let Some(layout) = graph.node_layout(self.id) else {
            tracing::debug!(node = graph.node_name(self.id), "node has no layout yet");
            return;
        };

        self.pos = to_display(layout.coord, ctx.height);

        let color = graph.node_attr(self.id, "color");
        self.styles = StyleSet::parse(graph.node_attr(self.id, "style").unwrap_or_default());
        self.pen = Pen::new(resolve_color(color, self.pen.color), 1.0).styled(&self.styles);
        self.fill = resolve_fill(
            &self.styles,
            graph.node_attr(self.id, "fillcolor"),
            color,
            self.fill,
        );

        self.path = node_path(layout);
        self.bounding_box = self.path.bounding_box();

        self.label = layout.label.as_ref().map(|l| {
            let mut label = layout_label(l, ctx.height, ctx.dpi, ctx.metrics);
            if l.pos.is_some() {
                label.translate(-self.pos.to_vec2());
            }
            label
        });
    }

    pub fn paint(&self, painter: &mut dyn Painter) {
        if !self.is_visible() {
            return;
        }
        painter.begin_item(self.pos.to_vec2(), self.effect());
        let fill = (!self.fill.is_transparent()).then_some(self.fill);
        painter.draw_path(&self.path, Some(&self.pen), fill);
        if let Some(label) = &self.label {
            for run in &label.runs {
                painter.draw_text(run, &label.font, label.color, None);
            }
        }
        painter.end_item();
    }
}
