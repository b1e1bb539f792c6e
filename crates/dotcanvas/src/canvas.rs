//! The scene canvas: owns the graph, its items, layout passes and selection events.

use crate::config::{CanvasSettings, NameValueList};
use crate::edge::EdgeItem;
use crate::font::{DeterministicFontMetrics, DisplayDevice, FontMetrics, logical_dpi};
use crate::geometry::{graph_height, scene_rect};
use crate::item::{ItemId, RefreshContext};
use crate::node::NodeItem;
use crate::paint::{Painter, SvgPainter};
use crate::style::{Color, Pen};
use crate::{Error, Result};
use dotlayout::{AttrKind, Context, EdgeId, Graph, NodeId};
use kurbo::{Line, Point, Rect};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Spacing of the background grid lines.
pub const GRID_STEP: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanvasEvent {
    /// A layout pass finished and every item was refreshed.
    LayoutUpdated,
    NodeSelected(NodeId),
    EdgeSelected(EdgeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    Empty,
    Populated,
    LaidOut,
}

type Observer = Box<dyn FnMut(&CanvasEvent)>;

pub struct Canvas {
    graph: Graph,
    context: Context,
    settings: CanvasSettings,

    nodes: Vec<NodeItem>,
    node_index: FxHashMap<NodeId, usize>,
    edges: Vec<EdgeItem>,
    edge_index: FxHashMap<EdgeId, usize>,
    /// Insertion order; later items are on top.
    order: Vec<ItemId>,

    scene_rect: Rect,
    laid_out: bool,
    show_grid: bool,

    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,

    display: Option<Arc<dyn DisplayDevice>>,
    metrics: Arc<dyn FontMetrics>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("graph", &self.graph.name())
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("scene_rect", &self.scene_rect)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn apply_defaults(graph: &mut Graph, kind: AttrKind, list: &NameValueList) {
    for (name, value) in list {
        if let Err(err) = graph.set_default(kind, name, value) {
            tracing::warn!(%kind, name = name.as_str(), %err, "attribute default rejected");
        }
    }
}

impl Canvas {
    /// Opens an empty directed graph named `name`.
    pub fn new(name: &str, settings: CanvasSettings) -> Self {
        Self::adopt(Graph::open(name), settings)
    }

    /// Like [`Canvas::new`], with an initial scene rectangle used until the first layout.
    pub fn with_scene_rect(name: &str, scene_rect: Rect, settings: CanvasSettings) -> Self {
        let mut canvas = Self::new(name, settings);
        canvas.scene_rect = scene_rect.abs();
        canvas
    }

    /// Parses a DOT description and adds an item for every node and edge in it.
    pub fn from_dot(data: &str, settings: CanvasSettings) -> Result<Self> {
        let graph = dotlayout::parse(data)?;
        let mut canvas = Self::adopt(graph, settings);
        let nodes: Vec<NodeId> = canvas.graph.nodes().collect();
        for node in nodes {
            canvas.push_node(node);
            let out: Vec<EdgeId> = canvas.graph.out_edges(node).to_vec();
            for edge in out {
                canvas.push_edge(edge);
            }
        }
        tracing::debug!(
            nodes = canvas.nodes.len(),
            edges = canvas.edges.len(),
            "canvas populated from DOT"
        );
        Ok(canvas)
    }

    /// Wraps an existing graph without creating any items.
    fn adopt(mut graph: Graph, settings: CanvasSettings) -> Self {
        apply_defaults(&mut graph, AttrKind::Graph, &settings.graph_attributes);
        apply_defaults(&mut graph, AttrKind::Node, &settings.node_attributes);
        apply_defaults(&mut graph, AttrKind::Edge, &settings.edge_attributes);
        Self {
            graph,
            context: Context::new(),
            settings,
            nodes: Vec::new(),
            node_index: FxHashMap::default(),
            edges: Vec::new(),
            edge_index: FxHashMap::default(),
            order: Vec::new(),
            scene_rect: Rect::ZERO,
            laid_out: false,
            show_grid: false,
            observers: Vec::new(),
            next_subscription: 0,
            display: None,
            metrics: Arc::new(DeterministicFontMetrics::default()),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn set_layout_context(&mut self, context: Context) {
        self.context = context;
    }

    pub fn set_display_device(&mut self, device: Option<Arc<dyn DisplayDevice>>) {
        self.display = device;
    }

    pub fn set_font_metrics(&mut self, metrics: Arc<dyn FontMetrics>) {
        self.metrics = metrics;
    }

    pub fn state(&self) -> CanvasState {
        if self.laid_out {
            CanvasState::LaidOut
        } else if self.order.is_empty() {
            CanvasState::Empty
        } else {
            CanvasState::Populated
        }
    }

    pub fn scene_rect(&self) -> Rect {
        self.scene_rect
    }

    fn push_node(&mut self, node: NodeId) {
        if self.node_index.contains_key(&node) {
            return;
        }
        self.node_index.insert(node, self.nodes.len());
        self.nodes.push(NodeItem::new(node));
        self.order.push(ItemId::Node(node));
    }

    fn push_edge(&mut self, edge: EdgeId) {
        if self.edge_index.contains_key(&edge) {
            return;
        }
        self.edge_index.insert(edge, self.edges.len());
        self.edges.push(EdgeItem::new(edge));
        self.order.push(ItemId::Edge(edge));
    }

    /// Adds (or finds) the node `name`, labels it with its name and wraps it in an item.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        let node = self.graph.add_node(name);
        if let Err(err) = self.graph.set_node_attr(node, "label", name) {
            tracing::warn!(%err, "could not label node");
        }
        self.push_node(node);
        node
    }

    /// Adds an edge from `tail` to `head`. A non-empty `name` keys the edge among parallel
    /// edges and becomes its label. Both ends must be nodes of this canvas.
    pub fn add_edge(&mut self, tail: NodeId, head: NodeId, name: &str) -> Result<EdgeId> {
        for node in [tail, head] {
            if !self.node_index.contains_key(&node) {
                return Err(Error::UnknownItem(format!("node {}", node.index())));
            }
        }
        let key = (!name.is_empty()).then_some(name);
        let edge = self.graph.add_edge(tail, head, key);
        if let Some(label) = key {
            if let Err(err) = self.graph.set_edge_attr(edge, "label", label) {
                tracing::warn!(%err, "could not label edge");
            }
        }
        self.push_edge(edge);
        Ok(edge)
    }

    pub fn set_graph_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_default(AttrKind::Graph, name, value)
    }

    /// Sets the default of a node attribute for every node.
    pub fn set_node_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_default(AttrKind::Node, name, value)
    }

    /// Sets the default of an edge attribute for every edge.
    pub fn set_edge_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.set_default(AttrKind::Edge, name, value)
    }

    fn set_default(&mut self, kind: AttrKind, name: &str, value: &str) -> Result<()> {
        self.graph.set_default(kind, name, value).map_err(|err| {
            tracing::warn!(%kind, name, %err, "attribute default rejected");
            Error::from(err)
        })
    }

    pub fn set_node_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        if !self.node_index.contains_key(&node) {
            return Err(Error::UnknownItem(format!("node {}", node.index())));
        }
        self.graph.set_node_attr(node, name, value).map_err(|err| {
            tracing::warn!(name, %err, "node attribute rejected");
            Error::from(err)
        })
    }

    pub fn set_edge_attr(&mut self, edge: EdgeId, name: &str, value: &str) -> Result<()> {
        if !self.edge_index.contains_key(&edge) {
            return Err(Error::UnknownItem(format!("edge {}", edge.index())));
        }
        self.graph.set_edge_attr(edge, name, value).map_err(|err| {
            tracing::warn!(name, %err, "edge attribute rejected");
            Error::from(err)
        })
    }

    pub fn node_item(&self, node: NodeId) -> Option<&NodeItem> {
        self.node_index.get(&node).map(|&i| &self.nodes[i])
    }

    pub fn edge_item(&self, edge: EdgeId) -> Option<&EdgeItem> {
        self.edge_index.get(&edge).map(|&i| &self.edges[i])
    }

    pub fn nodes(&self) -> &[NodeItem] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeItem] {
        &self.edges
    }

    /// Runs the layout engine and refreshes every item.
    ///
    /// On failure the canvas keeps its previous geometry, nothing is notified and `false` is
    /// returned.
    pub fn update_layout(&mut self) -> bool {
        if let Err(err) = self
            .context
            .layout(&mut self.graph, &self.settings.layout_engine)
        {
            tracing::warn!(%err, engine = %self.settings.layout_engine, "layout failed");
            return false;
        }
        self.laid_out = true;
        self.refresh();
        self.scene_rect = scene_rect(&self.graph.bounding_box());
        self.notify(&CanvasEvent::LayoutUpdated);
        true
    }

    fn refresh(&mut self) {
        let dpi = self
            .settings
            .dpi
            .filter(|dpi| *dpi > 0.0)
            .unwrap_or_else(|| logical_dpi(self.display.as_deref()));
        let ctx = RefreshContext {
            graph: &self.graph,
            height: graph_height(&self.graph),
            dpi,
            metrics: self.metrics.as_ref(),
        };
        for node in &mut self.nodes {
            node.update_state(&ctx);
        }
        for edge in &mut self.edges {
            edge.update_state(&ctx);
        }
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            dpi,
            "items refreshed"
        );
    }

    /// Registers `observer`; observers run synchronously in registration order.
    pub fn subscribe(&mut self, observer: impl FnMut(&CanvasEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: &CanvasEvent) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }

    fn selection_changed(&mut self) {
        let events: Vec<CanvasEvent> = self
            .selected_items()
            .into_iter()
            .map(|item| match item {
                ItemId::Node(n) => CanvasEvent::NodeSelected(n),
                ItemId::Edge(e) => CanvasEvent::EdgeSelected(e),
            })
            .collect();
        for event in &events {
            self.notify(event);
        }
    }

    /// Selects or deselects one item. Every change re-announces the whole selection.
    pub fn set_selected(&mut self, item: ItemId, selected: bool) -> Result<()> {
        let changed = match item {
            ItemId::Node(n) => {
                let i = *self
                    .node_index
                    .get(&n)
                    .ok_or_else(|| Error::UnknownItem(format!("node {}", n.index())))?;
                self.nodes[i].set_selected(selected)
            }
            ItemId::Edge(e) => {
                let i = *self
                    .edge_index
                    .get(&e)
                    .ok_or_else(|| Error::UnknownItem(format!("edge {}", e.index())))?;
                self.edges[i].set_selected(selected)
            }
        };
        if changed {
            self.selection_changed();
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        let mut changed = false;
        for node in &mut self.nodes {
            changed |= node.set_selected(false);
        }
        for edge in &mut self.edges {
            changed |= edge.set_selected(false);
        }
        if changed {
            self.selection_changed();
        }
    }

    /// Selected items in insertion order.
    pub fn selected_items(&self) -> Vec<ItemId> {
        self.order
            .iter()
            .copied()
            .filter(|item| match item {
                ItemId::Node(n) => self.node_item(*n).is_some_and(NodeItem::is_selected),
                ItemId::Edge(e) => self.edge_item(*e).is_some_and(EdgeItem::is_selected),
            })
            .collect()
    }

    /// Topmost item whose outline contains `scene_point`.
    pub fn item_at(&self, scene_point: Point) -> Option<ItemId> {
        self.order.iter().rev().copied().find(|item| match item {
            ItemId::Node(n) => self.node_item(*n).is_some_and(|it| it.contains(scene_point)),
            ItemId::Edge(e) => self.edge_item(*e).is_some_and(|it| it.contains(scene_point)),
        })
    }

    pub fn show_grid(&mut self, show: bool) {
        self.show_grid = show;
    }

    pub fn is_grid_shown(&self) -> bool {
        self.show_grid
    }

    fn draw_background(&self, painter: &mut dyn Painter) {
        if !self.show_grid {
            return;
        }
        let r = self.scene_rect;
        let grid = Pen::new(Color::rgb(240, 240, 240), 1.0);
        let mut x = r.x0;
        while x <= r.x1 {
            painter.draw_line(Line::new((x, r.y0), (x, r.y1)), &grid);
            x += GRID_STEP;
        }
        let mut y = r.y0;
        while y <= r.y1 {
            painter.draw_line(Line::new((r.x0, y), (r.x1, y)), &grid);
            y += GRID_STEP;
        }
        painter.draw_rect(r, &Pen::new(Color::rgb(128, 128, 128), 1.5));
    }

    /// Paints the background and then every item in insertion order.
    pub fn paint(&self, painter: &mut dyn Painter) {
        self.draw_background(painter);
        for item in &self.order {
            match item {
                ItemId::Node(n) => {
                    if let Some(node) = self.node_item(*n) {
                        node.paint(painter);
                    }
                }
                ItemId::Edge(e) => {
                    if let Some(edge) = self.edge_item(*e) {
                        edge.paint(painter);
                    }
                }
            }
        }
    }

    /// Paints the scene into an SVG document sized to the scene rectangle.
    pub fn render_svg(&self) -> String {
        let mut painter = SvgPainter::new(self.scene_rect);
        self.paint(&mut painter);
        painter.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn states_follow_population_and_layout() {
        let mut canvas = Canvas::new("g", CanvasSettings::default());
        assert_eq!(canvas.state(), CanvasState::Empty);
        let a = canvas.add_node("a");
        let b = canvas.add_node("b");
        canvas.add_edge(a, b, "").unwrap();
        assert_eq!(canvas.state(), CanvasState::Populated);
        assert!(canvas.update_layout());
        assert_eq!(canvas.state(), CanvasState::LaidOut);
    }

    #[test]
    fn edges_need_both_ends_on_the_canvas() {
        let mut other = Graph::open("other");
        other.add_node("x");
        other.add_node("y");
        let foreign = other.add_node("z");

        let mut canvas = Canvas::new("g", CanvasSettings::default());
        let a = canvas.add_node("a");
        assert!(matches!(
            canvas.add_edge(a, foreign, ""),
            Err(Error::UnknownItem(_))
        ));
        assert!(matches!(
            canvas.add_edge(foreign, a, "x"),
            Err(Error::UnknownItem(_))
        ));
        assert_eq!(canvas.graph().edge_count(), 0);
        assert!(canvas.edges().is_empty());
        assert!(canvas.add_edge(a, a, "").is_ok());
    }

    #[test]
    fn adding_a_node_twice_keeps_one_item() {
        let mut canvas = Canvas::new("g", CanvasSettings::default());
        let a = canvas.add_node("a");
        assert_eq!(canvas.add_node("a"), a);
        assert_eq!(canvas.nodes().len(), 1);
        assert_eq!(canvas.graph().node_attr(a, "label"), Some("a"));
    }

    #[test]
    fn failed_layout_keeps_state_and_stays_quiet() {
        let settings = CanvasSettings {
            layout_engine: "neato".to_string(),
            ..CanvasSettings::default()
        };
        let mut canvas = Canvas::new("g", settings);
        canvas.add_node("a");
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        canvas.subscribe(move |e| sink.borrow_mut().push(*e));
        assert!(!canvas.update_layout());
        assert_eq!(canvas.state(), CanvasState::Populated);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn unsubscribed_observers_are_not_called() {
        let mut canvas = Canvas::new("g", CanvasSettings::default());
        canvas.add_node("a");
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = canvas.subscribe(move |_| *sink.borrow_mut() += 1);
        assert!(canvas.update_layout());
        assert!(canvas.unsubscribe(id));
        assert!(!canvas.unsubscribe(id));
        assert!(canvas.update_layout());
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn grid_lines_cover_the_scene() {
        struct Count {
            lines: usize,
            rects: usize,
        }
        impl Painter for Count {
            fn begin_item(&mut self, _: kurbo::Vec2, _: Option<&crate::ColorizeEffect>) {}
            fn end_item(&mut self) {}
            fn draw_path(&mut self, _: &kurbo::BezPath, _: Option<&Pen>, _: Option<Color>) {}
            fn draw_line(&mut self, _: Line, _: &Pen) {
                self.lines += 1;
            }
            fn draw_rect(&mut self, _: Rect, _: &Pen) {
                self.rects += 1;
            }
            fn draw_text(&mut self, _: &crate::TextRun, _: &crate::Font, _: Color, _: Option<&Pen>) {}
        }

        let mut canvas = Canvas::with_scene_rect(
            "g",
            Rect::new(0.0, 0.0, 30.0, 20.0),
            CanvasSettings::default(),
        );
        let mut count = Count { lines: 0, rects: 0 };
        canvas.paint(&mut count);
        assert_eq!(count.lines, 0);

        canvas.show_grid(true);
        canvas.paint(&mut count);
        assert_eq!(count.lines, 4 + 3);
        assert_eq!(count.rects, 1);
    }
}
