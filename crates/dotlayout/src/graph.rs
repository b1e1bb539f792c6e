//! Graph record store.
//!
//! Nodes and edges are owned by the graph and addressed through copyable handles that stay
//! valid for the lifetime of the graph. Iteration always follows creation order.

use crate::attr::{AttrDefaults, AttrKind, AttrValues};
use crate::error::Result;
use crate::geom::BoundingBox;
use crate::model::{EdgeLayout, GraphLayout, NodeLayout};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EdgeKey {
    tail: NodeId,
    head: NodeId,
    name: String,
}

#[derive(Debug, Clone)]
struct NodeRecord {
    name: String,
    attrs: AttrValues,
    out_edges: Vec<EdgeId>,
    in_edges: Vec<EdgeId>,
    layout: Option<NodeLayout>,
}

#[derive(Debug, Clone)]
struct EdgeRecord {
    tail: NodeId,
    head: NodeId,
    name: Option<String>,
    attrs: AttrValues,
    layout: Option<EdgeLayout>,
}

#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    directed: bool,
    strict: bool,

    defaults: AttrDefaults,
    attrs: AttrValues,

    nodes: Vec<NodeRecord>,
    node_index: FxHashMap<String, NodeId>,

    edges: Vec<EdgeRecord>,
    edge_index: FxHashMap<EdgeKey, EdgeId>,

    layout: Option<GraphLayout>,
}

impl Graph {
    /// Opens an empty directed graph.
    pub fn open(name: impl Into<String>) -> Self {
        Self::with_kind(name, true, false)
    }

    pub fn with_kind(name: impl Into<String>, directed: bool, strict: bool) -> Self {
        Self {
            name: name.into(),
            directed,
            strict,
            defaults: AttrDefaults::default(),
            attrs: AttrValues::default(),
            nodes: Vec::new(),
            node_index: FxHashMap::default(),
            edges: Vec::new(),
            edge_index: FxHashMap::default(),
            layout: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the node named `name`, creating it when missing.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.node_index.get(name) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord {
            name: name.to_string(),
            attrs: AttrValues::default(),
            out_edges: Vec::new(),
            in_edges: Vec::new(),
            layout: None,
        });
        self.node_index.insert(name.to_string(), id);
        id
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    /// Returns the edge `tail -> head` called `name`, creating it when missing.
    ///
    /// Unnamed edges are always created, so parallel edges are allowed unless the graph is
    /// strict, in which case any existing `tail -> head` edge is returned.
    pub fn add_edge(&mut self, tail: NodeId, head: NodeId, name: Option<&str>) -> EdgeId {
        if let Some(id) = name.and_then(|n| self.find_named_edge(tail, head, n)) {
            return id;
        }
        if self.strict {
            if let Some(id) = self.first_edge_between(tail, head) {
                return id;
            }
        }

        let id = EdgeId(self.edges.len());
        let name = name.filter(|n| !n.is_empty()).map(str::to_string);
        if let Some(name) = &name {
            self.edge_index.insert(
                EdgeKey {
                    tail,
                    head,
                    name: name.clone(),
                },
                id,
            );
        }
        self.edges.push(EdgeRecord {
            tail,
            head,
            name,
            attrs: AttrValues::default(),
            layout: None,
        });
        self.nodes[tail.0].out_edges.push(id);
        self.nodes[head.0].in_edges.push(id);
        id
    }

    /// Finds the edge `tail -> head` keyed by `name`; without a name, the first edge between
    /// the pair.
    pub fn find_edge(&self, tail: NodeId, head: NodeId, name: Option<&str>) -> Option<EdgeId> {
        match name.filter(|n| !n.is_empty()) {
            Some(name) => self.find_named_edge(tail, head, name),
            None => self.first_edge_between(tail, head),
        }
    }

    fn find_named_edge(&self, tail: NodeId, head: NodeId, name: &str) -> Option<EdgeId> {
        if name.is_empty() {
            return None;
        }
        self.edge_index
            .get(&EdgeKey {
                tail,
                head,
                name: name.to_string(),
            })
            .copied()
    }

    fn first_edge_between(&self, tail: NodeId, head: NodeId) -> Option<EdgeId> {
        self.nodes
            .get(tail.0)?
            .out_edges
            .iter()
            .copied()
            .find(|e| self.edges[e.0].head == head)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.nodes[node.0].out_edges
    }

    pub fn in_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.nodes[node.0].in_edges
    }

    pub fn node_name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    pub fn edge_name(&self, edge: EdgeId) -> Option<&str> {
        self.edges[edge.0].name.as_deref()
    }

    pub fn tail(&self, edge: EdgeId) -> NodeId {
        self.edges[edge.0].tail
    }

    pub fn head(&self, edge: EdgeId) -> NodeId {
        self.edges[edge.0].head
    }

    pub fn defaults(&self) -> &AttrDefaults {
        &self.defaults
    }

    /// Declares `name` for every object of `kind`, with `value` as its default.
    pub fn set_default(&mut self, kind: AttrKind, name: &str, value: &str) -> Result<()> {
        self.defaults.declare(kind, name, value)
    }

    pub fn set_graph_attr(&mut self, name: &str, value: &str) -> Result<()> {
        self.defaults.declare_if_missing(AttrKind::Graph, name, "")?;
        self.attrs.set(name, value);
        Ok(())
    }

    pub fn set_node_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.defaults.declare_if_missing(AttrKind::Node, name, "")?;
        self.nodes[node.0].attrs.set(name, value);
        Ok(())
    }

    pub fn set_edge_attr(&mut self, edge: EdgeId, name: &str, value: &str) -> Result<()> {
        self.defaults.declare_if_missing(AttrKind::Edge, name, "")?;
        self.edges[edge.0].attrs.set(name, value);
        Ok(())
    }

    /// Value set on the graph, else the declared default.
    pub fn graph_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .get(name)
            .or_else(|| self.defaults.get(AttrKind::Graph, name))
    }

    pub fn node_attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0]
            .attrs
            .get(name)
            .or_else(|| self.defaults.get(AttrKind::Node, name))
    }

    pub fn edge_attr(&self, edge: EdgeId, name: &str) -> Option<&str> {
        self.edges[edge.0]
            .attrs
            .get(name)
            .or_else(|| self.defaults.get(AttrKind::Edge, name))
    }

    pub fn node_attrs(&self, node: NodeId) -> &AttrValues {
        &self.nodes[node.0].attrs
    }

    pub fn edge_attrs(&self, edge: EdgeId) -> &AttrValues {
        &self.edges[edge.0].attrs
    }

    /// Global bounding box of the last layout; a zero box before any layout.
    pub fn bounding_box(&self) -> BoundingBox {
        self.layout
            .as_ref()
            .map(|l| l.bb)
            .unwrap_or_else(BoundingBox::zero)
    }

    pub fn is_laid_out(&self) -> bool {
        self.layout.is_some()
    }

    pub fn node_layout(&self, node: NodeId) -> Option<&NodeLayout> {
        self.nodes[node.0].layout.as_ref()
    }

    pub fn edge_layout(&self, edge: EdgeId) -> Option<&EdgeLayout> {
        self.edges[edge.0].layout.as_ref()
    }

    pub(crate) fn store_layout(
        &mut self,
        graph: GraphLayout,
        nodes: Vec<(NodeId, NodeLayout)>,
        edges: Vec<(EdgeId, EdgeLayout)>,
    ) {
        for n in &mut self.nodes {
            n.layout = None;
        }
        for e in &mut self.edges {
            e.layout = None;
        }
        for (id, layout) in nodes {
            self.nodes[id.0].layout = Some(layout);
        }
        for (id, layout) in edges {
            self.edges[id.0].layout = Some(layout);
        }
        self.layout = Some(graph);
    }
}
