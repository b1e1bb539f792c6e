//! The `"dot"` layered layout.
//!
//! Pipeline: node sizing, cycle breaking, longest-path ranking, in-rank ordering, coordinate
//! assignment and edge routing. Output follows the Graphviz conventions: points, bottom-left
//! origin, bounding box lower-left corner at `(0, 0)`.

mod order;
mod position;
mod rank;
mod route;
mod size;

use crate::geom::{
    BoundingBox, POINTS_PER_INCH, Point, Vector, centered_box, include_box, include_point, point,
};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::model::{EdgeLayout, GraphLayout, NodeLayout, TextLabel};
use crate::text::TextMeasurer;
use order::{Layering, Vertex};
use position::Spacing;
use route::NodeGeom;
use rustc_hash::FxHashMap;

const DEFAULT_NODESEP: f64 = 0.25;
const DEFAULT_RANKSEP: f64 = 0.5;
const MIN_SEP: f64 = 0.02;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankDir {
    #[default]
    TB,
    LR,
    BT,
    RL,
}

impl RankDir {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
            Some("LR") => RankDir::LR,
            Some("BT") => RankDir::BT,
            Some("RL") => RankDir::RL,
            _ => RankDir::TB,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, RankDir::LR | RankDir::RL)
    }
}

pub(crate) fn dot_layout(graph: &mut Graph, measurer: &dyn TextMeasurer) {
    let rankdir = RankDir::parse(graph.graph_attr("rankdir"));
    let horizontal = rankdir.is_horizontal();
    let node_sep = size::number(graph.graph_attr("nodesep"))
        .unwrap_or(DEFAULT_NODESEP)
        .max(MIN_SEP)
        * POINTS_PER_INCH;
    let rank_sep = size::number(graph.graph_attr("ranksep"))
        .unwrap_or(DEFAULT_RANKSEP)
        .max(MIN_SEP)
        * POINTS_PER_INCH;

    let nodes: Vec<NodeId> = graph.nodes().collect();
    let edges: Vec<EdgeId> = graph.edges().collect();
    let sized: Vec<size::SizedNode> = nodes
        .iter()
        .map(|&n| size::size_node(graph, n, rankdir, measurer))
        .collect();
    let specs: Vec<size::EdgeSpec> = edges
        .iter()
        .map(|&e| size::edge_spec(graph, e, measurer))
        .collect();

    let reversed = rank::feedback_edges(nodes.len(), &specs);
    let ranks = rank::assign(nodes.len(), &specs, &reversed);
    let oriented: Vec<(usize, usize)> = specs
        .iter()
        .zip(&reversed)
        .map(|(e, &rev)| {
            let (t, h) = (e.tail.index(), e.head.index());
            if rev { (h, t) } else { (t, h) }
        })
        .collect();

    let mut layering = Layering::new(&ranks, &oriented);
    layering.minimize_crossings();

    // Labels widen the gaps between neighbors and push apart the ranks they sit between.
    let label_extent = |l: &TextLabel| {
        if horizontal {
            (l.dimen.height, l.dimen.width)
        } else {
            (l.dimen.width, l.dimen.height)
        }
    };
    let mut node_sep = node_sep;
    let mut gap_extra = vec![0.0; layering.layers.len()];
    for (i, spec) in specs.iter().enumerate() {
        let Some(label) = &spec.label else {
            continue;
        };
        let (cross, along) = label_extent(label);
        node_sep = node_sep.max(cross);
        let chain = &layering.chains[i];
        if chain.len() >= 2 {
            let upper = chain[(chain.len() - 2) / 2];
            let r = layering.rank[upper];
            if let Some(extra) = gap_extra.get_mut(r) {
                *extra = f64::max(*extra, along);
            }
        }
    }

    let extents: Vec<position::Extent> = layering
        .vertices
        .iter()
        .map(|v| match *v {
            Vertex::Node(i) => {
                let s = sized[i].size;
                if horizontal {
                    (s.height, s.width)
                } else {
                    (s.width, s.height)
                }
            }
            Vertex::Virtual { .. } => (0.0, 0.0),
        })
        .collect();
    let coords = position::assign(
        &layering,
        &extents,
        &Spacing {
            rankdir,
            node_sep,
            rank_sep,
            gap_extra,
        },
    );

    let geoms: Vec<NodeGeom> = sized
        .iter()
        .enumerate()
        .map(|(i, s)| NodeGeom::new(coords[i], s))
        .collect();

    let mut parallel: FxHashMap<(usize, usize), (usize, usize)> = FxHashMap::default();
    for (i, &(u, w)) in oriented.iter().enumerate() {
        if u != w && layering.chains[i].len() == 2 {
            parallel.entry((u.min(w), u.max(w))).or_default().0 += 1;
        }
    }
    let mut loops: FxHashMap<usize, usize> = FxHashMap::default();

    let mut edge_layouts = Vec::with_capacity(edges.len());
    for (i, spec) in specs.iter().enumerate() {
        let (t, h) = (spec.tail.index(), spec.head.index());
        let mut label = spec.label.clone();

        let (bezier, label_anchor) = if t == h {
            let level = loops.entry(t).or_insert(0);
            let routed = route::self_loop(spec, &geoms[t], *level);
            *level += 1;
            routed
        } else {
            let mut waypoints: Vec<Point> =
                layering.chains[i].iter().map(|&v| coords[v]).collect();
            if reversed[i] {
                waypoints.reverse();
            }

            let mut bow = 0.0;
            if waypoints.len() == 2 {
                let (u, w) = oriented[i];
                if let Some((count, seen)) = parallel.get_mut(&(u.min(w), u.max(w))) {
                    bow = (*seen as f64 - (*count as f64 - 1.0) / 2.0) * route::PARALLEL_SEP;
                    // Keep the side stable whichever way the edge points.
                    if t > h {
                        bow = -bow;
                    }
                    *seen += 1;
                }
            }

            let bezier = route::route(spec, &waypoints, &geoms[t], &geoms[h], bow);
            let mut anchor = route::midpoint(&waypoints);
            if bow != 0.0 {
                if let Some(&last) = waypoints.last() {
                    let d = last - waypoints[0];
                    let len = d.length();
                    if len > 0.0 {
                        anchor += Vector::new(-d.y, d.x) / len * bow;
                    }
                }
            }
            (bezier, anchor)
        };

        if let Some(label) = &mut label {
            let offset = if horizontal {
                Vector::new(0.0, label.dimen.height / 2.0)
            } else {
                Vector::new(label.dimen.width / 2.0, 0.0)
            };
            label.pos = Some(label_anchor + offset);
        }
        edge_layouts.push(EdgeLayout {
            splines: vec![bezier],
            label,
        });
    }

    let mut node_layouts: Vec<NodeLayout> = sized
        .into_iter()
        .enumerate()
        .map(|(i, s)| NodeLayout {
            coord: coords[i],
            size: s.size,
            shape: s.shape,
            shape_info: s.shape_info,
            label: s.label,
        })
        .collect();

    let bb = normalize(&mut node_layouts, &mut edge_layouts);
    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        ranks = layering.layers.len(),
        width = bb.width(),
        height = bb.height(),
        "dot layout finished"
    );

    graph.store_layout(
        GraphLayout { bb },
        nodes.into_iter().zip(node_layouts).collect(),
        edges.into_iter().zip(edge_layouts).collect(),
    );
}

/// Translates everything so the bounding box starts at `(0, 0)`; returns that box.
fn normalize(nodes: &mut [NodeLayout], edges: &mut [EdgeLayout]) -> BoundingBox {
    let mut bb: Option<BoundingBox> = None;
    for n in nodes.iter() {
        include_box(&mut bb, centered_box(n.coord, n.size));
    }
    for e in edges.iter() {
        for b in &e.splines {
            for &p in b.points.iter().chain(b.start.iter()).chain(b.end.iter()) {
                include_point(&mut bb, p);
            }
        }
        if let Some(label) = &e.label {
            if let Some(pos) = label.pos {
                include_box(&mut bb, centered_box(pos, label.dimen));
            }
        }
    }
    let Some(bb) = bb else {
        return BoundingBox::zero();
    };

    let shift = point(0.0, 0.0) - bb.min;
    for n in nodes.iter_mut() {
        n.coord += shift;
    }
    for e in edges.iter_mut() {
        for b in &mut e.splines {
            for p in b.points.iter_mut().chain(b.start.iter_mut()).chain(b.end.iter_mut()) {
                *p += shift;
            }
        }
        if let Some(pos) = e.label.as_mut().and_then(|l| l.pos.as_mut()) {
            *pos += shift;
        }
    }
    bb.translate(shift)
}
