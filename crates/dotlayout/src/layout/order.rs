//! Virtual nodes and in-rank ordering.
//!
//! Edges spanning several ranks are split into chains of virtual vertices, one per crossed
//! rank. The initial order is a depth-first walk in node insertion order; it is refined by
//! alternating barycenter sweeps, keeping the order with the fewest crossings.

const SWEEPS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Vertex {
    Node(usize),
    /// Virtual vertex of edge `edge`.
    Virtual { edge: usize },
}

#[derive(Debug, Clone)]
pub(crate) struct Layering {
    pub vertices: Vec<Vertex>,
    pub rank: Vec<usize>,
    /// Ranked vertex indices, left to right.
    pub layers: Vec<Vec<usize>>,
    /// Per edge: vertices from the lower rank end to the higher one; empty for self loops.
    pub chains: Vec<Vec<usize>>,
    /// Adjacent-rank links as `(upper, lower)` vertex indices.
    links: Vec<(usize, usize)>,
}

impl Layering {
    /// Builds the layered graph. `oriented` gives each edge's `(upper, lower)` node pair.
    pub(crate) fn new(node_rank: &[usize], oriented: &[(usize, usize)]) -> Self {
        let mut vertices: Vec<Vertex> = (0..node_rank.len()).map(Vertex::Node).collect();
        let mut rank = node_rank.to_vec();
        let mut chains = Vec::with_capacity(oriented.len());
        let mut links = Vec::new();

        for (edge, &(u, w)) in oriented.iter().enumerate() {
            if u == w {
                chains.push(Vec::new());
                continue;
            }
            let mut chain = vec![u];
            for r in rank[u] + 1..rank[w] {
                let v = vertices.len();
                vertices.push(Vertex::Virtual { edge });
                rank.push(r);
                chain.push(v);
            }
            chain.push(w);
            for pair in chain.windows(2) {
                if rank[pair[1]] == rank[pair[0]] + 1 {
                    links.push((pair[0], pair[1]));
                }
            }
            chains.push(chain);
        }

        let layer_count = rank.iter().copied().max().map_or(0, |r| r + 1);
        let mut layering = Self {
            vertices,
            rank,
            layers: vec![Vec::new(); layer_count],
            chains,
            links,
        };
        layering.init_order();
        layering
    }

    fn successors(&self) -> Vec<Vec<usize>> {
        let mut succ = vec![Vec::new(); self.vertices.len()];
        for &(u, w) in &self.links {
            succ[u].push(w);
        }
        succ
    }

    fn predecessors(&self) -> Vec<Vec<usize>> {
        let mut pred = vec![Vec::new(); self.vertices.len()];
        for &(u, w) in &self.links {
            pred[w].push(u);
        }
        pred
    }

    fn init_order(&mut self) {
        let succ = self.successors();
        let mut visited = vec![false; self.vertices.len()];
        let mut roots: Vec<usize> = (0..self.vertices.len()).collect();
        roots.sort_by_key(|&v| self.rank[v]);

        for root in roots {
            let mut stack = vec![root];
            while let Some(v) = stack.pop() {
                if visited[v] {
                    continue;
                }
                visited[v] = true;
                self.layers[self.rank[v]].push(v);
                for &w in succ[v].iter().rev() {
                    if !visited[w] {
                        stack.push(w);
                    }
                }
            }
        }
    }

    /// Position of every vertex within its layer.
    pub(crate) fn positions(&self) -> Vec<usize> {
        let mut pos = vec![0; self.vertices.len()];
        for layer in &self.layers {
            for (i, &v) in layer.iter().enumerate() {
                pos[v] = i;
            }
        }
        pos
    }

    pub(crate) fn crossings(&self) -> usize {
        let pos = self.positions();
        let mut by_layer: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.layers.len()];
        for &(u, w) in &self.links {
            by_layer[self.rank[u]].push((pos[u], pos[w]));
        }
        by_layer
            .into_iter()
            .enumerate()
            .map(|(r, mut pairs)| {
                let south = self.layers.get(r + 1).map_or(0, Vec::len);
                pairs.sort_unstable();
                two_layer_crossings(&pairs, south)
            })
            .sum()
    }

    pub(crate) fn minimize_crossings(&mut self) {
        if self.layers.len() < 2 {
            return;
        }
        let pred = self.predecessors();
        let succ = self.successors();

        let mut best = self.layers.clone();
        let mut best_cc = self.crossings();
        for sweep in 0..SWEEPS {
            if best_cc == 0 {
                break;
            }
            if sweep % 2 == 0 {
                for r in 1..self.layers.len() {
                    self.sort_layer(r, &pred);
                }
            } else {
                for r in (0..self.layers.len() - 1).rev() {
                    self.sort_layer(r, &succ);
                }
            }
            let cc = self.crossings();
            if cc < best_cc {
                best_cc = cc;
                best = self.layers.clone();
            }
        }
        self.layers = best;
        tracing::debug!(crossings = best_cc, "ordered ranks");
    }

    /// Reorders layer `r` by the mean position of each vertex's neighbors in `adjacent`.
    /// Vertices without neighbors keep their slot.
    fn sort_layer(&mut self, r: usize, adjacent: &[Vec<usize>]) {
        let pos = self.positions();
        let layer = &self.layers[r];
        let barycenter = |v: usize| {
            let n = &adjacent[v];
            (!n.is_empty()).then(|| n.iter().map(|&u| pos[u] as f64).sum::<f64>() / n.len() as f64)
        };

        let mut sortable: Vec<(f64, usize, usize)> = layer
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| barycenter(v).map(|b| (b, i, v)))
            .collect();
        sortable.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut sorted = sortable.into_iter().map(|(_, _, v)| v);
        let next: Vec<usize> = layer
            .iter()
            .map(|&v| {
                if barycenter(v).is_some() {
                    sorted.next().unwrap_or(v)
                } else {
                    v
                }
            })
            .collect();
        self.layers[r] = next;
    }
}

/// Counts crossings between two adjacent layers with an accumulator tree.
///
/// `pairs` are `(north, south)` positions sorted lexicographically.
fn two_layer_crossings(pairs: &[(usize, usize)], south: usize) -> usize {
    if south == 0 {
        return 0;
    }
    let mut first_index = 1usize;
    while first_index < south {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree = vec![0usize; tree_size];

    let mut cc = 0;
    for &(_, s) in pairs {
        let mut index = s + first_index;
        tree[index] += 1;
        let mut weight_sum = 0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        cc += weight_sum;
    }
    cc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_edges_get_virtual_vertices() {
        let layering = Layering::new(&[0, 1, 3], &[(0, 1), (0, 2)]);
        assert_eq!(layering.vertices.len(), 5);
        assert_eq!(layering.chains[0], vec![0, 1]);
        assert_eq!(layering.chains[1], vec![0, 3, 4, 2]);
        assert_eq!(layering.layers.len(), 4);
        assert_eq!(layering.rank[3], 1);
        assert_eq!(layering.rank[4], 2);
    }

    #[test]
    fn crossing_count_of_a_twisted_pair() {
        assert_eq!(two_layer_crossings(&[(0, 1), (1, 0)], 2), 1);
        assert_eq!(two_layer_crossings(&[(0, 0), (1, 1)], 2), 0);
        assert_eq!(two_layer_crossings(&[(0, 2), (1, 1), (2, 0)], 3), 3);
    }

    #[test]
    fn sweeps_remove_a_removable_crossing() {
        // a -> d, b -> c with c before d in the initial order.
        let mut layering = Layering::new(&[0, 0, 1, 1], &[(1, 2), (0, 3)]);
        layering.layers = vec![vec![0, 1], vec![2, 3]];
        assert_eq!(layering.crossings(), 1);
        layering.minimize_crossings();
        assert_eq!(layering.crossings(), 0);
    }
}
