//! Cycle breaking and rank assignment.

use super::size::EdgeSpec;
use std::collections::VecDeque;

/// Marks the edges that must be reversed to make the graph acyclic.
///
/// Depth-first search from every node in insertion order; an edge back into the current DFS
/// stack is a feedback edge. Self loops never constrain ranking and are left alone.
pub(crate) fn feedback_edges(node_count: usize, edges: &[EdgeSpec]) -> Vec<bool> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (i, e) in edges.iter().enumerate() {
        if e.tail != e.head {
            out[e.tail.index()].push(i);
        }
    }

    let mut reversed = vec![false; edges.len()];
    let mut visited = vec![false; node_count];
    let mut on_stack = vec![false; node_count];

    for root in 0..node_count {
        if visited[root] {
            continue;
        }
        // Iterative DFS: (node, next out-edge cursor).
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        visited[root] = true;
        on_stack[root] = true;
        while let Some(top) = stack.last_mut() {
            let (v, cursor) = *top;
            top.1 += 1;
            let Some(&ei) = out[v].get(cursor) else {
                on_stack[v] = false;
                stack.pop();
                continue;
            };
            let w = edges[ei].head.index();
            if on_stack[w] {
                reversed[ei] = true;
            } else if !visited[w] {
                visited[w] = true;
                on_stack[w] = true;
                stack.push((w, 0));
            }
        }
    }
    reversed
}

/// Longest-path ranks over the acyclic orientation, honoring `minlen`.
///
/// Nodes are visited in Kahn order with the initial queue in insertion order. If a cycle
/// survives (it cannot after `feedback_edges`), insertion order is used instead.
pub(crate) fn assign(node_count: usize, edges: &[EdgeSpec], reversed: &[bool]) -> Vec<usize> {
    let oriented = |i: usize| {
        let e = &edges[i];
        if reversed[i] {
            (e.head.index(), e.tail.index())
        } else {
            (e.tail.index(), e.head.index())
        }
    };

    let mut out: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut indegree = vec![0usize; node_count];
    for i in 0..edges.len() {
        let (v, w) = oriented(i);
        if v == w {
            continue;
        }
        out[v].push(i);
        indegree[w] += 1;
    }

    let mut queue: VecDeque<usize> = (0..node_count).filter(|&v| indegree[v] == 0).collect();
    let mut topo = Vec::with_capacity(node_count);
    while let Some(v) = queue.pop_front() {
        topo.push(v);
        for &i in &out[v] {
            let (_, w) = oriented(i);
            indegree[w] = indegree[w].saturating_sub(1);
            if indegree[w] == 0 {
                queue.push_back(w);
            }
        }
    }
    if topo.len() != node_count {
        tracing::warn!("cycle left after feedback edge removal; ranking in insertion order");
        topo = (0..node_count).collect();
    }

    let mut rank = vec![0usize; node_count];
    for &v in &topo {
        for &i in &out[v] {
            let (_, w) = oriented(i);
            let next = rank[v].saturating_add(edges[i].minlen);
            if next > rank[w] {
                rank[w] = next;
            }
        }
    }
    rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn specs(g: &Graph) -> Vec<EdgeSpec> {
        g.edges()
            .map(|e| EdgeSpec {
                tail: g.tail(e),
                head: g.head(e),
                minlen: 1,
                label: None,
                tail_arrow: false,
                head_arrow: true,
                arrow_len: 10.0,
            })
            .collect()
    }

    #[test]
    fn chain_ranks_follow_edges() {
        let mut g = Graph::open("g");
        let a = g.add_node("a");
        let b = g.add_node("b");
        let c = g.add_node("c");
        g.add_edge(b, c, None);
        g.add_edge(a, b, None);
        g.add_edge(a, c, None);
        let edges = specs(&g);
        let reversed = feedback_edges(3, &edges);
        assert!(reversed.iter().all(|r| !r));
        assert_eq!(assign(3, &edges, &reversed), vec![0, 1, 2]);
    }

    #[test]
    fn cycles_are_broken_by_reversing_the_back_edge() {
        let mut g = Graph::open("g");
        let a = g.add_node("a");
        let b = g.add_node("b");
        let c = g.add_node("c");
        g.add_edge(a, b, None);
        g.add_edge(b, c, None);
        g.add_edge(c, a, None);
        g.add_edge(c, c, None);
        let edges = specs(&g);
        let reversed = feedback_edges(3, &edges);
        assert_eq!(reversed, vec![false, false, true, false]);
        assert_eq!(assign(3, &edges, &reversed), vec![0, 1, 2]);
    }

    #[test]
    fn minlen_stretches_ranks() {
        let mut g = Graph::open("g");
        let a = g.add_node("a");
        let b = g.add_node("b");
        g.add_edge(a, b, None);
        let mut edges = specs(&g);
        edges[0].minlen = 3;
        let reversed = feedback_edges(2, &edges);
        assert_eq!(assign(2, &edges, &reversed), vec![0, 3]);
    }
}
