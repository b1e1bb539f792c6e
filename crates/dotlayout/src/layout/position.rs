//! Coordinate assignment.
//!
//! Ranks are stacked along the rank axis and every rank is centered on the cross axis. The
//! result is mapped from the internal frame (rank axis downward) to the drawing frame with the
//! origin at the bottom left and `y` growing upward.

use super::RankDir;
use super::order::Layering;
use crate::geom::{Point, point};

#[derive(Debug, Clone)]
pub(crate) struct Spacing {
    pub rankdir: RankDir,
    /// Gap between neighbors in a rank, in points.
    pub node_sep: f64,
    /// Gap between ranks, in points.
    pub rank_sep: f64,
    /// Extra gap after each rank (edge labels).
    pub gap_extra: Vec<f64>,
}

/// Extent of a vertex as `(cross, along)` in the internal frame.
pub(crate) type Extent = (f64, f64);

pub(crate) fn assign(layering: &Layering, extents: &[Extent], spacing: &Spacing) -> Vec<Point> {
    let layers = &layering.layers;

    let mut rank_heights = Vec::with_capacity(layers.len());
    let mut rank_widths = Vec::with_capacity(layers.len());
    for layer in layers {
        let mut h: f64 = 0.0;
        let mut w: f64 = 0.0;
        for (i, &v) in layer.iter().enumerate() {
            let (cross, along) = extents[v];
            h = h.max(along);
            w += cross;
            if i + 1 < layer.len() {
                w += spacing.node_sep;
            }
        }
        rank_heights.push(h);
        rank_widths.push(w);
    }
    let max_rank_width = rank_widths.iter().copied().fold(0.0_f64, f64::max);

    let mut internal = vec![(0.0, 0.0); layering.vertices.len()];
    let mut y_cursor: f64 = 0.0;
    for (r, layer) in layers.iter().enumerate() {
        let y = y_cursor + rank_heights[r] / 2.0;
        let mut x_cursor = (max_rank_width - rank_widths[r]) / 2.0;
        for &v in layer {
            let (cross, _) = extents[v];
            internal[v] = (x_cursor + cross / 2.0, y);
            x_cursor += cross + spacing.node_sep;
        }
        y_cursor += rank_heights[r];
        if r + 1 < layers.len() {
            y_cursor += spacing.rank_sep + spacing.gap_extra.get(r).copied().unwrap_or(0.0);
        }
    }
    let total_along = y_cursor;

    internal
        .into_iter()
        .map(|(x, y)| match spacing.rankdir {
            RankDir::TB => point(x, total_along - y),
            RankDir::BT => point(x, y),
            RankDir::LR => point(y, max_rank_width - x),
            RankDir::RL => point(total_along - y, max_rank_width - x),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spacing(rankdir: RankDir) -> Spacing {
        Spacing {
            rankdir,
            node_sep: 18.0,
            rank_sep: 36.0,
            gap_extra: Vec::new(),
        }
    }

    #[test]
    fn top_to_bottom_puts_rank_zero_on_top() {
        let layering = Layering::new(&[0, 1], &[(0, 1)]);
        let extents = [(54.0, 36.0), (54.0, 36.0)];
        let pts = assign(&layering, &extents, &spacing(RankDir::TB));
        assert_eq!(pts[0], point(27.0, 90.0));
        assert_eq!(pts[1], point(27.0, 18.0));
    }

    #[test]
    fn left_to_right_puts_rank_zero_on_the_left() {
        let layering = Layering::new(&[0, 1, 1], &[(0, 1), (0, 2)]);
        let extents = [(36.0, 54.0); 3];
        let pts = assign(&layering, &extents, &spacing(RankDir::LR));
        assert!(pts[0].x < pts[1].x);
        assert_eq!(pts[1].x, pts[2].x);
        // First vertex in the rank is on top.
        assert!(pts[1].y > pts[2].y);
    }

    #[test]
    fn ranks_are_centered() {
        let layering = Layering::new(&[0, 1, 1], &[(0, 1), (0, 2)]);
        let extents = [(54.0, 36.0); 3];
        let pts = assign(&layering, &extents, &spacing(RankDir::TB));
        assert_eq!(pts[0].x, (pts[1].x + pts[2].x) / 2.0);
    }
}
