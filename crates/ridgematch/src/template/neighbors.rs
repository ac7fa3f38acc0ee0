//! Bounded neighbor stars.
//!
//! Each minutia keeps edges to at most `edge_table_neighbors` other minutiae,
//! nearest first. Matching cost is then O(n·k) instead of O(n²).

use crate::cfg::MatchCfg;
use crate::edge::EdgeShape;
use crate::geom::length_sq;

use super::types::Minutia;

/// Edge from a reference minutia (implicit: the star's owner) to `neighbor`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeighborEdge {
    pub shape: EdgeShape,
    pub neighbor: usize,
}

/// Build the star of every minutia, each sorted by (length, neighbor index).
pub fn build_edge_table(minutiae: &[Minutia], cfg: &MatchCfg) -> Vec<Vec<NeighborEdge>> {
    let n = minutiae.len();
    let cap = cfg.edge_table_neighbors;
    let mut table = Vec::with_capacity(n);
    let mut sq_distances = vec![0i32; n];
    let mut star: Vec<NeighborEdge> = Vec::new();
    for (reference, rm) in minutiae.iter().enumerate() {
        let rpos = rm.position;
        let max_sq = if n - 1 > cap {
            for (d, m) in sq_distances.iter_mut().zip(minutiae) {
                *d = length_sq(m.position - rpos);
            }
            sq_distances.sort_unstable();
            // Index 0 is the reference itself at distance 0.
            sq_distances[cap]
        } else {
            cfg.edge_table_range.saturating_mul(cfg.edge_table_range)
        };
        for (neighbor, nm) in minutiae.iter().enumerate() {
            if neighbor != reference && length_sq(nm.position - rpos) <= max_sq {
                star.push(NeighborEdge {
                    shape: EdgeShape::new(rm, nm),
                    neighbor,
                });
            }
        }
        star.sort_by(|a, b| {
            a.shape
                .length
                .cmp(&b.shape.length)
                .then(a.neighbor.cmp(&b.neighbor))
        });
        star.truncate(cap);
        table.push(std::mem::take(&mut star));
    }
    table
}
