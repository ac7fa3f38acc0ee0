//! Edge spider: grows one root into a consistent set of pairs.
//!
//! The most recently accepted pair's neighbor stars (probe and candidate side,
//! both sorted by length) are merge-joined; every edge pair whose shapes agree
//! proposes a new minutia pair. Free proposals go onto a frontier ordered by
//! edge length, shortest first. The rest either support an existing pair or
//! conflict. Growth is greedy and never backtracks.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::edge::Tolerance;
use crate::template::NeighborEdge;

use super::graph::PairingGraph;
use super::pool::PairPool;
use super::types::{MinutiaPair, PairId};

/// Frontier entry. Field order is the priority order: shortest edge first,
/// then lowest minutia indices of the pair and of its parent. Within one
/// crawl that key is unique, so the arena handle never decides the order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Frontier {
    distance: i32,
    probe: usize,
    candidate: usize,
    probe_ref: usize,
    candidate_ref: usize,
    id: PairId,
}

/// Reusable growth state (the frontier heap).
#[derive(Clone, Debug, Default)]
pub struct EdgeSpider {
    queue: BinaryHeap<Reverse<Frontier>>,
}

impl EdgeSpider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grow `root` over the neighbor tables `pedges`/`cedges` into `graph`.
    ///
    /// `graph` must be empty on entry and is left holding the result.
    pub fn crawl(
        &mut self,
        pedges: &[Vec<NeighborEdge>],
        cedges: &[Vec<NeighborEdge>],
        graph: &mut PairingGraph,
        pool: &mut PairPool,
        root: PairId,
        tolerance: Tolerance,
    ) {
        debug_assert!(graph.is_empty());
        self.queue.clear();
        self.push(pool, root);
        while let Some(Reverse(next)) = self.queue.pop() {
            graph.add_pair(pool, next.id);
            self.collect_edges(pedges, cedges, graph, pool, tolerance);
            self.skip_paired(graph, pool);
        }
    }

    #[inline]
    fn push(&mut self, pool: &PairPool, id: PairId) {
        let pair = &pool[id];
        self.queue.push(Reverse(Frontier {
            distance: pair.distance,
            probe: pair.probe,
            candidate: pair.candidate,
            probe_ref: pair.probe_ref,
            candidate_ref: pair.candidate_ref,
            id,
        }));
    }

    /// Propose pairs along the edges of the last accepted pair.
    fn collect_edges(
        &mut self,
        pedges: &[Vec<NeighborEdge>],
        cedges: &[Vec<NeighborEdge>],
        graph: &mut PairingGraph,
        pool: &mut PairPool,
        tolerance: Tolerance,
    ) {
        let Some(&last) = graph.tree().last() else {
            return;
        };
        let reference = pool[last];
        let pstar = &pedges[reference.probe];
        let cstar = &cedges[reference.candidate];
        let max_d = tolerance.max_distance_error;
        let (mut start, mut end) = (0, 0);
        for cedge in cstar {
            while start < pstar.len() && pstar[start].shape.length < cedge.shape.length - max_d {
                start += 1;
            }
            end = end.max(start);
            while end < pstar.len() && pstar[end].shape.length <= cedge.shape.length + max_d {
                end += 1;
            }
            for pedge in &pstar[start..end] {
                if !tolerance.angles_match(&pedge.shape, &cedge.shape) {
                    continue;
                }
                let id = pool.insert(MinutiaPair {
                    probe: pedge.neighbor,
                    candidate: cedge.neighbor,
                    probe_ref: reference.probe,
                    candidate_ref: reference.candidate,
                    distance: cedge.shape.length,
                    supporting_edges: 0,
                });
                if graph.is_free(pedge.neighbor, cedge.neighbor) {
                    self.push(pool, id);
                } else {
                    graph.support(pool, id);
                }
            }
        }
    }

    /// Drop frontier entries made stale by growth since they were queued.
    fn skip_paired(&mut self, graph: &mut PairingGraph, pool: &mut PairPool) {
        while let Some(&Reverse(top)) = self.queue.peek() {
            if graph.is_free(top.probe, top.candidate) {
                break;
            }
            self.queue.pop();
            graph.support(pool, top.id);
        }
    }
}
