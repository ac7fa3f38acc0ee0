//! Quantized edge-shape index over all probe edges.
//!
//! Tolerance is handled on the build side: every edge is filed under each bin
//! its tolerance window touches, so a query is one bin lookup plus an exact
//! re-check and nothing near a bin boundary is missed.

use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::geom::angle;
use crate::template::SearchTemplate;

use super::shape::{EdgeShape, IndexedEdge, Tolerance};

/// Edge hash of one probe template. Read-only after [`EdgeHash::build`].
#[derive(Clone, Debug)]
pub struct EdgeHash {
    bins: HashMap<i32, Vec<IndexedEdge>>,
    tolerance: Tolerance,
    angle_bins: i32,
}

/// Size summary, for logging and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashStats {
    pub edges: usize,
    pub bins: usize,
    pub entries: usize,
    pub largest_bin: usize,
}

#[inline]
fn pack(reference_bin: i32, neighbor_bin: i32, length_bin: i32) -> i32 {
    (reference_bin << 24) + (neighbor_bin << 16) + length_bin
}

impl EdgeHash {
    /// Index every ordered pair of distinct minutiae of `template`.
    pub fn build(template: &SearchTemplate, tolerance: Tolerance) -> Self {
        let mut hash = Self {
            bins: HashMap::new(),
            tolerance,
            angle_bins: (TAU / tolerance.max_angle_error).ceil() as i32,
        };
        let minutiae = template.minutiae();
        let mut coverage = Vec::new();
        for reference in 0..minutiae.len() {
            for neighbor in 0..minutiae.len() {
                if reference == neighbor {
                    continue;
                }
                let edge = IndexedEdge::new(minutiae, reference, neighbor);
                hash.coverage(&edge.shape, &mut coverage);
                for &key in &coverage {
                    hash.bins.entry(key).or_default().push(edge);
                }
            }
        }
        tracing::trace!(stats = ?hash.stats(), "edge hash built");
        hash
    }

    #[inline]
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Bin key of a query shape (no tolerance expansion).
    #[inline]
    pub fn key(&self, shape: &EdgeShape) -> i32 {
        let t = &self.tolerance;
        pack(
            (shape.reference_angle / t.max_angle_error) as i32,
            (shape.neighbor_angle / t.max_angle_error) as i32,
            shape.length / t.max_distance_error,
        )
    }

    /// All bins whose tolerance window could contain `shape`, written to `out`.
    fn coverage(&self, shape: &EdgeShape, out: &mut Vec<i32>) {
        out.clear();
        let t = &self.tolerance;
        let (max_d, max_a) = (t.max_distance_error, t.max_angle_error);
        let min_length_bin = (shape.length - max_d) / max_d;
        let max_length_bin = (shape.length + max_d) / max_d;
        let angle_window = |a: f64| {
            let first = (angle::difference(a, max_a) / max_a) as i32;
            let last = (angle::add(a, max_a) / max_a) as i32;
            (first, (last + 1) % self.angle_bins)
        };
        let (min_reference_bin, end_reference_bin) = angle_window(shape.reference_angle);
        let (min_neighbor_bin, end_neighbor_bin) = angle_window(shape.neighbor_angle);
        for length_bin in min_length_bin..=max_length_bin {
            let mut reference_bin = min_reference_bin;
            while reference_bin != end_reference_bin {
                let mut neighbor_bin = min_neighbor_bin;
                while neighbor_bin != end_neighbor_bin {
                    out.push(pack(reference_bin, neighbor_bin, length_bin));
                    neighbor_bin = (neighbor_bin + 1) % self.angle_bins;
                }
                reference_bin = (reference_bin + 1) % self.angle_bins;
            }
        }
    }

    /// Raw bin contents for `shape`, before the exact tolerance check.
    #[inline]
    pub fn bin(&self, shape: &EdgeShape) -> &[IndexedEdge] {
        self.bins
            .get(&self.key(shape))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Probe edges matching the candidate `shape` within tolerance, in
    /// insertion order.
    pub fn matching<'a>(&'a self, shape: &'a EdgeShape) -> impl Iterator<Item = &'a IndexedEdge> {
        let tolerance = self.tolerance;
        self.bin(shape)
            .iter()
            .filter(move |e| tolerance.matches(&e.shape, shape))
    }

    pub fn stats(&self) -> HashStats {
        let mut stats = HashStats {
            bins: self.bins.len(),
            ..HashStats::default()
        };
        for list in self.bins.values() {
            stats.entries += list.len();
            stats.largest_bin = stats.largest_bin.max(list.len());
        }
        stats.edges = self
            .bins
            .values()
            .flatten()
            .map(|e| (e.reference, e.neighbor))
            .collect::<std::collections::HashSet<_>>()
            .len();
        stats
    }
}
