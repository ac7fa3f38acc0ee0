//! Root enumeration: seed correspondences from candidate edges.
//!
//! Candidate edges are sampled by stride ("period") and offset ("phase"), so
//! well-separated minutiae spread over the whole template are tried before
//! tight clusters. Long edges go first; short edges only in a second pass,
//! for sparse templates. Two hard caps bound the work regardless of size.

use std::collections::HashSet;

use crate::cfg::MatchCfg;
use crate::edge::{EdgeHash, EdgeShape};
use crate::template::SearchTemplate;

use super::pool::PairPool;
use super::types::{MinutiaPair, PairId};

/// How much work one enumeration did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RootStats {
    /// Hash bins consulted.
    pub lookups: usize,
    /// Matching probe edges found, duplicates included.
    pub tried: usize,
}

/// Deduplicated seed pairs for one candidate.
#[derive(Clone, Debug, Default)]
pub struct RootList {
    pairs: Vec<PairId>,
    duplicates: HashSet<u64>,
}

impl RootList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn pairs(&self) -> &[PairId] {
        &self.pairs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Collect roots of `candidate` against the probe's edge hash.
    ///
    /// Stops as soon as `max_tried_roots` matches or `max_root_edge_lookups`
    /// lookups have been spent.
    pub fn enumerate(
        &mut self,
        pool: &mut PairPool,
        hash: &EdgeHash,
        candidate: &SearchTemplate,
        cfg: &MatchCfg,
    ) -> RootStats {
        let mut stats = RootStats::default();
        let cminutiae = candidate.minutiae();
        let n = cminutiae.len();
        for short_edges in [false, true] {
            for period in 1..n {
                for phase in 0..=period {
                    for creference in (phase..n).step_by(period + 1) {
                        let cneighbor = (creference + period) % n;
                        let cedge = EdgeShape::new(&cminutiae[creference], &cminutiae[cneighbor]);
                        if (cedge.length >= cfg.min_root_edge_length) == short_edges {
                            continue;
                        }
                        for pedge in hash.matching(&cedge) {
                            let key = ((pedge.reference as u64) << 32) | creference as u64;
                            if self.duplicates.insert(key) {
                                self.pairs.push(pool.insert(MinutiaPair {
                                    probe: pedge.reference,
                                    candidate: creference,
                                    ..MinutiaPair::default()
                                }));
                            }
                            stats.tried += 1;
                            if stats.tried >= cfg.max_tried_roots {
                                return stats;
                            }
                        }
                        stats.lookups += 1;
                        if stats.lookups >= cfg.max_root_edge_lookups {
                            return stats;
                        }
                    }
                }
            }
        }
        stats
    }

    /// Release every root back to the pool and forget the duplicates.
    pub fn discard(&mut self, pool: &mut PairPool) {
        for id in self.pairs.drain(..) {
            pool.release(id);
        }
        self.duplicates.clear();
    }
}
