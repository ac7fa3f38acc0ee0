//! Accepted correspondences of one growth run.
//!
//! Pairs live in the [`PairPool`] arena; the graph only stores handles. The
//! by-probe and by-candidate tables give O(1) conflict checks and always form
//! a bijection over exactly the pairs in `tree`.

use super::pool::PairPool;
use super::types::PairId;

#[derive(Clone, Debug, Default)]
pub struct PairingGraph {
    /// Growth order; index 0 is the root.
    tree: Vec<PairId>,
    by_probe: Vec<Option<PairId>>,
    by_candidate: Vec<Option<PairId>>,
    /// Supporting pairs, retained only while `support_enabled`.
    support: Vec<PairId>,
    pub support_enabled: bool,
}

impl PairingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the lookup tables for the coming match. Never shrinks.
    pub fn reserve(&mut self, probe_len: usize, candidate_len: usize) {
        if self.by_probe.len() < probe_len {
            self.by_probe.resize(probe_len, None);
        }
        if self.by_candidate.len() < candidate_len {
            self.by_candidate.resize(candidate_len, None);
        }
        self.tree.reserve(probe_len.min(candidate_len));
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Accepted pairs in growth order.
    #[inline]
    pub fn tree(&self) -> &[PairId] {
        &self.tree
    }

    #[inline]
    pub fn supporting(&self) -> &[PairId] {
        &self.support
    }

    #[inline]
    pub fn by_probe(&self, probe: usize) -> Option<PairId> {
        self.by_probe[probe]
    }

    #[inline]
    pub fn by_candidate(&self, candidate: usize) -> Option<PairId> {
        self.by_candidate[candidate]
    }

    /// Neither minutia of the pair is taken yet.
    #[inline]
    pub fn is_free(&self, probe: usize, candidate: usize) -> bool {
        self.by_probe[probe].is_none() && self.by_candidate[candidate].is_none()
    }

    pub fn add_pair(&mut self, pool: &PairPool, id: PairId) {
        let pair = &pool[id];
        debug_assert!(self.is_free(pair.probe, pair.candidate));
        self.by_probe[pair.probe] = Some(id);
        self.by_candidate[pair.candidate] = Some(id);
        self.tree.push(id);
    }

    /// Settle a pair that was not accepted.
    ///
    /// If it reconnects two minutiae that are already paired with each other,
    /// it is a supporting edge: both its endpoints are credited. Otherwise it
    /// conflicts and is dropped.
    pub fn support(&mut self, pool: &mut PairPool, id: PairId) {
        let pair = pool[id];
        let existing = self.by_probe[pair.probe].filter(|&e| pool[e].candidate == pair.candidate);
        let Some(existing) = existing else {
            pool.release(id);
            return;
        };
        pool[existing].supporting_edges += 1;
        if let Some(reference) = self.by_probe[pair.probe_ref] {
            pool[reference].supporting_edges += 1;
        }
        if self.support_enabled {
            self.support.push(id);
        } else {
            pool.release(id);
        }
    }

    /// Empty the graph for the next growth run.
    ///
    /// The root belongs to the root list and is not released, only its
    /// support count is reset. Everything else goes back to the pool.
    pub fn clear(&mut self, pool: &mut PairPool) {
        for (i, &id) in self.tree.iter().enumerate() {
            let pair = pool[id];
            self.by_probe[pair.probe] = None;
            self.by_candidate[pair.candidate] = None;
            if i > 0 {
                pool.release(id);
            } else {
                pool[id].supporting_edges = 0;
            }
        }
        self.tree.clear();
        for id in self.support.drain(..) {
            pool.release(id);
        }
    }

    /// By-probe and by-candidate tables index exactly the pairs in the tree.
    pub fn is_consistent(&self, pool: &PairPool) -> bool {
        let tree_ok = self.tree.iter().all(|&id| {
            let p = &pool[id];
            self.by_probe.get(p.probe) == Some(&Some(id))
                && self.by_candidate.get(p.candidate) == Some(&Some(id))
        });
        let probe_entries = self.by_probe.iter().flatten().count();
        let candidate_entries = self.by_candidate.iter().flatten().count();
        tree_ok && probe_entries == self.tree.len() && candidate_entries == self.tree.len()
    }
}
