//! Free-list arena of pair records.
//!
//! Allocation pops the free list or grows the slot vector; release pushes the
//! handle back. Both are O(1), and after warm-up a match allocates nothing.

use std::ops::{Index, IndexMut};

use super::types::{MinutiaPair, PairId};

#[derive(Clone, Debug, Default)]
pub struct PairPool {
    slots: Vec<MinutiaPair>,
    free: Vec<PairId>,
}

impl PairPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a zeroed slot.
    #[inline]
    pub fn allocate(&mut self) -> PairId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = MinutiaPair::default();
                id
            }
            None => {
                self.slots.push(MinutiaPair::default());
                PairId(self.slots.len() - 1)
            }
        }
    }

    /// Allocate and fill in one step.
    #[inline]
    pub fn insert(&mut self, pair: MinutiaPair) -> PairId {
        let id = self.allocate();
        self.slots[id.0] = pair;
        id
    }

    #[inline]
    pub fn release(&mut self, id: PairId) {
        debug_assert!(id.0 < self.slots.len(), "foreign pair handle {id:?}");
        self.free.push(id);
    }

    /// Slots currently handed out.
    #[inline]
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Slots ever created (live + free).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Index<PairId> for PairPool {
    type Output = MinutiaPair;
    #[inline]
    fn index(&self, id: PairId) -> &MinutiaPair {
        &self.slots[id.0]
    }
}

impl IndexMut<PairId> for PairPool {
    #[inline]
    fn index_mut(&mut self, id: PairId) -> &mut MinutiaPair {
        &mut self.slots[id.0]
    }
}
